/// Action run when a virtual timer expires. It receives the state the
/// scheduler was swept with and must return quickly.
pub type TimerCallback<C> = fn(&mut C);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TimerState {
    Inactive,
    Active,
}

/// One entry of the scheduler's fixed slot table.
pub struct TimerSlot<C> {
    pub(crate) period_ticks: u32,
    pub(crate) last_fire_tick: u32,
    pub(crate) active: bool,
    pub(crate) callback: Option<TimerCallback<C>>,
}

impl<C> TimerSlot<C> {
    pub const EMPTY: Self = Self {
        period_ticks: 0,
        last_fire_tick: 0,
        active: false,
        callback: None,
    };

    pub fn declare(&mut self, period_ticks: u32, callback: TimerCallback<C>) {
        self.period_ticks = period_ticks;
        self.callback = Some(callback);
        self.active = false;
    }

    pub fn is_declared(&self) -> bool {
        self.callback.is_some()
    }

    /// Begin a fresh period at `now`. Restarting an active slot re-phases it.
    pub fn start(&mut self, now: u32) {
        self.last_fire_tick = now;
        self.active = true;
    }

    pub fn cancel(&mut self) {
        self.active = false;
    }

    pub fn state(&self) -> TimerState {
        if self.active {
            TimerState::Active
        } else {
            TimerState::Inactive
        }
    }

    #[inline]
    pub fn is_due(&self, now: u32) -> bool {
        self.active && now.wrapping_sub(self.last_fire_tick) >= self.period_ticks
    }
}

impl<C> Clone for TimerSlot<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for TimerSlot<C> {}
