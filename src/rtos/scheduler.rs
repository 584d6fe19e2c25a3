//! Cooperative virtual timer scheduler

use super::timer::{TimerCallback, TimerSlot, TimerState};
use crate::config::us_to_ticks;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SchedulerError {
    InvalidSlot,
    ZeroPeriod,
    Undeclared,
}

pub type Result<T> = core::result::Result<T, SchedulerError>;

/// Fixed table of `N` virtual timers sharing one tick counter.
///
/// Callbacks get `&mut C`, the state passed to [`Scheduler::sweep`]. Slots
/// are checked in ascending index order; a callback that does not return
/// stalls every slot after it and, when swept from the tick interrupt, the
/// tick itself.
pub struct Scheduler<C, const N: usize> {
    slots: [TimerSlot<C>; N],
    ticks: u32,
}

impl<C, const N: usize> Scheduler<C, N> {
    pub const fn new() -> Self {
        Self {
            slots: [TimerSlot::EMPTY; N],
            ticks: 0,
        }
    }

    /// Bind a period and callback to `slot`, leaving it inactive.
    pub fn declare(&mut self, slot: usize, period_ticks: u32, callback: TimerCallback<C>) -> Result<()> {
        if period_ticks == 0 {
            return Err(SchedulerError::ZeroPeriod);
        }
        self.slot_mut(slot)?.declare(period_ticks, callback);
        Ok(())
    }

    pub fn start(&mut self, slot: usize) -> Result<()> {
        let now = self.ticks;
        let timer = self.slot_mut(slot)?;
        if !timer.is_declared() {
            return Err(SchedulerError::Undeclared);
        }
        timer.start(now);
        Ok(())
    }

    pub fn cancel(&mut self, slot: usize) -> Result<()> {
        self.slot_mut(slot)?.cancel();
        Ok(())
    }

    /// Advance the tick counter by one, wrapping on overflow.
    #[inline]
    pub fn tick(&mut self) {
        self.ticks = self.ticks.wrapping_add(1);
    }

    /// Run every due callback once and re-arm it from the current tick.
    ///
    /// Missed periods are not replayed: a slot that is several periods late
    /// fires once. Returns the number of callbacks run.
    pub fn sweep(&mut self, ctx: &mut C) -> usize {
        let now = self.ticks;
        let mut fired = 0;

        for slot in self.slots.iter_mut() {
            if !slot.is_due(now) {
                continue;
            }
            if let Some(callback) = slot.callback {
                callback(ctx);
            }
            slot.last_fire_tick = now;
            fired += 1;
        }
        fired
    }

    /// Tick then sweep, as done once per timer interrupt.
    pub fn on_tick(&mut self, ctx: &mut C) -> usize {
        self.tick();
        self.sweep(ctx)
    }

    #[inline]
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn state(&self, slot: usize) -> Result<TimerState> {
        self.slots
            .get(slot)
            .map(TimerSlot::state)
            .ok_or(SchedulerError::InvalidSlot)
    }

    pub fn is_active(&self, slot: usize) -> bool {
        matches!(self.state(slot), Ok(TimerState::Active))
    }

    fn slot_mut(&mut self, slot: usize) -> Result<&mut TimerSlot<C>> {
        self.slots.get_mut(slot).ok_or(SchedulerError::InvalidSlot)
    }
}

impl<C, const N: usize> Default for Scheduler<C, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Collects a timer declaration before committing it to a slot.
pub struct TimerBuilder<C> {
    callback: Option<TimerCallback<C>>,
    period_ticks: u32,
}

impl<C> TimerBuilder<C> {
    pub fn new() -> Self {
        Self {
            callback: None,
            period_ticks: 0,
        }
    }

    pub fn callback(mut self, callback: TimerCallback<C>) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn period_ticks(mut self, period_ticks: u32) -> Self {
        self.period_ticks = period_ticks;
        self
    }

    pub fn period_us(self, us: u32) -> Self {
        self.period_ticks(us_to_ticks(us))
    }

    pub fn declare<const N: usize>(self, scheduler: &mut Scheduler<C, N>, slot: usize) -> Result<()> {
        match self.callback {
            Some(callback) => scheduler.declare(slot, self.period_ticks, callback),
            None => Err(SchedulerError::Undeclared),
        }
    }
}

impl<C> Default for TimerBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Log {
        fired: [u32; 4],
        order: [u8; 8],
        len: usize,
    }

    impl Log {
        fn record(&mut self, slot: u8) {
            self.fired[slot as usize] += 1;
            self.order[self.len] = slot;
            self.len += 1;
        }
    }

    fn slot0(log: &mut Log) {
        log.record(0);
    }

    fn slot1(log: &mut Log) {
        log.record(1);
    }

    fn run(sched: &mut Scheduler<Log, 2>, log: &mut Log, ticks: u32) {
        for _ in 0..ticks {
            sched.on_tick(log);
        }
    }

    #[test]
    fn declare_validates_slot_and_period() {
        let mut sched = Scheduler::<Log, 2>::new();
        assert_eq!(sched.declare(2, 5, slot0), Err(SchedulerError::InvalidSlot));
        assert_eq!(sched.declare(0, 0, slot0), Err(SchedulerError::ZeroPeriod));
        assert_eq!(sched.declare(0, 5, slot0), Ok(()));
        assert_eq!(sched.state(0), Ok(TimerState::Inactive));
    }

    #[test]
    fn start_requires_declared_slot() {
        let mut sched = Scheduler::<Log, 2>::new();
        assert_eq!(sched.start(1), Err(SchedulerError::Undeclared));
        assert_eq!(sched.start(7), Err(SchedulerError::InvalidSlot));
        assert_eq!(sched.cancel(7), Err(SchedulerError::InvalidSlot));
    }

    #[test]
    fn first_fire_after_full_period() {
        let mut sched = Scheduler::<Log, 2>::new();
        let mut log = Log::default();
        sched.declare(0, 5, slot0).unwrap();
        run(&mut sched, &mut log, 3);
        sched.start(0).unwrap();

        run(&mut sched, &mut log, 4);
        assert_eq!(log.fired[0], 0);
        run(&mut sched, &mut log, 1);
        assert_eq!(log.fired[0], 1);
        assert!(sched.is_active(0));
    }

    #[test]
    fn never_fires_while_inactive() {
        let mut sched = Scheduler::<Log, 2>::new();
        let mut log = Log::default();
        sched.declare(0, 1, slot0).unwrap();
        run(&mut sched, &mut log, 50);
        assert_eq!(log.fired[0], 0);
    }

    #[test]
    fn cancel_before_due_prevents_fire() {
        let mut sched = Scheduler::<Log, 2>::new();
        let mut log = Log::default();
        sched.declare(0, 10, slot0).unwrap();
        sched.start(0).unwrap();
        run(&mut sched, &mut log, 9);
        sched.cancel(0).unwrap();
        sched.cancel(0).unwrap();
        run(&mut sched, &mut log, 20);
        assert_eq!(log.fired[0], 0);
        assert_eq!(sched.state(0), Ok(TimerState::Inactive));
    }

    #[test]
    fn restart_rephases() {
        let mut sched = Scheduler::<Log, 2>::new();
        let mut log = Log::default();
        sched.declare(0, 10, slot0).unwrap();
        sched.start(0).unwrap();
        run(&mut sched, &mut log, 7);
        sched.start(0).unwrap();
        run(&mut sched, &mut log, 9);
        assert_eq!(log.fired[0], 0);
        run(&mut sched, &mut log, 1);
        assert_eq!(log.fired[0], 1);
    }

    #[test]
    fn late_sweep_fires_once() {
        let mut sched = Scheduler::<Log, 2>::new();
        let mut log = Log::default();
        sched.declare(0, 3, slot0).unwrap();
        sched.start(0).unwrap();
        for _ in 0..10 {
            sched.tick();
        }
        assert_eq!(sched.sweep(&mut log), 1);
        assert_eq!(sched.sweep(&mut log), 0);
        assert_eq!(log.fired[0], 1);
    }

    #[test]
    fn simultaneous_timers_run_in_slot_order() {
        let mut sched = Scheduler::<Log, 2>::new();
        let mut log = Log::default();
        sched.declare(1, 4, slot1).unwrap();
        sched.declare(0, 4, slot0).unwrap();
        sched.start(1).unwrap();
        sched.start(0).unwrap();
        run(&mut sched, &mut log, 4);
        assert_eq!(&log.order[..log.len], &[0, 1]);
    }

    #[test]
    fn builder_declares_slot() {
        let mut sched = Scheduler::<Log, 2>::new();
        TimerBuilder::new()
            .callback(slot1)
            .period_us(1_000_000)
            .declare(&mut sched, 1)
            .unwrap();
        assert_eq!(sched.start(1), Ok(()));
        assert_eq!(
            TimerBuilder::<Log>::new().period_ticks(3).declare(&mut sched, 0),
            Err(SchedulerError::Undeclared)
        );
    }
}
