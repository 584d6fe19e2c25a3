//! Tick interrupt glue between the hardware timer and the scheduler

use super::scheduler::Scheduler;
use core::cell::{Cell, RefCell};
use critical_section::{CriticalSection, Mutex};

/// Where due callbacks run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SweepPolicy {
    /// The tick interrupt sweeps right after advancing the counter.
    InInterrupt,
    /// The tick interrupt only advances the counter and flags a pending
    /// sweep; the main loop calls [`SharedScheduler::poll`].
    Polled,
}

/// Scheduler shared between the tick interrupt and the main loop.
pub struct SharedScheduler<C, const N: usize> {
    scheduler: Mutex<RefCell<Scheduler<C, N>>>,
    pending: Mutex<Cell<bool>>,
    policy: SweepPolicy,
}

impl<C, const N: usize> SharedScheduler<C, N> {
    pub const fn new(policy: SweepPolicy) -> Self {
        Self {
            scheduler: Mutex::new(RefCell::new(Scheduler::new())),
            pending: Mutex::new(Cell::new(false)),
            policy,
        }
    }

    /// Call once per tick interrupt. Ticks are never lost, a deferred
    /// sweep just sees a later counter value.
    pub fn on_interrupt(&self, cs: CriticalSection, ctx: &mut C) -> usize {
        let mut scheduler = self.scheduler.borrow_ref_mut(cs);
        scheduler.tick();
        match self.policy {
            SweepPolicy::InInterrupt => scheduler.sweep(ctx),
            SweepPolicy::Polled => {
                self.pending.borrow(cs).set(true);
                0
            }
        }
    }

    /// Sweep once if a tick arrived since the last poll.
    pub fn poll(&self, cs: CriticalSection, ctx: &mut C) -> usize {
        if !self.pending.borrow(cs).replace(false) {
            return 0;
        }
        self.scheduler.borrow_ref_mut(cs).sweep(ctx)
    }

    /// Run `f` on the scheduler with interrupts masked.
    pub fn with<R>(&self, f: impl FnOnce(&mut Scheduler<C, N>) -> R) -> R {
        critical_section::with(|cs| f(&mut self.scheduler.borrow_ref_mut(cs)))
    }

    pub fn ticks(&self) -> u32 {
        self.with(|scheduler| scheduler.ticks())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bump(count: &mut u32) {
        *count += 1;
    }

    fn drive(shared: &SharedScheduler<u32, 2>, count: &mut u32, ticks: u32) {
        for _ in 0..ticks {
            critical_section::with(|cs| shared.on_interrupt(cs, count));
        }
    }

    #[test]
    fn in_interrupt_sweeps_every_tick() {
        let shared = SharedScheduler::<u32, 2>::new(SweepPolicy::InInterrupt);
        let mut count = 0;
        shared.with(|s| {
            s.declare(0, 5, bump).unwrap();
            s.start(0).unwrap();
        });
        drive(&shared, &mut count, 10);
        assert_eq!(count, 2);
        assert_eq!(critical_section::with(|cs| shared.poll(cs, &mut count)), 0);
    }

    #[test]
    fn polled_defers_to_main_loop() {
        let shared = SharedScheduler::<u32, 2>::new(SweepPolicy::Polled);
        let mut count = 0;
        shared.with(|s| {
            s.declare(0, 5, bump).unwrap();
            s.start(0).unwrap();
        });

        drive(&shared, &mut count, 12);
        assert_eq!(count, 0);
        assert_eq!(shared.ticks(), 12);

        // two periods elapsed but one sweep fires once
        assert_eq!(critical_section::with(|cs| shared.poll(cs, &mut count)), 1);
        assert_eq!(critical_section::with(|cs| shared.poll(cs, &mut count)), 0);
        assert_eq!(count, 1);
    }
}
