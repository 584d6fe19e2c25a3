//! Virtual timers driven by a periodic tick interrupt

pub mod scheduler;
pub mod tick;
pub mod timer;

pub use scheduler::{Scheduler, SchedulerError, TimerBuilder};
pub use tick::{SharedScheduler, SweepPolicy};
pub use timer::{TimerCallback, TimerSlot, TimerState};
