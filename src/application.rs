//! Stopwatch application driven over the serial link
//!
//! A one-second virtual timer advances a 3-bit counter shown on LEDs and,
//! while the stopwatch runs, the elapsed seconds. Single-character commands
//! arrive on the flow-controlled channel.

use crate::config::{COUNTER_MAX, STOPWATCH_PERIOD_US, STOPWATCH_TIMER};
use crate::drivers::SerialConsole;
use crate::logger;
use crate::rtos::{SchedulerError, SharedScheduler, TimerBuilder};
use crate::storage::{flip_low3, ByteStorage, Migration, PersistedConfig};
use core::cell::RefCell;
use critical_section::Mutex;
use embedded_hal::serial;

const MENU: &str = "\r\n----- Stopwatch menu -----\r\n\
a: start stopwatch\r\n\
b: stop stopwatch and print time\r\n\
c: set start time\r\n\
d: show start time\r\n\
h: show this menu\r\n\
--------------------------\r\n";
const PROMPT: &str = "\r\nInput: ";
const STARTED: &str = "\r\nStopwatch started.\r\n";
const SET_TIME: &str = "\r\nEnter start time (0-7): ";
const INVALID_TIME: &str = "\r\nInvalid time, enter a digit between 0 and 7.\r\n";
const UNKNOWN_COMMAND: &str = "\r\nUnknown command!\r\n";

/// Somewhere to show the 3-bit counter.
pub trait CounterDisplay {
    fn show(&mut self, value: u8);
}

/// State touched by the one-second timer callback.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stopwatch {
    /// LED pattern, low three bits.
    pub led_counter: u8,
    pub active: bool,
    pub elapsed_s: u32,
}

impl Stopwatch {
    pub const fn new() -> Self {
        Self {
            led_counter: 0,
            active: false,
            elapsed_s: 0,
        }
    }

    pub fn on_second(&mut self) {
        if self.active {
            self.elapsed_s += 1;
        }
        self.led_counter = if self.led_counter >= COUNTER_MAX {
            0
        } else {
            self.led_counter + 1
        };
    }

    #[inline]
    pub fn render<D: CounterDisplay>(&self, display: &mut D) {
        display.show(self.led_counter);
    }
}

/// Timer callback for the stopwatch slot.
pub fn count_second(stopwatch: &mut Stopwatch) {
    stopwatch.on_second();
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AppError<E, SE> {
    Serial(E),
    Scheduler(SchedulerError),
    Storage(SE),
}

pub type AppResult<T, E, SE> = core::result::Result<T, AppError<E, SE>>;

pub struct Application<'a, W, S, const C: usize, const N: usize> {
    console: SerialConsole<'a, W, C>,
    timers: &'a SharedScheduler<Stopwatch, N>,
    stopwatch: &'a Mutex<RefCell<Stopwatch>>,
    config: PersistedConfig<S>,
}

impl<'a, W, S, const C: usize, const N: usize> Application<'a, W, S, C, N>
where
    W: serial::Write<u8>,
    S: ByteStorage,
{
    pub fn new(
        console: SerialConsole<'a, W, C>,
        timers: &'a SharedScheduler<Stopwatch, N>,
        stopwatch: &'a Mutex<RefCell<Stopwatch>>,
        config: PersistedConfig<S>,
    ) -> Self {
        Self {
            console,
            timers,
            stopwatch,
            config,
        }
    }

    /// Resume the peer, migrate the stored start time, load the counter,
    /// declare the stopwatch timer and show the menu.
    pub fn boot(&mut self) -> AppResult<(), W::Error, S::Error> {
        self.console.channel().announce_ready().map_err(AppError::Serial)?;

        if let Migration::Applied(value) = self.config.migrate().map_err(AppError::Storage)? {
            logger::log_hex(&mut self.console, logger::LogType::System, "start time migrated", value)
                .map_err(AppError::Serial)?;
        }
        let start = self.config.read_config().map_err(AppError::Storage)?;
        self.with_stopwatch(|sw| sw.led_counter = start & COUNTER_MAX);

        self.declare_timers()?;
        logger::system(&mut self.console, "stopwatch ready").map_err(AppError::Serial)?;
        self.print(MENU)?;
        self.print(PROMPT)
    }

    pub fn declare_timers(&mut self) -> AppResult<(), W::Error, S::Error> {
        self.timers
            .with(|scheduler| {
                TimerBuilder::new()
                    .callback(count_second)
                    .period_us(STOPWATCH_PERIOD_US)
                    .declare(scheduler, STOPWATCH_TIMER)
            })
            .map_err(AppError::Scheduler)
    }

    /// Read one command byte, echo it and act on it. Blocks until input.
    pub fn run_once(&mut self) -> AppResult<(), W::Error, S::Error> {
        let cmd = self.console.read_byte().map_err(AppError::Serial)?;
        self.dispatch(cmd)
    }

    /// Like [`Application::run_once`] but returns `WouldBlock` when no
    /// command is waiting, for main loops that also poll the scheduler.
    pub fn try_run_once(&mut self) -> nb::Result<(), AppError<W::Error, S::Error>> {
        let cmd = self
            .console
            .try_read_byte()
            .map_err(|e| e.map(AppError::Serial))?;
        self.dispatch(cmd).map_err(nb::Error::Other)
    }

    // Echo, trace with the `debug` feature, then act
    fn dispatch(&mut self, cmd: u8) -> AppResult<(), W::Error, S::Error> {
        self.console.write_byte(cmd).map_err(AppError::Serial)?;
        logger::debug(&mut self.console, "command", cmd).map_err(AppError::Serial)?;
        self.process_command(cmd)
    }

    pub fn process_command(&mut self, cmd: u8) -> AppResult<(), W::Error, S::Error> {
        match cmd {
            b'a' => self.start_stopwatch()?,
            b'b' => self.stop_stopwatch()?,
            b'c' => self.set_start_time()?,
            b'd' => self.show_start_time()?,
            b'h' => self.print(MENU)?,
            _ => self.print(UNKNOWN_COMMAND)?,
        }
        self.print(PROMPT)
    }

    pub fn stopwatch(&self) -> Stopwatch {
        critical_section::with(|cs| *self.stopwatch.borrow_ref(cs))
    }

    fn start_stopwatch(&mut self) -> AppResult<(), W::Error, S::Error> {
        let start = self.config.read_config().map_err(AppError::Storage)?;
        self.with_stopwatch(|sw| {
            sw.led_counter = start & COUNTER_MAX;
            sw.active = true;
        });
        self.timers
            .with(|scheduler| scheduler.start(STOPWATCH_TIMER))
            .map_err(AppError::Scheduler)?;
        self.print(STARTED)
    }

    fn stop_stopwatch(&mut self) -> AppResult<(), W::Error, S::Error> {
        self.timers
            .with(|scheduler| scheduler.cancel(STOPWATCH_TIMER))
            .map_err(AppError::Scheduler)?;
        let (elapsed, counter) = self.with_stopwatch(|sw| {
            sw.active = false;
            let elapsed = core::mem::take(&mut sw.elapsed_s);
            (elapsed, sw.led_counter)
        });
        ufmt::uwrite!(
            self.console,
            "\r\nStopwatch stopped.\r\nElapsed: {}s\r\nCounter: {}\r\n",
            elapsed,
            flip_low3(counter)
        )
        .map_err(AppError::Serial)
    }

    fn set_start_time(&mut self) -> AppResult<(), W::Error, S::Error> {
        self.print(SET_TIME)?;
        let value = loop {
            let input = self.console.read_byte().map_err(AppError::Serial)?;
            match input {
                b'0'..=b'7' => {
                    self.console.write_byte(input).map_err(AppError::Serial)?;
                    break flip_low3(input - b'0');
                }
                b'\r' | b'\n' => {
                    self.print("\r\n")?;
                    break flip_low3(0);
                }
                _ => {
                    self.print(INVALID_TIME)?;
                    self.print(SET_TIME)?;
                }
            }
        };
        self.config.write_config(value).map_err(AppError::Storage)?;
        self.with_stopwatch(|sw| sw.led_counter = value);
        Ok(())
    }

    fn show_start_time(&mut self) -> AppResult<(), W::Error, S::Error> {
        let stored = self.config.read_config().map_err(AppError::Storage)?;
        ufmt::uwrite!(self.console, "\r\nStart time: {}\r\n", flip_low3(stored))
            .map_err(AppError::Serial)
    }

    fn print(&mut self, s: &str) -> AppResult<(), W::Error, S::Error> {
        self.console.write_str(s).map_err(AppError::Serial)
    }

    fn with_stopwatch<R>(&self, f: impl FnOnce(&mut Stopwatch) -> R) -> R {
        critical_section::with(|cs| f(&mut self.stopwatch.borrow_ref_mut(cs)))
    }
}
