//! Configuration constants for the ATmega128 stopwatch firmware

use crate::rtos::SweepPolicy;
use crate::serial::Watermarks;

/// CPU frequency in Hz
pub const CPU_FREQ_HZ: u32 = 16_000_000;

/// UART baud rate
pub const UART_BAUD: u32 = 9600;

/// Baud rate register value, (16_000_000 / (16 * 9600)) - 1
pub const UART_UBRR: u16 = crate::hal::uart::ubrr_for(CPU_FREQ_HZ, UART_BAUD);

/// Timer1 clock divider for the tick source
pub const TICK_PRESCALER: crate::hal::Prescaler = crate::hal::Prescaler::Div64;

/// Timer1 compare value (CTC mode, counts 0..=63)
pub const TICK_COMPARE: u16 = 63;

/// Length of one scheduler tick in microseconds
pub const TICK_PERIOD_US: u32 =
    crate::hal::timer::tick_period_us(CPU_FREQ_HZ, TICK_PRESCALER, TICK_COMPARE);

/// Where the scheduler sweep runs
pub const SWEEP_POLICY: SweepPolicy = SweepPolicy::InInterrupt;

/// Number of virtual timer slots
pub const TIMER_SLOTS: usize = 2;

/// Slot driving the stopwatch second counter
pub const STOPWATCH_TIMER: usize = 0;

/// Stopwatch period in microseconds
pub const STOPWATCH_PERIOD_US: u32 = 1_000_000;

/// Receive ring buffer capacity in bytes
pub const RX_BUFFER_SIZE: usize = 32;

/// Receive buffer fill levels for sending pause/resume
pub const RX_WATERMARKS: Watermarks = Watermarks::DEFAULT;

/// EEPROM address of the start-time byte
pub const START_TIME_ADDR: u16 = 0;

/// Start time flashed with the firmware image
pub const FACTORY_START_TIME: u8 = 6;

/// Largest value shown on the 3-bit counter
pub const COUNTER_MAX: u8 = 7;

/// Convert a duration to whole scheduler ticks, truncating.
pub const fn us_to_ticks(us: u32) -> u32 {
    us / TICK_PERIOD_US
}
