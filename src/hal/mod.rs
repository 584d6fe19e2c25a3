pub mod timer;
pub mod uart;
#[cfg(target_arch = "avr")]
pub mod eeprom;
#[cfg(target_arch = "avr")]
pub mod gpio;

// Re-export commonly used types
pub use timer::Prescaler;
#[cfg(target_arch = "avr")]
pub use timer::TickTimer;
#[cfg(target_arch = "avr")]
pub use uart::Usart0;
#[cfg(target_arch = "avr")]
pub use eeprom::Eeprom;
#[cfg(target_arch = "avr")]
pub use gpio::LedBar;
