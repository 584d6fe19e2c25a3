//! Counter LEDs on PB0..PB2

use crate::application::CounterDisplay;
use avr_device::atmega128a::PORTB;

const LED_MASK: u8 = 0b0000_0111;

pub struct LedBar {
    _private: (),
}

impl LedBar {
    pub fn new() -> Self {
        unsafe {
            (*PORTB::ptr()).ddrb.modify(|r, w| w.bits(r.bits() | LED_MASK));
        }
        Self { _private: () }
    }
}

impl CounterDisplay for LedBar {
    #[inline]
    fn show(&mut self, value: u8) {
        unsafe {
            (*PORTB::ptr())
                .portb
                .modify(|r, w| w.bits((r.bits() & !LED_MASK) | (value & LED_MASK)));
        }
    }
}

impl Default for LedBar {
    fn default() -> Self {
        Self::new()
    }
}
