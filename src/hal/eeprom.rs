//! On-chip EEPROM access

use crate::storage::ByteStorage;
use avr_device::atmega128a::EEPROM;
use core::convert::Infallible;

const EERE: u8 = 1 << 0;
const EEWE: u8 = 1 << 1;
const EEMWE: u8 = 1 << 2;

pub struct Eeprom {
    _private: (),
}

impl Eeprom {
    pub const fn new() -> Self {
        Self { _private: () }
    }

    fn wait_ready(&self) {
        unsafe { while (*EEPROM::ptr()).eecr.read().bits() & EEWE != 0 {} }
    }
}

impl ByteStorage for Eeprom {
    type Error = Infallible;

    fn read_byte(&mut self, addr: u16) -> Result<u8, Self::Error> {
        self.wait_ready();
        unsafe {
            let p = &*EEPROM::ptr();
            p.eear.write(|w| w.bits(addr));
            p.eecr.modify(|r, w| w.bits(r.bits() | EERE));
            Ok(p.eedr.read().bits())
        }
    }

    fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), Self::Error> {
        self.wait_ready();
        // EEMWE must be followed by EEWE within four cycles
        avr_device::interrupt::free(|_| unsafe {
            let p = &*EEPROM::ptr();
            p.eear.write(|w| w.bits(addr));
            p.eedr.write(|w| w.bits(value));
            p.eecr.modify(|r, w| w.bits(r.bits() | EEMWE));
            p.eecr.modify(|r, w| w.bits(r.bits() | EEWE));
        });
        Ok(())
    }
}

impl Default for Eeprom {
    fn default() -> Self {
        Self::new()
    }
}
