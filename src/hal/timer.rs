//! Timer1 compare-match tick source

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prescaler {
    Stop = 0,
    Direct = 1,
    Div8 = 2,
    Div64 = 3,
    Div256 = 4,
    Div1024 = 5,
}

impl Prescaler {
    pub const fn divisor(self) -> u32 {
        match self {
            Prescaler::Stop => 0,
            Prescaler::Direct => 1,
            Prescaler::Div8 => 8,
            Prescaler::Div64 => 64,
            Prescaler::Div256 => 256,
            Prescaler::Div1024 => 1024,
        }
    }
}

/// Period of one compare match in CTC mode, in microseconds.
///
/// The counter runs from 0 to `compare` inclusive, so one period is
/// `(compare + 1) * divisor` CPU cycles. A stopped timer has no period.
/// `cpu_hz` must be at least 1 MHz.
pub const fn tick_period_us(cpu_hz: u32, prescaler: Prescaler, compare: u16) -> u32 {
    assert!(cpu_hz >= 1_000_000, "tick period needs a clock of at least 1 MHz");
    let cycles = (compare as u32 + 1) * prescaler.divisor();
    cycles / (cpu_hz / 1_000_000)
}

#[cfg(target_arch = "avr")]
pub use self::device::TickTimer;

#[cfg(target_arch = "avr")]
mod device {
    use super::Prescaler;
    use avr_device::atmega128a::{TC0, TC1};

    const WGM12: u8 = 1 << 3;
    const CS_MASK: u8 = 0x07;
    const OCIE1A: u8 = 1 << 4;

    /// Timer1 in CTC mode raising `TIMER1_COMPA` once per tick.
    pub struct TickTimer {
        _private: (),
    }

    impl TickTimer {
        pub fn new(prescaler: Prescaler, compare: u16) -> Self {
            unsafe {
                let t1 = &*TC1::ptr();
                t1.tccr1a.write(|w| w.bits(0));
                t1.tcnt1.write(|w| w.bits(0));
                t1.ocr1a.write(|w| w.bits(compare));
                t1.tccr1b.write(|w| w.bits(WGM12));
            }
            let mut timer = Self { _private: () };
            timer.start(prescaler);
            timer
        }

        pub fn start(&mut self, prescaler: Prescaler) {
            unsafe {
                let t1 = &*TC1::ptr();
                t1.tccr1b.modify(|r, w| {
                    w.bits((r.bits() & !CS_MASK) | (prescaler as u8 & CS_MASK))
                });
                // TIMSK is shared between timers and lives in the TC0 block
                (*TC0::ptr()).timsk.modify(|r, w| w.bits(r.bits() | OCIE1A));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_matches_ctc_formula() {
        assert_eq!(tick_period_us(16_000_000, Prescaler::Div64, 63), 256);
        assert_eq!(tick_period_us(16_000_000, Prescaler::Direct, 15), 1);
        assert_eq!(tick_period_us(16_000_000, Prescaler::Stop, 63), 0);
    }

    #[test]
    #[should_panic]
    fn sub_megahertz_clock_is_rejected() {
        tick_period_us(500_000, Prescaler::Div64, 63);
    }
}
