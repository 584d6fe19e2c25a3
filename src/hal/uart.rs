//! USART0 byte transport

/// UBRR value for normal-speed asynchronous mode. `baud` must lie in
/// `1..=cpu_hz / 16`.
pub const fn ubrr_for(cpu_hz: u32, baud: u32) -> u16 {
    assert!(baud > 0 && baud <= cpu_hz / 16, "baud rate out of range for this clock");
    (cpu_hz / (16 * baud) - 1) as u16
}

#[cfg(target_arch = "avr")]
pub use self::device::Usart0;

#[cfg(target_arch = "avr")]
mod device {
    use avr_device::atmega128a::USART0;
    use core::convert::Infallible;

    const UDRE0: u8 = 1 << 5;
    const RXCIE0: u8 = 1 << 7;
    const RXEN0: u8 = 1 << 4;
    const TXEN0: u8 = 1 << 3;
    // 8 data bits, no parity, 1 stop bit
    const UCSZ_8BIT: u8 = (1 << 2) | (1 << 1);

    /// Handle on USART0. Zero-sized so it can live in a `static` channel.
    pub struct Usart0 {
        _private: (),
    }

    impl Usart0 {
        pub const fn new() -> Self {
            Self { _private: () }
        }

        /// Program the baud rate and enable RX, TX and the RX-complete interrupt.
        pub fn init(&self, ubrr: u16) {
            unsafe {
                let p = &*USART0::ptr();
                p.ubrr0h.write(|w| w.bits((ubrr >> 8) as u8));
                p.ubrr0l.write(|w| w.bits(ubrr as u8));
                p.ucsr0c.write(|w| w.bits(UCSZ_8BIT));
                p.ucsr0b.modify(|r, w| w.bits(r.bits() | RXEN0 | TXEN0 | RXCIE0));
            }
        }

        /// Read the data register. Only meaningful from `USART0_RX`.
        pub fn read_received(&self) -> u8 {
            unsafe { (*USART0::ptr()).udr0.read().bits() }
        }
    }

    impl embedded_hal::serial::Write<u8> for Usart0 {
        type Error = Infallible;

        fn write(&mut self, byte: u8) -> nb::Result<(), Self::Error> {
            unsafe {
                let p = &*USART0::ptr();
                if p.ucsr0a.read().bits() & UDRE0 == 0 {
                    return Err(nb::Error::WouldBlock);
                }
                p.udr0.write(|w| w.bits(byte));
            }
            Ok(())
        }

        fn flush(&mut self) -> nb::Result<(), Self::Error> {
            unsafe {
                if (*USART0::ptr()).ucsr0a.read().bits() & UDRE0 == 0 {
                    return Err(nb::Error::WouldBlock);
                }
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ubrr_for_9600_at_16mhz() {
        assert_eq!(ubrr_for(16_000_000, 9600), 103);
        assert_eq!(ubrr_for(16_000_000, 38400), 25);
        assert_eq!(ubrr_for(16_000_000, 1_000_000), 0);
    }

    #[test]
    #[should_panic]
    fn baud_above_clock_limit_is_rejected() {
        ubrr_for(16_000_000, 2_000_000);
    }
}
