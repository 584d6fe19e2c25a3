//! Tagged log lines on a text sink
//!
//! Lines look like `[SYS] config migrated\r\n`. Debug lines are compiled in
//! only with the `debug` feature.

use ufmt::uWrite;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogType {
    System = 0,
    Error = 1,
    Debug = 2,
}

impl LogType {
    pub const fn tag(self) -> &'static str {
        match self {
            LogType::System => "[SYS] ",
            LogType::Error => "[ERR] ",
            LogType::Debug => "[DBG] ",
        }
    }

    pub const fn enabled(self) -> bool {
        match self {
            LogType::Debug => cfg!(feature = "debug"),
            _ => true,
        }
    }
}

const HEX_CHARS: [u8; 16] = *b"0123456789ABCDEF";

pub fn log<W: uWrite + ?Sized>(sink: &mut W, log_type: LogType, msg: &str) -> Result<(), W::Error> {
    if !log_type.enabled() {
        return Ok(());
    }
    sink.write_str(log_type.tag())?;
    sink.write_str(msg)?;
    sink.write_str("\r\n")
}

/// `[TAG] msg: 0xVV`
pub fn log_hex<W: uWrite + ?Sized>(
    sink: &mut W,
    log_type: LogType,
    msg: &str,
    value: u8,
) -> Result<(), W::Error> {
    if !log_type.enabled() {
        return Ok(());
    }
    sink.write_str(log_type.tag())?;
    sink.write_str(msg)?;
    sink.write_str(": 0x")?;
    sink.write_char(HEX_CHARS[(value >> 4) as usize] as char)?;
    sink.write_char(HEX_CHARS[(value & 0xF) as usize] as char)?;
    sink.write_str("\r\n")
}

pub fn system<W: uWrite + ?Sized>(sink: &mut W, msg: &str) -> Result<(), W::Error> {
    log(sink, LogType::System, msg)
}

pub fn error<W: uWrite + ?Sized>(sink: &mut W, msg: &str) -> Result<(), W::Error> {
    log(sink, LogType::Error, msg)
}

pub fn debug<W: uWrite + ?Sized>(sink: &mut W, msg: &str, value: u8) -> Result<(), W::Error> {
    log_hex(sink, LogType::Debug, msg, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    struct Capture(String);

    impl uWrite for Capture {
        type Error = Infallible;

        fn write_str(&mut self, s: &str) -> Result<(), Infallible> {
            self.0.push_str(s);
            Ok(())
        }
    }

    #[test]
    fn system_line_format() {
        let mut out = Capture(String::new());
        system(&mut out, "boot").unwrap();
        error(&mut out, "rx overflow").unwrap();
        assert_eq!(out.0, "[SYS] boot\r\n[ERR] rx overflow\r\n");
    }

    #[test]
    fn hex_value_format() {
        let mut out = Capture(String::new());
        log_hex(&mut out, LogType::System, "start", 0x1F).unwrap();
        assert_eq!(out.0, "[SYS] start: 0x1F\r\n");
    }

    #[test]
    fn debug_follows_feature() {
        let mut out = Capture(String::new());
        debug(&mut out, "tick", 3).unwrap();
        if cfg!(feature = "debug") {
            assert_eq!(out.0, "[DBG] tick: 0x03\r\n");
        } else {
            assert!(out.0.is_empty());
        }
    }
}
