use crate::serial::FlowChannel;
use embedded_hal::serial;

/// Text front end for a [`FlowChannel`]. Every byte goes through the
/// channel's blocking, flow-controlled transmit.
pub struct SerialConsole<'a, W, const C: usize> {
    channel: &'a FlowChannel<W, C>,
}

impl<'a, W: serial::Write<u8>, const C: usize> SerialConsole<'a, W, C> {
    pub fn new(channel: &'a FlowChannel<W, C>) -> Self {
        Self { channel }
    }

    pub fn channel(&self) -> &'a FlowChannel<W, C> {
        self.channel
    }

    pub fn write_byte(&mut self, byte: u8) -> Result<(), W::Error> {
        self.channel.transmit_byte(byte)
    }

    pub fn write_str(&mut self, s: &str) -> Result<(), W::Error> {
        s.bytes().try_for_each(|b| self.write_byte(b))
    }

    pub fn write_line(&mut self, s: &str) -> Result<(), W::Error> {
        self.write_str(s)?;
        self.write_str("\r\n")
    }

    pub fn read_byte(&mut self) -> Result<u8, W::Error> {
        self.channel.receive_decoded_byte()
    }

    pub fn try_read_byte(&mut self) -> nb::Result<u8, W::Error> {
        self.channel.try_receive()
    }
}

impl<'a, W: serial::Write<u8>, const C: usize> ufmt::uWrite for SerialConsole<'a, W, C> {
    type Error = W::Error;

    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        SerialConsole::write_str(self, s)
    }
}
