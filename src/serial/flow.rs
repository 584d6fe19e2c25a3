//! Software (XON/XOFF) flow control over an interrupt-fed receive buffer

use super::ring_buffer::{BufferFull, RingBuffer};
use super::SerialError;
use core::cell::RefCell;
use critical_section::Mutex;
use embedded_hal::serial;

/// Resume signal. Reserved, never payload.
pub const XON: u8 = 0x11;
/// Pause signal. Reserved, never payload.
pub const XOFF: u8 = 0x13;

/// Permission to transmit, as last signalled by the peer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlowState {
    Ready,
    Paused,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WatermarkError {
    HighOutOfRange,
    LowNotBelowHigh,
}

/// Receive buffer fill levels as percentages of capacity.
///
/// Reaching `high` sends a pause; falling to or below `low` after a pause
/// sends a resume. 20/4 bytes on a 32-byte buffer is `new(62, 13)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Watermarks {
    high_percent: u8,
    low_percent: u8,
}

impl Watermarks {
    pub const DEFAULT: Self = Self {
        high_percent: 80,
        low_percent: 50,
    };

    pub const fn new(high_percent: u8, low_percent: u8) -> Result<Self, WatermarkError> {
        if high_percent == 0 || high_percent > 100 {
            return Err(WatermarkError::HighOutOfRange);
        }
        if low_percent >= high_percent {
            return Err(WatermarkError::LowNotBelowHigh);
        }
        Ok(Self {
            high_percent,
            low_percent,
        })
    }

    pub fn high_percent(&self) -> u8 {
        self.high_percent
    }

    pub fn low_percent(&self) -> u8 {
        self.low_percent
    }

    #[inline]
    pub fn reached_high(&self, len: usize, capacity: usize) -> bool {
        len * 100 >= self.high_percent as usize * capacity
    }

    #[inline]
    pub fn reached_low(&self, len: usize, capacity: usize) -> bool {
        len * 100 <= self.low_percent as usize * capacity
    }
}

impl Default for Watermarks {
    fn default() -> Self {
        Self::DEFAULT
    }
}

struct Link<W, const C: usize> {
    rx: RingBuffer<C>,
    tx: W,
    permission: FlowState,
    pause_sent: bool,
    watermarks: Watermarks,
    dropped: u16,
}

impl<W: serial::Write<u8>, const C: usize> Link<W, C> {
    fn on_receive(&mut self, byte: u8) -> Result<(), SerialError<W::Error>> {
        match byte {
            XOFF => {
                self.permission = FlowState::Paused;
                return Ok(());
            }
            XON => {
                self.permission = FlowState::Ready;
                return Ok(());
            }
            _ => {}
        }

        let stored = self.rx.push(byte);
        if stored.is_err() {
            self.dropped = self.dropped.saturating_add(1);
        }
        self.update_flow().map_err(SerialError::Transmit)?;
        stored.map_err(|BufferFull(b)| SerialError::BufferFull(b))
    }

    /// Send at most one signal for the current fill level. The latch keeps
    /// a pause from being repeated until the matching resume went out.
    fn update_flow(&mut self) -> Result<(), W::Error> {
        let len = self.rx.len();
        if !self.pause_sent && self.watermarks.reached_high(len, C) {
            self.send_control(XOFF)?;
            self.pause_sent = true;
        } else if self.pause_sent && self.watermarks.reached_low(len, C) {
            self.send_control(XON)?;
            self.pause_sent = false;
        }
        Ok(())
    }

    /// Send the resume owed once `remaining` bytes are left, before the pop
    /// that gets there is committed. A failed send keeps both the byte and
    /// the latch, so the next pop retries.
    fn resume_before_pop(&mut self, remaining: usize) -> Result<(), W::Error> {
        if self.pause_sent && self.watermarks.reached_low(remaining, C) {
            self.send_control(XON)?;
            self.pause_sent = false;
        }
        Ok(())
    }

    // Control bytes skip the permission gate, otherwise two paused peers deadlock
    fn send_control(&mut self, byte: u8) -> Result<(), W::Error> {
        nb::block!(self.tx.write(byte))
    }
}

/// Duplex byte link: a transmit primitive plus a receive ring buffer of
/// capacity `C`, with in-band pause/resume in both directions.
///
/// [`FlowChannel::receive_byte`] belongs in the receive interrupt; the
/// remaining calls are for the main loop. Every access masks interrupts.
///
/// Blocking calls wait without bound. A peer that pauses and never resumes
/// stalls [`FlowChannel::transmit_byte`], and a silent peer stalls
/// [`FlowChannel::receive_decoded_byte`]. Neither is reported as an error.
pub struct FlowChannel<W, const C: usize> {
    link: Mutex<RefCell<Link<W, C>>>,
}

impl<W: serial::Write<u8>, const C: usize> FlowChannel<W, C> {
    pub const fn new(tx: W, watermarks: Watermarks) -> Self {
        Self {
            link: Mutex::new(RefCell::new(Link {
                rx: RingBuffer::new(),
                tx,
                permission: FlowState::Ready,
                pause_sent: false,
                watermarks,
                dropped: 0,
            })),
        }
    }

    /// Handle one byte off the wire. Pause/resume from the peer update the
    /// transmit permission and are not buffered; anything else is queued.
    /// A full buffer drops the byte and reports `BufferFull`.
    pub fn receive_byte(&self, byte: u8) -> Result<(), SerialError<W::Error>> {
        critical_section::with(|cs| self.link.borrow_ref_mut(cs).on_receive(byte))
    }

    /// Send `byte` unless the peer has paused us or the transmitter is busy.
    pub fn try_transmit(&self, byte: u8) -> nb::Result<(), W::Error> {
        critical_section::with(|cs| {
            let mut link = self.link.borrow_ref_mut(cs);
            if link.permission == FlowState::Paused {
                return Err(nb::Error::WouldBlock);
            }
            link.tx.write(byte)
        })
    }

    /// Block until the peer allows sending and the transmitter is free.
    /// Interrupts are enabled between attempts so a resume can arrive.
    pub fn transmit_byte(&self, byte: u8) -> Result<(), W::Error> {
        nb::block!(self.try_transmit(byte))
    }

    /// Oldest buffered byte. Sends a resume once the buffer has drained to
    /// the low watermark after a pause. If that resume fails the byte stays
    /// buffered and the error is returned.
    pub fn try_receive(&self) -> nb::Result<u8, W::Error> {
        critical_section::with(|cs| {
            let mut link = self.link.borrow_ref_mut(cs);
            if link.rx.is_empty() {
                return Err(nb::Error::WouldBlock);
            }
            let remaining = link.rx.len() - 1;
            link.resume_before_pop(remaining).map_err(nb::Error::Other)?;
            link.rx.pop().map_err(|_| nb::Error::WouldBlock)
        })
    }

    pub fn receive_decoded_byte(&self) -> Result<u8, W::Error> {
        nb::block!(self.try_receive())
    }

    /// Send an unconditional resume and clear the pause latch, so a peer left
    /// paused by an earlier run starts sending again.
    pub fn announce_ready(&self) -> Result<(), W::Error> {
        critical_section::with(|cs| {
            let mut link = self.link.borrow_ref_mut(cs);
            link.send_control(XON)?;
            link.pause_sent = false;
            Ok(())
        })
    }

    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.link.borrow_ref(cs).rx.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn permission(&self) -> FlowState {
        critical_section::with(|cs| self.link.borrow_ref(cs).permission)
    }

    /// Whether a pause is outstanding towards the peer.
    pub fn pause_sent(&self) -> bool {
        critical_section::with(|cs| self.link.borrow_ref(cs).pause_sent)
    }

    /// Bytes dropped because the receive buffer was full.
    pub fn dropped(&self) -> u16 {
        critical_section::with(|cs| self.link.borrow_ref(cs).dropped)
    }

    /// Return the transmitter, discarding any buffered input.
    pub fn free(self) -> W {
        self.link.into_inner().into_inner().tx
    }
}
