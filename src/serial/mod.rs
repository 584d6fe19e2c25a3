//! Interrupt-fed serial link with XON/XOFF flow control

pub mod flow;
pub mod ring_buffer;

pub use flow::{FlowChannel, FlowState, WatermarkError, Watermarks, XOFF, XON};
pub use ring_buffer::{BufferFull, RingBuffer};

/// Outcome of handling a received byte.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SerialError<E> {
    /// The receive buffer was full and the byte was dropped.
    BufferFull(u8),
    /// Sending a flow-control signal failed.
    Transmit(E),
}
