use core::convert::Infallible;

/// Push was rejected because the buffer is full. Carries the dropped byte.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BufferFull(pub u8);

/// Fixed-capacity byte FIFO.
///
/// A full buffer rejects new bytes and keeps the oldest ones. Not
/// synchronised on its own; the owner serialises access.
pub struct RingBuffer<const C: usize> {
    data: [u8; C],
    head: usize,
    tail: usize,
    count: usize,
}

impl<const C: usize> RingBuffer<C> {
    pub const fn new() -> Self {
        Self {
            data: [0; C],
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    pub fn push(&mut self, byte: u8) -> Result<(), BufferFull> {
        if self.is_full() {
            return Err(BufferFull(byte));
        }
        self.data[self.head] = byte;
        self.head = (self.head + 1) % C;
        self.count += 1;
        Ok(())
    }

    /// Oldest byte, or `WouldBlock` while empty. Use `nb::block!` for the
    /// blocking form.
    pub fn pop(&mut self) -> nb::Result<u8, Infallible> {
        if self.is_empty() {
            return Err(nb::Error::WouldBlock);
        }
        let byte = self.data[self.tail];
        self.tail = (self.tail + 1) % C;
        self.count -= 1;
        Ok(byte)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.count == C
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        C
    }
}

impl<const C: usize> Default for RingBuffer<C> {
    fn default() -> Self {
        Self::new()
    }
}
