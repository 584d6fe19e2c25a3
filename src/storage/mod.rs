//! Start-time byte kept in non-volatile storage

/// Byte-addressed persistent memory.
pub trait ByteStorage {
    type Error;

    fn read_byte(&mut self, addr: u16) -> Result<u8, Self::Error>;
    fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), Self::Error>;
}

impl<T: ByteStorage + ?Sized> ByteStorage for &mut T {
    type Error = T::Error;

    fn read_byte(&mut self, addr: u16) -> Result<u8, Self::Error> {
        (**self).read_byte(addr)
    }

    fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), Self::Error> {
        (**self).write_byte(addr, value)
    }
}

/// Invert the low three bits and clear the rest. Maps between the value a
/// user types (0..=7) and the pattern driven onto the counter LEDs.
#[inline]
pub const fn flip_low3(value: u8) -> u8 {
    !value & 0x07
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Migration {
    /// The factory value was found and rewritten to this value.
    Applied(u8),
    /// Nothing to do.
    AlreadyDone,
}

/// One configuration byte at a fixed address.
pub struct PersistedConfig<S> {
    storage: S,
    addr: u16,
    factory_default: u8,
}

impl<S: ByteStorage> PersistedConfig<S> {
    pub fn new(storage: S, addr: u16, factory_default: u8) -> Self {
        Self {
            storage,
            addr,
            factory_default,
        }
    }

    pub fn read_config(&mut self) -> Result<u8, S::Error> {
        self.storage.read_byte(self.addr)
    }

    pub fn write_config(&mut self, value: u8) -> Result<(), S::Error> {
        if self.read_config()? == value {
            return Ok(());
        }
        self.storage.write_byte(self.addr, value)
    }

    /// First-boot conversion of the factory value into LED space.
    ///
    /// The stored byte is compared with the factory value, so once migrated a
    /// second boot is a no-op. A later user setting that happens to equal the
    /// factory value is converted again on the next boot.
    pub fn migrate(&mut self) -> Result<Migration, S::Error> {
        let stored = self.read_config()?;
        if stored != self.factory_default {
            return Ok(Migration::AlreadyDone);
        }
        let migrated = flip_low3(stored);
        self.storage.write_byte(self.addr, migrated)?;
        Ok(Migration::Applied(migrated))
    }

    pub fn free(self) -> S {
        self.storage
    }
}
