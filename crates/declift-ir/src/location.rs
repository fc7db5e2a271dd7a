//! Storage locations.

use std::fmt;

/// Address space a storage location lives in.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub enum Domain {
    Register,
    Memory,
    Stack,
}

impl Domain {
    const fn prefix(self) -> &'static str {
        match self {
            Self::Register => "reg",
            Self::Memory => "mem",
            Self::Stack => "stack",
        }
    }
}

/// Byte order of a domain.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum ByteOrder {
    #[default]
    Little,
    Big,
}

impl ByteOrder {
    /// Read a 32-bit word in this byte order.
    #[must_use]
    pub const fn read_u32(self, bytes: [u8; 4]) -> u32 {
        match self {
            Self::Little => u32::from_le_bytes(bytes),
            Self::Big => u32::from_be_bytes(bytes),
        }
    }
}

/// A sized bit range inside a domain.
///
/// Offsets and sizes are in bits. Stack offsets may be negative.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct MemoryLocation {
    pub domain: Domain,
    pub addr: i64,
    pub size: u32,
}

impl MemoryLocation {
    #[must_use]
    pub const fn new(domain: Domain, addr: i64, size: u32) -> Self {
        Self { domain, addr, size }
    }

    #[must_use]
    pub const fn register(addr: i64, size: u32) -> Self {
        Self::new(Domain::Register, addr, size)
    }

    #[must_use]
    pub const fn stack(addr: i64, size: u32) -> Self {
        Self::new(Domain::Stack, addr, size)
    }

    /// First bit past the end of the location, `None` if it does not fit
    /// in an `i64`.
    #[must_use]
    pub const fn end_addr(&self) -> Option<i64> {
        self.addr.checked_add(self.size as i64)
    }

    const fn end_bit(&self) -> i128 {
        self.addr as i128 + self.size as i128
    }

    /// True if both locations share at least one bit.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.domain as u8 == other.domain as u8
            && (self.addr as i128) < other.end_bit()
            && (other.addr as i128) < self.end_bit()
    }

    /// True if `other` lies entirely inside `self`.
    #[must_use]
    pub const fn covers(&self, other: &Self) -> bool {
        self.domain as u8 == other.domain as u8
            && self.addr <= other.addr
            && other.end_bit() <= self.end_bit()
    }

    /// Same start, different width.
    #[must_use]
    pub const fn resized(&self, size: u32) -> Self {
        Self::new(self.domain, self.addr, size)
    }

    /// Same width, start moved by `delta` bits.
    #[must_use]
    pub const fn shifted(&self, delta: i64) -> Self {
        Self::new(self.domain, self.addr + delta, self.size)
    }
}

impl fmt::Display for MemoryLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}:{}]", self.domain.prefix(), self.addr, self.size)
    }
}
