//! Term IR.

use crate::location::{Domain, MemoryLocation};

/// Unary operations.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum UnaryOp {
    Not,
    Negation,
    SignExtend,
    ZeroExtend,
    Truncate,
}

/// Binary operations.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    SignedDiv,
    UnsignedDiv,
    SignedRem,
    UnsignedRem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    Sar,
    Equal,
    SignedLess,
    SignedLessOrEqual,
    UnsignedLess,
    UnsignedLessOrEqual,
}

impl BinaryOp {
    /// Comparisons yield a 1-bit result.
    #[must_use]
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Equal
                | Self::SignedLess
                | Self::SignedLessOrEqual
                | Self::UnsignedLess
                | Self::UnsignedLessOrEqual
        )
    }
}

/// Values supplied by the environment rather than computed by code.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum IntrinsicKind {
    /// Address the current function returns to.
    ReturnAddress,
    /// A value nothing is known about.
    Undefined,
}

/// Term tree node.
///
/// Every term carries its width in bits.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Term {
    Constant {
        value: u128,
        size: u32,
    },
    Access(MemoryLocation),
    Dereference {
        address: Box<Self>,
        domain: Domain,
        size: u32,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Self>,
        size: u32,
    },
    Binary {
        op: BinaryOp,
        left: Box<Self>,
        right: Box<Self>,
        size: u32,
    },
    Intrinsic {
        kind: IntrinsicKind,
        size: u32,
    },
}

/// Bit mask covering the low `size` bits.
#[must_use]
pub const fn bit_mask(size: u32) -> u128 {
    if size >= 128 {
        u128::MAX
    } else {
        (1u128 << size) - 1
    }
}

// These are factory methods, not trait implementations
#[allow(clippy::should_implement_trait)]
impl Term {
    /// Create a constant, truncated to `size` bits.
    #[must_use]
    pub const fn constant(value: u128, size: u32) -> Self {
        Self::Constant {
            value: value & bit_mask(size),
            size,
        }
    }

    /// Create a constant from a signed value, two's complement in `size` bits.
    #[must_use]
    pub const fn signed_constant(value: i64, size: u32) -> Self {
        Self::constant((value as i128).cast_unsigned(), size)
    }

    /// Read or write a storage location.
    #[must_use]
    pub const fn access(location: MemoryLocation) -> Self {
        Self::Access(location)
    }

    /// Memory access through a computed address.
    #[must_use]
    pub fn dereference(address: Self, domain: Domain, size: u32) -> Self {
        Self::Dereference {
            address: Box::new(address),
            domain,
            size,
        }
    }

    #[must_use]
    pub const fn intrinsic(kind: IntrinsicKind, size: u32) -> Self {
        Self::Intrinsic { kind, size }
    }

    fn unary(op: UnaryOp, operand: Self, size: u32) -> Self {
        Self::Unary {
            op,
            operand: Box::new(operand),
            size,
        }
    }

    fn binary(op: BinaryOp, left: Self, right: Self) -> Self {
        let size = if op.is_comparison() { 1 } else { left.size() };
        Self::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
            size,
        }
    }

    /// Width of the value in bits.
    #[must_use]
    pub const fn size(&self) -> u32 {
        match self {
            Self::Constant { size, .. }
            | Self::Dereference { size, .. }
            | Self::Unary { size, .. }
            | Self::Binary { size, .. }
            | Self::Intrinsic { size, .. } => *size,
            Self::Access(location) => location.size,
        }
    }

    /// Value of a constant term.
    #[must_use]
    pub const fn as_constant(&self) -> Option<u128> {
        match self {
            Self::Constant { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// Location of a storage access term.
    #[must_use]
    pub const fn as_location(&self) -> Option<&MemoryLocation> {
        match self {
            Self::Access(location) => Some(location),
            _ => None,
        }
    }

    // ===== Arithmetic =====

    pub fn add(left: Self, right: Self) -> Self {
        Self::binary(BinaryOp::Add, left, right)
    }

    pub fn sub(left: Self, right: Self) -> Self {
        Self::binary(BinaryOp::Sub, left, right)
    }

    pub fn mul(left: Self, right: Self) -> Self {
        Self::binary(BinaryOp::Mul, left, right)
    }

    pub fn signed_div(left: Self, right: Self) -> Self {
        Self::binary(BinaryOp::SignedDiv, left, right)
    }

    pub fn unsigned_div(left: Self, right: Self) -> Self {
        Self::binary(BinaryOp::UnsignedDiv, left, right)
    }

    pub fn signed_rem(left: Self, right: Self) -> Self {
        Self::binary(BinaryOp::SignedRem, left, right)
    }

    pub fn unsigned_rem(left: Self, right: Self) -> Self {
        Self::binary(BinaryOp::UnsignedRem, left, right)
    }

    pub fn neg(value: Self) -> Self {
        let size = value.size();
        Self::unary(UnaryOp::Negation, value, size)
    }

    // ===== Bitwise =====

    pub fn and(left: Self, right: Self) -> Self {
        Self::binary(BinaryOp::And, left, right)
    }

    pub fn or(left: Self, right: Self) -> Self {
        Self::binary(BinaryOp::Or, left, right)
    }

    pub fn xor(left: Self, right: Self) -> Self {
        Self::binary(BinaryOp::Xor, left, right)
    }

    pub fn not(value: Self) -> Self {
        let size = value.size();
        Self::unary(UnaryOp::Not, value, size)
    }

    pub fn shl(left: Self, right: Self) -> Self {
        Self::binary(BinaryOp::Shl, left, right)
    }

    /// Logical shift right.
    pub fn shr(left: Self, right: Self) -> Self {
        Self::binary(BinaryOp::Shr, left, right)
    }

    /// Arithmetic shift right.
    pub fn sar(left: Self, right: Self) -> Self {
        Self::binary(BinaryOp::Sar, left, right)
    }

    // ===== Relational =====

    pub fn equal(left: Self, right: Self) -> Self {
        Self::binary(BinaryOp::Equal, left, right)
    }

    pub fn not_equal(left: Self, right: Self) -> Self {
        Self::not(Self::equal(left, right))
    }

    pub fn signed_less(left: Self, right: Self) -> Self {
        Self::binary(BinaryOp::SignedLess, left, right)
    }

    pub fn signed_less_or_equal(left: Self, right: Self) -> Self {
        Self::binary(BinaryOp::SignedLessOrEqual, left, right)
    }

    pub fn signed_greater(left: Self, right: Self) -> Self {
        Self::signed_less(right, left)
    }

    pub fn unsigned_less(left: Self, right: Self) -> Self {
        Self::binary(BinaryOp::UnsignedLess, left, right)
    }

    pub fn unsigned_less_or_equal(left: Self, right: Self) -> Self {
        Self::binary(BinaryOp::UnsignedLessOrEqual, left, right)
    }

    pub fn unsigned_greater(left: Self, right: Self) -> Self {
        Self::unsigned_less(right, left)
    }

    // ===== Width changes =====

    pub fn sign_extend(value: Self, size: u32) -> Self {
        Self::unary(UnaryOp::SignExtend, value, size)
    }

    pub fn zero_extend(value: Self, size: u32) -> Self {
        Self::unary(UnaryOp::ZeroExtend, value, size)
    }

    pub fn truncate(value: Self, size: u32) -> Self {
        Self::unary(UnaryOp::Truncate, value, size)
    }

    /// Resize to `size`, extending with zeros or truncating as needed.
    pub fn resize_unsigned(value: Self, size: u32) -> Self {
        match value.size().cmp(&size) {
            std::cmp::Ordering::Less => Self::zero_extend(value, size),
            std::cmp::Ordering::Equal => value,
            std::cmp::Ordering::Greater => Self::truncate(value, size),
        }
    }

    /// Resize to `size`, extending the sign bit or truncating as needed.
    pub fn resize_signed(value: Self, size: u32) -> Self {
        match value.size().cmp(&size) {
            std::cmp::Ordering::Less => Self::sign_extend(value, size),
            std::cmp::Ordering::Equal => value,
            std::cmp::Ordering::Greater => Self::truncate(value, size),
        }
    }
}

#[cfg(test)]
mod tests;
