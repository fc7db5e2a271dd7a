//! Core identifier types.

use std::fmt;

/// Target ID for PowerPC.
pub const TARGET_PPC: u8 = 0;
/// Target ID for the Cell SPU.
pub const TARGET_SPU: u8 = 1;

/// Opcode tag: target plus index within the target's opcode list.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct OpId {
    pub target: u8,
    pub idx: u16,
}

impl OpId {
    #[must_use]
    pub const fn new(target: u8, idx: u16) -> Self {
        Self { target, idx }
    }
}

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.target, self.idx)
    }
}

/// Register identifier within a target's register catalog.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct RegisterId(pub u32);

impl RegisterId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for RegisterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Branch condition decoded from a conditional branch.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Condition {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
    Ne,
    /// Summary overflow / unordered set.
    Un,
    /// Summary overflow / unordered clear.
    Nu,
}

impl Condition {
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Lt => "lt",
            Self::Le => "le",
            Self::Eq => "eq",
            Self::Ge => "ge",
            Self::Gt => "gt",
            Self::Ne => "ne",
            Self::Un => "un",
            Self::Nu => "nu",
        }
    }
}

/// Flag inside a condition field.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum FlagKind {
    Less,
    Greater,
    Equal,
    Overflow,
}

/// Target-specific decode flags.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct InstrFlags {
    /// Instruction also updates the default condition field.
    pub record: bool,
    /// Branch condition, for conditional branch forms.
    pub condition: Option<Condition>,
}
