use declift_ir::IrError;
use thiserror::Error;

/// Decoding and lifting errors.
///
/// Every variant is local to one instruction. Misalignment and truncation
/// stop the decoder at that address; everything else downgrades the
/// instruction to an opaque effect.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LiftError {
    #[error("unknown register {0}")]
    UnknownRegister(u32),
    #[error("unrecognized opcode 0x{word:08x} at 0x{address:x}")]
    UnrecognizedOpcode { address: u64, word: u32 },
    #[error("instruction has no operand {0}")]
    MissingOperand(usize),
    #[error("operand {index} is not {expected}")]
    UnexpectedOperand {
        index: usize,
        expected: &'static str,
    },
    #[error("address 0x{address:x} is not aligned to {width} bytes")]
    MisalignedInstruction { address: u64, width: usize },
    #[error("need {needed} bytes at 0x{address:x}, only {available} available")]
    Truncated {
        address: u64,
        needed: usize,
        available: usize,
    },
    #[error("IR error: {0}")]
    Ir(#[from] IrError),
}

impl LiftError {
    /// True if the decoder cannot continue at this address.
    #[must_use]
    pub const fn needs_resync(&self) -> bool {
        matches!(
            self,
            Self::MisalignedInstruction { .. } | Self::Truncated { .. }
        )
    }

    /// True if the error points at a defect in a lifting rule.
    #[must_use]
    pub const fn is_rule_defect(&self) -> bool {
        matches!(
            self,
            Self::MissingOperand(_) | Self::UnexpectedOperand { .. }
        )
    }

    /// Short label used for metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UnknownRegister(_) => "unknown_register",
            Self::UnrecognizedOpcode { .. } => "unrecognized_opcode",
            Self::MissingOperand(_) => "missing_operand",
            Self::UnexpectedOperand { .. } => "unexpected_operand",
            Self::MisalignedInstruction { .. } => "misaligned",
            Self::Truncated { .. } => "truncated",
            Self::Ir(_) => "ir",
        }
    }
}

pub type Result<T> = std::result::Result<T, LiftError>;
