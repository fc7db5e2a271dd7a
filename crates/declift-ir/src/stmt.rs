//! Statement IR.

use crate::block::BlockId;
use crate::term::Term;

/// Where a jump transfers control.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum JumpTarget {
    /// Address computed by a term (constant or indirect).
    Address(Term),
    /// A block of the same program.
    Block(BlockId),
}

impl JumpTarget {
    #[must_use]
    pub const fn as_block(&self) -> Option<BlockId> {
        match self {
            Self::Block(id) => Some(*id),
            Self::Address(_) => None,
        }
    }

    #[must_use]
    pub const fn as_address(&self) -> Option<&Term> {
        match self {
            Self::Address(term) => Some(term),
            Self::Block(_) => None,
        }
    }
}

impl From<BlockId> for JumpTarget {
    fn from(id: BlockId) -> Self {
        Self::Block(id)
    }
}

impl From<Term> for JumpTarget {
    fn from(term: Term) -> Self {
        Self::Address(term)
    }
}

/// Conditional or unconditional transfer of control.
///
/// `else_target` is only present for conditional jumps.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Jump {
    pub condition: Option<Term>,
    pub then_target: JumpTarget,
    pub else_target: Option<JumpTarget>,
}

impl Jump {
    /// Create an unconditional jump.
    pub fn to(target: impl Into<JumpTarget>) -> Self {
        Self {
            condition: None,
            then_target: target.into(),
            else_target: None,
        }
    }

    /// Create a two-way conditional jump.
    pub fn conditional(
        condition: Term,
        then_target: impl Into<JumpTarget>,
        else_target: impl Into<JumpTarget>,
    ) -> Self {
        Self {
            condition: Some(condition),
            then_target: then_target.into(),
            else_target: Some(else_target.into()),
        }
    }

    #[must_use]
    pub const fn is_conditional(&self) -> bool {
        self.condition.is_some()
    }
}

/// Statement kinds.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Statement {
    /// `left := right`.
    Assignment { left: Term, right: Term },
    Jump(Jump),
    /// Call a function; control continues after the call.
    Call { target: Term },
    Return,
    /// Effect of the instruction is unknown.
    OpaqueEffect,
}

impl Statement {
    #[must_use]
    pub const fn assign(left: Term, right: Term) -> Self {
        Self::Assignment { left, right }
    }

    #[must_use]
    pub const fn jump(jump: Jump) -> Self {
        Self::Jump(jump)
    }

    #[must_use]
    pub const fn call(target: Term) -> Self {
        Self::Call { target }
    }

    /// Terminal statements end their basic block.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Jump(_) | Self::Return)
    }

    #[must_use]
    pub const fn as_jump(&self) -> Option<&Jump> {
        match self {
            Self::Jump(jump) => Some(jump),
            _ => None,
        }
    }
}
