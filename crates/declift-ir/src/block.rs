//! Basic block IR.

use std::fmt;

use crate::error::IrError;
use crate::stmt::Statement;

/// Index of a basic block inside its program.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct BlockId(usize);

impl BlockId {
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

/// IR for a basic block (sequence of statements).
#[derive(Clone, Debug)]
pub struct BasicBlock {
    id: BlockId,
    /// Start address, or `None` for synthesized blocks.
    address: Option<u64>,
    /// End address of the last instruction lifted into the block.
    successor_address: Option<u64>,
    statements: Vec<Statement>,
}

impl BasicBlock {
    pub(crate) const fn new(id: BlockId, address: Option<u64>) -> Self {
        Self {
            id,
            address,
            successor_address: None,
            statements: Vec::new(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> BlockId {
        self.id
    }

    #[must_use]
    pub const fn address(&self) -> Option<u64> {
        self.address
    }

    #[must_use]
    pub const fn successor_address(&self) -> Option<u64> {
        self.successor_address
    }

    pub(crate) const fn set_successor_address(&mut self, address: u64) {
        self.successor_address = Some(address);
    }

    #[must_use]
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// The terminal statement, if the block is sealed.
    #[must_use]
    pub fn terminator(&self) -> Option<&Statement> {
        self.statements.last().filter(|s| s.is_terminal())
    }

    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.terminator().is_some()
    }

    /// Append a statement.
    ///
    /// # Errors
    ///
    /// Fails if a terminal statement was already appended.
    pub fn push(&mut self, statement: Statement) -> Result<(), IrError> {
        if self.is_sealed() {
            return Err(IrError::BlockSealed { block: self.id });
        }
        self.statements.push(statement);
        Ok(())
    }

    /// Insert statements before everything else in the block.
    pub(crate) fn prepend(&mut self, statements: impl IntoIterator<Item = Statement>) {
        let tail = std::mem::take(&mut self.statements);
        self.statements.extend(statements);
        self.statements.extend(tail);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}
