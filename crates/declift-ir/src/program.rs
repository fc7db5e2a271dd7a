//! Program: the set of basic blocks built for one function.

use rustc_hash::FxHashMap;

use crate::block::{BasicBlock, BlockId};
use crate::error::IrError;
use crate::stmt::Statement;

/// Arena of basic blocks with address lookup.
///
/// A program has a single writer. Consecutive instructions that do not end
/// their block are appended to the same block.
#[derive(Clone, Debug, Default)]
pub struct Program {
    blocks: Vec<BasicBlock>,
    /// Blocks by start address.
    starts: FxHashMap<u64, BlockId>,
    /// Unsealed blocks by the end address of their last instruction.
    open_ends: FxHashMap<u64, BlockId>,
}

impl Program {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next created block will receive.
    #[must_use]
    pub const fn next_block_id(&self) -> BlockId {
        BlockId::new(self.blocks.len())
    }

    /// Create a block, or return the existing block starting at `address`.
    pub fn create_basic_block(&mut self, address: Option<u64>) -> BlockId {
        if let Some(addr) = address
            && let Some(&id) = self.starts.get(&addr)
        {
            return id;
        }
        let id = self.next_block_id();
        self.blocks.push(BasicBlock::new(id, address));
        if let Some(addr) = address {
            self.starts.insert(addr, id);
        }
        id
    }

    /// Block that receives the statements of the instruction at `address`.
    ///
    /// Returns the block starting at `address` if one exists, otherwise the
    /// unsealed block whose last instruction ends at `address`, otherwise a
    /// fresh block. The block's successor address becomes `end`.
    pub fn basic_block_for_instruction(&mut self, address: u64, end: u64) -> BlockId {
        let id = if let Some(&id) = self.starts.get(&address) {
            id
        } else if let Some(id) = self
            .open_ends
            .get(&address)
            .copied()
            .filter(|id| !self.blocks[id.index()].is_sealed())
        {
            id
        } else {
            self.create_basic_block(Some(address))
        };

        let block = &mut self.blocks[id.index()];
        if let Some(previous) = block.successor_address()
            && self.open_ends.get(&previous) == Some(&id)
        {
            self.open_ends.remove(&previous);
        }
        block.set_successor_address(end);
        self.open_ends.insert(end, id);
        id
    }

    /// Append a statement to a block.
    ///
    /// # Errors
    ///
    /// Fails if the block does not exist or is sealed.
    pub fn push(&mut self, block: BlockId, statement: Statement) -> Result<(), IrError> {
        self.blocks
            .get_mut(block.index())
            .ok_or(IrError::UnknownBlock(block))?
            .push(statement)
    }

    /// Insert statements at the start of a block.
    ///
    /// # Errors
    ///
    /// Fails if the block does not exist.
    pub fn prepend(
        &mut self,
        block: BlockId,
        statements: impl IntoIterator<Item = Statement>,
    ) -> Result<(), IrError> {
        self.blocks
            .get_mut(block.index())
            .ok_or(IrError::UnknownBlock(block))?
            .prepend(statements);
        Ok(())
    }

    #[must_use]
    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(id.index())
    }

    /// Block starting at `address`.
    #[must_use]
    pub fn block_at(&self, address: u64) -> Option<BlockId> {
        self.starts.get(&address).copied()
    }

    #[must_use]
    pub fn blocks(&self) -> &[BasicBlock] {
        &self.blocks
    }

    /// Total number of statements in all blocks.
    #[must_use]
    pub fn statement_count(&self) -> usize {
        self.blocks.iter().map(BasicBlock::len).sum()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
