use thiserror::Error;

use crate::block::BlockId;

/// Errors raised while building a program.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IrError {
    #[error("basic block {block} is sealed by a terminal statement")]
    BlockSealed { block: BlockId },
    #[error("no basic block with id {0}")]
    UnknownBlock(BlockId),
}
