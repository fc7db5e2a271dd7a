//! Instruction lifting core.
//!
//! Turns one machine instruction into IR statements. Each target under
//! `targets/` supplies a register catalog, an operand decoder, a lifting
//! rule table and its calling conventions; the shared machinery lives in
//! the modules below.

mod arch;
mod bitfield;
mod convention;
mod decoder;
mod error;
mod instruction;
pub mod lifter;
mod registers;
pub mod targets;
mod types;

pub use arch::*;
pub use bitfield::*;
pub use convention::*;
pub use decoder::*;
pub use error::*;
pub use instruction::*;
pub use lifter::{InstructionLifter, LiftContext, LiftReport, Rule, RuleFn, RuleTable, lift_undecoded};
pub use registers::*;
pub use types::*;
