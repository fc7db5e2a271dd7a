//! Intermediate representation for the declift lifter.
//!
//! This crate provides pure IR types with no architecture-specific knowledge.
//! Instruction decoding and lifting live in `declift-isa`.

mod block;
mod display;
mod error;
mod location;
mod program;
mod stmt;
mod term;

pub use block::*;
pub use display::*;
pub use error::*;
pub use location::*;
pub use program::*;
pub use stmt::*;
pub use term::*;
