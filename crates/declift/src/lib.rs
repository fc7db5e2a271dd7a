//! declift - lift PowerPC and SPU machine code into a decompiler IR.
//!
//! # Example
//!
//! ```ignore
//! use declift::{ArchKind, FunctionInput, LiftConfig, Lifter};
//!
//! let lifter = Lifter::new(LiftConfig::new(ArchKind::PpcBe))?;
//! let function = lifter.lift_function(&FunctionInput::new(0x1000, &bytes))?;
//! println!("{}", function.render(lifter.arch()));
//! ```

pub use declift_ir::{BlockId, ByteOrder, Program, Statement, Term};
pub use declift_isa::{Architecture, CallingConvention, LiftError, RegisterCatalog};

mod config;
mod error;
pub mod metrics;
mod pipeline;

pub use config::*;
pub use error::*;
pub use pipeline::*;
