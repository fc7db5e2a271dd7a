//! Supported targets.

pub mod ppc;
pub mod spu;
