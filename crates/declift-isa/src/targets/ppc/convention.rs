//! PowerPC 64-bit ELF calling convention.

use declift_ir::{IntrinsicKind, Statement, Term};

use super::registers::{LR_LOCATION, fpr_location, gpr_location};
use crate::convention::CallingConvention;

/// Integer arguments in `r3`-`r10`, floating point in `f1`-`f13`, results
/// in `r3` or `f1`. `lr` holds the return address on entry.
#[must_use]
pub fn default_convention() -> CallingConvention {
    CallingConvention::builder("default", gpr_location(1))
        .first_argument_offset(0)
        .argument_alignment(64)
        .argument_group("int", (3..=10).map(gpr_location))
        .argument_group("float", (1..=13).map(fpr_location))
        .return_value(gpr_location(3))
        .return_value(fpr_location(1))
        .entry_statement(Statement::assign(
            Term::access(LR_LOCATION),
            Term::intrinsic(IntrinsicKind::ReturnAddress, 64),
        ))
        .build()
}
