//! SPU ABI calling convention.

use declift_ir::{IntrinsicKind, Statement, Term};

use super::WORD_SIZE;
use super::registers::gpr_location;
use crate::convention::CallingConvention;

/// Arguments in `r3`-`r15`, result in `r3`, stack pointer `r1`. The link
/// register `r0` holds the return address on entry.
#[must_use]
pub fn default_convention() -> CallingConvention {
    CallingConvention::builder("default", gpr_location(1))
        .first_argument_offset(0)
        .argument_alignment(i64::from(WORD_SIZE))
        .argument_group("int", (3..=15).map(gpr_location))
        .return_value(gpr_location(3))
        .entry_statement(Statement::assign(
            Term::access(gpr_location(0)),
            Term::intrinsic(IntrinsicKind::ReturnAddress, WORD_SIZE),
        ))
        .build()
}
