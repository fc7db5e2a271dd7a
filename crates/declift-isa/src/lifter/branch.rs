//! Conditional branch combinator.
//!
//! Condition-field branches all reduce to one or two flag tests. Single-flag
//! conditions jump directly; `le` and `ge` need two tests and route through
//! one auxiliary block:
//!
//! ```text
//! ble target:   if gt goto next else goto aux
//!          aux: goto target
//! ```

use declift_ir::{Jump, JumpTarget, Statement, Term};

use super::LiftContext;
use crate::error::{LiftError, Result};
use crate::types::{Condition, FlagKind, RegisterId};

/// Resolves a condition field index and flag to a 1-bit register.
pub type FlagLookup = fn(u8, FlagKind) -> Option<RegisterId>;

/// Branch to `target` if `condition` holds in condition field `field`,
/// otherwise fall through to the direct successor.
///
/// # Errors
///
/// `UnknownRegister` if `flags` cannot resolve the field.
pub fn branch_on_condition(
    ctx: &mut LiftContext<'_>,
    condition: Condition,
    field: u8,
    target: impl Into<JumpTarget>,
    flags: FlagLookup,
) -> Result<()> {
    let kind = match condition {
        Condition::Lt | Condition::Ge => FlagKind::Less,
        Condition::Gt | Condition::Le => FlagKind::Greater,
        Condition::Eq | Condition::Ne => FlagKind::Equal,
        Condition::Un | Condition::Nu => FlagKind::Overflow,
    };
    let reg = flags(field, kind).ok_or(LiftError::UnknownRegister(u32::from(field)))?;
    let flag = ctx.reg(reg)?;
    let target: JumpTarget = target.into();
    let next = JumpTarget::Block(ctx.direct_successor());

    let (test, then_target, else_target) = match condition {
        Condition::Lt | Condition::Gt | Condition::Eq | Condition::Un => (flag, target, next),
        Condition::Ne | Condition::Nu => (Term::not(flag), target, next),
        Condition::Le | Condition::Ge => {
            let aux = ctx.aux_block();
            ctx.emit_into(aux, Statement::jump(Jump::to(target)))?;
            (flag, next, JumpTarget::Block(aux))
        }
    };
    ctx.jump(Jump::conditional(test, then_target, else_target))
}

/// Branch to `target` if `test` holds, otherwise fall through.
///
/// # Errors
///
/// See [`LiftContext::emit`].
pub fn branch_if(
    ctx: &mut LiftContext<'_>,
    test: Term,
    target: impl Into<JumpTarget>,
) -> Result<()> {
    let next = ctx.direct_successor();
    ctx.jump(Jump::conditional(test, target, next))
}
