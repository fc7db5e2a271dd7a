//! PowerPC lifting rules.
//!
//! Operand layout follows the decoder: destination first, then sources.
//! Record forms (`add.`, `andi.`, ...) additionally compare the result with
//! zero into `cr0`.

use declift_ir::{Domain, Term};

use super::registers::{CTR, LR, cr_flag, field_of};
use super::*;
use crate::error::{LiftError, Result};
use crate::instruction::Operand;
use crate::lifter::{LiftContext, Rule, RuleTable, branch_if, branch_on_condition};
use crate::types::{Condition, FlagKind, RegisterId};

/// Lifting rules for every opcode in [`ALL_OPS`].
#[must_use]
pub fn rules() -> RuleTable {
    RuleTable::new()
        // Branches
        .lift(OP_B, goto_target)
        .lift(OP_BA, goto_target)
        .lift(OP_BL, call_target)
        .lift(OP_BLA, call_target)
        .lift(OP_BC, lift_bc)
        .lift(OP_BDNZ, |ctx| lift_decrement_branch(ctx, false))
        .lift(OP_BDZ, |ctx| lift_decrement_branch(ctx, true))
        .lift(OP_BLR, |ctx| goto_register(ctx, LR))
        .lift(OP_BCLR, |ctx| branch_to_register(ctx, LR))
        .lift(OP_BCTR, |ctx| goto_register(ctx, CTR))
        .lift(OP_BCTRL, lift_bctrl)
        .lift(OP_BCCTR, |ctx| branch_to_register(ctx, CTR))
        // Compares
        .lift(OP_CMPW, |ctx| lift_compare(ctx, true, 32))
        .lift(OP_CMPWI, |ctx| lift_compare(ctx, true, 32))
        .lift(OP_CMPD, |ctx| lift_compare(ctx, true, 64))
        .lift(OP_CMPDI, |ctx| lift_compare(ctx, true, 64))
        .lift(OP_CMPLW, |ctx| lift_compare(ctx, false, 32))
        .lift(OP_CMPLWI, |ctx| lift_compare(ctx, false, 32))
        .lift(OP_CMPLD, |ctx| lift_compare(ctx, false, 64))
        .lift(OP_CMPLDI, |ctx| lift_compare(ctx, false, 64))
        // Arithmetic
        .lift(OP_ADD, |ctx| binary(ctx, Term::add))
        .lift(OP_ADDI, |ctx| binary(ctx, Term::add))
        .lift(OP_ADDC, |ctx| with_carry(ctx, Term::add))
        .lift(OP_LI, copy)
        .lift(OP_ADDIS, lift_addis)
        .lift(OP_LIS, lift_lis)
        .lift(OP_SUBF, |ctx| binary(ctx, subtract_from))
        .lift(OP_SUBFC, |ctx| with_carry(ctx, subtract_from))
        .lift(OP_SUBFIC, |ctx| with_carry(ctx, subtract_from))
        .lift(OP_NEG, |ctx| unary(ctx, Term::neg))
        .lift(OP_MULLI, |ctx| binary(ctx, Term::mul))
        .lift(OP_MULLD, |ctx| binary(ctx, Term::mul))
        .lift(OP_MULLW, |ctx| binary(ctx, multiply_words))
        .lift(OP_DIVD, |ctx| binary(ctx, Term::signed_div))
        .lift(OP_DIVDU, |ctx| binary(ctx, Term::unsigned_div))
        .lift(OP_DIVW, |ctx| binary(ctx, divide_words))
        .lift(OP_DIVWU, |ctx| binary(ctx, divide_words_unsigned))
        // Logical
        .lift(OP_AND, |ctx| binary(ctx, Term::and))
        .lift(OP_ANDC, |ctx| binary(ctx, |a, b| Term::and(a, Term::not(b))))
        .lift(OP_OR, |ctx| binary(ctx, Term::or))
        .lift(OP_XOR, |ctx| binary(ctx, Term::xor))
        .lift(OP_NAND, |ctx| binary(ctx, |a, b| Term::not(Term::and(a, b))))
        .lift(OP_NOR, |ctx| binary(ctx, |a, b| Term::not(Term::or(a, b))))
        .lift(OP_MR, copy)
        .lift(OP_ANDI, |ctx| binary(ctx, Term::and))
        .lift(OP_ORI, |ctx| binary(ctx, Term::or))
        .lift(OP_XORI, |ctx| binary(ctx, Term::xor))
        .lift(OP_ANDIS, |ctx| shifted_immediate(ctx, Term::and))
        .lift(OP_ORIS, |ctx| shifted_immediate(ctx, Term::or))
        .lift(OP_XORIS, |ctx| shifted_immediate(ctx, Term::xor))
        .with(&[OP_NOP, OP_DCBT], Rule::Nop)
        // Shifts, rotates, sign extension
        .lift(OP_SLW, |ctx| shift_word(ctx, Term::shl))
        .lift(OP_SRW, |ctx| shift_word(ctx, Term::shr))
        .lift(OP_SLD, |ctx| shift_double(ctx, Term::shl))
        .lift(OP_SRD, |ctx| shift_double(ctx, Term::shr))
        .lift(OP_SRAW, lift_sraw)
        .lift(OP_SRAD, lift_srad)
        .lift(OP_SRAWI, lift_srawi)
        .lift(OP_SRADI, lift_sradi)
        .lift(OP_EXTSB, |ctx| extend_signed(ctx, 8))
        .lift(OP_EXTSH, |ctx| extend_signed(ctx, 16))
        .lift(OP_EXTSW, |ctx| extend_signed(ctx, 32))
        .lift(OP_RLWINM, lift_rlwinm)
        .lift(OP_RLDICL, |ctx| rotate_double_masked(ctx, clear_left))
        .lift(OP_RLDICR, |ctx| rotate_double_masked(ctx, clear_right))
        // Special purpose registers
        .lift(OP_MTLR, |ctx| move_to(ctx, LR))
        .lift(OP_MFLR, |ctx| move_from(ctx, LR))
        .lift(OP_MTCTR, |ctx| move_to(ctx, CTR))
        .lift(OP_MFCTR, |ctx| move_from(ctx, CTR))
        .lift(OP_MFSPR, copy)
        .lift(OP_MTSPR, copy)
        // Loads and stores
        .lift(OP_LBZ, |ctx| load(ctx, false))
        .lift(OP_LHZ, |ctx| load(ctx, false))
        .lift(OP_LWZ, |ctx| load(ctx, false))
        .lift(OP_LD, |ctx| load(ctx, false))
        .lift(OP_LHA, |ctx| load(ctx, true))
        .lift(OP_LWA, |ctx| load(ctx, true))
        .lift(OP_STB, store)
        .lift(OP_STH, store)
        .lift(OP_STW, store)
        .lift(OP_STD, store)
        .lift(OP_LWZU, |ctx| with_update(ctx, |ctx| load(ctx, false)))
        .lift(OP_LDU, |ctx| with_update(ctx, |ctx| load(ctx, false)))
        .lift(OP_STWU, |ctx| with_update(ctx, store))
        .lift(OP_STDU, |ctx| with_update(ctx, store))
        .lift(OP_LBZX, |ctx| load_indexed(ctx, 8))
        .lift(OP_LWZX, |ctx| load_indexed(ctx, 32))
        .lift(OP_LDX, |ctx| load_indexed(ctx, 64))
        .lift(OP_STWX, |ctx| store_indexed(ctx, 32))
        .lift(OP_STDX, |ctx| store_indexed(ctx, 64))
        // System
        .with(&[OP_SYNC, OP_ISYNC, OP_SC, OP_TRAP], Rule::Opaque)
}

// === Helpers ===

fn flag(field: u8, kind: FlagKind) -> Result<RegisterId> {
    cr_flag(field, kind).ok_or(LiftError::UnknownRegister(u32::from(field)))
}

fn field_operand(ctx: &LiftContext<'_>, index: usize) -> Result<u8> {
    field_of(ctx.register_operand(index)?).ok_or(LiftError::UnexpectedOperand {
        index,
        expected: "a condition field",
    })
}

/// Immediate operand that must fit `0..limit`.
fn small_immediate(ctx: &LiftContext<'_>, index: usize, limit: u32) -> Result<u32> {
    u32::try_from(ctx.immediate(index)?)
        .ok()
        .filter(|&v| v < limit)
        .ok_or(LiftError::UnexpectedOperand {
            index,
            expected: "an in-range immediate",
        })
}

/// Set `lt`, `gt` and `eq` of `field` from comparing `left` with `right`.
fn set_compare_flags(
    ctx: &mut LiftContext<'_>,
    field: u8,
    left: Term,
    right: Term,
    signed: bool,
) -> Result<()> {
    let (less, greater) = if signed {
        (
            Term::signed_less(left.clone(), right.clone()),
            Term::signed_greater(left.clone(), right.clone()),
        )
    } else {
        (
            Term::unsigned_less(left.clone(), right.clone()),
            Term::unsigned_greater(left.clone(), right.clone()),
        )
    };
    ctx.set(flag(field, FlagKind::Less)?, less)?;
    ctx.set(flag(field, FlagKind::Greater)?, greater)?;
    ctx.set(flag(field, FlagKind::Equal)?, Term::equal(left, right))
}

/// Record form: compare the new value of `dest` with zero into `cr0`.
fn record(ctx: &mut LiftContext<'_>, dest: RegisterId) -> Result<()> {
    if !ctx.flags().record {
        return Ok(());
    }
    let value = ctx.reg(dest)?;
    let zero = ctx.constant(0);
    set_compare_flags(ctx, 0, value, zero, true)
}

/// `op0 := value`, plus the record form update.
fn set_result(ctx: &mut LiftContext<'_>, value: Term) -> Result<()> {
    let dest = ctx.register_operand(0)?;
    ctx.set(dest, value)?;
    record(ctx, dest)
}

fn copy(ctx: &mut LiftContext<'_>) -> Result<()> {
    let value = ctx.operand_term(1)?;
    set_result(ctx, value)
}

fn unary(ctx: &mut LiftContext<'_>, op: fn(Term) -> Term) -> Result<()> {
    let value = op(ctx.operand_term(1)?);
    set_result(ctx, value)
}

fn binary(ctx: &mut LiftContext<'_>, op: fn(Term, Term) -> Term) -> Result<()> {
    let value = op(ctx.operand_term(1)?, ctx.operand_term(2)?);
    set_result(ctx, value)
}

/// Forms that also write `xer_ca`: the carry is not modelled.
fn with_carry(ctx: &mut LiftContext<'_>, op: fn(Term, Term) -> Term) -> Result<()> {
    binary(ctx, op)?;
    ctx.opaque()
}

/// `subf rt, ra, rb` is `rb - ra`.
fn subtract_from(ra: Term, rb: Term) -> Term {
    Term::sub(rb, ra)
}

fn multiply_words(a: Term, b: Term) -> Term {
    Term::mul(
        Term::sign_extend(Term::truncate(a, 32), 64),
        Term::sign_extend(Term::truncate(b, 32), 64),
    )
}

fn divide_words(a: Term, b: Term) -> Term {
    Term::sign_extend(
        Term::signed_div(Term::truncate(a, 32), Term::truncate(b, 32)),
        64,
    )
}

fn divide_words_unsigned(a: Term, b: Term) -> Term {
    Term::zero_extend(
        Term::unsigned_div(Term::truncate(a, 32), Term::truncate(b, 32)),
        64,
    )
}

fn lift_addis(ctx: &mut LiftContext<'_>) -> Result<()> {
    let high = ctx.constant(ctx.immediate(2)? << 16);
    let value = Term::add(ctx.operand_term(1)?, high);
    set_result(ctx, value)
}

fn lift_lis(ctx: &mut LiftContext<'_>) -> Result<()> {
    let value = ctx.constant(ctx.immediate(1)? << 16);
    set_result(ctx, value)
}

/// `andis.`/`oris`/`xoris`: the immediate applies to bits 16-31.
fn shifted_immediate(ctx: &mut LiftContext<'_>, op: fn(Term, Term) -> Term) -> Result<()> {
    let high = ctx.constant(ctx.immediate(2)? << 16);
    let value = op(ctx.operand_term(1)?, high);
    set_result(ctx, value)
}

// === Shifts and rotates ===

fn shift_word(ctx: &mut LiftContext<'_>, op: fn(Term, Term) -> Term) -> Result<()> {
    let value = Term::truncate(ctx.operand_term(1)?, 32);
    let amount = Term::and(
        Term::truncate(ctx.operand_term(2)?, 32),
        Term::constant(0x3f, 32),
    );
    set_result(ctx, Term::zero_extend(op(value, amount), 64))
}

fn shift_double(ctx: &mut LiftContext<'_>, op: fn(Term, Term) -> Term) -> Result<()> {
    let value = ctx.operand_term(1)?;
    let amount = Term::and(ctx.operand_term(2)?, ctx.constant(0x7f));
    set_result(ctx, op(value, amount))
}

// Algebraic shifts also write xer_ca.

fn lift_sraw(ctx: &mut LiftContext<'_>) -> Result<()> {
    let value = Term::truncate(ctx.operand_term(1)?, 32);
    let amount = Term::and(
        Term::truncate(ctx.operand_term(2)?, 32),
        Term::constant(0x3f, 32),
    );
    set_result(ctx, Term::sign_extend(Term::sar(value, amount), 64))?;
    ctx.opaque()
}

fn lift_srad(ctx: &mut LiftContext<'_>) -> Result<()> {
    let amount = Term::and(ctx.operand_term(2)?, ctx.constant(0x7f));
    let value = Term::sar(ctx.operand_term(1)?, amount);
    set_result(ctx, value)?;
    ctx.opaque()
}

fn lift_srawi(ctx: &mut LiftContext<'_>) -> Result<()> {
    let shift = small_immediate(ctx, 2, 32)?;
    let value = Term::sar(
        Term::truncate(ctx.operand_term(1)?, 32),
        Term::constant(u128::from(shift), 32),
    );
    set_result(ctx, Term::sign_extend(value, 64))?;
    ctx.opaque()
}

fn lift_sradi(ctx: &mut LiftContext<'_>) -> Result<()> {
    let shift = small_immediate(ctx, 2, 64)?;
    let value = Term::sar(ctx.operand_term(1)?, ctx.constant(i64::from(shift)));
    set_result(ctx, value)?;
    ctx.opaque()
}

fn extend_signed(ctx: &mut LiftContext<'_>, bits: u32) -> Result<()> {
    let value = Term::sign_extend(Term::truncate(ctx.operand_term(1)?, bits), 64);
    set_result(ctx, value)
}

/// Rotate a `width`-bit term left by a constant amount.
fn rotate_left(value: Term, amount: u32, width: u32) -> Term {
    if amount == 0 {
        return value;
    }
    Term::or(
        Term::shl(value.clone(), Term::constant(u128::from(amount), width)),
        Term::shr(value, Term::constant(u128::from(width - amount), width)),
    )
}

/// 32-bit mask with ones from big-endian bit `mb` through `me`, wrapping
/// around when `mb > me`.
pub(crate) const fn mask32(mb: u32, me: u32) -> u32 {
    let from_mb = u32::MAX >> mb;
    let to_me = u32::MAX << (31 - me);
    if mb <= me {
        from_mb & to_me
    } else {
        from_mb | to_me
    }
}

fn lift_rlwinm(ctx: &mut LiftContext<'_>) -> Result<()> {
    let shift = small_immediate(ctx, 2, 32)?;
    let mb = small_immediate(ctx, 3, 32)?;
    let me = small_immediate(ctx, 4, 32)?;
    let rotated = rotate_left(Term::truncate(ctx.operand_term(1)?, 32), shift, 32);
    let masked = Term::and(rotated, Term::constant(u128::from(mask32(mb, me)), 32));
    set_result(ctx, Term::zero_extend(masked, 64))
}

const fn clear_left(mb: u32) -> u64 {
    u64::MAX >> mb
}

const fn clear_right(me: u32) -> u64 {
    u64::MAX << (63 - me)
}

fn rotate_double_masked(ctx: &mut LiftContext<'_>, mask: fn(u32) -> u64) -> Result<()> {
    let shift = small_immediate(ctx, 2, 64)?;
    let bound = small_immediate(ctx, 3, 64)?;
    let rotated = rotate_left(ctx.operand_term(1)?, shift, 64);
    let value = Term::and(rotated, Term::constant(u128::from(mask(bound)), 64));
    set_result(ctx, value)
}

// === Compares ===

/// `cmp[l][w|d][i] [crN,] ra, rb|imm`; the field defaults to `cr0`.
fn lift_compare(ctx: &mut LiftContext<'_>, signed: bool, width: u32) -> Result<()> {
    let (field, first) = if ctx.instr().operand_count() == 3 {
        (field_operand(ctx, 0)?, 1)
    } else {
        (0, 0)
    };
    let left = Term::resize_unsigned(ctx.operand_term(first)?, width);
    let right = Term::resize_unsigned(ctx.operand_term(first + 1)?, width);
    set_compare_flags(ctx, field, left, right, signed)
}

// === Branches ===

fn goto_target(ctx: &mut LiftContext<'_>) -> Result<()> {
    let target = ctx.address_term(0)?;
    ctx.goto(target)
}

fn call_target(ctx: &mut LiftContext<'_>) -> Result<()> {
    let target = ctx.address_term(0)?;
    ctx.call(target)
}

fn goto_register(ctx: &mut LiftContext<'_>, reg: RegisterId) -> Result<()> {
    let target = ctx.reg(reg)?;
    ctx.goto(target)
}

fn lift_bctrl(ctx: &mut LiftContext<'_>) -> Result<()> {
    let target = ctx.reg(CTR)?;
    ctx.call(target)
}

fn condition(ctx: &LiftContext<'_>) -> Result<Condition> {
    ctx.flags().condition.ok_or(LiftError::UnexpectedOperand {
        index: 0,
        expected: "a conditional branch",
    })
}

fn lift_bc(ctx: &mut LiftContext<'_>) -> Result<()> {
    let condition = condition(ctx)?;
    let (field, target) = if ctx.instr().operand_count() > 1 {
        (field_operand(ctx, 0)?, ctx.address_term(1)?)
    } else {
        (0, ctx.address_term(0)?)
    };
    branch_on_condition(ctx, condition, field, target, cr_flag)
}

/// `bclr`/`bcctr` with a condition: branch to a register.
fn branch_to_register(ctx: &mut LiftContext<'_>, reg: RegisterId) -> Result<()> {
    let condition = condition(ctx)?;
    let field = if ctx.instr().operand_count() > 0 {
        field_operand(ctx, 0)?
    } else {
        0
    };
    let target = ctx.reg(reg)?;
    branch_on_condition(ctx, condition, field, target, cr_flag)
}

/// `bdnz`/`bdz`: decrement `ctr`, then branch on it reaching zero.
fn lift_decrement_branch(ctx: &mut LiftContext<'_>, on_zero: bool) -> Result<()> {
    let ctr = ctx.reg(CTR)?;
    let one = ctx.constant(1);
    ctx.set(CTR, Term::sub(ctr.clone(), one))?;
    let is_zero = Term::equal(ctr, ctx.constant(0));
    let test = if on_zero { is_zero } else { Term::not(is_zero) };
    let target = ctx.address_term(0)?;
    branch_if(ctx, test, target)
}

// === Special purpose registers ===

fn move_to(ctx: &mut LiftContext<'_>, reg: RegisterId) -> Result<()> {
    let value = ctx.operand_term(0)?;
    ctx.set(reg, value)
}

fn move_from(ctx: &mut LiftContext<'_>, reg: RegisterId) -> Result<()> {
    let value = ctx.reg(reg)?;
    set_result(ctx, value)
}

// === Memory ===

fn load(ctx: &mut LiftContext<'_>, signed: bool) -> Result<()> {
    let value = ctx.operand_term(1)?;
    let value = if signed {
        Term::resize_signed(value, 64)
    } else {
        Term::resize_unsigned(value, 64)
    };
    set_result(ctx, value)
}

fn store(ctx: &mut LiftContext<'_>) -> Result<()> {
    let target = ctx.operand_term(1)?;
    let value = Term::resize_unsigned(ctx.operand_term(0)?, target.size());
    ctx.assign(target, value)
}

/// Update forms: the transfer, then `base := effective address`.
fn with_update(
    ctx: &mut LiftContext<'_>,
    transfer: fn(&mut LiftContext<'_>) -> Result<()>,
) -> Result<()> {
    let base = match ctx.operand(1)? {
        Operand::Memory {
            base: Some(base), ..
        } => base,
        _ => {
            return Err(LiftError::UnexpectedOperand {
                index: 1,
                expected: "a based memory operand",
            });
        }
    };
    let address = ctx.address_term(1)?;
    transfer(ctx)?;
    ctx.set(base, address)
}

/// `[ra|0 + rb]`.
fn indexed_address(ctx: &LiftContext<'_>) -> Result<Term> {
    let index = ctx.operand_term(2)?;
    match ctx.immediate(1) {
        Ok(0) => Ok(index),
        _ => Ok(Term::add(ctx.operand_term(1)?, index)),
    }
}

fn load_indexed(ctx: &mut LiftContext<'_>, bits: u32) -> Result<()> {
    let address = indexed_address(ctx)?;
    let value = Term::dereference(address, Domain::Memory, bits);
    set_result(ctx, Term::resize_unsigned(value, 64))
}

fn store_indexed(ctx: &mut LiftContext<'_>, bits: u32) -> Result<()> {
    let address = indexed_address(ctx)?;
    let target = Term::dereference(address, Domain::Memory, bits);
    let value = Term::resize_unsigned(ctx.operand_term(0)?, bits);
    ctx.assign(target, value)
}
