//! SPU lifting rules.
//!
//! Registers are modeled as single 128-bit values; lane-wise operations
//! are lifted as if on the whole register. Anything whose lanes cannot be
//! folded that way (shuffles, float ops, masked rotates) stays opaque.

use declift_ir::{Domain, Statement, Term};

use super::registers::LR;
use super::*;
use crate::error::Result;
use crate::instruction::Operand;
use crate::lifter::{LiftContext, Rule, RuleTable, branch_if};

const BITS: u32 = WORD_SIZE;

/// Lifting rules for every opcode in [`ALL_OPS`].
#[must_use]
pub fn rules() -> RuleTable {
    RuleTable::new()
        // Loads and stores
        .lift(OP_LQD, copy)
        .lift(OP_LQA, copy_from_address)
        .lift(OP_LQR, copy_from_address)
        .lift(OP_LQX, load_indexed)
        .lift(OP_STQD, store)
        .lift(OP_STQA, store_to_address)
        .lift(OP_STQR, store_to_address)
        .lift(OP_STQX, store_indexed)
        // Constant formation
        .lift(OP_IL, copy)
        .lift(OP_ILH, copy)
        .lift(OP_ILA, copy)
        .lift(OP_ILHU, lift_ilhu)
        .lift(OP_IOHL, lift_iohl)
        // Arithmetic
        .lift(OP_A, |ctx| binary(ctx, Term::add))
        .lift(OP_AH, |ctx| binary(ctx, Term::add))
        .lift(OP_AI, |ctx| binary(ctx, Term::add))
        .lift(OP_AHI, |ctx| binary(ctx, Term::add))
        .lift(OP_SF, |ctx| binary(ctx, subtract_from))
        .lift(OP_SFH, |ctx| binary(ctx, subtract_from))
        .lift(OP_SFI, |ctx| binary(ctx, subtract_from))
        .lift(OP_SFHI, |ctx| binary(ctx, subtract_from))
        .lift(OP_MPY, |ctx| binary(ctx, multiply_signed))
        .lift(OP_MPYI, |ctx| binary(ctx, multiply_signed))
        .lift(OP_MPYU, |ctx| binary(ctx, multiply_unsigned))
        .lift(OP_MPYUI, |ctx| binary(ctx, multiply_unsigned))
        .lift(OP_MPYA, lift_mpya)
        .lift(OP_XSBH, |ctx| extend_signed(ctx, 8))
        .lift(OP_XSHW, |ctx| extend_signed(ctx, 16))
        .lift(OP_XSWD, |ctx| extend_signed(ctx, 32))
        // Logical
        .lift(OP_AND, |ctx| binary(ctx, Term::and))
        .lift(OP_ANDI, |ctx| binary(ctx, Term::and))
        .lift(OP_ANDBI, |ctx| binary(ctx, Term::and))
        .lift(OP_ANDHI, |ctx| binary(ctx, Term::and))
        .lift(OP_ANDC, |ctx| binary(ctx, |a, b| Term::and(a, Term::not(b))))
        .lift(OP_OR, lift_or)
        .lift(OP_ORI, lift_or)
        .lift(OP_ORBI, lift_or)
        .lift(OP_ORHI, lift_or)
        .lift(OP_ORC, |ctx| binary(ctx, |a, b| Term::or(a, Term::not(b))))
        .lift(OP_XOR, |ctx| binary(ctx, Term::xor))
        .lift(OP_XORI, |ctx| binary(ctx, Term::xor))
        .lift(OP_XORBI, |ctx| binary(ctx, Term::xor))
        .lift(OP_XORHI, |ctx| binary(ctx, Term::xor))
        .lift(OP_NAND, |ctx| binary(ctx, |a, b| Term::not(Term::and(a, b))))
        .lift(OP_NOR, |ctx| binary(ctx, |a, b| Term::not(Term::or(a, b))))
        .lift(OP_EQV, |ctx| binary(ctx, |a, b| Term::not(Term::xor(a, b))))
        // Shifts and rotates
        .lift(OP_SHL, shift_left)
        .lift(OP_SHLI, shift_left)
        .lift(OP_SHLH, shift_left)
        .lift(OP_SHLHI, shift_left)
        .lift(OP_SHLQBI, shift_left)
        .lift(OP_SHLQBII, shift_left)
        .lift(OP_SHLQBY, shift_left_bytes)
        .lift(OP_SHLQBYI, shift_left_bytes)
        .lift(OP_ROT, |ctx| rotate(ctx, 1))
        .lift(OP_ROTI, |ctx| rotate(ctx, 1))
        .lift(OP_ROTH, |ctx| rotate(ctx, 1))
        .lift(OP_ROTHI, |ctx| rotate(ctx, 1))
        .lift(OP_ROTQBI, |ctx| rotate(ctx, 1))
        .lift(OP_ROTQBII, |ctx| rotate(ctx, 1))
        .lift(OP_ROTQBY, |ctx| rotate(ctx, 8))
        .lift(OP_ROTQBYI, |ctx| rotate(ctx, 8))
        // Compares
        .lift(OP_CEQ, |ctx| compare(ctx, Term::equal))
        .lift(OP_CEQB, |ctx| compare(ctx, Term::equal))
        .lift(OP_CEQH, |ctx| compare(ctx, Term::equal))
        .lift(OP_CEQI, |ctx| compare(ctx, Term::equal))
        .lift(OP_CEQBI, |ctx| compare(ctx, Term::equal))
        .lift(OP_CEQHI, |ctx| compare(ctx, Term::equal))
        .lift(OP_CGT, |ctx| compare(ctx, Term::signed_greater))
        .lift(OP_CGTB, |ctx| compare(ctx, Term::signed_greater))
        .lift(OP_CGTH, |ctx| compare(ctx, Term::signed_greater))
        .lift(OP_CGTI, |ctx| compare(ctx, Term::signed_greater))
        .lift(OP_CGTBI, |ctx| compare(ctx, Term::signed_greater))
        .lift(OP_CGTHI, |ctx| compare(ctx, Term::signed_greater))
        .lift(OP_CLGT, |ctx| compare(ctx, Term::unsigned_greater))
        .lift(OP_CLGTB, |ctx| compare(ctx, Term::unsigned_greater))
        .lift(OP_CLGTH, |ctx| compare(ctx, Term::unsigned_greater))
        .lift(OP_CLGTI, |ctx| compare(ctx, Term::unsigned_greater))
        .lift(OP_CLGTBI, |ctx| compare(ctx, Term::unsigned_greater))
        .lift(OP_CLGTHI, |ctx| compare(ctx, Term::unsigned_greater))
        // Branches
        .lift(OP_BR, |ctx| goto_operand(ctx, 0))
        .lift(OP_BRA, |ctx| goto_operand(ctx, 0))
        .lift(OP_BI, |ctx| goto_operand(ctx, 0))
        .lift(OP_BRSL, branch_and_link)
        .lift(OP_BRASL, branch_and_link)
        .lift(OP_BISL, branch_and_link)
        .lift(OP_BRZ, |ctx| branch_on_zero(ctx, true))
        .lift(OP_BRHZ, |ctx| branch_on_zero(ctx, true))
        .lift(OP_BIZ, |ctx| branch_on_zero(ctx, true))
        .lift(OP_BIHZ, |ctx| branch_on_zero(ctx, true))
        .lift(OP_BRNZ, |ctx| branch_on_zero(ctx, false))
        .lift(OP_BRHNZ, |ctx| branch_on_zero(ctx, false))
        .lift(OP_BINZ, |ctx| branch_on_zero(ctx, false))
        .lift(OP_BIHNZ, |ctx| branch_on_zero(ctx, false))
        .lift(OP_IRET, |ctx| ctx.emit(Statement::Return))
        .with(&[OP_HBR, OP_HBRA, OP_HBRR, OP_NOP, OP_LNOP], Rule::Nop)
        // Control, channels, special purpose registers
        .with(
            &[
                OP_STOP, OP_STOPD, OP_SYNC, OP_DSYNC, OP_MFSPR, OP_MTSPR, OP_RDCH, OP_RCHCNT,
                OP_WRCH, OP_BISLED, OP_HEQ, OP_HEQI, OP_HGT, OP_HGTI, OP_HLGT, OP_HLGTI,
            ],
            Rule::Opaque,
        )
        // Lane-wise operations without a whole-register equivalent
        .with(
            &[
                OP_FSMBI, OP_FSM, OP_FSMH, OP_FSMB, OP_GB, OP_GBH, OP_GBB, OP_CBD, OP_CHD,
                OP_CWD, OP_CDD, OP_CBX, OP_CHX, OP_CWX, OP_CDX, OP_ROTQMBII, OP_ROTQMBYI,
                OP_ROTQMBI, OP_ROTQMBY, OP_ROTQBYBI, OP_ROTQMBYBI, OP_SHLQBYBI, OP_SHUFB,
                OP_ORX, OP_CLZ, OP_CNTB, OP_ROTM, OP_ROTMI, OP_ROTMA, OP_ROTMAI, OP_ROTHM,
                OP_ROTHMI, OP_ROTMAH, OP_ROTMAHI, OP_ABSDB, OP_AVGB, OP_SUMB, OP_MPYH,
                OP_MPYHH, OP_MPYHHU, OP_MPYS, OP_MPYHHA, OP_MPYHHAU, OP_SELB, OP_ADDX, OP_CG,
                OP_CGX, OP_SFX, OP_BG, OP_BGX,
            ],
            Rule::Opaque,
        )
        // Floating point
        .with(
            &[
                OP_FREST, OP_FRSQEST, OP_FI, OP_CFLTS, OP_CFLTU, OP_CSFLT, OP_CUFLT, OP_FESD,
                OP_FRDS, OP_FSCRRD, OP_FSCRWR, OP_FCEQ, OP_FCMEQ, OP_FCGT, OP_FCMGT, OP_FA,
                OP_FM, OP_FS, OP_DFA, OP_DFM, OP_DFS, OP_FMA, OP_FMS, OP_FNMS, OP_DFMA,
                OP_DFMS, OP_DFNMS, OP_DFNMA,
            ],
            Rule::Opaque,
        )
}

// === Helpers ===

fn set_result(ctx: &mut LiftContext<'_>, value: Term) -> Result<()> {
    let dest = ctx.register_operand(0)?;
    ctx.set(dest, value)
}

fn copy(ctx: &mut LiftContext<'_>) -> Result<()> {
    let value = ctx.operand_term(1)?;
    set_result(ctx, value)
}

fn binary(ctx: &mut LiftContext<'_>, op: fn(Term, Term) -> Term) -> Result<()> {
    let value = op(ctx.operand_term(1)?, ctx.operand_term(2)?);
    set_result(ctx, value)
}

/// Immediate operand `index`, or `None` for a register.
fn known_amount(ctx: &LiftContext<'_>, index: usize) -> Result<Option<i64>> {
    Ok(ctx.operand(index)?.as_immediate())
}

fn quadword(address: Term) -> Term {
    Term::dereference(address, Domain::Memory, BITS)
}

// === Memory ===

fn copy_from_address(ctx: &mut LiftContext<'_>) -> Result<()> {
    let value = quadword(ctx.address_term(1)?);
    set_result(ctx, value)
}

fn indexed_address(ctx: &LiftContext<'_>) -> Result<Term> {
    Ok(Term::add(ctx.operand_term(1)?, ctx.operand_term(2)?))
}

fn load_indexed(ctx: &mut LiftContext<'_>) -> Result<()> {
    let value = quadword(indexed_address(ctx)?);
    set_result(ctx, value)
}

fn store(ctx: &mut LiftContext<'_>) -> Result<()> {
    let target = ctx.operand_term(1)?;
    let value = ctx.operand_term(0)?;
    ctx.assign(target, value)
}

fn store_to_address(ctx: &mut LiftContext<'_>) -> Result<()> {
    let target = quadword(ctx.address_term(1)?);
    let value = ctx.operand_term(0)?;
    ctx.assign(target, value)
}

fn store_indexed(ctx: &mut LiftContext<'_>) -> Result<()> {
    let target = quadword(indexed_address(ctx)?);
    let value = ctx.operand_term(0)?;
    ctx.assign(target, value)
}

// === Constants ===

fn halfword(ctx: &LiftContext<'_>, index: usize) -> Result<u128> {
    Ok(u128::from(ctx.immediate(index)? as u16))
}

fn lift_ilhu(ctx: &mut LiftContext<'_>) -> Result<()> {
    let value = Term::constant(halfword(ctx, 1)? << 16, BITS);
    set_result(ctx, value)
}

fn lift_iohl(ctx: &mut LiftContext<'_>) -> Result<()> {
    let low = Term::constant(halfword(ctx, 1)?, BITS);
    let value = Term::or(ctx.operand_term(0)?, low);
    set_result(ctx, value)
}

// === Arithmetic ===

/// `sf rt, ra, rb` computes `rb - ra`.
fn subtract_from(ra: Term, rb: Term) -> Term {
    Term::sub(rb, ra)
}

/// Product of the low halfwords.
fn multiply_signed(a: Term, b: Term) -> Term {
    Term::mul(
        Term::sign_extend(Term::truncate(a, 16), BITS),
        Term::sign_extend(Term::truncate(b, 16), BITS),
    )
}

fn multiply_unsigned(a: Term, b: Term) -> Term {
    Term::mul(
        Term::zero_extend(Term::truncate(a, 16), BITS),
        Term::zero_extend(Term::truncate(b, 16), BITS),
    )
}

fn lift_mpya(ctx: &mut LiftContext<'_>) -> Result<()> {
    let product = multiply_signed(ctx.operand_term(1)?, ctx.operand_term(2)?);
    let value = Term::add(product, ctx.operand_term(3)?);
    set_result(ctx, value)
}

fn extend_signed(ctx: &mut LiftContext<'_>, bits: u32) -> Result<()> {
    let value = Term::sign_extend(Term::truncate(ctx.operand_term(1)?, bits), BITS);
    set_result(ctx, value)
}

// === Logical ===

/// `or` with a zero immediate is a register move.
fn lift_or(ctx: &mut LiftContext<'_>) -> Result<()> {
    if known_amount(ctx, 2)? == Some(0) {
        copy(ctx)
    } else {
        binary(ctx, Term::or)
    }
}

// === Shifts and rotates ===

fn shift_left(ctx: &mut LiftContext<'_>) -> Result<()> {
    if known_amount(ctx, 2)? == Some(0) {
        return copy(ctx);
    }
    binary(ctx, Term::shl)
}

/// Quadword shift by bytes; amounts past the register width clear it.
fn shift_left_bytes(ctx: &mut LiftContext<'_>) -> Result<()> {
    let value = match known_amount(ctx, 2)? {
        Some(0) => ctx.operand_term(1)?,
        Some(bytes) if bytes > 15 => Term::constant(0, BITS),
        Some(bytes) => Term::shl(ctx.operand_term(1)?, Term::signed_constant(bytes * 8, BITS)),
        None => Term::shl(
            ctx.operand_term(1)?,
            Term::mul(ctx.operand_term(2)?, Term::constant(8, BITS)),
        ),
    };
    set_result(ctx, value)
}

/// Rotate left by operand 2 times `scale` bits.
fn rotate(ctx: &mut LiftContext<'_>, scale: u128) -> Result<()> {
    let amount = match ctx.operand(2)? {
        Operand::Immediate { value, .. } => {
            let bits = (value as u128).wrapping_mul(scale) % u128::from(BITS);
            if bits == 0 {
                return copy(ctx);
            }
            Term::constant(bits, BITS)
        }
        _ if scale == 1 => ctx.operand_term(2)?,
        _ => Term::mul(ctx.operand_term(2)?, Term::constant(scale, BITS)),
    };
    let value = ctx.operand_term(1)?;
    let rotated = Term::or(
        Term::shl(value.clone(), amount.clone()),
        Term::shr(value, Term::sub(Term::constant(u128::from(BITS), BITS), amount)),
    );
    set_result(ctx, rotated)
}

// === Compares ===

/// All-ones when the comparison holds, zero otherwise.
fn compare(ctx: &mut LiftContext<'_>, op: fn(Term, Term) -> Term) -> Result<()> {
    let test = op(ctx.operand_term(1)?, ctx.operand_term(2)?);
    set_result(ctx, Term::sign_extend(test, BITS))
}

// === Branches ===

/// Branch target in operand `index`: a register value or an absolute address.
fn target(ctx: &LiftContext<'_>, index: usize) -> Result<Term> {
    match ctx.operand(index)? {
        Operand::Register { reg, .. } => ctx.reg(reg),
        _ => ctx.address_term(index),
    }
}

fn goto_operand(ctx: &mut LiftContext<'_>, index: usize) -> Result<()> {
    let target = target(ctx, index)?;
    ctx.goto(target)
}

/// Linking through `lr` is a call; linking through any other register
/// records the return address there and jumps.
fn branch_and_link(ctx: &mut LiftContext<'_>) -> Result<()> {
    let link = ctx.register_operand(0)?;
    let target = target(ctx, 1)?;
    if link == LR {
        return ctx.call(target);
    }
    let next = ctx.constant(ctx.end_address() as i64);
    ctx.set(link, next)?;
    ctx.goto(target)
}

fn branch_on_zero(ctx: &mut LiftContext<'_>, on_zero: bool) -> Result<()> {
    let zero = Term::equal(ctx.operand_term(0)?, Term::constant(0, BITS));
    let test = if on_zero { zero } else { Term::not(zero) };
    let target = target(ctx, 1)?;
    branch_if(ctx, test, target)
}
