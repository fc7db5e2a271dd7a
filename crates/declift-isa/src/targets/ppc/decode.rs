//! PowerPC disassembly service for the 64-bit integer subset.

use super::registers::raw;
use super::*;
use crate::bitfield::{signed_field, unsigned_field};
use crate::decoder::{DecodeMode, Disassembler, RawInstruction, RawOperand, read_word};
use crate::types::{Condition, InstrFlags};

/// Stateless decoder for 4-byte PowerPC instruction words.
#[derive(Clone, Copy, Debug, Default)]
pub struct PpcDisassembler;

impl Disassembler for PpcDisassembler {
    fn disassemble(
        &self,
        bytes: &[u8],
        address: u64,
        mode: DecodeMode,
    ) -> Option<RawInstruction> {
        if address % 4 != 0 {
            return None;
        }
        decode_word(read_word(bytes, mode.byte_order)?, address)
    }
}

// === Field extraction ===

#[inline]
const fn rt(w: u32) -> u32 {
    unsigned_field(w, 21, 5)
}

#[inline]
const fn ra(w: u32) -> u32 {
    unsigned_field(w, 16, 5)
}

#[inline]
const fn rb(w: u32) -> u32 {
    unsigned_field(w, 11, 5)
}

#[inline]
const fn simm(w: u32) -> i64 {
    signed_field(w, 0, 16) as i64
}

#[inline]
const fn uimm(w: u32) -> i64 {
    (w & 0xffff) as i64
}

#[inline]
const fn rc(w: u32) -> bool {
    w & 1 != 0
}

const fn gpr(n: u32) -> RawOperand {
    RawOperand::Reg(raw::GPR + n)
}

const fn cr(field: u32) -> RawOperand {
    RawOperand::Reg(raw::CR_FIELD + field)
}

/// `ra` as an index base: register 0 reads as zero.
const fn index_base(n: u32) -> RawOperand {
    if n == 0 { RawOperand::Imm(0) } else { gpr(n) }
}

const fn mem(base: u32, disp: i64, size: u32) -> RawOperand {
    RawOperand::Mem {
        base: if base == 0 { None } else { Some(raw::GPR + base) },
        disp,
        size,
    }
}

fn instr(op: OpId, operands: Vec<RawOperand>) -> RawInstruction {
    RawInstruction {
        opcode: op,
        mnemonic: ppc_mnemonic(op),
        size: 4,
        operands,
        flags: InstrFlags::default(),
    }
}

fn recorded(op: OpId, operands: Vec<RawOperand>, record: bool) -> RawInstruction {
    let mut i = instr(op, operands);
    i.flags.record = record;
    i
}

// === Branches ===

const BC_NAMES: [&str; 8] = ["blt", "ble", "beq", "bge", "bgt", "bne", "bun", "bnu"];
const BCLR_NAMES: [&str; 8] = [
    "bltlr", "blelr", "beqlr", "bgelr", "bgtlr", "bnelr", "bunlr", "bnulr",
];
const BCCTR_NAMES: [&str; 8] = [
    "bltctr", "blectr", "beqctr", "bgectr", "bgtctr", "bnectr", "bunctr", "bnuctr",
];

const fn condition_index(c: Condition) -> usize {
    match c {
        Condition::Lt => 0,
        Condition::Le => 1,
        Condition::Eq => 2,
        Condition::Ge => 3,
        Condition::Gt => 4,
        Condition::Ne => 5,
        Condition::Un => 6,
        Condition::Nu => 7,
    }
}

/// What a BO/BI pair tests.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum BranchKind {
    Always,
    /// Decrement ctr, branch if it is now non-zero.
    Dnz,
    /// Decrement ctr, branch if it is now zero.
    Dz,
    /// Test one condition register bit.
    Cond(Condition, u32),
}

const fn branch_kind(bo: u32, bi: u32) -> Option<BranchKind> {
    let field = bi >> 2;
    if bo & 0b10100 == 0b10100 {
        Some(BranchKind::Always)
    } else if bo & 0b10110 == 0b10000 {
        Some(BranchKind::Dnz)
    } else if bo & 0b10110 == 0b10010 {
        Some(BranchKind::Dz)
    } else if bo & 0b11100 == 0b01100 {
        let c = match bi & 3 {
            0 => Condition::Lt,
            1 => Condition::Gt,
            2 => Condition::Eq,
            _ => Condition::Un,
        };
        Some(BranchKind::Cond(c, field))
    } else if bo & 0b11100 == 0b00100 {
        let c = match bi & 3 {
            0 => Condition::Ge,
            1 => Condition::Le,
            2 => Condition::Ne,
            _ => Condition::Nu,
        };
        Some(BranchKind::Cond(c, field))
    } else {
        None
    }
}

/// Conditional branch: condition field operand first, only when not cr0.
fn conditional(
    op: OpId,
    names: &[&'static str; 8],
    condition: Condition,
    field: u32,
    target: Option<i64>,
) -> RawInstruction {
    let mut operands = Vec::with_capacity(2);
    if field != 0 {
        operands.push(cr(field));
    }
    operands.extend(target.map(RawOperand::Imm));
    let mut i = instr(op, operands);
    i.mnemonic = names[condition_index(condition)];
    i.flags.condition = Some(condition);
    i
}

fn target(address: u64, offset: i64, absolute: bool) -> i64 {
    if absolute {
        offset
    } else {
        address.wrapping_add_signed(offset) as i64
    }
}

fn decode_b(w: u32, address: u64) -> RawInstruction {
    let absolute = w & 2 != 0;
    let link = w & 1 != 0;
    let offset = i64::from(signed_field(w, 2, 24)) << 2;
    let op = match (link, absolute) {
        (false, false) => OP_B,
        (false, true) => OP_BA,
        (true, false) => OP_BL,
        (true, true) => OP_BLA,
    };
    instr(op, vec![RawOperand::Imm(target(address, offset, absolute))])
}

fn decode_bc(w: u32, address: u64) -> Option<RawInstruction> {
    let absolute = w & 2 != 0;
    let link = w & 1 != 0;
    let offset = i64::from(signed_field(w, 2, 14)) << 2;
    let dest = RawOperand::Imm(target(address, offset, absolute));
    Some(match branch_kind(rt(w), ra(w))? {
        BranchKind::Always => {
            let op = match (link, absolute) {
                (false, false) => OP_B,
                (false, true) => OP_BA,
                (true, false) => OP_BL,
                (true, true) => OP_BLA,
            };
            instr(op, vec![dest])
        }
        _ if link => return None,
        BranchKind::Dnz => instr(OP_BDNZ, vec![dest]),
        BranchKind::Dz => instr(OP_BDZ, vec![dest]),
        BranchKind::Cond(c, field) => {
            conditional(OP_BC, &BC_NAMES, c, field, Some(target(address, offset, absolute)))
        }
    })
}

fn decode_xl(w: u32) -> Option<RawInstruction> {
    let link = w & 1 != 0;
    let kind = branch_kind(rt(w), ra(w));
    match unsigned_field(w, 1, 10) {
        16 => match kind? {
            BranchKind::Always if !link => Some(instr(OP_BLR, vec![])),
            BranchKind::Cond(c, field) if !link => {
                Some(conditional(OP_BCLR, &BCLR_NAMES, c, field, None))
            }
            _ => None,
        },
        528 => match kind? {
            BranchKind::Always if link => Some(instr(OP_BCTRL, vec![])),
            BranchKind::Always => Some(instr(OP_BCTR, vec![])),
            BranchKind::Cond(c, field) if !link => {
                Some(conditional(OP_BCCTR, &BCCTR_NAMES, c, field, None))
            }
            _ => None,
        },
        150 => Some(instr(OP_ISYNC, vec![])),
        _ => None,
    }
}

// === Integer forms ===

/// `cmp`/`cmpl`/`cmpi`/`cmpli`: word or doubleword by the L bit.
fn decode_compare(w: u32, word_op: OpId, double_op: OpId, rhs: RawOperand) -> Option<RawInstruction> {
    if w & (1 << 22) != 0 {
        return None;
    }
    let field = unsigned_field(w, 23, 3);
    let op = if w & (1 << 21) != 0 { double_op } else { word_op };
    let mut operands = Vec::with_capacity(3);
    if field != 0 {
        operands.push(cr(field));
    }
    operands.extend([gpr(ra(w)), rhs]);
    Some(instr(op, operands))
}

fn decode_load_store(w: u32, op: OpId, size: u32, update: bool) -> Option<RawInstruction> {
    if update && ra(w) == 0 {
        return None;
    }
    Some(instr(op, vec![gpr(rt(w)), mem(ra(w), simm(w), size)]))
}

/// DS-form: displacement is a multiple of 4, low two bits select the op.
fn decode_ds(w: u32, ops: &[(OpId, u32, bool)]) -> Option<RawInstruction> {
    let &(op, size, update) = ops.get((w & 3) as usize)?;
    if update && ra(w) == 0 {
        return None;
    }
    let disp = simm(w & !3);
    Some(instr(op, vec![gpr(rt(w)), mem(ra(w), disp, size)]))
}

fn decode_md(w: u32) -> Option<RawInstruction> {
    let sh = rb(w) | (unsigned_field(w, 1, 1) << 5);
    let mbe = unsigned_field(w, 5, 6);
    let mb = ((mbe & 1) << 5) | (mbe >> 1);
    let op = match unsigned_field(w, 2, 3) {
        0 => OP_RLDICL,
        1 => OP_RLDICR,
        _ => return None,
    };
    let operands = vec![
        gpr(ra(w)),
        gpr(rt(w)),
        RawOperand::Imm(i64::from(sh)),
        RawOperand::Imm(i64::from(mb)),
    ];
    Some(recorded(op, operands, rc(w)))
}

const fn spr(w: u32) -> u32 {
    unsigned_field(w, 16, 5) | (unsigned_field(w, 11, 5) << 5)
}

fn spr_operand(n: u32) -> RawOperand {
    match n {
        1 => RawOperand::Reg(raw::XER),
        8 => RawOperand::Reg(raw::LR),
        9 => RawOperand::Reg(raw::CTR),
        _ => RawOperand::Reg(raw::UNMODELED_SPR + n),
    }
}

fn decode_x(w: u32) -> Option<RawInstruction> {
    // sradi has a 9-bit extended opcode with the top shift bit below it.
    if unsigned_field(w, 2, 9) == 413 {
        let sh = rb(w) | (unsigned_field(w, 1, 1) << 5);
        let operands = vec![gpr(ra(w)), gpr(rt(w)), RawOperand::Imm(i64::from(sh))];
        return Some(recorded(OP_SRADI, operands, rc(w)));
    }

    // X-form logical ops write ra from rs (in the rt slot).
    let logical = |op| Some(recorded(op, vec![gpr(ra(w)), gpr(rt(w)), gpr(rb(w))], rc(w)));
    let unary = |op| Some(recorded(op, vec![gpr(ra(w)), gpr(rt(w))], rc(w)));
    let arith = |op| Some(recorded(op, vec![gpr(rt(w)), gpr(ra(w)), gpr(rb(w))], rc(w)));
    let indexed = |op| Some(instr(op, vec![gpr(rt(w)), index_base(ra(w)), gpr(rb(w))]));

    match unsigned_field(w, 1, 10) {
        0 => decode_compare(w, OP_CMPW, OP_CMPD, gpr(rb(w))),
        32 => decode_compare(w, OP_CMPLW, OP_CMPLD, gpr(rb(w))),

        266 => arith(OP_ADD),
        10 => arith(OP_ADDC),
        40 => arith(OP_SUBF),
        8 => arith(OP_SUBFC),
        104 => Some(recorded(OP_NEG, vec![gpr(rt(w)), gpr(ra(w))], rc(w))),
        235 => arith(OP_MULLW),
        233 => arith(OP_MULLD),
        491 => arith(OP_DIVW),
        489 => arith(OP_DIVD),
        459 => arith(OP_DIVWU),
        457 => arith(OP_DIVDU),

        28 => logical(OP_AND),
        60 => logical(OP_ANDC),
        444 if rt(w) == rb(w) => unary(OP_MR),
        444 => logical(OP_OR),
        316 => logical(OP_XOR),
        476 => logical(OP_NAND),
        124 => logical(OP_NOR),
        24 => logical(OP_SLW),
        27 => logical(OP_SLD),
        536 => logical(OP_SRW),
        539 => logical(OP_SRD),
        792 => logical(OP_SRAW),
        794 => logical(OP_SRAD),
        824 => Some(recorded(
            OP_SRAWI,
            vec![gpr(ra(w)), gpr(rt(w)), RawOperand::Imm(i64::from(rb(w)))],
            rc(w),
        )),
        954 => unary(OP_EXTSB),
        922 => unary(OP_EXTSH),
        986 => unary(OP_EXTSW),

        339 => Some(match spr(w) {
            8 => instr(OP_MFLR, vec![gpr(rt(w))]),
            9 => instr(OP_MFCTR, vec![gpr(rt(w))]),
            n => instr(OP_MFSPR, vec![gpr(rt(w)), spr_operand(n)]),
        }),
        467 => Some(match spr(w) {
            8 => instr(OP_MTLR, vec![gpr(rt(w))]),
            9 => instr(OP_MTCTR, vec![gpr(rt(w))]),
            n => instr(OP_MTSPR, vec![spr_operand(n), gpr(rt(w))]),
        }),

        23 => indexed(OP_LWZX),
        87 => indexed(OP_LBZX),
        21 => indexed(OP_LDX),
        151 => indexed(OP_STWX),
        149 => indexed(OP_STDX),

        278 => Some(instr(OP_DCBT, vec![])),
        598 => Some(instr(OP_SYNC, vec![])),
        4 if rt(w) == 31 && ra(w) == 0 && rb(w) == 0 => Some(instr(OP_TRAP, vec![])),
        _ => None,
    }
}

/// Decode one big-endian-ordered instruction word.
fn decode_word(w: u32, address: u64) -> Option<RawInstruction> {
    let d_arith = |op| Some(instr(op, vec![gpr(rt(w)), gpr(ra(w)), RawOperand::Imm(simm(w))]));
    let d_logical =
        |op, record| Some(recorded(op, vec![gpr(ra(w)), gpr(rt(w)), RawOperand::Imm(uimm(w))], record));

    match w >> 26 {
        7 => d_arith(OP_MULLI),
        8 => d_arith(OP_SUBFIC),
        10 => decode_compare(w, OP_CMPLWI, OP_CMPLDI, RawOperand::Imm(uimm(w))),
        11 => decode_compare(w, OP_CMPWI, OP_CMPDI, RawOperand::Imm(simm(w))),
        14 if ra(w) == 0 => Some(instr(OP_LI, vec![gpr(rt(w)), RawOperand::Imm(simm(w))])),
        14 => d_arith(OP_ADDI),
        15 if ra(w) == 0 => Some(instr(OP_LIS, vec![gpr(rt(w)), RawOperand::Imm(simm(w))])),
        15 => d_arith(OP_ADDIS),
        16 => decode_bc(w, address),
        17 if w & 2 != 0 => Some(instr(OP_SC, vec![])),
        18 => Some(decode_b(w, address)),
        19 => decode_xl(w),
        21 => Some(recorded(
            OP_RLWINM,
            vec![
                gpr(ra(w)),
                gpr(rt(w)),
                RawOperand::Imm(i64::from(rb(w))),
                RawOperand::Imm(i64::from(unsigned_field(w, 6, 5))),
                RawOperand::Imm(i64::from(unsigned_field(w, 1, 5))),
            ],
            rc(w),
        )),
        24 if w == 0x6000_0000 => Some(instr(OP_NOP, vec![])),
        24 => d_logical(OP_ORI, false),
        25 => d_logical(OP_ORIS, false),
        26 => d_logical(OP_XORI, false),
        27 => d_logical(OP_XORIS, false),
        28 => d_logical(OP_ANDI, true),
        29 => d_logical(OP_ANDIS, true),
        30 => decode_md(w),
        31 => decode_x(w),
        32 => decode_load_store(w, OP_LWZ, 32, false),
        33 => decode_load_store(w, OP_LWZU, 32, true),
        34 => decode_load_store(w, OP_LBZ, 8, false),
        36 => decode_load_store(w, OP_STW, 32, false),
        37 => decode_load_store(w, OP_STWU, 32, true),
        38 => decode_load_store(w, OP_STB, 8, false),
        40 => decode_load_store(w, OP_LHZ, 16, false),
        42 => decode_load_store(w, OP_LHA, 16, false),
        44 => decode_load_store(w, OP_STH, 16, false),
        58 => decode_ds(w, &[(OP_LD, 64, false), (OP_LDU, 64, true), (OP_LWA, 32, false)]),
        62 => decode_ds(w, &[(OP_STD, 64, false), (OP_STDU, 64, true)]),
        _ => None,
    }
}
