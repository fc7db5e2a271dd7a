//! 64-bit PowerPC, big- or little-endian.
//!
//! Decoding goes through [`PpcDisassembler`], a disassembly service wrapped
//! in a [`DelegatingDecoder`]; lifting rules live in `lift`.

mod convention;
mod decode;
mod lift;
pub mod registers;

pub use convention::default_convention;
pub use decode::PpcDisassembler;
pub use lift::rules;

use declift_ir::ByteOrder;

use crate::arch::Architecture;
use crate::decoder::{DecodeMode, DelegatingDecoder};
use crate::lifter::InstructionLifter;
use crate::types::{OpId, TARGET_PPC};

// Branches
pub const OP_B: OpId = OpId::new(TARGET_PPC, 0);
pub const OP_BA: OpId = OpId::new(TARGET_PPC, 1);
pub const OP_BL: OpId = OpId::new(TARGET_PPC, 2);
pub const OP_BLA: OpId = OpId::new(TARGET_PPC, 3);
pub const OP_BC: OpId = OpId::new(TARGET_PPC, 4);
pub const OP_BDNZ: OpId = OpId::new(TARGET_PPC, 5);
pub const OP_BDZ: OpId = OpId::new(TARGET_PPC, 6);
pub const OP_BLR: OpId = OpId::new(TARGET_PPC, 7);
pub const OP_BCLR: OpId = OpId::new(TARGET_PPC, 8);
pub const OP_BCTR: OpId = OpId::new(TARGET_PPC, 9);
pub const OP_BCTRL: OpId = OpId::new(TARGET_PPC, 10);
pub const OP_BCCTR: OpId = OpId::new(TARGET_PPC, 11);

// Compares
pub const OP_CMPW: OpId = OpId::new(TARGET_PPC, 12);
pub const OP_CMPD: OpId = OpId::new(TARGET_PPC, 13);
pub const OP_CMPLW: OpId = OpId::new(TARGET_PPC, 14);
pub const OP_CMPLD: OpId = OpId::new(TARGET_PPC, 15);
pub const OP_CMPWI: OpId = OpId::new(TARGET_PPC, 16);
pub const OP_CMPDI: OpId = OpId::new(TARGET_PPC, 17);
pub const OP_CMPLWI: OpId = OpId::new(TARGET_PPC, 18);
pub const OP_CMPLDI: OpId = OpId::new(TARGET_PPC, 19);

// Arithmetic
pub const OP_ADD: OpId = OpId::new(TARGET_PPC, 20);
pub const OP_ADDC: OpId = OpId::new(TARGET_PPC, 21);
pub const OP_ADDI: OpId = OpId::new(TARGET_PPC, 22);
pub const OP_LI: OpId = OpId::new(TARGET_PPC, 23);
pub const OP_ADDIS: OpId = OpId::new(TARGET_PPC, 24);
pub const OP_LIS: OpId = OpId::new(TARGET_PPC, 25);
pub const OP_SUBF: OpId = OpId::new(TARGET_PPC, 26);
pub const OP_SUBFC: OpId = OpId::new(TARGET_PPC, 27);
pub const OP_SUBFIC: OpId = OpId::new(TARGET_PPC, 28);
pub const OP_NEG: OpId = OpId::new(TARGET_PPC, 29);
pub const OP_MULLI: OpId = OpId::new(TARGET_PPC, 30);
pub const OP_MULLW: OpId = OpId::new(TARGET_PPC, 31);
pub const OP_MULLD: OpId = OpId::new(TARGET_PPC, 32);
pub const OP_DIVW: OpId = OpId::new(TARGET_PPC, 33);
pub const OP_DIVD: OpId = OpId::new(TARGET_PPC, 34);
pub const OP_DIVWU: OpId = OpId::new(TARGET_PPC, 35);
pub const OP_DIVDU: OpId = OpId::new(TARGET_PPC, 36);

// Logical
pub const OP_AND: OpId = OpId::new(TARGET_PPC, 37);
pub const OP_ANDC: OpId = OpId::new(TARGET_PPC, 38);
pub const OP_ANDI: OpId = OpId::new(TARGET_PPC, 39);
pub const OP_ANDIS: OpId = OpId::new(TARGET_PPC, 40);
pub const OP_OR: OpId = OpId::new(TARGET_PPC, 41);
pub const OP_MR: OpId = OpId::new(TARGET_PPC, 42);
pub const OP_ORI: OpId = OpId::new(TARGET_PPC, 43);
pub const OP_NOP: OpId = OpId::new(TARGET_PPC, 44);
pub const OP_ORIS: OpId = OpId::new(TARGET_PPC, 45);
pub const OP_XOR: OpId = OpId::new(TARGET_PPC, 46);
pub const OP_XORI: OpId = OpId::new(TARGET_PPC, 47);
pub const OP_XORIS: OpId = OpId::new(TARGET_PPC, 48);
pub const OP_NAND: OpId = OpId::new(TARGET_PPC, 49);
pub const OP_NOR: OpId = OpId::new(TARGET_PPC, 50);

// Shifts, rotates, sign extension
pub const OP_SLW: OpId = OpId::new(TARGET_PPC, 51);
pub const OP_SLD: OpId = OpId::new(TARGET_PPC, 52);
pub const OP_SRW: OpId = OpId::new(TARGET_PPC, 53);
pub const OP_SRD: OpId = OpId::new(TARGET_PPC, 54);
pub const OP_SRAW: OpId = OpId::new(TARGET_PPC, 55);
pub const OP_SRAD: OpId = OpId::new(TARGET_PPC, 56);
pub const OP_SRAWI: OpId = OpId::new(TARGET_PPC, 57);
pub const OP_SRADI: OpId = OpId::new(TARGET_PPC, 58);
pub const OP_EXTSB: OpId = OpId::new(TARGET_PPC, 59);
pub const OP_EXTSH: OpId = OpId::new(TARGET_PPC, 60);
pub const OP_EXTSW: OpId = OpId::new(TARGET_PPC, 61);
pub const OP_RLWINM: OpId = OpId::new(TARGET_PPC, 62);
pub const OP_RLDICL: OpId = OpId::new(TARGET_PPC, 63);
pub const OP_RLDICR: OpId = OpId::new(TARGET_PPC, 64);

// Special purpose register moves
pub const OP_MTLR: OpId = OpId::new(TARGET_PPC, 65);
pub const OP_MFLR: OpId = OpId::new(TARGET_PPC, 66);
pub const OP_MTCTR: OpId = OpId::new(TARGET_PPC, 67);
pub const OP_MFCTR: OpId = OpId::new(TARGET_PPC, 68);
pub const OP_MFSPR: OpId = OpId::new(TARGET_PPC, 69);
pub const OP_MTSPR: OpId = OpId::new(TARGET_PPC, 70);

// Loads and stores
pub const OP_LBZ: OpId = OpId::new(TARGET_PPC, 71);
pub const OP_LHZ: OpId = OpId::new(TARGET_PPC, 72);
pub const OP_LHA: OpId = OpId::new(TARGET_PPC, 73);
pub const OP_LWZ: OpId = OpId::new(TARGET_PPC, 74);
pub const OP_LWA: OpId = OpId::new(TARGET_PPC, 75);
pub const OP_LD: OpId = OpId::new(TARGET_PPC, 76);
pub const OP_STB: OpId = OpId::new(TARGET_PPC, 77);
pub const OP_STH: OpId = OpId::new(TARGET_PPC, 78);
pub const OP_STW: OpId = OpId::new(TARGET_PPC, 79);
pub const OP_STD: OpId = OpId::new(TARGET_PPC, 80);
pub const OP_LWZU: OpId = OpId::new(TARGET_PPC, 81);
pub const OP_LDU: OpId = OpId::new(TARGET_PPC, 82);
pub const OP_STWU: OpId = OpId::new(TARGET_PPC, 83);
pub const OP_STDU: OpId = OpId::new(TARGET_PPC, 84);
pub const OP_LBZX: OpId = OpId::new(TARGET_PPC, 85);
pub const OP_LWZX: OpId = OpId::new(TARGET_PPC, 86);
pub const OP_LDX: OpId = OpId::new(TARGET_PPC, 87);
pub const OP_STWX: OpId = OpId::new(TARGET_PPC, 88);
pub const OP_STDX: OpId = OpId::new(TARGET_PPC, 89);

// System
pub const OP_DCBT: OpId = OpId::new(TARGET_PPC, 90);
pub const OP_SYNC: OpId = OpId::new(TARGET_PPC, 91);
pub const OP_ISYNC: OpId = OpId::new(TARGET_PPC, 92);
pub const OP_SC: OpId = OpId::new(TARGET_PPC, 93);
pub const OP_TRAP: OpId = OpId::new(TARGET_PPC, 94);

const MNEMONICS: [&str; 95] = [
    "b", "ba", "bl", "bla", "bc", "bdnz", "bdz", "blr", "bclr", "bctr", "bctrl", "bcctr",
    "cmpw", "cmpd", "cmplw", "cmpld", "cmpwi", "cmpdi", "cmplwi", "cmpldi",
    "add", "addc", "addi", "li", "addis", "lis", "subf", "subfc", "subfic", "neg", "mulli",
    "mullw", "mulld", "divw", "divd", "divwu", "divdu",
    "and", "andc", "andi", "andis", "or", "mr", "ori", "nop", "oris", "xor", "xori", "xoris",
    "nand", "nor",
    "slw", "sld", "srw", "srd", "sraw", "srad", "srawi", "sradi", "extsb", "extsh", "extsw",
    "rlwinm", "rldicl", "rldicr",
    "mtlr", "mflr", "mtctr", "mfctr", "mfspr", "mtspr",
    "lbz", "lhz", "lha", "lwz", "lwa", "ld", "stb", "sth", "stw", "std", "lwzu", "ldu", "stwu",
    "stdu", "lbzx", "lwzx", "ldx", "stwx", "stdx",
    "dcbt", "sync", "isync", "sc", "trap",
];

/// Every PowerPC opcode the decoder can produce.
pub const ALL_OPS: [OpId; MNEMONICS.len()] = {
    let mut ops = [OP_B; MNEMONICS.len()];
    let mut i = 0;
    while i < ops.len() {
        ops[i] = OpId::new(TARGET_PPC, i as u16);
        i += 1;
    }
    ops
};

/// Mnemonic for a PowerPC opcode.
#[must_use]
pub fn ppc_mnemonic(op: OpId) -> &'static str {
    MNEMONICS.get(usize::from(op.idx)).copied().unwrap_or("???")
}

pub const NAME_BE: &str = "ppc-be";
pub const NAME_LE: &str = "ppc-le";

/// PowerPC with data in `data_order` and code encoded in `code_order`.
#[must_use]
pub fn architecture(data_order: ByteOrder, code_order: ByteOrder) -> Architecture {
    let name = match data_order {
        ByteOrder::Big => NAME_BE,
        ByteOrder::Little => NAME_LE,
    };
    let decoder = DelegatingDecoder::new(
        PpcDisassembler,
        DecodeMode {
            byte_order: code_order,
            bitness: 64,
        },
        4,
        &registers::CATALOG,
        registers::map_register,
    );
    let lifter =
        InstructionLifter::new(&registers::CATALOG, 64, rules()).with_code_order(code_order);
    Architecture::new(
        name,
        64,
        data_order,
        &registers::CATALOG,
        Box::new(decoder),
        lifter,
    )
    .with_convention(default_convention())
}

#[cfg(test)]
mod tests;
