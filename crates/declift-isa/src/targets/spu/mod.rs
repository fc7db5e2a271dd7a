//! Cell Synergistic Processing Unit.
//!
//! No disassembly service exists for the SPU, so instructions are decoded
//! straight from the opcode table in `table`. Code and data are big-endian.

mod convention;
mod decode;
mod lift;
pub mod registers;
mod table;

pub use convention::default_convention;
pub use decode::SpuDecoder;
pub use lift::rules;
pub use table::{ArgShape, Format, TABLE};

use declift_ir::ByteOrder;

use crate::arch::Architecture;
use crate::lifter::InstructionLifter;
use crate::types::{OpId, TARGET_SPU};

pub const OP_BR: OpId = OpId::new(TARGET_SPU, 0);
pub const OP_BRSL: OpId = OpId::new(TARGET_SPU, 1);
pub const OP_BRA: OpId = OpId::new(TARGET_SPU, 2);
pub const OP_BRASL: OpId = OpId::new(TARGET_SPU, 3);
pub const OP_FSMBI: OpId = OpId::new(TARGET_SPU, 4);
pub const OP_LQA: OpId = OpId::new(TARGET_SPU, 5);
pub const OP_LQR: OpId = OpId::new(TARGET_SPU, 6);
pub const OP_STOP: OpId = OpId::new(TARGET_SPU, 7);
pub const OP_STOPD: OpId = OpId::new(TARGET_SPU, 8);
pub const OP_LNOP: OpId = OpId::new(TARGET_SPU, 9);
pub const OP_SYNC: OpId = OpId::new(TARGET_SPU, 10);
pub const OP_DSYNC: OpId = OpId::new(TARGET_SPU, 11);
pub const OP_MFSPR: OpId = OpId::new(TARGET_SPU, 12);
pub const OP_RDCH: OpId = OpId::new(TARGET_SPU, 13);
pub const OP_RCHCNT: OpId = OpId::new(TARGET_SPU, 14);
pub const OP_HBRA: OpId = OpId::new(TARGET_SPU, 15);
pub const OP_HBRR: OpId = OpId::new(TARGET_SPU, 16);
pub const OP_BRZ: OpId = OpId::new(TARGET_SPU, 17);
pub const OP_BRNZ: OpId = OpId::new(TARGET_SPU, 18);
pub const OP_BRHZ: OpId = OpId::new(TARGET_SPU, 19);
pub const OP_BRHNZ: OpId = OpId::new(TARGET_SPU, 20);
pub const OP_STQA: OpId = OpId::new(TARGET_SPU, 21);
pub const OP_STQR: OpId = OpId::new(TARGET_SPU, 22);
pub const OP_MTSPR: OpId = OpId::new(TARGET_SPU, 23);
pub const OP_WRCH: OpId = OpId::new(TARGET_SPU, 24);
pub const OP_LQD: OpId = OpId::new(TARGET_SPU, 25);
pub const OP_BI: OpId = OpId::new(TARGET_SPU, 26);
pub const OP_BISL: OpId = OpId::new(TARGET_SPU, 27);
pub const OP_IRET: OpId = OpId::new(TARGET_SPU, 28);
pub const OP_BISLED: OpId = OpId::new(TARGET_SPU, 29);
pub const OP_HBR: OpId = OpId::new(TARGET_SPU, 30);
pub const OP_FREST: OpId = OpId::new(TARGET_SPU, 31);
pub const OP_FRSQEST: OpId = OpId::new(TARGET_SPU, 32);
pub const OP_FSM: OpId = OpId::new(TARGET_SPU, 33);
pub const OP_FSMH: OpId = OpId::new(TARGET_SPU, 34);
pub const OP_FSMB: OpId = OpId::new(TARGET_SPU, 35);
pub const OP_GB: OpId = OpId::new(TARGET_SPU, 36);
pub const OP_GBH: OpId = OpId::new(TARGET_SPU, 37);
pub const OP_GBB: OpId = OpId::new(TARGET_SPU, 38);
pub const OP_CBD: OpId = OpId::new(TARGET_SPU, 39);
pub const OP_CHD: OpId = OpId::new(TARGET_SPU, 40);
pub const OP_CWD: OpId = OpId::new(TARGET_SPU, 41);
pub const OP_CDD: OpId = OpId::new(TARGET_SPU, 42);
pub const OP_ROTQBII: OpId = OpId::new(TARGET_SPU, 43);
pub const OP_ROTQBYI: OpId = OpId::new(TARGET_SPU, 44);
pub const OP_ROTQMBII: OpId = OpId::new(TARGET_SPU, 45);
pub const OP_ROTQMBYI: OpId = OpId::new(TARGET_SPU, 46);
pub const OP_SHLQBII: OpId = OpId::new(TARGET_SPU, 47);
pub const OP_SHLQBYI: OpId = OpId::new(TARGET_SPU, 48);
pub const OP_STQD: OpId = OpId::new(TARGET_SPU, 49);
pub const OP_BIHNZ: OpId = OpId::new(TARGET_SPU, 50);
pub const OP_BIHZ: OpId = OpId::new(TARGET_SPU, 51);
pub const OP_BINZ: OpId = OpId::new(TARGET_SPU, 52);
pub const OP_BIZ: OpId = OpId::new(TARGET_SPU, 53);
pub const OP_CBX: OpId = OpId::new(TARGET_SPU, 54);
pub const OP_CHX: OpId = OpId::new(TARGET_SPU, 55);
pub const OP_CWX: OpId = OpId::new(TARGET_SPU, 56);
pub const OP_CDX: OpId = OpId::new(TARGET_SPU, 57);
pub const OP_LQX: OpId = OpId::new(TARGET_SPU, 58);
pub const OP_ROTQBI: OpId = OpId::new(TARGET_SPU, 59);
pub const OP_ROTQMBI: OpId = OpId::new(TARGET_SPU, 60);
pub const OP_SHLQBI: OpId = OpId::new(TARGET_SPU, 61);
pub const OP_ROTQBY: OpId = OpId::new(TARGET_SPU, 62);
pub const OP_ROTQMBY: OpId = OpId::new(TARGET_SPU, 63);
pub const OP_SHLQBY: OpId = OpId::new(TARGET_SPU, 64);
pub const OP_ROTQBYBI: OpId = OpId::new(TARGET_SPU, 65);
pub const OP_ROTQMBYBI: OpId = OpId::new(TARGET_SPU, 66);
pub const OP_SHLQBYBI: OpId = OpId::new(TARGET_SPU, 67);
pub const OP_STQX: OpId = OpId::new(TARGET_SPU, 68);
pub const OP_SHUFB: OpId = OpId::new(TARGET_SPU, 69);
pub const OP_IL: OpId = OpId::new(TARGET_SPU, 70);
pub const OP_ILH: OpId = OpId::new(TARGET_SPU, 71);
pub const OP_ILHU: OpId = OpId::new(TARGET_SPU, 72);
pub const OP_ILA: OpId = OpId::new(TARGET_SPU, 73);
pub const OP_NOP: OpId = OpId::new(TARGET_SPU, 74);
pub const OP_IOHL: OpId = OpId::new(TARGET_SPU, 75);
pub const OP_ANDBI: OpId = OpId::new(TARGET_SPU, 76);
pub const OP_ANDHI: OpId = OpId::new(TARGET_SPU, 77);
pub const OP_ANDI: OpId = OpId::new(TARGET_SPU, 78);
pub const OP_ORBI: OpId = OpId::new(TARGET_SPU, 79);
pub const OP_ORHI: OpId = OpId::new(TARGET_SPU, 80);
pub const OP_ORI: OpId = OpId::new(TARGET_SPU, 81);
pub const OP_ORX: OpId = OpId::new(TARGET_SPU, 82);
pub const OP_XORBI: OpId = OpId::new(TARGET_SPU, 83);
pub const OP_XORHI: OpId = OpId::new(TARGET_SPU, 84);
pub const OP_XORI: OpId = OpId::new(TARGET_SPU, 85);
pub const OP_AHI: OpId = OpId::new(TARGET_SPU, 86);
pub const OP_AI: OpId = OpId::new(TARGET_SPU, 87);
pub const OP_SFHI: OpId = OpId::new(TARGET_SPU, 88);
pub const OP_SFI: OpId = OpId::new(TARGET_SPU, 89);
pub const OP_CGTBI: OpId = OpId::new(TARGET_SPU, 90);
pub const OP_CGTHI: OpId = OpId::new(TARGET_SPU, 91);
pub const OP_CGTI: OpId = OpId::new(TARGET_SPU, 92);
pub const OP_CLGTBI: OpId = OpId::new(TARGET_SPU, 93);
pub const OP_CLGTHI: OpId = OpId::new(TARGET_SPU, 94);
pub const OP_CLGTI: OpId = OpId::new(TARGET_SPU, 95);
pub const OP_CEQBI: OpId = OpId::new(TARGET_SPU, 96);
pub const OP_CEQHI: OpId = OpId::new(TARGET_SPU, 97);
pub const OP_CEQI: OpId = OpId::new(TARGET_SPU, 98);
pub const OP_HGTI: OpId = OpId::new(TARGET_SPU, 99);
pub const OP_HLGTI: OpId = OpId::new(TARGET_SPU, 100);
pub const OP_HEQI: OpId = OpId::new(TARGET_SPU, 101);
pub const OP_MPYI: OpId = OpId::new(TARGET_SPU, 102);
pub const OP_MPYUI: OpId = OpId::new(TARGET_SPU, 103);
pub const OP_CFLTS: OpId = OpId::new(TARGET_SPU, 104);
pub const OP_CFLTU: OpId = OpId::new(TARGET_SPU, 105);
pub const OP_CSFLT: OpId = OpId::new(TARGET_SPU, 106);
pub const OP_CUFLT: OpId = OpId::new(TARGET_SPU, 107);
pub const OP_FESD: OpId = OpId::new(TARGET_SPU, 108);
pub const OP_FRDS: OpId = OpId::new(TARGET_SPU, 109);
pub const OP_FSCRRD: OpId = OpId::new(TARGET_SPU, 110);
pub const OP_FSCRWR: OpId = OpId::new(TARGET_SPU, 111);
pub const OP_CLZ: OpId = OpId::new(TARGET_SPU, 112);
pub const OP_CNTB: OpId = OpId::new(TARGET_SPU, 113);
pub const OP_XSBH: OpId = OpId::new(TARGET_SPU, 114);
pub const OP_XSHW: OpId = OpId::new(TARGET_SPU, 115);
pub const OP_XSWD: OpId = OpId::new(TARGET_SPU, 116);
pub const OP_ROTI: OpId = OpId::new(TARGET_SPU, 117);
pub const OP_ROTMI: OpId = OpId::new(TARGET_SPU, 118);
pub const OP_ROTMAI: OpId = OpId::new(TARGET_SPU, 119);
pub const OP_SHLI: OpId = OpId::new(TARGET_SPU, 120);
pub const OP_ROTHI: OpId = OpId::new(TARGET_SPU, 121);
pub const OP_ROTHMI: OpId = OpId::new(TARGET_SPU, 122);
pub const OP_ROTMAHI: OpId = OpId::new(TARGET_SPU, 123);
pub const OP_SHLHI: OpId = OpId::new(TARGET_SPU, 124);
pub const OP_A: OpId = OpId::new(TARGET_SPU, 125);
pub const OP_AH: OpId = OpId::new(TARGET_SPU, 126);
pub const OP_SF: OpId = OpId::new(TARGET_SPU, 127);
pub const OP_SFH: OpId = OpId::new(TARGET_SPU, 128);
pub const OP_CGT: OpId = OpId::new(TARGET_SPU, 129);
pub const OP_CGTB: OpId = OpId::new(TARGET_SPU, 130);
pub const OP_CGTH: OpId = OpId::new(TARGET_SPU, 131);
pub const OP_CLGT: OpId = OpId::new(TARGET_SPU, 132);
pub const OP_CLGTB: OpId = OpId::new(TARGET_SPU, 133);
pub const OP_CLGTH: OpId = OpId::new(TARGET_SPU, 134);
pub const OP_CEQ: OpId = OpId::new(TARGET_SPU, 135);
pub const OP_CEQB: OpId = OpId::new(TARGET_SPU, 136);
pub const OP_CEQH: OpId = OpId::new(TARGET_SPU, 137);
pub const OP_HGT: OpId = OpId::new(TARGET_SPU, 138);
pub const OP_HLGT: OpId = OpId::new(TARGET_SPU, 139);
pub const OP_HEQ: OpId = OpId::new(TARGET_SPU, 140);
pub const OP_FCEQ: OpId = OpId::new(TARGET_SPU, 141);
pub const OP_FCMEQ: OpId = OpId::new(TARGET_SPU, 142);
pub const OP_FCGT: OpId = OpId::new(TARGET_SPU, 143);
pub const OP_FCMGT: OpId = OpId::new(TARGET_SPU, 144);
pub const OP_AND: OpId = OpId::new(TARGET_SPU, 145);
pub const OP_NAND: OpId = OpId::new(TARGET_SPU, 146);
pub const OP_OR: OpId = OpId::new(TARGET_SPU, 147);
pub const OP_NOR: OpId = OpId::new(TARGET_SPU, 148);
pub const OP_XOR: OpId = OpId::new(TARGET_SPU, 149);
pub const OP_EQV: OpId = OpId::new(TARGET_SPU, 150);
pub const OP_ANDC: OpId = OpId::new(TARGET_SPU, 151);
pub const OP_ORC: OpId = OpId::new(TARGET_SPU, 152);
pub const OP_ABSDB: OpId = OpId::new(TARGET_SPU, 153);
pub const OP_AVGB: OpId = OpId::new(TARGET_SPU, 154);
pub const OP_SUMB: OpId = OpId::new(TARGET_SPU, 155);
pub const OP_DFA: OpId = OpId::new(TARGET_SPU, 156);
pub const OP_DFM: OpId = OpId::new(TARGET_SPU, 157);
pub const OP_DFS: OpId = OpId::new(TARGET_SPU, 158);
pub const OP_FA: OpId = OpId::new(TARGET_SPU, 159);
pub const OP_FM: OpId = OpId::new(TARGET_SPU, 160);
pub const OP_FS: OpId = OpId::new(TARGET_SPU, 161);
pub const OP_MPY: OpId = OpId::new(TARGET_SPU, 162);
pub const OP_MPYH: OpId = OpId::new(TARGET_SPU, 163);
pub const OP_MPYHH: OpId = OpId::new(TARGET_SPU, 164);
pub const OP_MPYHHU: OpId = OpId::new(TARGET_SPU, 165);
pub const OP_MPYS: OpId = OpId::new(TARGET_SPU, 166);
pub const OP_MPYU: OpId = OpId::new(TARGET_SPU, 167);
pub const OP_FI: OpId = OpId::new(TARGET_SPU, 168);
pub const OP_ROT: OpId = OpId::new(TARGET_SPU, 169);
pub const OP_ROTM: OpId = OpId::new(TARGET_SPU, 170);
pub const OP_ROTMA: OpId = OpId::new(TARGET_SPU, 171);
pub const OP_SHL: OpId = OpId::new(TARGET_SPU, 172);
pub const OP_ROTH: OpId = OpId::new(TARGET_SPU, 173);
pub const OP_ROTHM: OpId = OpId::new(TARGET_SPU, 174);
pub const OP_ROTMAH: OpId = OpId::new(TARGET_SPU, 175);
pub const OP_SHLH: OpId = OpId::new(TARGET_SPU, 176);
pub const OP_MPYHHA: OpId = OpId::new(TARGET_SPU, 177);
pub const OP_MPYHHAU: OpId = OpId::new(TARGET_SPU, 178);
pub const OP_DFMA: OpId = OpId::new(TARGET_SPU, 179);
pub const OP_DFMS: OpId = OpId::new(TARGET_SPU, 180);
pub const OP_DFNMS: OpId = OpId::new(TARGET_SPU, 181);
pub const OP_DFNMA: OpId = OpId::new(TARGET_SPU, 182);
pub const OP_FMA: OpId = OpId::new(TARGET_SPU, 183);
pub const OP_FMS: OpId = OpId::new(TARGET_SPU, 184);
pub const OP_FNMS: OpId = OpId::new(TARGET_SPU, 185);
pub const OP_MPYA: OpId = OpId::new(TARGET_SPU, 186);
pub const OP_SELB: OpId = OpId::new(TARGET_SPU, 187);
pub const OP_ADDX: OpId = OpId::new(TARGET_SPU, 188);
pub const OP_CG: OpId = OpId::new(TARGET_SPU, 189);
pub const OP_CGX: OpId = OpId::new(TARGET_SPU, 190);
pub const OP_SFX: OpId = OpId::new(TARGET_SPU, 191);
pub const OP_BG: OpId = OpId::new(TARGET_SPU, 192);
pub const OP_BGX: OpId = OpId::new(TARGET_SPU, 193);

const MNEMONICS: [&str; 194] = [
    "br", "brsl", "bra", "brasl", "fsmbi", "lqa", "lqr", "stop", "stopd", "lnop", "sync",
    "dsync", "mfspr", "rdch", "rchcnt", "hbra", "hbrr", "brz", "brnz", "brhz", "brhnz", "stqa",
    "stqr", "mtspr", "wrch", "lqd", "bi", "bisl", "iret", "bisled", "hbr", "frest", "frsqest",
    "fsm", "fsmh", "fsmb", "gb", "gbh", "gbb", "cbd", "chd", "cwd", "cdd", "rotqbii", "rotqbyi",
    "rotqmbii", "rotqmbyi", "shlqbii", "shlqbyi", "stqd", "bihnz", "bihz", "binz", "biz", "cbx",
    "chx", "cwx", "cdx", "lqx", "rotqbi", "rotqmbi", "shlqbi", "rotqby", "rotqmby", "shlqby",
    "rotqbybi", "rotqmbybi", "shlqbybi", "stqx", "shufb", "il", "ilh", "ilhu", "ila", "nop",
    "iohl", "andbi", "andhi", "andi", "orbi", "orhi", "ori", "orx", "xorbi", "xorhi", "xori",
    "ahi", "ai", "sfhi", "sfi", "cgtbi", "cgthi", "cgti", "clgtbi", "clgthi", "clgti", "ceqbi",
    "ceqhi", "ceqi", "hgti", "hlgti", "heqi", "mpyi", "mpyui", "cflts", "cfltu", "csflt",
    "cuflt", "fesd", "frds", "fscrrd", "fscrwr", "clz", "cntb", "xsbh", "xshw", "xswd", "roti",
    "rotmi", "rotmai", "shli", "rothi", "rothmi", "rotmahi", "shlhi", "a", "ah", "sf", "sfh",
    "cgt", "cgtb", "cgth", "clgt", "clgtb", "clgth", "ceq", "ceqb", "ceqh", "hgt", "hlgt",
    "heq", "fceq", "fcmeq", "fcgt", "fcmgt", "and", "nand", "or", "nor", "xor", "eqv", "andc",
    "orc", "absdb", "avgb", "sumb", "dfa", "dfm", "dfs", "fa", "fm", "fs", "mpy", "mpyh",
    "mpyhh", "mpyhhu", "mpys", "mpyu", "fi", "rot", "rotm", "rotma", "shl", "roth", "rothm",
    "rotmah", "shlh", "mpyhha", "mpyhhau", "dfma", "dfms", "dfnms", "dfnma", "fma", "fms",
    "fnms", "mpya", "selb", "addx", "cg", "cgx", "sfx", "bg", "bgx",
];

/// Every SPU opcode in the decoder table, in table order.
pub const ALL_OPS: [OpId; MNEMONICS.len()] = {
    let mut ops = [OP_BR; MNEMONICS.len()];
    let mut i = 0;
    while i < ops.len() {
        ops[i] = OpId::new(TARGET_SPU, i as u16);
        i += 1;
    }
    ops
};

/// Mnemonic for an SPU opcode.
#[must_use]
pub fn spu_mnemonic(op: OpId) -> &'static str {
    MNEMONICS.get(usize::from(op.idx)).copied().unwrap_or("???")
}

pub const NAME: &str = "spu";

/// Register width, used for constants and immediates.
pub const WORD_SIZE: u32 = 128;

#[must_use]
pub fn architecture() -> Architecture {
    let lifter = InstructionLifter::new(&registers::CATALOG, WORD_SIZE, rules());
    Architecture::new(
        NAME,
        64,
        ByteOrder::Big,
        &registers::CATALOG,
        Box::new(SpuDecoder),
        lifter,
    )
    .with_register_byte_order(ByteOrder::Big)
    .with_convention(default_convention())
}

#[cfg(test)]
mod tests;
