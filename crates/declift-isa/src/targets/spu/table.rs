//! SPU opcode table.
//!
//! Opcodes are the top 11 bits of the instruction word. Shorter opcode
//! fields are stored left-aligned in those 11 bits, so a 4-bit opcode
//! `0x8` appears as `0x400`.

use super::*;
use crate::bitfield::{MaskStep, OpcodeDescriptor, OpcodeTable};
use crate::types::OpId;

/// Instruction layout, which fixes the opcode width.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Format {
    /// 4-bit opcode, three sources and a target.
    Rrr,
    /// 7-bit opcode, 18-bit immediate.
    Ri18,
    /// 9-bit opcode, 16-bit immediate.
    Ri16,
    /// 8-bit opcode, 10-bit immediate.
    Ri10,
    /// 10-bit opcode, 8-bit immediate.
    Ri8,
    /// 11-bit opcode, 7-bit immediate.
    Ri7,
    /// 11-bit opcode, two sources and a target.
    Rr,
    /// Branch hint with a split 9-bit hint offset and an 18-bit target.
    Lbt,
    /// Branch hint with a split hint offset and a register target.
    Lbti,
}

/// How one operand is extracted from the instruction word.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ArgShape {
    /// Register in bits 0-6.
    Rt,
    /// Register in bits 7-13.
    Ra,
    /// Register in bits 14-20.
    Rb,
    /// Register in bits 21-27.
    Rc,
    /// Special purpose register number in the `Ra` field.
    Spr,
    /// Channel number in the `Ra` field.
    Channel,
    /// Turns the preceding immediate and the following `Ra` into one
    /// memory operand.
    Paren,
    /// `173 - u8`, the scale of float to integer conversions.
    CfltScale,
    /// `155 - u8`, the scale of integer to float conversions.
    CsfltScale,
    /// Signed 7-bit immediate.
    Imm7,
    /// Signed 10-bit immediate.
    Imm10,
    /// Signed 10-bit quadword offset, scaled by 16.
    Quad10,
    /// Signed 16-bit immediate.
    Imm16,
    /// Unsigned 18-bit immediate.
    Imm18,
    /// Absolute word address.
    Abs18,
    /// Word offset from the instruction, wrapped to local store.
    Rel18,
    /// Hint offset of a `Lbt` instruction.
    HintA,
    /// Hint offset of a `Lbti` instruction.
    HintB,
}

type Descriptor = OpcodeDescriptor<Format, ArgShape>;

use ArgShape as A;
use Format as F;

const fn d(
    op: OpId,
    format: Format,
    opcode: u32,
    mnemonic: &'static str,
    args: &'static [ArgShape],
) -> Descriptor {
    OpcodeDescriptor {
        op,
        format,
        opcode,
        mnemonic,
        args,
    }
}

static DESCRIPTORS: [Descriptor; MNEMONICS.len()] = [
    d(OP_BR, F::Ri16, 0x190, "br", &[A::Rel18]),
    d(OP_BRSL, F::Ri16, 0x198, "brsl", &[A::Rt, A::Rel18]),
    d(OP_BRA, F::Ri16, 0x180, "bra", &[A::Abs18]),
    d(OP_BRASL, F::Ri16, 0x188, "brasl", &[A::Rt, A::Abs18]),
    d(OP_FSMBI, F::Ri16, 0x194, "fsmbi", &[A::Rt, A::Imm16]),
    d(OP_LQA, F::Ri16, 0x184, "lqa", &[A::Rt, A::Abs18]),
    d(OP_LQR, F::Ri16, 0x19c, "lqr", &[A::Rt, A::Rel18]),
    d(OP_STOP, F::Rr, 0x000, "stop", &[]),
    d(OP_STOPD, F::Rr, 0x140, "stopd", &[A::Rt, A::Ra, A::Rb]),
    d(OP_LNOP, F::Rr, 0x001, "lnop", &[]),
    d(OP_SYNC, F::Rr, 0x002, "sync", &[]),
    d(OP_DSYNC, F::Rr, 0x003, "dsync", &[]),
    d(OP_MFSPR, F::Rr, 0x00c, "mfspr", &[A::Rt, A::Spr]),
    d(OP_RDCH, F::Rr, 0x00d, "rdch", &[A::Rt, A::Channel]),
    d(OP_RCHCNT, F::Rr, 0x00f, "rchcnt", &[A::Rt, A::Channel]),
    d(OP_HBRA, F::Lbt, 0x080, "hbra", &[A::HintA, A::Abs18]),
    d(OP_HBRR, F::Lbt, 0x090, "hbrr", &[A::HintA, A::Rel18]),
    d(OP_BRZ, F::Ri16, 0x100, "brz", &[A::Rt, A::Rel18]),
    d(OP_BRNZ, F::Ri16, 0x108, "brnz", &[A::Rt, A::Rel18]),
    d(OP_BRHZ, F::Ri16, 0x110, "brhz", &[A::Rt, A::Rel18]),
    d(OP_BRHNZ, F::Ri16, 0x118, "brhnz", &[A::Rt, A::Rel18]),
    d(OP_STQA, F::Ri16, 0x104, "stqa", &[A::Rt, A::Abs18]),
    d(OP_STQR, F::Ri16, 0x11c, "stqr", &[A::Rt, A::Rel18]),
    d(OP_MTSPR, F::Rr, 0x10c, "mtspr", &[A::Spr, A::Rt]),
    d(OP_WRCH, F::Rr, 0x10d, "wrch", &[A::Channel, A::Rt]),
    d(OP_LQD, F::Ri10, 0x1a0, "lqd", &[A::Rt, A::Quad10, A::Paren, A::Ra]),
    d(OP_BI, F::Rr, 0x1a8, "bi", &[A::Ra]),
    d(OP_BISL, F::Rr, 0x1a9, "bisl", &[A::Rt, A::Ra]),
    d(OP_IRET, F::Rr, 0x1aa, "iret", &[A::Ra]),
    d(OP_BISLED, F::Rr, 0x1ab, "bisled", &[A::Rt, A::Ra]),
    d(OP_HBR, F::Lbti, 0x1ac, "hbr", &[A::HintB, A::Ra]),
    d(OP_FREST, F::Rr, 0x1b8, "frest", &[A::Rt, A::Ra]),
    d(OP_FRSQEST, F::Rr, 0x1b9, "frsqest", &[A::Rt, A::Ra]),
    d(OP_FSM, F::Rr, 0x1b4, "fsm", &[A::Rt, A::Ra]),
    d(OP_FSMH, F::Rr, 0x1b5, "fsmh", &[A::Rt, A::Ra]),
    d(OP_FSMB, F::Rr, 0x1b6, "fsmb", &[A::Rt, A::Ra]),
    d(OP_GB, F::Rr, 0x1b0, "gb", &[A::Rt, A::Ra]),
    d(OP_GBH, F::Rr, 0x1b1, "gbh", &[A::Rt, A::Ra]),
    d(OP_GBB, F::Rr, 0x1b2, "gbb", &[A::Rt, A::Ra]),
    d(OP_CBD, F::Ri7, 0x1f4, "cbd", &[A::Rt, A::Imm7, A::Paren, A::Ra]),
    d(OP_CHD, F::Ri7, 0x1f5, "chd", &[A::Rt, A::Imm7, A::Paren, A::Ra]),
    d(OP_CWD, F::Ri7, 0x1f6, "cwd", &[A::Rt, A::Imm7, A::Paren, A::Ra]),
    d(OP_CDD, F::Ri7, 0x1f7, "cdd", &[A::Rt, A::Imm7, A::Paren, A::Ra]),
    d(OP_ROTQBII, F::Ri7, 0x1f8, "rotqbii", &[A::Rt, A::Ra, A::Imm7]),
    d(OP_ROTQBYI, F::Ri7, 0x1fc, "rotqbyi", &[A::Rt, A::Ra, A::Imm7]),
    d(OP_ROTQMBII, F::Ri7, 0x1f9, "rotqmbii", &[A::Rt, A::Ra, A::Imm7]),
    d(OP_ROTQMBYI, F::Ri7, 0x1fd, "rotqmbyi", &[A::Rt, A::Ra, A::Imm7]),
    d(OP_SHLQBII, F::Ri7, 0x1fb, "shlqbii", &[A::Rt, A::Ra, A::Imm7]),
    d(OP_SHLQBYI, F::Ri7, 0x1ff, "shlqbyi", &[A::Rt, A::Ra, A::Imm7]),
    d(OP_STQD, F::Ri10, 0x120, "stqd", &[A::Rt, A::Quad10, A::Paren, A::Ra]),
    d(OP_BIHNZ, F::Rr, 0x12b, "bihnz", &[A::Rt, A::Ra]),
    d(OP_BIHZ, F::Rr, 0x12a, "bihz", &[A::Rt, A::Ra]),
    d(OP_BINZ, F::Rr, 0x129, "binz", &[A::Rt, A::Ra]),
    d(OP_BIZ, F::Rr, 0x128, "biz", &[A::Rt, A::Ra]),
    d(OP_CBX, F::Rr, 0x1d4, "cbx", &[A::Rt, A::Ra, A::Rb]),
    d(OP_CHX, F::Rr, 0x1d5, "chx", &[A::Rt, A::Ra, A::Rb]),
    d(OP_CWX, F::Rr, 0x1d6, "cwx", &[A::Rt, A::Ra, A::Rb]),
    d(OP_CDX, F::Rr, 0x1d7, "cdx", &[A::Rt, A::Ra, A::Rb]),
    d(OP_LQX, F::Rr, 0x1c4, "lqx", &[A::Rt, A::Ra, A::Rb]),
    d(OP_ROTQBI, F::Rr, 0x1d8, "rotqbi", &[A::Rt, A::Ra, A::Rb]),
    d(OP_ROTQMBI, F::Rr, 0x1d9, "rotqmbi", &[A::Rt, A::Ra, A::Rb]),
    d(OP_SHLQBI, F::Rr, 0x1db, "shlqbi", &[A::Rt, A::Ra, A::Rb]),
    d(OP_ROTQBY, F::Rr, 0x1dc, "rotqby", &[A::Rt, A::Ra, A::Rb]),
    d(OP_ROTQMBY, F::Rr, 0x1dd, "rotqmby", &[A::Rt, A::Ra, A::Rb]),
    d(OP_SHLQBY, F::Rr, 0x1df, "shlqby", &[A::Rt, A::Ra, A::Rb]),
    d(OP_ROTQBYBI, F::Rr, 0x1cc, "rotqbybi", &[A::Rt, A::Ra, A::Rb]),
    d(OP_ROTQMBYBI, F::Rr, 0x1cd, "rotqmbybi", &[A::Rt, A::Ra, A::Rb]),
    d(OP_SHLQBYBI, F::Rr, 0x1cf, "shlqbybi", &[A::Rt, A::Ra, A::Rb]),
    d(OP_STQX, F::Rr, 0x144, "stqx", &[A::Rt, A::Ra, A::Rb]),
    d(OP_SHUFB, F::Rrr, 0x580, "shufb", &[A::Rc, A::Ra, A::Rb, A::Rt]),
    d(OP_IL, F::Ri16, 0x204, "il", &[A::Rt, A::Imm16]),
    d(OP_ILH, F::Ri16, 0x20c, "ilh", &[A::Rt, A::Imm16]),
    d(OP_ILHU, F::Ri16, 0x208, "ilhu", &[A::Rt, A::Imm16]),
    d(OP_ILA, F::Ri18, 0x210, "ila", &[A::Rt, A::Imm18]),
    d(OP_NOP, F::Rr, 0x201, "nop", &[A::Rt]),
    d(OP_IOHL, F::Ri16, 0x304, "iohl", &[A::Rt, A::Imm16]),
    d(OP_ANDBI, F::Ri10, 0x0b0, "andbi", &[A::Rt, A::Ra, A::Imm10]),
    d(OP_ANDHI, F::Ri10, 0x0a8, "andhi", &[A::Rt, A::Ra, A::Imm10]),
    d(OP_ANDI, F::Ri10, 0x0a0, "andi", &[A::Rt, A::Ra, A::Imm10]),
    d(OP_ORBI, F::Ri10, 0x030, "orbi", &[A::Rt, A::Ra, A::Imm10]),
    d(OP_ORHI, F::Ri10, 0x028, "orhi", &[A::Rt, A::Ra, A::Imm10]),
    d(OP_ORI, F::Ri10, 0x020, "ori", &[A::Rt, A::Ra, A::Imm10]),
    d(OP_ORX, F::Rr, 0x1f0, "orx", &[A::Rt, A::Ra]),
    d(OP_XORBI, F::Ri10, 0x230, "xorbi", &[A::Rt, A::Ra, A::Imm10]),
    d(OP_XORHI, F::Ri10, 0x228, "xorhi", &[A::Rt, A::Ra, A::Imm10]),
    d(OP_XORI, F::Ri10, 0x220, "xori", &[A::Rt, A::Ra, A::Imm10]),
    d(OP_AHI, F::Ri10, 0x0e8, "ahi", &[A::Rt, A::Ra, A::Imm10]),
    d(OP_AI, F::Ri10, 0x0e0, "ai", &[A::Rt, A::Ra, A::Imm10]),
    d(OP_SFHI, F::Ri10, 0x068, "sfhi", &[A::Rt, A::Ra, A::Imm10]),
    d(OP_SFI, F::Ri10, 0x060, "sfi", &[A::Rt, A::Ra, A::Imm10]),
    d(OP_CGTBI, F::Ri10, 0x270, "cgtbi", &[A::Rt, A::Ra, A::Imm10]),
    d(OP_CGTHI, F::Ri10, 0x268, "cgthi", &[A::Rt, A::Ra, A::Imm10]),
    d(OP_CGTI, F::Ri10, 0x260, "cgti", &[A::Rt, A::Ra, A::Imm10]),
    d(OP_CLGTBI, F::Ri10, 0x2f0, "clgtbi", &[A::Rt, A::Ra, A::Imm10]),
    d(OP_CLGTHI, F::Ri10, 0x2e8, "clgthi", &[A::Rt, A::Ra, A::Imm10]),
    d(OP_CLGTI, F::Ri10, 0x2e0, "clgti", &[A::Rt, A::Ra, A::Imm10]),
    d(OP_CEQBI, F::Ri10, 0x3f0, "ceqbi", &[A::Rt, A::Ra, A::Imm10]),
    d(OP_CEQHI, F::Ri10, 0x3e8, "ceqhi", &[A::Rt, A::Ra, A::Imm10]),
    d(OP_CEQI, F::Ri10, 0x3e0, "ceqi", &[A::Rt, A::Ra, A::Imm10]),
    d(OP_HGTI, F::Ri10, 0x278, "hgti", &[A::Rt, A::Ra, A::Imm10]),
    d(OP_HLGTI, F::Ri10, 0x2f8, "hlgti", &[A::Rt, A::Ra, A::Imm10]),
    d(OP_HEQI, F::Ri10, 0x3f8, "heqi", &[A::Rt, A::Ra, A::Imm10]),
    d(OP_MPYI, F::Ri10, 0x3a0, "mpyi", &[A::Rt, A::Ra, A::Imm10]),
    d(OP_MPYUI, F::Ri10, 0x3a8, "mpyui", &[A::Rt, A::Ra, A::Imm10]),
    d(OP_CFLTS, F::Ri8, 0x3b0, "cflts", &[A::Rt, A::Ra, A::CfltScale]),
    d(OP_CFLTU, F::Ri8, 0x3b2, "cfltu", &[A::Rt, A::Ra, A::CfltScale]),
    d(OP_CSFLT, F::Ri8, 0x3b4, "csflt", &[A::Rt, A::Ra, A::CsfltScale]),
    d(OP_CUFLT, F::Ri8, 0x3b6, "cuflt", &[A::Rt, A::Ra, A::CsfltScale]),
    d(OP_FESD, F::Rr, 0x3b8, "fesd", &[A::Rt, A::Ra]),
    d(OP_FRDS, F::Rr, 0x3b9, "frds", &[A::Rt, A::Ra]),
    d(OP_FSCRRD, F::Rr, 0x398, "fscrrd", &[A::Rt]),
    d(OP_FSCRWR, F::Rr, 0x3ba, "fscrwr", &[A::Rt, A::Ra]),
    d(OP_CLZ, F::Rr, 0x2a5, "clz", &[A::Rt, A::Ra]),
    d(OP_CNTB, F::Rr, 0x2b4, "cntb", &[A::Rt, A::Ra]),
    d(OP_XSBH, F::Rr, 0x2b6, "xsbh", &[A::Rt, A::Ra]),
    d(OP_XSHW, F::Rr, 0x2ae, "xshw", &[A::Rt, A::Ra]),
    d(OP_XSWD, F::Rr, 0x2a6, "xswd", &[A::Rt, A::Ra]),
    d(OP_ROTI, F::Ri7, 0x078, "roti", &[A::Rt, A::Ra, A::Imm7]),
    d(OP_ROTMI, F::Ri7, 0x079, "rotmi", &[A::Rt, A::Ra, A::Imm7]),
    d(OP_ROTMAI, F::Ri7, 0x07a, "rotmai", &[A::Rt, A::Ra, A::Imm7]),
    d(OP_SHLI, F::Ri7, 0x07b, "shli", &[A::Rt, A::Ra, A::Imm7]),
    d(OP_ROTHI, F::Ri7, 0x07c, "rothi", &[A::Rt, A::Ra, A::Imm7]),
    d(OP_ROTHMI, F::Ri7, 0x07d, "rothmi", &[A::Rt, A::Ra, A::Imm7]),
    d(OP_ROTMAHI, F::Ri7, 0x07e, "rotmahi", &[A::Rt, A::Ra, A::Imm7]),
    d(OP_SHLHI, F::Ri7, 0x07f, "shlhi", &[A::Rt, A::Ra, A::Imm7]),
    d(OP_A, F::Rr, 0x0c0, "a", &[A::Rt, A::Ra, A::Rb]),
    d(OP_AH, F::Rr, 0x0c8, "ah", &[A::Rt, A::Ra, A::Rb]),
    d(OP_SF, F::Rr, 0x040, "sf", &[A::Rt, A::Ra, A::Rb]),
    d(OP_SFH, F::Rr, 0x048, "sfh", &[A::Rt, A::Ra, A::Rb]),
    d(OP_CGT, F::Rr, 0x240, "cgt", &[A::Rt, A::Ra, A::Rb]),
    d(OP_CGTB, F::Rr, 0x250, "cgtb", &[A::Rt, A::Ra, A::Rb]),
    d(OP_CGTH, F::Rr, 0x248, "cgth", &[A::Rt, A::Ra, A::Rb]),
    d(OP_CLGT, F::Rr, 0x2c0, "clgt", &[A::Rt, A::Ra, A::Rb]),
    d(OP_CLGTB, F::Rr, 0x2d0, "clgtb", &[A::Rt, A::Ra, A::Rb]),
    d(OP_CLGTH, F::Rr, 0x2c8, "clgth", &[A::Rt, A::Ra, A::Rb]),
    d(OP_CEQ, F::Rr, 0x3c0, "ceq", &[A::Rt, A::Ra, A::Rb]),
    d(OP_CEQB, F::Rr, 0x3d0, "ceqb", &[A::Rt, A::Ra, A::Rb]),
    d(OP_CEQH, F::Rr, 0x3c8, "ceqh", &[A::Rt, A::Ra, A::Rb]),
    d(OP_HGT, F::Rr, 0x258, "hgt", &[A::Rt, A::Ra, A::Rb]),
    d(OP_HLGT, F::Rr, 0x2d8, "hlgt", &[A::Rt, A::Ra, A::Rb]),
    d(OP_HEQ, F::Rr, 0x3d8, "heq", &[A::Rt, A::Ra, A::Rb]),
    d(OP_FCEQ, F::Rr, 0x3c2, "fceq", &[A::Rt, A::Ra, A::Rb]),
    d(OP_FCMEQ, F::Rr, 0x3ca, "fcmeq", &[A::Rt, A::Ra, A::Rb]),
    d(OP_FCGT, F::Rr, 0x2c2, "fcgt", &[A::Rt, A::Ra, A::Rb]),
    d(OP_FCMGT, F::Rr, 0x2ca, "fcmgt", &[A::Rt, A::Ra, A::Rb]),
    d(OP_AND, F::Rr, 0x0c1, "and", &[A::Rt, A::Ra, A::Rb]),
    d(OP_NAND, F::Rr, 0x0c9, "nand", &[A::Rt, A::Ra, A::Rb]),
    d(OP_OR, F::Rr, 0x041, "or", &[A::Rt, A::Ra, A::Rb]),
    d(OP_NOR, F::Rr, 0x049, "nor", &[A::Rt, A::Ra, A::Rb]),
    d(OP_XOR, F::Rr, 0x241, "xor", &[A::Rt, A::Ra, A::Rb]),
    d(OP_EQV, F::Rr, 0x249, "eqv", &[A::Rt, A::Ra, A::Rb]),
    d(OP_ANDC, F::Rr, 0x2c1, "andc", &[A::Rt, A::Ra, A::Rb]),
    d(OP_ORC, F::Rr, 0x2c9, "orc", &[A::Rt, A::Ra, A::Rb]),
    d(OP_ABSDB, F::Rr, 0x053, "absdb", &[A::Rt, A::Ra, A::Rb]),
    d(OP_AVGB, F::Rr, 0x0d3, "avgb", &[A::Rt, A::Ra, A::Rb]),
    d(OP_SUMB, F::Rr, 0x253, "sumb", &[A::Rt, A::Ra, A::Rb]),
    d(OP_DFA, F::Rr, 0x2cc, "dfa", &[A::Rt, A::Ra, A::Rb]),
    d(OP_DFM, F::Rr, 0x2ce, "dfm", &[A::Rt, A::Ra, A::Rb]),
    d(OP_DFS, F::Rr, 0x2cd, "dfs", &[A::Rt, A::Ra, A::Rb]),
    d(OP_FA, F::Rr, 0x2c4, "fa", &[A::Rt, A::Ra, A::Rb]),
    d(OP_FM, F::Rr, 0x2c6, "fm", &[A::Rt, A::Ra, A::Rb]),
    d(OP_FS, F::Rr, 0x2c5, "fs", &[A::Rt, A::Ra, A::Rb]),
    d(OP_MPY, F::Rr, 0x3c4, "mpy", &[A::Rt, A::Ra, A::Rb]),
    d(OP_MPYH, F::Rr, 0x3c5, "mpyh", &[A::Rt, A::Ra, A::Rb]),
    d(OP_MPYHH, F::Rr, 0x3c6, "mpyhh", &[A::Rt, A::Ra, A::Rb]),
    d(OP_MPYHHU, F::Rr, 0x3ce, "mpyhhu", &[A::Rt, A::Ra, A::Rb]),
    d(OP_MPYS, F::Rr, 0x3c7, "mpys", &[A::Rt, A::Ra, A::Rb]),
    d(OP_MPYU, F::Rr, 0x3cc, "mpyu", &[A::Rt, A::Ra, A::Rb]),
    d(OP_FI, F::Rr, 0x3d4, "fi", &[A::Rt, A::Ra, A::Rb]),
    d(OP_ROT, F::Rr, 0x058, "rot", &[A::Rt, A::Ra, A::Rb]),
    d(OP_ROTM, F::Rr, 0x059, "rotm", &[A::Rt, A::Ra, A::Rb]),
    d(OP_ROTMA, F::Rr, 0x05a, "rotma", &[A::Rt, A::Ra, A::Rb]),
    d(OP_SHL, F::Rr, 0x05b, "shl", &[A::Rt, A::Ra, A::Rb]),
    d(OP_ROTH, F::Rr, 0x05c, "roth", &[A::Rt, A::Ra, A::Rb]),
    d(OP_ROTHM, F::Rr, 0x05d, "rothm", &[A::Rt, A::Ra, A::Rb]),
    d(OP_ROTMAH, F::Rr, 0x05e, "rotmah", &[A::Rt, A::Ra, A::Rb]),
    d(OP_SHLH, F::Rr, 0x05f, "shlh", &[A::Rt, A::Ra, A::Rb]),
    d(OP_MPYHHA, F::Rr, 0x346, "mpyhha", &[A::Rt, A::Ra, A::Rb]),
    d(OP_MPYHHAU, F::Rr, 0x34e, "mpyhhau", &[A::Rt, A::Ra, A::Rb]),
    d(OP_DFMA, F::Rr, 0x35c, "dfma", &[A::Rt, A::Ra, A::Rb]),
    d(OP_DFMS, F::Rr, 0x35d, "dfms", &[A::Rt, A::Ra, A::Rb]),
    d(OP_DFNMS, F::Rr, 0x35e, "dfnms", &[A::Rt, A::Ra, A::Rb]),
    d(OP_DFNMA, F::Rr, 0x35f, "dfnma", &[A::Rt, A::Ra, A::Rb]),
    d(OP_FMA, F::Rrr, 0x700, "fma", &[A::Rc, A::Ra, A::Rb, A::Rt]),
    d(OP_FMS, F::Rrr, 0x780, "fms", &[A::Rc, A::Ra, A::Rb, A::Rt]),
    d(OP_FNMS, F::Rrr, 0x680, "fnms", &[A::Rc, A::Ra, A::Rb, A::Rt]),
    d(OP_MPYA, F::Rrr, 0x600, "mpya", &[A::Rc, A::Ra, A::Rb, A::Rt]),
    d(OP_SELB, F::Rrr, 0x400, "selb", &[A::Rc, A::Ra, A::Rb, A::Rt]),
    d(OP_ADDX, F::Rr, 0x340, "addx", &[A::Rt, A::Ra, A::Rb]),
    d(OP_CG, F::Rr, 0x0c2, "cg", &[A::Rt, A::Ra, A::Rb]),
    d(OP_CGX, F::Rr, 0x342, "cgx", &[A::Rt, A::Ra, A::Rb]),
    d(OP_SFX, F::Rr, 0x341, "sfx", &[A::Rt, A::Ra, A::Rb]),
    d(OP_BG, F::Rr, 0x042, "bg", &[A::Rt, A::Ra, A::Rb]),
    d(OP_BGX, F::Rr, 0x343, "bgx", &[A::Rt, A::Ra, A::Rb]),
];

const fn rrr(f: Format) -> bool {
    matches!(f, Format::Rrr)
}

const fn ri18_or_lbt(f: Format) -> bool {
    matches!(f, Format::Ri18 | Format::Lbt)
}

const fn ri10(f: Format) -> bool {
    matches!(f, Format::Ri10)
}

const fn ri16(f: Format) -> bool {
    matches!(f, Format::Ri16)
}

const fn ri8(f: Format) -> bool {
    matches!(f, Format::Ri8)
}

// Widest opcode field last; anything left matches the full 11 bits.
static STEPS: [MaskStep<Format>; 6] = [
    MaskStep {
        mask: 0x780,
        accepts: Some(rrr),
    },
    MaskStep {
        mask: 0x7f0,
        accepts: Some(ri18_or_lbt),
    },
    MaskStep {
        mask: 0x7f8,
        accepts: Some(ri10),
    },
    MaskStep {
        mask: 0x7fc,
        accepts: Some(ri16),
    },
    MaskStep {
        mask: 0x7fe,
        accepts: Some(ri8),
    },
    MaskStep {
        mask: 0x7ff,
        accepts: None,
    },
];

pub static TABLE: OpcodeTable<Format, ArgShape> = OpcodeTable::new(&DESCRIPTORS, &STEPS, 21);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_descriptor_resolves_to_itself() {
        for desc in TABLE.descriptors() {
            let found = TABLE.lookup(desc.opcode << 21).unwrap();
            assert_eq!(found.op, desc.op, "{}", desc.mnemonic);
        }
    }

    #[test]
    fn test_descriptor_order_matches_op_ids() {
        for (i, desc) in TABLE.descriptors().iter().enumerate() {
            assert_eq!(usize::from(desc.op.idx), i);
            assert_eq!(spu_mnemonic(desc.op), desc.mnemonic);
        }
    }

    #[test]
    fn test_operand_bits_do_not_change_the_opcode() {
        // ai $3, $4, -1
        let desc = TABLE.lookup(0x1cff_c203).unwrap();
        assert_eq!(desc.op, OP_AI);
        // mpya $3, $4, $5, $6
        let desc = TABLE.lookup(0xc061_4206).unwrap();
        assert_eq!(desc.op, OP_MPYA);
    }

    #[test]
    fn test_unassigned_opcode() {
        assert!(TABLE.lookup(0x0080_0000).is_none());
    }
}
