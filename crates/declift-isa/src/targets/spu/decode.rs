//! Table-driven SPU decoder.

use declift_ir::ByteOrder;

use super::registers::gpr;
use super::table::{ArgShape, TABLE};
use crate::bitfield::{signed_field, unsigned_field};
use crate::decoder::{OperandDecoder, fixed_width_bytes, read_word};
use crate::error::{LiftError, Result};
use crate::instruction::{Instruction, Operand};
use crate::types::InstrFlags;

const WIDTH: usize = 4;
const REGISTER_SIZE: u32 = 128;
const LOCAL_STORE_MASK: i64 = 0x3ffff;

/// Decodes SPU instructions from the opcode table.
#[derive(Clone, Copy, Debug, Default)]
pub struct SpuDecoder;

const fn rt(word: u32) -> u32 {
    unsigned_field(word, 0, 7)
}

const fn ra(word: u32) -> u32 {
    unsigned_field(word, 7, 7)
}

const fn rb(word: u32) -> u32 {
    unsigned_field(word, 14, 7)
}

const fn rc(word: u32) -> u32 {
    unsigned_field(word, 21, 7)
}

const fn i9a(word: u32) -> i64 {
    ((signed_field(word, 23, 2) as i64) << 7) | unsigned_field(word, 0, 7) as i64
}

const fn i9b(word: u32) -> i64 {
    ((signed_field(word, 14, 2) as i64) << 7) | unsigned_field(word, 0, 7) as i64
}

fn register(n: u32) -> Operand {
    Operand::reg(gpr(n), REGISTER_SIZE)
}

fn immediate(value: i64) -> Operand {
    Operand::imm(value, REGISTER_SIZE)
}

/// Operands of `word` at `address`, extracted in `args` order.
fn operands(word: u32, address: u64, args: &[ArgShape]) -> Vec<Operand> {
    let address = address as i64;
    let mut operands: Vec<Operand> = Vec::with_capacity(args.len());
    let mut paren = false;
    for &arg in args {
        let operand = match arg {
            ArgShape::Paren => {
                paren = true;
                continue;
            }
            ArgShape::Ra if paren => {
                paren = false;
                match operands.pop() {
                    Some(Operand::Immediate { value, .. }) => {
                        Operand::mem(Some(gpr(ra(word))), value, REGISTER_SIZE)
                    }
                    other => {
                        operands.extend(other);
                        register(ra(word))
                    }
                }
            }
            ArgShape::Rt => register(rt(word)),
            ArgShape::Ra => register(ra(word)),
            ArgShape::Rb => register(rb(word)),
            ArgShape::Rc => register(rc(word)),
            ArgShape::Spr | ArgShape::Channel => immediate(i64::from(ra(word))),
            ArgShape::CfltScale => immediate(173 - i64::from(unsigned_field(word, 14, 8))),
            ArgShape::CsfltScale => immediate(155 - i64::from(unsigned_field(word, 14, 8))),
            ArgShape::Imm7 => immediate(i64::from(signed_field(word, 14, 7))),
            ArgShape::Imm10 => immediate(i64::from(signed_field(word, 14, 10))),
            ArgShape::Quad10 => immediate(i64::from(signed_field(word, 14, 10)) * 16),
            ArgShape::Imm16 => immediate(i64::from(signed_field(word, 7, 16))),
            ArgShape::Imm18 => immediate(i64::from(unsigned_field(word, 7, 18))),
            ArgShape::Abs18 => immediate(i64::from(unsigned_field(word, 7, 16)) * 4),
            ArgShape::Rel18 => {
                let offset = i64::from(signed_field(word, 7, 16)) * 4;
                immediate(address.wrapping_add(offset) & LOCAL_STORE_MASK)
            }
            ArgShape::HintA => immediate(address.wrapping_add(i9a(word) * 4)),
            ArgShape::HintB => immediate(address.wrapping_add(i9b(word) * 4)),
        };
        operands.push(operand);
    }
    operands
}

impl OperandDecoder for SpuDecoder {
    fn instruction_width(&self) -> usize {
        WIDTH
    }

    fn decode(&self, bytes: &[u8], address: u64) -> Result<Instruction> {
        let bytes = fixed_width_bytes(bytes, address, WIDTH)?;
        let word = read_word(bytes, ByteOrder::Big).unwrap_or_default();
        let desc = TABLE
            .lookup(word)
            .ok_or(LiftError::UnrecognizedOpcode { address, word })?;
        Ok(Instruction {
            address,
            size: WIDTH as u8,
            bytes: bytes.to_vec(),
            opcode: desc.op,
            mnemonic: desc.mnemonic,
            operands: operands(word, address, desc.args),
            flags: InstrFlags::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::targets::spu::{OP_AI, OP_BR, OP_BRZ, OP_HBRR, OP_LQD, OP_MPYA, OP_RDCH};

    fn decode(word: u32, address: u64) -> Instruction {
        SpuDecoder.decode(&word.to_be_bytes(), address).unwrap()
    }

    #[test]
    fn test_register_and_immediate_fields() {
        // ai $3, $4, -1
        let instr = decode(0x1cff_c203, 0);
        assert_eq!(instr.opcode, OP_AI);
        assert_eq!(instr.operands, vec![register(3), register(4), immediate(-1)]);
    }

    #[test]
    fn test_rrr_target_is_the_high_field() {
        // mpya $3, $4, $5, $6
        let instr = decode(0xc061_4206, 0);
        assert_eq!(instr.opcode, OP_MPYA);
        assert_eq!(instr.operands, vec![
            register(3),
            register(4),
            register(5),
            register(6)
        ]);
    }

    #[test]
    fn test_quadword_displacement_becomes_memory_operand() {
        // lqd $5, 32($1)
        let instr = decode(0x3400_8085, 0x100);
        assert_eq!(instr.opcode, OP_LQD);
        assert_eq!(instr.operands, vec![
            register(5),
            Operand::mem(Some(gpr(1)), 32, 128)
        ]);
    }

    #[test]
    fn test_relative_targets_wrap_to_local_store() {
        // br -4 from 0
        let instr = decode(0x327f_ff80, 0);
        assert_eq!(instr.opcode, OP_BR);
        assert_eq!(instr.operands, vec![immediate(0x3fffc)]);
        // brz $3, +8 from 0x200
        let instr = decode(0x2000_0103, 0x200);
        assert_eq!(instr.opcode, OP_BRZ);
        assert_eq!(instr.operands, vec![register(3), immediate(0x208)]);
        // zero offset is the instruction itself
        let instr = decode(0x3200_0000, 0x40);
        assert_eq!(instr.operands, vec![immediate(0x40)]);
    }

    #[test]
    fn test_relative_targets_near_the_top_of_the_address_range() {
        // brz $3, +8 from the last word below 1 << 63
        let instr = decode(0x2000_0103, 0x7fff_ffff_ffff_fffc);
        assert_eq!(instr.operands, vec![register(3), immediate(4)]);
    }

    #[test]
    fn test_hint_offset() {
        // hbrr with hint offset 2 words, target +16
        let word = (0x090 << 21) | (4 << 7) | 2;
        let instr = decode(word, 0x1000);
        assert_eq!(instr.opcode, OP_HBRR);
        assert_eq!(instr.operands, vec![immediate(0x1008), immediate(0x1010)]);
    }

    #[test]
    fn test_channel_is_an_immediate() {
        // rdch $3, $ch29
        let instr = decode((0x00d << 21) | (29 << 7) | 3, 0);
        assert_eq!(instr.opcode, OP_RDCH);
        assert_eq!(instr.operands, vec![register(3), immediate(29)]);
    }

    #[test]
    fn test_unassigned_word() {
        assert_eq!(
            SpuDecoder.decode(&0x0080_0000u32.to_be_bytes(), 0x10),
            Err(LiftError::UnrecognizedOpcode {
                address: 0x10,
                word: 0x0080_0000
            })
        );
    }

    #[test]
    fn test_alignment() {
        assert_eq!(
            SpuDecoder.decode(&[0; 4], 0x12),
            Err(LiftError::MisalignedInstruction {
                address: 0x12,
                width: 4
            })
        );
    }
}
