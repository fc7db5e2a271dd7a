//! Decoded instructions in the canonical operand model.

use std::fmt;

use crate::registers::RegisterCatalog;
use crate::types::{InstrFlags, OpId, RegisterId};

/// Decoded operand.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Operand {
    Register {
        reg: RegisterId,
        size: u32,
    },
    Immediate {
        value: i64,
        size: u32,
    },
    /// `[base + displacement]`, or `[displacement]` when `base` is `None`.
    Memory {
        base: Option<RegisterId>,
        displacement: i64,
        size: u32,
    },
}

impl Operand {
    #[must_use]
    pub const fn reg(reg: RegisterId, size: u32) -> Self {
        Self::Register { reg, size }
    }

    #[must_use]
    pub const fn imm(value: i64, size: u32) -> Self {
        Self::Immediate { value, size }
    }

    #[must_use]
    pub const fn mem(base: Option<RegisterId>, displacement: i64, size: u32) -> Self {
        Self::Memory {
            base,
            displacement,
            size,
        }
    }

    #[must_use]
    pub const fn as_register(&self) -> Option<RegisterId> {
        match self {
            Self::Register { reg, .. } => Some(*reg),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_immediate(&self) -> Option<i64> {
        match self {
            Self::Immediate { value, .. } => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub const fn size(&self) -> u32 {
        match self {
            Self::Register { size, .. }
            | Self::Immediate { size, .. }
            | Self::Memory { size, .. } => *size,
        }
    }
}

/// A decoded instruction.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Instruction {
    pub address: u64,
    /// Length in bytes.
    pub size: u8,
    /// Raw instruction bytes.
    pub bytes: Vec<u8>,
    pub opcode: OpId,
    pub mnemonic: &'static str,
    pub operands: Vec<Operand>,
    pub flags: InstrFlags,
}

impl Instruction {
    /// Address of the next sequential instruction, `None` past the end of
    /// the address space.
    #[must_use]
    pub const fn end_address(&self) -> Option<u64> {
        self.address.checked_add(self.size as u64)
    }

    #[must_use]
    pub fn operand(&self, index: usize) -> Option<&Operand> {
        self.operands.get(index)
    }

    #[must_use]
    pub fn operand_count(&self) -> usize {
        self.operands.len()
    }
}

impl Instruction {
    /// Disassembly text using register names from `catalog`.
    #[must_use]
    pub const fn display<'a>(&'a self, catalog: &'a RegisterCatalog) -> Disassembly<'a> {
        Disassembly {
            instr: self,
            catalog: Some(catalog),
        }
    }
}

/// Display adapter for an instruction.
pub struct Disassembly<'a> {
    instr: &'a Instruction,
    catalog: Option<&'a RegisterCatalog>,
}

impl Disassembly<'_> {
    fn write_reg(&self, f: &mut fmt::Formatter<'_>, reg: RegisterId) -> fmt::Result {
        match self.catalog.and_then(|c| c.register(reg).ok()) {
            Some(register) => f.write_str(&register.name),
            None => write!(f, "{reg}"),
        }
    }
}

impl fmt::Display for Disassembly<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let instr = self.instr;
        f.write_str(instr.mnemonic)?;
        if instr.flags.record {
            f.write_str(".")?;
        }
        for (i, operand) in instr.operands.iter().enumerate() {
            f.write_str(if i == 0 { " " } else { ", " })?;
            match operand {
                Operand::Register { reg, .. } => self.write_reg(f, *reg)?,
                Operand::Immediate { value, .. } if *value < 0 => {
                    write!(f, "-0x{:x}", value.unsigned_abs())?;
                }
                Operand::Immediate { value, .. } => write!(f, "0x{value:x}")?,
                Operand::Memory {
                    base: Some(base),
                    displacement,
                    ..
                } => {
                    write!(f, "{displacement}(")?;
                    self.write_reg(f, *base)?;
                    f.write_str(")")?;
                }
                Operand::Memory {
                    base: None,
                    displacement,
                    ..
                } => write!(f, "(0x{displacement:x})")?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let disassembly = Disassembly {
            instr: self,
            catalog: None,
        };
        fmt::Display::fmt(&disassembly, f)
    }
}
