//! Operand decoding contracts.
//!
//! A target decodes raw bytes either by delegating to a disassembly service
//! (wrapped by [`DelegatingDecoder`]) or with a table-driven bitfield decoder
//! (see [`crate::OpcodeTable`]). Lifting code only sees [`Instruction`].

use declift_ir::ByteOrder;

use crate::error::{LiftError, Result};
use crate::instruction::{Instruction, Operand};
use crate::registers::RegisterCatalog;
use crate::types::{InstrFlags, OpId, RegisterId};

/// Turns raw bytes into a canonical instruction.
///
/// Decoding is pure: the same bytes at the same address always give the
/// same instruction.
pub trait OperandDecoder: Send + Sync {
    /// Fixed instruction width in bytes.
    fn instruction_width(&self) -> usize;

    /// Decode one instruction from the start of `bytes`.
    ///
    /// # Errors
    ///
    /// `MisalignedInstruction` and `Truncated` when no instruction can be
    /// read at `address`; `UnrecognizedOpcode` or `UnknownRegister` when the
    /// word cannot be mapped.
    fn decode(&self, bytes: &[u8], address: u64) -> Result<Instruction>;
}

/// Check alignment and length for a fixed-width instruction and return its bytes.
///
/// # Errors
///
/// `MisalignedInstruction` if `address` is not a multiple of `width`,
/// `Truncated` if fewer than `width` bytes are available or the instruction
/// would run past the end of the address space.
pub fn fixed_width_bytes(bytes: &[u8], address: u64, width: usize) -> Result<&[u8]> {
    if width > 1 && address % width as u64 != 0 {
        return Err(LiftError::MisalignedInstruction { address, width });
    }
    instruction_end(address, width)?;
    bytes.get(..width).ok_or(LiftError::Truncated {
        address,
        needed: width,
        available: bytes.len(),
    })
}

/// Address just past an instruction of `size` bytes at `address`.
///
/// # Errors
///
/// `Truncated` if the instruction does not fit below the top of the address
/// space.
pub fn instruction_end(address: u64, size: usize) -> Result<u64> {
    address
        .checked_add(size as u64)
        .ok_or_else(|| LiftError::Truncated {
            address,
            needed: size,
            available: usize::try_from(u64::MAX - address).map_or(usize::MAX, |n| n + 1),
        })
}

/// Read the first instruction word in `order`.
#[must_use]
pub fn read_word(bytes: &[u8], order: ByteOrder) -> Option<u32> {
    let word: [u8; 4] = bytes.get(..4)?.try_into().ok()?;
    Some(order.read_u32(word))
}

/// Mode handed to a disassembly service.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct DecodeMode {
    /// Byte order of the instruction stream.
    pub byte_order: ByteOrder,
    pub bitness: u32,
}

/// Operand as reported by a disassembly service, in the service's own
/// register numbering.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RawOperand {
    Reg(u32),
    Imm(i64),
    Mem {
        base: Option<u32>,
        disp: i64,
        size: u32,
    },
}

/// Instruction as reported by a disassembly service.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RawInstruction {
    pub opcode: OpId,
    pub mnemonic: &'static str,
    pub size: u8,
    pub operands: Vec<RawOperand>,
    pub flags: InstrFlags,
}

/// External disassembly service.
///
/// Returns `None` for anything it cannot decode, including misaligned
/// fixed-width instructions.
pub trait Disassembler: Send + Sync {
    fn disassemble(&self, bytes: &[u8], address: u64, mode: DecodeMode)
    -> Option<RawInstruction>;
}

/// Maps a service register number to a catalog id.
pub type RegisterMap = fn(u32) -> Option<RegisterId>;

/// Wraps a disassembly service into the canonical operand model.
pub struct DelegatingDecoder<D> {
    service: D,
    mode: DecodeMode,
    width: usize,
    catalog: &'static RegisterCatalog,
    map_register: RegisterMap,
}

impl<D: Disassembler> DelegatingDecoder<D> {
    pub const fn new(
        service: D,
        mode: DecodeMode,
        width: usize,
        catalog: &'static RegisterCatalog,
        map_register: RegisterMap,
    ) -> Self {
        Self {
            service,
            mode,
            width,
            catalog,
            map_register,
        }
    }

    #[must_use]
    pub const fn mode(&self) -> DecodeMode {
        self.mode
    }

    fn register(&self, raw: u32) -> Result<(RegisterId, u32)> {
        let id = (self.map_register)(raw).ok_or(LiftError::UnknownRegister(raw))?;
        let location = self.catalog.lookup(id)?;
        Ok((id, location.size))
    }

    fn operand(&self, raw: RawOperand) -> Result<Operand> {
        Ok(match raw {
            RawOperand::Reg(n) => {
                let (reg, size) = self.register(n)?;
                Operand::reg(reg, size)
            }
            RawOperand::Imm(value) => Operand::imm(value, self.mode.bitness),
            RawOperand::Mem { base, disp, size } => {
                let base = base.map(|b| self.register(b).map(|(id, _)| id)).transpose()?;
                Operand::mem(base, disp, size)
            }
        })
    }
}

impl<D: Disassembler> OperandDecoder for DelegatingDecoder<D> {
    fn instruction_width(&self) -> usize {
        self.width
    }

    fn decode(&self, bytes: &[u8], address: u64) -> Result<Instruction> {
        let bytes = fixed_width_bytes(bytes, address, self.width)?;
        let raw = self
            .service
            .disassemble(bytes, address, self.mode)
            .ok_or_else(|| LiftError::UnrecognizedOpcode {
                address,
                word: read_word(bytes, self.mode.byte_order).unwrap_or_default(),
            })?;
        let operands = raw
            .operands
            .into_iter()
            .map(|op| self.operand(op))
            .collect::<Result<Vec<_>>>()?;
        Ok(Instruction {
            address,
            size: raw.size,
            bytes: bytes[..usize::from(raw.size).min(bytes.len())].to_vec(),
            opcode: raw.opcode,
            mnemonic: raw.mnemonic,
            operands,
            flags: raw.flags,
        })
    }
}
