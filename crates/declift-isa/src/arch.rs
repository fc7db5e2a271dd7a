//! Architecture: everything needed to lift code for one target.

use declift_ir::{ByteOrder, Domain, Program};

use crate::convention::CallingConvention;
use crate::decoder::OperandDecoder;
use crate::error::Result;
use crate::instruction::Instruction;
use crate::lifter::{InstructionLifter, LiftReport, lift_undecoded};
use crate::registers::RegisterCatalog;

/// A target bound to a byte order.
///
/// Immutable once built and shared by reference between threads lifting
/// different functions.
pub struct Architecture {
    name: &'static str,
    bitness: u32,
    memory_byte_order: ByteOrder,
    register_byte_order: ByteOrder,
    catalog: &'static RegisterCatalog,
    decoder: Box<dyn OperandDecoder>,
    lifter: InstructionLifter,
    conventions: Vec<CallingConvention>,
}

/// One lifted instruction.
#[derive(Debug)]
pub struct LiftedInstruction {
    /// `None` if the bytes could not be decoded.
    pub instruction: Option<Instruction>,
    pub report: LiftReport,
    /// Bytes consumed.
    pub size: u64,
}

impl Architecture {
    pub fn new(
        name: &'static str,
        bitness: u32,
        memory_byte_order: ByteOrder,
        catalog: &'static RegisterCatalog,
        decoder: Box<dyn OperandDecoder>,
        lifter: InstructionLifter,
    ) -> Self {
        Self {
            name,
            bitness,
            memory_byte_order,
            register_byte_order: ByteOrder::Little,
            catalog,
            decoder,
            lifter,
            conventions: Vec::new(),
        }
    }

    /// Byte order of values in the register file. Little-endian unless set.
    #[must_use]
    pub const fn with_register_byte_order(mut self, order: ByteOrder) -> Self {
        self.register_byte_order = order;
        self
    }

    #[must_use]
    pub fn with_convention(mut self, convention: CallingConvention) -> Self {
        self.conventions.push(convention);
        self
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn bitness(&self) -> u32 {
        self.bitness
    }

    /// Maximum instruction length in bytes.
    #[must_use]
    pub fn max_instruction_size(&self) -> usize {
        self.decoder.instruction_width()
    }

    /// Byte order used to interpret values in `domain`.
    ///
    /// Memory and stack follow the target's data byte order regardless of
    /// how code is encoded.
    #[must_use]
    pub const fn byte_order(&self, domain: Domain) -> ByteOrder {
        match domain {
            Domain::Register => self.register_byte_order,
            Domain::Memory | Domain::Stack => self.memory_byte_order,
        }
    }

    #[must_use]
    pub const fn catalog(&self) -> &'static RegisterCatalog {
        self.catalog
    }

    #[must_use]
    pub fn decoder(&self) -> &dyn OperandDecoder {
        self.decoder.as_ref()
    }

    #[must_use]
    pub const fn lifter(&self) -> &InstructionLifter {
        &self.lifter
    }

    #[must_use]
    pub fn conventions(&self) -> &[CallingConvention] {
        &self.conventions
    }

    #[must_use]
    pub fn convention(&self, name: &str) -> Option<&CallingConvention> {
        self.conventions.iter().find(|c| c.name() == name)
    }

    /// Decode and lift the instruction at the start of `bytes`.
    ///
    /// # Errors
    ///
    /// `MisalignedInstruction` and `Truncated` are returned so the caller
    /// can resynchronize. Every other decode failure is lifted as one
    /// opaque effect. IR errors are returned.
    pub fn lift_instruction(
        &self,
        bytes: &[u8],
        address: u64,
        program: &mut Program,
    ) -> Result<LiftedInstruction> {
        match self.decoder.decode(bytes, address) {
            Ok(instruction) => {
                let report = self.lifter.lift(&instruction, program)?;
                Ok(LiftedInstruction {
                    size: u64::from(instruction.size),
                    instruction: Some(instruction),
                    report,
                })
            }
            Err(error) if error.needs_resync() => Err(error),
            Err(error) => {
                let size = self.decoder.instruction_width() as u64;
                let report = lift_undecoded(address, size, error, program)?;
                Ok(LiftedInstruction {
                    instruction: None,
                    report,
                    size,
                })
            }
        }
    }
}

impl std::fmt::Debug for Architecture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Architecture")
            .field("name", &self.name)
            .field("bitness", &self.bitness)
            .field("memory_byte_order", &self.memory_byte_order)
            .field("register_byte_order", &self.register_byte_order)
            .field("conventions", &self.conventions.len())
            .finish_non_exhaustive()
    }
}
