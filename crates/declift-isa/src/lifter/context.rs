//! Per-instruction lifting context.

use declift_ir::{
    BlockId, Domain, IrError, Jump, JumpTarget, MemoryLocation, Program, Statement, Term,
};

use crate::error::{LiftError, Result};
use crate::instruction::{Instruction, Operand};
use crate::registers::RegisterCatalog;
use crate::types::{InstrFlags, RegisterId};

/// Block created by a rule, not yet in the program.
#[derive(Debug)]
struct PendingBlock {
    id: BlockId,
    address: Option<u64>,
    statements: Vec<Statement>,
}

/// What a lifting rule sees and writes to.
///
/// The program is read-only while a rule runs. Statements and new blocks
/// are buffered and only committed once the rule has succeeded, so a
/// failing rule leaves the program untouched.
pub struct LiftContext<'a> {
    instr: &'a Instruction,
    catalog: &'a RegisterCatalog,
    word_size: u32,
    program: &'a Program,
    block: BlockId,
    end: u64,
    statements: Vec<Statement>,
    pending: Vec<PendingBlock>,
    successor: Option<BlockId>,
}

impl<'a> LiftContext<'a> {
    pub(crate) fn new(
        instr: &'a Instruction,
        catalog: &'a RegisterCatalog,
        word_size: u32,
        program: &'a Program,
        block: BlockId,
        end: u64,
    ) -> Self {
        Self {
            instr,
            catalog,
            word_size,
            program,
            block,
            end,
            statements: Vec::new(),
            pending: Vec::new(),
            successor: None,
        }
    }

    #[must_use]
    pub const fn instr(&self) -> &'a Instruction {
        self.instr
    }

    /// Address of the next sequential instruction.
    #[must_use]
    pub const fn end_address(&self) -> u64 {
        self.end
    }

    #[must_use]
    pub const fn address(&self) -> u64 {
        self.instr.address
    }

    #[must_use]
    pub const fn flags(&self) -> InstrFlags {
        self.instr.flags
    }

    /// Width of a general purpose register in bits.
    #[must_use]
    pub const fn word_size(&self) -> u32 {
        self.word_size
    }

    #[must_use]
    pub const fn catalog(&self) -> &'a RegisterCatalog {
        self.catalog
    }

    /// Block the instruction's own statements go to.
    #[must_use]
    pub const fn block(&self) -> BlockId {
        self.block
    }

    /// Operand `index`.
    ///
    /// # Errors
    ///
    /// `MissingOperand` if the instruction has fewer operands.
    pub fn operand(&self, index: usize) -> Result<Operand> {
        self.instr
            .operand(index)
            .copied()
            .ok_or(LiftError::MissingOperand(index))
    }

    /// Register named by operand `index`.
    ///
    /// # Errors
    ///
    /// `MissingOperand`, or `UnexpectedOperand` if it is not a register.
    pub fn register_operand(&self, index: usize) -> Result<RegisterId> {
        self.operand(index)?
            .as_register()
            .ok_or(LiftError::UnexpectedOperand {
                index,
                expected: "a register",
            })
    }

    /// Value of immediate operand `index`.
    ///
    /// # Errors
    ///
    /// `MissingOperand`, or `UnexpectedOperand` if it is not an immediate.
    pub fn immediate(&self, index: usize) -> Result<i64> {
        self.operand(index)?
            .as_immediate()
            .ok_or(LiftError::UnexpectedOperand {
                index,
                expected: "an immediate",
            })
    }

    /// # Errors
    ///
    /// `UnknownRegister` if the catalog has no such register.
    pub fn location(&self, reg: RegisterId) -> Result<MemoryLocation> {
        self.catalog.lookup(reg)
    }

    /// Access to a register.
    ///
    /// # Errors
    ///
    /// `UnknownRegister` if the catalog has no such register.
    pub fn reg(&self, reg: RegisterId) -> Result<Term> {
        Ok(Term::access(self.location(reg)?))
    }

    /// Word-sized constant.
    #[must_use]
    pub const fn constant(&self, value: i64) -> Term {
        Term::signed_constant(value, self.word_size)
    }

    /// Term for operand `index`: register access, constant, or memory
    /// dereference.
    ///
    /// # Errors
    ///
    /// `MissingOperand` or `UnknownRegister`.
    pub fn operand_term(&self, index: usize) -> Result<Term> {
        match self.operand(index)? {
            Operand::Register { reg, .. } => self.reg(reg),
            Operand::Immediate { value, size } => Ok(Term::signed_constant(value, size)),
            Operand::Memory { size, .. } => Ok(Term::dereference(
                self.address_term(index)?,
                Domain::Memory,
                size,
            )),
        }
    }

    /// Effective address of memory operand `index`, or the value of an
    /// immediate operand used as an address.
    ///
    /// # Errors
    ///
    /// `MissingOperand`, `UnknownRegister`, or `UnexpectedOperand` for a
    /// register operand.
    pub fn address_term(&self, index: usize) -> Result<Term> {
        match self.operand(index)? {
            Operand::Memory {
                base: Some(base),
                displacement: 0,
                ..
            } => self.reg(base),
            Operand::Memory {
                base: Some(base),
                displacement,
                ..
            } => Ok(Term::add(self.reg(base)?, self.constant(displacement))),
            Operand::Memory {
                base: None,
                displacement,
                ..
            }
            | Operand::Immediate {
                value: displacement,
                ..
            } => Ok(self.constant(displacement)),
            Operand::Register { .. } => Err(LiftError::UnexpectedOperand {
                index,
                expected: "an address",
            }),
        }
    }

    /// Append a statement to the instruction's own block.
    ///
    /// # Errors
    ///
    /// `BlockSealed` if a terminal statement was already emitted.
    pub fn emit(&mut self, statement: Statement) -> Result<()> {
        if self.statements.last().is_some_and(Statement::is_terminal) {
            return Err(IrError::BlockSealed { block: self.block }.into());
        }
        self.statements.push(statement);
        Ok(())
    }

    /// Emit `left := right`.
    ///
    /// # Errors
    ///
    /// See [`Self::emit`].
    pub fn assign(&mut self, left: Term, right: Term) -> Result<()> {
        self.emit(Statement::assign(left, right))
    }

    /// Emit `reg := value`.
    ///
    /// # Errors
    ///
    /// `UnknownRegister`, or see [`Self::emit`].
    pub fn set(&mut self, reg: RegisterId, value: Term) -> Result<()> {
        let left = self.reg(reg)?;
        self.assign(left, value)
    }

    /// Emit a jump from the instruction's own block.
    ///
    /// # Errors
    ///
    /// See [`Self::emit`].
    pub fn jump(&mut self, jump: Jump) -> Result<()> {
        self.emit(Statement::jump(jump))
    }

    /// Emit an unconditional jump.
    ///
    /// # Errors
    ///
    /// See [`Self::emit`].
    pub fn goto(&mut self, target: impl Into<JumpTarget>) -> Result<()> {
        self.jump(Jump::to(target))
    }

    /// Emit a call.
    ///
    /// # Errors
    ///
    /// See [`Self::emit`].
    pub fn call(&mut self, target: Term) -> Result<()> {
        self.emit(Statement::call(target))
    }

    /// Emit an opaque effect.
    ///
    /// # Errors
    ///
    /// See [`Self::emit`].
    pub fn opaque(&mut self) -> Result<()> {
        self.emit(Statement::OpaqueEffect)
    }

    /// Block that falls through past this instruction.
    ///
    /// Created on first use and reused for the rest of the instruction.
    pub fn direct_successor(&mut self) -> BlockId {
        if let Some(id) = self.successor {
            return id;
        }
        let end = self.end;
        let id = self
            .program
            .block_at(end)
            .unwrap_or_else(|| self.new_block(Some(end)));
        self.successor = Some(id);
        id
    }

    /// Fresh unaddressed block for a multi-step transfer.
    pub fn aux_block(&mut self) -> BlockId {
        self.new_block(None)
    }

    fn new_block(&mut self, address: Option<u64>) -> BlockId {
        let id = BlockId::new(self.program.next_block_id().index() + self.pending.len());
        self.pending.push(PendingBlock {
            id,
            address,
            statements: Vec::new(),
        });
        id
    }

    /// Append a statement to a block created by this rule.
    ///
    /// # Errors
    ///
    /// `UnknownBlock` for blocks not created by this rule, `BlockSealed`
    /// after a terminal statement.
    pub fn emit_into(&mut self, block: BlockId, statement: Statement) -> Result<()> {
        if block == self.block {
            return self.emit(statement);
        }
        let pending = self
            .pending
            .iter_mut()
            .find(|p| p.id == block)
            .ok_or(IrError::UnknownBlock(block))?;
        if pending.statements.last().is_some_and(Statement::is_terminal) {
            return Err(IrError::BlockSealed { block }.into());
        }
        pending.statements.push(statement);
        Ok(())
    }

    pub(crate) fn finish(self) -> Buffered {
        Buffered {
            block: self.block,
            statements: self.statements,
            pending: self.pending,
        }
    }
}

/// Output of a successful rule, ready to be written to the program.
#[derive(Debug)]
pub(crate) struct Buffered {
    block: BlockId,
    statements: Vec<Statement>,
    pending: Vec<PendingBlock>,
}

impl Buffered {
    pub(crate) const fn empty(block: BlockId) -> Self {
        Self {
            block,
            statements: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub(crate) fn single(block: BlockId, statement: Statement) -> Self {
        Self {
            block,
            statements: vec![statement],
            pending: Vec::new(),
        }
    }

    /// Write everything to `program`. Returns the number of statements.
    pub(crate) fn commit(self, program: &mut Program) -> std::result::Result<usize, IrError> {
        let own = program
            .block(self.block)
            .ok_or(IrError::UnknownBlock(self.block))?;
        if !self.statements.is_empty() && own.is_sealed() {
            return Err(IrError::BlockSealed { block: self.block });
        }

        let mut count = self.statements.len();
        for pending in self.pending {
            let id = program.create_basic_block(pending.address);
            debug_assert_eq!(id, pending.id, "pending block ids are allocated in order");
            count += pending.statements.len();
            for statement in pending.statements {
                program.push(id, statement)?;
            }
        }
        for statement in self.statements {
            program.push(self.block, statement)?;
        }
        Ok(count)
    }
}
