//! Instruction lifting.
//!
//! Each target registers one [`Rule`] per opcode. A rule reads the decoded
//! operands through a [`LiftContext`] and emits statements; the lifter
//! commits them to the program only if the rule succeeds. Anything that
//! cannot be lifted becomes a single `OpaqueEffect`.

mod branch;
mod context;

pub use branch::{FlagLookup, branch_if, branch_on_condition};
pub use context::LiftContext;

use context::Buffered;
use declift_ir::{BlockId, ByteOrder, Program, Statement};
use rustc_hash::FxHashMap;
use tracing::{trace, warn};

use crate::decoder::{instruction_end, read_word};
use crate::error::{LiftError, Result};
use crate::instruction::Instruction;
use crate::registers::RegisterCatalog;
use crate::types::OpId;

/// A lifting rule body.
pub type RuleFn = fn(&mut LiftContext<'_>) -> Result<()>;

/// How an opcode is lifted.
#[derive(Clone, Copy)]
pub enum Rule {
    Lift(RuleFn),
    /// Instruction has no effect on the modeled state.
    Nop,
    /// Effect is deliberately not modeled.
    Opaque,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lift(_) => f.write_str("Lift"),
            Self::Nop => f.write_str("Nop"),
            Self::Opaque => f.write_str("Opaque"),
        }
    }
}

/// Opcode to rule mapping for one target.
#[derive(Clone, Debug, Default)]
pub struct RuleTable {
    rules: FxHashMap<OpId, Rule>,
}

impl RuleTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `rule` for every opcode in `ops`.
    #[must_use]
    pub fn with(mut self, ops: &[OpId], rule: Rule) -> Self {
        for &op in ops {
            self.rules.insert(op, rule);
        }
        self
    }

    #[must_use]
    pub fn lift(self, op: OpId, rule: RuleFn) -> Self {
        self.with(&[op], Rule::Lift(rule))
    }

    #[must_use]
    pub fn get(&self, op: OpId) -> Option<Rule> {
        self.rules.get(&op).copied()
    }

    #[must_use]
    pub fn contains(&self, op: OpId) -> bool {
        self.rules.contains_key(&op)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Result of lifting one instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiftReport {
    /// Block the instruction was lifted into.
    pub block: BlockId,
    /// Statements written, including those in new blocks.
    pub statements: usize,
    /// Why the instruction became an opaque effect, if it did.
    pub degraded: Option<LiftError>,
}

impl LiftReport {
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }
}

/// Lifts decoded instructions of one target into a program.
pub struct InstructionLifter {
    catalog: &'static RegisterCatalog,
    rules: RuleTable,
    word_size: u32,
    code_order: ByteOrder,
}

impl InstructionLifter {
    #[must_use]
    pub const fn new(catalog: &'static RegisterCatalog, word_size: u32, rules: RuleTable) -> Self {
        Self {
            catalog,
            rules,
            word_size,
            code_order: ByteOrder::Big,
        }
    }

    /// Byte order of the instruction stream, used to report raw words.
    #[must_use]
    pub const fn with_code_order(mut self, order: ByteOrder) -> Self {
        self.code_order = order;
        self
    }

    #[must_use]
    pub const fn rules(&self) -> &RuleTable {
        &self.rules
    }

    #[must_use]
    pub const fn catalog(&self) -> &'static RegisterCatalog {
        self.catalog
    }

    #[must_use]
    pub const fn word_size(&self) -> u32 {
        self.word_size
    }

    /// Lift one instruction into `program`.
    ///
    /// A missing rule or a failing rule is not an error: the instruction
    /// becomes one `OpaqueEffect` and the report says why.
    ///
    /// # Errors
    ///
    /// `Truncated` if the instruction runs past the end of the address
    /// space, which leaves `program` untouched. Otherwise only IR errors,
    /// e.g. lifting into a block that is already sealed.
    pub fn lift(&self, instr: &Instruction, program: &mut Program) -> Result<LiftReport> {
        let end = instruction_end(instr.address, usize::from(instr.size))?;
        let block = program.basic_block_for_instruction(instr.address, end);
        let outcome = match self.rules.get(instr.opcode) {
            Some(Rule::Lift(rule)) => {
                let mut ctx =
                    LiftContext::new(instr, self.catalog, self.word_size, program, block, end);
                rule(&mut ctx).map(|()| ctx.finish())
            }
            Some(Rule::Nop) => Ok(Buffered::empty(block)),
            Some(Rule::Opaque) => Ok(Buffered::single(block, Statement::OpaqueEffect)),
            None => Err(LiftError::UnrecognizedOpcode {
                address: instr.address,
                word: read_word(&instr.bytes, self.code_order).unwrap_or_default(),
            }),
        };

        match outcome {
            Ok(buffered) => {
                let statements = buffered.commit(program)?;
                trace!(
                    address = format_args!("{:#x}", instr.address),
                    mnemonic = instr.mnemonic,
                    statements,
                    "lifted"
                );
                Ok(LiftReport {
                    block,
                    statements,
                    degraded: None,
                })
            }
            Err(error) => degrade(block, instr.address, error, program),
        }
    }
}

/// Record an instruction that could not be decoded as one opaque effect.
///
/// # Errors
///
/// `Truncated` past the end of the address space, otherwise only IR errors.
pub fn lift_undecoded(
    address: u64,
    size: u64,
    error: LiftError,
    program: &mut Program,
) -> Result<LiftReport> {
    let end = instruction_end(address, usize::try_from(size).unwrap_or(usize::MAX))?;
    let block = program.basic_block_for_instruction(address, end);
    degrade(block, address, error, program)
}

fn degrade(
    block: BlockId,
    address: u64,
    error: LiftError,
    program: &mut Program,
) -> Result<LiftReport> {
    if error.is_rule_defect() {
        warn!(address = format_args!("{address:#x}"), %error, "lifting rule defect");
    } else {
        warn!(address = format_args!("{address:#x}"), %error, "instruction degraded to opaque effect");
    }
    program.push(block, Statement::OpaqueEffect)?;
    Ok(LiftReport {
        block,
        statements: 1,
        degraded: Some(error),
    })
}

#[cfg(test)]
mod tests;
