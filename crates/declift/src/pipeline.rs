//! Function and batch lifting.
//!
//! A function is lifted by a linear sweep over its bytes: every
//! instruction goes through [`Architecture::lift_instruction`] into one
//! `Program` owned by that function. Independent functions share the
//! immutable architecture and are lifted on the rayon pool.

use declift_ir::{BlockId, Named, Program, Statement};
use declift_isa::{Architecture, CallingConvention, Instruction, LiftError};
use rayon::prelude::*;
use tracing::{debug, debug_span, trace};

use crate::config::LiftConfig;
use crate::error::{Error, Result};
use crate::metrics;

/// Bytes of one function and the address of its first byte.
#[derive(Clone, Copy, Debug)]
pub struct FunctionInput<'a> {
    pub entry: u64,
    pub bytes: &'a [u8],
}

impl<'a> FunctionInput<'a> {
    #[must_use]
    pub const fn new(entry: u64, bytes: &'a [u8]) -> Self {
        Self { entry, bytes }
    }
}

/// An instruction that was lifted as an opaque effect or skipped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DegradedInstruction {
    pub address: u64,
    pub error: LiftError,
}

/// IR for one function.
#[derive(Debug)]
pub struct FunctionIr {
    pub entry: u64,
    pub program: Program,
    /// Instructions lifted, including those degraded to opaque effects.
    pub instructions: usize,
    pub degraded: Vec<DegradedInstruction>,
}

impl FunctionIr {
    #[must_use]
    pub fn entry_block(&self) -> Option<BlockId> {
        self.program.block_at(self.entry)
    }

    /// Render the program with register names from `arch`.
    #[must_use]
    pub fn render(&self, arch: &Architecture) -> String {
        Named::new(&self.program, arch.catalog()).to_string()
    }
}

/// Split an image loaded at `base` into functions.
///
/// Each entry runs up to the next entry or the end of the image. With no
/// entries the whole image is one function at `base`.
///
/// # Errors
///
/// `EntryOutOfRange` if an entry lies outside the image.
pub fn split_functions<'a>(
    base: u64,
    bytes: &'a [u8],
    entries: &[u64],
) -> Result<Vec<FunctionInput<'a>>> {
    let len = bytes.len() as u64;
    if entries.is_empty() {
        return Ok(vec![FunctionInput::new(base, bytes)]);
    }
    let mut entries = entries.to_vec();
    entries.sort_unstable();
    entries.dedup();

    let offset_of = |entry: u64| {
        entry
            .checked_sub(base)
            .filter(|&offset| offset < len)
            .and_then(|offset| usize::try_from(offset).ok())
            .ok_or(Error::EntryOutOfRange { entry, base, len })
    };
    let mut functions = Vec::with_capacity(entries.len());
    for (i, &entry) in entries.iter().enumerate() {
        let start = offset_of(entry)?;
        let end = match entries.get(i + 1) {
            Some(&next) => offset_of(next)?,
            None => bytes.len(),
        };
        functions.push(FunctionInput::new(entry, &bytes[start..end]));
    }
    Ok(functions)
}

/// First address after `address` that is a multiple of `width`.
fn next_aligned(address: u64, width: u64) -> Option<u64> {
    (address / width).checked_add(1)?.checked_mul(width)
}

/// Lifts functions for one configured architecture and convention.
#[derive(Debug)]
pub struct Lifter {
    config: LiftConfig,
    arch: Architecture,
    entry_statements: Vec<Statement>,
}

impl Lifter {
    /// Resolve the architecture and calling convention named by `config`.
    ///
    /// # Errors
    ///
    /// `UnknownConvention` if the architecture has no such convention.
    pub fn new(config: LiftConfig) -> Result<Self> {
        let arch = config.arch.architecture(config.code_byte_order);
        let entry_statements = arch
            .convention(&config.convention)
            .map(|convention| convention.entry_statements().to_vec())
            .ok_or_else(|| Error::UnknownConvention {
                arch: arch.name(),
                name: config.convention.clone(),
            })?;
        debug!(arch = arch.name(), convention = %config.convention, "lifter ready");
        Ok(Self {
            config,
            arch,
            entry_statements,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &LiftConfig {
        &self.config
    }

    #[must_use]
    pub const fn arch(&self) -> &Architecture {
        &self.arch
    }

    #[must_use]
    pub fn convention(&self) -> Option<&CallingConvention> {
        self.arch.convention(&self.config.convention)
    }

    fn width(&self) -> u64 {
        self.arch.max_instruction_size().max(1) as u64
    }

    /// Lift one function by linear sweep.
    ///
    /// Undecodable instructions become opaque effects. Misaligned or
    /// truncated instructions are recorded as degraded and the sweep
    /// resumes at the next aligned address. The sweep stops at the top of
    /// the address space.
    ///
    /// # Errors
    ///
    /// Only IR errors, which point at a defect in a lifting rule.
    pub fn lift_function(&self, input: &FunctionInput<'_>) -> Result<FunctionIr> {
        let _span = debug_span!("lift_function", entry = format_args!("{:#x}", input.entry))
            .entered();
        let width = self.width();
        let len = input.bytes.len() as u64;
        let mut program = Program::new();
        let mut instructions = 0usize;
        let mut degraded = Vec::new();

        let mut offset = 0u64;
        while offset < len {
            if self
                .config
                .max_instructions
                .is_some_and(|limit| instructions >= limit)
            {
                debug!(instructions, "instruction limit reached");
                break;
            }
            let Some(rest) = usize::try_from(offset)
                .ok()
                .and_then(|start| input.bytes.get(start..))
            else {
                break;
            };
            let Some(address) = input.entry.checked_add(offset) else {
                debug!(offset, "function runs past the end of the address space");
                break;
            };
            match self.arch.lift_instruction(rest, address, &mut program) {
                Ok(lifted) => {
                    instructions += 1;
                    if let Some(error) = lifted.report.degraded {
                        metrics::record_degraded(error.kind());
                        degraded.push(DegradedInstruction { address, error });
                    }
                    offset += lifted.size.max(1);
                }
                Err(error) if error.needs_resync() => {
                    let next = next_aligned(address, width);
                    trace!(
                        address = format_args!("{address:#x}"),
                        next = ?next,
                        %error,
                        "resynchronizing"
                    );
                    metrics::record_degraded(error.kind());
                    degraded.push(DegradedInstruction { address, error });
                    match next {
                        Some(next) => offset = next - input.entry,
                        None => break,
                    }
                }
                Err(error) => return Err(error.into()),
            }
        }

        if self.config.apply_entry_statements
            && !self.entry_statements.is_empty()
            && let Some(block) = program.block_at(input.entry)
        {
            program
                .prepend(block, self.entry_statements.iter().cloned())
                .map_err(LiftError::from)?;
        }

        metrics::record_function(self.arch.name(), instructions as u64);
        debug!(
            instructions,
            degraded = degraded.len(),
            blocks = program.len(),
            statements = program.statement_count(),
            "lifted function"
        );
        Ok(FunctionIr {
            entry: input.entry,
            program,
            instructions,
            degraded,
        })
    }

    /// Lift independent functions. Results are in input order.
    ///
    /// # Errors
    ///
    /// The first IR error of any function, or a thread pool failure.
    pub fn lift_functions(&self, inputs: &[FunctionInput<'_>]) -> Result<Vec<FunctionIr>> {
        self.lift_functions_with(inputs, |_| {})
    }

    /// Like [`Self::lift_functions`], calling `on_lifted` after each function.
    ///
    /// # Errors
    ///
    /// See [`Self::lift_functions`].
    pub fn lift_functions_with<F>(
        &self,
        inputs: &[FunctionInput<'_>],
        on_lifted: F,
    ) -> Result<Vec<FunctionIr>>
    where
        F: Fn(&FunctionIr) + Sync,
    {
        let lift = |input: &FunctionInput<'_>| -> Result<FunctionIr> {
            let function = self.lift_function(input)?;
            on_lifted(&function);
            Ok(function)
        };
        if !self.config.parallel || inputs.len() < 2 {
            return inputs.iter().map(lift).collect();
        }
        let jobs = self.config.effective_jobs();
        debug!(functions = inputs.len(), jobs, "lifting in parallel");
        let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;
        pool.install(|| inputs.par_iter().map(lift).collect())
    }

    /// Decode without lifting, resynchronizing like [`Self::lift_function`].
    #[must_use]
    pub fn disassemble(
        &self,
        input: &FunctionInput<'_>,
    ) -> Vec<(u64, std::result::Result<Instruction, LiftError>)> {
        let width = self.width();
        let len = input.bytes.len() as u64;
        let mut lines = Vec::new();
        let mut offset = 0u64;
        while let Some(rest) = usize::try_from(offset)
            .ok()
            .filter(|_| offset < len)
            .and_then(|start| input.bytes.get(start..))
        {
            let Some(address) = input.entry.checked_add(offset) else {
                break;
            };
            let decoded = self.arch.decoder().decode(rest, address);
            let next = match &decoded {
                Ok(instruction) => Some(offset + u64::from(instruction.size.max(1))),
                Err(error) if error.needs_resync() => {
                    next_aligned(address, width).map(|next| next - input.entry)
                }
                Err(_) => Some(offset + width),
            };
            lines.push((address, decoded));
            let Some(next) = next else {
                break;
            };
            offset = next;
        }
        lines
    }
}
