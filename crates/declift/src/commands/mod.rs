//! Command implementations.

mod disasm;
mod lift;
mod registers;

use std::path::Path;

use tracing::error;

use crate::cli::{Cli, Commands};
use crate::terminal;

/// Dispatch CLI command to the appropriate handler.
pub fn run_command(cli: &Cli) -> i32 {
    match &cli.command {
        Commands::Lift {
            input,
            target,
            convention,
            no_entry_statements,
            functions,
            max_insns,
            jobs,
        } => lift::cmd_lift(&lift::LiftArgs {
            input,
            target: *target,
            convention,
            entry_statements: !no_entry_statements,
            functions,
            max_insns: *max_insns,
            jobs: *jobs,
            quiet: cli.silent,
        }),
        Commands::Disasm { input, target } => disasm::cmd_disasm(input, *target),
        Commands::Registers { arch } => registers::cmd_registers((*arch).into()),
    }
}

/// Read an input image, reporting failure.
fn read_image(path: &Path) -> Option<Vec<u8>> {
    match std::fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            error!(path = %path.display(), error = %e, "failed to read input");
            terminal::error(&format!("cannot read {}", path.display()));
            None
        }
    }
}
