//! The `lift` command.

use std::path::Path;

use declift::{LiftConfig, Lifter, split_functions};
use tracing::{error, info};

use super::read_image;
use crate::cli::{EXIT_FAILURE, EXIT_SUCCESS, TargetArgs};
use crate::terminal::{self, Progress};

pub struct LiftArgs<'a> {
    pub input: &'a Path,
    pub target: TargetArgs,
    pub convention: &'a str,
    pub entry_statements: bool,
    pub functions: &'a [u64],
    pub max_insns: Option<usize>,
    pub jobs: usize,
    pub quiet: bool,
}

fn build_config(args: &LiftArgs<'_>) -> LiftConfig {
    let mut config = LiftConfig::new(args.target.arch.into())
        .with_convention(args.convention)
        .with_entry_statements(args.entry_statements)
        .with_jobs(args.jobs);
    if let Some(order) = args.target.code_order {
        config = config.with_code_byte_order(order.into());
    }
    if let Some(limit) = args.max_insns {
        config = config.with_max_instructions(limit);
    }
    config
}

/// Handle the `lift` command.
pub fn cmd_lift(args: &LiftArgs<'_>) -> i32 {
    let Some(bytes) = read_image(args.input) else {
        return EXIT_FAILURE;
    };
    let config = build_config(args);
    info!(
        input = %args.input.display(),
        arch = %config.arch,
        base = format_args!("{:#x}", args.target.base),
        "lifting"
    );

    let lifter = match Lifter::new(config) {
        Ok(lifter) => lifter,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            terminal::error(&e.to_string());
            return EXIT_FAILURE;
        }
    };
    let inputs = match split_functions(args.target.base, &bytes, args.functions) {
        Ok(inputs) => inputs,
        Err(e) => {
            error!(error = %e, "invalid function list");
            terminal::error(&e.to_string());
            return EXIT_FAILURE;
        }
    };

    let progress = Progress::new(inputs.len() as u64, "lifting", args.quiet);
    let result = lifter.lift_functions_with(&inputs, |_| progress.inc(1));
    progress.finish();

    let functions = match result {
        Ok(functions) => functions,
        Err(e) => {
            error!(error = %e, "lift failed");
            terminal::error(&e.to_string());
            return EXIT_FAILURE;
        }
    };

    let mut instructions = 0;
    let mut degraded = 0;
    for function in &functions {
        instructions += function.instructions;
        degraded += function.degraded.len();
        terminal::header(&format!(
            "; function 0x{:x} ({} instructions)",
            function.entry, function.instructions
        ));
        print!("{}", function.render(lifter.arch()));
        println!();
    }

    if !args.quiet {
        let summary = format!(
            "lifted {} function(s), {instructions} instruction(s)",
            functions.len()
        );
        if degraded == 0 {
            terminal::success(&summary);
        } else {
            terminal::warning(&format!("{summary}, {degraded} degraded"));
        }
    }
    EXIT_SUCCESS
}
