//! The `disasm` command.

use std::fmt::Write;
use std::path::Path;

use declift::{FunctionInput, LiftConfig, Lifter};
use tracing::error;

use super::read_image;
use crate::cli::{EXIT_FAILURE, EXIT_SUCCESS, TargetArgs};
use crate::terminal;

fn hex_bytes(bytes: &[u8]) -> String {
    bytes.iter().fold(String::new(), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

/// Handle the `disasm` command.
pub fn cmd_disasm(input: &Path, target: TargetArgs) -> i32 {
    let Some(bytes) = read_image(input) else {
        return EXIT_FAILURE;
    };
    let mut config = LiftConfig::new(target.arch.into());
    if let Some(order) = target.code_order {
        config = config.with_code_byte_order(order.into());
    }
    let lifter = match Lifter::new(config) {
        Ok(lifter) => lifter,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            terminal::error(&e.to_string());
            return EXIT_FAILURE;
        }
    };

    let catalog = lifter.arch().catalog();
    for (address, decoded) in lifter.disassemble(&FunctionInput::new(target.base, &bytes)) {
        match decoded {
            Ok(instruction) => println!(
                "{address:#010x}  {}  {}",
                hex_bytes(&instruction.bytes),
                instruction.display(catalog)
            ),
            Err(e) => println!("{address:#010x}  {}", terminal::dim(&format!("({e})"))),
        }
    }
    EXIT_SUCCESS
}
