//! CLI definitions and argument types.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use declift::{ArchKind, ByteOrder};

/// Exit code for success.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for failure.
pub const EXIT_FAILURE: i32 = 1;

#[derive(Parser)]
#[command(name = "declift")]
#[command(about = "Lift PowerPC and SPU machine code into a decompiler IR")]
#[command(version)]
pub struct Cli {
    /// Show metrics summary after execution
    #[arg(long, global = true)]
    pub metrics: bool,

    /// Enable verbose output (sets RUST_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output (only show errors)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub silent: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Lift a raw code image and print the IR
    Lift {
        /// Raw code image
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        target: TargetArgs,

        /// Calling convention whose entry statements are applied
        #[arg(long, default_value = "default")]
        convention: String,

        /// Do not prepend the convention's entry statements
        #[arg(long)]
        no_entry_statements: bool,

        /// Function entry address (repeatable; default: the whole image)
        #[arg(short, long = "function", value_name = "ADDR", value_parser = parse_address)]
        functions: Vec<u64>,

        /// Stop each function after this many instructions
        #[arg(long)]
        max_insns: Option<usize>,

        /// Number of parallel jobs (0 = auto)
        #[arg(short = 'j', long, default_value = "0")]
        jobs: usize,
    },
    /// Decode a raw code image without lifting
    Disasm {
        /// Raw code image
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        target: TargetArgs,
    },
    /// Print a target's register catalog
    Registers {
        /// Target architecture
        #[arg(long, value_enum, default_value = "ppc-be")]
        arch: ArchArg,
    },
}

/// Target selection shared by commands that read code.
#[derive(clap::Args, Clone, Copy)]
pub struct TargetArgs {
    /// Target architecture
    #[arg(long, value_enum, default_value = "ppc-be")]
    pub arch: ArchArg,

    /// Load address of the first byte of the image
    #[arg(long, default_value = "0", value_parser = parse_address)]
    pub base: u64,

    /// Byte order of instruction words (default: the target's)
    #[arg(long, value_enum)]
    pub code_order: Option<ByteOrderArg>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ArchArg {
    #[value(name = "ppc-be")]
    PpcBe,
    #[value(name = "ppc-le")]
    PpcLe,
    Spu,
}

impl From<ArchArg> for ArchKind {
    fn from(arg: ArchArg) -> Self {
        match arg {
            ArchArg::PpcBe => Self::PpcBe,
            ArchArg::PpcLe => Self::PpcLe,
            ArchArg::Spu => Self::Spu,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ByteOrderArg {
    Big,
    Little,
}

impl From<ByteOrderArg> for ByteOrder {
    fn from(arg: ByteOrderArg) -> Self {
        match arg {
            ByteOrderArg::Big => Self::Big,
            ByteOrderArg::Little => Self::Little,
        }
    }
}

/// Parse a hex (`0x` prefix) or decimal address.
pub fn parse_address(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16),
        None => s.replace('_', "").parse(),
    };
    parsed.map_err(|e| format!("invalid address '{s}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address() {
        assert_eq!(parse_address("0x1000"), Ok(0x1000));
        assert_eq!(parse_address("0X8000_0000"), Ok(0x8000_0000));
        assert_eq!(parse_address("4096"), Ok(4096));
        assert!(parse_address("0xzz").is_err());
    }

    #[test]
    fn test_cli_parses_lift() {
        let cli = Cli::try_parse_from([
            "declift", "lift", "code.bin", "--arch", "spu", "--base", "0x200", "-f", "0x200",
            "-f", "0x240", "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Commands::Lift {
            target, functions, ..
        } = cli.command
        else {
            panic!("expected lift");
        };
        assert!(matches!(target.arch, ArchArg::Spu));
        assert_eq!(target.base, 0x200);
        assert_eq!(functions, vec![0x200, 0x240]);
    }

    #[test]
    fn test_verbose_conflicts_with_silent() {
        assert!(Cli::try_parse_from(["declift", "registers", "-v", "-s"]).is_err());
    }
}
