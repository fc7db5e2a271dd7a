//! Lifting configuration.

use std::fmt;
use std::str::FromStr;

use declift_ir::ByteOrder;
use declift_isa::Architecture;
use declift_isa::targets::{ppc, spu};

use crate::error::Error;

/// Supported targets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ArchKind {
    /// 64-bit PowerPC, big-endian data.
    #[default]
    PpcBe,
    /// 64-bit PowerPC, little-endian data.
    PpcLe,
    /// Cell Synergistic Processing Unit.
    Spu,
}

impl ArchKind {
    pub const ALL: [Self; 3] = [Self::PpcBe, Self::PpcLe, Self::Spu];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PpcBe => ppc::NAME_BE,
            Self::PpcLe => ppc::NAME_LE,
            Self::Spu => spu::NAME,
        }
    }

    /// Byte order of data and, unless overridden, of instruction words.
    #[must_use]
    pub const fn data_byte_order(self) -> ByteOrder {
        match self {
            Self::PpcBe | Self::Spu => ByteOrder::Big,
            Self::PpcLe => ByteOrder::Little,
        }
    }

    /// Build the architecture. SPU instruction words are always big-endian,
    /// so `code_byte_order` only applies to PowerPC.
    #[must_use]
    pub fn architecture(self, code_byte_order: Option<ByteOrder>) -> Architecture {
        let data = self.data_byte_order();
        match self {
            Self::PpcBe | Self::PpcLe => ppc::architecture(data, code_byte_order.unwrap_or(data)),
            Self::Spu => spu::architecture(),
        }
    }
}

impl fmt::Display for ArchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArchKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ppc-be" | "ppc64" | "ppc" => Ok(Self::PpcBe),
            "ppc-le" | "ppc64le" => Ok(Self::PpcLe),
            "spu" => Ok(Self::Spu),
            _ => Err(Error::UnknownArchitecture(s.to_string())),
        }
    }
}

/// Configuration for a [`crate::Lifter`].
#[derive(Clone, Debug)]
pub struct LiftConfig {
    pub arch: ArchKind,
    /// Name of the calling convention whose entry statements are applied.
    pub convention: String,
    /// Overrides the byte order of instruction words.
    pub code_byte_order: Option<ByteOrder>,
    /// Prepend the convention's entry statements to each function.
    pub apply_entry_statements: bool,
    /// Lift independent functions on the rayon pool.
    pub parallel: bool,
    /// Worker threads for batch lifting (0 = auto).
    pub jobs: usize,
    /// Stop each function after this many instructions.
    pub max_instructions: Option<usize>,
}

impl Default for LiftConfig {
    fn default() -> Self {
        Self {
            arch: ArchKind::default(),
            convention: "default".to_string(),
            code_byte_order: None,
            apply_entry_statements: true,
            parallel: true,
            jobs: 0,
            max_instructions: None,
        }
    }
}

impl LiftConfig {
    #[must_use]
    pub fn new(arch: ArchKind) -> Self {
        Self {
            arch,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_convention(mut self, name: impl Into<String>) -> Self {
        self.convention = name.into();
        self
    }

    #[must_use]
    pub const fn with_code_byte_order(mut self, order: ByteOrder) -> Self {
        self.code_byte_order = Some(order);
        self
    }

    #[must_use]
    pub const fn with_entry_statements(mut self, apply: bool) -> Self {
        self.apply_entry_statements = apply;
        self
    }

    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    #[must_use]
    pub const fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    #[must_use]
    pub const fn with_max_instructions(mut self, limit: usize) -> Self {
        self.max_instructions = Some(limit);
        self
    }

    /// Worker count after resolving `jobs == 0`.
    #[must_use]
    pub fn effective_jobs(&self) -> usize {
        if self.jobs == 0 {
            num_cpus::get().max(1)
        } else {
            self.jobs
        }
    }
}

#[cfg(test)]
mod tests {
    use declift_ir::Domain;

    use super::*;

    #[test]
    fn test_arch_names_round_trip() {
        for arch in ArchKind::ALL {
            assert_eq!(arch.to_string().parse::<ArchKind>().unwrap(), arch);
        }
        assert_eq!("PPC64LE".parse::<ArchKind>().unwrap(), ArchKind::PpcLe);
        assert!(matches!(
            "mips".parse::<ArchKind>(),
            Err(Error::UnknownArchitecture(name)) if name == "mips"
        ));
    }

    #[test]
    fn test_architecture_byte_orders() {
        let le = ArchKind::PpcLe.architecture(None);
        assert_eq!(le.name(), "ppc-le");
        assert_eq!(le.byte_order(Domain::Memory), ByteOrder::Little);
        let spu = ArchKind::Spu.architecture(Some(ByteOrder::Little));
        assert_eq!(spu.byte_order(Domain::Register), ByteOrder::Big);
    }

    #[test]
    fn test_config_builder() {
        let config = LiftConfig::new(ArchKind::Spu)
            .with_parallel(false)
            .with_jobs(3)
            .with_max_instructions(10)
            .with_entry_statements(false);
        assert_eq!(config.convention, "default");
        assert!(!config.parallel);
        assert!(!config.apply_entry_statements);
        assert_eq!(config.effective_jobs(), 3);
        assert_eq!(config.max_instructions, Some(10));
        assert!(LiftConfig::default().effective_jobs() >= 1);
    }
}
