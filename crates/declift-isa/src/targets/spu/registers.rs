//! SPU register file: 128 registers of 128 bits. `r0` doubles as the link
//! register and `r1` as the stack pointer.

use std::sync::LazyLock;

use declift_ir::MemoryLocation;

use crate::registers::{RegisterCatalog, RegisterSpec};
use crate::types::RegisterId;

pub const COUNT: u32 = 128;
pub const LR: RegisterId = gpr(0);
pub const SP: RegisterId = gpr(1);

#[must_use]
pub const fn gpr(n: u32) -> RegisterId {
    RegisterId::new(n)
}

/// Register file location of `r{n}`.
#[must_use]
pub const fn gpr_location(n: u32) -> MemoryLocation {
    MemoryLocation::register(n as i64 * 128, 128)
}

pub static CATALOG: LazyLock<RegisterCatalog> = LazyLock::new(|| {
    RegisterCatalog::new(
        "spu",
        (0..COUNT).map(|n| RegisterSpec::top(gpr(n), format!("r{n}"), 128)),
    )
    .with_alias("lr", LR)
    .with_alias("sp", SP)
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_file() {
        assert_eq!(CATALOG.len(), 128);
        assert_eq!(CATALOG.file_size(), 128 * 128);
        assert_eq!(CATALOG.lookup(gpr(127)).unwrap(), gpr_location(127));
    }

    #[test]
    fn test_aliases() {
        assert_eq!(CATALOG.by_name("lr").map(|r| r.id), Some(LR));
        assert_eq!(CATALOG.location_by_name("sp"), Some(gpr_location(1)));
        assert_eq!(CATALOG.location_by_name("r1"), Some(gpr_location(1)));
    }
}
