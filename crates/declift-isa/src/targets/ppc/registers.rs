//! PowerPC register file.
//!
//! Catalog ids: `r0`-`r31` are 0-31, `f0`-`f31` are 32-63, then `cr`, the
//! eight condition fields, their flag bits, and the link, count and
//! fixed-point exception registers.

use std::sync::LazyLock;

use declift_ir::MemoryLocation;

use crate::registers::{RegisterCatalog, RegisterSpec};
use crate::types::{FlagKind, RegisterId};

pub const GPR_BASE: u32 = 0;
pub const FPR_BASE: u32 = 32;
pub const CR: RegisterId = RegisterId::new(64);
const CR_FIELD_BASE: u32 = 65;
const CR_FLAG_BASE: u32 = 73;
pub const LR: RegisterId = RegisterId::new(105);
pub const CTR: RegisterId = RegisterId::new(106);
pub const XER: RegisterId = RegisterId::new(107);
pub const XER_SO: RegisterId = RegisterId::new(108);
pub const XER_OV: RegisterId = RegisterId::new(109);
pub const XER_CA: RegisterId = RegisterId::new(110);

pub const R1: RegisterId = gpr(1);
pub const R3: RegisterId = gpr(3);

/// General purpose register `n`.
#[must_use]
pub const fn gpr(n: u32) -> RegisterId {
    RegisterId::new(GPR_BASE + n)
}

/// Floating point register `n`.
#[must_use]
pub const fn fpr(n: u32) -> RegisterId {
    RegisterId::new(FPR_BASE + n)
}

/// Condition register field `n`.
#[must_use]
pub const fn cr_field(n: u8) -> RegisterId {
    RegisterId::new(CR_FIELD_BASE + n as u32)
}

const fn flag_bit(kind: FlagKind) -> u32 {
    match kind {
        FlagKind::Less => 0,
        FlagKind::Greater => 1,
        FlagKind::Equal => 2,
        FlagKind::Overflow => 3,
    }
}

/// One flag bit of condition field `field`.
#[must_use]
pub const fn cr_flag(field: u8, kind: FlagKind) -> Option<RegisterId> {
    if field < 8 {
        Some(RegisterId::new(
            CR_FLAG_BASE + field as u32 * 4 + flag_bit(kind),
        ))
    } else {
        None
    }
}

/// Field index of a condition field register id.
#[must_use]
pub const fn field_of(reg: RegisterId) -> Option<u8> {
    if reg.0 >= CR_FIELD_BASE && reg.0 < CR_FIELD_BASE + 8 {
        Some((reg.0 - CR_FIELD_BASE) as u8)
    } else {
        None
    }
}

/// Register file location of `r{n}`, without a catalog lookup.
#[must_use]
pub const fn gpr_location(n: u32) -> MemoryLocation {
    MemoryLocation::register((GPR_BASE + n) as i64 * 64, 64)
}

/// Register file location of `f{n}`.
#[must_use]
pub const fn fpr_location(n: u32) -> MemoryLocation {
    MemoryLocation::register((FPR_BASE + n) as i64 * 64, 64)
}

/// `lr` sits after the GPRs, FPRs and the 32-bit `cr`.
pub const LR_LOCATION: MemoryLocation = MemoryLocation::register(64 * 64 + 32, 64);

const FLAG_SUFFIXES: [(FlagKind, &str); 4] = [
    (FlagKind::Less, "lt"),
    (FlagKind::Greater, "gt"),
    (FlagKind::Equal, "eq"),
    (FlagKind::Overflow, "so"),
];

fn specs() -> Vec<RegisterSpec> {
    let mut specs = Vec::with_capacity(111);
    specs.extend((0..32).map(|n| RegisterSpec::top(gpr(n), format!("r{n}"), 64)));
    specs.extend((0..32).map(|n| RegisterSpec::top(fpr(n), format!("f{n}"), 64)));
    specs.push(RegisterSpec::top(CR, "cr", 32));
    for field in 0..8u8 {
        specs.push(RegisterSpec::child(
            cr_field(field),
            format!("cr{field}"),
            CR,
            u32::from(field) * 4,
            4,
        ));
    }
    for field in 0..8u8 {
        for (kind, suffix) in FLAG_SUFFIXES {
            if let Some(id) = cr_flag(field, kind) {
                specs.push(RegisterSpec::child(
                    id,
                    format!("cr{field}{suffix}"),
                    cr_field(field),
                    flag_bit(kind),
                    1,
                ));
            }
        }
    }
    specs.push(RegisterSpec::top(LR, "lr", 64));
    specs.push(RegisterSpec::top(CTR, "ctr", 64));
    specs.push(RegisterSpec::top(XER, "xer", 64));
    specs.push(RegisterSpec::child(XER_SO, "xer_so", XER, 31, 1));
    specs.push(RegisterSpec::child(XER_OV, "xer_ov", XER, 30, 1));
    specs.push(RegisterSpec::child(XER_CA, "xer_ca", XER, 29, 1));
    specs
}

pub static CATALOG: LazyLock<RegisterCatalog> =
    LazyLock::new(|| RegisterCatalog::new("ppc", specs()).with_alias("sp", R1));

/// Register numbering used by [`super::PpcDisassembler`].
pub mod raw {
    pub const GPR: u32 = 0;
    pub const FPR: u32 = 32;
    pub const CR_FIELD: u32 = 64;
    pub const LR: u32 = 72;
    pub const CTR: u32 = 73;
    pub const XER: u32 = 74;
    /// Special purpose registers without a catalog entry.
    pub const UNMODELED_SPR: u32 = 1000;
}

/// Map a disassembler register number to a catalog id.
#[must_use]
pub const fn map_register(n: u32) -> Option<RegisterId> {
    match n {
        0..32 => Some(gpr(n)),
        32..64 => Some(fpr(n - raw::FPR)),
        64..72 => Some(cr_field((n - raw::CR_FIELD) as u8)),
        raw::LR => Some(LR),
        raw::CTR => Some(CTR),
        raw::XER => Some(XER),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_file_layout() {
        assert_eq!(CATALOG.lookup(gpr(0)).unwrap(), MemoryLocation::register(0, 64));
        assert_eq!(
            CATALOG.lookup(fpr(1)).unwrap(),
            MemoryLocation::register(33 * 64, 64)
        );
        let cr = CATALOG.lookup(CR).unwrap();
        assert_eq!(cr, MemoryLocation::register(64 * 64, 32));
        assert_eq!(CATALOG.file_size(), 64 * 64 + 32 + 3 * 64);
        assert_eq!(CATALOG.len(), 111);
    }

    #[test]
    fn test_condition_flags_alias_cr() {
        let cr = CATALOG.lookup(CR).unwrap();
        let cr2 = CATALOG.lookup(cr_field(2)).unwrap();
        let cr2eq = CATALOG.lookup(cr_flag(2, FlagKind::Equal).unwrap()).unwrap();
        assert_eq!(cr2, cr.shifted(8).resized(4));
        assert_eq!(cr2eq, cr.shifted(10).resized(1));
        assert!(cr2.covers(&cr2eq));
        assert_eq!(CATALOG.location_by_name("cr2eq"), Some(cr2eq));
        assert_eq!(cr_flag(8, FlagKind::Less), None);
    }

    #[test]
    fn test_raw_register_mapping() {
        assert_eq!(map_register(3), Some(R3));
        assert_eq!(map_register(33), Some(fpr(1)));
        assert_eq!(map_register(71), Some(cr_field(7)));
        assert_eq!(map_register(raw::LR), Some(LR));
        assert_eq!(map_register(raw::UNMODELED_SPR + 287), None);
        assert_eq!(field_of(cr_field(5)), Some(5));
        assert_eq!(field_of(LR), None);
    }

    #[test]
    fn test_fixed_locations_match_catalog() {
        assert_eq!(CATALOG.lookup(R3).unwrap(), gpr_location(3));
        assert_eq!(CATALOG.lookup(fpr(13)).unwrap(), fpr_location(13));
        assert_eq!(CATALOG.lookup(LR).unwrap(), LR_LOCATION);
    }

    #[test]
    fn test_sp_alias() {
        assert_eq!(CATALOG.by_name("sp").map(|r| r.id), Some(R1));
        assert_eq!(CATALOG.by_name("xer_ca").map(|r| r.id), Some(XER_CA));
    }
}
