//! Register catalogs.
//!
//! A catalog places every register of a target into one register address
//! space. Top-level registers are packed one after another; narrower views
//! (condition fields, flag bits) are children that alias a bit range of
//! their parent, so writing a flag is an ordinary narrow assignment.

use declift_ir::{LocationNames, MemoryLocation};
use rustc_hash::FxHashMap;
use tracing::warn;

use crate::error::{LiftError, Result};
use crate::types::RegisterId;

/// Static description of one register.
#[derive(Clone, Debug)]
pub struct RegisterSpec {
    pub id: RegisterId,
    pub name: String,
    /// Register this one is a view into.
    pub parent: Option<RegisterId>,
    /// Bit offset within the parent.
    pub offset: u32,
    pub size: u32,
}

impl RegisterSpec {
    /// A register with its own storage.
    pub fn top(id: RegisterId, name: impl Into<String>, size: u32) -> Self {
        Self {
            id,
            name: name.into(),
            parent: None,
            offset: 0,
            size,
        }
    }

    /// A view of `size` bits at `offset` inside `parent`.
    pub fn child(
        id: RegisterId,
        name: impl Into<String>,
        parent: RegisterId,
        offset: u32,
        size: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            parent: Some(parent),
            offset,
            size,
        }
    }
}

/// A resolved register.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Register {
    pub id: RegisterId,
    pub name: String,
    pub location: MemoryLocation,
    pub parent: Option<RegisterId>,
}

/// Per-target table of named, sized, aliasable registers.
#[derive(Debug)]
pub struct RegisterCatalog {
    name: &'static str,
    registers: Vec<Register>,
    by_id: FxHashMap<RegisterId, usize>,
    by_name: FxHashMap<String, usize>,
    by_location: FxHashMap<MemoryLocation, usize>,
    file_size: u32,
}

impl RegisterCatalog {
    /// Build a catalog. Parents must be listed before their children.
    pub fn new(name: &'static str, specs: impl IntoIterator<Item = RegisterSpec>) -> Self {
        let mut catalog = Self {
            name,
            registers: Vec::new(),
            by_id: FxHashMap::default(),
            by_name: FxHashMap::default(),
            by_location: FxHashMap::default(),
            file_size: 0,
        };
        for spec in specs {
            catalog.insert(spec);
        }
        catalog
    }

    fn insert(&mut self, spec: RegisterSpec) {
        let parent = spec
            .parent
            .and_then(|p| self.by_id.get(&p).map(|&i| self.registers[i].location));
        let location = match (spec.parent, parent) {
            (Some(_), Some(parent)) => {
                MemoryLocation::register(parent.addr + i64::from(spec.offset), spec.size)
            }
            (Some(missing), None) => {
                warn!(register = %spec.name, parent = %missing, "parent register not defined");
                self.allocate(spec.size)
            }
            (None, _) => self.allocate(spec.size),
        };

        let index = self.registers.len();
        self.by_id.insert(spec.id, index);
        self.by_name.insert(spec.name.clone(), index);
        self.by_location.entry(location).or_insert(index);
        self.registers.push(Register {
            id: spec.id,
            name: spec.name,
            location,
            parent: parent.and(spec.parent),
        });
    }

    fn allocate(&mut self, size: u32) -> MemoryLocation {
        let location = MemoryLocation::register(i64::from(self.file_size), size);
        self.file_size += size;
        location
    }

    /// Add another name for an existing register.
    #[must_use]
    pub fn with_alias(mut self, alias: &str, id: RegisterId) -> Self {
        if let Some(&index) = self.by_id.get(&id) {
            self.by_name.insert(alias.to_string(), index);
        }
        self
    }

    /// Catalog name (usually the target name).
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Storage location of a register.
    ///
    /// # Errors
    ///
    /// Returns `UnknownRegister` for ids not in the catalog.
    pub fn lookup(&self, id: RegisterId) -> Result<MemoryLocation> {
        self.register(id).map(|r| r.location)
    }

    /// Full register record.
    ///
    /// # Errors
    ///
    /// Returns `UnknownRegister` for ids not in the catalog.
    pub fn register(&self, id: RegisterId) -> Result<&Register> {
        self.by_id
            .get(&id)
            .map(|&i| &self.registers[i])
            .ok_or(LiftError::UnknownRegister(id.0))
    }

    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&Register> {
        self.by_name.get(name).map(|&i| &self.registers[i])
    }

    #[must_use]
    pub fn location_by_name(&self, name: &str) -> Option<MemoryLocation> {
        self.by_name(name).map(|r| r.location)
    }

    /// Narrowest register whose storage covers `location`.
    #[must_use]
    pub fn containing(&self, location: &MemoryLocation) -> Option<&Register> {
        self.registers
            .iter()
            .filter(|r| r.location.covers(location))
            .min_by_key(|r| r.location.size)
    }

    #[must_use]
    pub fn registers(&self) -> &[Register] {
        &self.registers
    }

    /// Size of the register file in bits.
    #[must_use]
    pub const fn file_size(&self) -> u32 {
        self.file_size
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.registers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }
}

impl LocationNames for RegisterCatalog {
    fn name_of(&self, location: &MemoryLocation) -> Option<&str> {
        self.by_location
            .get(location)
            .map(|&i| self.registers[i].name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: RegisterId = RegisterId::new(0);
    const B: RegisterId = RegisterId::new(1);
    const FIELD: RegisterId = RegisterId::new(2);
    const BIT: RegisterId = RegisterId::new(3);

    fn catalog() -> RegisterCatalog {
        RegisterCatalog::new(
            "test",
            [
                RegisterSpec::top(A, "a", 64),
                RegisterSpec::top(B, "b", 32),
                RegisterSpec::child(FIELD, "b1", B, 4, 4),
                RegisterSpec::child(BIT, "b1eq", FIELD, 2, 1),
            ],
        )
    }

    #[test]
    fn test_top_level_registers_are_packed() {
        let catalog = catalog();
        assert_eq!(catalog.lookup(A).unwrap(), MemoryLocation::register(0, 64));
        assert_eq!(catalog.lookup(B).unwrap(), MemoryLocation::register(64, 32));
        assert_eq!(catalog.file_size(), 96);
    }

    #[test]
    fn test_children_alias_parent_bits() {
        let catalog = catalog();
        let b = catalog.lookup(B).unwrap();
        let field = catalog.lookup(FIELD).unwrap();
        let bit = catalog.lookup(BIT).unwrap();
        assert_eq!(field, MemoryLocation::register(68, 4));
        assert_eq!(bit, MemoryLocation::register(70, 1));
        assert!(b.covers(&field));
        assert!(field.covers(&bit));
        assert!(!catalog.lookup(A).unwrap().overlaps(&bit));
    }

    #[test]
    fn test_unknown_register() {
        assert_eq!(
            catalog().lookup(RegisterId::new(99)),
            Err(LiftError::UnknownRegister(99))
        );
    }

    #[test]
    fn test_names_and_aliases() {
        let catalog = catalog().with_alias("alias", A);
        assert_eq!(catalog.by_name("b1eq").map(|r| r.id), Some(BIT));
        assert_eq!(catalog.by_name("alias").map(|r| r.id), Some(A));
        assert_eq!(
            catalog.name_of(&MemoryLocation::register(68, 4)),
            Some("b1")
        );
        assert_eq!(catalog.name_of(&MemoryLocation::register(68, 3)), None);
    }

    #[test]
    fn test_containing_prefers_narrowest() {
        let catalog = catalog();
        let probe = MemoryLocation::register(70, 1);
        assert_eq!(catalog.containing(&probe).map(|r| r.id), Some(BIT));
        let probe = MemoryLocation::register(65, 2);
        assert_eq!(catalog.containing(&probe).map(|r| r.id), Some(B));
    }

    #[test]
    fn test_missing_parent_gets_own_storage() {
        let catalog = RegisterCatalog::new(
            "orphan",
            [RegisterSpec::child(A, "lost", RegisterId::new(42), 0, 8)],
        );
        assert_eq!(catalog.lookup(A).unwrap(), MemoryLocation::register(0, 8));
        assert_eq!(catalog.register(A).unwrap().parent, None);
    }
}
