//! Calling conventions.
//!
//! A convention says where arguments and return values live and which
//! statements run implicitly at function entry. Stack offsets are relative
//! to the stack pointer at entry; the stack is assumed to grow down.

use declift_ir::{Domain, MemoryLocation, Statement};

/// Round `value` down to a multiple of `multiple`. Works for negative values.
///
/// `None` if the result does not fit in an `i64`.
#[must_use]
pub fn round_down(value: i64, multiple: i64) -> Option<i64> {
    value.checked_div_euclid(multiple)?.checked_mul(multiple)
}

/// Round `value` up to a multiple of `multiple`. Works for negative values.
///
/// `None` if the result does not fit in an `i64`.
#[must_use]
pub fn round_up(value: i64, multiple: i64) -> Option<i64> {
    let down = round_down(value, multiple)?;
    if down == value {
        Some(down)
    } else {
        down.checked_add(multiple)
    }
}

/// Ordered list of locations for one kind of argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArgumentGroup {
    pub name: &'static str,
    pub locations: Vec<MemoryLocation>,
}

/// Argument and return value placement rules.
#[derive(Clone, Debug)]
pub struct CallingConvention {
    name: &'static str,
    stack_pointer: MemoryLocation,
    first_argument_offset: i64,
    /// In bits. Zero disables rounding.
    argument_alignment: i64,
    groups: Vec<ArgumentGroup>,
    return_values: Vec<MemoryLocation>,
    callee_cleanup: bool,
    entry_statements: Vec<Statement>,
}

impl CallingConvention {
    /// Start building a convention around a stack pointer.
    pub const fn builder(name: &'static str, stack_pointer: MemoryLocation) -> ConventionBuilder {
        ConventionBuilder {
            convention: Self {
                name,
                stack_pointer,
                first_argument_offset: 0,
                argument_alignment: 0,
                groups: Vec::new(),
                return_values: Vec::new(),
                callee_cleanup: false,
                entry_statements: Vec::new(),
            },
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn stack_pointer(&self) -> MemoryLocation {
        self.stack_pointer
    }

    /// Stack offset (bits) of the first stack argument.
    #[must_use]
    pub const fn first_argument_offset(&self) -> i64 {
        self.first_argument_offset
    }

    #[must_use]
    pub const fn argument_alignment(&self) -> i64 {
        self.argument_alignment
    }

    #[must_use]
    pub fn argument_groups(&self) -> &[ArgumentGroup] {
        &self.groups
    }

    /// Declared argument locations, group by group.
    pub fn argument_locations(&self) -> impl Iterator<Item = &MemoryLocation> {
        self.groups.iter().flat_map(|g| g.locations.iter())
    }

    /// Candidate return value locations, most likely first.
    #[must_use]
    pub fn return_values(&self) -> &[MemoryLocation] {
        &self.return_values
    }

    /// True if the callee pops its stack arguments.
    #[must_use]
    pub const fn callee_cleanup(&self) -> bool {
        self.callee_cleanup
    }

    /// Statements executed implicitly when a function is entered.
    #[must_use]
    pub fn entry_statements(&self) -> &[Statement] {
        &self.entry_statements
    }

    /// Argument location that fully covers `location`.
    ///
    /// Stack locations at or above the first argument offset are widened to
    /// the argument alignment, or `None` if the widened range does not fit.
    /// Other locations must lie inside a declared argument location.
    #[must_use]
    pub fn get_argument_location_covering(
        &self,
        location: &MemoryLocation,
    ) -> Option<MemoryLocation> {
        if location.domain == Domain::Stack && location.addr >= self.first_argument_offset {
            if self.argument_alignment == 0 {
                return Some(*location);
            }
            let start = round_down(location.addr, self.argument_alignment)?;
            let end = round_up(location.end_addr()?, self.argument_alignment)?;
            let size = u32::try_from(end.checked_sub(start)?).ok()?;
            return Some(MemoryLocation::stack(start, size));
        }
        self.argument_locations()
            .find(|arg| arg.covers(location))
            .copied()
    }

    /// Put argument locations into convention order.
    ///
    /// Locations covered by a declared argument come first, in declaration
    /// order; everything left over follows sorted by address.
    #[must_use]
    pub fn sort_arguments(&self, locations: &[MemoryLocation]) -> Vec<MemoryLocation> {
        let mut rest = locations.to_vec();
        rest.sort_unstable();
        rest.dedup();

        let mut result = Vec::with_capacity(rest.len());
        for arg in self.argument_locations() {
            result.extend(rest.iter().filter(|loc| arg.covers(loc)));
            rest.retain(|loc| !arg.covers(loc));
        }
        result.extend(rest);
        result
    }

    /// Stack slot used for the `index`-th spilled argument.
    #[must_use]
    pub fn stack_argument(&self, index: usize) -> MemoryLocation {
        let step = self.argument_alignment.max(1);
        let base = round_up(self.first_argument_offset, step).unwrap_or(i64::MAX);
        let offset = i64::try_from(index).unwrap_or(i64::MAX).saturating_mul(step);
        MemoryLocation::stack(
            base.saturating_add(offset),
            u32::try_from(step).unwrap_or(u32::MAX),
        )
    }

    /// Hand out argument locations in call order.
    #[must_use]
    pub fn allocator(&self) -> ArgumentAllocator<'_> {
        ArgumentAllocator {
            convention: self,
            used: vec![0; self.groups.len()],
            stack_slots: 0,
        }
    }
}

/// Builder for [`CallingConvention`].
pub struct ConventionBuilder {
    convention: CallingConvention,
}

impl ConventionBuilder {
    #[must_use]
    pub const fn first_argument_offset(mut self, offset: i64) -> Self {
        self.convention.first_argument_offset = offset;
        self
    }

    #[must_use]
    pub const fn argument_alignment(mut self, bits: i64) -> Self {
        self.convention.argument_alignment = bits;
        self
    }

    #[must_use]
    pub fn argument_group(
        mut self,
        name: &'static str,
        locations: impl IntoIterator<Item = MemoryLocation>,
    ) -> Self {
        self.convention.groups.push(ArgumentGroup {
            name,
            locations: locations.into_iter().collect(),
        });
        self
    }

    #[must_use]
    pub fn return_value(mut self, location: MemoryLocation) -> Self {
        self.convention.return_values.push(location);
        self
    }

    #[must_use]
    pub const fn callee_cleanup(mut self, cleanup: bool) -> Self {
        self.convention.callee_cleanup = cleanup;
        self
    }

    #[must_use]
    pub fn entry_statement(mut self, statement: Statement) -> Self {
        self.convention.entry_statements.push(statement);
        self
    }

    #[must_use]
    pub fn build(self) -> CallingConvention {
        self.convention
    }
}

/// Assigns locations to the arguments of one call, in order.
///
/// Each group is consumed left to right. Once a group runs out, its
/// arguments go to the next free stack slot; all groups share the slots.
pub struct ArgumentAllocator<'a> {
    convention: &'a CallingConvention,
    used: Vec<usize>,
    stack_slots: usize,
}

impl ArgumentAllocator<'_> {
    /// Location of the next argument of kind `group`, or `None` if the
    /// convention has no such group.
    pub fn next_argument(&mut self, group: &str) -> Option<MemoryLocation> {
        let index = self
            .convention
            .groups
            .iter()
            .position(|g| g.name == group)?;
        let used = &mut self.used[index];
        if let Some(&location) = self.convention.groups[index].locations.get(*used) {
            *used += 1;
            return Some(location);
        }
        let slot = self.convention.stack_argument(self.stack_slots);
        self.stack_slots += 1;
        Some(slot)
    }

    /// Number of stack slots handed out so far.
    #[must_use]
    pub const fn stack_slots(&self) -> usize {
        self.stack_slots
    }
}
