//! Table-driven bitfield decoding.
//!
//! For targets without a disassembly service. A static table of opcode
//! descriptors is indexed by opcode value; a word is matched by trying a
//! fixed list of progressively narrower opcode masks, each accepting only
//! certain instruction formats. The first hit wins.

use std::sync::OnceLock;

use rustc_hash::FxHashMap;

use crate::types::OpId;

/// Extract an unsigned field of `width` bits starting at bit `offset`.
#[inline]
#[must_use]
pub const fn unsigned_field(word: u32, offset: u32, width: u32) -> u32 {
    (word >> offset) & ((1 << width) - 1)
}

/// Extract a sign-extended field of `width` bits starting at bit `offset`.
#[inline]
#[must_use]
pub const fn signed_field(word: u32, offset: u32, width: u32) -> i32 {
    ((word << (32 - width - offset)) as i32) >> (32 - width)
}

/// One opcode table entry.
#[derive(Debug)]
pub struct OpcodeDescriptor<F: 'static, A: 'static> {
    pub op: OpId,
    pub format: F,
    /// Opcode value, already shifted down to the opcode field.
    pub opcode: u32,
    pub mnemonic: &'static str,
    /// Ordered argument shapes.
    pub args: &'static [A],
}

/// One step of the mask priority list.
pub struct MaskStep<F> {
    pub mask: u32,
    /// Formats this mask applies to. `None` accepts any format.
    pub accepts: Option<fn(F) -> bool>,
}

/// Opcode table with a lookup index built on first use.
pub struct OpcodeTable<F: 'static, A: 'static> {
    descriptors: &'static [OpcodeDescriptor<F, A>],
    steps: &'static [MaskStep<F>],
    /// Right shift that brings the opcode field down to bit 0.
    shift: u32,
    index: OnceLock<FxHashMap<u32, usize>>,
}

impl<F: Copy, A> OpcodeTable<F, A> {
    pub const fn new(
        descriptors: &'static [OpcodeDescriptor<F, A>],
        steps: &'static [MaskStep<F>],
        shift: u32,
    ) -> Self {
        Self {
            descriptors,
            steps,
            shift,
            index: OnceLock::new(),
        }
    }

    fn index(&self) -> &FxHashMap<u32, usize> {
        self.index.get_or_init(|| {
            let mut index = FxHashMap::default();
            // Duplicate opcode values are alternate mnemonics; keep the first.
            for (i, desc) in self.descriptors.iter().enumerate() {
                index.entry(desc.opcode).or_insert(i);
            }
            index
        })
    }

    /// Opcode field of an instruction word.
    #[must_use]
    pub const fn opcode_of(&self, word: u32) -> u32 {
        word >> self.shift
    }

    /// Find the descriptor for an instruction word.
    #[must_use]
    pub fn lookup(&self, word: u32) -> Option<&'static OpcodeDescriptor<F, A>> {
        let opcode = self.opcode_of(word);
        let index = self.index();
        self.steps.iter().find_map(|step| {
            let desc = &self.descriptors[*index.get(&(opcode & step.mask))?];
            step.accepts
                .is_none_or(|accepts| accepts(desc.format))
                .then_some(desc)
        })
    }

    #[must_use]
    pub const fn descriptors(&self) -> &'static [OpcodeDescriptor<F, A>] {
        self.descriptors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TARGET_SPU;

    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    enum Fmt {
        Wide,
        Narrow,
    }

    const fn is_wide(f: Fmt) -> bool {
        matches!(f, Fmt::Wide)
    }

    static DESCRIPTORS: [OpcodeDescriptor<Fmt, u8>; 4] = [
        OpcodeDescriptor {
            op: OpId::new(TARGET_SPU, 0),
            format: Fmt::Wide,
            opcode: 0x40,
            mnemonic: "wide",
            args: &[],
        },
        OpcodeDescriptor {
            op: OpId::new(TARGET_SPU, 1),
            format: Fmt::Narrow,
            opcode: 0x45,
            mnemonic: "narrow",
            args: &[1, 2],
        },
        OpcodeDescriptor {
            op: OpId::new(TARGET_SPU, 2),
            format: Fmt::Narrow,
            opcode: 0x45,
            mnemonic: "alias",
            args: &[],
        },
        OpcodeDescriptor {
            op: OpId::new(TARGET_SPU, 3),
            format: Fmt::Narrow,
            opcode: 0x50,
            mnemonic: "plain",
            args: &[],
        },
    ];

    static STEPS: [MaskStep<Fmt>; 2] = [
        MaskStep {
            mask: 0xf0,
            accepts: Some(is_wide),
        },
        MaskStep {
            mask: 0xff,
            accepts: None,
        },
    ];

    static TABLE: OpcodeTable<Fmt, u8> = OpcodeTable::new(&DESCRIPTORS, &STEPS, 24);

    #[test]
    fn test_field_extraction() {
        assert_eq!(unsigned_field(0xabcd_1234, 4, 8), 0x23);
        assert_eq!(signed_field(0x0000_0380, 7, 3), -1);
        assert_eq!(signed_field(0x0000_0180, 7, 3), 3);
        assert_eq!(signed_field(0x8000_0000, 31, 1), -1);
    }

    #[test]
    fn test_wide_mask_tried_first() {
        // 0x4f masks to 0x40 under the wide step.
        let desc = TABLE.lookup(0x4f00_0000).unwrap();
        assert_eq!(desc.mnemonic, "wide");
    }

    #[test]
    fn test_narrow_fallback_and_first_entry_wins() {
        let desc = TABLE.lookup(0x4500_0000);
        // 0x45 & 0xf0 hits the wide entry first.
        assert_eq!(desc.map(|d| d.mnemonic), Some("wide"));
        let desc = TABLE.lookup(0x5000_0000).unwrap();
        assert_eq!(desc.mnemonic, "plain");
    }

    #[test]
    fn test_wide_step_rejects_other_formats() {
        // 0x55 & 0xf0 = 0x50 is narrow, so the wide step skips it; 0x55 is absent.
        assert!(TABLE.lookup(0x5500_0000).is_none());
    }

    #[test]
    fn test_duplicate_opcodes_keep_first() {
        let index = TABLE.index();
        assert_eq!(index.get(&0x45), Some(&1));
    }
}
