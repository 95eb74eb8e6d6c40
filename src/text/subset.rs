//! Glyph subsetting state.
//!
//! Glyphs used on pages are gathered into subsets of at most 255 glyphs.
//! Slot 0 of every subset is reserved for `.notdef`, so a text operator can
//! address a glyph with (subset index, slot) where the slot doubles as the
//! CID of the glyph in the embedded subset font.

use std::collections::HashMap;

use log::warn;

use crate::text::font::Font;

/// The maximum number of glyphs a single subset can hold, `.notdef`
/// included.
pub(crate) const MAX_SUBSET_GLYPHS: usize = 255;

/// The slot where U+0020 must end up for viewers to map copied spaces
/// correctly.
const SPACE_SLOT: usize = 32;

/// The location of a glyph inside a font's subsets.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) struct SubsetGlyph {
    /// The subset the glyph landed in.
    pub(crate) subset: usize,
    /// The slot within that subset, which is also the glyph's CID.
    pub(crate) slot: u8,
}

/// One entry of a subset: the glyph and the codepoint it stands for.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) struct SubsetEntry {
    pub(crate) glyph_id: u16,
    /// The representative codepoint, used for the `/ToUnicode` mapping.
    /// Zero for `.notdef`.
    pub(crate) codepoint: u32,
}

#[derive(Debug, Default)]
struct GlyphSubset {
    entries: Vec<SubsetEntry>,
    by_glyph: HashMap<u16, u8>,
}

impl GlyphSubset {
    fn new() -> Self {
        let mut subset = Self::default();
        // Slot 0 is .notdef.
        subset.entries.push(SubsetEntry {
            glyph_id: 0,
            codepoint: 0,
        });
        subset.by_glyph.insert(0, 0);
        subset
    }

    fn push(&mut self, glyph_id: u16, codepoint: u32) -> u8 {
        let slot = self.entries.len() as u8;
        self.entries.push(SubsetEntry {
            glyph_id,
            codepoint,
        });
        self.by_glyph.insert(glyph_id, slot);
        slot
    }
}

/// Tracks which glyphs of one font are used and how they are distributed
/// over subsets.
#[derive(Debug)]
pub(crate) struct FontSubsetter {
    subsets: Vec<GlyphSubset>,
}

impl FontSubsetter {
    pub(crate) fn new() -> Self {
        Self {
            subsets: vec![GlyphSubset::new()],
        }
    }

    /// Return the location of a glyph, inserting it into the currently open
    /// subset if it has not been used before. Opens a new subset when the
    /// current one is full.
    pub(crate) fn get_glyph_subset(&mut self, codepoint: u32, glyph_id: u16) -> SubsetGlyph {
        for (index, subset) in self.subsets.iter().enumerate() {
            if let Some(&slot) = subset.by_glyph.get(&glyph_id) {
                return SubsetGlyph {
                    subset: index,
                    slot,
                };
            }
        }

        if self.subsets.last().unwrap().entries.len() >= MAX_SUBSET_GLYPHS {
            self.subsets.push(GlyphSubset::new());
        }

        let index = self.subsets.len() - 1;
        let slot = self.subsets[index].push(glyph_id, codepoint);

        SubsetGlyph {
            subset: index,
            slot,
        }
    }

    pub(crate) fn num_subsets(&self) -> usize {
        self.subsets.len()
    }

    /// The entries of one subset, in slot order.
    pub(crate) fn subset_entries(&self, index: usize) -> &[SubsetEntry] {
        &self.subsets[index].entries
    }

    /// Pad short subsets so that U+0020 lands in slot 32.
    ///
    /// Viewers map a copied glyph back to text through the `/ToUnicode`
    /// CMap, but several of them special-case the space character by code.
    /// Any subset with 32 or fewer entries is therefore filled with ASCII
    /// printables starting at `!` until 32 entries are reached, and the
    /// space itself becomes entry 32.
    pub(crate) fn pad_with_space(&mut self, font: &Font) {
        const MAX_CANDIDATES: u32 = 100;

        for index in 0..self.subsets.len() {
            if self.subsets[index].entries.len() > SPACE_SLOT {
                continue;
            }

            let mut padded = false;
            for i in 0..MAX_CANDIDATES {
                if self.subsets[index].entries.len() == SPACE_SLOT {
                    padded = true;
                    break;
                }

                let codepoint = u32::from(b'!') + i;
                let Some(glyph_id) = font.glyph_for_codepoint(codepoint) else {
                    continue;
                };
                if self.subsets[index].by_glyph.contains_key(&glyph_id) {
                    continue;
                }

                let slot = self.subsets[index].push(glyph_id, codepoint);
                debug_assert!(usize::from(slot) < SPACE_SLOT);
            }

            assert!(padded, "font subset padding failed");

            match font.glyph_for_codepoint(u32::from(b' ')) {
                Some(glyph_id) => {
                    self.subsets[index].push(glyph_id, u32::from(b' '));
                    debug_assert_eq!(self.subsets[index].entries.len(), SPACE_SLOT + 1);
                }
                None => warn!(
                    "font {:?} has no space glyph, subset {} stays unpadded",
                    font, index
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subsetter_with(glyphs: &[(u32, u16)]) -> FontSubsetter {
        let mut subsetter = FontSubsetter::new();
        for &(codepoint, glyph_id) in glyphs {
            subsetter.get_glyph_subset(codepoint, glyph_id);
        }
        subsetter
    }

    #[test]
    fn slots_are_assigned_in_insertion_order() {
        let mut subsetter = subsetter_with(&[(u32::from('A'), 36), (u32::from(' '), 3)]);

        assert_eq!(
            subsetter.get_glyph_subset(u32::from('A'), 36),
            SubsetGlyph { subset: 0, slot: 1 }
        );
        assert_eq!(
            subsetter.get_glyph_subset(u32::from(' '), 3),
            SubsetGlyph { subset: 0, slot: 2 }
        );
        assert_eq!(
            subsetter.get_glyph_subset(u32::from('B'), 37),
            SubsetGlyph { subset: 0, slot: 3 }
        );
    }

    #[test]
    fn repeated_glyphs_share_a_slot() {
        let mut subsetter = subsetter_with(&[(u32::from('A'), 36)]);

        // A different codepoint rendered by the same glyph.
        assert_eq!(
            subsetter.get_glyph_subset(0x0391, 36),
            SubsetGlyph { subset: 0, slot: 1 }
        );
        assert_eq!(subsetter.subset_entries(0).len(), 2);
    }

    #[test]
    fn full_subsets_spill_into_a_new_one() {
        let mut subsetter = FontSubsetter::new();

        // Slots 1..=254 fill the first subset (slot 0 is .notdef).
        for i in 0..(MAX_SUBSET_GLYPHS - 1) {
            let location =
                subsetter.get_glyph_subset(0x4E00 + i as u32, 100 + i as u16);
            assert_eq!(location.subset, 0);
        }

        let spilled = subsetter.get_glyph_subset(0x9999, 9999);
        assert_eq!(spilled, SubsetGlyph { subset: 1, slot: 1 });
        assert_eq!(subsetter.num_subsets(), 2);
    }

    #[test]
    fn notdef_occupies_slot_zero() {
        let subsetter = FontSubsetter::new();
        let entries = subsetter.subset_entries(0);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].glyph_id, 0);
    }
}
