//! Embedding subset fonts.
//!
//! Every (font, subset) pair is embedded as a Type0 font with a
//! CIDFontType2 descendant. The subset's slot numbering doubles as the CID
//! numbering: `GlyphRemapper` assigns CIDs in insertion order and slot 0 is
//! `.notdef` in both schemes.

use std::hash::Hash;
use std::ops::DerefMut;

use pdf_writer::types::{CidFontType, FontFlags, SystemInfo, UnicodeCmap};
use pdf_writer::{Chunk, Finish, Name, Ref, Str};
use subsetter::GlyphRemapper;

use crate::error::{Error, Result};
use crate::geom::RectExt;
use crate::serialize::SerializeContext;
use crate::stream::FilterStreamBuilder;
use crate::text::font::Font;
use crate::text::subset::SubsetEntry;
use crate::util::{hash128, SliceExt};

const SUBSET_TAG_LEN: usize = 6;
pub(crate) const IDENTITY_H: &str = "Identity-H";
pub(crate) const CMAP_NAME: Name = Name(b"Custom");
pub(crate) const SYSTEM_INFO: SystemInfo = SystemInfo {
    registry: Str(b"Adobe"),
    ordering: Str(b"Identity"),
    supplement: 0,
};

// All fonts are written with a upem of 1000, the value PDF consumers assume.
const PDF_UNITS_PER_EM: f32 = 1000.0;

/// Serialize the four objects of one font subset: the Type0 font, the
/// descendant CID font, the font descriptor (with the subset binary) and
/// the `/ToUnicode` CMap.
pub(crate) fn serialize_subset_font(
    sc: &mut SerializeContext,
    font: &Font,
    entries: &[SubsetEntry],
    root_ref: Ref,
) -> Result<Chunk> {
    let mut chunk = Chunk::new();

    let cid_ref = sc.new_ref();
    let descriptor_ref = sc.new_ref();
    let cmap_ref = sc.new_ref();
    let data_ref = sc.new_ref();

    // CIDs are assigned by insertion order, reproducing the slot numbering.
    let mut glyph_remapper = GlyphRemapper::new();
    for entry in &entries[1..] {
        glyph_remapper.remap(entry.glyph_id);
    }

    let subsetted = subsetter::subset(font.data().as_ref(), font.index(), &glyph_remapper)
        .map_err(|_| Error::InvalidFont)?;

    let font_stream = FilterStreamBuilder::new_from_binary_data(&subsetted).finish();

    let base_font = base_font_name(font, entries);

    chunk
        .type0_font(root_ref)
        .base_font(Name(base_font.as_bytes()))
        .encoding_predefined(Name(IDENTITY_H.as_bytes()))
        .descendant_font(cid_ref)
        .to_unicode(cmap_ref);

    let to_pdf_units = |v: f32| v / font.units_per_em() * PDF_UNITS_PER_EM;

    let widths = entries
        .iter()
        .map(|e| to_pdf_units(font.advance_width(e.glyph_id).unwrap_or(0.0)))
        .collect::<Vec<_>>();

    let mut cid = chunk.cid_font(cid_ref);
    cid.subtype(CidFontType::Type2);
    cid.base_font(Name(base_font.as_bytes()));
    cid.system_info(SYSTEM_INFO);
    cid.font_descriptor(descriptor_ref);
    cid.default_width(0.0);
    cid.cid_to_gid_map_predefined(Name(b"Identity"));

    let mut first = 0;
    let mut width_writer = cid.widths();
    for (w, group) in widths.group_by_key(|&w| w) {
        let end = first + group.len();
        if w != 0.0 {
            let last = end - 1;
            width_writer.same(first as u16, last as u16, w);
        }
        first = end;
    }

    width_writer.finish();
    cid.finish();

    let info = font.info();

    let mut flags = FontFlags::empty();
    flags.set(
        FontFlags::SERIF,
        font.postscript_name().is_some_and(|n| n.contains("Serif")),
    );
    flags.set(FontFlags::FIXED_PITCH, info.is_monospaced);
    flags.set(FontFlags::ITALIC, info.italic_angle != 0.0);
    flags.insert(FontFlags::SYMBOLIC);
    flags.insert(FontFlags::SMALL_CAP);

    let bbox = {
        let b = info.global_bbox;
        crate::geom::Rect::from_ltrb(
            to_pdf_units(b.left()),
            to_pdf_units(b.top()),
            to_pdf_units(b.right()),
            to_pdf_units(b.bottom()),
        )
        .unwrap_or(crate::geom::Rect::from_xywh(0.0, 0.0, 1000.0, 1000.0).unwrap())
        .to_pdf_rect()
    };

    let ascender = to_pdf_units(info.ascent);
    let descender = to_pdf_units(info.descent);
    let cap_height = info.cap_height.map(to_pdf_units).unwrap_or(ascender);
    let stem_v = 10.0 + 0.244 * (info.weight - 50.0);

    let mut font_descriptor = chunk.font_descriptor(descriptor_ref);
    font_descriptor
        .name(Name(base_font.as_bytes()))
        .flags(flags)
        .bbox(bbox)
        .italic_angle(info.italic_angle)
        .ascent(ascender)
        .descent(descender)
        .cap_height(cap_height)
        .stem_v(stem_v);
    font_descriptor.font_file2(data_ref);
    font_descriptor.finish();

    let cmap = {
        let mut cmap = UnicodeCmap::new(CMAP_NAME, SYSTEM_INFO);

        // Slot 0 is .notdef and needs no mapping.
        for (slot, entry) in entries.iter().enumerate().skip(1) {
            if let Some(c) = char::from_u32(entry.codepoint) {
                cmap.pair(slot as u16, c);
            }
        }

        cmap
    };

    let cmap_stream = cmap.finish();
    chunk.cmap(cmap_ref, &cmap_stream);

    let mut stream = chunk.stream(data_ref, font_stream.encoded_data());
    font_stream.write_filters(stream.deref_mut());
    stream.finish();

    Ok(chunk)
}

/// Create the tag for a font subset.
pub(crate) fn subset_tag<T: Hash>(data: &T) -> String {
    const BASE: u128 = 26;
    let mut hash = hash128(data);
    let mut letter = [b'A'; SUBSET_TAG_LEN];
    for l in letter.iter_mut() {
        *l = b'A' + (hash % BASE) as u8;
        hash /= BASE;
    }
    std::str::from_utf8(&letter).unwrap().to_string()
}

pub(crate) fn base_font_name(font: &Font, entries: &[SubsetEntry]) -> String {
    const REST_LEN: usize = SUBSET_TAG_LEN + 1 + 1 + IDENTITY_H.len();

    let postscript_name = font.postscript_name().unwrap_or("unknown");
    let max_len = 127 - REST_LEN;
    let trimmed = &postscript_name[..postscript_name.len().min(max_len)];

    let glyph_ids = entries.iter().map(|e| e.glyph_id).collect::<Vec<_>>();
    let subset_tag = subset_tag(&(font.info().checksum, glyph_ids));

    format!("{subset_tag}+{trimmed}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subset_tags_are_six_uppercase_letters() {
        let tag = subset_tag(&42u32);
        assert_eq!(tag.len(), 6);
        assert!(tag.bytes().all(|b| b.is_ascii_uppercase()));

        // Stable for the same input, different for different inputs.
        assert_eq!(tag, subset_tag(&42u32));
        assert_ne!(tag, subset_tag(&43u32));
    }
}
