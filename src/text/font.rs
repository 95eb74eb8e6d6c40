//! Font loading.

use std::fmt::{Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use pdf_writer::Name;
use skrifa::instance::{LocationRef, Size};
use skrifa::raw::types::NameId;
use skrifa::raw::TableProvider;
use skrifa::{FontRef, MetadataProvider};

use crate::data::Data;
use crate::error::{Error, Result};
use crate::geom::Rect;

/// A TrueType font.
///
/// Holds the raw file data plus the basic information needed for the font
/// descriptor. Cloning is cheap.
#[derive(Clone)]
pub struct Font(Arc<Repr>);

struct Repr {
    data: Data,
    info: FontInfo,
}

/// Basic information about a font, extracted once at load time.
#[derive(Debug, Clone)]
pub(crate) struct FontInfo {
    pub(crate) index: u32,
    pub(crate) checksum: u32,
    pub(crate) units_per_em: u16,
    pub(crate) num_glyphs: u16,
    pub(crate) global_bbox: Rect,
    pub(crate) postscript_name: Option<String>,
    pub(crate) ascent: f32,
    pub(crate) descent: f32,
    pub(crate) cap_height: Option<f32>,
    pub(crate) is_monospaced: bool,
    pub(crate) italic_angle: f32,
    pub(crate) weight: f32,
}

impl Font {
    /// Load a font from its raw file data.
    ///
    /// `index` selects the face for TrueType collections and should be 0
    /// otherwise. Fails with [`Error::InvalidFont`] if the data cannot be
    /// parsed or the font has no `glyf` outlines.
    pub fn new(data: Data, index: u32) -> Result<Self> {
        let info = FontInfo::new(data.as_ref(), index)?;

        Ok(Self(Arc::new(Repr { data, info })))
    }

    pub(crate) fn info(&self) -> &FontInfo {
        &self.0.info
    }

    pub(crate) fn data(&self) -> &Data {
        &self.0.data
    }

    pub(crate) fn index(&self) -> u32 {
        self.0.info.index
    }

    pub(crate) fn units_per_em(&self) -> f32 {
        self.0.info.units_per_em as f32
    }

    pub(crate) fn postscript_name(&self) -> Option<&str> {
        self.0.info.postscript_name.as_deref()
    }

    pub(crate) fn font_ref(&self) -> FontRef<'_> {
        // The constructor already parsed this data once, so this cannot fail.
        FontRef::from_index(self.0.data.as_ref(), self.0.info.index).unwrap()
    }

    /// Map a codepoint to its glyph id.
    pub(crate) fn glyph_for_codepoint(&self, codepoint: u32) -> Option<u16> {
        let glyph_id = self.font_ref().charmap().map(codepoint)?;
        let glyph_id = u16::try_from(glyph_id.to_u32()).ok()?;
        (glyph_id != 0).then_some(glyph_id)
    }

    /// The horizontal advance of a glyph, in font units.
    pub(crate) fn advance_width(&self, glyph_id: u16) -> Option<f32> {
        self.font_ref()
            .glyph_metrics(Size::unscaled(), LocationRef::default())
            .advance_width(skrifa::GlyphId::new(glyph_id as u32))
    }
}

impl Hash for Font {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // The checksum plus the descriptor metrics distinguish fonts well
        // enough without hashing megabytes of table data.
        self.0.info.checksum.hash(state);
        self.0.info.index.hash(state);
        self.0.info.num_glyphs.hash(state);
        self.0.info.postscript_name.hash(state);
        self.0.data.as_ref().len().hash(state);
    }
}

impl Debug for Font {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Font({})",
            self.postscript_name().unwrap_or("unnamed")
        )
    }
}

impl FontInfo {
    fn new(data: &[u8], index: u32) -> Result<Self> {
        let font_ref = FontRef::from_index(data, index).map_err(|_| Error::InvalidFont)?;

        // Only glyf-flavored fonts can be embedded as CIDFontType2.
        if font_ref.glyf().is_err() {
            return Err(Error::UnsupportedFormat);
        }

        let head = font_ref.head().map_err(|_| Error::InvalidFont)?;
        let checksum = head.checksum_adjustment();
        let num_glyphs = font_ref
            .maxp()
            .map_err(|_| Error::InvalidFont)?
            .num_glyphs();

        let metrics = font_ref.metrics(Size::unscaled(), LocationRef::default());
        let os_2 = font_ref.os2().ok();
        let ascent = os_2
            .as_ref()
            .map(|s| s.s_typo_ascender() as f32)
            .unwrap_or(metrics.ascent);
        let descent = os_2
            .as_ref()
            .map(|s| s.s_typo_descender() as f32)
            .unwrap_or(metrics.descent);
        let is_monospaced = metrics.is_monospace;
        let cap_height = metrics.cap_height;
        let italic_angle = metrics.italic_angle;
        let weight = font_ref.attributes().weight.value();
        let units_per_em = metrics.units_per_em;

        let global_bbox = metrics
            .bounds
            .and_then(|b| Rect::from_ltrb(b.x_min, b.y_min, b.x_max, b.y_max))
            .unwrap_or(
                Rect::from_xywh(0.0, 0.0, units_per_em as f32, units_per_em as f32).unwrap(),
            );

        let postscript_name = {
            if let Ok(name) = font_ref.name() {
                name.name_record().iter().find_map(|n| {
                    if n.name_id.get() == NameId::POSTSCRIPT_NAME {
                        if let Ok(string) = n.string(name.string_data()) {
                            return Some(string.to_string());
                        }
                    }

                    None
                })
            } else {
                None
            }
        };

        Ok(FontInfo {
            index,
            checksum,
            units_per_em,
            num_glyphs,
            global_bbox,
            postscript_name,
            ascent,
            descent,
            cap_height,
            is_monospaced,
            italic_angle,
            weight,
        })
    }
}

/// The fourteen standard fonts every conforming reader provides.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[allow(missing_docs)]
pub enum BuiltinFont {
    TimesRoman,
    Helvetica,
    Courier,
    Symbol,
    TimesBold,
    HelveticaBold,
    CourierBold,
    ZapfDingbats,
    TimesItalic,
    HelveticaOblique,
    CourierOblique,
    TimesBoldItalic,
    HelveticaBoldOblique,
    CourierBoldOblique,
}

impl BuiltinFont {
    pub(crate) fn base_font(self) -> Name<'static> {
        match self {
            BuiltinFont::TimesRoman => Name(b"Times-Roman"),
            BuiltinFont::Helvetica => Name(b"Helvetica"),
            BuiltinFont::Courier => Name(b"Courier"),
            BuiltinFont::Symbol => Name(b"Symbol"),
            BuiltinFont::TimesBold => Name(b"Times-Bold"),
            BuiltinFont::HelveticaBold => Name(b"Helvetica-Bold"),
            BuiltinFont::CourierBold => Name(b"Courier-Bold"),
            BuiltinFont::ZapfDingbats => Name(b"ZapfDingbats"),
            BuiltinFont::TimesItalic => Name(b"Times-Italic"),
            BuiltinFont::HelveticaOblique => Name(b"Helvetica-Oblique"),
            BuiltinFont::CourierOblique => Name(b"Courier-Oblique"),
            BuiltinFont::TimesBoldItalic => Name(b"Times-BoldItalic"),
            BuiltinFont::HelveticaBoldOblique => Name(b"Helvetica-BoldOblique"),
            BuiltinFont::CourierBoldOblique => Name(b"Courier-BoldOblique"),
        }
    }
}
