//! Text and fonts: TrueType faces, glyph subsetting and the embedded font
//! objects.

pub(crate) mod cid;
pub(crate) mod font;
pub(crate) mod subset;

pub use font::{BuiltinFont, Font};
