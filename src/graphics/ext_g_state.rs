//! External graphics states.

use pdf_writer::{Chunk, Finish, Name, Ref};

use crate::error::Result;
use crate::graphics::color::check_unit;

/// A blend mode, as set through an external graphics state.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[allow(missing_docs)]
pub enum BlendMode {
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
}

impl BlendMode {
    fn to_pdf_name(self) -> Name<'static> {
        match self {
            BlendMode::Normal => Name(b"Normal"),
            BlendMode::Multiply => Name(b"Multiply"),
            BlendMode::Screen => Name(b"Screen"),
            BlendMode::Overlay => Name(b"Overlay"),
            BlendMode::Darken => Name(b"Darken"),
            BlendMode::Lighten => Name(b"Lighten"),
            BlendMode::ColorDodge => Name(b"ColorDodge"),
            BlendMode::ColorBurn => Name(b"ColorBurn"),
            BlendMode::HardLight => Name(b"HardLight"),
            BlendMode::SoftLight => Name(b"SoftLight"),
            BlendMode::Difference => Name(b"Difference"),
            BlendMode::Exclusion => Name(b"Exclusion"),
            BlendMode::Hue => Name(b"Hue"),
            BlendMode::Saturation => Name(b"Saturation"),
            BlendMode::Color => Name(b"Color"),
            BlendMode::Luminosity => Name(b"Luminosity"),
        }
    }
}

/// A rendering intent.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[allow(missing_docs)]
pub enum RenderingIntent {
    RelativeColorimetric,
    AbsoluteColorimetric,
    Saturation,
    Perceptual,
}

impl RenderingIntent {
    pub(crate) fn to_pdf_rendering_intent(self) -> pdf_writer::types::RenderingIntent {
        match self {
            RenderingIntent::RelativeColorimetric => {
                pdf_writer::types::RenderingIntent::RelativeColorimetric
            }
            RenderingIntent::AbsoluteColorimetric => {
                pdf_writer::types::RenderingIntent::AbsoluteColorimetric
            }
            RenderingIntent::Saturation => pdf_writer::types::RenderingIntent::Saturation,
            RenderingIntent::Perceptual => pdf_writer::types::RenderingIntent::Perceptual,
        }
    }

    pub(crate) fn to_pdf_name(self) -> Name<'static> {
        match self {
            RenderingIntent::RelativeColorimetric => Name(b"RelativeColorimetric"),
            RenderingIntent::AbsoluteColorimetric => Name(b"AbsoluteColorimetric"),
            RenderingIntent::Saturation => Name(b"Saturation"),
            RenderingIntent::Perceptual => Name(b"Perceptual"),
        }
    }
}

/// An external graphics state (`/ExtGState`).
///
/// All parameters are optional; only the ones that were set end up in the
/// dictionary. The field naming follows Table 57 of the PDF specification.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphicsState {
    /// Line width.
    pub line_width: Option<f32>,
    /// Line cap style (0..=2).
    pub line_cap: Option<i32>,
    /// Line join style (0..=2).
    pub line_join: Option<i32>,
    /// Miter limit.
    pub miter_limit: Option<f32>,
    /// Rendering intent.
    pub rendering_intent: Option<RenderingIntent>,
    /// Stroking overprint.
    pub stroke_overprint: Option<bool>,
    /// Non-stroking overprint.
    pub fill_overprint: Option<bool>,
    /// Overprint mode.
    pub overprint_mode: Option<i32>,
    /// Flatness tolerance.
    pub flatness: Option<f32>,
    /// Smoothness tolerance.
    pub smoothness: Option<f32>,
    /// Blend mode.
    pub blend_mode: Option<BlendMode>,
    /// Stroking alpha.
    pub stroking_alpha: Option<f32>,
    /// Non-stroking alpha.
    pub non_stroking_alpha: Option<f32>,
    /// Alpha-is-shape flag.
    pub alpha_is_shape: Option<bool>,
    /// Text knockout flag.
    pub text_knockout: Option<bool>,
}

impl GraphicsState {
    /// Create a new, empty graphics state.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn serialize(&self, root_ref: Ref) -> Result<Chunk> {
        let mut chunk = Chunk::new();

        let mut state = chunk.ext_graphics(root_ref);

        if let Some(lw) = self.line_width {
            state.pair(Name(b"LW"), lw);
        }
        if let Some(lc) = self.line_cap {
            state.pair(Name(b"LC"), lc);
        }
        if let Some(lj) = self.line_join {
            state.pair(Name(b"LJ"), lj);
        }
        if let Some(ml) = self.miter_limit {
            state.pair(Name(b"ML"), ml);
        }
        if let Some(ri) = self.rendering_intent {
            state.pair(Name(b"RI"), ri.to_pdf_name());
        }
        if let Some(op) = self.stroke_overprint {
            state.pair(Name(b"OP"), op);
        }
        if let Some(op) = self.fill_overprint {
            state.pair(Name(b"op"), op);
        }
        if let Some(opm) = self.overprint_mode {
            state.pair(Name(b"OPM"), opm);
        }
        if let Some(fl) = self.flatness {
            state.pair(Name(b"FL"), fl);
        }
        if let Some(sm) = self.smoothness {
            state.pair(Name(b"SM"), sm);
        }
        if let Some(bm) = self.blend_mode {
            state.pair(Name(b"BM"), bm.to_pdf_name());
        }
        if let Some(ca) = self.stroking_alpha {
            state.pair(Name(b"CA"), check_unit(ca)?);
        }
        if let Some(ca) = self.non_stroking_alpha {
            state.pair(Name(b"ca"), check_unit(ca)?);
        }
        if let Some(ais) = self.alpha_is_shape {
            state.pair(Name(b"AIS"), ais);
        }
        if let Some(tk) = self.text_knockout {
            state.pair(Name(b"TK"), tk);
        }

        state.finish();

        Ok(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn alpha_out_of_range_is_rejected() {
        let state = GraphicsState {
            stroking_alpha: Some(1.5),
            ..Default::default()
        };
        assert_eq!(
            state.serialize(Ref::new(1)).unwrap_err(),
            Error::ColorOutOfRange
        );
    }

    #[test]
    fn only_set_parameters_are_written() {
        let state = GraphicsState {
            blend_mode: Some(BlendMode::Multiply),
            non_stroking_alpha: Some(0.5),
            ..Default::default()
        };
        let chunk = state.serialize(Ref::new(1)).unwrap();
        let bytes = chunk.as_bytes();
        let text = std::str::from_utf8(bytes).unwrap();
        assert!(text.contains("/BM /Multiply"));
        assert!(text.contains("/ca 0.5"));
        assert!(!text.contains("/CA"));
        assert!(!text.contains("/LW"));
    }
}
