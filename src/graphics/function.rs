//! PDF functions.

use pdf_writer::{Chunk, Finish, Ref};

use crate::error::{Error, Result};
use crate::graphics::color::Color;

/// A type 2 (exponential interpolation) function between two colors.
///
/// Both boundary colors must be device colors in the same color space.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType2 {
    /// The function domain.
    pub domain: [f32; 2],
    /// The color at the lower end of the domain.
    pub c0: Color,
    /// The color at the upper end of the domain.
    pub c1: Color,
    /// The interpolation exponent.
    pub n: f32,
}

impl FunctionType2 {
    pub(crate) fn serialize(&self, root_ref: Ref) -> Result<Chunk> {
        let c0 = self.c0.device_components().ok_or(Error::UnsupportedFormat)?;
        let c1 = self.c1.device_components().ok_or(Error::UnsupportedFormat)?;

        if self.c0.device_color_space() != self.c1.device_color_space() {
            return Err(Error::ColorspaceMismatch);
        }

        let mut chunk = Chunk::new();

        let mut function = chunk.exponential_function(root_ref);
        function.domain(self.domain);
        function.c0(c0);
        function.c1(c1);
        function.n(self.n);
        function.finish();

        Ok(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_color_spaces_are_rejected() {
        let function = FunctionType2 {
            domain: [0.0, 1.0],
            c0: Color::DeviceRgb(0.0, 0.0, 0.0),
            c1: Color::DeviceGray(1.0),
            n: 1.0,
        };
        assert_eq!(
            function.serialize(Ref::new(1)).unwrap_err(),
            Error::ColorspaceMismatch
        );
    }

    #[test]
    fn non_device_colors_are_rejected() {
        let function = FunctionType2 {
            domain: [0.0, 1.0],
            c0: Color::Pattern(crate::PatternId(0)),
            c1: Color::DeviceGray(1.0),
            n: 1.0,
        };
        assert_eq!(
            function.serialize(Ref::new(1)).unwrap_err(),
            Error::UnsupportedFormat
        );
    }
}
