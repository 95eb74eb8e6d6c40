//! Color types.
//!
//! Colors are represented as one sum type covering the device color spaces
//! as well as the indirect ones (Lab, ICC, separation, pattern). Every
//! operator that takes a color dispatches on the variant and emits the
//! operand shape the active color space demands.

use pdf_writer::Name;

use crate::error::{Error, Result};
use crate::serialize::{IccColorSpaceId, LabColorSpaceId, PatternId, SeparationId};

/// A device color space.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DeviceColorSpace {
    /// Device gray, one component.
    Gray,
    /// Device RGB, three components.
    Rgb,
    /// Device CMYK, four components.
    Cmyk,
}

impl DeviceColorSpace {
    pub(crate) fn to_pdf_name(self) -> Name<'static> {
        match self {
            DeviceColorSpace::Gray => Name(b"DeviceGray"),
            DeviceColorSpace::Rgb => Name(b"DeviceRGB"),
            DeviceColorSpace::Cmyk => Name(b"DeviceCMYK"),
        }
    }

    pub(crate) fn num_components(self) -> usize {
        match self {
            DeviceColorSpace::Gray => 1,
            DeviceColorSpace::Rgb => 3,
            DeviceColorSpace::Cmyk => 4,
        }
    }
}

/// A color in any of the color spaces supported by this crate.
#[derive(Debug, Clone, PartialEq)]
pub enum Color {
    /// A device gray color.
    DeviceGray(f32),
    /// A device RGB color.
    DeviceRgb(f32, f32, f32),
    /// A device CMYK color.
    DeviceCmyk(f32, f32, f32, f32),
    /// A color in a previously registered Lab color space.
    Lab(LabColorSpaceId, f32, f32, f32),
    /// A color in a previously registered ICC-based color space. The number
    /// of components must match the profile.
    Icc(IccColorSpaceId, Vec<f32>),
    /// A tint in a previously registered separation.
    Separation(SeparationId, f32),
    /// A pattern color.
    Pattern(PatternId),
}

impl Color {
    /// The components of a device color, in operator order.
    pub(crate) fn device_components(&self) -> Option<Vec<f32>> {
        match self {
            Color::DeviceGray(g) => Some(vec![*g]),
            Color::DeviceRgb(r, g, b) => Some(vec![*r, *g, *b]),
            Color::DeviceCmyk(c, m, y, k) => Some(vec![*c, *m, *y, *k]),
            _ => None,
        }
    }

    pub(crate) fn device_color_space(&self) -> Option<DeviceColorSpace> {
        match self {
            Color::DeviceGray(_) => Some(DeviceColorSpace::Gray),
            Color::DeviceRgb(..) => Some(DeviceColorSpace::Rgb),
            Color::DeviceCmyk(..) => Some(DeviceColorSpace::Cmyk),
            _ => None,
        }
    }
}

/// Check that a color component lies in the unit interval.
pub(crate) fn check_unit(v: f32) -> Result<f32> {
    if !(0.0..=1.0).contains(&v) {
        return Err(Error::ColorOutOfRange);
    }

    Ok(v)
}

/// A CIE L*a*b* color space definition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabColorSpace {
    /// The white point, XYZ.
    pub white_point: [f32; 3],
    /// Smallest permitted a* value.
    pub a_min: f32,
    /// Largest permitted a* value.
    pub a_max: f32,
    /// Smallest permitted b* value.
    pub b_min: f32,
    /// Largest permitted b* value.
    pub b_max: f32,
}

impl Default for LabColorSpace {
    fn default() -> Self {
        // D50 white point and the symmetric range most tools use.
        Self {
            white_point: [0.9505, 1.0, 1.089],
            a_min: -100.0,
            a_max: 100.0,
            b_min: -100.0,
            b_max: 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_range_is_enforced() {
        assert!(check_unit(0.0).is_ok());
        assert!(check_unit(1.0).is_ok());
        assert_eq!(check_unit(1.2), Err(Error::ColorOutOfRange));
        assert_eq!(check_unit(-0.1), Err(Error::ColorOutOfRange));
    }
}
