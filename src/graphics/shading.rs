//! Shadings.
//!
//! Function-based shadings (types 2 and 3) reference a registered function;
//! mesh shadings (types 4 and 6) carry their vertex data in the shading
//! stream itself, packed as one flag byte, 32-bit big-endian parametric
//! coordinates and 16-bit big-endian color components per element.

use std::ops::DerefMut;

use pdf_writer::{Chunk, Finish, Name, Ref};

use crate::error::{Error, Result};
use crate::geom::Point;
use crate::graphics::color::{check_unit, Color, DeviceColorSpace};
use crate::serialize::FunctionId;
use crate::stream::FilterStreamBuilder;

/// The edge flag of a free-form mesh vertex.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShadingVertexFlag {
    /// Starts a new triangle.
    New,
    /// Continues the previous triangle's second and third vertex.
    PreviousPair,
    /// Continues the previous triangle's first and third vertex.
    PreviousGap,
}

impl ShadingVertexFlag {
    fn to_u8(self) -> u8 {
        match self {
            ShadingVertexFlag::New => 0,
            ShadingVertexFlag::PreviousPair => 1,
            ShadingVertexFlag::PreviousGap => 2,
        }
    }

    /// Numeric flags arrive through the C-level API of downstream users, so
    /// out-of-range values must be a checked error, not an assertion.
    pub(crate) fn from_u8(value: u8) -> Result<Self> {
        match value {
            0 => Ok(ShadingVertexFlag::New),
            1 => Ok(ShadingVertexFlag::PreviousPair),
            2 => Ok(ShadingVertexFlag::PreviousGap),
            _ => Err(Error::MalformedShading),
        }
    }
}

/// One vertex of a type 4 (free-form Gouraud triangle) shading.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshVertex {
    /// The edge flag.
    pub flag: ShadingVertexFlag,
    /// The vertex position.
    pub point: Point,
    /// The vertex color; must match the shading's color space.
    pub color: Color,
}

impl MeshVertex {
    /// Create a vertex from the numeric edge flag used in the stream
    /// encoding. Flags greater than 2 fail with [`Error::MalformedShading`].
    pub fn from_numeric_flag(flag: u8, point: Point, color: Color) -> Result<Self> {
        Ok(Self {
            flag: ShadingVertexFlag::from_u8(flag)?,
            point,
            color,
        })
    }
}

/// One patch of a type 6 (Coons patch) shading.
#[derive(Debug, Clone, PartialEq)]
pub enum CoonsPatch {
    /// A full patch: twelve control points and four corner colors.
    Full {
        /// The twelve boundary control points.
        points: [Point; 12],
        /// The four corner colors; must match the shading's color space.
        colors: [Color; 4],
    },
    /// A continuation patch sharing an edge with the previous one.
    /// Not supported by this crate.
    Continuation,
}

/// A shading dictionary.
#[derive(Debug, Clone, PartialEq)]
pub enum Shading {
    /// A type 2 (axial) shading.
    Axial {
        /// The shading color space.
        color_space: DeviceColorSpace,
        /// Start and end point of the axis.
        coords: [f32; 4],
        /// The interpolation function.
        function: FunctionId,
        /// Whether to extend beyond the start / end point.
        extend: [bool; 2],
    },
    /// A type 3 (radial) shading.
    Radial {
        /// The shading color space.
        color_space: DeviceColorSpace,
        /// Center and radius of the start and end circles.
        coords: [f32; 6],
        /// The interpolation function.
        function: FunctionId,
        /// Whether to extend beyond the start / end circle.
        extend: [bool; 2],
    },
    /// A type 4 (free-form Gouraud triangle mesh) shading.
    FreeForm {
        /// The shading color space.
        color_space: DeviceColorSpace,
        /// Decode range for the x coordinate.
        x_range: [f32; 2],
        /// Decode range for the y coordinate.
        y_range: [f32; 2],
        /// The mesh vertices.
        vertices: Vec<MeshVertex>,
    },
    /// A type 6 (Coons patch mesh) shading.
    Coons {
        /// The shading color space.
        color_space: DeviceColorSpace,
        /// Decode range for the x coordinate.
        x_range: [f32; 2],
        /// Decode range for the y coordinate.
        y_range: [f32; 2],
        /// The patches.
        patches: Vec<CoonsPatch>,
    },
}

impl Shading {
    pub(crate) fn serialize(
        &self,
        root_ref: Ref,
        function_refs: &[Ref],
    ) -> Result<Chunk> {
        let mut chunk = Chunk::new();

        match self {
            Shading::Axial {
                color_space,
                coords,
                function,
                extend,
            } => {
                let mut shading = chunk.function_shading(root_ref);
                shading.shading_type(pdf_writer::types::FunctionShadingType::Axial);
                shading.pair(Name(b"ColorSpace"), color_space.to_pdf_name());
                shading.function(function_refs[function.0]);
                shading.coords(coords.iter().copied());
                shading.extend(*extend);
                shading.finish();
            }
            Shading::Radial {
                color_space,
                coords,
                function,
                extend,
            } => {
                let mut shading = chunk.function_shading(root_ref);
                shading.shading_type(pdf_writer::types::FunctionShadingType::Radial);
                shading.pair(Name(b"ColorSpace"), color_space.to_pdf_name());
                shading.function(function_refs[function.0]);
                shading.coords(coords.iter().copied());
                shading.extend(*extend);
                shading.finish();
            }
            Shading::FreeForm {
                color_space,
                x_range,
                y_range,
                vertices,
            } => {
                let data = serialize_free_form(*color_space, *x_range, *y_range, vertices)?;
                write_mesh_stream(&mut chunk, root_ref, 4, *color_space, *x_range, *y_range, &data);
            }
            Shading::Coons {
                color_space,
                x_range,
                y_range,
                patches,
            } => {
                let data = serialize_coons(*color_space, *x_range, *y_range, patches)?;
                write_mesh_stream(&mut chunk, root_ref, 6, *color_space, *x_range, *y_range, &data);
            }
        }

        Ok(chunk)
    }
}

/// Scale a parametric value to the full 32-bit coordinate range.
fn append_coordinate(buf: &mut Vec<u8>, value: f32, range: [f32; 2]) {
    let ratio = ((value - range[0]) / (range[1] - range[0])) as f64;
    let scaled = (u32::MAX as f64 * ratio) as u32;
    buf.extend_from_slice(&scaled.to_be_bytes());
}

fn append_component(buf: &mut Vec<u8>, value: f32) -> Result<()> {
    let scaled = (u16::MAX as f64 * check_unit(value)? as f64) as u16;
    buf.extend_from_slice(&scaled.to_be_bytes());
    Ok(())
}

fn append_color(buf: &mut Vec<u8>, color: &Color, color_space: DeviceColorSpace) -> Result<()> {
    let components = color.device_components().ok_or(Error::UnsupportedFormat)?;

    if color.device_color_space() != Some(color_space) {
        return Err(Error::ColorspaceMismatch);
    }

    for component in components {
        append_component(buf, component)?;
    }

    Ok(())
}

fn serialize_free_form(
    color_space: DeviceColorSpace,
    x_range: [f32; 2],
    y_range: [f32; 2],
    vertices: &[MeshVertex],
) -> Result<Vec<u8>> {
    let mut buf = Vec::new();

    for vertex in vertices {
        buf.push(vertex.flag.to_u8());
        append_coordinate(&mut buf, vertex.point.x, x_range);
        append_coordinate(&mut buf, vertex.point.y, y_range);
        append_color(&mut buf, &vertex.color, color_space)?;
    }

    Ok(buf)
}

fn serialize_coons(
    color_space: DeviceColorSpace,
    x_range: [f32; 2],
    y_range: [f32; 2],
    patches: &[CoonsPatch],
) -> Result<Vec<u8>> {
    let mut buf = Vec::new();

    for patch in patches {
        let (points, colors) = match patch {
            CoonsPatch::Full { points, colors } => (points, colors),
            CoonsPatch::Continuation => return Err(Error::UnsupportedFormat),
        };

        buf.push(0);

        for point in points {
            append_coordinate(&mut buf, point.x, x_range);
            append_coordinate(&mut buf, point.y, y_range);
        }

        for color in colors {
            append_color(&mut buf, color, color_space)?;
        }
    }

    Ok(buf)
}

#[allow(clippy::too_many_arguments)]
fn write_mesh_stream(
    chunk: &mut Chunk,
    root_ref: Ref,
    shading_type: i32,
    color_space: DeviceColorSpace,
    x_range: [f32; 2],
    y_range: [f32; 2],
    data: &[u8],
) {
    // Mesh payloads stay uncompressed so that strict consumers can seek
    // through the fixed-size records.
    let mesh_stream = FilterStreamBuilder::new_from_uncompressed(data).finish();

    let mut stream = chunk.stream(root_ref, mesh_stream.encoded_data());
    mesh_stream.write_filters(stream.deref_mut());
    stream.pair(Name(b"ShadingType"), shading_type);
    stream.pair(Name(b"ColorSpace"), color_space.to_pdf_name());
    stream.pair(Name(b"BitsPerCoordinate"), 32);
    stream.pair(Name(b"BitsPerComponent"), 16);
    stream.pair(Name(b"BitsPerFlag"), 8);

    let mut decode = stream.insert(Name(b"Decode")).array();
    decode.item(x_range[0]);
    decode.item(x_range[1]);
    decode.item(y_range[0]);
    decode.item(y_range[1]);
    for _ in 0..color_space.num_components() {
        decode.item(0.0f32);
        decode.item(1.0f32);
    }
    decode.finish();

    stream.finish();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_form_coordinate_scaling() {
        let vertices = vec![MeshVertex {
            flag: ShadingVertexFlag::New,
            point: Point::from_xy(25.0, 0.0),
            color: Color::DeviceRgb(1.0, 0.0, 0.0),
        }];
        let data =
            serialize_free_form(DeviceColorSpace::Rgb, [0.0, 100.0], [0.0, 100.0], &vertices)
                .unwrap();

        // flag + 2 * u32 + 3 * u16
        assert_eq!(data.len(), 1 + 8 + 6);
        assert_eq!(data[0], 0);
        // 0.25 of the u32 range, truncated.
        assert_eq!(&data[1..5], &0x3FFF_FFFFu32.to_be_bytes());
        assert_eq!(&data[5..9], &0u32.to_be_bytes());
        assert_eq!(&data[9..11], &u16::MAX.to_be_bytes());
    }

    #[test]
    fn vertex_color_space_must_match() {
        let vertices = vec![MeshVertex {
            flag: ShadingVertexFlag::New,
            point: Point::from_xy(0.0, 0.0),
            color: Color::DeviceGray(0.5),
        }];
        let err =
            serialize_free_form(DeviceColorSpace::Rgb, [0.0, 1.0], [0.0, 1.0], &vertices)
                .unwrap_err();
        assert_eq!(err, Error::ColorspaceMismatch);
    }

    #[test]
    fn out_of_range_component_is_rejected() {
        let vertices = vec![MeshVertex {
            flag: ShadingVertexFlag::New,
            point: Point::from_xy(0.0, 0.0),
            color: Color::DeviceRgb(2.0, 0.0, 0.0),
        }];
        let err =
            serialize_free_form(DeviceColorSpace::Rgb, [0.0, 1.0], [0.0, 1.0], &vertices)
                .unwrap_err();
        assert_eq!(err, Error::ColorOutOfRange);
    }

    #[test]
    fn continuation_patches_are_unsupported() {
        let err = serialize_coons(
            DeviceColorSpace::Gray,
            [0.0, 1.0],
            [0.0, 1.0],
            &[CoonsPatch::Continuation],
        )
        .unwrap_err();
        assert_eq!(err, Error::UnsupportedFormat);
    }

    #[test]
    fn numeric_flags_are_validated() {
        assert!(ShadingVertexFlag::from_u8(2).is_ok());
        assert_eq!(
            ShadingVertexFlag::from_u8(3).unwrap_err(),
            Error::MalformedShading
        );
    }
}
