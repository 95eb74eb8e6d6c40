//! Graphics-related PDF objects: colors, images, graphics states, shadings,
//! patterns, functions and optional content groups.

pub mod color;
pub(crate) mod ext_g_state;
pub(crate) mod function;
pub(crate) mod icc;
pub(crate) mod image;
pub(crate) mod optional_content;
pub(crate) mod separation;
pub(crate) mod shading;

pub use color::{Color, DeviceColorSpace, LabColorSpace};
pub use ext_g_state::{BlendMode, GraphicsState, RenderingIntent};
pub use function::FunctionType2;
pub use image::{ImageInterpolation, RasterImage};
pub use shading::{CoonsPatch, MeshVertex, Shading, ShadingVertexFlag};
