//! Raster images.
//!
//! This crate does not decode image file formats. The caller hands over raw
//! sample data (or pre-encoded DCT data for JPEG passthrough) together with
//! the metadata needed to build the image XObject.

use std::ops::DerefMut;

use pdf_writer::{Chunk, Finish, Name, Ref};

use crate::error::{Error, Result};
use crate::graphics::color::DeviceColorSpace;
use crate::stream::FilterStreamBuilder;

/// How a viewer should scale the image.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum ImageInterpolation {
    /// Leave the choice to the viewer.
    #[default]
    Auto,
    /// Do not smooth the image.
    Pixelated,
    /// Smooth the image.
    Smooth,
}

/// A raster image built from raw sample data.
#[derive(Debug, Clone)]
pub struct RasterImage {
    /// The width in pixels.
    pub width: u32,
    /// The height in pixels.
    pub height: u32,
    /// Bits per color component of `pixels`.
    pub bits_per_component: u8,
    /// The color space the samples are in.
    pub color_space: DeviceColorSpace,
    /// The interleaved sample data, row-major.
    pub pixels: Vec<u8>,
    /// An optional alpha channel, one component per pixel.
    pub alpha: Option<Vec<u8>>,
    /// Bits per component of the alpha channel.
    pub alpha_bits_per_component: u8,
    /// An optional ICC profile describing the samples.
    pub icc_profile: Option<Vec<u8>>,
    /// The interpolation preference.
    pub interpolation: ImageInterpolation,
}

impl RasterImage {
    /// Create an image from 8-bit samples without alpha or profile.
    pub fn new(
        width: u32,
        height: u32,
        color_space: DeviceColorSpace,
        pixels: Vec<u8>,
    ) -> Self {
        Self {
            width,
            height,
            bits_per_component: 8,
            color_space,
            pixels,
            alpha: None,
            alpha_bits_per_component: 8,
            icc_profile: None,
            interpolation: ImageInterpolation::Auto,
        }
    }

    pub(crate) fn validate(&self, is_mask: bool) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidImageSize);
        }
        if self.pixels.is_empty() {
            return Err(Error::MissingPixels);
        }
        if is_mask && self.alpha.is_some() {
            return Err(Error::MaskAndAlpha);
        }

        Ok(())
    }
}

/// The color space entry of an image XObject.
pub(crate) enum ImageColorSpace {
    Device(DeviceColorSpace),
    Icc(Ref),
}

/// Serialize one image XObject from raw samples, deflating the payload.
pub(crate) fn serialize_sampled(
    root_ref: Ref,
    width: u32,
    height: u32,
    bits_per_component: u8,
    interpolation: ImageInterpolation,
    color_space: Option<ImageColorSpace>,
    smask: Option<Ref>,
    data: &[u8],
) -> Chunk {
    let mut chunk = Chunk::new();

    let image_stream = FilterStreamBuilder::new_from_binary_data(data).finish();
    let mut image = chunk.image_xobject(root_ref, image_stream.encoded_data());
    image_stream.write_filters(image.deref_mut().deref_mut());
    image.width(width as i32);
    image.height(height as i32);
    image.bits_per_component(bits_per_component as i32);

    match interpolation {
        ImageInterpolation::Auto => {}
        ImageInterpolation::Pixelated => {
            image.interpolate(false);
        }
        ImageInterpolation::Smooth => {
            image.interpolate(true);
        }
    }

    // An image has either an `/ImageMask` or a `/ColorSpace` entry.
    match color_space {
        None => {
            image.image_mask(true);
        }
        Some(ImageColorSpace::Device(device)) => {
            image.pair(Name(b"ColorSpace"), device.to_pdf_name());
        }
        Some(ImageColorSpace::Icc(cs_ref)) => {
            image.pair(Name(b"ColorSpace"), cs_ref);
        }
    }

    if let Some(smask) = smask {
        image.s_mask(smask);
    }

    image.finish();

    chunk
}

/// Serialize an image XObject around pre-encoded DCT (JPEG) data.
pub(crate) fn serialize_dct(
    root_ref: Ref,
    width: u32,
    height: u32,
    interpolation: ImageInterpolation,
    data: &[u8],
) -> Chunk {
    let mut chunk = Chunk::new();

    let image_stream = FilterStreamBuilder::new_from_dct_data(data).finish();
    let mut image = chunk.image_xobject(root_ref, image_stream.encoded_data());
    image_stream.write_filters(image.deref_mut().deref_mut());
    image.width(width as i32);
    image.height(height as i32);
    image.bits_per_component(8);
    image.pair(Name(b"ColorSpace"), DeviceColorSpace::Rgb.to_pdf_name());

    match interpolation {
        ImageInterpolation::Auto => {}
        ImageInterpolation::Pixelated => {
            image.interpolate(false);
        }
        ImageInterpolation::Smooth => {
            image.interpolate(true);
        }
    }

    image.finish();

    chunk
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn images_are_validated() {
        let image = RasterImage::new(0, 2, DeviceColorSpace::Rgb, vec![0; 12]);
        assert_eq!(image.validate(false).unwrap_err(), Error::InvalidImageSize);

        let image = RasterImage::new(2, 2, DeviceColorSpace::Rgb, vec![]);
        assert_eq!(image.validate(false).unwrap_err(), Error::MissingPixels);

        let mut image = RasterImage::new(2, 2, DeviceColorSpace::Gray, vec![0; 4]);
        image.alpha = Some(vec![255; 4]);
        assert_eq!(image.validate(true).unwrap_err(), Error::MaskAndAlpha);
        assert!(image.validate(false).is_ok());
    }
}
