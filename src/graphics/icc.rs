//! Embedding ICC profiles.
//!
//! Profiles deduplicate by content: registering the same bytes twice yields
//! the handle of the first registration. Each unique profile becomes a
//! deflated stream object plus an `[/ICCBased N 0 R]` color-space array.

use std::ops::DerefMut;

use pdf_writer::{Chunk, Finish, Name, Ref};

use crate::error::{Error, Result};
use crate::stream::FilterStreamBuilder;

/// The color model an ICC profile operates in, read from the profile header.
#[derive(Clone, Copy, Hash, Debug, Eq, PartialEq)]
pub(crate) enum IccColorModel {
    Gray,
    Rgb,
    Lab,
    Cmyk,
}

impl IccColorModel {
    pub(crate) fn num_components(self) -> usize {
        match self {
            IccColorModel::Gray => 1,
            IccColorModel::Rgb => 3,
            IccColorModel::Lab => 3,
            IccColorModel::Cmyk => 4,
        }
    }
}

impl TryFrom<u32> for IccColorModel {
    type Error = ();

    fn try_from(value: u32) -> std::result::Result<Self, Self::Error> {
        match value {
            0x47524159 => Ok(IccColorModel::Gray),
            0x52474220 => Ok(IccColorModel::Rgb),
            0x4C616220 => Ok(IccColorModel::Lab),
            0x434D594B => Ok(IccColorModel::Cmyk),
            _ => Err(()),
        }
    }
}

/// The header fields this crate cares about.
#[derive(Clone, Copy, Hash, Debug, Eq, PartialEq)]
pub(crate) struct IccMetadata {
    pub(crate) major: u8,
    pub(crate) minor: u8,
    pub(crate) color_model: IccColorModel,
}

impl IccMetadata {
    pub(crate) fn from_data(data: &[u8]) -> Option<Self> {
        let major = *data.get(8)?;
        let minor = *data.get(9)? >> 4;
        let color_model = {
            let marker = u32::from_be_bytes(data.get(16..20)?.try_into().ok()?);
            IccColorModel::try_from(marker).ok()?
        };
        Some(Self {
            major,
            minor,
            color_model,
        })
    }
}

/// One embedded profile: its stream object and the `[/ICCBased]` array
/// referencing it.
#[derive(Debug)]
pub(crate) struct IccProfileEntry {
    pub(crate) hash: u128,
    pub(crate) stream_ref: Ref,
    pub(crate) color_space_ref: Ref,
    pub(crate) metadata: IccMetadata,
}

/// Serialize a profile into its two objects.
pub(crate) fn serialize_profile(
    data: &[u8],
    metadata: IccMetadata,
    stream_ref: Ref,
    color_space_ref: Ref,
) -> Result<Chunk> {
    if data.is_empty() {
        return Err(Error::UnsupportedFormat);
    }

    let mut chunk = Chunk::new();

    let n = metadata.color_model.num_components();
    let icc_stream = FilterStreamBuilder::new_from_binary_data(data).finish();
    let mut icc_profile = chunk.stream(stream_ref, icc_stream.encoded_data());
    icc_stream.write_filters(icc_profile.deref_mut());
    icc_profile.pair(Name(b"N"), n as i32);
    icc_profile.finish();

    let mut array = chunk.indirect(color_space_ref).array();
    array.item(Name(b"ICCBased"));
    array.item(stream_ref);
    array.finish();

    Ok(chunk)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_profile(marker: &[u8; 4]) -> Vec<u8> {
        let mut data = vec![0u8; 128];
        data[8] = 4;
        data[9] = 0x30;
        data[16..20].copy_from_slice(marker);
        data
    }

    #[test]
    fn header_parsing() {
        let metadata = IccMetadata::from_data(&fake_profile(b"RGB ")).unwrap();
        assert_eq!(metadata.color_model, IccColorModel::Rgb);
        assert_eq!(metadata.major, 4);
        assert_eq!(metadata.minor, 3);

        let metadata = IccMetadata::from_data(&fake_profile(b"CMYK")).unwrap();
        assert_eq!(metadata.color_model.num_components(), 4);

        assert!(IccMetadata::from_data(&fake_profile(b"XYZ ")).is_none());
        assert!(IccMetadata::from_data(&[0u8; 4]).is_none());
    }
}
