//! Stream encoding.
//!
//! Every PDF stream object in this crate goes through a [`FilterStreamBuilder`],
//! which keeps the payload and the filters that were (or still need to be)
//! applied to it in sync, so that the `/Filter` entry always matches the
//! on-wire bytes.

use std::borrow::Cow;
use std::ops::DerefMut;

use pdf_writer::{Dict, Name};

/// A PDF stream filter.
#[derive(Debug, Copy, Clone)]
pub(crate) enum StreamFilter {
    Flate,
    Dct,
}

impl StreamFilter {
    pub(crate) fn to_name(self) -> Name<'static> {
        match self {
            Self::Flate => Name(b"FlateDecode"),
            Self::Dct => Name(b"DCTDecode"),
        }
    }
}

impl StreamFilter {
    pub(crate) fn apply(&self, content: &[u8]) -> Vec<u8> {
        match self {
            StreamFilter::Flate => deflate_encode(content),
            // DCT data is only ever passed through pre-encoded.
            StreamFilter::Dct => unreachable!("DCT streams are never encoded here"),
        }
    }
}

pub(crate) struct FilterStreamBuilder<'a> {
    content: Cow<'a, [u8]>,
    filter: Option<StreamFilter>,
}

impl<'a> FilterStreamBuilder<'a> {
    fn empty(content: &'a [u8]) -> Self {
        Self {
            content: Cow::Borrowed(content),
            filter: None,
        }
    }

    /// A content stream, compressed depending on the document settings.
    pub(crate) fn new_from_content_stream(content: &'a [u8], compress: bool) -> Self {
        let mut filter_stream = Self::empty(content);

        if compress {
            filter_stream.add_filter(StreamFilter::Flate);
        }

        filter_stream
    }

    /// Binary data that is always worth compressing.
    pub(crate) fn new_from_binary_data(content: &'a [u8]) -> Self {
        let mut filter_stream = Self::empty(content);
        filter_stream.add_filter(StreamFilter::Flate);

        filter_stream
    }

    /// Data that must be stored as-is.
    pub(crate) fn new_from_uncompressed(content: &'a [u8]) -> Self {
        Self::empty(content)
    }

    /// JPEG file contents, which already are DCT encoded.
    pub(crate) fn new_from_dct_data(content: &'a [u8]) -> Self {
        let mut filter_stream = Self::empty(content);
        filter_stream.add_unapplied_filter(StreamFilter::Dct);

        filter_stream
    }

    pub(crate) fn finish(self) -> FilterStream<'a> {
        FilterStream {
            content: self.content,
            filter: self.filter,
        }
    }

    fn add_filter(&mut self, filter: StreamFilter) {
        self.content = Cow::Owned(filter.apply(&self.content));
        self.filter = Some(filter);
    }

    fn add_unapplied_filter(&mut self, filter: StreamFilter) {
        self.filter = Some(filter);
    }
}

pub(crate) struct FilterStream<'a> {
    content: Cow<'a, [u8]>,
    filter: Option<StreamFilter>,
}

impl FilterStream<'_> {
    pub(crate) fn encoded_data(&self) -> &[u8] {
        &self.content
    }

    pub(crate) fn write_filters<'b, T>(&self, mut dict: T)
    where
        T: DerefMut<Target = Dict<'b>>,
    {
        if let Some(filter) = self.filter {
            dict.deref_mut().pair(Name(b"Filter"), filter.to_name());
        }
    }
}

pub(crate) fn deflate_encode(data: &[u8]) -> Vec<u8> {
    const COMPRESSION_LEVEL: u8 = 6;
    miniz_oxide::deflate::compress_to_vec_zlib(data, COMPRESSION_LEVEL)
}
