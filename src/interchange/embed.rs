//! Embedded files.

use std::ops::DerefMut;

use pdf_writer::{Chunk, Finish, Name, Ref, Str, TextStr};

use crate::stream::FilterStreamBuilder;

/// An embedded file: the stream object plus its file specification.
#[derive(Debug, Clone)]
pub(crate) struct EmbeddedFile {
    pub(crate) name: String,
    pub(crate) data: Vec<u8>,
}

impl EmbeddedFile {
    pub(crate) fn serialize(&self, filespec_ref: Ref, stream_ref: Ref) -> Chunk {
        let mut chunk = Chunk::new();

        let file_stream = FilterStreamBuilder::new_from_binary_data(&self.data).finish();
        let mut embedded = chunk.embedded_file(stream_ref, file_stream.encoded_data());
        file_stream.write_filters(embedded.deref_mut().deref_mut());
        embedded.finish();

        let mut file_spec = chunk.file_spec(filespec_ref);
        file_spec.path(Str(self.name.as_bytes()));
        file_spec.unic_file(TextStr(&self.name));

        let mut ef = file_spec.insert(Name(b"EF")).dict();
        ef.pair(Name(b"F"), stream_ref);
        ef.pair(Name(b"UF"), stream_ref);
        ef.finish();

        file_spec.finish();

        chunk
    }
}
