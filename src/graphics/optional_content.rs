//! Optional content groups (layers).

use pdf_writer::{Chunk, Finish, Name, Ref, TextStr};

/// Serialize one optional content group dictionary.
pub(crate) fn serialize_ocg(name: &str, root_ref: Ref) -> Chunk {
    let mut chunk = Chunk::new();

    let mut dict = chunk.indirect(root_ref).dict();
    dict.pair(Name(b"Type"), Name(b"OCG"));
    dict.pair(Name(b"Name"), TextStr(name));
    dict.finish();

    chunk
}
