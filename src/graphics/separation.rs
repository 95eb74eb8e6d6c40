//! Separation color spaces.

use std::ops::DerefMut;

use pdf_writer::{Chunk, Finish, Name, Ref};

use crate::error::Result;
use crate::graphics::color::check_unit;
use crate::stream::FilterStreamBuilder;

/// Serialize a separation color space with a CMYK fallback.
///
/// The tint transform is a type 4 PostScript calculator function scaling the
/// fallback color by the tint value.
pub(crate) fn serialize_separation(
    name: &str,
    fallback: [f32; 4],
    function_ref: Ref,
    root_ref: Ref,
) -> Result<Chunk> {
    for component in fallback {
        check_unit(component)?;
    }

    let mut chunk = Chunk::new();

    let code = format!(
        "{{ dup {} mul\nexch {} exch dup {} mul\nexch {} mul\n}}\n",
        fallback[0], fallback[1], fallback[2], fallback[3]
    );

    let tint_stream = FilterStreamBuilder::new_from_uncompressed(code.as_bytes()).finish();
    let mut function = chunk.post_script_function(function_ref, tint_stream.encoded_data());
    tint_stream.write_filters(function.deref_mut().deref_mut());
    function.domain([0.0, 1.0]);
    function.range([0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0]);
    function.finish();

    let mut array = chunk.indirect(root_ref).array();
    array.item(Name(b"Separation"));
    array.item(Name(name.as_bytes()));
    array.item(Name(b"DeviceCMYK"));
    array.item(function_ref);
    array.finish();

    Ok(chunk)
}
