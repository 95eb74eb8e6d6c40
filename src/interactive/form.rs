//! Form widgets.
//!
//! Only checkbox widgets are supported. A widget references two form
//! XObjects for its on and off appearance; like annotations, widgets are
//! materialized at finalization time when their page is known.

use pdf_writer::types::{AnnotationFlags, AnnotationType};
use pdf_writer::{Chunk, Finish, Name, Ref, Str};

use crate::geom::{Rect, RectExt};
use crate::serialize::FormXObjectId;

/// A checkbox form widget.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CheckboxWidget {
    pub(crate) rect: Rect,
    pub(crate) on_state: FormXObjectId,
    pub(crate) off_state: FormXObjectId,
    pub(crate) partial_name: String,
}

impl CheckboxWidget {
    pub(crate) fn serialize(
        &self,
        root_ref: Ref,
        page_ref: Option<Ref>,
        on_ref: Ref,
        off_ref: Ref,
    ) -> Chunk {
        let mut chunk = Chunk::new();

        let mut annotation = chunk
            .indirect(root_ref)
            .start::<pdf_writer::writers::Annotation>();
        annotation.subtype(AnnotationType::Widget);
        annotation.rect(self.rect.to_pdf_rect());
        annotation.flags(AnnotationFlags::PRINT);

        annotation.pair(Name(b"FT"), Name(b"Btn"));
        annotation.pair(Name(b"T"), Str(self.partial_name.as_bytes()));
        annotation.pair(Name(b"V"), Name(b"Off"));
        annotation.pair(Name(b"AS"), Name(b"Off"));

        if let Some(page_ref) = page_ref {
            annotation.pair(Name(b"P"), page_ref);
        }

        let mut appearance = annotation.insert(Name(b"AP")).dict();
        let mut normal = appearance.insert(Name(b"N")).dict();
        normal.pair(Name(b"On"), on_ref);
        normal.pair(Name(b"Off"), off_ref);
        normal.finish();
        appearance.finish();

        annotation.finish();

        chunk
    }
}
