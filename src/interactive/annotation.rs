//! Annotations.
//!
//! Annotations are registered up front (which allocates their object
//! number) and serialized only at finalization time, once the page that
//! claimed them is known and its reference can be written as `/P`.

use pdf_writer::types::{ActionType, AnnotationFlags, AnnotationType};
use pdf_writer::{Chunk, Finish, Name, Ref, Str, TextStr};

use crate::error::{Error, Result};
use crate::geom::{Rect, RectExt};
use crate::serialize::EmbeddedFileId;

/// What an annotation does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationKind {
    /// A text ("sticky note") annotation.
    Text {
        /// The note's text.
        content: String,
    },
    /// A link to a URI.
    Link {
        /// The target URI.
        uri: String,
    },
    /// A file attachment annotation.
    FileAttachment {
        /// The attached, previously embedded file.
        file: EmbeddedFileId,
    },
}

/// An annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// What the annotation does.
    pub kind: AnnotationKind,
    /// The area of the page the annotation covers. Mandatory; creation
    /// fails without it.
    pub rect: Option<Rect>,
}

impl Annotation {
    /// Create a new annotation covering `rect`.
    pub fn new(kind: AnnotationKind, rect: Rect) -> Self {
        Self {
            kind,
            rect: Some(rect),
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.rect.is_none() {
            return Err(Error::AnnotationMissingRect);
        }

        Ok(())
    }

    pub(crate) fn serialize(
        &self,
        root_ref: Ref,
        page_ref: Option<Ref>,
        filespec_ref: impl Fn(EmbeddedFileId) -> Ref,
    ) -> Chunk {
        let mut chunk = Chunk::new();

        let mut annotation = chunk
            .indirect(root_ref)
            .start::<pdf_writer::writers::Annotation>();

        // Creation checked that the rect is present.
        let rect = self.rect.expect("annotation without rect");
        annotation.rect(rect.to_pdf_rect());
        annotation.flags(AnnotationFlags::PRINT);

        if let Some(page_ref) = page_ref {
            annotation.pair(Name(b"P"), page_ref);
        }

        match &self.kind {
            AnnotationKind::Text { content } => {
                annotation.subtype(AnnotationType::Text);
                annotation.contents(TextStr(content));
            }
            AnnotationKind::Link { uri } => {
                annotation.subtype(AnnotationType::Link);
                annotation
                    .action()
                    .action_type(ActionType::Uri)
                    .uri(Str(uri.as_bytes()));
            }
            AnnotationKind::FileAttachment { file } => {
                annotation.subtype(AnnotationType::FileAttachment);
                annotation.pair(Name(b"FS"), filespec_ref(*file));
            }
        }

        annotation.finish();

        chunk
    }
}
