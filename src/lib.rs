/*!
A low-level Rust library for the programmatic creation of PDF files.

platen exposes the building blocks of a PDF document directly: the caller
registers resources (images, fonts, color spaces, graphics states, shadings,
patterns, optional content groups, annotations, form widgets, structure
items), opens drawing surfaces and issues content-stream operators against
them, and finally asks the document to serialize itself into a single
PDF 1.7 file. Higher-level concerns such as layout, text shaping or image
decoding are deliberately left to the caller.

# Example

```
use platen::{Document, DocumentSettings, PageSettings};

let mut document = Document::new(DocumentSettings::default()).unwrap();

let mut page = document.start_page(PageSettings::new(200.0, 200.0));
page.save_state().unwrap();
page.set_fill_rgb(0.9, 0.2, 0.2).unwrap();
page.rect(20.0, 20.0, 160.0, 160.0);
page.fill_nonzero();
page.restore_state().unwrap();
page.finish_page().unwrap();

let pdf = document.finish().unwrap();
assert!(pdf.starts_with(b"%PDF-1.7"));
```
*/

mod chunk_container;
mod data;
mod document;
mod error;
mod geom;
mod metadata;
mod page;
mod resource;
mod serialize;
mod stream;
mod surface;
mod util;

pub mod graphics;
pub mod interactive;
pub mod interchange;
pub mod text;

pub use data::Data;
pub use document::{Document, DocumentSettings, IntentSubtype, OutputColorSpace};
pub use error::{Error, Result};
pub use geom::{Point, Rect, Size, Transform};
pub use metadata::{DateTime, Metadata};
pub use page::{PageProperties, PageSettings};
pub use surface::{LineCap, LineJoin, Surface, TextEvent, TextRenderingMode};

pub use crate::serialize::{
    AnnotationId, EmbeddedFileId, FontId, FormWidgetId, FormXObjectId, FunctionId,
    GraphicsStateId, IccColorSpaceId, ImageId, LabColorSpaceId, OcgId, OutlineId, PageId,
    PatternId, RoleId, SeparationId, ShadingId, StructureItemId, TransparencyGroupId,
};
