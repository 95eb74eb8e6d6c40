//! Geometric primitives.

pub use tiny_skia_path::{Point, Rect, Size, Transform};

pub(crate) trait RectExt {
    fn to_pdf_rect(&self) -> pdf_writer::Rect;
}

impl RectExt for Rect {
    fn to_pdf_rect(&self) -> pdf_writer::Rect {
        pdf_writer::Rect::new(self.left(), self.top(), self.right(), self.bottom())
    }
}
