//! Pages.

use std::ops::DerefMut;

use pdf_writer::{Chunk, Finish, Name, Ref};

use crate::geom::{Rect, RectExt};
use crate::interactive::navigation::Transition;
use crate::resource::ResourceDictionary;
use crate::serialize::SerializeContext;
use crate::stream::FilterStreamBuilder;

/// Overridable page properties.
///
/// Every box that is set here replaces the value derived from the page
/// settings; unset boxes are not written at all (except for the mandatory
/// media box).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageProperties {
    /// The media box.
    pub media_box: Option<Rect>,
    /// The crop box.
    pub crop_box: Option<Rect>,
    /// The bleed box.
    pub bleed_box: Option<Rect>,
    /// The trim box.
    pub trim_box: Option<Rect>,
    /// The art box.
    pub art_box: Option<Rect>,
}

impl PageProperties {
    /// Overlay `other` on top of `self`: set fields of `other` win.
    pub(crate) fn merged_with(&self, other: &PageProperties) -> PageProperties {
        PageProperties {
            media_box: other.media_box.or(self.media_box),
            crop_box: other.crop_box.or(self.crop_box),
            bleed_box: other.bleed_box.or(self.bleed_box),
            trim_box: other.trim_box.or(self.trim_box),
            art_box: other.art_box.or(self.art_box),
        }
    }
}

/// The settings of a page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSettings {
    width: f32,
    height: f32,
    properties: PageProperties,
}

impl PageSettings {
    /// Create new page settings with the given page size in points.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            properties: PageProperties::default(),
        }
    }

    /// Override individual page boxes.
    pub fn with_properties(mut self, properties: PageProperties) -> Self {
        self.properties = properties;
        self
    }

    /// The width of the page surface.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// The height of the page surface.
    pub fn height(&self) -> f32 {
        self.height
    }

    pub(crate) fn properties(&self) -> &PageProperties {
        &self.properties
    }

    pub(crate) fn media_box(&self) -> Rect {
        self.properties
            .media_box
            .unwrap_or_else(|| Rect::from_xywh(0.0, 0.0, self.width, self.height).unwrap())
    }
}

impl Default for PageSettings {
    fn default() -> Self {
        // A4.
        Self::new(595.0, 842.0)
    }
}

/// A page whose surface has been finished, waiting for serialization.
pub(crate) struct InternalPage {
    pub(crate) page_index: usize,
    pub(crate) stream_ref: Ref,
    pub(crate) content: Vec<u8>,
    pub(crate) resources: ResourceDictionary,
    pub(crate) settings: PageSettings,
    pub(crate) widget_refs: Vec<Ref>,
    pub(crate) annotation_refs: Vec<Ref>,
    pub(crate) transition: Option<Transition>,
    pub(crate) subnav_root: Option<Ref>,
    pub(crate) struct_parents: Option<i32>,
}

impl InternalPage {
    pub(crate) fn serialize(&self, sc: &mut SerializeContext, root_ref: Ref) -> Chunk {
        let mut chunk = Chunk::new();

        let page_stream = FilterStreamBuilder::new_from_content_stream(
            &self.content,
            sc.settings().compress_content_streams,
        )
        .finish();
        let mut stream = chunk.stream(self.stream_ref, page_stream.encoded_data());
        page_stream.write_filters(stream.deref_mut());
        stream.finish();

        let mut page = chunk.page(root_ref);

        self.resources.to_pdf_resources(&mut page.resources());

        page.media_box(self.settings.media_box().to_pdf_rect());

        let properties = self.settings.properties();
        if let Some(crop_box) = properties.crop_box {
            page.crop_box(crop_box.to_pdf_rect());
        }
        if let Some(bleed_box) = properties.bleed_box {
            page.bleed_box(bleed_box.to_pdf_rect());
        }
        if let Some(trim_box) = properties.trim_box {
            page.trim_box(trim_box.to_pdf_rect());
        }
        if let Some(art_box) = properties.art_box {
            page.art_box(art_box.to_pdf_rect());
        }

        page.parent(sc.page_tree_ref());
        page.contents(self.stream_ref);

        if !self.widget_refs.is_empty() || !self.annotation_refs.is_empty() {
            page.annotations(
                self.widget_refs
                    .iter()
                    .chain(self.annotation_refs.iter())
                    .copied(),
            );
        }

        if let Some(struct_parents) = self.struct_parents {
            page.struct_parents(struct_parents);
        }

        if let Some(transition) = &self.transition {
            let mut trans = page.insert(Name(b"Trans")).dict();
            transition.write_into(&mut trans);
            trans.finish();
        }

        if let Some(subnav_root) = self.subnav_root {
            page.pair(Name(b"PresSteps"), subnav_root);
        }

        // The page group carries the blending color space of the output
        // intent; without an intent there is nothing to declare.
        if let Some(group_cs) = sc.page_group_color_space() {
            let mut group = page.group();
            let mut transparency = group.transparency();
            transparency.pair(Name(b"CS"), group_cs);
            transparency.finish();
            group.finish();
        }

        page.finish();

        chunk
    }
}
