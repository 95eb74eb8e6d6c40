//! Creating PDF documents.
//!
//! A [`Document`] is the entry point of this crate: it owns all document
//! state, hands out handles for registered resources, opens drawing
//! surfaces, and finally serializes everything into the finished file.
//!
//! Because surfaces mutably borrow the document, only one surface can be
//! open at a time; resources referenced while drawing must be registered
//! before the surface is opened.

use pdf_writer::Name;

use crate::data::Data;
use crate::error::{Error, Result};
use crate::geom::Rect;
use crate::graphics::color::LabColorSpace;
use crate::graphics::ext_g_state::GraphicsState;
use crate::graphics::function::FunctionType2;
use crate::graphics::image::{ImageInterpolation, RasterImage};
use crate::graphics::shading::Shading;
use crate::interactive::annotation::Annotation;
use crate::interchange::tagging::StructureItemKind;
use crate::interchange::StructureType;
use crate::metadata::Metadata;
use crate::page::PageSettings;
use crate::serialize::{
    AnnotationId, EmbeddedFileId, FontId, FormWidgetId, FormXObjectId, FunctionId,
    GraphicsStateId, IccColorSpaceId, ImageId, LabColorSpaceId, OcgId, OutlineId, PageId,
    RoleId, SeparationId, SerializeContext, SerializeSettings, ShadingId, StructureItemId,
};
use crate::surface::Surface;

pub use crate::graphics::color::DeviceColorSpace as OutputColorSpace;

/// The conformance flavor declared through the output intent.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum IntentSubtype {
    /// PDF/X.
    PdfX,
    /// PDF/A.
    PdfA,
    /// PDF/E.
    PdfE,
}

impl IntentSubtype {
    pub(crate) fn to_pdf_name(self) -> Name<'static> {
        match self {
            IntentSubtype::PdfX => Name(b"GTS_PDFX"),
            IntentSubtype::PdfA => Name(b"GTS_PDFA"),
            IntentSubtype::PdfE => Name(b"ISO_PDFE"),
        }
    }
}

/// Settings for a new document.
#[derive(Debug, Clone)]
pub struct DocumentSettings {
    /// Whether content streams are deflated. On by default.
    pub compress_content_streams: bool,
    /// The device color space the document is produced for.
    pub output_color_space: OutputColorSpace,
    /// The conformance flavor, if any. Setting this requires both an
    /// [`output_profile`](Self::output_profile) and an
    /// [`intent_condition_identifier`](Self::intent_condition_identifier).
    pub subtype: Option<IntentSubtype>,
    /// The output condition identifier of the output intent.
    pub intent_condition_identifier: Option<String>,
    /// The ICC profile describing the intended output condition.
    pub output_profile: Option<Vec<u8>>,
    /// Document metadata.
    pub metadata: Metadata,
    /// Whether the document declares itself as tagged (`/MarkInfo`).
    pub tagged: bool,
    /// Whether an XMP metadata stream is written. On by default.
    pub xmp_metadata: bool,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            compress_content_streams: true,
            output_color_space: OutputColorSpace::Rgb,
            subtype: None,
            intent_condition_identifier: None,
            output_profile: None,
            metadata: Metadata::new(),
            tagged: false,
            xmp_metadata: true,
        }
    }
}

/// A PDF document under construction.
pub struct Document {
    pub(crate) sc: SerializeContext,
}

impl Document {
    /// Create a new document.
    ///
    /// Fails if the settings request an output intent without the required
    /// profile or condition identifier, or a CMYK workflow without a CMYK
    /// profile.
    pub fn new(settings: DocumentSettings) -> Result<Self> {
        let serialize_settings = SerializeSettings {
            compress_content_streams: settings.compress_content_streams,
            output_color_space: settings.output_color_space,
            subtype: settings.subtype,
            intent_condition_identifier: settings.intent_condition_identifier.clone(),
            tagged: settings.tagged,
            xmp_metadata: settings.xmp_metadata,
        };

        let mut sc = SerializeContext::new(serialize_settings, settings.metadata);

        if let Some(profile) = &settings.output_profile {
            sc.set_output_profile(profile)?;
        }

        if settings.output_color_space == OutputColorSpace::Cmyk && !sc.has_output_profile() {
            return Err(Error::OutputProfileMissing);
        }

        if settings.subtype.is_some() {
            if !sc.has_output_profile() {
                return Err(Error::OutputProfileMissing);
            }
            if settings.intent_condition_identifier.is_none() {
                return Err(Error::MissingIntentIdentifier);
            }
        }

        Ok(Self { sc })
    }

    /// The number of pages finished so far.
    pub fn num_pages(&self) -> usize {
        self.sc.num_pages()
    }

    /// Start drawing a new page. Finish it with
    /// [`Surface::finish_page`](crate::Surface::finish_page).
    pub fn start_page(&mut self, settings: PageSettings) -> Surface<'_> {
        Surface::new_page(&mut self.sc, settings)
    }

    /// Start drawing a form XObject with the given extent.
    pub fn start_form_xobject(&mut self, width: f32, height: f32) -> Surface<'_> {
        Surface::new_form_xobject(&mut self.sc, width, height)
    }

    /// Start drawing a colored tiling pattern cell with the given extent.
    pub fn start_tiling_pattern(&mut self, width: f32, height: f32) -> Surface<'_> {
        Surface::new_tiling_pattern(&mut self.sc, width, height)
    }

    /// Start drawing a transparency group with the given extent.
    pub fn start_transparency_group(
        &mut self,
        width: f32,
        height: f32,
        isolated: bool,
        knockout: bool,
    ) -> Surface<'_> {
        Surface::new_transparency_group(&mut self.sc, width, height, isolated, knockout)
    }

    /// Register a raster image built from raw samples.
    pub fn add_image(&mut self, image: &RasterImage) -> Result<ImageId> {
        self.sc.register_image(image)
    }

    /// Register a 1-bit grayscale image as a stencil mask.
    pub fn add_mask_image(&mut self, image: &RasterImage) -> Result<ImageId> {
        self.sc.register_mask_image(image)
    }

    /// Register pre-encoded DCT (JPEG) data as an RGB image. The data is
    /// embedded as-is; this crate does not parse it.
    pub fn add_dct_image(
        &mut self,
        data: &[u8],
        width: u32,
        height: u32,
        interpolation: ImageInterpolation,
    ) -> Result<ImageId> {
        self.sc.register_dct_image(data, width, height, interpolation)
    }

    /// Load a TrueType font for use with
    /// [`Surface::draw_text`](crate::Surface::draw_text).
    pub fn load_font(&mut self, data: impl Into<Data>) -> Result<FontId> {
        self.sc.load_font(data.into())
    }

    /// Embed an ICC profile and register it as a color space. Registering
    /// the same profile bytes twice returns the original handle.
    pub fn add_icc_color_space(&mut self, profile: &[u8]) -> Result<IccColorSpaceId> {
        self.sc.register_icc_profile(profile)
    }

    /// Register a Lab color space.
    pub fn add_lab_color_space(&mut self, lab: &LabColorSpace) -> LabColorSpaceId {
        self.sc.register_lab_color_space(lab)
    }

    /// Register a separation with the given colorant name and CMYK
    /// fallback.
    pub fn add_separation(&mut self, name: &str, fallback: [f32; 4]) -> Result<SeparationId> {
        self.sc.register_separation(name, fallback)
    }

    /// Register an external graphics state.
    pub fn add_graphics_state(&mut self, state: &GraphicsState) -> Result<GraphicsStateId> {
        self.sc.register_graphics_state(state)
    }

    /// Register a type 2 function.
    pub fn add_function(&mut self, function: &FunctionType2) -> Result<FunctionId> {
        self.sc.register_function(function)
    }

    /// Register a shading.
    pub fn add_shading(&mut self, shading: &Shading) -> Result<ShadingId> {
        self.sc.register_shading(shading)
    }

    /// Register an optional content group (a layer) with the given name.
    pub fn add_optional_content_group(&mut self, name: &str) -> OcgId {
        self.sc.register_ocg(name)
    }

    /// Create an annotation. It becomes part of the file once a page claims
    /// it with [`Surface::annotate`](crate::Surface::annotate).
    pub fn create_annotation(&mut self, annotation: Annotation) -> Result<AnnotationId> {
        self.sc.create_annotation(annotation)
    }

    /// Create a checkbox form widget with the given on/off appearances.
    pub fn create_form_checkbox(
        &mut self,
        rect: Rect,
        on_state: FormXObjectId,
        off_state: FormXObjectId,
        partial_name: &str,
    ) -> Result<FormWidgetId> {
        self.sc
            .create_form_checkbox(rect, on_state, off_state, partial_name.to_string())
    }

    /// Create a structure item with a builtin type.
    pub fn add_structure_item(
        &mut self,
        ty: StructureType,
        parent: Option<StructureItemId>,
    ) -> StructureItemId {
        self.sc
            .add_structure_item(StructureItemKind::Builtin(ty), parent)
    }

    /// Create a structure item with a role-mapped type.
    pub fn add_structure_item_with_role(
        &mut self,
        role: RoleId,
        parent: Option<StructureItemId>,
    ) -> StructureItemId {
        self.sc.add_structure_item(StructureItemKind::Role(role), parent)
    }

    /// Map a custom role name to a builtin structure type. Names must be
    /// unique and must not start with a slash.
    pub fn add_rolemap_entry(&mut self, name: &str, builtin: StructureType) -> Result<RoleId> {
        self.sc.add_rolemap_entry(name.to_string(), builtin)
    }

    /// Embed a file into the document.
    pub fn embed_file(&mut self, name: &str, data: Vec<u8>) -> EmbeddedFileId {
        self.sc.embed_file(name.to_string(), data)
    }

    /// Add an outline item pointing at a finished page. A `parent` of
    /// `None` creates a top-level item.
    pub fn add_outline(
        &mut self,
        title: &str,
        destination: PageId,
        parent: Option<OutlineId>,
    ) -> OutlineId {
        self.sc.add_outline(title.to_string(), destination, parent)
    }

    /// Serialize the document into the bytes of the finished PDF file.
    pub fn finish(self) -> Result<Vec<u8>> {
        self.sc.finish()
    }
}
