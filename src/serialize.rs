//! The serializer context.
//!
//! All mutable state of a document in progress lives here: the reference
//! allocator, the per-kind resource tables behind the public handles, the
//! chunk container and the deferred objects that can only be written once
//! the whole document is known. `finish` runs the finalization pipeline and
//! hands the assembled chunks to the chunk container for emission.

use std::collections::HashMap;

use log::debug;
use pdf_writer::{Chunk, Dict, Finish, Name, Ref, TextStr};

use crate::chunk_container::{CatalogData, ChunkContainer};
use crate::data::Data;
use crate::document::IntentSubtype;
use crate::error::{Error, Result};
use crate::geom::Rect;
use crate::graphics::color::{DeviceColorSpace, LabColorSpace};
use crate::graphics::ext_g_state::GraphicsState;
use crate::graphics::function::FunctionType2;
use crate::graphics::icc::{serialize_profile, IccMetadata, IccProfileEntry};
use crate::graphics::image::{
    serialize_dct, serialize_sampled, ImageColorSpace, ImageInterpolation, RasterImage,
};
use crate::graphics::optional_content::serialize_ocg;
use crate::graphics::separation::serialize_separation;
use crate::graphics::shading::Shading;
use crate::interactive::annotation::Annotation;
use crate::interactive::form::CheckboxWidget;
use crate::interactive::navigation::{
    serialize_navigation, ResolvedNavigation, SubPageNavigation, Transition,
};
use crate::interactive::outline::OutlineTree;
use crate::interchange::embed::EmbeddedFile;
use crate::interchange::tagging::{
    write_kind, RoleMapEntry, StructureItem, StructureItemKind, StructureUsage,
};
use crate::interchange::StructureType;
use crate::metadata::Metadata;
use crate::page::{InternalPage, PageSettings};
use crate::resource::ResourceDictionary;
use crate::text::cid::serialize_subset_font;
use crate::text::font::{BuiltinFont, Font};
use crate::text::subset::FontSubsetter;
use crate::util::hash128;

macro_rules! handle {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) usize);
    };
}

handle!(
    /// Identifies a registered image.
    ImageId
);
handle!(
    /// Identifies a loaded font.
    FontId
);
handle!(
    /// Identifies a registered graphics state.
    GraphicsStateId
);
handle!(
    /// Identifies a registered pattern.
    PatternId
);
handle!(
    /// Identifies a registered shading.
    ShadingId
);
handle!(
    /// Identifies a registered function.
    FunctionId
);
handle!(
    /// Identifies an embedded ICC profile.
    IccColorSpaceId
);
handle!(
    /// Identifies a registered Lab color space.
    LabColorSpaceId
);
handle!(
    /// Identifies a registered separation.
    SeparationId
);
handle!(
    /// Identifies a finished form XObject.
    FormXObjectId
);
handle!(
    /// Identifies a finished transparency group.
    TransparencyGroupId
);
handle!(
    /// Identifies an optional content group.
    OcgId
);
handle!(
    /// Identifies a form widget.
    FormWidgetId
);
handle!(
    /// Identifies an annotation.
    AnnotationId
);
handle!(
    /// Identifies a structure item.
    StructureItemId
);
handle!(
    /// Identifies a role map entry.
    RoleId
);
handle!(
    /// Identifies an embedded file.
    EmbeddedFileId
);
handle!(
    /// Identifies an outline item.
    OutlineId
);
handle!(
    /// Identifies a finished page.
    PageId
);

/// The document-level settings the serializer needs.
#[derive(Debug, Clone)]
pub(crate) struct SerializeSettings {
    pub(crate) compress_content_streams: bool,
    pub(crate) output_color_space: DeviceColorSpace,
    pub(crate) subtype: Option<IntentSubtype>,
    pub(crate) intent_condition_identifier: Option<String>,
    pub(crate) tagged: bool,
    pub(crate) xmp_metadata: bool,
}

pub(crate) struct PageInfo {
    pub(crate) ref_: Ref,
}

struct FontContainer {
    font: Font,
    subsetter: FontSubsetter,
    /// The Type0 ref of each subset, allocated when the subset is opened.
    subset_refs: Vec<Ref>,
}

/// The location of a glyph, resolved for content-stream encoding.
pub(crate) struct SubsetGlyphInfo {
    pub(crate) slot: u8,
    pub(crate) font_ref: Ref,
}

struct PendingAnnotation {
    ref_: Ref,
    annotation: Annotation,
    page_index: Option<usize>,
}

struct PendingWidget {
    ref_: Ref,
    widget: CheckboxWidget,
    page_index: Option<usize>,
}

struct EmbeddedFileEntry {
    filespec_ref: Ref,
    name: String,
}

pub(crate) struct SerializeContext {
    settings: SerializeSettings,
    cur_ref: Ref,
    pub(crate) chunk_container: ChunkContainer,
    page_tree_ref: Option<Ref>,
    page_infos: Vec<PageInfo>,

    images: Vec<Ref>,
    fonts: Vec<FontContainer>,
    builtin_fonts: HashMap<BuiltinFont, Ref>,
    graphics_states: Vec<Ref>,
    functions: Vec<Ref>,
    shadings: Vec<Ref>,
    patterns: Vec<Ref>,
    separations: Vec<Ref>,
    lab_spaces: Vec<Ref>,
    icc_profiles: Vec<IccProfileEntry>,
    ocgs: Vec<Ref>,
    form_xobjects: Vec<Ref>,
    transparency_groups: Vec<Ref>,
    embedded_files: Vec<EmbeddedFileEntry>,
    output_profile: Option<IccColorSpaceId>,

    pages: Vec<InternalPage>,
    annotations: Vec<PendingAnnotation>,
    form_widgets: Vec<PendingWidget>,
    structure_items: Vec<StructureItem>,
    structure_parents: Vec<Vec<StructureItemId>>,
    role_map: Vec<RoleMapEntry>,
    outline: OutlineTree,
}

impl SerializeContext {
    pub(crate) fn new(settings: SerializeSettings, metadata: Metadata) -> Self {
        let mut chunk_container = ChunkContainer::new();
        chunk_container.metadata = Some(metadata);

        Self {
            settings,
            cur_ref: Ref::new(1),
            chunk_container,
            page_tree_ref: None,
            page_infos: vec![],
            images: vec![],
            fonts: vec![],
            builtin_fonts: HashMap::new(),
            graphics_states: vec![],
            functions: vec![],
            shadings: vec![],
            patterns: vec![],
            separations: vec![],
            lab_spaces: vec![],
            icc_profiles: vec![],
            ocgs: vec![],
            form_xobjects: vec![],
            transparency_groups: vec![],
            embedded_files: vec![],
            output_profile: None,
            pages: vec![],
            annotations: vec![],
            form_widgets: vec![],
            structure_items: vec![],
            structure_parents: vec![],
            role_map: vec![],
            outline: OutlineTree::default(),
        }
    }

    pub(crate) fn new_ref(&mut self) -> Ref {
        self.cur_ref.bump()
    }

    pub(crate) fn settings(&self) -> &SerializeSettings {
        &self.settings
    }

    pub(crate) fn page_tree_ref(&mut self) -> Ref {
        *self
            .page_tree_ref
            .get_or_insert_with(|| self.cur_ref.bump())
    }

    pub(crate) fn num_pages(&self) -> usize {
        self.page_infos.len()
    }

    pub(crate) fn page_group_color_space(&self) -> Option<Ref> {
        self.output_profile
            .map(|id| self.icc_profiles[id.0].color_space_ref)
    }
}

/// Registration methods.
impl SerializeContext {
    pub(crate) fn set_output_profile(&mut self, data: &[u8]) -> Result<()> {
        let id = self.register_icc_profile(data)?;

        let expected = self.settings.output_color_space.num_components();
        if self.icc_profiles[id.0].metadata.color_model.num_components() != expected {
            return Err(Error::ColorspaceMismatch);
        }

        self.output_profile = Some(id);
        Ok(())
    }

    pub(crate) fn has_output_profile(&self) -> bool {
        self.output_profile.is_some()
    }

    /// Register an ICC profile, deduplicating by content.
    pub(crate) fn register_icc_profile(&mut self, data: &[u8]) -> Result<IccColorSpaceId> {
        let hash = hash128(&data);
        if let Some(index) = self.icc_profiles.iter().position(|p| p.hash == hash) {
            return Ok(IccColorSpaceId(index));
        }

        let metadata = IccMetadata::from_data(data).ok_or(Error::UnsupportedFormat)?;

        let stream_ref = self.new_ref();
        let color_space_ref = self.new_ref();
        let chunk = serialize_profile(data, metadata, stream_ref, color_space_ref)?;
        self.chunk_container.icc_profiles.push(chunk);

        self.icc_profiles.push(IccProfileEntry {
            hash,
            stream_ref,
            color_space_ref,
            metadata,
        });

        Ok(IccColorSpaceId(self.icc_profiles.len() - 1))
    }

    pub(crate) fn icc_color_space_ref(&self, id: IccColorSpaceId) -> Ref {
        self.icc_profiles[id.0].color_space_ref
    }

    pub(crate) fn icc_num_components(&self, id: IccColorSpaceId) -> usize {
        self.icc_profiles[id.0].metadata.color_model.num_components()
    }

    pub(crate) fn register_image(&mut self, image: &RasterImage) -> Result<ImageId> {
        image.validate(false)?;

        // Color images are stored in their own color space; a CMYK output
        // intent implies a CMYK workflow, which only CMYK samples fit into.
        if self.settings.output_color_space == DeviceColorSpace::Cmyk
            && image.color_space != DeviceColorSpace::Gray
        {
            if self.output_profile.is_none() {
                return Err(Error::NoCmykProfile);
            }
            if image.color_space != DeviceColorSpace::Cmyk {
                return Err(Error::UnsupportedFormat);
            }
        }

        let smask_ref = match &image.alpha {
            Some(alpha) => {
                let ref_ = self.new_ref();
                let chunk = serialize_sampled(
                    ref_,
                    image.width,
                    image.height,
                    image.alpha_bits_per_component,
                    image.interpolation,
                    Some(ImageColorSpace::Device(DeviceColorSpace::Gray)),
                    None,
                    alpha,
                );
                self.chunk_container.images.push(chunk);
                Some(ref_)
            }
            None => None,
        };

        let color_space = match &image.icc_profile {
            Some(profile) => {
                let id = self.register_icc_profile(profile)?;
                if self.icc_num_components(id) != image.color_space.num_components() {
                    return Err(Error::ColorspaceMismatch);
                }
                ImageColorSpace::Icc(self.icc_color_space_ref(id))
            }
            None => ImageColorSpace::Device(image.color_space),
        };

        let ref_ = self.new_ref();
        let chunk = serialize_sampled(
            ref_,
            image.width,
            image.height,
            image.bits_per_component,
            image.interpolation,
            Some(color_space),
            smask_ref,
            &image.pixels,
        );
        self.chunk_container.images.push(chunk);
        self.images.push(ref_);

        Ok(ImageId(self.images.len() - 1))
    }

    /// Register a 1-bit grayscale image as a stencil mask.
    pub(crate) fn register_mask_image(&mut self, image: &RasterImage) -> Result<ImageId> {
        if image.color_space != DeviceColorSpace::Gray || image.bits_per_component != 1 {
            return Err(Error::UnsupportedFormat);
        }
        image.validate(true)?;

        let ref_ = self.new_ref();
        let chunk = serialize_sampled(
            ref_,
            image.width,
            image.height,
            image.bits_per_component,
            image.interpolation,
            None,
            None,
            &image.pixels,
        );
        self.chunk_container.images.push(chunk);
        self.images.push(ref_);

        Ok(ImageId(self.images.len() - 1))
    }

    /// Register pre-encoded DCT (JPEG) data as an RGB image.
    pub(crate) fn register_dct_image(
        &mut self,
        data: &[u8],
        width: u32,
        height: u32,
        interpolation: ImageInterpolation,
    ) -> Result<ImageId> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidImageSize);
        }
        if data.is_empty() {
            return Err(Error::MissingPixels);
        }

        let ref_ = self.new_ref();
        let chunk = serialize_dct(ref_, width, height, interpolation, data);
        self.chunk_container.images.push(chunk);
        self.images.push(ref_);

        Ok(ImageId(self.images.len() - 1))
    }

    pub(crate) fn image_ref(&self, id: ImageId) -> Ref {
        self.images[id.0]
    }

    pub(crate) fn register_graphics_state(
        &mut self,
        state: &GraphicsState,
    ) -> Result<GraphicsStateId> {
        let ref_ = self.new_ref();
        let chunk = state.serialize(ref_)?;
        self.chunk_container.ext_g_states.push(chunk);
        self.graphics_states.push(ref_);

        Ok(GraphicsStateId(self.graphics_states.len() - 1))
    }

    pub(crate) fn graphics_state_ref(&self, id: GraphicsStateId) -> Ref {
        self.graphics_states[id.0]
    }

    pub(crate) fn register_function(&mut self, function: &FunctionType2) -> Result<FunctionId> {
        let ref_ = self.new_ref();
        let chunk = function.serialize(ref_)?;
        self.chunk_container.functions.push(chunk);
        self.functions.push(ref_);

        Ok(FunctionId(self.functions.len() - 1))
    }

    pub(crate) fn register_shading(&mut self, shading: &Shading) -> Result<ShadingId> {
        let ref_ = self.new_ref();
        let chunk = shading.serialize(ref_, &self.functions)?;
        self.chunk_container.shadings.push(chunk);
        self.shadings.push(ref_);

        Ok(ShadingId(self.shadings.len() - 1))
    }

    pub(crate) fn shading_ref(&self, id: ShadingId) -> Ref {
        self.shadings[id.0]
    }

    pub(crate) fn register_separation(
        &mut self,
        name: &str,
        fallback: [f32; 4],
    ) -> Result<SeparationId> {
        let function_ref = self.new_ref();
        let root_ref = self.new_ref();
        let chunk = serialize_separation(name, fallback, function_ref, root_ref)?;
        self.chunk_container.color_spaces.push(chunk);
        self.separations.push(root_ref);

        Ok(SeparationId(self.separations.len() - 1))
    }

    pub(crate) fn separation_ref(&self, id: SeparationId) -> Ref {
        self.separations[id.0]
    }

    pub(crate) fn register_lab_color_space(&mut self, lab: &LabColorSpace) -> LabColorSpaceId {
        let root_ref = self.new_ref();

        let mut chunk = Chunk::new();
        let mut array = chunk.indirect(root_ref).array();
        array.item(Name(b"Lab"));
        let mut dict = array.push().dict();
        let mut white_point = dict.insert(Name(b"WhitePoint")).array();
        white_point.items(lab.white_point);
        white_point.finish();
        let mut range = dict.insert(Name(b"Range")).array();
        range.items([lab.a_min, lab.a_max, lab.b_min, lab.b_max]);
        range.finish();
        dict.finish();
        array.finish();

        self.chunk_container.color_spaces.push(chunk);
        self.lab_spaces.push(root_ref);

        LabColorSpaceId(self.lab_spaces.len() - 1)
    }

    pub(crate) fn lab_color_space_ref(&self, id: LabColorSpaceId) -> Ref {
        self.lab_spaces[id.0]
    }

    pub(crate) fn register_ocg(&mut self, name: &str) -> OcgId {
        let ref_ = self.new_ref();
        let chunk = serialize_ocg(name, ref_);
        self.chunk_container.optional_content_groups.push(chunk);
        self.ocgs.push(ref_);

        OcgId(self.ocgs.len() - 1)
    }

    pub(crate) fn ocg_ref(&self, id: OcgId) -> Ref {
        self.ocgs[id.0]
    }

    pub(crate) fn add_form_xobject_chunk(&mut self, ref_: Ref, chunk: Chunk) -> FormXObjectId {
        self.chunk_container.x_objects.push(chunk);
        self.form_xobjects.push(ref_);
        FormXObjectId(self.form_xobjects.len() - 1)
    }

    pub(crate) fn form_xobject_ref(&self, id: FormXObjectId) -> Ref {
        self.form_xobjects[id.0]
    }

    pub(crate) fn add_transparency_group_chunk(
        &mut self,
        ref_: Ref,
        chunk: Chunk,
    ) -> TransparencyGroupId {
        self.chunk_container.x_objects.push(chunk);
        self.transparency_groups.push(ref_);
        TransparencyGroupId(self.transparency_groups.len() - 1)
    }

    pub(crate) fn transparency_group_ref(&self, id: TransparencyGroupId) -> Ref {
        self.transparency_groups[id.0]
    }

    pub(crate) fn add_pattern_chunk(&mut self, ref_: Ref, chunk: Chunk) -> PatternId {
        self.chunk_container.patterns.push(chunk);
        self.patterns.push(ref_);
        PatternId(self.patterns.len() - 1)
    }

    pub(crate) fn pattern_ref(&self, id: PatternId) -> Ref {
        self.patterns[id.0]
    }

    pub(crate) fn load_font(&mut self, data: Data) -> Result<FontId> {
        let font = Font::new(data, 0)?;
        self.fonts.push(FontContainer {
            font,
            subsetter: FontSubsetter::new(),
            subset_refs: vec![],
        });

        Ok(FontId(self.fonts.len() - 1))
    }

    pub(crate) fn builtin_font_ref(&mut self, font: BuiltinFont) -> Ref {
        if let Some(ref_) = self.builtin_fonts.get(&font) {
            return *ref_;
        }

        let ref_ = self.new_ref();

        let mut chunk = Chunk::new();
        chunk.type1_font(ref_).base_font(font.base_font());
        self.chunk_container.fonts.push(chunk);

        self.builtin_fonts.insert(font, ref_);
        ref_
    }

    /// Resolve a codepoint to its subset location in the given font,
    /// opening a new subset if necessary.
    pub(crate) fn get_subset_glyph(
        &mut self,
        font_id: FontId,
        codepoint: u32,
    ) -> Result<SubsetGlyphInfo> {
        let glyph_id = self.fonts[font_id.0]
            .font
            .glyph_for_codepoint(codepoint)
            .ok_or(Error::MissingGlyph)?;

        let location = self.fonts[font_id.0]
            .subsetter
            .get_glyph_subset(codepoint, glyph_id);

        while self.fonts[font_id.0].subset_refs.len() <= location.subset {
            let ref_ = self.new_ref();
            self.fonts[font_id.0].subset_refs.push(ref_);
        }

        Ok(SubsetGlyphInfo {
            slot: location.slot,
            font_ref: self.fonts[font_id.0].subset_refs[location.subset],
        })
    }

    pub(crate) fn create_annotation(&mut self, annotation: Annotation) -> Result<AnnotationId> {
        annotation.validate()?;

        let ref_ = self.new_ref();
        self.annotations.push(PendingAnnotation {
            ref_,
            annotation,
            page_index: None,
        });

        Ok(AnnotationId(self.annotations.len() - 1))
    }

    pub(crate) fn create_form_checkbox(
        &mut self,
        rect: Rect,
        on_state: FormXObjectId,
        off_state: FormXObjectId,
        partial_name: String,
    ) -> Result<FormWidgetId> {
        let ref_ = self.new_ref();
        self.form_widgets.push(PendingWidget {
            ref_,
            widget: CheckboxWidget {
                rect,
                on_state,
                off_state,
                partial_name,
            },
            page_index: None,
        });

        Ok(FormWidgetId(self.form_widgets.len() - 1))
    }

    /// The `BDC` tag for marked content belonging to a structure item: the
    /// builtin type name, or the role name for role-mapped items.
    pub(crate) fn structure_item_tag(&self, id: StructureItemId) -> String {
        match self.structure_items[id.0].kind {
            StructureItemKind::Builtin(ty) => ty.name().to_string(),
            StructureItemKind::Role(role) => self.role_map[role.0].name.clone(),
        }
    }

    pub(crate) fn add_structure_item(
        &mut self,
        kind: StructureItemKind,
        parent: Option<StructureItemId>,
    ) -> StructureItemId {
        let ref_ = self.new_ref();
        self.structure_items.push(StructureItem {
            ref_,
            kind,
            parent,
            usage: None,
        });

        StructureItemId(self.structure_items.len() - 1)
    }

    pub(crate) fn add_rolemap_entry(
        &mut self,
        name: String,
        builtin: StructureType,
    ) -> Result<RoleId> {
        if name.is_empty() || name.starts_with('/') {
            return Err(Error::SlashStart);
        }
        if self.role_map.iter().any(|entry| entry.name == name) {
            return Err(Error::RoleAlreadyDefined);
        }

        self.role_map.push(RoleMapEntry { name, builtin });
        Ok(RoleId(self.role_map.len() - 1))
    }

    pub(crate) fn embed_file(&mut self, name: String, data: Vec<u8>) -> EmbeddedFileId {
        let filespec_ref = self.new_ref();
        let stream_ref = self.new_ref();

        let file = EmbeddedFile {
            name: name.clone(),
            data,
        };
        let chunk = file.serialize(filespec_ref, stream_ref);
        self.chunk_container.embedded_files.push(chunk);

        self.embedded_files.push(EmbeddedFileEntry {
            filespec_ref,
            name,
        });

        EmbeddedFileId(self.embedded_files.len() - 1)
    }

    pub(crate) fn filespec_ref(&self, id: EmbeddedFileId) -> Ref {
        self.embedded_files[id.0].filespec_ref
    }

    pub(crate) fn add_outline(
        &mut self,
        title: String,
        destination: PageId,
        parent: Option<OutlineId>,
    ) -> OutlineId {
        self.outline.add(title, destination, parent)
    }

    /// Register a finished page surface as the next page of the document.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn register_page(
        &mut self,
        settings: PageSettings,
        content: Vec<u8>,
        resources: ResourceDictionary,
        widgets: Vec<FormWidgetId>,
        annotations: Vec<AnnotationId>,
        structures: Vec<StructureItemId>,
        transition: Option<Transition>,
        sub_navigations: Vec<SubPageNavigation>,
    ) -> Result<PageId> {
        let page_index = self.page_infos.len();

        // Widgets, annotations and structure items may only ever appear on
        // one page.
        for widget in &widgets {
            if self.form_widgets[widget.0].page_index.is_some() {
                return Err(Error::AnnotationReuse);
            }
        }
        for annotation in &annotations {
            if self.annotations[annotation.0].page_index.is_some() {
                return Err(Error::AnnotationReuse);
            }
        }
        for (i, structure) in structures.iter().enumerate() {
            if self.structure_items[structure.0].usage.is_some()
                || structures[..i].contains(structure)
            {
                return Err(Error::StructureReuse);
            }
        }

        for widget in &widgets {
            self.form_widgets[widget.0].page_index = Some(page_index);
        }
        for annotation in &annotations {
            self.annotations[annotation.0].page_index = Some(page_index);
        }
        for (mcid, structure) in structures.iter().enumerate() {
            self.structure_items[structure.0].usage = Some(StructureUsage {
                page_index,
                mcid: mcid as i32,
            });
        }

        let struct_parents = if structures.is_empty() {
            None
        } else {
            self.structure_parents.push(structures);
            Some(self.structure_parents.len() as i32 - 1)
        };

        let subnav_root = if sub_navigations.is_empty() {
            None
        } else {
            let resolved = sub_navigations
                .iter()
                .map(|nav| ResolvedNavigation {
                    ocg: self.ocg_ref(nav.ocg),
                    transition: nav.transition,
                })
                .collect::<Vec<_>>();

            let refs = (0..resolved.len() + 2)
                .map(|_| self.new_ref())
                .collect::<Vec<_>>();
            let chunk = serialize_navigation(&refs, &resolved);
            self.chunk_container.navigation.push(chunk);
            Some(refs[0])
        };

        let page_ref = self.new_ref();
        let stream_ref = self.new_ref();

        let widget_refs = widgets
            .iter()
            .map(|w| self.form_widgets[w.0].ref_)
            .collect();
        let annotation_refs = annotations
            .iter()
            .map(|a| self.annotations[a.0].ref_)
            .collect();

        self.pages.push(InternalPage {
            page_index,
            stream_ref,
            content,
            resources,
            settings,
            widget_refs,
            annotation_refs,
            transition,
            subnav_root,
            struct_parents,
        });
        self.page_infos.push(PageInfo { ref_: page_ref });

        Ok(PageId(page_index))
    }
}

/// Finalization.
impl SerializeContext {
    pub(crate) fn finish(mut self) -> Result<Vec<u8>> {
        self.serialize_fonts()?;
        self.serialize_pages();
        self.serialize_page_tree();
        self.serialize_annotations();
        self.serialize_outline();
        self.serialize_structure_tree();
        self.serialize_output_intent();

        let catalog_data = self.catalog_data();
        let subtype = self.settings.subtype;

        debug!(
            "finalizing document with {} pages and {} objects",
            self.page_infos.len(),
            self.cur_ref.get() - 1
        );

        self.chunk_container.finish(catalog_data, subtype)
    }

    fn serialize_fonts(&mut self) -> Result<()> {
        let mut fonts = std::mem::take(&mut self.fonts);

        for container in &mut fonts {
            container.subsetter.pad_with_space(&container.font);

            // Subsets that were never referenced (at least the initial one
            // of an unused font) still need their object allocated.
            while container.subset_refs.len() < container.subsetter.num_subsets() {
                let ref_ = self.new_ref();
                container.subset_refs.push(ref_);
            }

            debug!(
                "embedding {:?} as {} subset font(s)",
                container.font,
                container.subsetter.num_subsets()
            );

            for (index, root_ref) in container.subset_refs.iter().enumerate() {
                let entries = container.subsetter.subset_entries(index).to_vec();
                let chunk =
                    serialize_subset_font(self, &container.font, &entries, *root_ref)?;
                self.chunk_container.fonts.push(chunk);
            }
        }

        Ok(())
    }

    fn serialize_pages(&mut self) {
        let pages = std::mem::take(&mut self.pages);
        for page in &pages {
            let root_ref = self.page_infos[page.page_index].ref_;
            let chunk = page.serialize(self, root_ref);
            self.chunk_container.pages.push(chunk);
        }
    }

    fn serialize_page_tree(&mut self) {
        let page_tree_ref = self.page_tree_ref();
        let mut page_tree_chunk = Chunk::new();

        page_tree_chunk
            .pages(page_tree_ref)
            .count(self.page_infos.len() as i32)
            .kids(self.page_infos.iter().map(|i| i.ref_));

        self.chunk_container.page_tree = Some((page_tree_ref, page_tree_chunk));
    }

    fn serialize_annotations(&mut self) {
        let annotations = std::mem::take(&mut self.annotations);
        for pending in &annotations {
            let page_ref = pending.page_index.map(|i| self.page_infos[i].ref_);
            let chunk = pending.annotation.serialize(pending.ref_, page_ref, |id| {
                self.filespec_ref(id)
            });
            self.chunk_container.annotations.push(chunk);
        }

        let widgets = std::mem::take(&mut self.form_widgets);
        for pending in &widgets {
            let page_ref = pending.page_index.map(|i| self.page_infos[i].ref_);
            let on_ref = self.form_xobject_ref(pending.widget.on_state);
            let off_ref = self.form_xobject_ref(pending.widget.off_state);
            let chunk = pending
                .widget
                .serialize(pending.ref_, page_ref, on_ref, off_ref);
            self.chunk_container.annotations.push(chunk);
        }

        // The catalog's AcroForm lists every widget.
        self.form_widgets = widgets;
    }

    fn serialize_outline(&mut self) {
        let outline = std::mem::take(&mut self.outline);
        if outline.is_empty() {
            return;
        }

        let item_refs = (0..outline.len())
            .map(|_| self.new_ref())
            .collect::<Vec<_>>();
        let root_ref = self.new_ref();

        let page_refs = self.page_infos.iter().map(|p| p.ref_).collect::<Vec<_>>();
        let chunk = outline.serialize(&item_refs, root_ref, |page| page_refs[page.0]);

        self.chunk_container.outline = Some((root_ref, chunk));
    }

    fn serialize_structure_tree(&mut self) {
        let items = std::mem::take(&mut self.structure_items);
        if items.is_empty() {
            return;
        }

        let struct_parents = std::mem::take(&mut self.structure_parents);
        let role_map = std::mem::take(&mut self.role_map);

        let struct_tree_root_ref = self.new_ref();

        // Children in creation order, which is also the order of the /K
        // arrays.
        let mut children: HashMap<usize, Vec<usize>> = HashMap::new();
        let mut root_item = None;
        for (index, item) in items.iter().enumerate() {
            match item.parent {
                Some(parent) => children.entry(parent.0).or_default().push(index),
                None => root_item = root_item.or(Some(index)),
            }
        }
        let root_item = root_item.expect("structure items without a root");

        for (index, item) in items.iter().enumerate() {
            let mut chunk = Chunk::new();
            let mut elem = chunk.struct_element(item.ref_);
            write_kind(&mut elem, item.kind, &role_map);

            let parent_ref = match item.parent {
                Some(parent) => items[parent.0].ref_,
                None => struct_tree_root_ref,
            };
            elem.parent(parent_ref);

            if let Some(usage) = item.usage {
                elem.pair(Name(b"Pg"), self.page_infos[usage.page_index].ref_);
            }

            let empty = vec![];
            let kids = children.get(&index).unwrap_or(&empty);
            if item.usage.is_some() || !kids.is_empty() {
                let mut struct_children = elem.children();
                if let Some(usage) = item.usage {
                    struct_children.marked_content_id(usage.mcid);
                }
                for &kid in kids {
                    struct_children.struct_element(items[kid].ref_);
                }
                struct_children.finish();
            }

            elem.finish();
            self.chunk_container.struct_elements.push(chunk);
        }

        let mut chunk = Chunk::new();

        // Each parent tree entry is its own array object.
        let mut parent_tree_list_refs = vec![];
        for entry in &struct_parents {
            let list_ref = self.new_ref();
            let mut refs = chunk.indirect(list_ref).array();
            for structure in entry {
                refs.item(items[structure.0].ref_);
            }
            refs.finish();
            parent_tree_list_refs.push(list_ref);
        }

        let mut tree = chunk.indirect(struct_tree_root_ref).start::<Dict>();
        tree.pair(Name(b"Type"), Name(b"StructTreeRoot"));

        let mut k = tree.insert(Name(b"K")).array();
        k.item(items[root_item].ref_);
        k.finish();

        let mut parent_tree = tree
            .insert(Name(b"ParentTree"))
            .start::<pdf_writer::writers::NumberTree<Ref>>();
        let mut tree_nums = parent_tree.nums();
        for (index, list_ref) in parent_tree_list_refs.iter().enumerate() {
            tree_nums.insert(index as i32, *list_ref);
        }
        tree_nums.finish();
        parent_tree.finish();

        tree.pair(Name(b"ParentTreeNextKey"), struct_parents.len() as i32);

        if !role_map.is_empty() {
            let mut role_map_writer = tree
                .insert(Name(b"RoleMap"))
                .start::<pdf_writer::writers::RoleMap>();
            for entry in &role_map {
                role_map_writer.insert(
                    Name(entry.name.as_bytes()),
                    entry.builtin.to_struct_role(),
                );
            }
            role_map_writer.finish();
        }

        tree.finish();

        self.chunk_container.struct_tree_root = Some((struct_tree_root_ref, chunk));
    }

    fn serialize_output_intent(&mut self) {
        let Some(subtype) = self.settings.subtype else {
            return;
        };

        // Checked at document creation.
        let output_profile = self.output_profile.expect("output intent without profile");
        let identifier = self
            .settings
            .intent_condition_identifier
            .clone()
            .expect("output intent without identifier");

        let root_ref = self.new_ref();
        let oi_ref = self.new_ref();

        let mut chunk = Chunk::new();

        let mut intent = chunk.indirect(oi_ref).dict();
        intent.pair(Name(b"Type"), Name(b"OutputIntent"));
        intent.pair(Name(b"S"), subtype.to_pdf_name());
        intent.pair(Name(b"OutputConditionIdentifier"), TextStr(&identifier));
        intent.pair(
            Name(b"DestOutputProfile"),
            self.icc_profiles[output_profile.0].stream_ref,
        );
        intent.finish();

        let mut array = chunk.indirect(root_ref).array();
        array.item(oi_ref);
        array.finish();

        self.chunk_container.destination_profiles = Some((root_ref, chunk));
    }

    fn catalog_data(&self) -> CatalogData {
        let acro_form_fields = if self.form_widgets.iter().any(|w| w.page_index.is_some()) {
            self.form_widgets.iter().map(|w| w.ref_).collect()
        } else {
            vec![]
        };

        let mut embedded_file_names = self
            .embedded_files
            .iter()
            .map(|f| (f.name.clone(), f.filespec_ref))
            .collect::<Vec<_>>();
        // Name trees must be sorted by key.
        embedded_file_names.sort_by(|a, b| a.0.cmp(&b.0));

        CatalogData {
            acro_form_fields,
            ocgs: self.ocgs.clone(),
            embedded_file_names,
            tagged: self.settings.tagged,
            xmp_metadata: self.settings.xmp_metadata,
        }
    }
}
