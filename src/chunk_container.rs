//! Collecting chunks during PDF creation.
//!
//! Every indirect object is written into a [`Chunk`] under a preliminary
//! reference. The container keeps the chunks grouped by object class and,
//! once the document is complete, renumbers everything monotonically in
//! class order and assembles the final file: body, document information,
//! XMP metadata, catalog, xref and trailer.

use std::collections::HashMap;

use pdf_writer::{Chunk, Finish, Name, Pdf, Ref, Str, TextStr};
use xmp_writer::XmpWriter;

use crate::error::Result;
use crate::metadata::Metadata;
use crate::util::{hash128, hash_base64};

/// The binary comment line after the header, marking the file as binary
/// data for transfer programs.
const BINARY_MARKER: &[u8; 4] = b"\xE2\xE3\xCF\xD3";

#[derive(Default)]
pub(crate) struct ChunkContainer {
    pub(crate) page_tree: Option<(Ref, Chunk)>,
    pub(crate) outline: Option<(Ref, Chunk)>,
    pub(crate) destination_profiles: Option<(Ref, Chunk)>,
    pub(crate) struct_tree_root: Option<(Ref, Chunk)>,

    pub(crate) struct_elements: Vec<Chunk>,
    pub(crate) annotations: Vec<Chunk>,
    pub(crate) fonts: Vec<Chunk>,
    pub(crate) color_spaces: Vec<Chunk>,
    pub(crate) icc_profiles: Vec<Chunk>,
    pub(crate) ext_g_states: Vec<Chunk>,
    pub(crate) functions: Vec<Chunk>,
    pub(crate) shadings: Vec<Chunk>,
    pub(crate) patterns: Vec<Chunk>,
    pub(crate) optional_content_groups: Vec<Chunk>,
    pub(crate) x_objects: Vec<Chunk>,
    pub(crate) images: Vec<Chunk>,
    pub(crate) navigation: Vec<Chunk>,
    pub(crate) pages: Vec<Chunk>,
    pub(crate) embedded_files: Vec<Chunk>,

    pub(crate) metadata: Option<Metadata>,
}

/// Everything the catalog and trailer need beyond the chunks themselves.
pub(crate) struct CatalogData {
    pub(crate) acro_form_fields: Vec<Ref>,
    pub(crate) ocgs: Vec<Ref>,
    pub(crate) embedded_file_names: Vec<(String, Ref)>,
    pub(crate) tagged: bool,
    pub(crate) xmp_metadata: bool,
}

impl ChunkContainer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn finish(
        self,
        catalog_data: CatalogData,
        subtype: Option<crate::document::IntentSubtype>,
    ) -> Result<Vec<u8>> {
        let mut remapped_ref = Ref::new(1);
        let mut remapper = HashMap::new();

        // Assign final object numbers in the order the chunks will land in
        // the file, and collect the total size for preallocation.
        let mut chunks_byte_len = 0;
        self.visit(&mut |chunk| {
            for object_ref in chunk.refs() {
                let existing = remapper.insert(object_ref, remapped_ref.bump());
                debug_assert!(existing.is_none());
            }
            chunks_byte_len += chunk.len();
        });

        // The chunk length shifts slightly during renumbering; the padding
        // covers that plus the trailing objects.
        let capacity = (chunks_byte_len as f32 * 1.1 + 256.0) as usize;
        let mut pdf = Pdf::with_capacity(capacity);
        pdf.set_binary_marker(BINARY_MARKER);

        self.visit(&mut |chunk| {
            chunk.renumber_into(&mut pdf, |old| remapper[&old]);
        });

        // The document information dictionary.
        let info_ref = remapped_ref.bump();
        let metadata = self.metadata.clone().unwrap_or_default();
        metadata.serialize_document_info(info_ref, &mut pdf, subtype);

        let instance_id = hash_base64(pdf.as_bytes());
        let document_id = match (&metadata.title, &metadata.author) {
            (None, None) => instance_id.clone(),
            _ => hash_base64(&(&metadata.title, &metadata.author)),
        };

        let meta_ref = if catalog_data.xmp_metadata {
            let mut xmp = XmpWriter::new();
            metadata.serialize_xmp_metadata(&mut xmp);
            xmp.num_pages(self.pages.len() as u32);
            xmp.format("application/pdf");
            xmp.pdf_version("1.7");
            xmp.instance_id(&instance_id);
            xmp.document_id(&document_id);

            let meta_ref = remapped_ref.bump();
            let xmp_buf = xmp.finish(None);
            pdf.stream(meta_ref, xmp_buf.as_bytes())
                .pair(Name(b"Type"), Name(b"Metadata"))
                .pair(Name(b"Subtype"), Name(b"XML"));
            Some(meta_ref)
        } else {
            None
        };

        pdf.set_file_id((
            hash128(&document_id).to_be_bytes().to_vec(),
            hash128(&instance_id).to_be_bytes().to_vec(),
        ));

        let catalog_ref = remapped_ref.bump();
        let mut catalog = pdf.catalog(catalog_ref);

        if let Some(pt) = &self.page_tree {
            catalog.pages(remapper[&pt.0]);
        }

        if let Some(meta_ref) = meta_ref {
            catalog.metadata(meta_ref);
        }

        if let Some(ol) = &self.outline {
            catalog.outlines(remapper[&ol.0]);
        }

        if let Some(oi) = &self.destination_profiles {
            catalog.pair(Name(b"OutputIntents"), remapper[&oi.0]);
        }

        if let Some(lang) = &metadata.language {
            catalog.lang(TextStr(lang));
        }

        if let Some(st) = &self.struct_tree_root {
            catalog.pair(Name(b"StructTreeRoot"), remapper[&st.0]);
        }

        if catalog_data.tagged {
            catalog.mark_info().marked(true);
        }

        if !catalog_data.embedded_file_names.is_empty() {
            let mut names = catalog.names();
            let mut embedded_files_name_tree = names.embedded_files();
            let mut embedded_name_entries = embedded_files_name_tree.names();

            for (name, ref_) in &catalog_data.embedded_file_names {
                embedded_name_entries.insert(Str(name.as_bytes()), remapper[ref_]);
            }
        }

        if !catalog_data.acro_form_fields.is_empty() {
            let mut acro_form = catalog.insert(Name(b"AcroForm")).dict();
            let mut fields = acro_form.insert(Name(b"Fields")).array();
            for field in &catalog_data.acro_form_fields {
                fields.item(remapper[field]);
            }
            fields.finish();
            acro_form.pair(Name(b"NeedAppearances"), true);
            acro_form.finish();
        }

        if !catalog_data.ocgs.is_empty() {
            let mut oc_properties = catalog.insert(Name(b"OCProperties")).dict();
            let mut ocgs = oc_properties.insert(Name(b"OCGs")).array();
            for ocg in &catalog_data.ocgs {
                ocgs.item(remapper[ocg]);
            }
            ocgs.finish();
            let mut default = oc_properties.insert(Name(b"D")).dict();
            default.pair(Name(b"BaseState"), Name(b"ON"));
            default.finish();
            oc_properties.finish();
        }

        catalog.finish();

        Ok(pdf.finish())
    }
}

/// Visits all chunks in the order they are written to the file.
trait Visit {
    fn visit(&self, f: &mut impl FnMut(&Chunk));
}

impl Visit for ChunkContainer {
    fn visit(&self, f: &mut impl FnMut(&Chunk)) {
        self.page_tree.visit(f);
        self.outline.visit(f);
        self.destination_profiles.visit(f);
        self.struct_tree_root.visit(f);
        self.struct_elements.visit(f);
        self.annotations.visit(f);
        self.fonts.visit(f);
        self.color_spaces.visit(f);
        self.icc_profiles.visit(f);
        self.ext_g_states.visit(f);
        self.functions.visit(f);
        self.shadings.visit(f);
        self.patterns.visit(f);
        self.optional_content_groups.visit(f);
        self.x_objects.visit(f);
        self.images.visit(f);
        self.navigation.visit(f);
        self.pages.visit(f);
        self.embedded_files.visit(f);
    }
}

impl Visit for Chunk {
    fn visit(&self, f: &mut impl FnMut(&Chunk)) {
        f(self);
    }
}

impl Visit for Option<(Ref, Chunk)> {
    fn visit(&self, f: &mut impl FnMut(&Chunk)) {
        if let Some((_, chunk)) = self {
            chunk.visit(f);
        }
    }
}

impl<T: Visit> Visit for Vec<T> {
    fn visit(&self, f: &mut impl FnMut(&Chunk)) {
        for field in self {
            field.visit(f);
        }
    }
}
