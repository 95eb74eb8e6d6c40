//! End-to-end tests that build whole documents and assert on the emitted
//! bytes.

use platen::graphics::{
    Color, DeviceColorSpace, GraphicsState, MeshVertex, RasterImage, Shading,
    ShadingVertexFlag,
};
use platen::interactive::{Annotation, AnnotationKind};
use platen::interchange::StructureType;
use platen::{Document, DocumentSettings, Error, PageSettings, Point, Rect};

/// A minimal TrueType font mapping U+0020..U+0042 to empty glyphs with an
/// advance of 500/1000 em. Regenerate with `tests/fixtures/make_ascii_ttf.py`.
static ASCII_TTF: &[u8] = include_bytes!("fixtures/ascii.ttf");

fn settings_uncompressed() -> DocumentSettings {
    DocumentSettings {
        compress_content_streams: false,
        xmp_metadata: false,
        ..Default::default()
    }
}

fn pdf_text(pdf: &[u8]) -> String {
    String::from_utf8_lossy(pdf).into_owned()
}

/// Extract the payloads of all stream objects.
fn streams(pdf: &[u8]) -> Vec<Vec<u8>> {
    let mut result = vec![];
    let mut rest = pdf;
    // The leading newline keeps this from matching inside `endstream`.
    while let Some(start) = find(rest, b"\nstream\n") {
        let payload = &rest[start + b"\nstream\n".len()..];
        let end = find(payload, b"\nendstream").expect("unterminated stream");
        result.push(payload[..end].to_vec());
        rest = &payload[end + b"\nendstream".len()..];
    }
    result
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[test]
fn empty_document() {
    let document = Document::new(settings_uncompressed()).unwrap();
    let pdf = document.finish().unwrap();

    assert!(pdf.starts_with(b"%PDF-1.7\n%\xE2\xE3\xCF\xD3"));

    let text = pdf_text(&pdf);
    assert!(text.contains("/Type /Pages"));
    assert!(text.contains("/Count 0"));
    assert!(text.contains("/Type /Catalog"));
    assert!(text.contains("/Root"));
    assert!(text.contains("/Info"));
    assert!(text.contains("/ID"));
    assert!(text.contains("startxref"));
    assert!(text.ends_with("%%EOF\n") || text.ends_with("%%EOF"));
}

#[test]
fn single_blank_a4_page() {
    let mut document = Document::new(settings_uncompressed()).unwrap();
    let page = document.start_page(PageSettings::new(595.0, 842.0));
    page.finish_page().unwrap();

    let pdf = document.finish().unwrap();
    let text = pdf_text(&pdf);

    assert!(text.contains("/MediaBox [0 0 595 842]"));
    assert!(text.contains("/Count 1"));
    // Without an output intent there is no page group.
    assert!(!text.contains("/Group"));
}

#[test]
fn embedded_rgb_image_round_trips() {
    let pixels: Vec<u8> = vec![
        0xFF, 0x00, 0x00, 0x00, 0xFF, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0x00,
    ];

    let mut document = Document::new(settings_uncompressed()).unwrap();
    let image = document
        .add_image(&RasterImage::new(2, 2, DeviceColorSpace::Rgb, pixels.clone()))
        .unwrap();

    let mut page = document.start_page(PageSettings::new(200.0, 200.0));
    page.save_state().unwrap();
    page.transform([100.0, 0.0, 0.0, 100.0, 50.0, 50.0]);
    page.draw_image(image);
    page.restore_state().unwrap();
    page.finish_page().unwrap();

    let pdf = document.finish().unwrap();
    let text = pdf_text(&pdf);

    assert!(text.contains("/Subtype /Image"));
    assert!(text.contains("/Width 2"));
    assert!(text.contains("/Height 2"));
    assert!(text.contains("/BitsPerComponent 8"));
    assert!(text.contains("/ColorSpace /DeviceRGB"));
    assert!(text.contains("/Filter /FlateDecode"));
    // The resource dictionary references the image and the content stream
    // paints it.
    assert!(text.contains("/XObject"));
    assert!(text.contains("/x0 Do"));

    let decompressed = streams(&pdf)
        .iter()
        .filter_map(|data| miniz_oxide::inflate::decompress_to_vec_zlib(data).ok())
        .any(|data| data == pixels);
    assert!(decompressed, "no stream decompressed to the image samples");
}

#[test]
fn widgets_can_only_be_used_once() {
    let mut document = Document::new(settings_uncompressed()).unwrap();

    let mut on = document.start_form_xobject(10.0, 10.0);
    on.rect(0.0, 0.0, 10.0, 10.0);
    on.fill_nonzero();
    let on = on.finish_form_xobject().unwrap();

    let off = document.start_form_xobject(10.0, 10.0);
    let off = off.finish_form_xobject().unwrap();

    let widget = document
        .create_form_checkbox(
            Rect::from_xywh(10.0, 10.0, 20.0, 20.0).unwrap(),
            on,
            off,
            "check1",
        )
        .unwrap();

    let mut page = document.start_page(PageSettings::default());
    page.add_form_widget(widget).unwrap();
    page.finish_page().unwrap();

    let mut page = document.start_page(PageSettings::default());
    page.add_form_widget(widget).unwrap();
    assert_eq!(page.finish_page().unwrap_err(), Error::AnnotationReuse);

    let pdf = document.finish().unwrap();
    let text = pdf_text(&pdf);
    assert!(text.contains("/AcroForm"));
    assert!(text.contains("/NeedAppearances true"));
    assert!(text.contains("/Subtype /Widget"));
}

#[test]
fn annotations_can_only_be_used_once() {
    let mut document = Document::new(settings_uncompressed()).unwrap();
    let annotation = document
        .create_annotation(Annotation::new(
            AnnotationKind::Link {
                uri: "https://example.com".to_string(),
            },
            Rect::from_xywh(0.0, 0.0, 100.0, 20.0).unwrap(),
        ))
        .unwrap();

    let mut page = document.start_page(PageSettings::default());
    page.annotate(annotation).unwrap();
    page.finish_page().unwrap();

    let mut page = document.start_page(PageSettings::default());
    page.annotate(annotation).unwrap();
    assert_eq!(page.finish_page().unwrap_err(), Error::AnnotationReuse);
}

#[test]
fn annotations_require_a_rect() {
    let mut document = Document::new(settings_uncompressed()).unwrap();
    let result = document.create_annotation(Annotation {
        kind: AnnotationKind::Text {
            content: "note".to_string(),
        },
        rect: None,
    });
    assert_eq!(result.unwrap_err(), Error::AnnotationMissingRect);
}

#[test]
fn structure_items_can_only_be_used_once() {
    let mut document = Document::new(settings_uncompressed()).unwrap();
    let root = document.add_structure_item(StructureType::Document, None);
    let paragraph = document.add_structure_item(StructureType::P, Some(root));

    let mut page = document.start_page(PageSettings::default());
    page.begin_marked_content_tagged(paragraph).unwrap();
    page.end_marked_content().unwrap();
    page.finish_page().unwrap();

    let mut page = document.start_page(PageSettings::default());
    page.begin_marked_content_tagged(paragraph).unwrap();
    page.end_marked_content().unwrap();
    assert_eq!(page.finish_page().unwrap_err(), Error::StructureReuse);
}

#[test]
fn structure_tree_is_emitted() {
    let mut document = Document::new(DocumentSettings {
        tagged: true,
        ..settings_uncompressed()
    })
    .unwrap();

    let root = document.add_structure_item(StructureType::Document, None);
    let heading = document.add_rolemap_entry("Heading", StructureType::H1).unwrap();
    let title = document.add_structure_item_with_role(heading, Some(root));

    let mut page = document.start_page(PageSettings::default());
    page.begin_marked_content_tagged(title).unwrap();
    page.end_marked_content().unwrap();
    page.finish_page().unwrap();

    let pdf = document.finish().unwrap();
    let text = pdf_text(&pdf);

    assert!(text.contains("/StructTreeRoot"));
    assert!(text.contains("/ParentTree"));
    assert!(text.contains("/RoleMap"));
    assert!(text.contains("/Heading /H1"));
    assert!(text.contains("/MarkInfo"));
    assert!(text.contains("/MCID 0"));
    assert!(text.contains("/StructParents 0"));
}

#[test]
fn rolemap_names_are_validated() {
    let mut document = Document::new(settings_uncompressed()).unwrap();
    assert_eq!(
        document
            .add_rolemap_entry("/Heading", StructureType::H1)
            .unwrap_err(),
        Error::SlashStart
    );
    document.add_rolemap_entry("Heading", StructureType::H1).unwrap();
    assert_eq!(
        document
            .add_rolemap_entry("Heading", StructureType::H2)
            .unwrap_err(),
        Error::RoleAlreadyDefined
    );
}

#[test]
fn icc_profiles_deduplicate_by_content() {
    let mut profile = vec![0u8; 128];
    profile[8] = 4;
    profile[16..20].copy_from_slice(b"RGB ");

    let mut document = Document::new(settings_uncompressed()).unwrap();
    let first = document.add_icc_color_space(&profile).unwrap();
    let second = document.add_icc_color_space(&profile).unwrap();
    assert_eq!(first, second);

    let mut other = profile.clone();
    other[100] = 1;
    let third = document.add_icc_color_space(&other).unwrap();
    assert_ne!(first, third);
}

#[test]
fn mesh_shading_scales_coordinates_big_endian() {
    let mut document = Document::new(settings_uncompressed()).unwrap();
    let shading = document
        .add_shading(&Shading::FreeForm {
            color_space: DeviceColorSpace::Rgb,
            x_range: [0.0, 100.0],
            y_range: [0.0, 100.0],
            vertices: vec![
                MeshVertex {
                    flag: ShadingVertexFlag::New,
                    point: Point::from_xy(25.0, 0.0),
                    color: Color::DeviceRgb(1.0, 0.0, 0.0),
                },
                MeshVertex {
                    flag: ShadingVertexFlag::New,
                    point: Point::from_xy(100.0, 0.0),
                    color: Color::DeviceRgb(0.0, 1.0, 0.0),
                },
                MeshVertex {
                    flag: ShadingVertexFlag::New,
                    point: Point::from_xy(0.0, 100.0),
                    color: Color::DeviceRgb(0.0, 0.0, 1.0),
                },
            ],
        })
        .unwrap();

    let mut page = document.start_page(PageSettings::default());
    page.draw_shading(shading);
    page.finish_page().unwrap();

    let pdf = document.finish().unwrap();
    let text = pdf_text(&pdf);

    assert!(text.contains("/ShadingType 4"));
    assert!(text.contains("/BitsPerCoordinate 32"));
    assert!(text.contains("/BitsPerComponent 16"));
    assert!(text.contains("/BitsPerFlag 8"));
    assert!(text.contains("/sh0 sh") || text.contains("/s0 sh"));

    // x = 25 in a 0..100 range is a quarter of the u32 range.
    assert!(find(&pdf, &0x3FFF_FFFFu32.to_be_bytes()).is_some());
}

#[test]
fn text_in_a_loaded_font_is_subset_and_padded() {
    let mut document = Document::new(settings_uncompressed()).unwrap();
    let font = document.load_font(ASCII_TTF.to_vec()).unwrap();

    let mut page = document.start_page(PageSettings::default());
    page.draw_text("A B", font, 12.0, 10.0, 100.0).unwrap();
    page.finish_page().unwrap();

    let pdf = document.finish().unwrap();
    let text = pdf_text(&pdf);

    // The Type0 quartet is in place.
    assert!(text.contains("/Subtype /CIDFontType2"));
    assert!(text.contains("Identity-H"));
    assert!(text.contains("/FontFile2"));
    // The fixture has no name table, so the base font falls back to the
    // subset tag plus "unknown".
    assert!(text.contains("+unknown"));

    // "A B" is shown as the first three subset slots, two bytes per glyph.
    assert!(text.contains("000100020003"));

    // Padding filled the subset up to slot 32, so the width runs cover the
    // CIDs 0 through 32 in one group.
    assert!(text.contains("0 32 500"));

    // The ToUnicode CMap maps the used slots back to their codepoints and
    // slot 32 to U+0020.
    assert!(text.contains("beginbfchar"));
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    assert!(compact.contains("<0001><0041>"));
    assert!(compact.contains("<0002><0020>"));
    assert!(compact.contains("<0003><0042>"));
    assert!(compact.contains("<0004><0021>"));
    assert!(compact.contains("<0020><0020>"));
}

#[test]
fn unmapped_codepoints_are_rejected() {
    let mut document = Document::new(settings_uncompressed()).unwrap();
    let font = document.load_font(ASCII_TTF.to_vec()).unwrap();

    let mut page = document.start_page(PageSettings::default());
    // The fixture's character map ends at U+0042.
    assert_eq!(
        page.draw_text("z", font, 12.0, 10.0, 100.0).unwrap_err(),
        Error::MissingGlyph
    );
    page.finish_page().unwrap();
}

#[test]
fn layers_reach_the_catalog() {
    let mut document = Document::new(settings_uncompressed()).unwrap();
    let layer = document.add_optional_content_group("overlay");

    let mut page = document.start_page(PageSettings::default());
    page.begin_marked_content_layer(layer).unwrap();
    page.rect(0.0, 0.0, 10.0, 10.0);
    page.fill_nonzero();
    page.end_marked_content().unwrap();
    page.add_simple_navigation(&[layer], None).unwrap();
    page.finish_page().unwrap();

    let pdf = document.finish().unwrap();
    let text = pdf_text(&pdf);

    assert!(text.contains("/OCProperties"));
    assert!(text.contains("/BaseState /ON"));
    assert!(text.contains("/Type /OCG"));
    assert!(text.contains("/OC /o0 BDC"));
    assert!(text.contains("/PresSteps"));
    assert!(text.contains("/Type /NavNode"));
    assert!(text.contains("/SetOCGState"));
}

#[test]
fn outlines_link_their_pages() {
    let mut document = Document::new(settings_uncompressed()).unwrap();
    let first = document.start_page(PageSettings::default()).finish_page().unwrap();
    let second = document.start_page(PageSettings::default()).finish_page().unwrap();

    let chapter = document.add_outline("Chapter 1", first, None);
    document.add_outline("Section 1.1", second, Some(chapter));
    document.add_outline("Chapter 2", second, None);

    let pdf = document.finish().unwrap();
    let text = pdf_text(&pdf);

    assert!(text.contains("/Type /Outlines"));
    assert!(text.contains("/Outlines"));
    assert!(text.contains("(Chapter 1)"));
    assert!(text.contains("/XYZ"));
    assert!(text.contains("/Count -1"));
}

#[test]
fn output_intent_requires_profile_and_identifier() {
    let mut profile = vec![0u8; 128];
    profile[8] = 4;
    profile[16..20].copy_from_slice(b"RGB ");

    let missing_profile = Document::new(DocumentSettings {
        subtype: Some(platen::IntentSubtype::PdfX),
        intent_condition_identifier: Some("FOGRA39".to_string()),
        ..settings_uncompressed()
    });
    assert!(matches!(missing_profile, Err(Error::OutputProfileMissing)));

    let missing_identifier = Document::new(DocumentSettings {
        subtype: Some(platen::IntentSubtype::PdfX),
        output_profile: Some(profile.clone()),
        ..settings_uncompressed()
    });
    assert!(matches!(
        missing_identifier,
        Err(Error::MissingIntentIdentifier)
    ));

    let document = Document::new(DocumentSettings {
        subtype: Some(platen::IntentSubtype::PdfX),
        intent_condition_identifier: Some("FOGRA39".to_string()),
        output_profile: Some(profile),
        ..settings_uncompressed()
    })
    .unwrap();
    let pdf = document.finish().unwrap();
    let text = pdf_text(&pdf);

    assert!(text.contains("/OutputIntents"));
    assert!(text.contains("/S /GTS_PDFX"));
    assert!(text.contains("/OutputConditionIdentifier"));
    assert!(text.contains("/DestOutputProfile"));
    assert!(text.contains("(PDF/X-3:2003)"));
}

#[test]
fn graphics_states_become_resources() {
    let mut document = Document::new(settings_uncompressed()).unwrap();
    let state = document
        .add_graphics_state(&GraphicsState {
            non_stroking_alpha: Some(0.5),
            ..Default::default()
        })
        .unwrap();

    let mut page = document.start_page(PageSettings::default());
    page.set_parameters(state);
    page.rect(0.0, 0.0, 10.0, 10.0);
    page.fill_nonzero();
    page.finish_page().unwrap();

    let pdf = document.finish().unwrap();
    let text = pdf_text(&pdf);

    assert!(text.contains("/ExtGState"));
    assert!(text.contains("/g0 gs"));
    assert!(text.contains("/ca 0.5"));
}

#[test]
fn content_streams_are_compressed_when_requested() {
    let build = |compress: bool| {
        let mut document = Document::new(DocumentSettings {
            compress_content_streams: compress,
            xmp_metadata: false,
            ..Default::default()
        })
        .unwrap();
        let mut page = document.start_page(PageSettings::default());
        page.rect(5.0, 5.0, 10.0, 10.0);
        page.fill_nonzero();
        page.finish_page().unwrap();
        document.finish().unwrap()
    };

    let uncompressed = pdf_text(&build(false));
    assert!(uncompressed.contains("re"));
    assert!(uncompressed.contains("f"));

    let compressed = build(true);
    let roundtrip = streams(&compressed)
        .iter()
        .filter_map(|data| miniz_oxide::inflate::decompress_to_vec_zlib(data).ok())
        .any(|data| {
            let text = String::from_utf8_lossy(&data);
            text.contains("re") && text.contains('f')
        });
    assert!(roundtrip, "compressed content stream did not round-trip");
}

#[test]
fn embedded_files_appear_in_the_name_tree() {
    let mut document = Document::new(settings_uncompressed()).unwrap();
    document.embed_file("notes.txt", b"hello".to_vec());

    let pdf = document.finish().unwrap();
    let text = pdf_text(&pdf);

    assert!(text.contains("/Type /Filespec"));
    assert!(text.contains("/EmbeddedFiles"));
    assert!(text.contains("(notes.txt)"));
}

#[test]
fn tiling_patterns_can_paint_fills() {
    let mut document = Document::new(settings_uncompressed()).unwrap();

    let mut cell = document.start_tiling_pattern(4.0, 4.0);
    cell.rect(0.0, 0.0, 2.0, 2.0);
    cell.fill_nonzero();
    let pattern = cell.finish_tiling_pattern().unwrap();

    let mut page = document.start_page(PageSettings::default());
    page.set_fill_color(&Color::Pattern(pattern)).unwrap();
    page.rect(0.0, 0.0, 100.0, 100.0);
    page.fill_nonzero();
    page.finish_page().unwrap();

    let pdf = document.finish().unwrap();
    let text = pdf_text(&pdf);

    assert!(text.contains("/PatternType 1"));
    assert!(text.contains("/Pattern"));
    assert!(text.contains("/p0 scn"));
}
