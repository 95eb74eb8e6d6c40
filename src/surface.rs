//! Drawing surfaces.
//!
//! A [`Surface`] accumulates one content stream by exposing the PDF
//! content-stream operators as methods. While drawing, it records every
//! resource the stream references so that the `/Resources` dictionary can
//! be synthesized from actual use, and it enforces the content-stream
//! bracket rules: balanced save/restore, balanced and non-nested marked
//! content, balanced text objects.
//!
//! Surfaces come in four flavors (page, form XObject, tiling pattern and
//! transparency group), created through the corresponding
//! [`Document`](crate::Document) methods and consumed by the matching
//! `finish_*` method.

use std::ops::DerefMut;

use pdf_writer::types::{ColorSpaceOperand, LineCapStyle, LineJoinStyle};
use pdf_writer::{Chunk, Content, Finish, Name, Str};

pub use pdf_writer::types::TextRenderingMode;

use crate::error::{Error, Result};
use crate::graphics::color::{check_unit, Color};
use crate::graphics::ext_g_state::RenderingIntent;
use crate::interactive::navigation::{SubPageNavigation, Transition};
use crate::page::{PageProperties, PageSettings};
use crate::resource;
use crate::resource::{Resource, ResourceDictionaryBuilder};
use crate::serialize::{
    AnnotationId, FontId, FormWidgetId, FormXObjectId, GraphicsStateId, ImageId, OcgId,
    PageId, PatternId, SerializeContext, ShadingId, StructureItemId, TransparencyGroupId,
};
use crate::stream::FilterStreamBuilder;
use crate::text::font::BuiltinFont;
use crate::util::NameExt;

/// A line cap style.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum LineCap {
    /// A butt cap.
    #[default]
    Butt,
    /// A round cap.
    Round,
    /// A projecting square cap.
    Square,
}

impl LineCap {
    fn to_pdf_line_cap(self) -> LineCapStyle {
        match self {
            LineCap::Butt => LineCapStyle::ButtCap,
            LineCap::Round => LineCapStyle::RoundCap,
            LineCap::Square => LineCapStyle::ProjectingSquareCap,
        }
    }
}

/// A line join style.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum LineJoin {
    /// A miter join.
    #[default]
    Miter,
    /// A round join.
    Round,
    /// A bevel join.
    Bevel,
}

impl LineJoin {
    fn to_pdf_line_join(self) -> LineJoinStyle {
        match self {
            LineJoin::Miter => LineJoinStyle::MiterJoin,
            LineJoin::Round => LineJoinStyle::RoundJoin,
            LineJoin::Bevel => LineJoinStyle::BevelJoin,
        }
    }
}

/// One event of a shaped text run.
///
/// Shaping and kerning happen outside of this crate; the shaper's output is
/// replayed through this type.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TextEvent {
    /// Show the glyph for a codepoint.
    Glyph(u32),
    /// Adjust the text position by the given amount in thousandths of text
    /// space (the `TJ` convention: positive moves left).
    Adjust(f32),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum DrawState {
    MarkedContent,
    SaveState,
    Text,
}

struct PageData {
    settings: PageSettings,
    extra_properties: PageProperties,
    widgets: Vec<FormWidgetId>,
    annotations: Vec<AnnotationId>,
    transition: Option<Transition>,
    sub_navigations: Vec<SubPageNavigation>,
}

enum SurfaceKind {
    Page(Box<PageData>),
    FormXObject { width: f32, height: f32 },
    TilingPattern { width: f32, height: f32 },
    TransparencyGroup {
        width: f32,
        height: f32,
        isolated: bool,
        knockout: bool,
    },
}

/// A drawing surface, accumulating one content stream.
pub struct Surface<'a> {
    sc: &'a mut SerializeContext,
    kind: SurfaceKind,
    content: Content,
    /// Finished operator runs. pdf-writer cannot express a `BDC` with a
    /// named property list, so such operators are spliced between runs.
    segments: Vec<Vec<u8>>,
    rd_builder: ResourceDictionaryBuilder,
    draw_states: Vec<DrawState>,
    used_structures: Vec<StructureItemId>,
}

impl<'a> Surface<'a> {
    fn new(sc: &'a mut SerializeContext, kind: SurfaceKind) -> Self {
        Self {
            sc,
            kind,
            content: Content::new(),
            segments: vec![],
            rd_builder: ResourceDictionaryBuilder::new(),
            draw_states: vec![],
            used_structures: vec![],
        }
    }

    pub(crate) fn new_page(sc: &'a mut SerializeContext, settings: PageSettings) -> Self {
        Self::new(
            sc,
            SurfaceKind::Page(Box::new(PageData {
                settings,
                extra_properties: PageProperties::default(),
                widgets: vec![],
                annotations: vec![],
                transition: None,
                sub_navigations: vec![],
            })),
        )
    }

    pub(crate) fn new_form_xobject(
        sc: &'a mut SerializeContext,
        width: f32,
        height: f32,
    ) -> Self {
        Self::new(sc, SurfaceKind::FormXObject { width, height })
    }

    pub(crate) fn new_tiling_pattern(
        sc: &'a mut SerializeContext,
        width: f32,
        height: f32,
    ) -> Self {
        Self::new(sc, SurfaceKind::TilingPattern { width, height })
    }

    pub(crate) fn new_transparency_group(
        sc: &'a mut SerializeContext,
        width: f32,
        height: f32,
        isolated: bool,
        knockout: bool,
    ) -> Self {
        Self::new(
            sc,
            SurfaceKind::TransparencyGroup {
                width,
                height,
                isolated,
                knockout,
            },
        )
    }
}

/// State machine plumbing.
impl Surface<'_> {
    fn push_state(&mut self, state: DrawState) -> Result<()> {
        if state == DrawState::MarkedContent
            && self.draw_states.contains(&DrawState::MarkedContent)
        {
            return Err(Error::NestedBMC);
        }

        self.draw_states.push(state);
        Ok(())
    }

    fn pop_state(&mut self, state: DrawState) -> Result<()> {
        match self.draw_states.last() {
            Some(last) if *last == state => {
                self.draw_states.pop();
                Ok(())
            }
            _ => Err(Error::DrawStateEndMismatch),
        }
    }

    /// Whether any save/restore, marked-content or text bracket is still
    /// open. A surface in this state cannot be finished.
    pub fn has_unclosed_state(&self) -> bool {
        !self.draw_states.is_empty()
    }

    fn page_data_mut(&mut self) -> Result<&mut PageData> {
        match &mut self.kind {
            SurfaceKind::Page(data) => Ok(data),
            _ => Err(Error::InvalidDrawContextType),
        }
    }

    /// Splice a raw operator line into the stream.
    fn raw_op(&mut self, op: Vec<u8>) {
        let content = std::mem::replace(&mut self.content, Content::new());
        let buf = content.finish();
        if !buf.is_empty() {
            self.segments.push(buf.to_vec());
        }
        self.segments.push(op);
    }

}

fn collect_stream(content: Content, mut segments: Vec<Vec<u8>>) -> Vec<u8> {
    let buf = content.finish();
    if !buf.is_empty() {
        segments.push(buf.to_vec());
    }

    let mut stream = Vec::with_capacity(segments.iter().map(Vec::len).sum());
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 && !stream.ends_with(b"\n") {
            stream.push(b'\n');
        }
        stream.extend_from_slice(segment);
    }
    stream
}

/// Path construction and painting operators.
impl Surface<'_> {
    /// `m`: Begin a new subpath at (x, y).
    pub fn move_to(&mut self, x: f32, y: f32) {
        self.content.move_to(x, y);
    }

    /// `l`: Append a straight line segment.
    pub fn line_to(&mut self, x: f32, y: f32) {
        self.content.line_to(x, y);
    }

    /// `c`: Append a cubic Bézier segment with two control points.
    pub fn cubic_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32) {
        self.content.cubic_to(x1, y1, x2, y2, x3, y3);
    }

    /// `v`: Append a cubic Bézier segment whose first control point is the
    /// current point.
    pub fn cubic_to_initial(&mut self, x2: f32, y2: f32, x3: f32, y3: f32) {
        self.content.cubic_to_initial(x2, y2, x3, y3);
    }

    /// `y`: Append a cubic Bézier segment whose second control point
    /// coincides with the endpoint.
    pub fn cubic_to_final(&mut self, x1: f32, y1: f32, x3: f32, y3: f32) {
        self.content.cubic_to_final(x1, y1, x3, y3);
    }

    /// `h`: Close the current subpath.
    pub fn close_path(&mut self) {
        self.content.close_path();
    }

    /// `re`: Append a rectangle as a complete subpath.
    pub fn rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.content.rect(x, y, width, height);
    }

    /// `S`: Stroke the path.
    pub fn stroke(&mut self) {
        self.content.stroke();
    }

    /// `s`: Close and stroke the path.
    pub fn close_and_stroke(&mut self) {
        self.content.close_and_stroke();
    }

    /// `f`: Fill the path using the nonzero winding rule.
    pub fn fill_nonzero(&mut self) {
        self.content.fill_nonzero();
    }

    /// `f*`: Fill the path using the even-odd rule.
    pub fn fill_even_odd(&mut self) {
        self.content.fill_even_odd();
    }

    /// `B`: Fill and stroke the path using the nonzero winding rule.
    pub fn fill_nonzero_and_stroke(&mut self) {
        self.content.fill_nonzero_and_stroke();
    }

    /// `B*`: Fill and stroke the path using the even-odd rule.
    pub fn fill_even_odd_and_stroke(&mut self) {
        self.content.fill_even_odd_and_stroke();
    }

    /// `b`: Close, fill and stroke the path using the nonzero winding rule.
    pub fn close_fill_nonzero_and_stroke(&mut self) {
        self.content.close_fill_nonzero_and_stroke();
    }

    /// `b*`: Close, fill and stroke the path using the even-odd rule.
    pub fn close_fill_even_odd_and_stroke(&mut self) {
        self.content.close_fill_even_odd_and_stroke();
    }

    /// `n`: End the path without filling or stroking it.
    pub fn end_path(&mut self) {
        self.content.end_path();
    }

    /// `W`: Use the current path as a clipping path (nonzero rule).
    pub fn clip_nonzero(&mut self) {
        self.content.clip_nonzero();
    }

    /// `W*`: Use the current path as a clipping path (even-odd rule).
    pub fn clip_even_odd(&mut self) {
        self.content.clip_even_odd();
    }
}

/// Graphics state operators.
impl Surface<'_> {
    /// `q`: Save the graphics state.
    pub fn save_state(&mut self) -> Result<()> {
        self.push_state(DrawState::SaveState)?;
        self.content.save_state();
        Ok(())
    }

    /// `Q`: Restore the graphics state.
    pub fn restore_state(&mut self) -> Result<()> {
        self.pop_state(DrawState::SaveState)?;
        self.content.restore_state();
        Ok(())
    }

    /// Run `f` between a save/restore pair.
    ///
    /// The restore happens even when `f` fails, so the stream and the draw
    /// state stack stay balanced and the surface remains usable.
    pub fn with_saved_state<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.save_state()?;
        let result = f(self);
        self.restore_state()?;
        result
    }

    /// `cm`: Concatenate a matrix to the current transformation matrix.
    pub fn transform(&mut self, matrix: [f32; 6]) {
        self.content.transform(matrix);
    }

    /// Concatenate a translation.
    pub fn translate(&mut self, tx: f32, ty: f32) {
        self.transform([1.0, 0.0, 0.0, 1.0, tx, ty]);
    }

    /// Concatenate a scaling.
    pub fn scale(&mut self, sx: f32, sy: f32) {
        self.transform([sx, 0.0, 0.0, sy, 0.0, 0.0]);
    }

    /// Concatenate a rotation by `angle` radians.
    pub fn rotate(&mut self, angle: f32) {
        let (sin, cos) = angle.sin_cos();
        self.transform([cos, sin, -sin, cos, 0.0, 0.0]);
    }

    /// `w`: Set the line width.
    pub fn set_line_width(&mut self, width: f32) {
        self.content.set_line_width(width);
    }

    /// `J`: Set the line cap style.
    pub fn set_line_cap(&mut self, cap: LineCap) {
        self.content.set_line_cap(cap.to_pdf_line_cap());
    }

    /// `j`: Set the line join style.
    pub fn set_line_join(&mut self, join: LineJoin) {
        self.content.set_line_join(join.to_pdf_line_join());
    }

    /// `M`: Set the miter limit.
    pub fn set_miter_limit(&mut self, limit: f32) {
        self.content.set_miter_limit(limit);
    }

    /// `d`: Set the dash pattern.
    pub fn set_dash_pattern(
        &mut self,
        array: impl IntoIterator<Item = f32>,
        phase: f32,
    ) {
        self.content.set_dash_pattern(array, phase);
    }

    /// `ri`: Set the rendering intent.
    pub fn set_rendering_intent(&mut self, intent: RenderingIntent) {
        self.content
            .set_rendering_intent(intent.to_pdf_rendering_intent());
    }

    /// `i`: Set the flatness tolerance.
    pub fn set_flatness(&mut self, flatness: i32) {
        self.content.set_flatness(flatness);
    }

    /// `gs`: Apply a registered external graphics state.
    pub fn set_parameters(&mut self, state: GraphicsStateId) {
        let name = self
            .rd_builder
            .register_resource(resource::ExtGState::new(self.sc.graphics_state_ref(state)));
        self.content.set_parameters(name.to_pdf_name());
    }
}

/// Color operators.
impl Surface<'_> {
    /// `g`: Set the fill color to a device gray value.
    pub fn set_fill_gray(&mut self, gray: f32) -> Result<()> {
        self.content.set_fill_gray(check_unit(gray)?);
        Ok(())
    }

    /// `G`: Set the stroke color to a device gray value.
    pub fn set_stroke_gray(&mut self, gray: f32) -> Result<()> {
        self.content.set_stroke_gray(check_unit(gray)?);
        Ok(())
    }

    /// `rg`: Set the fill color to a device RGB value.
    pub fn set_fill_rgb(&mut self, r: f32, g: f32, b: f32) -> Result<()> {
        self.content
            .set_fill_rgb(check_unit(r)?, check_unit(g)?, check_unit(b)?);
        Ok(())
    }

    /// `RG`: Set the stroke color to a device RGB value.
    pub fn set_stroke_rgb(&mut self, r: f32, g: f32, b: f32) -> Result<()> {
        self.content
            .set_stroke_rgb(check_unit(r)?, check_unit(g)?, check_unit(b)?);
        Ok(())
    }

    /// `k`: Set the fill color to a device CMYK value.
    pub fn set_fill_cmyk(&mut self, c: f32, m: f32, y: f32, k: f32) -> Result<()> {
        self.content.set_fill_cmyk(
            check_unit(c)?,
            check_unit(m)?,
            check_unit(y)?,
            check_unit(k)?,
        );
        Ok(())
    }

    /// `K`: Set the stroke color to a device CMYK value.
    pub fn set_stroke_cmyk(&mut self, c: f32, m: f32, y: f32, k: f32) -> Result<()> {
        self.content.set_stroke_cmyk(
            check_unit(c)?,
            check_unit(m)?,
            check_unit(y)?,
            check_unit(k)?,
        );
        Ok(())
    }

    /// Set the fill color, dispatching on the color's variant (`g`, `rg`,
    /// `k`, or `cs` + `scn` for indirect color spaces).
    pub fn set_fill_color(&mut self, color: &Color) -> Result<()> {
        self.set_color_impl(color, false)
    }

    /// Set the stroke color, dispatching on the color's variant (`G`, `RG`,
    /// `K`, or `CS` + `SCN` for indirect color spaces).
    pub fn set_stroke_color(&mut self, color: &Color) -> Result<()> {
        self.set_color_impl(color, true)
    }

    fn set_color_impl(&mut self, color: &Color, stroke: bool) -> Result<()> {
        match color {
            Color::DeviceGray(g) => {
                if stroke {
                    self.set_stroke_gray(*g)?;
                } else {
                    self.set_fill_gray(*g)?;
                }
            }
            Color::DeviceRgb(r, g, b) => {
                if stroke {
                    self.set_stroke_rgb(*r, *g, *b)?;
                } else {
                    self.set_fill_rgb(*r, *g, *b)?;
                }
            }
            Color::DeviceCmyk(c, m, y, k) => {
                if stroke {
                    self.set_stroke_cmyk(*c, *m, *y, *k)?;
                } else {
                    self.set_fill_cmyk(*c, *m, *y, *k)?;
                }
            }
            Color::Lab(id, l, a, b) => {
                let ref_ = self.sc.lab_color_space_ref(*id);
                self.set_named_color(ref_, &[*l, *a, *b], stroke);
            }
            Color::Icc(id, components) => {
                if components.len() != self.sc.icc_num_components(*id) {
                    return Err(Error::ColorspaceMismatch);
                }
                for component in components {
                    check_unit(*component)?;
                }
                let ref_ = self.sc.icc_color_space_ref(*id);
                self.set_named_color(ref_, components, stroke);
            }
            Color::Separation(id, tint) => {
                check_unit(*tint)?;
                let ref_ = self.sc.separation_ref(*id);
                self.set_named_color(ref_, &[*tint], stroke);
            }
            Color::Pattern(id) => {
                let name = self
                    .rd_builder
                    .register_resource(resource::Pattern::new(self.sc.pattern_ref(*id)));
                if stroke {
                    self.content
                        .set_stroke_color_space(ColorSpaceOperand::Pattern);
                    self.content.set_stroke_pattern(None, name.to_pdf_name());
                } else {
                    self.content
                        .set_fill_color_space(ColorSpaceOperand::Pattern);
                    self.content.set_fill_pattern(None, name.to_pdf_name());
                }
            }
        }

        Ok(())
    }

    fn set_named_color(&mut self, cs_ref: pdf_writer::Ref, components: &[f32], stroke: bool) {
        let name = self
            .rd_builder
            .register_resource(resource::ColorSpace::new(cs_ref));

        if stroke {
            self.content
                .set_stroke_color_space(ColorSpaceOperand::Named(name.to_pdf_name()));
            self.content.set_stroke_color(components.iter().copied());
        } else {
            self.content
                .set_fill_color_space(ColorSpaceOperand::Named(name.to_pdf_name()));
            self.content.set_fill_color(components.iter().copied());
        }
    }
}

/// XObjects and shadings.
impl Surface<'_> {
    /// `Do`: Paint a registered image.
    pub fn draw_image(&mut self, image: ImageId) {
        let name = self
            .rd_builder
            .register_resource(resource::XObject::new(self.sc.image_ref(image)));
        self.content.x_object(name.to_pdf_name());
    }

    /// `Do`: Paint a finished form XObject.
    pub fn draw_form_xobject(&mut self, xobject: FormXObjectId) {
        let name = self
            .rd_builder
            .register_resource(resource::XObject::new(self.sc.form_xobject_ref(xobject)));
        self.content.x_object(name.to_pdf_name());
    }

    /// `Do`: Paint a finished transparency group.
    pub fn draw_transparency_group(&mut self, group: TransparencyGroupId) {
        let name = self.rd_builder.register_resource(resource::XObject::new(
            self.sc.transparency_group_ref(group),
        ));
        self.content.x_object(name.to_pdf_name());
    }

    /// `sh`: Paint a registered shading across the clipping region.
    pub fn draw_shading(&mut self, shading: ShadingId) {
        let name = self
            .rd_builder
            .register_resource(resource::Shading::new(self.sc.shading_ref(shading)));
        self.content.shading(name.to_pdf_name());
    }
}

/// Marked content.
impl Surface<'_> {
    /// `BMC`: Begin a marked-content sequence with a plain tag.
    pub fn begin_marked_content(&mut self, tag: &str) -> Result<()> {
        self.push_state(DrawState::MarkedContent)?;
        self.content.begin_marked_content(Name(tag.as_bytes()));
        Ok(())
    }

    /// `BDC`: Begin a marked-content sequence belonging to a structure
    /// item. The sequence is assigned the next marked-content id of this
    /// surface.
    pub fn begin_marked_content_tagged(&mut self, item: StructureItemId) -> Result<()> {
        self.push_state(DrawState::MarkedContent)?;

        let mcid = self.used_structures.len() as i32;
        self.used_structures.push(item);

        let tag = self.sc.structure_item_tag(item);
        let mut marked = self
            .content
            .begin_marked_content_with_properties(Name(tag.as_bytes()));
        marked.properties().pairs([(Name(b"MCID"), mcid)]);
        marked.finish();

        Ok(())
    }

    /// `BDC`: Begin a marked-content sequence gated by an optional content
    /// group.
    pub fn begin_marked_content_layer(&mut self, ocg: OcgId) -> Result<()> {
        self.push_state(DrawState::MarkedContent)?;

        let name = self
            .rd_builder
            .register_resource(resource::Properties::new(self.sc.ocg_ref(ocg)));

        // The property list of an optional-content `BDC` must be a named
        // resource, which pdf-writer's content builder cannot produce.
        let mut op = Vec::with_capacity(16);
        op.extend_from_slice(b"/OC /");
        op.extend_from_slice(name.as_bytes());
        op.extend_from_slice(b" BDC\n");
        self.raw_op(op);

        Ok(())
    }

    /// `EMC`: End the current marked-content sequence.
    pub fn end_marked_content(&mut self) -> Result<()> {
        self.pop_state(DrawState::MarkedContent)?;
        self.content.end_marked_content();
        Ok(())
    }
}

/// Text.
impl Surface<'_> {
    /// `BT`: Begin a text object.
    pub fn begin_text(&mut self) -> Result<()> {
        self.push_state(DrawState::Text)?;
        self.content.begin_text();
        Ok(())
    }

    /// `ET`: End the current text object.
    pub fn end_text(&mut self) -> Result<()> {
        self.pop_state(DrawState::Text)?;
        self.content.end_text();
        Ok(())
    }

    /// `Tr`: Set the text rendering mode.
    pub fn set_text_rendering_mode(&mut self, mode: TextRenderingMode) {
        self.content.set_text_rendering_mode(mode);
    }

    /// Show text in a loaded TrueType font at the given position.
    ///
    /// The codepoints are mapped through the font's character map; shaping
    /// and kerning are up to the caller (see [`Surface::draw_text_events`]).
    pub fn draw_text(
        &mut self,
        text: &str,
        font: FontId,
        size: f32,
        x: f32,
        y: f32,
    ) -> Result<()> {
        let events = text
            .chars()
            .map(|c| TextEvent::Glyph(c as u32))
            .collect::<Vec<_>>();
        self.draw_text_events(&events, font, size, x, y)
    }

    /// Replay a shaped glyph sequence in a loaded TrueType font.
    ///
    /// Glyphs are gathered into `TJ` runs; when a glyph falls into a
    /// different font subset than its predecessor, a new `Tf` operator
    /// switches the font resource mid-stream.
    pub fn draw_text_events(
        &mut self,
        events: &[TextEvent],
        font: FontId,
        size: f32,
        x: f32,
        y: f32,
    ) -> Result<()> {
        enum TextItem {
            Show(Vec<u8>),
            Adjust(f32),
        }

        // Resolve all glyphs up front; this may open new subsets.
        let mut runs: Vec<(pdf_writer::Ref, Vec<TextItem>)> = vec![];
        for event in events {
            match event {
                TextEvent::Glyph(codepoint) => {
                    let glyph = self.sc.get_subset_glyph(font, *codepoint)?;

                    match runs.last_mut() {
                        Some((font_ref, items)) if *font_ref == glyph.font_ref => {
                            if let Some(TextItem::Show(bytes)) = items.last_mut() {
                                bytes.extend_from_slice(&[0, glyph.slot]);
                            } else {
                                items.push(TextItem::Show(vec![0, glyph.slot]));
                            }
                        }
                        _ => {
                            runs.push((
                                glyph.font_ref,
                                vec![TextItem::Show(vec![0, glyph.slot])],
                            ));
                        }
                    }
                }
                TextEvent::Adjust(amount) => match runs.last_mut() {
                    Some((_, items)) => items.push(TextItem::Adjust(*amount)),
                    // An adjustment before the first glyph has no run to
                    // attach to and is dropped.
                    None => {}
                },
            }
        }

        self.begin_text()?;
        self.content.set_text_matrix([1.0, 0.0, 0.0, 1.0, x, y]);

        for (font_ref, items) in runs {
            let name = self
                .rd_builder
                .register_resource(resource::Font::new(font_ref));
            self.content.set_font(name.to_pdf_name(), size);

            let mut positioned = self.content.show_positioned();
            let mut tj = positioned.items();
            for item in &items {
                match item {
                    TextItem::Show(bytes) => {
                        tj.show(Str(bytes));
                    }
                    TextItem::Adjust(amount) => {
                        tj.adjust(*amount);
                    }
                }
            }
            tj.finish();
            positioned.finish();
        }

        self.end_text()
    }

    /// Show PDFDoc-encoded text in one of the fourteen builtin fonts.
    pub fn draw_text_builtin(
        &mut self,
        text: &str,
        font: BuiltinFont,
        size: f32,
        x: f32,
        y: f32,
    ) -> Result<()> {
        let font_ref = self.sc.builtin_font_ref(font);
        let name = self
            .rd_builder
            .register_resource(resource::Font::new(font_ref));

        self.begin_text()?;
        self.content.set_font(name.to_pdf_name(), size);
        self.content.set_text_matrix([1.0, 0.0, 0.0, 1.0, x, y]);
        self.content.show(Str(text.as_bytes()));
        self.end_text()
    }
}

/// Page-only operations.
impl Surface<'_> {
    /// Set the transition played when this page is presented.
    pub fn set_transition(&mut self, transition: Transition) -> Result<()> {
        self.page_data_mut()?.transition = Some(transition);
        Ok(())
    }

    /// Attach sub-page navigation: the given layers are revealed one per
    /// navigation step, each optionally accompanied by a transition.
    pub fn add_simple_navigation(
        &mut self,
        ocgs: &[OcgId],
        transition: Option<Transition>,
    ) -> Result<()> {
        let steps = ocgs
            .iter()
            .map(|&ocg| SubPageNavigation { ocg, transition })
            .collect::<Vec<_>>();
        self.page_data_mut()?.sub_navigations.extend(steps);
        Ok(())
    }

    /// Attach a form widget to this page.
    pub fn add_form_widget(&mut self, widget: FormWidgetId) -> Result<()> {
        self.page_data_mut()?.widgets.push(widget);
        Ok(())
    }

    /// Attach an annotation to this page.
    pub fn annotate(&mut self, annotation: AnnotationId) -> Result<()> {
        self.page_data_mut()?.annotations.push(annotation);
        Ok(())
    }

    /// Override individual page boxes for this page.
    pub fn set_custom_page_properties(&mut self, properties: PageProperties) -> Result<()> {
        self.page_data_mut()?.extra_properties = properties;
        Ok(())
    }
}

/// Finishers.
impl Surface<'_> {
    fn check_finishable(&self) -> Result<()> {
        if self.has_unclosed_state() {
            return Err(Error::UnclosedMarkedContent);
        }
        Ok(())
    }

    /// Finish a page surface, appending it as the next page of the
    /// document.
    pub fn finish_page(self) -> Result<PageId> {
        self.check_finishable()?;

        let Surface {
            sc,
            kind,
            content,
            segments,
            rd_builder,
            used_structures,
            ..
        } = self;

        let SurfaceKind::Page(data) = kind else {
            return Err(Error::InvalidDrawContextType);
        };

        let stream = collect_stream(content, segments);
        let settings = data
            .settings
            .clone()
            .with_properties(
                data.settings
                    .properties()
                    .merged_with(&data.extra_properties),
            );

        sc.register_page(
            settings,
            stream,
            rd_builder.finish(),
            data.widgets,
            data.annotations,
            used_structures,
            data.transition,
            data.sub_navigations,
        )
    }

    /// Finish a form XObject surface.
    pub fn finish_form_xobject(self) -> Result<FormXObjectId> {
        self.check_finishable()?;

        let Surface {
            sc,
            kind,
            content,
            segments,
            rd_builder,
            ..
        } = self;

        let SurfaceKind::FormXObject { width, height } = kind else {
            return Err(Error::InvalidDrawContextType);
        };

        let stream = collect_stream(content, segments);
        let ref_ = sc.new_ref();
        let chunk = serialize_form_xobject(
            sc,
            ref_,
            &stream,
            width,
            height,
            rd_builder,
            None,
        );

        Ok(sc.add_form_xobject_chunk(ref_, chunk))
    }

    /// Finish a transparency group surface.
    pub fn finish_transparency_group(self) -> Result<TransparencyGroupId> {
        self.check_finishable()?;

        let Surface {
            sc,
            kind,
            content,
            segments,
            rd_builder,
            ..
        } = self;

        let SurfaceKind::TransparencyGroup {
            width,
            height,
            isolated,
            knockout,
        } = kind
        else {
            return Err(Error::InvalidDrawContextType);
        };

        let stream = collect_stream(content, segments);
        let ref_ = sc.new_ref();
        let chunk = serialize_form_xobject(
            sc,
            ref_,
            &stream,
            width,
            height,
            rd_builder,
            Some((isolated, knockout)),
        );

        Ok(sc.add_transparency_group_chunk(ref_, chunk))
    }

    /// Finish a tiling pattern surface.
    pub fn finish_tiling_pattern(self) -> Result<PatternId> {
        self.check_finishable()?;

        let Surface {
            sc,
            kind,
            content,
            segments,
            rd_builder,
            ..
        } = self;

        let SurfaceKind::TilingPattern { width, height } = kind else {
            return Err(Error::InvalidDrawContextType);
        };

        let stream = collect_stream(content, segments);
        let ref_ = sc.new_ref();

        let mut chunk = Chunk::new();
        let pattern_stream = FilterStreamBuilder::new_from_content_stream(
            &stream,
            sc.settings().compress_content_streams,
        )
        .finish();

        let mut pattern = chunk.tiling_pattern(ref_, pattern_stream.encoded_data());
        pattern_stream.write_filters(pattern.deref_mut().deref_mut());
        pattern.tiling_type(pdf_writer::types::TilingType::ConstantSpacing);
        pattern.paint_type(pdf_writer::types::PaintType::Colored);
        pattern.bbox(pdf_writer::Rect::new(0.0, 0.0, width, height));
        pattern.x_step(width);
        pattern.y_step(height);
        rd_builder.finish().to_pdf_resources(&mut pattern.resources());
        pattern.finish();

        Ok(sc.add_pattern_chunk(ref_, chunk))
    }
}

fn serialize_form_xobject(
    sc: &mut SerializeContext,
    root_ref: pdf_writer::Ref,
    stream: &[u8],
    width: f32,
    height: f32,
    rd_builder: ResourceDictionaryBuilder,
    transparency: Option<(bool, bool)>,
) -> Chunk {
    let mut chunk = Chunk::new();

    let xobject_stream = FilterStreamBuilder::new_from_content_stream(
        stream,
        sc.settings().compress_content_streams,
    )
    .finish();

    let mut xobject = chunk.form_xobject(root_ref, xobject_stream.encoded_data());
    xobject_stream.write_filters(xobject.deref_mut().deref_mut());
    xobject.bbox(pdf_writer::Rect::new(0.0, 0.0, width, height));
    rd_builder.finish().to_pdf_resources(&mut xobject.resources());

    if let Some((isolated, knockout)) = transparency {
        let mut group = xobject.group();
        let mut transparency = group.transparency();
        transparency.isolated(isolated);
        transparency.knockout(knockout);
        transparency.finish();
        group.finish();
    }

    xobject.finish();

    chunk
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::color::DeviceColorSpace;
    use crate::metadata::Metadata;
    use crate::serialize::SerializeSettings;

    fn test_context() -> SerializeContext {
        SerializeContext::new(
            SerializeSettings {
                compress_content_streams: false,
                output_color_space: DeviceColorSpace::Rgb,
                subtype: None,
                intent_condition_identifier: None,
                tagged: false,
                xmp_metadata: false,
            },
            Metadata::new(),
        )
    }

    #[test]
    fn marked_content_cannot_nest() {
        let mut sc = test_context();
        let mut surface = Surface::new_page(&mut sc, PageSettings::default());

        surface.begin_marked_content("Span").unwrap();
        assert_eq!(
            surface.begin_marked_content("Span").unwrap_err(),
            Error::NestedBMC
        );
        surface.end_marked_content().unwrap();

        // After closing, a new sequence may start.
        surface.begin_marked_content("Span").unwrap();
        surface.end_marked_content().unwrap();
    }

    #[test]
    fn draw_states_must_match() {
        let mut sc = test_context();
        let mut surface = Surface::new_page(&mut sc, PageSettings::default());

        surface.save_state().unwrap();
        surface.begin_text().unwrap();
        assert_eq!(
            surface.restore_state().unwrap_err(),
            Error::DrawStateEndMismatch
        );
        surface.end_text().unwrap();
        surface.restore_state().unwrap();

        assert_eq!(
            surface.end_marked_content().unwrap_err(),
            Error::DrawStateEndMismatch
        );
    }

    #[test]
    fn saved_state_scope_restores_on_error() {
        let mut sc = test_context();
        let mut surface = Surface::new_page(&mut sc, PageSettings::default());

        surface
            .with_saved_state(|s| {
                s.rect(0.0, 0.0, 10.0, 10.0);
                s.fill_nonzero();
                Ok(())
            })
            .unwrap();
        assert!(!surface.has_unclosed_state());

        // A failing closure must not leave the save dangling.
        assert_eq!(
            surface.with_saved_state(|s| s.set_fill_gray(2.0)),
            Err(Error::ColorOutOfRange)
        );
        assert!(!surface.has_unclosed_state());

        let stream = collect_stream(surface.content, surface.segments);
        let text = String::from_utf8_lossy(&stream);
        assert_eq!(text.matches('q').count(), text.matches('Q').count());
    }

    #[test]
    fn unclosed_state_blocks_finishing() {
        let mut sc = test_context();
        let mut surface = Surface::new_page(&mut sc, PageSettings::default());
        surface.save_state().unwrap();
        assert!(surface.has_unclosed_state());
        assert_eq!(
            surface.finish_page().unwrap_err(),
            Error::UnclosedMarkedContent
        );
    }

    #[test]
    fn page_only_operations_are_rejected_elsewhere() {
        let mut sc = test_context();
        let mut surface = Surface::new_form_xobject(&mut sc, 10.0, 10.0);
        assert_eq!(
            surface.add_simple_navigation(&[], None).unwrap_err(),
            Error::InvalidDrawContextType
        );
        assert_eq!(
            surface.finish_page().unwrap_err(),
            Error::InvalidDrawContextType
        );
    }

    #[test]
    fn layer_sequences_are_spliced_into_the_stream() {
        let mut sc = test_context();
        let ocg = sc.register_ocg("layer 1");
        let mut surface = Surface::new_page(&mut sc, PageSettings::default());

        surface.rect(0.0, 0.0, 10.0, 10.0);
        surface.begin_marked_content_layer(ocg).unwrap();
        surface.fill_nonzero();
        surface.end_marked_content().unwrap();

        let stream = collect_stream(surface.content, surface.segments);
        let text = String::from_utf8_lossy(&stream);
        assert!(text.contains("/OC /o0 BDC"));
        let bdc = text.find("/OC /o0 BDC").unwrap();
        let re = text.find("re").unwrap();
        let emc = text.find("EMC").unwrap();
        assert!(re < bdc && bdc < emc);
    }
}
