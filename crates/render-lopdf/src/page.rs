use folio_layout::text::to_win_ansi;
use folio_layout::{LayoutElement, PositionedElement, TextElement};
use folio_render_core::utils::{font_resource, rgb_operands, snap};
use folio_types::{Color, Rect};
use lopdf::content::{Content, Operation};
use lopdf::{Object, StringFormat};

/// Maps canvas pixels onto one PDF page.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    /// Top-left corner of the printable area, in points from the bottom-left.
    pub origin_x: f32,
    pub origin_y: f32,
    pub printable_width: f32,
    pub printable_height: f32,
    pub pt_per_px: f32,
    pub scale: f32,
}

impl PageGeometry {
    fn x(&self, px: f32) -> f32 {
        self.origin_x + snap(px, self.scale) * self.pt_per_px
    }

    fn y(&self, px: f32) -> f32 {
        self.origin_y - snap(px, self.scale) * self.pt_per_px
    }

    fn len(&self, px: f32) -> f32 {
        snap(px, self.scale) * self.pt_per_px
    }
}

#[derive(Default, Clone, PartialEq)]
struct PageRenderState {
    font: Option<(&'static str, f32)>,
    fill_color: Option<Color>,
}

pub(crate) struct PageContext {
    geometry: PageGeometry,
    content: Content,
    state: PageRenderState,
}

impl PageContext {
    pub fn new(geometry: PageGeometry, background: Color) -> Self {
        let mut ctx = Self {
            geometry,
            content: Content { operations: vec![] },
            state: PageRenderState::default(),
        };
        ctx.fill_rect(0.0, 0.0, geometry.page_width, geometry.page_height, background);
        ctx.clip_to_printable_area();
        ctx
    }

    pub fn finish(mut self) -> Content {
        self.push("Q", vec![]);
        self.content
    }

    pub fn draw_element(&mut self, el: &PositionedElement) {
        match &el.element {
            LayoutElement::Fill(color) => self.draw_fill(el.rect, *color),
            LayoutElement::Rule(color) => self.draw_rule(el.rect, *color),
            LayoutElement::Text(text) => self.draw_text(el.rect, text),
        }
    }

    fn push(&mut self, operator: &str, operands: Vec<Object>) {
        self.content.operations.push(Operation::new(operator, operands));
    }

    fn clip_to_printable_area(&mut self) {
        let g = self.geometry;
        self.push("q", vec![]);
        self.push(
            "re",
            vec![
                g.origin_x.into(),
                (g.origin_y - g.printable_height).into(),
                g.printable_width.into(),
                g.printable_height.into(),
            ],
        );
        self.push("W", vec![]);
        self.push("n", vec![]);
    }

    fn set_fill_color(&mut self, color: Color) {
        if self.state.fill_color != Some(color) {
            let [r, g, b] = rgb_operands(color);
            self.push("rg", vec![r.into(), g.into(), b.into()]);
            self.state.fill_color = Some(color);
        }
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        self.set_fill_color(color);
        self.push("re", vec![x.into(), y.into(), width.into(), height.into()]);
        self.push("f", vec![]);
    }

    fn draw_fill(&mut self, rect: Rect, color: Color) {
        let g = self.geometry;
        let x = g.x(rect.x);
        let top = g.y(rect.y);
        let bottom = g.y(rect.bottom());
        self.fill_rect(x, bottom, g.x(rect.right()) - x, top - bottom, color);
    }

    fn draw_rule(&mut self, rect: Rect, color: Color) {
        let g = self.geometry;
        let [r, gr, b] = rgb_operands(color);
        let line_y = g.y(rect.y + rect.height / 2.0);
        self.push("w", vec![g.len(rect.height).max(0.1).into()]);
        self.push("RG", vec![r.into(), gr.into(), b.into()]);
        self.push("m", vec![g.x(rect.x).into(), line_y.into()]);
        self.push("l", vec![g.x(rect.right()).into(), line_y.into()]);
        self.push("S", vec![]);
    }

    fn set_font(&mut self, name: &'static str, size: f32) {
        if self.state.font != Some((name, size)) {
            self.push("Tf", vec![Object::Name(name.as_bytes().to_vec()), size.into()]);
            self.state.font = Some((name, size));
        }
    }

    fn draw_text(&mut self, rect: Rect, text: &TextElement) {
        if text.content.trim().is_empty() {
            return;
        }
        let g = self.geometry;
        let baseline = rect.y + text.baseline;

        self.push("BT", vec![]);
        // Text objects reset the font state.
        self.state.font = None;
        self.set_font(font_resource(text.bold), text.font_size * g.pt_per_px);
        self.set_fill_color(text.color);
        self.push("Td", vec![g.x(rect.x).into(), g.y(baseline).into()]);
        self.push(
            "Tj",
            vec![Object::String(to_win_ansi(&text.content), StringFormat::Literal)],
        );
        self.push("ET", vec![]);
    }
}
