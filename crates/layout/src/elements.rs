use folio_types::{Color, Rect};

#[derive(Debug, Clone, PartialEq)]
pub struct TextElement {
    pub content: String,
    pub font_size: f32,
    pub bold: bool,
    /// Distance from the top of the line box to the baseline.
    pub baseline: f32,
    pub color: Color,
}

/// A paint primitive produced by layout.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutElement {
    /// Solid background filling the element rect.
    Fill(Color),
    /// Horizontal rule along the element rect; the rect height is the stroke width.
    Rule(Color),
    /// One line of text; the rect is the line box.
    Text(TextElement),
}

impl LayoutElement {
    /// Fills may be cut at page boundaries; rules and text lines never are.
    pub fn is_sliceable(&self) -> bool {
        matches!(self, LayoutElement::Fill(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionedElement {
    pub rect: Rect,
    pub element: LayoutElement,
}
