use crate::LayoutError;

/// Geometry and pagination rules for one layout run, in canvas pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Width of the canvas the document is laid out on.
    pub canvas_width: f32,
    /// Height of one page's printable area, measured on the canvas.
    pub page_height: f32,
    /// Nodes carrying any of these classes are never split across pages.
    pub avoid_classes: Vec<String>,
    /// Also treat `break-inside: avoid` as an atomic marker.
    pub respect_break_inside: bool,
    /// Nodes carrying any of these classes always start a new page.
    pub break_before_classes: Vec<String>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            canvas_width: 794.0,
            page_height: 1157.57,
            avoid_classes: vec!["pdf-no-break".to_string()],
            respect_break_inside: true,
            break_before_classes: Vec::new(),
        }
    }
}

impl LayoutConfig {
    pub fn validate(&self) -> Result<(), LayoutError> {
        if !(self.canvas_width.is_finite() && self.canvas_width > 0.0) {
            return Err(LayoutError::InvalidConfig(format!(
                "canvas width must be positive, got {}",
                self.canvas_width
            )));
        }
        if !(self.page_height.is_finite() && self.page_height > 0.0) {
            return Err(LayoutError::InvalidConfig(format!(
                "page height must be positive, got {}",
                self.page_height
            )));
        }
        Ok(())
    }
}
