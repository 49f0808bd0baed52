use crate::error::RenderError;
use folio_layout::LayoutConfig;
use folio_types::{Color, Margins, Orientation, PageFormat, mm_to_pt};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Class that forces a page break before its element in legacy mode.
pub const LEGACY_PAGE_BREAK_CLASS: &str = "html2pdf__page-break";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaginationMode {
    /// Honor `break-inside: avoid` declarations.
    Css,
    /// Honor explicit page-break marker elements.
    Legacy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaginationRules {
    pub modes: Vec<PaginationMode>,
    /// Elements with any of these classes are never split across pages.
    pub avoid: Vec<String>,
}

impl Default for PaginationRules {
    fn default() -> Self {
        Self {
            modes: vec![PaginationMode::Css, PaginationMode::Legacy],
            avoid: vec!["pdf-no-break".to_string()],
        }
    }
}

impl PaginationRules {
    pub fn has_mode(&self, mode: PaginationMode) -> bool {
        self.modes.contains(&mode)
    }
}

/// Immutable description of one export. Built and validated once through
/// [`ExportOptions::builder`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    filename: String,
    window_width: f32,
    margins: Margins,
    scale: f32,
    format: PageFormat,
    orientation: Orientation,
    pagination: PaginationRules,
    background: Color,
    render_timeout: Duration,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            filename: "document.pdf".to_string(),
            window_width: 794.0,
            margins: Margins::all(10.0),
            scale: 2.0,
            format: PageFormat::A4,
            orientation: Orientation::Portrait,
            pagination: PaginationRules::default(),
            background: Color::WHITE,
            render_timeout: Duration::from_secs(30),
        }
    }
}

impl ExportOptions {
    pub fn builder() -> ExportOptionsBuilder {
        ExportOptionsBuilder::default()
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Width in pixels of the window the document is laid out in.
    pub fn window_width(&self) -> f32 {
        self.window_width
    }

    pub fn margins(&self) -> Margins {
        self.margins
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn format(&self) -> PageFormat {
        self.format
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn pagination(&self) -> &PaginationRules {
        &self.pagination
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn render_timeout(&self) -> Duration {
        self.render_timeout
    }

    /// Page size in points after orientation.
    pub fn page_size_pt(&self) -> (f32, f32) {
        self.format.oriented_pt(self.orientation)
    }

    /// Printable area in millimetres.
    pub fn printable_mm(&self) -> (f32, f32) {
        let (w, h) = self.format.oriented_mm(self.orientation);
        (
            w - self.margins.left - self.margins.right,
            h - self.margins.top - self.margins.bottom,
        )
    }

    /// Points per canvas pixel: the window width maps onto the printable width.
    pub fn pt_per_px(&self) -> f32 {
        mm_to_pt(self.printable_mm().0) / self.window_width
    }

    /// Height of one page's printable area in canvas pixels.
    pub fn page_height_px(&self) -> f32 {
        let (w, h) = self.printable_mm();
        h * self.window_width / w
    }

    pub fn layout_config(&self) -> LayoutConfig {
        let legacy = self.pagination.has_mode(PaginationMode::Legacy);
        LayoutConfig {
            canvas_width: self.window_width,
            page_height: self.page_height_px(),
            avoid_classes: self.pagination.avoid.clone(),
            respect_break_inside: self.pagination.has_mode(PaginationMode::Css),
            break_before_classes: if legacy {
                vec![LEGACY_PAGE_BREAK_CLASS.to_string()]
            } else {
                Vec::new()
            },
        }
    }

    fn validate(&self) -> Result<(), RenderError> {
        let invalid = |msg: String| Err(RenderError::InvalidOptions(msg));

        if self.filename.trim().is_empty() {
            return invalid("filename must not be empty".into());
        }
        if self.filename.contains(['/', '\\']) {
            return invalid(format!("filename '{}' must not contain a path", self.filename));
        }
        if !(self.window_width.is_finite() && self.window_width > 0.0) {
            return invalid(format!("window width must be positive, got {}", self.window_width));
        }
        if !(self.scale.is_finite() && self.scale >= 1.0) {
            return invalid(format!("scale must be at least 1, got {}", self.scale));
        }
        let m = self.margins;
        if [m.top, m.right, m.bottom, m.left].iter().any(|v| !v.is_finite() || *v < 0.0) {
            return invalid(format!("margins must be non-negative, got {:?}", m));
        }
        let (w, h) = self.printable_mm();
        if w <= 0.0 || h <= 0.0 {
            return invalid(format!("margins leave no printable area ({}mm x {}mm)", w, h));
        }
        if !self.background.is_opaque() {
            return invalid(format!("background {} must be solid", self.background));
        }
        if self.render_timeout.is_zero() {
            return invalid("render timeout must be non-zero".into());
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ExportOptionsBuilder {
    options: ExportOptions,
}

impl ExportOptionsBuilder {
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.options.filename = filename.into();
        self
    }

    pub fn with_window_width(mut self, px: f32) -> Self {
        self.options.window_width = px;
        self
    }

    pub fn with_margin_mm(mut self, mm: f32) -> Self {
        self.options.margins = Margins::all(mm);
        self
    }

    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.options.margins = margins;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.options.scale = scale;
        self
    }

    pub fn with_format(mut self, format: PageFormat) -> Self {
        self.options.format = format;
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.options.orientation = orientation;
        self
    }

    pub fn with_pagination(mut self, pagination: PaginationRules) -> Self {
        self.options.pagination = pagination;
        self
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.options.background = background;
        self
    }

    pub fn with_render_timeout(mut self, timeout: Duration) -> Self {
        self.options.render_timeout = timeout;
        self
    }

    pub fn build(self) -> Result<ExportOptions, RenderError> {
        self.options.validate()?;
        Ok(self.options)
    }
}
