use crate::error::ExportError;
use crate::orchestrator::OrchestratorConfig;
use folio_render_core::{ExportOptions, PaginationRules};
use folio_types::{Color, Margins, Orientation, PageFormat};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// User-facing export settings, loaded from camelCase JSON. Every field has
/// a default, so `{}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportConfig {
    pub filename: String,
    pub window_width: f32,
    pub margin: Margins,
    pub scale: f32,
    pub format: PageFormat,
    pub orientation: Orientation,
    pub pagination: PaginationRules,
    pub background: Color,
    pub render_timeout_ms: u64,
    pub settle_delay_ms: u64,
    pub display_interval_ms: u64,
    pub share_title: String,
    pub share_text: String,
    pub page_address: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        let orchestrator = OrchestratorConfig::default();
        Self {
            filename: "Resume.pdf".to_string(),
            window_width: 794.0,
            margin: Margins::all(10.0),
            scale: 2.0,
            format: PageFormat::A4,
            orientation: Orientation::Portrait,
            pagination: PaginationRules::default(),
            background: Color::WHITE,
            render_timeout_ms: 30_000,
            settle_delay_ms: orchestrator.settle_delay.as_millis() as u64,
            display_interval_ms: orchestrator.display_interval.as_millis() as u64,
            share_title: orchestrator.share_title,
            share_text: orchestrator.share_text,
            page_address: "http://localhost/".to_string(),
        }
    }
}

impl ExportConfig {
    pub fn from_json(json: &str) -> Result<Self, ExportError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ExportError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_json(&source)
    }

    pub fn export_options(&self) -> Result<ExportOptions, ExportError> {
        ExportOptions::builder()
            .with_filename(self.filename.clone())
            .with_window_width(self.window_width)
            .with_margins(self.margin)
            .with_scale(self.scale)
            .with_format(self.format)
            .with_orientation(self.orientation)
            .with_pagination(self.pagination.clone())
            .with_background(self.background)
            .with_render_timeout(Duration::from_millis(self.render_timeout_ms))
            .build()
            .map_err(|e| ExportError::Config(e.to_string()))
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            display_interval: Duration::from_millis(self.display_interval_ms),
            share_title: self.share_title.clone(),
            share_text: self.share_text.clone(),
        }
    }
}
