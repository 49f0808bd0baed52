use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Unsupported {property} color '{value}' on <{tag}>: only exact sRGB colors can be painted.")]
    UnsupportedColor {
        property: &'static str,
        value: String,
        tag: String,
    },
    #[error("Translucent background '{value}' on <{tag}>: backgrounds must be solid.")]
    TranslucentBackground { value: String, tag: String },
    #[error("Invalid layout configuration: {0}")]
    InvalidConfig(String),
    #[error("Font error: {0}")]
    Font(String),
    #[error("Layout engine error: {0}")]
    Engine(String),
}

pub mod config;
mod elements;
mod flow;
pub mod fonts;
pub mod pagination;
pub mod text;

pub use config::LayoutConfig;
pub use fonts::{FontFace, FontMetrics};
pub use elements::{LayoutElement, PositionedElement, TextElement};
pub use pagination::{BlockPlacement, LaidOutPage, PaginatedLayout, paginate};
