//! Core rendering abstractions for PDF export.
//!
//! This crate provides the fundamental traits and types used by export backends:
//! - `Rasterizer` trait for turning a styled document into PDF bytes
//! - `ExportOptions` describing page geometry and pagination
//! - Error types for rendering operations

mod error;
mod options;
mod traits;
pub mod utils;

pub use error::RenderError;
pub use options::{ExportOptions, ExportOptionsBuilder, PaginationMode, PaginationRules};
pub use traits::Rasterizer;
