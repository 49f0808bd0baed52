//! Document export pipeline for a portfolio CV viewer.
//!
//! The viewer's document is exported by temporarily overriding its
//! presentation, rasterizing a snapshot to PDF and handing the bytes to the
//! host (save, preview, print, share). [`ActionOrchestrator`] sequences these
//! actions and publishes a [`ViewerState`] that [`ToolbarView`] reflects.

pub mod adapter;
pub mod artifact;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod overrides;
pub mod platform;
pub mod state;
pub mod target;
pub mod toolbar;

pub use adapter::RenderingAdapter;
pub use artifact::{ArtifactLocator, ArtifactStore};
pub use config::ExportConfig;
pub use error::ExportError;
pub use orchestrator::{ActionOrchestrator, OrchestratorConfig, ShareOutcome};
pub use overrides::{OverrideController, OverrideHandle, OverrideState};
pub use platform::{DesktopHost, Host, ShareCapability, SharePayload};
pub use state::{ActionKind, ActionState, ViewerState};
pub use target::ExportTarget;
pub use toolbar::{Control, ControlId, Indicator, ToolbarView};

pub use folio_document::{Document, Media, Node};
pub use folio_render_core::{ExportOptions, Rasterizer, RenderError};
pub use folio_render_lopdf::LopdfRasterizer;
