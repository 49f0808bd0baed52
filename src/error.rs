use crate::state::ActionKind;
use folio_document::DocumentError;
use folio_render_core::RenderError;
use thiserror::Error;

/// Errors surfaced by export actions and their host facilities.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Could not apply export styles: {0}")]
    OverrideApply(String),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Could not save the document: {0}")]
    Persist(String),

    #[error("{0} is not supported on this platform")]
    UnsupportedCapability(String),

    #[error("Host facility failed: {0}")]
    Platform(String),

    #[error("Another action is already running: {0}")]
    Busy(ActionKind),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for ExportError {
    fn from(e: serde_json::Error) -> Self {
        ExportError::Config(e.to_string())
    }
}
