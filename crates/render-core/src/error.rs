use folio_layout::LayoutError;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF generation error: {0}")]
    Pdf(String),
    #[error("Unsupported color: {0}")]
    UnsupportedColor(String),
    #[error("Invalid export options: {0}")]
    InvalidOptions(String),
    #[error("Rendering did not finish within {0:?}")]
    Timeout(Duration),
    #[error("Renderer produced an invalid document: {0}")]
    Corrupt(String),
    #[error("Other rendering error: {0}")]
    Other(String),
}

impl From<lopdf::Error> for RenderError {
    fn from(err: lopdf::Error) -> Self {
        RenderError::Pdf(err.to_string())
    }
}

impl From<LayoutError> for RenderError {
    fn from(err: LayoutError) -> Self {
        match err {
            LayoutError::UnsupportedColor { .. } | LayoutError::TranslucentBackground { .. } => {
                RenderError::UnsupportedColor(err.to_string())
            }
            LayoutError::InvalidConfig(msg) => RenderError::InvalidOptions(msg),
            LayoutError::Font(_) | LayoutError::Engine(_) => RenderError::Other(err.to_string()),
        }
    }
}
