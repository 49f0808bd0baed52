use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid selector '{0}'")]
    Selector(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
