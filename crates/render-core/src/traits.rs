use crate::error::RenderError;
use crate::options::ExportOptions;
use folio_document::Document;

/// The rendering engine boundary: turns a document into a finished PDF.
///
/// Implementations must be deterministic: the same document and options
/// yield the same bytes. They run on a blocking thread, so they may do
/// CPU-heavy work but must not assume an async context.
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, document: &Document, options: &ExportOptions) -> Result<Vec<u8>, RenderError>;

    /// Short name used in log lines.
    fn name(&self) -> &'static str {
        "rasterizer"
    }
}
