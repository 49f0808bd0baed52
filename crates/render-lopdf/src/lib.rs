//! A PDF backend for folio exports using the `lopdf` object model.

mod fonts;
mod page;
mod renderer;
mod writer;

pub use renderer::{LopdfRasterizer, lay_out_document};
pub use writer::PdfBuilder;
