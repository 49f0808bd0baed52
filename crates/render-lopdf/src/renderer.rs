use crate::fonts;
use crate::page::{PageContext, PageGeometry};
use crate::writer::PdfBuilder;
use folio_document::{Document, Media, StyledNode};
use folio_layout::text::to_win_ansi;
use folio_layout::{FontFace, LayoutElement, PaginatedLayout, paginate};
use folio_render_core::{ExportOptions, Rasterizer, RenderError};
use folio_types::mm_to_pt;
use log::{debug, info, warn};
use lopdf::{Object, StringFormat, dictionary};
use std::collections::{BTreeMap, BTreeSet};

const PDF_VERSION: &str = "1.7";

/// Rasterizes documents into vector PDFs, embedding the faces layout
/// measured with.
///
/// Output carries no timestamps or random identifiers, so identical input
/// yields identical bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfRasterizer;

impl LopdfRasterizer {
    pub fn new() -> Self {
        Self
    }
}

impl Rasterizer for LopdfRasterizer {
    fn rasterize(&self, document: &Document, options: &ExportOptions) -> Result<Vec<u8>, RenderError> {
        let layout = lay_out_document(document, options)?;
        info!(
            "Rasterizing '{}': {} page(s), canvas {:.0}x{:.0}px",
            options.filename(),
            layout.page_count(),
            layout.canvas_width,
            layout.canvas_height
        );
        write_pdf(&layout, options)
    }

    fn name(&self) -> &'static str {
        "lopdf"
    }
}

/// Resolves screen styles and paginates `document` the way the rasterizer does.
pub fn lay_out_document(document: &Document, options: &ExportOptions) -> Result<PaginatedLayout, RenderError> {
    let styled = document.styled_tree(Media::Screen);
    warn_unsupported_effects(&styled);
    Ok(paginate(&styled, &options.layout_config())?)
}

fn warn_unsupported_effects(root: &StyledNode) {
    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    root.walk(&mut |node| {
        for effect in node.style.effects.active() {
            *counts.entry(effect).or_default() += 1;
        }
    });
    for (effect, count) in counts {
        warn!("Ignoring {} on {} element(s); static export cannot reproduce it", effect, count);
    }
}

/// Faces drawn anywhere in the layout, so unused ones are not embedded.
fn faces_in_use(layout: &PaginatedLayout) -> BTreeSet<FontFace> {
    layout
        .pages
        .iter()
        .flat_map(|page| &page.elements)
        .filter_map(|element| match &element.element {
            LayoutElement::Text(text) => Some(FontFace::for_weight(text.bold)),
            _ => None,
        })
        .collect()
}

fn page_geometry(options: &ExportOptions) -> PageGeometry {
    let (page_width, page_height) = options.page_size_pt();
    let margins = options.margins();
    let (printable_w, printable_h) = options.printable_mm();
    PageGeometry {
        page_width,
        page_height,
        origin_x: mm_to_pt(margins.left),
        origin_y: page_height - mm_to_pt(margins.top),
        printable_width: mm_to_pt(printable_w),
        printable_height: mm_to_pt(printable_h),
        pt_per_px: options.pt_per_px(),
        scale: options.scale(),
    }
}

fn write_pdf(layout: &PaginatedLayout, options: &ExportOptions) -> Result<Vec<u8>, RenderError> {
    let geometry = page_geometry(options);
    let media_box = [0.0, 0.0, geometry.page_width, geometry.page_height];
    let mut builder = PdfBuilder::new(PDF_VERSION);

    for page in &layout.pages {
        let mut ctx = PageContext::new(geometry, options.background());
        for element in &page.elements {
            ctx.draw_element(element);
        }
        builder.add_page(media_box, ctx.finish())?;
        debug!("Wrote page {} with {} element(s)", page.index + 1, page.elements.len());
    }

    let faces = faces_in_use(layout);
    debug!("Embedding {} font face(s)", faces.len());
    fonts::embed_all(&mut builder, faces)?;

    let title = options.filename().trim_end_matches(".pdf").replace('_', " ");
    builder.set_info(dictionary! {
        "Title" => Object::String(to_win_ansi(&title), StringFormat::Literal),
        "Producer" => Object::string_literal("folio"),
    });

    builder.finish()
}
