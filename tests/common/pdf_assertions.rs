use lopdf::Document as LopdfDocument;
use lopdf::Object;
use std::collections::BTreeSet;

/// Parses rendered output, panicking with the reader's error.
pub fn load(bytes: &[u8]) -> LopdfDocument {
    LopdfDocument::load_mem(bytes).unwrap_or_else(|e| panic!("output does not parse as PDF: {}", e))
}

pub fn page_count(bytes: &[u8]) -> usize {
    load(bytes).get_pages().len()
}

/// Text of every page, one page after the other.
pub fn extract_text(doc: &LopdfDocument) -> String {
    let mut text = String::new();
    for page_num in doc.get_pages().keys() {
        if let Ok(page_text) = doc.extract_text(&[*page_num]) {
            text.push_str(&page_text);
            text.push('\n');
        }
    }
    text
}

/// Text of a single page, numbered from 1.
pub fn page_text(doc: &LopdfDocument, page_num: u32) -> String {
    doc.extract_text(&[page_num]).unwrap_or_default()
}

/// Base font names referenced from any page's resources.
pub fn extract_font_names(doc: &LopdfDocument) -> BTreeSet<String> {
    let mut fonts = BTreeSet::new();
    for page_id in doc.get_pages().values() {
        let Ok(page_fonts) = doc.get_page_fonts(*page_id) else {
            continue;
        };
        for font in page_fonts.values() {
            if let Ok(name) = font.get(b"BaseFont").and_then(Object::as_name) {
                fonts.insert(String::from_utf8_lossy(name).to_string());
            }
        }
    }
    fonts
}

/// The Info dictionary's title, decoded as Latin-1.
pub fn info_title(doc: &LopdfDocument) -> Option<String> {
    let info = doc
        .trailer
        .get(b"Info")
        .and_then(Object::as_reference)
        .and_then(|id| doc.get_dictionary(id))
        .ok()?;
    let title = info.get(b"Title").and_then(Object::as_str).ok()?;
    Some(title.iter().map(|b| *b as char).collect())
}

#[macro_export]
macro_rules! assert_valid_pdf {
    ($bytes:expr) => {{
        let doc = $crate::common::pdf_assertions::load(&$bytes);
        assert!(!doc.get_pages().is_empty(), "document has no pages");
    }};
}

#[macro_export]
macro_rules! assert_page_count {
    ($bytes:expr, $expected:expr) => {{
        let actual = $crate::common::pdf_assertions::page_count(&$bytes);
        assert_eq!(actual, $expected, "unexpected page count");
    }};
}
