//! The bundled DejaVu Sans faces.
//!
//! Layout measures text by shaping it against these faces and the renderer
//! embeds the very same font programs, so a line never draws wider than it
//! was measured.

use crate::LayoutError;
use crate::text::win_ansi_char;
use rustybuzz::{Feature, UnicodeBuffer};
use std::cell::RefCell;
use std::sync::OnceLock;
use ttf_parser::{GlyphId, Tag};

static REGULAR: &[u8] = include_bytes!("../assets/fonts/DejaVuSans.ttf");
static BOLD: &[u8] = include_bytes!("../assets/fonts/DejaVuSans-Bold.ttf");

thread_local! {
    static FACES: [Option<rustybuzz::Face<'static>>; 2] = [
        rustybuzz::Face::from_slice(REGULAR, 0),
        rustybuzz::Face::from_slice(BOLD, 0),
    ];
    static SCRATCH_BUFFER: RefCell<Option<UnicodeBuffer>> = RefCell::new(Some(UnicodeBuffer::new()));
}

/// Text is drawn glyph by glyph with the nominal advances from the font's
/// `Widths`, so shaping must not kern or form ligatures either.
fn nominal_features() -> &'static [Feature] {
    static FEATURES: OnceLock<Vec<Feature>> = OnceLock::new();
    FEATURES.get_or_init(|| {
        vec![
            Feature::new(Tag::from_bytes(b"kern"), 0, ..),
            Feature::new(Tag::from_bytes(b"liga"), 0, ..),
            Feature::new(Tag::from_bytes(b"clig"), 0, ..),
            Feature::new(Tag::from_bytes(b"calt"), 0, ..),
        ]
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FontFace {
    Regular,
    Bold,
}

impl FontFace {
    pub const ALL: [FontFace; 2] = [FontFace::Regular, FontFace::Bold];

    pub fn for_weight(bold: bool) -> Self {
        if bold { FontFace::Bold } else { FontFace::Regular }
    }

    pub fn is_bold(self) -> bool {
        self == FontFace::Bold
    }

    /// The TrueType font program.
    pub fn data(self) -> &'static [u8] {
        match self {
            FontFace::Regular => REGULAR,
            FontFace::Bold => BOLD,
        }
    }

    fn index(self) -> usize {
        match self {
            FontFace::Regular => 0,
            FontFace::Bold => 1,
        }
    }

    /// Reads the metrics a PDF font descriptor needs.
    pub fn metrics(self) -> Result<FontMetrics, LayoutError> {
        let face = ttf_parser::Face::parse(self.data(), 0)
            .map_err(|e| LayoutError::Font(format!("{:?}: {}", self, e)))?;
        let units_per_em = face.units_per_em();
        let to_thousandths = |units: f32| (units * 1000.0 / units_per_em as f32).round() as i64;

        let postscript_name = face
            .names()
            .into_iter()
            .filter(|name| name.name_id == ttf_parser::name_id::POST_SCRIPT_NAME)
            .find_map(|name| name.to_string())
            .unwrap_or_else(|| match self {
                FontFace::Regular => "DejaVuSans".to_string(),
                FontFace::Bold => "DejaVuSans-Bold".to_string(),
            });

        let widths = (FIRST_CHAR..=LAST_CHAR)
            .map(|code| {
                let glyph = win_ansi_char(code)
                    .and_then(|c| face.glyph_index(c))
                    .unwrap_or(GlyphId(0));
                to_thousandths(face.glyph_hor_advance(glyph).unwrap_or(0) as f32)
            })
            .collect();

        let bbox = face.global_bounding_box();
        Ok(FontMetrics {
            postscript_name,
            ascent: to_thousandths(face.ascender() as f32),
            descent: to_thousandths(face.descender() as f32),
            cap_height: to_thousandths(face.capital_height().unwrap_or(face.ascender()) as f32),
            bbox: [
                to_thousandths(bbox.x_min as f32),
                to_thousandths(bbox.y_min as f32),
                to_thousandths(bbox.x_max as f32),
                to_thousandths(bbox.y_max as f32),
            ],
            widths,
        })
    }

    /// Ascender and descender depth in em, both positive.
    pub fn vertical_metrics(self) -> (f32, f32) {
        FACES.with(|faces| match &faces[self.index()] {
            Some(face) => {
                let upem = face.units_per_em() as f32;
                (face.ascender() as f32 / upem, -(face.descender() as f32) / upem)
            }
            None => (0.8, 0.2),
        })
    }

    /// Advance width of `text` in em.
    pub fn shaped_width(self, text: &str) -> f32 {
        if text.is_empty() {
            return 0.0;
        }
        FACES.with(|faces| {
            let Some(face) = &faces[self.index()] else {
                return 0.0;
            };
            let mut buffer =
                SCRATCH_BUFFER.with(|b| b.borrow_mut().take().unwrap_or_else(UnicodeBuffer::new));
            buffer.push_str(text);
            buffer.guess_segment_properties();

            let glyphs = rustybuzz::shape(face, nominal_features(), buffer);
            let units: i32 = glyphs.glyph_positions().iter().map(|p| p.x_advance).sum();

            let recycled = glyphs.clear();
            SCRATCH_BUFFER.with(|b| *b.borrow_mut() = Some(recycled));
            units as f32 / face.units_per_em() as f32
        })
    }
}

/// First and last WinAnsi code covered by [`FontMetrics::widths`].
pub const FIRST_CHAR: u8 = 32;
pub const LAST_CHAR: u8 = 255;

/// Font descriptor values, in thousandths of an em.
#[derive(Debug, Clone, PartialEq)]
pub struct FontMetrics {
    pub postscript_name: String,
    pub ascent: i64,
    pub descent: i64,
    pub cap_height: i64,
    pub bbox: [i64; 4],
    /// Advance of every WinAnsi code from [`FIRST_CHAR`] to [`LAST_CHAR`].
    pub widths: Vec<i64>,
}

/// Fails when a bundled face cannot be parsed for shaping.
pub(crate) fn ensure_loaded() -> Result<(), LayoutError> {
    FACES.with(|faces| {
        match FontFace::ALL.iter().find(|face| faces[face.index()].is_none()) {
            Some(face) => Err(LayoutError::Font(format!("{:?} face could not be loaded", face))),
            None => Ok(()),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_faces_load() {
        assert!(ensure_loaded().is_ok());
        let regular = FontFace::Regular.metrics().unwrap();
        let bold = FontFace::Bold.metrics().unwrap();
        assert_eq!(regular.postscript_name, "DejaVuSans");
        assert_eq!(bold.postscript_name, "DejaVuSans-Bold");
        assert_eq!(regular.widths.len(), 224);
        assert!(regular.ascent > 0 && regular.descent < 0);
    }

    #[test]
    fn shaped_widths_come_from_the_font() {
        // 1255 and 651 font units at 2048 units per em.
        assert!((FontFace::Regular.shaped_width("a") - 0.6128).abs() < 1e-3);
        assert!((FontFace::Regular.shaped_width(" ") - 0.3179).abs() < 1e-3);
        assert!(FontFace::Bold.shaped_width("Experience") > FontFace::Regular.shaped_width("Experience"));
    }

    #[test]
    fn shaping_matches_the_embedded_widths() {
        let metrics = FontFace::Regular.metrics().unwrap();
        let text = "Alex Morgan";
        let from_widths: i64 = text
            .bytes()
            .map(|b| metrics.widths[(b - FIRST_CHAR) as usize])
            .sum();
        let shaped = FontFace::Regular.shaped_width(text) * 1000.0;
        assert!((shaped - from_widths as f32).abs() < 6.0, "{} vs {}", shaped, from_widths);
    }

    #[test]
    fn vertical_metrics_are_positive() {
        let (ascent, descent) = FontFace::Bold.vertical_metrics();
        assert!((ascent - 0.928).abs() < 1e-3);
        assert!((descent - 0.236).abs() < 1e-3);
    }
}
