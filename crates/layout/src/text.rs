//! Text measurement, line breaking and the WinAnsi repertoire.
//!
//! Widths are shaped against the bundled faces in [`crate::fonts`]. The
//! renderer draws text as single-byte WinAnsi strings, so layout first maps
//! anything outside that repertoire to `?` and measures what will be drawn.

use crate::fonts::FontFace;

/// Width of `text` set at `font_size`, in the same unit as `font_size`.
pub fn measure(text: &str, font_size: f32, bold: bool) -> f32 {
    FontFace::for_weight(bold).shaped_width(text) * font_size
}

/// Width of the widest word, the narrowest a box can get without breaking
/// inside words.
pub fn min_content_width(text: &str, font_size: f32, bold: bool) -> f32 {
    text.split_whitespace()
        .map(|word| measure(word, font_size, bold))
        .fold(0.0, f32::max)
}

/// Breaks `text` into lines no wider than `max_width`.
///
/// Whitespace runs collapse to single spaces. A word wider than the line is
/// split between characters.
pub fn wrap(text: &str, font_size: f32, bold: bool, max_width: f32) -> Vec<String> {
    let space = measure(" ", font_size, bold);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0;

    for word in text.split_whitespace() {
        let word_width = measure(word, font_size, bold);

        if !current.is_empty() && current_width + space + word_width > max_width + 0.01 {
            lines.push(std::mem::take(&mut current));
            current_width = 0.0;
        }

        if current.is_empty() && word_width > max_width + 0.01 {
            for piece in split_word(word, font_size, bold, max_width) {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                current_width = measure(&piece, font_size, bold);
                current = piece;
            }
            continue;
        }

        if !current.is_empty() {
            current.push(' ');
            current_width += space;
        }
        current.push_str(word);
        current_width += word_width;
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn split_word(word: &str, font_size: f32, bold: bool, max_width: f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut width = 0.0;
    let mut utf8 = [0u8; 4];
    for c in word.chars() {
        let w = measure(c.encode_utf8(&mut utf8), font_size, bold);
        if !piece.is_empty() && width + w > max_width + 0.01 {
            pieces.push(std::mem::take(&mut piece));
            width = 0.0;
        }
        piece.push(c);
        width += w;
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

/// WinAnsi code for `c`, if it has one.
pub fn win_ansi_code(c: char) -> Option<u8> {
    let code = match c {
        '\u{0020}'..='\u{007E}' | '\u{00A0}'..='\u{00FF}' => c as u8,
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        _ => return None,
    };
    Some(code)
}

/// The character WinAnsi places at `code`.
pub fn win_ansi_char(code: u8) -> Option<char> {
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(code as char),
        0x80..=0x9F => C1_CHARS[(code - 0x80) as usize],
        _ => None,
    }
}

const C1_CHARS: [Option<char>; 32] = [
    Some('\u{20AC}'), None, Some('\u{201A}'), Some('\u{0192}'),
    Some('\u{201E}'), Some('\u{2026}'), Some('\u{2020}'), Some('\u{2021}'),
    Some('\u{02C6}'), Some('\u{2030}'), Some('\u{0160}'), Some('\u{2039}'),
    Some('\u{0152}'), None, Some('\u{017D}'), None,
    None, Some('\u{2018}'), Some('\u{2019}'), Some('\u{201C}'),
    Some('\u{201D}'), Some('\u{2022}'), Some('\u{2013}'), Some('\u{2014}'),
    Some('\u{02DC}'), Some('\u{2122}'), Some('\u{0161}'), Some('\u{203A}'),
    Some('\u{0153}'), None, Some('\u{017E}'), Some('\u{0178}'),
];

/// `text` with every character outside WinAnsi replaced by `?`. Whitespace
/// control characters pass through for line breaking.
pub fn printable(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_whitespace() || win_ansi_code(c).is_some() {
                c
            } else {
                '?'
            }
        })
        .collect()
}

/// Encodes text as a WinAnsi byte string. Characters with no WinAnsi code
/// become `?`.
pub fn to_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(|c| win_ansi_code(c).unwrap_or(b'?')).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bold_is_wider() {
        assert!(measure("Experience", 12.0, true) > measure("Experience", 12.0, false));
    }

    #[test]
    fn lowercase_widths_follow_the_font() {
        // DejaVu Sans: a = 1255, e = 1260, n = 1298, o = 1253 units of 2048.
        let widths: Vec<f32> = ["a", "e", "n", "o"].iter().map(|c| measure(c, 1.0, false)).collect();
        assert!(widths.iter().all(|w| (0.6..0.64).contains(w)), "{:?}", widths);
        assert!((measure("ae", 10.0, false) - 12.28).abs() < 0.02);
    }

    #[test]
    fn wraps_at_word_boundaries() {
        let width = measure("alpha beta", 10.0, false);
        let lines = wrap("alpha beta gamma", 10.0, false, width);
        assert_eq!(lines, vec!["alpha beta", "gamma"]);
    }

    #[test]
    fn collapses_whitespace() {
        let lines = wrap("  one \n\t two  ", 10.0, false, 1000.0);
        assert_eq!(lines, vec!["one two"]);
    }

    #[test]
    fn splits_overlong_words() {
        let lines = wrap("abcdefghij", 10.0, false, measure("abcd", 10.0, false));
        assert!(lines.len() >= 3);
        assert_eq!(lines.concat(), "abcdefghij");
    }

    #[test]
    fn min_content_is_the_widest_word() {
        let text = "a considerable word";
        assert_eq!(min_content_width(text, 10.0, false), measure("considerable", 10.0, false));
    }

    #[test]
    fn empty_text_has_no_lines() {
        assert!(wrap("   ", 10.0, false, 100.0).is_empty());
    }

    #[test]
    fn win_ansi_maps_typographic_punctuation() {
        assert_eq!(to_win_ansi("a–b—c•"), vec![b'a', 0x96, b'b', 0x97, b'c', 0x95]);
        assert_eq!(to_win_ansi("“é”"), vec![0x93, 0xE9, 0x94]);
        assert_eq!(to_win_ansi("→"), vec![b'?']);
    }

    #[test]
    fn win_ansi_codes_round_trip_through_the_table() {
        for code in 0x20..=0xFFu8 {
            if let Some(c) = win_ansi_char(code) {
                assert_eq!(win_ansi_code(c), Some(code), "code {:#x}", code);
            }
        }
        assert_eq!(win_ansi_char(0x81), None);
        assert_eq!(win_ansi_char(0x8C), Some('Œ'));
    }

    #[test]
    fn printable_replaces_unencodable_characters() {
        assert_eq!(printable("Lisbon → Porto · 2024"), "Lisbon ? Porto · 2024");
    }
}
