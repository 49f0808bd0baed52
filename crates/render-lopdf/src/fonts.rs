//! Embeds the faces layout measured with as simple TrueType fonts.
//!
//! Text is drawn as WinAnsi byte strings, so each face gets a `Widths` array
//! over the WinAnsi range and the whole font program as `FontFile2`.

use crate::writer::PdfBuilder;
use folio_layout::FontFace;
use folio_layout::fonts::{FIRST_CHAR, LAST_CHAR};
use folio_render_core::RenderError;
use folio_render_core::utils::font_resource;
use lopdf::{Object, ObjectId, Stream, dictionary};
use std::sync::OnceLock;

/// Flate-compressed font programs, built once per process.
static PROGRAMS: [OnceLock<Stream>; 2] = [OnceLock::new(), OnceLock::new()];

fn font_program(face: FontFace) -> Result<Stream, RenderError> {
    let slot = &PROGRAMS[usize::from(face.is_bold())];
    if let Some(stream) = slot.get() {
        return Ok(stream.clone());
    }
    let data = face.data();
    let mut stream = Stream::new(dictionary! { "Length1" => data.len() as i64 }, data.to_vec());
    stream.compress()?;
    Ok(slot.get_or_init(|| stream).clone())
}

/// Adds the font dictionary, descriptor and program for `face`.
pub(crate) fn embed(builder: &mut PdfBuilder, face: FontFace) -> Result<ObjectId, RenderError> {
    let metrics = face.metrics()?;
    let program_id = builder.add_object(font_program(face)?);

    // Nonsymbolic; bold faces also carry ForceBold.
    let flags: i64 = if face.is_bold() { 32 | (1 << 18) } else { 32 };
    let descriptor_id = builder.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => Object::Name(metrics.postscript_name.as_bytes().to_vec()),
        "Flags" => flags,
        "FontBBox" => metrics.bbox.iter().map(|v| Object::Integer(*v)).collect::<Vec<Object>>(),
        "ItalicAngle" => 0,
        "Ascent" => metrics.ascent,
        "Descent" => metrics.descent,
        "CapHeight" => metrics.cap_height,
        "StemV" => if face.is_bold() { 120 } else { 80 },
        "FontFile2" => program_id,
    });

    Ok(builder.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "TrueType",
        "BaseFont" => Object::Name(metrics.postscript_name.into_bytes()),
        "FirstChar" => i64::from(FIRST_CHAR),
        "LastChar" => i64::from(LAST_CHAR),
        "Widths" => metrics.widths.into_iter().map(Object::Integer).collect::<Vec<Object>>(),
        "Encoding" => "WinAnsiEncoding",
        "FontDescriptor" => descriptor_id,
    }))
}

/// Embeds each face in `faces` and registers it under its page resource name.
pub(crate) fn embed_all(
    builder: &mut PdfBuilder,
    faces: impl IntoIterator<Item = FontFace>,
) -> Result<(), RenderError> {
    for face in faces {
        let font_id = embed(builder, face)?;
        builder.add_font(font_resource(face.is_bold()), font_id);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::Document;

    #[test]
    fn font_program_is_compressed_once_and_reused() {
        let first = font_program(FontFace::Regular).unwrap();
        let second = font_program(FontFace::Regular).unwrap();
        assert_eq!(first.content, second.content);
        assert!(first.content.len() < FontFace::Regular.data().len());
        assert_eq!(
            first.dict.get(b"Filter").and_then(Object::as_name).unwrap(),
            b"FlateDecode"
        );
        assert_eq!(
            first.decompressed_content().unwrap(),
            FontFace::Regular.data()
        );
    }

    #[test]
    fn embedded_font_describes_the_face() {
        let mut builder = PdfBuilder::new("1.7");
        embed_all(&mut builder, [FontFace::Bold]).unwrap();
        builder
            .add_page([0.0, 0.0, 10.0, 10.0], lopdf::content::Content { operations: vec![] })
            .unwrap();
        let doc = Document::load_mem(&builder.finish().unwrap()).unwrap();

        let page = *doc.get_pages().values().next().unwrap();
        let fonts = doc.get_page_fonts(page).unwrap();
        let font = fonts.get(b"F2".as_slice()).unwrap();
        assert_eq!(font.get(b"BaseFont").and_then(Object::as_name).unwrap(), b"DejaVuSans-Bold");
        assert_eq!(font.get(b"Widths").and_then(Object::as_array).unwrap().len(), 224);
        let descriptor = font
            .get(b"FontDescriptor")
            .and_then(Object::as_reference)
            .and_then(|id| doc.get_dictionary(id))
            .unwrap();
        assert!(descriptor.get(b"FontFile2").is_ok());
        assert!(!fonts.contains_key(b"F1".as_slice()));
    }
}
