use folio_render_core::RenderError;
use lopdf::content::Content;
use lopdf::xref::XrefType;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

/// Assembles the output on lopdf's object model and saves it with a classic
/// cross-reference table.
///
/// Ids are handed out in call order and nothing time- or run-dependent is
/// written, so the same sequence of calls always yields the same bytes.
pub struct PdfBuilder {
    doc: Document,
    pages_id: ObjectId,
    resources_id: ObjectId,
    page_ids: Vec<ObjectId>,
    fonts: Dictionary,
}

impl PdfBuilder {
    pub fn new(version: &str) -> Self {
        let mut doc = Document::with_version(version);
        doc.reference_table.cross_reference_type = XrefType::CrossReferenceTable;
        let pages_id = doc.new_object_id();
        let resources_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            resources_id,
            page_ids: Vec::new(),
            fonts: Dictionary::new(),
        }
    }

    pub fn add_object<T: Into<Object>>(&mut self, object: T) -> ObjectId {
        self.doc.add_object(object)
    }

    /// Adds a page drawing `content`. Every page shares one resource
    /// dictionary.
    pub fn add_page(&mut self, media_box: [f32; 4], content: Content) -> Result<ObjectId, RenderError> {
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => media_box.iter().map(|v| Object::from(*v)).collect::<Vec<Object>>(),
            "Contents" => content_id,
            "Resources" => self.resources_id,
        });
        self.page_ids.push(page_id);
        Ok(page_id)
    }

    pub fn add_font(&mut self, resource: &str, font_id: ObjectId) {
        self.fonts.set(resource, font_id);
    }

    pub fn set_info(&mut self, info: Dictionary) {
        let info_id = self.doc.add_object(info);
        self.doc.trailer.set("Info", info_id);
    }

    pub fn finish(mut self) -> Result<Vec<u8>, RenderError> {
        self.doc
            .set_object(self.resources_id, dictionary! { "Font" => self.fonts });
        self.doc.set_object(
            self.pages_id,
            dictionary! {
                "Type" => "Pages",
                "Kids" => self.page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<Object>>(),
                "Count" => self.page_ids.len() as i64,
            },
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        self.doc.save_to(&mut out)?;
        Ok(out)
    }
}
