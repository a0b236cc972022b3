//! Last-resort size reduction for outputs that are still far larger than
//! their source

use super::linearize::linearize_bytes;
use super::pipeline::{Stage, StageOutput};
use super::recompress::{DecodeLevel, recompress_streams};
use super::structural::structural_save;
use crate::impose::load_pdf_bytes;
use crate::types::Result;
use lopdf::Document;

pub struct AggressiveStage {
    pub linearize: bool,
}

impl Stage for AggressiveStage {
    fn name(&self) -> &'static str {
        "aggressive"
    }

    fn run(&self, pdf: &[u8]) -> Result<StageOutput> {
        let mut doc = load_pdf_bytes(pdf)?;
        let stripped = strip_metadata(&mut doc);
        let rewritten = recompress_streams(&mut doc, DecodeLevel::Maximum)?;
        let bytes = structural_save(&mut doc)?;

        let output = StageOutput::new(bytes).with_note(format!(
            "{} metadata entries stripped, {} stream(s) re-encoded",
            stripped, rewritten
        ));
        if !self.linearize {
            return Ok(output);
        }

        match linearize_bytes(&output.bytes) {
            Ok(linearized) => Ok(StageOutput {
                bytes: linearized,
                notes: output.notes,
            }
            .with_note("linearized with qpdf")),
            Err(e) => {
                log::warn!("Keeping non-linearized output: {}", e);
                Ok(output.with_note(format!("linearization skipped: {}", e)))
            }
        }
    }
}

/// Remove the catalog's XMP metadata and per-page thumbnails and private
/// application data. Returns how many entries were removed.
pub fn strip_metadata(doc: &mut Document) -> usize {
    let mut stripped = 0;

    if let Ok(root_id) = doc.trailer.get(b"Root").and_then(|r| r.as_reference()) {
        if let Ok(catalog) = doc.get_dictionary_mut(root_id) {
            stripped += usize::from(catalog.remove(b"Metadata").is_some());
        }
    }

    let page_ids: Vec<_> = doc.get_pages().into_values().collect();
    for page_id in page_ids {
        if let Ok(page) = doc.get_dictionary_mut(page_id) {
            stripped += usize::from(page.remove(b"Thumb").is_some());
            stripped += usize::from(page.remove(b"PieceInfo").is_some());
        }
    }

    stripped
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{Dictionary, Object, Stream};

    #[test]
    fn test_strip_metadata() {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let thumb_id = doc.add_object(Stream::new(Dictionary::new(), vec![0; 16]));
        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            ("Thumb", Object::Reference(thumb_id)),
        ]));
        doc.objects.insert(
            pages_id,
            Object::Dictionary(Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Pages".to_vec())),
                ("Kids", Object::Array(vec![Object::Reference(page_id)])),
                ("Count", Object::Integer(1)),
            ])),
        );
        let metadata_id = doc.add_object(Stream::new(Dictionary::new(), b"<x/>".to_vec()));
        let catalog_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
            ("Metadata", Object::Reference(metadata_id)),
        ]));
        doc.trailer.set("Root", catalog_id);

        assert_eq!(strip_metadata(&mut doc), 2);
        assert!(!doc.get_dictionary(catalog_id).unwrap().has(b"Metadata"));
        assert!(!doc.get_dictionary(page_id).unwrap().has(b"Thumb"));
        assert_eq!(strip_metadata(&mut doc), 0);
    }
}
