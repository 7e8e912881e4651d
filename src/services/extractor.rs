//! Text extraction - service layer
//!
//! Turns an uploaded PDF or Word document into plain text.

use std::path::Path;

use docx_rs::{DocumentChild, InsertChild, Paragraph, ParagraphChild, Run, RunChild};
use tracing::{debug, warn};

use crate::error::ExtractionError;
use crate::infrastructure::ScratchFile;
use crate::models::{Document, DocumentKind};

/// Text extractor
///
/// - PDF: page texts concatenated in page order
/// - Word: paragraph texts joined with `\n`
/// - anything else: `Ok(None)`, the caller skips the document
#[derive(Debug, Default, Clone, Copy)]
pub struct TextExtractor;

impl TextExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract the text of `document`.
    ///
    /// The document is staged in a scratch file for the parser; the file is
    /// gone when this returns, whatever the outcome.
    ///
    /// # Returns
    /// - `Ok(Some(text))`: PDF or DOCX text, possibly empty
    /// - `Ok(None)`: unsupported document kind
    /// - `Err(..)`: the bytes could not be parsed
    pub fn extract(&self, document: &Document) -> Result<Option<String>, ExtractionError> {
        let Some(kind) = document.kind() else {
            warn!(
                "unsupported document type {} for {}",
                document.mime_type, document.file_name
            );
            return Ok(None);
        };

        let scratch = ScratchFile::materialize(&document.bytes, kind.suffix())
            .map_err(|source| ExtractionError::Scratch { source })?;

        let text = match kind {
            DocumentKind::Pdf => extract_pdf(scratch.path())?,
            DocumentKind::Word => {
                let bytes = scratch
                    .read()
                    .map_err(|source| ExtractionError::Scratch { source })?;
                extract_word(&bytes)?
            }
        };

        debug!(
            "extracted {} characters from {}",
            text.chars().count(),
            document.file_name
        );
        Ok(Some(text))
    }
}

fn extract_pdf(path: &Path) -> Result<String, ExtractionError> {
    let pdf = lopdf::Document::load(path).map_err(|source| ExtractionError::Pdf { source })?;

    let mut text = String::new();
    for page_number in pdf.get_pages().keys() {
        // Pages without a text layer (scans, images) contribute nothing
        match pdf.extract_text(&[*page_number]) {
            Ok(page_text) => text.push_str(&page_text),
            Err(e) => debug!("page {} has no extractable text: {}", page_number, e),
        }
    }
    Ok(text)
}

fn extract_word(bytes: &[u8]) -> Result<String, ExtractionError> {
    let docx = docx_rs::read_docx(bytes).map_err(|e| ExtractionError::Word {
        message: format!("{:?}", e),
    })?;

    let paragraphs: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(paragraph) => Some(paragraph_text(paragraph)),
            _ => None,
        })
        .collect();

    Ok(paragraphs.join("\n"))
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    push_children_text(&paragraph.children, &mut text);
    text
}

/// Runs nested in hyperlinks and tracked insertions count as paragraph text
fn push_children_text(children: &[ParagraphChild], text: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => push_run_text(run, text),
            ParagraphChild::Hyperlink(link) => push_children_text(&link.children, text),
            ParagraphChild::Insert(insert) => {
                for insert_child in &insert.children {
                    if let InsertChild::Run(run) = insert_child {
                        push_run_text(run, text);
                    }
                }
            }
            _ => {}
        }
    }
}

fn push_run_text(run: &Run, text: &mut String) {
    for run_child in &run.children {
        match run_child {
            RunChild::Text(t) => text.push_str(&t.text),
            RunChild::Tab(_) => text.push('\t'),
            RunChild::Break(_) => text.push('\n'),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DOCX_MIME, PDF_MIME};
    use docx_rs::{Docx, Hyperlink, HyperlinkType, Insert};
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    /// One page per entry; `None` builds a page without any text
    fn pdf_bytes(pages: &[Option<&str>]) -> Vec<u8> {
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for page in pages {
            let operations = match page {
                Some(text) => vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![100.into(), 600.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
                None => vec![],
            };
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
        let mut docx = Docx::new();
        for text in paragraphs {
            docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*text)));
        }
        let mut cursor = std::io::Cursor::new(Vec::new());
        docx.build().pack(&mut cursor).unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_pdf_pages_in_order() {
        let doc = Document::new("rubrica.pdf", PDF_MIME, pdf_bytes(&[Some("Claridad"), Some("Orden")]));
        let text = TextExtractor::new().extract(&doc).unwrap().unwrap();
        let first = text.find("Claridad").unwrap();
        let second = text.find("Orden").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_image_only_pdf_yields_empty_text() {
        let doc = Document::new("escaneo.pdf", PDF_MIME, pdf_bytes(&[None, None]));
        let text = TextExtractor::new().extract(&doc).unwrap().unwrap();
        assert!(text.trim().is_empty());
    }

    #[test]
    fn test_corrupt_pdf_is_an_error() {
        let doc = Document::new("roto.pdf", PDF_MIME, b"definitely not a pdf".to_vec());
        let err = TextExtractor::new().extract(&doc).unwrap_err();
        assert!(matches!(err, ExtractionError::Pdf { .. }));
    }

    #[test]
    fn test_word_paragraphs_joined_by_newline() {
        let doc = Document::new("ana.docx", DOCX_MIME, docx_bytes(&["Introducción", "Desarrollo"]));
        let text = TextExtractor::new().extract(&doc).unwrap().unwrap();
        assert_eq!(text, "Introducción\nDesarrollo");
    }

    #[test]
    fn test_word_keeps_hyperlink_and_inserted_text() {
        let paragraph = Paragraph::new()
            .add_run(Run::new().add_text("Ver "))
            .add_hyperlink(Hyperlink::new("anexo", HyperlinkType::Anchor).add_run(Run::new().add_text("anexo")))
            .add_insert(Insert::new(Run::new().add_text(" y notas")));
        let mut cursor = std::io::Cursor::new(Vec::new());
        Docx::new().add_paragraph(paragraph).build().pack(&mut cursor).unwrap();

        let doc = Document::new("ana.docx", DOCX_MIME, cursor.into_inner());
        let text = TextExtractor::new().extract(&doc).unwrap().unwrap();
        assert_eq!(text, "Ver anexo y notas");
    }

    #[test]
    fn test_corrupt_word_is_an_error() {
        let doc = Document::new("roto.docx", DOCX_MIME, b"PK not really".to_vec());
        let err = TextExtractor::new().extract(&doc).unwrap_err();
        assert!(matches!(err, ExtractionError::Word { .. }));
    }

    #[test]
    fn test_unsupported_kind_is_skipped() {
        let doc = Document::new("foto.png", "image/png", vec![0x89, b'P', b'N', b'G']);
        assert!(TextExtractor::new().extract(&doc).unwrap().is_none());
    }
}
