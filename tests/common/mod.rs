//! Shared fixtures: in-memory documents and a scripted model

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use docx_rs::{Docx, Paragraph, Run};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Object, Stream};

use rubric_grader::error::EvaluationError;
use rubric_grader::models::{Document, DOCX_MIME, PDF_MIME};
use rubric_grader::services::{GenerationRequest, GenerativeModel};

/// PDF with one page per entry; `None` gives a page without text
pub fn pdf(file_name: &str, pages: &[Option<&str>]) -> Document {
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
    Document::new(file_name, PDF_MIME, bytes)
}

/// Word document with one paragraph per entry
pub fn docx(file_name: &str, paragraphs: &[&str]) -> Document {
    let mut docx = Docx::new();
    for text in paragraphs {
        docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*text)));
    }
    let mut cursor = std::io::Cursor::new(Vec::new());
    docx.build().pack(&mut cursor).unwrap();
    Document::new(file_name, DOCX_MIME, cursor.into_inner())
}

/// Full reply with every schema field
pub fn full_reply(total: &str, feedback: &str, markdown: &str) -> String {
    serde_json::json!({
        "I_ElementosCurriculares": "4/5",
        "II_SecuenciaDidactica": "3/5",
        "III_PrincipiosDidacticos": "5/5",
        "IV_InstrumentosEvaluacion": "2/5",
        "V_EvidenciasImplementacion": "4/5",
        "Total_Calculado": total,
        "Retroalimentacion_Corta": feedback,
        "Evaluacion_Completa_Markdown": markdown,
    })
    .to_string()
}

/// Model answering from a script, one entry per call
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, EvaluationError>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Result<String, EvaluationError>>) -> (Self, Arc<Mutex<Vec<String>>>) {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let model = Self {
            replies: Mutex::new(replies.into()),
            prompts: prompts.clone(),
        };
        (model, prompts)
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, EvaluationError> {
        self.prompts.lock().unwrap().push(request.prompt.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(EvaluationError::EmptyResponse {
                    model: "scripted".to_string(),
                    reason: Some("script exhausted".to_string()),
                })
            })
    }
}
