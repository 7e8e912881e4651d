pub mod document;
pub mod evaluation;

pub use document::{mime_for_file_name, Document, DocumentKind, Rubric, DOCX_MIME, PDF_MIME};
pub use evaluation::{Evaluation, EvaluationField, EvaluationResult, MISSING_EVALUATION, MISSING_FIELD};
