pub mod evaluator;
pub mod export_writer;
pub mod extractor;
pub mod llm_service;
pub mod notice_writer;
pub mod prompt_builder;

pub use evaluator::Evaluator;
pub use export_writer::{ExportNames, ExportWriter};
pub use extractor::TextExtractor;
pub use llm_service::{backend_for, GeminiClient, GenerationRequest, GenerativeModel, OpenAiCompatClient};
pub use notice_writer::NoticeWriter;
pub use prompt_builder::PromptBuilder;
