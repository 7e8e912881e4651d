//! Submission flow - workflow layer
//!
//! One submission, start to finish:
//! 1. extract the text
//! 2. build the prompt against the rubric
//! 3. evaluate and parse the reply
//!
//! Any failure is returned as a `SubmissionError`; the caller decides how to
//! report it and moves on to the next submission.

use tracing::{info, warn};

use crate::config::Config;
use crate::error::SubmissionError;
use crate::models::{Document, Evaluation, Rubric};
use crate::services::{Evaluator, GenerativeModel, PromptBuilder, TextExtractor};
use crate::workflow::submission_ctx::SubmissionCtx;

/// A submission that produced an evaluation
#[derive(Debug, Clone)]
pub struct EvaluatedSubmission {
    pub file_name: String,
    pub display_name: String,
    /// Extracted text, kept for the preview
    pub text: String,
    pub evaluation: Evaluation,
}

/// Submission flow
///
/// Holds no resources of its own, only the capabilities it chains.
pub struct SubmissionFlow {
    extractor: TextExtractor,
    prompt_builder: PromptBuilder,
    evaluator: Evaluator,
}

impl SubmissionFlow {
    pub fn new(config: &Config, model: Box<dyn GenerativeModel>) -> Self {
        Self {
            extractor: TextExtractor::new(),
            prompt_builder: PromptBuilder::new(config),
            evaluator: Evaluator::new(config, model),
        }
    }

    pub fn extractor(&self) -> &TextExtractor {
        &self.extractor
    }

    pub async fn run(
        &self,
        rubric: &Rubric,
        document: &Document,
        ctx: &SubmissionCtx,
    ) -> Result<EvaluatedSubmission, SubmissionError> {
        // ========== Step 1: extract ==========
        let text = self
            .extractor
            .extract(document)
            .map_err(|source| SubmissionError::Extraction {
                file_name: ctx.file_name.clone(),
                source,
            })?
            .ok_or_else(|| SubmissionError::UnsupportedKind {
                file_name: ctx.file_name.clone(),
                mime_type: document.mime_type.clone(),
            })?;

        if text.trim().is_empty() {
            warn!("{} ⚠️ no text extracted, evaluating anyway", ctx);
        } else {
            info!("{} ✓ extracted {} characters", ctx, text.chars().count());
        }

        // ========== Step 2: prompt ==========
        let prompt = self
            .prompt_builder
            .build(rubric.text(), &text, Some(&ctx.display_name));

        // ========== Step 3: evaluate ==========
        let evaluation = self
            .evaluator
            .evaluate(&prompt, &ctx.display_name)
            .await
            .map_err(|source| SubmissionError::Evaluation {
                file_name: ctx.file_name.clone(),
                source,
            })?;

        info!("{} ✅ evaluated, total {}", ctx, evaluation.result.total);

        Ok(EvaluatedSubmission {
            file_name: ctx.file_name.clone(),
            display_name: ctx.display_name.clone(),
            text,
            evaluation,
        })
    }
}
