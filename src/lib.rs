//! # Rubric Grader
//!
//! Grades student submissions (PDF or Word) against a PDF rubric with a
//! hosted language model, then exports one evaluation per submission and a
//! CSV summary of the batch.
//!
//! ## Layers
//!
//! ### ① Infrastructure
//! - `infrastructure/` - scarce resources, exposed as capabilities only
//! - `ScratchFile` - on-disk copy of a document, removed on drop
//!
//! ### ② Services
//! - `services/` - what can be done with one document
//! - `TextExtractor` - PDF / Word → text
//! - `PromptBuilder` - rubric + submission → instruction
//! - `Evaluator` and `GenerativeModel` - remote call and reply parsing
//! - `ExportWriter` / `NoticeWriter` - export files and the run log
//!
//! ### ③ Workflow
//! - `workflow/` - one submission, start to finish
//! - `SubmissionCtx` - which submission of the batch
//! - `SubmissionFlow` - extract → prompt → evaluate
//!
//! ### ④ Orchestration
//! - `orchestrator/` - the sequential batch, the session and the exports
//! - `session/` - rubric and result table of the grading session
//!
//! The terminal front end lives in `shell/`.

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod session;
pub mod shell;
pub mod utils;
pub mod workflow;

pub use config::{Config, Provider};
pub use error::{AppError, AppResult};
pub use models::{Document, Evaluation, EvaluationResult, Rubric};
pub use orchestrator::{run_batch, App, BatchReporter, BatchSummary, RunReport};
pub use session::{GradingSession, SessionTable};
pub use workflow::{EvaluatedSubmission, SubmissionCtx, SubmissionFlow};
