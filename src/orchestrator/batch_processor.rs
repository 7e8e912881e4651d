//! Batch processor - orchestration layer
//!
//! ## Responsibilities
//!
//! 1. **Session**: owns the `GradingSession` (rubric + table)
//! 2. **Sequential batch**: one submission at a time, in upload order
//! 3. **Failure boundary**: a failed submission becomes a notice and the
//!    batch moves on
//! 4. **Exports**: per-submission text files and the CSV summary
//!
//! No grading logic lives here; that is `workflow::SubmissionFlow`.

use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{AppResult, RubricError, SubmissionError};
use crate::models::{Document, Rubric};
use crate::orchestrator::reporter::BatchReporter;
use crate::services::export_writer::SUMMARY_FILE_NAME;
use crate::services::{ExportNames, ExportWriter, GenerativeModel, NoticeWriter};
use crate::session::GradingSession;
use crate::utils::logging::{log_batch_start, print_final_stats};
use crate::workflow::{EvaluatedSubmission, SubmissionCtx, SubmissionFlow};

/// Outcome of one batch
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub total: usize,
    /// In processing order; one per table row
    pub evaluated: Vec<EvaluatedSubmission>,
    pub failures: Vec<SubmissionError>,
}

/// Outcome of one batch plus the files it produced
#[derive(Debug)]
pub struct RunReport {
    pub summary: BatchSummary,
    pub evaluation_files: Vec<PathBuf>,
    /// `None` when no submission was evaluated or the CSV could not be written
    pub summary_file: Option<PathBuf>,
    /// Exports that could not be written
    pub export_failures: Vec<SubmissionError>,
}

/// Run one batch against the session's rubric.
///
/// The table is cleared first. Each submission completes, including its
/// report, before the next one starts. Only a missing rubric stops the batch.
pub async fn run_batch(
    session: &mut GradingSession,
    flow: &SubmissionFlow,
    documents: &[Document],
    reporter: &dyn BatchReporter,
) -> Result<BatchSummary, RubricError> {
    session.rubric()?;
    session.begin_batch();
    let (rubric, table) = session.batch_parts()?;

    let total = documents.len();
    let mut summary = BatchSummary {
        total,
        ..Default::default()
    };
    reporter.batch_started(total);

    for (idx, document) in documents.iter().enumerate() {
        let ctx = SubmissionCtx::new(
            idx + 1,
            total,
            document.file_name.clone(),
            document.display_name(),
        );
        reporter.submission_started(&ctx);

        match flow.run(rubric, document, &ctx).await {
            Ok(evaluated) => {
                table.push(evaluated.evaluation.result.clone());
                reporter.submission_evaluated(&ctx, &evaluated);
                summary.evaluated.push(evaluated);
            }
            Err(e) => {
                error!("{} ❌ {}", ctx, e);
                reporter.submission_failed(&ctx, &e);
                summary.failures.push(e);
            }
        }
    }

    reporter.batch_finished(&summary);
    Ok(summary)
}

/// Application
pub struct App {
    config: Config,
    session: GradingSession,
    flow: SubmissionFlow,
    exports: ExportWriter,
    notices: NoticeWriter,
}

impl App {
    pub fn new(config: Config, model: Box<dyn GenerativeModel>) -> Self {
        let flow = SubmissionFlow::new(&config, model);
        let exports = ExportWriter::new(&config.output_dir);
        let notices = NoticeWriter::new(config.output_log_file.clone());
        Self {
            config,
            session: GradingSession::new(),
            flow,
            exports,
            notices,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &GradingSession {
        &self.session
    }

    /// Load the rubric; failure leaves the app without one
    pub fn load_rubric(&mut self, document: &Document) -> AppResult<&Rubric> {
        info!("📄 loading rubric {}", document.file_name);
        Ok(self.session.load_rubric(self.flow.extractor(), document)?)
    }

    /// Read `paths` and evaluate them.
    ///
    /// A path that cannot be read is counted as a skipped submission.
    ///
    /// # Returns
    /// The run report; `Err` only when no rubric is loaded
    pub async fn run_files(
        &mut self,
        paths: &[PathBuf],
        reporter: &dyn BatchReporter,
    ) -> AppResult<RunReport> {
        let mut documents = Vec::with_capacity(paths.len());
        let mut unreadable = Vec::new();
        for path in paths {
            match Document::from_path(path) {
                Ok(document) => documents.push(document),
                Err(source) => {
                    let e = SubmissionError::Unreadable {
                        file_name: path.display().to_string(),
                        source,
                    };
                    error!("❌ {}", e);
                    unreadable.push(e);
                }
            }
        }
        self.run_with_skipped(&documents, unreadable, reporter).await
    }

    /// Evaluate `documents` and write the exports
    pub async fn run(
        &mut self,
        documents: &[Document],
        reporter: &dyn BatchReporter,
    ) -> AppResult<RunReport> {
        self.run_with_skipped(documents, Vec::new(), reporter).await
    }

    async fn run_with_skipped(
        &mut self,
        documents: &[Document],
        skipped: Vec<SubmissionError>,
        reporter: &dyn BatchReporter,
    ) -> AppResult<RunReport> {
        log_batch_start(documents.len() + skipped.len());

        let mut summary = run_batch(&mut self.session, &self.flow, documents, reporter).await?;
        summary.total += skipped.len();
        summary.failures.splice(0..0, skipped);

        for failure in &summary.failures {
            self.record_notice(failure);
        }

        // ========== Exports ==========
        // A failed export is a notice like any other; the remaining
        // exports and the CSV are still written.
        let mut names = ExportNames::new();
        let mut evaluation_files = Vec::with_capacity(summary.evaluated.len());
        let mut export_failures = Vec::new();
        for evaluated in &summary.evaluated {
            let name = names.claim(&evaluated.display_name);
            match self
                .exports
                .write_evaluation(&name, evaluated.evaluation.full_evaluation_markdown())
            {
                Ok(path) => evaluation_files.push(path),
                Err(source) => export_failures.push(SubmissionError::Export {
                    file_name: evaluated.file_name.clone(),
                    source,
                }),
            }
        }

        let summary_file = if self.session.table().is_empty() {
            warn!("⚠️ no submission was evaluated, summary CSV not written");
            None
        } else {
            match self.exports.write_summary(self.session.table()) {
                Ok(path) => Some(path),
                Err(source) => {
                    export_failures.push(SubmissionError::Export {
                        file_name: SUMMARY_FILE_NAME.to_string(),
                        source,
                    });
                    None
                }
            }
        };

        for failure in &export_failures {
            warn!("⚠️ {}", failure);
            self.record_notice(failure);
        }

        print_final_stats(
            summary.evaluated.len(),
            summary.failures.len(),
            summary.total,
            &self.config.output_log_file,
        );

        Ok(RunReport {
            summary,
            evaluation_files,
            summary_file,
            export_failures,
        })
    }

    fn record_notice(&self, failure: &SubmissionError) {
        if let Err(e) = self.notices.write(failure) {
            warn!("⚠️ could not record notice: {}", e);
        }
    }
}
