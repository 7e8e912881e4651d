//! Console output
//!
//! Progress bar, per-submission notices, previews and the final summary.
//! Notices go through the progress bar so they do not tear its line.

use indicatif::{ProgressBar, ProgressStyle};

use crate::error::SubmissionError;
use crate::models::Rubric;
use crate::orchestrator::{BatchReporter, BatchSummary, RunReport};
use crate::session::SessionTable;
use crate::utils::logging::truncate_text;
use crate::workflow::{EvaluatedSubmission, SubmissionCtx};

/// Width of the feedback column in the summary table
const FEEDBACK_COLUMN_WIDTH: usize = 60;

/// Reporter backed by an `indicatif` progress bar
pub struct ConsoleReporter {
    progress: ProgressBar,
    preview_chars: usize,
}

impl ConsoleReporter {
    pub fn new(preview_chars: usize) -> Self {
        let progress = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} {msg}") {
            progress.set_style(style.progress_chars("█▉▊▋▌▍▎▏ "));
        }
        Self {
            progress,
            preview_chars,
        }
    }
}

impl BatchReporter for ConsoleReporter {
    fn batch_started(&self, total: usize) {
        self.progress.set_length(total as u64);
        self.progress.set_position(0);
    }

    fn submission_started(&self, ctx: &SubmissionCtx) {
        self.progress
            .set_message(format!("Procesando {}/{}: {}", ctx.index, ctx.total, ctx.file_name));
    }

    fn submission_evaluated(&self, ctx: &SubmissionCtx, submission: &EvaluatedSubmission) {
        self.progress.println(format!(
            "✅ {}: evaluado (Total: {})",
            ctx.file_name, submission.evaluation.result.total
        ));
        self.progress.println(preview(
            &format!("Contenido de {}", ctx.file_name),
            &submission.text,
            self.preview_chars,
        ));
        self.progress.inc(1);
    }

    fn submission_failed(&self, ctx: &SubmissionCtx, error: &SubmissionError) {
        self.progress.println(format!("❌ {}", error));
        if let SubmissionError::Evaluation { source, .. } = error {
            if let Some(raw) = source.raw_reply() {
                self.progress
                    .println(format!("   Respuesta recibida de {}:\n{}", ctx.file_name, raw));
            }
        }
        self.progress.inc(1);
    }

    fn batch_finished(&self, summary: &BatchSummary) {
        self.progress.finish_with_message(format!(
            "Completado: {}/{} evaluados",
            summary.evaluated.len(),
            summary.total
        ));
    }
}

/// First `max_chars` characters of `text` under a heading, with the full length
fn preview(title: &str, text: &str, max_chars: usize) -> String {
    format!(
        "── {} ({} caracteres) ──\n{}",
        title,
        text.chars().count(),
        truncate_text(text, max_chars)
    )
}

pub fn print_rubric_preview(rubric: &Rubric, max_chars: usize) {
    println!(
        "{}",
        preview(&format!("Rúbrica {}", rubric.file_name), rubric.text(), max_chars)
    );
}

/// Summary table and export locations
pub fn print_run_report(report: &RunReport, table: &SessionTable) {
    println!();
    if table.is_empty() {
        println!("No se evaluó ningún archivo.");
    } else {
        println!("Resumen de evaluaciones");
        print!("{}", table.render(FEEDBACK_COLUMN_WIDTH));
    }

    for path in &report.evaluation_files {
        println!("📄 {}", path.display());
    }
    if let Some(path) = &report.summary_file {
        println!("📊 {}", path.display());
    }
    if !report.summary.failures.is_empty() {
        println!("⚠️ {} archivo(s) omitido(s)", report.summary.failures.len());
    }
    for failure in &report.export_failures {
        println!("⚠️ {}", failure);
    }
}
