//! Notice writer - service layer
//!
//! Appends one line per failed submission to the run log.

use std::fs::OpenOptions;
use std::io::Write;

use tracing::debug;

use crate::error::{AppError, AppResult, SubmissionError};

/// Notice writer
pub struct NoticeWriter {
    log_file_path: String,
}

impl NoticeWriter {
    pub fn new(log_file_path: impl Into<String>) -> Self {
        Self {
            log_file_path: log_file_path.into(),
        }
    }

    /// Append the notice for `error`; a malformed reply is logged in full
    pub fn write(&self, error: &SubmissionError) -> AppResult<()> {
        debug!("writing notice for {}", error.file_name());

        let mut line = format!(
            "[{}] {} | {} | {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            error.file_name(),
            error.kind(),
            error
        );
        if let SubmissionError::Evaluation { source, .. } = error {
            if let Some(raw) = source.raw_reply() {
                line.push_str(&format!("    raw reply: {}\n", raw));
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file_path)
            .map_err(|e| AppError::write_failed(&self.log_file_path, e))?;
        file.write_all(line.as_bytes())
            .map_err(|e| AppError::write_failed(&self.log_file_path, e))?;

        Ok(())
    }
}
