//! Submission context
//!
//! Which submission of the batch is being processed.

use std::fmt::Display;

/// Submission context
#[derive(Debug, Clone)]
pub struct SubmissionCtx {
    /// Position in the batch, starting at 1
    pub index: usize,

    /// Batch size
    pub total: usize,

    /// Uploaded file name
    pub file_name: String,

    /// File name without extension; the default student name
    pub display_name: String,
}

impl SubmissionCtx {
    pub fn new(index: usize, total: usize, file_name: String, display_name: String) -> Self {
        Self {
            index,
            total,
            file_name,
            display_name,
        }
    }
}

impl Display for SubmissionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}/{} {}]", self.index, self.total, self.file_name)
    }
}
