//! Batch progress hooks
//!
//! The pipeline itself is headless; whoever drives it (the terminal shell,
//! a test) observes progress through this trait.

use crate::error::SubmissionError;
use crate::orchestrator::batch_processor::BatchSummary;
use crate::workflow::{EvaluatedSubmission, SubmissionCtx};

/// Progress observer; every hook defaults to a no-op
pub trait BatchReporter {
    fn batch_started(&self, _total: usize) {}

    fn submission_started(&self, _ctx: &SubmissionCtx) {}

    fn submission_evaluated(&self, _ctx: &SubmissionCtx, _submission: &EvaluatedSubmission) {}

    /// Called once per skipped submission, before the next one starts
    fn submission_failed(&self, _ctx: &SubmissionCtx, _error: &SubmissionError) {}

    fn batch_finished(&self, _summary: &BatchSummary) {}
}

/// Reporter that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl BatchReporter for SilentReporter {}
