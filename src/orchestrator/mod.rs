//! Orchestration layer
//!
//! ## Modules
//!
//! ### `batch_processor`
//! - owns the `GradingSession` and the export/notice writers
//! - runs a batch sequentially, one `SubmissionFlow` per document
//! - turns per-submission failures into notices
//!
//! ### `reporter`
//! - `BatchReporter` hooks for whoever drives the batch
//!
//! ## Layering
//!
//! ```text
//! batch_processor (Vec<Document>)
//!     ↓
//! workflow::SubmissionFlow (one Document)
//!     ↓
//! services (extract / prompt / evaluate / export)
//!     ↓
//! infrastructure (ScratchFile)
//! ```

pub mod batch_processor;
pub mod reporter;

pub use batch_processor::{run_batch, App, BatchSummary, RunReport};
pub use reporter::{BatchReporter, SilentReporter};
