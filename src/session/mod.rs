//! Session state: the loaded rubric and the results table

pub mod grading_session;
pub mod table;

pub use grading_session::GradingSession;
pub use table::{csv_columns, SessionTable};
