//! Terminal shell: argument parsing and console output around the headless
//! pipeline

pub mod args;
pub mod console;

pub use args::Cli;
pub use console::{print_rubric_preview, print_run_report, ConsoleReporter};
