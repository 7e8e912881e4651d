//! Logging helpers
//!
//! Subscriber setup, the run log header and the startup/summary banners.

use anyhow::Result;
use std::fs;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Install the global subscriber.
///
/// `RUST_LOG` wins; otherwise `info` (or `debug` when verbose) for this crate.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,rubric_grader={}", default_level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Start the run log with a timestamped header
///
/// # Parameters
/// - `log_file_path`: run log path, truncated if it exists
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\nRegistro de evaluación - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// Log the effective configuration
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 rubric grader starting");
    info!(
        "🤖 model: {} ({:?}), temperature {}, max tokens {}",
        config.model_name, config.provider, config.temperature, config.max_output_tokens
    );
    info!("📂 output directory: {}", config.output_dir);
    info!("{}", "=".repeat(60));
}

/// Log the batch size
pub fn log_batch_start(total: usize) {
    info!("📦 {} submission(s) to evaluate, one at a time", total);
}

/// Log the final counts
///
/// # Parameters
/// - `evaluated`: submissions that produced a row
/// - `failed`: submissions that were skipped
/// - `total`: submissions in the batch
pub fn print_final_stats(evaluated: usize, failed: usize, total: usize, log_file_path: &str) {
    info!("{}", "=".repeat(60));
    info!(
        "📊 batch finished at {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("✅ evaluated: {}/{}", evaluated, total);
    info!("❌ failed: {}", failed);
    info!("{}", "=".repeat(60));
    info!("run log: {}", log_file_path);
}

/// Truncate long text for display
///
/// # Returns
/// The first `max_len` characters followed by `...`, or the text unchanged
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("áéíóú", 3), "áéí...");
        assert_eq!(truncate_text("corto", 10), "corto");
        assert_eq!(truncate_text("", 0), "");
    }

    #[test]
    fn test_init_log_file_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.txt");
        init_log_file(&path.to_string_lossy()).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(&"=".repeat(60)));
        assert!(content.contains("Registro de evaluación - "));
    }
}
