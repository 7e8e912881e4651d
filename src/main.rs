use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use rubric_grader::models::Document;
use rubric_grader::orchestrator::App;
use rubric_grader::services::backend_for;
use rubric_grader::shell::{print_rubric_preview, print_run_report, Cli, ConsoleReporter};
use rubric_grader::utils::logging;
use rubric_grader::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration: defaults / file → env → command line
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let config = cli.apply(config.with_env()?);

    // Initialise logging
    logging::init(config.verbose_logging);
    config.validate()?;
    logging::init_log_file(&config.output_log_file)
        .with_context(|| format!("cannot create run log {}", config.output_log_file))?;
    logging::log_startup(&config);

    let preview_chars = config.preview_chars;
    let model = backend_for(&config);
    let mut app = App::new(config, model);

    // Rubric first; nothing runs without it
    let rubric_doc = read_document(&cli.rubric)?;
    let rubric = app.load_rubric(&rubric_doc)?;
    print_rubric_preview(rubric, preview_chars);

    // Unreadable submissions are reported as skipped, not fatal
    let reporter = ConsoleReporter::new(preview_chars);
    let report = app.run_files(&cli.submissions, &reporter).await?;
    print_run_report(&report, app.session().table());

    info!("done");
    Ok(())
}

fn read_document(path: &Path) -> Result<Document> {
    Document::from_path(path).with_context(|| format!("cannot read {}", path.display()))
}
