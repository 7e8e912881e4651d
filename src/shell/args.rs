//! Command-line arguments
//!
//! Parsing only; execution lives in `main`.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{Config, Provider};

/// Rubric grader CLI
#[derive(Parser, Debug)]
#[command(name = "rubric-grader")]
#[command(about = "Grades student submissions against a PDF rubric with a hosted LLM", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Rubric PDF
    #[arg(long)]
    pub rubric: PathBuf,

    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output directory for the exports
    #[arg(long)]
    pub out: Option<String>,

    /// Model provider: gemini or openai
    #[arg(long)]
    pub provider: Option<Provider>,

    /// Model name
    #[arg(long)]
    pub model: Option<String>,

    /// Sampling temperature, within [0, 1]
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Maximum tokens in the reply
    #[arg(long = "max-tokens")]
    pub max_tokens: Option<u32>,

    /// Ask the model for the student's name instead of using the file name
    #[arg(long)]
    pub extract_name: bool,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Submissions (PDF or Word), evaluated in the given order
    #[arg(required = true)]
    pub submissions: Vec<PathBuf>,
}

impl Cli {
    /// Apply command-line overrides on top of `config`
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(out) = &self.out {
            config.output_dir = out.clone();
        }
        if let Some(provider) = self.provider {
            config.provider = provider;
        }
        if let Some(model) = &self.model {
            config.model_name = model.clone();
        }
        if let Some(temperature) = self.temperature {
            config.temperature = temperature;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.max_output_tokens = max_tokens;
        }
        if self.extract_name {
            config.extract_student_name = true;
        }
        if self.verbose {
            config.verbose_logging = true;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_win_over_config() {
        let cli = Cli::parse_from([
            "rubric-grader",
            "--rubric",
            "criterios.pdf",
            "--provider",
            "openai",
            "--temperature",
            "0.1",
            "--max-tokens",
            "900",
            "--extract-name",
            "ana.pdf",
            "luis.docx",
        ]);
        let config = cli.apply(Config::default());

        assert_eq!(config.provider, Provider::OpenAi);
        assert_eq!(config.temperature, 0.1);
        assert_eq!(config.max_output_tokens, 900);
        assert!(config.extract_student_name);
        assert_eq!(config.output_dir, "evaluaciones");
        assert_eq!(cli.submissions.len(), 2);
    }

    #[test]
    fn test_submissions_are_required() {
        assert!(Cli::try_parse_from(["rubric-grader", "--rubric", "criterios.pdf"]).is_err());
    }
}
