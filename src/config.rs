//! Program configuration
//!
//! Precedence: defaults → TOML file → environment → command line.

use std::path::Path;

use serde::Deserialize;

use crate::error::{AppResult, ConfigError};

/// Remote model provider
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Native Gemini `generateContent` API
    #[default]
    Gemini,
    /// Any OpenAI-compatible chat completions gateway
    OpenAi,
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(Provider::Gemini),
            "openai" => Ok(Provider::OpenAi),
            other => Err(format!("unknown provider '{}'", other)),
        }
    }
}

/// Program configuration
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- model service ---
    pub provider: Provider,
    pub api_key: String,
    pub api_base_url: String,
    pub model_name: String,
    /// Sampling temperature, within [0, 1]
    pub temperature: f32,
    /// Hard cap on generated tokens
    pub max_output_tokens: u32,
    // --- evaluation ---
    /// Ask the model for the student's name as a ninth schema field
    pub extract_student_name: bool,
    /// Length target for the short feedback, used in the prompt and in warnings
    pub short_feedback_limit: usize,
    // --- output ---
    /// Directory receiving the text and CSV exports
    pub output_dir: String,
    /// Run log file
    pub output_log_file: String,
    /// Characters of submission text shown in previews
    pub preview_chars: usize,
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: Provider::Gemini,
            api_key: String::new(),
            api_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model_name: "gemini-1.5-flash".to_string(),
            temperature: 0.5,
            max_output_tokens: 1500,
            extract_student_name: false,
            short_feedback_limit: 200,
            output_dir: "evaluaciones".to_string(),
            output_log_file: "output.txt".to_string(),
            preview_chars: 5000,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// Load a TOML config file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.display().to_string(),
            source,
        })?;
        Ok(config)
    }

    /// Defaults overridden by environment variables
    pub fn from_env() -> AppResult<Self> {
        Self::default().with_env()
    }

    /// Override fields from environment variables
    pub fn with_env(self) -> AppResult<Self> {
        self.with_vars(|name| std::env::var(name).ok())
    }

    fn with_vars(mut self, var: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        if let Some(key) = var("GRADER_API_KEY").or_else(|| var("GEMINI_API_KEY")) {
            self.api_key = key;
        }
        if let Some(v) = var("GRADER_PROVIDER") {
            self.provider = parse_var("GRADER_PROVIDER", &v, "gemini|openai")?;
        }
        if let Some(v) = var("GRADER_API_BASE_URL") {
            self.api_base_url = v;
        }
        if let Some(v) = var("GRADER_MODEL_NAME") {
            self.model_name = v;
        }
        if let Some(v) = var("GRADER_TEMPERATURE") {
            self.temperature = parse_var("GRADER_TEMPERATURE", &v, "f32")?;
        }
        if let Some(v) = var("GRADER_MAX_OUTPUT_TOKENS") {
            self.max_output_tokens = parse_var("GRADER_MAX_OUTPUT_TOKENS", &v, "u32")?;
        }
        if let Some(v) = var("GRADER_OUTPUT_DIR") {
            self.output_dir = v;
        }
        if let Some(v) = var("GRADER_LOG_FILE") {
            self.output_log_file = v;
        }
        if let Some(v) = var("GRADER_VERBOSE") {
            self.verbose_logging = parse_var("GRADER_VERBOSE", &v, "bool")?;
        }
        Ok(self)
    }

    /// Check ranges and the credential
    pub fn validate(&self) -> AppResult<()> {
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(crate::AppError::invalid_config(
                "temperature",
                format!("{} is outside [0, 1]", self.temperature),
            ));
        }
        if self.max_output_tokens == 0 {
            return Err(crate::AppError::invalid_config(
                "max_output_tokens",
                "must be at least 1",
            ));
        }
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey.into());
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(var_name: &str, value: &str, expected_type: &str) -> AppResult<T> {
    value.trim().parse().map_err(|_| {
        ConfigError::EnvVarParseFailed {
            var_name: var_name.to_string(),
            value: value.to_string(),
            expected_type: expected_type.to_string(),
        }
        .into()
    })
}
