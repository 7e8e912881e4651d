//! Error taxonomy
//!
//! Errors are grouped by concern. Everything below `SubmissionError` is
//! caught at the per-submission boundary and reported as a notice; only
//! `RubricError` and `ConfigError` stop the program.

use thiserror::Error;

/// Top-level application error
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    /// The rubric could not be loaded
    #[error("rubric error: {0}")]
    Rubric(#[from] RubricError),
    /// A single submission failed
    #[error("submission error: {0}")]
    Submission(#[from] SubmissionError),
    /// Export or log file error
    #[error("file error: {0}")]
    File(#[from] FileError),
}

/// Text extraction errors
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The PDF could not be parsed
    #[error("unreadable PDF: {source}")]
    Pdf {
        #[source]
        source: lopdf::Error,
    },
    /// The Word document could not be parsed
    #[error("unreadable Word document: {message}")]
    Word { message: String },
    /// The scratch file could not be written
    #[error("could not stage document on disk: {source}")]
    Scratch {
        #[source]
        source: std::io::Error,
    },
}

/// Remote evaluation errors
#[derive(Debug, Error)]
pub enum EvaluationError {
    /// Transport, authentication or HTTP failure
    #[error("model API call failed ({model}): {message}")]
    ApiCall { model: String, message: String },
    /// The reply is not a JSON object; `raw` keeps the reply verbatim
    #[error("model reply is not valid JSON: {reason}")]
    MalformedResponse { raw: String, reason: String },
    /// The reply is empty or was blocked
    #[error("model returned an empty reply ({model}){}", fmt_reason(.reason))]
    EmptyResponse {
        model: String,
        reason: Option<String>,
    },
}

fn fmt_reason(reason: &Option<String>) -> String {
    match reason {
        Some(reason) => format!(", reason: {}", reason),
        None => String::new(),
    }
}

impl EvaluationError {
    /// Raw model reply, when one was received
    pub fn raw_reply(&self) -> Option<&str> {
        match self {
            EvaluationError::MalformedResponse { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

/// Per-submission failure, converted into a visible notice
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// Corrupt or unreadable document
    #[error("could not process {file_name}: {source}")]
    Extraction {
        file_name: String,
        #[source]
        source: ExtractionError,
    },
    /// Declared type is neither PDF nor Word
    #[error("could not process {file_name}: unsupported type {mime_type}")]
    UnsupportedKind {
        file_name: String,
        mime_type: String,
    },
    /// The remote evaluation failed
    #[error("could not evaluate {file_name}: {source}")]
    Evaluation {
        file_name: String,
        #[source]
        source: EvaluationError,
    },
    /// The file could not be read from disk
    #[error("could not read {file_name}: {source}")]
    Unreadable {
        file_name: String,
        #[source]
        source: std::io::Error,
    },
    /// An export file could not be written
    #[error("could not export {file_name}: {source}")]
    Export {
        file_name: String,
        #[source]
        source: FileError,
    },
}

impl SubmissionError {
    pub fn file_name(&self) -> &str {
        match self {
            SubmissionError::Extraction { file_name, .. }
            | SubmissionError::UnsupportedKind { file_name, .. }
            | SubmissionError::Evaluation { file_name, .. }
            | SubmissionError::Unreadable { file_name, .. }
            | SubmissionError::Export { file_name, .. } => file_name,
        }
    }

    /// Short machine-friendly label used in the run log
    pub fn kind(&self) -> &'static str {
        match self {
            SubmissionError::Extraction { .. } => "extraction",
            SubmissionError::UnsupportedKind { .. } => "unsupported-kind",
            SubmissionError::Evaluation { source, .. } => match source {
                EvaluationError::ApiCall { .. } => "api-call",
                EvaluationError::MalformedResponse { .. } => "malformed-response",
                EvaluationError::EmptyResponse { .. } => "empty-response",
            },
            SubmissionError::Unreadable { .. } => "unreadable",
            SubmissionError::Export { .. } => "export",
        }
    }
}

/// Rubric loading errors; these block the batch
#[derive(Debug, Error)]
pub enum RubricError {
    /// No rubric has been loaded in this session
    #[error("no rubric loaded; load a rubric PDF before evaluating submissions")]
    NotLoaded,
    /// Rubrics must be PDF documents
    #[error("rubric {file_name} must be a PDF (declared type: {mime_type})")]
    NotPdf {
        file_name: String,
        mime_type: String,
    },
    /// The rubric PDF could not be read
    #[error("rubric {file_name} could not be read: {source}")]
    Unreadable {
        file_name: String,
        #[source]
        source: ExtractionError,
    },
    /// The rubric has no extractable text
    #[error("rubric {file_name} contains no extractable text")]
    Empty { file_name: String },
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable could not be parsed
    #[error("environment variable {var_name} has invalid value '{value}', expected {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// Config file could not be read
    #[error("could not read config file {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// Config file is not valid TOML
    #[error("could not parse config file {path}: {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// A value is out of its allowed range
    #[error("invalid {field}: {message}")]
    InvalidValue { field: String, message: String },
    /// No API key was supplied
    #[error("missing API key; set GEMINI_API_KEY or GRADER_API_KEY")]
    MissingApiKey,
}

/// Export and log file errors
#[derive(Debug, Error)]
pub enum FileError {
    /// Writing a file failed
    #[error("could not write {path}: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// Serialising the CSV summary failed
    #[error("could not serialise CSV summary: {source}")]
    CsvFailed {
        #[source]
        source: csv::Error,
    },
}

impl AppError {
    /// Create a file write error
    pub fn write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }

    /// Create an invalid config value error
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Config(ConfigError::InvalidValue {
            field: field.into(),
            message: message.into(),
        })
    }
}

impl From<csv::Error> for FileError {
    fn from(source: csv::Error) -> Self {
        FileError::CsvFailed { source }
    }
}

/// Application result type
pub type AppResult<T> = Result<T, AppError>;
