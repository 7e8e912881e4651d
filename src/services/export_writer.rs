//! Export writer - service layer
//!
//! Writes the per-submission evaluation text files and the batch CSV.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::FileError;
use crate::session::SessionTable;

/// File name of the batch summary
pub const SUMMARY_FILE_NAME: &str = "resumen_evaluaciones_gemini.csv";

/// File name of the text export for `display_name`
pub fn evaluation_file_name(display_name: &str) -> String {
    format!("Evaluacion_{}.txt", display_name)
}

/// Export names handed out within one batch
///
/// Two submissions with the same stem (`ana.pdf`, `ana.docx`) would otherwise
/// write the same file. Later claims get `_2`, `_3`, ... appended.
#[derive(Debug, Default)]
pub struct ExportNames {
    taken: HashSet<String>,
}

impl ExportNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve an export name for `display_name`
    ///
    /// # Returns
    /// `display_name` itself the first time, then `display_name_2`,
    /// `display_name_3`, ... Names compare case-insensitively.
    pub fn claim(&mut self, display_name: &str) -> String {
        let mut name = display_name.to_string();
        let mut n = 1;
        // case-insensitive file systems treat `Ana` and `ana` as one file
        while !self.taken.insert(name.to_lowercase()) {
            n += 1;
            name = format!("{}_{}", display_name, n);
        }
        name
    }
}

/// Export writer
pub struct ExportWriter {
    output_dir: PathBuf,
}

impl ExportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write `markdown` byte-for-byte to `Evaluacion_<display_name>.txt`
    pub fn write_evaluation(&self, display_name: &str, markdown: &str) -> Result<PathBuf, FileError> {
        let path = self.output_dir.join(evaluation_file_name(display_name));
        self.write(&path, markdown.as_bytes())?;
        Ok(path)
    }

    /// Write the CSV summary of `table`
    pub fn write_summary(&self, table: &SessionTable) -> Result<PathBuf, FileError> {
        let csv = table.to_csv()?;
        let path = self.output_dir.join(SUMMARY_FILE_NAME);
        self.write(&path, &csv)?;
        Ok(path)
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), FileError> {
        std::fs::create_dir_all(&self.output_dir).map_err(|source| FileError::WriteFailed {
            path: self.output_dir.display().to_string(),
            source,
        })?;
        std::fs::write(path, bytes).map_err(|source| FileError::WriteFailed {
            path: path.display().to_string(),
            source,
        })?;
        debug!("wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }
}
