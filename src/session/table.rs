//! Session aggregator
//!
//! Rows are kept in processing order and never deduplicated.

use crate::error::FileError;
use crate::models::{EvaluationField, EvaluationResult, MISSING_FIELD};
use crate::utils::logging::truncate_text;

/// CSV columns, in export order
pub fn csv_columns() -> [EvaluationField; 8] {
    [
        EvaluationField::StudentName,
        EvaluationField::CategoryI,
        EvaluationField::CategoryII,
        EvaluationField::CategoryIII,
        EvaluationField::CategoryIV,
        EvaluationField::CategoryV,
        EvaluationField::Total,
        EvaluationField::ShortFeedback,
    ]
}

/// Results of the current batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionTable {
    rows: Vec<EvaluationResult>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one evaluated submission
    pub fn push(&mut self, result: EvaluationResult) {
        self.rows.push(result);
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[EvaluationResult] {
        &self.rows
    }

    /// Serialise as UTF-8 CSV with a header row.
    ///
    /// Blank cells are written as `N/A`. The output depends only on the rows,
    /// so repeated calls give identical bytes.
    pub fn to_csv(&self) -> Result<Vec<u8>, FileError> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer.write_record(csv_columns().iter().map(|f| f.label()))?;
        for row in &self.rows {
            writer.write_record(csv_columns().iter().map(|f| cell(row, *f)))?;
        }

        writer.into_inner().map_err(|e| FileError::CsvFailed {
            source: csv::Error::from(e.into_error()),
        })
    }

    /// Plain-text table for the console
    pub fn render(&self, feedback_width: usize) -> String {
        let headers: Vec<String> = ["Nombre", "I", "II", "III", "IV", "V", "Total", "Retroalimentación"]
            .iter()
            .map(|h| h.to_string())
            .collect();

        let rows: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                csv_columns()
                    .iter()
                    .map(|f| match f {
                        EvaluationField::ShortFeedback => truncate_text(cell(row, *f), feedback_width),
                        _ => cell(row, *f).to_string(),
                    })
                    .map(|c| c.replace(['\n', '\r'], " "))
                    .collect()
            })
            .collect();

        let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
        for row in &rows {
            for (i, c) in row.iter().enumerate() {
                widths[i] = widths[i].max(c.chars().count());
            }
        }

        let mut out = String::new();
        out.push_str(&format_line(&headers, &widths));
        let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
        out.push_str(&format_line(&rule, &widths));
        for row in &rows {
            out.push_str(&format_line(row, &widths));
        }
        out
    }
}

fn cell(row: &EvaluationResult, field: EvaluationField) -> &str {
    let value = row.get(field);
    if value.trim().is_empty() {
        MISSING_FIELD
    } else {
        value
    }
}

fn format_line(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(c, w)| format!("{}{}", c, " ".repeat(w.saturating_sub(c.chars().count()))))
        .collect();
    format!("{}\n", padded.join(" │ ").trim_end())
}
