//! Grading session context
//!
//! Created empty, gains a rubric, then runs any number of batches. Each batch
//! starts from an empty table. Dropping the session discards everything.

use tracing::{info, warn};

use crate::error::RubricError;
use crate::models::{Document, DocumentKind, Rubric};
use crate::services::TextExtractor;
use crate::session::SessionTable;

/// Grading session
#[derive(Debug, Default)]
pub struct GradingSession {
    rubric: Option<Rubric>,
    table: SessionTable,
}

impl GradingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load (or replace) the rubric.
    ///
    /// On failure the previous rubric is dropped too, so no batch can run
    /// until a valid rubric is supplied.
    pub fn load_rubric(
        &mut self,
        extractor: &TextExtractor,
        document: &Document,
    ) -> Result<&Rubric, RubricError> {
        self.rubric = None;

        if document.kind() != Some(DocumentKind::Pdf) {
            return Err(RubricError::NotPdf {
                file_name: document.file_name.clone(),
                mime_type: document.mime_type.clone(),
            });
        }

        let text = extractor
            .extract(document)
            .map_err(|source| RubricError::Unreadable {
                file_name: document.file_name.clone(),
                source,
            })?
            .unwrap_or_default();

        if text.trim().is_empty() {
            warn!("⚠️ rubric {} has no extractable text", document.file_name);
            return Err(RubricError::Empty {
                file_name: document.file_name.clone(),
            });
        }

        info!(
            "✓ rubric loaded: {} ({} characters)",
            document.file_name,
            text.chars().count()
        );
        Ok(&*self.rubric.insert(Rubric::new(document.file_name.clone(), text)))
    }

    pub fn rubric(&self) -> Result<&Rubric, RubricError> {
        self.rubric.as_ref().ok_or(RubricError::NotLoaded)
    }

    /// Clear the table for a new batch
    pub fn begin_batch(&mut self) {
        self.table.clear();
    }

    /// Rubric and table borrowed together for a batch run
    pub fn batch_parts(&mut self) -> Result<(&Rubric, &mut SessionTable), RubricError> {
        match self.rubric.as_ref() {
            Some(rubric) => Ok((rubric, &mut self.table)),
            None => Err(RubricError::NotLoaded),
        }
    }

    pub fn table(&self) -> &SessionTable {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PDF_MIME;

    #[test]
    fn test_new_session_has_no_rubric() {
        let mut session = GradingSession::new();
        assert!(matches!(session.rubric(), Err(RubricError::NotLoaded)));
        assert!(session.batch_parts().is_err());
        assert!(session.table().is_empty());
    }

    #[test]
    fn test_rubric_must_be_pdf() {
        let mut session = GradingSession::new();
        let doc = Document::new("criterios.docx", crate::models::DOCX_MIME, vec![]);
        assert!(matches!(
            session.load_rubric(&TextExtractor::new(), &doc),
            Err(RubricError::NotPdf { .. })
        ));
    }

    #[test]
    fn test_unreadable_rubric_blocks_and_drops_previous() {
        let mut session = GradingSession::new();
        session.rubric = Some(Rubric::new("viejo.pdf", "criterios viejos"));

        let doc = Document::new("criterios.pdf", PDF_MIME, b"garbage".to_vec());
        assert!(matches!(
            session.load_rubric(&TextExtractor::new(), &doc),
            Err(RubricError::Unreadable { .. })
        ));
        assert!(matches!(session.rubric(), Err(RubricError::NotLoaded)));
    }

    #[test]
    fn test_begin_batch_clears_rows() {
        let mut session = GradingSession::new();
        session.rubric = Some(Rubric::new("criterios.pdf", "claridad"));
        let (_, table) = session.batch_parts().unwrap();
        table.push(crate::models::EvaluationResult::with_sentinels("ana"));
        assert_eq!(session.table().len(), 1);
        session.begin_batch();
        assert!(session.table().is_empty());
    }
}
