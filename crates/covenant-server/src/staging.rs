//! In-memory staging of finished extractions.
//!
//! Holds successful and partial extractions with their provenance until a
//! reviewer picks them up. Contents are lost on restart.

use covenant_domain::traits::AgreementStager;
use covenant_domain::{CreditAgreement, StagedSummary, StagingId, StagingProvenance};
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Staging error
#[derive(Debug, Error)]
pub enum StagingError {
    /// A writer panicked while holding the lock
    #[error("Staging store lock poisoned")]
    LockPoisoned,

    /// Only agreements that carry data may be staged
    #[error("Cannot stage an agreement with status {0}")]
    NotStageable(covenant_domain::ExtractionStatus),
}

#[derive(Debug, Clone)]
struct StagedEntry {
    id: StagingId,
    agreement: CreditAgreement,
    provenance: StagingProvenance,
}

impl StagedEntry {
    fn summary(&self) -> StagedSummary {
        StagedSummary {
            id: self.id,
            filename: self.provenance.filename.clone(),
            status: self.agreement.extraction_status,
            facility_count: self.agreement.facilities.len(),
            staged_at: self.provenance.staged_at,
        }
    }
}

/// Staging store backed by a vector behind a lock
#[derive(Debug, Default)]
pub struct InMemoryStager {
    entries: Arc<RwLock<Vec<StagedEntry>>>,
}

impl InMemoryStager {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of staged extractions
    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Whether nothing has been staged
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Source text of a staged extraction
    pub fn source_text(&self, id: StagingId) -> Result<Option<String>, StagingError> {
        let entries = self.entries.read().map_err(|_| StagingError::LockPoisoned)?;
        Ok(entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.provenance.source_text.clone()))
    }
}

impl AgreementStager for InMemoryStager {
    type Error = StagingError;

    fn stage(
        &self,
        agreement: &CreditAgreement,
        provenance: StagingProvenance,
    ) -> Result<StagingId, Self::Error> {
        if !agreement.extraction_status.carries_agreement() {
            return Err(StagingError::NotStageable(agreement.extraction_status));
        }

        let id = StagingId::new();
        let mut entries = self.entries.write().map_err(|_| StagingError::LockPoisoned)?;
        entries.push(StagedEntry {
            id,
            agreement: agreement.clone(),
            provenance,
        });
        Ok(id)
    }

    fn list(&self) -> Result<Vec<StagedSummary>, Self::Error> {
        let entries = self.entries.read().map_err(|_| StagingError::LockPoisoned)?;
        Ok(entries.iter().map(StagedEntry::summary).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use covenant_domain::{ExtractionStatus, Party};

    fn partial_agreement() -> CreditAgreement {
        CreditAgreement::new(
            None,
            vec![Party::new("lender_1", "FIRST LENDER LLC", "Lender")],
            Vec::new(),
            None,
        )
        .with_status(ExtractionStatus::Partial)
    }

    #[test]
    fn test_stage_and_list() {
        let stager = InMemoryStager::new();
        assert!(stager.is_empty());

        let first = stager
            .stage(
                &partial_agreement(),
                StagingProvenance::new("text one", Some("one.txt".to_string())),
            )
            .unwrap();
        let second = stager
            .stage(&partial_agreement(), StagingProvenance::new("text two", None))
            .unwrap();

        let listed = stager.list().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, first);
        assert_eq!(listed[0].filename.as_deref(), Some("one.txt"));
        assert_eq!(listed[0].status, ExtractionStatus::Partial);
        assert_eq!(listed[1].id, second);
        assert!(listed[1].filename.is_none());
    }

    #[test]
    fn test_source_text_is_kept() {
        let stager = InMemoryStager::new();
        let id = stager
            .stage(&partial_agreement(), StagingProvenance::new("full source", None))
            .unwrap();

        assert_eq!(stager.source_text(id).unwrap().as_deref(), Some("full source"));
        assert_eq!(stager.source_text(StagingId::new()).unwrap(), None);
    }

    #[test]
    fn test_irrelevant_agreement_not_staged() {
        let stager = InMemoryStager::new();
        let result = stager.stage(
            &CreditAgreement::irrelevant(),
            StagingProvenance::new("recipe for soup", None),
        );

        assert!(matches!(
            result,
            Err(StagingError::NotStageable(ExtractionStatus::Failure))
        ));
        assert_eq!(stager.len(), 0);
    }
}
