//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the extraction pipeline and
//! infrastructure. Implementations live in other crates.

use crate::{CreditAgreement, StagedSummary, StagingId, StagingProvenance};
use async_trait::async_trait;

/// Trait for the external extraction capability
///
/// Implemented by the infrastructure layer (covenant-llm). Each call is an
/// independent request/response; implementors hold no per-request state.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Error type for provider operations (transport, auth, malformed reply)
    type Error: std::fmt::Display + Send + Sync + 'static;

    /// Generate a free-text completion
    async fn generate(&self, prompt: &str) -> Result<String, Self::Error>;

    /// Generate output constrained to the given JSON Schema description
    async fn generate_structured(&self, prompt: &str, schema: &str) -> Result<String, Self::Error>;
}

/// Trait for staging finished extractions for later review
///
/// Fed by the pipeline's callers; the pipeline itself never reads from it.
pub trait AgreementStager: Send + Sync {
    /// Error type for staging operations
    type Error;

    /// Stage an agreement together with its provenance
    fn stage(
        &self,
        agreement: &CreditAgreement,
        provenance: StagingProvenance,
    ) -> Result<StagingId, Self::Error>;

    /// List staged extractions in staging order
    fn list(&self) -> Result<Vec<StagedSummary>, Self::Error>;
}
