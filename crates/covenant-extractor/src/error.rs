//! Error types for the Extractor

use covenant_gatekeeper::RejectionReason;
use thiserror::Error;

/// A correctable problem with a proposed agreement
///
/// Single-pass extraction feeds these back to the capability and retries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationFault {
    /// The response is JSON but does not fit the agreement schema
    #[error("Schema validation failed: {0}")]
    Schema(String),

    /// The agreement was rejected by the Gatekeeper
    #[error("{0}")]
    Rejected(#[from] RejectionReason),
}

/// Errors that can occur during extraction
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// The document text is empty or blank
    #[error("Document text is empty")]
    EmptyDocument,

    /// Transport, authentication or malformed-response failure of the capability
    #[error("Extraction capability error: {0}")]
    Capability(String),

    /// A capability call exceeded the configured timeout
    #[error("Extraction timed out after {0}s")]
    Timeout(u64),

    /// The extracted agreement is invalid
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationFault),

    /// Every attempt produced an invalid agreement
    #[error("Extracted data failed validation after {attempts} attempts: {last_error}")]
    ExhaustedRetries {
        /// Attempts made
        attempts: u32,
        /// Fault reported by the final attempt
        last_error: ValidationFault,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ExtractorError {
    /// Whether the error is caused by the document or the extracted data,
    /// rather than by infrastructure
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ExtractorError::EmptyDocument
                | ExtractorError::Validation(_)
                | ExtractorError::ExhaustedRetries { .. }
        )
    }
}
