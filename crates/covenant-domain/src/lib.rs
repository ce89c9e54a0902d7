//! Covenant Domain Layer
//!
//! This crate contains the data model for extracted credit agreements and the
//! trait interfaces that the other layers depend upon.
//!
//! ## Key Concepts
//!
//! - **CreditAgreement**: The aggregate root - parties, facilities, dates and
//!   governing law, plus a derived extraction status
//! - **ExtractionStatus**: `Success → Partial → Failure`, a one-way downgrade path
//! - **PartialCreditAgreement**: What a single document section yields during
//!   map-reduce extraction; every field optional
//! - **ExtractionResult**: The envelope returned to callers
//!
//! ## Architecture
//!
//! - Value objects only; invariants are enforced at construction and at
//!   deserialization time
//! - Money and spreads use `rust_decimal::Decimal`, never `f64`
//! - Trait definitions for the extraction capability and the staging store

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod agreement;
pub mod envelope;
pub mod error;
pub mod facility;
pub mod money;
pub mod party;
pub mod provenance;
mod schema;
pub mod terms;
pub mod traits;

// Re-exports for convenience
pub use agreement::{CreditAgreement, ExtractionStatus, PartialCreditAgreement};
pub use envelope::ExtractionResult;
pub use error::{DomainError, EnvelopeError};
pub use facility::LoanFacility;
pub use money::{Currency, Money};
pub use party::Party;
pub use provenance::{StagedSummary, StagingId, StagingProvenance};
pub use terms::{FloatingRateOption, Frequency, InterestRatePayout, PeriodUnit};
