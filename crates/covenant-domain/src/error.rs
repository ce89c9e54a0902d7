//! Domain error types

use crate::ExtractionStatus;
use rust_decimal::Decimal;
use thiserror::Error;

/// Violations of value-object invariants
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Frequency multiplier must be strictly positive
    #[error("period_multiplier must be greater than 0 (got {0})")]
    InvalidPeriodMultiplier(i64),

    /// Spread outside the accepted basis-point range
    #[error("spread_bps must be between -10000 and 10000 basis points (got {0})")]
    SpreadOutOfRange(Decimal),
}

/// Inconsistent extraction envelope
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnvelopeError {
    /// A non-failure status was reported without an agreement attached
    #[error("status '{0}' requires an agreement, but none was attached")]
    MissingAgreement(ExtractionStatus),
}
