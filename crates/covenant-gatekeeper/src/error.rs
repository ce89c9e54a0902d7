//! Gatekeeper rejection reasons

use chrono::NaiveDate;
use covenant_domain::Currency;
use thiserror::Error;

/// Reasons an agreement is rejected outright
///
/// Every variant describes internally inconsistent data. Incomplete data is
/// never a rejection; it downgrades the status instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    /// Agreement date lies after the evaluation date
    #[error("agreement_date ({agreement_date}) cannot be in the future (today: {today})")]
    FutureAgreementDate {
        /// Extracted agreement date
        agreement_date: NaiveDate,
        /// Evaluation date
        today: NaiveDate,
    },

    /// A facility matures on or before the agreement date
    #[error(
        "maturity_date ({maturity_date}) must be after agreement_date ({agreement_date}) \
         for facility '{facility}'"
    )]
    MaturityNotAfterAgreement {
        /// Facility name
        facility: String,
        /// Facility maturity
        maturity_date: NaiveDate,
        /// Agreement date
        agreement_date: NaiveDate,
    },

    /// Facilities are denominated in different currencies
    #[error(
        "Currency mismatch: facility '{facility}' uses {found}, expected {expected}. \
         All facilities must use the same currency."
    )]
    CurrencyMismatch {
        /// Offending facility name
        facility: String,
        /// Currency of the first facility
        expected: Currency,
        /// Currency of the offending facility
        found: Currency,
    },
}

impl RejectionReason {
    /// Whether this is a temporal or currency inconsistency
    ///
    /// These must always surface as a rejection, never as a partial result.
    pub fn is_consistency_fault(&self) -> bool {
        matches!(
            self,
            RejectionReason::FutureAgreementDate { .. }
                | RejectionReason::MaturityNotAfterAgreement { .. }
                | RejectionReason::CurrencyMismatch { .. }
        )
    }
}
