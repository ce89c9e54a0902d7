//! Loan facilities

use crate::{InterestRatePayout, Money};
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single credit line within an agreement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LoanFacility {
    /// Facility name, e.g. "Term Loan B"
    pub facility_name: String,

    /// Total commitment
    pub commitment_amount: Money,

    /// Interest structure
    pub interest_terms: InterestRatePayout,

    /// Date the facility must be repaid
    pub maturity_date: NaiveDate,
}

impl LoanFacility {
    /// Key used to recognise the same facility across document sections
    pub fn dedup_key(&self) -> String {
        self.facility_name.trim().to_lowercase()
    }
}
