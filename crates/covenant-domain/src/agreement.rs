//! Credit agreement aggregate and extraction status

use crate::{LoanFacility, Party};
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Completeness classification of an extraction
///
/// Variants are ordered by severity. Status only ever moves towards
/// `Failure`; see [`ExtractionStatus::downgrade_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
pub enum ExtractionStatus {
    /// A complete, consistent credit agreement
    #[serde(rename = "success")]
    Success,

    /// Consistent, but some information is absent
    #[serde(rename = "partial_data_missing")]
    Partial,

    /// Not a credit agreement, or nothing usable could be found
    #[serde(rename = "irrelevant_document")]
    Failure,
}

impl ExtractionStatus {
    /// Wire name of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionStatus::Success => "success",
            ExtractionStatus::Partial => "partial_data_missing",
            ExtractionStatus::Failure => "irrelevant_document",
        }
    }

    /// Move to `target` if it is more severe; never upgrades
    pub fn downgrade_to(self, target: ExtractionStatus) -> ExtractionStatus {
        self.max(target)
    }

    /// Whether an agreement accompanies this status
    pub fn carries_agreement(&self) -> bool {
        !matches!(self, ExtractionStatus::Failure)
    }
}

impl Default for ExtractionStatus {
    fn default() -> Self {
        ExtractionStatus::Success
    }
}

impl fmt::Display for ExtractionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key economic terms of a syndicated credit agreement
///
/// `extraction_status` is derived by the validation cascade; a freshly
/// deserialized agreement carries whatever status the extraction engine
/// proposed (default `Success`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CreditAgreement {
    /// Derived completeness status
    #[serde(default)]
    pub extraction_status: ExtractionStatus,

    /// Execution date of the agreement
    #[serde(default)]
    pub agreement_date: Option<NaiveDate>,

    /// Parties to the agreement
    #[serde(default, deserialize_with = "null_as_empty")]
    pub parties: Vec<Party>,

    /// Loan facilities defined by the agreement
    #[serde(default, deserialize_with = "null_as_empty")]
    pub facilities: Vec<LoanFacility>,

    /// Governing jurisdiction, e.g. "State of New York"
    #[serde(default)]
    pub governing_law: Option<String>,
}

impl CreditAgreement {
    /// Create an agreement with the default `Success` status
    pub fn new(
        agreement_date: Option<NaiveDate>,
        parties: Vec<Party>,
        facilities: Vec<LoanFacility>,
        governing_law: Option<String>,
    ) -> Self {
        Self {
            extraction_status: ExtractionStatus::Success,
            agreement_date,
            parties,
            facilities,
            governing_law,
        }
    }

    /// An agreement marking the document as irrelevant
    pub fn irrelevant() -> Self {
        Self {
            extraction_status: ExtractionStatus::Failure,
            ..Self::new(None, Vec::new(), Vec::new(), None)
        }
    }

    /// Replace the status
    pub fn with_status(mut self, status: ExtractionStatus) -> Self {
        self.extraction_status = status;
        self
    }

    /// Names of the core fields that are absent or empty
    pub fn missing_core_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.agreement_date.is_none() {
            missing.push("agreement_date");
        }
        if self.parties.is_empty() {
            missing.push("parties");
        }
        if self.facilities.is_empty() {
            missing.push("facilities");
        }
        if self
            .governing_law
            .as_deref()
            .map_or(true, |law| law.trim().is_empty())
        {
            missing.push("governing_law");
        }
        missing
    }

    /// Whether any party's role mentions `keyword`
    pub fn has_party_with_role(&self, keyword: &str) -> bool {
        self.parties.iter().any(|p| p.has_role(keyword))
    }
}

/// Partial agreement data extracted from one document section
///
/// Produced per section during map-reduce extraction and consumed only by
/// the reducer. Never validated against the full invariant set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PartialCreditAgreement {
    /// Execution date, if this section states it
    #[serde(default)]
    pub agreement_date: Option<NaiveDate>,

    /// Parties found in this section
    #[serde(default)]
    pub parties: Option<Vec<Party>>,

    /// Facilities found in this section
    #[serde(default)]
    pub facilities: Option<Vec<LoanFacility>>,

    /// Governing law, if this section states it
    #[serde(default)]
    pub governing_law: Option<String>,

    /// Section label this partial came from, e.g. "Article I: Definitions"
    #[serde(default)]
    #[schemars(skip)]
    pub source_section: Option<String>,
}

impl PartialCreditAgreement {
    /// Label the partial with its source section
    pub fn with_source_section(mut self, label: impl Into<String>) -> Self {
        self.source_section = Some(label.into());
        self
    }

    /// Whether the section yielded no agreement data at all
    pub fn is_empty(&self) -> bool {
        self.agreement_date.is_none()
            && self.parties.as_ref().map_or(true, Vec::is_empty)
            && self.facilities.as_ref().map_or(true, Vec::is_empty)
            && self
                .governing_law
                .as_deref()
                .map_or(true, |law| law.trim().is_empty())
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
