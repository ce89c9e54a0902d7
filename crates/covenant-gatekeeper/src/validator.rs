//! Agreement validation cascade

use crate::{RejectionReason, ValidationConfig};
use covenant_domain::{CreditAgreement, ExtractionStatus};
use std::fmt;
use tracing::debug;

/// Outcome of a validation pass that did not reject the agreement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// Derived status
    pub status: ExtractionStatus,

    /// Why the status was downgraded (empty for `Success`)
    pub downgrades: Vec<DowngradeReason>,
}

/// Reasons for a `Success → Partial` downgrade
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DowngradeReason {
    /// A core field is absent or empty
    MissingField(&'static str),

    /// No party carries the borrower role
    NoBorrower,
}

impl fmt::Display for DowngradeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DowngradeReason::MissingField(field) => write!(f, "missing {}", field),
            DowngradeReason::NoBorrower => f.write_str("no party with a borrower role"),
        }
    }
}

/// The Gatekeeper validates agreements before they leave the pipeline
pub struct Gatekeeper {
    config: ValidationConfig,
}

impl Gatekeeper {
    /// Create a new Gatekeeper with the given configuration
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Create a Gatekeeper with default configuration
    pub fn default_config() -> Self {
        Self::new(ValidationConfig::default())
    }

    /// The active configuration
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Run the cascade and report the derived status
    ///
    /// An agreement already marked `Failure` is reported as such without
    /// evaluating any rule.
    ///
    /// # Errors
    ///
    /// Returns the first [`RejectionReason`] hit by the temporal, ordering or
    /// currency rules.
    pub fn evaluate(&self, agreement: &CreditAgreement) -> Result<ValidationReport, RejectionReason> {
        let mut status = agreement.extraction_status;
        let mut downgrades = Vec::new();

        if status == ExtractionStatus::Failure {
            return Ok(ValidationReport { status, downgrades });
        }

        // 1. Completeness
        for field in agreement.missing_core_fields() {
            downgrades.push(DowngradeReason::MissingField(field));
            status = status.downgrade_to(ExtractionStatus::Partial);
        }

        // 2. Temporal sanity
        if let Some(agreement_date) = agreement.agreement_date {
            let today = self.config.today();
            if agreement_date > today {
                return Err(RejectionReason::FutureAgreementDate {
                    agreement_date,
                    today,
                });
            }
        }

        // 3. Facility temporal ordering
        if let Some(agreement_date) = agreement.agreement_date {
            for facility in &agreement.facilities {
                if facility.maturity_date <= agreement_date {
                    return Err(RejectionReason::MaturityNotAfterAgreement {
                        facility: facility.facility_name.clone(),
                        maturity_date: facility.maturity_date,
                        agreement_date,
                    });
                }
            }
        }

        // 4. Currency homogeneity
        if let Some((first, rest)) = agreement.facilities.split_first() {
            let expected = first.commitment_amount.currency;
            for facility in rest {
                let found = facility.commitment_amount.currency;
                if found != expected {
                    return Err(RejectionReason::CurrencyMismatch {
                        facility: facility.facility_name.clone(),
                        expected,
                        found,
                    });
                }
            }
        }

        // 5. Borrower presence
        if !agreement.parties.is_empty()
            && !agreement.has_party_with_role(&self.config.borrower_role_keyword)
        {
            downgrades.push(DowngradeReason::NoBorrower);
            status = status.downgrade_to(ExtractionStatus::Partial);
        }

        if !downgrades.is_empty() {
            debug!(
                "Agreement downgraded to {}: {}",
                status,
                downgrades
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        Ok(ValidationReport { status, downgrades })
    }

    /// Run the cascade and return the agreement with its derived status
    ///
    /// # Errors
    ///
    /// See [`Gatekeeper::evaluate`].
    pub fn validate(&self, agreement: CreditAgreement) -> Result<CreditAgreement, RejectionReason> {
        let report = self.evaluate(&agreement)?;
        Ok(agreement.with_status(report.status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, Utc};
    use covenant_domain::{
        Currency, FloatingRateOption, Frequency, InterestRatePayout, LoanFacility, Money, Party,
        PeriodUnit,
    };
    use rust_decimal::Decimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn facility(name: &str, currency: Currency, maturity: NaiveDate) -> LoanFacility {
        LoanFacility {
            facility_name: name.to_string(),
            commitment_amount: Money::new(Decimal::from(500_000_000u64), currency),
            interest_terms: InterestRatePayout {
                rate_option: FloatingRateOption::new("Term SOFR", Decimal::from(275)).unwrap(),
                payment_frequency: Frequency::new(PeriodUnit::Month, 3).unwrap(),
            },
            maturity_date: maturity,
        }
    }

    fn create_test_agreement() -> CreditAgreement {
        CreditAgreement::new(
            Some(date(2023, 10, 15)),
            vec![
                Party::new("p1", "ACME INDUSTRIES INC.", "Borrower"),
                Party::new("p2", "GLOBAL BANK CORP.", "Lender"),
            ],
            vec![facility("Term Loan Facility", Currency::USD, date(2028, 10, 15))],
            Some("State of New York".to_string()),
        )
    }

    fn gatekeeper() -> Gatekeeper {
        Gatekeeper::new(ValidationConfig::as_of(date(2024, 6, 1)))
    }

    #[test]
    fn test_complete_agreement_succeeds() {
        let report = gatekeeper().evaluate(&create_test_agreement()).unwrap();
        assert_eq!(report.status, ExtractionStatus::Success);
        assert!(report.downgrades.is_empty());
    }

    #[test]
    fn test_missing_fields_downgrade_to_partial() {
        let mut agreement = create_test_agreement();
        agreement.governing_law = None;
        agreement.facilities.clear();

        let report = gatekeeper().evaluate(&agreement).unwrap();
        assert_eq!(report.status, ExtractionStatus::Partial);
        assert_eq!(
            report.downgrades,
            vec![
                DowngradeReason::MissingField("facilities"),
                DowngradeReason::MissingField("governing_law"),
            ]
        );
    }

    #[test]
    fn test_lender_only_is_partial_not_rejected() {
        let mut agreement = create_test_agreement();
        agreement.parties = vec![Party::new("p2", "GLOBAL BANK CORP.", "Lender")];

        let validated = gatekeeper().validate(agreement).unwrap();
        assert_eq!(validated.extraction_status, ExtractionStatus::Partial);
    }

    #[test]
    fn test_borrower_keyword_is_configurable() {
        let config = ValidationConfig {
            borrower_role_keyword: "obligor".to_string(),
            ..ValidationConfig::as_of(date(2024, 6, 1))
        };
        let mut agreement = create_test_agreement();
        agreement.parties = vec![Party::new("p1", "ACME", "Primary Obligor")];

        let report = Gatekeeper::new(config).evaluate(&agreement).unwrap();
        assert_eq!(report.status, ExtractionStatus::Success);
    }

    #[test]
    fn test_maturity_equal_to_agreement_date_is_rejected() {
        let mut agreement = create_test_agreement();
        agreement.facilities = vec![facility("Revolver", Currency::USD, date(2023, 10, 15))];

        let err = gatekeeper().validate(agreement).unwrap_err();
        assert!(matches!(
            err,
            RejectionReason::MaturityNotAfterAgreement { ref facility, .. } if facility == "Revolver"
        ));
        assert!(err.to_string().contains("'Revolver'"));
        assert!(err.is_consistency_fault());
    }

    #[test]
    fn test_currency_mismatch_names_both_currencies() {
        let mut agreement = create_test_agreement();
        agreement
            .facilities
            .push(facility("Euro Tranche", Currency::EUR, date(2029, 1, 1)));

        let err = gatekeeper().validate(agreement).unwrap_err();
        assert_eq!(
            err,
            RejectionReason::CurrencyMismatch {
                facility: "Euro Tranche".to_string(),
                expected: Currency::USD,
                found: Currency::EUR,
            }
        );
        let message = err.to_string();
        assert!(message.contains("USD"));
        assert!(message.contains("EUR"));
    }

    #[test]
    fn test_future_agreement_date_rejected_even_when_incomplete() {
        let tomorrow = Utc::now().date_naive() + Duration::days(1);
        let agreement = CreditAgreement::new(Some(tomorrow), Vec::new(), Vec::new(), None);

        let err = Gatekeeper::default_config().validate(agreement).unwrap_err();
        assert!(matches!(err, RejectionReason::FutureAgreementDate { .. }));
    }

    #[test]
    fn test_agreement_dated_today_is_accepted() {
        let today = date(2024, 6, 1);
        let mut agreement = create_test_agreement();
        agreement.agreement_date = Some(today);

        let report = gatekeeper().evaluate(&agreement).unwrap();
        assert_eq!(report.status, ExtractionStatus::Success);
    }

    #[test]
    fn test_failure_is_absorbing() {
        let mut agreement = create_test_agreement();
        agreement
            .facilities
            .push(facility("Euro Tranche", Currency::EUR, date(2029, 1, 1)));
        let agreement = agreement.with_status(ExtractionStatus::Failure);

        let validated = gatekeeper().validate(agreement).unwrap();
        assert_eq!(validated.extraction_status, ExtractionStatus::Failure);
    }

    #[test]
    fn test_partial_never_upgrades() {
        let agreement = create_test_agreement().with_status(ExtractionStatus::Partial);
        let report = gatekeeper().evaluate(&agreement).unwrap();
        assert_eq!(report.status, ExtractionStatus::Partial);
    }

    #[test]
    fn test_missing_agreement_date_skips_ordering_check() {
        let mut agreement = create_test_agreement();
        agreement.agreement_date = None;
        agreement.facilities = vec![facility("Old Loan", Currency::USD, date(1999, 1, 1))];

        let report = gatekeeper().evaluate(&agreement).unwrap();
        assert_eq!(report.status, ExtractionStatus::Partial);
        assert_eq!(
            report.downgrades,
            vec![DowngradeReason::MissingField("agreement_date")]
        );
    }
}
