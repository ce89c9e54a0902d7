//! Extraction result envelope

use crate::{CreditAgreement, EnvelopeError, ExtractionStatus};
use serde::{Deserialize, Serialize};

/// Default message for documents that are not credit agreements
pub const IRRELEVANT_MESSAGE: &str = "Document is not a valid credit agreement";

/// Envelope returned to callers of the extraction pipeline
///
/// The status always agrees with the attached agreement:
/// - no agreement means `Failure`
/// - `Success` and `Partial` always carry an agreement
/// - an attached agreement's status is never better than the envelope's
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawExtractionResult")]
pub struct ExtractionResult {
    status: ExtractionStatus,
    agreement: Option<CreditAgreement>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct RawExtractionResult {
    #[serde(default)]
    status: ExtractionStatus,
    #[serde(default)]
    agreement: Option<CreditAgreement>,
    #[serde(default)]
    message: Option<String>,
}

impl TryFrom<RawExtractionResult> for ExtractionResult {
    type Error = EnvelopeError;

    fn try_from(raw: RawExtractionResult) -> Result<Self, Self::Error> {
        ExtractionResult::try_new(raw.status, raw.agreement, raw.message)
    }
}

impl ExtractionResult {
    /// Build an envelope, reconciling status with the agreement
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::MissingAgreement`] when a `Success` or
    /// `Partial` status is claimed without an agreement.
    pub fn try_new(
        status: ExtractionStatus,
        agreement: Option<CreditAgreement>,
        message: Option<String>,
    ) -> Result<Self, EnvelopeError> {
        match agreement {
            None if status.carries_agreement() => Err(EnvelopeError::MissingAgreement(status)),
            None => Ok(Self {
                status: ExtractionStatus::Failure,
                agreement: None,
                message,
            }),
            Some(agreement) => {
                let status = status.downgrade_to(agreement.extraction_status);
                if status.carries_agreement() {
                    Ok(Self {
                        status,
                        agreement: Some(agreement),
                        message,
                    })
                } else {
                    Ok(Self {
                        status,
                        agreement: None,
                        message: message.or_else(|| Some(IRRELEVANT_MESSAGE.to_string())),
                    })
                }
            }
        }
    }

    /// Wrap a validated agreement; the envelope mirrors its status
    pub fn from_agreement(agreement: CreditAgreement) -> Self {
        if agreement.extraction_status.carries_agreement() {
            Self {
                status: agreement.extraction_status,
                agreement: Some(agreement),
                message: None,
            }
        } else {
            Self::failure(IRRELEVANT_MESSAGE)
        }
    }

    /// A failure envelope with an explanatory message
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: ExtractionStatus::Failure,
            agreement: None,
            message: Some(message.into()),
        }
    }

    /// Envelope status
    pub fn status(&self) -> ExtractionStatus {
        self.status
    }

    /// The agreement, present for `Success` and `Partial`
    pub fn agreement(&self) -> Option<&CreditAgreement> {
        self.agreement.as_ref()
    }

    /// Optional message
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Take the agreement out of the envelope
    pub fn into_agreement(self) -> Option<CreditAgreement> {
        self.agreement
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partial_agreement() -> CreditAgreement {
        CreditAgreement::new(None, Vec::new(), Vec::new(), None).with_status(ExtractionStatus::Partial)
    }

    #[test]
    fn test_from_agreement_mirrors_status() {
        let result = ExtractionResult::from_agreement(partial_agreement());
        assert_eq!(result.status(), ExtractionStatus::Partial);
        assert!(result.agreement().is_some());
        assert!(result.message().is_none());
    }

    #[test]
    fn test_from_irrelevant_agreement_drops_it() {
        let result = ExtractionResult::from_agreement(CreditAgreement::irrelevant());
        assert_eq!(result.status(), ExtractionStatus::Failure);
        assert!(result.agreement().is_none());
        assert_eq!(result.message(), Some(IRRELEVANT_MESSAGE));
    }

    #[test]
    fn test_success_without_agreement_is_invalid() {
        assert_eq!(
            ExtractionResult::try_new(ExtractionStatus::Success, None, None),
            Err(EnvelopeError::MissingAgreement(ExtractionStatus::Success))
        );
        assert!(ExtractionResult::try_new(ExtractionStatus::Partial, None, None).is_err());
    }

    #[test]
    fn test_failure_without_agreement_is_valid() {
        let result =
            ExtractionResult::try_new(ExtractionStatus::Failure, None, Some("nope".into())).unwrap();
        assert_eq!(result.status(), ExtractionStatus::Failure);
        assert_eq!(result.message(), Some("nope"));
    }

    #[test]
    fn test_envelope_status_follows_weaker_agreement() {
        let result =
            ExtractionResult::try_new(ExtractionStatus::Success, Some(partial_agreement()), None)
                .unwrap();
        assert_eq!(result.status(), ExtractionStatus::Partial);
    }

    #[test]
    fn test_deserialization_enforces_consistency() {
        let err = serde_json::from_str::<ExtractionResult>(r#"{"status": "success"}"#).unwrap_err();
        assert!(err.to_string().contains("requires an agreement"));

        let ok: ExtractionResult = serde_json::from_str(
            r#"{"status": "irrelevant_document", "message": "not a loan"}"#,
        )
        .unwrap();
        assert_eq!(ok.status(), ExtractionStatus::Failure);
    }
}
