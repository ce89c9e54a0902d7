//! Parse capability output into agreements
//!
//! Text that is not JSON at all is a capability fault: the engine broke its
//! contract and asking again with feedback will not help. JSON that does not
//! fit the agreement shape is a [`ValidationFault::Schema`], which the
//! single-pass loop can feed back for repair.

use crate::error::{ExtractorError, ValidationFault};
use covenant_domain::{CreditAgreement, PartialCreditAgreement};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Parse a response into a complete agreement
pub fn parse_agreement(response: &str) -> Result<CreditAgreement, ExtractorError> {
    parse_as(response)
}

/// Parse a response into the partial data of one section
pub fn parse_partial(response: &str) -> Result<PartialCreditAgreement, ExtractorError> {
    parse_as(response)
}

fn parse_as<T: DeserializeOwned>(response: &str) -> Result<T, ExtractorError> {
    let json = extract_json(response)?;

    let value: Value = serde_json::from_str(&json)
        .map_err(|e| ExtractorError::Capability(format!("Malformed response: {}", e)))?;

    serde_json::from_value(value)
        .map_err(|e| ExtractorError::Validation(ValidationFault::Schema(e.to_string())))
}

/// Extract JSON from response, handling markdown code blocks
fn extract_json(response: &str) -> Result<String, ExtractorError> {
    let trimmed = response.trim();

    if !trimmed.starts_with("```") {
        return Ok(trimmed.to_string());
    }

    // Skip the opening fence (``` or ```json) and the closing fence if present
    let lines: Vec<&str> = trimmed.lines().collect();
    if lines.len() < 2 {
        return Err(ExtractorError::Capability(
            "Malformed response: empty code block".to_string(),
        ));
    }
    let end = if lines.last().map_or(false, |line| line.trim() == "```") {
        lines.len() - 1
    } else {
        lines.len()
    };
    Ok(lines[1..end].join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use covenant_domain::{Currency, ExtractionStatus};
    use rust_decimal::Decimal;

    const AGREEMENT: &str = r#"{
        "extraction_status": "success",
        "agreement_date": "2023-10-15",
        "parties": [
            {"id": "p1", "name": "ACME INDUSTRIES INC.", "role": "Borrower"}
        ],
        "facilities": [{
            "facility_name": "Term Loan Facility",
            "commitment_amount": {"amount": "500000000.00", "currency": "USD"},
            "interest_terms": {
                "rate_option": {"benchmark": "Term SOFR", "spread_bps": "275"},
                "payment_frequency": {"period": "Month", "period_multiplier": 3}
            },
            "maturity_date": "2028-10-15"
        }],
        "governing_law": "State of New York"
    }"#;

    #[test]
    fn test_parse_valid_agreement() {
        let agreement = parse_agreement(AGREEMENT).unwrap();
        assert_eq!(agreement.extraction_status, ExtractionStatus::Success);
        assert_eq!(agreement.parties[0].name, "ACME INDUSTRIES INC.");

        let facility = &agreement.facilities[0];
        assert_eq!(facility.commitment_amount.currency, Currency::USD);
        assert_eq!(
            facility.commitment_amount.amount,
            "500000000.00".parse::<Decimal>().unwrap()
        );
        assert_eq!(facility.interest_terms.rate_option.spread_bps(), Decimal::from(275));
    }

    #[test]
    fn test_parse_agreement_with_markdown_wrapper() {
        let response = format!("```json\n{}\n```", AGREEMENT);
        assert!(parse_agreement(&response).is_ok());
    }

    #[test]
    fn test_null_lists_parse_as_empty() {
        let agreement = parse_agreement(
            r#"{"extraction_status": "irrelevant_document", "parties": null, "facilities": null}"#,
        )
        .unwrap();
        assert_eq!(agreement.extraction_status, ExtractionStatus::Failure);
        assert!(agreement.parties.is_empty());
        assert!(agreement.facilities.is_empty());
    }

    #[test]
    fn test_non_json_is_capability_fault() {
        let err = parse_agreement("I'm sorry, I cannot help with that.").unwrap_err();
        assert!(matches!(err, ExtractorError::Capability(_)));
        assert!(!err.is_validation());
    }

    #[test]
    fn test_bad_date_is_schema_fault() {
        let response = AGREEMENT.replace("2023-10-15", "October 15, 2023");
        let err = parse_agreement(&response).unwrap_err();
        assert!(matches!(err, ExtractorError::Validation(ValidationFault::Schema(_))));
    }

    #[test]
    fn test_out_of_range_spread_is_schema_fault() {
        let response = AGREEMENT.replace(r#""spread_bps": "275""#, r#""spread_bps": "27500""#);
        let err = parse_agreement(&response).unwrap_err();
        assert!(matches!(err, ExtractorError::Validation(ValidationFault::Schema(_))));
    }

    #[test]
    fn test_non_positive_multiplier_is_schema_fault() {
        let response = AGREEMENT.replace(r#""period_multiplier": 3"#, r#""period_multiplier": 0"#);
        let err = parse_agreement(&response).unwrap_err();
        assert!(matches!(err, ExtractorError::Validation(ValidationFault::Schema(_))));
    }

    #[test]
    fn test_unknown_currency_is_schema_fault() {
        let response = AGREEMENT.replace(r#""currency": "USD""#, r#""currency": "CHF""#);
        assert!(matches!(
            parse_agreement(&response),
            Err(ExtractorError::Validation(ValidationFault::Schema(_)))
        ));
    }

    #[test]
    fn test_parse_partial() {
        let partial = parse_partial(
            r#"{"agreement_date": null, "parties": [{"id": "agent", "name": "GLOBAL BANK", "role": "Administrative Agent"}]}"#,
        )
        .unwrap();
        assert!(partial.agreement_date.is_none());
        assert_eq!(partial.parties.as_ref().map(Vec::len), Some(1));
        assert!(partial.facilities.is_none());
        assert!(!partial.is_empty());
    }

    #[test]
    fn test_parse_empty_partial() {
        let partial = parse_partial("{}").unwrap();
        assert!(partial.is_empty());
    }

    #[test]
    fn test_extract_json_from_plain_json() {
        let json = r#"{"key": "value"}"#;
        assert_eq!(extract_json(json).unwrap(), json);
    }

    #[test]
    fn test_extract_json_from_markdown_without_language() {
        let response = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(extract_json(response).unwrap(), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_extract_json_unterminated_fence() {
        let response = "```json\n{\"key\": \"value\"}";
        assert_eq!(extract_json(response).unwrap(), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_extract_json_empty_block() {
        assert!(extract_json("```").is_err());
    }
}
