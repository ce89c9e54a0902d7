//! JSON Schemas advertised to the extraction capability
//!
//! Generated from the domain types with `schemars`, so the schema the
//! capability is asked to follow is the shape the parser accepts.

use covenant_domain::{CreditAgreement, PartialCreditAgreement};
use schemars::{schema_for, JsonSchema};
use std::sync::LazyLock;

static CREDIT_AGREEMENT_SCHEMA: LazyLock<String> = LazyLock::new(schema_json::<CreditAgreement>);

static PARTIAL_AGREEMENT_SCHEMA: LazyLock<String> =
    LazyLock::new(schema_json::<PartialCreditAgreement>);

/// Schema for a complete credit agreement, titled `CreditAgreement`
pub fn credit_agreement_schema() -> &'static str {
    CREDIT_AGREEMENT_SCHEMA.as_str()
}

/// Schema for the data found in one section, titled `PartialCreditAgreement`
///
/// Every property is optional.
pub fn partial_agreement_schema() -> &'static str {
    PARTIAL_AGREEMENT_SCHEMA.as_str()
}

fn schema_json<T: JsonSchema>() -> String {
    let mut value = serde_json::to_value(schema_for!(T)).unwrap_or_default();

    // Chat APIs ignore the meta-schema URI
    if let serde_json::Value::Object(map) = &mut value {
        map.remove("$schema");
    }

    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn parsed(schema: &str) -> Value {
        serde_json::from_str(schema).unwrap()
    }

    #[test]
    fn test_schemas_are_titled_after_types() {
        assert_eq!(parsed(credit_agreement_schema())["title"], "CreditAgreement");
        assert_eq!(
            parsed(partial_agreement_schema())["title"],
            "PartialCreditAgreement"
        );
    }

    #[test]
    fn test_partial_schema_has_no_required_fields() {
        let schema = parsed(partial_agreement_schema());
        let required = schema["required"].as_array().map_or(0, Vec::len);
        assert_eq!(required, 0);
        assert!(schema["properties"].get("source_section").is_none());
    }

    #[test]
    fn test_facility_schema_requires_core_fields() {
        let schema = parsed(credit_agreement_schema());
        let required: Vec<&str> = schema["definitions"]["LoanFacility"]["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();

        for field in ["facility_name", "commitment_amount", "interest_terms", "maturity_date"] {
            assert!(required.contains(&field), "missing {}", field);
        }
    }

    fn enum_values(schema: &Value, out: &mut Vec<String>) {
        match schema {
            Value::Object(map) => {
                if let Some(Value::Array(values)) = map.get("enum") {
                    out.extend(values.iter().filter_map(Value::as_str).map(String::from));
                }
                map.values().for_each(|v| enum_values(v, out));
            }
            Value::Array(items) => items.iter().for_each(|v| enum_values(v, out)),
            _ => {}
        }
    }

    #[test]
    fn test_status_schema_uses_wire_names() {
        let schema = parsed(credit_agreement_schema());
        let mut variants = Vec::new();
        enum_values(&schema["definitions"]["ExtractionStatus"], &mut variants);
        assert_eq!(
            variants,
            vec!["success", "partial_data_missing", "irrelevant_document"]
        );
    }
}
