//! JSON Schema fragments for fields whose wire form schemars cannot infer
//!
//! `Decimal` values are accepted as strings or numbers on input, so their
//! schemas allow both.

use crate::terms::MAX_SPREAD_BPS;
use schemars::gen::SchemaGenerator;
use schemars::schema::{InstanceType, Metadata, NumberValidation, Schema, SchemaObject};

fn decimal_object(description: &str) -> SchemaObject {
    SchemaObject {
        instance_type: Some(vec![InstanceType::String, InstanceType::Number].into()),
        metadata: Some(Box::new(Metadata {
            description: Some(description.to_string()),
            ..Default::default()
        })),
        ..Default::default()
    }
}

/// Exact decimal amount, e.g. `"500000000.00"`
pub(crate) fn decimal_amount(_: &mut SchemaGenerator) -> Schema {
    decimal_object("Decimal amount; a string such as \"500000000.00\" keeps full precision").into()
}

/// Margin in basis points, bounded to [-10000, 10000]
pub(crate) fn spread_bps(_: &mut SchemaGenerator) -> Schema {
    let mut schema = decimal_object("Spread over the benchmark in basis points (2.75% is 275)");
    schema.number = Some(Box::new(NumberValidation {
        minimum: Some(-(MAX_SPREAD_BPS as f64)),
        maximum: Some(MAX_SPREAD_BPS as f64),
        ..Default::default()
    }));
    schema.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spread_schema_is_bounded_and_accepts_numbers() {
        let schema = serde_json::to_value(spread_bps(&mut SchemaGenerator::default())).unwrap();
        assert_eq!(schema["minimum"], -10000.0);
        assert_eq!(schema["maximum"], 10000.0);
        assert_eq!(schema["type"], serde_json::json!(["string", "number"]));
    }

    #[test]
    fn test_amount_schema_accepts_strings_and_numbers() {
        let schema =
            serde_json::to_value(decimal_amount(&mut SchemaGenerator::default())).unwrap();
        assert_eq!(schema["type"], serde_json::json!(["string", "number"]));
        assert!(schema.get("minimum").is_none());
    }
}
