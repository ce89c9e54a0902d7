//! Monetary amounts

use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported currency codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Currency {
    /// US dollar
    USD,
    /// Euro
    EUR,
    /// Pound sterling
    GBP,
    /// Japanese yen
    JPY,
}

impl Currency {
    /// ISO 4217 code
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A monetary amount with currency
///
/// The amount is a `Decimal` so that values such as `500000000.00` survive
/// serialization and equality checks unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Money {
    /// The numerical amount
    #[schemars(schema_with = "crate::schema::decimal_amount")]
    pub amount: Decimal,

    /// The currency code
    pub currency: Currency,
}

impl Money {
    /// Create a new amount
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_money_preserves_precision() {
        let money = Money::new(Decimal::from_str("500000000.10").unwrap(), Currency::USD);
        let json = serde_json::to_string(&money).unwrap();
        assert!(json.contains("\"500000000.10\""));

        let parsed: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, money);
    }

    #[test]
    fn test_money_accepts_numeric_amount() {
        let parsed: Money =
            serde_json::from_str(r#"{"amount": 250000000, "currency": "EUR"}"#).unwrap();
        assert_eq!(parsed.amount, Decimal::from(250_000_000u64));
        assert_eq!(parsed.currency, Currency::EUR);
    }

    #[test]
    fn test_unknown_currency_rejected() {
        let result: Result<Money, _> =
            serde_json::from_str(r#"{"amount": "10", "currency": "CHF"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_display() {
        let money = Money::new(Decimal::from(75_000_000u64), Currency::GBP);
        assert_eq!(money.to_string(), "75000000 GBP");
    }
}
