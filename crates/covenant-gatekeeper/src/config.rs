//! Gatekeeper configuration

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Configuration for validation rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Substring that marks a party as a borrower (matched case-insensitively)
    #[serde(default = "default_borrower_role_keyword")]
    pub borrower_role_keyword: String,

    /// Date the agreement is evaluated against; `None` means today (UTC)
    #[serde(default)]
    pub evaluation_date: Option<NaiveDate>,
}

fn default_borrower_role_keyword() -> String {
    "borrower".to_string()
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            borrower_role_keyword: default_borrower_role_keyword(),
            evaluation_date: None,
        }
    }
}

impl ValidationConfig {
    /// Evaluate against a fixed date instead of the wall clock
    pub fn as_of(date: NaiveDate) -> Self {
        Self {
            evaluation_date: Some(date),
            ..Self::default()
        }
    }

    /// The date used for the temporal sanity check
    pub fn today(&self) -> NaiveDate {
        self.evaluation_date
            .unwrap_or_else(|| Utc::now().date_naive())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.borrower_role_keyword.trim().is_empty() {
            return Err("borrower_role_keyword must not be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ValidationConfig::default();
        assert_eq!(config.borrower_role_keyword, "borrower");
        assert!(config.evaluation_date.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_as_of_pins_today() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let config = ValidationConfig::as_of(date);
        assert_eq!(config.today(), date);
    }

    #[test]
    fn test_empty_keyword_is_invalid() {
        let config = ValidationConfig {
            borrower_role_keyword: " ".to_string(),
            ..ValidationConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
