//! Parties to an agreement

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A legal entity involved in the agreement
///
/// The role is free text ("Borrower", "Co-Borrower", "Administrative Agent")
/// and is matched by substring, see [`Party::has_role`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Party {
    /// Identifier unique within the document
    pub id: String,

    /// Legal name
    pub name: String,

    /// Role label
    pub role: String,
}

impl Party {
    /// Create a new party
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: role.into(),
        }
    }

    /// Whether the role contains `keyword`, ignoring case
    pub fn has_role(&self, keyword: &str) -> bool {
        self.role.to_lowercase().contains(&keyword.to_lowercase())
    }

    /// Whether this party acts as a borrower
    pub fn is_borrower(&self) -> bool {
        self.has_role("borrower")
    }

    /// Key used to recognise the same party across document sections
    pub fn dedup_key(&self) -> String {
        self.id.trim().to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_borrower_matching_is_substring_and_case_insensitive() {
        assert!(Party::new("p1", "ACME", "Borrower").is_borrower());
        assert!(Party::new("p1", "ACME", "co-BORROWER").is_borrower());
        assert!(Party::new("p1", "ACME", "Borrower Representative").is_borrower());
        assert!(!Party::new("p2", "Bank", "Lender").is_borrower());
    }

    #[test]
    fn test_has_role() {
        let agent = Party::new("p3", "Bank", "Administrative Agent");
        assert!(agent.has_role("agent"));
        assert!(!agent.has_role("lender"));
    }
}
