//! Covenant Gatekeeper
//!
//! Validates extracted credit agreements and derives their completeness status.
//!
//! The Gatekeeper runs a fixed cascade over a candidate agreement:
//! 1. Completeness of core fields (downgrade to partial)
//! 2. Agreement date not in the future (rejection)
//! 3. Every maturity strictly after the agreement date (rejection)
//! 4. One currency across all facilities (rejection)
//! 5. At least one borrower among the parties (downgrade to partial)
//!
//! Rejections mean the data contradicts itself; downgrades mean information
//! is missing. The two are never conflated.
//!
//! # Examples
//!
//! ```
//! use covenant_gatekeeper::{Gatekeeper, ValidationConfig};
//! use covenant_domain::{CreditAgreement, ExtractionStatus};
//!
//! let gatekeeper = Gatekeeper::new(ValidationConfig::default());
//! let agreement = CreditAgreement::new(None, Vec::new(), Vec::new(), None);
//!
//! let validated = gatekeeper.validate(agreement).unwrap();
//! assert_eq!(validated.extraction_status, ExtractionStatus::Partial);
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod validator;

pub use config::ValidationConfig;
pub use error::RejectionReason;
pub use validator::{DowngradeReason, Gatekeeper, ValidationReport};
