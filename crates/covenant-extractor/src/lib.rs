//! Covenant Extractor
//!
//! Turns unstructured credit agreement text into a validated
//! `CreditAgreement`, using an external capability as the extraction engine.
//!
//! # Architecture
//!
//! ```text
//! Text → Orchestrator ─┬─ Single-Pass: Capability → Parser → Gatekeeper (retry with feedback)
//!                      └─ Map-Reduce: Chunker → per-section Capability → Reducer → Gatekeeper
//! ```
//!
//! # Key Features
//!
//! - **Article Chunking**: Split long agreements along ARTICLE headers, then paragraphs
//! - **Reflexion Retry**: Feed validation errors back to the capability for repair
//! - **Map-Reduce**: Bounded-concurrency per-section extraction, merged in section order
//! - **Strategy Selection**: Route by document length or explicit override
//!
//! # Example Usage
//!
//! ```no_run
//! use covenant_extractor::{Extractor, ExtractorConfig};
//! use covenant_gatekeeper::Gatekeeper;
//! use covenant_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new(r#"{"extraction_status": "irrelevant_document"}"#);
//! let config = ExtractorConfig::default();
//! let max_attempts = config.max_attempts;
//! let extractor = Extractor::new(llm, Gatekeeper::default_config(), config);
//!
//! let agreement = extractor
//!     .extract_smart("THIS CREDIT AGREEMENT is entered into...", false, max_attempts)
//!     .await?;
//!
//! println!("Status: {}", agreement.extraction_status);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod chunking;
mod config;
mod error;
mod extractor;
mod map_reduce;
mod parser;
mod prompt;
mod schema;
mod types;


pub use chunking::{parse_article_number, ArticleChunker};
pub use config::ExtractorConfig;
pub use error::{ExtractorError, ValidationFault};
pub use extractor::{Attempt, Extractor};
pub use map_reduce::reduce_partials;
pub use parser::{parse_agreement, parse_partial};
pub use prompt::PromptBuilder;
pub use schema::{credit_agreement_schema, partial_agreement_schema};
pub use types::{DocumentSection, ExtractionStrategy, SectionKind};
