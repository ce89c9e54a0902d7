//! Core Extractor implementation

use crate::chunking::ArticleChunker;
use crate::config::ExtractorConfig;
use crate::error::{ExtractorError, ValidationFault};
use crate::parser::parse_agreement;
use crate::prompt::PromptBuilder;
use crate::schema::credit_agreement_schema;
use crate::types::ExtractionStrategy;
use covenant_domain::traits::LlmProvider;
use covenant_domain::CreditAgreement;
use covenant_gatekeeper::Gatekeeper;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Position in the single-pass propose/validate/repair loop
///
/// Only the previous fault carries over between attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    /// 1-based attempt number
    pub index: u32,

    /// Fault reported by the previous attempt
    pub last_fault: Option<ValidationFault>,
}

impl Attempt {
    /// The initial attempt
    pub fn first() -> Self {
        Self {
            index: 1,
            last_fault: None,
        }
    }

    /// The attempt that follows a validation fault
    pub fn retry(self, fault: ValidationFault) -> Self {
        Self {
            index: self.index + 1,
            last_fault: Some(fault),
        }
    }

    /// Prompt for this attempt
    pub fn prompt(&self, text: &str) -> String {
        let builder = PromptBuilder::new(text);
        match &self.last_fault {
            Some(fault) => builder.with_feedback(fault).build(),
            None => builder.build(),
        }
    }
}

/// The Extractor turns agreement text into a validated `CreditAgreement`
pub struct Extractor<L>
where
    L: LlmProvider,
{
    pub(crate) llm_provider: Arc<L>,
    pub(crate) gatekeeper: Gatekeeper,
    pub(crate) chunker: ArticleChunker,
    pub(crate) config: ExtractorConfig,
}

impl<L> Extractor<L>
where
    L: LlmProvider,
{
    /// Create a new Extractor
    pub fn new(llm_provider: L, gatekeeper: Gatekeeper, config: ExtractorConfig) -> Self {
        Self::with_shared_provider(Arc::new(llm_provider), gatekeeper, config)
    }

    /// Create a new Extractor around a provider that is shared elsewhere
    pub fn with_shared_provider(
        llm_provider: Arc<L>,
        gatekeeper: Gatekeeper,
        config: ExtractorConfig,
    ) -> Self {
        Self {
            llm_provider,
            gatekeeper,
            chunker: ArticleChunker::from_config(&config),
            config,
        }
    }

    /// The active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Choose the strategy for a document
    pub fn strategy_for(&self, text: &str, force_map_reduce: bool) -> ExtractionStrategy {
        if force_map_reduce || text.chars().count() > self.config.map_reduce_threshold {
            ExtractionStrategy::MapReduce
        } else {
            ExtractionStrategy::SinglePass
        }
    }

    /// Extract with the strategy suited to the document
    ///
    /// Map-reduce is used when forced or when the document is longer than
    /// `map_reduce_threshold` characters; otherwise single-pass extraction
    /// with up to `max_attempts` attempts.
    pub async fn extract_smart(
        &self,
        text: &str,
        force_map_reduce: bool,
        max_attempts: u32,
    ) -> Result<CreditAgreement, ExtractorError> {
        let strategy = self.strategy_for(text, force_map_reduce);
        info!(
            "Document length {} chars, using {} extraction{}",
            text.chars().count(),
            strategy,
            if force_map_reduce { " (forced)" } else { "" }
        );

        match strategy {
            ExtractionStrategy::SinglePass => self.extract(text, max_attempts).await,
            ExtractionStrategy::MapReduce => self.extract_long(text).await,
        }
    }

    /// Single-pass extraction with validation feedback
    ///
    /// Each attempt is parsed and run through the Gatekeeper. A validation
    /// fault is fed back into the next attempt's prompt together with the
    /// original text. Capability faults and timeouts are returned at once.
    ///
    /// # Errors
    ///
    /// - `ExtractorError::Config` if `max_attempts` is 0
    /// - `ExtractorError::ExhaustedRetries` if every attempt was invalid
    /// - `ExtractorError::Capability` / `ExtractorError::Timeout` from the capability
    pub async fn extract(
        &self,
        text: &str,
        max_attempts: u32,
    ) -> Result<CreditAgreement, ExtractorError> {
        ensure_not_blank(text)?;
        if max_attempts == 0 {
            return Err(ExtractorError::Config(
                "max_attempts must be at least 1".to_string(),
            ));
        }

        let mut attempt = Attempt::first();
        loop {
            info!("Extraction attempt {}/{}", attempt.index, max_attempts);

            let prompt = attempt.prompt(text);
            debug!("Prompt length: {} chars", prompt.len());

            let response = self.call_capability(&prompt, credit_agreement_schema()).await?;
            debug!("Response length: {} chars", response.len());

            match self.check(&response) {
                Ok(agreement) => {
                    info!(
                        "Extraction complete on attempt {}: {}",
                        attempt.index, agreement.extraction_status
                    );
                    return Ok(agreement);
                }
                Err(CheckError::Fault(fault)) => {
                    warn!("Validation error on attempt {}: {}", attempt.index, fault);
                    if attempt.index >= max_attempts {
                        return Err(ExtractorError::ExhaustedRetries {
                            attempts: attempt.index,
                            last_error: fault,
                        });
                    }
                    info!("Retrying with validation feedback");
                    attempt = attempt.retry(fault);
                }
                Err(CheckError::Fatal(e)) => return Err(e),
            }
        }
    }

    /// Parse and validate one response
    fn check(&self, response: &str) -> Result<CreditAgreement, CheckError> {
        let agreement = match parse_agreement(response) {
            Ok(agreement) => agreement,
            Err(ExtractorError::Validation(fault)) => return Err(CheckError::Fault(fault)),
            Err(e) => return Err(CheckError::Fatal(e)),
        };

        self.gatekeeper
            .validate(agreement)
            .map_err(|reason| CheckError::Fault(ValidationFault::Rejected(reason)))
    }

    /// Call the capability, bounded by the configured timeout
    pub(crate) async fn call_capability(
        &self,
        prompt: &str,
        schema: &str,
    ) -> Result<String, ExtractorError> {
        timeout(
            self.config.extraction_timeout(),
            self.llm_provider.generate_structured(prompt, schema),
        )
        .await
        .map_err(|_| ExtractorError::Timeout(self.config.extraction_timeout_secs))?
        .map_err(|e| ExtractorError::Capability(e.to_string()))
    }
}

enum CheckError {
    Fault(ValidationFault),
    Fatal(ExtractorError),
}

pub(crate) fn ensure_not_blank(text: &str) -> Result<(), ExtractorError> {
    if text.trim().is_empty() {
        return Err(ExtractorError::EmptyDocument);
    }
    Ok(())
}
