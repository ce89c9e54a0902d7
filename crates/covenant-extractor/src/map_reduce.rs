//! Map-reduce extraction for long agreements
//!
//! Each section is extracted on its own into a `PartialCreditAgreement`;
//! the partials are then folded, in section order, into one agreement that
//! goes through the Gatekeeper once.

use crate::error::{ExtractorError, ValidationFault};
use crate::extractor::{ensure_not_blank, Extractor};
use crate::parser::parse_partial;
use crate::prompt::PromptBuilder;
use crate::schema::partial_agreement_schema;
use crate::types::DocumentSection;
use covenant_domain::traits::LlmProvider;
use covenant_domain::{CreditAgreement, LoanFacility, Party, PartialCreditAgreement};
use futures::{StreamExt, TryStreamExt};
use std::collections::HashMap;
use tracing::{debug, info, warn};

impl<L> Extractor<L>
where
    L: LlmProvider,
{
    /// Map-reduce extraction
    ///
    /// Sections are extracted concurrently, at most `map_concurrency` at a
    /// time, and reduced in section order. A section whose JSON does not
    /// conform to the partial schema is skipped. A capability fault, a
    /// response that is not JSON, or a timeout aborts the whole extraction.
    /// There is no retry.
    ///
    /// # Errors
    ///
    /// - `ExtractorError::Validation` if the reduced agreement is rejected
    /// - `ExtractorError::Capability` / `ExtractorError::Timeout` from any section
    pub async fn extract_long(&self, text: &str) -> Result<CreditAgreement, ExtractorError> {
        ensure_not_blank(text)?;

        let sections = self.chunker.split(text);
        info!("Map phase: {} sections", sections.len());

        let section_futures: Vec<_> = sections
            .iter()
            .map(|section| self.extract_partial(section))
            .collect();
        let partials: Vec<Option<PartialCreditAgreement>> =
            futures::stream::iter(section_futures)
                .buffered(self.config.map_concurrency.max(1))
                .try_collect()
                .await?;

        let partials: Vec<PartialCreditAgreement> = partials.into_iter().flatten().collect();
        info!(
            "Reduce phase: {} of {} sections produced data",
            partials.iter().filter(|p| !p.is_empty()).count(),
            sections.len()
        );

        let agreement = reduce_partials(partials);

        self.gatekeeper
            .validate(agreement)
            .map_err(|reason| ExtractorError::Validation(ValidationFault::Rejected(reason)))
    }

    async fn extract_partial(
        &self,
        section: &DocumentSection,
    ) -> Result<Option<PartialCreditAgreement>, ExtractorError> {
        let label = section.label();
        debug!(
            "Extracting section {} '{}' ({} chars)",
            section.position,
            label,
            section.char_len()
        );

        let prompt = PromptBuilder::new(section.text.as_str())
            .for_section(label.as_str())
            .build();
        let response = self.call_capability(&prompt, partial_agreement_schema()).await?;

        match parse_partial(&response) {
            Ok(partial) => Ok(Some(partial.with_source_section(label))),
            Err(ExtractorError::Validation(fault)) => {
                warn!("Skipping section '{}': {}", label, fault);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// Fold partial results, in order, into one agreement
///
/// The first non-empty agreement date and governing law win. Parties are
/// merged by identifier and facilities by name (trimmed, case-insensitive);
/// the first occurrence of a key wins and later conflicting entries are
/// dropped with a warning. If no partial carries any data the result is an
/// irrelevant-document agreement.
pub fn reduce_partials(
    partials: impl IntoIterator<Item = PartialCreditAgreement>,
) -> CreditAgreement {
    let mut agreement_date = None;
    let mut governing_law: Option<String> = None;
    let mut parties = Merged::<Party>::default();
    let mut facilities = Merged::<LoanFacility>::default();
    let mut any_data = false;

    for partial in partials {
        if partial.is_empty() {
            continue;
        }
        any_data = true;

        let source = partial
            .source_section
            .clone()
            .unwrap_or_else(|| "unknown section".to_string());

        if agreement_date.is_none() {
            agreement_date = partial.agreement_date;
        }
        if governing_law.is_none() {
            governing_law = partial
                .governing_law
                .filter(|law| !law.trim().is_empty());
        }
        for party in partial.parties.unwrap_or_default() {
            parties.insert(party.dedup_key(), party, &source);
        }
        for facility in partial.facilities.unwrap_or_default() {
            facilities.insert(facility.dedup_key(), facility, &source);
        }
    }

    if !any_data {
        info!("No section produced agreement data, marking document irrelevant");
        return CreditAgreement::irrelevant();
    }

    CreditAgreement::new(
        agreement_date,
        parties.into_items(),
        facilities.into_items(),
        governing_law,
    )
}

/// Insertion-ordered union keyed by a normalised identifier
struct Merged<T> {
    items: Vec<T>,
    index: HashMap<String, (usize, String)>,
}

impl<T> Default for Merged<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: PartialEq + std::fmt::Debug> Merged<T> {
    fn insert(&mut self, key: String, item: T, source: &str) {
        match self.index.get(&key) {
            Some((idx, first_source)) => {
                if self.items[*idx] != item {
                    warn!(
                        "Conflicting entries for '{}': keeping {} ({:?}), dropping {} ({:?})",
                        key, first_source, self.items[*idx], source, item
                    );
                }
            }
            None => {
                self.index
                    .insert(key, (self.items.len(), source.to_string()));
                self.items.push(item);
            }
        }
    }

    fn into_items(self) -> Vec<T> {
        self.items
    }
}
