//! Article-based document chunking
//!
//! Credit agreements are organised as numbered articles ("ARTICLE I
//! DEFINITIONS", "ARTICLE 7. EVENTS OF DEFAULT"). Each article becomes a
//! section; oversized articles are re-split along blank-line paragraph
//! boundaries. Section offsets always cover the source exactly, so every
//! section can be traced back to the text it came from.

use crate::config::ExtractorConfig;
use crate::types::{DocumentSection, SectionKind};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

static ARTICLE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t]*ARTICLE[ \t]+([IVXLC]+|\d+)\b[ \t:.\-]*(.*)$")
        .expect("article header pattern is valid")
});

const ROMAN_NUMERALS: [&str; 15] = [
    "I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X", "XI", "XII", "XIII", "XIV", "XV",
];

/// Parse an article numeral ("IV", "4") into its number
///
/// Roman numerals I through XV and Arabic integers are recognised; anything
/// else yields 0.
pub fn parse_article_number(numeral: &str) -> u32 {
    let numeral = numeral.trim().to_ascii_uppercase();
    if let Some(idx) = ROMAN_NUMERALS.iter().position(|r| *r == numeral) {
        return idx as u32 + 1;
    }
    numeral.parse().unwrap_or(0)
}

struct Header {
    start: usize,
    number: u32,
    title: Option<String>,
}

/// Splits agreements into article sections
#[derive(Debug, Clone)]
pub struct ArticleChunker {
    min_chunk_size: usize,
    max_chunk_size: usize,
}

impl Default for ArticleChunker {
    fn default() -> Self {
        Self::from_config(&ExtractorConfig::default())
    }
}

impl ArticleChunker {
    /// Create a chunker with explicit size bounds (characters)
    pub fn new(min_chunk_size: usize, max_chunk_size: usize) -> Self {
        Self {
            min_chunk_size,
            max_chunk_size: max_chunk_size.max(1),
        }
    }

    /// Create a chunker using the extractor's size bounds
    pub fn from_config(config: &ExtractorConfig) -> Self {
        Self::new(config.min_chunk_size, config.max_chunk_size)
    }

    /// Split a document into ordered sections
    ///
    /// Never fails. A document without article headers yields a single
    /// section holding at most `max_chunk_size` characters from the start.
    pub fn split(&self, text: &str) -> Vec<DocumentSection> {
        let headers: Vec<Header> = ARTICLE_HEADER
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let numeral = caps.get(1)?.as_str();
                let title = caps
                    .get(2)
                    .map(|m| m.as_str().trim())
                    .filter(|t| !t.is_empty())
                    .map(str::to_string);
                Some(Header {
                    start: whole.start(),
                    number: parse_article_number(numeral),
                    title,
                })
            })
            .collect();

        let Some(first) = headers.first() else {
            warn!(
                "No article headers found, extracting from the first {} characters only",
                self.max_chunk_size
            );
            let end = byte_offset(text, self.max_chunk_size);
            return vec![DocumentSection {
                text: text[..end].to_string(),
                kind: SectionKind::Document,
                article_number: None,
                article_title: None,
                position: 0,
                start: 0,
                end,
            }];
        };

        let mut sections = Vec::new();

        if !text[..first.start].trim().is_empty() {
            self.push_span(&mut sections, text, 0, first.start, SectionKind::Preamble, None, None);
        }

        for (idx, header) in headers.iter().enumerate() {
            let end = headers.get(idx + 1).map_or(text.len(), |next| next.start);
            self.push_span(
                &mut sections,
                text,
                header.start,
                end,
                SectionKind::Article,
                Some(header.number),
                header.title.clone(),
            );
        }

        debug!(
            "Split {} chars into {} sections ({} article headers)",
            text.len(),
            sections.len(),
            headers.len()
        );

        sections
    }

    #[allow(clippy::too_many_arguments)]
    fn push_span(
        &self,
        sections: &mut Vec<DocumentSection>,
        text: &str,
        start: usize,
        end: usize,
        kind: SectionKind,
        article_number: Option<u32>,
        article_title: Option<String>,
    ) {
        let span = &text[start..end];
        let ranges = if span.chars().count() <= self.max_chunk_size {
            vec![(0, span.len())]
        } else {
            self.pack_paragraphs(span)
        };

        for (s, e) in ranges {
            sections.push(DocumentSection {
                text: span[s..e].to_string(),
                kind,
                article_number,
                article_title: article_title.clone(),
                position: sections.len(),
                start: start + s,
                end: start + e,
            });
        }
    }

    /// Greedily pack paragraphs into ranges of at most `max_chunk_size`
    /// characters. A pending range below `min_chunk_size` absorbs the next
    /// paragraph instead of being emitted, so a range may exceed the maximum
    /// by less than `min_chunk_size`.
    fn pack_paragraphs(&self, span: &str) -> Vec<(usize, usize)> {
        // (start, end, chars)
        let mut pieces = Vec::new();
        let mut offset = 0;
        for paragraph in span.split_inclusive("\n\n") {
            let chars = paragraph.chars().count();
            if chars > self.max_chunk_size {
                pieces.extend(
                    hard_split(paragraph, self.max_chunk_size)
                        .into_iter()
                        .map(|(s, e, c)| (offset + s, offset + e, c)),
                );
            } else {
                pieces.push((offset, offset + paragraph.len(), chars));
            }
            offset += paragraph.len();
        }

        let mut ranges = Vec::new();
        let mut current: Option<(usize, usize, usize)> = None;
        for (start, end, chars) in pieces {
            current = match current {
                None => Some((start, end, chars)),
                Some((cur_start, cur_end, cur_chars))
                    if cur_chars + chars > self.max_chunk_size
                        && cur_chars >= self.min_chunk_size =>
                {
                    ranges.push((cur_start, cur_end));
                    Some((start, end, chars))
                }
                Some((cur_start, _, cur_chars)) => Some((cur_start, end, cur_chars + chars)),
            };
        }
        if let Some((start, end, _)) = current {
            ranges.push((start, end));
        }
        ranges
    }
}

/// Byte offset of the `n`th character, or the text length
fn byte_offset(text: &str, n: usize) -> usize {
    text.char_indices().nth(n).map_or(text.len(), |(idx, _)| idx)
}

/// Cut text into pieces of at most `limit` characters
fn hard_split(text: &str, limit: usize) -> Vec<(usize, usize, usize)> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut count = 0;
    for (idx, _) in text.char_indices() {
        if count == limit {
            pieces.push((start, idx, count));
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if count > 0 {
        pieces.push((start, text.len(), count));
    }
    pieces
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: text without headers yields one bounded section at offset 0
        #[test]
        fn test_headerless_text_single_section(text in "[b-z \n]{0,300}") {
            let chunker = ArticleChunker::new(10, 100);
            let sections = chunker.split(&text);

            prop_assert_eq!(sections.len(), 1);
            prop_assert_eq!(sections[0].start, 0);
            prop_assert!(sections[0].char_len() <= 100);
            prop_assert!(text.starts_with(sections[0].text.as_str()));
        }

        /// Property: N headers yield at least N sections covering the text contiguously
        #[test]
        fn test_headers_cover_document(
            preamble in "[b-z ]{0,40}",
            articles in prop::collection::vec((1u32..=15, any::<bool>(), "[b-z .\n]{0,200}"), 1..8),
        ) {
            let mut text = format!("{}\n", preamble);
            for (number, roman, body) in &articles {
                let numeral = if *roman {
                    ROMAN_NUMERALS[(*number - 1) as usize].to_string()
                } else {
                    number.to_string()
                };
                text.push_str(&format!("ARTICLE {}: TITLE\n{}\n", numeral, body));
            }

            let chunker = ArticleChunker::new(20, 120);
            let sections = chunker.split(&text);

            prop_assert!(sections.len() >= articles.len());
            prop_assert!(text[..sections[0].start].trim().is_empty());
            for pair in sections.windows(2) {
                prop_assert_eq!(pair[0].end, pair[1].start);
            }
            for section in &sections {
                prop_assert_eq!(&text[section.start..section.end], section.text.as_str());
            }
            prop_assert_eq!(sections[sections.len() - 1].end, text.len());

            let numbered: Vec<u32> = sections.iter().filter_map(|s| s.article_number).collect();
            for (number, _, _) in &articles {
                prop_assert!(numbered.contains(number));
            }
        }
    }
}
