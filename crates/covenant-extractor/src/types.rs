//! Section and strategy types for extraction

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a section came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectionKind {
    /// Text before the first article header
    Preamble,
    /// An article, or part of an oversized article
    Article,
    /// The leading slice of a document with no article headers
    Document,
}

/// A contiguous span of the source document
///
/// `start` and `end` are byte offsets on character boundaries, so
/// `&source[start..end] == text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSection {
    /// The section text, verbatim
    pub text: String,

    /// How the section was produced
    pub kind: SectionKind,

    /// Article number; 0 if the numeral was not recognised
    pub article_number: Option<u32>,

    /// Article title from the header line
    pub article_title: Option<String>,

    /// Position in the section sequence
    pub position: usize,

    /// Start offset in the source (inclusive)
    pub start: usize,

    /// End offset in the source (exclusive)
    pub end: usize,
}

impl DocumentSection {
    /// Human-readable label, e.g. "Article IV: Events of Default"
    pub fn label(&self) -> String {
        match self.kind {
            SectionKind::Preamble => "Preamble".to_string(),
            SectionKind::Document => "Document".to_string(),
            SectionKind::Article => {
                let mut label = match self.article_number {
                    Some(n) if n > 0 => format!("Article {}", to_roman(n)),
                    _ => "Article".to_string(),
                };
                if let Some(title) = &self.article_title {
                    label.push_str(": ");
                    label.push_str(title);
                }
                label
            }
        }
    }

    /// Length of the section in characters
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

fn to_roman(mut n: u32) -> String {
    const NUMERALS: [(u32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];

    let mut out = String::new();
    for (value, numeral) in NUMERALS {
        while n >= value {
            out.push_str(numeral);
            n -= value;
        }
    }
    out
}

/// How a document is extracted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    /// One capability call over the whole document, retried on validation faults
    SinglePass,
    /// Partial extraction per section, reduced into one agreement
    MapReduce,
}

impl fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionStrategy::SinglePass => f.write_str("single-pass"),
            ExtractionStrategy::MapReduce => f.write_str("map-reduce"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(kind: SectionKind, number: Option<u32>, title: Option<&str>) -> DocumentSection {
        DocumentSection {
            text: String::new(),
            kind,
            article_number: number,
            article_title: title.map(str::to_string),
            position: 0,
            start: 0,
            end: 0,
        }
    }

    #[test]
    fn test_article_label() {
        let s = section(SectionKind::Article, Some(4), Some("Events of Default"));
        assert_eq!(s.label(), "Article IV: Events of Default");
    }

    #[test]
    fn test_article_label_without_title_or_number() {
        assert_eq!(section(SectionKind::Article, Some(12), None).label(), "Article XII");
        assert_eq!(section(SectionKind::Article, Some(0), Some("Misc")).label(), "Article: Misc");
    }

    #[test]
    fn test_preamble_and_document_labels() {
        assert_eq!(section(SectionKind::Preamble, None, None).label(), "Preamble");
        assert_eq!(section(SectionKind::Document, None, None).label(), "Document");
    }

    #[test]
    fn test_to_roman() {
        assert_eq!(to_roman(1), "I");
        assert_eq!(to_roman(9), "IX");
        assert_eq!(to_roman(14), "XIV");
        assert_eq!(to_roman(40), "XL");
    }

    #[test]
    fn test_strategy_display() {
        assert_eq!(ExtractionStrategy::SinglePass.to_string(), "single-pass");
        assert_eq!(ExtractionStrategy::MapReduce.to_string(), "map-reduce");
    }
}
