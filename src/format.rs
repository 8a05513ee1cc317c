//! Citation style formatters.
//!
//! Each style implements [`CitationFormatter`] and renders a
//! [`CanonicalCitation`] into a single markdown line. Field values are passed
//! through [`escape_markdown`] before assembly, so the only markdown in the
//! output is the emphasis the style itself adds.
//!
//! | Type | Title markup |
//! |------|--------------|
//! | book, thesis, report | italic |
//! | article, chapter, other | quoted, container italic |
//!
//! A missing year drops its segment; no style prints a placeholder.
//!
//! # Example
//!
//! ```
//! use pdfsources::format::CitationStyle;
//! use pdfsources::{CanonicalCitation, CitationType, PersonName, clean::CleanedRecord};
//!
//! let record = CleanedRecord {
//!     title: "Test Article Title".to_string(),
//!     authors: vec![PersonName {
//!         family: Some("Smith".to_string()),
//!         given: Some("John".to_string()),
//!         particle: None,
//!     }],
//!     year: Some(2024),
//!     container_title: Some("Journal of Testing".to_string()),
//!     ..Default::default()
//! };
//! let citation = CanonicalCitation::from_cleaned(record, CitationType::Article, "a.json");
//!
//! let apa = CitationStyle::Apa.formatter().format(&citation);
//! assert_eq!(apa, "Smith, J. (2024). \"Test Article Title.\" *Journal of Testing*.");
//! ```

mod apa;
mod chicago;
mod harvard;

pub use apa::ApaFormatter;
pub use chicago::ChicagoFormatter;
pub use harvard::HarvardFormatter;

use crate::{CanonicalCitation, CitationError, CitationType, PersonName, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Trait for implementing citation style formatters.
pub trait CitationFormatter: Send + Sync {
    /// The style this formatter renders.
    fn style(&self) -> CitationStyle;

    /// Renders one citation as a markdown-safe string.
    ///
    /// Deterministic: the same citation always renders the same string.
    fn format(&self, citation: &CanonicalCitation) -> String;
}

/// Supported citation styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CitationStyle {
    #[default]
    Chicago,
    Apa,
    Harvard,
}

impl CitationStyle {
    pub const ALL: [CitationStyle; 3] = [
        CitationStyle::Chicago,
        CitationStyle::Apa,
        CitationStyle::Harvard,
    ];

    /// Display name used in report headings.
    pub fn name(&self) -> &'static str {
        match self {
            CitationStyle::Chicago => "Chicago",
            CitationStyle::Apa => "APA",
            CitationStyle::Harvard => "Harvard",
        }
    }

    /// The formatter for this style.
    pub fn formatter(&self) -> &'static dyn CitationFormatter {
        match self {
            CitationStyle::Chicago => &ChicagoFormatter,
            CitationStyle::Apa => &ApaFormatter,
            CitationStyle::Harvard => &HarvardFormatter,
        }
    }
}

impl fmt::Display for CitationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CitationStyle {
    type Err = CitationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "chicago" => Ok(CitationStyle::Chicago),
            "apa" => Ok(CitationStyle::Apa),
            "harvard" => Ok(CitationStyle::Harvard),
            _ => Err(CitationError::UnknownStyle(s.to_string())),
        }
    }
}

/// Escapes characters with markdown meaning: `\ * _ [ ] ` < > &`.
///
/// `&` is escaped so that leftover entity-like text such as `&bogus;` prints
/// literally instead of being resolved by the markdown renderer.
///
/// # Examples
///
/// ```
/// use pdfsources::format::escape_markdown;
///
/// assert_eq!(escape_markdown("A Study of [Things]"), r"A Study of \[Things\]");
/// assert_eq!(escape_markdown("<b>*bold*</b>"), r"\<b\>\*bold\*\</b\>");
/// assert_eq!(escape_markdown("Smith & Sons"), r"Smith \& Sons");
/// ```
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '*' | '_' | '[' | ']' | '`' | '<' | '>' | '&') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Whether the title is set in italics rather than quoted.
pub(crate) fn is_standalone(citation_type: CitationType) -> bool {
    matches!(
        citation_type,
        CitationType::Book | CitationType::Thesis | CitationType::Report
    )
}

/// Appends `end` unless the text already closes a sentence.
pub(crate) fn terminate(text: &str, end: char) -> String {
    if text.is_empty() || text.ends_with(['.', '?', '!']) {
        text.to_string()
    } else {
        format!("{text}{end}")
    }
}

pub(crate) fn italic(text: &str) -> String {
    format!("*{text}*")
}

/// Escaped value of an optional field, `None` when absent or blank.
pub(crate) fn field(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(escape_markdown)
}

/// `Family, Given`, or whichever half exists.
pub(crate) fn inverted_name(person: &PersonName) -> Option<String> {
    match (person.full_family(), person.given.as_deref()) {
        (Some(family), Some(given)) => Some(format!("{family}, {given}")),
        (Some(family), None) => Some(family),
        (None, Some(given)) => Some(given.to_string()),
        (None, None) => None,
    }
}

/// `Given Family`, or whichever half exists.
pub(crate) fn natural_name(person: &PersonName) -> Option<String> {
    match (person.given.as_deref(), person.full_family()) {
        (Some(given), Some(family)) => Some(format!("{given} {family}")),
        (None, Some(family)) => Some(family),
        (Some(given), None) => Some(given.to_string()),
        (None, None) => None,
    }
}

/// Reduces given names to initials: `John Paul` -> `J. P.`, `Jean-Luc` -> `J.-L.`
pub(crate) fn initials(given: &str) -> String {
    given
        .split(|c: char| c.is_whitespace() || c == '.')
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.split('-')
                .filter_map(|piece| piece.chars().next())
                .map(|c| format!("{}.", c.to_uppercase()))
                .collect::<Vec<_>>()
                .join("-")
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Joins names with `separator`, using `last` before the final one.
pub(crate) fn join_names(names: &[String], separator: &str, last: &str) -> String {
    match names {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., final_name] => format!("{}{last}{final_name}", init.join(separator)),
    }
}

/// `Location: Publisher`, or whichever half exists.
pub(crate) fn publication(citation: &CanonicalCitation) -> Option<String> {
    match (
        field(citation.location.as_ref()),
        field(citation.publisher.as_ref()),
    ) {
        (Some(location), Some(publisher)) => Some(format!("{location}: {publisher}")),
        (location, publisher) => location.or(publisher),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::CleanedRecord;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    pub(crate) fn person(family: &str, given: &str) -> PersonName {
        PersonName {
            family: Some(family.to_string()),
            given: Some(given.to_string()),
            particle: None,
        }
    }

    pub(crate) fn citation(
        title: &str,
        authors: Vec<PersonName>,
        year: Option<i32>,
        citation_type: CitationType,
    ) -> CanonicalCitation {
        CanonicalCitation::from_cleaned(
            CleanedRecord {
                title: title.to_string(),
                authors,
                year,
                ..Default::default()
            },
            citation_type,
            "a.json",
        )
    }

    #[rstest]
    #[case("chicago", CitationStyle::Chicago)]
    #[case("APA", CitationStyle::Apa)]
    #[case(" Harvard ", CitationStyle::Harvard)]
    fn test_style_from_str(#[case] input: &str, #[case] expected: CitationStyle) {
        assert_eq!(input.parse::<CitationStyle>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_style() {
        assert!(matches!(
            "mla".parse::<CitationStyle>(),
            Err(CitationError::UnknownStyle(name)) if name == "mla"
        ));
    }

    #[test]
    fn test_formatter_matches_style() {
        for style in CitationStyle::ALL {
            assert_eq!(style.formatter().style(), style);
        }
    }

    #[test]
    fn test_escape_markdown() {
        assert_eq!(escape_markdown(r"a_b\c`d`"), r"a\_b\\c\`d\`");
        assert_eq!(escape_markdown("plain text"), "plain text");
    }

    #[rstest]
    #[case("John", "J.")]
    #[case("John Paul", "J. P.")]
    #[case("J.R.R.", "J. R. R.")]
    #[case("Jean-Luc", "J.-L.")]
    #[case("émile", "É.")]
    fn test_initials(#[case] given: &str, #[case] expected: &str) {
        assert_eq!(initials(given), expected);
    }

    #[test]
    fn test_join_names() {
        let names = ["A".to_string(), "B".to_string(), "C".to_string()];
        assert_eq!(join_names(&names[..1], ", ", " and "), "A");
        assert_eq!(join_names(&names[..2], ", ", " and "), "A and B");
        assert_eq!(join_names(&names, ", ", ", and "), "A, B, and C");
    }

    #[test]
    fn test_terminate() {
        assert_eq!(terminate("Smith, J.", '.'), "Smith, J.");
        assert_eq!(terminate("Why?", '.'), "Why?");
        assert_eq!(terminate("Smith, John", '.'), "Smith, John.");
    }

    #[test]
    fn test_markdown_characters_escaped_in_every_style() {
        let citation = citation(
            "Stars *and* <Stripes> of_the [World]",
            vec![person("O_Brien", "Pat")],
            Some(2001),
            CitationType::Book,
        );
        for style in CitationStyle::ALL {
            let formatted = style.formatter().format(&citation);
            assert!(formatted.contains(r"Stars \*and\* \<Stripes\> of\_the \[World\]"));
            assert!(formatted.contains(r"O\_Brien"));
        }
    }

    #[test]
    fn test_markdown_characters_escaped_in_quoted_and_ancillary_fields() {
        let mut citation = citation(
            "Notes on `code` & <Tags>",
            vec![person("Smith", "John")],
            Some(2001),
            CitationType::Article,
        );
        citation.container_title = Some("Journal_of *Stars*".to_string());
        citation.publisher = Some("[Oxford] Press".to_string());
        citation.location = Some("Ox_ford".to_string());
        citation.pages = Some("1&2".to_string());

        for style in CitationStyle::ALL {
            let formatted = style.formatter().format(&citation);
            assert!(
                formatted.contains(r"Notes on \`code\` \& \<Tags\>"),
                "{style}: {formatted}"
            );
            assert!(formatted.contains(r"*Journal\_of \*Stars\**"), "{style}: {formatted}");
            assert!(formatted.contains(r"Ox\_ford: \[Oxford\] Press"), "{style}: {formatted}");
            assert!(formatted.contains(r"1\&2"), "{style}: {formatted}");
        }
    }

    #[test]
    fn test_missing_year_has_no_placeholder() {
        let citation = citation(
            "Undated Pamphlet on Rural Credit",
            vec![person("Smith", "John")],
            None,
            CitationType::Other,
        );
        for style in CitationStyle::ALL {
            let formatted = style.formatter().format(&citation);
            assert!(!formatted.contains("n.d."));
            assert!(!formatted.contains("()"));
            assert!(!formatted.contains(",."));
            assert!(!formatted.contains(" ,"));
        }
    }

    #[test]
    fn test_container_included_for_articles_and_chapters() {
        for citation_type in [CitationType::Article, CitationType::Chapter] {
            let mut citation = citation(
                "Test Article Title",
                vec![person("Smith", "John")],
                Some(2024),
                citation_type,
            );
            citation.container_title = Some("Journal of Testing".to_string());
            for style in CitationStyle::ALL {
                let formatted = style.formatter().format(&citation);
                assert!(
                    formatted.contains("*Journal of Testing*"),
                    "{style} {citation_type}: {formatted}"
                );
            }
        }
    }
}
