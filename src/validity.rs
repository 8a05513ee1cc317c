//! Junk and garbage detection for cleaned records.
//!
//! The extraction engine happily returns page headers, licence boilerplate,
//! page ranges and `ibid` cross references as if they were citations. The
//! [`ValidityFilter`] rejects those, reporting a [`RejectReason`] so that the
//! caller can count drops per category.
//!
//! A record is rejected when:
//!
//! - its title is empty
//! - its title plus first-contributor surname is shorter than the minimum
//!   content length (default [`DEFAULT_MIN_CONTENT_LENGTH`])
//! - its title is a cross reference (`ibid`, `op. cit.`, `idem`, ...)
//! - its title matches a junk pattern (punctuation runs, page numbers, IP
//!   addresses, publisher boilerplate, mostly non-letters)
//! - its title stops on a dangling article or conjunction
//! - it credits neither an author nor an editor (can be turned off)
//!
//! The pattern checks do not depend on the threshold, so lowering the threshold
//! never rejects a record that passed before.

use crate::clean::CleanedRecord;
use crate::regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Default minimum length of title plus contributor surname.
pub const DEFAULT_MIN_CONTENT_LENGTH: usize = 20;

/// Smallest share of letters among non-space title characters.
const MIN_LETTER_RATIO: f64 = 0.5;

static PUNCTUATION_RUN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[!-/:-@\[-`{-~]{4,}").unwrap());

/// A well-formed lowercase roman numeral below 1000, as used for front matter.
const ROMAN_NUMERAL: &str = r"(?:cm|cd|d?c{0,3})(?:xc|xl|l?x{0,3})(?:ix|iv|v?i{0,3})";

static PAGE_NUMBER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    let page = format!("(?:[0-9]+|{ROMAN_NUMERAL})");
    Regex::new(&format!(
        r"(?i)^(?:pp?\.?\s*)?{page}(?:\s*[-–—]\s*{page})?\.?$"
    ))
    .unwrap()
});

static IP_ADDRESS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^0-9.])[0-9]{1,3}(?:\.[0-9]{1,3}){3}(?:[^0-9.]|$)").unwrap());

const BOILERPLATE: [&str; 8] = [
    "this content downloaded from",
    "all use subject to",
    "jstor",
    "access provided by",
    "terms and conditions",
    "downloaded from",
    "all rights reserved",
    "for personal use only",
];

const CROSS_REFERENCE_TOKENS: [&str; 8] =
    ["ibid", "ibidem", "idem", "id", "op", "cit", "loc", "supra"];

/// Words that never close a title. Prepositions are left out: "Something to Live For".
const DANGLING_WORDS: [&str; 5] = ["the", "a", "an", "and", "of"];

/// Why a record was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// No title survived cleaning
    EmptyTitle,
    /// Title and contributor info together fall under the minimum length
    TooShort,
    /// Title is an `ibid`-style cross reference
    CrossReference,
    /// Title looks like extraction garbage
    JunkPattern,
    /// Title ends on a function word, i.e. a sentence fragment
    IncompleteTitle,
    /// Neither author nor editor survived cleaning
    NoContributor,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::EmptyTitle => "empty title",
            RejectReason::TooShort => "too short",
            RejectReason::CrossReference => "cross reference",
            RejectReason::JunkPattern => "junk pattern",
            RejectReason::IncompleteTitle => "incomplete title",
            RejectReason::NoContributor => "no contributor",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decides whether a cleaned record is a usable citation.
///
/// # Examples
///
/// ```
/// use pdfsources::clean::CleanedRecord;
/// use pdfsources::validity::{RejectReason, ValidityFilter};
///
/// let filter = ValidityFilter::default();
/// let record = CleanedRecord { title: "Ibid.".to_string(), ..Default::default() };
/// assert_eq!(filter.check(&record), Err(RejectReason::CrossReference));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidityFilter {
    min_content_length: usize,
    require_contributor: bool,
}

impl Default for ValidityFilter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_CONTENT_LENGTH)
    }
}

impl ValidityFilter {
    /// Creates a filter with the given minimum content length. Records without
    /// an author or editor are rejected unless
    /// [`with_require_contributor`](Self::with_require_contributor) turns that off.
    #[must_use]
    pub fn new(min_content_length: usize) -> Self {
        Self {
            min_content_length,
            require_contributor: true,
        }
    }

    #[must_use]
    pub fn with_require_contributor(mut self, require_contributor: bool) -> Self {
        self.require_contributor = require_contributor;
        self
    }

    pub fn min_content_length(&self) -> usize {
        self.min_content_length
    }

    pub fn require_contributor(&self) -> bool {
        self.require_contributor
    }

    /// Whether the record is a usable citation.
    pub fn is_valid(&self, record: &CleanedRecord) -> bool {
        self.check(record).is_ok()
    }

    /// Checks a record, returning the first reason it fails.
    ///
    /// # Errors
    ///
    /// Returns the [`RejectReason`] of the first failed check.
    pub fn check(&self, record: &CleanedRecord) -> Result<(), RejectReason> {
        let title = record.title.trim();
        if title.is_empty() {
            return Err(RejectReason::EmptyTitle);
        }
        if is_cross_reference(title) {
            return Err(RejectReason::CrossReference);
        }
        if is_junk(title) {
            return Err(RejectReason::JunkPattern);
        }
        if ends_on_dangling_word(title) {
            return Err(RejectReason::IncompleteTitle);
        }
        if self.require_contributor && record.first_contributor().is_none() {
            return Err(RejectReason::NoContributor);
        }
        if content_length(record) < self.min_content_length {
            return Err(RejectReason::TooShort);
        }
        Ok(())
    }
}

/// Title length plus the surname length of the first author or editor.
fn content_length(record: &CleanedRecord) -> usize {
    let contributor = record
        .first_contributor()
        .and_then(|p| p.full_family().or_else(|| p.given.clone()))
        .map_or(0, |name| name.chars().count());
    record.title.chars().count() + contributor
}

fn words(title: &str) -> Vec<String> {
    title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// True when the title is, or is dominated by, a short-form cross reference.
fn is_cross_reference(title: &str) -> bool {
    let words: Vec<String> = words(title)
        .into_iter()
        .filter(|w| !w.chars().all(|c| c.is_ascii_digit()))
        .collect();
    if words.is_empty() {
        return false;
    }
    let has_marker = words
        .iter()
        .any(|w| matches!(w.as_str(), "ibid" | "ibidem" | "idem" | "cit" | "supra"));
    let references = words
        .iter()
        .filter(|w| CROSS_REFERENCE_TOKENS.contains(&w.as_str()))
        .count();
    has_marker && references * 2 >= words.len()
}

fn is_junk(title: &str) -> bool {
    let lowered = title.to_lowercase();
    if BOILERPLATE.iter().any(|b| lowered.contains(b)) {
        return true;
    }
    if PAGE_NUMBER_REGEX.is_match(title)
        || PUNCTUATION_RUN_REGEX.is_match(title)
        || IP_ADDRESS_REGEX.is_match(title)
    {
        return true;
    }

    let visible: Vec<char> = title.chars().filter(|c| !c.is_whitespace()).collect();
    let letters = visible.iter().filter(|c| c.is_alphabetic()).count();
    (letters as f64) < (visible.len() as f64) * MIN_LETTER_RATIO
}

fn ends_on_dangling_word(title: &str) -> bool {
    // A trailing period or question mark means the extractor saw a finished title.
    if title.ends_with(['.', '?', '!']) {
        return false;
    }
    let words = words(title);
    words.len() > 2
        && words
            .last()
            .is_some_and(|w| DANGLING_WORDS.contains(&w.as_str()))
}
