//! Citation deduplicator implementation.
//!
//! Citations are pooled across every input document before deduplication: the
//! same reference commonly appears in more than one source, and the
//! source-grouped reports need to know every document a citation came from.
//!
//! ## Signature
//!
//! Two citations are duplicates when their signatures are equal. A signature
//! joins three normalized parts with `|`:
//!
//! 1. The title, lowercased, with punctuation turned into word breaks
//!    (apostrophes dropped), a leading article (`the`, `a`, `an`) removed and
//!    whitespace collapsed to single spaces
//! 2. The surname of the first author, or of the first editor when there are no
//!    authors
//! 3. The year, when known
//!
//! ## Merging
//!
//! - The first-seen citation of each group stays canonical (title, names, year)
//! - Source documents of all duplicates are unioned, first-seen order
//! - Publisher, location and container title (with volume, issue, pages and
//!   edition) come from the group member with the most of those populated;
//!   ties go to the earliest
//!
//! ## Usage
//!
//! ```rust
//! use pdfsources::{CanonicalCitation, CitationType, clean::CleanedRecord};
//! use pdfsources::dedupe::Deduplicator;
//!
//! let record = |title: &str| CleanedRecord {
//!     title: title.to_string(),
//!     year: Some(1990),
//!     ..Default::default()
//! };
//! let pool = vec![
//!     CanonicalCitation::from_cleaned(record("The Rise of Modern Japan"), CitationType::Book, "a.json"),
//!     CanonicalCitation::from_cleaned(record("the rise of modern japan "), CitationType::Book, "b.json"),
//! ];
//!
//! let deduplicated = Deduplicator::new().deduplicate(pool);
//! assert_eq!(deduplicated.len(), 1);
//! assert_eq!(deduplicated[0].source_files, vec!["a.json", "b.json"]);
//! ```

use crate::{CanonicalCitation, CitationType, DuplicateGroup, PersonName};
use compact_str::{CompactString, format_compact};
use serde::Deserialize;
use std::collections::HashMap;

const LEADING_ARTICLES: [&str; 3] = ["the", "a", "an"];

/// Configuration options for the deduplication stage.
///
/// # Examples
///
/// ```
/// use pdfsources::dedupe::{Deduplicator, DeduplicatorConfig};
///
/// // Keep raw duplicate counts per source
/// let deduplicator = Deduplicator::new().with_config(DeduplicatorConfig { enabled: false });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DeduplicatorConfig {
    /// When false, [`Deduplicator::deduplicate`] passes the pool through unchanged.
    pub enabled: bool,
}

impl Default for DeduplicatorConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Signature-based deduplication engine.
///
/// Runs in O(n) over the pool: each citation is looked up by signature in a
/// map of the groups seen so far.
#[derive(Debug, Default, Clone)]
pub struct Deduplicator {
    config: DeduplicatorConfig,
}

impl Deduplicator {
    /// Creates a new Deduplicator with default configuration (enabled).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new Deduplicator with custom configuration.
    #[must_use]
    pub fn with_config(mut self, config: DeduplicatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &DeduplicatorConfig {
        &self.config
    }

    /// Groups citations sharing a signature.
    ///
    /// Groups come back in the order of their first member; inside a group,
    /// duplicates keep pool order. Runs regardless of
    /// [`DeduplicatorConfig::enabled`].
    pub fn find_duplicates(&self, citations: &[CanonicalCitation]) -> Vec<DuplicateGroup> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut groups: Vec<DuplicateGroup> = Vec::new();

        for citation in citations {
            match index.get(citation.signature.as_str()) {
                Some(&position) => {
                    tracing::trace!(
                        signature = %citation.signature,
                        source = citation.source_file(),
                        "duplicate signature"
                    );
                    groups[position].duplicates.push(citation.clone());
                }
                None => {
                    index.insert(citation.signature.as_str(), groups.len());
                    groups.push(DuplicateGroup {
                        unique: citation.clone(),
                        duplicates: Vec::new(),
                    });
                }
            }
        }

        groups
    }

    /// Merges duplicates in the pool, returning one citation per signature.
    ///
    /// When deduplication is disabled the pool is returned as is.
    pub fn deduplicate(&self, citations: Vec<CanonicalCitation>) -> Vec<CanonicalCitation> {
        if !self.config.enabled {
            return citations;
        }

        let before = citations.len();
        let merged: Vec<CanonicalCitation> = self
            .find_duplicates(&citations)
            .into_iter()
            .map(Self::merge_group)
            .collect();

        tracing::debug!(before, after = merged.len(), "deduplicated citation pool");
        merged
    }

    fn merge_group(group: DuplicateGroup) -> CanonicalCitation {
        let DuplicateGroup {
            mut unique,
            duplicates,
        } = group;
        if duplicates.is_empty() {
            return unique;
        }

        for duplicate in &duplicates {
            for source in &duplicate.source_files {
                if !unique.source_files.contains(source) {
                    unique.source_files.push(source.clone());
                }
            }
        }

        // Strictly richer only, so ties stay with the first-seen citation
        let mut donor: Option<&CanonicalCitation> = None;
        let mut best = unique.ancillary_richness();
        for duplicate in &duplicates {
            let richness = duplicate.ancillary_richness();
            if richness > best {
                best = richness;
                donor = Some(duplicate);
            }
        }

        if let Some(donor) = donor {
            unique.container_title = donor.container_title.clone();
            unique.publisher = donor.publisher.clone();
            unique.location = donor.location.clone();
            unique.volume = donor.volume.clone();
            unique.issue = donor.issue.clone();
            unique.pages = donor.pages.clone();
            unique.edition = donor.edition.clone();
            if unique.citation_type == CitationType::Other {
                unique.citation_type = donor.citation_type;
            }
        }

        unique
    }
}

/// Computes the deduplication signature of a citation.
///
/// Deterministic in its inputs. The contributor is the first author, or the
/// first editor when there are no authors.
pub fn signature(
    title: &str,
    first_contributor: Option<&PersonName>,
    year: Option<i32>,
) -> CompactString {
    let title = normalize_title(title);
    let surname = first_contributor
        .and_then(|p| p.family.as_deref().or(p.given.as_deref()))
        .map(normalize_string)
        .unwrap_or_default();
    let year = year.map(|y| y.to_string()).unwrap_or_default();
    format_compact!("{title}|{surname}|{year}")
}

/// Lowercases, splits on punctuation, drops one leading article and joins the
/// remaining words with single spaces.
fn normalize_title(title: &str) -> String {
    let lowered: String = title
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '\'' | '’'))
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    let words: Vec<&str> = lowered.split_whitespace().collect();

    let skip = match words.first() {
        Some(first) if words.len() > 1 && LEADING_ARTICLES.contains(first) => 1,
        _ => 0,
    };
    words[skip..].join(" ")
}

fn normalize_string(string: &str) -> String {
    string
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}
