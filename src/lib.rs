//! Turn noisy, machine-extracted citation records into clean, deduplicated bibliographies.
//!
//! `pdfsources` consumes the JSON records produced by a reference-extraction engine
//! (such as anystyle) run over PDF or EPUB documents, and produces markdown
//! bibliographies in Chicago, APA or Harvard style.
//!
//! # Pipeline
//!
//! Every record flows through the same stages:
//!
//! 1. [`clean`](clean::clean) normalizes field values: unescapes extraction artifacts,
//!    decodes HTML entities, strips markup, collapses whitespace and fixes name casing.
//! 2. [`ValidityFilter`](validity::ValidityFilter) drops junk: empty or too-short titles,
//!    boilerplate, page numbers, `ibid`-style cross references.
//! 3. [`infer_type`](classify::infer_type) assigns a [`CitationType`] from an ordered rule list.
//! 4. [`Deduplicator`](dedupe::Deduplicator) merges records sharing a signature across
//!    every input document.
//! 5. A [`CitationFormatter`](format::CitationFormatter) renders each record, and the
//!    [`ReportAssembler`](report::ReportAssembler) groups the results into markdown reports.
//!
//! # Basic Usage
//!
//! ```rust
//! use pdfsources::pipeline::{process, PipelineConfig};
//! use pdfsources::report::{ReportAssembler, ReportShape};
//! use pdfsources::raw::SourceDocument;
//!
//! let input = r#"[{
//!     "title": ["The Rise of Modern Japan"],
//!     "author": [{"family": "SMITH", "given": "JOHN"}],
//!     "date": ["1990"],
//!     "publisher": ["Oxford University Press"],
//!     "location": ["Oxford"]
//! }]"#;
//!
//! let document = SourceDocument::from_json("anystyle-japan.json", input).unwrap();
//! let config = PipelineConfig::default();
//! let bibliography = process(&[document], &config);
//!
//! let assembler = ReportAssembler::new(config.style);
//! let markdown = assembler.render(ReportShape::Combined, &bibliography);
//! assert!(markdown.contains("Smith, John. *The Rise of Modern Japan*."));
//! ```
//!
//! # Error Handling
//!
//! Record-level defects never fail the run: they are counted in
//! [`ProcessingStats`](pipeline::ProcessingStats). The crate [`Result`] type wraps
//! [`CitationError`] for the few operations that can fail, such as decoding
//! upstream JSON or parsing a style name:
//!
//! ```rust
//! use pdfsources::{CitationError, format::CitationStyle};
//!
//! match "mla".parse::<CitationStyle>() {
//!     Ok(style) => println!("Using {style}"),
//!     Err(CitationError::UnknownStyle(name)) => eprintln!("No such style: {name}"),
//!     Err(e) => eprintln!("Other error: {e}"),
//! }
//! ```

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub mod classify;
pub mod clean;
pub mod dedupe;
pub mod format;
pub mod pipeline;
pub mod raw;
mod regex;
pub mod report;
mod utils;
pub mod validity;

// Reexports
pub use clean::{CleanedRecord, clean};
pub use format::{CitationFormatter, CitationStyle};
pub use pipeline::{Bibliography, PipelineConfig, process};
pub use raw::{RawCitationRecord, SourceDocument};
pub use report::{ReportAssembler, ReportShape};

/// A specialized Result type for citation operations.
pub type Result<T> = std::result::Result<T, CitationError>;

/// Errors surfaced by the citation core.
///
/// Record-level defects (empty titles, junk, malformed names) are not errors;
/// see [`validity::RejectReason`].
#[derive(Error, Debug)]
pub enum CitationError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown citation style: {0}")]
    UnknownStyle(String),

    #[error("Unknown report shape: {0}")]
    UnknownReportShape(String),

    #[error("Unknown citation type: {0}")]
    UnknownCitationType(String),

    #[error("Invalid configuration value: {field} - {message}")]
    InvalidConfig { field: String, message: String },
}

/// A person credited on a citation, as author or editor.
///
/// The name particle (`van`, `de`, `von der`, ...) is kept apart from the family
/// name so that it can be rendered lowercase in front of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PersonName {
    /// The family name (surname), without particle
    pub family: Option<String>,
    /// The given name(s)
    pub given: Option<String>,
    /// Lowercase particle attached to the family name
    pub particle: Option<String>,
}

impl PersonName {
    /// Family name with its particle, e.g. `van der Berg`.
    pub fn full_family(&self) -> Option<String> {
        match (&self.particle, &self.family) {
            (Some(particle), Some(family)) => Some(format!("{particle} {family}")),
            (None, Some(family)) => Some(family.clone()),
            (Some(particle), None) => Some(particle.clone()),
            (None, None) => None,
        }
    }

    /// Whether the name carries nothing printable.
    pub fn is_empty(&self) -> bool {
        self.family.is_none() && self.given.is_none()
    }
}

/// The category a citation is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CitationType {
    Book,
    Article,
    Chapter,
    Thesis,
    Report,
    #[default]
    Other,
}

impl CitationType {
    /// Every type, in report order.
    pub const ALL: [CitationType; 6] = [
        CitationType::Book,
        CitationType::Article,
        CitationType::Chapter,
        CitationType::Thesis,
        CitationType::Report,
        CitationType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CitationType::Book => "book",
            CitationType::Article => "article",
            CitationType::Chapter => "chapter",
            CitationType::Thesis => "thesis",
            CitationType::Report => "report",
            CitationType::Other => "other",
        }
    }

    /// Heading used for this type in divided reports.
    pub fn label(&self) -> &'static str {
        match self {
            CitationType::Book => "Books",
            CitationType::Article => "Articles",
            CitationType::Chapter => "Chapters",
            CitationType::Thesis => "Theses",
            CitationType::Report => "Reports",
            CitationType::Other => "Other",
        }
    }

    /// Maps an upstream type hint (CSL, BibTeX or anystyle vocabulary) onto a known category.
    ///
    /// Returns `None` for hints that name no known category, so that the
    /// classifier can fall through to its field-based rules.
    pub fn from_hint(hint: &str) -> Option<Self> {
        let hint = hint.trim().to_lowercase();
        if hint.is_empty() {
            return None;
        }
        if hint.contains("chapter")
            || matches!(
                hint.as_str(),
                "incollection" | "inbook" | "paper-conference" | "inproceedings" | "entry-encyclopedia"
            )
        {
            Some(CitationType::Chapter)
        } else if hint.starts_with("article") || hint == "journal" {
            Some(CitationType::Article)
        } else if hint.contains("thesis") || hint.contains("dissertation") {
            Some(CitationType::Thesis)
        } else if hint.contains("report") || hint == "working-paper" {
            Some(CitationType::Report)
        } else if hint == "book" || hint == "monograph" || hint == "booklet" {
            Some(CitationType::Book)
        } else {
            None
        }
    }
}

impl fmt::Display for CitationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CitationType {
    type Err = CitationError;

    /// Parses the exact category names produced by [`CitationType::as_str`].
    fn from_str(s: &str) -> Result<Self> {
        CitationType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CitationError::UnknownCitationType(s.to_string()))
    }
}

/// A cleaned, validated and typed citation.
///
/// Every downstream consumer (deduplicator, formatters, reports) works on this
/// type. A `CanonicalCitation` always has a non-empty title, and `signature` is
/// derived from its title, first contributor and year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalCitation {
    /// Title of the work
    pub title: String,
    /// Authors, in credited order
    pub authors: Vec<PersonName>,
    /// Editors, used in place of authors when there are none
    pub editors: Vec<PersonName>,
    /// Four-digit publication year
    pub year: Option<i32>,
    /// Journal or book the work appears in
    pub container_title: Option<String>,
    /// Publisher name
    pub publisher: Option<String>,
    /// Place of publication
    pub location: Option<String>,
    /// Volume number
    pub volume: Option<String>,
    /// Issue number
    pub issue: Option<String>,
    /// Page range
    pub pages: Option<String>,
    /// Edition statement
    pub edition: Option<String>,
    /// Free-form note from the extraction engine
    pub note: Option<String>,
    /// Inferred category
    pub citation_type: CitationType,
    /// Input documents the citation was found in, first-seen first
    pub source_files: Vec<String>,
    /// Deduplication key
    pub signature: CompactString,
}

impl CanonicalCitation {
    /// Builds a canonical citation from a cleaned record that passed validation.
    pub fn from_cleaned(
        cleaned: CleanedRecord,
        citation_type: CitationType,
        source_file: impl Into<String>,
    ) -> Self {
        let signature = dedupe::signature(
            &cleaned.title,
            cleaned.first_contributor(),
            cleaned.year,
        );
        Self {
            title: cleaned.title,
            authors: cleaned.authors,
            editors: cleaned.editors,
            year: cleaned.year,
            container_title: cleaned.container_title,
            publisher: cleaned.publisher,
            location: cleaned.location,
            volume: cleaned.volume,
            issue: cleaned.issue,
            pages: cleaned.pages,
            edition: cleaned.edition,
            note: cleaned.note,
            citation_type,
            source_files: vec![source_file.into()],
            signature,
        }
    }

    /// The document this citation was first seen in.
    pub fn source_file(&self) -> &str {
        self.source_files.first().map(String::as_str).unwrap_or_default()
    }

    /// Authors, or editors when no author is credited.
    pub fn contributors(&self) -> (&[PersonName], bool) {
        if self.authors.is_empty() {
            (&self.editors, !self.editors.is_empty())
        } else {
            (&self.authors, false)
        }
    }

    /// Key used to alphabetize reports: first author surname, else title.
    pub fn sort_key(&self) -> String {
        self.authors
            .first()
            .and_then(|a| a.family.as_deref())
            .unwrap_or(&self.title)
            .to_lowercase()
    }

    /// Number of populated publication fields, used to pick between duplicates.
    pub(crate) fn ancillary_richness(&self) -> usize {
        [&self.publisher, &self.location, &self.container_title]
            .into_iter()
            .filter(|f| f.is_some())
            .count()
    }
}

/// A group of citations sharing one signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// The first-seen citation
    pub unique: CanonicalCitation,
    /// Later citations with the same signature
    pub duplicates: Vec<CanonicalCitation>,
}
