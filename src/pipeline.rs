//! End-to-end processing of extracted documents.
//!
//! [`process`] runs every record of every document through cleaning,
//! validation and classification, pools the surviving citations and
//! deduplicates the pool in a single pass.
//!
//! Cleaning is independent per document and may run on the rayon thread pool
//! (feature `parallel`, [`PipelineConfig::run_in_parallel`]). Results are
//! pooled in input order either way, so the output does not depend on the
//! setting.

use crate::classify::infer_type;
use crate::clean::clean;
use crate::dedupe::{Deduplicator, DeduplicatorConfig};
use crate::format::CitationStyle;
use crate::raw::SourceDocument;
use crate::validity::{DEFAULT_MIN_CONTENT_LENGTH, RejectReason, ValidityFilter};
use crate::{CanonicalCitation, CitationError, Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Values the surrounding application passes into the core.
///
/// Deserializes with every field optional, so a partial configuration table
/// falls back to the defaults.
///
/// # Examples
///
/// ```
/// use pdfsources::format::CitationStyle;
/// use pdfsources::pipeline::PipelineConfig;
///
/// let config = PipelineConfig::default()
///     .with_style(CitationStyle::Apa)
///     .with_min_content_length(30);
/// assert!(config.validate().is_ok());
/// assert!(config.dedupe);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Citation style used for reports
    pub style: CitationStyle,
    /// Merge duplicate citations across documents
    pub dedupe: bool,
    /// Minimum length of title plus first-contributor surname
    pub min_content_length: usize,
    /// Drop records that credit neither an author nor an editor
    pub require_contributor: bool,
    /// Clean documents on the rayon thread pool
    pub run_in_parallel: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            style: CitationStyle::default(),
            dedupe: true,
            min_content_length: DEFAULT_MIN_CONTENT_LENGTH,
            require_contributor: true,
            run_in_parallel: false,
        }
    }
}

impl PipelineConfig {
    #[must_use]
    pub fn with_style(mut self, style: CitationStyle) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub fn with_dedupe(mut self, dedupe: bool) -> Self {
        self.dedupe = dedupe;
        self
    }

    #[must_use]
    pub fn with_min_content_length(mut self, min_content_length: usize) -> Self {
        self.min_content_length = min_content_length;
        self
    }

    #[must_use]
    pub fn with_require_contributor(mut self, require_contributor: bool) -> Self {
        self.require_contributor = require_contributor;
        self
    }

    #[must_use]
    pub fn with_parallel(mut self, run_in_parallel: bool) -> Self {
        self.run_in_parallel = run_in_parallel;
        self
    }

    /// Checks the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `CitationError::InvalidConfig` if `min_content_length` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.min_content_length == 0 {
            return Err(CitationError::InvalidConfig {
                field: "min_content_length".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingStats {
    /// Records read from all documents
    pub total_records: usize,
    /// Records that passed validation
    pub valid_records: usize,
    /// Valid records folded into an earlier duplicate
    pub duplicates_merged: usize,
    /// Dropped records per reason
    pub rejected: BTreeMap<RejectReason, usize>,
}

impl ProcessingStats {
    /// Share of records that passed validation, between 0 and 1.
    pub fn success_rate(&self) -> f64 {
        if self.total_records == 0 {
            return 0.0;
        }
        self.valid_records as f64 / self.total_records as f64
    }

    /// Total number of dropped records.
    pub fn rejected_records(&self) -> usize {
        self.rejected.values().sum()
    }
}

/// The canonical citation pool of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bibliography {
    /// Deduplicated citations, in first-seen order
    pub citations: Vec<CanonicalCitation>,
    /// Document names in input order, including documents with no usable records
    pub sources: Vec<String>,
    pub stats: ProcessingStats,
}

/// Per-document result of cleaning and validation.
#[derive(Debug, Default)]
struct DocumentOutcome {
    citations: Vec<CanonicalCitation>,
    rejected: Vec<RejectReason>,
}

/// Runs the whole pipeline over a batch of documents.
///
/// Never fails: unusable records are dropped and counted in
/// [`ProcessingStats::rejected`]. Call [`PipelineConfig::validate`] first to
/// reject bad configuration values.
pub fn process(documents: &[SourceDocument], config: &PipelineConfig) -> Bibliography {
    let filter = ValidityFilter::new(config.min_content_length)
        .with_require_contributor(config.require_contributor);
    let outcomes = clean_documents(documents, filter, config.run_in_parallel);

    let mut stats = ProcessingStats {
        total_records: documents.iter().map(|d| d.records.len()).sum(),
        ..Default::default()
    };
    let mut pool = Vec::new();
    for outcome in outcomes {
        for reason in outcome.rejected {
            *stats.rejected.entry(reason).or_default() += 1;
        }
        pool.extend(outcome.citations);
    }
    stats.valid_records = pool.len();

    let deduplicator = Deduplicator::new().with_config(DeduplicatorConfig {
        enabled: config.dedupe,
    });
    let citations = deduplicator.deduplicate(pool);
    stats.duplicates_merged = stats.valid_records - citations.len();

    tracing::info!(
        documents = documents.len(),
        total = stats.total_records,
        valid = stats.valid_records,
        rejected = stats.rejected_records(),
        merged = stats.duplicates_merged,
        "processed citations"
    );

    Bibliography {
        citations,
        sources: documents.iter().map(|d| d.name.clone()).unique().collect(),
        stats,
    }
}

fn clean_documents(
    documents: &[SourceDocument],
    filter: ValidityFilter,
    parallel: bool,
) -> Vec<DocumentOutcome> {
    #[cfg(feature = "parallel")]
    if parallel {
        use rayon::prelude::*;

        return documents
            .par_iter()
            .map(|document| clean_document(document, &filter))
            .collect();
    }

    #[cfg(not(feature = "parallel"))]
    if parallel {
        tracing::warn!("parallel cleaning requested without the `parallel` feature");
    }

    documents
        .iter()
        .map(|document| clean_document(document, &filter))
        .collect()
}

fn clean_document(document: &SourceDocument, filter: &ValidityFilter) -> DocumentOutcome {
    let mut outcome = DocumentOutcome::default();

    for raw in &document.records {
        let cleaned = clean(raw);
        if let Err(reason) = filter.check(&cleaned) {
            tracing::debug!(
                document = %document.name,
                %reason,
                title = %cleaned.title,
                "dropped record"
            );
            outcome.rejected.push(reason);
            continue;
        }
        let citation_type = infer_type(&cleaned);
        outcome.citations.push(CanonicalCitation::from_cleaned(
            cleaned,
            citation_type,
            document.name.as_str(),
        ));
    }

    outcome
}
