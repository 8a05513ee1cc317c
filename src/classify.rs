//! Citation type inference.
//!
//! [`infer_type`] walks [`RULES`] in order and returns the first match. Each
//! rule is a plain function over a [`CleanedRecord`], so the precedence is
//! visible in one place and every rule can be tested on its own.
//!
//! | # | Rule | Result |
//! |---|------|--------|
//! | 1 | upstream type hint names a known category | that category |
//! | 2 | publisher and location, no container title | book |
//! | 3 | container title that resembles a journal | article |
//! | 4 | thesis/dissertation marker in title, note, genre or container | thesis |
//! | 5 | report/working-paper marker in title, note, genre or container | report |
//! | 6 | container title, no journal marker, editors present | chapter |
//! | 7 | anything else | other |

use crate::clean::CleanedRecord;
use crate::CitationType;

/// One step of the classification cascade.
#[derive(Debug, Clone, Copy)]
pub struct ClassificationRule {
    /// Short rule name, used in logs
    pub name: &'static str,
    /// Returns the type when the rule applies
    pub apply: fn(&CleanedRecord) -> Option<CitationType>,
}

/// The classification rules, in precedence order.
pub const RULES: [ClassificationRule; 7] = [
    ClassificationRule {
        name: "type-hint",
        apply: from_type_hint,
    },
    ClassificationRule {
        name: "publisher-location",
        apply: from_publisher_and_location,
    },
    ClassificationRule {
        name: "journal-container",
        apply: from_journal_container,
    },
    ClassificationRule {
        name: "thesis-marker",
        apply: from_thesis_marker,
    },
    ClassificationRule {
        name: "report-marker",
        apply: from_report_marker,
    },
    ClassificationRule {
        name: "edited-container",
        apply: from_edited_container,
    },
    ClassificationRule {
        name: "fallback",
        apply: fallback,
    },
];

const THESIS_MARKERS: [&str; 7] = [
    "thesis",
    "dissertation",
    "phd",
    "ph.d",
    "doctoral",
    "master's",
    "habilitation",
];

const REPORT_MARKERS: [&str; 7] = [
    "report",
    "working paper",
    "discussion paper",
    "white paper",
    "technical memorandum",
    "policy brief",
    "occasional paper",
];

const JOURNAL_MARKERS: [&str; 14] = [
    "journal",
    "review",
    "quarterly",
    "bulletin",
    "annals",
    "magazine",
    "newspaper",
    "times",
    "gazette",
    "letters",
    "transactions",
    "proceedings",
    "studies",
    "j.",
];

/// Infers the citation type of a cleaned record. Pure and deterministic.
///
/// # Examples
///
/// ```
/// use pdfsources::CitationType;
/// use pdfsources::classify::infer_type;
/// use pdfsources::clean::CleanedRecord;
///
/// let record = CleanedRecord {
///     title: "Academic Book Title".to_string(),
///     publisher: Some("University Press".to_string()),
///     location: Some("Oxford".to_string()),
///     ..Default::default()
/// };
/// assert_eq!(infer_type(&record), CitationType::Book);
/// ```
pub fn infer_type(record: &CleanedRecord) -> CitationType {
    RULES
        .iter()
        .find_map(|rule| (rule.apply)(record).map(|t| (rule.name, t)))
        .map_or(CitationType::Other, |(name, citation_type)| {
            tracing::trace!(rule = name, %citation_type, title = %record.title, "classified");
            citation_type
        })
}

fn contains_any(text: Option<&str>, markers: &[&str]) -> bool {
    text.map(str::to_lowercase)
        .is_some_and(|t| markers.iter().any(|m| t.contains(m)))
}

fn has_marker(record: &CleanedRecord, markers: &[&str]) -> bool {
    contains_any(Some(record.title.as_str()), markers)
        || contains_any(record.note.as_deref(), markers)
        || contains_any(record.container_title.as_deref(), markers)
        || contains_any(record.genre.as_deref(), markers)
}

fn container_has_journal_marker(record: &CleanedRecord) -> bool {
    contains_any(record.container_title.as_deref(), &JOURNAL_MARKERS)
}

/// Journal resemblance: no thesis/report marker on the container, and either a
/// journal marker word, serial numbering, or no editor list.
fn resembles_journal(record: &CleanedRecord) -> bool {
    let container = record.container_title.as_deref();
    if contains_any(container, &THESIS_MARKERS) || contains_any(container, &REPORT_MARKERS) {
        return false;
    }
    container_has_journal_marker(record)
        || record.volume.is_some()
        || record.issue.is_some()
        || record.editors.is_empty()
}

fn from_type_hint(record: &CleanedRecord) -> Option<CitationType> {
    record.type_hint.as_deref().and_then(CitationType::from_hint)
}

fn from_publisher_and_location(record: &CleanedRecord) -> Option<CitationType> {
    (record.publisher.is_some() && record.location.is_some() && record.container_title.is_none())
        .then_some(CitationType::Book)
}

fn from_journal_container(record: &CleanedRecord) -> Option<CitationType> {
    (record.container_title.is_some() && resembles_journal(record)).then_some(CitationType::Article)
}

fn from_thesis_marker(record: &CleanedRecord) -> Option<CitationType> {
    has_marker(record, &THESIS_MARKERS).then_some(CitationType::Thesis)
}

fn from_report_marker(record: &CleanedRecord) -> Option<CitationType> {
    has_marker(record, &REPORT_MARKERS).then_some(CitationType::Report)
}

fn from_edited_container(record: &CleanedRecord) -> Option<CitationType> {
    (record.container_title.is_some()
        && !container_has_journal_marker(record)
        && !record.editors.is_empty())
    .then_some(CitationType::Chapter)
}

fn fallback(_: &CleanedRecord) -> Option<CitationType> {
    Some(CitationType::Other)
}
