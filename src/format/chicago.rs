//! Chicago notes-bibliography style.
//!
//! `Family, Given. "Title." *Container* 12, no. 3, Location: Publisher, Year, pages.`

use super::{
    CitationFormatter, CitationStyle, escape_markdown, field, inverted_name, is_standalone, italic,
    join_names, natural_name, publication, terminate,
};
use crate::{CanonicalCitation, CitationType, PersonName};

/// Formatter for the Chicago style.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChicagoFormatter;

impl ChicagoFormatter {
    /// First contributor inverted, the rest in natural order.
    fn names(people: &[PersonName]) -> String {
        let names: Vec<String> = people
            .iter()
            .enumerate()
            .filter_map(|(i, p)| if i == 0 { inverted_name(p) } else { natural_name(p) })
            .map(|n| escape_markdown(&n))
            .collect();
        join_names(&names, ", ", ", and ")
    }

    fn contributors(citation: &CanonicalCitation) -> Option<String> {
        let (people, editors) = citation.contributors();
        let names = Self::names(people);
        if names.is_empty() {
            return None;
        }
        Some(match (editors, people.len()) {
            (false, _) => names,
            (true, 1) => format!("{names}, ed"),
            (true, _) => format!("{names}, eds"),
        })
    }

    fn title(citation: &CanonicalCitation) -> String {
        let title = escape_markdown(&citation.title);
        if is_standalone(citation.citation_type) {
            terminate(&italic(&title), '.')
        } else {
            format!("\"{}\"", terminate(&title, '.'))
        }
    }

    /// Container with its numbering, e.g. `*Journal* 12, no. 3`.
    fn container(citation: &CanonicalCitation) -> Vec<String> {
        let Some(container) = field(citation.container_title.as_ref()) else {
            return Vec::new();
        };
        let mut segments = Vec::new();
        match citation.citation_type {
            CitationType::Chapter => {
                segments.push(format!("In {}", italic(&container)));
                if !citation.authors.is_empty() && !citation.editors.is_empty() {
                    let editors: Vec<String> = citation
                        .editors
                        .iter()
                        .filter_map(natural_name)
                        .map(|n| escape_markdown(&n))
                        .collect();
                    segments.push(format!("edited by {}", join_names(&editors, ", ", " and ")));
                }
            }
            _ => {
                let mut head = italic(&container);
                if let Some(volume) = field(citation.volume.as_ref()) {
                    head = format!("{head} {volume}");
                }
                segments.push(head);
                if let Some(issue) = field(citation.issue.as_ref()) {
                    segments.push(format!("no. {issue}"));
                }
            }
        }
        segments
    }
}

impl CitationFormatter for ChicagoFormatter {
    fn style(&self) -> CitationStyle {
        CitationStyle::Chicago
    }

    fn format(&self, citation: &CanonicalCitation) -> String {
        let mut parts = Vec::with_capacity(3);
        if let Some(contributors) = Self::contributors(citation) {
            parts.push(terminate(&contributors, '.'));
        }
        parts.push(Self::title(citation));

        let mut tail = Self::container(citation);
        tail.extend(field(citation.edition.as_ref()));
        tail.extend(publication(citation));
        tail.extend(citation.year.map(|y| y.to_string()));
        tail.extend(field(citation.pages.as_ref()));
        if !tail.is_empty() {
            parts.push(terminate(&tail.join(", "), '.'));
        }

        parts.join(" ")
    }
}
