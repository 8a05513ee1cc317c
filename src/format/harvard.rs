//! Harvard author-date style.
//!
//! `Family, Given Year, *Title*, Location: Publisher.` Segments are
//! comma-separated and the year follows the authors without parentheses.

use super::{
    CitationFormatter, CitationStyle, escape_markdown, field, inverted_name, is_standalone, italic,
    join_names, natural_name, publication, terminate,
};
use crate::{CanonicalCitation, CitationType};

/// Formatter for the Harvard style.
#[derive(Debug, Default, Clone, Copy)]
pub struct HarvardFormatter;

fn editor_suffix(count: usize) -> &'static str {
    if count == 1 { " (ed.)" } else { " (eds.)" }
}

impl HarvardFormatter {
    fn contributors(citation: &CanonicalCitation) -> Option<String> {
        let (people, editors) = citation.contributors();
        let names: Vec<String> = people
            .iter()
            .enumerate()
            .filter_map(|(i, p)| if i == 0 { inverted_name(p) } else { natural_name(p) })
            .map(|n| escape_markdown(&n))
            .collect();
        if names.is_empty() {
            return None;
        }
        let mut joined = join_names(&names, ", ", " and ");
        if editors {
            joined.push_str(editor_suffix(names.len()));
        }
        Some(joined)
    }

    fn title(citation: &CanonicalCitation) -> String {
        let title = escape_markdown(&citation.title);
        if is_standalone(citation.citation_type) {
            italic(&title)
        } else {
            format!("'{title}'")
        }
    }

    fn container(citation: &CanonicalCitation) -> Vec<String> {
        let Some(container) = field(citation.container_title.as_ref()) else {
            return Vec::new();
        };
        if citation.citation_type == CitationType::Chapter {
            let mut head = String::from("in ");
            if !citation.authors.is_empty() && !citation.editors.is_empty() {
                let editors: Vec<String> = citation
                    .editors
                    .iter()
                    .filter_map(natural_name)
                    .map(|n| escape_markdown(&n))
                    .collect();
                head.push_str(&join_names(&editors, ", ", " and "));
                head.push_str(editor_suffix(editors.len()));
                head.push_str(", ");
            }
            head.push_str(&italic(&container));
            return vec![head];
        }

        let mut segments = vec![italic(&container)];
        segments.extend(field(citation.volume.as_ref()).map(|v| format!("vol. {v}")));
        segments.extend(field(citation.issue.as_ref()).map(|i| format!("no. {i}")));
        segments
    }
}

impl CitationFormatter for HarvardFormatter {
    fn style(&self) -> CitationStyle {
        CitationStyle::Harvard
    }

    fn format(&self, citation: &CanonicalCitation) -> String {
        let title = Self::title(citation);
        let mut segments = Vec::new();

        match (Self::contributors(citation), citation.year) {
            (Some(names), Some(year)) => {
                segments.push(format!("{names} {year}"));
                segments.push(title);
            }
            (Some(names), None) => {
                segments.push(names);
                segments.push(title);
            }
            (None, Some(year)) => segments.push(format!("{title} {year}")),
            (None, None) => segments.push(title),
        }

        segments.extend(Self::container(citation));
        segments.extend(field(citation.edition.as_ref()));
        segments.extend(publication(citation));
        segments.extend(field(citation.pages.as_ref()).map(|p| format!("pp. {p}")));

        terminate(&segments.join(", "), '.')
    }
}
