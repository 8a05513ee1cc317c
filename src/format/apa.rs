//! APA style.
//!
//! `Family, G. (Year). Title. *Container*, *12*(3), pages.` with initials for
//! given names. The container is always part of article and chapter entries.

use super::{
    CitationFormatter, CitationStyle, escape_markdown, field, initials, is_standalone, italic,
    join_names, publication, terminate,
};
use crate::{CanonicalCitation, CitationType, PersonName};

/// Formatter for the APA style.
#[derive(Debug, Default, Clone, Copy)]
pub struct ApaFormatter;

/// `Family, I.`
fn inverted_initials(person: &PersonName) -> Option<String> {
    let given = person.given.as_deref().map(initials).filter(|i| !i.is_empty());
    match (person.full_family(), given) {
        (Some(family), Some(given)) => Some(format!("{family}, {given}")),
        (family, given) => family.or(given),
    }
}

/// `I. Family`
fn natural_initials(person: &PersonName) -> Option<String> {
    let given = person.given.as_deref().map(initials).filter(|i| !i.is_empty());
    match (given, person.full_family()) {
        (Some(given), Some(family)) => Some(format!("{given} {family}")),
        (given, family) => family.or(given),
    }
}

fn editor_suffix(count: usize) -> &'static str {
    if count == 1 { " (Ed.)" } else { " (Eds.)" }
}

impl ApaFormatter {
    fn contributors(citation: &CanonicalCitation) -> Option<String> {
        let (people, editors) = citation.contributors();
        let names: Vec<String> = people
            .iter()
            .filter_map(inverted_initials)
            .map(|n| escape_markdown(&n))
            .collect();
        if names.is_empty() {
            return None;
        }
        let mut joined = join_names(&names, ", ", ", & ");
        if editors {
            joined.push_str(editor_suffix(names.len()));
        }
        Some(joined)
    }

    fn title(citation: &CanonicalCitation) -> String {
        let title = escape_markdown(&citation.title);
        if is_standalone(citation.citation_type) {
            terminate(&italic(&title), '.')
        } else {
            format!("\"{}\"", terminate(&title, '.'))
        }
    }

    /// `*Container*, *12*(3), 45-67.` or, for chapters, `In E. Editor (Ed.), *Book* (pp. 45-67).`
    fn source(citation: &CanonicalCitation) -> Option<String> {
        let container = field(citation.container_title.as_ref())?;
        let pages = field(citation.pages.as_ref());

        if citation.citation_type == CitationType::Chapter {
            let mut source = String::from("In ");
            if !citation.authors.is_empty() && !citation.editors.is_empty() {
                let editors: Vec<String> = citation
                    .editors
                    .iter()
                    .filter_map(natural_initials)
                    .map(|n| escape_markdown(&n))
                    .collect();
                source.push_str(&join_names(&editors, ", ", ", & "));
                source.push_str(editor_suffix(editors.len()));
                source.push_str(", ");
            }
            source.push_str(&italic(&container));
            if let Some(pages) = pages {
                source.push_str(&format!(" (pp. {pages})"));
            }
            return Some(terminate(&source, '.'));
        }

        let mut segments = vec![italic(&container)];
        let issue = field(citation.issue.as_ref());
        match (field(citation.volume.as_ref()), issue) {
            (Some(volume), Some(issue)) => segments.push(format!("{}({issue})", italic(&volume))),
            (Some(volume), None) => segments.push(italic(&volume)),
            (None, Some(issue)) => segments.push(format!("no. {issue}")),
            (None, None) => {}
        }
        segments.extend(pages);
        Some(terminate(&segments.join(", "), '.'))
    }
}

impl CitationFormatter for ApaFormatter {
    fn style(&self) -> CitationStyle {
        CitationStyle::Apa
    }

    fn format(&self, citation: &CanonicalCitation) -> String {
        let year = citation.year.map(|y| format!("({y})."));
        let title = Self::title(citation);
        let mut parts = Vec::new();

        match Self::contributors(citation) {
            Some(names) => {
                match year {
                    Some(year) => parts.push(format!("{names} {year}")),
                    None => parts.push(terminate(&names, '.')),
                }
                parts.push(title);
            }
            None => {
                parts.push(title);
                parts.extend(year);
            }
        }

        parts.extend(Self::source(citation));
        parts.extend(field(citation.edition.as_ref()).map(|e| terminate(&e, '.')));
        parts.extend(publication(citation).map(|p| terminate(&p, '.')));
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::tests::{citation, person};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_article_includes_journal() {
        let mut citation = citation(
            "Village Credit Networks",
            vec![person("Smith", "John"), person("Doe", "Jane Ann")],
            Some(2021),
            CitationType::Article,
        );
        citation.container_title = Some("Journal of Asian Studies".to_string());
        citation.volume = Some("80".to_string());
        citation.issue = Some("2".to_string());
        citation.pages = Some("301-322".to_string());
        assert_eq!(
            ApaFormatter.format(&citation),
            "Smith, J., & Doe, J. A. (2021). \"Village Credit Networks.\" \
             *Journal of Asian Studies*, *80*(2), 301-322."
        );
    }

    #[test]
    fn test_book() {
        let mut citation = citation(
            "The Rise of Modern Japan",
            vec![person("Smith", "John")],
            Some(1990),
            CitationType::Book,
        );
        citation.publisher = Some("Oxford University Press".to_string());
        citation.location = Some("Oxford".to_string());
        assert_eq!(
            ApaFormatter.format(&citation),
            "Smith, J. (1990). *The Rise of Modern Japan*. Oxford: Oxford University Press."
        );
    }

    #[test]
    fn test_missing_year_omits_parentheses() {
        let citation = citation(
            "Rural Credit in Tokugawa Japan",
            vec![person("Smith", "John")],
            None,
            CitationType::Thesis,
        );
        assert_eq!(
            ApaFormatter.format(&citation),
            "Smith, J. *Rural Credit in Tokugawa Japan*."
        );
    }

    #[test]
    fn test_chapter() {
        let mut citation = citation(
            "Peasant Protest",
            vec![person("Walthall", "Anne")],
            Some(1986),
            CitationType::Chapter,
        );
        citation.editors = vec![person("Jansen", "Marius")];
        citation.container_title = Some("Essays on the Meiji Restoration".to_string());
        citation.pages = Some("12-40".to_string());
        assert_eq!(
            ApaFormatter.format(&citation),
            "Walthall, A. (1986). \"Peasant Protest.\" \
             In M. Jansen (Ed.), *Essays on the Meiji Restoration* (pp. 12-40)."
        );
    }

    #[test]
    fn test_edited_volume_and_no_contributors() {
        let mut edited = citation("Collected Essays", Vec::new(), Some(2003), CitationType::Book);
        edited.editors = vec![person("Gluck", "Carol"), person("Jansen", "Marius")];
        assert_eq!(
            ApaFormatter.format(&edited),
            "Gluck, C., & Jansen, M. (Eds.) (2003). *Collected Essays*."
        );

        let anonymous = citation("Anonymous Chronicle of Edo", Vec::new(), Some(1850), CitationType::Other);
        assert_eq!(
            ApaFormatter.format(&anonymous),
            "\"Anonymous Chronicle of Edo.\" (1850)."
        );
    }
}
