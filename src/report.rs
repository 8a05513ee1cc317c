//! Markdown report assembly.
//!
//! Regroups an already-processed [`Bibliography`] into one of four shapes. No
//! cleaning or classification happens here; entries are formatted with the
//! assembler's style and sorted by [`CanonicalCitation::sort_key`], then title.
//!
//! | Shape | Grouping |
//! |-------|----------|
//! | [`ReportShape::Divided`] | by type, in [`CitationType::ALL`] order, empty types omitted |
//! | [`ReportShape::Combined`] | one alphabetical list |
//! | [`ReportShape::Sources`] | by input document, in input order |
//! | [`ReportShape::SourcesDivided`] | by input document, then by type |
//!
//! A citation found in several documents is listed under each of them.

use crate::format::{CitationFormatter, CitationStyle};
use crate::pipeline::Bibliography;
use crate::utils::title_case;
use crate::{CanonicalCitation, CitationError, CitationType, Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The output shapes a bibliography can be rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportShape {
    Divided,
    Combined,
    Sources,
    SourcesDivided,
}

impl ReportShape {
    /// Every shape, in the order they are generated by default.
    pub const ALL: [ReportShape; 4] = [
        ReportShape::Divided,
        ReportShape::Combined,
        ReportShape::Sources,
        ReportShape::SourcesDivided,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportShape::Divided => "divided",
            ReportShape::Combined => "combined",
            ReportShape::Sources => "sources",
            ReportShape::SourcesDivided => "sources-divided",
        }
    }

    /// Conventional file name for the rendered report.
    pub fn file_name(&self) -> &'static str {
        match self {
            ReportShape::Divided => "bibliography_divided.md",
            ReportShape::Combined => "bibliography_combined.md",
            ReportShape::Sources => "bibliography_sources.md",
            ReportShape::SourcesDivided => "bibliography_sources_divided.md",
        }
    }

    fn heading(&self, style: CitationStyle) -> String {
        match self {
            ReportShape::Divided | ReportShape::Combined => format!("# Bibliography ({style})"),
            ReportShape::Sources => format!("# Bibliography by Source ({style})"),
            ReportShape::SourcesDivided => {
                format!("# Bibliography by Source with Categories ({style})")
            }
        }
    }
}

impl fmt::Display for ReportShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportShape {
    type Err = CitationError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        ReportShape::ALL
            .into_iter()
            .find(|shape| shape.as_str() == normalized)
            .ok_or_else(|| CitationError::UnknownReportShape(s.to_string()))
    }
}

/// Renders bibliographies as markdown documents.
///
/// # Examples
///
/// ```
/// use pdfsources::format::CitationStyle;
/// use pdfsources::pipeline::Bibliography;
/// use pdfsources::report::{ReportAssembler, ReportShape};
///
/// let assembler = ReportAssembler::new(CitationStyle::Harvard);
/// let markdown = assembler.render(ReportShape::Combined, &Bibliography::default());
/// assert_eq!(markdown, "# Bibliography (Harvard)\n");
/// ```
#[derive(Clone, Copy)]
pub struct ReportAssembler {
    formatter: &'static dyn CitationFormatter,
}

impl fmt::Debug for ReportAssembler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportAssembler")
            .field("style", &self.style())
            .finish()
    }
}

impl Default for ReportAssembler {
    fn default() -> Self {
        Self::new(CitationStyle::default())
    }
}

impl ReportAssembler {
    #[must_use]
    pub fn new(style: CitationStyle) -> Self {
        Self {
            formatter: style.formatter(),
        }
    }

    pub fn style(&self) -> CitationStyle {
        self.formatter.style()
    }

    /// Renders one report shape.
    pub fn render(&self, shape: ReportShape, bibliography: &Bibliography) -> String {
        let mut out = shape.heading(self.style());
        out.push('\n');

        match shape {
            ReportShape::Combined => {
                self.push_entries(&mut out, bibliography.citations.iter());
            }
            ReportShape::Divided => {
                self.push_type_groups(&mut out, "##", bibliography.citations.iter());
            }
            ReportShape::Sources | ReportShape::SourcesDivided => {
                for source in &bibliography.sources {
                    let members: Vec<&CanonicalCitation> = bibliography
                        .citations
                        .iter()
                        .filter(|c| c.source_files.contains(source))
                        .collect();
                    out.push_str(&format!(
                        "\n## {} ({} sources)\n",
                        source_display_name(source),
                        members.len()
                    ));
                    if shape == ReportShape::Sources {
                        self.push_entries(&mut out, members.into_iter());
                    } else {
                        self.push_type_groups(&mut out, "###", members.into_iter());
                    }
                }
            }
        }

        out
    }

    /// Renders every shape in [`ReportShape::ALL`], paired with its shape.
    pub fn render_all(&self, bibliography: &Bibliography) -> Vec<(ReportShape, String)> {
        ReportShape::ALL
            .into_iter()
            .map(|shape| (shape, self.render(shape, bibliography)))
            .collect()
    }

    fn push_type_groups<'a>(
        &self,
        out: &mut String,
        level: &str,
        citations: impl Iterator<Item = &'a CanonicalCitation>,
    ) {
        let citations: Vec<&CanonicalCitation> = citations.collect();
        for citation_type in CitationType::ALL {
            let mut members = citations
                .iter()
                .copied()
                .filter(|c| c.citation_type == citation_type)
                .peekable();
            if members.peek().is_none() {
                continue;
            }
            out.push_str(&format!("\n{level} {}\n", citation_type.label()));
            self.push_entries(out, members);
        }
    }

    fn push_entries<'a>(
        &self,
        out: &mut String,
        citations: impl Iterator<Item = &'a CanonicalCitation>,
    ) {
        let entries = citations
            .map(|c| (c.sort_key(), c.title.to_lowercase(), self.formatter.format(c)))
            .sorted()
            .collect_vec();
        if entries.is_empty() {
            return;
        }
        out.push('\n');
        for (_, _, entry) in entries {
            out.push_str(&format!("* {entry}\n"));
        }
    }
}

/// Human-readable name of an input document.
///
/// `out/anystyle-meiji_restoration.json` becomes `Meiji Restoration`.
pub fn source_display_name(source: &str) -> String {
    let base = source.rsplit(['/', '\\']).next().unwrap_or(source);
    let base = base.strip_suffix(".json").unwrap_or(base);
    let base = base.strip_prefix("anystyle-").unwrap_or(base);
    title_case(&base.replace('_', " "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PersonName;
    use crate::clean::CleanedRecord;
    use crate::pipeline::ProcessingStats;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn citation(
        title: &str,
        family: &str,
        citation_type: CitationType,
        sources: &[&str],
    ) -> CanonicalCitation {
        let mut citation = CanonicalCitation::from_cleaned(
            CleanedRecord {
                title: title.to_string(),
                authors: vec![PersonName {
                    family: Some(family.to_string()),
                    given: Some("Ann".to_string()),
                    particle: None,
                }],
                year: Some(2000),
                ..Default::default()
            },
            citation_type,
            sources[0],
        );
        citation.source_files = sources.iter().map(|s| s.to_string()).collect();
        citation
    }

    fn bibliography() -> Bibliography {
        Bibliography {
            citations: vec![
                citation("Village Credit Networks", "Young", CitationType::Article, &["a.json"]),
                citation("The Rise of Modern Japan", "Baker", CitationType::Book, &["a.json", "b.json"]),
                citation("Peasant Protest in Japan", "Adams", CitationType::Chapter, &["b.json"]),
            ],
            sources: vec!["a.json".to_string(), "b.json".to_string(), "empty.json".to_string()],
            stats: ProcessingStats::default(),
        }
    }

    #[rstest]
    #[case("divided", ReportShape::Divided)]
    #[case("Combined", ReportShape::Combined)]
    #[case("sources", ReportShape::Sources)]
    #[case("sources-divided", ReportShape::SourcesDivided)]
    #[case("sources_divided", ReportShape::SourcesDivided)]
    fn test_shape_from_str(#[case] input: &str, #[case] expected: ReportShape) {
        assert_eq!(input.parse::<ReportShape>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_shape() {
        assert!(matches!(
            "by-year".parse::<ReportShape>(),
            Err(CitationError::UnknownReportShape(_))
        ));
    }

    #[rstest]
    #[case("anystyle-meiji_restoration.json", "Meiji Restoration")]
    #[case("out/nested/anystyle-tokugawa_village.json", "Tokugawa Village")]
    #[case(r"C:\refs\edo_period.json", "Edo Period")]
    #[case("plain", "Plain")]
    fn test_source_display_name(#[case] source: &str, #[case] expected: &str) {
        assert_eq!(source_display_name(source), expected);
    }

    #[test]
    fn test_combined_is_alphabetical() {
        let markdown = ReportAssembler::new(CitationStyle::Harvard)
            .render(ReportShape::Combined, &bibliography());
        assert_eq!(
            markdown,
            "# Bibliography (Harvard)\n\
             \n\
             * Adams, Ann 2000, 'Peasant Protest in Japan'.\n\
             * Baker, Ann 2000, *The Rise of Modern Japan*.\n\
             * Young, Ann 2000, 'Village Credit Networks'.\n"
        );
    }

    #[test]
    fn test_divided_groups_by_type() {
        let markdown = ReportAssembler::new(CitationStyle::Harvard)
            .render(ReportShape::Divided, &bibliography());
        assert_eq!(
            markdown,
            "# Bibliography (Harvard)\n\
             \n\
             ## Books\n\
             \n\
             * Baker, Ann 2000, *The Rise of Modern Japan*.\n\
             \n\
             ## Articles\n\
             \n\
             * Young, Ann 2000, 'Village Credit Networks'.\n\
             \n\
             ## Chapters\n\
             \n\
             * Adams, Ann 2000, 'Peasant Protest in Japan'.\n"
        );
    }

    #[test]
    fn test_sources_lists_shared_citation_twice() {
        let markdown = ReportAssembler::new(CitationStyle::Harvard)
            .render(ReportShape::Sources, &bibliography());
        assert_eq!(
            markdown,
            "# Bibliography by Source (Harvard)\n\
             \n\
             ## A (2 sources)\n\
             \n\
             * Baker, Ann 2000, *The Rise of Modern Japan*.\n\
             * Young, Ann 2000, 'Village Credit Networks'.\n\
             \n\
             ## B (2 sources)\n\
             \n\
             * Adams, Ann 2000, 'Peasant Protest in Japan'.\n\
             * Baker, Ann 2000, *The Rise of Modern Japan*.\n\
             \n\
             ## Empty (0 sources)\n"
        );
    }

    #[test]
    fn test_sources_divided_uses_subheadings() {
        let markdown = ReportAssembler::new(CitationStyle::Chicago)
            .render(ReportShape::SourcesDivided, &bibliography());
        assert!(markdown.starts_with("# Bibliography by Source with Categories (Chicago)\n"));
        assert!(markdown.contains("## A (2 sources)\n\n### Books\n\n* Baker, Ann."));
        assert!(markdown.contains("## B (2 sources)\n\n### Books\n"));
        assert!(markdown.contains("### Chapters\n\n* Adams, Ann."));
    }

    #[test]
    fn test_render_all_covers_every_shape() {
        let reports = ReportAssembler::default().render_all(&bibliography());
        let shapes: Vec<ReportShape> = reports.iter().map(|(shape, _)| *shape).collect();
        assert_eq!(shapes, ReportShape::ALL);
        assert!(reports.iter().all(|(_, md)| md.contains("(Chicago)")));
    }

    #[test]
    fn test_file_names_are_distinct() {
        let names: Vec<&str> = ReportShape::ALL.iter().map(|s| s.file_name()).collect();
        assert_eq!(names.iter().unique().count(), 4);
    }
}
