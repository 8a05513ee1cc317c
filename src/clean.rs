//! Record cleaning.
//!
//! Turns a [`RawCitationRecord`] into a [`CleanedRecord`]. Cleaning is total:
//! malformed input degrades to empty or absent fields, which the
//! [validity filter](crate::validity) then rejects.
//!
//! Text fields go through these transformations, repeated until nothing changes:
//!
//! 1. HTML entities are decoded (`&amp;` to `&`, `&#233;` to `é`)
//! 2. Inline markup tags (`<i>`, `<sup>`, `<span ...>`) are removed
//! 3. Backslash artifacts from the extraction engine are undone (`\[` to `[`,
//!    runs of backslashes dropped)
//! 4. Whitespace is collapsed and trimmed
//!
//! Because each step only ever shortens the text or leaves it alone, the loop
//! terminates and `clean_text(clean_text(s)) == clean_text(s)`.
//!
//! Names additionally get their casing fixed (ALL-CAPS parts become Title Case)
//! and name particles moved next to the family name.
//!
//! # Example
//!
//! ```
//! use pdfsources::clean::clean_text;
//!
//! assert_eq!(clean_text("Title with \\[brackets\\] and &amp; more"), "Title with [brackets] and & more");
//! ```

use crate::raw::{RawCitationRecord, RawField, RawName};
use crate::regex::{Captures, Regex};
use crate::utils::{is_all_caps, parse_author_name, parse_year, title_case};
use crate::PersonName;
use quick_xml::escape::{resolve_html5_entity, unescape_with};
use std::sync::LazyLock;

static ENTITY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z][a-zA-Z0-9]{1,31});").unwrap()
});

static MARKUP_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)</?(?:i|b|u|em|strong|sup|sub|inf|span|a|sc|tt|font|small|br|p|div)(?:\s[^<>]*)?/?>",
    )
    .unwrap()
});

static ESCAPED_CHAR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\\+([\[\](){}"'*_#&.,;:!?<>/|~^$@%+=-])"#).unwrap());

static BACKSLASH_RUN_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\{2,}").unwrap());

static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Name particles kept lowercase in front of the family name.
pub const PARTICLES: [&str; 22] = [
    "van", "von", "de", "der", "den", "del", "della", "delle", "dei", "degli", "di", "da", "das",
    "dos", "ten", "ter", "te", "zu", "zum", "zur", "vom", "af",
];

/// Quote pairs stripped when they wrap a whole title.
const WRAPPING_QUOTES: [(char, char); 4] = [('"', '"'), ('“', '”'), ('\'', '\''), ('‘', '’')];

/// A record whose fields have been cleaned but not yet validated or typed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanedRecord {
    /// Cleaned title; empty when upstream had none
    pub title: String,
    pub authors: Vec<PersonName>,
    pub editors: Vec<PersonName>,
    /// Year extracted from the first parseable date value
    pub year: Option<i32>,
    pub container_title: Option<String>,
    pub publisher: Option<String>,
    pub location: Option<String>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub pages: Option<String>,
    pub edition: Option<String>,
    pub note: Option<String>,
    pub genre: Option<String>,
    /// Lowercased upstream type hint
    pub type_hint: Option<String>,
}

impl CleanedRecord {
    /// First author, or first editor when there are no authors.
    pub fn first_contributor(&self) -> Option<&PersonName> {
        self.authors.first().or_else(|| self.editors.first())
    }
}

/// Cleans a raw record. Never fails.
pub fn clean(raw: &RawCitationRecord) -> CleanedRecord {
    let first_text = |field: RawField| {
        raw.get_all(field)
            .iter()
            .map(|v| clean_text(v))
            .find(|v| !v.is_empty())
    };

    let title = first_text(RawField::Title)
        .map(|t| finish_title(&t))
        .unwrap_or_default();

    let year = raw
        .get_all(RawField::Date)
        .iter()
        .find_map(|date| parse_year(&clean_text(date)));

    CleanedRecord {
        title,
        authors: raw.authors().iter().filter_map(normalize_person).collect(),
        editors: raw.editors().iter().filter_map(normalize_person).collect(),
        year,
        container_title: first_text(RawField::ContainerTitle)
            .map(|t| finish_title(&t))
            .filter(|t| !t.is_empty()),
        publisher: first_text(RawField::Publisher)
            .map(|t| trim_separators(&t))
            .filter(|t| !t.is_empty()),
        location: first_text(RawField::Location)
            .map(|t| trim_separators(&t))
            .filter(|t| !t.is_empty()),
        volume: first_text(RawField::Volume),
        issue: first_text(RawField::Issue),
        pages: first_text(RawField::Pages),
        edition: first_text(RawField::Edition),
        note: first_text(RawField::Note),
        genre: first_text(RawField::Genre),
        type_hint: first_text(RawField::Type).map(|t| t.to_lowercase()),
    }
}

/// Cleans one text value: entities, markup, escape artifacts and whitespace.
pub fn clean_text(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = clean_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn clean_pass(text: &str) -> String {
    let decoded = decode_entities(text);
    let unmarked = MARKUP_REGEX.replace_all(&decoded, "");
    let unescaped = ESCAPED_CHAR_REGEX.replace_all(&unmarked, "${1}");
    let unescaped = BACKSLASH_RUN_REGEX.replace_all(&unescaped, "");
    WHITESPACE_REGEX
        .replace_all(&unescaped, " ")
        .trim()
        .to_string()
}

/// Decodes HTML5 named and numeric character references. Unknown references
/// are left as written.
fn decode_entities(text: &str) -> String {
    ENTITY_REGEX
        .replace_all(text, |caps: &Captures| {
            if let Ok(decoded) = unescape_with(&caps[0], resolve_html5_entity) {
                return decoded.into_owned();
            }
            let body = &caps[1];
            let numeric = if let Some(hex) = body
                .strip_prefix("#x")
                .or_else(|| body.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()
            } else {
                body.strip_prefix('#').and_then(|dec| dec.parse::<u32>().ok())
            };
            numeric
                .and_then(char::from_u32)
                .map_or_else(|| caps[0].to_string(), String::from)
        })
        .to_string()
}

/// Trims list separators left at the end of a field by the extraction engine.
fn trim_separators(text: &str) -> String {
    text.trim_end_matches(|c: char| matches!(c, ',' | ';' | ':') || c.is_whitespace())
        .trim_start()
        .to_string()
}

/// Removes trailing separators and quotes wrapping the whole title.
fn finish_title(title: &str) -> String {
    let mut current = trim_separators(title);
    loop {
        let unwrapped = WRAPPING_QUOTES.iter().find_map(|&(open, close)| {
            current
                .strip_prefix(open)
                .and_then(|rest| rest.strip_suffix(close))
                .map(|inner| trim_separators(inner))
        });
        match unwrapped {
            Some(inner) if inner != current => current = inner,
            _ => return current,
        }
    }
}

fn is_particle(token: &str) -> bool {
    PARTICLES.iter().any(|p| p.eq_ignore_ascii_case(token))
}

fn clean_name_part(part: Option<&str>) -> Option<String> {
    part.map(clean_text)
        .map(|p| {
            p.trim_matches(|c: char| matches!(c, ',' | ';') || c.is_whitespace())
                .to_string()
        })
        .filter(|p| !p.is_empty())
        .map(|p| if is_all_caps(&p) { title_case(&p) } else { p })
}

/// Normalizes a raw name: cleans its text, fixes ALL-CAPS casing and moves
/// particles out of the given and family names.
///
/// Returns `None` when nothing printable is left.
pub fn normalize_person(name: &RawName) -> Option<PersonName> {
    let (family, given, particle) = match name {
        RawName::Literal(literal) => {
            let literal = clean_text(literal);
            let (family, given) = parse_author_name(&literal);
            (
                clean_name_part(Some(family.as_str())),
                clean_name_part(Some(given.as_str())),
                None,
            )
        }
        RawName::Structured {
            family,
            given,
            particle,
        } => (
            clean_name_part(family.as_deref()),
            clean_name_part(given.as_deref()),
            clean_name_part(particle.as_deref()),
        ),
    };

    let mut particles: Vec<String> = Vec::new();

    // Trailing particles of the given name: "Ludwig van" + "Beethoven"
    let given = given.map(|given| {
        let mut tokens: Vec<&str> = given.split(' ').collect();
        let mut moved = Vec::new();
        while tokens.len() > 1 && tokens.last().is_some_and(|t| is_particle(t)) {
            moved.extend(tokens.pop());
        }
        particles.extend(moved.into_iter().rev().map(str::to_lowercase));
        tokens.join(" ")
    });

    if let Some(particle) = particle {
        particles.extend(particle.split(' ').map(str::to_lowercase));
    }

    // Leading particles of the family name: "van der Berg"
    let family = family.map(|family| {
        let mut tokens: Vec<&str> = family.split(' ').collect();
        let leading = tokens
            .iter()
            .take(tokens.len().saturating_sub(1))
            .take_while(|t| is_particle(t))
            .count();
        particles.extend(tokens.drain(..leading).map(str::to_lowercase));
        tokens.join(" ")
    });

    let person = PersonName {
        family,
        given,
        particle: (!particles.is_empty()).then(|| particles.join(" ")),
    };

    (!person.is_empty()).then_some(person)
}

impl From<&PersonName> for RawName {
    fn from(person: &PersonName) -> Self {
        RawName::Structured {
            family: person.family.clone(),
            given: person.given.clone(),
            particle: person.particle.clone(),
        }
    }
}

impl From<&CleanedRecord> for RawCitationRecord {
    /// Rebuilds a raw record from cleaned fields, so a record can be cleaned again.
    fn from(cleaned: &CleanedRecord) -> Self {
        let mut raw = RawCitationRecord::new();
        if !cleaned.title.is_empty() {
            raw.add_data(RawField::Title, cleaned.title.clone());
        }
        if let Some(year) = cleaned.year {
            raw.add_data(RawField::Date, year.to_string());
        }
        let optional = [
            (RawField::ContainerTitle, &cleaned.container_title),
            (RawField::Publisher, &cleaned.publisher),
            (RawField::Location, &cleaned.location),
            (RawField::Volume, &cleaned.volume),
            (RawField::Issue, &cleaned.issue),
            (RawField::Pages, &cleaned.pages),
            (RawField::Edition, &cleaned.edition),
            (RawField::Note, &cleaned.note),
            (RawField::Genre, &cleaned.genre),
            (RawField::Type, &cleaned.type_hint),
        ];
        for (field, value) in optional {
            if let Some(value) = value {
                raw.add_data(field, value.clone());
            }
        }
        cleaned.authors.iter().for_each(|a| raw.add_author(a.into()));
        cleaned.editors.iter().for_each(|e| raw.add_editor(e.into()));
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawCitationRecord {
        serde_json::from_value(value).unwrap()
    }

    fn person(family: &str, given: &str, particle: Option<&str>) -> PersonName {
        PersonName {
            family: Some(family.to_string()),
            given: (!given.is_empty()).then(|| given.to_string()),
            particle: particle.map(str::to_string),
        }
    }

    #[rstest]
    #[case("This is a title with \\\\double backslashes\\\\.", "This is a title with double backslashes.")]
    #[case("Title with \\(parentheses\\) and \\\"quotes\\\".", "Title with (parentheses) and \"quotes\".")]
    #[case("Title with \\[brackets\\] and data.", "Title with [brackets] and data.")]
    #[case("A Study of \\\\[Things\\\\]", "A Study of [Things]")]
    #[case("Title with &lt;brackets&gt; and &amp; symbols.", "Title with <brackets> and & symbols.")]
    #[case("Title   with    excessive\n\n   whitespace.", "Title with excessive whitespace.")]
    #[case("The <i>Origin</i> of Species", "The Origin of Species")]
    #[case("H<sub>2</sub>O and &#233;t&#xE9;", "H2O and été")]
    #[case("&amp;lt;i&amp;gt;Nested&amp;lt;/i&amp;gt;", "Nested")]
    #[case("Unknown &bogus; entity", "Unknown &bogus; entity")]
    #[case("Caf&eacute; Society &copy; M&uuml;ller", "Café Society © Müller")]
    #[case("Fran&ccedil;ois &ndash; Essais &hellip;", "François – Essais …")]
    #[case("Smith &amp Jones & Sons", "Smith &amp Jones & Sons")]
    #[case("   ", "")]
    fn test_clean_text(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(clean_text(input), expected);
    }

    #[rstest]
    #[case("Title with \\[brackets\\]")]
    #[case("&amp;amp;amp;")]
    #[case("a\\\\\\\\b \\ c")]
    #[case("<b>&lt;b&gt;x&lt;/b&gt;</b>")]
    #[case("Already clean")]
    fn test_clean_text_idempotent(#[case] input: &str) {
        let once = clean_text(input);
        assert_eq!(clean_text(&once), once);
    }

    #[test]
    fn test_clean_scenario_record() {
        let cleaned = clean(&raw(json!({
            "title": ["A Study of \\[Things\\]"],
            "author": [{"family": "SMITH", "given": "JOHN"}],
            "date": ["2020-03-01"]
        })));

        assert_eq!(cleaned.title, "A Study of [Things]");
        assert_eq!(cleaned.authors, vec![person("Smith", "John", None)]);
        assert_eq!(cleaned.year, Some(2020));
    }

    #[test]
    fn test_clean_maps_hyphenated_fields() {
        let cleaned = clean(&raw(json!({
            "title": ["Some Article"],
            "container-title": ["Journal of Testing,"],
            "publisher-place": ["London;"],
            "type": ["Article-Journal"]
        })));

        assert_eq!(cleaned.container_title.as_deref(), Some("Journal of Testing"));
        assert_eq!(cleaned.location.as_deref(), Some("London"));
        assert_eq!(cleaned.type_hint.as_deref(), Some("article-journal"));
    }

    #[test]
    fn test_clean_strips_wrapping_quotes() {
        let cleaned = clean(&raw(json!({"title": ["“The Quoted Title,”"]})));
        assert_eq!(cleaned.title, "The Quoted Title");
    }

    #[test]
    fn test_clean_unparseable_date_is_absent() {
        let cleaned = clean(&raw(json!({"title": ["X"], "date": ["n.d.", "forthcoming"]})));
        assert_eq!(cleaned.year, None);
    }

    #[test]
    fn test_clean_takes_first_parseable_date() {
        let cleaned = clean(&raw(json!({"date": ["n.d.", "1987"]})));
        assert_eq!(cleaned.year, Some(1987));
    }

    #[test]
    fn test_clean_empty_record() {
        let cleaned = clean(&RawCitationRecord::new());
        assert_eq!(cleaned, CleanedRecord::default());
    }

    #[rstest]
    #[case(RawName::Literal("SMITH, JOHN".to_string()), person("Smith", "John", None))]
    #[case(RawName::Literal("Van Der Berg, Johannes".to_string()), person("Berg", "Johannes", Some("van der")))]
    #[case(RawName::Literal("O'Connor, Patrick".to_string()), person("O'Connor", "Patrick", None))]
    #[case(RawName::Literal("McDonald, Alan".to_string()), person("McDonald", "Alan", None))]
    #[case(RawName::Literal("Ludwig van Beethoven".to_string()), person("Beethoven", "Ludwig", Some("van")))]
    #[case(
        RawName::Structured { family: Some("VON NEUMANN".into()), given: Some("JOHN".into()), particle: None },
        person("Neumann", "John", Some("von"))
    )]
    #[case(
        RawName::Structured { family: Some("Beethoven".into()), given: Some("Ludwig".into()), particle: Some("Van".into()) },
        person("Beethoven", "Ludwig", Some("van"))
    )]
    #[case(
        RawName::Structured { family: Some("Van".into()), given: Some("Morrison".into()), particle: None },
        person("Van", "Morrison", None)
    )]
    #[case(
        RawName::Structured { family: Some("MCDONALD".into()), given: Some("J.".into()), particle: None },
        person("McDonald", "J.", None)
    )]
    fn test_normalize_person(#[case] name: RawName, #[case] expected: PersonName) {
        assert_eq!(normalize_person(&name), Some(expected));
    }

    #[test]
    fn test_normalize_person_empty() {
        assert_eq!(normalize_person(&RawName::Literal("  ".to_string())), None);
        assert_eq!(
            normalize_person(&RawName::Structured {
                family: Some(String::new()),
                given: None,
                particle: None
            }),
            None
        );
    }

    #[test]
    fn test_clean_is_idempotent_on_records() {
        let records = [
            json!({
                "title": ["A Study of \\[Things\\]"],
                "author": [{"family": "SMITH", "given": "JOHN"}, "Van Der Berg, Johannes"],
                "editor": [{"family": "de la cruz", "given": "Maria"}],
                "date": ["2020-03-01"],
                "container-title": ["<i>Journal</i> of &amp; Things"],
                "publisher": ["Press,"],
                "pages": ["45–67"]
            }),
            json!({"title": "\"\"Double Quoted\"\"", "author": ["Ludwig van Beethoven"]}),
            json!({"unexpected": [1, 2, 3]}),
            json!("not even an object"),
        ];

        for record in records {
            let once = clean(&raw(record));
            let twice = clean(&RawCitationRecord::from(&once));
            assert_eq!(twice, once);
        }
    }
}
