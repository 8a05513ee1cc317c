use crate::regex::Regex;
use std::sync::LazyLock;

static YEAR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^0-9])([0-9]{4})(?:[^0-9]|$)").unwrap());

/// Earliest year accepted as a publication year.
pub(crate) const MIN_YEAR: i32 = 1400;
/// Latest year accepted as a publication year.
pub(crate) const MAX_YEAR: i32 = 2100;

/// Extracts a plausible four-digit year from a free-form date string.
///
/// Handles ISO dates (`2020-03-01`), bare years, ranges (`1998/99`) and prose
/// (`Spring 2004`). Returns the first four-digit run inside
/// [`MIN_YEAR`]..=[`MAX_YEAR`], or `None`.
pub(crate) fn parse_year(date_str: &str) -> Option<i32> {
    let mut rest = date_str;
    while let Some(captures) = YEAR_REGEX.captures(rest) {
        let digits = captures.get(1)?;
        if let Ok(year) = digits.as_str().parse::<i32>() {
            if (MIN_YEAR..=MAX_YEAR).contains(&year) {
                return Some(year);
            }
        }
        rest = &rest[digits.end()..];
    }
    None
}

/// Splits a name written as a single string into `(family, given)`.
///
/// Handles "Family, Given" and natural order "Given Family".
pub(crate) fn parse_author_name(name: &str) -> (String, String) {
    let name = name.trim();
    if let Some((family, given)) = name.split_once(',') {
        return (family.trim().to_string(), given.trim().to_string());
    }

    let parts: Vec<&str> = name.split_whitespace().collect();
    match parts.len() {
        0 => (String::new(), String::new()),
        1 => (parts[0].to_string(), String::new()),
        n => (parts[n - 1].to_string(), parts[..n - 1].join(" ")),
    }
}

/// True when the text has at least two letters and no lowercase letter.
pub(crate) fn is_all_caps(text: &str) -> bool {
    let mut letters = 0;
    for c in text.chars().filter(|c| c.is_alphabetic()) {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            letters += 1;
        }
    }
    letters >= 2
}

/// Title-cases every alphabetic run: first letter upper, rest lower.
///
/// `O'CONNOR` becomes `O'Connor`, `SMITH-JONES` becomes `Smith-Jones` and
/// `MCDONALD` becomes `McDonald`.
pub(crate) fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut run = String::new();

    for c in text.chars() {
        if c.is_alphabetic() {
            run.push(c);
        } else {
            flush_title_run(&mut run, &mut result);
            result.push(c);
        }
    }
    flush_title_run(&mut run, &mut result);
    result
}

fn flush_title_run(run: &mut String, out: &mut String) {
    let mut chars = run.chars();
    if let Some(first) = chars.next() {
        out.extend(first.to_uppercase());
        let rest = chars.as_str().to_lowercase();
        match rest.strip_prefix('c') {
            // Mc prefix: MCDONALD -> McDonald
            Some(tail) if first.to_lowercase().eq(['m']) && tail.chars().count() >= 2 => {
                out.push('c');
                let mut tail_chars = tail.chars();
                if let Some(third) = tail_chars.next() {
                    out.extend(third.to_uppercase());
                }
                out.push_str(tail_chars.as_str());
            }
            _ => out.push_str(&rest),
        }
    }
    run.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year("2020-03-01"), Some(2020));
        assert_eq!(parse_year("1998"), Some(1998));
        assert_eq!(parse_year("Spring 2004"), Some(2004));
        assert_eq!(parse_year("c. 1850."), Some(1850));
        assert_eq!(parse_year("1998/99"), Some(1998));
        assert_eq!(parse_year("vol. 12345, 1987"), Some(1987));
        assert_eq!(parse_year("0042"), None);
        assert_eq!(parse_year("9999"), None);
        assert_eq!(parse_year("n.d."), None);
        assert_eq!(parse_year(""), None);
    }

    #[test]
    fn test_parse_author_name() {
        assert_eq!(
            parse_author_name("Smith, John"),
            ("Smith".to_string(), "John".to_string())
        );
        assert_eq!(
            parse_author_name("John Smith"),
            ("Smith".to_string(), "John".to_string())
        );
        assert_eq!(
            parse_author_name("Ludwig van Beethoven"),
            ("Beethoven".to_string(), "Ludwig van".to_string())
        );
        assert_eq!(
            parse_author_name("Plato"),
            ("Plato".to_string(), String::new())
        );
        assert_eq!(parse_author_name("  "), (String::new(), String::new()));
    }

    #[test]
    fn test_is_all_caps() {
        assert!(is_all_caps("SMITH"));
        assert!(is_all_caps("O'CONNOR"));
        assert!(!is_all_caps("Smith"));
        assert!(!is_all_caps("J."));
        assert!(!is_all_caps(""));
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("SMITH"), "Smith");
        assert_eq!(title_case("O'CONNOR"), "O'Connor");
        assert_eq!(title_case("SMITH-JONES"), "Smith-Jones");
        assert_eq!(title_case("MCDONALD"), "McDonald");
        assert_eq!(title_case("J.R.R."), "J.R.R.");
        assert_eq!(title_case("JOHN PAUL"), "John Paul");
        assert_eq!(title_case("MC"), "Mc");
    }
}
