/// Bibliographic fields recognized at the ingestion boundary.
///
/// Upstream keys are matched case-insensitively with `_` and `-` treated alike,
/// so `container-title`, `container_title` and `Container-Title` all map to
/// [`RawField::ContainerTitle`]. Author and editor lists are not fields here;
/// they are decoded into [`RawName`](super::RawName)s.
#[non_exhaustive]
#[derive(Debug, Eq, PartialEq, Hash, Copy, Clone, PartialOrd, Ord)]
pub enum RawField {
    /// title: Title of the cited work
    Title,
    /// container-title: Journal, book or proceedings the work appears in
    ContainerTitle,
    /// publisher: Publisher name
    Publisher,
    /// location: Place of publication
    Location,
    /// date: Publication date in any free-form shape
    Date,
    /// type: Upstream type hint
    Type,
    /// pages: Page range
    Pages,
    /// volume: Volume number
    Volume,
    /// issue: Issue number
    Issue,
    /// edition: Edition statement
    Edition,
    /// note: Free-form note
    Note,
    /// genre: Sub-type description, e.g. "PhD thesis"
    Genre,
}

impl RawField {
    /// Maps an upstream key onto its canonical field.
    ///
    /// Returns `None` for keys with no canonical counterpart, including the
    /// name-list keys `author` and `editor`.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_ascii_lowercase().replace('_', "-");
        let field = match key.as_str() {
            "title" => RawField::Title,
            "container-title" | "journal" | "journal-title" | "booktitle" | "book-title" => {
                RawField::ContainerTitle
            }
            "publisher" => RawField::Publisher,
            "location" | "publisher-place" | "address" | "place" => RawField::Location,
            "date" | "issued" | "year" => RawField::Date,
            "type" => RawField::Type,
            "pages" | "page" => RawField::Pages,
            "volume" => RawField::Volume,
            "issue" | "number" => RawField::Issue,
            "edition" => RawField::Edition,
            "note" => RawField::Note,
            "genre" => RawField::Genre,
            _ => return None,
        };
        Some(field)
    }

    /// Canonical (CSL-style) key for this field.
    pub fn as_key(&self) -> &'static str {
        match self {
            RawField::Title => "title",
            RawField::ContainerTitle => "container-title",
            RawField::Publisher => "publisher",
            RawField::Location => "location",
            RawField::Date => "date",
            RawField::Type => "type",
            RawField::Pages => "pages",
            RawField::Volume => "volume",
            RawField::Issue => "issue",
            RawField::Edition => "edition",
            RawField::Note => "note",
            RawField::Genre => "genre",
        }
    }
}
