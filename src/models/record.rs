//! Normalized record model shared by every search source.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::utils::collapse_whitespace;

/// The provider a record was fetched from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    SemanticScholar,
    Arxiv,
    #[serde(rename = "openalex")]
    OpenAlex,
}

impl SourceKind {
    /// Fixed order used when merging results from all providers
    pub const ALL: [SourceKind; 3] = [
        SourceKind::SemanticScholar,
        SourceKind::Arxiv,
        SourceKind::OpenAlex,
    ];

    /// Returns the display name of the source
    pub fn name(&self) -> &'static str {
        match self {
            SourceKind::SemanticScholar => "Semantic Scholar",
            SourceKind::Arxiv => "arXiv",
            SourceKind::OpenAlex => "OpenAlex",
        }
    }

    /// Returns the source identifier (for config and citation keys)
    pub fn id(&self) -> &'static str {
        match self {
            SourceKind::SemanticScholar => "semantic-scholar",
            SourceKind::Arxiv => "arxiv",
            SourceKind::OpenAlex => "openalex",
        }
    }

    /// Look up a source by id, accepting a few common spellings
    pub fn from_id(id: &str) -> Option<Self> {
        match id.trim().to_lowercase().as_str() {
            "semantic-scholar" | "semantic_scholar" | "semantic" | "s2" => {
                Some(SourceKind::SemanticScholar)
            }
            "arxiv" => Some(SourceKind::Arxiv),
            "openalex" => Some(SourceKind::OpenAlex),
            _ => None,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Publication year, which providers report as a number, a string, or not at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PublicationYear {
    Known(i32),
    #[default]
    Unknown,
}

impl PublicationYear {
    /// The year as an integer, if known
    pub fn value(&self) -> Option<i32> {
        match self {
            PublicationYear::Known(year) => Some(*year),
            PublicationYear::Unknown => None,
        }
    }

    /// Parse a year from loosely formatted text such as "2020" or "2020-05-01"
    pub fn parse(text: &str) -> Self {
        let digits: String = text.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
        match digits.parse::<i32>() {
            Ok(year) if digits.len() == 4 => PublicationYear::Known(year),
            _ => PublicationYear::Unknown,
        }
    }
}

impl From<Option<i32>> for PublicationYear {
    fn from(year: Option<i32>) -> Self {
        year.map(PublicationYear::Known).unwrap_or_default()
    }
}

impl fmt::Display for PublicationYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublicationYear::Known(year) => write!(f, "{}", year),
            PublicationYear::Unknown => write!(f, "n.d."),
        }
    }
}

impl Serialize for PublicationYear {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PublicationYear::Known(year) => serializer.serialize_i32(*year),
            PublicationYear::Unknown => serializer.serialize_none(),
        }
    }
}

/// A single author in byline order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub name: String,
}

impl Author {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A search result in the provider-agnostic shape every source produces.
///
/// Records can only be created through [`RecordBuilder`] and expose no
/// mutators, so downstream stages may reorder but never alter them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRecord {
    identifier: String,
    source: SourceKind,
    title: String,
    authors: Vec<Author>,
    year: PublicationYear,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    url: String,
    citation_count: Option<u32>,
    is_open_access: bool,
}

impl NormalizedRecord {
    /// Provider-specific identifier (URL, DOI or internal id)
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn source(&self) -> SourceKind {
        self.source
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn authors(&self) -> &[Author] {
        &self.authors
    }

    /// Author names in byline order
    pub fn author_names(&self) -> impl Iterator<Item = &str> {
        self.authors.iter().map(|a| a.name.as_str())
    }

    pub fn year(&self) -> PublicationYear {
        self.year
    }

    pub fn abstract_text(&self) -> Option<&str> {
        self.abstract_text.as_deref()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn citation_count(&self) -> Option<u32> {
        self.citation_count
    }

    pub fn is_open_access(&self) -> bool {
        self.is_open_access
    }
}

/// Reasons a record cannot be built
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("record has no title")]
    MissingTitle,

    #[error("record has no identifier")]
    MissingIdentifier,
}

/// Builder for constructing [`NormalizedRecord`] values
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    identifier: String,
    source: SourceKind,
    title: String,
    authors: Vec<Author>,
    year: PublicationYear,
    abstract_text: Option<String>,
    url: String,
    citation_count: Option<u32>,
    is_open_access: bool,
}

impl RecordBuilder {
    /// Create a new builder with required fields
    pub fn new(
        identifier: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
        source: SourceKind,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            source,
            title: title.into(),
            authors: Vec::new(),
            year: PublicationYear::Unknown,
            abstract_text: None,
            url: url.into(),
            citation_count: None,
            is_open_access: false,
        }
    }

    /// Set authors from names in byline order; blank names are skipped
    pub fn authors<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.authors = names
            .into_iter()
            .map(|n| collapse_whitespace(n.as_ref()))
            .filter(|n| !n.is_empty())
            .map(Author::new)
            .collect();
        self
    }

    pub fn year(mut self, year: impl Into<PublicationYear>) -> Self {
        self.year = year.into();
        self
    }

    /// Set the abstract; blank text is treated as absent
    pub fn abstract_text(mut self, text: Option<impl AsRef<str>>) -> Self {
        self.abstract_text = text
            .map(|t| collapse_whitespace(t.as_ref()))
            .filter(|t| !t.is_empty());
        self
    }

    pub fn citation_count(mut self, count: Option<u32>) -> Self {
        self.citation_count = count;
        self
    }

    pub fn open_access(mut self, is_open_access: bool) -> Self {
        self.is_open_access = is_open_access;
        self
    }

    /// Build the record, normalizing the title
    pub fn build(self) -> Result<NormalizedRecord, RecordError> {
        let identifier = self.identifier.trim().to_string();
        if identifier.is_empty() {
            return Err(RecordError::MissingIdentifier);
        }

        let title = collapse_whitespace(&self.title);
        if title.is_empty() {
            return Err(RecordError::MissingTitle);
        }

        Ok(NormalizedRecord {
            identifier,
            source: self.source,
            title,
            authors: self.authors,
            year: self.year,
            abstract_text: self.abstract_text,
            url: self.url.trim().to_string(),
            citation_count: self.citation_count,
            is_open_access: self.is_open_access,
        })
    }
}
