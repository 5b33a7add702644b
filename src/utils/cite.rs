//! Citation formatting in various styles.
//!
//! Supports BibTeX plus APA 7th, MLA 9th and Chicago 17th renderings.

use crate::models::NormalizedRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Citation style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CitationStyle {
    /// BibTeX `@article` entry
    #[default]
    Bibtex,
    /// APA 7th edition
    Apa,
    /// MLA 9th edition
    Mla,
    /// Chicago 17th edition (author-date)
    Chicago,
}

/// Format a record citation in the specified style
pub fn format_citation(record: &NormalizedRecord, style: CitationStyle) -> String {
    match style {
        CitationStyle::Bibtex => format_bibtex(record),
        CitationStyle::Apa => format_apa(record),
        CitationStyle::Mla => format_mla(record),
        CitationStyle::Chicago => format_chicago(record),
    }
}

/// Generate a BibTeX entry keyed by `<source-id>_<year>`
///
/// ```text
/// @article{arxiv_2020,
///   title = {Title},
///   author = {A and B},
///   year = {2020},
///   url = {http://x}
/// }
/// ```
pub fn format_bibtex(record: &NormalizedRecord) -> String {
    let year = record.year();
    let key_year = year
        .value()
        .map(|y| y.to_string())
        .unwrap_or_else(|| "nd".to_string());
    let authors = record.author_names().collect::<Vec<_>>().join(" and ");

    format!(
        "@article{{{}_{},\n  title = {{{}}},\n  author = {{{}}},\n  year = {{{}}},\n  url = {{{}}}\n}}",
        record.source().id(),
        key_year,
        record.title(),
        authors,
        year,
        record.url()
    )
}

/// Split "First Middle Last" into ("Last", ["First", "Middle"])
fn split_name(name: &str) -> (&str, Vec<&str>) {
    if let Some((last, given)) = name.split_once(',') {
        return (last.trim(), given.split_whitespace().collect());
    }

    let words: Vec<&str> = name.split_whitespace().collect();
    match words.split_last() {
        Some((last, given)) => (*last, given.to_vec()),
        None => (name, Vec::new()),
    }
}

fn format_author_apa_single(name: &str) -> String {
    let (last, given) = split_name(name);
    if given.is_empty() {
        return last.to_string();
    }
    let initials: Vec<String> = given
        .iter()
        .filter_map(|n| n.chars().next())
        .map(|c| format!("{}.", c))
        .collect();
    format!("{}, {}", last, initials.join(" "))
}

fn format_author_inverted(name: &str) -> String {
    let (last, given) = split_name(name);
    if given.is_empty() {
        last.to_string()
    } else {
        format!("{}, {}", last, given.join(" "))
    }
}

/// Format authors as "Last, F., Last, F., & Last, F."
fn format_authors_apa(names: &[&str]) -> String {
    let formatted: Vec<String> = names.iter().map(|n| format_author_apa_single(n)).collect();
    match formatted.as_slice() {
        [] => "Anonymous".to_string(),
        [only] => only.clone(),
        [first, second] => format!("{} & {}", first, second),
        // APA lists up to 20 authors, then an ellipsis before the final author
        [head @ .., last] if formatted.len() > 20 => {
            format!("{}, ... {}", head[..19].join(", "), last)
        }
        [head @ .., last] => format!("{}, & {}", head.join(", "), last),
    }
}

/// Format authors as "Last, First, and First Last" (MLA and Chicago)
fn format_authors_inverted(names: &[&str], many_suffix: &str) -> String {
    match names {
        [] => "Anonymous".to_string(),
        [only] => format_author_inverted(only),
        [first, second] => format!("{}, and {}", format_author_inverted(first), second),
        [first, ..] => format!("{}, {}", format_author_inverted(first), many_suffix),
    }
}

fn strip_trailing_period(text: &str) -> &str {
    text.strip_suffix('.').unwrap_or(text)
}

/// Author, A. A., & Author, B. B. (Year). Title. Source. URL
fn format_apa(record: &NormalizedRecord) -> String {
    let names: Vec<&str> = record.author_names().collect();
    format!(
        "{}. ({}). {}. {}. {}",
        strip_trailing_period(&format_authors_apa(&names)),
        record.year(),
        strip_trailing_period(record.title()),
        record.source().name(),
        record.url()
    )
}

/// Author. "Title." Source, Year, URL.
fn format_mla(record: &NormalizedRecord) -> String {
    let names: Vec<&str> = record.author_names().collect();
    format!(
        "{}. \"{}.\" {}, {}, {}.",
        strip_trailing_period(&format_authors_inverted(&names, "et al")),
        strip_trailing_period(record.title()),
        record.source().name(),
        record.year(),
        record.url()
    )
}

/// Author. Year. "Title." Source. URL.
fn format_chicago(record: &NormalizedRecord) -> String {
    let names: Vec<&str> = record.author_names().collect();
    format!(
        "{}. {}. \"{}.\" {}. {}.",
        strip_trailing_period(&format_authors_inverted(&names, "et al.")),
        record.year(),
        strip_trailing_period(record.title()),
        record.source().name(),
        record.url()
    )
}

impl fmt::Display for CitationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CitationStyle::Bibtex => write!(f, "BibTeX"),
            CitationStyle::Apa => write!(f, "APA 7th"),
            CitationStyle::Mla => write!(f, "MLA 9th"),
            CitationStyle::Chicago => write!(f, "Chicago 17th"),
        }
    }
}
