//! Lenient wire types for weakly-typed provider payloads.

use serde::{Deserialize, Deserializer};

use crate::models::PublicationYear;

/// A field that providers send either as a single value or as an array
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl<T> OneOrMany<T> {
    /// Flatten into an ordered vector in both cases
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

/// A year that may arrive as a number, a string or null
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum LooseYear {
    Number(i64),
    Float(f64),
    Text(String),
}

/// Deserialize a [`PublicationYear`] from a number, a numeric string or null
pub(crate) fn publication_year<'de, D>(deserializer: D) -> Result<PublicationYear, D::Error>
where
    D: Deserializer<'de>,
{
    let year = match Option::<LooseYear>::deserialize(deserializer)? {
        Some(LooseYear::Number(n)) => i32::try_from(n)
            .map(PublicationYear::Known)
            .unwrap_or_default(),
        Some(LooseYear::Float(f)) if f.fract() == 0.0 => PublicationYear::Known(f as i32),
        Some(LooseYear::Float(_)) => PublicationYear::Unknown,
        Some(LooseYear::Text(text)) => PublicationYear::parse(&text),
        None => PublicationYear::Unknown,
    };
    Ok(year)
}

/// Deserialize a list of raw JSON items, tolerating null and a bare object
pub(crate) fn items<'de, D>(deserializer: D) -> Result<Vec<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Option::<OneOrMany<serde_json::Value>>::deserialize(deserializer)?
        .map(OneOrMany::into_vec)
        .unwrap_or_default();
    Ok(items)
}

/// Deserialize an optional container of items: null, a bare item or an
/// array all decode, and null elements are skipped
pub(crate) fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let items = Option::<OneOrMany<Option<T>>>::deserialize(deserializer)?
        .map(OneOrMany::into_vec)
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .collect();
    Ok(items)
}
