//! Core data models for search records and queries.

mod record;
mod search;

pub use record::{
    Author, NormalizedRecord, PublicationYear, RecordBuilder, RecordError, SourceKind,
};
pub use search::{SearchQuery, DEFAULT_PER_SOURCE_LIMIT};
