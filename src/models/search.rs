//! Search request model.

use serde::{Deserialize, Serialize};

/// Default number of records requested from each source
pub const DEFAULT_PER_SOURCE_LIMIT: usize = 10;

/// Search query parameters passed to every source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free-text query string
    pub query: String,

    /// Maximum number of results a single source may return
    pub max_results: usize,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            query: String::new(),
            max_results: DEFAULT_PER_SOURCE_LIMIT,
        }
    }
}

impl SearchQuery {
    /// Create a new search query
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Set maximum results
    pub fn max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }

    /// The query with surrounding whitespace removed
    pub fn terms(&self) -> &str {
        self.query.trim()
    }

    /// A query is searchable when it has non-blank text and a non-zero limit
    pub fn is_valid(&self) -> bool {
        !self.terms().is_empty() && self.max_results > 0
    }
}
