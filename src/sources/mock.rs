//! Mock source for testing purposes.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::models::{NormalizedRecord, RecordBuilder, SearchQuery, SourceKind};
use crate::sources::{Source, SourceError};

/// A mock source for testing that returns predefined responses.
#[derive(Debug)]
pub struct MockSource {
    kind: SourceKind,
    records: Vec<NormalizedRecord>,
    failure: Option<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockSource {
    /// Create a new mock source that returns no records.
    pub fn new(kind: SourceKind) -> Self {
        Self {
            kind,
            records: Vec::new(),
            failure: None,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Return these records from every search.
    pub fn with_records(mut self, records: Vec<NormalizedRecord>) -> Self {
        self.records = records;
        self
    }

    /// Fail every search with an API error.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of searches issued against this source.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Source for MockSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<NormalizedRecord>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.failure {
            Some(message) => Err(SourceError::Api(message.clone())),
            None => Ok(self.records.iter().take(query.max_results).cloned().collect()),
        }
    }
}

/// Helper function to create a mock record for testing.
pub fn make_record(identifier: &str, title: &str, source: SourceKind) -> NormalizedRecord {
    RecordBuilder::new(
        identifier,
        title,
        format!("http://example.com/{}", identifier),
        source,
    )
    .build()
    .unwrap_or_else(|e| panic!("invalid mock record {}: {}", identifier, e))
}

/// Helper function to create `count` mock records tagged `<prefix>0`, `<prefix>1`, ...
pub fn make_records(prefix: &str, count: usize, source: SourceKind) -> Vec<NormalizedRecord> {
    (0..count)
        .map(|i| {
            let id = format!("{}{}", prefix, i);
            make_record(&id, &format!("Paper {}", id), source)
        })
        .collect()
}
