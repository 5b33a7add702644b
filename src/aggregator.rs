//! Concurrent fan-out across sources with a round-robin merge.
//!
//! One search dispatches the same query to every configured source at once,
//! waits for all of them to settle, and interleaves the per-source lists in
//! source order: first record of each source, then the second of each, and
//! so on. A source that fails or exceeds its time budget contributes an
//! empty list; the search itself still succeeds.

use futures_util::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::models::{NormalizedRecord, SearchQuery, SourceKind, DEFAULT_PER_SOURCE_LIMIT};
use crate::sources::{default_sources, Source, SourceError};
use crate::utils::{deduplicate, DedupPolicy};

/// Default upper bound on a single source call
pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(15);

/// Outcome of one source within an aggregate search
#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub source: SourceKind,
    /// Records contributed before merging
    pub count: usize,
    #[serde(serialize_with = "serialize_millis")]
    pub elapsed: Duration,
    /// Failure or timeout message, `None` on success
    pub error: Option<String>,
}

impl SourceReport {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Merged records plus per-source diagnostics
#[derive(Debug, Clone, Serialize)]
pub struct AggregateResponse {
    pub query: String,
    pub records: Vec<NormalizedRecord>,
    pub reports: Vec<SourceReport>,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

/// Fans a query out to every source and merges the answers
#[derive(Debug, Clone)]
pub struct Aggregator {
    sources: Vec<Arc<dyn Source>>,
    per_source_limit: usize,
    source_timeout: Duration,
    dedup: DedupPolicy,
}

impl Aggregator {
    /// Create an aggregator over `sources`; their order fixes the merge order
    pub fn new(sources: Vec<Arc<dyn Source>>) -> Self {
        Self {
            sources,
            per_source_limit: DEFAULT_PER_SOURCE_LIMIT,
            source_timeout: DEFAULT_SOURCE_TIMEOUT,
            dedup: DedupPolicy::Off,
        }
    }

    /// Build the default Semantic Scholar, arXiv, OpenAlex aggregator
    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        Ok(Self::new(default_sources(config)?)
            .with_limit(config.search.per_source_limit)
            .with_timeout(config.search.source_timeout())
            .with_dedup(config.search.dedup_policy()))
    }

    /// Maximum records requested from each source
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.per_source_limit = limit;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.source_timeout = timeout;
        self
    }

    pub fn with_dedup(mut self, dedup: DedupPolicy) -> Self {
        self.dedup = dedup;
        self
    }

    pub fn sources(&self) -> &[Arc<dyn Source>] {
        &self.sources
    }

    pub fn per_source_limit(&self) -> usize {
        self.per_source_limit
    }

    /// Search every source and return the merged records
    pub async fn search(&self, query: &str) -> Result<Vec<NormalizedRecord>, SourceError> {
        Ok(self.search_detailed(query).await?.records)
    }

    /// Search every source, returning merged records and what each source did
    ///
    /// Fails only for an unusable query, before any source is contacted.
    pub async fn search_detailed(&self, query: &str) -> Result<AggregateResponse, SourceError> {
        let query = SearchQuery::new(query).max_results(self.per_source_limit);
        if !query.is_valid() {
            let reason = if query.terms().is_empty() {
                "query must not be empty"
            } else {
                "per-source limit must be greater than zero"
            };
            return Err(SourceError::InvalidRequest(reason.to_string()));
        }

        info!(query = query.terms(), sources = self.sources.len(), "fanning out search");

        let calls = self
            .sources
            .iter()
            .map(|source| self.call_source(source.as_ref(), &query));
        let outcomes = join_all(calls).await;

        let (lists, reports): (Vec<_>, Vec<_>) = outcomes.into_iter().unzip();
        let merged = interleave(lists);
        let merged_len = merged.len();
        let records = deduplicate(merged, self.dedup);

        if records.len() < merged_len {
            debug!(removed = merged_len - records.len(), "dropped duplicate records");
        }
        info!(
            total = records.len(),
            failed = reports.iter().filter(|r| !r.succeeded()).count(),
            "search completed"
        );

        Ok(AggregateResponse {
            query: query.terms().to_string(),
            records,
            reports,
        })
    }

    /// Run one source under the time budget; any failure becomes an empty list
    async fn call_source(
        &self,
        source: &dyn Source,
        query: &SearchQuery,
    ) -> (Vec<NormalizedRecord>, SourceReport) {
        let started = Instant::now();
        let result = match tokio::time::timeout(self.source_timeout, source.search(query)).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::Timeout(self.source_timeout)),
        };
        let elapsed = started.elapsed();

        match result {
            Ok(mut records) => {
                records.truncate(query.max_results);
                info!(source = source.id(), count = records.len(), ?elapsed, "source returned");
                let report = SourceReport {
                    source: source.kind(),
                    count: records.len(),
                    elapsed,
                    error: None,
                };
                (records, report)
            }
            Err(e) => {
                warn!(source = source.id(), error = %e, "source failed, contributing no records");
                let report = SourceReport {
                    source: source.kind(),
                    count: 0,
                    elapsed,
                    error: Some(e.to_string()),
                };
                (Vec::new(), report)
            }
        }
    }
}

/// Round-robin merge: position `i` of every list, in list order, before position `i + 1`
///
/// Exhausted lists are skipped and nothing is dropped, so the output length
/// is the sum of the input lengths.
pub fn interleave<T>(lists: Vec<Vec<T>>) -> Vec<T> {
    let total = lists.iter().map(Vec::len).sum();
    let mut iters: Vec<_> = lists.into_iter().map(Vec::into_iter).collect();
    let mut merged = Vec::with_capacity(total);

    while merged.len() < total {
        for iter in iters.iter_mut() {
            if let Some(item) = iter.next() {
                merged.push(item);
            }
        }
    }

    merged
}
