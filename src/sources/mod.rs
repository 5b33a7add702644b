//! Search source adapters with a shared trait-based interface.
//!
//! Each adapter translates a free-text query into one provider request,
//! parses the provider's native payload and normalizes it into
//! [`NormalizedRecord`] values. Adapters are independent: a failure in one
//! never reaches the others or the caller.
//!
//! | Source            | Endpoint                        | Payload   |
//! |-------------------|---------------------------------|-----------|
//! | Semantic Scholar  | `/graph/v1/paper/search`        | JSON      |
//! | arXiv             | `/api/query`                    | Atom XML  |
//! | OpenAlex          | `/works`                        | JSON      |
//!
//! # Environment
//!
//! - `SEMANTIC_SCHOLAR_API_KEY` - sent as `x-api-key` when present
//! - `OPENALEX_EMAIL` - sent as `mailto` to join the OpenAlex polite pool

mod arxiv;
pub mod mock;
mod openalex;
mod semantic;
mod wire;

pub use arxiv::ArxivSource;
pub use mock::MockSource;
pub use openalex::OpenAlexSource;
pub use semantic::SemanticScholarSource;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::Config;
use crate::models::{NormalizedRecord, SearchQuery, SourceKind};
use crate::utils::HttpClient;

/// The Source trait defines the interface for every search provider.
///
/// Implementors provide [`Source::search`], which issues exactly one
/// request and reports failures. Callers that must never fail use
/// [`Source::fetch_records`], which degrades any failure to an empty list.
#[async_trait]
pub trait Source: Send + Sync + std::fmt::Debug {
    /// Provenance tag stamped on every record this source produces
    fn kind(&self) -> SourceKind;

    /// Unique identifier for this source
    fn id(&self) -> &str {
        self.kind().id()
    }

    /// Human-readable name of this source
    fn name(&self) -> &str {
        self.kind().name()
    }

    /// Search the provider, returning normalized records in provider order
    async fn search(&self, query: &SearchQuery) -> Result<Vec<NormalizedRecord>, SourceError>;

    /// Fetch up to `limit` records, logging and swallowing any failure
    async fn fetch_records(&self, query: &str, limit: usize) -> Vec<NormalizedRecord> {
        let query = SearchQuery::new(query).max_results(limit);
        match self.search(&query).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(source = self.id(), error = %e, "source search failed");
                Vec::new()
            }
        }
    }
}

/// Build the three provider adapters in merge order, honoring the
/// enabled/disabled source lists and API keys from the configuration
pub fn default_sources(config: &Config) -> Result<Vec<Arc<dyn Source>>, SourceError> {
    let client = HttpClient::with_timeout(config.search.source_timeout())?;

    let sources = config
        .sources
        .selected()
        .into_iter()
        .map(|kind| -> Arc<dyn Source> {
            match kind {
                SourceKind::SemanticScholar => Arc::new(
                    SemanticScholarSource::new(client.clone())
                        .with_api_key(config.api_keys.semantic_scholar.clone()),
                ),
                SourceKind::Arxiv => Arc::new(ArxivSource::new(client.clone())),
                SourceKind::OpenAlex => Arc::new(
                    OpenAlexSource::new(client.clone())
                        .with_email(config.api_keys.openalex_email.clone()),
                ),
            }
        })
        .collect();

    Ok(sources)
}

/// Errors that can occur when interacting with a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network or HTTP transport error
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success status returned by the provider
    #[error("API error: {0}")]
    Api(String),

    /// Parsing error (XML, JSON)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The source did not answer within the allotted time
    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Other error
    #[error("Error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(format!("JSON: {}", err))
    }
}
