//! Semantic Scholar search source.

use async_trait::async_trait;
use serde::Deserialize;

use super::wire;
use crate::models::{NormalizedRecord, PublicationYear, RecordBuilder, SearchQuery, SourceKind};
use crate::sources::{Source, SourceError};
use crate::utils::HttpClient;

const SEMANTIC_API_BASE: &str = "https://api.semanticscholar.org/graph/v1";

/// Fields requested from the paper search endpoint
const SEARCH_FIELDS: &str = "paperId,title,authors,year,abstract,tldr,url,citationCount,isOpenAccess";

/// Semantic Scholar search source
///
/// Uses the Graph API paper search endpoint.
#[derive(Debug, Clone)]
pub struct SemanticScholarSource {
    client: HttpClient,
    base_url: String,
    api_key: Option<String>,
}

impl SemanticScholarSource {
    /// Create a new Semantic Scholar source, reading `SEMANTIC_SCHOLAR_API_KEY` if set
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            base_url: SEMANTIC_API_BASE.to_string(),
            api_key: std::env::var("SEMANTIC_SCHOLAR_API_KEY").ok(),
        }
    }

    /// Use an API key (optional, for higher rate limits); `None` keeps the current key
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
        self
    }

    /// Point the source at a different API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn search_url(&self, query: &SearchQuery) -> String {
        format!(
            "{}/paper/search?query={}&limit={}&fields={}",
            self.base_url,
            urlencoding::encode(query.terms()),
            query.max_results,
            SEARCH_FIELDS
        )
    }

    /// Add API key to request headers if available
    fn add_api_key_if_present(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(ref key) = self.api_key {
            builder.header("x-api-key", key)
        } else {
            builder
        }
    }

    /// Parse the search response body into records, dropping unusable items
    pub(crate) fn parse_response(body: &str) -> Result<Vec<NormalizedRecord>, SourceError> {
        let envelope: S2SearchResponse = serde_json::from_str(body)?;

        let records = envelope
            .data
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<S2Paper>(item) {
                Ok(paper) => Self::parse_paper(paper),
                Err(e) => {
                    tracing::debug!(error = %e, "dropping malformed Semantic Scholar item");
                    None
                }
            })
            .collect();

        Ok(records)
    }

    /// Parse Semantic Scholar paper data
    fn parse_paper(data: S2Paper) -> Option<NormalizedRecord> {
        let paper_id = data.paper_id.unwrap_or_default();

        let url = data
            .url
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| format!("https://www.semanticscholar.org/paper/{}", paper_id));

        let abstract_text = data
            .tldr
            .and_then(|t| t.text)
            .filter(|t| !t.trim().is_empty())
            .or(data.r#abstract);

        let authors = data.authors.into_iter().filter_map(|a| a.name);

        let title = data.title.unwrap_or_default();

        RecordBuilder::new(paper_id, title, url, SourceKind::SemanticScholar)
            .authors(authors)
            .year(data.year)
            .abstract_text(abstract_text)
            .citation_count(data.citation_count)
            .open_access(data.is_open_access.unwrap_or(false))
            .build()
            .map_err(|e| tracing::debug!(error = %e, "dropping Semantic Scholar record"))
            .ok()
    }
}

#[async_trait]
impl Source for SemanticScholarSource {
    fn kind(&self) -> SourceKind {
        SourceKind::SemanticScholar
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<NormalizedRecord>, SourceError> {
        let url = self.search_url(query);
        tracing::debug!(%url, "querying Semantic Scholar");

        let response = self
            .add_api_key_if_present(self.client.get(&url))
            .send()
            .await
            .map_err(|e| {
                SourceError::Network(format!("Failed to search Semantic Scholar: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(SourceError::Api(format!(
                "Semantic Scholar API returned status: {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to read response: {}", e)))?;

        Self::parse_response(&body)
    }
}

// ===== Semantic Scholar API Types =====

#[derive(Debug, Deserialize)]
struct S2SearchResponse {
    #[serde(default, deserialize_with = "wire::items")]
    data: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct S2Paper {
    #[serde(rename = "paperId")]
    paper_id: Option<String>,
    title: Option<String>,
    r#abstract: Option<String>,
    tldr: Option<S2Tldr>,
    #[serde(default, deserialize_with = "wire::publication_year")]
    year: PublicationYear,
    #[serde(rename = "citationCount")]
    citation_count: Option<u32>,
    #[serde(rename = "isOpenAccess")]
    is_open_access: Option<bool>,
    #[serde(default, deserialize_with = "wire::list")]
    authors: Vec<S2Author>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct S2Tldr {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct S2Author {
    name: Option<String>,
}
