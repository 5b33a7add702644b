//! OpenAlex search source.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

use super::wire;
use crate::models::{NormalizedRecord, PublicationYear, RecordBuilder, SearchQuery, SourceKind};
use crate::sources::{Source, SourceError};
use crate::utils::HttpClient;

const OPENALEX_API_BASE: &str = "https://api.openalex.org";

/// OpenAlex search source
///
/// Uses the OpenAlex REST API `works` endpoint.
#[derive(Debug, Clone)]
pub struct OpenAlexSource {
    client: HttpClient,
    base_url: String,
    email: Option<String>,
}

impl OpenAlexSource {
    /// Create a new OpenAlex source, reading `OPENALEX_EMAIL` if set
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            base_url: OPENALEX_API_BASE.to_string(),
            email: std::env::var("OPENALEX_EMAIL").ok(),
        }
    }

    /// Use a contact email (recommended for better rate limits); `None` keeps the current one
    pub fn with_email(mut self, email: Option<String>) -> Self {
        if let Some(email) = email.filter(|e| !e.trim().is_empty()) {
            self.email = Some(email);
        }
        self
    }

    /// Point the source at a different API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn search_url(&self, query: &SearchQuery) -> String {
        let url = format!(
            "{}/works?search={}&per_page={}",
            self.base_url,
            urlencoding::encode(query.terms()),
            query.max_results
        );

        // Add email to request URL if available (for polite pool)
        match self.email {
            Some(ref email) => format!("{}&mailto={}", url, urlencoding::encode(email)),
            None => url,
        }
    }

    /// Parse the works response body into records, dropping unusable items
    pub(crate) fn parse_response(body: &str) -> Result<Vec<NormalizedRecord>, SourceError> {
        let envelope: WorksResponse = serde_json::from_str(body)?;

        let records = envelope
            .results
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<OAWork>(item) {
                Ok(work) => Self::parse_work(work),
                Err(e) => {
                    tracing::debug!(error = %e, "dropping malformed OpenAlex work");
                    None
                }
            })
            .collect();

        Ok(records)
    }

    /// Parse OpenAlex work data
    fn parse_work(work: OAWork) -> Option<NormalizedRecord> {
        let id = work.id.unwrap_or_default();

        let landing_page = work.primary_location.and_then(|l| l.landing_page_url);
        let url = [work.doi, landing_page]
            .into_iter()
            .flatten()
            .find(|u| !u.trim().is_empty())
            .unwrap_or_else(|| id.clone());

        let title = work
            .title
            .filter(|t| !t.trim().is_empty())
            .or(work.display_name)
            .unwrap_or_default();

        let authors = work
            .authorships
            .into_iter()
            .filter_map(|a| a.author.and_then(|author| author.display_name));

        let abstract_text = work
            .abstract_inverted_index
            .map(|index| reconstruct_abstract(&index));

        RecordBuilder::new(id, title, url, SourceKind::OpenAlex)
            .authors(authors)
            .year(work.publication_year)
            .abstract_text(abstract_text)
            .citation_count(work.cited_by_count)
            .open_access(work.open_access.and_then(|oa| oa.is_oa).unwrap_or(false))
            .build()
            .map_err(|e| tracing::debug!(error = %e, "dropping OpenAlex record"))
            .ok()
    }
}

/// Rebuild abstract text from OpenAlex's word -> positions index
fn reconstruct_abstract(index: &HashMap<String, Vec<u32>>) -> String {
    let mut positions: BTreeMap<u32, &str> = BTreeMap::new();
    for (word, slots) in index {
        for slot in slots {
            positions.entry(*slot).or_insert(word.as_str());
        }
    }
    positions.into_values().collect::<Vec<_>>().join(" ")
}

#[async_trait]
impl Source for OpenAlexSource {
    fn kind(&self) -> SourceKind {
        SourceKind::OpenAlex
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<NormalizedRecord>, SourceError> {
        let url = self.search_url(query);
        tracing::debug!(%url, "querying OpenAlex");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to search OpenAlex: {}", e)))?;

        if !response.status().is_success() {
            return Err(SourceError::Api(format!(
                "OpenAlex API returned status: {}",
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

// ===== OpenAlex API Types =====

#[derive(Debug, Deserialize)]
struct WorksResponse {
    #[serde(default, deserialize_with = "wire::items")]
    results: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct OAWork {
    id: Option<String>,
    doi: Option<String>,
    title: Option<String>,
    display_name: Option<String>,
    #[serde(default, deserialize_with = "wire::publication_year")]
    publication_year: PublicationYear,
    #[serde(default, deserialize_with = "wire::list")]
    authorships: Vec<OAAuthorship>,
    abstract_inverted_index: Option<HashMap<String, Vec<u32>>>,
    cited_by_count: Option<u32>,
    open_access: Option<OAOpenAccess>,
    primary_location: Option<OALocation>,
}

#[derive(Debug, Deserialize)]
struct OAAuthorship {
    author: Option<OAAuthor>,
}

#[derive(Debug, Deserialize)]
struct OAAuthor {
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OAOpenAccess {
    is_oa: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct OALocation {
    landing_page_url: Option<String>,
}
