//! arXiv search source.

use async_trait::async_trait;
use chrono::Datelike;
use feed_rs::parser;

use crate::models::{NormalizedRecord, RecordBuilder, SearchQuery, SourceKind};
use crate::sources::{Source, SourceError};
use crate::utils::HttpClient;

/// Base URL for arXiv API
const ARXIV_API_URL: &str = "https://export.arxiv.org/api/query";

/// arXiv rejects pages larger than this
const ARXIV_MAX_RESULTS: usize = 2000;

/// arXiv reports query errors as feed entries under this path
const ARXIV_ERROR_ID: &str = "/api/errors";

/// arXiv search source
///
/// Queries the Atom export API. Every arXiv paper is open access; the API
/// does not report citation counts.
#[derive(Debug, Clone)]
pub struct ArxivSource {
    client: HttpClient,
    base_url: String,
}

impl ArxivSource {
    /// Create a new arXiv source
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            base_url: ARXIV_API_URL.to_string(),
        }
    }

    /// Point the source at a different query endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build the request URL; terms are searched across all fields
    fn search_url(&self, query: &SearchQuery) -> String {
        format!(
            "{}?search_query={}&start=0&max_results={}",
            self.base_url,
            urlencoding::encode(&format!("all:{}", query.terms())),
            query.max_results.min(ARXIV_MAX_RESULTS)
        )
    }

    /// Parse an Atom feed into records, skipping error and unusable entries
    pub(crate) fn parse_feed(body: &[u8]) -> Result<Vec<NormalizedRecord>, SourceError> {
        let feed = parser::parse(body)
            .map_err(|e| SourceError::Parse(format!("Failed to parse Atom feed: {}", e)))?;

        let records = feed
            .entries
            .iter()
            .filter(|entry| {
                let is_error = entry.id.contains(ARXIV_ERROR_ID);
                if is_error {
                    tracing::warn!(id = %entry.id, "arXiv reported a query error");
                }
                !is_error
            })
            .filter_map(Self::parse_entry)
            .collect();

        Ok(records)
    }

    /// Parse arXiv Atom feed entry into a record
    fn parse_entry(entry: &feed_rs::model::Entry) -> Option<NormalizedRecord> {
        let title = entry
            .title
            .as_ref()
            .map(|t| t.content.as_str())
            .unwrap_or("");

        let abstract_text = entry.summary.as_ref().map(|s| s.content.as_str());

        // feed-rs yields a vector whether the entry has one author or many
        let authors = entry.authors.iter().map(|a| a.name.as_str());

        let year = entry.published.or(entry.updated).map(|d| d.year());

        RecordBuilder::new(&entry.id, title, &entry.id, SourceKind::Arxiv)
            .authors(authors)
            .year(year)
            .abstract_text(abstract_text)
            .open_access(true)
            .build()
            .map_err(|e| tracing::debug!(id = %entry.id, error = %e, "dropping arXiv entry"))
            .ok()
    }
}

#[async_trait]
impl Source for ArxivSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Arxiv
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<NormalizedRecord>, SourceError> {
        let url = self.search_url(query);
        tracing::debug!(%url, "querying arXiv");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/atom+xml")
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to fetch arXiv results: {}", e)))?;

        if !response.status().is_success() {
            return Err(SourceError::Api(format!(
                "arXiv API returned status: {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to read response: {}", e)))?;

        Self::parse_feed(bytes.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PublicationYear;

    const TWO_ENTRY_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>arXiv Query: search_query=all:transformer</title>
  <id>http://arxiv.org/api/abc</id>
  <updated>2024-01-01T00:00:00-05:00</updated>
  <entry>
    <id>http://arxiv.org/abs/1706.03762v7</id>
    <updated>2023-08-02T00:41:18Z</updated>
    <published>2017-06-12T17:57:34Z</published>
    <title>Attention Is All
  You Need</title>
    <summary>  The dominant sequence transduction models
are based on complex recurrent networks.
</summary>
    <author><name>Ashish Vaswani</name></author>
    <author><name>Noam Shazeer</name></author>
    <link href="http://arxiv.org/abs/1706.03762v7" rel="alternate" type="text/html"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2301.12345v1</id>
    <updated>2023-01-15T10:00:00Z</updated>
    <published>2023-01-15T10:00:00Z</published>
    <title>Single Author Paper</title>
    <summary>Short.</summary>
    <author><name>Solo Researcher</name></author>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_feed() {
        let records = ArxivSource::parse_feed(TWO_ENTRY_FEED.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.identifier(), "http://arxiv.org/abs/1706.03762v7");
        assert_eq!(first.url(), "http://arxiv.org/abs/1706.03762v7");
        assert_eq!(first.title(), "Attention Is All You Need");
        assert_eq!(
            first.abstract_text(),
            Some("The dominant sequence transduction models are based on complex recurrent networks.")
        );
        assert_eq!(first.year(), PublicationYear::Known(2017));
        assert_eq!(
            first.author_names().collect::<Vec<_>>(),
            vec!["Ashish Vaswani", "Noam Shazeer"]
        );
        assert!(first.is_open_access());
        assert_eq!(first.citation_count(), None);
    }

    #[test]
    fn test_single_author_is_a_one_element_list() {
        let records = ArxivSource::parse_feed(TWO_ENTRY_FEED.as_bytes()).unwrap();
        let solo = &records[1];
        assert_eq!(solo.authors().len(), 1);
        assert_eq!(solo.authors()[0].name, "Solo Researcher");
    }

    #[test]
    fn test_single_entry_feed() {
        let feed = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>arXiv Query</title>
  <id>http://arxiv.org/api/one</id>
  <updated>2024-01-01T00:00:00Z</updated>
  <entry>
    <id>http://arxiv.org/abs/2101.00001v1</id>
    <updated>2021-01-01T00:00:00Z</updated>
    <published>2021-01-01T00:00:00Z</published>
    <title>Only Entry</title>
    <summary>Abstract.</summary>
    <author><name>A. Author</name></author>
  </entry>
</feed>"#;

        let records = ArxivSource::parse_feed(feed.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].year(), PublicationYear::Known(2021));
    }

    #[test]
    fn test_empty_feed_and_error_entry() {
        let feed = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>arXiv Query</title>
  <id>http://arxiv.org/api/err</id>
  <updated>2024-01-01T00:00:00Z</updated>
  <entry>
    <id>http://arxiv.org/api/errors#incorrect_id_format_for_1234</id>
    <title>Error</title>
    <summary>incorrect id format for 1234</summary>
    <updated>2024-01-01T00:00:00Z</updated>
    <author><name>arXiv api core</name></author>
  </entry>
</feed>"#;

        assert!(ArxivSource::parse_feed(feed.as_bytes()).unwrap().is_empty());
        assert!(ArxivSource::parse_feed(b"<html>not a feed</html>").is_err());
    }

    #[test]
    fn test_search_url() {
        let source = ArxivSource::new(HttpClient::new().unwrap())
            .with_base_url("http://localhost/api/query");
        let url = source.search_url(&SearchQuery::new("deep learning").max_results(10));
        assert_eq!(
            url,
            "http://localhost/api/query?search_query=all%3Adeep%20learning&start=0&max_results=10"
        );
    }
}
