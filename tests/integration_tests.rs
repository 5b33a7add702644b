//! Integration tests for Scholar Fanout
//!
//! Each provider is served by a local mockito server so the adapters and
//! the aggregator run against real HTTP without touching the network.

use mockito::{Matcher, Server, ServerGuard};
use scholar_fanout::models::{PublicationYear, SourceKind};
use scholar_fanout::sources::{ArxivSource, OpenAlexSource, SemanticScholarSource, Source};
use scholar_fanout::utils::{apply_view, format_bibtex, HttpClient, ScriptFilter, ViewOptions};
use scholar_fanout::{Aggregator, SourceError};
use std::sync::Arc;
use std::time::Duration;

const S2_BODY: &str = r#"{
    "total": 2,
    "data": [
        {
            "paperId": "s2-a",
            "title": "Graph Attention Networks",
            "authors": [{"name": "Petar Velickovic"}, {"name": "Guillem Cucurull"}],
            "year": 2018,
            "abstract": "We present graph attention networks.",
            "tldr": null,
            "url": "https://www.semanticscholar.org/paper/s2-a",
            "citationCount": 9000,
            "isOpenAccess": true
        },
        {
            "paperId": "s2-b",
            "title": "グラフニューラルネットワーク入門",
            "authors": {"name": "山田 太郎"},
            "year": 2021,
            "citationCount": 3,
            "isOpenAccess": false
        }
    ]
}"#;

const ARXIV_BODY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>arXiv Query: search_query=all:graph</title>
  <id>http://arxiv.org/api/q</id>
  <updated>2024-01-01T00:00:00Z</updated>
  <entry>
    <id>http://arxiv.org/abs/1710.10903v3</id>
    <updated>2018-02-04T00:00:00Z</updated>
    <published>2017-10-30T00:00:00Z</published>
    <title>Graph Attention Networks</title>
    <summary>We present graph attention networks (GATs).</summary>
    <author><name>Petar Velickovic</name></author>
  </entry>
</feed>"#;

const OPENALEX_BODY: &str = r#"{
    "meta": {"count": 3},
    "results": [
        {
            "id": "https://openalex.org/W1",
            "doi": "https://doi.org/10.1000/w1",
            "title": "Semi-Supervised Classification with Graph Convolutional Networks",
            "publication_year": 2016,
            "authorships": [{"author": {"display_name": "Thomas Kipf"}}],
            "abstract_inverted_index": {"We": [0], "present": [1]},
            "cited_by_count": 20000,
            "open_access": {"is_oa": true}
        },
        {
            "id": "https://openalex.org/W2",
            "title": "Second Work",
            "publication_year": 2020,
            "authorships": [],
            "cited_by_count": 10,
            "primary_location": {"landing_page_url": "https://example.org/w2"}
        },
        {
            "id": "https://openalex.org/W3",
            "title": "Third Work",
            "publication_year": 2019,
            "cited_by_count": null
        }
    ]
}"#;

fn client() -> HttpClient {
    HttpClient::with_timeout(Duration::from_secs(5)).unwrap()
}

async fn mock_json(
    server: &mut ServerGuard,
    path: &str,
    status: usize,
    body: &str,
) -> mockito::Mock {
    server
        .mock("GET", Matcher::Regex(format!("^{}", path)))
        .match_query(Matcher::Any)
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

async fn mock_atom(server: &mut ServerGuard, path: &str, body: &str) -> mockito::Mock {
    server
        .mock("GET", Matcher::Regex(format!("^{}", path)))
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/atom+xml")
        .with_body(body)
        .create_async()
        .await
}

fn aggregator_for(server: &ServerGuard) -> Aggregator {
    let client = client();
    let root = server.url();
    let semantic =
        SemanticScholarSource::new(client.clone()).with_base_url(format!("{}/s2", root));
    let arxiv =
        ArxivSource::new(client.clone()).with_base_url(format!("{}/arxiv/api/query", root));
    let openalex = OpenAlexSource::new(client).with_base_url(format!("{}/oa", root));
    let sources: Vec<Arc<dyn Source>> =
        vec![Arc::new(semantic), Arc::new(arxiv), Arc::new(openalex)];
    Aggregator::new(sources)
}

#[tokio::test]
async fn test_semantic_scholar_request_and_parse() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/paper/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("query".into(), "graph attention".into()),
            Matcher::UrlEncoded("limit".into(), "10".into()),
        ]))
        .match_header("x-api-key", "secret")
        .with_status(200)
        .with_body(S2_BODY)
        .create_async()
        .await;

    let source = SemanticScholarSource::new(client())
        .with_base_url(server.url())
        .with_api_key(Some("secret".to_string()));
    let records = source.fetch_records("graph attention", 10).await;

    mock.assert_async().await;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].citation_count(), Some(9000));
    assert_eq!(records[1].authors().len(), 1);
    assert_eq!(records[1].year(), PublicationYear::Known(2021));
}

#[tokio::test]
async fn test_arxiv_request_and_parse() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/query")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("search_query".into(), "all:graph attention".into()),
            Matcher::UrlEncoded("start".into(), "0".into()),
            Matcher::UrlEncoded("max_results".into(), "7".into()),
        ]))
        .with_status(200)
        .with_body(ARXIV_BODY)
        .create_async()
        .await;

    let source = ArxivSource::new(client()).with_base_url(format!("{}/api/query", server.url()));
    let records = source.fetch_records("graph attention", 7).await;

    mock.assert_async().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].source(), SourceKind::Arxiv);
    assert_eq!(records[0].url(), "http://arxiv.org/abs/1710.10903v3");
    assert_eq!(records[0].year(), PublicationYear::Known(2017));
    assert!(records[0].is_open_access());
}

#[tokio::test]
async fn test_openalex_request_and_parse() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/works")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("search".into(), "graphs".into()),
            Matcher::UrlEncoded("per_page".into(), "10".into()),
        ]))
        .with_status(200)
        .with_body(OPENALEX_BODY)
        .create_async()
        .await;

    let source = OpenAlexSource::new(client()).with_base_url(server.url());
    let records = source.fetch_records("graphs", 10).await;

    mock.assert_async().await;
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].url(), "https://doi.org/10.1000/w1");
    assert_eq!(records[0].abstract_text(), Some("We present"));
    assert_eq!(records[1].url(), "https://example.org/w2");
    assert_eq!(records[2].url(), "https://openalex.org/W3");
}

#[tokio::test]
async fn test_http_error_is_reported_by_search_and_swallowed_by_fetch() {
    let mut server = Server::new_async().await;
    let _mock = mock_json(&mut server, "/works", 500, r#"{"error": "boom"}"#).await;

    let source = OpenAlexSource::new(client()).with_base_url(server.url());
    let query = scholar_fanout::SearchQuery::new("graphs");

    assert!(matches!(source.search(&query).await, Err(SourceError::Api(_))));
    assert!(source.fetch_records("graphs", 10).await.is_empty());
}

#[tokio::test]
async fn test_aggregator_interleaves_sources() {
    let mut server = Server::new_async().await;
    let _s2 = mock_json(&mut server, "/s2/paper/search", 200, S2_BODY).await;
    let _arxiv = mock_atom(&mut server, "/arxiv/api/query", ARXIV_BODY).await;
    let _oa = mock_json(&mut server, "/oa/works", 200, OPENALEX_BODY).await;

    let records = aggregator_for(&server).search("graph").await.unwrap();

    let order: Vec<(SourceKind, &str)> =
        records.iter().map(|r| (r.source(), r.identifier())).collect();
    assert_eq!(
        order,
        vec![
            (SourceKind::SemanticScholar, "s2-a"),
            (SourceKind::Arxiv, "http://arxiv.org/abs/1710.10903v3"),
            (SourceKind::OpenAlex, "https://openalex.org/W1"),
            (SourceKind::SemanticScholar, "s2-b"),
            (SourceKind::OpenAlex, "https://openalex.org/W2"),
            (SourceKind::OpenAlex, "https://openalex.org/W3"),
        ]
    );
}

#[tokio::test]
async fn test_aggregator_survives_failing_source() {
    let mut server = Server::new_async().await;
    let _s2 = mock_json(&mut server, "/s2/paper/search", 500, "{}").await;
    let _arxiv = mock_atom(&mut server, "/arxiv/api/query", ARXIV_BODY).await;
    let _oa = mock_json(&mut server, "/oa/works", 200, "not json").await;

    let response = aggregator_for(&server).search_detailed("graph").await.unwrap();

    assert_eq!(response.records.len(), 1);
    assert_eq!(response.records[0].source(), SourceKind::Arxiv);
    let failed: Vec<SourceKind> = response
        .reports
        .iter()
        .filter(|r| !r.succeeded())
        .map(|r| r.source)
        .collect();
    assert_eq!(failed, vec![SourceKind::SemanticScholar, SourceKind::OpenAlex]);
}

#[tokio::test]
async fn test_views_and_export_over_merged_results() {
    let mut server = Server::new_async().await;
    let _s2 = mock_json(&mut server, "/s2/paper/search", 200, S2_BODY).await;
    let _arxiv = mock_atom(&mut server, "/arxiv/api/query", ARXIV_BODY).await;
    let _oa = mock_json(&mut server, "/oa/works", 200, OPENALEX_BODY).await;

    let records = aggregator_for(&server).search("graph").await.unwrap();

    let popular = apply_view(
        &records,
        &ViewOptions {
            script: None,
            sort_by_popularity: true,
        },
    );
    assert_eq!(popular[0].identifier(), "https://openalex.org/W1");
    assert_eq!(popular[1].identifier(), "s2-a");
    assert_eq!(popular.len(), records.len());

    let japanese = apply_view(
        &records,
        &ViewOptions {
            script: Some(ScriptFilter::japanese()),
            sort_by_popularity: false,
        },
    );
    assert_eq!(japanese.len(), 1);
    assert_eq!(japanese[0].identifier(), "s2-b");

    let bibtex = format_bibtex(&records[1]);
    assert!(bibtex.starts_with("@article{arxiv_2017,"));
    assert!(bibtex.contains("author = {Petar Velickovic}"));
}

#[tokio::test]
async fn test_blank_query_makes_no_requests() {
    let mut server = Server::new_async().await;
    let s2 = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let result = aggregator_for(&server).search("  ").await;

    assert!(matches!(result, Err(SourceError::InvalidRequest(_))));
    s2.assert_async().await;
}

#[test]
fn test_records_serialize_with_stable_field_names() {
    let record = scholar_fanout::models::RecordBuilder::new(
        "W1",
        "Title",
        "https://example.org",
        SourceKind::OpenAlex,
    )
    .authors(["Ada Lovelace"])
    .citation_count(Some(4))
    .build()
    .unwrap();

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["source"], "openalex");
    assert_eq!(json["citationCount"], 4);
    assert_eq!(json["isOpenAccess"], false);
    assert!(json["year"].is_null());
    assert!(json["abstract"].is_null());
}

#[tokio::test]
async fn test_null_author_containers_do_not_drop_records() {
    let mut server = Server::new_async().await;
    let _s2 = mock_json(
        &mut server,
        "/s2/paper/search",
        200,
        r#"{"data": [{"paperId": "p1", "title": "Anonymous", "authors": null}]}"#,
    )
    .await;
    let _arxiv = mock_atom(&mut server, "/arxiv/api/query", ARXIV_BODY).await;
    let _oa = mock_json(
        &mut server,
        "/oa/works",
        200,
        r#"{"results": [{"id": "W9", "title": "Orphan", "authorships": [null]}]}"#,
    )
    .await;

    let records = aggregator_for(&server).search("graph").await.unwrap();

    let ids: Vec<&str> = records.iter().map(|r| r.identifier()).collect();
    assert_eq!(ids, vec!["p1", "http://arxiv.org/abs/1710.10903v3", "W9"]);
    assert!(records[0].authors().is_empty());
    assert!(records[2].authors().is_empty());
}
