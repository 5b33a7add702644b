//! # Scholar Fanout
//!
//! Federated search over academic literature providers. One free-text
//! query is sent concurrently to Semantic Scholar, arXiv and OpenAlex; each
//! answer is normalized into a common record shape and the lists are merged
//! round-robin so every provider is represented near the top.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (NormalizedRecord, SearchQuery, etc.)
//! - [`sources`]: Provider adapters behind the [`Source`] trait
//! - [`aggregator`]: Concurrent fan-out and round-robin merge
//! - [`utils`]: HTTP client, filters, citation export, deduplication and display
//! - [`config`]: Configuration management
//!
//! ## Example
//!
//! ```rust,no_run
//! use scholar_fanout::{config::Config, Aggregator};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let aggregator = Aggregator::from_config(&Config::default())?;
//! for record in aggregator.search("graph neural networks").await? {
//!     println!("[{}] {} ({})", record.source(), record.title(), record.year());
//! }
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod config;
pub mod models;
pub mod sources;
pub mod utils;

// Re-export commonly used types
pub use aggregator::{interleave, AggregateResponse, Aggregator, SourceReport};
pub use models::{NormalizedRecord, PublicationYear, SearchQuery, SourceKind};
pub use sources::{Source, SourceError};
