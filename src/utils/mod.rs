//! Utility modules supporting search operations.
//!
//! - [`HttpClient`]: shared HTTP client with timeouts
//! - [`collapse_whitespace`]: text normalization used by every source
//! - [`ScriptFilter`], [`sort_by_popularity`], [`apply_view`]: client-side views over results
//! - [`format_citation`]: BibTeX and bibliography-style citation export
//! - [`deduplicate`]: opt-in cross-source deduplication
//! - [`render_table`], [`render_plain`]: terminal output
//!
//! # Filtering and sorting
//!
//! ```rust
//! use scholar_fanout::utils::{apply_view, ScriptFilter, ViewOptions};
//! use scholar_fanout::models::NormalizedRecord;
//!
//! # fn example(records: Vec<NormalizedRecord>) {
//! let options = ViewOptions {
//!     script: Some(ScriptFilter::japanese()),
//!     sort_by_popularity: true,
//! };
//! let view = apply_view(&records, &options);
//! # }
//! ```

mod cite;
mod dedup;
mod display;
mod filter;
mod http;
mod text;

pub use cite::{format_bibtex, format_citation, CitationStyle};
pub use dedup::{deduplicate, find_duplicates, DedupPolicy};
pub use display::{is_terminal, render_plain, render_table, terminal_width, truncate_with_ellipsis};
pub use filter::{apply_view, sort_by_popularity, ScriptFilter, ViewOptions, JAPANESE_RANGES};
pub use http::{HttpClient, DEFAULT_REQUEST_TIMEOUT};
pub use text::collapse_whitespace;
