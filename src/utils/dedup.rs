//! Opt-in deduplication of records across sources.
//!
//! The aggregator does not deduplicate by default: the same work returned by
//! two providers appears twice. Callers that want a single copy select
//! [`DedupPolicy::KeepFirst`].

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use strsim::jaro_winkler;

use crate::models::NormalizedRecord;

/// Minimum Jaro-Winkler similarity for two titles to be considered the same work
const TITLE_SIMILARITY_THRESHOLD: f64 = 0.95;

/// Policy for handling the same work returned by several sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DedupPolicy {
    /// Keep every record
    #[default]
    Off,
    /// Keep the earliest occurrence of each work, drop later ones
    KeepFirst,
}

/// Find duplicate records based on identifier, title similarity and author overlap
///
/// Returns groups of record indices that are duplicates of each other, in
/// ascending index order.
pub fn find_duplicates(records: &[NormalizedRecord]) -> Vec<Vec<usize>> {
    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut processed: HashSet<usize> = HashSet::new();

    for i in 0..records.len() {
        if processed.contains(&i) {
            continue;
        }

        let mut group = vec![i];
        for (j, other) in records.iter().enumerate().skip(i + 1) {
            if !processed.contains(&j) && are_duplicates(&records[i], other) {
                group.push(j);
                processed.insert(j);
            }
        }

        if group.len() > 1 {
            groups.push(group);
        }
        processed.insert(i);
    }

    groups
}

/// Remove duplicates according to the policy, preserving the order of survivors
pub fn deduplicate(records: Vec<NormalizedRecord>, policy: DedupPolicy) -> Vec<NormalizedRecord> {
    if policy == DedupPolicy::Off {
        return records;
    }

    let to_remove: HashSet<usize> = find_duplicates(&records)
        .into_iter()
        .flat_map(|group| group.into_iter().skip(1))
        .collect();

    if to_remove.is_empty() {
        return records;
    }

    records
        .into_iter()
        .enumerate()
        .filter(|(i, _)| !to_remove.contains(i))
        .map(|(_, r)| r)
        .collect()
}

/// Check if two records are likely the same work
fn are_duplicates(a: &NormalizedRecord, b: &NormalizedRecord) -> bool {
    // A single source never returns the same work twice
    if a.source() == b.source() {
        return false;
    }

    if let (Some(doi_a), Some(doi_b)) = (extract_doi(a), extract_doi(b)) {
        return doi_a == doi_b;
    }

    if a.year().value().is_some() && b.year().value().is_some() && a.year() != b.year() {
        return false;
    }

    let title_a = normalize_title(a.title());
    let title_b = normalize_title(b.title());

    (title_a == title_b || jaro_winkler(&title_a, &title_b) >= TITLE_SIMILARITY_THRESHOLD)
        && authors_match(a, b)
}

/// Pull a lowercase DOI out of the identifier or URL, if either carries one
fn extract_doi(record: &NormalizedRecord) -> Option<String> {
    [record.identifier(), record.url()]
        .into_iter()
        .find_map(|s| s.find("10.").map(|pos| s[pos..].to_lowercase()))
        .filter(|doi| doi.contains('/'))
}

/// Check if at least one author name is shared (case-insensitive)
fn authors_match(a: &NormalizedRecord, b: &NormalizedRecord) -> bool {
    let authors_a: HashSet<String> = a.author_names().map(|s| s.to_lowercase()).collect();
    let authors_b: HashSet<String> = b.author_names().map(|s| s.to_lowercase()).collect();

    // If one has no authors, title agreement alone decides
    if authors_a.is_empty() || authors_b.is_empty() {
        return true;
    }

    authors_a.intersection(&authors_b).next().is_some()
}

/// Normalize a title for comparison
fn normalize_title(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
