//! Presentation-side filters applied to merged search results.
//!
//! These never touch the network and never mutate records; they only select
//! and reorder what the aggregator returned.

use regex::Regex;
use std::cmp::Reverse;
use std::ops::RangeInclusive;

use crate::models::NormalizedRecord;

/// Unicode ranges covering Japanese punctuation, kana, full-width forms and CJK ideographs
pub const JAPANESE_RANGES: [RangeInclusive<char>; 5] = [
    '\u{3000}'..='\u{303F}',
    '\u{3040}'..='\u{309F}',
    '\u{30A0}'..='\u{30FF}',
    '\u{FF00}'..='\u{FFEF}',
    '\u{4E00}'..='\u{9FAF}',
];

/// Keeps records whose title or abstract contains a character from a set of script ranges
#[derive(Debug, Clone)]
pub struct ScriptFilter {
    pattern: Regex,
}

impl ScriptFilter {
    /// Build a filter from inclusive character ranges
    pub fn from_ranges(ranges: &[RangeInclusive<char>]) -> Result<Self, regex::Error> {
        let class: String = ranges
            .iter()
            .map(|r| format!("\\x{{{:X}}}-\\x{{{:X}}}", *r.start() as u32, *r.end() as u32))
            .collect();
        let pattern = Regex::new(&format!("[{}]", class))?;
        Ok(Self { pattern })
    }

    /// Filter matching Japanese text
    pub fn japanese() -> Self {
        Self::from_ranges(&JAPANESE_RANGES).expect("Japanese script ranges form a valid class")
    }

    /// Whether the text contains at least one character in range
    pub fn matches_text(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// Whether the record's title or abstract contains a character in range
    pub fn matches(&self, record: &NormalizedRecord) -> bool {
        self.matches_text(record.title())
            || record
                .abstract_text()
                .map(|a| self.matches_text(a))
                .unwrap_or(false)
    }
}

/// Stable sort by descending citation count; records without a count rank as zero
pub fn sort_by_popularity(records: &mut [NormalizedRecord]) {
    records.sort_by_key(|r| Reverse(r.citation_count().unwrap_or(0)));
}

/// Client-selected view over a result list
#[derive(Debug, Clone, Default)]
pub struct ViewOptions {
    /// Keep only records matching this script filter
    pub script: Option<ScriptFilter>,

    /// Reorder by citation count
    pub sort_by_popularity: bool,
}

/// Apply the script filter, then the popularity sort
pub fn apply_view(records: &[NormalizedRecord], options: &ViewOptions) -> Vec<NormalizedRecord> {
    let mut view: Vec<NormalizedRecord> = match &options.script {
        Some(filter) => records.iter().filter(|r| filter.matches(r)).cloned().collect(),
        None => records.to_vec(),
    };

    if options.sort_by_popularity {
        sort_by_popularity(&mut view);
    }

    view
}
