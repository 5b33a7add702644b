//! Terminal display utilities for CLI output formatting.

use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use std::io::{self, IsTerminal};
use terminal_size::terminal_size;
use unicode_width::UnicodeWidthChar;

use crate::models::NormalizedRecord;

/// Default width when terminal size cannot be determined.
pub const DEFAULT_WIDTH: usize = 100;

/// Get the current terminal width in characters.
pub fn terminal_width() -> usize {
    terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(DEFAULT_WIDTH)
}

/// Check if stdout is a terminal.
pub fn is_terminal() -> bool {
    io::stdout().is_terminal()
}

/// Truncate text to fit within the specified display width.
///
/// Wide characters (CJK, full-width forms) count as two columns. An ellipsis
/// is appended if truncation occurred.
///
/// ```
/// use scholar_fanout::utils::truncate_with_ellipsis;
///
/// assert_eq!(truncate_with_ellipsis("Hello World", 8), "Hello...");
/// assert_eq!(truncate_with_ellipsis("Hi", 8), "Hi");
/// ```
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }

    let char_widths: Vec<(char, usize)> = text
        .chars()
        .map(|c| (c, UnicodeWidthChar::width(c).unwrap_or(1)))
        .collect();

    let total_width: usize = char_widths.iter().map(|(_, w)| *w).sum();
    if total_width <= max_width {
        return text.to_string();
    }

    let budget = max_width.saturating_sub(3);
    let mut current_width = 0;
    let mut truncated = String::new();
    for (c, w) in char_widths {
        if current_width + w > budget {
            break;
        }
        current_width += w;
        truncated.push(c);
    }

    format!("{}...", truncated)
}

/// Render records as a table sized to the given width
pub fn render_table(records: &[NormalizedRecord], width: usize) -> String {
    // # | Source | Year | Cites | Title | Authors
    let fixed = 4 + 18 + 6 + 7;
    let flexible = width.saturating_sub(fixed + 14).max(30);
    let title_width = flexible * 3 / 5;
    let author_width = flexible - title_width;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(width as u16)
        .set_header(vec!["#", "Source", "Year", "Cites", "Title", "Authors"]);

    for (i, record) in records.iter().enumerate() {
        let authors = record.author_names().collect::<Vec<_>>().join(", ");
        let cites = record
            .citation_count()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());

        table.add_row(vec![
            (i + 1).to_string(),
            record.source().name().to_string(),
            record.year().to_string(),
            cites,
            truncate_with_ellipsis(record.title(), title_width),
            truncate_with_ellipsis(&authors, author_width),
        ]);
    }

    table.to_string()
}

/// Render records as plain text, one block per record
pub fn render_plain(records: &[NormalizedRecord]) -> String {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let authors = r.author_names().collect::<Vec<_>>().join(", ");
            let access = if r.is_open_access() { " [open access]" } else { "" };
            format!(
                "{}. {} ({})\n   {} | {}{}\n   {}",
                i + 1,
                r.title(),
                r.year(),
                r.source().name(),
                authors,
                access,
                r.url()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
