//! External collaborator interfaces.
//!
//! The TOC engine never talks to an editor or a markup renderer directly; it
//! goes through the two narrow traits here. [`DocumentHost`] covers page
//! lookup and navigation commands, [`ContentConverter`] covers raw-text to
//! display-markup conversion. Both are driven from a single thread; a
//! converter that cannot answer immediately returns [`Conversion::Pending`]
//! and delivers the result later through
//! [`TocView::complete_conversion`](crate::toc::TocView::complete_conversion).

use crate::document::{Page, PageId};
use crate::filter::classify_heading;
use regex::Regex;
use std::sync::OnceLock;

/// Host editor surface: page resolution and navigation commands.
///
/// Lookup failure is not an error; the engine degrades to "no navigation
/// occurs" per the error model.
pub trait DocumentHost {
    /// Resolve a page by id. `None` when the page cannot be found.
    fn get_page(&mut self, id: PageId) -> Option<Page>;

    /// Scroll the primary view to a block, optionally within a named page.
    fn scroll_to_node(&mut self, page_name: Option<&str>, uuid: &str);

    /// Open a page or block in the secondary view.
    fn open_in_secondary_view(&mut self, uuid: &str);
}

/// Outcome of a conversion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversion {
    /// Converted display markup, available immediately.
    Ready(String),
    /// Conversion is in flight; the result arrives via
    /// `TocView::complete_conversion` keyed by the block uuid.
    Pending,
    /// Conversion failed. Treated like empty content: the block is not shown.
    Failed,
}

/// Converts raw block text into sanitized inline display markup.
///
/// Conversions are per-block and independent: one slow block must not hold
/// up any sibling or ancestor. The converter owns sanitization; whatever it
/// returns is embedded as trusted markup.
pub trait ContentConverter {
    fn convert(&mut self, uuid: &str, raw: &str) -> Conversion;
}

fn property_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*::\s").unwrap())
}

/// Synchronous reference converter for plain outline text.
///
/// Drops property lines, strips the heading marker, and folds the remaining
/// lines into one inline string. Inline emphasis markup is left intact for
/// the terminal renderer to style. Macro placeholders pass through unchanged
/// so the filter can suppress them.
#[derive(Debug, Default)]
pub struct MarkdownConverter;

impl MarkdownConverter {
    pub fn new() -> Self {
        Self
    }
}

impl ContentConverter for MarkdownConverter {
    fn convert(&mut self, _uuid: &str, raw: &str) -> Conversion {
        Conversion::Ready(convert_inline(raw))
    }
}

/// Shared conversion logic behind [`MarkdownConverter`].
pub fn convert_inline(raw: &str) -> String {
    let mut first_kept = true;
    let mut out = String::new();
    for line in raw.lines() {
        // Keep the trailing side intact until after heading classification:
        // "# " is a heading marker with no text, not a literal "#".
        let line = line.trim_start();
        if line.trim_end().is_empty() || property_line_re().is_match(line) {
            continue;
        }
        let line = if first_kept {
            match classify_heading(line) {
                Some(level) => line[level.rank() + 1..].trim(),
                None => line.trim_end(),
            }
        } else {
            line.trim_end()
        };
        first_kept = false;
        if line.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(line);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_strips_heading_marker() {
        assert_eq!(convert_inline("# Title"), "Title");
        assert_eq!(convert_inline("### Deep **bold**"), "Deep **bold**");
    }

    #[test]
    fn test_convert_keeps_plain_text() {
        assert_eq!(convert_inline("just a block"), "just a block");
    }

    #[test]
    fn test_convert_drops_property_lines() {
        assert_eq!(convert_inline("text\ntoc:: no\ncollapsed:: true"), "text");
    }

    #[test]
    fn test_convert_folds_continuation_lines() {
        assert_eq!(convert_inline("# Title\nmore text"), "Title more text");
    }

    #[test]
    fn test_convert_empty_and_marker_only() {
        assert_eq!(convert_inline(""), "");
        assert_eq!(convert_inline("# "), "");
        assert_eq!(convert_inline("toc:: no"), "");
    }

    #[test]
    fn test_convert_passes_macro_through() {
        assert_eq!(convert_inline("{{query (todo)}}"), "{{query (todo)}}");
    }

    #[test]
    fn test_seven_hashes_not_treated_as_heading() {
        assert_eq!(convert_inline("####### x"), "####### x");
    }

    #[test]
    fn test_markdown_converter_is_synchronous() {
        let mut conv = MarkdownConverter::new();
        assert_eq!(
            conv.convert("u-1", "## Section"),
            Conversion::Ready("Section".into())
        );
    }
}
