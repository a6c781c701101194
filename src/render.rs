//! Text and JSON rendering of the row tree.
//!
//! Three CLI-facing views over [`TocRow`]s: a box-drawing tree, a flat
//! indented list, and pretty JSON. Only visible rows (no collapsed ancestor)
//! are printed; the JSON view serializes the full tree including hidden
//! rows.

use crate::toc::{TocRow, flatten_visible};
use termimad::MadSkin;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Render visible rows as a box-drawing tree.
///
/// Expandable rows carry a `▾`/`▸` marker for their collapse state;
/// highlighted rows are starred. `width` of 0 disables label truncation.
pub fn render_tree(rows: &[TocRow], width: usize) -> String {
    let mut out = String::new();
    tree_lines(rows, "", None, width, &mut out);
    out
}

/// Like [`render_tree`], with inline markup styled through a termimad skin.
pub fn render_tree_styled(rows: &[TocRow], skin: &MadSkin, width: usize) -> String {
    let mut out = String::new();
    tree_lines(rows, "", Some(skin), width, &mut out);
    out
}

/// Render visible rows as a flat indented list, with explicit control
/// markers: collapse state for expandable rows and a `(page)` suffix where
/// the page-jump control is present.
pub fn render_plain(rows: &[TocRow], width: usize) -> String {
    let mut out = String::new();
    for row in flatten_visible(rows) {
        let indent = "  ".repeat(row.depth);
        let arrow = arrow_marker(row);
        let label = truncate_label(&row.label, width);
        let page = if row.page_jump { " (page)" } else { "" };
        out.push_str(&format!("{indent}- {arrow}{label}{page}\n"));
    }
    out
}

/// Serialize the full row tree, hidden rows included, as pretty JSON.
pub fn to_json(rows: &[TocRow]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(rows)
}

/// Truncate a label to a terminal cell width, appending an ellipsis.
pub fn truncate_label(label: &str, max_width: usize) -> String {
    if max_width == 0 || label.width() <= max_width {
        return label.to_string();
    }
    let budget = max_width.saturating_sub(1);
    let mut out = String::new();
    let mut used = 0;
    for ch in label.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

fn arrow_marker(row: &TocRow) -> &'static str {
    if !row.expandable {
        ""
    } else if row.collapsed {
        "▸ "
    } else {
        "▾ "
    }
}

fn tree_lines(rows: &[TocRow], prefix: &str, skin: Option<&MadSkin>, width: usize, out: &mut String) {
    let visible: Vec<&TocRow> = rows.iter().filter(|r| !r.hidden).collect();
    let count = visible.len();
    for (i, row) in visible.iter().enumerate() {
        let last = i + 1 == count;
        let connector = if last { "└── " } else { "├── " };
        let star = if row.highlighted { "* " } else { "" };
        let label = truncate_label(&row.label, width);
        let label = match skin {
            Some(skin) => skin.inline(&label).to_string(),
            None => label,
        };
        out.push_str(prefix);
        out.push_str(connector);
        out.push_str(arrow_marker(row));
        out.push_str(star);
        out.push_str(&label);
        out.push('\n');

        let child_prefix = format!("{prefix}{}", if last { "    " } else { "│   " });
        tree_lines(&row.children, &child_prefix, skin, width, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutlineSettings;
    use crate::document::parse_outline;
    use crate::host::MarkdownConverter;
    use crate::toc::TocView;
    use std::collections::HashSet;

    fn rows_for(text: &str, levels: usize) -> Vec<TocRow> {
        let doc = parse_outline(text, "page");
        let settings = OutlineSettings {
            default_expansion_level: 9,
            levels,
            ..OutlineSettings::default()
        };
        let mut view = TocView::new(&doc, settings);
        view.render(&doc, &mut MarkdownConverter::new(), &HashSet::new())
    }

    #[test]
    fn test_tree_output_shape() {
        let rendered = render_tree(&rows_for("- # A\n  - a1\n  - a2\n- # B", 6), 0);
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("├── ▾ A"));
        assert!(lines[1].starts_with("│   ├── a1"));
        assert!(lines[2].starts_with("│   └── a2"));
        assert!(lines[3].starts_with("└── "));
        assert!(lines[3].contains('B'));
    }

    #[test]
    fn test_tree_skips_hidden_rows() {
        let doc = parse_outline("- # A\n  - a1", "page");
        let settings = OutlineSettings {
            default_expansion_level: 1, // everything starts collapsed
            levels: 6,
            ..OutlineSettings::default()
        };
        let mut view = TocView::new(&doc, settings);
        let rows = view.render(&doc, &mut MarkdownConverter::new(), &HashSet::new());
        let rendered = render_tree(&rows, 0);
        assert!(rendered.contains("▸ A"));
        assert!(!rendered.contains("a1"));
    }

    #[test]
    fn test_plain_output_and_page_markers() {
        let rendered = render_plain(&rows_for("- # A\n  - a1", 6), 0);
        assert_eq!(rendered, "- ▾ A (page)\n  - a1 (page)\n");
    }

    #[test]
    fn test_json_output_includes_flags() {
        let json = to_json(&rows_for("- # A\n  - a1", 6)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let row = &value[0];
        assert_eq!(row["label"], "A");
        assert_eq!(row["heading"], "h1");
        assert_eq!(row["collapsed"], false);
        assert_eq!(row["pageJump"], true);
        assert_eq!(row["children"][0]["label"], "a1");
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("short", 10), "short");
        assert_eq!(truncate_label("a longer label", 8), "a longe…");
        assert_eq!(truncate_label("anything", 0), "anything");
    }

    #[test]
    fn test_truncate_label_wide_chars() {
        // Each CJK glyph is two cells wide.
        assert_eq!(truncate_label("日本語テキスト", 7), "日本語…");
    }
}
