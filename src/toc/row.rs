//! Rendered row tree emitted by [`TocView::render`](super::TocView::render).

use crate::document::BlockId;
use crate::filter::HeadingLevel;
use serde::Serialize;

/// One rendered outline entry.
///
/// Rows under a collapsed ancestor are still present, flagged `hidden`, so
/// expanding needs no re-fetch or re-conversion; consumers showing output to
/// a user should walk [`flatten_visible`] instead of the raw tree.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TocRow {
    #[serde(skip)]
    pub id: BlockId,
    pub uuid: String,
    /// Converted display markup, trusted as sanitized by the converter.
    pub label: String,
    /// Heading classification of the raw content, for styling only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<HeadingLevel>,
    /// Count of emitted ancestors (top-level rows are 0).
    pub depth: usize,
    /// Current collapse flag, owned by the parent's collapse map.
    pub collapsed: bool,
    /// Whether the expand/collapse control is meaningful for this row.
    pub expandable: bool,
    /// True when some ancestor is collapsed.
    pub hidden: bool,
    pub highlighted: bool,
    /// Whether the "go to page" control is shown.
    pub page_jump: bool,
    pub children: Vec<TocRow>,
}

/// Depth-first flatten of the rows a user actually sees.
pub fn flatten_visible(rows: &[TocRow]) -> Vec<&TocRow> {
    let mut out = Vec::new();
    fn walk<'a>(rows: &'a [TocRow], out: &mut Vec<&'a TocRow>) {
        for row in rows {
            if row.hidden {
                continue;
            }
            out.push(row);
            walk(&row.children, out);
        }
    }
    walk(rows, &mut out);
    out
}
