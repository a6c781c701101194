//! Outline filtering predicates.
//!
//! Pure decision logic for the TOC projection: which blocks are suppressed,
//! how heading levels are classified, and whether a block has children worth
//! an expand/collapse affordance. Nothing in here holds state; the collapse
//! machinery in [`crate::toc`] calls these on every pass.

use crate::document::{Block, BlockId, Document};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;
use strum::{Display, EnumString};

/// Heading classification of a block, derived from its raw content.
///
/// A block is a heading exactly when its content starts with 1-6 `#`
/// characters immediately followed by a single space. Everything else,
/// including seven hashes or `#NoSpace`, classifies as not-a-heading
/// (`None` at the call sites).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
}

impl HeadingLevel {
    /// Build from a hash count (1-6). Out-of-range counts are not headings.
    pub fn from_rank(rank: usize) -> Option<Self> {
        match rank {
            1 => Some(Self::H1),
            2 => Some(Self::H2),
            3 => Some(Self::H3),
            4 => Some(Self::H4),
            5 => Some(Self::H5),
            6 => Some(Self::H6),
            _ => None,
        }
    }

    /// Numeric rank, 1 for `h1` through 6 for `h6`.
    pub fn rank(self) -> usize {
        match self {
            Self::H1 => 1,
            Self::H2 => 2,
            Self::H3 => 3,
            Self::H4 => 4,
            Self::H5 => 5,
            Self::H6 => 6,
        }
    }
}

/// Classify a block's raw content as a heading level.
///
/// # Examples
///
/// ```
/// use tocgen::filter::{classify_heading, HeadingLevel};
///
/// assert_eq!(classify_heading("# Title"), Some(HeadingLevel::H1));
/// assert_eq!(classify_heading("###### x"), Some(HeadingLevel::H6));
/// assert_eq!(classify_heading("####### x"), None);
/// assert_eq!(classify_heading("#NoSpace"), None);
/// ```
pub fn classify_heading(content: &str) -> Option<HeadingLevel> {
    let hashes = content.chars().take_while(|&c| c == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    if content[hashes..].starts_with(' ') {
        HeadingLevel::from_rank(hashes)
    } else {
        None
    }
}

fn macro_placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*\{\{").unwrap())
}

/// True when converted content is solely a macro/embed placeholder such as
/// `{{query ...}}` or `{{embed ...}}`.
pub fn is_macro_placeholder(converted: &str) -> bool {
    macro_placeholder_re().is_match(converted)
}

/// Decide whether a block is suppressed from the outline.
///
/// `converted` is the block's converted display content: `None` while the
/// conversion is pending (or has failed), which suppresses the block just
/// like empty content does. Suppression covers the whole subtree: callers
/// must not recurse into a suppressed block's children when emitting rows,
/// though the children stay in the document for later re-evaluation.
pub fn should_suppress(block: &Block, converted: Option<&str>, headings_only: bool) -> bool {
    if block.property("toc") == Some("no") {
        return true;
    }
    let Some(converted) = converted else {
        return true;
    };
    if converted.is_empty() || is_macro_placeholder(converted) {
        return true;
    }
    headings_only && classify_heading(block.content()).is_none()
}

/// Whether a block has children that can meaningfully expand.
///
/// `level` is the block's nesting depth relative to the traversal root.
/// Depth-limited: a block at or beyond the `levels` limit never expands.
/// In headings-only mode a child counts only if it is itself a heading;
/// otherwise any child not opted out via `toc:: no` counts. This is computed
/// structurally from the document, so a block proven to have zero renderable
/// children never shows an enabled expand control.
pub fn has_expandable_children(
    doc: &Document,
    id: BlockId,
    level: usize,
    levels: usize,
    headings_only: bool,
) -> bool {
    if level >= levels {
        return false;
    }
    doc.children(id).any(|child| {
        let Some(block) = doc.get(child) else {
            return false;
        };
        if headings_only {
            classify_heading(block.content()).is_some()
        } else {
            block.property("toc") != Some("no")
        }
    })
}
