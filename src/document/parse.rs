//! Parser for indented-bullet outline text.
//!
//! The accepted format mirrors outliner markup: one block per `- ` bullet
//! line, nesting by indentation, and `name:: value` continuation lines that
//! attach properties to the preceding block:
//!
//! ```text
//! - # Section A
//!   toc:: no
//!   - child block
//! - plain text
//! ```
//!
//! Any other continuation line is folded into the preceding block's content.

use super::{Block, BlockId, Document};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

fn property_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([A-Za-z][A-Za-z0-9_-]*)::\s*(.*)$").unwrap())
}

/// Parse an outline file into a [`Document`].
///
/// The page name is taken from the file stem.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn parse_file(path: &Path) -> std::io::Result<Document> {
    let text = std::fs::read_to_string(path)?;
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("untitled");
    Ok(parse_outline(&text, name))
}

/// Parse outline text into a [`Document`] for a named page.
pub fn parse_outline(text: &str, page_name: &str) -> Document {
    let mut doc = Document::new(page_name);
    // Stack of (indent, id) for the open ancestor chain.
    let mut stack: Vec<(usize, BlockId)> = Vec::new();
    let mut last: Option<BlockId> = None;

    for line in text.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            continue;
        }

        let indent = indent_width(line);
        let rest = line.trim_start();

        if let Some(content) = bullet_content(rest) {
            while stack.last().is_some_and(|&(i, _)| i >= indent) {
                stack.pop();
            }
            let parent = stack.last().map_or(doc.root(), |&(_, id)| id);
            let id = doc.append(parent, Block::new(content));
            stack.push((indent, id));
            last = Some(id);
        } else if let Some(id) = last {
            // Continuation of the previous block: property or more content.
            if let Some(caps) = property_re().captures(rest) {
                doc.set_property(id, &caps[1], &caps[2]);
            } else if let Some(block) = doc.get(id) {
                let content = format!("{}\n{}", block.content(), rest);
                doc.set_content(id, content);
            }
        }
    }

    doc
}

fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

fn bullet_content(rest: &str) -> Option<&str> {
    if let Some(content) = rest.strip_prefix("- ") {
        Some(content)
    } else if rest == "-" {
        Some("")
    } else {
        None
    }
}
