//! # tocgen
//!
//! A collapsible table-of-contents engine for outline documents.
//!
//! This library projects a tree of outline blocks (nested bullets with
//! optional heading markers and `key:: value` properties) into a navigable
//! TOC, and keeps independent per-node expand/collapse state in sync while
//! the underlying tree is edited live. It powers the `tocgen` CLI and is
//! designed to sit behind any host editor that can expose a block tree.
//!
//! ## Features
//!
//! - Depth-limited, heading-aware outline filtering (`toc:: no` opt-out,
//!   macro-block suppression, headings-only mode)
//! - Per-parent collapse maps that survive edits and hide/show round-trips
//! - Aggregate collapse-all/expand-all over any block's children
//! - Asynchronous content conversion that never blocks sibling rendering
//! - Navigation with memoized page resolution
//!
//! ## Example
//!
//! ```rust
//! use std::collections::HashSet;
//! use tocgen::{MarkdownConverter, OutlineSettings, TocView, parse_outline};
//!
//! let doc = parse_outline("- # Intro\n  - some detail\n- # Usage", "guide");
//! let settings = OutlineSettings {
//!     levels: 2,
//!     default_expansion_level: 2,
//!     ..OutlineSettings::default()
//! };
//!
//! let mut view = TocView::new(&doc, settings);
//! let rows = view.render(&doc, &mut MarkdownConverter::new(), &HashSet::new());
//! assert_eq!(rows.len(), 2);
//! print!("{}", tocgen::render::render_tree(&rows, 0));
//! ```

/// Configuration module for persisting user preferences.
///
/// Provides the outline settings surface (expansion level, depth limit,
/// headings-only mode) and output preferences, loaded from a TOML file.
pub mod config;

/// Outline document model.
///
/// Block arena with stable ids, properties, live mutation, and a parser for
/// indented-bullet outline text.
pub mod document;

/// Outline filtering predicates.
///
/// Heading classification, suppression rules, and the expandable-children
/// test that governs the expand/collapse affordance.
pub mod filter;

/// External collaborator interfaces.
///
/// Traits for the host editor and the content converter, plus a synchronous
/// reference converter for plain outline text.
pub mod host;

/// Rendering module for text and JSON output.
///
/// Box-drawing trees, indented lists, termimad-styled labels, and JSON
/// serialization of the row tree.
pub mod render;

/// Tree-to-TOC projection and collapse-state machine.
///
/// `TocView` and the row tree it emits.
pub mod toc;

// Re-export commonly used types for convenience
pub use config::{Config, OutlineSettings};
pub use document::{Block, BlockId, Document, Page, PageId, parse_file, parse_outline};
pub use filter::{HeadingLevel, classify_heading};
pub use host::{ContentConverter, Conversion, DocumentHost, MarkdownConverter};
pub use toc::{ContentState, TocRow, TocView, flatten_visible};
