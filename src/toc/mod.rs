//! Tree-to-TOC projection and collapse-state machine.
//!
//! [`TocView`] projects an outline [`Document`](crate::document::Document)
//! into a tree of [`TocRow`]s, maintaining per-node expand/collapse state
//! that survives live edits, and mediating content conversion and navigation
//! through the [`host`](crate::host) traits.

mod row;
mod state;
mod view;

pub use row::{TocRow, flatten_visible};
pub use state::ContentState;
pub use view::TocView;
