//! Per-node view state: conversion lifecycle and collapse maps.

use crate::document::{BlockId, Document};
use indexmap::IndexMap;

/// Lifecycle of a block's content conversion.
///
/// Suppression treats everything except `Resolved` with non-empty text as
/// not-visible, so ordering of converter callbacks can never flash raw or
/// half-converted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentState {
    NotRequested,
    Pending,
    Resolved(String),
    Failed,
}

impl ContentState {
    /// The converted text, if conversion has completed successfully.
    pub fn resolved_text(&self) -> Option<&str> {
        match self {
            Self::Resolved(text) => Some(text),
            _ => None,
        }
    }
}

/// View-side state for one block, keyed by block id for the life of the
/// view. Each node owns the collapse flags of its direct children and
/// nothing else; a node's own flag lives in its parent's map, which is what
/// lets a parent mass-toggle all children in one step.
///
/// Nodes are never torn down when an ancestor collapses: hide/show
/// round-trips keep every manually toggled flag and every resolved
/// conversion below them.
#[derive(Debug)]
pub(crate) struct ViewNode {
    pub(crate) id: BlockId,
    pub(crate) uuid: String,
    /// Nesting depth relative to the traversal root (root = 0).
    pub(crate) level: usize,
    /// Raw content snapshot; an edit invalidates the conversion.
    pub(crate) raw: String,
    pub(crate) content: ContentState,
    pub(crate) children_collapsed: IndexMap<BlockId, bool>,
    pub(crate) children: IndexMap<BlockId, ViewNode>,
}

impl ViewNode {
    pub(crate) fn new(doc: &Document, id: BlockId, level: usize) -> Self {
        let (uuid, raw) = doc
            .get(id)
            .map(|b| (b.uuid().to_string(), b.content().to_string()))
            .unwrap_or_default();
        Self {
            id,
            uuid,
            level,
            raw,
            content: ContentState::NotRequested,
            children_collapsed: IndexMap::new(),
            children: IndexMap::new(),
        }
    }

    /// Reconcile this subtree against the document's current children.
    ///
    /// Existing collapse flags are preserved, new ids are seeded with the
    /// default rule (`default_expansion_level <= child level`), absent ids
    /// are dropped. Idempotent: syncing twice changes nothing.
    pub(crate) fn sync(&mut self, doc: &Document, default_expansion_level: usize) {
        if let Some(block) = doc.get(self.id) {
            if block.content() != self.raw {
                self.raw = block.content().to_string();
                self.content = ContentState::NotRequested;
            }
        }

        let child_ids: Vec<BlockId> = doc.children(self.id).collect();
        let child_level = self.level + 1;
        let mut collapsed = IndexMap::with_capacity(child_ids.len());
        let mut views = IndexMap::with_capacity(child_ids.len());
        for id in child_ids {
            let flag = self
                .children_collapsed
                .get(&id)
                .copied()
                .unwrap_or(default_expansion_level <= child_level);
            collapsed.insert(id, flag);

            let mut view = self
                .children
                .swap_remove(&id)
                .unwrap_or_else(|| ViewNode::new(doc, id, child_level));
            view.level = child_level;
            view.sync(doc, default_expansion_level);
            views.insert(id, view);
        }
        self.children_collapsed = collapsed;
        self.children = views;
    }
}
