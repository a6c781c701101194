//! Outline document model.
//!
//! An in-memory stand-in for the host editor's live block tree: a page plus
//! an arena of outline blocks with stable per-session ids, cross-session
//! uuids, and `key:: value` properties. The arena supports live mutation
//! (append, insert, remove, edit) so the TOC layer can be exercised against
//! a changing tree exactly the way an editor would drive it.

mod parse;

pub use parse::{parse_file, parse_outline};

use indexmap::IndexMap;
use indextree::Arena;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Stable per-session block identifier, unique within the document.
///
/// Ids survive unrelated edits: removing one block never invalidates the id
/// of another, which is what lets collapse state reconcile across changes.
pub type BlockId = indextree::NodeId;

/// Identifier of a page in the host document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageId(pub u64);

/// Page metadata used to resolve navigation targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub id: PageId,
    pub name: String,
    pub uuid: String,
}

/// One outline block: raw content plus `key:: value` properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    uuid: String,
    content: String,
    properties: IndexMap<String, String>,
}

impl Block {
    /// Create a block with the given raw content and a fresh uuid.
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            uuid: make_uuid(&content),
            content,
            properties: IndexMap::new(),
        }
    }

    /// Builder-style property attachment, `Block::new("x").with_property("toc", "no")`.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Cross-session identifier used for navigation.
    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    /// Raw content, possibly starting with a heading marker, possibly empty.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Look up a property value by name.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }
}

// Uuids only need to be unique and stable for the life of the block; a hash
// of the content salted with an allocation counter is enough.
fn make_uuid(content: &str) -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    static SEQ: AtomicU64 = AtomicU64::new(0);

    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    seq.hash(&mut hasher);
    format!("{:08x}-{:04x}", hasher.finish() as u32, seq & 0xFFFF)
}

/// An outline document: one page and its block tree.
///
/// The root block stands for the page itself and is never rendered; the
/// page's top-level blocks are its children.
#[derive(Debug)]
pub struct Document {
    arena: Arena<Block>,
    root: BlockId,
    page: Page,
}

impl Document {
    /// Create an empty document for a named page.
    pub fn new(page_name: impl Into<String>) -> Self {
        let name = page_name.into();
        let mut arena = Arena::new();
        let root = arena.new_node(Block::new(""));
        let uuid = make_uuid(&name);
        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self {
            arena,
            root,
            page: Page {
                id: PageId(hasher.finish()),
                name,
                uuid,
            },
        }
    }

    /// The synthetic root block standing for the page.
    pub fn root(&self) -> BlockId {
        self.root
    }

    /// Page metadata.
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Read access to a block. `None` for ids that were removed.
    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.arena
            .get(id)
            .filter(|node| !node.is_removed())
            .map(|node| node.get())
    }

    /// Direct children of a block, in document order.
    pub fn children(&self, id: BlockId) -> impl Iterator<Item = BlockId> + '_ {
        id.children(&self.arena)
    }

    /// Number of live blocks, not counting the root.
    pub fn len(&self) -> usize {
        self.root.descendants(&self.arena).count().saturating_sub(1)
    }

    /// True when the page has no blocks.
    pub fn is_empty(&self) -> bool {
        self.root.children(&self.arena).next().is_none()
    }

    /// Append a block as the last child of `parent`. Returns the new id.
    pub fn append(&mut self, parent: BlockId, block: Block) -> BlockId {
        let id = self.arena.new_node(block);
        parent.append(id, &mut self.arena);
        id
    }

    /// Insert a block as the sibling immediately after `anchor`.
    pub fn insert_after(&mut self, anchor: BlockId, block: Block) -> BlockId {
        let id = self.arena.new_node(block);
        anchor.insert_after(id, &mut self.arena);
        id
    }

    /// Remove a block and its whole subtree.
    pub fn remove(&mut self, id: BlockId) {
        id.remove_subtree(&mut self.arena);
    }

    /// Replace a block's raw content. The uuid is unchanged.
    pub fn set_content(&mut self, id: BlockId, content: impl Into<String>) {
        if let Some(node) = self.arena.get_mut(id) {
            node.get_mut().content = content.into();
        }
    }

    /// Set a property on a block.
    pub fn set_property(&mut self, id: BlockId, name: impl Into<String>, value: impl Into<String>) {
        if let Some(node) = self.arena.get_mut(id) {
            node.get_mut().properties.insert(name.into(), value.into());
        }
    }

    /// Find a block by its uuid.
    pub fn find_by_uuid(&self, uuid: &str) -> Option<BlockId> {
        self.root
            .descendants(&self.arena)
            .find(|&id| self.get(id).is_some_and(|b| b.uuid() == uuid))
    }
}
