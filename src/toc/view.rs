//! The recursive tree renderer and its collapse-state machine.

use super::row::TocRow;
use super::state::{ContentState, ViewNode};
use crate::config::OutlineSettings;
use crate::document::{BlockId, Document, Page};
use crate::filter;
use crate::host::{ContentConverter, Conversion, DocumentHost};
use log::debug;
use std::collections::HashSet;

/// A live TOC over one traversal root (a page, or any block standing in for
/// one).
///
/// The view keeps a per-node state tree keyed by block id: each node owns
/// the collapse flags of its direct children and the conversion state of its
/// own content. State survives document edits (reconciled, never reset) and
/// hide/show round-trips through collapsed ancestors. One `TocView` is one
/// root identity; page resolution is memoized for its lifetime.
pub struct TocView {
    root: BlockId,
    settings: OutlineSettings,
    state: ViewNode,
    // Memoized page resolution for this root identity.
    page_cache: Option<Page>,
}

impl TocView {
    /// Build a view rooted at the document's page.
    pub fn new(doc: &Document, settings: OutlineSettings) -> Self {
        Self::for_block(doc, doc.root(), settings)
    }

    /// Build a view rooted at an arbitrary block.
    pub fn for_block(doc: &Document, root: BlockId, settings: OutlineSettings) -> Self {
        let mut state = ViewNode::new(doc, root, 0);
        state.sync(doc, settings.default_expansion_level);
        Self {
            root,
            settings,
            state,
            page_cache: None,
        }
    }

    /// The traversal root.
    pub fn root(&self) -> BlockId {
        self.root
    }

    pub fn settings(&self) -> &OutlineSettings {
        &self.settings
    }

    /// Reconcile view state against the document's current tree.
    ///
    /// Idempotent; existing collapse flags and resolved conversions are kept,
    /// new blocks are seeded from the default rule, removed blocks are
    /// dropped (in-flight conversions for them will be discarded on arrival).
    pub fn sync(&mut self, doc: &Document) {
        self.state.sync(doc, self.settings.default_expansion_level);
    }

    /// Project the current document into a row tree.
    ///
    /// Conversion is requested for every reachable block that has not asked
    /// yet, including blocks hidden under a collapsed ancestor, so expanding
    /// is instant. Suppressed blocks emit nothing and end recursion;
    /// hidden blocks are emitted with `hidden: true`.
    pub fn render(
        &mut self,
        doc: &Document,
        converter: &mut dyn ContentConverter,
        highlight: &HashSet<BlockId>,
    ) -> Vec<TocRow> {
        self.sync(doc);
        let settings = &self.settings;
        let mut rows = Vec::new();
        let order: Vec<BlockId> = self.state.children.keys().copied().collect();
        for id in order {
            let collapsed = self
                .state
                .children_collapsed
                .get(&id)
                .copied()
                .unwrap_or(false);
            if let Some(child) = self.state.children.get_mut(&id) {
                if let Some(row) =
                    render_node(child, doc, converter, settings, highlight, collapsed, false, 0)
                {
                    rows.push(row);
                }
            }
        }
        rows
    }

    /// Deliver the result of a [`Conversion::Pending`] request.
    ///
    /// `None` marks the conversion as failed, which renders like empty
    /// content. Results for blocks no longer in the view, or blocks that
    /// were not waiting, are discarded silently.
    pub fn complete_conversion(&mut self, uuid: &str, result: Option<String>) {
        match find_by_uuid_mut(&mut self.state, uuid) {
            Some(node) if node.content == ContentState::Pending => {
                node.content = match result {
                    Some(text) => ContentState::Resolved(text),
                    None => ContentState::Failed,
                };
            }
            Some(_) => debug!("stale conversion result for {uuid} ignored"),
            None => debug!("conversion result for unknown block {uuid} discarded"),
        }
    }

    /// Current collapse flag of a block, if the view tracks it.
    pub fn is_collapsed(&self, id: BlockId) -> Option<bool> {
        fn find(node: &ViewNode, id: BlockId) -> Option<bool> {
            if let Some(&flag) = node.children_collapsed.get(&id) {
                return Some(flag);
            }
            node.children.values().find_map(|c| find(c, id))
        }
        find(&self.state, id)
    }

    /// Flip a block's collapse flag in its parent's map. Returns the new
    /// flag, or `None` when the block is not in the view.
    pub fn toggle(&mut self, id: BlockId) -> Option<bool> {
        fn toggle_in(node: &mut ViewNode, id: BlockId) -> Option<bool> {
            if let Some(flag) = node.children_collapsed.get_mut(&id) {
                *flag = !*flag;
                return Some(*flag);
            }
            node.children.values_mut().find_map(|c| toggle_in(c, id))
        }
        toggle_in(&mut self.state, id)
    }

    /// Set a block's collapse flag directly.
    pub fn set_collapsed(&mut self, id: BlockId, collapsed: bool) -> bool {
        fn set_in(node: &mut ViewNode, id: BlockId, collapsed: bool) -> bool {
            if let Some(flag) = node.children_collapsed.get_mut(&id) {
                *flag = collapsed;
                return true;
            }
            node.children.values_mut().any(|c| set_in(c, id, collapsed))
        }
        set_in(&mut self.state, id, collapsed)
    }

    /// Collapse or expand all direct children of `id` in one aggregate step.
    ///
    /// Direction is decided over the full current child set before anything
    /// moves: if any child is expanded, within the depth limit, and has
    /// expandable children, everything collapses; otherwise everything
    /// expands. Two immediate invocations are inverses. Pass the document
    /// root id for the whole-outline toggle.
    pub fn toggle_all(&mut self, doc: &Document, id: BlockId) {
        let settings = self.settings.clone();
        let Some(node) = find_node_mut(&mut self.state, id) else {
            return;
        };
        let child_level = node.level + 1;
        let collapse = node.children_collapsed.iter().any(|(&child, &collapsed)| {
            !collapsed
                && child_level < settings.levels
                && filter::has_expandable_children(
                    doc,
                    child,
                    child_level,
                    settings.levels,
                    settings.headings_only,
                )
        });
        for flag in node.children_collapsed.values_mut() {
            *flag = collapse;
        }
    }

    /// Set every direct child of `id` to the same collapse flag.
    pub fn set_all_children(&mut self, id: BlockId, collapsed: bool) {
        if let Some(node) = find_node_mut(&mut self.state, id) {
            for flag in node.children_collapsed.values_mut() {
                *flag = collapsed;
            }
        }
    }

    /// Navigate to the page containing a block.
    ///
    /// With `modifier` the page opens in the secondary view; otherwise the
    /// primary view scrolls to the block within its page. Resolution failure
    /// means no navigation occurs.
    pub fn go_to_page(
        &mut self,
        doc: &Document,
        host: &mut dyn DocumentHost,
        id: BlockId,
        modifier: bool,
    ) {
        let Some(block) = doc.get(id) else {
            return;
        };
        let uuid = block.uuid().to_string();
        let Some(page) = self.resolve_page(doc, host) else {
            debug!("page for block {uuid} did not resolve; not navigating");
            return;
        };
        if modifier {
            host.open_in_secondary_view(&page.uuid);
        } else {
            host.scroll_to_node(Some(&page.name), &uuid);
        }
    }

    /// Navigate to a block directly.
    pub fn go_into(&mut self, doc: &Document, host: &mut dyn DocumentHost, id: BlockId, modifier: bool) {
        let Some(block) = doc.get(id) else {
            return;
        };
        if modifier {
            host.open_in_secondary_view(block.uuid());
        } else {
            host.scroll_to_node(None, block.uuid());
        }
    }

    // One page per root identity: the cache makes repeated navigation reuse
    // the first successful lookup instead of resolving again.
    fn resolve_page(&mut self, doc: &Document, host: &mut dyn DocumentHost) -> Option<Page> {
        if let Some(page) = &self.page_cache {
            return Some(page.clone());
        }
        let page = if self.root == doc.root() {
            // The root stands for the page itself.
            Some(doc.page().clone())
        } else {
            host.get_page(doc.page().id)
        };
        self.page_cache.clone_from(&page);
        page
    }
}

fn find_node_mut(node: &mut ViewNode, id: BlockId) -> Option<&mut ViewNode> {
    if node.id == id {
        return Some(node);
    }
    node.children.values_mut().find_map(|c| find_node_mut(c, id))
}

fn find_by_uuid_mut<'a>(node: &'a mut ViewNode, uuid: &str) -> Option<&'a mut ViewNode> {
    if node.uuid == uuid {
        return Some(node);
    }
    node.children
        .values_mut()
        .find_map(|c| find_by_uuid_mut(c, uuid))
}

#[allow(clippy::too_many_arguments)]
fn render_node(
    view: &mut ViewNode,
    doc: &Document,
    converter: &mut dyn ContentConverter,
    settings: &OutlineSettings,
    highlight: &HashSet<BlockId>,
    collapsed: bool,
    hidden: bool,
    depth: usize,
) -> Option<TocRow> {
    let block = doc.get(view.id)?;

    if view.content == ContentState::NotRequested {
        view.content = match converter.convert(&view.uuid, block.content()) {
            Conversion::Ready(text) => ContentState::Resolved(text),
            Conversion::Pending => ContentState::Pending,
            Conversion::Failed => ContentState::Failed,
        };
    }

    if filter::should_suppress(block, view.content.resolved_text(), settings.headings_only) {
        return None;
    }

    let label = view.content.resolved_text().unwrap_or_default().to_string();
    let mut children = Vec::new();
    if view.level < settings.levels {
        let order: Vec<BlockId> = view.children.keys().copied().collect();
        for id in order {
            let child_collapsed = view.children_collapsed.get(&id).copied().unwrap_or(false);
            if let Some(child) = view.children.get_mut(&id) {
                if let Some(row) = render_node(
                    child,
                    doc,
                    converter,
                    settings,
                    highlight,
                    child_collapsed,
                    hidden || collapsed,
                    depth + 1,
                ) {
                    children.push(row);
                }
            }
        }
    }

    Some(TocRow {
        id: view.id,
        uuid: view.uuid.clone(),
        label,
        heading: filter::classify_heading(block.content()),
        depth,
        collapsed,
        expandable: filter::has_expandable_children(
            doc,
            view.id,
            view.level,
            settings.levels,
            settings.headings_only,
        ),
        hidden,
        highlighted: highlight.contains(&view.id),
        page_jump: !settings.no_page_jump,
        children,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Block, PageId, parse_outline};
    use crate::host::MarkdownConverter;
    use crate::toc::flatten_visible;

    fn settings(levels: usize, expansion: usize) -> OutlineSettings {
        OutlineSettings {
            default_expansion_level: expansion,
            levels,
            ..OutlineSettings::default()
        }
    }

    fn render_labels(view: &mut TocView, doc: &Document) -> Vec<String> {
        let rows = view.render(doc, &mut MarkdownConverter::new(), &HashSet::new());
        flatten_visible(&rows)
            .iter()
            .map(|r| r.label.clone())
            .collect()
    }

    /// Converter that never answers synchronously.
    struct StalledConverter;

    impl ContentConverter for StalledConverter {
        fn convert(&mut self, _uuid: &str, _raw: &str) -> Conversion {
            Conversion::Pending
        }
    }

    #[derive(Default)]
    struct RecordingHost {
        pages: Vec<Page>,
        get_page_calls: usize,
        scrolled: Vec<(Option<String>, String)>,
        secondary: Vec<String>,
    }

    impl DocumentHost for RecordingHost {
        fn get_page(&mut self, id: PageId) -> Option<Page> {
            self.get_page_calls += 1;
            self.pages.iter().find(|p| p.id == id).cloned()
        }

        fn scroll_to_node(&mut self, page_name: Option<&str>, uuid: &str) {
            self.scrolled
                .push((page_name.map(str::to_string), uuid.to_string()));
        }

        fn open_in_secondary_view(&mut self, uuid: &str) {
            self.secondary.push(uuid.to_string());
        }
    }

    #[test]
    fn test_end_to_end_headings_only_scenario() {
        // Root page: [# A (child: plain B), ## C], levels=2, headings only,
        // default expansion 1.
        let doc = parse_outline("- # A\n  - B\n- ## C", "page");
        let mut config = settings(2, 1);
        config.headings_only = true;
        let mut view = TocView::new(&doc, config);

        let rows = view.render(&doc, &mut MarkdownConverter::new(), &HashSet::new());
        let visible = flatten_visible(&rows);
        let labels: Vec<_> = visible.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "C"]);
        // "# A" has no heading-classified children, so its expand control is
        // disabled even though B exists.
        assert!(!visible[0].expandable);
        assert!(!visible[1].expandable);
    }

    #[test]
    fn test_toc_no_suppresses_whole_subtree() {
        let doc = parse_outline(
            "- # Kept\n- # Gone\n  toc:: no\n  - # Child of gone\n- tail",
            "page",
        );
        let mut view = TocView::new(&doc, settings(6, 9));
        assert_eq!(render_labels(&mut view, &doc), vec!["Kept", "tail"]);

        // Same document, headings-only and depth-limited: still absent.
        let mut config = settings(1, 9);
        config.headings_only = true;
        let mut view = TocView::new(&doc, config);
        assert_eq!(render_labels(&mut view, &doc), vec!["Kept"]);
    }

    #[test]
    fn test_macro_blocks_are_suppressed() {
        let doc = parse_outline("- {{query (todo)}}\n- real", "page");
        let mut view = TocView::new(&doc, settings(1, 9));
        assert_eq!(render_labels(&mut view, &doc), vec!["real"]);
    }

    #[test]
    fn test_pending_content_suppresses_until_resolved() {
        let doc = parse_outline("- a\n- b", "page");
        let ids: Vec<_> = doc.children(doc.root()).collect();
        let uuid_a = doc.get(ids[0]).unwrap().uuid().to_string();
        let mut view = TocView::new(&doc, settings(1, 9));

        let rows = view.render(&doc, &mut StalledConverter, &HashSet::new());
        assert!(rows.is_empty());

        // Resolving one block surfaces it without any other state changing.
        view.complete_conversion(&uuid_a, Some("a".into()));
        let rows = view.render(&doc, &mut StalledConverter, &HashSet::new());
        let labels: Vec<_> = flatten_visible(&rows)
            .iter()
            .map(|r| r.label.clone())
            .collect();
        assert_eq!(labels, vec!["a"]);
    }

    #[test]
    fn test_failed_conversion_renders_nothing() {
        let doc = parse_outline("- a", "page");
        let uuid = {
            let id = doc.children(doc.root()).next().unwrap();
            doc.get(id).unwrap().uuid().to_string()
        };
        let mut view = TocView::new(&doc, settings(1, 9));
        view.render(&doc, &mut StalledConverter, &HashSet::new());
        view.complete_conversion(&uuid, None);
        assert!(view.render(&doc, &mut StalledConverter, &HashSet::new()).is_empty());
    }

    #[test]
    fn test_conversion_for_removed_block_is_discarded() {
        let mut doc = parse_outline("- a\n- b", "page");
        let ids: Vec<_> = doc.children(doc.root()).collect();
        let uuid_a = doc.get(ids[0]).unwrap().uuid().to_string();
        let mut view = TocView::new(&doc, settings(1, 9));
        view.render(&doc, &mut StalledConverter, &HashSet::new());

        doc.remove(ids[0]);
        view.sync(&doc);
        // Late result for the removed block: silently dropped.
        view.complete_conversion(&uuid_a, Some("a".into()));
        assert!(view.is_collapsed(ids[0]).is_none());
    }

    #[test]
    fn test_content_edit_to_empty_vanishes_row() {
        let mut doc = parse_outline("- a\n- b", "page");
        let ids: Vec<_> = doc.children(doc.root()).collect();
        let mut view = TocView::new(&doc, settings(1, 9));
        assert_eq!(render_labels(&mut view, &doc), vec!["a", "b"]);

        doc.set_content(ids[0], "");
        assert_eq!(render_labels(&mut view, &doc), vec!["b"]);
    }

    #[test]
    fn test_depth_limit_stops_recursion() {
        let doc = parse_outline("- a\n  - a1\n    - a11", "page");
        let mut view = TocView::new(&doc, settings(2, 9));
        let rows = view.render(&doc, &mut MarkdownConverter::new(), &HashSet::new());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].children.len(), 1);
        // Level 2 is the limit: a1 gets no child rows and no expand control.
        assert!(rows[0].children[0].children.is_empty());
        assert!(!rows[0].children[0].expandable);
    }

    #[test]
    fn test_collapsed_ancestor_hides_but_keeps_rows() {
        let doc = parse_outline("- a\n  - a1\n    - a11", "page");
        let mut view = TocView::new(&doc, settings(6, 9));
        let ids: Vec<_> = doc.children(doc.root()).collect();
        view.set_collapsed(ids[0], true);

        let rows = view.render(&doc, &mut MarkdownConverter::new(), &HashSet::new());
        assert_eq!(flatten_visible(&rows).len(), 1);
        // The subtree is still in the output, marked hidden, conversions done.
        assert_eq!(rows[0].children.len(), 1);
        assert!(rows[0].children[0].hidden);
        assert_eq!(rows[0].children[0].label, "a1");
        assert!(rows[0].children[0].children[0].hidden);
    }

    #[test]
    fn test_collapse_round_trip_preserves_descendant_pattern() {
        let doc = parse_outline("- p\n  - x\n    - y\n  - z", "page");
        let mut view = TocView::new(&doc, settings(6, 9));
        let p = doc.children(doc.root()).next().unwrap();
        let kids: Vec<_> = doc.children(p).collect();

        // Manually collapse x, leave z expanded, then hide everything by
        // collapsing p and bring it back.
        view.toggle(kids[0]);
        assert_eq!(view.is_collapsed(kids[0]), Some(true));
        view.toggle(p);
        view.render(&doc, &mut MarkdownConverter::new(), &HashSet::new());
        view.toggle(p);

        let rows = view.render(&doc, &mut MarkdownConverter::new(), &HashSet::new());
        assert_eq!(view.is_collapsed(kids[0]), Some(true));
        assert_eq!(view.is_collapsed(kids[1]), Some(false));
        let visible: Vec<_> = flatten_visible(&rows)
            .iter()
            .map(|r| r.label.clone())
            .collect();
        // y stays hidden under collapsed x.
        assert_eq!(visible, vec!["p", "x", "z"]);
    }

    #[test]
    fn test_reconcile_preserves_manual_override_across_edits() {
        let mut doc = parse_outline("- a\n- b\n- c", "page");
        let ids: Vec<_> = doc.children(doc.root()).collect();
        let mut view = TocView::new(&doc, settings(6, 1));

        view.toggle(ids[1]); // expand b against its default
        assert_eq!(view.is_collapsed(ids[1]), Some(false));

        doc.remove(ids[2]);
        let d = doc.append(doc.root(), Block::new("d"));
        view.sync(&doc);

        assert_eq!(view.is_collapsed(ids[0]), Some(true));
        assert_eq!(view.is_collapsed(ids[1]), Some(false));
        assert_eq!(view.is_collapsed(ids[2]), None);
        assert_eq!(view.is_collapsed(d), Some(true));
    }

    #[test]
    fn test_toggle_all_is_directionally_consistent() {
        let doc = parse_outline("- a\n  - a1\n- b\n  - b1\n- c", "page");
        let mut view = TocView::new(&doc, settings(6, 9));
        let ids: Vec<_> = doc.children(doc.root()).collect();

        // Some children are expanded and expandable: one call collapses all.
        view.toggle_all(&doc, doc.root());
        for &id in &ids {
            assert_eq!(view.is_collapsed(id), Some(true), "all collapse together");
        }

        // No expanded-and-expandable child remains: the next call expands all.
        view.toggle_all(&doc, doc.root());
        for &id in &ids {
            assert_eq!(view.is_collapsed(id), Some(false), "all expand together");
        }
    }

    #[test]
    fn test_toggle_all_expands_when_only_leaves() {
        let doc = parse_outline("- a\n- b", "page");
        let mut view = TocView::new(&doc, settings(6, 1));
        let ids: Vec<_> = doc.children(doc.root()).collect();
        assert_eq!(view.is_collapsed(ids[0]), Some(true));

        // Leaves are never "expandable", so the aggregate goes to expanded.
        view.toggle_all(&doc, doc.root());
        assert_eq!(view.is_collapsed(ids[0]), Some(false));
        assert_eq!(view.is_collapsed(ids[1]), Some(false));
    }

    #[test]
    fn test_no_page_jump_removes_control_everywhere() {
        let doc = parse_outline("- a\n  - a1", "page");
        let mut config = settings(6, 9);
        config.no_page_jump = true;
        let mut view = TocView::new(&doc, config);
        let rows = view.render(&doc, &mut MarkdownConverter::new(), &HashSet::new());
        assert!(flatten_visible(&rows).iter().all(|r| !r.page_jump));
    }

    #[test]
    fn test_highlighted_rows() {
        let doc = parse_outline("- a\n- b", "page");
        let ids: Vec<_> = doc.children(doc.root()).collect();
        let mut view = TocView::new(&doc, settings(1, 9));
        let highlight: HashSet<_> = [ids[1]].into();
        let rows = view.render(&doc, &mut MarkdownConverter::new(), &highlight);
        assert!(!rows[0].highlighted);
        assert!(rows[1].highlighted);
    }

    #[test]
    fn test_heading_classification_in_rows() {
        let doc = parse_outline("- ### Deep\n- plain", "page");
        let mut view = TocView::new(&doc, settings(1, 9));
        let rows = view.render(&doc, &mut MarkdownConverter::new(), &HashSet::new());
        assert_eq!(rows[0].heading.map(|h| h.rank()), Some(3));
        assert_eq!(rows[1].heading, None);
    }

    #[test]
    fn test_go_to_page_memoizes_resolution() {
        let doc = parse_outline("- a\n  - a1", "page");
        let a = doc.children(doc.root()).next().unwrap();
        let a1 = doc.children(a).next().unwrap();
        let mut view = TocView::for_block(&doc, a, settings(6, 9));
        let mut host = RecordingHost {
            pages: vec![doc.page().clone()],
            ..RecordingHost::default()
        };

        view.go_to_page(&doc, &mut host, a1, false);
        view.go_to_page(&doc, &mut host, a, false);
        assert_eq!(host.get_page_calls, 1);
        assert_eq!(host.scrolled.len(), 2);
        assert_eq!(host.scrolled[0].0.as_deref(), Some("page"));
    }

    #[test]
    fn test_go_to_page_failure_is_a_noop() {
        let doc = parse_outline("- a", "page");
        let a = doc.children(doc.root()).next().unwrap();
        let mut view = TocView::for_block(&doc, a, settings(6, 9));
        let mut host = RecordingHost::default(); // knows no pages

        view.go_to_page(&doc, &mut host, a, false);
        assert!(host.scrolled.is_empty());
        assert!(host.secondary.is_empty());
    }

    #[test]
    fn test_go_to_page_with_modifier_opens_secondary() {
        let doc = parse_outline("- a", "page");
        let a = doc.children(doc.root()).next().unwrap();
        let mut view = TocView::new(&doc, settings(6, 9));
        let mut host = RecordingHost::default();

        // Page-rooted views resolve the page from the document itself.
        view.go_to_page(&doc, &mut host, a, true);
        assert_eq!(host.get_page_calls, 0);
        assert_eq!(host.secondary, vec![doc.page().uuid.clone()]);
    }

    #[test]
    fn test_go_into_targets_the_block() {
        let doc = parse_outline("- a", "page");
        let a = doc.children(doc.root()).next().unwrap();
        let uuid = doc.get(a).unwrap().uuid().to_string();
        let mut view = TocView::new(&doc, settings(6, 9));
        let mut host = RecordingHost::default();

        view.go_into(&doc, &mut host, a, false);
        view.go_into(&doc, &mut host, a, true);
        assert_eq!(host.scrolled, vec![(None, uuid.clone())]);
        assert_eq!(host.secondary, vec![uuid]);
    }
}
