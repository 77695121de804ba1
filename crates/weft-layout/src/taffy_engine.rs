// crates/weft-layout/src/taffy_engine.rs
//! Taffy-backed layout tree.
//!
//! Every rendered view owns exactly one taffy node. Structural operations go through this
//! type so the view hierarchy and the layout hierarchy are always changed together, in the
//! same order.

use std::collections::{HashMap, HashSet};
use std::fmt;

use glam::Vec2;
use taffy::prelude::*;
use tracing::{debug, warn};
use weft_core::{Frame, LayoutStyle, View, ViewId, ViewKind, ViewTraits, VisualStyle};

use crate::{
    to_taffy_style, ApproximateMeasurer, LayoutError, NoopBackend, Result, TextContent,
    TextMeasurer, ViewBackend,
};

/// Outcome of [`LayoutTree::cleanup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CleanupReport {
    pub roots: usize,
    pub freed: usize,
}

pub struct LayoutTree {
    /// Text-bearing leaves carry their text as node context for measurement.
    taffy: TaffyTree<TextContent>,
    views: HashMap<ViewId, View>,
    view_to_node: HashMap<ViewId, NodeId>,
    node_to_view: HashMap<NodeId, ViewId>,
    next_id: ViewId,
    measurer: Box<dyn TextMeasurer>,
    backend: Box<dyn ViewBackend>,
}

impl LayoutTree {
    pub fn new() -> Self {
        Self::with_backend(Box::new(NoopBackend))
    }

    pub fn with_backend(backend: Box<dyn ViewBackend>) -> Self {
        Self {
            taffy: TaffyTree::new(),
            views: HashMap::new(),
            view_to_node: HashMap::new(),
            node_to_view: HashMap::new(),
            next_id: 1,
            measurer: Box::new(ApproximateMeasurer::default()),
            backend,
        }
    }

    pub fn set_measurer(&mut self, measurer: Box<dyn TextMeasurer>) {
        self.measurer = measurer;
    }

    pub fn backend_mut(&mut self) -> &mut dyn ViewBackend {
        self.backend.as_mut()
    }

    /// Creates a detached view together with its layout node.
    pub fn create_view(
        &mut self,
        kind: ViewKind,
        layout: &LayoutStyle,
        style: VisualStyle,
    ) -> Result<ViewId> {
        let taffy_style = to_taffy_style(layout);
        let node = if kind.traits().contains(ViewTraits::TEXT_BEARING) {
            self.taffy
                .new_leaf_with_context(taffy_style, TextContent::from_style(&style))?
        } else {
            self.taffy.new_leaf(taffy_style)?
        };

        let id = self.next_id;
        self.next_id += 1;

        self.view_to_node.insert(id, node);
        self.node_to_view.insert(node, id);
        self.backend.view_created(id, &kind);
        self.backend.style_applied(id, &style);
        self.views.insert(id, View::new(id, kind, style));

        Ok(id)
    }

    /// Appends `child` as the last layout child and the last subview of `parent`.
    pub fn attach(&mut self, child: ViewId, parent: ViewId) -> Result<()> {
        if child == parent {
            return Err(LayoutError::SelfAttach(child));
        }
        let parent_node = self.node_of(parent)?;
        let child_node = self.node_of(child)?;
        if let Some(existing) = self.views.get(&child).and_then(|view| view.parent) {
            return Err(LayoutError::AlreadyAttached { child, parent: existing });
        }
        if self.ancestors(parent).contains(&child) {
            return Err(LayoutError::Cycle { child, parent });
        }

        self.taffy.add_child(parent_node, child_node)?;
        if let Some(view) = self.views.get_mut(&parent) {
            view.subviews.push(child);
        }
        if let Some(view) = self.views.get_mut(&child) {
            view.parent = Some(parent);
        }
        self.backend.subview_added(parent, child);
        Ok(())
    }

    /// Removes `view` from its parent in both trees. The subtree stays allocated.
    pub fn detach(&mut self, view: ViewId) -> Result<()> {
        let node = self.node_of(view)?;
        let Some(parent) = self.views.get(&view).and_then(|v| v.parent) else {
            return Ok(());
        };
        let parent_node = self.node_of(parent)?;

        self.taffy.remove_child(parent_node, node)?;
        if let Some(parent_view) = self.views.get_mut(&parent) {
            parent_view.subviews.retain(|id| *id != view);
        }
        if let Some(child_view) = self.views.get_mut(&view) {
            child_view.parent = None;
        }
        Ok(())
    }

    /// Forces `root` to `width` x `height`, runs layout once and copies the result onto views.
    pub fn calculate_layout(&mut self, root: ViewId, width: f32, height: f32) -> Result<()> {
        let node = self.node_of(root)?;

        let mut style = self.taffy.style(node)?.clone();
        style.size = Size {
            width: Dimension::Length(width),
            height: Dimension::Length(height),
        };
        self.taffy.set_style(node, style)?;
        self.set_frame(root, Frame::new(0.0, 0.0, width, height));

        let measurer = &self.measurer;
        self.taffy.compute_layout_with_measure(
            node,
            Size {
                width: AvailableSpace::Definite(width),
                height: AvailableSpace::Definite(height),
            },
            |known_dimensions, available_space, _node_id, context, _style| match context {
                Some(content) => measurer.measure(content, known_dimensions, available_space),
                None => Size::ZERO,
            },
        )?;

        self.apply_geometry(root)?;
        debug!("Layout calculated for view {} at {}x{}", root, width, height);
        Ok(())
    }

    /// Walks view subviews, matching each to its layout node by identity.
    fn apply_geometry(&mut self, root: ViewId) -> Result<()> {
        let mut stack = vec![root];

        while let Some(parent) = stack.pop() {
            let parent_node = self.node_of(parent)?;
            let subviews = self
                .views
                .get(&parent)
                .map(|view| view.subviews.clone())
                .unwrap_or_default();

            for child in subviews {
                let child_node = self.node_of(child)?;
                if self.taffy.parent(child_node) != Some(parent_node) {
                    warn!("View {} is not a layout child of view {}; skipping", child, parent);
                    continue;
                }
                let layout = self.taffy.layout(child_node)?;
                let frame = Frame::new(
                    layout.location.x,
                    layout.location.y,
                    layout.size.width,
                    layout.size.height,
                );
                self.set_frame(child, frame);
                stack.push(child);
            }

            let scrolls = self.views.get(&parent).is_some_and(|view| {
                let traits = view.traits();
                traits.contains(ViewTraits::SCROLLS) && !traits.contains(ViewTraits::TEMPLATE_CONSUMER)
            });
            if scrolls {
                self.update_content_size(parent)?;
            }
        }
        Ok(())
    }

    /// Scroll extent: right/bottom-most edge of the immediate content plus trailing padding.
    fn update_content_size(&mut self, view: ViewId) -> Result<()> {
        let node = self.node_of(view)?;
        let Some(scroll) = self.views.get(&view) else {
            return Ok(());
        };
        let bounds = scroll.frame.size;

        let padding = self.taffy.style(node)?.padding;
        let resolve = |value: LengthPercentage| match value {
            LengthPercentage::Length(points) => points,
            LengthPercentage::Percent(fraction) => fraction * bounds.x,
        };

        let mut max_edge = Vec2::ZERO;
        for child in &scroll.subviews {
            if let Some(content) = self.views.get(child) {
                max_edge = max_edge.max(content.frame.max());
            }
        }

        let size = Vec2::new(
            bounds.x.max(max_edge.x + resolve(padding.right)),
            max_edge.y + resolve(padding.bottom),
        );
        self.set_content_size(view, size);
        Ok(())
    }

    pub fn set_content_size(&mut self, view: ViewId, size: Vec2) {
        if let Some(entry) = self.views.get_mut(&view) {
            entry.content_size = size;
            self.backend.content_size_applied(view, size);
        }
    }

    fn set_frame(&mut self, view: ViewId, frame: Frame) {
        if let Some(entry) = self.views.get_mut(&view) {
            entry.frame = frame;
            self.backend.frame_applied(view, frame);
        }
    }

    /// Moves a laid-out view without touching its size; used to place list cells.
    pub fn set_frame_origin(&mut self, view: ViewId, origin: Vec2) {
        if let Some(frame) = self.views.get(&view).map(|entry| Frame {
            origin,
            size: entry.frame.size,
        }) {
            self.set_frame(view, frame);
        }
    }

    /// Applies `update` to the view's visual style and refreshes its measured text.
    pub fn update_style(&mut self, view: ViewId, update: impl FnOnce(&mut VisualStyle)) -> Result<()> {
        let node = self.node_of(view)?;
        let Some(entry) = self.views.get_mut(&view) else {
            return Err(LayoutError::UnknownView(view));
        };
        update(&mut entry.style);

        if entry.traits().contains(ViewTraits::TEXT_BEARING) {
            self.taffy
                .set_node_context(node, Some(TextContent::from_style(&entry.style)))?;
            self.taffy.mark_dirty(node)?;
        }
        self.backend.style_applied(view, &entry.style);
        Ok(())
    }

    pub fn set_layout_style(&mut self, view: ViewId, layout: &LayoutStyle) -> Result<()> {
        let node = self.node_of(view)?;
        self.taffy.set_style(node, to_taffy_style(layout))?;
        Ok(())
    }

    /// Releases every layout node exactly once.
    ///
    /// Only roots (registered views that are nobody's subview) are freed directly; each root
    /// frees its descendants children-first. Calling this again on an empty tree is a no-op.
    pub fn cleanup(&mut self) -> CleanupReport {
        let children: HashSet<ViewId> = self
            .views
            .values()
            .flat_map(|view| view.subviews.iter().copied())
            .collect();
        let mut roots: Vec<ViewId> = self
            .view_to_node
            .keys()
            .filter(|id| !children.contains(id))
            .copied()
            .collect();
        roots.sort_unstable();

        let freed: usize = roots.iter().map(|root| self.free_subtree(*root)).sum();

        if !self.view_to_node.is_empty() {
            warn!(
                "{} layout nodes were unreachable from any root during cleanup",
                self.view_to_node.len()
            );
        }
        self.views.clear();
        self.view_to_node.clear();
        self.node_to_view.clear();

        debug!("Layout cleanup released {} roots, {} nodes", roots.len(), freed);
        CleanupReport {
            roots: roots.len(),
            freed,
        }
    }

    /// Detaches `view` from its parent and frees it with all descendants.
    pub fn remove_subtree(&mut self, view: ViewId) -> Result<usize> {
        self.detach(view)?;
        Ok(self.free_subtree(view))
    }

    /// Frees every subview of `view`, keeping `view` itself.
    pub fn clear_subviews(&mut self, view: ViewId) -> Result<usize> {
        let subviews = self
            .views
            .get(&view)
            .map(|entry| entry.subviews.clone())
            .ok_or(LayoutError::UnknownView(view))?;
        let mut freed = 0;
        for child in subviews {
            freed += self.remove_subtree(child)?;
        }
        Ok(freed)
    }

    fn free_subtree(&mut self, view: ViewId) -> usize {
        let subviews = self
            .views
            .get(&view)
            .map(|entry| entry.subviews.clone())
            .unwrap_or_default();
        let mut freed: usize = subviews.into_iter().map(|child| self.free_subtree(child)).sum();

        if let Some(node) = self.view_to_node.remove(&view) {
            self.node_to_view.remove(&node);
            match self.taffy.remove(node) {
                Ok(_) => freed += 1,
                Err(err) => warn!("Failed to free layout node of view {}: {}", view, err),
            }
        }
        if self.views.remove(&view).is_some() {
            self.backend.view_released(view);
        }
        freed
    }

    fn node_of(&self, view: ViewId) -> Result<NodeId> {
        self.view_to_node
            .get(&view)
            .copied()
            .ok_or(LayoutError::UnknownView(view))
    }

    pub fn view(&self, id: ViewId) -> Option<&View> {
        self.views.get(&id)
    }

    pub fn views(&self) -> impl Iterator<Item = &View> {
        self.views.values()
    }

    pub fn contains(&self, id: ViewId) -> bool {
        self.views.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Nodes currently allocated in the layout engine.
    pub fn live_layout_nodes(&self) -> usize {
        self.taffy.total_node_count()
    }

    /// Frame reported by the layout engine, relative to the layout parent.
    pub fn computed_frame(&self, id: ViewId) -> Option<Frame> {
        let node = self.view_to_node.get(&id)?;
        let layout = self.taffy.layout(*node).ok()?;
        Some(Frame::new(
            layout.location.x,
            layout.location.y,
            layout.size.width,
            layout.size.height,
        ))
    }

    /// Children as the layout engine sees them, mapped back to views.
    pub fn layout_children(&self, id: ViewId) -> Result<Vec<ViewId>> {
        let node = self.node_of(id)?;
        Ok(self
            .taffy
            .children(node)?
            .into_iter()
            .filter_map(|child| self.node_to_view.get(&child).copied())
            .collect())
    }

    pub fn roots(&self) -> Vec<ViewId> {
        let mut roots: Vec<ViewId> = self
            .views
            .values()
            .filter(|view| view.parent.is_none())
            .map(|view| view.id)
            .collect();
        roots.sort_unstable();
        roots
    }

    /// `view`'s parent chain, nearest first.
    pub fn ancestors(&self, view: ViewId) -> Vec<ViewId> {
        let mut chain = Vec::new();
        let mut current = self.views.get(&view).and_then(|entry| entry.parent);
        while let Some(id) = current {
            chain.push(id);
            current = self.views.get(&id).and_then(|entry| entry.parent);
        }
        chain
    }

    /// Every view below `view`, depth-first, excluding `view` itself.
    pub fn descendants(&self, view: ViewId) -> Vec<ViewId> {
        let mut found = Vec::new();
        let mut stack: Vec<ViewId> = self
            .views
            .get(&view)
            .map(|entry| entry.subviews.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(id) = stack.pop() {
            found.push(id);
            if let Some(entry) = self.views.get(&id) {
                stack.extend(entry.subviews.iter().rev().copied());
            }
        }
        found
    }

    /// Deepest visible view under `point`, given in the coordinate space of `root`'s parent.
    pub fn hit_test(&self, root: ViewId, point: Vec2) -> Option<ViewId> {
        let view = self.views.get(&root)?;
        if view.style.hidden || !view.frame.contains(point) {
            return None;
        }
        let local = point - view.frame.origin;
        view.subviews
            .iter()
            .rev()
            .find_map(|child| self.hit_test(*child, local))
            .or(Some(root))
    }

    /// First interactive view from `view` up to, but excluding, `boundary`.
    pub fn interactive_ancestor(&self, view: ViewId, boundary: ViewId) -> Option<ViewId> {
        std::iter::once(view)
            .chain(self.ancestors(view))
            .take_while(|id| *id != boundary)
            .find(|id| self.views.get(id).is_some_and(View::is_interactive))
    }

    pub fn find_by_data_id(&self, data_id: &str) -> Option<ViewId> {
        self.views
            .values()
            .filter(|view| view.style.data_id.as_deref() == Some(data_id))
            .map(|view| view.id)
            .min()
    }
}

impl Default for LayoutTree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LayoutTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutTree")
            .field("views", &self.views.len())
            .field("layout_nodes", &self.taffy.total_node_count())
            .field("next_id", &self.next_id)
            .finish()
    }
}
