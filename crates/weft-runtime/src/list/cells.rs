// crates/weft-runtime/src/list/cells.rs
//! List refresh, cell materialization and list input, driven by the renderer.

use glam::Vec2;
use tracing::{debug, warn};
use weft_core::{LayoutStyle, Node, NodeKind, Value, ViewId, ViewKind, VisualStyle};

use super::{diff_ids, project_items, Cell, ListView};
use crate::event_system::EventOutcome;
use crate::reconciler::Renderer;
use crate::scope::Binding;

/// Row content when neither the item's template nor the default template exists.
fn fallback_cell(row: usize) -> Node {
    Node::new(NodeKind::Text)
        .attr("text", format!("Item {} (Default)", row))
        .attr("backgroundColor", "systemBlue")
        .attr("color", "white")
        .attr("padding", "10")
        .attr("flex", "1")
}

impl Renderer {
    /// Re-reads the data source of every list and ends any pull-to-refresh in progress.
    pub fn refresh_lists(&mut self) {
        self.pending_lists.clear();
        let lists: Vec<ViewId> = self.lists.keys().copied().collect();
        for list in lists {
            if let Some(entry) = self.lists.get_mut(&list) {
                entry.refreshing = false;
            }
            self.refresh_list(list);
        }
    }

    pub(crate) fn flush_pending_lists(&mut self) {
        loop {
            let pending = std::mem::take(&mut self.pending_lists);
            if pending.is_empty() {
                return;
            }
            for list in pending {
                self.refresh_list(list);
            }
        }
    }

    /// Re-evaluates the list's data source, reports the keyed diff to the backend and
    /// re-materializes the visible rows.
    pub fn refresh_list(&mut self, list_id: ViewId) {
        let Some(mut list) = self.lists.remove(&list_id) else {
            return;
        };

        let payloads = match &list.data_expr {
            Some(expr) => match self.engine.evaluate(expr, &list.scope) {
                Value::List(items) => items,
                Value::Undefined | Value::Null => {
                    debug!("List {} data '{}' is empty", list_id, expr);
                    Vec::new()
                }
                other => {
                    warn!(
                        "List {} data '{}' is a {}, not a list",
                        list_id,
                        expr,
                        other.type_name()
                    );
                    Vec::new()
                }
            },
            None => {
                debug!("List {} has no data source", list_id);
                Vec::new()
            }
        };
        list.data_path = list
            .data_expr
            .as_deref()
            .and_then(|expr| list.scope.locate(expr));

        let next = project_items(&payloads, &list.default_template_type);
        let previous_ids: Vec<&str> = list.items.iter().map(|item| item.id.as_str()).collect();
        let next_ids: Vec<&str> = next.iter().map(|item| item.id.as_str()).collect();
        let diff = diff_ids(&previous_ids, &next_ids);
        if !diff.is_empty() {
            let animated = !list.items.is_empty();
            self.tree
                .backend_mut()
                .batch_update(list_id, &diff.batch_ops(), animated);
        }
        debug!(
            "List {}: {} rows (-{} +{} ~{})",
            list_id,
            next.len(),
            diff.removals.len(),
            diff.insertions.len(),
            diff.moves.len()
        );
        list.items = next;
        list.last_diff = diff;

        let rows: Vec<usize> = list.cells.keys().copied().collect();
        for row in rows {
            self.recycle_cell(&mut list, row);
        }
        self.layout_list(&mut list);
        self.lists.insert(list_id, list);
    }

    fn list_bounds(&self, list: &ListView) -> Vec2 {
        self.tree
            .view(list.view)
            .map(|view| view.frame.size)
            .unwrap_or(Vec2::ZERO)
    }

    /// Updates the scroll extent and brings the materialized rows in line with the viewport.
    fn layout_list(&mut self, list: &mut ListView) {
        let bounds = self.list_bounds(list);
        self.tree
            .set_content_size(list.view, list.content_size(bounds));
        list.clamp_offset(bounds);

        let visible = list.visible_rows(bounds);
        let hidden: Vec<usize> = list
            .cells
            .keys()
            .copied()
            .filter(|row| !visible.contains(row))
            .collect();
        for row in hidden {
            self.recycle_cell(list, row);
        }
        for row in visible {
            if !list.cells.contains_key(&row) {
                self.materialize_row(list, row, bounds);
            }
        }
    }

    fn materialize_row(&mut self, list: &mut ListView, row: usize, bounds: Vec2) {
        let Some(item) = list.items.get(row).cloned() else {
            return;
        };
        let frame = list.slot_frame(row, bounds);

        let root = match list.take_reusable(&item.template_type) {
            Some(root) => root,
            None => match self.tree.create_view(
                ViewKind::Cell,
                &LayoutStyle::default(),
                VisualStyle::default(),
            ) {
                Ok(root) => root,
                Err(err) => {
                    warn!("Could not create a cell for list {}: {}", list.view, err);
                    return;
                }
            },
        };

        let binding = match &list.data_path {
            Some(path) => Binding::Path(path.clone().index(item.index)),
            None => Binding::Value(item.data.clone()),
        };
        let scope = list.scope.detached([
            ("item", binding),
            ("index", Binding::Value(Value::from(item.index))),
        ]);

        let content = match list.template(&item.template_type) {
            Some(template) => template.children.clone(),
            None => {
                debug!(
                    "List {} has no template '{}'; using the default cell",
                    list.view, item.template_type
                );
                vec![fallback_cell(row)]
            }
        };
        for node in &content {
            for view in self.render(node, &scope) {
                self.attach(view, root);
            }
        }

        if let Err(err) = self.tree.calculate_layout(root, frame.size.x, frame.size.y) {
            warn!("Cell layout failed in list {}: {}", list.view, err);
        }
        self.tree.set_frame_origin(root, frame.origin);

        list.cells.insert(
            row,
            Cell {
                root,
                template_type: item.template_type,
                item_id: item.id,
                scope,
            },
        );
        self.flush_pending_lists();
    }

    /// Empties a cell and parks its root in the reuse pool.
    fn recycle_cell(&mut self, list: &mut ListView, row: usize) {
        if let Some(cell) = list.cells.remove(&row) {
            self.release_subviews(cell.root);
            list.pool(cell.template_type, cell.root);
        }
    }

    pub(crate) fn release_list_cells(&mut self, list: &ListView) {
        for root in list.cell_roots() {
            let doomed = self.tree.descendants(root);
            if let Err(err) = self.tree.remove_subtree(root) {
                warn!("Could not release cell {}: {}", root, err);
            }
            self.forget(&doomed);
        }
    }

    /// Row selection, unless the tap lands on an interactive view inside the row.
    pub(crate) fn tap_list(&mut self, list_id: ViewId, point: Vec2) -> EventOutcome {
        let Some(list) = self.lists.get(&list_id) else {
            return EventOutcome::Ignored;
        };
        let content_point = list.to_content(point);
        let hit = list.cells.iter().find(|(_, cell)| {
            self.tree
                .view(cell.root)
                .is_some_and(|view| view.frame.contains(content_point))
        });
        let Some((&row, cell)) = hit else {
            return EventOutcome::Ignored;
        };

        let control = self
            .tree
            .hit_test(cell.root, content_point)
            .and_then(|view| self.tree.interactive_ancestor(view, cell.root));
        if let Some(view) = control {
            debug!("Tap on view {} in list {} row {}", view, list_id, row);
            return EventOutcome::ControlHit {
                list: list_id,
                view,
            };
        }

        if let Some(handler) = list.on_item_click.clone() {
            let scope = cell.scope.clone();
            self.engine.evaluate(&handler, &scope);
        }
        EventOutcome::RowSelected {
            list: list_id,
            index: row,
        }
    }

    pub(crate) fn scroll_list(&mut self, view: ViewId, offset: f32) -> EventOutcome {
        let Some(mut list) = self.lists.remove(&view) else {
            debug!("Scroll on view {} has no list behind it", view);
            return EventOutcome::Ignored;
        };
        list.offset = offset;
        self.layout_list(&mut list);
        self.lists.insert(view, list);
        EventOutcome::Handled
    }

    /// Runs `onRefresh` in the root scope.
    pub(crate) fn pull_to_refresh(&mut self, list_id: ViewId) -> EventOutcome {
        let Some(list) = self.lists.get_mut(&list_id) else {
            return EventOutcome::Ignored;
        };
        let Some(handler) = list.on_refresh.clone() else {
            list.refreshing = false;
            return EventOutcome::Ignored;
        };
        list.refreshing = true;
        let scope = list.scope.root_scope();
        self.engine.evaluate(&handler, &scope);
        EventOutcome::Handled
    }
}
