// crates/weft-runtime/src/reconciler.rs
//! Turns template nodes into views.
//!
//! Rendering is a pure function of (node, scope): conditions prune, repeats expand, attributes
//! are interpolated, and every produced view is registered with the layout tree. Event
//! handlers capture the scope they were rendered under so that a tap inside the third row of
//! a repeat still sees `item` and `index` of that row.

use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use glam::Vec2;
use tracing::{debug, error, info, warn};
use weft_core::{
    Attributes, ControlValue, Dimension, EventKind, LayoutStyle, Node, NodeKind, RepeatSpec, Value,
    ViewId, ViewKind, VisualStyle, BLACK,
};
use weft_layout::{CleanupReport, LayoutTree, NoopBackend, ViewBackend};

use crate::components::{Component, ComponentRegistry};
use crate::config::RenderConfig;
use crate::event_system::{EventOutcome, UIEvent};
use crate::list::ListView;
use crate::scope::{Binding, Scope};
use crate::template_engine::{sole_binding, TemplateEngine};

/// Handlers of one view plus the scope they run in.
#[derive(Debug, Clone)]
pub struct EventBinding {
    pub scope: Scope,
    pub on_click: Option<String>,
    pub on_change: Option<String>,
    /// Path expression written back on change, from a `{{path}}`-only value attribute.
    pub two_way: Option<String>,
}

pub struct Renderer {
    pub(crate) tree: LayoutTree,
    pub(crate) engine: TemplateEngine,
    components: ComponentRegistry,
    pub(crate) config: RenderConfig,
    pub(crate) bindings: HashMap<ViewId, EventBinding>,
    pub(crate) lists: BTreeMap<ViewId, ListView>,
    component_templates: HashMap<ViewId, Vec<Node>>,
    /// Views currently accepting `template` children, innermost last.
    consumers: Vec<ViewId>,
    /// Lists created since the last refresh; filled once their frames are known.
    pub(crate) pending_lists: Vec<ViewId>,
}

impl Renderer {
    pub fn new(engine: TemplateEngine, config: RenderConfig) -> Self {
        Self::with_backend(engine, config, Box::new(NoopBackend))
    }

    pub fn with_backend(
        engine: TemplateEngine,
        config: RenderConfig,
        backend: Box<dyn ViewBackend>,
    ) -> Self {
        Self {
            tree: LayoutTree::with_backend(backend),
            engine,
            components: ComponentRegistry::with_builtins(),
            config,
            bindings: HashMap::new(),
            lists: BTreeMap::new(),
            component_templates: HashMap::new(),
            consumers: Vec::new(),
            pending_lists: Vec::new(),
        }
    }

    pub fn tree(&self) -> &LayoutTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut LayoutTree {
        &mut self.tree
    }

    pub fn engine(&self) -> &TemplateEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut TemplateEngine {
        &mut self.engine
    }

    pub fn components_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.components
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn binding(&self, view: ViewId) -> Option<&EventBinding> {
        self.bindings.get(&view)
    }

    pub fn list(&self, view: ViewId) -> Option<&ListView> {
        self.lists.get(&view)
    }

    pub fn lists(&self) -> impl Iterator<Item = &ListView> {
        self.lists.values()
    }

    /// Templates handed to a custom component.
    pub fn component_templates(&self, view: ViewId) -> &[Node] {
        self.component_templates
            .get(&view)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Renders `node` under `scope`. Returns zero views when the condition is false, one per
    /// item for a repeat, one otherwise. The views are detached; the caller attaches them.
    pub fn render(&mut self, node: &Node, scope: &Scope) -> Vec<ViewId> {
        if !self.condition_holds(node, scope) {
            return Vec::new();
        }
        match &node.repeat {
            Some(spec) => self.render_repeat(node, spec, scope),
            None => self.render_single(node, scope).into_iter().collect(),
        }
    }

    /// Full pass: release the previous tree, render, lay out at the given size and fill lists.
    pub fn render_root(
        &mut self,
        node: &Node,
        scope: &Scope,
        width: f32,
        height: f32,
    ) -> Option<ViewId> {
        let report = self.cleanup();
        debug!("Released {} layout nodes before render", report.freed);

        let views = self.render(node, scope);
        let root = match views.as_slice() {
            [] => {
                info!("Template rendered no views");
                return None;
            }
            [single] => *single,
            many => {
                let wrapper = self.create_wrapper()?;
                for view in many {
                    self.attach(*view, wrapper);
                }
                wrapper
            }
        };

        if let Err(err) = self.tree.calculate_layout(root, width, height) {
            error!("Layout failed: {}", err);
        }
        self.flush_pending_lists();
        Some(root)
    }

    /// Releases every view and layout node. Safe to call repeatedly.
    pub fn cleanup(&mut self) -> CleanupReport {
        self.bindings.clear();
        self.lists.clear();
        self.component_templates.clear();
        self.consumers.clear();
        self.pending_lists.clear();
        self.tree.cleanup()
    }

    fn condition_holds(&self, node: &Node, scope: &Scope) -> bool {
        match &node.condition {
            Some(condition) => {
                let expr = sole_binding(condition).unwrap_or(condition);
                self.engine.is_truthy(expr, scope)
            }
            None => true,
        }
    }

    fn render_repeat(&mut self, node: &Node, spec: &RepeatSpec, scope: &Scope) -> Vec<ViewId> {
        let list_expr = sole_binding(&spec.list_expr).unwrap_or(&spec.list_expr);
        let items = match self.engine.evaluate(list_expr, scope) {
            Value::List(items) => items,
            other => {
                warn!(
                    "Repeat '{}' in <{}> is a {}, not a list; rendering nothing",
                    list_expr,
                    node.kind,
                    other.type_name()
                );
                return Vec::new();
            }
        };
        let base = scope.locate(list_expr);

        let mut views = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let binding = match &base {
                Some(path) => Binding::Path(path.clone().index(index)),
                None => Binding::Value(item),
            };
            let item_scope = scope.child([
                (spec.item_name.clone(), binding),
                ("index".to_string(), Binding::Value(Value::from(index))),
            ]);
            if self.condition_holds(node, &item_scope) {
                views.extend(self.render_single(node, &item_scope));
            }
        }
        views
    }

    fn render_single(&mut self, node: &Node, scope: &Scope) -> Option<ViewId> {
        if node.is_template() {
            warn!("<template> outside of a list or template-consuming component; skipping");
            return None;
        }

        let attributes = self.engine.resolve_attributes(&node.attributes, scope);
        let mut layout = LayoutStyle::from_attributes(&attributes);
        let mut style =
            VisualStyle::from_attributes(&node.kind, &attributes, self.config.default_font_size);

        let component = match &node.kind {
            NodeKind::Custom(tag) => match self.components.get(tag) {
                Some(component) => {
                    component.adjust_layout(&mut layout, &attributes);
                    component.apply_attributes(&mut style, &attributes);
                    Some(component)
                }
                None => {
                    warn!("Unknown component <{}>", tag);
                    return self.fallback_view(format!("Unknown component <{}>", tag), &layout);
                }
            },
            _ => None,
        };

        let kind = ViewKind::from_node_kind(&node.kind);
        let view = match self.tree.create_view(kind.clone(), &layout, style) {
            Ok(view) => view,
            Err(err) => {
                error!("Could not create <{}>: {}", node.kind, err);
                return self.fallback_view(format!("<{}> failed: {}", node.kind, err), &layout);
            }
        };

        self.bind_events(view, &kind, node, &attributes, scope);
        if kind == ViewKind::List {
            let list = ListView::from_attributes(
                view,
                &node.attributes,
                &attributes,
                scope.clone(),
                &self.config,
            );
            self.lists.insert(view, list);
            self.pending_lists.push(view);
        }

        self.render_children(view, &kind, component.as_ref(), node, scope);
        Some(view)
    }

    fn render_children(
        &mut self,
        view: ViewId,
        kind: &ViewKind,
        component: Option<&Rc<dyn Component>>,
        node: &Node,
        scope: &Scope,
    ) {
        let is_list = *kind == ViewKind::List;
        let consumes = is_list || component.is_some_and(|c| c.accepts_templates());

        if consumes {
            self.consumers.push(view);
        }
        for child in &node.children {
            if child.is_template() {
                self.register_template(child);
            } else if is_list {
                debug!("<{}> ignores its <{}> child", node.kind, child.kind);
            } else {
                for child_view in self.render(child, scope) {
                    self.attach(child_view, view);
                }
            }
        }
        if consumes {
            self.consumers.pop();
        }
    }

    fn register_template(&mut self, template: &Node) {
        let Some(&consumer) = self.consumers.last() else {
            warn!("<template> outside of a list or template-consuming component; skipping");
            return;
        };
        let declared = ["type", "name", "templateType"]
            .iter()
            .find_map(|key| template.attribute(key))
            .map(str::to_string);

        match self.lists.get_mut(&consumer) {
            Some(list) => {
                let template_type =
                    declared.unwrap_or_else(|| list.default_template_type.clone());
                list.register_template(template_type, template.clone());
            }
            None => self
                .component_templates
                .entry(consumer)
                .or_default()
                .push(template.clone()),
        }
    }

    fn bind_events(
        &mut self,
        view: ViewId,
        kind: &ViewKind,
        node: &Node,
        attributes: &Attributes,
        scope: &Scope,
    ) {
        let handler = |event: EventKind| {
            let name = event.attribute();
            attributes
                .get(name)
                .or_else(|| attributes.get(&name.to_ascii_lowercase()))
                .filter(|source| !source.trim().is_empty())
                .cloned()
        };
        let value_attribute = match kind {
            ViewKind::Input => Some("text"),
            ViewKind::Switch | ViewKind::Slider => Some("value"),
            _ => None,
        };
        let binding = EventBinding {
            scope: scope.clone(),
            on_click: handler(EventKind::Click),
            on_change: handler(EventKind::Change),
            two_way: value_attribute
                .and_then(|key| node.attribute(key))
                .and_then(sole_binding)
                .map(str::to_string),
        };
        if binding.on_click.is_some() || binding.on_change.is_some() || binding.two_way.is_some() {
            self.bindings.insert(view, binding);
        }
    }

    pub(crate) fn attach(&mut self, child: ViewId, parent: ViewId) {
        if let Err(err) = self.tree.attach(child, parent) {
            error!("Could not attach view {} to {}: {}", child, parent, err);
        }
    }

    fn create_wrapper(&mut self) -> Option<ViewId> {
        match self
            .tree
            .create_view(ViewKind::Container, &LayoutStyle::default(), VisualStyle::default())
        {
            Ok(view) => Some(view),
            Err(err) => {
                error!("Could not create root container: {}", err);
                None
            }
        }
    }

    /// Placeholder for a node that could not be rendered; `None` if even that fails.
    fn fallback_view(&mut self, reason: String, layout: &LayoutStyle) -> Option<ViewId> {
        let mut layout = layout.clone();
        if !layout.height.is_defined() {
            layout.min_height = Dimension::Points(44.0);
        }
        let style = VisualStyle {
            background_color: Some(self.config.fallback_color),
            text_color: BLACK,
            text: Some(reason),
            ..VisualStyle::default()
        };
        match self.tree.create_view(ViewKind::Fallback, &layout, style) {
            Ok(view) => Some(view),
            Err(err) => {
                error!("Fallback view failed too: {}", err);
                None
            }
        }
    }

    /// Drops renderer state for views that were just freed.
    pub(crate) fn forget(&mut self, views: &[ViewId]) {
        for view in views {
            self.bindings.remove(view);
            self.component_templates.remove(view);
            if let Some(list) = self.lists.remove(view) {
                self.release_list_cells(&list);
            }
        }
        self.pending_lists.retain(|id| !views.contains(id));
    }

    /// Frees every subview of `view` and forgets them.
    pub(crate) fn release_subviews(&mut self, view: ViewId) {
        let doomed = self.tree.descendants(view);
        if let Err(err) = self.tree.clear_subviews(view) {
            warn!("Could not clear view {}: {}", view, err);
        }
        self.forget(&doomed);
    }

    pub fn dispatch(&mut self, event: UIEvent) -> EventOutcome {
        let target = event.target();
        if !self.tree.contains(target) {
            debug!("Event for released view {} ignored", target);
            return EventOutcome::Ignored;
        }

        match event {
            UIEvent::Clicked(view) => self.click(view),
            UIEvent::ListTapped { list, point } => self.tap_list(list, point),
            UIEvent::Scrolled { view, offset } => self.scroll_list(view, offset),
            UIEvent::PullToRefresh(list) => self.pull_to_refresh(list),
            change => match change.control_value() {
                Some(value) => self.change(target, value),
                None => EventOutcome::Ignored,
            },
        }
    }

    fn click(&mut self, view: ViewId) -> EventOutcome {
        let Some(binding) = self.bindings.get(&view) else {
            return EventOutcome::Ignored;
        };
        let Some(handler) = binding.on_click.clone() else {
            return EventOutcome::Ignored;
        };
        let scope = binding.scope.clone();
        debug!("Click on view {}: {}", view, handler);
        self.engine.evaluate(&handler, &scope);
        EventOutcome::Handled
    }

    /// Stores the new value on the view, writes it back through a two-way binding, then runs
    /// `onChange` with `value` bound.
    fn change(&mut self, view: ViewId, value: ControlValue) -> EventOutcome {
        let updated = self.tree.update_style(view, |style| {
            if let ControlValue::Text(text) = &value {
                style.text = Some(text.clone());
            }
            style.value = Some(value.clone());
        });
        if let Err(err) = updated {
            warn!("Could not update view {}: {}", view, err);
            return EventOutcome::Ignored;
        }

        let Some(binding) = self.bindings.get(&view).cloned() else {
            return EventOutcome::Handled;
        };
        if let Some(path) = &binding.two_way {
            let statement = format!("{} = {}", path, value.to_literal());
            self.engine.evaluate(&statement, &binding.scope);
        }
        if let Some(handler) = &binding.on_change {
            let scope = binding
                .scope
                .child([("value", Binding::Value(Value::from(&value)))]);
            self.engine.evaluate(handler, &scope);
        }
        EventOutcome::Handled
    }

    /// Origin of `view` in the coordinate space of its layout root's parent.
    pub fn absolute_origin(&self, view: ViewId) -> Vec2 {
        std::iter::once(view)
            .chain(self.tree.ancestors(view))
            .filter_map(|id| self.tree.view(id))
            .map(|entry| entry.frame.origin)
            .sum()
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("tree", &self.tree)
            .field("bindings", &self.bindings.len())
            .field("lists", &self.lists.len())
            .finish()
    }
}
