// crates/weft-runtime/src/lib.rs
//! Data-bound template rendering.
//!
//! A [`Screen`] ties a template tree to a shared view-model: it renders views through the
//! [`Renderer`], routes UI events back into expressions, and applies the re-render requests
//! those expressions post through the `render()` and `reloadLists()` host functions.

use std::rc::Rc;

use glam::Vec2;
use tracing::{debug, info, warn};
use weft_core::{CoreError, Node, Value, ViewId};
use weft_layout::{LayoutError, LayoutTree};

pub mod components;
pub mod config;
pub mod event_system;
pub mod list;
pub mod reconciler;
pub mod scope;
pub mod script;
pub mod template_engine;

pub use components::*;
pub use config::RenderConfig;
pub use event_system::*;
pub use list::{ListItem, ListView};
pub use reconciler::*;
pub use scope::*;
pub use script::{BuiltinEvaluator, EvalError, ExpressionEvaluator, HostFunction};
pub use template_engine::*;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Template(#[from] CoreError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error("Template rendered no views")]
    Empty,

    #[error("Screen has not been rendered yet")]
    NotRendered,
}

pub type Result<T> = std::result::Result<T, RenderError>;

pub struct Screen {
    template: Node,
    model: SharedModel,
    scope: Scope,
    renderer: Renderer,
    requests: RenderRequestQueue,
    events: EventSystem,
    viewport: Option<Vec2>,
    root: Option<ViewId>,
}

impl Screen {
    /// Screen with the built-in expression evaluator and default configuration.
    pub fn new(template: Node, model: Value) -> Self {
        Self::with_evaluator(
            template,
            model,
            RenderConfig::default(),
            Box::new(BuiltinEvaluator::new()),
        )
    }

    pub fn from_json(template: &str, model: Value) -> Result<Self> {
        Ok(Self::new(Node::from_json(template)?, model))
    }

    pub fn with_evaluator(
        template: Node,
        model: Value,
        config: RenderConfig,
        evaluator: Box<dyn ExpressionEvaluator>,
    ) -> Self {
        let model = shared_model(model);
        let scope = Scope::root(model.clone(), config.model_alias.clone());
        let requests = RenderRequestQueue::new();

        let mut engine = TemplateEngine::new(evaluator);
        for (name, request) in [
            ("render", RenderRequest::Full),
            ("reloadLists", RenderRequest::Lists),
        ] {
            let sender = requests.sender();
            let registered = engine.register_function(
                name,
                Rc::new(move |_: &[Value], _: &Scope| -> std::result::Result<Value, EvalError> {
                    if !sender.request(request) {
                        debug!("Render request {:?} dropped", request);
                    }
                    Ok(Value::Undefined)
                }),
            );
            if !registered {
                warn!("Evaluator does not support host functions; {}() is unavailable", name);
            }
        }

        Self {
            template,
            model,
            scope,
            renderer: Renderer::new(engine, config),
            requests,
            events: EventSystem::new(),
            viewport: None,
            root: None,
        }
    }

    /// Full pass: cleanup, render, layout, list refresh.
    pub fn render(&mut self, width: f32, height: f32) -> Result<ViewId> {
        self.viewport = Some(Vec2::new(width, height));
        self.root = self
            .renderer
            .render_root(&self.template, &self.scope, width, height);
        info!(
            "Rendered {} views at {}x{}",
            self.renderer.tree().len(),
            width,
            height
        );
        self.root.ok_or(RenderError::Empty)
    }

    /// Lays the current tree out again at a new size without re-rendering it.
    pub fn resize(&mut self, width: f32, height: f32) -> Result<()> {
        let root = self.root.ok_or(RenderError::NotRendered)?;
        self.viewport = Some(Vec2::new(width, height));
        self.renderer.tree_mut().calculate_layout(root, width, height)?;
        self.renderer.refresh_lists();
        Ok(())
    }

    /// Dispatches `event` immediately, then applies any render requests it posted.
    pub fn handle_event(&mut self, event: UIEvent) -> EventOutcome {
        let outcome = self.renderer.dispatch(event);
        self.process_render_requests();
        outcome
    }

    pub fn queue_event(&mut self, event: UIEvent) {
        self.events.queue_event(event);
    }

    /// Dispatches queued events in order.
    pub fn update(&mut self) -> Vec<EventOutcome> {
        let outcomes = self
            .events
            .drain()
            .into_iter()
            .map(|event| self.renderer.dispatch(event))
            .collect();
        self.process_render_requests();
        outcomes
    }

    /// Applies the strongest pending request. Returns what was done, if anything.
    pub fn process_render_requests(&mut self) -> Option<RenderRequest> {
        let request = self.requests.take()?;
        match (request, self.viewport) {
            (RenderRequest::Full, Some(size)) => {
                debug!("Full re-render requested");
                if let Err(err) = self.render(size.x, size.y) {
                    warn!("Re-render failed: {}", err);
                }
            }
            (RenderRequest::Lists, Some(_)) => {
                debug!("List reload requested");
                self.renderer.refresh_lists();
            }
            (_, None) => {
                debug!("{:?} requested before the first render; ignored", request);
                return None;
            }
        }
        Some(request)
    }

    /// Evaluates `expr` at the root scope, surfacing errors.
    pub fn execute(&self, expr: &str) -> Result<Value> {
        Ok(self.renderer.engine().try_evaluate(expr, &self.scope)?)
    }

    /// Evaluates `expr` at the root scope; failures read as `undefined`.
    pub fn evaluate(&self, expr: &str) -> Value {
        self.renderer.engine().evaluate(expr, &self.scope)
    }

    /// View whose `id` attribute is `data_id`.
    pub fn find_view(&self, data_id: &str) -> Option<ViewId> {
        self.renderer.tree().find_by_data_id(data_id)
    }

    pub fn model(&self) -> SharedModel {
        self.model.clone()
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut Renderer {
        &mut self.renderer
    }

    pub fn tree(&self) -> &LayoutTree {
        self.renderer.tree()
    }

    pub fn root(&self) -> Option<ViewId> {
        self.root
    }

    pub fn viewport(&self) -> Option<Vec2> {
        self.viewport
    }

    pub fn pending_events(&self) -> usize {
        self.events.pending()
    }
}

impl std::fmt::Debug for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Screen")
            .field("template", &self.template.kind)
            .field("root", &self.root)
            .field("viewport", &self.viewport)
            .field("renderer", &self.renderer)
            .finish()
    }
}
