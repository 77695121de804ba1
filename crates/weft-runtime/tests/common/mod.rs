// crates/weft-runtime/tests/common/mod.rs
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use weft_core::{Node, Value, ViewId, ViewKind};
use weft_layout::{BatchOp, ViewBackend};
use weft_runtime::{
    shared_model, BuiltinEvaluator, RenderConfig, Renderer, Scope, TemplateEngine,
};

#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Created(ViewId, ViewKind),
    Released(ViewId),
    ContentSize(ViewId, Vec2),
    Batch {
        list: ViewId,
        ops: Vec<BatchOp>,
        animated: bool,
    },
}

/// Backend that logs what the layout tree asks of it.
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    calls: Rc<RefCell<Vec<BackendCall>>>,
}

impl RecordingBackend {
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.borrow().clone()
    }

    pub fn batches(&self) -> Vec<(Vec<BatchOp>, bool)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                BackendCall::Batch { ops, animated, .. } => Some((ops.clone(), *animated)),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl ViewBackend for RecordingBackend {
    fn view_created(&mut self, view: ViewId, kind: &ViewKind) {
        self.calls
            .borrow_mut()
            .push(BackendCall::Created(view, kind.clone()));
    }

    fn view_released(&mut self, view: ViewId) {
        self.calls.borrow_mut().push(BackendCall::Released(view));
    }

    fn content_size_applied(&mut self, view: ViewId, size: Vec2) {
        self.calls
            .borrow_mut()
            .push(BackendCall::ContentSize(view, size));
    }

    fn batch_update(&mut self, list: ViewId, ops: &[BatchOp], animated: bool) {
        self.calls.borrow_mut().push(BackendCall::Batch {
            list,
            ops: ops.to_vec(),
            animated,
        });
    }
}

pub fn renderer_with(backend: &RecordingBackend) -> Renderer {
    Renderer::with_backend(
        TemplateEngine::new(Box::new(BuiltinEvaluator::new())),
        RenderConfig::default(),
        Box::new(backend.clone()),
    )
}

pub fn root_scope(model: Value) -> Scope {
    Scope::root(shared_model(model), "viewModel")
}

pub fn item(id: &str, name: &str) -> Value {
    Value::map([("id", Value::from(id)), ("name", Value::from(name))])
}

/// Text content of `view`, if any.
pub fn text_of(renderer: &Renderer, view: ViewId) -> Option<String> {
    renderer.tree().view(view)?.style.text.clone()
}

/// A vertical list of `height` points fed from `items`, one template with a label and a
/// 60x40 button on the trailing edge.
pub fn list_screen(height: &str) -> Node {
    Node::tag("container").child(
        Node::tag("list")
            .attr("id", "list")
            .attr("height", height)
            .attr("data", "{{items}}")
            .attr("onItemClick", "selected = item.name")
            .attr("onRefresh", "refreshes = refreshes + 1")
            .child(
                Node::tag("template").child(
                    Node::tag("container")
                        .attr("flexDirection", "row")
                        .attr("height", "80")
                        .child(Node::tag("text").attr("flex", "1").attr("text", "{{item.name}}"))
                        .child(
                            Node::tag("button")
                                .attr("width", "60")
                                .attr("height", "40")
                                .attr("onClick", "pressed = item.name"),
                        ),
                ),
            ),
    )
}
