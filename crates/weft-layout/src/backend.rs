// crates/weft-layout/src/backend.rs
use glam::Vec2;
use weft_core::{Frame, ViewId, ViewKind, VisualStyle};

/// One step of an animated list update, expressed in row indices.
///
/// Deletions refer to positions in the previous snapshot, insertions to the next one, and a
/// move carries both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOp {
    Delete { index: usize },
    Insert { index: usize },
    Move { from: usize, to: usize },
}

/// Native view primitives. The layout tree keeps its own retained copy of every view and
/// reports each structural or geometric change here, so a platform layer can mirror it.
pub trait ViewBackend {
    fn view_created(&mut self, _view: ViewId, _kind: &ViewKind) {}

    fn style_applied(&mut self, _view: ViewId, _style: &VisualStyle) {}

    fn subview_added(&mut self, _parent: ViewId, _child: ViewId) {}

    fn frame_applied(&mut self, _view: ViewId, _frame: Frame) {}

    fn content_size_applied(&mut self, _view: ViewId, _size: Vec2) {}

    fn view_released(&mut self, _view: ViewId) {}

    fn batch_update(&mut self, _list: ViewId, _ops: &[BatchOp], _animated: bool) {}
}

/// Headless backend; the retained view tree is the only output.
#[derive(Debug, Default)]
pub struct NoopBackend;

impl ViewBackend for NoopBackend {}
