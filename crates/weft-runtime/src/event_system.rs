// crates/weft-runtime/src/event_system.rs
use std::sync::mpsc::{self, Receiver, Sender};

use glam::Vec2;
use weft_core::{ControlValue, ViewId};

/// Input delivered by the host platform.
#[derive(Debug, Clone, PartialEq)]
pub enum UIEvent {
    Clicked(ViewId),
    TextChanged(ViewId, String),
    Toggled(ViewId, bool),
    SliderChanged(ViewId, f64),
    /// A tap inside a list, in the list's visible coordinate space.
    ListTapped { list: ViewId, point: Vec2 },
    /// New content offset of a list along its scroll axis.
    Scrolled { view: ViewId, offset: f32 },
    PullToRefresh(ViewId),
}

impl UIEvent {
    pub fn target(&self) -> ViewId {
        match self {
            UIEvent::Clicked(view)
            | UIEvent::TextChanged(view, _)
            | UIEvent::Toggled(view, _)
            | UIEvent::SliderChanged(view, _)
            | UIEvent::PullToRefresh(view) => *view,
            UIEvent::ListTapped { list, .. } => *list,
            UIEvent::Scrolled { view, .. } => *view,
        }
    }

    /// The new control value carried by change events.
    pub fn control_value(&self) -> Option<ControlValue> {
        match self {
            UIEvent::TextChanged(_, text) => Some(ControlValue::Text(text.clone())),
            UIEvent::Toggled(_, on) => Some(ControlValue::Bool(*on)),
            UIEvent::SliderChanged(_, value) => Some(ControlValue::Number(*value)),
            _ => None,
        }
    }
}

/// What handling an event amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Ignored,
    Handled,
    /// A list row was tapped outside of any control.
    RowSelected { list: ViewId, index: usize },
    /// A list tap landed on an interactive view; row selection is suppressed.
    ControlHit { list: ViewId, view: ViewId },
}

#[derive(Debug, Default)]
pub struct EventSystem {
    event_queue: Vec<UIEvent>,
}

impl EventSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_event(&mut self, event: UIEvent) {
        self.event_queue.push(event);
    }

    pub fn drain(&mut self) -> Vec<UIEvent> {
        self.event_queue.drain(..).collect()
    }

    pub fn pending(&self) -> usize {
        self.event_queue.len()
    }
}

/// Re-render work requested from script code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RenderRequest {
    /// Refresh the data of every list without rebuilding the tree.
    Lists,
    /// Tear down and rebuild the whole view tree.
    Full,
}

/// Cloneable handle that host functions use to post render requests.
#[derive(Debug, Clone)]
pub struct RenderRequestSender(Sender<RenderRequest>);

impl RenderRequestSender {
    /// Returns `false` when the receiving screen is gone.
    pub fn request(&self, request: RenderRequest) -> bool {
        self.0.send(request).is_ok()
    }
}

#[derive(Debug)]
pub struct RenderRequestQueue {
    sender: Sender<RenderRequest>,
    receiver: Receiver<RenderRequest>,
}

impl RenderRequestQueue {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self { sender, receiver }
    }

    pub fn sender(&self) -> RenderRequestSender {
        RenderRequestSender(self.sender.clone())
    }

    /// Drains pending requests, collapsing them into the strongest one.
    pub fn take(&self) -> Option<RenderRequest> {
        self.receiver.try_iter().max()
    }
}

impl Default for RenderRequestQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_render_dominates_list_reloads() {
        let queue = RenderRequestQueue::new();
        let sender = queue.sender();
        assert_eq!(queue.take(), None);

        sender.request(RenderRequest::Lists);
        sender.request(RenderRequest::Full);
        sender.request(RenderRequest::Lists);
        assert_eq!(queue.take(), Some(RenderRequest::Full));
        assert_eq!(queue.take(), None);
    }

    #[test]
    fn queue_drains_in_order() {
        let mut events = EventSystem::new();
        events.queue_event(UIEvent::Clicked(1));
        events.queue_event(UIEvent::Toggled(2, true));
        assert_eq!(events.pending(), 2);
        let drained = events.drain();
        assert_eq!(drained[1].control_value(), Some(ControlValue::Bool(true)));
        assert_eq!(drained[0].target(), 1);
        assert_eq!(events.pending(), 0);
    }
}
