// crates/weft-core/src/view.rs
use bitflags::bitflags;
use glam::Vec2;

use crate::{NodeKind, VisualStyle};

pub type ViewId = u32;

/// Kind of a rendered view. Mirrors [`NodeKind`] plus the views the renderer creates itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ViewKind {
    Container,
    Text,
    Button,
    Image,
    Input,
    Scroll,
    Switch,
    Slider,
    List,
    Custom(String),
    /// Root of one list slot.
    Cell,
    /// Stand-in for something that could not be rendered.
    Fallback,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ViewTraits: u8 {
        /// Handles its own touches; suppresses list row selection.
        const INTERACTIVE = 0b0000_0001;
        /// Leaf whose size comes from measuring its text.
        const TEXT_BEARING = 0b0000_0010;
        /// Content can extend past its bounds.
        const SCROLLS = 0b0000_0100;
        /// Accepts `template` children.
        const TEMPLATE_CONSUMER = 0b0000_1000;
    }
}

impl ViewKind {
    pub fn from_node_kind(kind: &NodeKind) -> Self {
        match kind {
            NodeKind::Container | NodeKind::Template => ViewKind::Container,
            NodeKind::Text => ViewKind::Text,
            NodeKind::Button => ViewKind::Button,
            NodeKind::Image => ViewKind::Image,
            NodeKind::Input => ViewKind::Input,
            NodeKind::Scroll => ViewKind::Scroll,
            NodeKind::Switch => ViewKind::Switch,
            NodeKind::Slider => ViewKind::Slider,
            NodeKind::List => ViewKind::List,
            NodeKind::Custom(name) => ViewKind::Custom(name.clone()),
        }
    }

    pub fn traits(&self) -> ViewTraits {
        match self {
            ViewKind::Text => ViewTraits::TEXT_BEARING,
            ViewKind::Button => ViewTraits::TEXT_BEARING | ViewTraits::INTERACTIVE,
            ViewKind::Input | ViewKind::Switch | ViewKind::Slider => ViewTraits::INTERACTIVE,
            ViewKind::Scroll => ViewTraits::SCROLLS,
            ViewKind::List => ViewTraits::SCROLLS | ViewTraits::TEMPLATE_CONSUMER,
            ViewKind::Container
            | ViewKind::Image
            | ViewKind::Custom(_)
            | ViewKind::Cell
            | ViewKind::Fallback => ViewTraits::empty(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ViewKind::Container => "container",
            ViewKind::Text => "text",
            ViewKind::Button => "button",
            ViewKind::Image => "image",
            ViewKind::Input => "input",
            ViewKind::Scroll => "scroll",
            ViewKind::Switch => "switch",
            ViewKind::Slider => "slider",
            ViewKind::List => "list",
            ViewKind::Custom(name) => name,
            ViewKind::Cell => "cell",
            ViewKind::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Frame {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Frame {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    pub fn max(&self) -> Vec2 {
        self.origin + self.size
    }

    /// `point` is in the same coordinate space as `origin`.
    pub fn contains(&self, point: Vec2) -> bool {
        let max = self.max();
        point.x >= self.origin.x && point.y >= self.origin.y && point.x < max.x && point.y < max.y
    }
}

/// One node of the rendered view hierarchy.
#[derive(Debug, Clone)]
pub struct View {
    pub id: ViewId,
    pub kind: ViewKind,
    pub style: VisualStyle,
    /// Relative to the parent view.
    pub frame: Frame,
    pub parent: Option<ViewId>,
    pub subviews: Vec<ViewId>,
    /// Scrollable extent; zero for views that do not scroll.
    pub content_size: Vec2,
}

impl View {
    pub fn new(id: ViewId, kind: ViewKind, style: VisualStyle) -> Self {
        Self {
            id,
            kind,
            style,
            frame: Frame::default(),
            parent: None,
            subviews: Vec::new(),
            content_size: Vec2::ZERO,
        }
    }

    pub fn traits(&self) -> ViewTraits {
        self.kind.traits()
    }

    pub fn is_interactive(&self) -> bool {
        self.traits().contains(ViewTraits::INTERACTIVE)
    }
}
