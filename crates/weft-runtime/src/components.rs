// crates/weft-runtime/src/components.rs
//! Custom view kinds addressed by tag name.

use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;
use weft_core::{color_or_black, parse_number, Attributes, Dimension, LayoutStyle, VisualStyle};

/// A native view kind that templates can instantiate by tag.
///
/// Components receive the node's resolved attributes once, right after their view is
/// created. Their children render and attach like any container's; `template` children are
/// handed to the component only when it accepts them.
pub trait Component {
    fn apply_attributes(&self, style: &mut VisualStyle, attributes: &Attributes);

    fn adjust_layout(&self, _layout: &mut LayoutStyle, _attributes: &Attributes) {}

    fn accepts_templates(&self) -> bool {
        false
    }
}

/// Tag names are matched case-insensitively.
#[derive(Default)]
pub struct ComponentRegistry {
    components: HashMap<String, Rc<dyn Component>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the components every screen gets.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("circle", CircleComponent);
        registry
    }

    pub fn register(&mut self, tag: &str, component: impl Component + 'static) {
        debug!("Registered component <{}>", tag);
        self.components
            .insert(tag.to_ascii_lowercase(), Rc::new(component));
    }

    pub fn get(&self, tag: &str) -> Option<Rc<dyn Component>> {
        self.components.get(&tag.to_ascii_lowercase()).cloned()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.components.contains_key(&tag.to_ascii_lowercase())
    }

    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.components.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }
}

/// Filled circle: `<circle color="red" size="24"/>`.
pub struct CircleComponent;

impl Component for CircleComponent {
    fn apply_attributes(&self, style: &mut VisualStyle, attributes: &Attributes) {
        if let Some(color) = attributes.get("color") {
            style.background_color = Some(color_or_black(color));
        }
        if let Some(size) = attributes.get("size").and_then(|s| parse_number(s)) {
            style.corner_radius = size / 2.0;
        }
    }

    fn adjust_layout(&self, layout: &mut LayoutStyle, attributes: &Attributes) {
        if let Some(size) = attributes.get("size").and_then(|s| parse_number(s)) {
            layout.width = Dimension::Points(size);
            layout.height = Dimension::Points(size);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case() {
        let registry = ComponentRegistry::with_builtins();
        assert!(registry.contains("Circle"));
        assert!(registry.get("CIRCLE").is_some());
        assert!(registry.get("badge").is_none());
        assert_eq!(registry.tags(), vec!["circle"]);
    }

    #[test]
    fn circle_sizes_itself() {
        let attributes: Attributes = [("color", "#ff0000"), ("size", "24")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut style = VisualStyle::default();
        let mut layout = LayoutStyle::default();
        CircleComponent.apply_attributes(&mut style, &attributes);
        CircleComponent.adjust_layout(&mut layout, &attributes);

        assert_eq!(style.corner_radius, 12.0);
        assert_eq!(style.background_color, Some(glam::Vec4::new(1.0, 0.0, 0.0, 1.0)));
        assert_eq!(layout.width, Dimension::Points(24.0));
    }
}
