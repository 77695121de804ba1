// crates/weft-runtime/src/config.rs
use glam::Vec4;
use weft_core::DEFAULT_FONT_SIZE;

/// Renderer-wide defaults. Template attributes override the list settings per list.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub default_font_size: f32,
    /// Main-axis size of a list slot.
    pub list_item_extent: f32,
    pub list_item_spacing: f32,
    pub default_template_type: String,
    /// Name under which the whole view-model is reachable from expressions.
    pub model_alias: String,
    /// Background of views standing in for ones that failed to render.
    pub fallback_color: Vec4,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            default_font_size: DEFAULT_FONT_SIZE,
            list_item_extent: 80.0,
            list_item_spacing: 10.0,
            default_template_type: "item".to_string(),
            model_alias: "viewModel".to_string(),
            fallback_color: Vec4::new(1.0, 0.0, 0.0, 0.3),
        }
    }
}
