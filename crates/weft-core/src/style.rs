// crates/weft-core/src/style.rs
use std::collections::HashMap;

use glam::Vec4;

use crate::properties::*;
use crate::{Attributes, ControlValue, NodeKind};

pub const DEFAULT_FONT_SIZE: f32 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Edges<T> {
    pub top: T,
    pub right: T,
    pub bottom: T,
    pub left: T,
}

impl<T: Copy> Edges<T> {
    pub fn all(value: T) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

impl Edges<f32> {
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

/// Lower-cased view over an attribute bag so lookups ignore key case.
struct Lookup<'a> {
    entries: HashMap<String, &'a str>,
}

impl<'a> Lookup<'a> {
    fn new(attributes: &'a Attributes) -> Self {
        Self {
            entries: attributes
                .iter()
                .map(|(k, v)| (k.to_ascii_lowercase(), v.as_str()))
                .collect(),
        }
    }

    /// First present key among `keys` (already lower-case).
    fn get(&self, keys: &[&str]) -> Option<&'a str> {
        keys.iter().find_map(|key| self.entries.get(*key).copied())
    }

    fn dimension(&self, keys: &[&str]) -> Dimension {
        self.get(keys).map(parse_dimension).unwrap_or_default()
    }

    fn number(&self, keys: &[&str]) -> Option<f32> {
        self.get(keys).and_then(parse_number)
    }

    fn color(&self, keys: &[&str]) -> Option<Vec4> {
        self.get(keys).map(color_or_black)
    }

    fn text(&self, keys: &[&str]) -> Option<String> {
        self.get(keys).map(str::to_string)
    }
}

/// Flexbox properties of one layout node, independent of the layout engine.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutStyle {
    pub hidden_from_layout: bool,
    pub direction: FlexDirection,
    pub wrap: FlexWrap,
    pub justify_content: Option<Justify>,
    pub align_items: Option<Align>,
    pub align_self: Option<Align>,
    pub align_content: Option<Align>,
    pub flex_grow: f32,
    pub flex_shrink: f32,
    pub flex_basis: Dimension,
    pub width: Dimension,
    pub height: Dimension,
    pub min_width: Dimension,
    pub min_height: Dimension,
    pub max_width: Dimension,
    pub max_height: Dimension,
    pub padding: Edges<Dimension>,
    pub margin: Edges<Dimension>,
    pub inset: Edges<Dimension>,
    pub gap: Dimension,
    pub position: PositionType,
    pub aspect_ratio: Option<f32>,
}

impl Default for LayoutStyle {
    fn default() -> Self {
        Self {
            hidden_from_layout: false,
            direction: FlexDirection::Column,
            wrap: FlexWrap::NoWrap,
            justify_content: None,
            align_items: None,
            align_self: None,
            align_content: None,
            flex_grow: 0.0,
            flex_shrink: 0.0,
            flex_basis: Dimension::Auto,
            width: Dimension::Undefined,
            height: Dimension::Undefined,
            min_width: Dimension::Undefined,
            min_height: Dimension::Undefined,
            max_width: Dimension::Undefined,
            max_height: Dimension::Undefined,
            padding: Edges::default(),
            margin: Edges::default(),
            inset: Edges::default(),
            gap: Dimension::Undefined,
            position: PositionType::Relative,
            aspect_ratio: None,
        }
    }
}

impl LayoutStyle {
    pub fn from_attributes(attributes: &Attributes) -> Self {
        let attrs = Lookup::new(attributes);
        let mut style = LayoutStyle::default();

        if let Some(display) = attrs.get(&["display"]) {
            style.hidden_from_layout = display.trim().eq_ignore_ascii_case("none");
        }
        if let Some(direction) = attrs.get(&["flexdirection"]).and_then(parse_flex_direction) {
            style.direction = direction;
        }
        if let Some(wrap) = attrs.get(&["flexwrap"]).and_then(parse_flex_wrap) {
            style.wrap = wrap;
        }
        style.justify_content = attrs.get(&["justifycontent"]).and_then(parse_justify);
        style.align_items = attrs.get(&["alignitems"]).and_then(parse_align);
        style.align_self = attrs.get(&["alignself"]).and_then(parse_align);
        style.align_content = attrs.get(&["aligncontent"]).and_then(parse_align);

        // `flex: n` behaves like `flex: n 1 0`.
        if let Some(flex) = attrs.number(&["flex"]) {
            if flex > 0.0 {
                style.flex_grow = flex;
                style.flex_shrink = 1.0;
                style.flex_basis = Dimension::Points(0.0);
            }
        }
        if let Some(grow) = attrs.number(&["flexgrow"]) {
            style.flex_grow = grow;
        }
        if let Some(shrink) = attrs.number(&["flexshrink"]) {
            style.flex_shrink = shrink;
        }
        let basis = attrs.dimension(&["flexbasis"]);
        if basis.is_defined() {
            style.flex_basis = basis;
        }

        style.width = attrs.dimension(&["width"]);
        style.height = attrs.dimension(&["height"]);
        style.min_width = attrs.dimension(&["minwidth"]);
        style.min_height = attrs.dimension(&["minheight"]);
        style.max_width = attrs.dimension(&["maxwidth"]);
        style.max_height = attrs.dimension(&["maxheight"]);

        style.padding = box_edges(&attrs, "padding");
        style.margin = box_edges(&attrs, "margin");
        style.inset = Edges {
            top: attrs.dimension(&["top"]),
            right: attrs.dimension(&["right"]),
            bottom: attrs.dimension(&["bottom"]),
            left: attrs.dimension(&["left"]),
        };
        style.gap = attrs.dimension(&["gap"]);

        if let Some(position) = attrs.get(&["position"]).and_then(parse_position) {
            style.position = position;
        }
        style.aspect_ratio = attrs.number(&["aspectratio"]).filter(|ratio| *ratio > 0.0);

        style
    }
}

/// `padding`, then `paddingHorizontal`/`paddingVertical`, then per-side keys, later wins.
fn box_edges(attrs: &Lookup<'_>, prefix: &str) -> Edges<Dimension> {
    let mut edges = Edges::all(attrs.dimension(&[prefix]));

    let horizontal = attrs.dimension(&[format!("{prefix}horizontal").as_str()]);
    if horizontal.is_defined() {
        edges.left = horizontal;
        edges.right = horizontal;
    }
    let vertical = attrs.dimension(&[format!("{prefix}vertical").as_str()]);
    if vertical.is_defined() {
        edges.top = vertical;
        edges.bottom = vertical;
    }

    for (side, slot) in [
        ("top", &mut edges.top),
        ("right", &mut edges.right),
        ("bottom", &mut edges.bottom),
        ("left", &mut edges.left),
    ] {
        let value = attrs.dimension(&[format!("{prefix}{side}").as_str()]);
        if value.is_defined() {
            *slot = value;
        }
    }
    edges
}

/// Presentation properties of a view.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualStyle {
    pub background_color: Option<Vec4>,
    pub corner_radius: f32,
    pub border_width: f32,
    pub border_color: Option<Vec4>,
    pub border_style: Option<String>,
    pub opacity: f32,
    pub hidden: bool,

    pub text: Option<String>,
    pub text_color: Vec4,
    pub font_size: f32,
    pub font_weight: FontWeight,
    pub text_align: TextAlign,
    /// `0` means unlimited.
    pub number_of_lines: u32,

    pub title: Option<String>,
    pub title_color: Option<Vec4>,

    pub image: Option<String>,
    pub image_url: Option<String>,
    pub content_mode: ContentMode,

    pub placeholder: Option<String>,
    pub placeholder_color: Option<Vec4>,

    pub value: Option<ControlValue>,
    pub on_tint_color: Option<Vec4>,
    pub thumb_tint_color: Option<Vec4>,
    pub minimum_value: f32,
    pub maximum_value: f32,
    pub minimum_track_color: Option<Vec4>,
    pub maximum_track_color: Option<Vec4>,

    pub data_id: Option<String>,
}

impl Default for VisualStyle {
    fn default() -> Self {
        Self {
            background_color: None,
            corner_radius: 0.0,
            border_width: 0.0,
            border_color: None,
            border_style: None,
            opacity: 1.0,
            hidden: false,
            text: None,
            text_color: BLACK,
            font_size: DEFAULT_FONT_SIZE,
            font_weight: FontWeight::Regular,
            text_align: TextAlign::Natural,
            number_of_lines: 0,
            title: None,
            title_color: None,
            image: None,
            image_url: None,
            content_mode: ContentMode::default(),
            placeholder: None,
            placeholder_color: None,
            value: None,
            on_tint_color: None,
            thumb_tint_color: None,
            minimum_value: 0.0,
            maximum_value: 1.0,
            minimum_track_color: None,
            maximum_track_color: None,
            data_id: None,
        }
    }
}

impl VisualStyle {
    /// Resolves the visual attributes of an already-interpolated attribute bag.
    pub fn from_attributes(kind: &NodeKind, attributes: &Attributes, default_font_size: f32) -> Self {
        let attrs = Lookup::new(attributes);
        let mut style = VisualStyle {
            font_size: default_font_size,
            ..VisualStyle::default()
        };

        style.background_color = attrs.color(&["backgroundcolor", "bgcolor"]);
        style.corner_radius = attrs.number(&["cornerradius"]).unwrap_or(0.0);
        style.border_width = attrs.number(&["borderwidth"]).unwrap_or(0.0);
        style.border_color = attrs.color(&["bordercolor"]);
        style.border_style = attrs.text(&["borderstyle"]);
        if let Some(opacity) = attrs.number(&["opacity", "alpha"]) {
            style.opacity = opacity.clamp(0.0, 1.0);
        }
        style.hidden = attrs.get(&["hidden"]).and_then(parse_bool).unwrap_or(false);

        style.text = attrs.text(&["text"]);
        if let Some(color) = attrs.color(&["textcolor", "color"]) {
            style.text_color = color;
        }
        if let Some(size) = attrs.number(&["fontsize"]).filter(|size| *size > 0.0) {
            style.font_size = size;
        }
        if let Some(weight) = attrs.get(&["fontweight"]).and_then(parse_font_weight) {
            style.font_weight = weight;
        }
        if let Some(align) = attrs.get(&["textalign", "textalignment"]).and_then(parse_text_align) {
            style.text_align = align;
        }
        style.number_of_lines = attrs
            .get(&["numberoflines", "lines"])
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(0);

        style.title = attrs.text(&["title"]);
        style.title_color = attrs.color(&["titlecolor"]);

        style.image = attrs.text(&["image", "imagename"]);
        style.image_url = attrs.text(&["imageurl"]);
        if let Some(mode) = attrs.get(&["contentmode"]).and_then(parse_content_mode) {
            style.content_mode = mode;
        }

        style.placeholder = attrs.text(&["placeholder"]);
        style.placeholder_color = attrs.color(&["placeholdercolor"]);

        style.on_tint_color = attrs.color(&["ontintcolor"]);
        style.thumb_tint_color = attrs.color(&["thumbtintcolor"]);
        if let Some(min) = attrs.number(&["minimumvalue", "minvalue"]) {
            style.minimum_value = min;
        }
        if let Some(max) = attrs.number(&["maximumvalue", "maxvalue"]) {
            style.maximum_value = max;
        }
        style.minimum_track_color = attrs.color(&["minimumtracktintcolor", "minimumtrackcolor"]);
        style.maximum_track_color = attrs.color(&["maximumtracktintcolor", "maximumtrackcolor"]);

        style.value = attrs.get(&["value"]).and_then(|raw| match kind {
            NodeKind::Switch => parse_bool(raw).map(ControlValue::Bool),
            NodeKind::Slider => parse_number(raw).map(|n| {
                ControlValue::Number(n.clamp(style.minimum_value, style.maximum_value.max(style.minimum_value)) as f64)
            }),
            _ => parse_bool(raw)
                .map(ControlValue::Bool)
                .or_else(|| parse_number(raw).map(|n| ControlValue::Number(n as f64))),
        });
        if *kind == NodeKind::Input {
            style.value = Some(ControlValue::Text(style.text.clone().unwrap_or_default()));
        }

        style.data_id = attrs.text(&["id", "dataid"]);
        style
    }

    /// Text a view displays: `text` for labels and inputs, `title` for buttons.
    pub fn display_text(&self) -> Option<&str> {
        self.text.as_deref().or(self.title.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> Attributes {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn layout_defaults_follow_column_flow() {
        let style = LayoutStyle::from_attributes(&Attributes::new());
        assert_eq!(style.direction, FlexDirection::Column);
        assert_eq!(style.flex_shrink, 0.0);
        assert_eq!(style.width, Dimension::Undefined);
    }

    #[test]
    fn layout_keys_are_case_insensitive() {
        let style = LayoutStyle::from_attributes(&attrs(&[
            ("FlexDirection", "row"),
            ("justifycontent", "space-between"),
            ("ALIGNITEMS", "center"),
            ("width", "50%"),
            ("height", "44"),
            ("aspectRatio", "1.5"),
        ]));
        assert_eq!(style.direction, FlexDirection::Row);
        assert_eq!(style.justify_content, Some(Justify::SpaceBetween));
        assert_eq!(style.align_items, Some(Align::Center));
        assert_eq!(style.width, Dimension::Percent(0.5));
        assert_eq!(style.height, Dimension::Points(44.0));
        assert_eq!(style.aspect_ratio, Some(1.5));
    }

    #[test]
    fn per_side_box_values_override_shorthand() {
        let style = LayoutStyle::from_attributes(&attrs(&[
            ("padding", "10"),
            ("paddingLeft", "4"),
            ("marginHorizontal", "8"),
            ("marginTop", "2"),
        ]));
        assert_eq!(style.padding.top, Dimension::Points(10.0));
        assert_eq!(style.padding.left, Dimension::Points(4.0));
        assert_eq!(style.margin.left, Dimension::Points(8.0));
        assert_eq!(style.margin.right, Dimension::Points(8.0));
        assert_eq!(style.margin.top, Dimension::Points(2.0));
        assert_eq!(style.margin.bottom, Dimension::Undefined);
    }

    #[test]
    fn flex_shorthand_sets_grow_shrink_and_basis() {
        let style = LayoutStyle::from_attributes(&attrs(&[("flex", "2")]));
        assert_eq!(style.flex_grow, 2.0);
        assert_eq!(style.flex_shrink, 1.0);
        assert_eq!(style.flex_basis, Dimension::Points(0.0));
    }

    #[test]
    fn visual_attributes_resolve() {
        let style = VisualStyle::from_attributes(
            &NodeKind::Text,
            &attrs(&[
                ("bgColor", "#FF0000"),
                ("color", "white"),
                ("fontSize", "20"),
                ("fontWeight", "bold"),
                ("textAlignment", "center"),
                ("alpha", "0.5"),
                ("text", "Hello"),
            ]),
            DEFAULT_FONT_SIZE,
        );
        assert_eq!(style.background_color, Some(Vec4::new(1.0, 0.0, 0.0, 1.0)));
        assert_eq!(style.text_color, Vec4::ONE);
        assert_eq!(style.font_size, 20.0);
        assert_eq!(style.font_weight, FontWeight::Bold);
        assert_eq!(style.text_align, TextAlign::Center);
        assert_eq!(style.opacity, 0.5);
        assert_eq!(style.display_text(), Some("Hello"));
    }

    #[test]
    fn control_values_depend_on_kind() {
        let on = VisualStyle::from_attributes(&NodeKind::Switch, &attrs(&[("value", "yes")]), 16.0);
        assert_eq!(on.value, Some(ControlValue::Bool(true)));

        let slider = VisualStyle::from_attributes(
            &NodeKind::Slider,
            &attrs(&[("value", "150"), ("minValue", "0"), ("maxValue", "100")]),
            16.0,
        );
        assert_eq!(slider.value, Some(ControlValue::Number(100.0)));

        let input = VisualStyle::from_attributes(&NodeKind::Input, &attrs(&[("text", "Ada")]), 16.0);
        assert_eq!(input.value, Some(ControlValue::Text("Ada".into())));
    }
}
