// crates/weft-core/src/properties.rs
//! Parse tables that turn raw attribute strings into typed style values.
//!
//! Every attribute is parsed exactly once, when a view is created. Unparseable values come
//! back as `None` / [`Dimension::Undefined`] and leave the corresponding property untouched.

use glam::Vec4;
use tracing::debug;

/// A length as written in a template attribute.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Dimension {
    #[default]
    Undefined,
    Auto,
    Points(f32),
    /// Fraction in `0.0..=1.0`.
    Percent(f32),
}

impl Dimension {
    pub fn is_defined(&self) -> bool {
        !matches!(self, Dimension::Undefined)
    }
}

/// `"auto"`, `"50%"`, `"12px"` / `"12pt"` / `"12dp"` or a bare number.
pub fn parse_dimension(raw: &str) -> Dimension {
    let value = raw.trim().to_ascii_lowercase();
    if value == "auto" {
        return Dimension::Auto;
    }
    if let Some(percent) = value.strip_suffix('%') {
        return percent
            .trim()
            .parse::<f32>()
            .map(|p| Dimension::Percent(p / 100.0))
            .unwrap_or(Dimension::Undefined);
    }
    let number = ["px", "pt", "dp"]
        .iter()
        .find_map(|suffix| value.strip_suffix(suffix))
        .unwrap_or(value.as_str());
    number
        .trim()
        .parse::<f32>()
        .map(Dimension::Points)
        .unwrap_or(Dimension::Undefined)
}

pub fn parse_number(raw: &str) -> Option<f32> {
    let value = raw.trim();
    let value = ["px", "pt", "dp"]
        .iter()
        .find_map(|suffix| value.strip_suffix(suffix))
        .unwrap_or(value);
    value.trim().parse().ok()
}

pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

const NAMED_COLORS: &[(&str, [f32; 4])] = &[
    ("black", [0.0, 0.0, 0.0, 1.0]),
    ("white", [1.0, 1.0, 1.0, 1.0]),
    ("red", [1.0, 0.0, 0.0, 1.0]),
    ("green", [0.0, 1.0, 0.0, 1.0]),
    ("blue", [0.0, 0.0, 1.0, 1.0]),
    ("yellow", [1.0, 1.0, 0.0, 1.0]),
    ("orange", [1.0, 0.5, 0.0, 1.0]),
    ("purple", [0.5, 0.0, 0.5, 1.0]),
    ("brown", [0.6, 0.4, 0.2, 1.0]),
    ("cyan", [0.0, 1.0, 1.0, 1.0]),
    ("magenta", [1.0, 0.0, 1.0, 1.0]),
    ("gray", [0.5, 0.5, 0.5, 1.0]),
    ("grey", [0.5, 0.5, 0.5, 1.0]),
    ("lightgray", [2.0 / 3.0, 2.0 / 3.0, 2.0 / 3.0, 1.0]),
    ("darkgray", [1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0, 1.0]),
    ("clear", [0.0, 0.0, 0.0, 0.0]),
    ("transparent", [0.0, 0.0, 0.0, 0.0]),
    ("systemblue", [0.0, 0.478, 1.0, 1.0]),
    ("systemgreen", [0.204, 0.78, 0.349, 1.0]),
    ("systemred", [1.0, 0.231, 0.188, 1.0]),
    ("systemorange", [1.0, 0.584, 0.0, 1.0]),
    ("systemgray", [0.557, 0.557, 0.576, 1.0]),
    ("systembackground", [1.0, 1.0, 1.0, 1.0]),
    ("label", [0.0, 0.0, 0.0, 1.0]),
    ("secondarylabel", [0.235, 0.235, 0.263, 0.6]),
];

pub const BLACK: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);

/// Named colour, `#RGB`, `#RRGGBB` or `#RRGGBBAA`.
pub fn parse_color(raw: &str) -> Option<Vec4> {
    let value = raw.trim();
    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex_color(hex);
    }
    let name = value.to_ascii_lowercase();
    NAMED_COLORS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, rgba)| Vec4::from_array(*rgba))
}

/// Like [`parse_color`] but unknown values resolve to black.
pub fn color_or_black(raw: &str) -> Vec4 {
    parse_color(raw).unwrap_or_else(|| {
        debug!("Unknown colour '{}'; using black", raw);
        BLACK
    })
}

fn parse_hex_color(hex: &str) -> Option<Vec4> {
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| v as f32 / 255.0);
    match hex.len() {
        3 => {
            let expand = |i: usize| channel(&hex[i..i + 1].repeat(2));
            Some(Vec4::new(expand(0)?, expand(1)?, expand(2)?, 1.0))
        }
        6 => Some(Vec4::new(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
            1.0,
        )),
        8 => Some(Vec4::new(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
            channel(&hex[6..8])?,
        )),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontWeight {
    UltraLight,
    Thin,
    Light,
    #[default]
    Regular,
    Medium,
    Semibold,
    Bold,
    Heavy,
    Black,
}

pub fn parse_font_weight(raw: &str) -> Option<FontWeight> {
    Some(match raw.trim().to_ascii_lowercase().as_str() {
        "ultralight" | "100" => FontWeight::UltraLight,
        "thin" | "200" => FontWeight::Thin,
        "light" | "300" => FontWeight::Light,
        "regular" | "normal" | "400" => FontWeight::Regular,
        "medium" | "500" => FontWeight::Medium,
        "semibold" | "600" => FontWeight::Semibold,
        "bold" | "700" => FontWeight::Bold,
        "heavy" | "800" => FontWeight::Heavy,
        "black" | "900" => FontWeight::Black,
        _ => return None,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Natural,
    Left,
    Center,
    Right,
    Justified,
}

pub fn parse_text_align(raw: &str) -> Option<TextAlign> {
    Some(match raw.trim().to_ascii_lowercase().as_str() {
        "left" | "start" => TextAlign::Left,
        "center" => TextAlign::Center,
        "right" | "end" => TextAlign::Right,
        "justified" | "justify" => TextAlign::Justified,
        "natural" => TextAlign::Natural,
        _ => return None,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentMode {
    ScaleToFill,
    #[default]
    ScaleAspectFit,
    ScaleAspectFill,
    Center,
}

pub fn parse_content_mode(raw: &str) -> Option<ContentMode> {
    Some(match raw.trim().to_ascii_lowercase().as_str() {
        "scaletofill" | "fill" | "stretch" => ContentMode::ScaleToFill,
        "scaleaspectfit" | "aspectfit" | "contain" => ContentMode::ScaleAspectFit,
        "scaleaspectfill" | "aspectfill" | "cover" => ContentMode::ScaleAspectFill,
        "center" => ContentMode::Center,
        _ => return None,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlexDirection {
    #[default]
    Column,
    ColumnReverse,
    Row,
    RowReverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlexWrap {
    #[default]
    NoWrap,
    Wrap,
    WrapReverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Justify {
    FlexStart,
    Center,
    FlexEnd,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Auto,
    FlexStart,
    Center,
    FlexEnd,
    Stretch,
    Baseline,
    SpaceBetween,
    SpaceAround,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositionType {
    #[default]
    Relative,
    Absolute,
}

/// Strips separators so `space-between`, `space_between` and `spaceBetween` compare equal.
fn keyword(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .collect::<String>()
        .to_ascii_lowercase()
}

pub fn parse_flex_direction(raw: &str) -> Option<FlexDirection> {
    Some(match keyword(raw).as_str() {
        "row" => FlexDirection::Row,
        "rowreverse" => FlexDirection::RowReverse,
        "column" => FlexDirection::Column,
        "columnreverse" => FlexDirection::ColumnReverse,
        _ => return None,
    })
}

pub fn parse_flex_wrap(raw: &str) -> Option<FlexWrap> {
    Some(match keyword(raw).as_str() {
        "nowrap" => FlexWrap::NoWrap,
        "wrap" => FlexWrap::Wrap,
        "wrapreverse" => FlexWrap::WrapReverse,
        _ => return None,
    })
}

pub fn parse_justify(raw: &str) -> Option<Justify> {
    Some(match keyword(raw).as_str() {
        "flexstart" | "start" => Justify::FlexStart,
        "center" => Justify::Center,
        "flexend" | "end" => Justify::FlexEnd,
        "spacebetween" => Justify::SpaceBetween,
        "spacearound" => Justify::SpaceAround,
        "spaceevenly" => Justify::SpaceEvenly,
        _ => return None,
    })
}

pub fn parse_align(raw: &str) -> Option<Align> {
    Some(match keyword(raw).as_str() {
        "auto" => Align::Auto,
        "flexstart" | "start" => Align::FlexStart,
        "center" => Align::Center,
        "flexend" | "end" => Align::FlexEnd,
        "stretch" => Align::Stretch,
        "baseline" => Align::Baseline,
        "spacebetween" => Align::SpaceBetween,
        "spacearound" => Align::SpaceAround,
        _ => return None,
    })
}

pub fn parse_position(raw: &str) -> Option<PositionType> {
    Some(match keyword(raw).as_str() {
        "relative" => PositionType::Relative,
        "absolute" => PositionType::Absolute,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions() {
        assert_eq!(parse_dimension("auto"), Dimension::Auto);
        assert_eq!(parse_dimension("50%"), Dimension::Percent(0.5));
        assert_eq!(parse_dimension("12px"), Dimension::Points(12.0));
        assert_eq!(parse_dimension("8dp"), Dimension::Points(8.0));
        assert_eq!(parse_dimension(" 40 "), Dimension::Points(40.0));
        assert_eq!(parse_dimension("wide"), Dimension::Undefined);
    }

    #[test]
    fn colors() {
        assert_eq!(parse_color("#FF0000"), Some(Vec4::new(1.0, 0.0, 0.0, 1.0)));
        assert_eq!(parse_color("#00000080").map(|c| c.w), Some(128.0 / 255.0));
        assert_eq!(parse_color("#fff"), Some(Vec4::ONE));
        assert_eq!(parse_color("White"), Some(Vec4::ONE));
        assert_eq!(parse_color("clear").map(|c| c.w), Some(0.0));
        assert_eq!(parse_color("#12"), None);
        assert_eq!(color_or_black("not-a-color"), BLACK);
    }

    #[test]
    fn keywords_ignore_case_and_separators() {
        assert_eq!(parse_flex_direction("row-reverse"), Some(FlexDirection::RowReverse));
        assert_eq!(parse_justify("spaceBetween"), Some(Justify::SpaceBetween));
        assert_eq!(parse_justify("space_evenly"), Some(Justify::SpaceEvenly));
        assert_eq!(parse_align("FlexEnd"), Some(Align::FlexEnd));
        assert_eq!(parse_font_weight("SemiBold"), Some(FontWeight::Semibold));
        assert_eq!(parse_bool("On"), Some(true));
        assert_eq!(parse_bool("maybe"), None);
    }
}
