// crates/weft-layout/src/taffy_style.rs
//! Conversion from engine-independent [`LayoutStyle`] to taffy styles.

use taffy::prelude::*;
use weft_core::{Align, Edges, Justify, LayoutStyle, PositionType};

pub fn to_taffy_style(style: &LayoutStyle) -> Style {
    Style {
        display: if style.hidden_from_layout {
            Display::None
        } else {
            Display::Flex
        },
        position: match style.position {
            PositionType::Relative => Position::Relative,
            PositionType::Absolute => Position::Absolute,
        },
        flex_direction: match style.direction {
            weft_core::FlexDirection::Row => FlexDirection::Row,
            weft_core::FlexDirection::RowReverse => FlexDirection::RowReverse,
            weft_core::FlexDirection::Column => FlexDirection::Column,
            weft_core::FlexDirection::ColumnReverse => FlexDirection::ColumnReverse,
        },
        flex_wrap: match style.wrap {
            weft_core::FlexWrap::NoWrap => FlexWrap::NoWrap,
            weft_core::FlexWrap::Wrap => FlexWrap::Wrap,
            weft_core::FlexWrap::WrapReverse => FlexWrap::WrapReverse,
        },
        justify_content: style.justify_content.map(justify_content),
        align_items: style.align_items.and_then(align_items),
        align_self: style.align_self.and_then(align_items),
        align_content: style.align_content.and_then(align_content),
        flex_grow: style.flex_grow,
        flex_shrink: style.flex_shrink,
        flex_basis: dimension(style.flex_basis),
        size: Size {
            width: dimension(style.width),
            height: dimension(style.height),
        },
        min_size: Size {
            width: dimension(style.min_width),
            height: dimension(style.min_height),
        },
        max_size: Size {
            width: dimension(style.max_width),
            height: dimension(style.max_height),
        },
        padding: rect(style.padding, length_percentage),
        margin: rect(style.margin, margin),
        inset: rect(style.inset, inset),
        gap: Size {
            width: length_percentage(style.gap),
            height: length_percentage(style.gap),
        },
        aspect_ratio: style.aspect_ratio,
        ..Default::default()
    }
}

fn rect<T>(edges: Edges<weft_core::Dimension>, convert: fn(weft_core::Dimension) -> T) -> Rect<T> {
    Rect {
        left: convert(edges.left),
        right: convert(edges.right),
        top: convert(edges.top),
        bottom: convert(edges.bottom),
    }
}

pub fn dimension(value: weft_core::Dimension) -> Dimension {
    match value {
        weft_core::Dimension::Points(points) => Dimension::Length(points),
        weft_core::Dimension::Percent(fraction) => Dimension::Percent(fraction),
        weft_core::Dimension::Auto | weft_core::Dimension::Undefined => Dimension::Auto,
    }
}

fn length_percentage(value: weft_core::Dimension) -> LengthPercentage {
    match value {
        weft_core::Dimension::Points(points) => LengthPercentage::Length(points),
        weft_core::Dimension::Percent(fraction) => LengthPercentage::Percent(fraction),
        weft_core::Dimension::Auto | weft_core::Dimension::Undefined => LengthPercentage::Length(0.0),
    }
}

fn margin(value: weft_core::Dimension) -> LengthPercentageAuto {
    match value {
        weft_core::Dimension::Points(points) => LengthPercentageAuto::Length(points),
        weft_core::Dimension::Percent(fraction) => LengthPercentageAuto::Percent(fraction),
        weft_core::Dimension::Auto => LengthPercentageAuto::Auto,
        weft_core::Dimension::Undefined => LengthPercentageAuto::Length(0.0),
    }
}

fn inset(value: weft_core::Dimension) -> LengthPercentageAuto {
    match value {
        weft_core::Dimension::Points(points) => LengthPercentageAuto::Length(points),
        weft_core::Dimension::Percent(fraction) => LengthPercentageAuto::Percent(fraction),
        weft_core::Dimension::Auto | weft_core::Dimension::Undefined => LengthPercentageAuto::Auto,
    }
}

fn justify_content(value: Justify) -> JustifyContent {
    match value {
        Justify::FlexStart => JustifyContent::FlexStart,
        Justify::Center => JustifyContent::Center,
        Justify::FlexEnd => JustifyContent::FlexEnd,
        Justify::SpaceBetween => JustifyContent::SpaceBetween,
        Justify::SpaceAround => JustifyContent::SpaceAround,
        Justify::SpaceEvenly => JustifyContent::SpaceEvenly,
    }
}

/// `auto` and the distribution keywords have no item-level equivalent and fall back to the default.
fn align_items(value: Align) -> Option<AlignItems> {
    match value {
        Align::FlexStart => Some(AlignItems::FlexStart),
        Align::Center => Some(AlignItems::Center),
        Align::FlexEnd => Some(AlignItems::FlexEnd),
        Align::Stretch => Some(AlignItems::Stretch),
        Align::Baseline => Some(AlignItems::Baseline),
        Align::Auto | Align::SpaceBetween | Align::SpaceAround => None,
    }
}

fn align_content(value: Align) -> Option<AlignContent> {
    match value {
        Align::FlexStart => Some(AlignContent::FlexStart),
        Align::Center => Some(AlignContent::Center),
        Align::FlexEnd => Some(AlignContent::FlexEnd),
        Align::Stretch => Some(AlignContent::Stretch),
        Align::SpaceBetween => Some(AlignContent::SpaceBetween),
        Align::SpaceAround => Some(AlignContent::SpaceAround),
        Align::Auto | Align::Baseline => None,
    }
}
