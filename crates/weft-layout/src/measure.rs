// crates/weft-layout/src/measure.rs
//! Intrinsic text measurement for text-bearing leaves.

use taffy::prelude::*;
use weft_core::{FontWeight, VisualStyle};

/// Text attached to a layout leaf; handed back to the measurer during layout.
#[derive(Debug, Clone, PartialEq)]
pub struct TextContent {
    pub text: String,
    pub font_size: f32,
    pub font_weight: FontWeight,
    /// `0` means unlimited.
    pub max_lines: u32,
}

impl TextContent {
    pub fn from_style(style: &VisualStyle) -> Self {
        Self {
            text: style.display_text().unwrap_or_default().to_string(),
            font_size: style.font_size,
            font_weight: style.font_weight,
            max_lines: style.number_of_lines,
        }
    }
}

pub trait TextMeasurer {
    fn measure(
        &self,
        content: &TextContent,
        known_dimensions: Size<Option<f32>>,
        available_space: Size<AvailableSpace>,
    ) -> Size<f32>;
}

/// Glyph-count approximation: every character advances a fixed fraction of the font size,
/// wide (CJK, emoji) characters twice that.
#[derive(Debug, Clone, Copy)]
pub struct ApproximateMeasurer {
    pub advance_ratio: f32,
    pub line_height_ratio: f32,
}

impl Default for ApproximateMeasurer {
    fn default() -> Self {
        Self {
            advance_ratio: 0.55,
            line_height_ratio: 1.2,
        }
    }
}

/// Rounds up to whole points, ignoring float noise below a thousandth.
fn ceil_px(value: f32) -> f32 {
    ((value * 1000.0).round() / 1000.0).ceil()
}

fn char_units(c: char) -> f32 {
    if c.is_ascii() {
        return if c.is_ascii_control() { 0.0 } else { 1.0 };
    }
    let code = c as u32;
    let wide = (0x1100..=0x115F).contains(&code)
        || (0x2E80..=0x9FFF).contains(&code)
        || (0xAC00..=0xD7A3).contains(&code)
        || (0xF900..=0xFAFF).contains(&code)
        || (0xFE30..=0xFE6F).contains(&code)
        || (0xFF00..=0xFF60).contains(&code)
        || (0xFFE0..=0xFFE6).contains(&code)
        || (0x1F300..=0x1F9FF).contains(&code)
        || (0x20000..=0x2FFFF).contains(&code);
    if wide {
        2.0
    } else {
        1.0
    }
}

impl ApproximateMeasurer {
    fn font_scale(weight: FontWeight) -> f32 {
        match weight {
            FontWeight::Semibold | FontWeight::Bold => 1.05,
            FontWeight::Heavy | FontWeight::Black => 1.1,
            _ => 1.0,
        }
    }

    pub fn text_width(&self, text: &str, font_size: f32, weight: FontWeight) -> f32 {
        let units: f32 = text.chars().map(char_units).sum();
        units * font_size * self.advance_ratio * Self::font_scale(weight)
    }

    /// Greedy word wrap. Returns `(line count, widest line)`.
    fn wrap(&self, content: &TextContent, max_width: f32) -> (usize, f32) {
        let space = self.text_width(" ", content.font_size, content.font_weight);
        let mut lines = 0;
        let mut widest: f32 = 0.0;

        for paragraph in content.text.split('\n') {
            let mut line_width: f32 = 0.0;
            let mut line_has_words = false;
            for word in paragraph.split_whitespace() {
                let word_width = self.text_width(word, content.font_size, content.font_weight);
                let candidate = if line_has_words {
                    line_width + space + word_width
                } else {
                    word_width
                };
                if line_has_words && candidate > max_width {
                    lines += 1;
                    widest = widest.max(line_width);
                    line_width = word_width;
                } else {
                    line_width = candidate;
                }
                line_has_words = true;
            }
            lines += 1;
            widest = widest.max(line_width);
        }

        (lines, widest)
    }
}

impl TextMeasurer for ApproximateMeasurer {
    fn measure(
        &self,
        content: &TextContent,
        known_dimensions: Size<Option<f32>>,
        available_space: Size<AvailableSpace>,
    ) -> Size<f32> {
        if let Size {
            width: Some(width),
            height: Some(height),
        } = known_dimensions
        {
            return Size { width, height };
        }
        if content.text.is_empty() {
            return Size {
                width: known_dimensions.width.unwrap_or(0.0),
                height: known_dimensions.height.unwrap_or(0.0),
            };
        }

        let max_width = known_dimensions.width.unwrap_or(match available_space.width {
            AvailableSpace::Definite(width) => width,
            AvailableSpace::MinContent => 0.0,
            AvailableSpace::MaxContent => f32::INFINITY,
        });

        let (mut lines, widest) = self.wrap(content, max_width);
        if content.max_lines > 0 {
            lines = lines.min(content.max_lines as usize);
        }
        let line_height = content.font_size * self.line_height_ratio;

        Size {
            width: known_dimensions.width.unwrap_or(ceil_px(widest)),
            height: known_dimensions
                .height
                .unwrap_or(ceil_px(lines as f32 * line_height)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(text: &str) -> TextContent {
        TextContent {
            text: text.to_string(),
            font_size: 10.0,
            font_weight: FontWeight::Regular,
            max_lines: 0,
        }
    }

    fn unbounded() -> Size<AvailableSpace> {
        Size {
            width: AvailableSpace::MaxContent,
            height: AvailableSpace::MaxContent,
        }
    }

    #[test]
    fn single_line_width_scales_with_characters() {
        let measurer = ApproximateMeasurer::default();
        let size = measurer.measure(&content("abcd"), Size::NONE, unbounded());
        assert_eq!(size.width, 22.0);
        assert_eq!(size.height, 12.0);
    }

    #[test]
    fn wraps_at_available_width() {
        let measurer = ApproximateMeasurer::default();
        let available = Size {
            width: AvailableSpace::Definite(30.0),
            height: AvailableSpace::MaxContent,
        };
        // Each word is 5.5 * 4 = 22 wide; two never fit on one 30pt line.
        let size = measurer.measure(&content("abcd efgh ijkl"), Size::NONE, available);
        assert_eq!(size.height, 36.0);
        assert!(size.width <= 30.0);
    }

    #[test]
    fn max_lines_caps_height() {
        let measurer = ApproximateMeasurer::default();
        let mut text = content("one\ntwo\nthree");
        text.max_lines = 2;
        let size = measurer.measure(&text, Size::NONE, unbounded());
        assert_eq!(size.height, 24.0);
    }

    #[test]
    fn wide_characters_take_two_units() {
        let measurer = ApproximateMeasurer::default();
        assert_eq!(
            measurer.text_width("你", 10.0, FontWeight::Regular),
            measurer.text_width("ab", 10.0, FontWeight::Regular)
        );
    }
}
