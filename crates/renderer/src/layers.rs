//! Style selection for auxiliary vector layers.
//!
//! Styling is a pure function of the layer name, so the same request always
//! draws the same way.

use crate::colormap::Color;

/// Line pattern of a layer stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokePattern {
    Solid,
    Dashed,
    Dotted,
}

/// How a vector layer is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerStyle {
    pub stroke: Color,
    /// Polygon fill; `None` draws outlines only.
    pub fill: Option<Color>,
    /// Stroke width in points.
    pub line_width_pt: f32,
    /// Opacity applied to both stroke and fill.
    pub alpha: f32,
    pub pattern: StrokePattern,
    /// Draw order; higher draws later.
    pub z: u8,
}

impl LayerStyle {
    pub fn stroke_color(&self) -> Color {
        self.stroke.with_opacity(self.alpha)
    }

    pub fn fill_color(&self) -> Option<Color> {
        self.fill.map(|c| c.with_opacity(self.alpha))
    }
}

/// Pick the style for a layer from its name. Matching is case-sensitive.
///
/// - `road` / `highway`: dark gray line, 0.4pt, alpha 0.7
/// - `water` / `river`: blue fill and outline, 0.8pt, alpha 0.6
/// - `rail`: dashed gray line, 0.4pt
/// - anything else: dotted white line, 0.6pt, no fill
pub fn style_for_layer(name: &str) -> LayerStyle {
    if name.contains("road") || name.contains("highway") {
        LayerStyle {
            stroke: Color::new(0x4a, 0x4a, 0x4a, 255),
            fill: None,
            line_width_pt: 0.4,
            alpha: 0.7,
            pattern: StrokePattern::Solid,
            z: 3,
        }
    } else if name.contains("water") || name.contains("river") {
        let blue = Color::new(0x34, 0x98, 0xdb, 255);
        LayerStyle {
            stroke: blue,
            fill: Some(blue),
            line_width_pt: 0.8,
            alpha: 0.6,
            pattern: StrokePattern::Solid,
            z: 2,
        }
    } else if name.contains("rail") {
        LayerStyle {
            stroke: Color::new(0x5e, 0x5e, 0x5e, 255),
            fill: None,
            line_width_pt: 0.4,
            alpha: 1.0,
            pattern: StrokePattern::Dashed,
            z: 3,
        }
    } else {
        LayerStyle {
            stroke: Color::WHITE,
            fill: None,
            line_width_pt: 0.6,
            alpha: 1.0,
            pattern: StrokePattern::Dotted,
            z: 2,
        }
    }
}

/// Parse hex color string to RGB
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_rgb() {
        assert_eq!(hex_to_rgb("#FF0000"), Some((255, 0, 0)));
        assert_eq!(hex_to_rgb("#3498db"), Some((0x34, 0x98, 0xdb)));
        assert_eq!(hex_to_rgb("FF0000"), Some((255, 0, 0)));
        assert_eq!(hex_to_rgb("#GGGGGG"), None);
        assert_eq!(hex_to_rgb("#FFF"), None);
    }

    #[test]
    fn test_style_by_name() {
        let roads = style_for_layer("main_roads");
        assert_eq!(roads.stroke, Color::new(0x4a, 0x4a, 0x4a, 255));
        assert_eq!(roads.z, 3);
        assert_eq!(style_for_layer("highway").z, 3);
        assert_eq!(style_for_layer("Highway").pattern, StrokePattern::Dotted);
        assert_eq!(style_for_layer("Water").fill, None);

        let river = style_for_layer("river");
        assert!(river.fill.is_some());
        assert_eq!(river.z, 2);
        assert_eq!(river.fill_color().unwrap().a, 153);

        assert_eq!(style_for_layer("railway").pattern, StrokePattern::Dashed);

        let other = style_for_layer("districts");
        assert_eq!(other.pattern, StrokePattern::Dotted);
        assert_eq!(other.stroke, Color::WHITE);
        assert!(other.fill.is_none());
    }

    #[test]
    fn test_road_wins_over_rail() {
        // "railroad" contains both; road is checked first
        assert_eq!(style_for_layer("railroad").pattern, StrokePattern::Solid);
    }
}
