//! Named color scales for the heat raster and colorbar.
//!
//! A scale is a piecewise-linear gradient over normalized positions in
//! `[0, 1]`. Any built-in name accepts a `_r` suffix for the reversed scale.

use heatmap_common::{HeatmapError, HeatmapResult, DEFAULT_COLOR_SCALE};

use crate::layers::hex_to_rgb;

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0, 255);
    pub const WHITE: Color = Color::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from a `#RRGGBB` string.
    pub fn from_hex(hex: &str) -> Option<Self> {
        hex_to_rgb(hex).map(|(r, g, b)| Color::new(r, g, b, 255))
    }

    /// Same color with alpha scaled by `opacity` in `[0, 1]`.
    pub fn with_opacity(self, opacity: f32) -> Self {
        let a = (self.a as f32 * opacity.clamp(0.0, 1.0)).round() as u8;
        Color { a, ..self }
    }

    pub fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

/// Linear color interpolation
pub fn interpolate_color(color1: Color, color2: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let t_inv = 1.0 - t;
    let mix = |a: u8, b: u8| ((a as f32 * t_inv) + (b as f32 * t)).round() as u8;

    Color::new(
        mix(color1.r, color2.r),
        mix(color1.g, color2.g),
        mix(color1.b, color2.b),
        mix(color1.a, color2.a),
    )
}

/// Color stop at a normalized position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub position: f32,
    pub color: Color,
}

/// Piecewise-linear gradient over `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    name: String,
    stops: Vec<ColorStop>,
}

/// Default scale: cyan, green, yellow, orange-red, dark red.
const CLASSIC_CUSTOM: &[(f32, &str)] = &[
    (0.0, "#00FFFF"),
    (0.2, "#00FF00"),
    (0.35, "#FFFF00"),
    (0.7, "#FF4500"),
    (1.0, "#8B0000"),
];

const VIRIDIS: &[&str] = &[
    "#440154", "#482878", "#3e4989", "#31688e", "#26828e", "#1f9e89", "#35b779", "#6ece58", "#b5de2b",
    "#fde725",
];
const PLASMA: &[&str] = &[
    "#0d0887", "#46039f", "#7201a8", "#9c179e", "#bd3786", "#d8576b", "#ed7953", "#fb9f3a", "#fdca26",
    "#f0f921",
];
const INFERNO: &[&str] = &[
    "#000004", "#1b0c41", "#4a0c6b", "#781c6d", "#a52c60", "#cf4446", "#ed6925", "#fb9b06", "#f7d13d",
    "#fcffa4",
];
const MAGMA: &[&str] = &[
    "#000004", "#180f3d", "#440f76", "#721f81", "#9e2f7f", "#cd4071", "#f1605d", "#fd9668", "#feca8d",
    "#fcfdbf",
];
const CIVIDIS: &[&str] = &[
    "#00224e", "#123570", "#3b496c", "#575d6d", "#707173", "#8a8779", "#a69d75", "#c4b56c", "#e4cf5b",
    "#fee838",
];
const TURBO: &[&str] = &[
    "#30123b", "#4662d7", "#36aaf9", "#1ae4b6", "#72fe5e", "#c8ef34", "#faba39", "#f66b19", "#ca2a04",
    "#7a0403",
];
const COOLWARM: &[&str] = &[
    "#3b4cc0", "#6788ee", "#9abbff", "#c9d7f0", "#edd1c2", "#f7a889", "#e26952", "#b40426",
];
const JET: &[(f32, &str)] = &[
    (0.0, "#00007F"),
    (0.125, "#0000FF"),
    (0.375, "#00FFFF"),
    (0.625, "#FFFF00"),
    (0.875, "#FF0000"),
    (1.0, "#7F0000"),
];
const HOT: &[(f32, &str)] = &[
    (0.0, "#0B0000"),
    (0.365, "#FF0000"),
    (0.746, "#FFFF00"),
    (1.0, "#FFFFFF"),
];
const GRAY: &[(f32, &str)] = &[(0.0, "#000000"), (1.0, "#FFFFFF")];

/// Names accepted by [`ColorScale::by_name`] (each also with a `_r` suffix).
pub const BUILTIN_SCALES: &[&str] = &[
    "classic_custom",
    "viridis",
    "plasma",
    "inferno",
    "magma",
    "cividis",
    "jet",
    "hot",
    "coolwarm",
    "turbo",
    "gray",
];

impl ColorScale {
    /// Build from explicit `(position, hex)` stops. Stops are sorted by position.
    pub fn from_hex_stops(name: &str, stops: &[(f32, &str)]) -> Option<Self> {
        let mut parsed = stops
            .iter()
            .map(|(position, hex)| {
                Color::from_hex(hex).map(|color| ColorStop {
                    position: *position,
                    color,
                })
            })
            .collect::<Option<Vec<_>>>()?;
        if parsed.is_empty() {
            return None;
        }
        parsed.sort_by(|a, b| a.position.total_cmp(&b.position));
        Some(Self {
            name: name.to_string(),
            stops: parsed,
        })
    }

    /// Build from colors spaced evenly over `[0, 1]`.
    pub fn evenly_spaced(name: &str, colors: &[&str]) -> Option<Self> {
        let last = colors.len().checked_sub(1)?.max(1) as f32;
        let stops: Vec<(f32, &str)> = colors
            .iter()
            .enumerate()
            .map(|(i, hex)| (i as f32 / last, *hex))
            .collect();
        Self::from_hex_stops(name, &stops)
    }

    /// Resolve a scale by name. An empty name selects the default scale.
    pub fn by_name(name: &str) -> HeatmapResult<Self> {
        let requested = name.trim();
        let requested = if requested.is_empty() {
            DEFAULT_COLOR_SCALE
        } else {
            requested
        };
        let lower = requested.to_ascii_lowercase();

        let (base, reverse) = match lower.strip_suffix("_r") {
            Some(base) => (base, true),
            None => (lower.as_str(), false),
        };

        let scale = match base {
            "classic_custom" => Self::from_hex_stops(base, CLASSIC_CUSTOM),
            "viridis" => Self::evenly_spaced(base, VIRIDIS),
            "plasma" => Self::evenly_spaced(base, PLASMA),
            "inferno" => Self::evenly_spaced(base, INFERNO),
            "magma" => Self::evenly_spaced(base, MAGMA),
            "cividis" => Self::evenly_spaced(base, CIVIDIS),
            "turbo" => Self::evenly_spaced(base, TURBO),
            "coolwarm" => Self::evenly_spaced(base, COOLWARM),
            "jet" => Self::from_hex_stops(base, JET),
            "hot" => Self::from_hex_stops(base, HOT),
            "gray" | "grey" => Self::from_hex_stops("gray", GRAY),
            _ => None,
        }
        .ok_or_else(|| HeatmapError::RenderError(format!("unknown color scale '{}'", requested)))?;

        Ok(if reverse { scale.reversed() } else { scale })
    }

    /// The same scale run backwards, named with a `_r` suffix.
    pub fn reversed(&self) -> Self {
        let mut stops: Vec<ColorStop> = self
            .stops
            .iter()
            .map(|s| ColorStop {
                position: 1.0 - s.position,
                color: s.color,
            })
            .collect();
        stops.reverse();
        Self {
            name: format!("{}_r", self.name),
            stops,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Color at normalized position `t`; values outside `[0, 1]` clamp.
    pub fn color_at(&self, t: f32) -> Color {
        let t = if t.is_nan() { 0.5 } else { t.clamp(0.0, 1.0) };

        let first = self.stops[0];
        let last = self.stops[self.stops.len() - 1];
        if t <= first.position {
            return first.color;
        }
        if t >= last.position {
            return last.color;
        }

        for pair in self.stops.windows(2) {
            let (low, high) = (pair[0], pair[1]);
            if t <= high.position {
                let span = high.position - low.position;
                let local = if span > 0.0 { (t - low.position) / span } else { 1.0 };
                return interpolate_color(low.color, high.color, local);
            }
        }

        last.color
    }
}

impl Default for ColorScale {
    fn default() -> Self {
        Self {
            name: DEFAULT_COLOR_SCALE.to_string(),
            stops: CLASSIC_CUSTOM
                .iter()
                .filter_map(|(position, hex)| {
                    Color::from_hex(hex).map(|color| ColorStop {
                        position: *position,
                        color,
                    })
                })
                .collect(),
        }
    }
}

/// Normalize `value` into `[0, 1]` against `[min, max]`.
///
/// A flat range maps to the scale midpoint.
pub fn normalize(value: f64, min: f64, max: f64) -> f32 {
    let range = max - min;
    if !(range.is_finite() && range > 0.0) {
        return 0.5;
    }
    ((value - min) / range).clamp(0.0, 1.0) as f32
}
