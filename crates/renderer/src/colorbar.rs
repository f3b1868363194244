//! Vertical colorbar legend.

use tiny_skia::{
    GradientStop, LinearGradient, Paint, PathBuilder, Pixmap, Point, Rect, SpreadMode, Transform,
};

use heatmap_common::{HeatmapError, HeatmapResult};

use crate::colormap::{Color, ColorScale};
use crate::draw::{solid_paint, stroke_for};
use crate::layers::StrokePattern;

/// Frame and tick color.
pub const FRAME_COLOR: Color = Color::new(0x26, 0x26, 0x26, 255);

/// Colorbar placement and decoration, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorbarLayout {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub frame_width_px: f32,
    pub tick_length_px: f32,
    pub ticks: usize,
}

impl ColorbarLayout {
    /// Vertical pixel position of tick `i`, counted from the bottom.
    pub fn tick_y(&self, i: usize) -> f32 {
        if self.ticks <= 1 {
            return self.y + self.height;
        }
        self.y + self.height - self.height * i as f32 / (self.ticks - 1) as f32
    }
}

/// Draw the scale as a bottom-to-top gradient with a frame and tick marks.
pub fn draw_colorbar(pixmap: &mut Pixmap, scale: &ColorScale, layout: &ColorbarLayout) -> HeatmapResult<()> {
    let rect = Rect::from_xywh(layout.x, layout.y, layout.width, layout.height).ok_or_else(|| {
        HeatmapError::RenderError(format!("invalid colorbar geometry {:?}", layout))
    })?;

    let stops: Vec<GradientStop> = scale
        .stops()
        .iter()
        .map(|s| GradientStop::new(s.position, s.color.to_skia()))
        .collect();

    let bottom = Point::from_xy(layout.x, layout.y + layout.height);
    let top = Point::from_xy(layout.x, layout.y);

    let mut paint = Paint::default();
    paint.anti_alias = false;
    match LinearGradient::new(bottom, top, stops, SpreadMode::Pad, Transform::identity()) {
        Some(shader) => paint.shader = shader,
        // Single-stop scales degenerate to a solid color
        None => paint.set_color(scale.color_at(0.5).to_skia()),
    }
    pixmap.fill_rect(rect, &paint, Transform::identity(), None);

    let frame = PathBuilder::from_rect(rect);
    let stroke = stroke_for(layout.frame_width_px, StrokePattern::Solid);
    let frame_paint = solid_paint(FRAME_COLOR);
    pixmap.stroke_path(&frame, &frame_paint, &stroke, Transform::identity(), None);

    let right = layout.x + layout.width;
    for i in 0..layout.ticks {
        let y = layout.tick_y(i);
        let mut pb = PathBuilder::new();
        pb.move_to(right, y);
        pb.line_to(right + layout.tick_length_px, y);
        if let Some(path) = pb.finish() {
            pixmap.stroke_path(&path, &frame_paint, &stroke, Transform::identity(), None);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> ColorbarLayout {
        ColorbarLayout {
            x: 10.0,
            y: 10.0,
            width: 20.0,
            height: 100.0,
            frame_width_px: 1.0,
            tick_length_px: 5.0,
            ticks: 5,
        }
    }

    #[test]
    fn test_tick_positions() {
        let l = layout();
        assert_eq!(l.tick_y(0), 110.0);
        assert_eq!(l.tick_y(2), 60.0);
        assert_eq!(l.tick_y(4), 10.0);
    }

    #[test]
    fn test_gradient_runs_bottom_to_top() {
        let mut pixmap = Pixmap::new(60, 130).unwrap();
        let scale = ColorScale::by_name("classic_custom").unwrap();
        draw_colorbar(&mut pixmap, &scale, &layout()).unwrap();

        let bottom = pixmap.pixel(20, 107).unwrap().demultiply();
        let top = pixmap.pixel(20, 13).unwrap().demultiply();
        // Cyan-ish at the bottom, dark red at the top
        assert!(bottom.blue() > 200 && bottom.red() < 60);
        assert!(top.red() > 120 && top.blue() < 40 && top.green() < 40);
    }
}
