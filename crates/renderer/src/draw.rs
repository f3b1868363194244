//! Geometry to tiny-skia path conversion and primitive drawing.

use geo::{Coord, Geometry, LineString, Polygon};
use tiny_skia::{
    FillRule, LineCap, LineJoin, Mask, Paint, Path, PathBuilder, Pixmap, Rect, Stroke, StrokeDash,
    Transform,
};

use crate::colormap::Color;
use crate::compositor::MapProjection;
use crate::layers::{LayerStyle, StrokePattern};

/// Path through the projected coordinates of a line string.
pub fn line_path(line: &LineString<f64>, projection: &MapProjection) -> Option<Path> {
    let mut pb = PathBuilder::new();
    append_coords(&mut pb, line.0.iter(), projection, false);
    pb.finish()
}

/// Closed path with every ring of every polygon.
///
/// Meant to be filled with `FillRule::EvenOdd` so holes stay empty.
pub fn polygons_path(polygons: &[Polygon<f64>], projection: &MapProjection) -> Option<Path> {
    let mut pb = PathBuilder::new();
    for polygon in polygons {
        append_coords(&mut pb, polygon.exterior().0.iter(), projection, true);
        for interior in polygon.interiors() {
            append_coords(&mut pb, interior.0.iter(), projection, true);
        }
    }
    pb.finish()
}

fn append_coords<'a, I>(pb: &mut PathBuilder, coords: I, projection: &MapProjection, close: bool)
where
    I: Iterator<Item = &'a Coord<f64>>,
{
    let mut started = false;
    for c in coords {
        let (x, y) = projection.to_px(c.x, c.y);
        if started {
            pb.line_to(x, y);
        } else {
            pb.move_to(x, y);
            started = true;
        }
    }
    if started && close {
        pb.close();
    }
}

/// Mask covering everything inside a ring, interior rings included.
pub fn ring_mask(width: u32, height: u32, ring: &LineString<f64>, projection: &MapProjection) -> Option<Mask> {
    let mut mask = Mask::new(width, height)?;
    let mut pb = PathBuilder::new();
    append_coords(&mut pb, ring.0.iter(), projection, true);
    if let Some(path) = pb.finish() {
        mask.fill_path(&path, FillRule::Winding, true, Transform::identity());
    }
    Some(mask)
}

/// Mask covering a pixel rectangle.
pub fn rect_mask(width: u32, height: u32, rect: Rect) -> Option<Mask> {
    let mut mask = Mask::new(width, height)?;
    let path = PathBuilder::from_rect(rect);
    mask.fill_path(&path, FillRule::Winding, false, Transform::identity());
    Some(mask)
}

pub fn solid_paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color.to_skia());
    paint.anti_alias = true;
    paint
}

/// Stroke definition for a pixel width and pattern.
pub fn stroke_for(width_px: f32, pattern: StrokePattern) -> Stroke {
    let dash = match pattern {
        StrokePattern::Solid => None,
        StrokePattern::Dashed => StrokeDash::new(vec![3.7 * width_px.max(1.0), 1.6 * width_px.max(1.0)], 0.0),
        StrokePattern::Dotted => StrokeDash::new(vec![width_px.max(1.0), 1.65 * width_px.max(1.0)], 0.0),
    };

    Stroke {
        width: width_px,
        line_cap: if pattern == StrokePattern::Dotted {
            LineCap::Round
        } else {
            LineCap::Butt
        },
        line_join: LineJoin::Round,
        dash,
        ..Stroke::default()
    }
}

/// Draw one vector layer geometry with its style.
pub fn draw_geometry(
    pixmap: &mut Pixmap,
    geometry: &Geometry<f64>,
    style: &LayerStyle,
    px_per_pt: f32,
    projection: &MapProjection,
    mask: Option<&Mask>,
) {
    let width_px = style.line_width_pt * px_per_pt;
    let stroke = stroke_for(width_px, style.pattern);
    let stroke_paint = solid_paint(style.stroke_color());

    let stroke_line = |pixmap: &mut Pixmap, line: &LineString<f64>| {
        if let Some(path) = line_path(line, projection) {
            pixmap.stroke_path(&path, &stroke_paint, &stroke, Transform::identity(), mask);
        }
    };

    match geometry {
        Geometry::Point(p) => draw_marker(pixmap, p.x(), p.y(), width_px * 1.5, style, projection, mask),
        Geometry::MultiPoint(mp) => {
            for p in &mp.0 {
                draw_marker(pixmap, p.x(), p.y(), width_px * 1.5, style, projection, mask);
            }
        }
        Geometry::Line(l) => stroke_line(pixmap, &LineString::new(vec![l.start, l.end])),
        Geometry::LineString(ls) => stroke_line(pixmap, ls),
        Geometry::MultiLineString(mls) => {
            for ls in &mls.0 {
                stroke_line(pixmap, ls);
            }
        }
        Geometry::Polygon(p) => draw_polygons(pixmap, std::slice::from_ref(p), style, &stroke, projection, mask),
        Geometry::MultiPolygon(mp) => draw_polygons(pixmap, &mp.0, style, &stroke, projection, mask),
        Geometry::Rect(r) => draw_polygons(pixmap, &[r.to_polygon()], style, &stroke, projection, mask),
        Geometry::Triangle(t) => draw_polygons(pixmap, &[t.to_polygon()], style, &stroke, projection, mask),
        Geometry::GeometryCollection(gc) => {
            for g in &gc.0 {
                draw_geometry(pixmap, g, style, px_per_pt, projection, mask);
            }
        }
    }
}

fn draw_polygons(
    pixmap: &mut Pixmap,
    polygons: &[Polygon<f64>],
    style: &LayerStyle,
    stroke: &Stroke,
    projection: &MapProjection,
    mask: Option<&Mask>,
) {
    let Some(path) = polygons_path(polygons, projection) else {
        return;
    };
    if let Some(fill) = style.fill_color() {
        pixmap.fill_path(&path, &solid_paint(fill), FillRule::EvenOdd, Transform::identity(), mask);
    }
    pixmap.stroke_path(
        &path,
        &solid_paint(style.stroke_color()),
        stroke,
        Transform::identity(),
        mask,
    );
}

fn draw_marker(
    pixmap: &mut Pixmap,
    x: f64,
    y: f64,
    radius_px: f32,
    style: &LayerStyle,
    projection: &MapProjection,
    mask: Option<&Mask>,
) {
    let (cx, cy) = projection.to_px(x, y);
    if let Some(circle) = PathBuilder::from_circle(cx, cy, radius_px.max(0.5)) {
        pixmap.fill_path(
            &circle,
            &solid_paint(style.stroke_color()),
            FillRule::Winding,
            Transform::identity(),
            mask,
        );
    }
}

/// Filled circle with an outline, e.g. a sample marker.
#[allow(clippy::too_many_arguments)]
pub fn draw_circle(
    pixmap: &mut Pixmap,
    cx: f32,
    cy: f32,
    radius_px: f32,
    fill: Color,
    edge: Color,
    edge_width_px: f32,
    mask: Option<&Mask>,
) {
    let Some(circle) = PathBuilder::from_circle(cx, cy, radius_px) else {
        return;
    };
    pixmap.fill_path(&circle, &solid_paint(fill), FillRule::Winding, Transform::identity(), mask);
    if edge_width_px > 0.0 {
        let stroke = stroke_for(edge_width_px, StrokePattern::Solid);
        pixmap.stroke_path(&circle, &solid_paint(edge), &stroke, Transform::identity(), mask);
    }
}
