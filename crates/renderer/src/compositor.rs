//! Figure composition: heat raster, vector layers, boundary, samples, colorbar.
//!
//! Draw order, bottom to top:
//! 1. heat raster, clipped to the outer ring of the boundary's largest part
//! 2. vector layers, by z then request order
//! 3. boundary outline (all parts and rings)
//! 4. sample markers
//!
//! The colorbar sits to the right of the map. The finished figure is cropped
//! to its visible content on a transparent background.

use std::time::Instant;

use tiny_skia::{ColorU8, Pixmap, PixmapPaint, Rect, Transform};
use tracing::debug;

use heatmap_common::{DisplayExtent, HeatmapError, HeatmapResult, RenderOptions, SamplePoint};
use interpolation::InterpolationGrid;
use region_assets::{BoundaryPolygon, VectorLayer};

use crate::colorbar::{draw_colorbar, ColorbarLayout};
use crate::colormap::{normalize, Color, ColorScale};
use crate::crop::tight_crop;
use crate::draw::{draw_circle, draw_geometry, polygons_path, rect_mask, ring_mask, solid_paint, stroke_for};
use crate::layers::{style_for_layer, StrokePattern};

/// Per-call figure configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderStyle {
    /// Width of the map area in pixels.
    pub map_width_px: u32,
    /// Upper bound on map height; very tall extents shrink the width instead.
    pub max_map_height_px: u32,
    /// Resolution used to convert point sizes to pixels.
    pub dpi: f32,
    pub margin_px: u32,
    pub colorbar_gap_px: u32,
    pub colorbar_width_px: u32,
    /// Colorbar height relative to the map height.
    pub colorbar_fraction: f32,
    pub colorbar_ticks: usize,
    pub tick_length_px: u32,
    pub frame_width_pt: f32,
    pub boundary_width_pt: f32,
    pub point_edge_width_pt: f32,
    /// Transparent padding kept around the content after cropping.
    pub crop_padding_px: u32,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            map_width_px: 1200,
            max_map_height_px: 2400,
            dpi: 100.0,
            margin_px: 16,
            colorbar_gap_px: 24,
            colorbar_width_px: 28,
            colorbar_fraction: 0.75,
            colorbar_ticks: 5,
            tick_length_px: 6,
            frame_width_pt: 0.8,
            boundary_width_pt: 1.5,
            point_edge_width_pt: 0.5,
            crop_padding_px: 5,
        }
    }
}

impl RenderStyle {
    /// Style with a given map width and defaults elsewhere.
    pub fn with_map_width(map_width_px: u32) -> Self {
        Self {
            map_width_px,
            ..Self::default()
        }
    }

    pub fn pt_to_px(&self, pt: f32) -> f32 {
        pt * self.dpi / 72.0
    }

    /// Marker radius in pixels for a marker area of `size` pt².
    pub fn marker_radius_px(&self, size: f64) -> f32 {
        self.pt_to_px((size.max(0.0).sqrt() / 2.0) as f32)
    }
}

/// Equal-aspect mapping from geographic coordinates to figure pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapProjection {
    pub extent: DisplayExtent,
    /// Pixels per coordinate unit, identical on both axes.
    pub scale: f64,
    /// Pixel position of `extent.xmin`.
    pub origin_x: f64,
    /// Pixel position of `extent.ymax`.
    pub origin_y: f64,
}

impl MapProjection {
    pub fn to_px(&self, x: f64, y: f64) -> (f32, f32) {
        let (px, py) = self.to_px_f64(x, y);
        (px as f32, py as f32)
    }

    pub fn to_px_f64(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.origin_x + (x - self.extent.xmin) * self.scale,
            self.origin_y + (self.extent.ymax - y) * self.scale,
        )
    }

    pub fn to_geo(&self, px: f64, py: f64) -> (f64, f64) {
        (
            self.extent.xmin + (px - self.origin_x) / self.scale,
            self.extent.ymax - (py - self.origin_y) / self.scale,
        )
    }

    pub fn map_width_px(&self) -> f64 {
        self.extent.width() * self.scale
    }

    fn extent_contains(&self, x: f64, y: f64) -> bool {
        x >= self.extent.xmin && x <= self.extent.xmax && y >= self.extent.ymin && y <= self.extent.ymax
    }

    pub fn map_height_px(&self) -> f64 {
        self.extent.height() * self.scale
    }

    /// Same projection after the figure moved by `(dx, dy)` pixels.
    pub fn shifted(&self, dx: f64, dy: f64) -> Self {
        Self {
            origin_x: self.origin_x + dx,
            origin_y: self.origin_y + dy,
            ..*self
        }
    }
}

/// Final composited figure.
#[derive(Debug, Clone)]
pub struct RasterImage {
    pixmap: Pixmap,
    projection: MapProjection,
}

impl RasterImage {
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Projection of the map area within this image.
    pub fn projection(&self) -> &MapProjection {
        &self.projection
    }

    /// Straight-alpha color of a pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<ColorU8> {
        self.pixmap.pixel(x, y).map(|p| p.demultiply())
    }

    /// Pixel containing a geographic coordinate, if inside the image.
    pub fn geo_to_pixel(&self, x: f64, y: f64) -> Option<(u32, u32)> {
        let (px, py) = self.projection.to_px_f64(x, y);
        if px < 0.0 || py < 0.0 {
            return None;
        }
        let (px, py) = (px.floor() as u32, py.floor() as u32);
        (px < self.width() && py < self.height()).then_some((px, py))
    }

    /// Straight-alpha RGBA bytes, row-major.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixmap.pixels().len() * 4);
        for p in self.pixmap.pixels() {
            let c = p.demultiply();
            out.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        out
    }
}

/// Pixel layout of the figure before cropping.
#[derive(Debug, Clone, Copy)]
struct FigureLayout {
    width: u32,
    height: u32,
    projection: MapProjection,
    map_rect: Rect,
    colorbar: ColorbarLayout,
}

impl FigureLayout {
    fn new(extent: DisplayExtent, style: &RenderStyle) -> HeatmapResult<Self> {
        let mut scale = style.map_width_px as f64 / extent.width();
        if extent.height() * scale > style.max_map_height_px as f64 {
            scale = style.max_map_height_px as f64 / extent.height();
        }

        let map_w = extent.width() * scale;
        let map_h = extent.height() * scale;
        if !(map_w >= 1.0 && map_h >= 1.0) {
            return Err(HeatmapError::InputMalformed(format!(
                "display extent {:?} is too narrow to render",
                extent
            )));
        }

        let margin = style.margin_px as f64;
        let projection = MapProjection {
            extent,
            scale,
            origin_x: margin,
            origin_y: margin,
        };

        let map_rect = Rect::from_xywh(margin as f32, margin as f32, map_w as f32, map_h as f32)
            .ok_or_else(|| HeatmapError::RenderError("invalid map rectangle".to_string()))?;

        let bar_height = (map_h * style.colorbar_fraction as f64) as f32;
        let colorbar = ColorbarLayout {
            x: (margin + map_w.ceil()) as f32 + style.colorbar_gap_px as f32,
            y: (margin + (map_h - bar_height as f64) / 2.0) as f32,
            width: style.colorbar_width_px as f32,
            height: bar_height.max(1.0),
            frame_width_px: style.pt_to_px(style.frame_width_pt),
            tick_length_px: style.tick_length_px as f32,
            ticks: style.colorbar_ticks,
        };

        let width = (margin + map_w.ceil()) as u32
            + style.colorbar_gap_px
            + style.colorbar_width_px
            + style.tick_length_px
            + style.margin_px;
        let height = (2.0 * margin + map_h.ceil()) as u32;

        Ok(Self {
            width,
            height,
            projection,
            map_rect,
            colorbar,
        })
    }
}

/// Composite a heatmap figure.
///
/// `samples` are only drawn when `options.show_points` is set.
pub fn render(
    grid: &InterpolationGrid,
    boundary: &BoundaryPolygon,
    layers: &[VectorLayer],
    samples: &[SamplePoint],
    options: &RenderOptions,
    style: &RenderStyle,
) -> HeatmapResult<RasterImage> {
    let start = Instant::now();

    let extent = options.display_extent();
    if !extent.is_valid() {
        return Err(HeatmapError::InputMalformed(format!(
            "display extent must satisfy min < max on both axes, got {:?}",
            extent
        )));
    }

    let scale = ColorScale::by_name(&options.colormap)?;
    let layout = FigureLayout::new(extent, style)?;
    let projection = layout.projection;

    let mut canvas = Pixmap::new(layout.width, layout.height).ok_or_else(|| {
        HeatmapError::RenderError(format!("cannot allocate {}x{} canvas", layout.width, layout.height))
    })?;

    // Heat raster, clipped to the outer ring of the main boundary part; holes keep their heat
    let heat = heat_pixmap(grid, &scale, &layout)?;
    let clip = ring_mask(layout.width, layout.height, boundary.clip.exterior(), &projection)
        .ok_or_else(|| HeatmapError::RenderError("cannot allocate clip mask".to_string()))?;
    canvas.draw_pixmap(0, 0, heat.as_ref(), &PixmapPaint::default(), Transform::identity(), Some(&clip));

    let map_mask = rect_mask(layout.width, layout.height, layout.map_rect)
        .ok_or_else(|| HeatmapError::RenderError("cannot allocate map mask".to_string()))?;

    // Vector layers; sort_by_key is stable so equal z keeps request order
    let mut ordered: Vec<&VectorLayer> = layers.iter().collect();
    ordered.sort_by_key(|layer| style_for_layer(&layer.name).z);
    let px_per_pt = style.pt_to_px(1.0);
    for layer in ordered {
        let layer_style = style_for_layer(&layer.name);
        for geometry in &layer.geometries {
            draw_geometry(&mut canvas, geometry, &layer_style, px_per_pt, &projection, Some(&map_mask));
        }
    }

    // Boundary outline
    if let Some(path) = polygons_path(&boundary.parts.0, &projection) {
        let stroke = stroke_for(style.pt_to_px(style.boundary_width_pt), StrokePattern::Solid);
        canvas.stroke_path(&path, &solid_paint(Color::BLACK), &stroke, Transform::identity(), Some(&map_mask));
    }

    if options.show_points {
        let radius = style.marker_radius_px(options.point_size);
        let edge = style.pt_to_px(style.point_edge_width_pt);
        for p in samples.iter().filter(|p| p.is_finite()) {
            let (cx, cy) = projection.to_px(p.x, p.y);
            draw_circle(&mut canvas, cx, cy, radius, Color::BLACK, Color::WHITE, edge, Some(&map_mask));
        }
    }

    draw_colorbar(&mut canvas, &scale, &layout.colorbar)?;

    let (pixmap, dx, dy) = tight_crop(canvas, style.crop_padding_px)?;

    debug!(
        width = pixmap.width(),
        height = pixmap.height(),
        layers = layers.len(),
        colormap = %scale.name(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Composited heatmap figure"
    );

    Ok(RasterImage {
        pixmap,
        projection: projection.shifted(dx as f64, dy as f64),
    })
}

/// Color every map pixel whose center falls inside the grid's region.
fn heat_pixmap(grid: &InterpolationGrid, scale: &ColorScale, layout: &FigureLayout) -> HeatmapResult<Pixmap> {
    let (min, max) = grid
        .min_max()
        .ok_or_else(|| HeatmapError::RenderError("interpolation grid has no finite values".to_string()))?;

    let mut heat = Pixmap::new(layout.width, layout.height)
        .ok_or_else(|| HeatmapError::RenderError("cannot allocate heat raster".to_string()))?;

    let projection = &layout.projection;
    let x0 = layout.map_rect.left().floor().max(0.0) as u32;
    let y0 = layout.map_rect.top().floor().max(0.0) as u32;
    let x1 = (layout.map_rect.right().ceil() as u32).min(layout.width);
    let y1 = (layout.map_rect.bottom().ceil() as u32).min(layout.height);

    let width = layout.width as usize;
    let pixels = heat.pixels_mut();
    for py in y0..y1 {
        for px in x0..x1 {
            let (x, y) = projection.to_geo(px as f64 + 0.5, py as f64 + 0.5);
            if !projection.extent_contains(x, y) {
                continue;
            }
            if let Some(value) = grid.sample_bilinear(x, y) {
                let c = scale.color_at(normalize(value, min, max));
                pixels[py as usize * width + px as usize] = ColorU8::from_rgba(c.r, c.g, c.b, c.a).premultiply();
            }
        }
    }

    Ok(heat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_round_trip() {
        let p = MapProjection {
            extent: DisplayExtent::new(111.4, 113.3, 37.2, 38.5),
            scale: 100.0,
            origin_x: 10.0,
            origin_y: 20.0,
        };
        let (px, py) = p.to_px_f64(111.4, 38.5);
        assert_eq!((px, py), (10.0, 20.0));
        let (x, y) = p.to_geo(px + 50.0, py + 30.0);
        assert!((x - 111.9).abs() < 1e-9);
        assert!((y - 38.2).abs() < 1e-9);
    }

    #[test]
    fn test_layout_keeps_equal_aspect() {
        let style = RenderStyle::default();
        let layout = FigureLayout::new(DisplayExtent::new(0.0, 2.0, 0.0, 1.0), &style).unwrap();
        assert_eq!(layout.projection.map_width_px(), 1200.0);
        assert_eq!(layout.projection.map_height_px(), 600.0);
        assert!((layout.colorbar.height - 450.0).abs() < 1e-3);
    }

    #[test]
    fn test_tall_extent_is_capped() {
        let style = RenderStyle::default();
        let layout = FigureLayout::new(DisplayExtent::new(0.0, 1.0, 0.0, 10.0), &style).unwrap();
        assert_eq!(layout.projection.map_height_px(), 2400.0);
        assert_eq!(layout.projection.map_width_px(), 240.0);
    }

    #[test]
    fn test_marker_radius() {
        let style = RenderStyle {
            dpi: 72.0,
            ..RenderStyle::default()
        };
        assert_eq!(style.marker_radius_px(16.0), 2.0);
    }
}
