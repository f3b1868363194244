//! Tight cropping of a rendered figure to its visible content.

use tiny_skia::{BlendMode, Pixmap, PixmapPaint, Transform};

use heatmap_common::{HeatmapError, HeatmapResult};

/// Inclusive pixel bounds `(min_x, min_y, max_x, max_y)` of non-transparent content.
pub fn content_bounds(pixmap: &Pixmap) -> Option<(u32, u32, u32, u32)> {
    let width = pixmap.width();
    let mut bounds: Option<(u32, u32, u32, u32)> = None;

    for (idx, pixel) in pixmap.pixels().iter().enumerate() {
        if pixel.alpha() == 0 {
            continue;
        }
        let x = idx as u32 % width;
        let y = idx as u32 / width;
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }

    bounds
}

/// Crop to the content bounds plus `padding` pixels on every side.
///
/// Returns the cropped pixmap and the offset `(dx, dy)` that maps a pixel
/// position in the source onto the cropped image. A fully transparent
/// pixmap is returned unchanged.
pub fn tight_crop(pixmap: Pixmap, padding: u32) -> HeatmapResult<(Pixmap, i32, i32)> {
    let Some((x0, y0, x1, y1)) = content_bounds(&pixmap) else {
        return Ok((pixmap, 0, 0));
    };

    let width = x1 - x0 + 1 + 2 * padding;
    let height = y1 - y0 + 1 + 2 * padding;
    let mut cropped = Pixmap::new(width, height)
        .ok_or_else(|| HeatmapError::RenderError(format!("cannot allocate {}x{} crop", width, height)))?;

    let dx = padding as i32 - x0 as i32;
    let dy = padding as i32 - y0 as i32;
    let paint = PixmapPaint {
        blend_mode: BlendMode::Source,
        ..PixmapPaint::default()
    };
    cropped.draw_pixmap(dx, dy, pixmap.as_ref(), &paint, Transform::identity(), None);

    Ok((cropped, dx, dy))
}
