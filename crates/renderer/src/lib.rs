//! Heatmap figure rendering.
//!
//! Turns an interpolation grid plus region assets into a cropped,
//! transparent-background raster:
//! - Named color scales and the default `classic_custom` gradient
//! - Boundary clipping with tiny-skia masks
//! - Name-driven vector layer styling
//! - Colorbar legend and tight crop
//! - PNG (indexed or RGBA) and base64 encoding

pub mod colorbar;
pub mod colormap;
pub mod compositor;
pub mod crop;
pub mod draw;
pub mod encode;
pub mod layers;
pub mod png;

pub use colormap::{Color, ColorScale};
pub use compositor::{render, MapProjection, RasterImage, RenderStyle};
pub use encode::{encode_base64, encode_png};
pub use layers::{style_for_layer, LayerStyle};
