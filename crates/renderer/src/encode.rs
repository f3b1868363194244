//! Transport encoding of rendered figures.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use heatmap_common::{HeatmapError, HeatmapResult};

use crate::compositor::RasterImage;
use crate::png::create_png_auto;

/// Encode a figure as PNG, indexed when it has at most 256 colors.
pub fn encode_png(image: &RasterImage) -> HeatmapResult<Vec<u8>> {
    create_png_auto(&image.to_rgba(), image.width() as usize, image.height() as usize)
        .map_err(HeatmapError::EncodeError)
}

/// Standard-alphabet, padded base64.
pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_padding() {
        assert_eq!(encode_base64(b"ab"), "YWI=");
        assert_eq!(encode_base64(&[0x89, b'P', b'N', b'G']), "iVBORw==");
    }
}
