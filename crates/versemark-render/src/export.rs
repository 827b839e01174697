//! PNG export of rendered surfaces.

use crate::error::{RenderError, RenderResult};
use crate::surface::Surface;

/// Encode a surface to PNG bytes.
pub fn encode_png(surface: &Surface) -> RenderResult<Vec<u8>> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, surface.width(), surface.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| RenderError::Encode(format!("header: {}", e)))?;
        writer
            .write_image_data(surface.as_raw())
            .map_err(|e| RenderError::Encode(format!("data: {}", e)))?;
    }
    log::debug!("Encoded {}x{} PNG, {} bytes", surface.width(), surface.height(), png_data.len());
    Ok(png_data)
}
