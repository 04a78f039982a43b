//! Static background image loading for image mode.

use std::path::Path;

use crate::error::{Error, Result};
use crate::image::resize_bilinear;

/// Load a PNG (or any format the `image` crate decodes), convert to RGB and
/// bilinearly resize into an owned `3 * width * height` buffer.
pub fn load_background(path: &Path, width: usize, height: usize) -> Result<Vec<u8>> {
    let img = image::open(path)
        .map_err(|e| Error::Resource(format!("failed to load background {}: {e}", path.display())))?
        .into_rgb8();

    let (img_w, img_h) = (img.width() as usize, img.height() as usize);
    let raw = img.into_raw();

    let mut out = vec![0u8; 3 * width * height];
    resize_bilinear(&raw, &mut out, img_w, img_h, width, height, 3);
    Ok(out)
}
