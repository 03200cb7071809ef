//! Everything that touches image files: the working copies the preview is fed from and the
//! exported skybox folder. None of this runs on the render path.

mod export;
mod staging;

pub use export::{export_skybox, swap_red_blue, ExportRequest};
pub use staging::{SourceMode, Staging};

use crate::error::TextureError;
use image::DynamicImage;
use std::path::Path;

/// Decodes an in-memory image file (png, jpeg, bmp, gif, tiff).
pub fn decode_bitmap(bytes: &[u8]) -> Result<DynamicImage, TextureError> {
    image::load_from_memory(bytes).map_err(|e| TextureError::InvalidBitmap(e.to_string()))
}

/// Reads and decodes an image file. The format is taken from the file contents, not the
/// extension.
pub fn load_bitmap(path: &Path) -> Result<DynamicImage, TextureError> {
    let bytes = std::fs::read(path)
        .map_err(|e| TextureError::InvalidBitmap(format!("{}: {e}", path.display())))?;
    decode_bitmap(&bytes)
        .map_err(|e| TextureError::InvalidBitmap(format!("{}: {e}", path.display())))
}
