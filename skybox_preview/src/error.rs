use crate::face::Face;
use std::path::PathBuf;

/// Failures while turning a bitmap into a face texture. Neither is fatal: the face keeps its old
/// texture (invalid bitmap) or is drawn untextured (allocation failure).
#[derive(thiserror::Error, Debug)]
pub enum TextureError {
    #[error("invalid bitmap: {0}")]
    InvalidBitmap(String),

    #[error("texture allocation failed: {0}")]
    ResourceExhaustion(String),
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum StagingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Bitmap(#[from] TextureError),

    #[error("no face images found in {}", .0.display())]
    EmptyDirectory(PathBuf),
}

#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error("a skybox title is required to name the output folder")]
    MissingTitle,

    #[error("output folder {} already exists", .0.display())]
    OutputExists(PathBuf),

    #[error("face `{0}` has no image")]
    MissingFace(Face),

    #[error("no stretch image has been loaded")]
    MissingStretch,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}
