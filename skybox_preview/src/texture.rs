mod gpu_textures;
mod texture_basic;
mod texture_cache;

pub use gpu_textures::{FaceTexture, GpuTextureBackend};
pub use texture_basic::Texture;
pub use texture_cache::{prepare_bitmap, CachedTexture, TextureBackend, TextureCache};

#[cfg(test)]
pub(crate) use texture_cache::tests as test_support;
