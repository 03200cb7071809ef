use crate::error::TextureError;
use crate::face::{Face, Slot};
use image::{DynamicImage, GenericImageView, RgbaImage};

/// Creates and releases the GPU side of a face texture. The cache only ever talks to the GPU
/// through this trait.
pub trait TextureBackend {
    type Handle;

    fn create(&mut self, label: &str, bitmap: &RgbaImage) -> Result<Self::Handle, TextureError>;

    fn release(&mut self, handle: Self::Handle);
}

/// A live texture and the size of the bitmap it was made from.
#[derive(Debug)]
pub struct CachedTexture<H> {
    pub handle: H,
    pub width: u32,
    pub height: u32,
}

/// Validates a bitmap and turns it into upload-ready RGBA8 with its rows reversed, so that the
/// top of the bitmap ends up at the top of the face.
pub fn prepare_bitmap(bitmap: &DynamicImage) -> Result<RgbaImage, TextureError> {
    let (width, height) = bitmap.dimensions();
    if width == 0 || height == 0 {
        return Err(TextureError::InvalidBitmap(format!(
            "bitmap has no pixels ({width}x{height})"
        )));
    }
    Ok(image::imageops::flip_vertical(&bitmap.to_rgba8()))
}

/// One slot per face plus the stretch slot. Each slot holds at most one live texture; an empty
/// slot is drawn untextured.
pub struct TextureCache<H> {
    faces: [Option<CachedTexture<H>>; Face::COUNT],
    stretch: Option<CachedTexture<H>>,
}

impl<H> Default for TextureCache<H> {
    fn default() -> Self {
        Self {
            faces: Default::default(),
            stretch: None,
        }
    }
}

impl<H> TextureCache<H> {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut Option<CachedTexture<H>> {
        match slot {
            Slot::Face(face) => &mut self.faces[face.index()],
            Slot::Stretch => &mut self.stretch,
        }
    }

    pub fn get(&self, slot: Slot) -> Option<&CachedTexture<H>> {
        match slot {
            Slot::Face(face) => self.faces[face.index()].as_ref(),
            Slot::Stretch => self.stretch.as_ref(),
        }
    }

    /// The texture to draw `face` with: its own, or the stretch image wrapped around the sphere.
    pub fn texture_for(&self, face: Face) -> Option<&H> {
        self.faces[face.index()]
            .as_ref()
            .or(self.stretch.as_ref())
            .map(|cached| &cached.handle)
    }

    pub fn live_count(&self) -> usize {
        self.faces.iter().chain(Some(&self.stretch)).flatten().count()
    }

    /// Replaces the texture in `slot` with `bitmap`.
    ///
    /// An invalid bitmap leaves the slot untouched. Otherwise the old texture is released before
    /// the new one is created, and if creation fails the slot stays empty.
    pub fn upload<B>(
        &mut self,
        backend: &mut B,
        slot: Slot,
        bitmap: &DynamicImage,
    ) -> Result<&CachedTexture<H>, TextureError>
    where
        B: TextureBackend<Handle = H>,
    {
        let rgba = prepare_bitmap(bitmap)?;
        let (width, height) = rgba.dimensions();

        let entry = self.slot_mut(slot);
        if let Some(old) = entry.take() {
            log::debug!("releasing {slot} texture ({}x{})", old.width, old.height);
            backend.release(old.handle);
        }

        let handle = backend.create(&format!("{slot}_texture"), &rgba)?;
        log::info!("uploaded {slot} texture ({width}x{height})");
        Ok(&*entry.insert(CachedTexture {
            handle,
            width,
            height,
        }))
    }

    /// Releases every texture.
    pub fn clear<B>(&mut self, backend: &mut B)
    where
        B: TextureBackend<Handle = H>,
    {
        let mut released = 0;
        for entry in self.faces.iter_mut().chain(Some(&mut self.stretch)) {
            if let Some(cached) = entry.take() {
                backend.release(cached.handle);
                released += 1;
            }
        }
        log::debug!("cleared {released} textures");
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::Rgba;

    /// Hands out numbered handles and tracks which are still alive.
    #[derive(Default)]
    pub(crate) struct RecordingBackend {
        next: u32,
        pub(crate) live: Vec<u32>,
        pub(crate) uploads: Vec<RgbaImage>,
        pub(crate) fail_next: bool,
    }

    impl TextureBackend for RecordingBackend {
        type Handle = u32;

        fn create(&mut self, label: &str, bitmap: &RgbaImage) -> Result<u32, TextureError> {
            if std::mem::take(&mut self.fail_next) {
                return Err(TextureError::ResourceExhaustion(label.to_string()));
            }
            self.next += 1;
            self.live.push(self.next);
            self.uploads.push(bitmap.clone());
            Ok(self.next)
        }

        fn release(&mut self, handle: u32) {
            self.live.retain(|&h| h != handle);
        }
    }

    pub(crate) fn solid(width: u32, height: u32, color: [u8; 4]) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(color)))
    }

    #[test]
    fn upload_fills_a_slot() {
        let mut backend = RecordingBackend::default();
        let mut cache = TextureCache::new();

        let cached = cache
            .upload(&mut backend, Face::Up.into(), &solid(4, 2, [255, 0, 0, 255]))
            .unwrap();
        assert_eq!((cached.width, cached.height), (4, 2));
        assert_eq!(cache.texture_for(Face::Up), Some(&1));
        assert_eq!(cache.texture_for(Face::Down), None);
        assert_eq!(cache.live_count(), 1);
    }

    #[test]
    fn replacing_a_texture_releases_the_old_one() {
        let mut backend = RecordingBackend::default();
        let mut cache = TextureCache::new();
        let bitmap = solid(4, 4, [0, 0, 255, 255]);

        cache.upload(&mut backend, Face::Left.into(), &bitmap).unwrap();
        cache.upload(&mut backend, Face::Left.into(), &bitmap).unwrap();
        cache.upload(&mut backend, Face::Left.into(), &bitmap).unwrap();

        assert_eq!(backend.live, vec![3]);
        assert_eq!(cache.live_count(), 1);
        assert_eq!(cache.texture_for(Face::Left), Some(&3));
    }

    #[test]
    fn invalid_bitmap_keeps_the_previous_texture() {
        let mut backend = RecordingBackend::default();
        let mut cache = TextureCache::new();
        cache
            .upload(&mut backend, Face::Front.into(), &solid(2, 2, [1, 2, 3, 255]))
            .unwrap();

        let result = cache.upload(&mut backend, Face::Front.into(), &DynamicImage::new_rgba8(0, 0));
        assert!(matches!(result, Err(TextureError::InvalidBitmap(_))));
        assert_eq!(cache.texture_for(Face::Front), Some(&1));
        assert_eq!(backend.live, vec![1]);
    }

    #[test]
    fn allocation_failure_leaves_the_face_untextured() {
        let mut backend = RecordingBackend::default();
        let mut cache = TextureCache::new();
        cache
            .upload(&mut backend, Face::Back.into(), &solid(2, 2, [1, 2, 3, 255]))
            .unwrap();

        backend.fail_next = true;
        let result = cache.upload(&mut backend, Face::Back.into(), &solid(2, 2, [9, 9, 9, 255]));
        assert!(matches!(result, Err(TextureError::ResourceExhaustion(_))));
        assert!(cache.get(Face::Back.into()).is_none());
        assert!(backend.live.is_empty());
    }

    #[test]
    fn clear_empties_every_slot() {
        let mut backend = RecordingBackend::default();
        let mut cache = TextureCache::new();
        for face in Face::ALL {
            cache
                .upload(&mut backend, face.into(), &solid(1, 1, [0, 0, 0, 255]))
                .unwrap();
        }
        cache
            .upload(&mut backend, Slot::Stretch, &solid(1, 1, [0, 0, 0, 255]))
            .unwrap();
        assert_eq!(cache.live_count(), 7);

        cache.clear(&mut backend);
        assert_eq!(cache.live_count(), 0);
        assert!(backend.live.is_empty());
        for face in Face::ALL {
            assert!(cache.get(face.into()).is_none());
            assert!(cache.texture_for(face).is_none());
        }
    }

    #[test]
    fn stretch_texture_covers_faces_without_their_own() {
        let mut backend = RecordingBackend::default();
        let mut cache = TextureCache::new();
        cache
            .upload(&mut backend, Slot::Stretch, &solid(8, 4, [0, 255, 0, 255]))
            .unwrap();
        cache
            .upload(&mut backend, Face::Down.into(), &solid(2, 2, [0, 0, 0, 255]))
            .unwrap();

        assert_eq!(cache.texture_for(Face::Up), Some(&1));
        assert_eq!(cache.texture_for(Face::Down), Some(&2));
    }

    #[test]
    fn uploads_are_rgba_and_flipped_vertically() {
        let mut bitmap = image::RgbImage::new(1, 2);
        bitmap.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        bitmap.put_pixel(0, 1, image::Rgb([0, 0, 255]));

        let mut backend = RecordingBackend::default();
        let mut cache = TextureCache::new();
        cache
            .upload(&mut backend, Face::Right.into(), &DynamicImage::ImageRgb8(bitmap))
            .unwrap();

        let uploaded = &backend.uploads[0];
        assert_eq!(uploaded.get_pixel(0, 0), &Rgba([0, 0, 255, 255]));
        assert_eq!(uploaded.get_pixel(0, 1), &Rgba([255, 0, 0, 255]));
    }
}
