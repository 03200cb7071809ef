use super::load_bitmap;
use crate::error::StagingError;
use crate::face::{Face, Slot};
use crate::mesh::RenderMode;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where the skybox comes from: one image per face, or a single image stretched around the
/// whole sphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceMode {
    #[default]
    SixImages,
    Stretch,
}

impl SourceMode {
    pub fn render_mode(self) -> RenderMode {
        match self {
            SourceMode::SixImages => RenderMode::FlatCube,
            SourceMode::Stretch => RenderMode::SphericalCube,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SourceMode::SixImages => SourceMode::Stretch,
            SourceMode::Stretch => SourceMode::SixImages,
        }
    }

    /// The slots whose images belong to this mode.
    pub fn slots(self) -> Vec<Slot> {
        match self {
            SourceMode::SixImages => Face::ALL.into_iter().map(Slot::Face).collect(),
            SourceMode::Stretch => vec![Slot::Stretch],
        }
    }
}

/// Resized working copies of every loaded image, kept both in memory and as PNGs in a temporary
/// folder. Rotations and flips rewrite the temporary copy.
pub struct Staging {
    temp_dir: PathBuf,
    face_size: u32,
    faces: [Option<DynamicImage>; Face::COUNT],
    stretch: Option<DynamicImage>,
}

impl Staging {
    pub fn new(temp_dir: impl Into<PathBuf>, face_size: u32) -> Result<Self, StagingError> {
        let temp_dir = temp_dir.into();
        std::fs::create_dir_all(&temp_dir)?;
        Ok(Self {
            temp_dir,
            face_size: face_size.max(1),
            faces: Default::default(),
            stretch: None,
        })
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    pub fn temp_path(&self, slot: Slot) -> PathBuf {
        self.temp_dir.join(format!("{}.png", slot.file_stem()))
    }

    pub fn get(&self, slot: Slot) -> Option<&DynamicImage> {
        match slot {
            Slot::Face(face) => self.faces[face.index()].as_ref(),
            Slot::Stretch => self.stretch.as_ref(),
        }
    }

    fn entry(&mut self, slot: Slot) -> &mut Option<DynamicImage> {
        match slot {
            Slot::Face(face) => &mut self.faces[face.index()],
            Slot::Stretch => &mut self.stretch,
        }
    }

    /// Loads `source`, resizes it to the staging size and stores it in `slot`.
    pub fn import(&mut self, slot: Slot, source: &Path) -> Result<&DynamicImage, StagingError> {
        let image = load_bitmap(source)?.resize_exact(
            self.face_size,
            self.face_size,
            FilterType::Lanczos3,
        );
        image.save_with_format(self.temp_path(slot), ImageFormat::Png)?;
        log::info!("staged {} as {slot}", source.display());
        Ok(&*self.entry(slot).insert(image))
    }

    /// Turns the image in `slot` a quarter turn clockwise. `None` if the slot is empty.
    pub fn rotate(&mut self, slot: Slot) -> Result<Option<&DynamicImage>, StagingError> {
        self.transform(slot, DynamicImage::rotate90)
    }

    /// Mirrors the image in `slot` left to right. `None` if the slot is empty.
    pub fn flip(&mut self, slot: Slot) -> Result<Option<&DynamicImage>, StagingError> {
        self.transform(slot, DynamicImage::fliph)
    }

    fn transform(
        &mut self,
        slot: Slot,
        op: fn(&DynamicImage) -> DynamicImage,
    ) -> Result<Option<&DynamicImage>, StagingError> {
        let path = self.temp_path(slot);
        let Some(image) = self.entry(slot).as_mut() else {
            return Ok(None);
        };
        // The copy in memory only changes once the temp file has been written.
        let edited = op(image);
        edited.save_with_format(path, ImageFormat::Png)?;
        *image = edited;
        Ok(Some(&*image))
    }

    /// Imports every file in `dir` whose name ends in a face suffix and `.png` (`sky_ft.png`,
    /// `SKY_BK.PNG`). Returns the faces that were filled.
    pub fn bulk_import(&mut self, dir: &Path) -> Result<Vec<Face>, StagingError> {
        let mut imported = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let Some(face) = name.to_str().and_then(Face::from_file_name) else {
                continue;
            };
            match self.import(face.into(), &entry.path()) {
                Ok(_) => imported.push(face),
                Err(e) => log::warn!("skipping {}: {e}", entry.path().display()),
            }
        }

        if imported.is_empty() {
            return Err(StagingError::EmptyDirectory(dir.to_path_buf()));
        }
        imported.sort();
        imported.dedup();
        Ok(imported)
    }

    /// Deletes the temporary copies this staging area writes (`ft.png` .. `stretch.png`). Other
    /// files in the folder are left alone. Images already in memory stay.
    pub fn clear_temp(&self) -> Result<(), StagingError> {
        for slot in Slot::ALL {
            match std::fs::remove_file(self.temp_path(slot)) {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => return Err(e.into()),
                _ => (),
            }
        }
        Ok(())
    }
}
