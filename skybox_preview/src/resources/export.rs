use super::staging::{SourceMode, Staging};
use crate::error::ExportError;
use crate::face::{Face, Slot};
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::path::PathBuf;

/// Where and how a skybox pack is written. The pack lands in `output_root/title`.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub title: String,
    pub output_root: PathBuf,
    pub file_prefix: String,
    /// Replace an existing pack of the same title instead of failing.
    pub overwrite: bool,
}

/// The texture variant of a face stores its pixels as BGRA, so red and blue trade places.
pub fn swap_red_blue(image: &DynamicImage) -> RgbaImage {
    let mut rgba = image.to_rgba8();
    for pixel in rgba.pixels_mut() {
        pixel.0.swap(0, 2);
    }
    rgba
}

/// Writes `<prefix><suffix>.png` and `<prefix><suffix>.tex` for all six faces and returns the
/// folder they were written to. Every image is checked before anything touches the disk.
pub fn export_skybox(
    staging: &Staging,
    mode: SourceMode,
    request: &ExportRequest,
) -> Result<PathBuf, ExportError> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(ExportError::MissingTitle);
    }

    let images = face_images(staging, mode)?;

    let output = request.output_root.join(title);
    if output.exists() {
        if !request.overwrite {
            return Err(ExportError::OutputExists(output));
        }
        log::info!("replacing {}", output.display());
        std::fs::remove_dir_all(&output)?;
    }
    std::fs::create_dir_all(&output)?;

    for (face, image) in Face::ALL.into_iter().zip(images) {
        let stem = format!("{}{}", request.file_prefix, face.suffix());
        image.save_with_format(output.join(format!("{stem}.png")), ImageFormat::Png)?;
        swap_red_blue(image)
            .save_with_format(output.join(format!("{stem}.tex")), ImageFormat::Png)?;
    }

    log::info!("skybox written to {}", output.display());
    Ok(output)
}

fn face_images(staging: &Staging, mode: SourceMode) -> Result<Vec<&DynamicImage>, ExportError> {
    match mode {
        SourceMode::SixImages => Face::ALL
            .into_iter()
            .map(|face| staging.get(face.into()).ok_or(ExportError::MissingFace(face)))
            .collect(),
        SourceMode::Stretch => {
            let stretch = staging
                .get(Slot::Stretch)
                .ok_or(ExportError::MissingStretch)?;
            Ok(vec![stretch; Face::COUNT])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgba};
    use std::path::Path;

    fn write_png(path: &Path, color: [u8; 4]) {
        RgbaImage::from_pixel(4, 4, Rgba(color)).save(path).unwrap();
    }

    fn request(root: &Path, title: &str) -> ExportRequest {
        ExportRequest {
            title: title.to_string(),
            output_root: root.to_path_buf(),
            file_prefix: "sky512_".to_string(),
            overwrite: false,
        }
    }

    fn staged_faces(root: &Path) -> Staging {
        let mut staging = Staging::new(root.join("temp"), 4).unwrap();
        for face in Face::ALL {
            let source = root.join(format!("in_{}.png", face.suffix()));
            write_png(&source, [200, 100, 50, 255]);
            staging.import(face.into(), &source).unwrap();
        }
        staging
    }

    #[test]
    fn swap_exchanges_red_and_blue_only() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([10, 20, 30, 40])));
        assert_eq!(swap_red_blue(&image).get_pixel(0, 0), &Rgba([30, 20, 10, 40]));
    }

    #[test]
    fn six_image_export_writes_png_and_tex_for_every_face() {
        let dir = tempfile::tempdir().unwrap();
        let staging = staged_faces(dir.path());

        let request = request(dir.path(), " night ");
        let output = export_skybox(&staging, SourceMode::SixImages, &request).unwrap();
        assert_eq!(output, dir.path().join("night"));

        for face in Face::ALL {
            let png = image::open(output.join(format!("sky512_{}.png", face.suffix()))).unwrap();
            assert_eq!(png.get_pixel(0, 0), Rgba([200, 100, 50, 255]));
            let tex = image::load(
                std::io::BufReader::new(
                    std::fs::File::open(output.join(format!("sky512_{}.tex", face.suffix())))
                        .unwrap(),
                ),
                ImageFormat::Png,
            )
            .unwrap();
            assert_eq!(tex.get_pixel(0, 0), Rgba([50, 100, 200, 255]));
        }
    }

    #[test]
    fn missing_face_is_reported_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("in.png");
        write_png(&source, [1, 2, 3, 255]);
        let mut staging = Staging::new(dir.path().join("temp"), 4).unwrap();
        staging.import(Face::Front.into(), &source).unwrap();

        let result = export_skybox(&staging, SourceMode::SixImages, &request(dir.path(), "sky"));
        assert!(matches!(result, Err(ExportError::MissingFace(Face::Back))));
        assert!(!dir.path().join("sky").exists());
    }

    #[test]
    fn stretch_export_repeats_the_stretch_image() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("pano.png");
        write_png(&source, [9, 8, 7, 255]);
        let mut staging = Staging::new(dir.path().join("temp"), 4).unwrap();

        assert!(matches!(
            export_skybox(&staging, SourceMode::Stretch, &request(dir.path(), "pano")),
            Err(ExportError::MissingStretch)
        ));

        staging.import(Slot::Stretch, &source).unwrap();
        let output =
            export_skybox(&staging, SourceMode::Stretch, &request(dir.path(), "pano")).unwrap();
        for face in Face::ALL {
            assert!(output.join(format!("sky512_{}.png", face.suffix())).exists());
            assert!(output.join(format!("sky512_{}.tex", face.suffix())).exists());
        }
    }

    #[test]
    fn blank_title_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let staging = staged_faces(dir.path());
        assert!(matches!(
            export_skybox(&staging, SourceMode::SixImages, &request(dir.path(), "   ")),
            Err(ExportError::MissingTitle)
        ));
    }

    #[test]
    fn existing_output_needs_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let staging = staged_faces(dir.path());
        let existing = dir.path().join("sky");
        std::fs::create_dir(&existing).unwrap();
        std::fs::write(existing.join("stale.txt"), "old").unwrap();

        let mut req = request(dir.path(), "sky");
        assert!(matches!(
            export_skybox(&staging, SourceMode::SixImages, &req),
            Err(ExportError::OutputExists(_))
        ));

        req.overwrite = true;
        export_skybox(&staging, SourceMode::SixImages, &req).unwrap();
        assert!(!existing.join("stale.txt").exists());
        assert!(existing.join("sky512_ft.png").exists());
    }
}
