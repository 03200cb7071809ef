use anyhow::Context;
use clap::{Parser, Subcommand};
use skybox_preview::config::{PreviewConfig, DEFAULT_CONFIG_FILE};
use skybox_preview::face::Slot;
use skybox_preview::resources::{export_skybox, ExportRequest, SourceMode, Staging};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "skybox_preview", version, about = "Preview and export cube-mapped skyboxes")]
struct Cli {
    /// Settings file; defaults apply when it does not exist.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the interactive 3D preview.
    Preview {
        /// Folder of `*ft.png`, `*bk.png`, ... face images.
        #[arg(long, conflicts_with = "stretch")]
        faces: Option<PathBuf>,

        /// A single image stretched around the whole sky.
        #[arg(long)]
        stretch: Option<PathBuf>,
    },
    /// Write a skybox pack without opening a window.
    Export {
        /// Name of the output folder.
        #[arg(long)]
        title: String,

        #[arg(long, conflicts_with = "stretch", required_unless_present = "stretch")]
        faces: Option<PathBuf>,

        #[arg(long)]
        stretch: Option<PathBuf>,

        /// Folder the pack is created in; overrides the config.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Replace an existing pack of the same title.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

/// Fills a fresh staging area from the command line sources and picks the matching source mode.
fn stage(
    config: &PreviewConfig,
    faces: Option<&Path>,
    stretch: Option<&Path>,
) -> anyhow::Result<(Staging, SourceMode)> {
    let mut staging = Staging::new(&config.staging.temp_dir, config.staging.face_size)
        .with_context(|| format!("creating {}", config.staging.temp_dir.display()))?;

    if let Some(dir) = faces {
        let imported = staging.bulk_import(dir)?;
        log::info!("imported {} faces from {}", imported.len(), dir.display());
    }
    if let Some(image) = stretch {
        staging
            .import(Slot::Stretch, image)
            .with_context(|| format!("loading {}", image.display()))?;
        return Ok((staging, SourceMode::Stretch));
    }
    Ok((staging, SourceMode::SixImages))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = PreviewConfig::load_or_default(&cli.config)
        .with_context(|| format!("reading {}", cli.config.display()))?;

    match cli.command {
        Commands::Preview { faces, stretch } => {
            let (staging, mode) = stage(&config, faces.as_deref(), stretch.as_deref())?;
            skybox_preview::run(config, staging, mode).await
        }
        Commands::Export {
            title,
            faces,
            stretch,
            output,
            force,
        } => {
            let (staging, mode) = stage(&config, faces.as_deref(), stretch.as_deref())?;
            let request = ExportRequest {
                title,
                output_root: output.unwrap_or_else(|| config.export.output_root.clone()),
                file_prefix: config.export.file_prefix.clone(),
                overwrite: force,
            };
            let folder = export_skybox(&staging, mode, &request)?;
            staging.clear_temp()?;
            println!("Skybox generated in '{}'", folder.display());
            Ok(())
        }
    }
}
