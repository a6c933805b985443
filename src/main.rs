//! yasr: render a mesh once, then show it or write it to a PNG
//!
//! Without a model the built-in cube is drawn.

mod viewer;

use std::path::{Path, PathBuf};

use clap::Parser;
use yasr::assets::{load_obj, load_texture, save_png, AssetError};
use yasr::config::{ConfigError, RenderConfig};
use yasr::device::Device;
use yasr::logging::{init_logging, LoggingConfig};
use yasr::rasterizer::{Color, Framebuffer};
use yasr::scene::Mesh;

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error("{0}")]
    Usage(String),

    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Asset(#[from] AssetError),
}

/// CPU triangle rasterizer
#[derive(Debug, Parser)]
#[command(name = "yasr", version, about = "Render a mesh with a software rasterizer", long_about = None)]
struct Cli {
    /// Config (.ron), model (.obj) and texture (.tga/.png/.jpg/.bmp), in any order
    inputs: Vec<PathBuf>,

    /// Write the frame to this PNG instead of opening a window
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Overlay triangle edges
    #[arg(short, long)]
    wireframe: bool,

    /// Log filter, e.g. "debug" or "yasr=trace" (overrides RUST_LOG)
    #[arg(long)]
    log: Option<String>,
}

/// Command line with inputs sorted by file extension
#[derive(Debug, Default, PartialEq)]
struct Args {
    config: Option<PathBuf>,
    model: Option<PathBuf>,
    texture: Option<PathBuf>,
    out: Option<PathBuf>,
    wireframe: bool,
}

impl TryFrom<Cli> for Args {
    type Error = AppError;

    fn try_from(cli: Cli) -> Result<Self, AppError> {
        let mut args = Args {
            out: cli.out,
            wireframe: cli.wireframe,
            ..Default::default()
        };

        for path in cli.inputs {
            let slot = match extension(&path).as_deref() {
                Some("ron") => &mut args.config,
                Some("obj") => &mut args.model,
                Some("tga" | "png" | "jpg" | "jpeg" | "bmp") => &mut args.texture,
                _ => {
                    return Err(AppError::Usage(format!(
                        "don't know what to do with {}",
                        path.display()
                    )))
                }
            };
            *slot = Some(path);
        }

        Ok(args)
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().to_ascii_lowercase())
}

/// Load everything, then draw one frame
fn render(args: &Args) -> Result<Framebuffer, AppError> {
    let config = match &args.config {
        Some(path) => RenderConfig::load(path)?,
        None => RenderConfig::default(),
    };
    let mesh = match &args.model {
        Some(path) => load_obj(path)?,
        None => Mesh::cube(),
    };

    let mut device = Device::try_new(&config)?;
    if let Some(path) = &args.texture {
        device = device.with_texture(load_texture(path)?);
    }

    let mut fb = device.create_framebuffer();
    let mut depth = device.create_depth_buffer();
    let stats = mesh.draw(&device, &mut fb, &mut depth);
    log::info!(
        "Rendered {} triangles ({} unlit), {} pixels",
        stats.triangles,
        stats.culled,
        stats.pixels
    );

    if args.wireframe {
        mesh.draw_wireframe(device.pipeline(), &mut fb, Color::GREEN);
    }

    Ok(fb)
}

fn run(args: Args) -> Result<Option<Framebuffer>, AppError> {
    let fb = render(&args)?;
    match &args.out {
        Some(path) => {
            save_png(&fb, path)?;
            Ok(None)
        }
        None => Ok(Some(fb)),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(LoggingConfig {
        filter: cli.log.clone(),
    });
    log::info!("=== yasr v{} ===", yasr::VERSION);

    let result = Args::try_from(cli).and_then(run);
    match result {
        Ok(Some(fb)) => {
            let conf = viewer::window_conf(fb.width, fb.height);
            macroquad::Window::from_config(conf, viewer::run(fb));
        }
        Ok(None) => {}
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args, AppError> {
        let cli = Cli::try_parse_from(std::iter::once("yasr").chain(list.iter().copied()))
            .map_err(|e| AppError::Usage(e.to_string()))?;
        Args::try_from(cli)
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_sorts_by_extension() {
        let parsed = args(&["scene.ron", "head.OBJ", "diffuse.tga", "--out", "frame.png"]).unwrap();
        assert_eq!(parsed.config, Some(PathBuf::from("scene.ron")));
        assert_eq!(parsed.model, Some(PathBuf::from("head.OBJ")));
        assert_eq!(parsed.texture, Some(PathBuf::from("diffuse.tga")));
        assert_eq!(parsed.out, Some(PathBuf::from("frame.png")));
        assert!(!parsed.wireframe);
    }

    #[test]
    fn test_parse_flags_anywhere() {
        let parsed = args(&["-w", "head.obj", "-o", "frame.png"]).unwrap();
        assert!(parsed.wireframe);
        assert_eq!(parsed.model, Some(PathBuf::from("head.obj")));
        assert_eq!(parsed.out, Some(PathBuf::from("frame.png")));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(args(&["--out"]), Err(AppError::Usage(_))));
        assert!(matches!(args(&["notes.txt"]), Err(AppError::Usage(_))));
        assert!(matches!(args(&["--bogus"]), Err(AppError::Usage(_))));
        assert_eq!(args(&[]).unwrap(), Args::default());
    }

    #[test]
    fn test_zero_size_config_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("empty.ron");
        std::fs::write(&config, "(width: 0)").unwrap();
        let parsed = Args {
            config: Some(config),
            ..Default::default()
        };
        assert!(matches!(render(&parsed), Err(AppError::Config(_))));
    }

    #[test]
    fn test_headless_render_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("small.ron");
        RenderConfig {
            width: 64,
            height: 48,
            ..Default::default()
        }
        .save(&config)
        .unwrap();

        let out = dir.path().join("frame.png");
        let parsed = Args {
            config: Some(config),
            out: Some(out.clone()),
            wireframe: true,
            ..Default::default()
        };
        assert!(run(parsed).unwrap().is_none());
        assert!(out.exists());
    }

    #[test]
    fn test_missing_model_fails_before_drawing() {
        let parsed = Args {
            model: Some(PathBuf::from("/nonexistent/model.obj")),
            ..Default::default()
        };
        assert!(matches!(render(&parsed), Err(AppError::Asset(_))));
    }
}
