//! vsketch: command-line front end for vessel contours.
//!
//! Fits saved contours to their reference image, exports them to SVG,
//! and packs or unpacks session files that bundle image and contour.
//!
//! # Usage
//!
//! ```text
//! vsketch fit --image angio.png --contour in.txt --out fitted.txt --radius 2
//! vsketch svg --image angio.png --contour fitted.txt --out fitted.svg
//! vsketch pack --image angio.png --contour fitted.txt --out angio.vscl
//! vsketch unpack --session angio.vscl --contour out.txt
//! ```
//!
//! Logging goes to stderr and honors `RUST_LOG` (default `info`).

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use log::info;
use vsketch_format::{SvgMetadata, contour_to_string, parse_contour, read_session, to_svg, write_session};
use vsketch_model::{Contour, Curve, CurveId, FitConfig, Model, ModelConfig, Raster, VesselContrast};

/// Fit, export and package vessel contours drawn over grayscale images.
#[derive(Parser)]
#[command(name = "vsketch", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Snap every curve of a contour to the vessels of an image.
    Fit(FitArgs),
    /// Export a contour as SVG outlines.
    Svg(SvgArgs),
    /// Bundle an image and a contour into a session file.
    Pack(PackArgs),
    /// Extract the contour from a session file.
    Unpack(UnpackArgs),
}

#[derive(Args)]
struct FitArgs {
    /// Reference image (PNG, JPEG, BMP, WebP, TIFF).
    #[arg(long)]
    image: PathBuf,

    /// Contour file to fit.
    #[arg(long)]
    contour: PathBuf,

    /// Where to write the fitted contour.
    #[arg(long)]
    out: PathBuf,

    /// Expected vessel radius in pixels.
    #[arg(long, default_value_t = 1.0)]
    radius: f64,

    /// Run the centerline fit. With neither this nor `--width`, both run.
    #[arg(long)]
    centerline: bool,

    /// Run the width fit. With neither this nor `--centerline`, both run.
    #[arg(long)]
    width: bool,

    /// Vessels are lighter than the background.
    #[arg(long)]
    light_on_dark: bool,

    /// Centerline fit parameters as a JSON `FitConfig`, e.g.
    /// `{"passes": 20, "move_factor": 0.25}`. Missing fields keep their
    /// defaults.
    #[arg(long)]
    config_json: Option<String>,

    /// Print per-curve fit reports as JSON on stdout.
    #[arg(long)]
    report: bool,
}

#[derive(Args)]
struct SvgArgs {
    /// Reference image; only its dimensions are used.
    #[arg(long)]
    image: PathBuf,

    /// Contour file to export.
    #[arg(long)]
    contour: PathBuf,

    /// Where to write the SVG.
    #[arg(long)]
    out: PathBuf,

    /// Resampling distance along each curve, in pixels.
    #[arg(long, default_value_t = 1.0)]
    spacing: f64,
}

#[derive(Args)]
struct PackArgs {
    /// Reference image.
    #[arg(long)]
    image: PathBuf,

    /// Contour file.
    #[arg(long)]
    contour: PathBuf,

    /// Where to write the session file.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args)]
struct UnpackArgs {
    /// Session file to read.
    #[arg(long)]
    session: PathBuf,

    /// Where to write the contour.
    #[arg(long)]
    contour: PathBuf,
}

fn main() -> ExitCode {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Fit(args) => fit(&args),
        Command::Svg(args) => svg(&args),
        Command::Pack(args) => pack(&args),
        Command::Unpack(args) => unpack(&args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("{msg}");
            ExitCode::FAILURE
        }
    }
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, String> {
    std::fs::read(path).map_err(|e| format!("Error reading {}: {e}", path.display()))
}

fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), String> {
    std::fs::write(path, bytes).map_err(|e| format!("Error writing {}: {e}", path.display()))?;
    info!("wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

fn load_raster(path: &Path) -> Result<Raster, String> {
    let raster = Raster::decode(&read_bytes(path)?)
        .map_err(|e| format!("Error decoding {}: {e}", path.display()))?;
    info!(
        "loaded {}: {}x{} {:?}",
        path.display(),
        raster.width(),
        raster.height(),
        raster.format()
    );
    Ok(raster)
}

fn load_contour(path: &Path) -> Result<Contour, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Error reading {}: {e}", path.display()))?;
    let contour = parse_contour(&text).map_err(|e| format!("Error parsing {}: {e}", path.display()))?;
    info!("loaded {} curves from {}", contour.len(), path.display());
    Ok(contour)
}

/// Build the centerline fit parameters from `--config-json`, or the
/// defaults without it.
fn fit_config(args: &FitArgs) -> Result<FitConfig, String> {
    args.config_json.as_ref().map_or_else(
        || Ok(FitConfig::default()),
        |json| serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}")),
    )
}

fn fit(args: &FitArgs) -> Result<(), String> {
    let config = ModelConfig {
        fit: fit_config(args)?,
        ..ModelConfig::default()
    };
    let run_both = !args.centerline && !args.width;

    let mut model = Model::new(config);
    model.set_image(load_raster(&args.image)?);
    model.set_contour(load_contour(&args.contour)?);
    if args.light_on_dark {
        model.set_vessel_contrast(VesselContrast::LightOnDark);
    }

    let ids: Vec<CurveId> = model.contour().curves().map(Curve::id).collect();
    let mut reports = Vec::with_capacity(ids.len());
    for id in ids {
        model.contour_mut().activate(id);
        let centerline = if args.centerline || run_both {
            model.fit_selected_to_nearest_vessel(args.radius)
        } else {
            None
        };
        let width = if args.width || run_both {
            model.fit_selected_vessel_width(args.radius)
        } else {
            None
        };
        reports.push(serde_json::json!({
            "curve": id.0,
            "centerline": centerline,
            "width": width,
        }));
    }
    model.deselect();

    if args.report {
        let json = serde_json::to_string_pretty(&reports)
            .map_err(|e| format!("Error serializing reports: {e}"))?;
        println!("{json}");
    }
    write_bytes(&args.out, contour_to_string(model.contour()).as_bytes())
}

fn svg(args: &SvgArgs) -> Result<(), String> {
    if !(args.spacing.is_finite() && args.spacing > 0.0) {
        return Err(format!("--spacing must be positive, got {}", args.spacing));
    }
    let raster = load_raster(&args.image)?;
    let contour = load_contour(&args.contour)?;
    let title = args
        .image
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("vsketch");
    let description = format!("{} curves resampled every {} px", contour.len(), args.spacing);
    let metadata = SvgMetadata {
        title: Some(title),
        description: Some(&description),
    };
    let svg = to_svg(&contour, raster.dimensions(), args.spacing, &metadata);
    write_bytes(&args.out, svg.as_bytes())
}

fn pack(args: &PackArgs) -> Result<(), String> {
    let raster = load_raster(&args.image)?;
    let contour = load_contour(&args.contour)?;
    write_bytes(&args.out, &write_session(&raster, &contour))
}

fn unpack(args: &UnpackArgs) -> Result<(), String> {
    let session = read_session(&read_bytes(&args.session)?)
        .map_err(|e| format!("Error reading session {}: {e}", args.session.display()))?;
    info!(
        "session {}: {}x{} image, {} curves",
        args.session.display(),
        session.raster.width(),
        session.raster.height(),
        session.contour.len()
    );
    write_bytes(&args.contour, contour_to_string(&session.contour).as_bytes())
}
