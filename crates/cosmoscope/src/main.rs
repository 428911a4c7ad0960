//! Command-line front end: build `.wrl` meshes from `.cpcm` files and render them to PNG.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use cosmoscope::{process_all, ColorBy, Options, ProcessFlags, VERSION};
use log::LevelFilter;

#[derive(Parser, Debug)]
#[allow(clippy::struct_excessive_bools)]
#[command(name = "cosmoscope", version)]
#[command(about = "Build COSMO meshes from .cpcm and render .png from .wrl", long_about = None)]
struct Cli {
    /// Input directory with .cpcm files
    #[arg(long, default_value = "input")]
    input: PathBuf,

    /// Directory to write .wrl and .png files
    #[arg(long, default_value = "output")]
    output: PathBuf,

    /// Rebuild .wrl and re-render .png even if they exist
    #[arg(long)]
    force: bool,

    /// JSON file with options; flags given on the command line take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Radius for neighbor search (Angstrom) [default: 1.0]
    #[arg(long)]
    neighbor_radius: Option<f64>,

    /// Max neighbors per point [default: 15]
    #[arg(long)]
    max_neighbors: Option<usize>,

    /// Distance threshold factor for triangle acceptance [default: 1.5]
    #[arg(long)]
    neighbors_threshold: Option<f64>,

    /// Lower bound for color mapping
    #[arg(long, allow_negative_numbers = true)]
    vmin: Option<f64>,

    /// Upper bound for color mapping
    #[arg(long, allow_negative_numbers = true)]
    vmax: Option<f64>,

    /// Scalar to color by: charge, potential or surface-charge [default: charge]
    #[arg(long)]
    color_by: Option<ColorBy>,

    /// Color map name, e.g. jet, viridis, turbo; append _r to reverse [default: jet]
    #[arg(long)]
    cmap: Option<String>,

    /// Use percentile clipping when vmin/vmax are not provided
    #[arg(long)]
    robust: bool,

    /// Percentile for robust clipping, e.g. 1.0 gives [1, 99] [default: 1.0]
    #[arg(long)]
    robust_pct: Option<f64>,

    /// PNG width in pixels [default: 4000]
    #[arg(long)]
    window_width: Option<u32>,

    /// PNG height in pixels [default: 3000]
    #[arg(long)]
    window_height: Option<u32>,

    /// Background color name or hex code [default: white]
    #[arg(long)]
    background: Option<String>,

    /// Interpolate normals across triangles
    #[arg(long)]
    smooth_shading: bool,

    /// Disable anti-aliasing
    #[arg(long)]
    no_aa: bool,

    /// Also write a .pqr file with the colored scalar per point
    #[arg(long)]
    pqr: bool,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only print warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Warn;
        }
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    /// Loads the config file, if any, and applies command-line overrides.
    fn options(&self) -> Result<Options> {
        let mut options = match &self.config {
            Some(path) => Options::from_json_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => Options::default(),
        };

        let mesh = &mut options.mesh;
        if let Some(v) = self.neighbor_radius {
            mesh.neighbor_radius = v;
        }
        if let Some(v) = self.max_neighbors {
            mesh.max_neighbors = v;
        }
        if let Some(v) = self.neighbors_threshold {
            mesh.neighbors_threshold = v;
        }

        if let Some(v) = self.color_by {
            options.color_by = v;
        }

        let color = &mut options.color;
        if self.vmin.is_some() {
            color.vmin = self.vmin;
        }
        if self.vmax.is_some() {
            color.vmax = self.vmax;
        }
        if let Some(v) = &self.cmap {
            color.cmap.clone_from(v);
        }
        color.robust |= self.robust;
        if let Some(v) = self.robust_pct {
            color.robust_pct = v;
        }

        let render = &mut options.render;
        if let Some(v) = self.window_width {
            render.width = v;
        }
        if let Some(v) = self.window_height {
            render.height = v;
        }
        if let Some(v) = &self.background {
            render.background.clone_from(v);
        }
        render.smooth_shading |= self.smooth_shading;
        if self.no_aa {
            render.anti_aliasing = false;
        }

        options.validate().context("invalid options")?;
        Ok(options)
    }
}

fn print_banner() {
    let width = 33;
    let version = format!("Version {VERSION}");
    println!("{}", "-".repeat(width));
    for line in ["Simple Cosmo Surface Viewer", version.as_str()] {
        println!("{line:^width$}");
    }
    println!("{}", "-".repeat(width));
    println!();
}

fn run(cli: &Cli) -> Result<()> {
    let options = cli.options()?;
    let flags = ProcessFlags {
        force: cli.force,
        write_pqr: cli.pqr,
    };
    let summary = process_all(&cli.input, &cli.output, &options, &flags)?;
    log::info!(
        "done: {} meshes built ({} skipped), {} images rendered ({} skipped)",
        summary.meshes_built,
        summary.meshes_skipped,
        summary.images_rendered,
        summary.images_skipped
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    print_banner();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("failed: {err:#}");
            ExitCode::FAILURE
        }
    }
}
