//! Cutout CLI
//!
//! Cleans up images whose background has already been removed: refines the
//! alpha matte, erases the silhouette halo and writes a transparent PNG
//! and/or a JPEG flattened onto white.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use image::codecs::jpeg::JpegEncoder;
use imageops_cutout::{CutoutConfig, CutoutPipeline, Passthrough, JPEG_QUALITY};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

/// Refine background-removed images
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "cutout")]
struct Cli {
    /// Background-removed input images (RGBA)
    #[arg(value_name = "INPUT", required = true)]
    input: Vec<PathBuf>,

    /// Output directory, created if missing
    #[arg(short, long, value_name = "DIR", default_value = "cutout")]
    output: PathBuf,

    /// Write a transparent PNG (`--png false` to skip)
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    png: bool,

    /// Also write a JPEG flattened onto the background color
    #[arg(long)]
    jpg: bool,

    /// Use the wider 11x11 edge blur
    #[arg(long)]
    refined: bool,

    /// JSON file with pipeline configuration; overrides --refined
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose logging (-v: INFO, -vv: DEBUG, -vvv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(failed) => {
            error!("{failed} of {} file(s) failed", cli.input.len());
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Processes every input and returns the number of files that failed.
fn run(cli: &Cli) -> Result<usize> {
    if !cli.png && !cli.jpg {
        bail!("nothing to write: enable --png or --jpg");
    }

    let config = load_config(cli)?;
    let pipeline = CutoutPipeline::new(config).context("invalid pipeline configuration")?;
    debug!(?config, "pipeline configured");

    fs::create_dir_all(&cli.output)
        .with_context(|| format!("failed to create {}", cli.output.display()))?;

    let mut failed = 0;
    for input in &cli.input {
        if let Err(e) = process_file(&pipeline, input, cli) {
            error!("{}: {e:#}", input.display());
            failed += 1;
        }
    }

    info!(
        "finished: {} of {} file(s) processed",
        cli.input.len() - failed,
        cli.input.len()
    );
    Ok(failed)
}

fn load_config(cli: &Cli) -> Result<CutoutConfig> {
    match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("failed to parse {}", path.display()))
        }
        None if cli.refined => Ok(CutoutConfig::refined()),
        None => Ok(CutoutConfig::default()),
    }
}

fn process_file(pipeline: &CutoutPipeline, input: &Path, cli: &Cli) -> Result<()> {
    let image = image::open(input).with_context(|| format!("failed to decode {}", input.display()))?;
    let stem = input
        .file_stem()
        .with_context(|| format!("{} has no file name", input.display()))?
        .to_string_lossy();

    let cutout = pipeline.remove_background(&Passthrough, &image)?;

    if cli.png {
        let path = cli.output.join(format!("{stem}.png"));
        cutout
            .save(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("saved {}", path.display());
    }

    if cli.jpg {
        let path = cli.output.join(format!("{stem}.jpg"));
        let flat = pipeline.flatten(cutout)?;
        let writer = BufWriter::new(
            File::create(&path).with_context(|| format!("failed to create {}", path.display()))?,
        );
        flat.write_with_encoder(JpegEncoder::new_with_quality(writer, JPEG_QUALITY))
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("saved {}", path.display());
    }

    Ok(())
}
