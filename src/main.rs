//! Draw Skew-T log-P diagrams for GeoJSON sounding documents.
use anyhow::{bail, Context, Result};
use clap::Parser;
use env_logger::Env;
use log::{error, info};
use skewt_analysis::{collect_input_files, make_geocoder, process_all, Config};
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about, long_about = None)]
/// Analyze soundings and draw Skew-T log-P diagrams.
struct Cli {
    /// A single sounding document to process.
    #[arg(short, long, conflicts_with = "input_dir")]
    file: Option<PathBuf>,

    /// Process every .json file in this directory.
    #[arg(short, long)]
    input_dir: Option<PathBuf>,

    /// Where to write the diagrams.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// YAML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Do not look up place names on the network.
    #[arg(long)]
    offline: bool,
}

fn main() {
    let logger_env = Env::new().filter_or("SKEWT_LOG_LEVEL", "info");
    env_logger::Builder::from_env(logger_env)
        .format_timestamp_millis()
        .init();

    if let Err(err) = run(Cli::parse()) {
        error!("{:#}", err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::new_from_file(path)
            .with_context(|| format!("reading configuration {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }

    let files = match cli.file {
        Some(file) => vec![file],
        None => {
            let dir = cli.input_dir.unwrap_or_else(|| config.input_dir.clone());
            collect_input_files(&dir)?
        }
    };

    if files.is_empty() {
        bail!("no sounding documents to process");
    }

    let mut geocoder = make_geocoder(&config.geocoding, cli.offline);
    let summary = process_all(&files, &config, geocoder.as_mut());

    info!(
        "{} diagrams written, {} files failed",
        summary.rendered.len(),
        summary.failed.len()
    );

    if summary.rendered.is_empty() {
        bail!("every sounding document failed");
    }

    Ok(())
}
