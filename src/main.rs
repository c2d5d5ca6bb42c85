use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use grid2geotiff::logger;
use grid2geotiff::raster_pipeline::{ConversionConfig, PayloadToGeoTiffPipeline};

use tracing::{error, info};

/// Convert a `|||` delimited grid payload into a georeferenced GeoTIFF
#[derive(Parser, Debug)]
#[command(name = "grid2geotiff", version, about)]
struct Args {
    /// Payload file; the raster is written next to it as `<FILE>.tif`
    file: PathBuf,
}

fn run(args: &Args) -> anyhow::Result<PathBuf> {
    let pipeline = PayloadToGeoTiffPipeline::new(ConversionConfig::default());
    info!("Compression: {:?}", pipeline.config().compression);

    pipeline
        .convert_file(&args.file)
        .with_context(|| format!("converting {}", args.file.display()))
}

/// Log the outcome once and map it to the process exit status.
fn report(result: anyhow::Result<PathBuf>) -> ExitCode {
    match result {
        Ok(output) => {
            info!(output = %output.display(), "Conversion successful!");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Conversion failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    logger::init();

    report(run(&args))
}
