use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use microscopy_export_rs::discovery::{default_output_dir, discover_inputs};
use microscopy_export_rs::image_pipeline::{
    BitDepth, ContainerKind, ContainerToTiffPipeline, ExportConfig,
};
use microscopy_export_rs::logger::{self, LogOptions};

use tracing::{error, info, warn};

/// Convert microscopy acquisition containers into calibrated TIFF stacks.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Container file, or directory of containers (.czi, .lif)
    input: PathBuf,

    /// Output directory [default: <input dir>/tif]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also convert containers in subdirectories
    #[arg(short, long)]
    recursive: bool,

    /// Only convert files whose name contains this text
    #[arg(short = 'm', long = "match", value_name = "TEXT")]
    pattern: Option<String>,

    /// Sample bit depth of the written pages (8, 16 or 32)
    #[arg(short, long, default_value_t = 16)]
    bit_depth: u16,

    /// Debug logging (takes precedence over --quiet)
    #[arg(short, long)]
    verbose: bool,

    /// Disable logging
    #[arg(short, long)]
    quiet: bool,

    /// Also write the log to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logger::init(&LogOptions {
        verbose: cli.verbose,
        quiet: cli.quiet,
        log_file: cli.log_file.clone(),
    })
    .context("failed to set up logging")?;

    let output_dir = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_dir(&cli.input));
    let config = ExportConfig::builder()
        .output_dir(&output_dir)
        .bit_depth(BitDepth::try_from(cli.bit_depth)?)
        .build();

    info!("Output directory: {}", output_dir.display());

    let inputs = discover_inputs(&cli.input, cli.recursive, cli.pattern.as_deref())
        .with_context(|| format!("cannot convert {}", cli.input.display()))?;

    let pipeline = ContainerToTiffPipeline::new(config);
    let mut failed = 0;

    // Files no linked reader can open are reported once rather than per file.
    let (readable, unreadable): (Vec<_>, Vec<_>) = inputs.iter().partition(|input| {
        ContainerKind::from_path(input).is_ok_and(|kind| pipeline.supports(kind))
    });
    if !unreadable.is_empty() {
        failed += unreadable.len();
        warn!(
            "No decoder for {} file(s) is linked into this build; skipping them",
            unreadable.len()
        );
    }

    for input in readable {
        info!("Converting {}", input.display());
        match pipeline.export_file(input) {
            Ok(written) => info!("Converted {} into {} file(s)", input.display(), written.len()),
            Err(e) => {
                failed += 1;
                error!("Failed to convert {}: {}", input.display(), e);
            }
        }
    }

    info!(
        "Processed {} file(s), {} failed",
        inputs.len(),
        failed
    );

    Ok(())
}
