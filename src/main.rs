use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pdf_columns::{BatchConverter, BatchOptions, Converter, ConverterConfig, Preset};

#[derive(Debug, Parser)]
#[command(author, version, about = "Convert column-interleaved PDFs to reading-order text")]
struct Cli {
    /// Directory containing the PDF files
    #[arg(short, long)]
    input: PathBuf,

    /// Directory the text files are written to
    #[arg(short, long)]
    output: PathBuf,

    /// Path to configuration JSON file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start from a named preset instead of the defaults
    #[arg(long, value_enum)]
    preset: Option<Preset>,

    /// Override the column-break spacing threshold
    #[arg(long)]
    spacing_threshold: Option<usize>,

    /// Override the footer noise prefix
    #[arg(long)]
    noise_prefix: Option<String>,

    /// Override the separator placed before the relocated marker
    #[arg(long)]
    marker_separator: Option<String>,

    /// Walk subdirectories of the input directory
    #[arg(long, default_value = "false")]
    recursive: bool,

    /// Number of worker threads
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Replace existing output files
    #[arg(long, default_value = "false")]
    overwrite: bool,

    /// Write a JSON report of the batch to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = load_config(&cli)?;
    info!("Configuration: {}", config);

    let converter = Converter::new(&config).with_context(|| "Invalid configuration")?;
    let batch = BatchConverter::new(
        converter,
        BatchOptions {
            input_dir: cli.input,
            output_dir: cli.output,
            recursive: cli.recursive,
            jobs: cli.jobs,
            overwrite: cli.overwrite,
        },
    );

    let report = batch.run()?;

    if let Some(path) = &cli.report {
        report.save(path)?;
        info!("Report saved to: {:?}", path);
    }

    if report.failed() > 0 {
        warn!("{} documents failed, see log above", report.failed());
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<ConverterConfig> {
    let mut config = match (&cli.config, cli.preset) {
        (Some(path), preset) => {
            if preset.is_some() {
                warn!("--config given, ignoring --preset");
            }
            info!("Loading configuration from: {:?}", path);
            ConverterConfig::from_json_file(path)?
        }
        (None, Some(preset)) => preset.config(),
        (None, None) => ConverterConfig::default(),
    };

    if let Some(threshold) = cli.spacing_threshold {
        config.reassembly.spacing_threshold = threshold;
    }
    if let Some(prefix) = &cli.noise_prefix {
        config.filter.noise_prefix = prefix.clone();
    }
    if let Some(separator) = &cli.marker_separator {
        config.marker.marker_separator = separator.clone();
    }

    Ok(config)
}
