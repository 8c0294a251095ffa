use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pdf_columns::text::{join_pages, probe_column_break, BreakProbe, LineKind};
use pdf_columns::utils::extract_pages;
use pdf_columns::{Converter, ConverterConfig, Preset};

#[derive(Debug, Parser)]
#[command(author, version, about = "Show column-break decisions for one document")]
struct Args {
    /// PDF file, or a .txt file holding already-extracted page text
    file: PathBuf,

    /// Path to configuration JSON file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Named preset used when no config file is given
    #[arg(long, value_enum)]
    preset: Option<Preset>,

    /// Print one JSON object per line pair
    #[arg(long, default_value = "false")]
    json: bool,
}

#[derive(Debug, Serialize)]
struct PairReport<'a> {
    index: usize,
    prev: &'a str,
    current: &'a str,
    #[serde(flatten)]
    probe: BreakProbe,
    joins: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match (&args.config, args.preset) {
        (Some(path), _) => ConverterConfig::from_json_file(path)?,
        (None, Some(preset)) => preset.config(),
        (None, None) => ConverterConfig::default(),
    };
    let converter = Converter::new(&config).with_context(|| "Invalid configuration")?;

    let text = read_document(&args.file)?;
    let lines: Vec<_> = converter
        .filtered_lines(&text)
        .into_iter()
        .filter(|line| line.kind == LineKind::Content)
        .collect();
    info!("{} content lines after filtering", lines.len());

    let threshold = converter.reassembler().spacing_threshold();

    for (index, pair) in lines.windows(2).enumerate() {
        let (prev, current) = (pair[0].text.as_str(), pair[1].text.as_str());
        let report = PairReport {
            index,
            prev,
            current,
            probe: probe_column_break(prev, current, threshold),
            joins: converter.reassembler().joins(prev, current),
        };

        if args.json {
            println!("{}", serde_json::to_string(&report)?);
        } else {
            println!(
                "{:>5} {} end={:<4} start={:<4} {:?} -> {:?}",
                report.index,
                if report.joins { "JOIN " } else { "SPLIT" },
                fmt_offset(report.probe.prev_end),
                fmt_offset(report.probe.current_start),
                report.prev,
                report.current,
            );
        }
    }

    Ok(())
}

fn read_document(path: &Path) -> Result<String> {
    let is_text = path
        .extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("txt"))
        .unwrap_or(false);

    if is_text {
        fs::read_to_string(path).with_context(|| format!("Failed to read text file: {:?}", path))
    } else {
        let content = extract_pages(path)?;
        Ok(join_pages(&content.pages))
    }
}

fn fmt_offset(offset: Option<usize>) -> String {
    offset.map_or_else(|| "-".to_string(), |o| o.to_string())
}
