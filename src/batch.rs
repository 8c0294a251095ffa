use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::text::{ConversionStats, Converter};
use crate::utils::extract_pages;

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Descend into subdirectories, mirroring them under the output directory.
    pub recursive: bool,
    /// Worker threads; `None` lets rayon pick.
    pub jobs: Option<usize>,
    pub overwrite: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DocumentStatus {
    Converted,
    /// Extraction produced no text; an empty output was written.
    Empty,
    /// Output already existed.
    Skipped,
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    pub source: PathBuf,
    pub output: PathBuf,
    #[serde(flatten)]
    pub status: DocumentStatus,
    pub stats: Option<ConversionStats>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub documents: Vec<DocumentReport>,
}

impl BatchReport {
    fn count(&self, predicate: impl Fn(&DocumentStatus) -> bool) -> usize {
        self.documents.iter().filter(|d| predicate(&d.status)).count()
    }

    pub fn converted(&self) -> usize {
        self.count(|s| matches!(s, DocumentStatus::Converted))
    }

    pub fn empty(&self) -> usize {
        self.count(|s| matches!(s, DocumentStatus::Empty))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, DocumentStatus::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, DocumentStatus::Failed { .. }))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .with_context(|| "Failed to serialize batch report")?;
        write_atomically(path, &json)
    }
}

/// Converts every PDF in a folder, one output text file per document.
pub struct BatchConverter {
    converter: Converter,
    options: BatchOptions,
}

impl BatchConverter {
    pub fn new(converter: Converter, options: BatchOptions) -> Self {
        Self { converter, options }
    }

    /// PDF files under the input directory, sorted by path.
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let input = &self.options.input_dir;
        if !input.is_dir() {
            anyhow::bail!("Input directory does not exist: {:?}", input);
        }

        let max_depth = if self.options.recursive { usize::MAX } else { 1 };
        let mut files: Vec<PathBuf> = WalkDir::new(input)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|path| {
                path.extension()
                    .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("pdf"))
                    .unwrap_or(false)
            })
            .collect();

        files.sort();
        Ok(files)
    }

    pub fn run(&self) -> Result<BatchReport> {
        info!("Input directory: {:?}", self.options.input_dir);
        info!("Output directory: {:?}", self.options.output_dir);

        let files = self.discover()?;
        info!("Found {} PDF files", files.len());

        fs::create_dir_all(&self.options.output_dir).with_context(|| {
            format!("Failed to create output directory: {:?}", self.options.output_dir)
        })?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.jobs.unwrap_or(0))
            .build()
            .with_context(|| "Failed to build worker pool")?;

        let documents = pool.install(|| {
            files
                .par_iter()
                .map(|source| self.process(source))
                .collect::<Vec<_>>()
        });

        let report = BatchReport { documents };
        info!(
            "Batch finished: {} converted, {} empty, {} skipped, {} failed",
            report.converted(),
            report.empty(),
            report.skipped(),
            report.failed()
        );
        Ok(report)
    }

    pub fn output_path(&self, source: &Path) -> PathBuf {
        let relative = source
            .strip_prefix(&self.options.input_dir)
            .ok()
            .map(Path::to_path_buf)
            .or_else(|| source.file_name().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("unknown"));

        self.options
            .output_dir
            .join(relative)
            .with_extension(self.converter.output_extension())
    }

    fn process(&self, source: &Path) -> DocumentReport {
        let output = self.output_path(source);

        if output.exists() && !self.options.overwrite {
            info!("Skipping {:?}: {:?} already exists", source, output);
            return DocumentReport {
                source: source.to_path_buf(),
                output,
                status: DocumentStatus::Skipped,
                stats: None,
            };
        }

        let (status, stats) = match self.convert_document(source, &output) {
            Ok((status, stats)) => {
                info!("Converted {:?} to {:?}", source, output);
                (status, Some(stats))
            }
            Err(e) => {
                warn!("Failed to process {:?}: {:#}", source, e);
                (
                    DocumentStatus::Failed {
                        reason: format!("{:#}", e),
                    },
                    None,
                )
            }
        };

        DocumentReport {
            source: source.to_path_buf(),
            output,
            status,
            stats,
        }
    }

    fn convert_document(
        &self,
        source: &Path,
        output: &Path,
    ) -> Result<(DocumentStatus, ConversionStats)> {
        let content = extract_pages(source)?;
        let (text, stats) = self.converter.convert_pages_with_stats(&content.pages);

        write_atomically(output, &text)?;

        let status = if content.has_text {
            DocumentStatus::Converted
        } else {
            DocumentStatus::Empty
        };
        Ok((status, stats))
    }
}

/// Write `contents` to `path` through a temporary file in the same directory.
pub fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create directory: {:?}", parent))?;

    let mut file = NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temporary file in {:?}", parent))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("Failed to write output for {:?}", path))?;
    file.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to write output file: {:?}", path))?;

    Ok(())
}
