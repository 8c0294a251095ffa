use anyhow::{Context, Result};
use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Literal header code the representative documents carry in their page labels.
pub const REPRESENTATIVE_HEADER_CODE: &str = "Folha: 82-0...82-9   -";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("noise_prefix must not be empty")]
    EmptyNoisePrefix,
    #[error("invalid header_code_pattern {pattern:?}: {source}")]
    InvalidHeaderPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("marker_char must not be whitespace")]
    WhitespaceMarker,
    #[error("marker_separator may only contain spaces or tabs, got {0:?}")]
    InvalidSeparator(String),
    #[error("output extension must not be empty")]
    EmptyExtension,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Lines starting with this token are page-footer noise.
    pub noise_prefix: String,
    /// Regex matched against trimmed lines; matching lines are dropped.
    pub header_code_pattern: Option<String>,
    /// Substrings removed from every line before it is classified.
    pub strip_literals: Vec<String>,
    /// Cut the noise prefix and everything after it when it shows up mid-line.
    pub excise_inline_noise: bool,
    /// Pass noise lines through to the output instead of dropping them.
    pub retain_noise_lines: bool,
    /// Only right-trim lines so leading offsets survive into the break test.
    pub keep_indent: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            noise_prefix: "Folha:".to_string(),
            header_code_pattern: None,
            strip_literals: Vec::new(),
            excise_inline_noise: true,
            retain_noise_lines: false,
            keep_indent: false,
        }
    }
}

impl FilterConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.noise_prefix.trim().is_empty() {
            return Err(ConfigError::EmptyNoisePrefix);
        }
        Ok(())
    }

    /// Compile `header_code_pattern`, if any.
    pub fn header_code_regex(&self) -> Result<Option<Regex>, ConfigError> {
        self.header_code_pattern
            .as_deref()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| ConfigError::InvalidHeaderPattern {
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .transpose()
    }
}

/// Which side of the break test joins two fragments into one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinRule {
    /// Join while no column break is detected.
    Aligned,
    /// Join only when a column break is detected, flush otherwise.
    Indented,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReassemblyConfig {
    pub enabled: bool,
    /// Character positions between the end of one fragment and the start of the next.
    pub spacing_threshold: usize,
    pub join_rule: JoinRule,
}

impl Default for ReassemblyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            spacing_threshold: 50,
            join_rule: JoinRule::Aligned,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    pub enabled: bool,
    pub marker_char: char,
    pub marker_separator: String,
    /// Append a single space to lines that carry no marker.
    pub pad_unmarked: bool,
    /// Require the marker to stand alone as the first token.
    pub whole_token: bool,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            marker_char: 'P',
            marker_separator: "  ".to_string(),
            pad_unmarked: true,
            whole_token: false,
        }
    }
}

impl MarkerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.marker_char.is_whitespace() {
            return Err(ConfigError::WhitespaceMarker);
        }
        if !self.marker_separator.chars().all(|c| c == ' ' || c == '\t') {
            return Err(ConfigError::InvalidSeparator(self.marker_separator.clone()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub trailing_newline: bool,
    pub extension: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            trailing_newline: false,
            extension: "txt".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    pub filter: FilterConfig,
    pub reassembly: ReassemblyConfig,
    pub marker: MarkerConfig,
    pub output: OutputConfig,
}

impl ConverterConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        serde_json::from_str(&config_str)
            .with_context(|| format!("Failed to parse config JSON: {:?}", path))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.filter.validate()?;
        self.marker.validate()?;
        if self.output.extension.trim().is_empty() {
            return Err(ConfigError::EmptyExtension);
        }
        Ok(())
    }
}

impl fmt::Display for ConverterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "noise_prefix={:?} threshold={} join={:?} marker={:?} separator={:?}",
            self.filter.noise_prefix,
            self.reassembly.spacing_threshold,
            self.reassembly.join_rule,
            self.marker.marker_char,
            self.marker.marker_separator,
        )
    }
}

/// Settings matching the document variants the converter has been used on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Default,
    /// Column-aware conversion as historically run on the tabular reports.
    Multicolumn,
    /// Multicolumn plus retained page labels with the header code cut out.
    Representative,
    /// One output line per extracted line, no reassembly.
    Simple,
}

impl Preset {
    pub fn config(self) -> ConverterConfig {
        let mut config = ConverterConfig::default();
        match self {
            Preset::Default => {}
            Preset::Multicolumn => {
                config.reassembly.join_rule = JoinRule::Indented;
                config.marker.marker_separator = " ".to_string();
            }
            Preset::Representative => {
                config.reassembly.join_rule = JoinRule::Indented;
                config.marker.marker_separator = " ".to_string();
                config.filter.retain_noise_lines = true;
                config.filter.excise_inline_noise = false;
                config.filter.strip_literals = vec![REPRESENTATIVE_HEADER_CODE.to_string()];
            }
            Preset::Simple => {
                config.reassembly.enabled = false;
                config.filter.excise_inline_noise = false;
                config.marker.pad_unmarked = false;
                config.output.trailing_newline = true;
            }
        }
        config
    }
}
