use regex::Regex;

use crate::config::{ConfigError, FilterConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Row text that takes part in reassembly.
    Content,
    /// Noise line kept verbatim; bypasses reassembly.
    Retained,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredLine {
    pub text: String,
    pub kind: LineKind,
}

impl FilteredLine {
    pub fn content(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: LineKind::Content,
        }
    }

    pub fn retained(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: LineKind::Retained,
        }
    }
}

/// Removes page-footer and header-code noise from extracted page text.
#[derive(Debug, Clone)]
pub struct LineFilter {
    noise_prefix: String,
    header_code: Option<Regex>,
    strip_literals: Vec<String>,
    excise_inline_noise: bool,
    retain_noise_lines: bool,
    keep_indent: bool,
}

impl LineFilter {
    pub fn new(config: &FilterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let header_code = config.header_code_regex()?;

        Ok(Self {
            noise_prefix: config.noise_prefix.clone(),
            header_code,
            strip_literals: config
                .strip_literals
                .iter()
                .filter(|literal| !literal.is_empty())
                .cloned()
                .collect(),
            excise_inline_noise: config.excise_inline_noise,
            retain_noise_lines: config.retain_noise_lines,
            keep_indent: config.keep_indent,
        })
    }

    /// Split one document's text into lines and drop the noise.
    pub fn filter(&self, text: &str) -> Vec<FilteredLine> {
        text.lines().filter_map(|line| self.filter_line(line)).collect()
    }

    pub fn filter_line(&self, raw: &str) -> Option<FilteredLine> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        if trimmed.starts_with(&self.noise_prefix) {
            if !self.retain_noise_lines {
                return None;
            }
            // Whatever surrounds a stripped label is kept as-is.
            let text = self.strip_literals(trimmed);
            return (!text.trim().is_empty()).then(|| FilteredLine::retained(text));
        }

        if let Some(header_code) = &self.header_code {
            if header_code.is_match(trimmed) {
                return None;
            }
        }

        let source = if self.keep_indent { raw.trim_end() } else { trimmed };
        let mut text = self.strip_literals(source);

        if self.excise_inline_noise {
            if let Some(pos) = text.find(&self.noise_prefix) {
                text.truncate(pos);
            }
        }

        let text = if self.keep_indent {
            text.trim_end()
        } else {
            text.trim()
        };

        if text.trim_start().is_empty() {
            None
        } else {
            Some(FilteredLine::content(text))
        }
    }

    fn strip_literals(&self, line: &str) -> String {
        self.strip_literals
            .iter()
            .fold(line.to_string(), |acc, literal| acc.replace(literal.as_str(), ""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Preset, REPRESENTATIVE_HEADER_CODE};

    fn default_filter() -> LineFilter {
        LineFilter::new(&FilterConfig::default()).unwrap()
    }

    #[test]
    fn test_drops_footer_line() {
        let lines = default_filter().filter("Folha: 1\nROW A   COL B\n");
        assert_eq!(lines, vec![FilteredLine::content("ROW A   COL B")]);
    }

    #[test]
    fn test_drops_blank_lines_and_trims() {
        let lines = default_filter().filter("  first  \n\n   \r\n\tsecond\r\n");
        assert_eq!(
            lines,
            vec![FilteredLine::content("first"), FilteredLine::content("second")]
        );
    }

    #[test]
    fn test_excises_inline_noise() {
        let filter = default_filter();
        assert_eq!(
            filter.filter_line("ROW A  Folha: 3 de 4"),
            Some(FilteredLine::content("ROW A"))
        );
        assert_eq!(filter.filter_line("  Folha: 3 de 4"), None);
    }

    #[test]
    fn test_inline_noise_kept_when_excision_disabled() {
        let config = FilterConfig {
            excise_inline_noise: false,
            ..FilterConfig::default()
        };
        let filter = LineFilter::new(&config).unwrap();
        assert_eq!(
            filter.filter_line("ROW A Folha: 3"),
            Some(FilteredLine::content("ROW A Folha: 3"))
        );
    }

    #[test]
    fn test_header_code_pattern() {
        let config = FilterConfig {
            header_code_pattern: Some(r"^82-[0-9]$".to_string()),
            ..FilterConfig::default()
        };
        let filter = LineFilter::new(&config).unwrap();
        assert_eq!(filter.filter_line("82-4"), None);
        assert_eq!(filter.filter_line(" 82-9 "), None);
        assert_eq!(filter.filter_line("82-45"), Some(FilteredLine::content("82-45")));
    }

    #[test]
    fn test_invalid_header_pattern_is_rejected() {
        let config = FilterConfig {
            header_code_pattern: Some("(".to_string()),
            ..FilterConfig::default()
        };
        assert!(matches!(
            LineFilter::new(&config),
            Err(ConfigError::InvalidHeaderPattern { .. })
        ));
    }

    #[test]
    fn test_representative_retains_page_labels() {
        let filter = LineFilter::new(&Preset::Representative.config().filter).unwrap();
        let raw = format!("{} 12\nCLIENTE   VALOR\n", REPRESENTATIVE_HEADER_CODE);
        let lines = filter.filter(&raw);
        assert_eq!(
            lines,
            vec![
                FilteredLine::retained(" 12"),
                FilteredLine::content("CLIENTE   VALOR"),
            ]
        );
    }

    #[test]
    fn test_keep_indent_preserves_leading_offset() {
        let config = FilterConfig {
            keep_indent: true,
            ..FilterConfig::default()
        };
        let filter = LineFilter::new(&config).unwrap();
        assert_eq!(
            filter.filter_line("      right column   "),
            Some(FilteredLine::content("      right column"))
        );
        assert_eq!(filter.filter_line("    Folha: 2"), None);
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        assert!(default_filter().filter("").is_empty());
        assert!(default_filter().filter("\n\n").is_empty());
    }
}
