use serde::Serialize;
use tracing::debug;

use super::filter::{FilteredLine, LineFilter};
use super::marker::MarkerReorderer;
use super::reassemble::ColumnReassembler;
use crate::config::{ConfigError, ConverterConfig, OutputConfig};

/// Line counts gathered while converting one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionStats {
    pub raw_lines: usize,
    pub filtered_lines: usize,
    pub dropped_lines: usize,
    pub output_lines: usize,
    pub markers_moved: usize,
}

/// Filter, reassemble and reorder one document's page text.
#[derive(Debug, Clone)]
pub struct Converter {
    filter: LineFilter,
    reassembler: ColumnReassembler,
    reorderer: MarkerReorderer,
    output: OutputConfig,
}

impl Converter {
    pub fn new(config: &ConverterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            filter: LineFilter::new(&config.filter)?,
            reassembler: ColumnReassembler::new(&config.reassembly),
            reorderer: MarkerReorderer::new(&config.marker),
            output: config.output.clone(),
        })
    }

    pub fn filter(&self) -> &LineFilter {
        &self.filter
    }

    pub fn reassembler(&self) -> &ColumnReassembler {
        &self.reassembler
    }

    pub fn output_extension(&self) -> &str {
        &self.output.extension
    }

    pub fn filtered_lines(&self, text: &str) -> Vec<FilteredLine> {
        self.filter.filter(text)
    }

    pub fn convert_text(&self, text: &str) -> String {
        self.convert_text_with_stats(text).0
    }

    pub fn convert_pages(&self, pages: &[String]) -> String {
        self.convert_pages_with_stats(pages).0
    }

    pub fn convert_pages_with_stats(&self, pages: &[String]) -> (String, ConversionStats) {
        self.convert_text_with_stats(&join_pages(pages))
    }

    pub fn convert_text_with_stats(&self, text: &str) -> (String, ConversionStats) {
        let raw_lines = text.lines().count();
        let filtered = self.filter.filter(text);
        let rows = self.reassembler.reassemble(&filtered);
        let markers_moved = rows.iter().filter(|row| self.reorderer.is_marked(row)).count();
        let lines = self.reorderer.reorder(&rows);

        let mut output = lines.join("\n");
        if self.output.trailing_newline && !lines.is_empty() {
            output.push('\n');
        }

        let stats = ConversionStats {
            raw_lines,
            filtered_lines: filtered.len(),
            dropped_lines: raw_lines - filtered.len(),
            output_lines: lines.len(),
            markers_moved,
        };
        debug!(?stats, "document converted");

        (output, stats)
    }
}

/// Concatenate pages in order, keeping the last line of a page off the first
/// line of the next.
///
/// Unlike plain concatenation, a newline is added when a page does not end
/// with one.
pub fn join_pages(pages: &[String]) -> String {
    let mut text = String::with_capacity(pages.iter().map(|p| p.len() + 1).sum());
    for page in pages {
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(page);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{JoinRule, Preset};

    fn pages(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_join_pages() {
        assert_eq!(join_pages(&pages(&["a\n", "b"])), "a\nb");
        assert_eq!(join_pages(&pages(&["a", "b"])), "a\nb");
        assert_eq!(join_pages(&pages(&["", "b"])), "b");
        assert_eq!(join_pages(&[]), "");
    }

    #[test]
    fn test_empty_document() {
        let converter = Converter::new(&ConverterConfig::default()).unwrap();
        let (text, stats) = converter.convert_pages_with_stats(&[]);
        assert_eq!(text, "");
        assert_eq!(stats, ConversionStats::default());

        let simple = Converter::new(&Preset::Simple.config()).unwrap();
        assert_eq!(simple.convert_text("Folha: 1\n\n"), "");
    }

    #[test]
    fn test_default_pipeline_joins_aligned_fragments() {
        let converter = Converter::new(&ConverterConfig::default()).unwrap();
        let (text, stats) = converter.convert_text_with_stats("Folha: 1\nAAA\n   P next\n");
        assert_eq!(text, "AAA P next ");
        assert_eq!(stats.raw_lines, 3);
        assert_eq!(stats.filtered_lines, 2);
        assert_eq!(stats.dropped_lines, 1);
        assert_eq!(stats.output_lines, 1);
        assert_eq!(stats.markers_moved, 0);
    }

    #[test]
    fn test_keep_indent_separates_distant_rows() {
        let mut config = ConverterConfig::default();
        config.filter.keep_indent = true;
        config.marker.pad_unmarked = false;
        let converter = Converter::new(&config).unwrap();

        let raw = format!("Left col text\n{}Right col text\nP Alpha Beta", " ".repeat(70));
        assert_eq!(
            converter.convert_text(&raw),
            "Left col text\nRight col text P Alpha Beta"
        );
    }

    #[test]
    fn test_multicolumn_preset_output() {
        let converter = Converter::new(&Preset::Multicolumn.config()).unwrap();
        let raw = "Folha: 1 de 2\nP 0001 ACME\n0002 Beta Folha: 1\nRodape\n";
        assert_eq!(converter.convert_text(raw), "0001 ACME P\n0002 Beta \nRodape ");
    }

    #[test]
    fn test_representative_preset_output() {
        let converter = Converter::new(&Preset::Representative.config()).unwrap();
        let raw = "Folha: 82-0...82-9   - 3\nP 10 Item\n";
        assert_eq!(converter.convert_text(raw), " 3 \n10 Item P");
    }

    #[test]
    fn test_simple_preset_output() {
        let converter = Converter::new(&Preset::Simple.config()).unwrap();
        let raw = "Folha: 1\nP Alpha Beta\nplain\n0002 Beta Folha: 1\n";
        assert_eq!(
            converter.convert_text(raw),
            "Alpha Beta  P\nplain\n0002 Beta Folha: 1\n"
        );
    }

    #[test]
    fn test_pages_are_joined_before_filtering() {
        let mut config = ConverterConfig::default();
        config.reassembly.join_rule = JoinRule::Indented;
        config.marker.pad_unmarked = false;
        let converter = Converter::new(&config).unwrap();

        let (text, stats) =
            converter.convert_pages_with_stats(&pages(&["row one\nFolha: 1", "row two\n"]));
        assert_eq!(text, "row one\nrow two");
        assert_eq!(stats.raw_lines, 3);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = ConverterConfig::default();
        config.output.extension = String::new();
        assert!(Converter::new(&config).is_err());

        let mut config = ConverterConfig::default();
        config.filter.header_code_pattern = Some("82-[0-9".to_string());
        assert!(matches!(
            Converter::new(&config),
            Err(ConfigError::InvalidHeaderPattern { .. })
        ));
    }
}
