use crate::config::MarkerConfig;

/// Moves a leading record-type marker to the end of the line.
#[derive(Debug, Clone)]
pub struct MarkerReorderer {
    enabled: bool,
    marker: char,
    separator: String,
    pad_unmarked: bool,
    whole_token: bool,
}

impl MarkerReorderer {
    pub fn new(config: &MarkerConfig) -> Self {
        Self {
            enabled: config.enabled,
            marker: config.marker_char,
            separator: config.marker_separator.clone(),
            pad_unmarked: config.pad_unmarked,
            whole_token: config.whole_token,
        }
    }

    pub fn is_marked(&self, line: &str) -> bool {
        self.enabled && self.strip_marker(line).is_some()
    }

    pub fn reorder_line(&self, line: &str) -> String {
        if !self.enabled {
            return line.to_string();
        }
        match self.strip_marker(line) {
            Some(rest) => format!("{}{}{}", rest.trim(), self.separator, self.marker),
            None if self.pad_unmarked => format!("{} ", line),
            None => line.to_string(),
        }
    }

    pub fn reorder(&self, lines: &[String]) -> Vec<String> {
        lines.iter().map(|line| self.reorder_line(line)).collect()
    }

    fn strip_marker<'a>(&self, line: &'a str) -> Option<&'a str> {
        let rest = line.strip_prefix(self.marker)?;
        if self.whole_token && rest.chars().next().is_some_and(|c| !c.is_whitespace()) {
            return None;
        }
        Some(rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reorderer(separator: &str, pad_unmarked: bool) -> MarkerReorderer {
        MarkerReorderer::new(&MarkerConfig {
            marker_separator: separator.to_string(),
            pad_unmarked,
            ..MarkerConfig::default()
        })
    }

    #[test]
    fn test_moves_marker_to_end() {
        let reorderer = reorderer("  ", true);
        assert_eq!(reorderer.reorder_line("P Alpha Beta"), "Alpha Beta  P");
        assert_eq!(reorderer.reorder_line("P   Alpha  "), "Alpha  P");
        assert_eq!(reorderer.reorder_line("P"), "  P");
    }

    #[test]
    fn test_single_space_separator() {
        assert_eq!(reorderer(" ", true).reorder_line("P 0042 Item"), "0042 Item P");
    }

    #[test]
    fn test_unmarked_padding() {
        assert_eq!(reorderer("  ", true).reorder_line("AAA P next"), "AAA P next ");
        assert_eq!(reorderer("  ", false).reorder_line("AAA P next"), "AAA P next");
    }

    #[test]
    fn test_marker_glued_to_word() {
        // Only the leading character moves unless whole_token is set.
        assert_eq!(reorderer(" ", false).reorder_line("Pedro Silva"), "edro Silva P");

        let strict = MarkerReorderer::new(&MarkerConfig {
            whole_token: true,
            pad_unmarked: false,
            ..MarkerConfig::default()
        });
        assert_eq!(strict.reorder_line("Pedro Silva"), "Pedro Silva");
        assert_eq!(strict.reorder_line("P Silva"), "Silva  P");
        assert!(!strict.is_marked("Pedro"));
        assert!(strict.is_marked("P\tSilva"));
    }

    #[test]
    fn test_idempotent_on_unmarked_lines() {
        let lines = vec!["Alpha Beta  P".to_string(), "123 abc".to_string()];

        let plain = reorderer("  ", false);
        let once = plain.reorder(&lines);
        assert_eq!(plain.reorder(&once), once);

        let padded = reorderer("  ", true);
        let once = padded.reorder(&lines);
        let twice = padded.reorder(&once);
        let trimmed = |v: &[String]| v.iter().map(|l| l.trim_end().to_string()).collect::<Vec<_>>();
        assert_eq!(trimmed(&twice[..]), trimmed(&once[..]));
    }

    #[test]
    fn test_disabled_passes_through() {
        let reorderer = MarkerReorderer::new(&MarkerConfig {
            enabled: false,
            ..MarkerConfig::default()
        });
        assert_eq!(reorderer.reorder_line("P Alpha"), "P Alpha");
        assert!(!reorderer.is_marked("P Alpha"));
    }
}
