//! Column-break detection and row reassembly.
//!
//! Page extractors linearize multi-column layouts row by row, so one logical
//! row can arrive as several consecutive lines. The reassembler keeps an open
//! block of fragments and decides per line, using the horizontal offsets of
//! the touching tokens, whether the line continues the block or starts a new
//! one.

use serde::Serialize;
use tracing::trace;

use super::filter::{FilteredLine, LineKind};
use crate::config::{JoinRule, ReassemblyConfig};

/// Offsets the break test compared for one pair of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BreakProbe {
    /// Character offset just past the last occurrence of `prev`'s final token.
    pub prev_end: Option<usize>,
    /// Character offset of the first occurrence of `current`'s first token.
    pub current_start: Option<usize>,
    pub is_break: bool,
}

impl BreakProbe {
    const NO_DATA: Self = Self {
        prev_end: None,
        current_start: None,
        is_break: false,
    };
}

/// Returns true when `current` starts far enough to the right of where `prev`
/// ends that the two are separate rows.
pub fn is_column_break(prev: &str, current: &str, spacing_threshold: usize) -> bool {
    probe_column_break(prev, current, spacing_threshold).is_break
}

pub fn probe_column_break(prev: &str, current: &str, spacing_threshold: usize) -> BreakProbe {
    let (Some(last_token), Some(first_token)) =
        (prev.split_whitespace().last(), current.split_whitespace().next())
    else {
        return BreakProbe::NO_DATA;
    };

    // Repeated tokens are not disambiguated: last match in prev, first in current.
    let prev_end = prev
        .match_indices(last_token)
        .last()
        .map(|(idx, token)| char_offset(prev, idx + token.len()));
    let current_start = current
        .find(first_token)
        .map(|idx| char_offset(current, idx));

    let is_break = match (prev_end, current_start) {
        (Some(end), Some(start)) => end > 0 && start > end.saturating_add(spacing_threshold),
        _ => false,
    };

    BreakProbe {
        prev_end,
        current_start,
        is_break,
    }
}

fn char_offset(line: &str, byte_idx: usize) -> usize {
    line[..byte_idx].chars().count()
}

/// Fragments believed to belong to one logical row.
#[derive(Debug, Default)]
struct Block<'a> {
    fragments: Vec<&'a str>,
}

impl<'a> Block<'a> {
    fn last(&self) -> Option<&'a str> {
        self.fragments.last().copied()
    }

    fn push(&mut self, fragment: &'a str) {
        self.fragments.push(fragment);
    }

    fn flush_into(&mut self, output: &mut Vec<String>) {
        if self.fragments.is_empty() {
            return;
        }
        let joined = self
            .fragments
            .iter()
            .map(|fragment| fragment.trim())
            .collect::<Vec<_>>()
            .join(" ");
        output.push(joined);
        self.fragments.clear();
    }
}

#[derive(Debug, Clone)]
pub struct ColumnReassembler {
    enabled: bool,
    spacing_threshold: usize,
    join_rule: JoinRule,
}

impl ColumnReassembler {
    pub fn new(config: &ReassemblyConfig) -> Self {
        Self {
            enabled: config.enabled,
            spacing_threshold: config.spacing_threshold,
            join_rule: config.join_rule,
        }
    }

    pub fn spacing_threshold(&self) -> usize {
        self.spacing_threshold
    }

    /// Whether `current` continues the block whose last fragment is `prev`.
    pub fn joins(&self, prev: &str, current: &str) -> bool {
        let is_break = is_column_break(prev, current, self.spacing_threshold);
        match self.join_rule {
            JoinRule::Aligned => !is_break,
            JoinRule::Indented => is_break,
        }
    }

    pub fn reassemble(&self, lines: &[FilteredLine]) -> Vec<String> {
        let mut output = Vec::with_capacity(lines.len());
        let mut block = Block::default();

        for line in lines {
            // Retained lines go out in place; the open block keeps accumulating.
            if line.kind == LineKind::Retained {
                output.push(line.text.clone());
                continue;
            }
            if !self.enabled {
                output.push(line.text.trim().to_string());
                continue;
            }

            let current = line.text.as_str();
            let joins = block
                .last()
                .is_some_and(|prev| self.joins(prev, current));

            if !joins {
                block.flush_into(&mut output);
            }
            trace!(joins, fragment = current, "reassembly step");
            block.push(current);
        }

        block.flush_into(&mut output);
        output
    }
}
