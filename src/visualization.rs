//! Position-by-position annotation of an alignment.
//!
//! The output is a neutral structure, not markup: each column carries both
//! characters, a match/difference class for each side and an alignment
//! indicator. Front ends (text report, terminal viewer, JSON) decide how to
//! draw it.

use std::collections::HashSet;

use serde::Serialize;

use crate::model::{Difference, GAP};

/// Per-sequence classification of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Match,
    Difference,
}

/// Alignment indicator for one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Indicator {
    /// Same residue on both sides
    Match,
    /// Two different residues
    Mismatch,
    /// At least one side is a gap
    Gap,
}

impl Indicator {
    pub fn for_pair(a: char, b: char) -> Self {
        if a == GAP || b == GAP {
            Indicator::Gap
        } else if a == b {
            Indicator::Match
        } else {
            Indicator::Mismatch
        }
    }
}

/// One annotated alignment column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Column {
    /// 1-based position
    pub position: usize,
    pub seq1_char: char,
    pub seq2_char: char,
    pub seq1_class: Classification,
    pub seq2_class: Classification,
    pub indicator: Indicator,
}

/// Annotated rendering of a whole alignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Visualization {
    pub columns: Vec<Column>,
}

impl Visualization {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns the column at a 0-based index.
    pub fn get(&self, idx: usize) -> Option<&Column> {
        self.columns.get(idx)
    }

    /// Splits the columns into consecutive blocks of at most `width` columns.
    pub fn blocks(&self, width: usize) -> std::slice::Chunks<'_, Column> {
        self.columns.chunks(width.max(1))
    }
}

/// Annotates two aligned sequences.
///
/// A character is classified as a difference when its position appears in
/// `differences`.
pub fn render(aligned_seq1: &str, aligned_seq2: &str, differences: &[Difference]) -> Visualization {
    let diff_positions: HashSet<usize> = differences.iter().map(|d| d.position).collect();

    let columns = aligned_seq1
        .chars()
        .zip(aligned_seq2.chars())
        .enumerate()
        .map(|(idx, (a, b))| {
            let position = idx + 1;
            let class = if diff_positions.contains(&position) {
                Classification::Difference
            } else {
                Classification::Match
            };
            Column {
                position,
                seq1_char: a,
                seq2_char: b,
                seq1_class: class,
                seq2_class: class,
                indicator: Indicator::for_pair(a, b),
            }
        })
        .collect();

    Visualization { columns }
}
