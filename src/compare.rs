//! Comparison pipeline: parse, align, analyze, annotate.
//!
//! [`parse_and_align`] is the one-call entry point for front ends. It takes
//! two raw texts and returns a complete [`ComparisonReport`] or the first
//! error encountered.

use std::fmt;

use log::info;
use thiserror::Error;

use crate::align::{Aligner, AlignmentError, Scoring};
use crate::config::Config;
use crate::model::{AlignmentResult, ComparisonReport, Difference, DifferenceKind, Sequence, SequenceInfo, GAP};
use crate::parser::{parse, ParseError};
use crate::visualization::render;

/// Which of the two inputs an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSlot {
    First,
    Second,
}

impl fmt::Display for InputSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSlot::First => write!(f, "sequence 1"),
            InputSlot::Second => write!(f, "sequence 2"),
        }
    }
}

/// Errors returned by the comparison pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompareError {
    #[error("{slot}: {source}")]
    Parse {
        slot: InputSlot,
        #[source]
        source: ParseError,
    },

    #[error(transparent)]
    Alignment(#[from] AlignmentError),
}

/// Statistics derived from an alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    pub total_positions: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub gap_positions: usize,
    /// Percentage of matching columns, rounded to 2 decimals
    pub similarity_percent: f64,
    pub differences: Vec<Difference>,
}

/// Walks an alignment and collects matches and differences.
///
/// # Examples
///
/// ```
/// use seqcmp::compare::analyze;
/// use seqcmp::model::AlignmentResult;
///
/// let result = AlignmentResult {
///     aligned_seq1: "ACGT".to_string(),
///     aligned_seq2: "AC-T".to_string(),
///     score: 5.5,
/// };
/// let stats = analyze(&result);
/// assert_eq!(stats.matches, 3);
/// assert_eq!(stats.similarity_percent, 75.0);
/// ```
pub fn analyze(result: &AlignmentResult) -> Statistics {
    let mut matches = 0;
    let mut mismatches = 0;
    let mut gap_positions = 0;
    let mut differences = Vec::new();

    for (idx, (a, b)) in result.columns().enumerate() {
        if a == b {
            if a != GAP {
                matches += 1;
            }
            continue;
        }
        let kind = DifferenceKind::classify(a, b);
        match kind {
            DifferenceKind::Mismatch => mismatches += 1,
            DifferenceKind::Gap => gap_positions += 1,
        }
        differences.push(Difference {
            position: idx + 1,
            seq1_char: a,
            seq2_char: b,
            kind,
        });
    }

    let total_positions = result.len();
    Statistics {
        total_positions,
        matches,
        mismatches,
        gap_positions,
        similarity_percent: similarity(matches, total_positions),
        differences,
    }
}

/// `matches / total * 100`, rounded to 2 decimals with exact halves going
/// to the even digit (`1/32` gives 3.12).
pub fn similarity(matches: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let percent = matches as f64 / total as f64 * 100.0;
    (percent * 100.0).round_ties_even() / 100.0
}

/// Runs the whole comparison with a fixed configuration.
///
/// Holds no per-request state; a single instance can serve any number of
/// comparisons, from any number of threads.
#[derive(Debug, Clone, Default)]
pub struct SequenceComparer {
    aligner: Aligner,
}

impl SequenceComparer {
    pub fn new(scoring: &Scoring, max_sequence_length: Option<usize>) -> Self {
        Self {
            aligner: Aligner::new(scoring).with_max_length(max_sequence_length),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.scoring, config.limits.max_sequence_length)
    }

    /// Parses both raw inputs and compares them.
    pub fn compare(&self, raw_seq1: &str, raw_seq2: &str) -> Result<ComparisonReport, CompareError> {
        let seq1 = parse(raw_seq1).map_err(|source| CompareError::Parse {
            slot: InputSlot::First,
            source,
        })?;
        let seq2 = parse(raw_seq2).map_err(|source| CompareError::Parse {
            slot: InputSlot::Second,
            source,
        })?;
        self.compare_sequences(&seq1, &seq2)
    }

    /// Compares two already parsed sequences.
    pub fn compare_sequences(&self, seq1: &Sequence, seq2: &Sequence) -> Result<ComparisonReport, CompareError> {
        let result = self.aligner.align(seq1, seq2)?;
        let stats = analyze(&result);
        let visualization = render(&result.aligned_seq1, &result.aligned_seq2, &stats.differences);

        info!(
            "aligned {} vs {} residues: score {}, similarity {}%, {} difference(s)",
            seq1.len(),
            seq2.len(),
            result.score,
            stats.similarity_percent,
            stats.differences.len()
        );

        Ok(ComparisonReport {
            similarity_percent: stats.similarity_percent,
            total_positions: stats.total_positions,
            matches: stats.matches,
            mismatches: stats.mismatches,
            gap_positions: stats.gap_positions,
            difference_count: stats.differences.len(),
            differences: stats.differences,
            aligned_seq1: result.aligned_seq1,
            aligned_seq2: result.aligned_seq2,
            score: result.score,
            visualization,
            seq1_info: SequenceInfo::from(seq1),
            seq2_info: SequenceInfo::from(seq2),
        })
    }
}

/// Parses, aligns and analyzes two raw sequences with the default scoring.
pub fn parse_and_align(raw_seq1: &str, raw_seq2: &str) -> Result<ComparisonReport, CompareError> {
    SequenceComparer::default().compare(raw_seq1, raw_seq2)
}
