//! Global alignment with affine gap penalties (Gotoh).
//!
//! Three dynamic-programming matrices are filled over `0..=n` x `0..=m`:
//!
//! - `M[i][j]`: best score of an alignment ending with `a[i]` paired with `b[j]`
//! - `Ix[i][j]`: best score ending with `a[i]` against a gap
//! - `Iy[i][j]`: best score ending with a gap against `b[j]`
//!
//! A gap of length `k` costs `gap_open + (k - 1) * gap_extend`, end gaps
//! included. A gap in one sequence never directly follows a gap in the
//! other. The traceback starts from the best of the three final cells and
//! prefers `M` over `Ix` over `Iy` on ties, so results are reproducible.
//!
//! Scores are accumulated as fixed-point integers (thousandths of a point)
//! so ties are exact. A scoring scheme must therefore use whole thousandths
//! and stay within [`MAX_SCORE_MAGNITUDE`]; [`Scoring::check`] enforces both.

use std::ops::{Index, IndexMut};

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{AlignmentResult, Sequence, GAP};

/// Fixed-point scale for scores.
const SCALE: f64 = 1000.0;

/// Largest absolute value accepted for any score or penalty.
pub const MAX_SCORE_MAGNITUDE: f64 = 1_000_000.0;

/// Stands in for minus infinity; far enough from `i64::MIN` that adding a
/// penalty never overflows.
const NEG_INF: i64 = i64::MIN / 4;

/// Bound on the magnitude of any reachable path score.
const SCORE_LIMIT: i64 = i64::MAX / 8;

/// Errors raised by the alignment engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlignmentError {
    #[error("cannot align an empty sequence")]
    EmptySequence,

    #[error("sequence length {length} exceeds the configured maximum of {max}")]
    TooLong { length: usize, max: usize },

    #[error("invalid scoring scheme: {0}")]
    InvalidScoring(String),
}

/// Match/mismatch and affine gap scores.
///
/// Penalties are negative numbers that get added to the score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scoring {
    pub match_score: f64,
    pub mismatch_score: f64,
    pub gap_open: f64,
    pub gap_extend: f64,
}

impl Default for Scoring {
    fn default() -> Self {
        Self {
            match_score: 2.0,
            mismatch_score: -1.0,
            gap_open: -0.5,
            gap_extend: -0.1,
        }
    }
}

impl Scoring {
    fn named_values(&self) -> [(&'static str, f64); 4] {
        [
            ("match_score", self.match_score),
            ("mismatch_score", self.mismatch_score),
            ("gap_open", self.gap_open),
            ("gap_extend", self.gap_extend),
        ]
    }

    /// Checks that every value is finite, at most [`MAX_SCORE_MAGNITUDE`] in
    /// absolute value, and a whole number of thousandths.
    pub fn check(&self) -> Result<(), String> {
        for (name, value) in self.named_values() {
            if !value.is_finite() {
                return Err(format!("{} must be a finite number", name));
            }
            if value.abs() > MAX_SCORE_MAGNITUDE {
                return Err(format!("{} must be between -{} and {}", name, MAX_SCORE_MAGNITUDE, MAX_SCORE_MAGNITUDE));
            }
            let scaled = value * SCALE;
            if (scaled - scaled.round()).abs() > 1e-6 {
                return Err(format!("{} must be a multiple of 0.001 (got {})", name, value));
            }
        }
        Ok(())
    }
}

/// [`Scoring`] converted to fixed point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FixedScoring {
    match_score: i64,
    mismatch_score: i64,
    gap_open: i64,
    gap_extend: i64,
}

impl FixedScoring {
    fn from_scoring(scoring: &Scoring) -> Result<Self, String> {
        scoring.check()?;
        let fixed = |x: f64| (x * SCALE).round() as i64;
        Ok(Self {
            match_score: fixed(scoring.match_score),
            mismatch_score: fixed(scoring.mismatch_score),
            gap_open: fixed(scoring.gap_open),
            gap_extend: fixed(scoring.gap_extend),
        })
    }

    /// Largest absolute value of a single step.
    fn max_step(&self) -> i64 {
        [self.match_score, self.mismatch_score, self.gap_open, self.gap_extend]
            .iter()
            .map(|v| v.abs())
            .max()
            .unwrap_or(0)
    }

    #[inline]
    fn substitution(&self, a: u8, b: u8) -> i64 {
        if a == b {
            self.match_score
        } else {
            self.mismatch_score
        }
    }
}

/// A score matrix stored as one row-major vector.
struct DpMatrix {
    cols: usize,
    cells: Vec<i64>,
}

impl DpMatrix {
    fn new(rows: usize, cols: usize) -> Self {
        Self {
            cols,
            cells: vec![NEG_INF; rows * cols],
        }
    }
}

impl Index<(usize, usize)> for DpMatrix {
    type Output = i64;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &i64 {
        &self.cells[i * self.cols + j]
    }
}

impl IndexMut<(usize, usize)> for DpMatrix {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut i64 {
        &mut self.cells[i * self.cols + j]
    }
}

/// Which matrix an alignment path is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// `M`: residue against residue
    Match,
    /// `Ix`: residue of the first sequence against a gap
    GapInSecond,
    /// `Iy`: gap against a residue of the second sequence
    GapInFirst,
}

/// Picks the best of the three states, preferring M, then Ix, then Iy.
#[inline]
fn best_state(m: i64, ix: i64, iy: i64) -> (i64, State) {
    if m >= ix && m >= iy {
        (m, State::Match)
    } else if ix >= iy {
        (ix, State::GapInSecond)
    } else {
        (iy, State::GapInFirst)
    }
}

/// Filled DP matrices for one pair of sequences.
struct Matrices {
    m: DpMatrix,
    ix: DpMatrix,
    iy: DpMatrix,
}

/// Global aligner. Holds only immutable configuration, so one instance can
/// be shared across threads and reused for any number of alignments.
#[derive(Debug, Clone)]
pub struct Aligner {
    /// Fixed-point scores, or why the scheme was rejected
    scoring: Result<FixedScoring, String>,
    max_length: Option<usize>,
}

impl Default for Aligner {
    fn default() -> Self {
        Self::new(&Scoring::default())
    }
}

impl Aligner {
    /// Creates an aligner for the given scoring scheme.
    ///
    /// A scheme failing [`Scoring::check`] makes every alignment return
    /// [`AlignmentError::InvalidScoring`].
    pub fn new(scoring: &Scoring) -> Self {
        Self {
            scoring: FixedScoring::from_scoring(scoring),
            max_length: None,
        }
    }

    /// Rejects sequences longer than `max_length` before allocating anything.
    pub fn with_max_length(mut self, max_length: Option<usize>) -> Self {
        self.max_length = max_length;
        self
    }

    /// Aligns two parsed sequences end to end.
    pub fn align(&self, seq1: &Sequence, seq2: &Sequence) -> Result<AlignmentResult, AlignmentError> {
        self.align_bytes(seq1.as_bytes(), seq2.as_bytes())
    }

    /// Aligns two ASCII symbol strings end to end.
    pub(crate) fn align_bytes(&self, a: &[u8], b: &[u8]) -> Result<AlignmentResult, AlignmentError> {
        let scoring = self.scoring.as_ref().map_err(|e| AlignmentError::InvalidScoring(e.clone()))?;
        if a.is_empty() || b.is_empty() {
            return Err(AlignmentError::EmptySequence);
        }
        if let Some(max) = self.max_length {
            let length = a.len().max(b.len());
            if length > max {
                return Err(AlignmentError::TooLong { length, max });
            }
        }

        // Every path has at most n + m steps
        let steps = (a.len() + b.len()) as i64;
        if scoring.max_step().checked_mul(steps).map_or(true, |bound| bound > SCORE_LIMIT) {
            return Err(AlignmentError::InvalidScoring(
                "scores too large for sequences of this length".to_string(),
            ));
        }
        debug!(
            "aligning {}x{} residues ({} cells per matrix)",
            a.len(),
            b.len(),
            (a.len() + 1) * (b.len() + 1)
        );

        let matrices = Self::fill(scoring, a, b);
        let (n, m) = (a.len(), b.len());
        let (best, state) = best_state(
            matrices.m[(n, m)],
            matrices.ix[(n, m)],
            matrices.iy[(n, m)],
        );
        let (aligned_seq1, aligned_seq2) = Self::traceback(scoring, &matrices, a, b, state);

        Ok(AlignmentResult {
            aligned_seq1,
            aligned_seq2,
            score: best as f64 / SCALE,
        })
    }

    /// Fills the three matrices, row 0 and column 0 included.
    fn fill(s: &FixedScoring, a: &[u8], b: &[u8]) -> Matrices {
        let (rows, cols) = (a.len() + 1, b.len() + 1);
        let mut m = DpMatrix::new(rows, cols);
        let mut ix = DpMatrix::new(rows, cols);
        let mut iy = DpMatrix::new(rows, cols);

        m[(0, 0)] = 0;
        for i in 0..rows {
            for j in 0..cols {
                if i > 0 && j > 0 {
                    let (prev, _) = best_state(m[(i - 1, j - 1)], ix[(i - 1, j - 1)], iy[(i - 1, j - 1)]);
                    m[(i, j)] = prev + s.substitution(a[i - 1], b[j - 1]);
                }
                if i > 0 {
                    ix[(i, j)] = (m[(i - 1, j)] + s.gap_open).max(ix[(i - 1, j)] + s.gap_extend);
                }
                if j > 0 {
                    iy[(i, j)] = (m[(i, j - 1)] + s.gap_open).max(iy[(i, j - 1)] + s.gap_extend);
                }
            }
        }

        Matrices { m, ix, iy }
    }

    /// Walks back from `(n, m)` to the origin and returns both aligned strings.
    fn traceback(s: &FixedScoring, mx: &Matrices, a: &[u8], b: &[u8], mut state: State) -> (String, String) {
        let (mut i, mut j) = (a.len(), b.len());
        let mut out_a: Vec<char> = Vec::with_capacity(i + j);
        let mut out_b: Vec<char> = Vec::with_capacity(i + j);

        while i > 0 || j > 0 {
            // On the borders only one move exists
            if i == 0 {
                state = State::GapInFirst;
            } else if j == 0 {
                state = State::GapInSecond;
            }

            match state {
                State::Match => {
                    out_a.push(a[i - 1] as char);
                    out_b.push(b[j - 1] as char);
                    state = best_state(mx.m[(i - 1, j - 1)], mx.ix[(i - 1, j - 1)], mx.iy[(i - 1, j - 1)]).1;
                    i -= 1;
                    j -= 1;
                }
                State::GapInSecond => {
                    out_a.push(a[i - 1] as char);
                    out_b.push(GAP);
                    state = if mx.m[(i - 1, j)] + s.gap_open >= mx.ix[(i - 1, j)] + s.gap_extend {
                        State::Match
                    } else {
                        State::GapInSecond
                    };
                    i -= 1;
                }
                State::GapInFirst => {
                    out_a.push(GAP);
                    out_b.push(b[j - 1] as char);
                    state = if mx.m[(i, j - 1)] + s.gap_open >= mx.iy[(i, j - 1)] + s.gap_extend {
                        State::Match
                    } else {
                        State::GapInFirst
                    };
                    j -= 1;
                }
            }
        }

        (out_a.into_iter().rev().collect(), out_b.into_iter().rev().collect())
    }
}

/// Aligns two sequences with the default scoring scheme
/// (match +2, mismatch -1, gap open -0.5, gap extend -0.1).
pub fn align(seq1: &Sequence, seq2: &Sequence) -> Result<AlignmentResult, AlignmentError> {
    Aligner::default().align(seq1, seq2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn align_str(a: &str, b: &str) -> AlignmentResult {
        Aligner::default().align_bytes(a.as_bytes(), b.as_bytes()).unwrap()
    }

    /// Recomputes the affine score of an alignment from its two strings.
    fn rescore(a1: &str, a2: &str, s: &Scoring) -> f64 {
        let mut score = 0.0;
        let mut prev: Option<State> = None;
        for (x, y) in a1.chars().zip(a2.chars()) {
            let state = if y == GAP {
                State::GapInSecond
            } else if x == GAP {
                State::GapInFirst
            } else {
                State::Match
            };
            score += match state {
                State::Match if x == y => s.match_score,
                State::Match => s.mismatch_score,
                _ if prev == Some(state) => s.gap_extend,
                _ => s.gap_open,
            };
            prev = Some(state);
        }
        score
    }

    /// Best score over every alignment of `a` and `b`, enumerated exhaustively.
    /// A gap in one sequence never directly follows a gap in the other.
    fn exhaustive_best(a: &[u8], b: &[u8], s: &Scoring, prev: Option<State>) -> f64 {
        if a.is_empty() && b.is_empty() {
            return 0.0;
        }
        let gap_cost = |state| if prev == Some(state) { s.gap_extend } else { s.gap_open };
        let mut best = f64::NEG_INFINITY;
        if !a.is_empty() && !b.is_empty() {
            let sub = if a[0] == b[0] { s.match_score } else { s.mismatch_score };
            best = best.max(sub + exhaustive_best(&a[1..], &b[1..], s, Some(State::Match)));
        }
        if !a.is_empty() && prev != Some(State::GapInFirst) {
            let step = gap_cost(State::GapInSecond);
            best = best.max(step + exhaustive_best(&a[1..], b, s, Some(State::GapInSecond)));
        }
        if !b.is_empty() && prev != Some(State::GapInSecond) {
            let step = gap_cost(State::GapInFirst);
            best = best.max(step + exhaustive_best(a, &b[1..], s, Some(State::GapInFirst)));
        }
        best
    }

    #[test]
    fn test_identical_sequences() {
        let result = align_str("ACGTACGT", "ACGTACGT");
        assert_eq!(result.aligned_seq1, "ACGTACGT");
        assert_eq!(result.aligned_seq2, "ACGTACGT");
        assert_eq!(result.score, 16.0);
    }

    #[test]
    fn test_single_trailing_mismatch() {
        let result = align_str("ATCGATCGATCG", "ATCGATCGATCC");
        assert_eq!(result.aligned_seq1, "ATCGATCGATCG");
        assert_eq!(result.aligned_seq2, "ATCGATCGATCC");
        assert_eq!(result.score, 21.0);
    }

    #[test]
    fn test_single_deletion() {
        let result = align_str("ACGT", "ACT");
        assert_eq!(result.aligned_seq1, "ACGT");
        assert_eq!(result.aligned_seq2, "AC-T");
        assert!((result.score - 5.5).abs() < 1e-9);
    }

    #[test]
    fn test_single_insertion() {
        let result = align_str("ACT", "ACGT");
        assert_eq!(result.aligned_seq1, "AC-T");
        assert_eq!(result.aligned_seq2, "ACGT");
    }

    #[test]
    fn test_affine_gaps_are_merged() {
        // One gap of 3 (-0.7) beats three gaps of 1 (-1.5)
        let result = align_str("AAACCCGGG", "AAAGGG");
        assert_eq!(result.aligned_seq1, "AAACCCGGG");
        assert_eq!(result.aligned_seq2, "AAA---GGG");
        assert!((result.score - 11.3).abs() < 1e-9);
    }

    #[test]
    fn test_leading_gap_is_penalized() {
        let result = align_str("GACGT", "ACGT");
        assert_eq!(result.aligned_seq2, "-ACGT");
        assert!((result.score - 7.5).abs() < 1e-9);
    }

    #[test]
    fn test_single_residues() {
        let result = align_str("A", "A");
        assert_eq!(result.score, 2.0);

        let result = align_str("A", "C");
        assert_eq!(result.aligned_seq1, "A");
        assert_eq!(result.aligned_seq2, "C");
        assert_eq!(result.score, -1.0);
    }

    #[test]
    fn test_length_invariant() {
        let pairs = [
            ("ACGTTGCA", "TTT"),
            ("G", "GATTACA"),
            ("MKTAYIAKQR", "MKTAYAKQRW"),
            ("AAAA", "CCCCCCCC"),
        ];
        for (a, b) in pairs {
            let result = align_str(a, b);
            assert_eq!(result.aligned_seq1.len(), result.aligned_seq2.len());
            assert!(result.len() >= a.len().max(b.len()));
            assert_eq!(result.aligned_seq1.replace(GAP, ""), a);
            assert_eq!(result.aligned_seq2.replace(GAP, ""), b);
            // Never a gap against a gap
            assert!(result.columns().all(|(x, y)| !(x == GAP && y == GAP)));
        }
    }

    #[test]
    fn test_deterministic() {
        let first = align_str("ACGTTGACCA", "AGTTGCCAAT");
        let second = align_str("ACGTTGACCA", "AGTTGCCAAT");
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_sequence_error() {
        let aligner = Aligner::default();
        assert_eq!(aligner.align_bytes(b"", b"ACGT"), Err(AlignmentError::EmptySequence));
        assert_eq!(aligner.align_bytes(b"ACGT", b""), Err(AlignmentError::EmptySequence));
    }

    #[test]
    fn test_max_length() {
        let aligner = Aligner::default().with_max_length(Some(4));
        assert!(aligner.align_bytes(b"ACGT", b"ACG").is_ok());
        assert_eq!(
            aligner.align_bytes(b"ACGTA", b"ACG"),
            Err(AlignmentError::TooLong { length: 5, max: 4 })
        );
    }

    #[test]
    fn test_tie_prefers_match_state() {
        // "AA"/"A-" and "AA"/"-A" both score 1.5; the final cell picks M
        let result = align_str("AA", "A");
        assert_eq!(result.aligned_seq1, "AA");
        assert_eq!(result.aligned_seq2, "-A");
        assert!((result.score - 1.5).abs() < 1e-9);

        let result = align_str("A", "AA");
        assert_eq!(result.aligned_seq1, "-A");
        assert_eq!(result.aligned_seq2, "AA");
    }

    #[test]
    fn test_score_matches_aligned_strings() {
        let scoring = Scoring::default();
        let pairs = [
            ("ACGT", "ACT"),
            ("GATTACA", "GCATGCT"),
            ("AAACCCGGG", "AAAGGG"),
            ("TTAGC", "AGCTT"),
            ("MKTAYIAKQR", "MKAYIQR"),
        ];
        for (a, b) in pairs {
            let result = align_str(a, b);
            let recomputed = rescore(&result.aligned_seq1, &result.aligned_seq2, &scoring);
            assert!((result.score - recomputed).abs() < 1e-9, "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_score_is_optimal() {
        let schemes = [
            Scoring::default(),
            Scoring {
                match_score: 1.0,
                mismatch_score: -3.0,
                gap_open: -2.0,
                gap_extend: -1.0,
            },
            Scoring {
                match_score: 5.0,
                mismatch_score: -4.0,
                gap_open: -0.25,
                gap_extend: -0.125,
            },
        ];
        let pairs = [("ACGT", "TGCA"), ("GGA", "AGGTA"), ("ACAC", "CA"), ("T", "ATTA"), ("CCGT", "CGGT")];
        for scoring in &schemes {
            let aligner = Aligner::new(scoring);
            for (a, b) in pairs {
                let result = aligner.align_bytes(a.as_bytes(), b.as_bytes()).unwrap();
                let best = exhaustive_best(a.as_bytes(), b.as_bytes(), scoring, None);
                assert!((result.score - best).abs() < 1e-9, "{} vs {} under {:?}", a, b, scoring);
                let recomputed = rescore(&result.aligned_seq1, &result.aligned_seq2, scoring);
                assert!((result.score - recomputed).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_large_scores_do_not_overflow() {
        let scoring = Scoring {
            match_score: MAX_SCORE_MAGNITUDE,
            gap_open: -MAX_SCORE_MAGNITUDE,
            ..Scoring::default()
        };
        let aligner = Aligner::new(&scoring);
        let result = aligner.align_bytes(b"ACGT", b"ACGT").unwrap();
        assert_eq!(result.score, 4.0 * MAX_SCORE_MAGNITUDE);

        let result = aligner.align_bytes(b"ACGTACGT", b"ACGT").unwrap();
        assert_eq!(result.aligned_seq1.len(), 8);
    }

    #[test]
    fn test_rejects_unrepresentable_scoring() {
        let oversized = Scoring {
            match_score: 1.0e12,
            ..Scoring::default()
        };
        assert!(matches!(
            Aligner::new(&oversized).align_bytes(b"ACGT", b"ACGT"),
            Err(AlignmentError::InvalidScoring(_))
        ));

        let too_fine = Scoring {
            gap_extend: -0.0004,
            ..Scoring::default()
        };
        assert!(too_fine.check().is_err());
        assert!(matches!(
            Aligner::new(&too_fine).align_bytes(b"AAAAAAAAAA", b"A"),
            Err(AlignmentError::InvalidScoring(_))
        ));

        let not_a_number = Scoring {
            mismatch_score: f64::NAN,
            ..Scoring::default()
        };
        assert!(not_a_number.check().is_err());
        assert!(Scoring::default().check().is_ok());
    }

    #[test]
    fn test_custom_scoring() {
        let scoring = Scoring {
            match_score: 1.0,
            mismatch_score: -3.0,
            gap_open: -2.0,
            gap_extend: -1.0,
        };
        let aligner = Aligner::new(&scoring);

        let result = aligner.align_bytes(b"ACGT", b"ACGT").unwrap();
        assert_eq!(result.score, 4.0);

        let result = aligner.align_bytes(b"ACGT", b"ACT").unwrap();
        assert_eq!(result.aligned_seq2, "AC-T");
        assert_eq!(result.score, 1.0);
    }
}
