//! # seqcmp - Pairwise Sequence Comparison
//!
//! Compares two nucleotide or protein sequences: global alignment with
//! affine gap penalties, similarity statistics, a list of differences, and a
//! per-column visualization that can be printed or browsed in a terminal UI.
//!
//! ## Architecture
//!
//! - `fasta`: FASTA record parsing
//! - `parser`: raw text to a validated, classified [`model::Sequence`]
//! - `align`: Gotoh global alignment
//! - `compare`: statistics, differences, and the `parse_and_align` pipeline
//! - `visualization`: per-column classification of an alignment
//! - `model`: data structures for sequences, reports, and viewer state
//! - `config`: TOML configuration
//! - `input`: reading inputs from files, stdin, or arguments
//! - `output`: text and JSON reports
//! - `event`, `ui`, `controller`: the interactive viewer
//!
//! ## Example
//!
//! ```
//! let report = seqcmp::parse_and_align("ATCGATCGATCG", "ATCGATCGATCC").unwrap();
//! assert_eq!(report.similarity_percent, 91.67);
//! assert_eq!(report.differences[0].position, 12);
//! ```

pub mod align;
pub mod compare;
pub mod config;
pub mod controller;
pub mod event;
pub mod fasta;
pub mod input;
pub mod model;
pub mod output;
pub mod parser;
pub mod ui;
pub mod visualization;

pub use compare::{parse_and_align, CompareError, SequenceComparer};
pub use model::ComparisonReport;
