//! Data model for sequence comparison.
//!
//! This module contains all data structures for representing:
//! - Parsed sequences and their alphabet
//! - Pairwise alignments and the differences between aligned sequences
//! - The comparison report handed to the presentation layer
//! - Viewer state (viewport, cursor, modes) for the terminal viewer

use std::fmt;

use serde::Serialize;

use crate::visualization::Visualization;

/// The gap symbol inserted into aligned sequences.
pub const GAP: char = '-';

/// Alphabet class of a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceType {
    /// A, C, G, T, U, N
    Nucleotide,
    /// The 20 standard one-letter amino acid codes
    AminoAcid,
}

impl fmt::Display for SequenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceType::Nucleotide => write!(f, "nucleotide"),
            SequenceType::AminoAcid => write!(f, "amino acid"),
        }
    }
}

/// A parsed, validated sequence.
///
/// Symbols are uppercase ASCII letters drawn from a single alphabet. The
/// sequence cannot be modified once created; build one with
/// [`crate::parser::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    id: Option<String>,
    data: String,
    sequence_type: SequenceType,
}

impl Sequence {
    pub(crate) fn new(id: Option<String>, data: String, sequence_type: SequenceType) -> Self {
        Self {
            id,
            data,
            sequence_type,
        }
    }

    /// The FASTA identifier, if the input had a header line.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Returns the sequence as a string slice.
    pub fn as_str(&self) -> &str {
        &self.data
    }

    /// Returns the sequence as raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.data.as_bytes()
    }

    /// Returns the length of the sequence.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn sequence_type(&self) -> SequenceType {
        self.sequence_type
    }
}

/// Output of the alignment engine.
///
/// Both aligned strings always have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentResult {
    pub aligned_seq1: String,
    pub aligned_seq2: String,
    pub score: f64,
}

impl AlignmentResult {
    /// Number of alignment columns.
    pub fn len(&self) -> usize {
        self.aligned_seq1.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aligned_seq1.is_empty()
    }

    /// Iterates over the aligned character pairs, column by column.
    pub fn columns(&self) -> impl Iterator<Item = (char, char)> + '_ {
        self.aligned_seq1.chars().zip(self.aligned_seq2.chars())
    }
}

/// Kind of a difference between two aligned characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DifferenceKind {
    /// Both characters are residues, but not the same one.
    Mismatch,
    /// One of the characters is the gap symbol.
    Gap,
}

impl DifferenceKind {
    /// Classifies a pair of differing characters.
    pub fn classify(a: char, b: char) -> Self {
        if a == GAP || b == GAP {
            DifferenceKind::Gap
        } else {
            DifferenceKind::Mismatch
        }
    }
}

impl fmt::Display for DifferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DifferenceKind::Mismatch => write!(f, "mismatch"),
            DifferenceKind::Gap => write!(f, "gap"),
        }
    }
}

/// A single alignment column where the two sequences differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Difference {
    /// 1-based column in the alignment
    pub position: usize,
    pub seq1_char: char,
    pub seq2_char: char,
    #[serde(rename = "type")]
    pub kind: DifferenceKind,
}

/// Identification of one compared sequence, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SequenceInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub length: usize,
    pub sequence_type: SequenceType,
}

impl From<&Sequence> for SequenceInfo {
    fn from(seq: &Sequence) -> Self {
        Self {
            id: seq.id.clone(),
            length: seq.len(),
            sequence_type: seq.sequence_type,
        }
    }
}

/// Everything the presentation layer needs about one comparison.
///
/// Serializes to the flat JSON payload consumed by report writers.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    /// Percentage of identical columns, rounded to 2 decimals
    #[serde(rename = "similarity")]
    pub similarity_percent: f64,
    pub total_positions: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub gap_positions: usize,
    #[serde(rename = "differences")]
    pub difference_count: usize,
    #[serde(rename = "differences_detail")]
    pub differences: Vec<Difference>,
    pub aligned_seq1: String,
    pub aligned_seq2: String,
    pub score: f64,
    pub visualization: Visualization,
    pub seq1_info: SequenceInfo,
    pub seq2_info: SequenceInfo,
}

impl ComparisonReport {
    /// Returns the difference recorded at a 1-based alignment column.
    pub fn difference_at(&self, position: usize) -> Option<&Difference> {
        self.differences
            .binary_search_by_key(&position, |d| d.position)
            .ok()
            .map(|idx| &self.differences[idx])
    }

    /// Returns true if the two sequences aligned without a single difference.
    pub fn is_identical(&self) -> bool {
        self.difference_count == 0
    }
}

// ---------------------------------------------------------------------------
// Viewer state
// ---------------------------------------------------------------------------

/// The viewport defines which alignment columns are currently visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Index of the first visible column
    pub first_col: usize,
    /// Number of visible columns
    pub visible_cols: usize,
}

impl Viewport {
    /// Creates a new viewport.
    pub fn new(visible_cols: usize) -> Self {
        Self {
            first_col: 0,
            visible_cols,
        }
    }

    /// Updates the viewport width.
    pub fn resize(&mut self, visible_cols: usize) {
        self.visible_cols = visible_cols;
    }

    /// Returns the range of visible columns.
    pub fn col_range(&self) -> std::ops::Range<usize> {
        self.first_col..self.first_col + self.visible_cols
    }

    /// Checks if a column is visible.
    pub fn is_col_visible(&self, col: usize) -> bool {
        col >= self.first_col && col < self.first_col + self.visible_cols
    }
}

/// Application mode for handling different input states.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppMode {
    /// Normal navigation mode
    #[default]
    Normal,
    /// Command input mode (after pressing ':')
    Command(String),
}

/// The complete viewer state.
#[derive(Debug)]
pub struct AppState {
    /// The comparison being displayed
    pub report: ComparisonReport,
    /// Current viewport
    pub viewport: Viewport,
    /// Current cursor column (0-based)
    pub cursor: usize,
    /// Current application mode
    pub mode: AppMode,
    /// Whether the help overlay is shown
    pub show_help: bool,
    /// Digits typed before a `|` command
    pub number_buffer: String,
    /// Whether the application should quit
    pub should_quit: bool,
    /// Status message to display
    pub status_message: Option<String>,
}

impl AppState {
    /// Creates a new viewer state for the given report.
    pub fn new(report: ComparisonReport) -> Self {
        let status_message = Some(format!(
            "{} difference(s), press ? for help",
            report.difference_count
        ));
        Self {
            report,
            viewport: Viewport::new(0),
            cursor: 0,
            mode: AppMode::Normal,
            show_help: false,
            number_buffer: String::new(),
            should_quit: false,
            status_message,
        }
    }

    /// Number of alignment columns.
    pub fn alignment_length(&self) -> usize {
        self.report.total_positions
    }

    /// Updates the viewport width based on terminal dimensions.
    pub fn update_viewport_size(&mut self, cols: usize) {
        self.viewport.resize(cols);
        self.ensure_cursor_visible();
    }

    /// Moves the cursor left by one column.
    pub fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.ensure_cursor_visible();
        }
    }

    /// Moves the cursor right by one column.
    pub fn move_right(&mut self) {
        if self.cursor + 1 < self.alignment_length() {
            self.cursor += 1;
            self.ensure_cursor_visible();
        }
    }

    pub fn goto_first_column(&mut self) {
        self.cursor = 0;
        self.ensure_cursor_visible();
    }

    pub fn goto_last_column(&mut self) {
        self.cursor = self.alignment_length().saturating_sub(1);
        self.ensure_cursor_visible();
    }

    /// Goes to a 1-based column, reporting out-of-range requests in the status bar.
    pub fn goto_column(&mut self, col: usize) {
        if col > 0 && col <= self.alignment_length() {
            self.cursor = col - 1;
            self.ensure_cursor_visible();
        } else {
            self.status_message = Some(format!("Invalid column: {}", col));
        }
    }

    /// Moves one full page left.
    pub fn page_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(self.viewport.visible_cols.max(1));
        self.ensure_cursor_visible();
    }

    /// Moves one full page right.
    pub fn page_right(&mut self) {
        let last = self.alignment_length().saturating_sub(1);
        self.cursor = (self.cursor + self.viewport.visible_cols.max(1)).min(last);
        self.ensure_cursor_visible();
    }

    pub fn half_page_left(&mut self) {
        self.cursor = self.cursor.saturating_sub((self.viewport.visible_cols / 2).max(1));
        self.ensure_cursor_visible();
    }

    pub fn half_page_right(&mut self) {
        let last = self.alignment_length().saturating_sub(1);
        self.cursor = (self.cursor + (self.viewport.visible_cols / 2).max(1)).min(last);
        self.ensure_cursor_visible();
    }

    /// Jumps to the first difference strictly right of the cursor.
    pub fn next_difference(&mut self) {
        let position = self.cursor + 1;
        match self.report.differences.iter().find(|d| d.position > position) {
            Some(diff) => {
                self.cursor = diff.position - 1;
                self.ensure_cursor_visible();
                self.status_message = None;
            }
            None => self.status_message = Some("No more differences".to_string()),
        }
    }

    /// Jumps to the last difference strictly left of the cursor.
    pub fn previous_difference(&mut self) {
        let position = self.cursor + 1;
        match self.report.differences.iter().rev().find(|d| d.position < position) {
            Some(diff) => {
                self.cursor = diff.position - 1;
                self.ensure_cursor_visible();
                self.status_message = None;
            }
            None => self.status_message = Some("No previous difference".to_string()),
        }
    }

    /// Returns the difference under the cursor, if any.
    pub fn difference_at_cursor(&self) -> Option<&Difference> {
        self.report.difference_at(self.cursor + 1)
    }

    /// Ensures the cursor is visible in the viewport, centering it when it leaves the view.
    fn ensure_cursor_visible(&mut self) {
        if !self.viewport.is_col_visible(self.cursor) {
            self.center_column();
        }
        self.clamp_viewport();
    }

    /// Centers the current column in the viewport.
    fn center_column(&mut self) {
        if self.viewport.visible_cols > 0 {
            let half = self.viewport.visible_cols / 2;
            self.viewport.first_col = self.cursor.saturating_sub(half);
        }
    }

    /// Clamps the viewport and cursor to valid alignment bounds.
    fn clamp_viewport(&mut self) {
        let len = self.alignment_length();
        if self.viewport.first_col + self.viewport.visible_cols > len {
            self.viewport.first_col = len.saturating_sub(self.viewport.visible_cols);
        }
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    /// Enters command mode.
    pub fn enter_command_mode(&mut self) {
        self.number_buffer.clear();
        self.mode = AppMode::Command(String::new());
    }

    /// Handles a character input in command mode.
    pub fn command_input(&mut self, c: char) {
        if let AppMode::Command(ref mut cmd) = self.mode {
            cmd.push(c);
        }
    }

    /// Handles backspace in command mode.
    pub fn command_backspace(&mut self) {
        if let AppMode::Command(ref mut cmd) = self.mode {
            cmd.pop();
            if cmd.is_empty() {
                self.mode = AppMode::Normal;
            }
        }
    }

    /// Executes the current command.
    pub fn execute_command(&mut self) {
        if let AppMode::Command(cmd) = std::mem::take(&mut self.mode) {
            match cmd.trim() {
                "q" | "quit" => self.should_quit = true,
                "h" | "help" => self.show_help = true,
                other => match other.parse::<usize>() {
                    Ok(col) => self.goto_column(col),
                    Err(_) => self.status_message = Some(format!("Unknown command: {}", other)),
                },
            }
        }
        self.mode = AppMode::Normal;
    }

    /// Cancels command mode and returns to normal mode.
    pub fn cancel_command(&mut self) {
        self.mode = AppMode::Normal;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn dismiss_help(&mut self) {
        self.show_help = false;
    }

    /// Accumulates a digit of a `<number>|` prefix.
    pub fn accumulate_digit(&mut self, c: char) {
        if c.is_ascii_digit() {
            self.number_buffer.push(c);
        }
    }

    /// Goes to the column typed before `|`.
    pub fn execute_goto_column(&mut self) {
        let buffer = std::mem::take(&mut self.number_buffer);
        if let Ok(col) = buffer.parse::<usize>() {
            self.goto_column(col);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::parse_and_align;

    fn sample_state() -> AppState {
        let report = parse_and_align("ACGTACGTACGTACGT", "ACGAACGTACCTACGT").unwrap();
        AppState::new(report)
    }

    #[test]
    fn test_sequence_accessors() {
        let seq = Sequence::new(Some("seq1".to_string()), "ACGT".to_string(), SequenceType::Nucleotide);
        assert_eq!(seq.id(), Some("seq1"));
        assert_eq!(seq.as_str(), "ACGT");
        assert_eq!(seq.as_bytes(), b"ACGT");
        assert_eq!(seq.len(), 4);
        assert!(!seq.is_empty());
    }

    #[test]
    fn test_difference_kind_classification() {
        assert_eq!(DifferenceKind::classify('A', 'C'), DifferenceKind::Mismatch);
        assert_eq!(DifferenceKind::classify('-', 'C'), DifferenceKind::Gap);
        assert_eq!(DifferenceKind::classify('A', '-'), DifferenceKind::Gap);
    }

    #[test]
    fn test_alignment_result_columns() {
        let result = AlignmentResult {
            aligned_seq1: "AC-T".to_string(),
            aligned_seq2: "ACGT".to_string(),
            score: 5.5,
        };
        assert_eq!(result.len(), 4);
        let cols: Vec<_> = result.columns().collect();
        assert_eq!(cols[2], ('-', 'G'));
    }

    #[test]
    fn test_difference_lookup() {
        let state = sample_state();
        assert!(state.report.difference_at(4).is_some());
        assert!(state.report.difference_at(1).is_none());
    }

    #[test]
    fn test_viewport_range() {
        let vp = Viewport::new(20);
        assert_eq!(vp.col_range(), 0..20);
        assert!(vp.is_col_visible(19));
        assert!(!vp.is_col_visible(20));
    }

    #[test]
    fn test_cursor_movement() {
        let mut state = sample_state();
        state.update_viewport_size(4);

        assert_eq!(state.cursor, 0);
        state.move_right();
        assert_eq!(state.cursor, 1);
        state.move_left();
        assert_eq!(state.cursor, 0);

        // Boundary: can't go past 0
        state.move_left();
        assert_eq!(state.cursor, 0);

        state.goto_last_column();
        assert_eq!(state.cursor, 15);
        assert!(state.viewport.is_col_visible(15));
        state.move_right();
        assert_eq!(state.cursor, 15);
    }

    #[test]
    fn test_difference_navigation() {
        let mut state = sample_state();
        state.update_viewport_size(8);

        state.next_difference();
        assert_eq!(state.cursor, 3);
        assert!(state.difference_at_cursor().is_some());

        state.next_difference();
        assert_eq!(state.cursor, 10);

        state.next_difference();
        assert_eq!(state.cursor, 10);
        assert_eq!(state.status_message.as_deref(), Some("No more differences"));

        state.previous_difference();
        assert_eq!(state.cursor, 3);
    }

    #[test]
    fn test_goto_column_commands() {
        let mut state = sample_state();
        state.update_viewport_size(4);

        state.enter_command_mode();
        for c in "12".chars() {
            state.command_input(c);
        }
        state.execute_command();
        assert_eq!(state.cursor, 11);
        assert_eq!(state.mode, AppMode::Normal);

        state.accumulate_digit('3');
        state.execute_goto_column();
        assert_eq!(state.cursor, 2);

        state.goto_column(99);
        assert_eq!(state.cursor, 2);
        assert_eq!(state.status_message.as_deref(), Some("Invalid column: 99"));
    }

    #[test]
    fn test_quit_command() {
        let mut state = sample_state();
        state.enter_command_mode();
        state.command_input('q');
        state.execute_command();
        assert!(state.should_quit);
    }

    #[test]
    fn test_paging() {
        let mut state = sample_state();
        state.update_viewport_size(6);
        state.page_right();
        assert_eq!(state.cursor, 6);
        state.half_page_right();
        assert_eq!(state.cursor, 9);
        state.half_page_left();
        assert_eq!(state.cursor, 6);
        state.page_left();
        assert_eq!(state.cursor, 0);
    }
}
