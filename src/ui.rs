//! TUI rendering module.
//!
//! This module handles all visual rendering using ratatui:
//! - Statistics header (score, similarity, difference counts)
//! - Sticky sequence names on the left
//! - Alignment panel: sequence 1, indicator line, sequence 2, and a ruler
//! - Detail line for the column under the cursor
//! - Status bar with position and mode info
//! - Help overlay

pub mod glyphs;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::model::{AppMode, AppState, Difference, SequenceType};
use crate::visualization::{Classification, Column, Indicator};
use glyphs::Glyphs;

/// Width reserved for sequence names (including border and padding).
const NAME_PANEL_WIDTH: u16 = 20;
/// Minimum width for the alignment panel.
const MIN_SEQ_PANEL_WIDTH: u16 = 10;
/// Height of the statistics header (two lines plus borders).
const HEADER_HEIGHT: u16 = 4;
/// Height of the alignment panel (ruler, seq1, indicator, seq2 plus borders).
const ALIGNMENT_HEIGHT: u16 = 6;
/// Height of the status bar.
const STATUS_BAR_HEIGHT: u16 = 1;

/// Background used for differing residues.
const DIFFERENCE_COLOR: Color = Color::Magenta;

/// Color scheme for residues.
///
/// Nucleotide and amino acid sequences use different schemes.
pub trait ColorScheme {
    fn get_color(&self, c: char) -> Color;
}

/// DNA/RNA nucleotide color scheme.
pub struct DnaColorScheme;

impl ColorScheme for DnaColorScheme {
    fn get_color(&self, c: char) -> Color {
        match c.to_ascii_uppercase() {
            'A' => Color::Red,
            'C' => Color::Green,
            'G' => Color::Yellow,
            'T' | 'U' => Color::Blue,
            _ => Color::DarkGray,
        }
    }
}

/// Amino acid color scheme, grouped by physicochemical properties.
pub struct AminoAcidColorScheme;

impl ColorScheme for AminoAcidColorScheme {
    fn get_color(&self, c: char) -> Color {
        match c.to_ascii_uppercase() {
            // Hydrophobic
            'A' | 'V' | 'I' | 'L' | 'M' | 'F' | 'W' | 'P' => Color::Yellow,
            // Polar
            'S' | 'T' | 'N' | 'Q' | 'C' | 'G' | 'Y' => Color::Green,
            // Charged positive
            'K' | 'R' | 'H' => Color::Blue,
            // Charged negative
            'D' | 'E' => Color::Red,
            // Gap or unknown
            _ => Color::DarkGray,
        }
    }
}

/// Returns the color scheme for a sequence alphabet.
pub fn color_scheme(sequence_type: SequenceType) -> &'static dyn ColorScheme {
    match sequence_type {
        SequenceType::Nucleotide => &DnaColorScheme,
        SequenceType::AminoAcid => &AminoAcidColorScheme,
    }
}

/// Renders the complete UI.
pub fn render(frame: &mut Frame, state: &AppState, glyphs: &Glyphs) {
    let area = frame.area();

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Length(ALIGNMENT_HEIGHT),
            Constraint::Min(3),
            Constraint::Length(STATUS_BAR_HEIGHT),
        ])
        .split(area);

    // Split alignment area: names panel (left) + alignment panel (right)
    let content_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(NAME_PANEL_WIDTH),
            Constraint::Min(MIN_SEQ_PANEL_WIDTH),
        ])
        .split(main_layout[1]);

    render_header(frame, state, main_layout[0]);
    render_names_panel(frame, state, content_layout[0]);
    render_alignment_panel(frame, state, glyphs, content_layout[1]);
    render_detail_panel(frame, state, main_layout[2]);
    render_status_bar(frame, state, main_layout[3]);

    if state.show_help {
        render_help(frame, area);
    }
}

/// Renders the statistics header.
fn render_header(frame: &mut Frame, state: &AppState, area: Rect) {
    let report = &state.report;
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let lines = vec![
        Line::from(vec![
            Span::raw("Similarity: "),
            Span::styled(format!("{:.2}%", report.similarity_percent), bold),
            Span::raw(format!(
                "  ({}/{} columns)   Score: ",
                report.matches, report.total_positions
            )),
            Span::styled(report.score.to_string(), bold),
        ]),
        Line::from(format!(
            "Differences: {}  (mismatches: {}, gap columns: {})",
            report.difference_count, report.mismatches, report.gap_positions
        )),
    ];

    let block = Block::default().borders(Borders::ALL).title("Comparison");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Renders the sequence names panel (sticky, always visible).
fn render_names_panel(frame: &mut Frame, state: &AppState, area: Rect) {
    let max_name_len = NAME_PANEL_WIDTH.saturating_sub(3) as usize;
    let name = |id: Option<&str>, fallback: &str| {
        let id = id.unwrap_or(fallback);
        if id.chars().count() > max_name_len {
            let truncated: String = id.chars().take(max_name_len - 1).collect();
            format!("{}…", truncated)
        } else {
            id.to_string()
        }
    };

    let style = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(name(state.report.seq1_info.id.as_deref(), "Sequence 1"), style)),
        Line::from(""),
        Line::from(Span::styled(name(state.report.seq2_info.id.as_deref(), "Sequence 2"), style)),
    ];

    let block = Block::default().borders(Borders::ALL).title("Sequences");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Style of one residue cell.
fn residue_style(c: char, class: Classification, scheme: &dyn ColorScheme, is_cursor: bool) -> Style {
    let bg_color = match class {
        Classification::Match => scheme.get_color(c),
        Classification::Difference => DIFFERENCE_COLOR,
    };

    if is_cursor {
        // Invert colors for cursor position
        Style::default()
            .fg(bg_color)
            .bg(Color::White)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Black).bg(bg_color)
    }
}

fn indicator_style(indicator: Indicator, is_cursor: bool) -> Style {
    let style = match indicator {
        Indicator::Match => Style::default().fg(Color::Green),
        Indicator::Mismatch => Style::default().fg(DIFFERENCE_COLOR).add_modifier(Modifier::BOLD),
        Indicator::Gap => Style::default().fg(Color::DarkGray),
    };
    if is_cursor {
        style.add_modifier(Modifier::REVERSED)
    } else {
        style
    }
}

/// Builds a ruler with a `|` every 10 columns and a `.` every 5, for
/// 0-based columns `start..end`.
pub fn ruler(start: usize, end: usize) -> String {
    (start..end)
        .map(|idx| match (idx + 1) % 10 {
            0 => '|',
            5 => '.',
            _ => ' ',
        })
        .collect()
}

/// Renders the alignment panel with colored residues.
fn render_alignment_panel(frame: &mut Frame, state: &AppState, glyphs: &Glyphs, area: Rect) {
    let report = &state.report;
    let scheme1 = color_scheme(report.seq1_info.sequence_type);
    let scheme2 = color_scheme(report.seq2_info.sequence_type);

    let start_col = state.viewport.first_col;
    let end_col = (start_col + state.viewport.visible_cols).min(state.alignment_length());
    let columns: &[Column] = report
        .visualization
        .columns
        .get(start_col..end_col)
        .unwrap_or(&[]);

    let mut top: Vec<Span> = Vec::with_capacity(columns.len());
    let mut mid: Vec<Span> = Vec::with_capacity(columns.len());
    let mut bottom: Vec<Span> = Vec::with_capacity(columns.len());

    for (offset, column) in columns.iter().enumerate() {
        let is_cursor = start_col + offset == state.cursor;
        top.push(Span::styled(
            column.seq1_char.to_string(),
            residue_style(column.seq1_char, column.seq1_class, scheme1, is_cursor),
        ));
        mid.push(Span::styled(
            glyphs.indicator(column.indicator).to_string(),
            indicator_style(column.indicator, is_cursor),
        ));
        bottom.push(Span::styled(
            column.seq2_char.to_string(),
            residue_style(column.seq2_char, column.seq2_class, scheme2, is_cursor),
        ));
    }

    let lines = vec![
        Line::from(Span::styled(ruler(start_col, end_col), Style::default().fg(Color::DarkGray))),
        Line::from(top),
        Line::from(mid),
        Line::from(bottom),
    ];

    // Scroll hints when part of the alignment is off screen
    let left_hint = if start_col > 0 { glyphs.arrow_left } else { "" };
    let right_hint = if end_col < state.alignment_length() { glyphs.arrow_right } else { "" };
    let title = format!(
        "{}Alignment [Col: {} | View: {}-{}/{}]{}",
        left_hint,
        state.cursor + 1,
        start_col + 1,
        end_col,
        state.alignment_length(),
        right_hint
    );

    let block = Block::default().borders(Borders::ALL).title(title);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Renders details about the cursor column.
fn render_detail_panel(frame: &mut Frame, state: &AppState, area: Rect) {
    let position = state.cursor + 1;
    let mut lines = Vec::new();

    match state.report.visualization.get(state.cursor) {
        Some(column) => {
            let description = match state.difference_at_cursor() {
                Some(diff) => format!("{}", diff.kind),
                None => "match".to_string(),
            };
            lines.push(Line::from(format!(
                "Column {}: {} / {}  {}",
                position, column.seq1_char, column.seq2_char, description
            )));
        }
        None => lines.push(Line::from("Empty alignment")),
    }

    let differences = &state.report.differences;
    let previous = differences.iter().rev().find(|d| d.position < position);
    let next = differences.iter().find(|d| d.position > position);
    let describe = |d: Option<&Difference>| {
        d.map(|d| d.position.to_string()).unwrap_or_else(|| "none".to_string())
    };
    lines.push(Line::from(format!(
        "Previous difference: {}   Next difference: {}   (N / n)",
        describe(previous),
        describe(next)
    )));

    let block = Block::default().borders(Borders::ALL).title("Details");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Renders the status bar at the bottom.
fn render_status_bar(frame: &mut Frame, state: &AppState, area: Rect) {
    let (mode_str, command_str) = match &state.mode {
        AppMode::Normal => ("NORMAL", String::new()),
        AppMode::Command(cmd) => ("COMMAND", format!(":{}", cmd)),
    };

    let position_info = format!("Col {}/{} ", state.cursor + 1, state.alignment_length());

    // Show status message if present
    let message = state.status_message.as_deref().unwrap_or("");

    let left_content = if command_str.is_empty() {
        format!(" {} | {} ", mode_str, message)
    } else {
        format!(" {} | {} ", mode_str, command_str)
    };

    let left_len = left_content.chars().count();
    let status_line = Line::from(vec![
        Span::styled(left_content, Style::default().fg(Color::Black).bg(Color::Cyan)),
        Span::styled(
            " ".repeat((area.width as usize).saturating_sub(left_len + position_info.len())),
            Style::default().bg(Color::Cyan),
        ),
        Span::styled(
            position_info,
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
    ]);

    frame.render_widget(Paragraph::new(status_line), area);
}

/// Key bindings shown in the help overlay.
const HELP_LINES: &[(&str, &str)] = &[
    ("h / l, arrows", "move one column"),
    ("0 / Home", "first column"),
    ("$ / End", "last column"),
    ("PgUp / PgDn", "move one page"),
    ("Ctrl+U / Ctrl+D", "move half a page"),
    ("n / N", "next / previous difference"),
    ("<number>|", "go to column"),
    (":<number>", "go to column"),
    (":q", "quit"),
    ("?", "toggle this help"),
];

/// Renders the help overlay on top of everything else.
fn render_help(frame: &mut Frame, area: Rect) {
    let popup = centered_rect(60, HELP_LINES.len() as u16 + 4, area);
    let lines: Vec<Line> = HELP_LINES
        .iter()
        .map(|(keys, action)| {
            Line::from(vec![
                Span::styled(format!("{:<18}", keys), Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(*action),
            ])
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Help (any key to close)");
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

/// A rectangle of `width` x `height` cells centered in `area`, clipped to it.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Calculates the number of visible alignment columns.
pub fn calculate_visible_columns(terminal_width: u16) -> usize {
    // Name panel plus the alignment panel's two borders
    terminal_width.saturating_sub(NAME_PANEL_WIDTH + 2) as usize
}
