//! Report writers for CLI mode.
//!
//! - Text: statistics, the list of differences and the alignment in
//!   fixed-width blocks (sequence 1, indicator line, sequence 2).
//! - JSON: the serialized [`ComparisonReport`] with a `success` flag, or
//!   `{"success": false, "error": ...}` when the comparison failed.

use std::fs::File;
use std::io::{self, BufWriter, Write};

use serde::Serialize;

use crate::model::{ComparisonReport, SequenceInfo};
use crate::ui::glyphs::Glyphs;

/// Width used to wrap the difference list.
const WRAP_WIDTH: usize = 78;

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

/// Layout options for the text report.
#[derive(Debug, Clone, Copy)]
pub struct TextOptions {
    /// Alignment columns per block
    pub line_width: usize,
    pub glyphs: Glyphs,
}

#[derive(Serialize)]
#[serde(untagged, bound(serialize = ""))]
enum JsonReport<'a, E: ToString> {
    Success {
        success: bool,
        #[serde(flatten)]
        report: &'a ComparisonReport,
    },
    Failure {
        success: bool,
        #[serde(serialize_with = "serialize_display")]
        error: &'a E,
    },
}

fn serialize_display<E: ToString, S: serde::Serializer>(error: &&E, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&error.to_string())
}

/// Writes the outcome of a comparison as pretty-printed JSON.
pub fn write_json_report<W: Write, E: ToString>(
    writer: &mut W,
    outcome: Result<&ComparisonReport, &E>,
) -> serde_json::Result<()> {
    let payload = match outcome {
        Ok(report) => JsonReport::Success { success: true, report },
        Err(error) => JsonReport::Failure { success: false, error },
    };
    serde_json::to_writer_pretty(&mut *writer, &payload)?;
    writeln!(writer).map_err(serde_json::Error::io)
}

/// Opens a report destination: `-` is stdout, anything else a file.
fn open_target(target: &str) -> io::Result<Box<dyn Write>> {
    if target == "-" {
        Ok(Box::new(BufWriter::new(io::stdout().lock())))
    } else {
        Ok(Box::new(BufWriter::new(File::create(target)?)))
    }
}

/// Writes the report for `outcome` to `target` (`-` for stdout).
///
/// JSON always gets a document, the failure payload included. A text report
/// only exists for a successful comparison; on failure the target is left
/// untouched. Returns whether anything was written.
pub fn emit_report<E: ToString>(
    target: &str,
    format: ReportFormat,
    outcome: Result<&ComparisonReport, &E>,
    options: &TextOptions,
) -> io::Result<bool> {
    let mut writer = match (format, outcome) {
        (ReportFormat::Text, Err(_)) => return Ok(false),
        _ => open_target(target)?,
    };
    match (format, outcome) {
        (ReportFormat::Json, _) => write_json_report(&mut writer, outcome)?,
        (ReportFormat::Text, Ok(report)) => write_text_report(&mut writer, report, options)?,
        (ReportFormat::Text, Err(_)) => return Ok(false),
    }
    writer.flush()?;
    Ok(true)
}

/// Display name of a sequence, falling back to its slot.
fn display_name(info: &SequenceInfo, fallback: &str) -> String {
    info.id.clone().unwrap_or_else(|| fallback.to_string())
}

/// Writes the human-readable report.
pub fn write_text_report<W: Write>(writer: &mut W, report: &ComparisonReport, options: &TextOptions) -> io::Result<()> {
    let name1 = display_name(&report.seq1_info, "seq1");
    let name2 = display_name(&report.seq2_info, "seq2");

    writeln!(writer, "# Pairwise sequence comparison (global alignment)")?;
    writeln!(
        writer,
        "# 1: {} ({} residues, {})",
        name1, report.seq1_info.length, report.seq1_info.sequence_type
    )?;
    writeln!(
        writer,
        "# 2: {} ({} residues, {})",
        name2, report.seq2_info.length, report.seq2_info.sequence_type
    )?;
    writeln!(writer)?;
    writeln!(writer, "Score:       {}", report.score)?;
    writeln!(
        writer,
        "Similarity:  {:.2}% ({}/{})",
        report.similarity_percent, report.matches, report.total_positions
    )?;
    writeln!(writer, "Mismatches:  {}", report.mismatches)?;
    writeln!(writer, "Gaps:        {}", report.gap_positions)?;
    writeln!(writer, "Differences: {}", report.difference_count)?;

    if !report.differences.is_empty() {
        let listing = report
            .differences
            .iter()
            .map(|d| format!("{}:{}/{}({})", d.position, d.seq1_char, d.seq2_char, d.kind))
            .collect::<Vec<_>>()
            .join(" ");
        let wrap = textwrap::Options::new(WRAP_WIDTH)
            .initial_indent("  ")
            .subsequent_indent("  ");
        writeln!(writer)?;
        writeln!(writer, "{}", textwrap::fill(&listing, wrap))?;
    }

    writeln!(writer)?;
    write_alignment_blocks(writer, report, options, &name1, &name2)
}

/// Writes the alignment as blocks of `seq1 / indicator / seq2` lines with
/// 1-based column coordinates.
fn write_alignment_blocks<W: Write>(
    writer: &mut W,
    report: &ComparisonReport,
    options: &TextOptions,
    name1: &str,
    name2: &str,
) -> io::Result<()> {
    let name_width = name1.chars().count().max(name2.chars().count()).min(16);
    let coord_width = report.total_positions.to_string().len();
    let glyphs = &options.glyphs;

    for block in report.visualization.blocks(options.line_width) {
        let (Some(first), Some(last)) = (block.first(), block.last()) else {
            continue;
        };
        let top: String = block.iter().map(|c| c.seq1_char).collect();
        let mid: String = block.iter().map(|c| glyphs.indicator(c.indicator)).collect();
        let bottom: String = block.iter().map(|c| c.seq2_char).collect();

        writeln!(
            writer,
            "{:<nw$} {:>cw$} {} {}",
            truncate(name1, name_width),
            first.position,
            top,
            last.position,
            nw = name_width,
            cw = coord_width
        )?;
        writeln!(writer, "{:<nw$} {:>cw$} {}", "", "", mid, nw = name_width, cw = coord_width)?;
        writeln!(
            writer,
            "{:<nw$} {:>cw$} {} {}",
            truncate(name2, name_width),
            first.position,
            bottom,
            last.position,
            nw = name_width,
            cw = coord_width
        )?;
        writeln!(writer)?;
    }
    Ok(())
}

fn truncate(name: &str, width: usize) -> String {
    name.chars().take(width).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::{parse_and_align, CompareError};
    use crate::ui::glyphs;

    fn text_options(line_width: usize) -> TextOptions {
        TextOptions {
            line_width,
            glyphs: glyphs::select(false),
        }
    }

    #[test]
    fn test_text_report() {
        let report = parse_and_align(">left\nACGT\n", ">right\nACT\n").unwrap();
        let mut out = Vec::new();
        write_text_report(&mut out, &report, &text_options(60)).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Similarity:  75.00% (3/4)"));
        assert!(text.contains("Score:       5.5"));
        assert!(text.contains("  3:G/-(gap)"));
        assert!(text.contains("left  1 ACGT 4"));
        assert!(text.contains("        ||-|"));
        assert!(text.contains("right 1 AC-T 4"));
    }

    #[test]
    fn test_text_report_blocks() {
        let report = parse_and_align("ACGTACGTAC", "ACGTACGTAC").unwrap();
        let mut out = Vec::new();
        write_text_report(&mut out, &report, &text_options(4)).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("seq1  1 ACGT 4"));
        assert!(text.contains("seq1  5 ACGT 8"));
        assert!(text.contains("seq2  9 AC 10"));
        assert!(!text.contains("Differences:\n\n"));
    }

    #[test]
    fn test_json_success() {
        let report = parse_and_align("ATCGATCGATCG", "ATCGATCGATCC").unwrap();
        let mut out = Vec::new();
        write_json_report::<_, CompareError>(&mut out, Ok(&report)).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["success"], true);
        assert_eq!(value["similarity"], 91.67);
        assert_eq!(value["total_positions"], 12);
        assert_eq!(value["matches"], 11);
        assert_eq!(value["differences"], 1);
        assert_eq!(value["differences_detail"][0]["position"], 12);
        assert_eq!(value["differences_detail"][0]["type"], "mismatch");
        assert_eq!(value["aligned_seq2"], "ATCGATCGATCC");
        assert_eq!(value["visualization"]["columns"][11]["indicator"], "mismatch");
    }

    #[test]
    fn test_failed_text_report_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("report.txt");
        let target = target.to_str().unwrap();

        let err = parse_and_align("ACGT", "ACGTJ").unwrap_err();
        let written = emit_report(target, ReportFormat::Text, Err::<&ComparisonReport, _>(&err), &text_options(60)).unwrap();
        assert!(!written);
        assert!(!dir.path().join("report.txt").exists());

        let report = parse_and_align("ACGT", "ACT").unwrap();
        let written = emit_report::<CompareError>(target, ReportFormat::Text, Ok(&report), &text_options(60)).unwrap();
        assert!(written);
        let text = std::fs::read_to_string(target).unwrap();
        assert!(text.contains("Similarity:  75.00% (3/4)"));
    }

    #[test]
    fn test_failed_json_report_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("report.json");

        let err = parse_and_align("", "ACGT").unwrap_err();
        let written = emit_report(
            target.to_str().unwrap(),
            ReportFormat::Json,
            Err::<&ComparisonReport, _>(&err),
            &text_options(60),
        )
        .unwrap();
        assert!(written);
        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&target).unwrap()).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "sequence 1: empty sequence");
    }

    #[test]
    fn test_json_failure() {
        let err = parse_and_align("ACGT", "").unwrap_err();
        let mut out = Vec::new();
        write_json_report(&mut out, Err::<&ComparisonReport, _>(&err)).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "sequence 2: empty sequence");
    }
}
