//! FASTA record parser.
//!
//! This module handles the structured stage of input parsing: splitting
//! FASTA text into records. It supports both single-line and multi-line
//! sequences. Alphabet validation is left to [`crate::parser`].
//!
//! ## FASTA Format
//!
//! ```text
//! >sequence_identifier optional description
//! ACGTACGTACGT...
//! >another_sequence
//! TGCATGCATGCA...
//! ```

use thiserror::Error;

/// Errors that can occur during FASTA parsing.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FastaError {
    #[error("Empty FASTA input")]
    EmptyInput,

    #[error("Invalid FASTA format: {0}")]
    InvalidFormat(String),

    #[error("Sequence without header at line {0}")]
    SequenceWithoutHeader(usize),
}

/// Result type for FASTA operations.
pub type FastaResult<T> = Result<T, FastaError>;

/// A single FASTA record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    /// Identifier from the header (text after '>' up to the first space)
    pub id: String,
    /// Rest of the header line, if any
    pub description: Option<String>,
    /// Sequence body with line breaks and whitespace removed, case preserved
    pub seq: String,
}

/// Parses FASTA content from a string.
///
/// Records with an empty body are kept, so the first record of the input is
/// always the first element of the result.
///
/// # Examples
///
/// ```
/// use seqcmp::fasta::parse_fasta_str;
///
/// let records = parse_fasta_str(">seq1 demo\nACGT\nACGT\n").unwrap();
/// assert_eq!(records[0].id, "seq1");
/// assert_eq!(records[0].seq, "ACGTACGT");
/// ```
pub fn parse_fasta_str(content: &str) -> FastaResult<Vec<FastaRecord>> {
    let mut records = Vec::new();
    let mut current: Option<FastaRecord> = None;

    for (idx, line) in content.lines().enumerate() {
        let line_number = idx + 1;
        let line = line.trim();

        // Skip empty lines
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('>') {
            if let Some(record) = current.take() {
                records.push(record);
            }

            // Take everything before first space as ID
            let mut parts = header.trim().splitn(2, char::is_whitespace);
            let id = parts.next().unwrap_or("");
            if id.is_empty() {
                return Err(FastaError::InvalidFormat(format!(
                    "Empty sequence identifier at line {}",
                    line_number
                )));
            }
            let description = parts
                .next()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string);

            current = Some(FastaRecord {
                id: id.to_string(),
                description,
                seq: String::new(),
            });
        } else {
            let Some(record) = current.as_mut() else {
                return Err(FastaError::SequenceWithoutHeader(line_number));
            };

            // Fast append: most FASTA lines don't have internal whitespace
            if line.bytes().all(|b| !b.is_ascii_whitespace()) {
                record.seq.push_str(line);
            } else {
                record.seq.extend(line.chars().filter(|c| !c.is_whitespace()));
            }
        }
    }

    // Don't forget the last record
    if let Some(record) = current {
        records.push(record);
    }

    if records.is_empty() {
        return Err(FastaError::EmptyInput);
    }

    Ok(records)
}

/// Parses FASTA content and returns its first record.
pub fn parse_first_record(content: &str) -> FastaResult<FastaRecord> {
    parse_fasta_str(content)?
        .into_iter()
        .next()
        .ok_or(FastaError::EmptyInput)
}
