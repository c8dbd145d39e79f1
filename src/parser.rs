//! Sequence parser.
//!
//! Turns raw user text into a validated [`Sequence`]:
//!
//! 1. Input starting with `>` is parsed as FASTA and the first record's body
//!    is used. If the structured parse fails, the raw text is handled as
//!    plain text instead of being rejected.
//! 2. Plain text keeps only ASCII letters (whitespace, digits and
//!    punctuation are dropped).
//! 3. The uppercased symbols are classified as nucleotide first, then as
//!    amino acid. Anything else is an error.

use log::debug;
use thiserror::Error;

use crate::fasta::parse_first_record;
use crate::model::{Sequence, SequenceType};

/// Nucleotide alphabet (DNA and RNA, plus `N`).
pub const NUCLEOTIDES: &[u8] = b"ACGTUN";

/// The 20 standard amino acid one-letter codes.
pub const AMINO_ACIDS: &[u8] = b"ACDEFGHIKLMNPQRSTVWY";

/// Errors that can occur while parsing a sequence.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty sequence")]
    EmptySequence,

    #[error("invalid sequence character '{character}' at position {position}")]
    InvalidCharacter { character: char, position: usize },
}

/// Parses raw FASTA or plain text into a validated sequence.
///
/// # Examples
///
/// ```
/// use seqcmp::model::SequenceType;
/// use seqcmp::parser::parse;
///
/// let seq = parse(">seq1\nACGT\nACGT\n").unwrap();
/// assert_eq!(seq.as_str(), "ACGTACGT");
/// assert_eq!(seq.sequence_type(), SequenceType::Nucleotide);
///
/// assert!(parse("ACDEFGHIKLMNPQRSTVWYJ").is_err());
/// ```
pub fn parse(content: &str) -> Result<Sequence, ParseError> {
    let content = content.trim();
    let (id, symbols) = normalize(content);

    if symbols.is_empty() {
        return Err(ParseError::EmptySequence);
    }

    let sequence_type = classify(symbols.as_bytes())?;
    debug!(
        "parsed {} sequence{} of length {}",
        sequence_type,
        id.as_deref().map(|id| format!(" '{}'", id)).unwrap_or_default(),
        symbols.len()
    );

    Ok(Sequence::new(id, symbols, sequence_type))
}

/// Extracts the uppercase symbol string (and FASTA identifier, if any).
fn normalize(content: &str) -> (Option<String>, String) {
    if content.starts_with('>') {
        match parse_first_record(content) {
            Ok(record) => return (Some(record.id), record.seq.to_ascii_uppercase()),
            Err(e) => debug!("not valid FASTA ({}), reading as plain text", e),
        }
    }
    (None, strip_non_letters(content))
}

/// Keeps ASCII letters only, uppercased.
pub fn strip_non_letters(content: &str) -> String {
    content
        .chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Determines the alphabet of uppercase symbols.
///
/// Nucleotides are tried first, so a string valid in both alphabets
/// (e.g. `ACG`) is always a nucleotide sequence.
pub fn classify(symbols: &[u8]) -> Result<SequenceType, ParseError> {
    if symbols.iter().all(|b| NUCLEOTIDES.contains(b)) {
        return Ok(SequenceType::Nucleotide);
    }
    match symbols.iter().position(|b| !AMINO_ACIDS.contains(b)) {
        None => Ok(SequenceType::AminoAcid),
        Some(idx) => Err(ParseError::InvalidCharacter {
            character: symbols[idx] as char,
            position: idx + 1,
        }),
    }
}
