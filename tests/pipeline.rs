use std::io::Write;
use std::path::PathBuf;

use seqcmp::compare::{CompareError, InputSlot, SequenceComparer};
use seqcmp::config::{Config, LimitsConfig};
use seqcmp::input::{read_input, read_pair, InputSource};
use seqcmp::model::{DifferenceKind, SequenceType};
use seqcmp::output::write_json_report;
use seqcmp::parse_and_align;
use seqcmp::parser::ParseError;

fn data_file(name: &str) -> InputSource {
    InputSource::File(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(name))
}

#[test]
fn test_compare_sample_files() {
    let limits = LimitsConfig::default();
    let (raw1, raw2) = read_pair(&data_file("seq1.fasta"), &data_file("seq2.fasta"), &limits).unwrap();
    let report = parse_and_align(&raw1, &raw2).unwrap();

    assert_eq!(report.seq1_info.id.as_deref(), Some("sample_1"));
    assert_eq!(report.seq2_info.id.as_deref(), Some("sample_2"));
    assert_eq!(report.seq1_info.length, 12);
    assert_eq!(report.total_positions, 12);
    assert_eq!(report.matches, 11);
    assert_eq!(report.similarity_percent, 91.67);
    assert_eq!(report.differences.len(), 1);
    assert_eq!(report.differences[0].position, 12);
    assert_eq!(report.differences[0].kind, DifferenceKind::Mismatch);
}

#[test]
fn test_plain_text_protein_file() {
    let raw = read_input(&data_file("protein.txt"), &LimitsConfig::default()).unwrap();
    let report = parse_and_align(&raw, "mktayiakqrqisfvkshfsrq").unwrap();

    assert_eq!(report.seq1_info.sequence_type, SequenceType::AminoAcid);
    assert_eq!(report.seq1_info.id, None);
    assert_eq!(report.total_positions, 22);
    assert_eq!(report.similarity_percent, 100.0);
    assert!(report.is_identical());
}

#[test]
fn test_gap_scenario() {
    let report = parse_and_align("ACGT", "ACT").unwrap();

    assert_eq!(report.aligned_seq1, "ACGT");
    assert_eq!(report.aligned_seq2, "AC-T");
    assert_eq!(report.total_positions, 4);
    assert_eq!(report.gap_positions, 1);
    assert_eq!(report.differences.len(), 1);
    assert_eq!(report.differences[0].kind, DifferenceKind::Gap);
    assert_eq!(report.visualization.len(), 4);
}

#[test]
fn test_invalid_second_sequence() {
    let err = parse_and_align("ACGT", "ACDEFGHIKLMNPQRSTVWYJ").unwrap_err();
    assert_eq!(
        err,
        CompareError::Parse {
            slot: InputSlot::Second,
            source: ParseError::InvalidCharacter {
                character: 'J',
                position: 21
            },
        }
    );
}

#[test]
fn test_configured_comparer() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "[scoring]\nmatch_score = 1.0\nmismatch_score = -3.0\ngap_open = -2.0\ngap_extend = -1.0").unwrap();
    let config = Config::load(file.path()).unwrap();

    let report = SequenceComparer::from_config(&config).compare("ACGT", "ACGT").unwrap();
    assert_eq!(report.score, 4.0);
}

#[test]
fn test_tempfile_input_to_json() {
    let mut file = tempfile::Builder::new().suffix(".fa").tempfile().unwrap();
    writeln!(file, ">query\nACGT").unwrap();
    let raw1 = read_input(&InputSource::File(file.path().to_path_buf()), &LimitsConfig::default()).unwrap();
    let outcome = parse_and_align(&raw1, "ACT");

    let mut out = Vec::new();
    write_json_report(&mut out, outcome.as_ref()).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

    assert_eq!(value["success"], true);
    assert_eq!(value["similarity"], 75.0);
    assert_eq!(value["seq1_info"]["id"], "query");
    assert_eq!(value["differences_detail"][0]["type"], "gap");
}
