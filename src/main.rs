//! seqcmp - Pairwise Sequence Comparison
//!
//! Aligns two nucleotide or protein sequences and reports their similarity
//! and differences.
//!
//! ## Usage
//!
//! ```bash
//! seqcmp seq1.fasta seq2.fasta                 # interactive viewer
//! seqcmp seq1.fasta seq2.fasta -o -            # text report on stdout
//! seqcmp --raw ACGT ACT --format json          # JSON report on stdout
//! cat seq1.fa | seqcmp - seq2.fa -o report.txt
//! ```
//!
//! ## Navigation (Vim-style)
//!
//! - `h/l`: Move left/right
//! - `n/N`: Next/previous difference
//! - `:q`: Quit
//! - `?`: Help

// Use jemalloc for better memory management (returns memory to OS)
#[cfg(not(windows))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{info, LevelFilter};

use seqcmp::compare::SequenceComparer;
use seqcmp::config::Config;
use seqcmp::controller::run_app;
use seqcmp::input::{read_pair, InputSource};
use seqcmp::model::AppState;
use seqcmp::output::{emit_report, ReportFormat, TextOptions};
use seqcmp::ui::glyphs;

/// Report format for command line
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// Human-readable report
    Text,
    /// JSON document
    Json,
}

impl From<FormatArg> for ReportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => ReportFormat::Text,
            FormatArg::Json => ReportFormat::Json,
        }
    }
}

/// seqcmp - Compare two nucleotide or protein sequences
///
/// Inputs are FASTA or plain sequence files ("-" for stdin), or literal
/// sequences with --raw. Without -o/--output or --format, opens an
/// interactive viewer. Otherwise writes a report to the output file
/// (or stdout with "-").
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// First sequence (file, "-" for stdin, or text with --raw)
    seq1: String,

    /// Second sequence (file, "-" for stdin, or text with --raw)
    seq2: String,

    /// Treat SEQ1 and SEQ2 as sequence text instead of file names
    #[arg(long)]
    raw: bool,

    /// Output file (enables report mode). Use "-" for stdout.
    #[arg(short = 'o', long = "output")]
    output: Option<String>,

    /// Report format (enables report mode, default: text)
    #[arg(short = 'f', long = "format", value_enum)]
    format: Option<FormatArg>,

    /// TOML configuration file
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Alignment columns per block in the text report
    #[arg(long = "line-width")]
    line_width: Option<usize>,

    /// Use Unicode glyphs
    #[arg(long)]
    fancy: bool,

    /// Reject sequences longer than this
    #[arg(long = "max-length")]
    max_length: Option<usize>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    // RUST_LOG takes precedence over -v
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.as_str())).init();
}

/// Loads the configuration file (if any) and applies command-line overrides.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path).with_context(|| format!("Failed to load {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(width) = args.line_width {
        config.output.line_width = width;
    }
    if args.fancy {
        config.output.fancy_glyphs = true;
    }
    if args.max_length.is_some() {
        config.limits.max_sequence_length = args.max_length;
    }
    config.validate().context("Invalid command-line options")?;
    Ok(config)
}

/// Runs report mode: compare and write the report to a file or stdout.
fn run_report_mode(
    raw_seq1: &str,
    raw_seq2: &str,
    config: &Config,
    output: &str,
    format: ReportFormat,
) -> Result<()> {
    let comparer = SequenceComparer::from_config(config);
    let outcome = comparer.compare(raw_seq1, raw_seq2);
    let options = TextOptions {
        line_width: config.output.line_width,
        glyphs: glyphs::select(config.output.fancy_glyphs),
    };

    let written = emit_report(output, format, outcome.as_ref(), &options)
        .with_context(|| format!("Failed to write {}", output))?;
    if written && output != "-" {
        eprintln!("Wrote report to {}", output);
    }
    outcome?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(&args)?;
    let first = InputSource::from_arg(&args.seq1, args.raw);
    let second = InputSource::from_arg(&args.seq2, args.raw);
    let (raw_seq1, raw_seq2) = read_pair(&first, &second, &config.limits)?;
    info!("read {} and {}", first.label(), second.label());

    if args.output.is_some() || args.format.is_some() {
        let output = args.output.as_deref().unwrap_or("-");
        let format = args.format.map(ReportFormat::from).unwrap_or(ReportFormat::Text);
        run_report_mode(&raw_seq1, &raw_seq2, &config, output, format)?;
    } else {
        let report = SequenceComparer::from_config(&config).compare(&raw_seq1, &raw_seq2)?;
        run_app(AppState::new(report), glyphs::select(config.output.fancy_glyphs))?;
    }

    Ok(())
}
