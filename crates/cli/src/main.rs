//! Phonoslice CLI: cut aligned speech into labeled clips and split the
//! resulting corpus into train/valid/test sets.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use phonoslice_core::alignment::LabelSet;
use phonoslice_core::batch::run_segmentation;
use phonoslice_core::cancel::CancelFlag;
use phonoslice_core::config::{SegmentConfig, DEFAULT_INTERVAL_MS};
use phonoslice_core::partition::{self, create_split_roots, partition_corpus, SplitQuota};
use phonoslice_core::segment::SegmentMode;

// ─── Top-level CLI ───────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "phonoslice",
    about = "Phoneme-aligned speech segmentation and dataset splitting",
    version,
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Cut utterances into clips filed under label directories
    Segment(SegmentArgs),
    /// Split a labeled corpus into train/valid/test
    Split(SplitArgs),
}

// ─── Segment ─────────────────────────────────────────────────────

#[derive(Parser, Debug)]
struct SegmentArgs {
    /// Root of the utterance audio tree (WAV or FLAC)
    audio_root: PathBuf,

    /// Root of the TextGrid tree, mirroring the audio tree
    alignment_root: PathBuf,

    /// Directory the label folders are written to
    output_dir: PathBuf,

    /// Segmentation mode
    #[arg(
        long,
        default_value = "by_interval",
        value_parser = ["by_phoneme", "by_interval", "by_count"]
    )]
    mode: String,

    /// Window length in milliseconds (window modes)
    #[arg(long, default_value_t = DEFAULT_INTERVAL_MS)]
    interval_ms: f64,

    /// Comma-separated permitted phoneme labels (default: the 15 vowels)
    #[arg(long)]
    labels: Option<String>,

    /// Read only WAV input; skip FLAC conversion
    #[arg(long, default_value_t = false)]
    no_convert: bool,

    /// Keep the converted WAV tree after the run
    #[arg(long, default_value_t = false)]
    keep_converted: bool,

    /// Print the JSON report to stdout
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Show verbose output
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

// ─── Split ───────────────────────────────────────────────────────

#[derive(Parser, Debug)]
struct SplitArgs {
    /// Corpus root with one folder per class
    source: PathBuf,

    /// Directory to create train/, valid/ and test/ under
    dest: PathBuf,

    /// Fraction of each class for training
    #[arg(long, default_value_t = 0.8)]
    train: f64,

    /// Fraction of each class for validation
    #[arg(long, default_value_t = 0.1)]
    valid: f64,

    /// Keep every sample instead of truncating classes to the smallest
    #[arg(long, default_value_t = false)]
    unbalanced: bool,

    /// Primary file extension
    #[arg(long, default_value = "wav")]
    extension: String,

    /// Companion extension copied with each primary file (e.g. wrd)
    #[arg(long)]
    paired_extension: Option<String>,

    /// RNG seed for a reproducible shuffle
    #[arg(long)]
    seed: Option<u64>,

    /// Print the JSON report to stdout
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Show verbose output
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

// ─── Main ────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    let log_level = match &cli.command {
        Command::Segment(a) if a.verbose => "debug",
        Command::Split(a) if a.verbose => "debug",
        _ => "info",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let result = install_interrupt_handler().and_then(|cancel| match cli.command {
        Command::Segment(args) => run_segment(args, &cancel),
        Command::Split(args) => run_split(args, &cancel),
    });

    if let Err(e) = result {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

/// Ctrl-C stops the batch after the file in progress.
fn install_interrupt_handler() -> Result<CancelFlag> {
    let cancel = CancelFlag::new();
    let flag = cancel.clone();
    ctrlc::set_handler(move || {
        log::warn!("Interrupt received, finishing current file");
        flag.cancel();
    })
    .context("Failed to install Ctrl-C handler")?;
    Ok(cancel)
}

fn run_segment(args: SegmentArgs, cancel: &CancelFlag) -> Result<()> {
    let mut config = SegmentConfig::new(&args.audio_root, &args.alignment_root, &args.output_dir);
    config.mode = args.mode.parse::<SegmentMode>()?;
    config.interval_ms = args.interval_ms;
    if let Some(labels) = &args.labels {
        config.labels = labels.parse::<LabelSet>()?;
    }
    if args.no_convert {
        config.converted_dir = None;
    }
    config.delete_converted = !args.keep_converted;

    let report = run_segmentation(&config, cancel).with_context(|| {
        format!("Segmentation of {} failed", args.audio_root.display())
    })?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    println!("Mode: {}", report.mode);
    println!(
        "Files: {} processed, {} skipped (no alignment), {} failed",
        report.processed, report.skipped, report.failed
    );
    println!("Clips written: {}", report.clips_written);
    if report.cancelled {
        println!("Interrupted before all files were processed");
    }
    println!("Output: {}", args.output_dir.display());
    Ok(())
}

fn run_split(args: SplitArgs, cancel: &CancelFlag) -> Result<()> {
    let quota = SplitQuota {
        train_fraction: args.train,
        valid_fraction: args.valid,
        balanced: !args.unbalanced,
        extension: args.extension,
        paired_extension: args.paired_extension,
        seed: args.seed,
    };
    quota.validate()?;

    let roots = create_split_roots(&args.dest)?;
    let report = partition_corpus(&args.source, &roots, &quota, cancel)
        .with_context(|| format!("Splitting {} failed", args.source.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    for class in &report.classes {
        println!(
            "{}: {} train, {} valid, {} test ({} unused)",
            class.class, class.counts.train, class.counts.valid, class.counts.test, class.discarded
        );
    }
    for warning in &report.warnings {
        println!("Warning: {}", warning);
    }
    if report.cancelled {
        println!("Interrupted before all classes were copied");
    }
    println!("Report: {}", roots.root.join(partition::REPORT_FILE).display());
    Ok(())
}
