use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use blinktalk_core::{AppConfig, BlinkPipeline, ErrorCode, PipelineError, Vocabulary};
use clap::{Parser, Subcommand};
use serde::Deserialize;

#[derive(Parser, Debug)]
#[command(
    name = "blinktalk_cli",
    about = "Deterministic EAR-sample replay harness for the BlinkTalk core"
)]
struct Cli {
    /// Override path to the pipeline config JSON
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override path to the vocabulary JSON (sequences_v1.json shape)
    #[arg(long)]
    vocab: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a recorded EAR sample file through the pipeline
    Replay {
        /// JSON array of {"timestamp_ms": f64, "ear": f64} samples
        #[arg(long)]
        input: PathBuf,
        /// Calibration preset to activate before replaying
        #[arg(long)]
        profile: Option<String>,
    },
    /// List the built-in calibration presets
    Profiles,
    /// Print the active vocabulary table
    DumpVocab,
}

/// One recorded EAR sample
#[derive(Debug, Deserialize)]
struct EarSample {
    timestamp_ms: f64,
    ear: f64,
}

fn main() -> ExitCode {
    blinktalk_core::init_logging();
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = cli
        .config
        .as_ref()
        .map(AppConfig::load_from_file)
        .unwrap_or_default();
    let vocabulary = cli
        .vocab
        .as_ref()
        .map(Vocabulary::load_from_file)
        .unwrap_or_default();

    match cli.command {
        Commands::Replay { input, profile } => run_replay(&config, vocabulary, &input, profile),
        Commands::Profiles => run_profiles(),
        Commands::DumpVocab => run_dump_vocab(&vocabulary),
    }
}

fn run_replay(
    config: &AppConfig,
    vocabulary: Vocabulary,
    input: &PathBuf,
    profile: Option<String>,
) -> Result<ExitCode> {
    let contents = fs::read_to_string(input)
        .with_context(|| format!("failed to read sample file {input:?}"))?;
    let samples: Vec<EarSample> =
        serde_json::from_str(&contents).context("failed to parse sample file")?;

    let pipeline = BlinkPipeline::with_config(config, vocabulary);
    if let Some(name) = profile {
        pipeline
            .set_profile(&name)
            .with_context(|| format!("failed to activate profile '{name}'"))?;
    }

    let mut dropped = 0usize;
    for sample in &samples {
        match pipeline.ingest_sample(sample.timestamp_ms, sample.ear) {
            Ok(Some(event)) => {
                println!(
                    "{:>10.1} ms  blink {}  ({:.0} ms)",
                    event.end_ms,
                    event.symbol,
                    event.duration_ms
                );
            }
            Ok(None) => {}
            Err(err @ PipelineError::NonMonotonicSample { .. }) => {
                eprintln!("dropped sample at {:.1} ms: {}", sample.timestamp_ms, err.message());
                dropped += 1;
            }
            Err(err) => return Err(err.into()),
        }

        let word = pipeline
            .take_last_word()
            .map_err(anyhow::Error::from)?;
        if !word.is_empty() {
            println!("{:>10.1} ms  word: {}", sample.timestamp_ms, word);
        }
    }

    let stats = pipeline.stats().map_err(anyhow::Error::from)?;
    println!(
        "replayed {} samples ({} dropped): {} finalized, {} resolved, {} unresolved",
        samples.len(),
        dropped,
        stats.total_finalized,
        stats.resolved,
        stats.unresolved
    );
    Ok(ExitCode::SUCCESS)
}

fn run_profiles() -> Result<ExitCode> {
    for profile in blinktalk_core::calibration::presets() {
        let t = &profile.thresholds;
        println!(
            "{:<8} short<={} long={}..={} symbol_gap<{} word_gap>={}  {}",
            profile.name,
            t.short_max_ms,
            t.long_min_ms,
            t.long_max_ms,
            t.symbol_gap_max_ms,
            t.word_gap_min_ms,
            profile.description
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn run_dump_vocab(vocabulary: &Vocabulary) -> Result<ExitCode> {
    for entry in vocabulary.entries() {
        println!(
            "{:<12} {}",
            entry.word,
            blinktalk_core::BlinkSymbol::render_pattern(&entry.pattern)
        );
    }
    Ok(ExitCode::SUCCESS)
}
