//! `trackeval` CLI: evaluate the track continuity of a perception recording.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use trackeval_rs::{AssignmentStrategy, EngineConfig, evaluate_recording, load_recording, write_report};

#[derive(Parser)]
#[command(name = "trackeval", about = "Track continuity evaluation for perception recordings")]
struct Cli {
    /// Path of the input JSON recording
    #[arg(long)]
    file: PathBuf,
    /// Path where the JSON report is stored
    #[arg(long = "output_file")]
    output_file: PathBuf,
    /// Maximum distance in metres between two same-frame positions of one object
    #[arg(long = "localisation_max_diff", default_value_t = 0.5)]
    localisation_max_diff: f64,
    /// Consecutive occluded frames tolerated before a track is lost
    #[arg(long = "max_occluded_frames", default_value_t = 1)]
    max_occluded_frames: u32,
    /// Assignment policy of the spatial matcher
    #[arg(long, value_enum, default_value = "greedy")]
    assignment: AssignmentStrategy,
    /// Frames after a loss during which a nearby new track counts as a fragmentation
    #[arg(long = "fragmentation_window", default_value_t = 10)]
    fragmentation_window: u32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = EngineConfig {
        localisation_max_diff: cli.localisation_max_diff,
        max_occluded_frames: cli.max_occluded_frames,
        assignment: cli.assignment,
        fragmentation_window: cli.fragmentation_window,
    };
    config.validate().context("invalid parameters")?;

    let recording = load_recording(&cli.file)
        .with_context(|| format!("failed to load {}", cli.file.display()))?;
    let report = evaluate_recording(&recording, config)
        .with_context(|| format!("failed to evaluate {}", cli.file.display()))?;
    write_report(&report, &cli.output_file)
        .with_context(|| format!("failed to write {}", cli.output_file.display()))?;

    let summary = &report.summary;
    println!(
        "{} frames, {} tracks: {} matches, {} lost, {} recovered, {} identity switches, {} fragmentations",
        summary.frames_processed,
        summary.total_tracks,
        summary.total_matches,
        summary.lost_tracks,
        summary.recovered_after_occlusion,
        summary.identity_switches,
        summary.fragmentations,
    );
    if !report.localisation.is_empty() {
        println!("{} ego localisation anomalies", report.localisation.len());
    }

    Ok(())
}
