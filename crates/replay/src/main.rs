//! Drowsiness Replay - Main Entry Point

use anyhow::Context;
use clap::Parser;
use drowsiness_engine::{EngineConfig, LandmarkGazeEstimator, SubjectRegistry};
use replay::{init_logging, load_alert_config, Replayer};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(name = "drowsiness-replay")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON-lines file of recorded frames ("-" reads stdin)
    #[arg(short, long)]
    input: PathBuf,

    /// TOML config file (engine settings plus an optional [alerts] table)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Subject id for frames that don't name one
    #[arg(short, long, default_value = "driver")]
    subject: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: Level,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_level, args.json_logs);

    info!("=== Drowsiness Replay v{} ===", env!("CARGO_PKG_VERSION"));

    let engine_config =
        EngineConfig::load(args.config.as_deref()).context("loading engine configuration")?;
    let alert_config =
        load_alert_config(args.config.as_deref()).context("loading alert configuration")?;

    let gaze = LandmarkGazeEstimator::new(engine_config.gaze_offset_px);
    let registry = SubjectRegistry::new(engine_config)?.with_gaze_estimator(Arc::new(gaze));
    let mut replayer = Replayer::new(registry, alert_config, args.subject)?;

    let stdout = io::stdout().lock();
    let summary = if args.input.as_os_str() == "-" {
        replayer.run(io::stdin().lock(), stdout)?
    } else {
        let file = File::open(&args.input)
            .with_context(|| format!("opening {}", args.input.display()))?;
        replayer.run(BufReader::new(file), stdout)?
    };

    info!(
        "Replayed {} frames ({} lines skipped)",
        summary.frames, summary.skipped_lines
    );
    for (subject, stats) in &summary.sessions {
        info!(
            "[{}] {:.1}s, tracked {}/{} frames, avg score {:.1}, peak {}, alerts {}",
            subject,
            stats.duration_ms as f64 / 1000.0,
            stats.tracked_frames,
            stats.frames,
            stats.average_score,
            stats.peak_score,
            stats.total_alerts
        );
    }

    Ok(())
}
