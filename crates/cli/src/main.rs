mod cli;

use std::collections::BTreeSet;
use std::fs;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use serde::Serialize;
use tracing::info;

use touchflow_core::{config, EngineConfig, Journey};
use touchflow_engine::{AttributionEngine, AttributionReport};

use crate::cli::CliArgs;

/// Report envelope with the timestamp stamped here at the CLI layer; the
/// engine itself stays clock-free.
#[derive(Debug, Serialize)]
struct ReportEnvelope {
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    report: AttributionReport,
}

fn main() -> Result<()> {
    config::load_dotenv();

    // Logs to stderr so stdout carries only the report.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();

    let engine_config = match args.config.as_deref() {
        Some(path) => load_config(path)?,
        None => EngineConfig::from_env(),
    };
    engine_config.log_summary();

    let journeys = load_journeys(&args.journeys)?;
    info!("Loaded {} journeys from {}", journeys.len(), args.journeys);

    let channels = match args.channels {
        Some(list) => list,
        None => derive_channels(&journeys),
    };
    info!("Using {} channels", channels.len());

    let report = AttributionEngine::new(engine_config)
        .run(&journeys, &channels)
        .context("attribution run failed")?;

    let envelope = ReportEnvelope {
        generated_at: Utc::now(),
        report,
    };
    let json = if args.pretty {
        serde_json::to_string_pretty(&envelope)?
    } else {
        serde_json::to_string(&envelope)?
    };
    println!("{}", json);

    Ok(())
}

fn load_journeys(path: &str) -> Result<Vec<Journey>> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("reading journey file {}", path))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing journey file {}", path))
}

fn load_config(path: &str) -> Result<EngineConfig> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("reading config file {}", path))?;
    toml::from_str(&raw).with_context(|| format!("parsing config file {}", path))
}

/// Fall back to the distinct observed touches, sorted for determinism.
fn derive_channels(journeys: &[Journey]) -> Vec<String> {
    journeys
        .iter()
        .flat_map(|j| j.touches.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
