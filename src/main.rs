use anyhow::{Context, Result};
use lap_telemetry::{compare_laps, AnalysisConfig, SessionLaps};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let laps_path = std::env::var("LAPS_PATH")
        .ok()
        .or_else(|| std::env::args().nth(1))
        .context("LAPS_PATH not set and no laps file given")?;

    let cfg = match resolve_config_path() {
        Some(path) => {
            tracing::info!("loading config from {}", path.display());
            AnalysisConfig::load(&path)?
        }
        None => {
            tracing::info!("no config file found; using defaults");
            AnalysisConfig::default()
        }
    };

    let laps = SessionLaps::load(&laps_path)?;
    tracing::info!(
        "loaded {} {} {}: {} vs {}",
        laps.event, laps.year, laps.session, laps.reference.driver, laps.comparison.driver
    );

    let report = compare_laps(&laps, &cfg)
        .with_context(|| format!("failed to compare laps from {}", laps_path))?;
    tracing::info!("{}", report.zoom_speed);

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(p) = std::env::var("CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }

    let candidates = [
        PathBuf::from("lap_telemetry.json"),
        PathBuf::from("config/lap_telemetry.json"),
        {
            let mut p = std::env::current_exe().unwrap_or_else(|_| PathBuf::from("."));
            p.pop(); // exe dir
            p.push("lap_telemetry.json");
            p
        },
    ];

    candidates.into_iter().find(|c| c.exists())
}
