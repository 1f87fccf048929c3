use anyhow::{Context, Result as AnyResult};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::actions::{clip_segments, label_lap, segment};
use crate::config::AnalysisConfig;
use crate::error::{Result, TelemetryError};
use crate::extrema::annotate_extrema;
use crate::speed_profile::{compare_average_speed, SpeedComparison, SpeedProfile};
use crate::types::{ActionSegment, ActionState, CarSample, ExtremumKind};

/// Fastest lap of one driver, as exported by the data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapTelemetry {
    pub driver: String,
    pub lap_time_s: f64,
    pub samples: Vec<CarSample>,
}

impl LapTelemetry {
    pub fn speed_profile(&self) -> Result<SpeedProfile> {
        SpeedProfile::new(self.samples.iter().map(CarSample::speed_sample).collect())
    }
}

/// Per-distance time gap between the two laps, computed by the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeltaTrace {
    pub distance_m: Vec<f64>,
    pub gap_s: Vec<f64>,
}

/// Input file: two drivers' fastest laps from one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionLaps {
    pub event: String,
    pub year: u16,
    pub session: String,
    pub reference: LapTelemetry,
    pub comparison: LapTelemetry,
    #[serde(default)]
    pub delta: Option<DeltaTrace>,
}

impl SessionLaps {
    pub fn load(path: impl AsRef<Path>) -> AnyResult<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read laps at {}", path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("failed to parse laps in {}", path.display()))
    }
}

/// Lap time as `<minutes>.<ss.sss>`, e.g. 72.345 s is `1.12.345`.
pub fn format_lap_time(seconds: f64) -> Result<String> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(TelemetryError::invalid(format!("bad lap time {}", seconds)));
    }
    let minutes = (seconds / 60.0).floor();
    let rest = seconds - minutes * 60.0;
    Ok(format!("{}.{:06.3}", minutes as u64, rest))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtremumMark {
    pub distance_m: f64,
    pub kind: ExtremumKind,
    pub speed_kph: f64,
}

/// One horizontal bar of the action chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionBar {
    pub action: ActionState,
    pub left_m: f64,
    pub width_m: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverReport {
    pub driver: String,
    pub lap_time: String,
    pub extrema: Vec<ExtremumMark>,
    pub segments: Vec<ActionSegment>,
    pub zoom_bars: Vec<ActionBar>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapComparison {
    pub title: String,
    pub reference: DriverReport,
    pub comparison: DriverReport,
    pub zoom_speed: SpeedComparison,
    pub delta: Option<DeltaTrace>,
}

pub fn driver_report(lap: &LapTelemetry, cfg: &AnalysisConfig) -> Result<DriverReport> {
    analyse_lap(lap, cfg).map(|(report, _)| report)
}

/// Build the report and hand back the speed profile it was computed from.
fn analyse_lap(lap: &LapTelemetry, cfg: &AnalysisConfig) -> Result<(DriverReport, SpeedProfile)> {
    let profile = lap.speed_profile()?;
    let labels = annotate_extrema(profile.samples(), cfg.extrema_window, &cfg.dedup_offsets)?;

    let mut extrema = Vec::new();
    for (sample, label) in profile.samples().iter().zip(&labels) {
        if let Some(v) = label.min {
            extrema.push(ExtremumMark {
                distance_m: sample.x_m,
                kind: ExtremumKind::Minimum,
                speed_kph: v,
            });
        }
        if let Some(v) = label.max {
            extrema.push(ExtremumMark {
                distance_m: sample.x_m,
                kind: ExtremumKind::Maximum,
                speed_kph: v,
            });
        }
    }

    let segments = segment(&label_lap(&lap.samples, &cfg.action_thresholds)?)?;
    let zoom_bars = clip_segments(&segments, cfg.zoom.distance_min_m, cfg.zoom.distance_max_m)
        .into_iter()
        .map(|s| ActionBar {
            action: s.action,
            left_m: s.end_m - s.length_m,
            width_m: s.length_m,
            color: cfg.action_colors.color_for(s.action).to_string(),
        })
        .collect();

    tracing::info!(
        driver = %lap.driver,
        samples = lap.samples.len(),
        extrema = extrema.len(),
        segments = segments.len(),
        "lap analysed"
    );

    let report = DriverReport {
        driver: lap.driver.clone(),
        lap_time: format_lap_time(lap.lap_time_s)?,
        extrema,
        segments,
        zoom_bars,
    };
    Ok((report, profile))
}

/// Analyse both laps of a session and compare them over the zoom window.
pub fn compare_laps(laps: &SessionLaps, cfg: &AnalysisConfig) -> Result<LapComparison> {
    cfg.validate()?;

    let (reference, ref_profile) = analyse_lap(&laps.reference, cfg)?;
    let (comparison, cmp_profile) = analyse_lap(&laps.comparison, cfg)?;
    let zoom_speed = compare_average_speed(
        (laps.reference.driver.as_str(), &ref_profile),
        (laps.comparison.driver.as_str(), &cmp_profile),
        cfg.zoom.distance_min_m,
        cfg.zoom.distance_max_m,
    )?;

    let title = format!(
        "Fastest Lap Comparison {} {} {} {}={} {}={}",
        laps.event,
        laps.year,
        laps.session,
        reference.driver,
        reference.lap_time,
        comparison.driver,
        comparison.lap_time
    );

    Ok(LapComparison {
        title,
        reference,
        comparison,
        zoom_speed,
        delta: laps.delta.clone(),
    })
}
