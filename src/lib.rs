//! Speed extrema and driver-action segmentation for comparing F1 laps.
//!
//! The core operations are pure functions over in-memory telemetry:
//! [`find_raw_extrema`], [`dedup_adjacent`], [`label_action`] and [`segment`].
//! [`compare_laps`] strings them together for two drivers' fastest laps.

pub mod actions;
pub mod config;
pub mod error;
pub mod extrema;
pub mod lap;
pub mod speed_profile;
pub mod types;

pub use actions::{clip_segments, label_action, label_lap, segment};
pub use config::{ActionColors, ActionThresholds, AnalysisConfig, ZoomWindow};
pub use error::TelemetryError;
pub use extrema::{annotate_extrema, dedup_adjacent, find_raw_extrema};
pub use lap::{
    compare_laps, driver_report, format_lap_time, LapComparison, LapTelemetry, SessionLaps,
};
pub use speed_profile::{compare_average_speed, SpeedComparison, SpeedProfile};
pub use types::{
    ActionSegment, ActionState, CarSample, ExtremaLabel, Extremum, ExtremumKind, LabeledSample,
    RawExtrema, SpeedSample,
};
