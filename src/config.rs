use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::error::TelemetryError;
use crate::types::ActionState;

/// Comparison radius used to find local speed extrema.
pub const DEFAULT_EXTREMA_WINDOW: usize = 10;
/// Index offsets scanned, in order, when collapsing repeated extrema.
pub const DEFAULT_DEDUP_OFFSETS: [usize; 4] = [4, 3, 2, 1];
pub const DEFAULT_BRAKE_ON: f64 = 0.0;
pub const DEFAULT_FULL_THROTTLE_PCT: f64 = 98.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionThresholds {
    /// Brake input strictly above this counts as braking
    pub brake_on: f64,
    /// Throttle strictly above this counts as full throttle
    pub full_throttle_pct: f64,
}

impl Default for ActionThresholds {
    fn default() -> Self {
        Self {
            brake_on: DEFAULT_BRAKE_ON,
            full_throttle_pct: DEFAULT_FULL_THROTTLE_PCT,
        }
    }
}

/// Distance range the comparison charts zoom into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomWindow {
    pub distance_min_m: f64,
    pub distance_max_m: f64,
}

impl Default for ZoomWindow {
    fn default() -> Self {
        Self {
            distance_min_m: 500.0,
            distance_max_m: 1000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionColors {
    pub full_throttle: String,
    pub cornering: String,
    pub braking: String,
}

impl Default for ActionColors {
    fn default() -> Self {
        Self {
            full_throttle: "green".to_string(),
            cornering: "grey".to_string(),
            braking: "red".to_string(),
        }
    }
}

impl ActionColors {
    pub fn color_for(&self, action: ActionState) -> &str {
        match action {
            ActionState::FullThrottle => &self.full_throttle,
            ActionState::Cornering => &self.cornering,
            ActionState::Braking => &self.braking,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub extrema_window: usize,
    pub dedup_offsets: Vec<usize>,
    pub action_thresholds: ActionThresholds,
    pub zoom: ZoomWindow,
    pub action_colors: ActionColors,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            extrema_window: DEFAULT_EXTREMA_WINDOW,
            dedup_offsets: DEFAULT_DEDUP_OFFSETS.to_vec(),
            action_thresholds: ActionThresholds::default(),
            zoom: ZoomWindow::default(),
            action_colors: ActionColors::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        let cfg: AnalysisConfig = serde_json::from_str(&data)
            .with_context(|| format!("invalid config JSON in {}", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), TelemetryError> {
        if self.extrema_window < 1 {
            return Err(TelemetryError::invalid("extrema_window must be >= 1"));
        }
        if self.dedup_offsets.is_empty() || self.dedup_offsets.contains(&0) {
            return Err(TelemetryError::invalid(
                "dedup_offsets must be non-empty and strictly positive",
            ));
        }
        let t = &self.action_thresholds;
        if !t.brake_on.is_finite() || !t.full_throttle_pct.is_finite() {
            return Err(TelemetryError::invalid("action thresholds must be finite"));
        }
        if !(self.zoom.distance_min_m <= self.zoom.distance_max_m) {
            return Err(TelemetryError::invalid(format!(
                "zoom window inverted: {:.1}m > {:.1}m",
                self.zoom.distance_min_m, self.zoom.distance_max_m
            )));
        }
        Ok(())
    }
}
