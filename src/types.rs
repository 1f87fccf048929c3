use serde::{Deserialize, Serialize};

/// One car telemetry reading, ordered by distance along the lap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarSample {
    /// Distance along lap in meters
    pub distance_m: f64,
    /// Speed in km/h; absent where the provider left an interpolation gap
    pub speed_kph: Option<f64>,
    /// Throttle pedal in percent
    pub throttle_pct: Option<f64>,
    /// Brake input, 0 when off
    pub brake: Option<f64>,
    pub n_gear: Option<u8>,
    pub rpm: Option<f64>,
    pub drs: Option<u8>,
}

impl CarSample {
    pub fn speed_sample(&self) -> SpeedSample {
        SpeedSample {
            x_m: self.distance_m,
            speed_kph: self.speed_kph,
        }
    }
}

/// Speed at a given lap distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedSample {
    /// Distance along lap in meters
    pub x_m: f64,
    /// Speed in km/h
    pub speed_kph: Option<f64>,
}

impl SpeedSample {
    pub fn new(x_m: f64, speed_kph: f64) -> Self {
        Self {
            x_m,
            speed_kph: Some(speed_kph),
        }
    }

    pub fn missing(x_m: f64) -> Self {
        Self { x_m, speed_kph: None }
    }

    /// Speed if present and a real number.
    pub fn speed(&self) -> Option<f64> {
        self.speed_kph.filter(|v| !v.is_nan())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExtremumKind {
    Minimum,
    Maximum,
}

/// A sample index flagged as a local extremum, with the speed there.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extremum {
    pub index: usize,
    pub speed_kph: f64,
}

/// Raw extrema of a series, indices ascending. An index may be in both lists
/// when its neighbourhood is flat.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawExtrema {
    pub minima: Vec<Extremum>,
    pub maxima: Vec<Extremum>,
}

impl RawExtrema {
    pub fn of_kind(&self, kind: ExtremumKind) -> &[Extremum] {
        match kind {
            ExtremumKind::Minimum => &self.minima,
            ExtremumKind::Maximum => &self.maxima,
        }
    }
}

/// Per-sample extrema annotation. Both can be set when flat regions coincide.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtremaLabel {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ExtremaLabel {
    pub fn is_tagged(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }
}

/// What the driver is doing at a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionState {
    #[serde(rename = "Brake")]
    Braking,
    #[serde(rename = "Full Throttle")]
    FullThrottle,
    Cornering,
}

impl ActionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionState::Braking => "Brake",
            ActionState::FullThrottle => "Full Throttle",
            ActionState::Cornering => "Cornering",
        }
    }
}

impl std::fmt::Display for ActionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sample distance paired with its action label, input to segmentation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabeledSample {
    pub distance_m: f64,
    pub action: ActionState,
}

/// Maximal run of consecutive samples sharing one action.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionSegment {
    /// Run counter, starting at 1
    pub id: usize,
    pub action: ActionState,
    /// Distance of the first sample in the run
    pub start_m: f64,
    /// Max distance in the run
    pub end_m: f64,
    /// end_m minus the previous segment's end_m (or end_m for the first)
    pub length_m: f64,
    pub samples: usize,
}
