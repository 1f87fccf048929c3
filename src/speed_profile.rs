use serde::{Deserialize, Serialize};

use crate::error::{check_distances, Result, TelemetryError};
use crate::types::SpeedSample;

/// Speed trace of one lap, ordered by distance.
///
/// Holds the samples used for extrema detection and distance-window
/// statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedProfile {
    samples: Vec<SpeedSample>,
}

impl SpeedProfile {
    /// Create a profile from samples already ordered by distance.
    ///
    /// # Errors
    /// `InvalidInput` if `samples` is empty or distances decrease.
    pub fn new(samples: Vec<SpeedSample>) -> Result<Self> {
        check_distances(samples.iter().map(|s| s.x_m))?;
        Ok(Self { samples })
    }

    pub fn samples(&self) -> &[SpeedSample] {
        &self.samples
    }

    /// Samples with `min_m <= x_m <= max_m`.
    ///
    /// # Arguments
    /// * `min_m` - Start of the distance window in meters
    /// * `max_m` - End of the distance window in meters
    pub fn window(&self, min_m: f64, max_m: f64) -> &[SpeedSample] {
        let start = self.samples.partition_point(|s| s.x_m < min_m);
        let end = self.samples.partition_point(|s| s.x_m <= max_m);
        if start >= end {
            return &[];
        }
        &self.samples[start..end]
    }

    /// Mean speed over the samples inside `[min_m, max_m]`.
    ///
    /// Samples without a speed are skipped.
    ///
    /// # Errors
    /// `InvalidInput` if the window is inverted or holds no usable speed.
    pub fn average_speed(&self, min_m: f64, max_m: f64) -> Result<f64> {
        if !(min_m <= max_m) {
            return Err(TelemetryError::invalid(format!(
                "distance window inverted: {:.1}m > {:.1}m",
                min_m, max_m
            )));
        }

        let window = self.window(min_m, max_m);
        let speeds: Vec<f64> = window.iter().filter_map(|s| s.speed()).collect();
        let skipped = window.len() - speeds.len();
        if skipped > 0 {
            tracing::warn!(skipped, min_m, max_m, "samples without speed left out of average");
        }
        if speeds.is_empty() {
            return Err(TelemetryError::invalid(format!(
                "no speed samples between {:.1}m and {:.1}m",
                min_m, max_m
            )));
        }
        Ok(speeds.iter().sum::<f64>() / speeds.len() as f64)
    }
}

/// Who was quicker through a distance window, and by how much.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedComparison {
    pub faster: String,
    pub slower: String,
    /// Average speed difference in km/h, rounded to 2 decimals
    pub delta_kph: f64,
}

impl std::fmt::Display for SpeedComparison {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}km/h faster than {}", self.faster, self.delta_kph, self.slower)
    }
}

/// Compare two drivers' average speed over `[min_m, max_m]`.
///
/// A tie goes to `b`.
pub fn compare_average_speed(
    a: (&str, &SpeedProfile),
    b: (&str, &SpeedProfile),
    min_m: f64,
    max_m: f64,
) -> Result<SpeedComparison> {
    let avg_a = a.1.average_speed(min_m, max_m)?;
    let avg_b = b.1.average_speed(min_m, max_m)?;

    let (faster, slower, delta) = if avg_a > avg_b {
        (a.0, b.0, avg_a - avg_b)
    } else {
        (b.0, a.0, avg_b - avg_a)
    };

    Ok(SpeedComparison {
        faster: faster.to_string(),
        slower: slower.to_string(),
        delta_kph: (delta * 100.0).round() / 100.0,
    })
}
