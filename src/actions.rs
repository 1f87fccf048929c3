use crate::config::ActionThresholds;
use crate::error::{check_distances, Result, TelemetryError};
use crate::types::{ActionSegment, ActionState, CarSample, LabeledSample};

/// Classify what the driver is doing at one sample.
///
/// Brake wins over throttle: any brake input above `brake_on` is
/// [`ActionState::Braking`], otherwise throttle above `full_throttle_pct` is
/// [`ActionState::FullThrottle`], and everything else is
/// [`ActionState::Cornering`].
///
/// An absent or NaN input yields `MissingValue` with index 0; [`label_lap`]
/// reports the real sample index. An infinite input or a negative brake
/// input is `InvalidInput`.
pub fn label_action(sample: &CarSample, thresholds: &ActionThresholds) -> Result<ActionState> {
    let brake = present(sample.brake, "brake")?;
    let throttle = present(sample.throttle_pct, "throttle")?;

    if brake < 0.0 {
        return Err(TelemetryError::invalid(format!(
            "negative brake input {} at {:.1}m",
            brake, sample.distance_m
        )));
    }

    let action = if brake > thresholds.brake_on {
        ActionState::Braking
    } else if throttle > thresholds.full_throttle_pct {
        ActionState::FullThrottle
    } else {
        ActionState::Cornering
    };
    Ok(action)
}

/// NaN is how the provider marks a gap, so it counts as missing.
fn present(value: Option<f64>, field: &'static str) -> Result<f64> {
    let v = value
        .filter(|v| !v.is_nan())
        .ok_or(TelemetryError::MissingValue { index: 0, field })?;
    if v.is_infinite() {
        return Err(TelemetryError::invalid(format!("{} input is {}", field, v)));
    }
    Ok(v)
}

/// Label every sample of a lap, keeping its distance.
pub fn label_lap(
    samples: &[CarSample],
    thresholds: &ActionThresholds,
) -> Result<Vec<LabeledSample>> {
    samples
        .iter()
        .enumerate()
        .map(|(i, s)| -> Result<LabeledSample> {
            let action = label_action(s, thresholds).map_err(|e| match e {
                TelemetryError::MissingValue { field, .. } => {
                    TelemetryError::MissingValue { index: i, field }
                }
                other => other,
            })?;
            Ok(LabeledSample {
                distance_m: s.distance_m,
                action,
            })
        })
        .collect()
}

/// Group consecutive equal labels into action segments.
///
/// A new segment id starts each time the label changes from the previous
/// sample, beginning at 1. Each segment ends at the largest distance in its
/// run; its length is measured from the previous segment's end, and the first
/// segment is measured from distance 0.
///
/// # Errors
/// `InvalidInput` for an empty sequence or decreasing distances.
pub fn segment(labeled: &[LabeledSample]) -> Result<Vec<ActionSegment>> {
    check_distances(labeled.iter().map(|s| s.distance_m))?;

    let mut segments = labeled
        .iter()
        .fold(Vec::<ActionSegment>::new(), |mut acc, s| {
            match acc.last_mut() {
                Some(open) if open.action == s.action => {
                    open.end_m = open.end_m.max(s.distance_m);
                    open.samples += 1;
                }
                _ => {
                    let id = acc.last().map_or(1, |prev| prev.id + 1);
                    acc.push(ActionSegment {
                        id,
                        action: s.action,
                        start_m: s.distance_m,
                        end_m: s.distance_m,
                        length_m: 0.0,
                        samples: 1,
                    });
                }
            }
            acc
        });

    let mut previous_end = 0.0;
    for seg in &mut segments {
        seg.length_m = seg.end_m - previous_end;
        previous_end = seg.end_m;
    }

    tracing::debug!(
        samples = labeled.len(),
        segments = segments.len(),
        "action segments built"
    );
    Ok(segments)
}

/// Segments whose bar (previous end to own end) overlaps `[min_m, max_m]`.
pub fn clip_segments(segments: &[ActionSegment], min_m: f64, max_m: f64) -> Vec<ActionSegment> {
    segments
        .iter()
        .filter(|s| s.end_m - s.length_m <= max_m && s.end_m >= min_m)
        .copied()
        .collect()
}
