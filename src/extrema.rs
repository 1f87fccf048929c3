//! Local speed extrema over a lap, with repeated values collapsed.
//!
//! Telemetry speed is quantised, so a single braking point or top-speed peak
//! often shows up as the same value on several neighbouring samples. Raw
//! extrema are found first, then [`dedup_adjacent`] keeps the last sample of
//! each such repeat.

use std::collections::HashMap;

use crate::error::{check_distances, Result, TelemetryError};
use crate::types::{Extremum, ExtremaLabel, ExtremumKind, RawExtrema, SpeedSample};

/// Find raw local minima and maxima.
///
/// A sample is a maximum when its speed is `>=` every other speed within
/// `window` samples on either side, clamped to the series bounds (minimum:
/// `<=`). Missing speeds are never extremal and disqualify any sample whose
/// window contains them.
///
/// # Errors
/// `InvalidInput` for an empty series, decreasing distances or `window < 1`.
pub fn find_raw_extrema(series: &[SpeedSample], window: usize) -> Result<RawExtrema> {
    if window < 1 {
        return Err(TelemetryError::invalid("extrema window must be >= 1"));
    }
    check_distances(series.iter().map(|s| s.x_m))?;

    let last = series.len() - 1;
    let mut out = RawExtrema::default();

    for (i, sample) in series.iter().enumerate() {
        let Some(v) = sample.speed() else { continue };
        let lo = i.saturating_sub(window);
        let hi = i.saturating_add(window).min(last);

        let mut is_min = true;
        let mut is_max = true;
        for (j, other) in series[lo..=hi].iter().enumerate() {
            if lo + j == i {
                continue;
            }
            match other.speed() {
                Some(u) => {
                    is_min &= v <= u;
                    is_max &= v >= u;
                }
                None => {
                    is_min = false;
                    is_max = false;
                }
            }
            if !is_min && !is_max {
                break;
            }
        }

        let e = Extremum { index: i, speed_kph: v };
        if is_min {
            out.minima.push(e);
        }
        if is_max {
            out.maxima.push(e);
        }
    }

    tracing::debug!(
        samples = series.len(),
        window,
        minima = out.minima.len(),
        maxima = out.maxima.len(),
        "raw extrema found"
    );
    Ok(out)
}

/// Collapse runs of exactly equal extremum values sitting close together.
///
/// One pass runs per entry of `offsets`, in the given order (normally
/// `[4, 3, 2, 1]`). A pass walks the extrema left to right and clears the
/// entry `offset` samples before the current one whenever both are still
/// present and carry the same speed, so the last index of a repeat survives.
///
/// Passes are independent and greedy: on long flat runs the result can keep
/// more than one member of the run. This matches the established chart output
/// and is left as is.
///
/// The returned vector is parallel to `extrema`, with collapsed entries `None`.
///
/// # Errors
/// `InvalidInput` if indices are not strictly ascending or an offset is zero.
pub fn dedup_adjacent(extrema: &[Extremum], offsets: &[usize]) -> Result<Vec<Option<Extremum>>> {
    if offsets.contains(&0) {
        return Err(TelemetryError::invalid("dedup offsets must be >= 1"));
    }
    if let Some(w) = extrema.windows(2).find(|w| w[1].index <= w[0].index) {
        return Err(TelemetryError::invalid(format!(
            "extremum indices not ascending ({} then {})",
            w[0].index, w[1].index
        )));
    }

    let position: HashMap<usize, usize> = extrema
        .iter()
        .enumerate()
        .map(|(pos, e)| (e.index, pos))
        .collect();

    let kept = offsets.iter().fold(
        extrema.iter().copied().map(Some).collect::<Vec<_>>(),
        |kept, &offset| collapse_pass(kept, &position, offset),
    );

    tracing::debug!(
        before = extrema.len(),
        after = kept.iter().flatten().count(),
        "extrema deduplicated"
    );
    Ok(kept)
}

fn collapse_pass(
    mut kept: Vec<Option<Extremum>>,
    position: &HashMap<usize, usize>,
    offset: usize,
) -> Vec<Option<Extremum>> {
    for pos in 0..kept.len() {
        let Some(current) = kept[pos] else { continue };
        let Some(earlier) = current.index.checked_sub(offset) else { continue };
        let Some(&earlier_pos) = position.get(&earlier) else { continue };
        if matches!(kept[earlier_pos], Some(e) if e.speed_kph == current.speed_kph) {
            kept[earlier_pos] = None;
        }
    }
    kept
}

/// Raw extrema plus dedup for both kinds, as one label per sample.
pub fn annotate_extrema(
    series: &[SpeedSample],
    window: usize,
    offsets: &[usize],
) -> Result<Vec<ExtremaLabel>> {
    let raw = find_raw_extrema(series, window)?;
    let mut labels = vec![ExtremaLabel::default(); series.len()];

    for kind in [ExtremumKind::Minimum, ExtremumKind::Maximum] {
        for e in dedup_adjacent(raw.of_kind(kind), offsets)?.into_iter().flatten() {
            let label = &mut labels[e.index];
            match kind {
                ExtremumKind::Minimum => label.min = Some(e.speed_kph),
                ExtremumKind::Maximum => label.max = Some(e.speed_kph),
            }
        }
    }
    Ok(labels)
}
