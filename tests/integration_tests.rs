/// Integration tests for lap telemetry extrema and action segmentation
///
/// Run with: cargo test --test integration_tests -- --nocapture

use lap_telemetry::{
    annotate_extrema, compare_laps, dedup_adjacent, find_raw_extrema, label_action, label_lap,
    segment, ActionState, ActionThresholds, AnalysisConfig, CarSample, Extremum, LabeledSample,
    LapComparison, LapTelemetry, SessionLaps, SpeedSample, TelemetryError,
};
use proptest::prelude::*;

/// Speeds on a coarse 1 km/h grid so repeated values are common.
fn coarse_series() -> impl Strategy<Value = Vec<SpeedSample>> {
    prop::collection::vec(60u32..70, 1..300).prop_map(|speeds| {
        speeds
            .into_iter()
            .enumerate()
            .map(|(i, v)| SpeedSample::new(i as f64 * 4.0, v as f64))
            .collect()
    })
}

fn arb_action() -> impl Strategy<Value = ActionState> {
    prop_oneof![
        Just(ActionState::Braking),
        Just(ActionState::FullThrottle),
        Just(ActionState::Cornering),
    ]
}

/// Dense per-sample column, scanned offset by offset as the chart scripts did.
fn dedup_by_columns(len: usize, extrema: &[Extremum], offsets: &[usize]) -> Vec<Option<f64>> {
    let mut column = vec![None; len];
    for e in extrema {
        column[e.index] = Some(e.speed_kph);
    }
    for &k in offsets {
        for i in k..len {
            if column[i].is_some() && column[i] == column[i - k] {
                column[i - k] = None;
            }
        }
    }
    column
}

fn car(distance_m: f64, speed_kph: f64, brake: f64, throttle_pct: f64) -> CarSample {
    CarSample {
        distance_m,
        speed_kph: Some(speed_kph),
        throttle_pct: Some(throttle_pct),
        brake: Some(brake),
        n_gear: Some(5),
        rpm: Some(10500.0),
        drs: Some(0),
    }
}

/// A lap with a long straight, one heavy braking zone and a slow corner.
fn synthetic_lap(driver: &str, top_speed: f64) -> LapTelemetry {
    let samples = (0..=300)
        .map(|i| {
            let d = i as f64 * 5.0;
            match i {
                0..=99 => car(d, (120.0 + i as f64 * 2.0).min(top_speed), 0.0, 100.0),
                100..=129 => car(d, top_speed - (i - 100) as f64 * 6.0, 1.0, 0.0),
                130..=179 => car(d, top_speed - 180.0 + (i - 130) as f64 * 0.5, 0.0, 45.0),
                _ => {
                    let speed = (top_speed - 155.0 + (i - 180) as f64 * 2.0).min(top_speed);
                    car(d, speed, 0.0, 100.0)
                }
            }
        })
        .collect();
    LapTelemetry {
        driver: driver.to_string(),
        lap_time_s: 74.0 + (320.0 - top_speed) / 10.0,
        samples,
    }
}

#[test]
fn test_worked_extrema_example() {
    println!("\n=== Test: Worked Extrema Example ===");
    let speeds = [100.0, 105.0, 110.0, 105.0, 100.0, 95.0, 90.0, 95.0, 100.0];
    let series: Vec<SpeedSample> = speeds
        .iter()
        .enumerate()
        .map(|(i, &v)| SpeedSample::new(i as f64 * 10.0, v))
        .collect();

    let raw = find_raw_extrema(&series, 2).unwrap();
    assert!(raw.maxima.iter().any(|e| e.index == 2 && e.speed_kph == 110.0));
    assert!(raw.minima.iter().any(|e| e.speed_kph == 90.0 && speeds[e.index] == 90.0));
    println!("✓ Peak 110 at index 2, valley 90 found");
}

#[test]
fn test_worked_segment_example() {
    println!("\n=== Test: Worked Segment Example ===");
    use ActionState::*;
    let input: Vec<LabeledSample> = [
        (10.0, Braking),
        (20.0, Braking),
        (30.0, Braking),
        (40.0, FullThrottle),
        (50.0, FullThrottle),
        (60.0, Cornering),
    ]
    .iter()
    .map(|&(distance_m, action)| LabeledSample { distance_m, action })
    .collect();

    let segs = segment(&input).unwrap();
    let summary: Vec<_> = segs.iter().map(|s| (s.action, s.end_m, s.length_m)).collect();
    assert_eq!(
        summary,
        vec![(Braking, 30.0, 30.0), (FullThrottle, 50.0, 20.0), (Cornering, 60.0, 10.0)]
    );
    println!("✓ {} segments", segs.len());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_constant_speed_marks_everything(
        speed in 0.0f64..400.0,
        len in 1usize..120,
        window in 1usize..200,
    ) {
        let series: Vec<SpeedSample> =
            (0..len).map(|i| SpeedSample::new(i as f64, speed)).collect();
        let raw = find_raw_extrema(&series, window).unwrap();
        prop_assert_eq!(raw.minima.len(), len);
        prop_assert_eq!(raw.maxima.len(), len);
    }

    #[test]
    fn prop_dedup_only_removes(series in coarse_series(), window in 1usize..8) {
        let raw = find_raw_extrema(&series, window).unwrap();

        for extrema in [&raw.minima, &raw.maxima] {
            let out = dedup_adjacent(extrema, &[4, 3, 2, 1]).unwrap();
            prop_assert_eq!(out.len(), extrema.len());
            for (kept, original) in out.iter().zip(extrema.iter()) {
                if let Some(k) = kept {
                    prop_assert_eq!(k, original);
                }
            }

            // no two equal survivors within the largest offset
            let survivors: Vec<_> = out.iter().flatten().collect();
            for (i, a) in survivors.iter().enumerate() {
                for b in survivors[i + 1..].iter().take_while(|b| b.index - a.index <= 4) {
                    prop_assert_ne!(a.speed_kph, b.speed_kph);
                }
            }
        }
    }

    #[test]
    fn prop_dedup_matches_column_scan(series in coarse_series(), window in 1usize..8) {
        let offsets = [4, 3, 2, 1];
        let raw = find_raw_extrema(&series, window).unwrap();

        for extrema in [&raw.minima, &raw.maxima] {
            let mut dense = vec![None; series.len()];
            for e in dedup_adjacent(extrema, &offsets).unwrap().into_iter().flatten() {
                dense[e.index] = Some(e.speed_kph);
            }
            prop_assert_eq!(dense, dedup_by_columns(series.len(), extrema, &offsets));
        }
    }

    #[test]
    fn prop_segments_partition_lap(
        steps in prop::collection::vec((0u32..6, arb_action()), 1..400),
    ) {
        let mut distance = 0.0;
        let labeled: Vec<LabeledSample> = steps
            .into_iter()
            .map(|(step, action)| {
                distance += step as f64; // repeated distances allowed
                LabeledSample { distance_m: distance, action }
            })
            .collect();

        let segs = segment(&labeled).unwrap();
        let total: f64 = segs.iter().map(|s| s.length_m).sum();
        prop_assert_eq!(total, labeled.last().unwrap().distance_m);
        prop_assert_eq!(segs.iter().map(|s| s.samples).sum::<usize>(), labeled.len());
        for pair in segs.windows(2) {
            prop_assert_ne!(pair[0].action, pair[1].action);
            prop_assert!(pair[0].end_m <= pair[1].start_m);
            prop_assert_eq!(pair[1].id, pair[0].id + 1);
        }
    }

    #[test]
    fn prop_label_action_is_total(
        brake in prop_oneof![Just(0.0f64), 0.0f64..5.0],
        throttle in -5.0f64..110.0,
    ) {
        let t = ActionThresholds::default();
        let action = label_action(&car(0.0, 100.0, brake, throttle), &t).unwrap();
        let expected = if brake > 0.0 {
            ActionState::Braking
        } else if throttle > 98.0 {
            ActionState::FullThrottle
        } else {
            ActionState::Cornering
        };
        prop_assert_eq!(action, expected);
    }
}

#[test]
fn test_label_action_threshold_edges() {
    println!("\n=== Test: Label Action Threshold Edges ===");
    let t = ActionThresholds::default();
    let cases = [
        (0.0, 98.0, ActionState::Cornering),
        (0.0, 98.1, ActionState::FullThrottle),
        (0.0, 104.0, ActionState::FullThrottle),
        (1.0, 100.0, ActionState::Braking),
        (0.0, 0.0, ActionState::Cornering),
    ];
    for (brake, throttle, expected) in cases {
        assert_eq!(label_action(&car(0.0, 100.0, brake, throttle), &t).unwrap(), expected);
    }
    let err = label_action(&car(0.0, 100.0, 0.0, f64::INFINITY), &t).unwrap_err();
    assert!(matches!(err, TelemetryError::InvalidInput(_)));
    println!("✓ Thresholds and non-finite inputs handled");
}

#[test]
fn test_missing_throttle_propagates() {
    println!("\n=== Test: Missing Throttle ===");
    let mut lap = synthetic_lap("HAM", 300.0);
    lap.samples[17].throttle_pct = None;
    let err = label_lap(&lap.samples, &ActionThresholds::default()).unwrap_err();
    assert_eq!(err, TelemetryError::MissingValue { index: 17, field: "throttle" });
    println!("✓ {}", err);
}

#[test]
fn test_compare_laps_report() {
    println!("\n=== Test: Lap Comparison Report ===");
    let laps = SessionLaps {
        event: "Monaco Grand Prix".to_string(),
        year: 2021,
        session: "FP2".to_string(),
        reference: synthetic_lap("LEC", 290.0),
        comparison: synthetic_lap("HAM", 284.0),
        delta: None,
    };

    let report = compare_laps(&laps, &AnalysisConfig::default()).unwrap();
    assert_eq!(report.reference.driver, "LEC");
    assert_eq!(report.zoom_speed.faster, "LEC");
    assert!(report.zoom_speed.delta_kph > 0.0);
    assert!(report.title.contains("LEC=1.17.000"));

    for driver in [&report.reference, &report.comparison] {
        let actions: Vec<_> = driver.segments.iter().map(|s| s.action).collect();
        assert_eq!(
            actions,
            vec![
                ActionState::FullThrottle,
                ActionState::Braking,
                ActionState::Cornering,
                ActionState::FullThrottle
            ]
        );
        assert_eq!(driver.segments.last().unwrap().end_m, 1500.0);
        assert!(!driver.extrema.is_empty());
        assert!(driver.zoom_bars.iter().any(|b| b.color == "red"));
    }

    let json = serde_json::to_string_pretty(&report).expect("Should serialize report");
    assert!(json.contains("\"Full Throttle\""));
    let decoded: LapComparison = serde_json::from_str(&json).expect("Should deserialize report");
    assert_eq!(decoded.title, report.title);
    assert_eq!(decoded.reference.segments.len(), report.reference.segments.len());
    assert_eq!(decoded.comparison.zoom_bars.len(), report.comparison.zoom_bars.len());
    println!("✓ {} ({} bytes of JSON)", report.zoom_speed, json.len());
}

#[test]
fn test_annotate_extrema_gap_in_speed() {
    println!("\n=== Test: Interpolation Gap ===");
    let mut series: Vec<SpeedSample> = (0..30)
        .map(|i| SpeedSample::new(i as f64 * 5.0, 200.0 - (i as f64 - 15.0).abs() * 3.0))
        .collect();
    series[0] = SpeedSample::missing(0.0);

    let labels = annotate_extrema(&series, 3, &[4, 3, 2, 1]).unwrap();
    assert!(!labels[0].is_tagged());
    assert_eq!(labels[15].max, Some(200.0));
    println!("✓ Missing speed skipped, peak kept");
}

#[test]
fn test_bad_input_fails_fast() {
    println!("\n=== Test: Bad Input ===");
    let backwards = vec![SpeedSample::new(10.0, 100.0), SpeedSample::new(5.0, 100.0)];
    assert!(matches!(find_raw_extrema(&backwards, 1), Err(TelemetryError::InvalidInput(_))));
    assert!(matches!(segment(&[]), Err(TelemetryError::InvalidInput(_))));

    let mut cfg = AnalysisConfig::default();
    cfg.extrema_window = 0;
    let laps = SessionLaps {
        event: "Imola".to_string(),
        year: 2022,
        session: "Q".to_string(),
        reference: synthetic_lap("LEC", 300.0),
        comparison: synthetic_lap("VER", 305.0),
        delta: None,
    };
    assert!(compare_laps(&laps, &cfg).is_err());
    println!("✓ Invalid input rejected");
}
