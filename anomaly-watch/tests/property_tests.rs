//! Property-based tests for the detection pipeline.
//!
//! Each property builds CSV text from generated `(day offset, value)` pairs,
//! runs it through the parser and the detector, and checks an invariant that
//! must hold for every input:
//!
//! - timestamps come back ascending and distinct inputs keep their order
//! - raising the threshold never flags more points
//! - the anomaly type always agrees with the z-score and the threshold
//! - rows with unusable values never reach the output
//! - constant series score zero everywhere
//! - a cached session matches one-shot detection

use anomaly_watch::analyzers::{detect_anomalies, AnomalyType, DataPoint};
use anomaly_watch::core::AnalysisSession;
use anomaly_watch::sources::parse_csv;
use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

// ============================================================================
// Test Data Generation Utilities
// ============================================================================

fn day(offset: i64) -> String {
    let base = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
    (base + Duration::days(offset)).format("%Y-%m-%d").to_string()
}

fn csv_text(rows: &[(i64, String)]) -> String {
    let mut text = String::from("date,value\n");
    for (offset, value) in rows {
        text.push_str(&format!("{},{value}\n", day(*offset)));
    }
    text
}

fn detect(rows: &[(i64, String)], threshold: f64) -> Vec<DataPoint> {
    let table = parse_csv(&csv_text(rows));
    detect_anomalies(table.rows(), "date", "value", threshold)
}

fn numeric_rows(offsets: &[i64], values: &[f64]) -> Vec<(i64, String)> {
    offsets
        .iter()
        .zip(values)
        .map(|(o, v)| (*o, v.to_string()))
        .collect()
}

fn value_strategy() -> impl Strategy<Value = f64> {
    -1.0e6..1.0e6f64
}

fn junk_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("n/a".to_string()),
        Just("abc12".to_string()),
        Just("NaN".to_string()),
        "[a-z]{1,8}",
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_sorted_distinct_timestamps_keep_order(
        offsets in prop::collection::btree_set(0i64..5_000, 1..60),
        seed_values in prop::collection::vec(value_strategy(), 60),
    ) {
        let offsets: Vec<i64> = offsets.into_iter().collect();
        let rows = numeric_rows(&offsets, &seed_values);
        let points = detect(&rows, 2.5);

        prop_assert_eq!(points.len(), rows.len());
        for (point, (_, raw)) in points.iter().zip(&rows) {
            prop_assert_eq!(point.value().to_string(), raw.clone());
        }
    }

    #[test]
    fn prop_output_is_ascending(
        rows in prop::collection::vec((0i64..400, value_strategy()), 0..80),
    ) {
        let rows: Vec<(i64, String)> = rows.into_iter().map(|(o, v)| (o, v.to_string())).collect();
        let points = detect(&rows, 2.0);

        prop_assert_eq!(points.len(), rows.len());
        for pair in points.windows(2) {
            prop_assert!(pair[0].timestamp() <= pair[1].timestamp());
        }
    }

    #[test]
    fn prop_anomaly_count_non_increasing_in_threshold(
        values in prop::collection::vec(value_strategy(), 1..80),
        low in 0.0..4.0f64,
        delta in 0.0..2.0f64,
    ) {
        let offsets: Vec<i64> = (0..values.len() as i64).collect();
        let rows = numeric_rows(&offsets, &values);

        let count = |threshold: f64| detect(&rows, threshold).iter().filter(|p| p.is_anomaly()).count();
        prop_assert!(count(low) >= count(low + delta));
    }

    #[test]
    fn prop_classification_matches_z_score(
        values in prop::collection::vec(value_strategy(), 1..80),
        threshold in 0.1..4.0f64,
    ) {
        let offsets: Vec<i64> = (0..values.len() as i64).collect();
        let points = detect(&numeric_rows(&offsets, &values), threshold);

        for point in &points {
            let z = point.z_score();
            prop_assert!(z.is_finite());
            prop_assert_eq!(point.is_anomaly(), z.abs() > threshold);
            let expected = if z > threshold {
                AnomalyType::Spike
            } else if z < -threshold {
                AnomalyType::Dip
            } else {
                AnomalyType::None
            };
            prop_assert_eq!(point.anomaly_type(), expected);
        }
    }

    #[test]
    fn prop_unusable_values_are_dropped(
        rows in prop::collection::vec(
            (0i64..1_000, prop_oneof![
                value_strategy().prop_map(|v| (true, v.to_string())),
                junk_strategy().prop_map(|j| (false, j)),
            ]),
            0..60,
        ),
    ) {
        let valid = rows.iter().filter(|(_, (ok, _))| *ok).count();
        let rows: Vec<(i64, String)> = rows.into_iter().map(|(o, (_, raw))| (o, raw)).collect();
        let points = detect(&rows, 2.5);
        prop_assert_eq!(points.len(), valid);
    }

    #[test]
    fn prop_all_bad_rows_give_empty_output(
        junk in prop::collection::vec(junk_strategy(), 1..30),
    ) {
        let rows: Vec<(i64, String)> = junk.into_iter().enumerate().map(|(i, j)| (i as i64, j)).collect();
        prop_assert!(detect(&rows, 2.5).is_empty());
    }

    #[test]
    fn prop_constant_series_has_no_anomalies(
        value in value_strategy(),
        len in 1usize..50,
        threshold in 0.0..4.0f64,
    ) {
        let offsets: Vec<i64> = (0..len as i64).collect();
        let rows = numeric_rows(&offsets, &vec![value; len]);
        let points = detect(&rows, threshold);

        prop_assert_eq!(points.len(), len);
        for point in &points {
            prop_assert_eq!(point.z_score(), 0.0);
            prop_assert!(!point.is_anomaly());
        }
    }

    #[test]
    fn prop_session_matches_one_shot_detection(
        rows in prop::collection::vec((0i64..200, value_strategy()), 0..60),
        thresholds in prop::collection::vec(0.5..3.5f64, 1..5),
    ) {
        let rows: Vec<(i64, String)> = rows.into_iter().map(|(o, v)| (o, v.to_string())).collect();
        let table = parse_csv(&csv_text(&rows));
        let mut session = AnalysisSession::new(table.clone());
        session.select_columns("date", "value").unwrap();

        for threshold in thresholds {
            prop_assert_eq!(
                session.detect(threshold).unwrap(),
                detect_anomalies(table.rows(), "date", "value", threshold)
            );
        }
    }
}

// ============================================================================
// Edge Cases
// ============================================================================

#[test]
fn test_four_fives() {
    let rows: Vec<(i64, String)> = (0..4).map(|i| (i, "5".to_string())).collect();
    let points = detect(&rows, 2.5);
    assert_eq!(points.len(), 4);
    assert!(points.iter().all(|p| p.z_score() == 0.0 && !p.is_anomaly()));
}

#[test]
fn test_single_outlier_z_bound() {
    // one outlier among n points can reach at most sqrt(n - 1)
    for n in [4usize, 7, 10, 26] {
        let mut rows: Vec<(i64, String)> = (0..n as i64 - 1).map(|i| (i, "0".to_string())).collect();
        rows.push((n as i64, "1".to_string()));
        let points = detect(&rows, 0.0);
        let max_z = points.iter().map(|p| p.z_score()).fold(f64::MIN, f64::max);
        assert!((max_z - ((n - 1) as f64).sqrt()).abs() < 1e-9);
    }
}
