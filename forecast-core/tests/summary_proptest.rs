//! Property-based tests for the daily summary reduction.
//!
//! Any ascending series in any fixed offset must reduce to unique labels,
//! noon-only entries under exact-noon, and strictly increasing times.

use std::collections::HashSet;

use chrono::{DateTime, FixedOffset, Timelike};
use forecast_core::{ForecastSample, SelectionRule, summarize_by_day};
use proptest::prelude::*;

const CONDITIONS: [&str; 6] = ["Clear", "Rain", "Clouds", "Snow", "Mist", "Haze"];

// 2023-11-15T00:00:00Z
const START: i64 = 1_700_006_400;

fn sample(ts: i64, temperature: f64, condition: &str) -> ForecastSample {
    ForecastSample {
        time: DateTime::from_timestamp(ts, 0).unwrap(),
        temperature,
        temp_max: temperature + 1.0,
        temp_min: temperature - 1.0,
        humidity: 50,
        wind_speed: 2.0,
        pressure: 1010.0,
        condition: condition.to_string(),
    }
}

/// Ascending timestamps on half-hour steps, so exact noon hits are common.
fn series() -> impl Strategy<Value = Vec<ForecastSample>> {
    (
        0i64..48,
        prop::collection::vec((1i64..=12, -30.0f64..40.0, 0..CONDITIONS.len()), 0..60),
    )
        .prop_map(|(start_step, steps)| {
            let mut ts = START + start_step * 1800;
            steps
                .into_iter()
                .map(|(gap, temperature, condition)| {
                    ts += gap * 1800;
                    sample(ts, temperature, CONDITIONS[condition])
                })
                .collect()
        })
}

fn offset() -> impl Strategy<Value = FixedOffset> {
    (-12i32..=14).prop_map(|hours| FixedOffset::east_opt(hours * 3600).unwrap())
}

fn rule() -> impl Strategy<Value = SelectionRule> {
    prop_oneof![Just(SelectionRule::ExactNoon), Just(SelectionRule::NearestNoon)]
}

proptest! {
    #[test]
    fn same_input_gives_same_summary(samples in series(), tz in offset(), rule in rule()) {
        let first = summarize_by_day(&samples, &tz, rule);
        let second = summarize_by_day(&samples, &tz, rule);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn labels_are_unique(samples in series(), tz in offset(), rule in rule()) {
        let days = summarize_by_day(&samples, &tz, rule);

        let labels: HashSet<_> = days.iter().map(|d| d.date_label.as_str()).collect();
        prop_assert_eq!(labels.len(), days.len());
    }

    #[test]
    fn exact_noon_entries_are_local_noon(samples in series(), tz in offset()) {
        for day in summarize_by_day(&samples, &tz, SelectionRule::ExactNoon) {
            prop_assert_eq!(day.time.with_timezone(&tz).hour(), 12);
        }
    }

    #[test]
    fn entries_keep_input_order(samples in series(), tz in offset(), rule in rule()) {
        let days = summarize_by_day(&samples, &tz, rule);

        prop_assert!(days.windows(2).all(|w| w[0].time < w[1].time));
        for day in &days {
            prop_assert!(samples.iter().any(|s| s.time == day.time));
        }
    }
}
