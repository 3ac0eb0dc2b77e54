//! Reduction of the flat 3-hourly series into one entry per calendar day.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

use crate::model::{DailySummary, ForecastSample};

/// `Wed, Nov 15`
pub const DATE_LABEL_FORMAT: &str = "%a, %b %-d";

const NOON_SECS: i64 = 12 * 60 * 60;

/// How the representative sample of a day is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionRule {
    /// Only a sample whose local hour is exactly 12; days without one are skipped.
    #[default]
    ExactNoon,
    /// The sample closest to 12:00 local time within each day.
    NearestNoon,
}

impl SelectionRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionRule::ExactNoon => "exact-noon",
            SelectionRule::NearestNoon => "nearest-noon",
        }
    }
}

impl fmt::Display for SelectionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectionRule {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "exact-noon" => Ok(SelectionRule::ExactNoon),
            "nearest-noon" => Ok(SelectionRule::NearestNoon),
            _ => Err(anyhow::anyhow!(
                "Unknown selection rule '{value}'. Supported rules: exact-noon, nearest-noon."
            )),
        }
    }
}

/// Rounds like JavaScript's `Math.round`: halves go toward positive infinity.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Picks at most one sample per local calendar day of `tz`, in input order.
///
/// A candidate is skipped when its date label equals the label of the last
/// selected entry, so no two entries share a label. Days with no candidate
/// produce no entry; an input without candidates yields an empty vector.
pub fn summarize_by_day<Tz>(
    samples: &[ForecastSample],
    tz: &Tz,
    rule: SelectionRule,
) -> Vec<DailySummary>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let candidates = match rule {
        SelectionRule::ExactNoon => exact_noon_candidates(samples, tz),
        SelectionRule::NearestNoon => nearest_noon_candidates(samples, tz),
    };

    let mut last_label: Option<String> = None;
    let mut days = Vec::with_capacity(candidates.len());

    for (sample, local) in candidates {
        let label = local.format(DATE_LABEL_FORMAT).to_string();
        if last_label.as_deref() == Some(label.as_str()) {
            continue;
        }

        days.push(DailySummary {
            date_label: label.clone(),
            temperature: round_half_up(sample.temperature),
            condition: sample.condition.clone(),
            time: sample.time,
        });
        last_label = Some(label);
    }

    days
}

fn exact_noon_candidates<'a, Tz: TimeZone>(
    samples: &'a [ForecastSample],
    tz: &Tz,
) -> Vec<(&'a ForecastSample, DateTime<Tz>)> {
    samples
        .iter()
        .map(|s| (s, s.time.with_timezone(tz)))
        .filter(|(_, local)| local.hour() == 12)
        .collect()
}

fn nearest_noon_candidates<'a, Tz: TimeZone>(
    samples: &'a [ForecastSample],
    tz: &Tz,
) -> Vec<(&'a ForecastSample, DateTime<Tz>)> {
    let mut picked: Vec<(&ForecastSample, DateTime<Tz>)> = Vec::new();
    let mut best: Option<(NaiveDate, i64, &ForecastSample, DateTime<Tz>)> = None;

    for sample in samples {
        let local = sample.time.with_timezone(tz);
        let date = local.date_naive();
        let distance = (i64::from(local.num_seconds_from_midnight()) - NOON_SECS).abs();

        match best.take() {
            Some((best_date, best_distance, best_sample, best_local)) if best_date == date => {
                // strict: on a tie the earlier sample stays
                best = if distance < best_distance {
                    Some((date, distance, sample, local))
                } else {
                    Some((best_date, best_distance, best_sample, best_local))
                };
            }
            previous => {
                if let Some((_, _, s, l)) = previous {
                    picked.push((s, l));
                }
                best = Some((date, distance, sample, local));
            }
        }
    }

    if let Some((_, _, s, l)) = best {
        picked.push((s, l));
    }

    picked
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};
    use std::collections::HashSet;

    const THREE_HOURS: i64 = 3 * 60 * 60;
    // 2023-11-15T00:00:00Z, a Wednesday
    const WED_MIDNIGHT: i64 = 1_700_006_400;

    fn sample(ts: i64, temperature: f64, condition: &str) -> ForecastSample {
        ForecastSample {
            time: DateTime::from_timestamp(ts, 0).expect("valid timestamp"),
            temperature,
            temp_max: temperature + 1.0,
            temp_min: temperature - 1.0,
            humidity: 60,
            wind_speed: 3.2,
            pressure: 1012.0,
            condition: condition.to_string(),
        }
    }

    /// Three days on the 3-hour grid with distinct noon values.
    fn three_days() -> Vec<ForecastSample> {
        (0..24)
            .map(|i| {
                let ts = WED_MIDNIGHT + i * THREE_HOURS;
                match i {
                    4 => sample(ts, 22.0, "Clear"),
                    12 => sample(ts, 25.4, "Rain"),
                    20 => sample(ts, 18.6, "Clouds"),
                    _ => sample(ts, 10.0 + i as f64, "Mist"),
                }
            })
            .collect()
    }

    #[test]
    fn picks_noon_sample_per_day() {
        let days = summarize_by_day(&three_days(), &Utc, SelectionRule::ExactNoon);

        let got: Vec<_> = days
            .iter()
            .map(|d| (d.date_label.as_str(), d.temperature, d.condition.as_str()))
            .collect();
        assert_eq!(
            got,
            vec![
                ("Wed, Nov 15", 22, "Clear"),
                ("Thu, Nov 16", 25, "Rain"),
                ("Fri, Nov 17", 19, "Clouds"),
            ]
        );
    }

    #[test]
    fn selection_is_deterministic() {
        let samples = three_days();
        let first = summarize_by_day(&samples, &Utc, SelectionRule::ExactNoon);
        let second = summarize_by_day(&samples, &Utc, SelectionRule::ExactNoon);
        assert_eq!(first, second);

        let first = summarize_by_day(&samples, &Utc, SelectionRule::NearestNoon);
        let second = summarize_by_day(&samples, &Utc, SelectionRule::NearestNoon);
        assert_eq!(first, second);
    }

    #[test]
    fn every_entry_is_a_noon_sample_and_labels_are_unique() {
        // hourly grid: several samples share the same day, one hits 12:xx
        let samples: Vec<_> = (0..72)
            .map(|i| sample(WED_MIDNIGHT + i * 3600, i as f64, "Clear"))
            .collect();

        let days = summarize_by_day(&samples, &Utc, SelectionRule::ExactNoon);

        assert_eq!(days.len(), 3);
        for day in &days {
            assert_eq!(day.time.hour(), 12);
        }
        let labels: HashSet<_> = days.iter().map(|d| d.date_label.as_str()).collect();
        assert_eq!(labels.len(), days.len());
        assert!(days.windows(2).all(|w| w[0].time < w[1].time));
    }

    #[test]
    fn duplicate_noon_samples_keep_the_first() {
        let noon = WED_MIDNIGHT + 12 * 3600;
        let samples = vec![sample(noon, 20.0, "Clear"), sample(noon + 1800, 30.0, "Rain")];

        let days = summarize_by_day(&samples, &Utc, SelectionRule::ExactNoon);

        assert_eq!(days.len(), 1);
        assert_eq!(days[0].temperature, 20);
        assert_eq!(days[0].condition, "Clear");
    }

    #[test]
    fn offset_grid_yields_nothing_under_exact_noon() {
        // 01:00, 04:00, ... never lands on hour 12
        let samples: Vec<_> = (0..16)
            .map(|i| sample(WED_MIDNIGHT + 3600 + i * THREE_HOURS, 15.0, "Clouds"))
            .collect();

        assert!(summarize_by_day(&samples, &Utc, SelectionRule::ExactNoon).is_empty());
    }

    #[test]
    fn nearest_noon_covers_offset_grid() {
        let samples: Vec<_> = (0..16)
            .map(|i| sample(WED_MIDNIGHT + 3600 + i * THREE_HOURS, i as f64, "Clouds"))
            .collect();

        let days = summarize_by_day(&samples, &Utc, SelectionRule::NearestNoon);

        assert_eq!(days.len(), 2);
        // 13:00 is one hour off noon, 10:00 two hours
        assert_eq!(days[0].time.hour(), 13);
        assert_eq!(days[0].temperature, 4);
        assert_eq!(days[1].date_label, "Thu, Nov 16");
        assert_eq!(days[1].time.hour(), 13);
    }

    #[test]
    fn nearest_noon_prefers_earlier_sample_on_tie() {
        let samples = vec![
            sample(WED_MIDNIGHT + 11 * 3600, 11.0, "Clear"),
            sample(WED_MIDNIGHT + 13 * 3600, 13.0, "Rain"),
        ];

        let days = summarize_by_day(&samples, &Utc, SelectionRule::NearestNoon);

        assert_eq!(days.len(), 1);
        assert_eq!(days[0].temperature, 11);
    }

    #[test]
    fn local_day_follows_the_time_zone() {
        // 03:00Z is noon in UTC+9
        let tokyo = FixedOffset::east_opt(9 * 3600).expect("valid offset");
        let samples: Vec<_> = (0..8)
            .map(|i| sample(WED_MIDNIGHT + i * THREE_HOURS, i as f64, "Clear"))
            .collect();

        let days = summarize_by_day(&samples, &tokyo, SelectionRule::ExactNoon);

        assert_eq!(days.len(), 1);
        assert_eq!(days[0].date_label, "Wed, Nov 15");
        assert_eq!(days[0].temperature, 1);
    }

    #[test]
    fn empty_input_gives_empty_summary() {
        assert!(summarize_by_day(&[], &Utc, SelectionRule::ExactNoon).is_empty());
        assert!(summarize_by_day(&[], &Utc, SelectionRule::NearestNoon).is_empty());
    }

    #[test]
    fn rounding_matches_math_round() {
        assert_eq!(round_half_up(22.5), 23);
        assert_eq!(round_half_up(22.49), 22);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(-2.6), -3);
        assert_eq!(round_half_up(0.0), 0);
    }

    #[test]
    fn selection_rule_parses() {
        assert_eq!("exact-noon".parse::<SelectionRule>().unwrap(), SelectionRule::ExactNoon);
        assert_eq!("Nearest-Noon".parse::<SelectionRule>().unwrap(), SelectionRule::NearestNoon);
        let err = "midnight".parse::<SelectionRule>().unwrap_err();
        assert!(err.to_string().contains("Unknown selection rule"));
    }
}
