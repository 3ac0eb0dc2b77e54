use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One point of the provider's forecast time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    pub time: DateTime<Utc>,
    pub temperature: f64,
    pub temp_max: f64,
    pub temp_min: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub pressure: f64,
    /// Categorical label such as "Clear" or "Rain"; may be outside the known set.
    pub condition: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationInfo {
    pub name: String,
    pub country: String,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
    /// Shift from UTC in seconds, when the provider reports one.
    pub utc_offset_secs: Option<i32>,
}

/// Parsed forecast for one city. `samples` is never empty and ascends by time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub location: LocationInfo,
    pub samples: Vec<ForecastSample>,
}

impl ForecastResponse {
    /// The first sample stands for "now", whatever hour it falls on.
    pub fn current(&self) -> Option<&ForecastSample> {
        self.samples.first()
    }
}

/// The representative of one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date_label: String,
    pub temperature: i64,
    pub condition: String,
    pub time: DateTime<Utc>,
}
