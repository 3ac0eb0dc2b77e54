//! Immutable view model computed from a forecast response.
//!
//! Everything a display surface shows is formatted here, so sinks only copy
//! strings into their slots.

use std::{fmt, str::FromStr};

use chrono::{DateTime, FixedOffset, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::ForecastError,
    icons::icon_for,
    model::{DailySummary, ForecastResponse},
    summary::{SelectionRule, round_half_up, summarize_by_day},
};

/// `06:13 AM`
pub const CLOCK_FORMAT: &str = "%I:%M %p";

/// Which clock decides the calendar day and sunrise/sunset times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeBasis {
    /// The machine's local time zone.
    #[default]
    Local,
    /// The searched city's UTC offset as reported by the provider.
    City,
}

impl TimeBasis {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeBasis::Local => "local",
            TimeBasis::City => "city",
        }
    }
}

impl fmt::Display for TimeBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeBasis {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "local" => Ok(TimeBasis::Local),
            "city" => Ok(TimeBasis::City),
            _ => Err(anyhow::anyhow!(
                "Unknown time basis '{value}'. Supported values: local, city."
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCard {
    pub date: String,
    pub temperature: String,
    pub condition: String,
    pub icon: String,
}

impl From<&DailySummary> for DayCard {
    fn from(day: &DailySummary) -> Self {
        Self {
            date: day.date_label.clone(),
            temperature: format!("{}°C", day.temperature),
            condition: day.condition.clone(),
            icon: icon_for(&day.condition).to_string(),
        }
    }
}

/// Contents of every display slot for one successful query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewModel {
    pub location: String,
    pub temperature: String,
    pub description: String,
    pub max_temp: String,
    pub min_temp: String,
    pub humidity: String,
    pub wind: String,
    pub pressure: String,
    pub sunrise: String,
    pub sunset: String,
    pub icon: String,
    pub days: Vec<DayCard>,
}

/// Builds the view in `tz`. Current conditions always come from the first sample.
pub fn build_view<Tz>(
    response: &ForecastResponse,
    tz: &Tz,
    rule: SelectionRule,
) -> Result<ViewModel, ForecastError>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let current = response
        .current()
        .ok_or_else(|| ForecastError::Parse("forecast response contained no samples".into()))?;
    let location = &response.location;

    let days = summarize_by_day(&response.samples, tz, rule);

    Ok(ViewModel {
        location: format!("{}, {}", location.name, location.country),
        temperature: format!("{}°C", round_half_up(current.temperature)),
        description: current.condition.clone(),
        max_temp: format!("High: {}°C", round_half_up(current.temp_max)),
        min_temp: format!("Low: {}°C", round_half_up(current.temp_min)),
        humidity: format!("{}%", current.humidity),
        wind: format!("{} m/s", current.wind_speed),
        pressure: format!("{} hPa", current.pressure),
        sunrise: clock(location.sunrise, tz),
        sunset: clock(location.sunset, tz),
        icon: icon_for(&current.condition).to_string(),
        days: days.iter().map(DayCard::from).collect(),
    })
}

fn clock<Tz>(at: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    at.with_timezone(tz).format(CLOCK_FORMAT).to_string()
}

/// The knobs that shape a view, resolved once per service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ViewOptions {
    pub time_basis: TimeBasis,
    pub selection: SelectionRule,
}

impl ViewOptions {
    pub fn build(&self, response: &ForecastResponse) -> Result<ViewModel, ForecastError> {
        match self.time_basis {
            TimeBasis::Local => build_view(response, &Local, self.selection),
            TimeBasis::City => match response.location.utc_offset_secs.and_then(FixedOffset::east_opt) {
                Some(offset) => build_view(response, &offset, self.selection),
                None => {
                    debug!(city = %response.location.name, "No UTC offset in response, using local time");
                    build_view(response, &Local, self.selection)
                }
            },
        }
    }
}
