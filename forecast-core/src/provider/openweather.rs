use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::{
    error::ForecastError,
    model::{ForecastResponse, ForecastSample, LocationInfo},
};

use super::ForecastProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    /// `timeout` of `None` keeps reqwest's default behavior.
    pub fn with_settings(
        api_key: String,
        base_url: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, ForecastError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ForecastError::Transport)?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }
}

#[async_trait]
impl ForecastProvider for OpenWeatherProvider {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn fetch_forecast(&self, city: &str) -> Result<ForecastResponse, ForecastError> {
        let url = format!("{}/forecast", self.base_url);
        debug!(url = %url, "Fetching 5-day forecast");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(ForecastError::Transport)?;

        let status = res.status();
        let body = res.text().await.map_err(ForecastError::Transport)?;

        if !status.is_success() {
            return Err(ForecastError::upstream(status, &body));
        }

        let parsed: OwForecastResponse = serde_json::from_str(&body)?;
        let response = parsed.into_domain()?;

        debug!(
            city = %response.location.name,
            samples = response.samples.len(),
            "Parsed forecast"
        );
        Ok(response)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    temp_max: f64,
    temp_min: f64,
    humidity: u8,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
    country: String,
    sunrise: i64,
    sunset: i64,
    #[serde(default)]
    timezone: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

impl OwForecastResponse {
    fn into_domain(self) -> Result<ForecastResponse, ForecastError> {
        if self.list.is_empty() {
            return Err(ForecastError::Parse(
                "OpenWeather forecast response contained no data".to_string(),
            ));
        }

        let location = LocationInfo {
            name: self.city.name,
            country: self.city.country,
            sunrise: unix_to_utc(self.city.sunrise)?,
            sunset: unix_to_utc(self.city.sunset)?,
            utc_offset_secs: self.city.timezone,
        };

        let mut samples = self
            .list
            .into_iter()
            .map(OwForecastEntry::into_sample)
            .collect::<Result<Vec<_>, _>>()?;
        // the provider sends ascending order; keep it guaranteed
        samples.sort_by_key(|s| s.time);

        Ok(ForecastResponse { location, samples })
    }
}

impl OwForecastEntry {
    fn into_sample(self) -> Result<ForecastSample, ForecastError> {
        let condition = self.weather.into_iter().next().map(|w| w.main).ok_or_else(|| {
            ForecastError::Parse(format!("forecast entry {} has no weather condition", self.dt))
        })?;

        Ok(ForecastSample {
            time: unix_to_utc(self.dt)?,
            temperature: self.main.temp,
            temp_max: self.main.temp_max,
            temp_min: self.main.temp_min,
            humidity: self.main.humidity,
            wind_speed: self.wind.speed,
            pressure: self.main.pressure,
            condition,
        })
    }
}

fn unix_to_utc(ts: i64) -> Result<DateTime<Utc>, ForecastError> {
    DateTime::from_timestamp(ts, 0)
        .ok_or_else(|| ForecastError::Parse(format!("timestamp {ts} is out of range")))
}
