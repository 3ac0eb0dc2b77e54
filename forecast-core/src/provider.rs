use async_trait::async_trait;
use std::{fmt::Debug, time::Duration};

use crate::{Config, error::ForecastError, model::ForecastResponse, provider::openweather::OpenWeatherProvider};

pub mod openweather;

/// Source of multi-day forecasts for a city name.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    /// `city` is expected to be non-empty; callers validate it.
    async fn fetch_forecast(&self, city: &str) -> Result<ForecastResponse, ForecastError>;
}

/// Construct the OpenWeatherMap provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn ForecastProvider>> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No OpenWeatherMap API key configured.\n\
             Hint: run `forecast configure` or set OPENWEATHER_API_KEY."
        )
    })?;

    let timeout = config.timeout_secs.map(Duration::from_secs);
    let provider = OpenWeatherProvider::with_settings(api_key.to_owned(), &config.base_url, timeout)
        .map_err(|e| anyhow::anyhow!("Failed to create OpenWeatherMap client: {e}"))?;

    Ok(Box::new(provider))
}
