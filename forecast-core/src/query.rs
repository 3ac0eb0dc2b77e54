//! One search from city name to rendered dashboard.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::{
    error::ForecastError,
    provider::ForecastProvider,
    render::{Dashboard, RequestToken},
    view::ViewOptions,
};

/// How a query that passed validation and fetched successfully ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOutcome {
    Rendered,
    /// A later query had already reached the dashboard.
    Superseded,
}

#[derive(Debug, Clone)]
pub struct ForecastService {
    provider: Arc<dyn ForecastProvider>,
    dashboard: Arc<Dashboard>,
    options: ViewOptions,
}

impl ForecastService {
    pub fn new(
        provider: Arc<dyn ForecastProvider>,
        dashboard: Arc<Dashboard>,
        options: ViewOptions,
    ) -> Self {
        Self {
            provider,
            dashboard,
            options,
        }
    }

    /// Validates `city`, fetches its forecast and hands the view to the dashboard.
    ///
    /// Failures are logged here and returned; the dashboard is left untouched
    /// unless the whole response could be turned into a view.
    pub async fn query(&self, city: &str) -> Result<QueryOutcome, ForecastError> {
        let token = self.admit(city)?;
        self.run(city, token).await
    }

    /// Runs [`query`](Self::query) on its own task without waiting for it.
    ///
    /// Validation and the request token happen before the task starts, so
    /// tokens follow submission order.
    pub fn spawn_query(
        &self,
        city: String,
    ) -> Result<JoinHandle<Result<QueryOutcome, ForecastError>>, ForecastError> {
        let token = self.admit(&city)?;
        let service = self.clone();
        Ok(tokio::spawn(async move { service.run(&city, token).await }))
    }

    /// Rejects blank input, otherwise issues the token for this query.
    fn admit(&self, city: &str) -> Result<RequestToken, ForecastError> {
        // blank only decides rejection; the name is sent as typed
        if city.trim().is_empty() {
            let err = ForecastError::Validation("City name cannot be empty.".to_string());
            warn!("Error: {err}");
            return Err(err);
        }
        Ok(self.dashboard.issue())
    }

    async fn run(&self, city: &str, token: RequestToken) -> Result<QueryOutcome, ForecastError> {
        let span = info_span!("query", %city, %token);
        self.fetch_and_present(city, token).instrument(span).await
    }

    async fn fetch_and_present(
        &self,
        city: &str,
        token: RequestToken,
    ) -> Result<QueryOutcome, ForecastError> {
        debug!("Fetching");
        let response = self.provider.fetch_forecast(city).await.inspect_err(|e| {
            error!(error = %e, "Error fetching the forecast data");
        })?;

        let view = self.options.build(&response).inspect_err(|e| {
            error!(error = %e, "Forecast response could not be displayed");
        })?;

        let applied = self.dashboard.present(token, &view).inspect_err(|e| {
            error!(error = %e, "Render failed");
        })?;

        if applied {
            info!(location = %view.location, days = view.days.len(), "Rendered");
            Ok(QueryOutcome::Rendered)
        } else {
            Ok(QueryOutcome::Superseded)
        }
    }
}
