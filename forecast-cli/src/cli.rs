use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use forecast_core::{
    Config, Dashboard, ForecastError, ForecastProvider, ForecastService, HtmlSink, QueryOutcome, RenderSink,
    SelectionRule, SinkSet, TerminalSink, TimeBasis, ViewOptions, provider_from_config,
};
use inquire::{InquireError, Password, PasswordDisplayMode, Text};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "City weather forecast dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeatherMap API key and the default city.
    Configure,

    /// Show current conditions and the daily forecast for a city.
    Show {
        /// City name; defaults to the configured default city.
        city: Option<String>,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Search cities one after another; starts with the default city.
    Interactive {
        #[command(flatten)]
        view: ViewArgs,
    },
}

/// Display options that override the config file.
#[derive(Debug, Clone, Default, Args)]
pub struct ViewArgs {
    /// Also write the forecast page to this HTML file.
    #[arg(long, value_name = "PATH")]
    pub html: Option<PathBuf>,

    /// How each day's representative is picked: exact-noon or nearest-noon.
    #[arg(long)]
    pub selection: Option<SelectionRule>,

    /// Clock used for days and sunrise/sunset: local or city.
    #[arg(long)]
    pub time_basis: Option<TimeBasis>,
}

impl ViewArgs {
    fn options(&self, config: &Config) -> ViewOptions {
        let configured = config.view_options();
        ViewOptions {
            time_basis: self.time_basis.unwrap_or(configured.time_basis),
            selection: self.selection.unwrap_or(configured.selection),
        }
    }

    fn html_output<'a>(&'a self, config: &'a Config) -> Option<&'a PathBuf> {
        self.html.as_ref().or(config.html_output.as_ref())
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, view } => {
                let config = Config::load()?.with_env_overrides();
                let service = build_service(&config, &view)?;
                let city = city.unwrap_or_else(|| config.default_city.clone());

                if service.query(&city).await? == QueryOutcome::Superseded {
                    warn!(%city, "Forecast was superseded before it could be shown");
                }
                Ok(())
            }
            Command::Interactive { view } => {
                let config = Config::load()?.with_env_overrides();
                let service = build_service(&config, &view)?;
                interactive(service, config.default_city).await
            }
        }
    }
}

fn build_service(config: &Config, view: &ViewArgs) -> anyhow::Result<ForecastService> {
    let provider: Arc<dyn ForecastProvider> = Arc::from(provider_from_config(config)?);

    let mut sinks: Vec<Box<dyn RenderSink>> = vec![Box::new(TerminalSink::stdout())];
    if let Some(path) = view.html_output(config) {
        let sink = HtmlSink::new(path).context("Failed to prepare HTML output")?;
        info!(path = %path.display(), "Writing forecast page");
        sinks.push(Box::new(sink));
    }

    Ok(ForecastService::new(
        provider,
        Arc::new(Dashboard::new(SinkSet::new(sinks))),
        view.options(config),
    ))
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeatherMap API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if api_key.trim().is_empty() {
        anyhow::bail!("API key cannot be empty.");
    }
    config.set_api_key(api_key.trim().to_string());

    let city = Text::new("Default city:")
        .with_default(&config.default_city)
        .prompt()
        .context("Failed to read default city")?;
    if !city.trim().is_empty() {
        config.default_city = city.trim().to_string();
    }

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

/// Each submitted name becomes its own query; earlier ones are not awaited.
async fn interactive(service: ForecastService, default_city: String) -> anyhow::Result<()> {
    let mut pending = Vec::new();
    // rejected names are already logged by the service
    if let Ok(handle) = service.spawn_query(default_city) {
        pending.push(handle);
    }

    loop {
        let input = tokio::task::spawn_blocking(|| {
            Text::new("City:")
                .with_help_message("Enter to search, :q or Esc to quit")
                .prompt()
        })
        .await
        .context("Prompt task failed")?;

        match input {
            Ok(city) if city.trim() == ":q" => break,
            Ok(city) => {
                if let Ok(handle) = service.spawn_query(city) {
                    pending.push(handle);
                }
            }
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e).context("Failed to read city name"),
        }
    }

    // outstanding queries still get to render before exit
    await_pending(pending).await;
    Ok(())
}

/// Waits for every handle; returns how many tasks panicked or were cancelled.
async fn await_pending(pending: Vec<JoinHandle<Result<QueryOutcome, ForecastError>>>) -> usize {
    let mut failed = 0;
    for handle in pending {
        if let Err(e) = handle.await {
            warn!(error = %e, "Query task failed");
            failed += 1;
        }
    }
    failed
}
