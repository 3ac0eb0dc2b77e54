//! Core library for the `forecast` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeatherMap forecast client behind the [`ForecastProvider`] trait
//! - The daily-summary reduction and condition icons
//! - View models and the render sinks that display them
//!
//! It is used by `forecast-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod icons;
pub mod model;
pub mod provider;
pub mod query;
pub mod render;
pub mod summary;
pub mod view;

pub use config::Config;
pub use error::ForecastError;
pub use icons::{DEFAULT_ICON, icon_for};
pub use model::{DailySummary, ForecastResponse, ForecastSample, LocationInfo};
pub use provider::{ForecastProvider, openweather::OpenWeatherProvider, provider_from_config};
pub use query::{ForecastService, QueryOutcome};
pub use render::{Dashboard, HtmlSink, RenderSink, RequestToken, SinkSet, TerminalSink};
pub use summary::{SelectionRule, summarize_by_day};
pub use view::{DayCard, TimeBasis, ViewModel, ViewOptions, build_view};
