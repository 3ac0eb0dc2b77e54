//! Display surfaces and the dashboard that guards them.

use std::{
    fmt, fs,
    io::{self, Write},
    path::PathBuf,
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
};

use tera::{Context, Tera};
use tracing::{debug, warn};

use crate::{error::ForecastError, view::ViewModel};

/// A surface that shows one [`ViewModel`] at a time.
///
/// Every call replaces whatever the previous call displayed.
pub trait RenderSink: Send {
    fn render(&mut self, view: &ViewModel) -> Result<(), ForecastError>;
}

/// Writes the view as a text block, e.g. to stdout.
#[derive(Debug)]
pub struct TerminalSink<W> {
    out: W,
}

impl TerminalSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> RenderSink for TerminalSink<W> {
    fn render(&mut self, view: &ViewModel) -> Result<(), ForecastError> {
        write_text(&mut self.out, view)?;
        self.out.flush()?;
        Ok(())
    }
}

fn write_text<W: Write>(out: &mut W, view: &ViewModel) -> io::Result<()> {
    writeln!(out, "{}", view.location)?;
    writeln!(out, "  {}  {}  [{}]", view.temperature, view.description, view.icon)?;
    writeln!(out, "  {}  {}", view.max_temp, view.min_temp)?;
    writeln!(
        out,
        "  Humidity {}  Wind {}  Pressure {}",
        view.humidity, view.wind, view.pressure
    )?;
    writeln!(out, "  Sunrise {}  Sunset {}", view.sunrise, view.sunset)?;

    if view.days.is_empty() {
        writeln!(out, "  No daily forecast available")?;
        return Ok(());
    }

    writeln!(out)?;
    for day in &view.days {
        writeln!(
            out,
            "  {:<12} {:>6}  {:<14} {}",
            day.date, day.temperature, day.condition, day.icon
        )?;
    }
    Ok(())
}

const PAGE: &str = "forecast.html";
const PAGE_TEMPLATE: &str = include_str!("../templates/forecast.html");

/// Renders the view into a standalone HTML page and overwrites `path` with it.
pub struct HtmlSink {
    path: PathBuf,
    tera: Tera,
}

impl fmt::Debug for HtmlSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HtmlSink")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl HtmlSink {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, ForecastError> {
        let mut tera = Tera::default();
        tera.add_raw_template(PAGE, PAGE_TEMPLATE)?;

        Ok(Self {
            path: path.into(),
            tera,
        })
    }

    /// The page for `view`, with provider strings HTML-escaped.
    pub fn to_html(&self, view: &ViewModel) -> Result<String, ForecastError> {
        let context = Context::from_serialize(view)?;
        Ok(self.tera.render(PAGE, &context)?)
    }
}

impl RenderSink for HtmlSink {
    fn render(&mut self, view: &ViewModel) -> Result<(), ForecastError> {
        let html = self.to_html(view)?;
        fs::write(&self.path, html).map_err(|e| {
            ForecastError::Render(format!("Failed to write {}: {e}", self.path.display()))
        })?;

        debug!(path = %self.path.display(), days = view.days.len(), "Wrote forecast page");
        Ok(())
    }
}

/// Several sinks updated together, in order. Stops at the first failure.
pub struct SinkSet {
    sinks: Vec<Box<dyn RenderSink>>,
}

impl SinkSet {
    pub fn new(sinks: Vec<Box<dyn RenderSink>>) -> Self {
        Self { sinks }
    }
}

impl RenderSink for SinkSet {
    fn render(&mut self, view: &ViewModel) -> Result<(), ForecastError> {
        for sink in &mut self.sinks {
            sink.render(view)?;
        }
        Ok(())
    }
}

/// Identifies one issued query; later queries get larger tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct SinkState {
    applied: Option<RequestToken>,
    sink: Box<dyn RenderSink>,
}

/// Owns the render sink and drops completions that arrive after a newer one.
pub struct Dashboard {
    issued: AtomicU64,
    state: Mutex<SinkState>,
}

impl fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dashboard")
            .field("issued", &self.issued.load(Ordering::Relaxed))
            .field("applied", &self.last_applied())
            .finish_non_exhaustive()
    }
}

impl Dashboard {
    pub fn new(sink: impl RenderSink + 'static) -> Self {
        Self {
            issued: AtomicU64::new(0),
            state: Mutex::new(SinkState {
                applied: None,
                sink: Box::new(sink),
            }),
        }
    }

    pub fn issue(&self) -> RequestToken {
        RequestToken(self.issued.fetch_add(1, Ordering::Relaxed) + 1)
    }

    pub fn last_applied(&self) -> Option<RequestToken> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).applied
    }

    /// Shows `view` unless a query issued after `token` has already been shown.
    ///
    /// Returns `Ok(false)` when the view was discarded as stale.
    pub fn present(&self, token: RequestToken, view: &ViewModel) -> Result<bool, ForecastError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        if state.applied.is_some_and(|applied| applied >= token) {
            warn!(%token, applied = ?state.applied, "Discarding stale forecast");
            return Ok(false);
        }

        state.sink.render(view)?;
        state.applied = Some(token);
        Ok(true)
    }
}
