use std::error::Error as _;

use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can end a single forecast query.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The request never produced a response (DNS, connect, timeout, body read).
    #[error("Transport error while talking to the forecast provider: {0}")]
    Transport(#[source] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("Error: {status_text} (HTTP {}): {body}", .status.as_u16())]
    Upstream {
        status: StatusCode,
        status_text: String,
        body: String,
    },

    /// The body did not have the expected forecast shape.
    #[error("Failed to parse forecast response: {0}")]
    Parse(String),

    /// Input rejected before any request was made.
    #[error("{0}")]
    Validation(String),

    /// The display surface could not be updated.
    #[error("Failed to render forecast: {0}")]
    Render(String),
}

impl ForecastError {
    pub(crate) fn upstream(status: StatusCode, body: &str) -> Self {
        Self::Upstream {
            status,
            status_text: status.canonical_reason().unwrap_or("Unknown status").to_string(),
            body: truncate_body(body),
        }
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

impl From<tera::Error> for ForecastError {
    fn from(e: tera::Error) -> Self {
        // tera nests the useful message in the source chain
        let mut msg = e.to_string();
        let mut source = e.source();
        while let Some(inner) = source {
            msg.push_str(": ");
            msg.push_str(&inner.to_string());
            source = inner.source();
        }
        Self::Render(msg)
    }
}

impl From<std::io::Error> for ForecastError {
    fn from(e: std::io::Error) -> Self {
        Self::Render(e.to_string())
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }

    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_carries_status_text() {
        let err = ForecastError::upstream(StatusCode::NOT_FOUND, r#"{"cod":"404","message":"city not found"}"#);

        match &err {
            ForecastError::Upstream { status, status_text, body } => {
                assert_eq!(*status, StatusCode::NOT_FOUND);
                assert_eq!(status_text, "Not Found");
                assert!(body.contains("city not found"));
            }
            other => panic!("expected Upstream, got {other:?}"),
        }
        assert!(err.to_string().starts_with("Error: Not Found"));
    }

    #[test]
    fn long_bodies_are_truncated_on_char_boundary() {
        let body = "é".repeat(150);
        let truncated = truncate_body(&body);

        assert!(truncated.ends_with("..."));
        assert!(truncated.len() <= 203);
    }

    #[test]
    fn short_bodies_are_kept() {
        assert_eq!(truncate_body("nope"), "nope");
    }
}
