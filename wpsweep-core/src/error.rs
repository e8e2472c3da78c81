use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use wpsweep_scanner::FetchOutcome;

/// Why a probe could not complete. Always local to that probe.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProbeError {
    #[error("access denied to {url} (status {status})")]
    AccessDenied { url: String, status: u16 },

    #[error("transient failure fetching {url}: {detail}")]
    Transient { url: String, detail: String },

    #[error("could not parse response from {url}: {detail}")]
    ParseFailure { url: String, detail: String },

    #[error("unexpected response from {url}: {detail}")]
    Unexpected { url: String, detail: String },

    #[error("scan deadline of {}s exceeded", .deadline.as_secs_f64())]
    DeadlineExceeded {
        #[serde(skip)]
        deadline: Duration,
    },

    #[error("probe panicked: {message}")]
    Panicked { message: String },
}

impl ProbeError {
    /// Map a non-successful fetch onto the error taxonomy. `Success` and
    /// `NotFound` are not errors and yield `None`.
    pub fn from_outcome(url: &str, outcome: &FetchOutcome) -> Option<Self> {
        let url = url.to_string();
        match outcome {
            FetchOutcome::Success { .. } | FetchOutcome::NotFound => None,
            FetchOutcome::AccessDenied { status } => Some(ProbeError::AccessDenied {
                url,
                status: *status,
            }),
            FetchOutcome::ServerError { .. } | FetchOutcome::NetworkFailure { .. } => {
                Some(ProbeError::Transient {
                    url,
                    detail: outcome.describe(),
                })
            }
            FetchOutcome::Unexpected { .. } => Some(ProbeError::Unexpected {
                url,
                detail: outcome.describe(),
            }),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ProbeError::AccessDenied { .. } => "access_denied",
            ProbeError::Transient { .. } => "transient",
            ProbeError::ParseFailure { .. } => "parse_failure",
            ProbeError::Unexpected { .. } => "unexpected",
            ProbeError::DeadlineExceeded { .. } => "deadline_exceeded",
            ProbeError::Panicked { .. } => "panicked",
        }
    }
}

pub type Result<T> = std::result::Result<T, ProbeError>;
