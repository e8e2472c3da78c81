use crate::error::ProbeError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub title: String,
    pub description: String,
    pub evidence_url: String,
    pub severity: Severity,
}

impl Finding {
    pub fn new(
        severity: Severity,
        title: impl Into<String>,
        description: impl Into<String>,
        evidence_url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            evidence_url: evidence_url.into(),
            severity,
        }
    }
}

/// What a probe body hands back: its findings so far, plus an error if it
/// could not finish. Both may be present.
#[derive(Debug, Clone, Default)]
pub struct ProbeOutput {
    pub findings: Vec<Finding>,
    pub error: Option<ProbeError>,
}

impl ProbeOutput {
    pub fn found(findings: Vec<Finding>) -> Self {
        Self {
            findings,
            error: None,
        }
    }

    pub fn failed(error: ProbeError) -> Self {
        Self {
            findings: Vec::new(),
            error: Some(error),
        }
    }
}

impl From<Result<Vec<Finding>, ProbeError>> for ProbeOutput {
    fn from(result: Result<Vec<Finding>, ProbeError>) -> Self {
        match result {
            Ok(findings) => ProbeOutput::found(findings),
            Err(error) => ProbeOutput::failed(error),
        }
    }
}

/// The outcome of one requested probe. Always produced, even when the probe
/// failed outright.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    pub probe: String,
    pub findings: Vec<Finding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ProbeError>,
    #[serde(with = "duration_ms")]
    pub elapsed: Duration,
}

impl ProbeResult {
    pub fn new(probe: impl Into<String>, output: ProbeOutput, elapsed: Duration) -> Self {
        Self {
            probe: probe.into(),
            findings: output.findings,
            error: output.error,
            elapsed,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// A user exposed by the REST users endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WpUser {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

mod duration_ms {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }
}
