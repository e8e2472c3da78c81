use crate::error::{Result, ScanError};
use serde::Serialize;
use std::time::Duration;
use url::Url;

pub const DEFAULT_RETRIES: u32 = 5;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(2);

/// The host being scanned plus the request policy every fetch against it uses.
///
/// Built once before a scan starts and shared read-only afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Target {
    base_url: String,
    user_agent: String,
    retries: u32,
    timeout: Duration,
    backoff: Duration,
    deadline: Option<Duration>,
}

impl Target {
    pub fn new(url: &str) -> Result<Self> {
        Ok(Self {
            base_url: normalize_base_url(url)?,
            user_agent: format!("wpsweep/{}", env!("CARGO_PKG_VERSION")),
            retries: DEFAULT_RETRIES,
            timeout: DEFAULT_TIMEOUT,
            backoff: DEFAULT_BACKOFF,
            deadline: None,
        })
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Number of attempts per fetch. Zero is treated as one.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn backoff(&self) -> Duration {
        self.backoff
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Absolute URL for a path relative to the site root.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Parse `url`, assuming `http://` when no scheme is present, and strip
/// query, fragment and trailing slashes.
pub fn normalize_base_url(url: &str) -> Result<String> {
    let trimmed = url.trim();
    let parsed = match Url::parse(trimmed) {
        Ok(parsed) if parsed.has_host() => parsed,
        _ => Url::parse(&format!("http://{}", trimmed))
            .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", trimmed, e)))?,
    };

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ScanError::InvalidUrl(format!(
            "{}: unsupported scheme '{}'",
            trimmed,
            parsed.scheme()
        )));
    }

    let mut base = parsed;
    base.set_query(None);
    base.set_fragment(None);

    Ok(base.as_str().trim_end_matches('/').to_string())
}
