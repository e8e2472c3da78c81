use crate::error::Result;
use crate::target::Target;
use reqwest::Client;
use reqwest::header::HeaderMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Classified result of a single `Fetcher::fetch` call.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Success {
        status: u16,
        headers: HeaderMap,
        body: String,
    },
    /// The resource is absent. Not an error.
    NotFound,
    /// 401/403. Retrying cannot change an authorization decision.
    AccessDenied { status: u16 },
    /// 5xx on every attempt.
    ServerError { status: u16 },
    /// Timeout or connection failure on every attempt, or a request that
    /// could not be sent at all (malformed URL, redirect loop).
    NetworkFailure { cause: String },
    /// Any other status code, returned without retrying.
    Unexpected { status: u16 },
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success { .. })
    }

    /// Body of a successful fetch.
    pub fn body(&self) -> Option<&str> {
        match self {
            FetchOutcome::Success { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn into_body(self) -> Option<String> {
        match self {
            FetchOutcome::Success { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Short human-readable description, used in logs and probe errors.
    pub fn describe(&self) -> String {
        match self {
            FetchOutcome::Success { status, .. } => format!("status {}", status),
            FetchOutcome::NotFound => "not found".to_string(),
            FetchOutcome::AccessDenied { status } => format!("access denied (status {})", status),
            FetchOutcome::ServerError { status } => {
                format!("server error (status {}) after retries", status)
            }
            FetchOutcome::NetworkFailure { cause } => format!("network failure: {}", cause),
            FetchOutcome::Unexpected { status } => format!("unexpected status {}", status),
        }
    }
}

enum Attempt {
    Done(FetchOutcome),
    Retry(FetchOutcome),
}

/// Resilient HTTP GET shared by every probe and the sitemap crawler.
///
/// Cloning is cheap: the underlying reqwest client is reference counted, so
/// all clones share one connection pool.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    retries: u32,
    backoff: Duration,
}

impl Fetcher {
    pub fn new(target: &Target) -> Result<Self> {
        let client = Client::builder()
            .user_agent(target.user_agent())
            .timeout(target.timeout())
            .connect_timeout(target.timeout() / 2)
            .pool_max_idle_per_host(50) // Connection pooling
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            retries: target.retries().max(1),
            backoff: target.backoff(),
        })
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// GET `url`, retrying 5xx responses and transport failures up to the
    /// configured attempt count with a fixed backoff between attempts.
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        let mut attempt = 1;
        loop {
            debug!("GET {} (attempt {}/{})", url, attempt, self.retries);

            let outcome = match self.attempt(url).await {
                Attempt::Done(outcome) => return outcome,
                Attempt::Retry(outcome) => outcome,
            };

            if attempt >= self.retries {
                warn!("Giving up on {}: {}", url, outcome.describe());
                return outcome;
            }

            warn!(
                "Retrying {} in {:?}: {}",
                url,
                self.backoff,
                outcome.describe()
            );
            tokio::time::sleep(self.backoff).await;
            attempt += 1;
        }
    }

    async fn attempt(&self, url: &str) -> Attempt {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                let outcome = FetchOutcome::NetworkFailure {
                    cause: e.to_string(),
                };
                // Builder and redirect-limit errors fail the same way every time
                return if e.is_timeout() || e.is_connect() || e.is_request() {
                    Attempt::Retry(outcome)
                } else {
                    Attempt::Done(outcome)
                };
            }
        };

        let status = response.status().as_u16();
        match status {
            200 => {
                let headers = response.headers().clone();
                match response.text().await {
                    Ok(body) => Attempt::Done(FetchOutcome::Success {
                        status,
                        headers,
                        body,
                    }),
                    // Connection dropped mid-body
                    Err(e) => Attempt::Retry(FetchOutcome::NetworkFailure {
                        cause: e.to_string(),
                    }),
                }
            }
            404 => Attempt::Done(FetchOutcome::NotFound),
            401 | 403 => Attempt::Done(FetchOutcome::AccessDenied { status }),
            s if s >= 500 => Attempt::Retry(FetchOutcome::ServerError { status }),
            _ => Attempt::Done(FetchOutcome::Unexpected { status }),
        }
    }
}
