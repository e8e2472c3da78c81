use crate::fetcher::FetchOutcome;
use serde::{Deserialize, Serialize};

/// A page confirmed to contain a form with a text input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormFinding {
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NotFound,
    AccessDenied { status: u16 },
    /// 5xx or network failure after every retry.
    Transient,
    Unexpected,
    /// The document was fetched but is not a sitemap.
    Parse,
}

impl FailureKind {
    pub fn from_outcome(outcome: &FetchOutcome) -> Self {
        match outcome {
            FetchOutcome::NotFound => FailureKind::NotFound,
            FetchOutcome::AccessDenied { status } => FailureKind::AccessDenied { status: *status },
            FetchOutcome::ServerError { .. } | FetchOutcome::NetworkFailure { .. } => {
                FailureKind::Transient
            }
            FetchOutcome::Success { .. } | FetchOutcome::Unexpected { .. } => {
                FailureKind::Unexpected
            }
        }
    }
}

/// A crawl branch that could not be processed. Siblings are unaffected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlFailure {
    pub url: String,
    pub kind: FailureKind,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlResult {
    /// Form pages in discovery order.
    pub forms: Vec<FormFinding>,
    pub failures: Vec<CrawlFailure>,
    pub sitemap_url: Option<String>,
    pub sitemaps_processed: usize,
    pub pages_fetched: usize,
}

impl CrawlResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn form_urls(&self) -> Vec<&str> {
        self.forms.iter().map(|f| f.url.as_str()).collect()
    }

    /// True when no sitemap could be read and something went wrong getting
    /// to one, so the empty form list says nothing about the site.
    pub fn is_blind(&self) -> bool {
        self.sitemaps_processed == 0 && !self.failures.is_empty()
    }

    pub(crate) fn fail(
        &mut self,
        url: impl Into<String>,
        kind: FailureKind,
        reason: impl Into<String>,
    ) {
        self.failures.push(CrawlFailure {
            url: url.into(),
            kind,
            reason: reason.into(),
        });
    }

    pub(crate) fn fail_fetch(&mut self, url: impl Into<String>, outcome: &FetchOutcome) {
        self.fail(url, FailureKind::from_outcome(outcome), outcome.describe());
    }
}
