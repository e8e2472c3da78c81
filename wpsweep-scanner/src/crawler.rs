use crate::fetcher::{FetchOutcome, Fetcher};
use crate::forms::has_text_input_form;
use crate::result::{CrawlResult, FailureKind, FormFinding};
use crate::sitemap::{SitemapEntry, find_sitemap_directive, parse_sitemap_at, resolve_against};
use crate::target::Target;
use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt, stream};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

pub const DEFAULT_CONCURRENCY: usize = 8;

/// URLs already issued to the fetcher during one crawl.
///
/// `mark` is the only way in: it checks and inserts under one lock, so two
/// tasks can never both decide to fetch the same URL.
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: Mutex<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `url` as visited. Returns false if it already was.
    pub async fn mark(&self, url: &str) -> bool {
        self.urls.lock().await.insert(normalize_url(url))
    }

    pub async fn contains(&self, url: &str) -> bool {
        self.urls.lock().await.contains(&normalize_url(url))
    }

    pub async fn len(&self) -> usize {
        self.urls.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.urls.lock().await.is_empty()
    }

    /// Sorted copy of the visited URLs.
    pub async fn snapshot(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.urls.lock().await.iter().cloned().collect();
        urls.sort();
        urls
    }
}

/// Absolute URL with the fragment removed; unparseable input is only trimmed.
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();
    match Url::parse(trimmed) {
        Ok(mut parsed) => {
            parsed.set_fragment(None);
            parsed.to_string()
        }
        Err(_) => trimmed.to_string(),
    }
}

/// Recursive descent over a site's sitemap documents looking for pages with
/// text-input forms.
///
/// robots.txt is only consulted by [`SitemapCrawler::crawl`]; nested sitemaps
/// are descended into by URL. The visited set is what stops a cycle of
/// sitemaps referencing each other.
pub struct SitemapCrawler {
    fetcher: Fetcher,
    visited: Arc<VisitedSet>,
    concurrency: usize,
}

impl SitemapCrawler {
    pub fn new(fetcher: Fetcher) -> Self {
        Self {
            fetcher,
            visited: Arc::new(VisitedSet::new()),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Maximum number of sibling pages fetched at once.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_visited(mut self, visited: Arc<VisitedSet>) -> Self {
        self.visited = visited;
        self
    }

    pub fn visited(&self) -> Arc<VisitedSet> {
        self.visited.clone()
    }

    /// Locate the sitemap through `{base}/robots.txt` and crawl it.
    ///
    /// A missing robots.txt, or one without a `Sitemap:` line, yields an
    /// empty result rather than an error.
    pub async fn crawl(&self, target: &Target) -> CrawlResult {
        let mut result = CrawlResult::new();
        let robots_url = target.url_for("robots.txt");
        info!("Starting sitemap crawl of {}", target.base_url());

        if !self.visited.mark(&robots_url).await {
            debug!("{} already visited", robots_url);
            return result;
        }

        let robots = match self.fetcher.fetch(&robots_url).await {
            FetchOutcome::Success { body, .. } => body,
            FetchOutcome::NotFound => {
                info!("No robots.txt at {}", robots_url);
                return result;
            }
            outcome => {
                warn!("Failed to fetch {}: {}", robots_url, outcome.describe());
                result.fail_fetch(robots_url, &outcome);
                return result;
            }
        };

        let Some(directive) = find_sitemap_directive(&robots) else {
            info!("robots.txt at {} has no Sitemap directive", robots_url);
            return result;
        };
        let sitemap_url = resolve_against(&robots_url, &directive);

        result.sitemap_url = Some(sitemap_url.clone());
        self.descend(sitemap_url, &mut result).await;

        info!(
            "Sitemap crawl complete: {} sitemap(s), {} page(s), {} form page(s)",
            result.sitemaps_processed,
            result.pages_fetched,
            result.forms.len()
        );
        result
    }

    /// Crawl starting from an explicit sitemap URL.
    pub async fn crawl_sitemap(&self, sitemap_url: &str) -> CrawlResult {
        let mut result = CrawlResult::new();
        result.sitemap_url = Some(sitemap_url.to_string());
        self.descend(sitemap_url.to_string(), &mut result).await;
        result
    }

    fn descend<'a>(
        &'a self,
        sitemap_url: String,
        result: &'a mut CrawlResult,
    ) -> BoxFuture<'a, ()> {
        async move {
            if !self.visited.mark(&sitemap_url).await {
                debug!("Sitemap {} already processed", sitemap_url);
                return;
            }

            let body = match self.fetcher.fetch(&sitemap_url).await {
                FetchOutcome::Success { body, .. } => body,
                outcome => {
                    warn!("Failed to fetch sitemap {}: {}", sitemap_url, outcome.describe());
                    result.fail_fetch(&sitemap_url, &outcome);
                    return;
                }
            };

            let entries = match parse_sitemap_at(&body, &sitemap_url) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Unparseable sitemap {}: {}", sitemap_url, e);
                    result.fail(&sitemap_url, FailureKind::Parse, e.to_string());
                    return;
                }
            };
            result.sitemaps_processed += 1;
            debug!("Sitemap {} lists {} entries", sitemap_url, entries.len());

            let (nested, pages): (Vec<SitemapEntry>, Vec<SitemapEntry>) =
                entries.into_iter().partition(SitemapEntry::is_nested_sitemap);

            self.scan_pages(pages, result).await;

            for entry in nested {
                self.descend(entry.url, result).await;
            }
        }
        .boxed()
    }

    /// Fetch every not-yet-visited page concurrently and record the ones with
    /// a text-input form, keeping sitemap order.
    async fn scan_pages(&self, pages: Vec<SitemapEntry>, result: &mut CrawlResult) {
        let mut to_fetch = Vec::with_capacity(pages.len());
        for page in pages {
            if self.visited.mark(&page.url).await {
                to_fetch.push(page.url);
            } else {
                debug!("Page {} already visited", page.url);
            }
        }

        let outcomes: Vec<(String, FetchOutcome)> = stream::iter(to_fetch)
            .map(|url| async move {
                let outcome = self.fetcher.fetch(&url).await;
                (url, outcome)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        for (url, outcome) in outcomes {
            match outcome {
                FetchOutcome::Success { body, .. } => {
                    result.pages_fetched += 1;
                    if has_text_input_form(&body) {
                        info!("Form with text input found at {}", url);
                        result.forms.push(FormFinding { url });
                    }
                }
                outcome => {
                    debug!("Skipping page {}: {}", url, outcome.describe());
                    result.fail_fetch(url, &outcome);
                }
            }
        }
    }
}
