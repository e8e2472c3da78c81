use crate::data::ProbeOutput;
use crate::error::{ProbeError, Result};
use crate::security;
use crate::state::ScanState;
use futures::{StreamExt, stream};
use std::sync::Arc;
use tracing::debug;
use wpsweep_scanner::{FetchOutcome, Fetcher, Target};

/// Every check the scanner knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Probe {
    WordPress,
    Version,
    Readme,
    DebugLog,
    BackupFiles,
    DirectoryListing,
    XmlRpc,
    RobotsTxt,
    FullPathDisclosure,
    EnumUsers,
    SitemapForms,
    Plugins,
    Themes,
}

impl Probe {
    pub const ALL: [Probe; 13] = [
        Probe::WordPress,
        Probe::Version,
        Probe::Readme,
        Probe::DebugLog,
        Probe::BackupFiles,
        Probe::DirectoryListing,
        Probe::XmlRpc,
        Probe::RobotsTxt,
        Probe::FullPathDisclosure,
        Probe::EnumUsers,
        Probe::SitemapForms,
        Probe::Plugins,
        Probe::Themes,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Probe::WordPress => "wordpress",
            Probe::Version => "version",
            Probe::Readme => "readme",
            Probe::DebugLog => "debug_log",
            Probe::BackupFiles => "backup_files",
            Probe::DirectoryListing => "directory_listing",
            Probe::XmlRpc => "xml_rpc",
            Probe::RobotsTxt => "robots_txt",
            Probe::FullPathDisclosure => "full_path_disclosure",
            Probe::EnumUsers => "enum_users",
            Probe::SitemapForms => "sitemap_forms",
            Probe::Plugins => "plugins",
            Probe::Themes => "themes",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Probe::WordPress => "Check whether the site runs WordPress",
            Probe::Version => "Extract the WordPress version from the front page",
            Probe::Readme => "Look for an exposed readme.html",
            Probe::DebugLog => "Look for an exposed debug.log",
            Probe::BackupFiles => "Look for wp-config.php backups and other sensitive files",
            Probe::DirectoryListing => "Check the wp-* directories for directory listings",
            Probe::XmlRpc => "Check whether xmlrpc.php is reachable",
            Probe::RobotsTxt => "Report robots.txt and its Disallow entries",
            Probe::FullPathDisclosure => "Trigger a PHP error that discloses the install path",
            Probe::EnumUsers => "Enumerate users through the REST API",
            Probe::SitemapForms => "Crawl the sitemap hierarchy for pages with text-input forms",
            Probe::Plugins => "Identify installed plugins",
            Probe::Themes => "Identify installed themes",
        }
    }

    /// Look up a probe by name. Hyphens and case are ignored, and the short
    /// names of the original flag set are accepted as aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase().replace('-', "_");
        let alias = match name.as_str() {
            "url" => "version",
            "backup_file" => "backup_files",
            "robots_text" => "robots_txt",
            "check_plugins" => "plugins",
            "check_themes" => "themes",
            other => other,
        };
        Probe::ALL.into_iter().find(|p| p.name() == alias)
    }

    pub async fn run(self, ctx: &ProbeContext) -> ProbeOutput {
        debug!("Running probe {}", self.name());
        match self {
            Probe::WordPress => security::check_wordpress(ctx).await.into(),
            Probe::Version => security::check_version(ctx).await.into(),
            Probe::Readme => security::check_readme(ctx).await.into(),
            Probe::DebugLog => security::check_debug_log(ctx).await.into(),
            Probe::BackupFiles => security::check_backup_files(ctx).await.into(),
            Probe::DirectoryListing => security::check_directory_listing(ctx).await.into(),
            Probe::XmlRpc => security::check_xml_rpc(ctx).await.into(),
            Probe::RobotsTxt => security::check_robots_txt(ctx).await.into(),
            Probe::FullPathDisclosure => security::check_full_path_disclosure(ctx).await.into(),
            Probe::EnumUsers => security::enum_users(ctx).await.into(),
            Probe::SitemapForms => security::check_sitemap_forms(ctx).await,
            Probe::Plugins => security::check_plugins(ctx).await,
            Probe::Themes => security::check_themes(ctx).await,
        }
    }
}

/// Resolve requested names to probes in request order, dropping unknown
/// names and duplicates.
pub fn resolve_probes<S: AsRef<str>>(names: &[S]) -> Vec<Probe> {
    resolve_requested(names)
        .into_iter()
        .map(|(_, probe)| probe)
        .collect()
}

/// Like [`resolve_probes`], but keeps the trimmed name each probe was
/// requested under. The first spelling of a duplicate wins.
pub fn resolve_requested<S: AsRef<str>>(names: &[S]) -> Vec<(String, Probe)> {
    let mut probes: Vec<(String, Probe)> = Vec::new();
    for name in names {
        let name = name.as_ref().trim();
        match Probe::from_name(name) {
            Some(probe) if !probes.iter().any(|(_, p)| *p == probe) => {
                probes.push((name.to_string(), probe))
            }
            Some(_) => debug!("Probe '{}' already requested", name),
            None => debug!("Ignoring unknown probe '{}'", name),
        }
    }
    probes
}

/// Everything a probe body gets to work with.
pub struct ProbeContext {
    pub target: Arc<Target>,
    pub fetcher: Fetcher,
    pub state: Arc<ScanState>,
    pub concurrency: usize,
}

impl ProbeContext {
    pub fn new(target: Arc<Target>, fetcher: Fetcher, state: Arc<ScanState>) -> Self {
        Self {
            target,
            fetcher,
            state,
            concurrency: wpsweep_scanner::crawler::DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Fetch a path under the target. `Ok(None)` means the resource is absent.
    pub async fn fetch_path(&self, path: &str) -> Result<(String, Option<String>)> {
        let url = self.target.url_for(path);
        let outcome = self.fetcher.fetch(&url).await;
        if let Some(error) = ProbeError::from_outcome(&url, &outcome) {
            return Err(error);
        }
        Ok((url, outcome.into_body()))
    }

    /// Fetch many paths with bounded concurrency, keeping input order.
    pub async fn fetch_many<'a, I>(&self, paths: I) -> Vec<(String, FetchOutcome)>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let urls: Vec<String> = paths
            .into_iter()
            .map(|path| self.target.url_for(path))
            .collect();

        stream::iter(urls)
            .map(|url| {
                let fetcher = self.fetcher.clone();
                async move {
                    let outcome = fetcher.fetch(&url).await;
                    (url, outcome)
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await
    }
}
