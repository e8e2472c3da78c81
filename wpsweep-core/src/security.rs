// WordPress misconfiguration checks. Each one fetches a handful of paths and
// turns what it sees into findings.

use crate::catalog::*;
use crate::data::{Finding, ProbeOutput, Severity, WpUser};
use crate::error::{ProbeError, Result};
use crate::probe::ProbeContext;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::{debug, info};
use wpsweep_scanner::{
    CrawlFailure, FailureKind, FetchOutcome, SitemapCrawler, sitemap::disallow_entries,
};

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Version ([0-9]+\.[0-9]+\.?[0-9]*)").expect("static regex")
});
static GENERATOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"<meta[^>]+name=["']generator["'][^>]+"#,
        r#"content=["']WordPress ([0-9]+\.[0-9]+(?:\.[0-9]+)?)"#
    ))
    .expect("static regex")
});
static FPD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)Fatal error:.*? in (.*?) on").expect("static regex"));

pub async fn check_wordpress(ctx: &ProbeContext) -> Result<Vec<Finding>> {
    let (url, body) = ctx.fetch_path("").await?;
    let Some(body) = body else {
        return Ok(Vec::new());
    };

    if !body.contains("wp-") {
        info!("{} does not look like a WordPress site", url);
        return Ok(Vec::new());
    }

    Ok(vec![Finding::new(
        Severity::Info,
        "WordPress detected",
        "The front page references wp- resources.",
        url,
    )])
}

pub fn extract_version(html: &str) -> Option<String> {
    VERSION_RE
        .captures(html)
        .or_else(|| GENERATOR_RE.captures(html))
        .map(|caps| caps[1].to_string())
}

pub async fn check_version(ctx: &ProbeContext) -> Result<Vec<Finding>> {
    let (url, body) = ctx.fetch_path("").await?;
    let Some(version) = body.as_deref().and_then(extract_version) else {
        debug!("No WordPress version found at {}", url);
        return Ok(Vec::new());
    };

    ctx.state.set_version(&version).await;
    Ok(vec![Finding::new(
        Severity::Info,
        format!("WordPress version {}", version),
        format!("The front page discloses WordPress version {}.", version),
        url,
    )])
}

pub async fn check_readme(ctx: &ProbeContext) -> Result<Vec<Finding>> {
    let (url, body) = ctx.fetch_path(README_PATH).await?;
    if body.is_none() {
        return Ok(Vec::new());
    }

    Ok(vec![Finding::new(
        Severity::Low,
        "readme.html exposed",
        "The default readme file is publicly accessible and may disclose the installed version.",
        url,
    )])
}

pub async fn check_debug_log(ctx: &ProbeContext) -> Result<Vec<Finding>> {
    let (url, body) = ctx.fetch_path(DEBUG_LOG_PATH).await?;
    match body {
        // Soft-404 pages served with status 200
        Some(body) if !body.contains("404") => Ok(vec![Finding::new(
            Severity::High,
            "Debug log exposed",
            "WP_DEBUG_LOG output is publicly readable and may leak paths, queries and credentials.",
            url,
        )]),
        _ => Ok(Vec::new()),
    }
}

/// Fail only when every fetch hit a transient error; a mix of absent and
/// denied paths is a clean result.
fn all_transient(outcomes: &[(String, FetchOutcome)]) -> Option<ProbeError> {
    let mut transient = outcomes.iter().filter(|(_, outcome)| {
        matches!(
            outcome,
            FetchOutcome::ServerError { .. } | FetchOutcome::NetworkFailure { .. }
        )
    });

    let (url, first) = transient.next()?;
    if transient.count() + 1 < outcomes.len() {
        return None;
    }
    Some(ProbeError::Transient {
        url: url.clone(),
        detail: format!("all {} requests failed, first: {}", outcomes.len(), first.describe()),
    })
}

pub async fn check_backup_files(ctx: &ProbeContext) -> Result<Vec<Finding>> {
    let outcomes = ctx.fetch_many(BACKUP_FILES.iter().copied()).await;
    if let Some(error) = all_transient(&outcomes) {
        return Err(error);
    }

    let mut findings = Vec::new();
    for (url, outcome) in outcomes {
        if outcome.is_success() {
            ctx.state.add_sensitive_file(&url).await;
            findings.push(Finding::new(
                Severity::High,
                "Backup or sensitive file exposed",
                format!("{} is publicly downloadable.", url),
                url,
            ));
        }
    }
    Ok(findings)
}

pub async fn check_directory_listing(ctx: &ProbeContext) -> Result<Vec<Finding>> {
    let outcomes = ctx
        .fetch_many(LISTING_DIRECTORIES.iter().map(|(path, _)| *path))
        .await;
    if let Some(error) = all_transient(&outcomes) {
        return Err(error);
    }

    let mut findings = Vec::new();
    for ((url, outcome), (_, label)) in outcomes.into_iter().zip(LISTING_DIRECTORIES) {
        if outcome.body().is_some_and(|body| body.contains("Index of")) {
            ctx.state.add_sensitive_file(&url).await;
            findings.push(Finding::new(
                Severity::Medium,
                format!("{} directory listing enabled", label),
                format!("The {} directory can be browsed.", label),
                url,
            ));
        }
    }
    Ok(findings)
}

pub async fn check_xml_rpc(ctx: &ProbeContext) -> Result<Vec<Finding>> {
    let url = ctx.target.url_for(XML_RPC_PATH);
    let reachable = match ctx.fetcher.fetch(&url).await {
        FetchOutcome::Success { .. } => true,
        // xmlrpc.php answers GET with 405 "accepts POST requests only"
        FetchOutcome::Unexpected { status: 405 } => true,
        outcome => match ProbeError::from_outcome(&url, &outcome) {
            Some(error) => return Err(error),
            None => false,
        },
    };

    if !reachable {
        return Ok(Vec::new());
    }
    Ok(vec![Finding::new(
        Severity::Medium,
        "XML-RPC interface available",
        "xmlrpc.php is reachable and can be abused for credential brute forcing and pingback amplification.",
        url,
    )])
}

pub async fn check_robots_txt(ctx: &ProbeContext) -> Result<Vec<Finding>> {
    let (url, body) = ctx.fetch_path(ROBOTS_PATH).await?;
    let Some(body) = body else {
        return Ok(Vec::new());
    };

    let mut findings = vec![Finding::new(
        Severity::Info,
        "robots.txt available",
        "robots.txt is present.",
        &url,
    )];
    for entry in disallow_entries(&body) {
        findings.push(Finding::new(
            Severity::Info,
            "Interesting robots.txt entry",
            entry,
            &url,
        ));
    }
    Ok(findings)
}

pub fn extract_disclosed_path(body: &str) -> Option<String> {
    FPD_RE
        .captures(body)
        .map(|caps| caps[1].replace('\n', "").trim().to_string())
        .filter(|path| !path.is_empty())
}

pub async fn check_full_path_disclosure(ctx: &ProbeContext) -> Result<Vec<Finding>> {
    let (url, body) = ctx.fetch_path(FPD_PATH).await?;
    let Some(path) = body.as_deref().and_then(extract_disclosed_path) else {
        return Ok(Vec::new());
    };

    Ok(vec![Finding::new(
        Severity::Medium,
        "Full Path Disclosure",
        format!("A PHP fatal error exposes the server path: {}", path),
        url,
    )])
}

fn parse_json<T: for<'de> Deserialize<'de>>(url: &str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| ProbeError::ParseFailure {
        url: url.to_string(),
        detail: e.to_string(),
    })
}

/// 401/403 from the users endpoint ends this probe only.
pub async fn enum_users(ctx: &ProbeContext) -> Result<Vec<Finding>> {
    let (url, body) = ctx.fetch_path(USERS_ENDPOINT).await?;
    let Some(body) = body else {
        return Ok(Vec::new());
    };

    let users: Vec<WpUser> = parse_json(&url, &body)?;
    ctx.state.record_users(&users).await;

    Ok(users
        .iter()
        .map(|user| {
            Finding::new(
                Severity::Medium,
                format!("User enumerated: {}", user.slug),
                format!("id {}, name '{}', slug '{}'", user.id, user.name, user.slug),
                &url,
            )
        })
        .collect())
}

fn crawl_error(failure: &CrawlFailure) -> ProbeError {
    let url = failure.url.clone();
    let detail = failure.reason.clone();
    match failure.kind {
        FailureKind::AccessDenied { status } => ProbeError::AccessDenied { url, status },
        FailureKind::Transient => ProbeError::Transient { url, detail },
        FailureKind::Parse => ProbeError::ParseFailure { url, detail },
        FailureKind::NotFound | FailureKind::Unexpected => ProbeError::Unexpected { url, detail },
    }
}

/// Form pages become findings. A crawl that never reached a readable sitemap
/// is an error; branches that failed past that point are reported as Info
/// findings next to the forms.
pub async fn check_sitemap_forms(ctx: &ProbeContext) -> ProbeOutput {
    let crawler = SitemapCrawler::new(ctx.fetcher.clone()).with_concurrency(ctx.concurrency);
    let result = crawler.crawl(&ctx.target).await;

    let mut findings: Vec<Finding> = result
        .forms
        .iter()
        .map(|form| {
            Finding::new(
                Severity::Info,
                "Form with text input",
                "Page listed in the sitemap accepts free-text input.",
                &form.url,
            )
        })
        .collect();

    if result.is_blind() {
        let error = crawl_error(&result.failures[0]);
        return ProbeOutput {
            findings,
            error: Some(error),
        };
    }

    findings.extend(result.failures.iter().map(|failure| {
        Finding::new(
            Severity::Info,
            "Sitemap entry not crawled",
            failure.reason.clone(),
            &failure.url,
        )
    }));
    ProbeOutput::found(findings)
}

#[derive(Debug, Deserialize)]
struct RestPlugin {
    name: String,
    #[serde(default)]
    version: Option<String>,
}

/// Directory listing, REST inventory and known plugin paths. A failure in
/// one step does not discard findings from the others.
pub async fn check_plugins(ctx: &ProbeContext) -> ProbeOutput {
    let mut output = ProbeOutput::default();

    match ctx.fetch_path(PLUGINS_DIRECTORY).await {
        Ok((url, Some(body))) if body.contains("Index of") => output.findings.push(Finding::new(
            Severity::Medium,
            "Plugin directory listing",
            "wp-content/plugins/ can be browsed.",
            url,
        )),
        Ok(_) => {}
        Err(e) => debug!("Plugin directory: {}", e),
    }

    match ctx.fetch_path(PLUGINS_ENDPOINT).await {
        Ok((url, Some(body))) => match parse_json::<Vec<RestPlugin>>(&url, &body) {
            Ok(plugins) => {
                for plugin in plugins {
                    output.findings.push(Finding::new(
                        Severity::Info,
                        format!("Installed plugin: {}", plugin.name),
                        format!(
                            "{} {}",
                            plugin.name,
                            plugin.version.as_deref().unwrap_or("(unknown version)")
                        ),
                        &url,
                    ));
                }
            }
            Err(e) => output.error = Some(e),
        },
        Ok(_) => {}
        Err(e) => output.error = Some(e),
    }

    let paths: Vec<String> = KNOWN_PLUGINS
        .iter()
        .map(|(file, _)| format!("{}{}", PLUGINS_DIRECTORY, file))
        .collect();
    let outcomes = ctx.fetch_many(paths.iter().map(String::as_str)).await;
    for ((url, outcome), (file, label)) in outcomes.into_iter().zip(KNOWN_PLUGINS) {
        if outcome.is_success() {
            output.findings.push(Finding::new(
                Severity::Low,
                format!("Known plugin found: {}", label),
                format!("{} is present.", file),
                url,
            ));
        }
    }

    output
}

/// `name` is a plain string on some installs and `{raw, rendered}` on others.
fn theme_field(theme: &Value, key: &str) -> Option<String> {
    match theme.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map
            .get("rendered")
            .or_else(|| map.get("raw"))
            .and_then(Value::as_str)
            .map(String::from),
        _ => None,
    }
}

pub async fn check_themes(ctx: &ProbeContext) -> ProbeOutput {
    let mut output = ProbeOutput::default();

    match ctx.fetch_path(THEMES_ENDPOINT).await {
        Ok((url, Some(body))) => match parse_json::<Vec<Value>>(&url, &body) {
            Ok(themes) => {
                for theme in themes {
                    let name = theme_field(&theme, "name")
                        .or_else(|| theme_field(&theme, "stylesheet"))
                        .unwrap_or_else(|| "unnamed theme".to_string());
                    let version = theme_field(&theme, "version")
                        .unwrap_or_else(|| "(unknown version)".to_string());
                    output.findings.push(Finding::new(
                        Severity::Info,
                        format!("Installed theme: {}", name),
                        format!("{} {}", name, version),
                        &url,
                    ));
                }
            }
            Err(e) => output.error = Some(e),
        },
        Ok(_) => {}
        Err(e) => output.error = Some(e),
    }

    let paths: Vec<String> = KNOWN_THEMES
        .iter()
        .map(|(file, _)| format!("{}{}", THEMES_DIRECTORY, file))
        .collect();
    let outcomes = ctx.fetch_many(paths.iter().map(String::as_str)).await;
    for ((url, outcome), (_, label)) in outcomes.into_iter().zip(KNOWN_THEMES) {
        if outcome.is_success() {
            output.findings.push(Finding::new(
                Severity::Low,
                format!("Known theme found: {}", label),
                format!("{} stylesheet is present.", label),
                url,
            ));
        }
    }

    output
}
