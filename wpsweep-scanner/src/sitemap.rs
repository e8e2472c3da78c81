use crate::error::Result;
use serde::Serialize;
use url::Url;

pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntryKind {
    /// Another sitemap document (`.xml` suffix) to descend into.
    NestedSitemap,
    /// A content page to run form detection on.
    Page,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SitemapEntry {
    pub url: String,
    pub kind: EntryKind,
}

impl SitemapEntry {
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let kind = if url.ends_with(".xml") {
            EntryKind::NestedSitemap
        } else {
            EntryKind::Page
        };
        Self { url, kind }
    }

    pub fn is_nested_sitemap(&self) -> bool {
        self.kind == EntryKind::NestedSitemap
    }
}

/// Extract every `<loc>` in the sitemaps.org namespace, in document order.
///
/// Works for both `<urlset>` documents and `<sitemapindex>` documents.
pub fn parse_sitemap(xml: &str) -> Result<Vec<SitemapEntry>> {
    let document = roxmltree::Document::parse(xml)?;

    let entries = document
        .descendants()
        .filter(|node| node.has_tag_name((SITEMAP_NAMESPACE, "loc")))
        .filter_map(|node| node.text())
        .map(str::trim)
        .filter(|loc| !loc.is_empty())
        .map(SitemapEntry::new)
        .collect();

    Ok(entries)
}

/// [`parse_sitemap`] for a document fetched from `sitemap_url`, with relative
/// `<loc>` values resolved against it.
pub fn parse_sitemap_at(xml: &str, sitemap_url: &str) -> Result<Vec<SitemapEntry>> {
    Ok(parse_sitemap(xml)?
        .into_iter()
        .map(|entry| SitemapEntry::new(resolve_against(sitemap_url, &entry.url)))
        .collect())
}

/// Resolve a `<loc>` or `Sitemap:` value against the URL of the document it
/// was found in. Values that cannot be resolved come back unchanged.
pub fn resolve_against(base: &str, value: &str) -> String {
    match Url::parse(base).and_then(|base| base.join(value)) {
        Ok(url) => url.to_string(),
        Err(_) => value.to_string(),
    }
}

/// First `Sitemap:` directive in a robots.txt body.
pub fn find_sitemap_directive(robots: &str) -> Option<String> {
    robots.lines().find_map(|line| {
        let line = line.trim();
        let (key, value) = line.split_once(':')?;
        if !key.trim().eq_ignore_ascii_case("sitemap") {
            return None;
        }
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}

/// Every line of a robots.txt body containing a `Disallow:` directive, trimmed.
pub fn disallow_entries(robots: &str) -> Vec<String> {
    robots
        .lines()
        .map(str::trim)
        .filter(|line| line.contains("Disallow:"))
        .map(String::from)
        .collect()
}
