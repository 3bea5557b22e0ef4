//! Link harvesting for generic pages
//!
//! Generic pages (home page, news, editorial lists) are never extracted
//! themselves. They only feed the frontier with the movie and TV show pages
//! they link to.

use crate::state::WorkItem;
use crate::url::UrlClassifier;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Detail items found on one page
#[derive(Debug, Clone, Default)]
pub struct HarvestReport {
    /// Classified detail items, unique by canonical URL, in document order
    pub items: Vec<WorkItem>,

    /// Links with a detail prefix that the classifier rejected
    pub rejected: u64,
}

/// Extracts detail-page links from rendered HTML
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkHarvester;

impl LinkHarvester {
    pub fn new() -> Self {
        Self
    }

    /// Harvests the detail links of `html`
    ///
    /// # Link Rules
    ///
    /// **Include:**
    /// - `<a href>` targets on the site whose path starts with the movie or
    ///   show prefix, site-relative or fully-qualified
    ///
    /// **Exclude:**
    /// - `javascript:`, `mailto:`, `tel:` links and data URIs
    /// - Fragment-only links
    /// - Links to other hosts
    ///
    /// # Arguments
    ///
    /// * `html` - The page content
    /// * `page_url` - Final URL of the page, used to resolve relative links
    /// * `classifier` - Classifier of the configured site
    pub fn harvest(&self, html: &str, page_url: &Url, classifier: &UrlClassifier) -> HarvestReport {
        let document = Html::parse_document(html);
        let prefixes = classifier.detail_prefixes();

        let mut report = HarvestReport::default();
        let mut seen = HashSet::new();

        let Ok(anchors) = Selector::parse("a[href]") else {
            return report;
        };

        for element in document.select(&anchors) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };

            let Some(target) = resolve_link(href, page_url) else {
                continue;
            };

            if !on_site(&target, classifier.base()) {
                continue;
            }

            if !prefixes.iter().any(|prefix| target.path().starts_with(prefix.as_str())) {
                continue;
            }

            match classifier.classify(target.as_str()) {
                Ok(item) if item.kind().is_detail() => {
                    if seen.insert(item.url().clone()) {
                        report.items.push(item);
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!("Rejected harvested link {}: {}", target, e);
                    report.rejected += 1;
                }
            }
        }

        report
    }
}

/// Resolves a link href to an absolute URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, page_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let absolute = page_url.join(href).ok()?;
    match absolute.scheme() {
        "http" | "https" => Some(absolute),
        _ => None,
    }
}

fn on_site(target: &Url, base: &Url) -> bool {
    target.host_str() == base.host_str() && target.port() == base.port()
}
