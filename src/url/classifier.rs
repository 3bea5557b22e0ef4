//! URL classification
//!
//! Maps a raw URL into a `WorkItem`: what kind of page it is, plus the
//! canonical URL the crawl frontier deduplicates on.

use crate::config::SiteConfig;
use crate::state::{TargetKind, WorkItem};
use crate::url::normalize::{normalize_path, normalize_url, path_segments};
use crate::{ConfigError, UrlError};
use url::{ParseError, Url};

/// Classifies URLs of one target site
///
/// # Rules
///
/// | First path segment | Kind    | Canonical URL                      |
/// |--------------------|---------|------------------------------------|
/// | movie segment      | Movie   | `{site}/{segment1}/{segment2}`     |
/// | show segment       | TvShow  | `{site}/{segment1}/{segment2}`     |
/// | browse segment     | Listing | `{site}{full path}`, no query      |
/// | anything else      | Generic | normalized URL                     |
///
/// URLs on another host, with a non-HTTP scheme, or detail URLs with fewer
/// than two path segments are rejected.
#[derive(Debug, Clone)]
pub struct UrlClassifier {
    base: Url,
    movie_segment: String,
    show_segment: String,
    browse_segment: String,
}

impl UrlClassifier {
    /// Builds a classifier for the configured site
    pub fn new(site: &SiteConfig) -> Result<Self, ConfigError> {
        let base = Url::parse(&site.base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

        if base.host_str().is_none() {
            return Err(ConfigError::InvalidUrl(format!(
                "base-url '{}' has no host",
                site.base_url
            )));
        }

        Ok(Self {
            base,
            movie_segment: site.movie_segment.clone(),
            show_segment: site.show_segment.clone(),
            browse_segment: site.browse_segment.clone(),
        })
    }

    /// The site base URL (scheme, host and port)
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Path prefixes of detail pages, e.g. `["/m/", "/tv/"]`
    pub fn detail_prefixes(&self) -> [String; 2] {
        [
            format!("/{}/", self.movie_segment),
            format!("/{}/", self.show_segment),
        ]
    }

    /// Classifies an absolute or site-relative URL
    ///
    /// # Examples
    ///
    /// ```
    /// use tomato_harvest::config::SiteConfig;
    /// use tomato_harvest::url::UrlClassifier;
    /// use tomato_harvest::TargetKind;
    ///
    /// let classifier = UrlClassifier::new(&SiteConfig::default()).unwrap();
    /// let item = classifier
    ///     .classify("https://www.rottentomatoes.com/tv/show-x/episodes")
    ///     .unwrap();
    /// assert_eq!(item.kind(), TargetKind::TvShow);
    /// assert_eq!(item.url().as_str(), "https://www.rottentomatoes.com/tv/show-x");
    /// ```
    pub fn classify(&self, raw: &str) -> Result<WorkItem, UrlError> {
        let url = self.resolve(raw)?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(UrlError::InvalidScheme(url.scheme().to_string()));
        }

        if !self.is_site_url(&url) {
            return Err(UrlError::ForeignHost {
                url: url.to_string(),
                expected: self.site_origin(),
            });
        }

        let segments = path_segments(url.path());
        let kind = match segments.first() {
            Some(first) if *first == self.movie_segment => TargetKind::Movie,
            Some(first) if *first == self.show_segment => TargetKind::TvShow,
            Some(first) if *first == self.browse_segment => TargetKind::Listing,
            _ => TargetKind::Generic,
        };

        let canonical = match kind {
            TargetKind::Movie | TargetKind::TvShow => {
                if segments.len() < 2 {
                    return Err(UrlError::MalformedDetailPath(url.to_string()));
                }
                self.site_url(&format!("/{}/{}", segments[0], segments[1]))?
            }
            TargetKind::Listing => self.site_url(&normalize_path(url.path()))?,
            TargetKind::Generic => {
                let normalized = normalize_url(&url);
                let mut canonical = self.site_url(normalized.path())?;
                canonical.set_query(normalized.query());
                canonical
            }
        };

        Ok(WorkItem::new(canonical, kind))
    }

    /// Parses `raw`, resolving site-relative input against the base URL
    fn resolve(&self, raw: &str) -> Result<Url, UrlError> {
        let raw = raw.trim();
        match Url::parse(raw) {
            Ok(url) => Ok(url),
            Err(ParseError::RelativeUrlWithoutBase) => self
                .base
                .join(raw)
                .map_err(|e| UrlError::Parse(format!("{}: {}", raw, e))),
            Err(e) => Err(UrlError::Parse(format!("{}: {}", raw, e))),
        }
    }

    /// Host and explicit port must match the configured site; the scheme may differ
    fn is_site_url(&self, url: &Url) -> bool {
        url.host_str() == self.base.host_str() && url.port() == self.base.port()
    }

    /// Builds `{site}{path}` with the site's own scheme
    fn site_url(&self, path: &str) -> Result<Url, UrlError> {
        self.base
            .join(path)
            .map_err(|e| UrlError::Parse(format!("{}: {}", path, e)))
    }

    fn site_origin(&self) -> String {
        self.base.origin().ascii_serialization()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SITE: &str = "https://www.rottentomatoes.com";

    fn classifier() -> UrlClassifier {
        UrlClassifier::new(&SiteConfig::default()).unwrap()
    }

    #[test]
    fn test_movie_url() {
        let item = classifier().classify(&format!("{}/m/the_matrix", SITE)).unwrap();
        assert_eq!(item.kind(), TargetKind::Movie);
        assert_eq!(item.url().as_str(), format!("{}/m/the_matrix", SITE));
        assert!(!item.skip_render());
    }

    #[test]
    fn test_show_sub_page_collapses_to_show() {
        let item = classifier()
            .classify(&format!("{}/tv/show-x/episodes", SITE))
            .unwrap();
        assert_eq!(item.kind(), TargetKind::TvShow);
        assert_eq!(item.url().as_str(), format!("{}/tv/show-x", SITE));
    }

    #[test]
    fn test_surface_variants_are_identical() {
        let c = classifier();
        let base = c.classify(&format!("{}/m/x", SITE)).unwrap();
        for variant in [
            format!("{}/m/x/cast", SITE),
            format!("{}/m/x?utm_source=feed", SITE),
            format!("{}/m/x/reviews?type=top_critics#list", SITE),
            format!("{}/m/x/", SITE),
            "/m/x/pictures".to_string(),
            "http://www.rottentomatoes.com/m/x".to_string(),
        ] {
            assert_eq!(c.classify(&variant).unwrap(), base, "variant {}", variant);
        }
    }

    #[test]
    fn test_canonicalization_is_idempotent() {
        let c = classifier();
        for raw in [
            format!("{}/m/the_matrix/reviews", SITE),
            format!("{}/tv/severance/s01", SITE),
            format!("{}/browse/movies_at_home/genres:horror?page=2", SITE),
            format!("{}/celebrity/keanu_reeves?b=1&a=2#bio", SITE),
        ] {
            let first = c.classify(&raw).unwrap();
            let second = c.classify(first.url().as_str()).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_listing_keeps_filter_path() {
        let item = classifier()
            .classify(&format!(
                "{}/browse/movies_at_home/affiliates:netflix~genres:comedy/?page=3",
                SITE
            ))
            .unwrap();
        assert_eq!(item.kind(), TargetKind::Listing);
        assert!(item.skip_render());
        assert_eq!(
            item.url().as_str(),
            format!("{}/browse/movies_at_home/affiliates:netflix~genres:comedy", SITE)
        );
    }

    #[test]
    fn test_generic_page() {
        let item = classifier().classify(&format!("{}/", SITE)).unwrap();
        assert_eq!(item.kind(), TargetKind::Generic);
        assert_eq!(item.url().as_str(), format!("{}/", SITE));

        let item = classifier()
            .classify(&format!("{}/news/guide#section", SITE))
            .unwrap();
        assert_eq!(item.kind(), TargetKind::Generic);
        assert_eq!(item.url().as_str(), format!("{}/news/guide", SITE));
    }

    #[test]
    fn test_generic_page_takes_site_scheme() {
        let c = classifier();
        let secure = c
            .classify(&format!("{}/news/guide?b=1&utm_source=x", SITE))
            .unwrap();
        let plain = c
            .classify("http://www.rottentomatoes.com/news/guide?b=1#top")
            .unwrap();

        assert_eq!(plain, secure);
        assert_eq!(secure.kind(), TargetKind::Generic);
        assert_eq!(secure.url().as_str(), format!("{}/news/guide?b=1", SITE));

        let again = c.classify(plain.url().as_str()).unwrap();
        assert_eq!(again, plain);
    }

    #[test]
    fn test_foreign_host_rejected() {
        let result = classifier().classify("https://evil.example/m/x");
        assert!(matches!(result, Err(UrlError::ForeignHost { .. })));
    }

    #[test]
    fn test_bare_domain_without_www_rejected() {
        let result = classifier().classify("https://rottentomatoes.com/m/x");
        assert!(matches!(result, Err(UrlError::ForeignHost { .. })));
    }

    #[test]
    fn test_short_detail_path_rejected() {
        let c = classifier();
        assert_eq!(
            c.classify(&format!("{}/m/", SITE)),
            Err(UrlError::MalformedDetailPath(format!("{}/m/", SITE)))
        );
        assert!(matches!(
            c.classify("/tv"),
            Err(UrlError::MalformedDetailPath(_))
        ));
    }

    #[test]
    fn test_invalid_scheme_rejected() {
        let result = classifier().classify("ftp://www.rottentomatoes.com/m/x");
        assert!(matches!(result, Err(UrlError::InvalidScheme(_))));
    }

    #[test]
    fn test_unparseable_url_rejected() {
        let result = classifier().classify("https://");
        assert!(matches!(result, Err(UrlError::Parse(_))));
    }

    #[test]
    fn test_relative_url_resolved_against_site() {
        let item = classifier().classify("/tv/the_bear/s02/e01").unwrap();
        assert_eq!(item.kind(), TargetKind::TvShow);
        assert_eq!(item.url().as_str(), format!("{}/tv/the_bear", SITE));
    }

    #[test]
    fn test_segment_prefix_is_not_a_match() {
        // "/movies/..." must not be mistaken for the "/m/..." segment
        let item = classifier().classify("/movies/in_theaters").unwrap();
        assert_eq!(item.kind(), TargetKind::Generic);
    }

    #[test]
    fn test_port_must_match() {
        let site = SiteConfig {
            base_url: "http://127.0.0.1:8080".to_string(),
            ..SiteConfig::default()
        };
        let c = UrlClassifier::new(&site).unwrap();

        assert!(c.classify("http://127.0.0.1:8080/m/x").is_ok());
        assert!(matches!(
            c.classify("http://127.0.0.1:9090/m/x"),
            Err(UrlError::ForeignHost { .. })
        ));
    }

    #[test]
    fn test_detail_prefixes() {
        assert_eq!(
            classifier().detail_prefixes(),
            ["/m/".to_string(), "/tv/".to_string()]
        );
    }
}
