//! Work item definitions for the crawl frontier
//!
//! A `WorkItem` is created by the URL classifier and dispatched exactly once by
//! the crawl driver.

use std::fmt;
use url::Url;

/// The kind of page a work item points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// Movie detail page (`/m/{slug}`)
    Movie,

    /// TV show detail page (`/tv/{slug}`)
    TvShow,

    /// Browse listing, driven through the paginated listing API
    Listing,

    /// Any other page on the site, scanned for detail links
    Generic,
}

impl TargetKind {
    /// Returns true if this kind produces an output record
    pub fn is_detail(&self) -> bool {
        matches!(self, Self::Movie | Self::TvShow)
    }

    /// Returns the label used in seed input, logs and the dataset
    pub fn label(&self) -> &'static str {
        match self {
            Self::Movie => "MOVIE",
            Self::TvShow => "TV",
            Self::Listing => "BROWSE",
            Self::Generic => "OTHER",
        }
    }

    /// Parses a label (case-insensitive)
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "MOVIE" => Some(Self::Movie),
            "TV" => Some(Self::TvShow),
            "BROWSE" => Some(Self::Listing),
            "OTHER" => Some(Self::Generic),
            _ => None,
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A classified, canonical unit of crawl work
///
/// Immutable once created: fields are only readable through accessors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkItem {
    url: Url,
    kind: TargetKind,
    skip_render: bool,
}

impl WorkItem {
    /// Creates a work item. Listing items never need their HTML rendered.
    pub fn new(url: Url, kind: TargetKind) -> Self {
        Self {
            url,
            kind,
            skip_render: kind == TargetKind::Listing,
        }
    }

    /// The canonical absolute URL
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// What kind of page this is
    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    /// True when the page itself is not fetched (listings go through the API)
    pub fn skip_render(&self) -> bool {
        self.skip_render
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.url)
    }
}
