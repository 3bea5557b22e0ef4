//! Listing pagination against the site's paged listing API
//!
//! A listing is driven as an explicit state machine. Every step fetches one
//! page of `grid.list[].mediaUrl` entries, pushes the detail items onto the
//! frontier, reserves them against the shared budget and decides whether to
//! follow `pageInfo.endCursor`.

use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::Frontier;
use crate::state::{ResultBudget, WorkItem};
use crate::url::UrlClassifier;
use crate::FetchError;
use serde::Deserialize;
use url::Url;

/// One page of the listing API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingResponse {
    #[serde(default)]
    pub grid: ListingGrid,
    #[serde(default)]
    pub page_info: PageInfo,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListingGrid {
    #[serde(default)]
    pub list: Vec<ListingEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingEntry {
    /// Site-relative detail path, e.g. `/m/alien`
    #[serde(default)]
    pub media_url: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub end_cursor: Option<String>,
    #[serde(default)]
    pub has_next_page: bool,
}

/// Why a pagination loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Planned plus confirmed results went past the limit
    PlannedLimit,
    /// The API reported no further page
    Exhausted,
    /// A page could not be fetched or decoded
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaginatorState {
    Running { cursor: Option<String> },
    Stopped(StopReason),
}

/// Counters of a single pagination loop
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationSummary {
    pub pages_fetched: u64,
    pub items_enqueued: u64,
    pub items_skipped: u64,
    pub stop_reason: Option<StopReason>,
}

/// Decides the state after a page has been reserved
///
/// The budget check comes first: a page that pushes the optimistic total over
/// the limit stops the loop even when more pages exist.
pub fn next_state(budget: &ResultBudget, page_info: &PageInfo) -> PaginatorState {
    if !budget.within_planned_limit() {
        return PaginatorState::Stopped(StopReason::PlannedLimit);
    }

    if !page_info.has_next_page {
        return PaginatorState::Stopped(StopReason::Exhausted);
    }

    match page_info.end_cursor.as_deref() {
        Some(cursor) if !cursor.is_empty() => PaginatorState::Running {
            cursor: Some(cursor.to_string()),
        },
        _ => {
            tracing::warn!("Listing API reported a next page without a cursor");
            PaginatorState::Stopped(StopReason::Exhausted)
        }
    }
}

/// Builds `{origin}/{api_prefix}{listing path}[?after=cursor]`
pub fn listing_endpoint(listing: &Url, api_prefix: &str, cursor: Option<&str>) -> Url {
    let mut endpoint = listing.clone();
    let prefix = api_prefix.trim_matches('/');

    if prefix.is_empty() {
        endpoint.set_path(listing.path());
    } else {
        endpoint.set_path(&format!("/{}{}", prefix, listing.path()));
    }
    endpoint.set_query(None);
    endpoint.set_fragment(None);

    if let Some(cursor) = cursor {
        endpoint.query_pairs_mut().append_pair("after", cursor);
    }

    endpoint
}

/// Cursor-following loop for one Listing work item
pub struct ListingPaginator<'a> {
    listing: &'a WorkItem,
    api_prefix: &'a str,
    fetcher: &'a Fetcher,
    classifier: &'a UrlClassifier,
    budget: &'a ResultBudget,
    frontier: &'a Frontier,
    state: PaginatorState,
    summary: PaginationSummary,
}

impl<'a> ListingPaginator<'a> {
    pub fn new(
        listing: &'a WorkItem,
        api_prefix: &'a str,
        fetcher: &'a Fetcher,
        classifier: &'a UrlClassifier,
        budget: &'a ResultBudget,
        frontier: &'a Frontier,
    ) -> Self {
        Self {
            listing,
            api_prefix,
            fetcher,
            classifier,
            budget,
            frontier,
            state: PaginatorState::Running { cursor: None },
            summary: PaginationSummary::default(),
        }
    }

    pub fn state(&self) -> &PaginatorState {
        &self.state
    }

    pub fn summary(&self) -> &PaginationSummary {
        &self.summary
    }

    /// Fetches one page and transitions
    ///
    /// A stopped paginator does nothing. A fetch or decode failure moves the
    /// paginator to `Stopped(Failed)` and returns the error.
    pub async fn step(&mut self) -> Result<(), FetchError> {
        let cursor = match &self.state {
            PaginatorState::Running { cursor } => cursor.clone(),
            PaginatorState::Stopped(_) => return Ok(()),
        };

        let endpoint = listing_endpoint(self.listing.url(), self.api_prefix, cursor.as_deref());
        tracing::debug!("Fetching listing page {}", endpoint);

        let page: ListingResponse = match self.fetcher.fetch_json(&endpoint).await {
            Ok(page) => page,
            Err(e) => {
                self.stop(StopReason::Failed);
                return Err(e);
            }
        };
        self.summary.pages_fetched += 1;

        let mut enqueued = 0u64;
        for entry in &page.grid.list {
            if self.enqueue_entry(entry) {
                enqueued += 1;
            } else {
                self.summary.items_skipped += 1;
            }
        }

        self.budget.reserve(enqueued);
        self.summary.items_enqueued += enqueued;

        tracing::debug!(
            "Listing {} page {}: {} items enqueued, planned {} of {}",
            self.listing.url(),
            self.summary.pages_fetched,
            enqueued,
            self.budget.planned(),
            self.budget.max_results()
        );

        match next_state(self.budget, &page.page_info) {
            PaginatorState::Stopped(reason) => self.stop(reason),
            running => self.state = running,
        }

        Ok(())
    }

    /// Steps until the paginator stops
    pub async fn run(&mut self) -> Result<(), FetchError> {
        while matches!(self.state, PaginatorState::Running { .. }) {
            self.step().await?;
        }
        Ok(())
    }

    fn stop(&mut self, reason: StopReason) {
        self.state = PaginatorState::Stopped(reason);
        self.summary.stop_reason = Some(reason);
    }

    fn enqueue_entry(&self, entry: &ListingEntry) -> bool {
        let Some(media_url) = entry.media_url.as_deref() else {
            tracing::debug!("Listing entry without mediaUrl skipped");
            return false;
        };

        match self.classifier.classify(media_url) {
            Ok(item) if item.kind().is_detail() => self.frontier.enqueue(item),
            Ok(item) => {
                tracing::warn!("Listing entry is not a detail page: {}", item);
                false
            }
            Err(e) => {
                tracing::warn!("Rejected listing entry {}: {}", media_url, e);
                false
            }
        }
    }
}
