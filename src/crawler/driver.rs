//! Crawl driver - frontier ownership and handler dispatch
//!
//! The driver owns the queue of pending work items and the set of canonical
//! URLs already queued. Handlers run as tasks on a `JoinSet` capped at the
//! configured concurrency and report discovered work back through a
//! `Frontier` handle. The driver is the only place that deduplicates, so an
//! item reached through several pages is dispatched exactly once.

use crate::config::{Config, StartUrl};
use crate::crawler::extractor::DetailExtractor;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::Frontier;
use crate::crawler::harvester::LinkHarvester;
use crate::crawler::listing::ListingPaginator;
use crate::output::{RecordSink, RunOutcome, RunStats, RunSummary};
use crate::state::{AbortSignal, ResultBudget, TargetKind, WorkItem};
use crate::url::UrlClassifier;
use crate::CrawlError;
use chrono::Utc;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::{JoinError, JoinSet};
use url::Url;

/// Number of finished handlers between progress log lines
const PROGRESS_INTERVAL: u64 = 25;

/// What a single handler invocation did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A detail record was written to the sink
    Emitted,
    /// A listing or generic page pushed this many items to the frontier
    Enqueued(u64),
    /// Fetching, extraction or writing failed; the item is dropped
    Failed,
    /// The result budget was exhausted; nothing was emitted
    BudgetReached,
}

/// State shared by every handler of a run
pub struct CrawlContext {
    classifier: UrlClassifier,
    fetcher: Fetcher,
    extractor: DetailExtractor,
    harvester: LinkHarvester,
    budget: ResultBudget,
    abort: AbortSignal,
    sink: Arc<dyn RecordSink>,
    stats: RunStats,
    api_prefix: String,
}

impl CrawlContext {
    /// Fires the one-way run abort, logging only on the first call
    fn abort_run(&self) {
        if self.abort.trigger() {
            tracing::info!("Reached maximum number of results, stopping run.");
        }
    }
}

/// Owns the frontier and dispatches work items to their handlers
pub struct CrawlDriver {
    ctx: Arc<CrawlContext>,
    queue: VecDeque<WorkItem>,
    seen: HashSet<Url>,
    frontier: Frontier,
    discovered: UnboundedReceiver<WorkItem>,
    max_concurrent: usize,
}

impl CrawlDriver {
    /// Builds the driver and its shared context
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `sink` - Destination of extracted records
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlDriver)` - Driver with an empty frontier
    /// * `Err(CrawlError)` - Invalid site configuration or HTTP client setup failure
    pub fn new(config: &Config, sink: Arc<dyn RecordSink>) -> Result<Self, CrawlError> {
        let classifier = UrlClassifier::new(&config.site)?;
        let fetcher = Fetcher::from_config(
            &config.user_agent,
            &config.crawler,
            config.proxy.as_ref(),
        )?;

        let ctx = CrawlContext {
            classifier,
            fetcher,
            extractor: DetailExtractor::default(),
            harvester: LinkHarvester::new(),
            budget: ResultBudget::new(config.crawler.max_results),
            abort: AbortSignal::new(),
            sink,
            stats: RunStats::new(),
            api_prefix: config.site.api_prefix.clone(),
        };

        let (frontier, discovered) = Frontier::channel();

        Ok(Self {
            ctx: Arc::new(ctx),
            queue: VecDeque::new(),
            seen: HashSet::new(),
            frontier,
            discovered,
            max_concurrent: (config.crawler.max_concurrent_pages as usize).max(1),
        })
    }

    /// Work items waiting for dispatch
    pub fn queued(&self) -> impl Iterator<Item = &WorkItem> {
        self.queue.iter()
    }

    /// Classifies and queues the seed URLs
    ///
    /// Entries without a URL and URLs the classifier rejects are logged and
    /// skipped. A pre-label is only compared against the classification;
    /// the classifier decides the kind.
    ///
    /// Returns the number of seeds queued.
    pub fn seed(&mut self, start_urls: &[StartUrl]) -> usize {
        let mut queued = 0;

        for entry in start_urls {
            let Some(raw) = entry.url() else {
                tracing::warn!("Skipping start URL entry without a url");
                continue;
            };

            let item = match self.ctx.classifier.classify(raw) {
                Ok(item) => item,
                Err(e) => {
                    tracing::warn!("Rejected start URL {}: {}", raw, e);
                    self.ctx.stats.urls_rejected(1);
                    continue;
                }
            };

            if let Some(label) = entry.label() {
                match TargetKind::from_label(label) {
                    Some(kind) if kind != item.kind() => tracing::warn!(
                        "Start URL {} labeled {} but classified as {}",
                        raw,
                        kind,
                        item.kind()
                    ),
                    None => tracing::warn!("Unknown label {} on start URL {}", label, raw),
                    _ => {}
                }
            }

            if self.push(item) {
                queued += 1;
            }
        }

        tracing::info!("Seeded frontier with {} of {} start URLs", queued, start_urls.len());
        queued
    }

    /// Runs until the frontier is empty, or until the run aborts and
    /// in-flight handlers have drained
    pub async fn run(mut self) -> Result<RunSummary, CrawlError> {
        let started_at = Utc::now();
        let mut in_flight: JoinSet<DispatchOutcome> = JoinSet::new();
        let mut handled = 0u64;

        tracing::info!(
            "Starting crawl: {} queued, max {} results, {} concurrent pages",
            self.queue.len(),
            self.ctx.budget.max_results(),
            self.max_concurrent
        );

        loop {
            while let Ok(item) = self.discovered.try_recv() {
                self.push(item);
            }

            while !self.ctx.abort.is_triggered() && in_flight.len() < self.max_concurrent {
                let Some(item) = self.queue.pop_front() else {
                    break;
                };

                if item.kind().is_detail() && self.ctx.budget.reached_limit() {
                    self.queue.push_front(item);
                    self.ctx.abort_run();
                    break;
                }

                let ctx = Arc::clone(&self.ctx);
                let frontier = self.frontier.clone();
                in_flight.spawn(async move { dispatch(&ctx, &frontier, item).await });
            }

            if in_flight.is_empty() {
                break;
            }

            tokio::select! {
                Some(joined) = in_flight.join_next() => {
                    handled += 1;
                    self.handle_joined(joined);

                    if handled % PROGRESS_INTERVAL == 0 {
                        tracing::info!(
                            "Progress: {} handled, {} queued, {} in flight, {} records",
                            handled,
                            self.queue.len(),
                            in_flight.len(),
                            self.ctx.stats.records_emitted()
                        );
                    }
                }
                Some(item) = self.discovered.recv() => {
                    self.push(item);
                }
                else => break,
            }
        }

        while let Ok(item) = self.discovered.try_recv() {
            self.push(item);
        }

        let outcome = if self.ctx.abort.is_triggered() {
            RunOutcome::BudgetReached
        } else {
            RunOutcome::Completed
        };

        let summary = self.ctx.stats.summarize(
            started_at,
            outcome,
            self.ctx.budget.max_results(),
            self.ctx.budget.planned(),
            self.queue.len() as u64,
        );

        tracing::info!(
            "Crawl finished ({:?}): {} records emitted, {} left in frontier",
            summary.outcome,
            summary.records_emitted,
            summary.left_in_frontier
        );

        Ok(summary)
    }

    /// Queues an item unless its canonical URL was queued before
    fn push(&mut self, item: WorkItem) -> bool {
        if self.seen.insert(item.url().clone()) {
            tracing::trace!("Queued {}", item);
            self.queue.push_back(item);
            true
        } else {
            tracing::trace!("Duplicate {}", item);
            self.ctx.stats.duplicate_skipped();
            false
        }
    }

    fn handle_joined(&self, joined: Result<DispatchOutcome, JoinError>) {
        match joined {
            Ok(outcome) => tracing::trace!("Handler finished: {:?}", outcome),
            Err(e) => tracing::error!("Handler task failed: {}", e),
        }
    }
}

/// Routes a work item to its handler
pub async fn dispatch(ctx: &CrawlContext, frontier: &Frontier, item: WorkItem) -> DispatchOutcome {
    tracing::debug!("Dispatching {} (render: {})", item, !item.skip_render());

    match item.kind() {
        TargetKind::Movie | TargetKind::TvShow => handle_detail(ctx, &item).await,
        TargetKind::Listing => handle_listing(ctx, frontier, &item).await,
        TargetKind::Generic => handle_generic(ctx, frontier, &item).await,
    }
}

/// Fetches and extracts a detail page, then claims a result slot
///
/// The claim happens after extraction, so a page that was in flight when
/// the limit was reached is fetched but its record is discarded.
async fn handle_detail(ctx: &CrawlContext, item: &WorkItem) -> DispatchOutcome {
    if ctx.budget.reached_limit() {
        ctx.abort_run();
        return DispatchOutcome::BudgetReached;
    }

    let page = match ctx.fetcher.fetch_html(item.url()).await {
        Ok(page) => page,
        Err(e) => {
            tracing::warn!("Failed to fetch {}: {}", item.url(), e);
            ctx.stats.detail_failed();
            return DispatchOutcome::Failed;
        }
    };

    let Some(record) = ctx.extractor.extract(item.kind(), &page.body, &page.final_url) else {
        ctx.stats.detail_failed();
        return DispatchOutcome::Failed;
    };

    if !ctx.budget.try_record_confirmed() {
        tracing::debug!("Discarding {}, result limit reached", item.url());
        ctx.abort_run();
        return DispatchOutcome::BudgetReached;
    }

    if let Err(e) = ctx.sink.write(item.kind(), &record) {
        tracing::warn!("Failed to write record for {}: {}", item.url(), e);
        ctx.stats.detail_failed();
        return DispatchOutcome::Failed;
    }
    ctx.stats.record_emitted();

    let noun = match item.kind() {
        TargetKind::TvShow => "TV show",
        _ => "movie",
    };
    tracing::info!("Scraped {}: {} ({})", noun, record.display_title(), page.final_url);

    DispatchOutcome::Emitted
}

/// Drives the listing API for a listing item; the listing page itself is
/// never fetched
async fn handle_listing(ctx: &CrawlContext, frontier: &Frontier, item: &WorkItem) -> DispatchOutcome {
    let mut paginator = ListingPaginator::new(
        item,
        &ctx.api_prefix,
        &ctx.fetcher,
        &ctx.classifier,
        &ctx.budget,
        frontier,
    );

    let result = paginator.run().await;
    let summary = paginator.summary().clone();

    ctx.stats.listing_pages_fetched(summary.pages_fetched);
    ctx.stats.urls_rejected(summary.items_skipped);

    match result {
        Ok(()) => {
            tracing::info!(
                "Enqueued links to {} browsed movies/TV shows from {} ({} pages, {:?})",
                summary.items_enqueued,
                item.url(),
                summary.pages_fetched,
                summary.stop_reason
            );
            DispatchOutcome::Enqueued(summary.items_enqueued)
        }
        Err(e) => {
            tracing::warn!(
                "Listing {} stopped after {} pages: {}",
                item.url(),
                summary.pages_fetched,
                e
            );
            ctx.stats.listing_failed();
            DispatchOutcome::Failed
        }
    }
}

/// Fetches a generic page and enqueues the detail pages it links to
async fn handle_generic(ctx: &CrawlContext, frontier: &Frontier, item: &WorkItem) -> DispatchOutcome {
    let page = match ctx.fetcher.fetch_html(item.url()).await {
        Ok(page) => page,
        Err(e) => {
            tracing::warn!("Failed to fetch {}: {}", item.url(), e);
            ctx.stats.generic_failed();
            return DispatchOutcome::Failed;
        }
    };

    let report = ctx.harvester.harvest(&page.body, &page.final_url, &ctx.classifier);
    ctx.stats.urls_rejected(report.rejected);

    let mut enqueued = 0u64;
    for found in report.items {
        if frontier.enqueue(found) {
            enqueued += 1;
        }
    }
    ctx.stats.links_harvested(enqueued);

    tracing::info!(
        "Enqueued {} links for movies/TV shows from {}",
        enqueued,
        page.final_url
    );
    DispatchOutcome::Enqueued(enqueued)
}
