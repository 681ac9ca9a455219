//! Crawl controller - main orchestration loop
//!
//! The controller owns the whole crawl lifecycle as an explicit state
//! machine: SEEDING refills an empty frontier from catalog listing pages,
//! DRAINING pops batches and extracts titles, EXPANDING follows the review
//! graph outward under a frontier-size bound, and the run TERMINATES when
//! the processed target is met or the catalog is exhausted. One fetch is in
//! flight at a time; a cooperative stop flag is honored between records.

use crate::config::Config;
use crate::extract::{extract_listing, extract_reviewer_history, extract_reviewers, extract_title};
use crate::fetch::Fetch;
use crate::store::{FrontierItem, ReviewRecord, SqliteStore, Store};
use crate::{Result, ShelfmapError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A slug abandoned by a load failure is requeued at most this many times.
const MAX_REQUEUES: u32 = 1;

/// Knobs for one crawl run
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Stop after this many titles have been processed
    pub target: u64,

    /// Frontier entries drained per batch
    pub batch_size: usize,

    /// Frontier size at which expansion stops pushing; 0 disables expansion
    pub max_frontier_size: u64,
}

/// What a finished run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlOutcome {
    /// Titles fetched, extracted, and persisted
    pub processed: u64,

    /// Slugs dropped after exhausting their requeue budget
    pub abandoned: u64,

    /// Whether the run ended on the cooperative stop flag
    pub stopped: bool,
}

/// Crawl phases, made explicit for logging and review
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Seeding,
    Draining,
    Expanding,
    Terminated,
}

/// Main crawl controller
pub struct Controller<F: Fetch> {
    config: Config,
    store: SqliteStore,
    fetcher: F,
    stop: Arc<AtomicBool>,
    listing_cursor: u64,
}

impl<F: Fetch> Controller<F> {
    pub fn new(config: Config, store: SqliteStore, fetcher: F) -> Self {
        Self {
            config,
            store,
            fetcher,
            stop: Arc::new(AtomicBool::new(false)),
            listing_cursor: 0,
        }
    }

    /// Flag that requests a cooperative stop between records
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Gives the store back when the controller is done
    pub fn into_store(self) -> SqliteStore {
        self.store
    }

    /// Runs the full SEEDING / DRAINING / EXPANDING loop
    ///
    /// Terminates when `target` titles are processed, the catalog runs out
    /// of listing pages, or the stop flag is raised. Listing-page load
    /// failures are fatal; everything else is contained per record.
    pub async fn run(&mut self, opts: &CrawlOptions) -> Result<CrawlOutcome> {
        tracing::info!(
            "Starting crawl: target={}, batch-size={}, max-frontier={}",
            opts.target,
            opts.batch_size,
            opts.max_frontier_size
        );

        let mut outcome = CrawlOutcome::default();

        'crawl: while outcome.processed < opts.target {
            if self.stop.load(Ordering::Relaxed) {
                outcome.stopped = true;
                break;
            }

            if self.store.frontier_len()? == 0 {
                tracing::debug!("Phase: {:?}", Phase::Seeding);
                let discovered = self.seed().await?;
                if discovered == 0 {
                    tracing::info!(
                        "Listing page {} yielded no candidates, catalog exhausted",
                        self.listing_cursor
                    );
                    break;
                }
                continue;
            }

            tracing::debug!("Phase: {:?}", Phase::Draining);
            let remaining = (opts.target - outcome.processed) as usize;
            let batch = self
                .store
                .pop_frontier_batch(remaining.min(opts.batch_size))?;

            let mut batch = batch.into_iter();
            while let Some(item) = batch.next() {
                if self.stop.load(Ordering::Relaxed) {
                    // Put the unprocessed tail back so nothing is lost.
                    self.store.requeue_frontier(&item.slug, item.attempts)?;
                    for rest in batch.by_ref() {
                        self.store.requeue_frontier(&rest.slug, rest.attempts)?;
                    }
                    outcome.stopped = true;
                    break 'crawl;
                }

                self.handle_item(&item, Some(opts.max_frontier_size), &mut outcome)
                    .await?;

                if outcome.processed > 0 && outcome.processed % 10 == 0 {
                    tracing::info!(
                        "Progress: {} processed, {} in frontier, {} reviews stored",
                        outcome.processed,
                        self.store.frontier_len()?,
                        self.store.count_reviews()?
                    );
                }
            }
        }

        tracing::info!(
            "Phase: {:?} - {} processed, {} abandoned",
            Phase::Terminated,
            outcome.processed,
            outcome.abandoned
        );
        Ok(outcome)
    }

    /// Drain-only mode: empties the existing frontier, no seeding and no
    /// expansion, and terminates when the frontier is exhausted
    pub async fn drain(&mut self, batch_size: usize) -> Result<CrawlOutcome> {
        tracing::info!("Draining frontier, batch-size={}", batch_size);
        let mut outcome = CrawlOutcome::default();

        loop {
            let batch = self.store.pop_frontier_batch(batch_size)?;
            if batch.is_empty() {
                break;
            }

            let mut batch = batch.into_iter();
            while let Some(item) = batch.next() {
                if self.stop.load(Ordering::Relaxed) {
                    self.store.requeue_frontier(&item.slug, item.attempts)?;
                    for rest in batch.by_ref() {
                        self.store.requeue_frontier(&rest.slug, rest.attempts)?;
                    }
                    outcome.stopped = true;
                    return Ok(outcome);
                }

                self.handle_item(&item, None, &mut outcome).await?;
            }
        }

        tracing::info!(
            "Frontier drained: {} processed, {} abandoned",
            outcome.processed,
            outcome.abandoned
        );
        Ok(outcome)
    }

    /// Processes one frontier entry: dedup gate, fetch, extract, persist,
    /// then expansion when enabled and the backpressure bound allows
    async fn handle_item(
        &mut self,
        item: &FrontierItem,
        expand_below: Option<u64>,
        outcome: &mut CrawlOutcome,
    ) -> Result<()> {
        if self.store.title_exists(&item.slug)? {
            tracing::debug!("Skipping {}, already stored", item.slug);
            return Ok(());
        }

        let url = self.config.site.title_url(&item.slug);
        match self.fetcher.load(&url).await {
            Ok(doc) => {
                let record = extract_title(&doc, &item.slug);
                drop(doc);
                self.store.upsert_title(&record)?;
                outcome.processed += 1;
                tracing::info!(
                    "Stored {} ({} of 9 fields missing)",
                    item.slug,
                    record.missing_fields().len()
                );

                if let Some(max_frontier) = expand_below {
                    if self.store.frontier_len()? >= max_frontier {
                        tracing::debug!(
                            "Backpressure: frontier at {}, skipping expansion of {}",
                            self.store.frontier_len()?,
                            item.slug
                        );
                    } else {
                        tracing::debug!("Phase: {:?}", Phase::Expanding);
                        if let Err(e) = self.expand(&item.slug, max_frontier).await {
                            tracing::warn!("Expansion of {} failed: {}", item.slug, e);
                        }
                    }
                }
            }
            Err(e) => {
                if !e.is_gone() && item.attempts < MAX_REQUEUES {
                    tracing::warn!("Failed to load {}: {}, requeueing once", item.slug, e);
                    self.store
                        .requeue_frontier(&item.slug, item.attempts + 1)?;
                } else {
                    tracing::warn!("Failed to load {}: {}, abandoning", item.slug, e);
                    outcome.abandoned += 1;
                }
            }
        }

        self.pause().await;
        Ok(())
    }

    /// SEEDING: fetches the next listing page and pushes its candidates
    ///
    /// Returns the number of candidate slugs the page yielded. A load
    /// failure here is fatal to the run.
    async fn seed(&mut self) -> Result<usize> {
        self.listing_cursor += 1;
        let url = self.config.site.listing_url(self.listing_cursor);
        tracing::info!("Seeding from listing page {}", self.listing_cursor);

        let slugs = {
            let doc = self
                .fetcher
                .load(&url)
                .await
                .map_err(|e| ShelfmapError::SeedPage {
                    page: self.listing_cursor,
                    source: e,
                })?;
            extract_listing(&doc)
        };

        let mut pushed = 0;
        for slug in &slugs {
            if self.store.push_frontier(slug)? {
                pushed += 1;
            }
        }
        tracing::info!(
            "Listing page {}: {} candidates, {} new",
            self.listing_cursor,
            slugs.len(),
            pushed
        );

        self.pause().await;
        Ok(slugs.len())
    }

    /// EXPANDING: follows the review graph out of one processed title
    ///
    /// Loads the title's review listing, then each reviewer's history;
    /// every review is ingested (fingerprint-deduped) and referenced slugs
    /// not yet stored are pushed. The frontier bound is re-checked before
    /// each reviewer and before each push, so expansion throttles smoothly
    /// instead of overshooting by whole reviewer histories.
    async fn expand(&mut self, slug: &str, max_frontier: u64) -> Result<()> {
        let reviewers = {
            let doc = self
                .fetcher
                .load(&self.config.site.reviews_url(slug))
                .await?;
            extract_reviewers(&doc)
        };
        tracing::debug!("{}: {} reviewers to expand", slug, reviewers.len());
        self.pause().await;

        for handle in reviewers {
            if self.store.frontier_len()? >= max_frontier {
                tracing::debug!(
                    "Backpressure: frontier full, aborting expansion of {} at reviewer {}",
                    slug,
                    handle
                );
                break;
            }

            let url = self.config.site.reviewer_url(&handle);
            let entries = match self.fetcher.load(&url).await {
                Ok(doc) => extract_reviewer_history(&doc),
                Err(e) => {
                    tracing::warn!("Failed to load reviewer {}: {}", handle, e);
                    self.pause().await;
                    continue;
                }
            };

            for entry in entries {
                let review =
                    ReviewRecord::new(&handle, &entry.title_slug, entry.rating, &entry.body);
                self.store.insert_review(&review)?;

                if self.store.frontier_len()? < max_frontier
                    && !self.store.title_exists(&entry.title_slug)?
                {
                    self.store.push_frontier(&entry.title_slug)?;
                }
            }

            self.pause().await;
        }

        Ok(())
    }

    /// Fixed inter-record delay
    async fn pause(&self) {
        tokio::time::sleep(Duration::from_millis(self.config.crawler.request_delay_ms)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CrawlerConfig, OutputConfig, SiteConfig, UserAgentConfig};
    use crate::fetch::{Document, FetchError, FetchResult};
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Serves canned HTML per URL; unknown URLs are 404s.
    struct StubFetcher {
        pages: HashMap<String, String>,
    }

    impl StubFetcher {
        fn new() -> Self {
            Self {
                pages: HashMap::new(),
            }
        }

        fn page(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(url.to_string(), html.to_string());
            self
        }
    }

    #[async_trait]
    impl Fetch for StubFetcher {
        async fn load(&self, url: &str) -> FetchResult<Document> {
            match self.pages.get(url) {
                Some(html) => Ok(Document::parse(html, url)),
                None => Err(FetchError::Http {
                    url: url.to_string(),
                    status: 404,
                }),
            }
        }
    }

    fn test_config() -> Config {
        Config {
            site: SiteConfig {
                base_url: "https://cat.test".to_string(),
                listing_path: "/titles?page={}".to_string(),
                title_path: "/title/{}".to_string(),
                reviews_path: "/title/{}/reviews".to_string(),
                reviewer_path: "/reviewer/{}/reviews".to_string(),
            },
            crawler: CrawlerConfig {
                batch_size: 10,
                max_frontier_size: 100,
                request_delay_ms: 100,
                page_load_timeout_ms: 5000,
            },
            user_agent: UserAgentConfig {
                crawler_name: "shelfmap-test".to_string(),
                crawler_version: "0.0".to_string(),
                contact_url: "https://example.com/bot".to_string(),
                contact_email: "ops@example.com".to_string(),
            },
            output: OutputConfig {
                database_path: ":memory:".to_string(),
            },
        }
    }

    fn opts(target: u64, max_frontier: u64) -> CrawlOptions {
        CrawlOptions {
            target,
            batch_size: 10,
            max_frontier_size: max_frontier,
        }
    }

    fn title_page(name: &str) -> String {
        format!(
            r#"<html><body>
            <h1 class="title-name">{}</h1>
            <span class="release-year">1965</span>
            <div class="rating-summary">
                <span class="score">4.3</span><span class="ratings-count">100</span>
            </div>
            <div class="synopsis">Words.</div>
            </body></html>"#,
            name
        )
    }

    fn controller(fetcher: StubFetcher) -> Controller<StubFetcher> {
        let mut config = test_config();
        config.crawler.request_delay_ms = 0;
        let store = SqliteStore::new_in_memory().unwrap();
        Controller::new(config, store, fetcher)
    }

    #[tokio::test]
    async fn test_seeded_single_target_run() {
        // Empty store, empty frontier: SEEDING reads listing page 1,
        // DRAINING processes the first title, loop terminates at target 1.
        let fetcher = StubFetcher::new()
            .page(
                "https://cat.test/titles?page=1",
                r#"<div class="catalog-row"><a class="title-link" href="/title/dune-1965">D</a></div>
                   <div class="catalog-row"><a class="title-link" href="/title/hyperion-1989">H</a></div>"#,
            )
            .page("https://cat.test/title/hyperion-1989", &title_page("Hyperion"))
            .page("https://cat.test/title/dune-1965", &title_page("Dune"));

        let mut controller = controller(fetcher);
        let outcome = controller.run(&opts(1, 0)).await.unwrap();

        assert_eq!(outcome.processed, 1);
        assert!(!outcome.stopped);

        let store = controller.into_store();
        // LIFO: hyperion was pushed last, so it was processed first.
        assert!(store.title_exists("hyperion-1989").unwrap());
        assert!(!store.title_exists("dune-1965").unwrap());
        assert_eq!(store.frontier_len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_dedup_gate_skips_stored_titles() {
        let fetcher = StubFetcher::new().page(
            "https://cat.test/title/fresh",
            &title_page("Fresh"),
        );

        let mut controller = controller(fetcher);
        controller
            .store
            .upsert_title(&crate::store::TitleRecord {
                slug: "known".to_string(),
                ..Default::default()
            })
            .unwrap();
        controller.store.push_frontier("known").unwrap();
        controller.store.push_frontier("fresh").unwrap();

        let outcome = controller.drain(10).await.unwrap();

        // "known" was popped but never re-fetched.
        assert_eq!(outcome.processed, 1);
        assert_eq!(outcome.abandoned, 0);
    }

    #[tokio::test]
    async fn test_expansion_follows_review_graph() {
        let fetcher = StubFetcher::new()
            .page("https://cat.test/title/dune-1965", &title_page("Dune"))
            .page(
                "https://cat.test/title/dune-1965/reviews",
                r#"<div class="review"><span class="reviewer">
                   <a class="handle" href="/reviewer/sand-reader/reviews">SR</a></span></div>"#,
            )
            .page(
                "https://cat.test/reviewer/sand-reader/reviews",
                r#"<div class="review-history">
                   <div class="review-card">
                       <a class="title-link" href="/title/hyperion-1989">H</a>
                       <span class="rating-value">5</span>
                       <p class="review-body">Great.</p>
                   </div></div>"#,
            );

        let mut controller = controller(fetcher);
        controller.store.push_frontier("dune-1965").unwrap();

        let outcome = controller.run(&opts(1, 100)).await.unwrap();
        assert_eq!(outcome.processed, 1);

        let mut store = controller.into_store();
        assert_eq!(store.count_reviews().unwrap(), 1);
        // The referenced slug was discovered and queued.
        let batch = store.pop_frontier_batch(10).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].slug, "hyperion-1989");
    }

    #[tokio::test]
    async fn test_zero_max_frontier_pushes_nothing() {
        let fetcher = StubFetcher::new()
            .page("https://cat.test/title/dune-1965", &title_page("Dune"))
            .page(
                "https://cat.test/title/dune-1965/reviews",
                r#"<div class="review"><span class="reviewer">
                   <a class="handle" href="/reviewer/sand-reader/reviews">SR</a></span></div>"#,
            )
            .page(
                "https://cat.test/reviewer/sand-reader/reviews",
                r#"<div class="review-history"><div class="review-card">
                   <a class="title-link" href="/title/hyperion-1989">H</a>
                   <p class="review-body">Great.</p></div></div>"#,
            );

        let mut controller = controller(fetcher);
        controller.store.push_frontier("dune-1965").unwrap();

        controller.run(&opts(1, 0)).await.unwrap();

        let store = controller.into_store();
        assert_eq!(store.frontier_len().unwrap(), 0);
        // Expansion was skipped entirely, so no reviews were ingested either.
        assert_eq!(store.count_reviews().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_load_failure_requeues_once_then_abandons() {
        // No pages at all: every title fetch 404s. 404 is permanent, so the
        // slug is abandoned without a requeue.
        let mut controller = controller(StubFetcher::new());
        controller.store.push_frontier("ghost").unwrap();

        let outcome = controller.drain(10).await.unwrap();
        assert_eq!(outcome.processed, 0);
        assert_eq!(outcome.abandoned, 1);
        assert_eq!(controller.store.frontier_len().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_transient_failure_requeues_once() {
        struct FlakyFetcher;

        #[async_trait]
        impl Fetch for FlakyFetcher {
            async fn load(&self, url: &str) -> FetchResult<Document> {
                Err(FetchError::Timeout {
                    url: url.to_string(),
                })
            }
        }

        let mut config = test_config();
        config.crawler.request_delay_ms = 0;
        let store = SqliteStore::new_in_memory().unwrap();
        let mut controller = Controller::new(config, store, FlakyFetcher);
        controller.store.push_frontier("flaky").unwrap();

        let outcome = controller.drain(10).await.unwrap();

        // First pop requeued it, second pop exhausted the budget.
        assert_eq!(outcome.abandoned, 1);
        assert_eq!(controller.store.frontier_len().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_seed_page_failure_is_fatal() {
        // Frontier empty and the listing page 404s.
        let mut controller = controller(StubFetcher::new());
        let result = controller.run(&opts(1, 0)).await;

        assert!(matches!(result, Err(ShelfmapError::SeedPage { page: 1, .. })));
    }

    #[tokio::test]
    async fn test_exhausted_catalog_terminates_run() {
        // Listing page 1 has one row whose title page is missing, page 2 is
        // empty; nothing ever processes and the run must still terminate.
        let fetcher = StubFetcher::new()
            .page(
                "https://cat.test/titles?page=1",
                r#"<div class="catalog-row"><a class="title-link" href="/title/gone">G</a></div>"#,
            )
            .page("https://cat.test/titles?page=2", "<html><body></body></html>");

        let mut controller = controller(fetcher);
        let outcome = controller.run(&opts(5, 0)).await.unwrap();

        assert_eq!(outcome.processed, 0);
        assert_eq!(outcome.abandoned, 1);
    }

    #[tokio::test]
    async fn test_stop_flag_requeues_unprocessed_tail() {
        let fetcher = StubFetcher::new();
        let mut controller = controller(fetcher);
        controller.store.push_frontier("a").unwrap();
        controller.store.push_frontier("b").unwrap();

        controller.stop_handle().store(true, Ordering::Relaxed);
        let outcome = controller.drain(10).await.unwrap();

        assert!(outcome.stopped);
        assert_eq!(outcome.processed, 0);
        assert_eq!(controller.store.frontier_len().unwrap(), 2);
    }
}
