//! Crawl engine - main crawl orchestration logic
//!
//! This module drives one fetch step per pending page:
//! 1. Claim a random pending page from the frontier
//! 2. Clear the page's outgoing links
//! 3. Fetch it (bounded by the fetch deadline, abortable by cancellation)
//! 4. Store the outcome: content and links, an error code, or deletion of
//!    a non-HTML page
//!
//! Steps run on `workers` concurrent workers that share the store. Store
//! failures abort the run; fetch failures only affect their page.

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{FetchError, PageFetcher};
use crate::crawler::frontier::{Frontier, Selection};
use crate::crawler::parser::AnchorExtractor;
use crate::state::{CrawlState, StatusKind, FETCH_ERROR_SENTINEL};
use crate::storage::{GraphStore, PendingPage, StorageResult};
use crate::url::{derive_scope, in_scope, normalize_href};
use crate::{Result, SpiderError};
use futures::future::try_join_all;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// How long an idle worker waits before asking the frontier again
const IDLE_POLL: Duration = Duration::from_millis(50);

/// Engine tuning knobs
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Number of concurrent fetch workers
    pub workers: usize,

    /// Deadline for a single fetch; expiry counts as a fetch failure
    pub fetch_timeout: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            workers: 1,
            fetch_timeout: Duration::from_secs(30),
        }
    }
}

impl EngineSettings {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            workers: config.workers,
            fetch_timeout: Duration::from_secs(config.fetch_timeout),
        }
    }
}

/// How [`CrawlEngine::start`] prepared the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartMode {
    /// Pending pages existed; the stored frontier and scopes are reused
    Resumed { next_url: String, pending: u64 },

    /// The store had nothing pending and was seeded
    Seeded { seed: String, scope: Option<String> },
}

/// Why a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The step budget was used up
    BudgetExhausted,

    /// No pending pages were left
    Drained,

    /// Cancellation was requested
    Interrupted,
}

/// Summary of one [`CrawlEngine::run_steps`] call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlOutcome {
    /// Completed fetch steps
    pub steps: usize,
    pub fetched: usize,
    pub failed: usize,
    /// Pages deleted because they were not HTML
    pub disqualified: usize,
    /// New edges stored
    pub links_added: usize,
    pub stop: StopReason,
}

/// Result of a single fetch step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepResult {
    Fetched { links: usize },
    Failed,
    Disqualified,
    Interrupted,
}

#[derive(Debug, Default)]
struct Tally {
    steps: AtomicUsize,
    fetched: AtomicUsize,
    failed: AtomicUsize,
    disqualified: AtomicUsize,
    links_added: AtomicUsize,
}

impl Tally {
    fn record(&self, result: StepResult) {
        let counter = match result {
            StepResult::Fetched { links } => {
                self.links_added.fetch_add(links, Ordering::Relaxed);
                &self.fetched
            }
            StepResult::Failed => &self.failed,
            StepResult::Disqualified => &self.disqualified,
            StepResult::Interrupted => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.steps.fetch_add(1, Ordering::Relaxed);
    }

    fn into_outcome(self, stop: StopReason) -> CrawlOutcome {
        CrawlOutcome {
            steps: self.steps.into_inner(),
            fetched: self.fetched.into_inner(),
            failed: self.failed.into_inner(),
            disqualified: self.disqualified.into_inner(),
            links_added: self.links_added.into_inner(),
            stop,
        }
    }
}

/// Steps left in a run; `None` means unbounded
struct StepBudget {
    remaining: Option<AtomicUsize>,
}

impl StepBudget {
    fn new(budget: usize) -> Self {
        Self {
            remaining: (budget > 0).then(|| AtomicUsize::new(budget)),
        }
    }

    fn take(&self) -> bool {
        match &self.remaining {
            None => true,
            Some(remaining) => remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok(),
        }
    }

    fn give_back(&self) {
        if let Some(remaining) = &self.remaining {
            remaining.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Main crawl engine
///
/// Owns the graph store and the two network-facing collaborators. The
/// driver calls [`start`](Self::start) once, then
/// [`run_steps`](Self::run_steps) as often as it likes.
pub struct CrawlEngine<S: GraphStore> {
    store: Mutex<S>,
    fetcher: Box<dyn PageFetcher>,
    extractor: Box<dyn AnchorExtractor>,
    frontier: Frontier,
    settings: EngineSettings,
    webs: Vec<String>,
    state: CrawlState,
}

impl<S: GraphStore> CrawlEngine<S> {
    /// Creates a new engine instance
    ///
    /// # Arguments
    ///
    /// * `store` - The graph store to read the frontier from and write results to
    /// * `fetcher` - Network boundary
    /// * `extractor` - HTML anchor extraction
    /// * `settings` - Worker count and fetch deadline
    pub fn new<F, X>(store: S, fetcher: F, extractor: X, settings: EngineSettings) -> Self
    where
        F: PageFetcher + 'static,
        X: AnchorExtractor + 'static,
    {
        Self {
            store: Mutex::new(store),
            fetcher: Box::new(fetcher),
            extractor: Box::new(extractor),
            frontier: Frontier::new(),
            settings,
            webs: Vec::new(),
            state: CrawlState::Idle,
        }
    }

    /// Resumes the stored crawl or seeds a new one
    ///
    /// If any page is pending, the stored frontier and scopes are used as
    /// they are and `seed` is ignored. Otherwise the scope derived from
    /// `seed` (or the fallback root) is registered and the seed page created.
    pub fn start(&mut self, seed: Option<&str>) -> Result<StartMode> {
        let store = self.store.get_mut().map_err(|_| SpiderError::StorePoisoned)?;

        let mode = match store.next_pending_random()? {
            Some(next) => {
                let pending = store.count_pages(StatusKind::Pending)?;
                tracing::info!("Resuming crawl: {} pending pages (next: {})", pending, next.url);
                StartMode::Resumed {
                    next_url: next.url,
                    pending,
                }
            }
            None => {
                let derived = derive_scope(seed.unwrap_or_default());
                match &derived.scope {
                    Some(scope) => {
                        store.add_scope(scope)?;
                        store.ensure_page(&derived.seed)?;
                        tracing::info!("Starting crawl at {} within {}", derived.seed, scope);
                    }
                    None => {
                        tracing::warn!("Seed {:?} gives no usable scope", derived.seed);
                    }
                }
                StartMode::Seeded {
                    seed: derived.seed,
                    scope: derived.scope,
                }
            }
        };

        self.webs = store.list_scopes()?;
        tracing::info!("Websites to crawl:");
        for web in &self.webs {
            tracing::info!("[^] {}", web);
        }

        Ok(mode)
    }

    /// Runs up to `budget` fetch steps (0 runs until drained or cancelled)
    ///
    /// Cancelling `cancel` aborts in-flight fetches; their pages stay
    /// pending and everything committed before stays valid.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOutcome)` - The run stopped normally
    /// * `Err(SpiderError)` - The store failed; the run was aborted
    pub async fn run_steps(
        &mut self,
        budget: usize,
        cancel: &CancellationToken,
    ) -> Result<CrawlOutcome> {
        let store = self.store.get_mut().map_err(|_| SpiderError::StorePoisoned)?;
        self.frontier.reset(store)?;
        self.webs = store.list_scopes()?;
        self.state = CrawlState::Running;

        let steps = StepBudget::new(budget);
        let tally = Tally::default();

        let engine = &*self;
        let workers = (0..engine.settings.workers.max(1))
            .map(|_| engine.worker(&steps, &tally, cancel));

        let reasons = match try_join_all(workers).await {
            Ok(reasons) => reasons,
            Err(e) => {
                tracing::error!("Crawl aborted: {}", e);
                self.state = CrawlState::Interrupted;
                return Err(e);
            }
        };

        let stop = if reasons.contains(&StopReason::Interrupted) {
            StopReason::Interrupted
        } else if reasons.contains(&StopReason::Drained) {
            // Only new pages come from in-flight steps, so a drained
            // frontier stays drained for the rest of the run
            StopReason::Drained
        } else {
            StopReason::BudgetExhausted
        };

        self.state = match stop {
            StopReason::BudgetExhausted => CrawlState::Idle,
            StopReason::Drained => CrawlState::Drained,
            StopReason::Interrupted => CrawlState::Interrupted,
        };

        let outcome = tally.into_outcome(stop);
        tracing::info!(
            "Run stopped ({:?}): {} steps, {} fetched, {} failed, {} non-HTML removed, {} links",
            outcome.stop,
            outcome.steps,
            outcome.fetched,
            outcome.failed,
            outcome.disqualified,
            outcome.links_added
        );

        Ok(outcome)
    }

    /// Current crawl state
    pub fn state(&self) -> CrawlState {
        self.state
    }

    /// Scope prefixes links are checked against
    pub fn scopes(&self) -> &[String] {
        &self.webs
    }

    /// Runs a read-only query against the store
    pub fn read_store<T>(&self, f: impl FnOnce(&S) -> StorageResult<T>) -> Result<T> {
        let store = self.store.lock().map_err(|_| SpiderError::StorePoisoned)?;
        Ok(f(&store)?)
    }

    /// Consumes the engine and returns the store
    pub fn into_store(self) -> Result<S> {
        self.store.into_inner().map_err(|_| SpiderError::StorePoisoned)
    }

    async fn worker(
        &self,
        budget: &StepBudget,
        tally: &Tally,
        cancel: &CancellationToken,
    ) -> Result<StopReason> {
        loop {
            if cancel.is_cancelled() {
                return Ok(StopReason::Interrupted);
            }
            if !budget.take() {
                return Ok(StopReason::BudgetExhausted);
            }

            let page = match self.with_store(|store| self.frontier.select(store))? {
                Selection::Page(page) => page,
                Selection::Drained => {
                    budget.give_back();
                    tracing::info!("No unretrieved HTML pages found");
                    return Ok(StopReason::Drained);
                }
                Selection::Wait => {
                    budget.give_back();
                    tokio::select! {
                        _ = cancel.cancelled() => return Ok(StopReason::Interrupted),
                        _ = tokio::time::sleep(IDLE_POLL) => continue,
                    }
                }
            };

            match self.step(&page, cancel).await? {
                StepResult::Interrupted => {
                    budget.give_back();
                    return Ok(StopReason::Interrupted);
                }
                result => tally.record(result),
            }
        }
    }

    /// Runs one fetch step for a claimed page and releases the claim
    async fn step(&self, page: &PendingPage, cancel: &CancellationToken) -> Result<StepResult> {
        // From here on, links stored for this page come from this fetch
        self.with_store(|store| store.clear_outgoing_links(page.id))?;

        let timeout = self.settings.fetch_timeout;
        let fetched = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Interrupted while fetching {}", page.url);
                self.with_store(|store| self.frontier.finish(store, page.id))?;
                return Ok(StepResult::Interrupted);
            }
            result = tokio::time::timeout(timeout, self.fetcher.fetch(&page.url)) => {
                result.unwrap_or_else(|_| {
                    Err(FetchError::Timeout {
                        url: page.url.clone(),
                        timeout,
                    })
                })
            }
        };

        let result = match fetched {
            Err(e) => {
                tracing::warn!("Unable to retrieve {}: {}", page.url, e);
                self.finish_with(page, |store| {
                    store.record_fetch_error(&page.url, FETCH_ERROR_SENTINEL)
                })?;
                StepResult::Failed
            }
            Ok(response) if !response.is_html() => {
                tracing::info!(
                    "{} {} ignored non text/html page ({})",
                    page.id,
                    page.url,
                    response.content_type
                );
                self.finish_with(page, |store| store.delete_page(&page.url))?;
                StepResult::Disqualified
            }
            Ok(response) if !response.is_success() => {
                tracing::warn!("Error on page {}: HTTP {}", page.url, response.status);
                let code = i64::from(response.status);
                self.finish_with(page, |store| store.record_fetch_error(&page.url, code))?;
                StepResult::Failed
            }
            Ok(response) => {
                let targets = self.collect_targets(&page.url, &response.body);
                let links = self.finish_with(page, |store| {
                    store.commit_fetch(page.id, &response.body, &targets)
                })?;
                tracing::info!(
                    "{} {} ({} bytes, {} links)",
                    page.id,
                    page.url,
                    response.body.len(),
                    links
                );
                StepResult::Fetched { links }
            }
        };

        Ok(result)
    }

    /// Normalizes and scope-checks every href of a page, keeping document order
    fn collect_targets(&self, base_url: &str, body: &[u8]) -> Vec<String> {
        let mut targets = Vec::new();

        for href in self.extractor.extract_hrefs(body) {
            let Some(url) = normalize_href(&href, base_url) else {
                tracing::debug!("Skipping href {:?} on {}", href, base_url);
                continue;
            };

            if !in_scope(&url, &self.webs) {
                tracing::debug!("Out of scope: {}", url);
                continue;
            }

            targets.push(url);
        }

        targets
    }

    fn with_store<T>(&self, f: impl FnOnce(&mut S) -> StorageResult<T>) -> Result<T> {
        let mut store = self.store.lock().map_err(|_| SpiderError::StorePoisoned)?;
        Ok(f(&mut store)?)
    }

    /// Applies the final write of a step and releases its claim under one lock
    fn finish_with<T>(
        &self,
        page: &PendingPage,
        f: impl FnOnce(&mut S) -> StorageResult<T>,
    ) -> Result<T> {
        self.with_store(|store| {
            let written = f(store);
            self.frontier.finish(store, page.id)?;
            written
        })
    }
}
