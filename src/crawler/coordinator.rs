//! Crawl coordinator - batched breadth-first crawl over one browser session
//!
//! This module contains the main crawl loop, which:
//! - Launches one browser session for the whole crawl
//! - Takes batches of unseen URLs from the frontier
//! - Visits each batch concurrently, bounded by a semaphore
//! - Expands the frontier from the finished batch
//! - Closes the session, whatever happened in between

use crate::browser::{BrowserEngine, BrowserSession, PageHandle};
use crate::config::{validate, Config};
use crate::crawler::automator::PageAutomator;
use crate::crawler::extractor::ContentExtractor;
use crate::crawler::frontier::{Frontier, FrontierEntry};
use crate::crawler::{PageContent, VisitResult};
use crate::state::VisitState;
use crate::{BrowserError, BrowserResult, WalkerError};
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

/// Breadth-first browser crawler
///
/// A `Crawler` holds configuration and a browser engine; each call to
/// [`Crawler::scrape`] runs an independent crawl with its own session,
/// frontier and concurrency limit.
pub struct Crawler<E: BrowserEngine> {
    config: Arc<Config>,
    engine: E,
    extractor: ContentExtractor,
}

/// Per-crawl resources shared by the visits of that crawl
struct VisitContext<'a, S> {
    session: &'a S,
    automator: PageAutomator,
    slots: Semaphore,
    cancel: &'a CancellationToken,
}

impl<E: BrowserEngine> Crawler<E> {
    /// Creates a new crawler
    ///
    /// # Arguments
    ///
    /// * `config` - The crawl configuration
    /// * `engine` - Browser engine used to launch the crawl's session
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Configuration is valid
    /// * `Err(WalkerError)` - Configuration failed validation
    pub fn new(config: Config, engine: E) -> Result<Self, WalkerError> {
        validate(&config)?;

        let config = Arc::new(config);
        Ok(Self {
            extractor: ContentExtractor::new(Arc::clone(&config)),
            config,
            engine,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Crawls from `start_url` until the frontier or the page cap is exhausted
    ///
    /// Returns one record per visited URL, in completion order. Per-page
    /// failures are records, not errors; only a failed browser launch is an
    /// error.
    pub async fn scrape(&self, start_url: &str) -> Result<Vec<VisitResult>, WalkerError> {
        self.scrape_with_cancel(start_url, CancellationToken::new())
            .await
    }

    /// Like [`Crawler::scrape`], stopping early once `cancel` fires
    ///
    /// No new visits start after cancellation. Visits in flight end with a
    /// "crawl cancelled" error record, and the session is still closed.
    pub async fn scrape_with_cancel(
        &self,
        start_url: &str,
        cancel: CancellationToken,
    ) -> Result<Vec<VisitResult>, WalkerError> {
        let started = std::time::Instant::now();
        let mut frontier = Frontier::new(start_url, &self.config.crawl);

        tracing::info!(
            "Starting crawl of {} (depth {}, max {} pages, concurrency {})",
            frontier.start_url(),
            self.config.crawl.depth,
            self.config.crawl.max_pages,
            self.config.crawl.concurrency
        );

        let session = self.engine.launch(&self.config.browser).await?;

        let context = VisitContext {
            session: &session,
            automator: PageAutomator::new(Arc::clone(&self.config)),
            slots: Semaphore::new(self.config.crawl.concurrency),
            cancel: &cancel,
        };
        let results = self.run_frontier(&context, &mut frontier).await;
        drop(context);

        if let Err(e) = session.close().await {
            tracing::warn!("Failed to close browser session: {}", e);
        }

        let failed = results.iter().filter(|r| !r.is_success()).count();
        tracing::info!(
            "Crawl finished: {} pages ({} failed) in {:?}",
            results.len(),
            failed,
            started.elapsed()
        );

        Ok(results)
    }

    /// Runs batches until the frontier is exhausted, full, or cancelled
    async fn run_frontier(
        &self,
        context: &VisitContext<'_, E::Session>,
        frontier: &mut Frontier,
    ) -> Vec<VisitResult> {
        let batch_size = self.config.crawl.batch_size;
        let mut results = Vec::new();

        loop {
            let mut batch = FuturesUnordered::new();
            while batch.len() < batch_size && !context.cancel.is_cancelled() {
                let Some(entry) = frontier.next_unseen() else {
                    break;
                };
                let slot = batch.len();
                batch.push(self.visit(context, entry).map(move |result| (slot, result)));
            }

            if batch.is_empty() {
                break;
            }

            tracing::debug!(
                "Visiting batch of {} ({} seen, {} queued)",
                batch.len(),
                frontier.seen_count(),
                frontier.queued_count()
            );

            let mut completed = Vec::with_capacity(batch.len());
            while let Some(done) = batch.next().await {
                completed.push(done);
            }

            // Expand in scheduling order so the queue order is deterministic
            let mut by_slot: Vec<&(usize, VisitResult)> = completed.iter().collect();
            by_slot.sort_by_key(|(slot, _)| *slot);
            for (_, result) in by_slot {
                frontier.expand(result);
            }

            results.extend(completed.into_iter().map(|(_, result)| result));
        }

        results
    }

    /// Visits one URL and always produces a record
    async fn visit(
        &self,
        context: &VisitContext<'_, E::Session>,
        entry: FrontierEntry,
    ) -> VisitResult {
        let FrontierEntry { url, depth } = entry;
        let mut state = VisitState::Queued;

        let _permit = tokio::select! {
            permit = context.slots.acquire() => match permit {
                Ok(permit) => permit,
                Err(e) => {
                    advance(&mut state, VisitState::Failed, &url);
                    return VisitResult::failure(url, depth, e.to_string());
                }
            },
            _ = context.cancel.cancelled() => {
                advance(&mut state, VisitState::Failed, &url);
                return VisitResult::failure(url, depth, BrowserError::Cancelled.to_string());
            }
        };

        let page = match context.session.new_page().await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Could not open a page for {}: {}", url, e);
                advance(&mut state, VisitState::Failed, &url);
                return VisitResult::failure(url, depth, e.to_string());
            }
        };
        advance(&mut state, VisitState::Visiting, &url);

        let outcome = tokio::select! {
            outcome = self.load_page(context, &page, &url) => outcome,
            _ = context.cancel.cancelled() => Err(BrowserError::Cancelled),
        };

        let result = match outcome {
            Ok(content) => {
                tracing::info!(
                    "Visited [depth {}] {} ({} links)",
                    depth,
                    url,
                    content.links.len()
                );
                advance(&mut state, VisitState::Extracted, &url);

                tokio::select! {
                    _ = tokio::time::sleep(self.config.crawl.delay()) => {}
                    _ = context.cancel.cancelled() => {}
                }
                VisitResult::success(url, depth, content)
            }
            Err(e) => {
                tracing::warn!("Failed [depth {}] {}: {}", depth, url, e);
                advance(&mut state, VisitState::Failed, &url);
                VisitResult::failure(url, depth, e.to_string())
            }
        };

        if let Err(e) = page.close().await {
            tracing::debug!("Failed to close page for {}: {}", result.url, e);
        }

        result
    }

    /// Navigates, automates, and extracts
    async fn load_page(
        &self,
        context: &VisitContext<'_, E::Session>,
        page: &<E::Session as BrowserSession>::Page,
        url: &str,
    ) -> BrowserResult<PageContent> {
        page.goto(url, self.config.timeouts.goto()).await?;
        context.automator.run_page_automation(page).await;
        self.extractor.extract_content(page, url).await
    }
}

fn advance(state: &mut VisitState, next: VisitState, url: &str) {
    debug_assert!(
        state.can_transition_to(next),
        "invalid visit transition {} -> {}",
        state,
        next
    );
    tracing::trace!("{}: {} -> {}", url, state, next);
    *state = next;
}
