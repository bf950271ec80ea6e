//! Breadth-first frontier for a single crawl
//!
//! This module handles:
//! - The FIFO queue of URLs waiting to be visited
//! - The `seen` set of URLs already taken for a visit
//! - Admission of discovered links (domain scope, page cap, binary filter)

use crate::config::CrawlConfig;
use crate::crawler::VisitResult;
use crate::url::{is_binary_resource, normalize_url, same_domain};
use std::collections::{HashSet, VecDeque};

/// A URL waiting in the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// Normalized URL
    pub url: String,

    /// Distance from the seed URL
    pub depth: u32,
}

/// Frontier state owned by one crawl
///
/// `seen` grows by exactly one per visit scheduled and never exceeds
/// `max_pages`. A URL is never queued twice and never queued once seen.
#[derive(Debug)]
pub struct Frontier {
    start_url: String,
    max_depth: u32,
    max_pages: usize,
    queue: VecDeque<FrontierEntry>,
    seen: HashSet<String>,
    queued: HashSet<String>,
}

impl Frontier {
    /// Creates a frontier seeded with the normalized start URL at depth 0
    pub fn new(start_url: &str, crawl: &CrawlConfig) -> Self {
        let start_url = normalize_url(start_url);

        let mut queue = VecDeque::new();
        queue.push_back(FrontierEntry {
            url: start_url.clone(),
            depth: 0,
        });

        let mut queued = HashSet::new();
        queued.insert(start_url.clone());

        Self {
            start_url,
            max_depth: crawl.depth,
            max_pages: crawl.max_pages,
            queue,
            seen: HashSet::new(),
            queued,
        }
    }

    /// The normalized seed URL that scopes the crawl
    pub fn start_url(&self) -> &str {
        &self.start_url
    }

    /// Returns true once the page cap has been reached
    pub fn is_full(&self) -> bool {
        self.seen.len() >= self.max_pages
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    pub fn queued_count(&self) -> usize {
        self.queue.len()
    }

    /// Takes the next URL that has not been seen and marks it seen
    ///
    /// Returns `None` when the queue is exhausted or the page cap is reached.
    pub fn next_unseen(&mut self) -> Option<FrontierEntry> {
        while !self.is_full() {
            let entry = self.queue.pop_front()?;
            let url = normalize_url(&entry.url);
            self.queued.remove(&url);

            if !self.seen.insert(url.clone()) {
                continue;
            }

            return Some(FrontierEntry {
                url,
                depth: entry.depth,
            });
        }

        None
    }

    /// Queues the admissible links of a visited page one level deeper
    ///
    /// Nothing is queued from pages already at the maximum depth. A link is
    /// admitted when it shares the seed's host, is neither seen nor queued,
    /// fits under the page cap counting queued URLs, and is not a binary
    /// resource.
    ///
    /// # Returns
    ///
    /// The number of links queued
    pub fn expand(&mut self, parent: &VisitResult) -> usize {
        if parent.depth >= self.max_depth {
            return 0;
        }

        let child_depth = parent.depth + 1;
        let mut admitted = 0;

        for link in &parent.links {
            let href = normalize_url(&link.href);

            if !same_domain(&self.start_url, &href) {
                continue;
            }
            if self.seen.contains(&href) || self.queued.contains(&href) {
                continue;
            }
            if self.seen.len() + self.queue.len() >= self.max_pages {
                break;
            }
            if is_binary_resource(&href) {
                tracing::trace!("Skipping binary resource {}", href);
                continue;
            }

            self.queued.insert(href.clone());
            self.queue.push_back(FrontierEntry {
                url: href,
                depth: child_depth,
            });
            admitted += 1;
        }

        if admitted > 0 {
            tracing::debug!(
                "Queued {} links from {} at depth {}",
                admitted,
                parent.url,
                child_depth
            );
        }

        admitted
    }
}
