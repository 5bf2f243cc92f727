/*!
 * Fixed-width concurrent worker pool.
 *
 * A `BoundedQueue` runs a worker over submitted items with at most `limit`
 * workers in flight. Permits are handed out first-come first-served, so items
 * start in the order they were submitted; they may finish in any order.
 * Outcomes are returned as-is, one per item: a failing item never cancels or
 * delays its siblings.
 */

use futures::future::join_all;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Semaphore;

/// Default queue width for outbound content operations
pub const DEFAULT_CONCURRENCY: usize = 50;

/// Bounded worker pool over a worker function
pub struct BoundedQueue<F> {
    /// Worker run for every item
    worker: F,

    /// Concurrency limit
    limit: usize,

    /// Permits, one per worker slot
    permits: Semaphore,

    /// Workers currently running
    in_flight: AtomicUsize,

    /// Highest number of workers observed running at once
    peak: AtomicUsize,
}

/// Releases an in-flight slot even if the worker future is dropped
struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl<F> BoundedQueue<F> {
    /// Create a queue running `worker` with at most `limit` items in flight
    pub fn new(worker: F, limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            worker,
            limit,
            permits: Semaphore::new(limit),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// Concurrency limit of this queue
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Highest concurrency observed so far
    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Submit one item; resolves with the worker's outcome
    pub async fn push<T, Fut>(&self, item: T) -> Fut::Output
    where
        F: Fn(T) -> Fut,
        Fut: Future,
    {
        // The semaphore is never closed, so acquiring cannot fail.
        let _permit = self.permits.acquire().await.ok();

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlightGuard(&self.in_flight);
        self.peak.fetch_max(running, Ordering::SeqCst);

        (self.worker)(item).await
    }

    /// Submit every item and wait for all of them to settle
    ///
    /// Returns one outcome per item, in submission order.
    pub async fn settle_all<T, Fut, I>(&self, items: I) -> Vec<Fut::Output>
    where
        I: IntoIterator<Item = T>,
        F: Fn(T) -> Fut,
        Fut: Future,
    {
        join_all(items.into_iter().map(|item| self.push(item))).await
    }
}
