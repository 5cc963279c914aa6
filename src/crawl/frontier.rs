// src/crawl/frontier.rs
// =============================================================================
// The crawl frontier and the visited set.
//
// Frontier is a FIFO of (url, depth) entries shared by all workers. It also
// counts entries that have been popped but not yet completed ("in flight"),
// because an empty queue alone doesn't mean the crawl is over: a worker that
// is still fetching may be about to push that page's children.
//
// pop() therefore:
// - returns the next entry if there is one
// - returns None once the queue is empty AND nothing is in flight (drained),
//   or once the frontier was closed (cancellation)
// - otherwise waits until a push, a completion or a close wakes it up
//
// VisitedSet is the dedup guarantee: try_claim() is an atomic test-and-set,
// so when several workers race for one URL exactly one of them wins.
// =============================================================================

use std::collections::{HashSet, VecDeque};

use tokio::sync::{Mutex, Notify};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: Url,
    pub depth: usize,
}

impl FrontierEntry {
    pub fn new(url: Url, depth: usize) -> Self {
        Self { url, depth }
    }
}

#[derive(Debug, Default)]
struct FrontierState {
    queue: VecDeque<FrontierEntry>,
    in_flight: usize,
    closed: bool,
}

#[derive(Debug, Default)]
pub struct Frontier {
    state: Mutex<FrontierState>,
    notify: Notify,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry. Returns false (and drops the entry) once the frontier is closed.
    pub async fn push(&self, entry: FrontierEntry) -> bool {
        {
            let mut state = self.state.lock().await;
            if state.closed {
                return false;
            }
            state.queue.push_back(entry);
        }
        self.notify.notify_waiters();
        true
    }

    // Takes the next entry, waiting while the queue is empty but other
    // workers still have entries in flight. Every Some(entry) returned here
    // must be followed by exactly one complete().
    pub async fn pop(&self) -> Option<FrontierEntry> {
        loop {
            // Created before checking the state, so a push/complete that lands
            // between the check and the await still wakes us.
            let notified = self.notify.notified();

            {
                let mut state = self.state.lock().await;

                // Cancelled: nothing more will be handed out
                if state.closed {
                    return None;
                }

                // Work available: take it and count it as in flight
                if let Some(entry) = state.queue.pop_front() {
                    state.in_flight += 1;
                    return Some(entry);
                }

                // Empty queue and nobody fetching: no child can ever arrive,
                // so the crawl is drained. Close and wake the other waiters.
                if state.in_flight == 0 {
                    state.closed = true;
                    drop(state);
                    self.notify.notify_waiters();
                    return None;
                }
            }

            // Empty queue but work in flight: wait for a push or a completion
            notified.await;
        }
    }

    /// Marks one popped entry as finished.
    pub async fn complete(&self) {
        {
            let mut state = self.state.lock().await;
            state.in_flight = state.in_flight.saturating_sub(1);
        }
        self.notify.notify_waiters();
    }

    /// Stops the frontier: pending entries are dropped and every waiter gets None.
    pub async fn close(&self) {
        {
            let mut state = self.state.lock().await;
            state.closed = true;
            state.queue.clear();
        }
        self.notify.notify_waiters();
    }
}

#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: Mutex<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the URL; false means some worker claimed it before.
    pub async fn try_claim(&self, url: &Url) -> bool {
        self.urls.lock().await.insert(url.as_str().to_string())
    }

    pub async fn contains(&self, url: &Url) -> bool {
        self.urls.lock().await.contains(url.as_str())
    }

    pub async fn len(&self) -> usize {
        self.urls.lock().await.len()
    }
}
