//! Polling client for badge snapshots.
//!
//! Keeps a cached [`CountsView`] that consumers render from. The first
//! fetch goes out immediately on start; after that a fixed-interval
//! timer paces the rest, and [`CountsPoller::refetch`] asks for one out
//! of band. Responses carry a monotonically increasing ticket, and a
//! response only lands if no newer one already did, so a slow fetch can
//! never overwrite a fresher snapshot. Shutdown stops the timer and
//! bars whatever is still in flight from touching the view.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{oneshot, watch, Notify};
use tokio::time::MissedTickBehavior;

use crate::config;
use crate::notify::counts::UnreadCounts;
use crate::notify::fetch::{CountsFetcher, FetchError};

// ═══════════════════════════════════════════════════════════
// Public types
// ═══════════════════════════════════════════════════════════

/// What a badge consumer renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountsView {
    pub counts: UnreadCounts,
    /// True until the first response (success or failure) lands.
    pub loading: bool,
}

impl CountsView {
    const INITIAL: CountsView = CountsView {
        counts: UnreadCounts::ZERO,
        loading: true,
    };
}

// ═══════════════════════════════════════════════════════════
// Shared state
// ═══════════════════════════════════════════════════════════

struct PollerShared<F> {
    fetcher: F,
    /// Ticket dispenser for fetches. Monotonic, never reset.
    generation: AtomicU64,
    /// Highest ticket whose response has been applied. Set to
    /// `u64::MAX` on shutdown so every late response reads as stale.
    applied: Mutex<u64>,
    view_tx: watch::Sender<CountsView>,
    refetch: Notify,
}

impl<F: CountsFetcher + 'static> PollerShared<F> {
    /// Issue a ticket and spawn one fetch. Overlapping fetches are
    /// allowed; [`commit`](Self::commit) arbitrates by ticket.
    fn launch_fetch(shared: &Arc<Self>) {
        let ticket = shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let task = Arc::clone(shared);
        tokio::spawn(async move {
            let result = task.fetcher.fetch().await;
            task.commit(ticket, result);
        });
    }

    fn commit(&self, ticket: u64, result: Result<UnreadCounts, FetchError>) {
        let counts = match result {
            Ok(counts) => counts,
            Err(e) => {
                tracing::warn!("badge fetch failed, serving zero counts: {e}");
                UnreadCounts::ZERO
            }
        };

        let mut applied = match self.applied.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if ticket <= *applied {
            tracing::debug!(ticket, "discarding stale badge response");
            return;
        }
        *applied = ticket;
        // Send while the lock is held so apply order matches ticket order.
        let _ = self.view_tx.send(CountsView {
            counts,
            loading: false,
        });
    }
}

// ═══════════════════════════════════════════════════════════
// Poller handle
// ═══════════════════════════════════════════════════════════

/// Handle to a running badge polling loop.
///
/// Dropping the handle shuts the loop down.
pub struct CountsPoller<F: CountsFetcher + 'static> {
    shared: Arc<PollerShared<F>>,
    view_rx: watch::Receiver<CountsView>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl<F: CountsFetcher + 'static> CountsPoller<F> {
    /// Start polling at the configured interval
    /// (`MEDINBOX_POLL_INTERVAL_MS`, default 30 s).
    ///
    /// Spawns onto the ambient tokio runtime.
    pub fn start(fetcher: F) -> Self {
        Self::start_with_interval(fetcher, Duration::from_millis(config::poll_interval_ms()))
    }

    /// Start polling at a custom interval. The first fetch goes out
    /// immediately; the interval only paces the ones after it.
    pub fn start_with_interval(fetcher: F, period: Duration) -> Self {
        let (view_tx, view_rx) = watch::channel(CountsView::INITIAL);
        let shared = Arc::new(PollerShared {
            fetcher,
            generation: AtomicU64::new(0),
            applied: Mutex::new(0),
            view_tx,
            refetch: Notify::new(),
        });
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        PollerShared::launch_fetch(&shared);

        let loop_shared = Arc::clone(&shared);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; the eager fetch
            // above already covers it.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => PollerShared::launch_fetch(&loop_shared),
                    _ = loop_shared.refetch.notified() => PollerShared::launch_fetch(&loop_shared),
                }
            }
            tracing::debug!("badge polling loop stopped");
        });

        CountsPoller {
            shared,
            view_rx,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Latest view. Zeros with `loading: true` until the first
    /// response lands.
    pub fn view(&self) -> CountsView {
        *self.view_rx.borrow()
    }

    /// Watch subscription for consumers that re-render on change.
    pub fn subscribe(&self) -> watch::Receiver<CountsView> {
        self.view_rx.clone()
    }

    /// Ask for a fetch now instead of waiting for the next tick.
    ///
    /// Back-to-back calls may coalesce into one fetch. After shutdown
    /// this is a no-op.
    pub fn refetch(&self) {
        self.shared.refetch.notify_one();
    }

    /// Stop the polling loop and bar in-flight responses from the view.
    pub fn shutdown(&mut self) {
        {
            let mut applied = match self.shared.applied.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            *applied = u64::MAX;
        }
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::debug!("badge poller shutdown signal sent");
        }
    }
}

impl<F: CountsFetcher + 'static> Drop for CountsPoller<F> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
