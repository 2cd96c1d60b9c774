//! Coalescing of tab-removal bursts into bounded reconciliation passes.
//!
//! Closing a window can deliver hundreds of tab-removal events in one
//! burst. Running a reconciliation pass per event would hammer the host's
//! directories for no benefit; running only one risks missing removals
//! that arrive mid-pass. The counter here bounds the work to "one pass
//! running, at most one more pending" while guaranteeing that every
//! removal is covered by a pass that starts after it was recorded.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tmpc_directory::TabId;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::app::App;

/// Upper bound on the recently-removed accumulator. Ids past the cap are
/// simply not excluded from the next snapshot; the worst case is that a
/// still-visible ghost tab keeps its container alive until a later pass.
pub const ACCUMULATOR_CAP: usize = 4096;

/// Queue-depth counter plus the shared "recently removed" accumulator.
///
/// Depth is bounded to `{0, 1, 2}`: idle, running, running with one more
/// pass pending. The caller whose increment leaves idle state becomes the
/// sole runner and loops until depth returns to zero; everyone else
/// returns immediately after updating the accumulator and counter.
#[derive(Debug, Default)]
pub struct CleanupCounter {
    inner: Mutex<CounterInner>,
}

#[derive(Debug, Default)]
struct CounterInner {
    depth: u8,
    recently_removed: HashSet<TabId>,
}

impl CleanupCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a removed tab and bump the depth (saturating at 2).
    ///
    /// Returns true when this call transitioned the counter out of idle,
    /// making the caller the active runner.
    pub fn note_removed(&self, tab: TabId) -> bool {
        let mut inner = self.inner.lock();
        if inner.recently_removed.len() < ACCUMULATOR_CAP {
            inner.recently_removed.insert(tab);
        } else {
            warn!(%tab, "recently-removed accumulator full, id not excluded");
        }
        let was_idle = inner.depth == 0;
        if inner.depth < 2 {
            inner.depth += 1;
        }
        was_idle
    }

    /// Snapshot of the accumulator for the next pass.
    pub fn excluded(&self) -> HashSet<TabId> {
        self.inner.lock().recently_removed.clone()
    }

    /// Decrement after a completed pass.
    ///
    /// Returns true when the counter reached idle, in which case the
    /// accumulator has been cleared and the runner stops looping. Only the
    /// active runner may call this.
    pub fn finish_pass(&self) -> bool {
        let mut inner = self.inner.lock();
        inner.depth = inner.depth.saturating_sub(1);
        if inner.depth == 0 {
            inner.recently_removed.clear();
            true
        } else {
            false
        }
    }

    /// Reset after a failed pass: drop pending work and the accumulator.
    /// The next removal event starts fresh.
    pub fn abandon(&self) {
        let mut inner = self.inner.lock();
        inner.depth = 0;
        inner.recently_removed.clear();
    }

    /// Current queue depth (0 idle, 1 running, 2 running + pending).
    pub fn depth(&self) -> u8 {
        self.inner.lock().depth
    }
}

/// Time-debounced cleanup variant.
///
/// Every removal event restarts a delay window; exactly one reconciliation
/// pass runs per window that elapses quietly. Compared with the counter,
/// this trades fixed latency for a simpler bound (never more than one
/// pending pass) - preferable when directory read-after-write lag
/// dominates over event volume. A pass that has started always runs to
/// completion; the timer only delays starts.
pub struct DebouncedCleanup {
    tx: mpsc::UnboundedSender<TabId>,
}

impl DebouncedCleanup {
    /// Spawn the debounce worker against the given app.
    ///
    /// The worker exits when every handle is dropped, after flushing any
    /// accumulated removals through one final pass.
    pub fn spawn(app: Arc<App>, delay: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_debounce(app, delay, rx));
        Self { tx }
    }

    /// Feed a removed tab id into the current (or a new) delay window.
    pub fn note_removed(&self, tab: TabId) {
        let _ = self.tx.send(tab);
    }
}

async fn run_debounce(app: Arc<App>, delay: Duration, mut rx: mpsc::UnboundedReceiver<TabId>) {
    while let Some(first) = rx.recv().await {
        let mut excluded = HashSet::from([first]);
        let mut closed = false;
        loop {
            tokio::select! {
                () = tokio::time::sleep(delay) => break,
                next = rx.recv() => match next {
                    Some(tab) => {
                        if excluded.len() < ACCUMULATOR_CAP {
                            excluded.insert(tab);
                        }
                    }
                    None => {
                        closed = true;
                        break;
                    }
                },
            }
        }
        debug!(excluded = excluded.len(), "debounce window elapsed, reconciling");
        if let Err(error) = app.remove_empty_temporary_containers(&excluded).await {
            warn!(%error, "debounced cleanup pass failed, awaiting next event");
        }
        if closed {
            break;
        }
    }
}
