//! Live state poller.
//!
//! At most one `/state` request is outstanding: the next one is scheduled
//! only after the previous one resolved. A "stopped" reply or a failed
//! fetch ends the loop and hides the highlight; the poller never restarts
//! itself. Stopping is cooperative: an in-flight request is not aborted,
//! its result is discarded.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use web_time::{SystemTime, UNIX_EPOCH};

use crate::api::CaptureBackend;
use crate::grid::{CaptureGrid, GridGeometry, GridSnapshot};

/// Result of one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Grid updated; keep polling.
    Continue,
    /// Backend reported `stopped`.
    Stopped,
    /// The fetch failed.
    Failed,
    /// The poller was stopped while the fetch was in flight.
    Superseded,
}

impl TickOutcome {
    pub fn keeps_polling(self) -> bool {
        self == TickOutcome::Continue
    }
}

fn cache_stamp() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

/// Drives one [`CaptureGrid`] from the `/state` endpoint.
pub struct LivePoller<B, G> {
    backend: Arc<B>,
    geometry: G,
    grid: Mutex<CaptureGrid>,
    interval: Duration,
    watching: AtomicBool,
    /// Bumped on every start and stop; a loop or fetch carrying an older
    /// value is stale.
    run_id: AtomicU64,
    snapshots: watch::Sender<GridSnapshot>,
}

impl<B, G> LivePoller<B, G>
where
    B: CaptureBackend + 'static,
    G: GridGeometry + Send + Sync + 'static,
{
    pub fn new(backend: Arc<B>, geometry: G, interval: Duration, cell_count: usize) -> Arc<Self> {
        let grid = CaptureGrid::new(cell_count);
        let (snapshots, _) = watch::channel(grid.snapshot());
        Arc::new(Self {
            backend,
            geometry,
            grid: Mutex::new(grid),
            interval,
            watching: AtomicBool::new(false),
            run_id: AtomicU64::new(0),
            snapshots,
        })
    }

    /// Grid updates, starting with the current state.
    pub fn subscribe(&self) -> watch::Receiver<GridSnapshot> {
        self.snapshots.subscribe()
    }

    pub fn is_watching(&self) -> bool {
        self.watching.load(Ordering::Acquire)
    }

    pub async fn snapshot(&self) -> GridSnapshot {
        self.grid.lock().await.snapshot()
    }

    /// Start the loop unless it is already running. Returns `true` when a
    /// new loop was started.
    pub fn boot_if_needed(self: &Arc<Self>) -> bool {
        if self.watching.swap(true, Ordering::AcqRel) {
            return false;
        }
        let run = self.run_id.fetch_add(1, Ordering::AcqRel) + 1;
        log::info!("live poller started (every {:?})", self.interval);
        let this = Arc::clone(self);
        tokio::spawn(async move { this.run(run).await });
        true
    }

    /// Stop polling. A request already in flight completes but is ignored.
    pub fn stop(&self) {
        if self.watching.swap(false, Ordering::AcqRel) {
            self.run_id.fetch_add(1, Ordering::AcqRel);
            log::info!("live poller stopped");
        }
    }

    fn is_run_current(&self, run: u64) -> bool {
        self.run_id.load(Ordering::Acquire) == run
    }

    async fn run(self: Arc<Self>, run: u64) {
        loop {
            let outcome = self.tick_for(run).await;
            if !outcome.keeps_polling() {
                if outcome != TickOutcome::Superseded {
                    self.cancel_self(run, outcome);
                }
                break;
            }
            tokio::time::sleep(self.interval).await;
            if !self.is_run_current(run) {
                break;
            }
        }
    }

    /// The loop ended on its own: mark the poller idle unless it has
    /// already been restarted.
    fn cancel_self(&self, run: u64, outcome: TickOutcome) {
        if self
            .run_id
            .compare_exchange(run, run + 1, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            self.watching.store(false, Ordering::Release);
            log::info!("live poller cancelled itself ({:?})", outcome);
        }
    }

    /// Poll once, outside any loop.
    pub async fn tick(&self) -> TickOutcome {
        let run = self.run_id.load(Ordering::Acquire);
        self.tick_for(run).await
    }

    async fn tick_for(&self, run: u64) -> TickOutcome {
        let result = self.backend.state().await;
        if !self.is_run_current(run) {
            log::debug!("discarding /state reply of a stopped poller");
            return TickOutcome::Superseded;
        }

        let mut grid = self.grid.lock().await;
        let outcome = match result {
            Ok(state) => {
                grid.apply(&state, cache_stamp(), &self.geometry);
                if state.stopped {
                    grid.hide_highlight();
                    TickOutcome::Stopped
                } else {
                    TickOutcome::Continue
                }
            }
            Err(e) => {
                log::warn!("Error fetching /state: {}", e);
                grid.hide_highlight();
                TickOutcome::Failed
            }
        };
        self.snapshots.send_replace(grid.snapshot());
        outcome
    }

    /// Reset every cell to its placeholder and hide the highlight.
    pub async fn clear_grid(&self) {
        let mut grid = self.grid.lock().await;
        grid.clear();
        self.snapshots.send_replace(grid.snapshot());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::LiveState;
    use crate::grid::UniformGridGeometry;
    use crate::model::CaptureItem;
    use crate::testing::FakeBackend;

    fn running(n: usize) -> Option<LiveState> {
        Some(LiveState {
            running: true,
            stopped: false,
            items: (0..n).map(|i| CaptureItem::bare(format!("/c/{}.jpg", i))).collect(),
        })
    }

    fn poller(backend: FakeBackend) -> Arc<LivePoller<FakeBackend, UniformGridGeometry>> {
        LivePoller::new(
            Arc::new(backend),
            UniformGridGeometry::new(100.0, 80.0, 10.0),
            Duration::from_millis(1000),
            10,
        )
    }

    #[tokio::test]
    async fn test_tick_updates_grid() {
        let backend = FakeBackend::new();
        backend.push_state(running(4));
        let p = poller(backend);
        let rx = p.subscribe();
        assert_eq!(p.tick().await, TickOutcome::Continue);
        let snap = rx.borrow().clone();
        assert_eq!(snap.active, Some(3));
        assert!(snap.cells[4..].iter().all(|c| c.is_slot()));
    }

    #[tokio::test]
    async fn test_failure_hides_highlight() {
        let backend = FakeBackend::new();
        backend.push_state(running(2));
        backend.push_state(None);
        let p = poller(backend);
        p.tick().await;
        assert!(p.snapshot().await.highlight.is_some());
        assert_eq!(p.tick().await, TickOutcome::Failed);
        let snap = p.snapshot().await;
        assert_eq!(snap.highlight, None);
        assert_eq!(snap.active, None);
    }

    #[tokio::test]
    async fn test_running_and_stopped_reply_hides_highlight() {
        let backend = FakeBackend::new();
        backend.push_state(running(1));
        backend.push_state(Some(LiveState {
            running: true,
            stopped: true,
            items: (0..2).map(|i| CaptureItem::bare(format!("/c/{}.jpg", i))).collect(),
        }));
        let p = poller(backend);
        p.tick().await;
        assert!(p.snapshot().await.highlight.is_some());
        assert_eq!(p.tick().await, TickOutcome::Stopped);
        let snap = p.snapshot().await;
        assert_eq!(snap.highlight, None);
        assert_eq!(snap.active, None);
        assert!(!snap.cells[1].is_slot());
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_stops_on_stopped() {
        let backend = FakeBackend::new();
        backend.push_state(running(1));
        backend.push_state(running(2));
        backend.push_state(Some(LiveState {
            running: false,
            stopped: true,
            items: Vec::new(),
        }));
        let p = poller(backend);
        assert!(p.boot_if_needed());
        assert!(!p.boot_if_needed());

        for _ in 0..5 {
            tokio::time::sleep(Duration::from_millis(1000)).await;
        }
        assert!(!p.is_watching());
        let calls = p.backend.calls();
        assert_eq!(calls.iter().filter(|c| *c == "GET /state").count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_cancels_on_error_without_retry() {
        let backend = FakeBackend::new();
        backend.push_state(running(3));
        let p = poller(backend);
        p.boot_if_needed();
        for _ in 0..5 {
            tokio::time::sleep(Duration::from_millis(1000)).await;
        }
        assert!(!p.is_watching());
        assert_eq!(p.backend.calls().len(), 2);
        assert_eq!(p.snapshot().await.highlight, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_then_reboot() {
        let backend = FakeBackend::new();
        for _ in 0..10 {
            backend.push_state(running(1));
        }
        let p = poller(backend);
        p.boot_if_needed();
        tokio::time::sleep(Duration::from_millis(1500)).await;
        p.stop();
        assert!(!p.is_watching());
        let after_stop = p.backend.calls().len();
        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert_eq!(p.backend.calls().len(), after_stop);

        assert!(p.boot_if_needed());
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(p.backend.calls().len() > after_stop);
        p.stop();
    }

    #[tokio::test]
    async fn test_clear_grid() {
        let backend = FakeBackend::new();
        backend.push_state(running(5));
        let p = poller(backend);
        p.tick().await;
        p.clear_grid().await;
        let snap = p.snapshot().await;
        assert!(snap.cells.iter().all(|c| c.is_slot()));
        assert_eq!(snap.highlight, None);
    }
}
