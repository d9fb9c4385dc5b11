//! Single-flight status polling.
//!
//! The loop waits a fixed interval after each poll *completes*, so a slow
//! network stretches the period instead of stacking requests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::{PollOutcome, SessionManager};

/// Default delay between the end of one poll and the start of the next.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl PollConfig {
    /// # Panics
    ///
    /// Panics if `interval` is zero.
    pub fn new(interval: Duration) -> Self {
        assert!(!interval.is_zero(), "Poll interval must be positive");
        Self { interval }
    }
}

/// Shared cancellation flag, checked right before any state write.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Counters for a running poll loop.
#[derive(Debug, Default)]
pub struct PollStats {
    polls: AtomicU64,
    failures: AtomicU64,
}

impl PollStats {
    pub fn record(&self, outcome: &PollOutcome) {
        self.polls.fetch_add(1, Ordering::Relaxed);
        if outcome.is_failure() {
            self.failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Completed polls that were applied to the session.
    pub fn polls(&self) -> u64 {
        self.polls.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

/// Owner of a running poll loop. Dropping it cancels the loop.
#[derive(Debug)]
pub struct PollHandle {
    cancel: CancelFlag,
    stats: Arc<PollStats>,
    task: JoinHandle<()>,
}

impl PollHandle {
    pub(crate) fn spawn(session: SessionManager, config: PollConfig) -> Self {
        let cancel = CancelFlag::new();
        let stats = Arc::new(PollStats::default());
        let task = tokio::spawn(run_polling(
            session,
            config,
            cancel.clone(),
            Arc::clone(&stats),
        ));
        info!(interval_ms = config.interval.as_millis() as u64, "status polling started");
        Self {
            cancel,
            stats,
            task,
        }
    }

    /// Stop the loop. A poll already in flight completes without writing.
    pub fn cancel(&self) {
        if !self.cancel.is_cancelled() {
            self.cancel.cancel();
            self.task.abort();
            info!("status polling cancelled");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn stats(&self) -> &PollStats {
        &self.stats
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn run_polling(
    session: SessionManager,
    config: PollConfig,
    cancel: CancelFlag,
    stats: Arc<PollStats>,
) {
    while !cancel.is_cancelled() {
        match session.poll_status_guarded(&cancel).await {
            Some(outcome) => stats.record(&outcome),
            None => break,
        }
        if cancel.is_cancelled() {
            break;
        }
        tokio::time::sleep(config.interval).await;
    }
    debug!(polls = stats.polls(), "status polling loop exited");
}
