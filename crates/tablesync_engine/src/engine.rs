//! The sync engine and cycle coordinator.

use crate::config::SyncConfig;
use crate::error::SyncResult;
use crate::pull::PullOutcome;
use crate::push::PushOutcome;
use crate::transport::SyncTransport;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tablesync_core::RecordStore;
use tracing::debug;

/// Aggregate result of one sync cycle (pull then push).
///
/// The overall `success` flag is the logical AND of all per-unit
/// outcomes; which tables and objects failed is reported alongside so
/// the caller can decide whether to retry the whole cycle.
#[derive(Debug, Clone, Default)]
pub struct SyncCycleResult {
    /// True if this trigger was ignored because a cycle was already in
    /// flight. A skipped cycle reports `success` so callers don't
    /// retry on top of the running one.
    pub skipped: bool,
    /// Whether every table pulled and every object pushed cleanly.
    pub success: bool,
    /// Pull phase outcome.
    pub pull: PullOutcome,
    /// Push phase outcome.
    pub push: PushOutcome,
    /// Wall-clock duration of the cycle.
    pub duration: Duration,
}

impl SyncCycleResult {
    fn skipped() -> Self {
        Self {
            skipped: true,
            success: true,
            ..Self::default()
        }
    }
}

/// Reconciles a local record store with a remote server.
///
/// One engine owns one store and one transport. A full cycle runs pull
/// then push to completion; per-object reconciliation triggered by
/// notification events may run alongside, serialized through the
/// store's write lock.
pub struct SyncEngine<T: SyncTransport, S: RecordStore> {
    pub(crate) config: SyncConfig,
    pub(crate) transport: T,
    pub(crate) store: S,
    /// In-flight-cycle token. Holding it is the only way to run a cycle.
    in_flight: AtomicBool,
}

impl<T: SyncTransport, S: RecordStore> SyncEngine<T, S> {
    /// Creates a new engine.
    pub fn new(config: SyncConfig, transport: T, store: S) -> Self {
        Self {
            config,
            transport,
            store,
            in_flight: AtomicBool::new(false),
        }
    }

    /// The engine's configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// The local record store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Runs one full sync cycle: pull, then push.
    ///
    /// Triggering while a cycle is in flight is a no-op: the in-flight
    /// cycle continues and a skipped result is returned immediately,
    /// with no queueing of a second cycle.
    ///
    /// Transport failures are isolated per table and per object and
    /// reported in the result; only store errors abort the cycle.
    pub fn sync(&self) -> SyncResult<SyncCycleResult> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("sync cycle already in flight, ignoring trigger");
            return Ok(SyncCycleResult::skipped());
        }

        let start = Instant::now();
        let outcome = self.run_cycle();
        self.in_flight.store(false, Ordering::SeqCst);

        let mut result = outcome?;
        result.duration = start.elapsed();
        debug!(
            success = result.success,
            pulled = result.pull.created + result.pull.updated,
            pushed = result.push.pushed,
            "sync cycle finished"
        );
        Ok(result)
    }

    fn run_cycle(&self) -> SyncResult<SyncCycleResult> {
        let pull = self.pull()?;
        let push = self.push()?;
        Ok(SyncCycleResult {
            skipped: false,
            success: pull.success && push.success,
            pull,
            push,
            duration: Duration::ZERO,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryServer;
    use tablesync_core::MemoryRecordStore;

    #[test]
    fn empty_cycle_succeeds() {
        let config = SyncConfig::new(vec![1, 2], "/tmp/tablesync-test");
        let engine = SyncEngine::new(config, MemoryServer::new(10), MemoryRecordStore::new());

        let result = engine.sync().unwrap();
        assert!(result.success);
        assert!(!result.skipped);
        assert_eq!(result.pull.created, 0);
        assert_eq!(result.push.pushed, 0);
    }

    #[test]
    fn consecutive_cycles_both_run() {
        let config = SyncConfig::new(vec![1], "/tmp/tablesync-test");
        let engine = SyncEngine::new(config, MemoryServer::new(10), MemoryRecordStore::new());

        assert!(!engine.sync().unwrap().skipped);
        assert!(!engine.sync().unwrap().skipped);
    }
}
