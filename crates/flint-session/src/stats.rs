//! Engine-wide statistics.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Snapshot of engine statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Sessions that are neither closed nor dropped.
    pub active_sessions: u64,
    /// Total sessions created.
    pub total_sessions: u64,
    /// Direct executions started.
    pub direct_executions: u64,
    /// Direct executions that returned an error.
    pub failed_executions: u64,
    /// Statements handed to the reference executor.
    pub reference_executions: u64,
    /// Rows returned by successful direct executions.
    pub rows_returned: u64,
    /// Time since the engine was created.
    pub uptime: Duration,
}

/// Live counters behind [`EngineStats`].
#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    sessions_opened: AtomicU64,
    sessions_closed: AtomicU64,
    direct_executions: AtomicU64,
    failed_executions: AtomicU64,
    reference_executions: AtomicU64,
    rows_returned: AtomicU64,
}

impl StatsCounters {
    pub(crate) fn session_opened(&self) {
        self.sessions_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn session_closed(&self) {
        self.sessions_closed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn direct_execution(&self, rows: Option<usize>) {
        self.direct_executions.fetch_add(1, Ordering::Relaxed);
        match rows {
            Some(rows) => {
                self.rows_returned.fetch_add(rows as u64, Ordering::Relaxed);
            }
            None => {
                self.failed_executions.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub(crate) fn reference_execution(&self) {
        self.reference_executions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, uptime: Duration) -> EngineStats {
        let opened = self.sessions_opened.load(Ordering::Relaxed);
        let closed = self.sessions_closed.load(Ordering::Relaxed);
        EngineStats {
            active_sessions: opened.saturating_sub(closed),
            total_sessions: opened,
            direct_executions: self.direct_executions.load(Ordering::Relaxed),
            failed_executions: self.failed_executions.load(Ordering::Relaxed),
            reference_executions: self.reference_executions.load(Ordering::Relaxed),
            rows_returned: self.rows_returned.load(Ordering::Relaxed),
            uptime,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_counts() {
        let counters = StatsCounters::default();
        counters.session_opened();
        counters.session_opened();
        counters.session_closed();
        counters.direct_execution(Some(5));
        counters.direct_execution(None);
        counters.reference_execution();

        let stats = counters.snapshot(Duration::from_secs(3));
        assert_eq!(stats.active_sessions, 1);
        assert_eq!(stats.total_sessions, 2);
        assert_eq!(stats.direct_executions, 2);
        assert_eq!(stats.failed_executions, 1);
        assert_eq!(stats.reference_executions, 1);
        assert_eq!(stats.rows_returned, 5);
        assert_eq!(stats.uptime, Duration::from_secs(3));
    }
}
