//! Cadence for the recurring lateness check.
//!
//! The store's only autonomous behavior is re-running
//! [`TaskStore::tick`](crate::store::TaskStore::tick) on a fixed interval.
//! This type does the time arithmetic; the caller owns the loop.

use std::time::Duration;

use crate::config::StalenessConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalenessSchedule {
    interval: Duration,
}

impl StalenessSchedule {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self { interval }
    }

    #[must_use]
    pub fn from_config(config: &StalenessConfig) -> Self {
        Self::new(config.interval())
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    fn interval_ms(&self) -> i64 {
        i64::try_from(self.interval.as_millis()).unwrap_or(i64::MAX)
    }

    /// When the next check should run. A schedule that never ran is due now.
    #[must_use]
    pub fn next_due(&self, last_run: Option<i64>, now: i64) -> i64 {
        last_run.map_or(now, |last| last.saturating_add(self.interval_ms()))
    }

    #[must_use]
    pub fn is_due(&self, last_run: Option<i64>, now: i64) -> bool {
        now >= self.next_due(last_run, now)
    }

    /// How long to sleep before the next check is due.
    #[must_use]
    pub fn wait(&self, last_run: Option<i64>, now: i64) -> Duration {
        let remaining = self.next_due(last_run, now).saturating_sub(now);
        u64::try_from(remaining).map_or(Duration::ZERO, Duration::from_millis)
    }
}

impl Default for StalenessSchedule {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INTERVAL)
    }
}
