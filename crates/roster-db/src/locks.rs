//! Per-study write locks.
//!
//! Commands for one study run one at a time; commands for different studies
//! only meet at the connection write gate in [`crate::service`].

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Sharded map of study ID to that study's async mutex.
#[derive(Debug, Default)]
pub struct StudyLocks {
    inner: DashMap<String, Arc<Mutex<()>>>,
}

impl StudyLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `study_id`.
    ///
    /// The shard guard is released before awaiting, so waiting on one study
    /// never blocks lookups for another.
    pub async fn acquire(&self, study_id: &str) -> OwnedMutexGuard<()> {
        let lock = Arc::clone(
            self.inner
                .entry(study_id.to_string())
                .or_default()
                .value(),
        );
        lock.lock_owned().await
    }

    /// Number of studies that have been locked at least once.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_study_is_exclusive() {
        let locks = StudyLocks::new();
        let guard = locks.acquire("s1").await;

        let second = tokio::time::timeout(Duration::from_millis(20), locks.acquire("s1")).await;
        assert!(second.is_err(), "second acquire should wait");

        drop(guard);
        let third = tokio::time::timeout(Duration::from_millis(200), locks.acquire("s1")).await;
        assert!(third.is_ok());
    }

    #[tokio::test]
    async fn different_studies_are_independent() {
        let locks = StudyLocks::new();
        let _s1 = locks.acquire("s1").await;
        let s2 = tokio::time::timeout(Duration::from_millis(200), locks.acquire("s2")).await;
        assert!(s2.is_ok());
        assert_eq!(locks.len(), 2);
    }
}
