//! Revalidation cache
//!
//! Holds one immutable snapshot for a fixed time window. Readers inside the
//! window share the snapshot; the first reader after it expires refetches
//! and swaps in the replacement. Time comes from an injected [`Clock`] so
//! staleness can be driven from tests.

use std::future::Future;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};

/// Source of monotonic time
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`]
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: StdMutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: StdMutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

struct Entry<T> {
    value: Arc<T>,
    fetched_at: Instant,
}

/// Time-to-live cache over a single value
pub struct RevalidationCache<T> {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entry: RwLock<Option<Entry<T>>>,
    refresh: Mutex<()>,
}

impl<T: Send + Sync> RevalidationCache<T> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entry: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    /// Return the cached value while fresh, otherwise run `load` and cache its result.
    ///
    /// Concurrent callers that find the value stale wait for a single load.
    pub async fn get_or_refresh<F, Fut>(&self, load: F) -> Arc<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        if let Some(value) = self.fresh().await {
            return value;
        }

        let _guard = self.refresh.lock().await;
        // Another caller may have refreshed while we waited
        if let Some(value) = self.fresh().await {
            return value;
        }

        tracing::debug!("Revalidating cached snapshot");
        let value = Arc::new(load().await);
        *self.entry.write().await = Some(Entry {
            value: Arc::clone(&value),
            fetched_at: self.clock.now(),
        });
        value
    }

    /// Current value if it is still inside its window
    pub async fn fresh(&self) -> Option<Arc<T>> {
        let entry = self.entry.read().await;
        let entry = entry.as_ref()?;
        let age = self.clock.now().saturating_duration_since(entry.fetched_at);
        (age < self.ttl).then(|| Arc::clone(&entry.value))
    }

    /// Drop the snapshot so the next read refetches
    pub async fn invalidate(&self) {
        *self.entry.write().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn cache(clock: &Arc<ManualClock>) -> RevalidationCache<usize> {
        let clock: Arc<dyn Clock> = clock.clone();
        RevalidationCache::new(Duration::from_secs(60), clock)
    }

    #[tokio::test]
    async fn test_value_reused_inside_window() {
        let clock = Arc::new(ManualClock::new());
        let cache = cache(&clock);
        let loads = AtomicUsize::new(0);
        let counter = &loads;

        let load = || async move { counter.fetch_add(1, Ordering::SeqCst) };
        assert_eq!(*cache.get_or_refresh(load).await, 0);
        clock.advance(Duration::from_secs(59));
        assert_eq!(*cache.get_or_refresh(load).await, 0);
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_value_refetched_after_window() {
        let clock = Arc::new(ManualClock::new());
        let cache = cache(&clock);
        let loads = AtomicUsize::new(0);
        let counter = &loads;

        let load = || async move { counter.fetch_add(1, Ordering::SeqCst) };
        assert_eq!(*cache.get_or_refresh(load).await, 0);
        clock.advance(Duration::from_secs(60));
        assert!(cache.fresh().await.is_none());
        assert_eq!(*cache.get_or_refresh(load).await, 1);
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_reload() {
        let clock = Arc::new(ManualClock::new());
        let cache = cache(&clock);
        let loads = AtomicUsize::new(0);
        let counter = &loads;

        let load = || async move { counter.fetch_add(1, Ordering::SeqCst) };
        cache.get_or_refresh(load).await;
        cache.invalidate().await;
        assert_eq!(*cache.get_or_refresh(load).await, 1);
    }

    #[tokio::test]
    async fn test_old_snapshot_survives_refresh() {
        let clock = Arc::new(ManualClock::new());
        let cache = cache(&clock);

        let first = cache.get_or_refresh(|| async { 10 }).await;
        clock.advance(Duration::from_secs(61));
        let second = cache.get_or_refresh(|| async { 20 }).await;
        // Holders of the old snapshot keep seeing it unchanged
        assert_eq!(*first, 10);
        assert_eq!(*second, 20);
    }

    #[tokio::test]
    async fn test_concurrent_readers_share_one_load() {
        let clock = Arc::new(ManualClock::new());
        let cache = Arc::new(cache(&clock));
        let loads = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            let loads = Arc::clone(&loads);
            handles.push(tokio::spawn(async move {
                *cache
                    .get_or_refresh(|| async move {
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        loads.fetch_add(1, Ordering::SeqCst)
                    })
                    .await
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap(), 0);
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }
}
