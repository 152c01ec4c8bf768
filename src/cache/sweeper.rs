//! Periodic removal of expired cache entries.
//!
//! Expired entries otherwise stay in memory until their topic is looked up
//! again. The sweeper is opt-in (`cache.sweep_interval_secs > 0`).

use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{self, Instant};

use crate::cache::expiring::ExpiringCache;

/// Anything the sweeper can sweep.
pub trait Sweep: Send + Sync {
    fn name(&self) -> &'static str;
    fn sweep(&self) -> usize;
}

impl<V> Sweep for ExpiringCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        ExpiringCache::name(self)
    }

    fn sweep(&self) -> usize {
        ExpiringCache::sweep(self)
    }
}

pub struct CacheSweeper {
    interval: Duration,
    targets: Vec<Box<dyn Sweep>>,
}

impl CacheSweeper {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            targets: Vec::new(),
        }
    }

    pub fn watch(mut self, cache: impl Sweep + 'static) -> Self {
        self.targets.push(Box::new(cache));
        self
    }

    /// Sweep every target once per interval until shutdown.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval = ?self.interval,
            caches = self.targets.len(),
            "Cache sweeper starting"
        );

        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    for target in &self.targets {
                        let removed = target.sweep();
                        tracing::debug!(cache = target.name(), removed, "Sweep finished");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Cache sweeper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::clock::ManualClock;
    use crate::lifecycle::Shutdown;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_removes_expired_entries_until_shutdown() {
        let clock = Arc::new(ManualClock::new());
        let ttl = Duration::from_secs(60);
        let cache: ExpiringCache<u32> = ExpiringCache::with_clock("sweep-test", ttl, clock.clone());
        cache.set("stale", 1);
        clock.advance(Duration::from_secs(61));
        cache.set("fresh", 2);

        let shutdown = Shutdown::new();
        let sweeper = CacheSweeper::new(Duration::from_secs(30)).watch(cache.clone());
        let handle = tokio::spawn(sweeper.run(shutdown.subscribe()));

        time::sleep(Duration::from_secs(31)).await;
        assert_eq!(cache.size(), 1);
        assert_eq!(cache.get("fresh"), Some(2));

        shutdown.trigger();
        handle.await.unwrap();
    }
}
