//! Locker Directory Service.
//!
//! Loads the locker dataset from the backing store, normalizes it (dropping
//! inadmissible rows), caches the whole snapshot in memory with a 5-minute
//! TTL, and serves either the full set or a haversine-ranked subset.
//!
//! The cache is the only shared mutable state in the process. A refresh
//! replaces the entire snapshot atomically after a successful load, so
//! concurrent readers never observe a half-built list. Concurrent
//! stale-triggered reloads are not de-duplicated; the reload is an
//! idempotent overwrite and the last writer wins.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::instrument;

use pufff_core::{Coordinates, Locker, LockerRecord};

use crate::db::{LockerStore, StoreError};

/// How long a cached snapshot stays fresh.
pub const DIRECTORY_TTL: Duration = Duration::from_secs(300);

/// Default number of entries returned by a ranked query.
pub const DEFAULT_NEAR_LIMIT: usize = 50;

/// Time source for cache freshness, injectable so tests control the clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct Snapshot {
    lockers: Arc<Vec<Locker>>,
    fetched_at: Instant,
}

/// In-memory, TTL-cached view of the locker dataset.
pub struct LockerDirectory {
    store: Arc<dyn LockerStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    cache: RwLock<Option<Snapshot>>,
}

impl LockerDirectory {
    /// Create a directory over a backing store with the default TTL.
    #[must_use]
    pub fn new(store: Arc<dyn LockerStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock), DIRECTORY_TTL)
    }

    /// Create a directory with an explicit clock and TTL.
    #[must_use]
    pub fn with_clock(store: Arc<dyn LockerStore>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            store,
            clock,
            ttl,
            cache: RwLock::new(None),
        }
    }

    /// Return the normalized snapshot, reloading from the backing store if
    /// the cache is stale or `force` is set.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the reload fails. The previous snapshot is
    /// left untouched, so a later call within its own staleness window can
    /// still be answered once the store recovers.
    pub async fn get_lockers(&self, force: bool) -> Result<Arc<Vec<Locker>>, StoreError> {
        if !force
            && let Some(lockers) = self.cached_if_fresh().await
        {
            return Ok(lockers);
        }

        let rows = self.store.fetch_all().await?;
        let lockers = Arc::new(normalize(rows));

        let mut guard = self.cache.write().await;
        *guard = Some(Snapshot {
            lockers: Arc::clone(&lockers),
            fetched_at: self.clock.now(),
        });

        Ok(lockers)
    }

    /// Full normalized snapshot, in backing-store order.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if a required reload fails.
    pub async fn query_all(&self) -> Result<Arc<Vec<Locker>>, StoreError> {
        self.get_lockers(false).await
    }

    /// Up to `limit` lockers ranked by ascending haversine distance from
    /// `origin`, each with `distance_km` attached.
    ///
    /// Equal distances keep their original cache order (stable sort).
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if a required reload fails.
    #[instrument(skip(self), fields(lat = origin.lat(), lng = origin.lng()))]
    pub async fn query_near(
        &self,
        origin: Coordinates,
        limit: usize,
    ) -> Result<Vec<Locker>, StoreError> {
        let snapshot = self.get_lockers(false).await?;

        let mut ranked: Vec<Locker> = snapshot
            .iter()
            .map(|locker| {
                let mut locker = locker.clone();
                locker.distance_km = Some(locker.distance_from(origin.lat(), origin.lng()));
                locker
            })
            .collect();

        // Distances are finite (admissibility guarantees finite coordinates),
        // so total_cmp ordering matches numeric ordering.
        ranked.sort_by(|a, b| {
            a.distance_km
                .unwrap_or(f64::MAX)
                .total_cmp(&b.distance_km.unwrap_or(f64::MAX))
        });
        ranked.truncate(limit);

        Ok(ranked)
    }

    /// Age of the cached snapshot, if one exists.
    pub async fn cache_age(&self) -> Option<Duration> {
        let guard = self.cache.read().await;
        guard
            .as_ref()
            .map(|snap| self.clock.now().duration_since(snap.fetched_at))
    }

    /// Number of lockers in the cached snapshot, if one exists.
    pub async fn cached_len(&self) -> Option<usize> {
        let guard = self.cache.read().await;
        guard.as_ref().map(|snap| snap.lockers.len())
    }

    /// Connectivity check against the backing store.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store is unreachable.
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.store.ping().await
    }

    async fn cached_if_fresh(&self) -> Option<Arc<Vec<Locker>>> {
        let guard = self.cache.read().await;
        let snap = guard.as_ref()?;
        if self.clock.now().duration_since(snap.fetched_at) < self.ttl {
            Some(Arc::clone(&snap.lockers))
        } else {
            None
        }
    }
}

/// Normalize raw rows, dropping inadmissible ones.
fn normalize(rows: Vec<LockerRecord>) -> Vec<Locker> {
    rows.into_iter().filter_map(Locker::from_record).collect()
}
