//! In-memory caching using moka
//!
//! Fronts the backend for the location list, route details and catalog
//! reads. Every entry carries its own creation time and TTL; expiry is
//! checked lazily when the entry is read, so an expired value is never
//! returned even if it is still physically stored.
//!
//! `get_or_fetch` coalesces concurrent misses on the same key into a single
//! producer call (moka's `try_get_with`). Failed producers are not cached.

use chrono::{DateTime, Utc};
use moka::future::Cache;
use serde::Serialize;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::db::Backend;
use crate::models::{Excursion, Location, LocationId, TravelPackage};
use crate::pricing::RouteDetails;

/// Source of "now" for expiry checks
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock moved by hand, for deterministic expiry
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        if let Ok(delta) = chrono::Duration::from_std(by) {
            *now += delta;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Stored value with its creation time and lifetime
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub data: V,
    pub timestamp: DateTime<Utc>,
    pub ttl: Duration,
}

impl<V> CacheEntry<V> {
    /// Expired once strictly more than `ttl` has elapsed
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match (now - self.timestamp).to_std() {
            Ok(elapsed) => elapsed > self.ttl,
            // Clock went backwards
            Err(_) => false,
        }
    }
}

/// Size and keys of one cache
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct CacheSnapshot {
    pub size: usize,
    pub keys: Vec<String>,
}

/// Key/value cache with per-entry TTL
#[derive(Clone)]
pub struct TtlCache<V> {
    name: &'static str,
    entries: Cache<String, CacheEntry<V>>,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<V> TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(name: &'static str, default_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            name,
            // No moka-side expiry: entries live until read past their TTL
            // or invalidated.
            entries: Cache::builder().name(name).build(),
            default_ttl,
            clock,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Store `value` under `key`; `ttl` falls back to the cache default
    pub async fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let entry = CacheEntry {
            data: value,
            timestamp: self.clock.now(),
            ttl: ttl.unwrap_or(self.default_ttl),
        };
        self.entries.insert(key.into(), entry).await;
    }

    /// Value under `key` unless it has expired; expired entries are removed
    pub async fn get(&self, key: &str) -> Option<V> {
        let entry = self.entries.get(key).await?;

        if entry.is_expired(self.clock.now()) {
            debug!("Cache EXPIRED in {}: {}", self.name, key);
            self.entries.invalidate(key).await;
            return None;
        }

        Some(entry.data)
    }

    pub async fn has(&self, key: &str) -> bool {
        self.get(key).await.is_some()
    }

    pub async fn delete(&self, key: &str) {
        self.entries.invalidate(key).await;
    }

    pub async fn clear(&self) {
        self.entries.invalidate_all();
        self.entries.run_pending_tasks().await;
    }

    /// Cached value, or the producer's result stored under `key`.
    ///
    /// Concurrent callers missing on the same key share one producer call.
    /// A failed producer leaves nothing behind, so the next call retries.
    pub async fn get_or_fetch<F, Fut, E>(
        &self,
        key: &str,
        producer: F,
        ttl: Option<Duration>,
    ) -> Result<V, Arc<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
        E: Send + Sync + 'static,
    {
        if let Some(value) = self.get(key).await {
            debug!("Cache HIT in {}: {}", self.name, key);
            return Ok(value);
        }

        debug!("Cache MISS in {}: {}", self.name, key);
        let ttl = ttl.unwrap_or(self.default_ttl);
        let clock = Arc::clone(&self.clock);

        let entry = self
            .entries
            .try_get_with(key.to_string(), async move {
                let data = producer().await?;
                Ok(CacheEntry {
                    data,
                    timestamp: clock.now(),
                    ttl,
                })
            })
            .await?;

        Ok(entry.data)
    }

    /// Keys currently held, expired or not
    pub async fn stats(&self) -> CacheSnapshot {
        self.entries.run_pending_tasks().await;
        let mut keys: Vec<String> = self.entries.iter().map(|(k, _)| (*k).clone()).collect();
        keys.sort();
        CacheSnapshot {
            size: keys.len(),
            keys,
        }
    }
}

/// Join key parts with `:`
pub fn cache_key<I, P>(parts: I) -> String
where
    I: IntoIterator<Item = P>,
    P: ToString,
{
    parts
        .into_iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(":")
}

/// Session-wide caches shared by every calculator
#[derive(Clone)]
pub struct AppCache {
    /// Full location list (single key)
    pub locations: TtlCache<Arc<Vec<Location>>>,
    /// Route details per origin/destination pair
    pub routes: TtlCache<RouteDetails>,
    /// Excursions per excursion location
    pub excursions: TtlCache<Arc<Vec<Excursion>>>,
    /// Active travel packages (single key)
    pub packages: TtlCache<Arc<Vec<TravelPackage>>>,
}

impl AppCache {
    /// Create caches with TTLs from configuration
    pub fn new(config: &AppConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &AppConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            locations: TtlCache::new("locations", config.locations_ttl, Arc::clone(&clock)),
            routes: TtlCache::new("routes", config.routes_ttl, Arc::clone(&clock)),
            excursions: TtlCache::new("excursions", config.cache_default_ttl, Arc::clone(&clock)),
            packages: TtlCache::new("packages", config.cache_default_ttl, clock),
        }
    }

    /// Get cache statistics for diagnostics
    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            locations: self.locations.stats().await,
            routes: self.routes.stats().await,
            excursions: self.excursions.stats().await,
            packages: self.packages.stats().await,
        }
    }

    /// Invalidate all caches
    pub async fn invalidate_all(&self) {
        self.locations.clear().await;
        self.routes.clear().await;
        self.excursions.clear().await;
        self.packages.clear().await;
        info!("All caches invalidated");
    }

    pub fn locations_key() -> String {
        "locations:all".to_string()
    }

    pub fn route_key(origin: LocationId, destination: LocationId) -> String {
        cache_key(["route".to_string(), origin.to_string(), destination.to_string()])
    }

    pub fn excursions_key(location: &str) -> String {
        cache_key(["excursions", location.trim()])
    }

    pub fn packages_key() -> String {
        "packages:active".to_string()
    }
}

/// Cache statistics for diagnostics
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub locations: CacheSnapshot,
    pub routes: CacheSnapshot,
    pub excursions: CacheSnapshot,
    pub packages: CacheSnapshot,
}

/// Load the location list into the cache.
///
/// A failure is logged; the first calculator that needs the list fetches it.
pub async fn warm_cache<B: Backend + ?Sized>(cache: &AppCache, backend: &B) {
    info!("Starting cache warm-up...");

    match backend.fetch_locations().await {
        Ok(locations) => {
            let count = locations.len();
            cache
                .locations
                .set(AppCache::locations_key(), Arc::new(locations), None)
                .await;
            info!("Cache warm-up complete: {} locations", count);
        }
        Err(e) => warn!("Failed to warm locations cache: {}", e),
    }
}
