//! Forecast cache
//!
//! Keyed, TTL-bound storage of raw AI forecasts. The key covers the user, both
//! window lengths, the AI flag and all five filter toggles, so toggling a
//! filter never reuses a forecast generated for another request shape.
//!
//! Stores are injected into the engine; a failing store is treated as a miss
//! by the caller.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{CacheEntry, TrendFilters, TrendRequest};

/// Deterministic cache key for one request shape
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub user_id: String,
    pub history_days: u32,
    pub forecast_days: u32,
    pub use_ai: bool,
    pub filters: TrendFilters,
}

impl CacheKey {
    pub fn for_request(request: &TrendRequest) -> Self {
        Self {
            user_id: request.user_id.clone(),
            history_days: request.history_days,
            forecast_days: request.forecast_days,
            use_ai: request.use_ai,
            filters: request.filters,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = |b: bool| u8::from(b);
        write!(
            f,
            "trend:{}:h{}:f{}:ai{}:ri{}:re{}:pi{}:pe{}:bl{}",
            self.user_id,
            self.history_days,
            self.forecast_days,
            flag(self.use_ai),
            flag(self.filters.include_recurring_income),
            flag(self.filters.include_recurring_expense),
            flag(self.filters.include_planned_income),
            flag(self.filters.include_planned_expenses),
            flag(self.filters.include_budget_limits),
        )
    }
}

/// Key-value store for cached forecasts
///
/// Implementations must be safe for concurrent use; last write wins.
#[async_trait]
pub trait ForecastCacheStore: Send + Sync {
    /// Fetch a live entry; expired entries are reported as a miss
    async fn get(&self, key: &CacheKey, now: DateTime<Utc>) -> Result<Option<CacheEntry>>;

    /// Store an entry, replacing any previous one
    async fn set(&self, key: &CacheKey, entry: &CacheEntry) -> Result<()>;

    /// Drop expired entries, returning how many were removed
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize>;

    /// Drop everything, returning how many entries were removed
    async fn clear(&self) -> Result<usize>;
}

/// Process-local cache store
#[derive(Default)]
pub struct MemoryForecastCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryForecastCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lock_error() -> Error {
    Error::InvalidData("Failed to acquire forecast cache lock".into())
}

#[async_trait]
impl ForecastCacheStore for MemoryForecastCache {
    async fn get(&self, key: &CacheKey, now: DateTime<Utc>) -> Result<Option<CacheEntry>> {
        let key = key.to_string();
        let entry = {
            let entries = self.entries.read().map_err(|_| lock_error())?;
            entries.get(&key).cloned()
        };

        match entry {
            Some(entry) if entry.is_expired(now) => {
                debug!(key = %key, "Evicting expired forecast");
                self.entries.write().map_err(|_| lock_error())?.remove(&key);
                Ok(None)
            }
            other => Ok(other),
        }
    }

    async fn set(&self, key: &CacheKey, entry: &CacheEntry) -> Result<()> {
        self.entries
            .write()
            .map_err(|_| lock_error())?
            .insert(key.to_string(), entry.clone());
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut entries = self.entries.write().map_err(|_| lock_error())?;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        Ok(before - entries.len())
    }

    async fn clear(&self) -> Result<usize> {
        let mut entries = self.entries.write().map_err(|_| lock_error())?;
        let removed = entries.len();
        entries.clear();
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn key() -> CacheKey {
        CacheKey::for_request(&TrendRequest::new("alice", 30, 14).with_ai(true))
    }

    fn entry(now: DateTime<Utc>, ttl_hours: i64) -> CacheEntry {
        CacheEntry {
            daily_income: vec![0.0, 10.0],
            daily_expense: vec![5.0, 5.0],
            daily_capital: vec![Some(995.0), None],
            base_capital: 1000.0,
            generated_at: now,
            expires_at: now + Duration::hours(ttl_hours),
        }
    }

    #[test]
    fn test_key_format_is_deterministic() {
        let k = key();
        assert_eq!(k.to_string(), "trend:alice:h30:f14:ai1:ri0:re0:pi0:pe0:bl0");
        assert_eq!(k.to_string(), key().to_string());
    }

    #[test]
    fn test_key_changes_with_any_filter() {
        let base = key();
        let mut toggled = base.clone();
        toggled.filters.include_budget_limits = true;
        assert_ne!(base.to_string(), toggled.to_string());
        assert!(toggled.to_string().ends_with("bl1"));
    }

    #[test]
    fn test_keys_hash_by_filters() {
        let base = key();
        let mut toggled = base.clone();
        toggled.filters.include_planned_income = true;

        let keys: std::collections::HashSet<CacheKey> =
            [base.clone(), toggled, base].into_iter().collect();
        assert_eq!(keys.len(), 2);
    }

    #[tokio::test]
    async fn test_memory_roundtrip() {
        let cache = MemoryForecastCache::new();
        let now = Utc::now();
        assert!(cache.get(&key(), now).await.unwrap().is_none());

        cache.set(&key(), &entry(now, 12)).await.unwrap();
        let hit = cache.get(&key(), now).await.unwrap().unwrap();
        assert_eq!(hit.daily_income, vec![0.0, 10.0]);
        assert_eq!(hit.base_capital, 1000.0);
    }

    #[tokio::test]
    async fn test_memory_expired_entry_is_miss_and_evicted() {
        let cache = MemoryForecastCache::new();
        let now = Utc::now();
        cache.set(&key(), &entry(now, 12)).await.unwrap();

        let later = now + Duration::hours(12);
        assert!(cache.get(&key(), later).await.unwrap().is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_memory_purge_and_clear() {
        let cache = MemoryForecastCache::new();
        let now = Utc::now();
        let mut other = key();
        other.forecast_days = 60;

        cache.set(&key(), &entry(now, 1)).await.unwrap();
        cache.set(&other, &entry(now, 24)).await.unwrap();

        assert_eq!(cache.purge_expired(now + Duration::hours(2)).await.unwrap(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.clear().await.unwrap(), 1);
        assert!(cache.is_empty());
    }
}
