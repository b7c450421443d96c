//! SQLite-backed forecast cache
//!
//! Entries are stored as JSON payloads. `expires_at` is written as fixed-width
//! RFC 3339 UTC so text comparison in SQL matches chronological order.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, OptionalExtension};
use tracing::{debug, warn};

use super::Database;
use crate::cache::{CacheKey, ForecastCacheStore};
use crate::error::Result;
use crate::models::CacheEntry;

fn timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl Database {
    fn cache_get(&self, key: &str, now: DateTime<Utc>) -> Result<Option<CacheEntry>> {
        let conn = self.conn()?;
        let payload: Option<String> = conn
            .query_row(
                "SELECT payload FROM forecast_cache WHERE cache_key = ?",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        let Some(payload) = payload else {
            return Ok(None);
        };

        match serde_json::from_str::<CacheEntry>(&payload) {
            Ok(entry) if entry.is_expired(now) => {
                debug!(key = %key, "Evicting expired forecast");
                conn.execute(
                    "DELETE FROM forecast_cache WHERE cache_key = ?",
                    params![key],
                )?;
                Ok(None)
            }
            Ok(entry) => Ok(Some(entry)),
            Err(e) => {
                warn!(key = %key, "Dropping unreadable cached forecast: {}", e);
                conn.execute(
                    "DELETE FROM forecast_cache WHERE cache_key = ?",
                    params![key],
                )?;
                Ok(None)
            }
        }
    }

    fn cache_set(&self, key: &str, entry: &CacheEntry) -> Result<()> {
        let payload = serde_json::to_string(entry)?;
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO forecast_cache (cache_key, payload, generated_at, expires_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(cache_key) DO UPDATE SET
                payload = excluded.payload,
                generated_at = excluded.generated_at,
                expires_at = excluded.expires_at
            "#,
            params![
                key,
                payload,
                timestamp(entry.generated_at),
                timestamp(entry.expires_at)
            ],
        )?;
        Ok(())
    }

    /// Number of cached forecasts, live or not
    pub fn cached_forecast_count(&self) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM forecast_cache", [], |row| {
            row.get(0)
        })?;
        Ok(count as usize)
    }
}

#[async_trait]
impl ForecastCacheStore for Database {
    async fn get(&self, key: &CacheKey, now: DateTime<Utc>) -> Result<Option<CacheEntry>> {
        self.cache_get(&key.to_string(), now)
    }

    async fn set(&self, key: &CacheKey, entry: &CacheEntry) -> Result<()> {
        self.cache_set(&key.to_string(), entry)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM forecast_cache WHERE expires_at <= ?",
            params![timestamp(now)],
        )?;
        Ok(removed)
    }

    async fn clear(&self) -> Result<usize> {
        let conn = self.conn()?;
        let removed = conn.execute("DELETE FROM forecast_cache", [])?;
        Ok(removed)
    }
}
