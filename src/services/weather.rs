//! Cache-aside retrieval of current weather, plus cache admin operations.
//!
//! Read path: check the cache, fall back to the upstream fetcher on miss,
//! write the fresh envelope back best-effort. Cache unavailability collapses
//! to miss behavior; a duplicate fetch from concurrent misses is accepted
//! (no single-flight de-duplication).

use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::cache::{CacheLookup, CacheStore, cache_key};
use crate::error::{AppError, AppResult};
use crate::hko::HkoClient;
use crate::hko::models::{LanguageCode, WeatherEnvelope};

/// Prefix under which all weather cache entries live; enables bulk
/// pattern-based invalidation.
pub const CACHE_NAMESPACE: &str = "weather";

/// Deterministic cache key for one language's current conditions.
#[must_use]
pub fn current_weather_key(language: LanguageCode) -> String {
    cache_key(CACHE_NAMESPACE, &["current", language.as_str()])
}

#[must_use]
pub fn namespace_pattern() -> String {
    format!("{CACHE_NAMESPACE}:*")
}

/// Remaining TTL of a cache entry, split for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct CacheTtl {
    pub minutes: i64,
    pub seconds: i64,
}

impl CacheTtl {
    #[must_use]
    pub fn from_seconds(total: i64) -> Self {
        Self {
            minutes: total / 60,
            seconds: total % 60,
        }
    }
}

/// Operational view of one language's cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CacheInfo {
    pub connected: bool,
    pub key: String,
    pub exists: bool,
    /// `None` when the entry is absent or expired.
    pub ttl: Option<CacheTtl>,
}

/// Orchestrates the upstream client and the cache store. Holds no
/// per-request state; safe to share across concurrent requests.
#[derive(Clone)]
pub struct WeatherService {
    client: Arc<HkoClient>,
    cache: CacheStore,
}

impl WeatherService {
    #[must_use]
    pub fn new(client: Arc<HkoClient>, cache: CacheStore) -> Self {
        Self { client, cache }
    }

    #[must_use]
    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Cache-aside read of current conditions.
    ///
    /// The language is pre-validated at the route boundary. Hits are
    /// returned as stored, annotated with `cached=true` and the key; the
    /// store's TTL is the only freshness control. Misses and cache
    /// unavailability both fall through to the fetcher. Failure envelopes
    /// are never cached.
    pub async fn get_current_weather(&self, language: LanguageCode) -> WeatherEnvelope {
        let key = current_weather_key(language);

        match self.cache.get_json::<WeatherEnvelope>(&key).await {
            CacheLookup::Hit(mut envelope) => {
                envelope.cached = true;
                envelope.cache_key = Some(key);
                return envelope;
            }
            CacheLookup::Miss | CacheLookup::Unavailable => {}
        }

        let envelope = self.client.fetch_current(language).await;

        if envelope.success && self.cache.is_connected() {
            // Best-effort: a failed write must not fail the request.
            if let Err(e) = self.cache.set_json(&key, &envelope, None).await {
                tracing::warn!(cache_key = %key, error = %e, "Cache write failed");
            }
        }

        envelope
    }

    /// Invalidate one language's entry, or the whole `weather:*` namespace
    /// when no language is given. Returns the number of keys removed.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Cache` when the store is not connected or a
    /// delete fails; admin callers expect the operation to have taken
    /// effect, so nothing is swallowed here.
    pub async fn clear_cache(&self, language: Option<LanguageCode>) -> AppResult<usize> {
        if !self.cache.is_connected() {
            return Err(AppError::Cache("Cache store not connected".to_string()));
        }

        match language {
            Some(language) => {
                let key = current_weather_key(language);
                let removed = self.cache.delete(&key).await?;
                tracing::info!(cache_key = %key, removed, "Cache entry cleared");
                Ok(usize::from(removed))
            }
            None => {
                let keys = self.cache.keys(&namespace_pattern()).await?;
                let removed = self.cache.delete_all(&keys).await?;
                tracing::info!(removed, "Cache namespace cleared");
                Ok(removed)
            }
        }
    }

    /// Inspect one language's cache entry: connection state, key,
    /// existence, and remaining TTL.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Cache` when the store is connected but an
    /// inspection command fails.
    pub async fn cache_info(&self, language: LanguageCode) -> AppResult<CacheInfo> {
        let key = current_weather_key(language);

        if !self.cache.is_connected() {
            return Ok(CacheInfo {
                connected: false,
                key,
                exists: false,
                ttl: None,
            });
        }

        let exists = self.cache.exists(&key).await?;
        let ttl = if exists {
            self.cache
                .ttl_seconds(&key)
                .await?
                .map(CacheTtl::from_seconds)
        } else {
            None
        };

        Ok(CacheInfo {
            connected: true,
            key,
            exists,
            ttl,
        })
    }
}
