//! Redis-backed cache store.
//!
//! The store is a single long-lived resource created at startup and shared
//! by all requests. A failed connection leaves the service running in a
//! degraded, cache-disabled mode: reads report [`CacheLookup::Unavailable`]
//! and writes fail with a not-connected error that callers on the data path
//! swallow. Cache availability must never gate data availability.
//!
//! An in-memory backend with the same contract (TTL expiry, pattern
//! deletion) backs tests and cache-less local runs.

use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use serde::{Serialize, de::DeserializeOwned};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::error::{AppError, AppResult};

/// Outcome of a cache read.
///
/// `Unavailable` (backend down or operation failed) is distinct from `Miss`
/// so the policy of treating it as a miss lives with the caller, not here.
#[derive(Debug)]
pub enum CacheLookup<T> {
    Hit(T),
    Miss,
    Unavailable,
}

#[derive(Clone)]
struct MemoryEntry {
    raw: String,
    expires_at: Instant,
}

#[derive(Clone)]
enum Backend {
    Redis(ConnectionManager),
    Memory(Arc<Mutex<HashMap<String, MemoryEntry>>>),
}

/// Shared cache client. The production backend is Redis via
/// `ConnectionManager` for automatic reconnection; the connected flag
/// tracks the last observed connection state, flipped down on transport
/// errors and back up on any success.
#[derive(Clone)]
pub struct CacheStore {
    backend: Option<Backend>,
    connected: Arc<AtomicBool>,
    default_ttl_seconds: u64,
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("connected", &self.is_connected())
            .field("default_ttl_seconds", &self.default_ttl_seconds)
            .finish_non_exhaustive()
    }
}

impl CacheStore {
    /// Connect to the cache backend.
    ///
    /// Connection failure is not fatal: the store is returned in a
    /// disconnected state and the service continues without caching.
    pub async fn connect(redis_url: &str, default_ttl_seconds: u64) -> Self {
        let manager = match redis::Client::open(redis_url) {
            Ok(client) => ConnectionManager::new(client).await,
            Err(e) => Err(e),
        };

        match manager {
            Ok(conn) => {
                tracing::info!(ttl = default_ttl_seconds, "Cache store connected");
                Self {
                    backend: Some(Backend::Redis(conn)),
                    connected: Arc::new(AtomicBool::new(true)),
                    default_ttl_seconds,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Cache store unavailable, continuing without caching");
                Self::disconnected(default_ttl_seconds)
            }
        }
    }

    /// A store with no backing connection. Every read reports
    /// `Unavailable` and every write fails with a not-connected error.
    #[must_use]
    pub fn disconnected(default_ttl_seconds: u64) -> Self {
        Self {
            backend: None,
            connected: Arc::new(AtomicBool::new(false)),
            default_ttl_seconds,
        }
    }

    /// A connected store backed by process memory instead of Redis.
    /// Honors the same TTL and pattern-deletion contract.
    #[must_use]
    pub fn in_memory(default_ttl_seconds: u64) -> Self {
        Self {
            backend: Some(Backend::Memory(Arc::new(Mutex::new(HashMap::new())))),
            connected: Arc::new(AtomicBool::new(true)),
            default_ttl_seconds,
        }
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.backend.is_some() && self.connected.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn default_ttl_seconds(&self) -> u64 {
        self.default_ttl_seconds
    }

    /// Graceful close, idempotent. The underlying connection drops with the
    /// process; this makes every subsequent operation short-circuit.
    pub fn disconnect(&self) {
        if self.connected.swap(false, Ordering::Relaxed) {
            tracing::info!("Cache store disconnected");
        }
    }

    fn backend(&self) -> Option<Backend> {
        if self.is_connected() {
            self.backend.clone()
        } else {
            None
        }
    }

    fn mark_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Relaxed);
    }

    /// Read and deserialize a value.
    ///
    /// Backend errors are logged and reported as `Unavailable`, never
    /// propagated: a broken cache must not break the primary data path.
    /// An undeserializable entry is treated as a miss.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> CacheLookup<T> {
        let Some(backend) = self.backend() else {
            return CacheLookup::Unavailable;
        };

        let raw = match backend {
            Backend::Redis(mut conn) => match conn.get::<_, Option<String>>(key).await {
                Ok(raw) => {
                    self.mark_connected(true);
                    raw
                }
                Err(e) => {
                    self.mark_connected(false);
                    tracing::warn!(cache_key = %key, error = %e, "Cache GET failed");
                    return CacheLookup::Unavailable;
                }
            },
            Backend::Memory(map) => memory_get(&map, key),
        };

        match raw {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    tracing::debug!(cache_key = %key, "cache_hit");
                    CacheLookup::Hit(value)
                }
                Err(e) => {
                    tracing::warn!(cache_key = %key, error = %e, "Discarding undeserializable cache entry");
                    CacheLookup::Miss
                }
            },
            None => {
                tracing::debug!(cache_key = %key, "cache_miss");
                CacheLookup::Miss
            }
        }
    }

    /// Serialize and store a value with an expiry.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Cache` when the store is disconnected or the
    /// SETEX fails. Callers on the data path treat this as best-effort.
    pub async fn set_json<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl_seconds: Option<u64>,
    ) -> AppResult<()> {
        let Some(backend) = self.backend() else {
            return Err(AppError::Cache("Cache store not connected".to_string()));
        };

        let raw = serde_json::to_string(value)
            .map_err(|e| AppError::Internal(format!("Cache serialization failed: {e}")))?;
        let ttl = ttl_seconds.unwrap_or(self.default_ttl_seconds);

        match backend {
            Backend::Redis(mut conn) => match conn.set_ex::<_, _, ()>(key, raw, ttl).await {
                Ok(()) => {
                    self.mark_connected(true);
                }
                Err(e) => {
                    self.mark_connected(false);
                    return Err(AppError::Cache(format!("Cache SETEX failed for {key}: {e}")));
                }
            },
            Backend::Memory(map) => {
                lock(&map).insert(
                    key.to_string(),
                    MemoryEntry {
                        raw,
                        expires_at: Instant::now() + Duration::from_secs(ttl),
                    },
                );
            }
        }

        tracing::debug!(cache_key = %key, ttl_seconds = ttl, "cache_stored");
        Ok(())
    }

    /// Remove a single key. Returns whether a key was actually deleted.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Cache` when the store is disconnected or the
    /// operation fails; used from admin paths where failure must be visible.
    pub async fn delete(&self, key: &str) -> AppResult<bool> {
        let Some(backend) = self.backend() else {
            return Err(AppError::Cache("Cache store not connected".to_string()));
        };

        let removed = match backend {
            Backend::Redis(mut conn) => match conn.del::<_, i64>(key).await {
                Ok(count) => {
                    self.mark_connected(true);
                    count > 0
                }
                Err(e) => {
                    self.mark_connected(false);
                    return Err(AppError::Cache(format!("Cache DEL failed for {key}: {e}")));
                }
            },
            Backend::Memory(map) => lock(&map).remove(key).is_some(),
        };

        tracing::debug!(cache_key = %key, "cache_deleted");
        Ok(removed)
    }

    /// Remove a batch of keys, returning how many existed.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Cache` when the store is disconnected or the
    /// operation fails.
    pub async fn delete_all(&self, keys: &[String]) -> AppResult<usize> {
        if keys.is_empty() {
            return Ok(0);
        }

        let Some(backend) = self.backend() else {
            return Err(AppError::Cache("Cache store not connected".to_string()));
        };

        match backend {
            Backend::Redis(mut conn) => match conn.del::<_, i64>(keys).await {
                Ok(count) => {
                    self.mark_connected(true);
                    Ok(usize::try_from(count.max(0)).unwrap_or(0))
                }
                Err(e) => {
                    self.mark_connected(false);
                    Err(AppError::Cache(format!("Cache bulk DEL failed: {e}")))
                }
            },
            Backend::Memory(map) => {
                let mut map = lock(&map);
                Ok(keys.iter().filter(|k| map.remove(*k).is_some()).count())
            }
        }
    }

    /// # Errors
    ///
    /// Returns `AppError::Cache` when the store is disconnected or the
    /// operation fails.
    pub async fn exists(&self, key: &str) -> AppResult<bool> {
        let Some(backend) = self.backend() else {
            return Err(AppError::Cache("Cache store not connected".to_string()));
        };

        match backend {
            Backend::Redis(mut conn) => match conn.exists::<_, bool>(key).await {
                Ok(exists) => {
                    self.mark_connected(true);
                    Ok(exists)
                }
                Err(e) => {
                    self.mark_connected(false);
                    Err(AppError::Cache(format!("Cache EXISTS failed for {key}: {e}")))
                }
            },
            Backend::Memory(map) => Ok(memory_get(&map, key).is_some()),
        }
    }

    /// Remaining TTL in seconds, or `None` when the key is absent or has
    /// no expiry (Redis reports -2 and -1 respectively).
    ///
    /// # Errors
    ///
    /// Returns `AppError::Cache` when the store is disconnected or the
    /// operation fails.
    pub async fn ttl_seconds(&self, key: &str) -> AppResult<Option<i64>> {
        let Some(backend) = self.backend() else {
            return Err(AppError::Cache("Cache store not connected".to_string()));
        };

        match backend {
            Backend::Redis(mut conn) => match conn.ttl::<_, i64>(key).await {
                Ok(ttl) if ttl >= 0 => {
                    self.mark_connected(true);
                    Ok(Some(ttl))
                }
                Ok(_) => {
                    self.mark_connected(true);
                    Ok(None)
                }
                Err(e) => {
                    self.mark_connected(false);
                    Err(AppError::Cache(format!("Cache TTL failed for {key}: {e}")))
                }
            },
            Backend::Memory(map) => {
                let now = Instant::now();
                Ok(lock(&map)
                    .get(key)
                    .filter(|entry| entry.expires_at > now)
                    .map(|entry| {
                        i64::try_from((entry.expires_at - now).as_secs()).unwrap_or(i64::MAX)
                    }))
            }
        }
    }

    /// List keys matching a pattern. The keyspace holds a handful of
    /// namespaced entries, so KEYS is appropriate here. The memory backend
    /// supports the only glob shape in use, a trailing `*`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Cache` when the store is disconnected or the
    /// operation fails.
    pub async fn keys(&self, pattern: &str) -> AppResult<Vec<String>> {
        let Some(backend) = self.backend() else {
            return Err(AppError::Cache("Cache store not connected".to_string()));
        };

        match backend {
            Backend::Redis(mut conn) => match conn.keys::<_, Vec<String>>(pattern).await {
                Ok(keys) => {
                    self.mark_connected(true);
                    Ok(keys)
                }
                Err(e) => {
                    self.mark_connected(false);
                    Err(AppError::Cache(format!("Cache KEYS failed for {pattern}: {e}")))
                }
            },
            Backend::Memory(map) => {
                let now = Instant::now();
                Ok(lock(&map)
                    .iter()
                    .filter(|(key, entry)| entry.expires_at > now && glob_match(pattern, key))
                    .map(|(key, _)| key.clone())
                    .collect())
            }
        }
    }
}

fn lock(map: &Arc<Mutex<HashMap<String, MemoryEntry>>>) -> std::sync::MutexGuard<'_, HashMap<String, MemoryEntry>> {
    map.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Read a live entry, dropping it if expired.
fn memory_get(map: &Arc<Mutex<HashMap<String, MemoryEntry>>>, key: &str) -> Option<String> {
    let mut map = lock(map);
    match map.get(key) {
        Some(entry) if entry.expires_at > Instant::now() => Some(entry.raw.clone()),
        Some(_) => {
            map.remove(key);
            None
        }
        None => None,
    }
}

fn glob_match(pattern: &str, key: &str) -> bool {
    pattern
        .strip_suffix('*')
        .map_or(pattern == key, |prefix| key.starts_with(prefix))
}
