//! Cache facade over a key-value store.

use crate::keys;
use crate::metrics::CacheMetrics;
use stash_core::{CacheOutcome, StashError, StashResult};
use stash_store::KeyValueStore;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Cache facade.
///
/// Forwards every call to the store and normalizes the result. Mutating
/// operations report a [`CacheOutcome`]; reads propagate store errors.
/// Holds no state besides the store handle, so it can be shared freely
/// behind an `Arc`.
#[derive(Clone)]
pub struct CacheFacade {
    store: Arc<dyn KeyValueStore>,
}

impl CacheFacade {
    /// Create a facade over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Create a facade resolving the store from a shaku module.
    #[must_use]
    pub fn from_module<M>(module: &M) -> Self
    where
        M: shaku::HasComponent<dyn KeyValueStore>,
    {
        Self::new(module.resolve())
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Read a string value.
    pub async fn get(&self, key: &str) -> StashResult<Option<String>> {
        let started = Instant::now();
        let result = self.store.get(key).await;
        observe("get", key, started, result)
    }

    /// Store a value without expiry.
    pub async fn set(&self, key: &str, value: &str) -> CacheOutcome {
        let started = Instant::now();
        let outcome = self.store.set(key, value, None).await.into();
        finish("set", key, started, outcome)
    }

    /// Store a value that expires after `ttl`.
    ///
    /// A zero TTL fails with [`StashError::InvalidArgument`] and never
    /// reaches the store.
    pub async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> CacheOutcome {
        let started = Instant::now();
        let outcome = if ttl.is_zero() {
            CacheOutcome::Failed(StashError::invalid_argument("TTL must be positive"))
        } else {
            self.store.set(key, value, Some(ttl)).await.into()
        };
        finish("set_with_ttl", key, started, outcome)
    }

    /// Store a value under a fresh key `prefix:n`.
    ///
    /// `n` comes from an atomic increment of the counter at key `prefix`,
    /// starting at 0. Concurrent callers always receive distinct keys.
    /// Returns the key that was written.
    pub async fn set_auto_key(&self, prefix: &str, value: &str) -> CacheOutcome<String> {
        let started = Instant::now();
        let outcome = match self.next_auto_key(prefix).await {
            Ok(key) => match self.store.set(&key, value, None).await {
                Ok(()) => {
                    debug!("Stored auto key '{}'", key);
                    CacheOutcome::Done(key)
                }
                Err(e) => CacheOutcome::Failed(e),
            },
            Err(e) => CacheOutcome::Failed(e),
        };
        finish("set_auto_key", prefix, started, outcome)
    }

    async fn next_auto_key(&self, prefix: &str) -> StashResult<String> {
        let next = self.store.incr(&keys::counter_key(prefix)).await?;
        Ok(keys::auto_key(prefix, next - 1))
    }

    /// Check whether a key exists.
    ///
    /// `Done` when present, `NotFound` when absent. A store failure is
    /// reported as `Failed` rather than as absence.
    pub async fn has_key(&self, key: &str) -> CacheOutcome {
        let started = Instant::now();
        let outcome = match self.store.exists(key).await {
            Ok(hit) => CacheOutcome::from_hit(hit),
            Err(e) => CacheOutcome::Failed(e),
        };
        finish("has_key", key, started, outcome)
    }

    /// Replace a value, returning the previous one.
    pub async fn get_and_set(&self, key: &str, value: &str) -> CacheOutcome<Option<String>> {
        let started = Instant::now();
        let outcome = self.store.get_set(key, value).await.into();
        finish("get_and_set", key, started, outcome)
    }

    /// Delete a key. `NotFound` when the key did not exist.
    pub async fn delete(&self, key: &str) -> CacheOutcome {
        let started = Instant::now();
        let outcome = match self.store.delete(key).await {
            Ok(deleted) => CacheOutcome::from_hit(deleted),
            Err(e) => CacheOutcome::Failed(e),
        };
        finish("delete", key, started, outcome)
    }

    /// Delete every key starting with `prefix`. Returns the number removed.
    ///
    /// The prefix is literal: glob metacharacters in it are escaped.
    pub async fn delete_by_prefix(&self, prefix: &str) -> StashResult<u64> {
        let started = Instant::now();
        let result = self.delete_prefixed(prefix).await;
        if let Ok(count) = &result {
            CacheMetrics::prefix_deleted(*count);
        }
        observe("delete_by_prefix", prefix, started, result)
    }

    async fn delete_prefixed(&self, prefix: &str) -> StashResult<u64> {
        let keys = self.store.keys(&keys::prefix_pattern(prefix)).await?;
        if keys.is_empty() {
            return Ok(0);
        }
        self.store.delete_many(&keys).await
    }

    /// List every key starting with `prefix`, sorted.
    pub async fn keys_by_prefix(&self, prefix: &str) -> StashResult<Vec<String>> {
        let started = Instant::now();
        let result = self
            .store
            .keys(&keys::prefix_pattern(prefix))
            .await
            .map(|mut keys| {
                keys.sort();
                keys
            });
        observe("keys_by_prefix", prefix, started, result)
    }

    /// Strict existence check that propagates store errors.
    pub async fn exists(&self, key: &str) -> StashResult<bool> {
        let started = Instant::now();
        let result = self.store.exists(key).await;
        observe("exists", key, started, result)
    }

    /// Append a value to a list. Carries the new length.
    pub async fn add_list(&self, key: &str, value: &str) -> CacheOutcome<u64> {
        let started = Instant::now();
        let outcome = self.store.list_push(key, value).await.into();
        finish("add_list", key, started, outcome)
    }

    /// Append values to a list in order. Carries the new length.
    ///
    /// An empty slice is `Done(0)` without a store call.
    pub async fn add_list_all(&self, key: &str, values: &[String]) -> CacheOutcome<u64> {
        if values.is_empty() {
            return CacheOutcome::Done(0);
        }

        let started = Instant::now();
        let outcome = self.store.list_push_all(key, values).await.into();
        finish("add_list_all", key, started, outcome)
    }

    /// Remove the first element equal to `value`, scanning from the head.
    ///
    /// `NotFound` when no element matched.
    pub async fn remove_first_list_match(&self, key: &str, value: &str) -> CacheOutcome {
        let started = Instant::now();
        let outcome = match self.store.list_remove(key, 1, value).await {
            Ok(removed) => CacheOutcome::from_hit(removed > 0),
            Err(e) => CacheOutcome::Failed(e),
        };
        finish("remove_first_list_match", key, started, outcome)
    }

    /// Read a whole list.
    pub async fn get_list(&self, key: &str) -> StashResult<Vec<String>> {
        let started = Instant::now();
        let result = self.store.list_range(key).await;
        observe("get_list", key, started, result)
    }

    /// Write several hash fields. An empty map is `Done` without a store call.
    pub async fn add_hash(&self, key: &str, fields: &HashMap<String, String>) -> CacheOutcome {
        if fields.is_empty() {
            return CacheOutcome::Done(());
        }

        let started = Instant::now();
        let outcome = self.store.hash_put_all(key, fields).await.into();
        finish("add_hash", key, started, outcome)
    }

    /// Delete one hash field. `NotFound` when the field was absent.
    pub async fn delete_hash_field(&self, key: &str, field: &str) -> CacheOutcome {
        let started = Instant::now();
        let outcome = match self.store.hash_delete(key, field).await {
            Ok(removed) => CacheOutcome::from_hit(removed),
            Err(e) => CacheOutcome::Failed(e),
        };
        finish("delete_hash_field", key, started, outcome)
    }

    /// Read all fields of a hash. Empty when the key doesn't exist.
    pub async fn get_all_hash_fields(&self, key: &str) -> StashResult<HashMap<String, String>> {
        let started = Instant::now();
        let result = self.store.hash_get_all(key).await;
        observe("get_all_hash_fields", key, started, result)
    }

    /// Health check against the store.
    pub async fn ping(&self) -> StashResult<()> {
        let started = Instant::now();
        let result = self.store.ping().await;
        observe("ping", "", started, result)
    }
}

fn finish<T>(
    op: &'static str,
    key: &str,
    started: Instant,
    outcome: CacheOutcome<T>,
) -> CacheOutcome<T> {
    if let Some(error) = outcome.error() {
        warn!(op, key, error = %error, "Cache operation failed");
    }
    CacheMetrics::operation(op, outcome.label(), started.elapsed());
    outcome
}

fn observe<T>(
    op: &'static str,
    key: &str,
    started: Instant,
    result: StashResult<T>,
) -> StashResult<T> {
    let label = match &result {
        Ok(_) => "done",
        Err(error) => {
            warn!(op, key, error = %error, "Cache read failed");
            "failed"
        }
    };
    CacheMetrics::operation(op, label, started.elapsed());
    result
}
