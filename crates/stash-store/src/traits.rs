//! The store contract the cache facade is written against.

use async_trait::async_trait;
use shaku::Interface;
use stash_core::StashResult;
use std::collections::HashMap;
use std::time::Duration;

/// Narrow key-value store contract.
///
/// Every method is a single round-trip to the store. Implementations do not
/// retry and do not swallow errors; normalizing outcomes is the facade's job.
#[async_trait]
pub trait KeyValueStore: Interface + Send + Sync {
    /// Get a string value. `None` if the key doesn't exist or has expired.
    async fn get(&self, key: &str) -> StashResult<Option<String>>;

    /// Set a string value, optionally expiring after `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> StashResult<()>;

    /// Set a value and return the previous one.
    async fn get_set(&self, key: &str, value: &str) -> StashResult<Option<String>>;

    /// Check if a key exists.
    async fn exists(&self, key: &str) -> StashResult<bool>;

    /// Delete a key. Returns `true` if the key existed.
    async fn delete(&self, key: &str) -> StashResult<bool>;

    /// Delete several keys. Returns the number of keys removed.
    async fn delete_many(&self, keys: &[String]) -> StashResult<u64>;

    /// List keys matching a glob pattern.
    async fn keys(&self, pattern: &str) -> StashResult<Vec<String>>;

    /// Append a value to the tail of a list. Returns the new length.
    async fn list_push(&self, key: &str, value: &str) -> StashResult<u64>;

    /// Append values to the tail of a list in order. Returns the new length.
    async fn list_push_all(&self, key: &str, values: &[String]) -> StashResult<u64>;

    /// Remove occurrences of `value`, with Redis `LREM` count semantics.
    /// Returns the number of removed elements.
    async fn list_remove(&self, key: &str, count: i64, value: &str) -> StashResult<u64>;

    /// Read a whole list.
    async fn list_range(&self, key: &str) -> StashResult<Vec<String>>;

    /// Write several hash fields.
    async fn hash_put_all(&self, key: &str, fields: &HashMap<String, String>) -> StashResult<()>;

    /// Delete a hash field. Returns `true` if the field existed.
    async fn hash_delete(&self, key: &str, field: &str) -> StashResult<bool>;

    /// Read all fields of a hash.
    async fn hash_get_all(&self, key: &str) -> StashResult<HashMap<String, String>>;

    /// Atomically increment an integer key by one, returning the new value.
    async fn incr(&self, key: &str) -> StashResult<i64>;

    /// Round-trip health check.
    async fn ping(&self) -> StashResult<()>;
}
