//! Redis implementation of the store contract.

use super::{pool_error, redis_error};
use crate::KeyValueStore;
use async_trait::async_trait;
use deadpool_redis::Pool;
use redis::AsyncCommands;
use shaku::Component;
use stash_core::{StashError, StashResult};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Default `SCAN` count hint and delete batch size.
pub const DEFAULT_SCAN_COUNT: usize = 500;

/// Redis-based store.
#[derive(Component)]
#[shaku(interface = KeyValueStore)]
pub struct RedisStore {
    /// Redis connection pool. `None` when Redis is disabled.
    pool: Option<Arc<Pool>>,
    /// `SCAN` count hint and batch size for multi-key deletes.
    #[shaku(default = DEFAULT_SCAN_COUNT)]
    scan_count: usize,
}

impl RedisStore {
    /// Create a new Redis store.
    #[must_use]
    pub fn new(pool: Arc<Pool>) -> Self {
        Self {
            pool: Some(pool),
            scan_count: DEFAULT_SCAN_COUNT,
        }
    }

    /// Create a store with a custom scan count.
    #[must_use]
    pub fn with_scan_count(pool: Arc<Pool>, scan_count: usize) -> Self {
        Self {
            pool: Some(pool),
            scan_count: scan_count.max(1),
        }
    }

    /// Create a store that fails every call with [`StashError::Disabled`].
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            pool: None,
            scan_count: DEFAULT_SCAN_COUNT,
        }
    }

    /// Returns true when backed by a pool.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.pool.is_some()
    }

    /// Get a connection from the pool.
    async fn conn(&self) -> StashResult<deadpool_redis::Connection> {
        match &self.pool {
            Some(pool) => pool.get().await.map_err(pool_error),
            None => Err(StashError::Disabled),
        }
    }
}

/// Milliseconds for `PSETEX`, never rounding a positive TTL down to zero.
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> StashResult<Option<String>> {
        let mut conn = self.conn().await?;
        let value: Option<String> = conn.get(key).await.map_err(|e| redis_error("GET", key, e))?;

        match &value {
            Some(_) => debug!("Cache hit for key '{}'", key),
            None => debug!("Cache miss for key '{}'", key),
        }

        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> StashResult<()> {
        if ttl.is_some_and(|ttl| ttl.is_zero()) {
            return Err(StashError::invalid_argument("TTL must be positive"));
        }

        let mut conn = self.conn().await?;

        match ttl {
            Some(ttl) => {
                let millis = ttl_millis(ttl);
                conn.pset_ex::<_, _, ()>(key, value, millis)
                    .await
                    .map_err(|e| redis_error("PSETEX", key, e))?;
                debug!("Stored key '{}' with TTL {}ms", key, millis);
            }
            None => {
                conn.set::<_, _, ()>(key, value)
                    .await
                    .map_err(|e| redis_error("SET", key, e))?;
                debug!("Stored key '{}'", key);
            }
        }

        Ok(())
    }

    async fn get_set(&self, key: &str, value: &str) -> StashResult<Option<String>> {
        let mut conn = self.conn().await?;
        let previous: Option<String> = conn
            .getset(key, value)
            .await
            .map_err(|e| redis_error("GETSET", key, e))?;

        debug!("Replaced key '{}' (had value: {})", key, previous.is_some());
        Ok(previous)
    }

    async fn exists(&self, key: &str) -> StashResult<bool> {
        let mut conn = self.conn().await?;
        let exists: bool = conn.exists(key).await.map_err(|e| redis_error("EXISTS", key, e))?;
        Ok(exists)
    }

    async fn delete(&self, key: &str) -> StashResult<bool> {
        let mut conn = self.conn().await?;
        let deleted: u64 = conn.del(key).await.map_err(|e| redis_error("DEL", key, e))?;

        debug!("Deleted key '{}': {}", key, deleted > 0);
        Ok(deleted > 0)
    }

    async fn delete_many(&self, keys: &[String]) -> StashResult<u64> {
        if keys.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn().await?;
        let mut deleted = 0u64;

        for chunk in keys.chunks(self.scan_count.max(1)) {
            let removed: u64 = conn
                .del(chunk)
                .await
                .map_err(|e| redis_error("DEL", &chunk[0], e))?;
            deleted += removed;
        }

        debug!("Deleted {} of {} keys", deleted, keys.len());
        Ok(deleted)
    }

    async fn keys(&self, pattern: &str) -> StashResult<Vec<String>> {
        let mut conn = self.conn().await?;
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;

        // Cursor-based SCAN instead of KEYS so the server is never blocked
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(self.scan_count)
                .query_async(&mut *conn)
                .await
                .map_err(|e| redis_error("SCAN", pattern, e))?;

            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        // SCAN may return a key more than once
        keys.sort();
        keys.dedup();

        debug!("Found {} keys matching pattern '{}'", keys.len(), pattern);
        Ok(keys)
    }

    async fn list_push(&self, key: &str, value: &str) -> StashResult<u64> {
        let mut conn = self.conn().await?;
        let len: u64 = conn.rpush(key, value).await.map_err(|e| redis_error("RPUSH", key, e))?;
        Ok(len)
    }

    async fn list_push_all(&self, key: &str, values: &[String]) -> StashResult<u64> {
        let mut conn = self.conn().await?;
        let len: u64 = conn.rpush(key, values).await.map_err(|e| redis_error("RPUSH", key, e))?;

        debug!("Appended {} values to list '{}'", values.len(), key);
        Ok(len)
    }

    async fn list_remove(&self, key: &str, count: i64, value: &str) -> StashResult<u64> {
        let mut conn = self.conn().await?;
        let count = isize::try_from(count)
            .map_err(|_| {
                StashError::invalid_argument(format!("LREM count out of range: {}", count))
            })?;
        let removed: u64 = conn
            .lrem(key, count, value)
            .await
            .map_err(|e| redis_error("LREM", key, e))?;
        Ok(removed)
    }

    async fn list_range(&self, key: &str) -> StashResult<Vec<String>> {
        let mut conn = self.conn().await?;
        let items: Vec<String> = conn
            .lrange(key, 0, -1)
            .await
            .map_err(|e| redis_error("LRANGE", key, e))?;
        Ok(items)
    }

    async fn hash_put_all(&self, key: &str, fields: &HashMap<String, String>) -> StashResult<()> {
        let mut conn = self.conn().await?;
        let items: Vec<(&str, &str)> = fields
            .iter()
            .map(|(f, v)| (f.as_str(), v.as_str()))
            .collect();

        conn.hset_multiple::<_, _, _, ()>(key, &items)
            .await
            .map_err(|e| redis_error("HSET", key, e))?;

        debug!("Wrote {} fields to hash '{}'", items.len(), key);
        Ok(())
    }

    async fn hash_delete(&self, key: &str, field: &str) -> StashResult<bool> {
        let mut conn = self.conn().await?;
        let removed: u64 = conn.hdel(key, field).await.map_err(|e| redis_error("HDEL", key, e))?;
        Ok(removed > 0)
    }

    async fn hash_get_all(&self, key: &str) -> StashResult<HashMap<String, String>> {
        let mut conn = self.conn().await?;
        let fields: HashMap<String, String> =
            conn.hgetall(key).await.map_err(|e| redis_error("HGETALL", key, e))?;
        Ok(fields)
    }

    async fn incr(&self, key: &str) -> StashResult<i64> {
        let mut conn = self.conn().await?;
        let value: i64 = conn.incr(key, 1i64).await.map_err(|e| redis_error("INCR", key, e))?;
        Ok(value)
    }

    async fn ping(&self) -> StashResult<()> {
        let mut conn = self.conn().await?;
        let _: String = redis::cmd("PING")
            .query_async(&mut *conn)
            .await
            .map_err(|e| redis_error("PING", "", e))?;
        Ok(())
    }
}
