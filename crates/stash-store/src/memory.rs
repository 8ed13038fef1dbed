//! Process-local store with Redis semantics.
//!
//! Used when Redis is disabled and as the backend for facade tests. Expiry
//! is lazy and driven by the tokio clock, so paused-time tests can advance
//! past a TTL without sleeping.

use crate::pattern::glob_match;
use crate::KeyValueStore;
use async_trait::async_trait;
use parking_lot::Mutex;
use stash_core::{StashError, StashResult};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone)]
enum Value {
    Str(String),
    List(Vec<String>),
    Hash(HashMap<String, String>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// In-memory [`KeyValueStore`].
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys.
    #[must_use]
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .values()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }

    /// Returns true if no live keys are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Drop `key` if it has expired, then return its live entry.
fn live<'a>(entries: &'a mut HashMap<String, Entry>, key: &str) -> Option<&'a mut Entry> {
    if entries.get(key).is_some_and(|entry| entry.is_expired(Instant::now())) {
        entries.remove(key);
        debug!(key = %key, "Expired key evicted");
    }
    entries.get_mut(key)
}

fn wrong_type(key: &str) -> StashError {
    StashError::WrongType(key.to_string())
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> StashResult<Option<String>> {
        let mut entries = self.entries.lock();
        match live(&mut entries, key) {
            Some(Entry { value: Value::Str(s), .. }) => Ok(Some(s.clone())),
            Some(_) => Err(wrong_type(key)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> StashResult<()> {
        let expires_at = match ttl {
            Some(ttl) if ttl.is_zero() => {
                return Err(StashError::invalid_argument("TTL must be positive"));
            }
            Some(ttl) => match Instant::now().checked_add(ttl) {
                Some(at) => Some(at),
                None => return Err(StashError::invalid_argument("invalid expire time")),
            },
            None => None,
        };

        self.entries.lock().insert(
            key.to_string(),
            Entry {
                value: Value::Str(value.to_string()),
                expires_at,
            },
        );
        Ok(())
    }

    async fn get_set(&self, key: &str, value: &str) -> StashResult<Option<String>> {
        let mut entries = self.entries.lock();
        let previous = match live(&mut entries, key) {
            Some(Entry { value: Value::Str(s), .. }) => Some(s.clone()),
            Some(_) => return Err(wrong_type(key)),
            None => None,
        };

        entries.insert(
            key.to_string(),
            Entry {
                value: Value::Str(value.to_string()),
                expires_at: None,
            },
        );
        Ok(previous)
    }

    async fn exists(&self, key: &str) -> StashResult<bool> {
        let mut entries = self.entries.lock();
        Ok(live(&mut entries, key).is_some())
    }

    async fn delete(&self, key: &str) -> StashResult<bool> {
        let mut entries = self.entries.lock();
        if live(&mut entries, key).is_none() {
            return Ok(false);
        }
        Ok(entries.remove(key).is_some())
    }

    async fn delete_many(&self, keys: &[String]) -> StashResult<u64> {
        let mut entries = self.entries.lock();
        let mut removed = 0;
        for key in keys {
            if live(&mut entries, key).is_some() {
                entries.remove(key);
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn keys(&self, pattern: &str) -> StashResult<Vec<String>> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        entries.retain(|_, entry| !entry.is_expired(now));

        Ok(entries
            .keys()
            .filter(|key| glob_match(pattern, key))
            .cloned()
            .collect())
    }

    async fn list_push(&self, key: &str, value: &str) -> StashResult<u64> {
        self.list_push_all(key, &[value.to_string()]).await
    }

    async fn list_push_all(&self, key: &str, values: &[String]) -> StashResult<u64> {
        if values.is_empty() {
            return Err(StashError::store("ERR wrong number of arguments for 'rpush' command"));
        }

        let mut entries = self.entries.lock();
        match live(&mut entries, key) {
            Some(Entry { value: Value::List(list), .. }) => {
                list.extend_from_slice(values);
                Ok(list.len() as u64)
            }
            Some(_) => Err(wrong_type(key)),
            None => {
                entries.insert(
                    key.to_string(),
                    Entry {
                        value: Value::List(values.to_vec()),
                        expires_at: None,
                    },
                );
                Ok(values.len() as u64)
            }
        }
    }

    async fn list_remove(&self, key: &str, count: i64, value: &str) -> StashResult<u64> {
        let mut entries = self.entries.lock();
        let list = match live(&mut entries, key) {
            Some(Entry { value: Value::List(list), .. }) => list,
            Some(_) => return Err(wrong_type(key)),
            None => return Ok(0),
        };

        let limit = if count == 0 { usize::MAX } else { count.unsigned_abs() as usize };
        let mut removed = 0usize;

        if count >= 0 {
            list.retain(|item| {
                if removed < limit && item == value {
                    removed += 1;
                    false
                } else {
                    true
                }
            });
        } else {
            let mut index = list.len();
            while index > 0 && removed < limit {
                index -= 1;
                if list[index] == value {
                    list.remove(index);
                    removed += 1;
                }
            }
        }

        if list.is_empty() {
            entries.remove(key);
        }
        Ok(removed as u64)
    }

    async fn list_range(&self, key: &str) -> StashResult<Vec<String>> {
        let mut entries = self.entries.lock();
        match live(&mut entries, key) {
            Some(Entry { value: Value::List(list), .. }) => Ok(list.clone()),
            Some(_) => Err(wrong_type(key)),
            None => Ok(Vec::new()),
        }
    }

    async fn hash_put_all(&self, key: &str, fields: &HashMap<String, String>) -> StashResult<()> {
        if fields.is_empty() {
            return Err(StashError::store("ERR wrong number of arguments for 'hset' command"));
        }

        let mut entries = self.entries.lock();
        match live(&mut entries, key) {
            Some(Entry { value: Value::Hash(hash), .. }) => {
                hash.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
                Ok(())
            }
            Some(_) => Err(wrong_type(key)),
            None => {
                entries.insert(
                    key.to_string(),
                    Entry {
                        value: Value::Hash(fields.clone()),
                        expires_at: None,
                    },
                );
                Ok(())
            }
        }
    }

    async fn hash_delete(&self, key: &str, field: &str) -> StashResult<bool> {
        let mut entries = self.entries.lock();
        let hash = match live(&mut entries, key) {
            Some(Entry { value: Value::Hash(hash), .. }) => hash,
            Some(_) => return Err(wrong_type(key)),
            None => return Ok(false),
        };

        let removed = hash.remove(field).is_some();
        if hash.is_empty() {
            entries.remove(key);
        }
        Ok(removed)
    }

    async fn hash_get_all(&self, key: &str) -> StashResult<HashMap<String, String>> {
        let mut entries = self.entries.lock();
        match live(&mut entries, key) {
            Some(Entry { value: Value::Hash(hash), .. }) => Ok(hash.clone()),
            Some(_) => Err(wrong_type(key)),
            None => Ok(HashMap::new()),
        }
    }

    async fn incr(&self, key: &str) -> StashResult<i64> {
        let mut entries = self.entries.lock();
        match live(&mut entries, key) {
            Some(Entry { value: Value::Str(s), .. }) => {
                let next = s
                    .parse::<i64>()
                    .ok()
                    .and_then(|n| n.checked_add(1))
                    .ok_or_else(|| {
                        StashError::store("ERR value is not an integer or out of range")
                    })?;
                *s = next.to_string();
                Ok(next)
            }
            Some(_) => Err(wrong_type(key)),
            None => {
                entries.insert(
                    key.to_string(),
                    Entry {
                        value: Value::Str("1".to_string()),
                        expires_at: None,
                    },
                );
                Ok(1)
            }
        }
    }

    async fn ping(&self) -> StashResult<()> {
        Ok(())
    }
}
