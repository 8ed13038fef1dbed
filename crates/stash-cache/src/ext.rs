//! Typed JSON helpers on top of the string-valued facade.

use crate::CacheFacade;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use stash_core::{CacheOutcome, StashError, StashResult};
use std::collections::HashMap;
use std::time::Duration;

/// Extension trait storing values as JSON strings.
#[async_trait]
pub trait CacheJsonExt {
    /// Get a typed value.
    async fn get_json<T: DeserializeOwned + Send>(&self, key: &str) -> StashResult<Option<T>>;

    /// Set a typed value, optionally expiring after `ttl`.
    async fn set_json<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> CacheOutcome;

    /// Write typed hash fields.
    async fn add_hash_json<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        fields: &HashMap<String, T>,
    ) -> CacheOutcome;
}

#[async_trait]
impl CacheJsonExt for CacheFacade {
    async fn get_json<T: DeserializeOwned + Send>(&self, key: &str) -> StashResult<Option<T>> {
        match self.get(key).await? {
            Some(json) => {
                let value: T = serde_json::from_str(&json)?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn set_json<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> CacheOutcome {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => return CacheOutcome::Failed(StashError::from(e)),
        };

        match ttl {
            Some(ttl) => self.set_with_ttl(key, &json, ttl).await,
            None => self.set(key, &json).await,
        }
    }

    async fn add_hash_json<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        fields: &HashMap<String, T>,
    ) -> CacheOutcome {
        let encoded: Result<HashMap<String, String>, _> = fields
            .iter()
            .map(|(field, value)| serde_json::to_string(value).map(|json| (field.clone(), json)))
            .collect();

        match encoded {
            Ok(encoded) => self.add_hash(key, &encoded).await,
            Err(e) => CacheOutcome::Failed(StashError::from(e)),
        }
    }
}
