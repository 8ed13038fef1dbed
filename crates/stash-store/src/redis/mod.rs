//! Redis-backed store implementation.

mod store;

pub use store::{RedisStore, RedisStoreParameters, DEFAULT_SCAN_COUNT};

use deadpool_redis::{Config, Pool, PoolError, Runtime};
use redis::RedisError;
use stash_config::RedisConfig;
use stash_core::{StashError, StashResult};
use tracing::info;

/// Create a Redis connection pool and verify it with a `PING`.
pub async fn create_pool(config: &RedisConfig) -> StashResult<Pool> {
    info!("Creating Redis connection pool...");

    let pool = Config::from_url(&config.url)
        .builder()
        .map_err(|e| StashError::Configuration(format!("Invalid Redis config: {}", e)))?
        .max_size(config.pool_size)
        .wait_timeout(Some(config.connect_timeout()))
        .create_timeout(Some(config.connect_timeout()))
        .runtime(Runtime::Tokio1)
        .build()
        .map_err(|e| StashError::Configuration(format!("Failed to create pool: {}", e)))?;

    // Test connection
    let mut conn = pool.get().await.map_err(pool_error)?;
    let _: String = redis::cmd("PING")
        .query_async(&mut *conn)
        .await
        .map_err(|e| redis_error("PING", "", e))?;

    info!(
        url = %config.url,
        pool_size = config.pool_size,
        "Redis connection pool created successfully"
    );

    Ok(pool)
}

/// Classify a Redis error.
///
/// Failures to reach the server become [`StashError::Connection`];
/// `WRONGTYPE` replies become [`StashError::WrongType`]; every other reply
/// error is a [`StashError::Store`].
pub(crate) fn redis_error(op: &str, key: &str, err: RedisError) -> StashError {
    if err.is_io_error()
        || err.is_timeout()
        || err.is_connection_dropped()
        || err.is_connection_refusal()
    {
        StashError::Connection(format!("{} '{}' failed: {}", op, key, err))
    } else if err.code() == Some("WRONGTYPE") {
        StashError::WrongType(key.to_string())
    } else {
        StashError::Store(format!("{} '{}' failed: {}", op, key, err))
    }
}

/// Pool errors all mean no connection could be handed out.
pub(crate) fn pool_error(err: PoolError) -> StashError {
    StashError::Connection(format!("Failed to get Redis connection: {}", err))
}
