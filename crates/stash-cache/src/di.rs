//! Dependency injection module using Shaku.

use shaku::module;
use stash_config::RedisConfig;
use stash_core::StashResult;
use stash_store::{create_pool, RedisStore, RedisStoreParameters};
use std::sync::Arc;
use tracing::info;

// Store module backed by Redis.
// The store is disabled (every call fails) when Redis is turned off in config.
module! {
    pub StoreModule {
        components = [RedisStore],
        providers = [],
    }
}

/// Builds the store module from Redis settings.
///
/// Connects and verifies the pool only when Redis is enabled.
pub async fn build_store_module(config: &RedisConfig) -> StashResult<Arc<StoreModule>> {
    let pool = if config.enabled {
        Some(Arc::new(create_pool(config).await?))
    } else {
        info!("Redis disabled, store calls will fail with STORE_DISABLED");
        None
    };

    let module = StoreModule::builder()
        .with_component_parameters::<RedisStore>(RedisStoreParameters {
            pool,
            scan_count: config.scan_count.max(1),
        })
        .build();

    Ok(Arc::new(module))
}
