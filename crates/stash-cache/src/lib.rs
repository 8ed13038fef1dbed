//! # Stash Cache
//!
//! A thin facade over a Redis-compatible key-value store: string values with
//! optional expiry, auto-suffixed keys, prefix scans, lists and hashes.
//!
//! ```ignore
//! let module = build_store_module(&config.redis).await?;
//! let cache = CacheFacade::from_module(module.as_ref());
//!
//! cache.set_with_ttl("session:42", "token", Duration::from_secs(60)).await;
//! let key = cache.set_auto_key("order", "{...}").await.done();
//! ```

pub mod di;
pub mod ext;
pub mod facade;
pub mod keys;
pub mod metrics;

pub use di::{build_store_module, StoreModule};
pub use ext::CacheJsonExt;
pub use facade::CacheFacade;
pub use self::metrics::{register_metrics, CacheMetrics};
pub use stash_core::CacheOutcome;
