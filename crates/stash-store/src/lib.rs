//! # Stash Store
//!
//! The key-value store contract the cache facade delegates to, with two
//! implementations:
//!
//! - [`RedisStore`]: a deadpool-redis pool against a real server
//! - [`InMemoryStore`]: process-local, Redis semantics, for development and tests

pub mod memory;
pub mod pattern;
pub mod redis;
mod traits;

pub use memory::InMemoryStore;
pub use pattern::{escape_glob, glob_match};
pub use self::redis::{create_pool, RedisStore, RedisStoreParameters, DEFAULT_SCAN_COUNT};
pub use traits::KeyValueStore;
