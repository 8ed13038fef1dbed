//! Integration tests for RedisStore.
//!
//! These tests run against a real Redis server using testcontainers.
//! Requires Docker; run with `cargo test -- --ignored`.

use stash_config::RedisConfig;
use stash_core::StashError;
use stash_store::{create_pool, KeyValueStore, RedisStore};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use testcontainers::{runners::AsyncRunner, ContainerAsync};
use testcontainers_modules::redis::Redis;

struct TestRedis {
    _container: ContainerAsync<Redis>,
    store: RedisStore,
}

impl TestRedis {
    async fn new() -> Self {
        let container = Redis::default()
            .start()
            .await
            .expect("Failed to start Redis container");

        let port = container
            .get_host_port_ipv4(6379)
            .await
            .expect("Failed to get Redis port");

        let config = RedisConfig {
            url: format!("redis://127.0.0.1:{}", port),
            pool_size: 4,
            scan_count: 2,
            ..RedisConfig::default()
        };

        let pool = create_pool(&config).await.expect("Failed to create pool");
        let store = RedisStore::with_scan_count(Arc::new(pool), config.scan_count);

        Self {
            _container: container,
            store,
        }
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_string_round_trip_and_getset() {
    let redis = TestRedis::new().await;
    let store = &redis.store;

    store.set("greeting", "hello", None).await.unwrap();
    assert_eq!(store.get("greeting").await.unwrap().as_deref(), Some("hello"));

    let previous = store.get_set("greeting", "bye").await.unwrap();
    assert_eq!(previous.as_deref(), Some("hello"));
    assert!(store.exists("greeting").await.unwrap());
    assert!(store.delete("greeting").await.unwrap());
    assert!(!store.delete("greeting").await.unwrap());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_ttl_expires() {
    let redis = TestRedis::new().await;
    let store = &redis.store;

    store.set("short", "lived", Some(Duration::from_millis(200))).await.unwrap();
    assert!(store.exists("short").await.unwrap());

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(store.get("short").await.unwrap(), None);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_scan_across_batches() {
    let redis = TestRedis::new().await;
    let store = &redis.store;

    for i in 0..7 {
        store.set(&format!("scan:{}", i), "x", None).await.unwrap();
    }
    store.set("other", "x", None).await.unwrap();

    let keys = store.keys("scan:*").await.unwrap();
    assert_eq!(keys.len(), 7);

    assert_eq!(store.delete_many(&keys).await.unwrap(), 7);
    assert!(store.exists("other").await.unwrap());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_lists_hashes_and_incr() {
    let redis = TestRedis::new().await;
    let store = &redis.store;

    let values = vec!["a".to_string(), "b".to_string(), "a".to_string()];
    assert_eq!(store.list_push_all("list", &values).await.unwrap(), 3);
    assert_eq!(store.list_push("list", "c").await.unwrap(), 4);
    assert_eq!(store.list_remove("list", 1, "a").await.unwrap(), 1);
    assert_eq!(store.list_range("list").await.unwrap(), vec!["b", "a", "c"]);

    let fields = HashMap::from([
        ("f1".to_string(), "v1".to_string()),
        ("f2".to_string(), "v2".to_string()),
    ]);
    store.hash_put_all("hash", &fields).await.unwrap();
    assert!(store.hash_delete("hash", "f2").await.unwrap());
    assert!(!store.hash_delete("hash", "f2").await.unwrap());
    assert_eq!(
        store.hash_get_all("hash").await.unwrap(),
        HashMap::from([("f1".to_string(), "v1".to_string())])
    );

    assert_eq!(store.incr("counter").await.unwrap(), 1);
    assert_eq!(store.incr("counter").await.unwrap(), 2);

    assert!(matches!(store.get("list").await, Err(StashError::WrongType(_))));
    store.ping().await.unwrap();
}
