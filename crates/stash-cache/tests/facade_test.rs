//! Behavioral tests for CacheFacade against the in-memory store.

use futures::future::join_all;
use stash_cache::CacheFacade;
use stash_core::StashError;
use stash_store::InMemoryStore;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

fn cache() -> CacheFacade {
    CacheFacade::new(Arc::new(InMemoryStore::new()))
}

#[tokio::test]
async fn test_set_then_get() {
    let cache = cache();

    assert!(cache.set("user:1", "ada").await.is_done());
    assert_eq!(cache.get("user:1").await.unwrap().as_deref(), Some("ada"));
    assert_eq!(cache.get("user:2").await.unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn test_value_expires_after_ttl() {
    let cache = cache();

    assert!(cache.set_with_ttl("otp", "123456", Duration::from_secs(30)).await.is_done());

    tokio::time::advance(Duration::from_secs(29)).await;
    assert_eq!(cache.get("otp").await.unwrap().as_deref(), Some("123456"));

    tokio::time::advance(Duration::from_secs(2)).await;
    assert_eq!(cache.get("otp").await.unwrap(), None);
    assert!(cache.has_key("otp").await.is_not_found());
}

#[tokio::test]
async fn test_zero_ttl_is_rejected() {
    let cache = cache();

    let outcome = cache.set_with_ttl("k", "v", Duration::ZERO).await;
    assert!(matches!(outcome.error(), Some(StashError::InvalidArgument(_))));
    assert!(!outcome.is_success());
    assert_eq!(cache.get("k").await.unwrap(), None);
}

#[tokio::test]
async fn test_huge_ttl_fails_without_writing() {
    let cache = cache();

    let outcome = cache.set_with_ttl("k", "v", Duration::from_secs(u64::MAX)).await;
    assert!(outcome.is_failed());
    assert!(matches!(outcome.error(), Some(StashError::InvalidArgument(_))));
    assert_eq!(cache.get("k").await.unwrap(), None);
}

#[tokio::test]
async fn test_has_key_before_and_after_set() {
    let cache = cache();

    assert!(!cache.has_key("flag").await.is_present());
    assert!(cache.set("flag", "on").await.is_done());
    assert!(cache.has_key("flag").await.is_present());
    assert!(cache.exists("flag").await.unwrap());
}

#[tokio::test]
async fn test_get_and_set_returns_previous_value() {
    let cache = cache();

    assert_eq!(cache.get_and_set("k", "first").await.done(), Some(None));
    assert_eq!(
        cache.get_and_set("k", "second").await.done(),
        Some(Some("first".to_string()))
    );
    assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("second"));
}

#[tokio::test]
async fn test_delete() {
    let cache = cache();
    assert!(cache.set("k", "v").await.is_done());

    assert!(cache.delete("k").await.is_done());
    let again = cache.delete("k").await;
    assert!(again.is_not_found());
    assert!(again.is_success());
}

#[tokio::test]
async fn test_delete_by_prefix_leaves_other_keys() {
    let cache = cache();
    for key in ["p:1", "p:2", "p:3", "q:1", "xp:1"] {
        assert!(cache.set(key, "v").await.is_done());
    }

    assert_eq!(cache.delete_by_prefix("p").await.unwrap(), 3);
    assert_eq!(cache.keys_by_prefix("p").await.unwrap(), Vec::<String>::new());
    assert!(cache.has_key("q:1").await.is_present());
    assert!(cache.has_key("xp:1").await.is_present());

    assert_eq!(cache.delete_by_prefix("p").await.unwrap(), 0);
}

#[tokio::test]
async fn test_prefix_is_literal() {
    let cache = cache();
    for key in ["a*1", "a*2", "ab"] {
        assert!(cache.set(key, "v").await.is_done());
    }

    assert_eq!(cache.keys_by_prefix("a*").await.unwrap(), vec!["a*1", "a*2"]);
    assert_eq!(cache.delete_by_prefix("a*").await.unwrap(), 2);
    assert!(cache.has_key("ab").await.is_present());
}

#[tokio::test]
async fn test_auto_key_sequence_starts_at_zero() {
    let cache = cache();

    assert_eq!(cache.set_auto_key("order", "a").await.done().as_deref(), Some("order:0"));
    assert_eq!(cache.set_auto_key("order", "b").await.done().as_deref(), Some("order:1"));
    assert_eq!(cache.get("order:1").await.unwrap().as_deref(), Some("b"));
    assert_eq!(cache.get("order").await.unwrap().as_deref(), Some("2"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_auto_keys_are_distinct() {
    let cache = Arc::new(cache());
    let n = 50;

    let tasks = (0..n).map(|i| {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move { cache.set_auto_key("counter", &format!("v{}", i)).await })
    });

    let keys: HashSet<String> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().done().unwrap())
        .collect();

    let expected: HashSet<String> = (0..n).map(|i| format!("counter:{}", i)).collect();
    assert_eq!(keys, expected);
}

#[tokio::test]
async fn test_auto_key_on_non_numeric_counter_fails() {
    let cache = cache();
    assert!(cache.set("order", "not-a-number").await.is_done());

    let outcome = cache.set_auto_key("order", "a").await;
    assert!(outcome.is_failed());
}

#[tokio::test]
async fn test_list_operations() {
    let cache = cache();

    assert_eq!(cache.add_list("queue", "a").await.done(), Some(1));
    let more = vec!["b".to_string(), "a".to_string(), "c".to_string()];
    assert_eq!(cache.add_list_all("queue", &more).await.done(), Some(4));
    assert_eq!(cache.add_list_all("queue", &[]).await.done(), Some(0));

    assert!(cache.remove_first_list_match("queue", "a").await.is_done());
    assert_eq!(cache.get_list("queue").await.unwrap(), vec!["b", "a", "c"]);

    assert!(cache.remove_first_list_match("queue", "zzz").await.is_not_found());
}

#[tokio::test]
async fn test_hash_round_trip() {
    let cache = cache();
    let fields = HashMap::from([
        ("f1".to_string(), "v1".to_string()),
        ("f2".to_string(), "v2".to_string()),
    ]);

    assert!(cache.add_hash("profile", &fields).await.is_done());
    assert_eq!(cache.get_all_hash_fields("profile").await.unwrap(), fields);

    assert!(cache.delete_hash_field("profile", "f2").await.is_done());
    assert!(cache.delete_hash_field("profile", "f2").await.is_not_found());
    assert_eq!(
        cache.get_all_hash_fields("profile").await.unwrap(),
        HashMap::from([("f1".to_string(), "v1".to_string())])
    );

    assert!(cache.get_all_hash_fields("missing").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_wrong_type_is_reported() {
    let cache = cache();
    assert!(cache.set("plain", "v").await.is_done());

    let outcome = cache.add_list("plain", "x").await;
    assert!(matches!(outcome.error(), Some(StashError::WrongType(_))));
    assert!(matches!(
        cache.get_all_hash_fields("plain").await,
        Err(StashError::WrongType(_))
    ));
}
