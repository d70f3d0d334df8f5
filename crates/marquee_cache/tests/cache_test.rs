//! Tests for the cache stores.

use marquee_cache::{CacheConfig, CacheConfigBuilder, CacheStore, FileCacheStore, MemoryCacheStore};
use serde_json::json;
use tempfile::TempDir;

const KEY: &str = "bafkreifzjut3te2nhyekklss27nh3k72ysco7y32koao5eei66wof36n5e";

#[tokio::test]
async fn test_file_store_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileCacheStore::new(temp_dir.path());

    assert!(store.get(KEY).await.is_none());

    let payload = json!({"id": 45745, "title": "Sintel"});
    store.put(KEY, &payload).await;
    assert_eq!(store.get(KEY).await, Some(payload));

    let expected = temp_dir
        .path()
        .join("ba")
        .join("fk")
        .join(format!("{KEY}.json"));
    assert!(expected.exists());
}

#[tokio::test]
async fn test_file_store_replaces_wholesale() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileCacheStore::new(temp_dir.path());

    store.put(KEY, &json!({"id": 1, "extra": true})).await;
    store.put(KEY, &json!({"id": 2})).await;
    assert_eq!(store.get(KEY).await, Some(json!({"id": 2})));
}

#[tokio::test]
async fn test_corrupt_entry_reads_as_miss() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileCacheStore::new(temp_dir.path());
    store.put(KEY, &json!({"id": 1})).await;

    let path = temp_dir
        .path()
        .join("ba")
        .join("fk")
        .join(format!("{KEY}.json"));
    std::fs::write(&path, b"{not json").unwrap();

    assert!(store.try_get(KEY).await.is_err());
    assert!(store.get(KEY).await.is_none());
}

#[tokio::test]
async fn test_invalid_key_is_swallowed_on_put() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileCacheStore::new(temp_dir.path());

    assert!(store.try_put("../x", &json!(1)).await.is_err());
    // Best-effort write: no panic, no error surfaced
    store.put("../x", &json!(1)).await;
    assert!(store.get("../x").await.is_none());
}

#[tokio::test]
async fn test_write_failure_is_swallowed() {
    let temp_dir = TempDir::new().unwrap();
    // A regular file where the cache directory should be
    let blocker = temp_dir.path().join("cache");
    std::fs::write(&blocker, b"").unwrap();
    let store = FileCacheStore::new(&blocker);

    assert!(store.try_put(KEY, &json!({"id": 1})).await.is_err());
    store.put(KEY, &json!({"id": 1})).await;
    assert!(store.get(KEY).await.is_none());
}

#[tokio::test]
async fn test_memory_store() {
    let store = MemoryCacheStore::new();
    assert!(store.is_empty().await);

    store.put(KEY, &json!([1, 2, 3])).await;
    assert_eq!(store.len().await, 1);
    assert_eq!(store.get(KEY).await, Some(json!([1, 2, 3])));
}

#[test]
fn test_config_defaults_and_builder() {
    let config = CacheConfig::default();
    assert!(*config.enabled());
    assert_eq!(config.dir(), "cache");

    let built = CacheConfigBuilder::default()
        .dir("/var/cache/marquee")
        .build()
        .unwrap();
    assert!(*built.enabled());
    assert_eq!(built.dir(), "/var/cache/marquee");

    let disabled = config.with_enabled(false);
    assert!(!*disabled.enabled());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_puts_leave_one_complete_entry() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileCacheStore::new(temp_dir.path());
    let overview = "x".repeat(32 * 1024);

    let mut tasks = Vec::new();
    for id in 0..8u64 {
        let store = store.clone();
        let payload = json!({"id": id, "overview": overview});
        tasks.push(tokio::spawn(async move {
            let mut failures = 0;
            for _ in 0..25 {
                if store.try_put(KEY, &payload).await.is_err() {
                    failures += 1;
                }
            }
            failures
        }));
    }
    for task in tasks {
        assert_eq!(task.await.unwrap(), 0);
    }

    let entry = store.try_get(KEY).await.unwrap().unwrap();
    assert!(entry["id"].as_u64().unwrap() < 8);
    assert_eq!(entry["overview"].as_str().unwrap().len(), 32 * 1024);
}
