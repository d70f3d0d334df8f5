//! End-to-end tests for the enrichment pipeline with in-process backends.

use async_trait::async_trait;
use marquee_cache::{CacheStore, MemoryCacheStore};
use marquee_catalog::{CatalogApi, CatalogAuth, CatalogContext, Locale, SearchHit};
use marquee_core::{
    CallOutcome, CompletionReport, CompletionStatus, FileKind, KnownAttributes, MediaKind,
    WorkItem,
};
use marquee_pipeline::{ArtifactConfig, ChannelSink, Pipeline, RunSettings, SkipReason};
use marquee_storage::{ByteSource, FileSystemSource, address_source};
use marquee_store::{MemoryMetadataStore, MetadataStore, PROVENANCE_TAG, Properties};
use serde_json::{Value as JsonValue, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;

const MEDIA_PATH: &str = "movies/Sintel.2010.mkv";

/// Catalog that knows one movie and logs every call.
#[derive(Default)]
struct FakeCatalog {
    payload: Option<JsonValue>,
    image: Option<Vec<u8>>,
    panic_on_search: bool,
    delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
}

impl FakeCatalog {
    fn sintel() -> Self {
        Self {
            payload: Some(sintel_payload("Sintel")),
            image: Some(b"poster bytes".to_vec()),
            ..Default::default()
        }
    }

    fn log(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }

    fn count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn lookups(&self) -> usize {
        self.count("find") + self.count("search") + self.count("fetch_record")
    }
}

fn sintel_payload(title: &str) -> JsonValue {
    json!({
        "id": 45745,
        "title": title,
        "original_title": "Sintel",
        "release_date": "2010-09-30",
        "imdb_id": "tt1727587",
        "overview": "A lonely young woman searches for a dragon.",
        "genres": [{"id": 16, "name": "Animation"}],
        "production_companies": [{"id": 1, "name": "Blender Foundation"}],
        "poster_path": "/poster.jpg"
    })
}

#[async_trait]
impl CatalogApi for FakeCatalog {
    async fn find_by_cross_ref(
        &self,
        _ctx: &CatalogContext,
        _cross_ref_id: &str,
    ) -> CallOutcome<Vec<SearchHit>> {
        self.log("find");
        CallOutcome::NotFound
    }

    async fn fetch_record(
        &self,
        _ctx: &CatalogContext,
        _id: u64,
        _kind: MediaKind,
    ) -> CallOutcome<JsonValue> {
        self.log("fetch_record");
        match &self.payload {
            Some(payload) => CallOutcome::Success(payload.clone()),
            None => CallOutcome::NotFound,
        }
    }

    async fn search(
        &self,
        _ctx: &CatalogContext,
        kind: MediaKind,
        _query: &str,
        _year: Option<&str>,
    ) -> CallOutcome<Vec<SearchHit>> {
        self.log("search");
        if self.panic_on_search {
            panic!("catalog exploded");
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.payload {
            Some(_) => CallOutcome::Success(vec![SearchHit {
                id: 45745,
                media_kind: kind,
            }]),
            None => CallOutcome::Success(Vec::new()),
        }
    }

    async fn fetch_image(&self, _relative_path: &str) -> CallOutcome<Vec<u8>> {
        self.log("fetch_image");
        match &self.image {
            Some(bytes) => CallOutcome::Success(bytes.clone()),
            None => CallOutcome::Transient("HTTP 503".to_string()),
        }
    }
}

struct Harness {
    _dir: TempDir,
    source: Arc<FileSystemSource>,
    catalog: Arc<FakeCatalog>,
    cache: Arc<MemoryCacheStore>,
    store: Arc<MemoryMetadataStore>,
    reports: mpsc::Receiver<CompletionReport>,
    pipeline: Pipeline,
}

impl Harness {
    async fn new(catalog: FakeCatalog) -> Self {
        Self::with_cache(catalog, Arc::new(MemoryCacheStore::new())).await
    }

    async fn with_cache(catalog: FakeCatalog, cache: Arc<MemoryCacheStore>) -> Self {
        let dir = TempDir::new().unwrap();
        let source = Arc::new(FileSystemSource::new(dir.path()).unwrap());
        source
            .write_all(MEDIA_PATH, b"not really a matroska file")
            .await
            .unwrap();

        let catalog = Arc::new(catalog);
        let store = Arc::new(MemoryMetadataStore::new());
        let (sink, reports) = ChannelSink::channel(16);

        let pipeline = Pipeline::builder()
            .catalog(catalog.clone())
            .source(source.clone())
            .store(store.clone())
            .cache(cache.clone())
            .sink(Arc::new(sink))
            .artifacts(ArtifactConfig::new("artifacts", "tmdbid-"))
            .stage_timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        Self {
            _dir: dir,
            source,
            catalog,
            cache,
            store,
            reports,
            pipeline,
        }
    }

    fn next_report(&mut self) -> CompletionReport {
        let report = self.reports.try_recv().expect("one report per item");
        assert!(self.reports.try_recv().is_err(), "exactly one report per item");
        report
    }
}

fn settings() -> RunSettings {
    RunSettings {
        credential: CatalogAuth::from_credential("0123abcd"),
        locale: Locale::parse("en"),
        force_recompute: false,
    }
}

fn video(attributes: KnownAttributes) -> WorkItem {
    WorkItem::new("a1b2", MEDIA_PATH).with_attributes(KnownAttributes {
        file_kind: FileKind::Video,
        ..attributes
    })
}

fn sintel_item() -> WorkItem {
    video(KnownAttributes {
        title: Some("Sintel".to_string()),
        year: Some("2010".to_string()),
        ..Default::default()
    })
}

#[tokio::test]
async fn test_skips_without_credential() {
    let mut harness = Harness::new(FakeCatalog::sintel()).await;
    let settings = RunSettings {
        credential: None,
        ..settings()
    };

    let report = harness.pipeline.process(sintel_item(), &settings).await;

    assert_eq!(report.status, CompletionStatus::Skipped);
    assert_eq!(
        report.reason.as_deref(),
        Some(SkipReason::MissingCredential.to_string().as_str())
    );
    assert_eq!(harness.catalog.lookups(), 0);
    assert_eq!(harness.next_report(), report);
}

#[tokio::test]
async fn test_skips_non_video() {
    let mut harness = Harness::new(FakeCatalog::sintel()).await;
    let item = WorkItem::new("a1b2", MEDIA_PATH).with_attributes(KnownAttributes {
        file_kind: FileKind::Audio,
        title: Some("Sintel".to_string()),
        ..Default::default()
    });

    let report = harness.pipeline.process(item, &settings()).await;

    assert_eq!(report.status, CompletionStatus::Skipped);
    assert_eq!(report.reason.as_deref(), Some("not a video file"));
    harness.next_report();
}

#[tokio::test]
async fn test_already_resolved_skips_unless_forced() {
    let mut harness = Harness::new(FakeCatalog::sintel()).await;
    let item = video(KnownAttributes {
        title: Some("Sintel".to_string()),
        catalog_id: Some("45745".to_string()),
        ..Default::default()
    });

    let report = harness.pipeline.process(item.clone(), &settings()).await;
    assert_eq!(report.status, CompletionStatus::Skipped);
    assert_eq!(harness.catalog.lookups(), 0);
    harness.next_report();

    let forced = settings().with_force_recompute(true);
    let report = harness.pipeline.process(item, &forced).await;
    assert_eq!(report.status, CompletionStatus::Completed);
    assert!(report.fields_written > 0);
    assert!(harness.catalog.lookups() > 0);
    harness.next_report();
}

#[tokio::test]
async fn test_miss_is_completed_not_skipped() {
    let mut harness = Harness::new(FakeCatalog::default()).await;

    let report = harness.pipeline.process(sintel_item(), &settings()).await;

    assert_eq!(report.status, CompletionStatus::Completed);
    assert_eq!(report.fields_written, 0);
    assert!(report.reason.is_none());
    assert!(report.error.is_none());
    assert_eq!(harness.store.fetch_all("a1b2").await, CallOutcome::NotFound);
    harness.next_report();
}

#[tokio::test]
async fn test_resolution_is_written_and_cached_under_computed_id() {
    let mut harness = Harness::new(FakeCatalog::sintel()).await;

    let report = harness.pipeline.process(sintel_item(), &settings()).await;
    assert_eq!(report.status, CompletionStatus::Completed);
    harness.next_report();

    let sample_id = address_source(harness.source.as_ref(), MEDIA_PATH)
        .await
        .unwrap()
        .to_string();
    assert_eq!(
        harness.cache.get(&sample_id).await,
        Some(sintel_payload("Sintel"))
    );

    let properties = harness.store.fetch_all("a1b2").await.into_option().unwrap();
    assert_eq!(properties["catalog.id"], json!(45745));
    assert_eq!(properties["title.original"], json!("Sintel"));
    assert_eq!(
        properties["plot.en"],
        json!("A lonely young woman searches for a dragon.")
    );
    assert_eq!(
        properties["poster.path"],
        json!("artifacts/Sintel (2010)[tmdbid-45745]_poster.jpg")
    );
    assert_eq!(
        harness.store.members("a1b2", "tags").await,
        vec![PROVENANCE_TAG]
    );
}

#[tokio::test]
async fn test_cache_hit_replays_without_catalog_lookups() {
    let cache = Arc::new(MemoryCacheStore::new());

    let mut first = Harness::with_cache(FakeCatalog::sintel(), cache.clone()).await;
    first.pipeline.process(sintel_item(), &settings()).await;
    first.next_report();
    let fresh = first.store.fetch_all("a1b2").await.into_option().unwrap();

    let mut second = Harness::with_cache(FakeCatalog::sintel(), cache.clone()).await;
    let report = second.pipeline.process(sintel_item(), &settings()).await;
    second.next_report();

    assert_eq!(report.status, CompletionStatus::Completed);
    assert_eq!(second.catalog.lookups(), 0);
    let replayed = second.store.fetch_all("a1b2").await.into_option().unwrap();
    assert_eq!(fresh, replayed);
    assert_eq!(
        first.store.members("a1b2", "genres").await,
        second.store.members("a1b2", "genres").await
    );
}

#[tokio::test]
async fn test_known_sample_id_is_used_as_cache_key() {
    let cache = Arc::new(MemoryCacheStore::new());
    cache
        .put("bafkreisampleid", &sintel_payload("Sintel"))
        .await;
    let mut harness = Harness::with_cache(FakeCatalog::default(), cache).await;
    let item = video(KnownAttributes {
        title: Some("Sintel".to_string()),
        sample_id: Some("bafkreisampleid".to_string()),
        ..Default::default()
    });

    let report = harness.pipeline.process(item, &settings()).await;

    assert_eq!(report.status, CompletionStatus::Completed);
    assert!(report.fields_written > 0);
    assert_eq!(harness.catalog.lookups(), 0);
    harness.next_report();
}

#[tokio::test]
async fn test_force_recompute_bypasses_and_overwrites_cache() {
    let cache = Arc::new(MemoryCacheStore::new());
    cache
        .put("bafkreistale", &sintel_payload("Stale Title"))
        .await;
    let mut harness = Harness::with_cache(FakeCatalog::sintel(), cache.clone()).await;
    let item = video(KnownAttributes {
        title: Some("Sintel".to_string()),
        sample_id: Some("bafkreistale".to_string()),
        ..Default::default()
    });

    let report = harness
        .pipeline
        .process(item, &settings().with_force_recompute(true))
        .await;
    harness.next_report();

    assert_eq!(report.status, CompletionStatus::Completed);
    assert!(harness.catalog.lookups() > 0);
    assert_eq!(
        cache.get("bafkreistale").await,
        Some(sintel_payload("Sintel"))
    );
    let properties = harness.store.fetch_all("a1b2").await.into_option().unwrap();
    assert_eq!(properties["title.localized"], json!("Sintel"));
}

#[tokio::test]
async fn test_artifact_downloaded_once_across_runs() {
    let mut harness = Harness::new(FakeCatalog::sintel()).await;
    let forced = settings().with_force_recompute(true);

    harness.pipeline.process(sintel_item(), &forced).await;
    harness.next_report();
    let first = harness.store.fetch_all("a1b2").await.into_option().unwrap();

    harness.pipeline.process(sintel_item(), &forced).await;
    harness.next_report();
    let second = harness.store.fetch_all("a1b2").await.into_option().unwrap();

    assert_eq!(harness.catalog.count("fetch_image"), 1);
    assert_eq!(first["poster.cid"], second["poster.cid"]);
    assert_eq!(first["poster.path"], second["poster.path"]);
    assert!(
        harness
            .source
            .exists("artifacts/Sintel (2010)[tmdbid-45745]_poster.jpg")
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_failed_download_omits_artifact_fields() {
    let catalog = FakeCatalog {
        image: None,
        ..FakeCatalog::sintel()
    };
    let mut harness = Harness::new(catalog).await;

    let report = harness.pipeline.process(sintel_item(), &settings()).await;
    harness.next_report();

    assert_eq!(report.status, CompletionStatus::Completed);
    let properties = harness.store.fetch_all("a1b2").await.into_option().unwrap();
    assert!(properties.contains_key("catalog.id"));
    assert!(!properties.contains_key("poster.cid"));
    assert!(!properties.contains_key("poster.path"));
}

#[tokio::test]
async fn test_unreadable_source_proceeds_without_cache() {
    let mut harness = Harness::new(FakeCatalog::sintel()).await;
    let item = WorkItem::new("a1b2", "movies/missing.mkv").with_attributes(KnownAttributes {
        file_kind: FileKind::Video,
        title: Some("Sintel".to_string()),
        ..Default::default()
    });

    let report = harness.pipeline.process(item, &settings()).await;
    harness.next_report();

    assert_eq!(report.status, CompletionStatus::Completed);
    assert!(report.fields_written > 0);
    assert!(harness.cache.is_empty().await);
}

#[tokio::test]
async fn test_panic_is_reported_as_failure() {
    let catalog = FakeCatalog {
        panic_on_search: true,
        ..FakeCatalog::sintel()
    };
    let mut harness = Harness::new(catalog).await;

    let report = harness.pipeline.process(sintel_item(), &settings()).await;

    assert_eq!(report.status, CompletionStatus::Failed);
    assert!(report.error.as_deref().unwrap().contains("panicked"));
    assert_eq!(harness.next_report(), report);
}

#[tokio::test]
async fn test_stalled_catalog_counts_as_a_miss() {
    let dir = TempDir::new().unwrap();
    let catalog = Arc::new(FakeCatalog {
        delay: Some(Duration::from_secs(30)),
        ..FakeCatalog::sintel()
    });
    let cache = Arc::new(MemoryCacheStore::new());
    let store = Arc::new(MemoryMetadataStore::new());
    let (sink, mut reports) = ChannelSink::channel(4);
    let pipeline = Pipeline::builder()
        .catalog(catalog)
        .source(Arc::new(FileSystemSource::new(dir.path()).unwrap()))
        .store(store.clone())
        .cache(cache.clone())
        .sink(Arc::new(sink))
        .stage_timeout(Duration::from_millis(50))
        .build()
        .unwrap();

    let report = pipeline.process(sintel_item(), &settings()).await;

    assert_eq!(report.status, CompletionStatus::Completed);
    assert_eq!(report.fields_written, 0);
    assert!(report.error.is_none());
    assert!(cache.is_empty().await);
    assert_eq!(store.fetch_all("a1b2").await, CallOutcome::NotFound);
    assert_eq!(reports.try_recv().unwrap(), report);
}

/// Metadata store whose merges hang.
#[derive(Default)]
struct StalledStore {
    inner: MemoryMetadataStore,
}

#[async_trait]
impl MetadataStore for StalledStore {
    async fn set(&self, item_ref: &str, key: &str, value: &JsonValue) -> CallOutcome<()> {
        self.inner.set(item_ref, key, value).await
    }

    async fn get(&self, item_ref: &str, key: &str) -> CallOutcome<JsonValue> {
        self.inner.get(item_ref, key).await
    }

    async fn merge(&self, item_ref: &str, properties: &Properties) -> CallOutcome<()> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        self.inner.merge(item_ref, properties).await
    }

    async fn delete(&self, item_ref: &str, key: &str) -> CallOutcome<()> {
        self.inner.delete(item_ref, key).await
    }

    async fn add_to_set(&self, item_ref: &str, set: &str, value: &str) -> CallOutcome<()> {
        self.inner.add_to_set(item_ref, set, value).await
    }

    async fn fetch_all(&self, item_ref: &str) -> CallOutcome<Properties> {
        self.inner.fetch_all(item_ref).await
    }
}

#[tokio::test]
async fn test_stalled_store_still_completes() {
    let dir = TempDir::new().unwrap();
    let source = Arc::new(FileSystemSource::new(dir.path()).unwrap());
    source
        .write_all(MEDIA_PATH, b"not really a matroska file")
        .await
        .unwrap();
    let store = Arc::new(StalledStore::default());
    let (sink, mut reports) = ChannelSink::channel(4);
    let pipeline = Pipeline::builder()
        .catalog(Arc::new(FakeCatalog::sintel()))
        .source(source)
        .store(store.clone())
        .sink(Arc::new(sink))
        .stage_timeout(Duration::from_millis(200))
        .build()
        .unwrap();

    let report = pipeline.process(sintel_item(), &settings()).await;

    assert_eq!(report.status, CompletionStatus::Completed);
    // genres, companies and tags land; the scalar and poster merges time out
    assert_eq!(report.fields_written, 3);
    assert_eq!(store.inner.members("a1b2", "tags").await, vec![PROVENANCE_TAG]);
    assert_eq!(reports.try_recv().unwrap(), report);
}

#[tokio::test]
async fn test_batch_reports_every_item() {
    let mut harness = Harness::new(FakeCatalog::sintel()).await;
    let items = vec![
        sintel_item(),
        WorkItem::new("b2c3", "docs/readme.txt"),
        video(KnownAttributes {
            catalog_id: Some("1".to_string()),
            ..Default::default()
        }),
    ];

    let reports = harness
        .pipeline
        .process_batch(items, &settings(), 2)
        .await;

    assert_eq!(reports.len(), 3);
    let completed = reports
        .iter()
        .filter(|r| r.status == CompletionStatus::Completed)
        .count();
    let skipped = reports
        .iter()
        .filter(|r| r.status == CompletionStatus::Skipped)
        .count();
    assert_eq!((completed, skipped), (1, 2));

    let mut delivered = 0;
    while harness.reports.try_recv().is_ok() {
        delivered += 1;
    }
    assert_eq!(delivered, 3);
}
