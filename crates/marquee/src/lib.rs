//! Marquee - media metadata enrichment
//!
//! Marquee takes work items describing media files already registered in a
//! metadata store, identifies each file by a content identifier computed from
//! a sampled window of its bytes, resolves it against a movie/series catalog,
//! downloads poster and backdrop artwork next to the media, and writes the
//! normalized metadata back to the store.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use marquee::{MarqueeConfig, Pipeline, RunSettings, WorkItem};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MarqueeConfig::load()?;
//!     let pipeline = Pipeline::builder_from_config(&config)?.build()?;
//!     let settings = RunSettings::from_config(&config);
//!
//!     let item = WorkItem::new("a1b2", "movies/Sintel.2010.mkv");
//!     let report = pipeline.process(item, &settings).await;
//!     println!("{}", serde_json::to_string(&report)?);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `marquee_error` - Error types
//! - `marquee_core` - Work items, catalog records, artifacts, reports
//! - `marquee_storage` - Byte sources and the content addresser
//! - `marquee_cache` - Resolution cache keyed by content identifier
//! - `marquee_catalog` - Catalog client and resolver
//! - `marquee_store` - Metadata store clients and the enrichment writer
//! - `marquee_pipeline` - Configuration, artifact materializer, orchestrator
//!
//! This crate re-exports everything for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod intake;

pub use intake::parse_work_items;

pub use marquee_error::{
    CacheError, CatalogError, ConfigError, ConfigErrorKind, JsonError, MarqueeError,
    MarqueeErrorKind, MarqueeResult, PipelineError, PipelineErrorKind, StorageError, StoreError,
};

pub use marquee_core::{
    ArtifactKind, ArtifactRef, CallOutcome, CatalogRecord, CompletionReport, CompletionStatus,
    FileKind, KnownAttributes, LogFormat, MediaKind, WorkItem, init_tracing,
};

pub use marquee_storage::{
    ByteSource, ContentId, FileStat, FileSystemSource, HttpRangeSource, SAMPLE_WINDOW,
    SourceBackend, SourceConfig, address_of, address_source,
};

pub use marquee_cache::{CacheConfig, CacheStore, FileCacheStore, MemoryCacheStore};

pub use marquee_catalog::{
    CatalogApi, CatalogAuth, CatalogConfig, CatalogContext, CatalogResolver, Locale, Resolution,
    ResolutionStrategy, TmdbClient,
};

pub use marquee_store::{
    EnrichmentWriter, HttpMetadataStore, MemoryMetadataStore, MetadataStore, StoreConfig,
    WriteSummary,
};

pub use marquee_pipeline::{
    ArtifactConfig, ArtifactMaterializer, ChannelSink, CompletionSink, MarqueeConfig, Pipeline,
    PipelineBuilder, PipelineConfig, RunSettings, SkipReason, TracingSink,
};
