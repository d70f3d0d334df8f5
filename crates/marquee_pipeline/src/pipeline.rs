//! Per-item orchestration.

use crate::{
    ArtifactConfig, ArtifactMaterializer, CompletionSink, MarqueeConfig, RunSettings, TracingSink,
};
use futures::stream::{self, StreamExt};
use marquee_cache::{CacheStore, FileCacheStore};
use marquee_catalog::{CatalogApi, CatalogResolver, Resolution, ResolutionStrategy, TmdbClient};
use marquee_core::{CompletionReport, WorkItem};
use marquee_error::{MarqueeResult, PipelineError, PipelineErrorKind};
use marquee_storage::{ByteSource, address_source};
use marquee_store::{EnrichmentWriter, MetadataStore};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{Instrument, debug, error, info, instrument, warn};

/// Why a work item was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
pub enum SkipReason {
    /// No catalog credential configured
    #[strum(to_string = "catalog credential not configured")]
    MissingCredential,
    /// The file is not a video
    #[strum(to_string = "not a video file")]
    NotPlayableMedia,
    /// A catalog id is already recorded and recomputation was not forced
    #[strum(to_string = "already resolved")]
    AlreadyResolved,
}

/// Result of a run that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunOutcome {
    Skipped(SkipReason),
    Completed { fields_written: usize },
}

/// Enrichment pipeline.
///
/// Each work item moves through
/// `received -> skip-check -> (cache replay | resolve) -> materialize and write -> done`,
/// in its own task. Exactly one [`CompletionReport`] per item reaches the
/// configured sink, including for items whose task panicked.
///
/// A stage that exceeds its time budget degrades instead of failing the
/// item: unfinished resolution counts as a miss, unfinished materialization
/// leaves the artifact fields out, and store writes time out one by one.
///
/// # Example
///
/// ```rust,no_run
/// use marquee_core::WorkItem;
/// use marquee_pipeline::{MarqueeConfig, Pipeline, RunSettings};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = MarqueeConfig::load()?;
/// let pipeline = Pipeline::builder_from_config(&config)?.build()?;
///
/// let settings = RunSettings::from_config(&config);
/// let report = pipeline
///     .process(WorkItem::new("a1b2", "/media/Sintel.2010.mkv"), &settings)
///     .await;
/// println!("{}", report.status);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, derive_builder::Builder)]
#[builder(pattern = "owned")]
pub struct Pipeline {
    /// Catalog used for resolution and image downloads
    catalog: Arc<dyn CatalogApi>,
    /// Byte source holding media files and artifacts
    source: Arc<dyn ByteSource>,
    /// Metadata store receiving enrichment
    store: Arc<dyn MetadataStore>,
    /// Resolution cache; no caching when absent
    #[builder(default, setter(strip_option))]
    cache: Option<Arc<dyn CacheStore>>,
    /// Completion report destination
    #[builder(default = "Arc::new(TracingSink) as Arc<dyn CompletionSink>")]
    sink: Arc<dyn CompletionSink>,
    /// Artifact naming and placement
    #[builder(default)]
    artifacts: ArtifactConfig,
    /// Time budget for each stage and for each store write
    #[builder(default = "Duration::from_secs(120)")]
    stage_timeout: Duration,
}

impl Pipeline {
    /// Creates a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Builder preloaded with the backends named by the configuration.
    ///
    /// # Errors
    ///
    /// Returns error if a configured backend cannot be constructed.
    #[instrument(skip(config))]
    pub fn builder_from_config(config: &MarqueeConfig) -> MarqueeResult<PipelineBuilder> {
        let catalog = Arc::new(TmdbClient::new(&config.catalog)?);
        let source = config.source.build()?;
        let store = config.store.build()?;

        let mut builder = Self::builder()
            .catalog(catalog)
            .source(source)
            .store(store)
            .artifacts(config.artifacts.clone())
            .stage_timeout(config.pipeline.stage_timeout());

        if *config.cache.enabled() {
            builder = builder.cache(Arc::new(FileCacheStore::new(config.cache.dir())));
        }
        Ok(builder)
    }

    /// Process one work item and report its completion.
    #[instrument(skip(self, item, settings), fields(content_ref = %item.content_ref))]
    pub async fn process(&self, item: WorkItem, settings: &RunSettings) -> CompletionReport {
        let started = Instant::now();
        let content_ref = item.content_ref.clone();

        let pipeline = self.clone();
        let settings = settings.clone();
        let task = tokio::spawn(
            async move { pipeline.run(&item, &settings).await }.in_current_span(),
        );

        let report = match task.await {
            Ok(RunOutcome::Completed { fields_written }) => {
                CompletionReport::completed(content_ref, started.elapsed(), fields_written)
            }
            Ok(RunOutcome::Skipped(reason)) => {
                CompletionReport::skipped(content_ref, started.elapsed(), reason.to_string())
            }
            Err(e) => {
                let e = PipelineError::new(PipelineErrorKind::TaskAborted(e.to_string()));
                error!(error = %e, "Work item task aborted");
                CompletionReport::failed(content_ref, started.elapsed(), e.to_string())
            }
        };

        self.sink.report(report.clone()).await;
        report
    }

    /// Process many work items, at most `concurrency` at a time.
    ///
    /// Reports come back in completion order.
    pub async fn process_batch(
        &self,
        items: Vec<WorkItem>,
        settings: &RunSettings,
        concurrency: usize,
    ) -> Vec<CompletionReport> {
        info!(items = items.len(), concurrency, "Processing batch");
        stream::iter(items)
            .map(|item| self.process(item, settings))
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await
    }

    async fn run(&self, item: &WorkItem, settings: &RunSettings) -> RunOutcome {
        let Some(ctx) = settings.catalog_context() else {
            return RunOutcome::Skipped(SkipReason::MissingCredential);
        };
        let attrs = &item.attributes;
        if !attrs.file_kind.is_playable_media() {
            return RunOutcome::Skipped(SkipReason::NotPlayableMedia);
        }
        let resolved = attrs
            .catalog_id
            .as_deref()
            .is_some_and(|id| !id.trim().is_empty());
        if resolved && !settings.force_recompute {
            return RunOutcome::Skipped(SkipReason::AlreadyResolved);
        }

        let cache_key = match &self.cache {
            Some(_) => self.sample_id(item).await,
            None => None,
        };

        let cached = match (&self.cache, &cache_key) {
            (Some(cache), Some(key)) if !settings.force_recompute => {
                cache.get(key).await.and_then(|payload| {
                    CatalogResolver::from_payload(payload, ResolutionStrategy::Cached)
                })
            }
            _ => None,
        };

        let resolution = match cached {
            Some(resolution) => {
                info!(catalog_id = resolution.record.catalog_id, "Replaying cached resolution");
                resolution
            }
            None => {
                let resolver = CatalogResolver::new(self.catalog.clone(), ctx);
                let resolved = match self.stage("resolve", resolver.resolve(item)).await {
                    Ok(resolved) => resolved,
                    Err(e) => {
                        warn!(error = %e, "Catalog lookups did not finish, treating as a miss");
                        None
                    }
                };
                let Some(resolution) = resolved else {
                    return RunOutcome::Completed { fields_written: 0 };
                };
                if let (Some(cache), Some(key)) = (&self.cache, &cache_key) {
                    cache.put(key, &resolution.payload).await;
                }
                resolution
            }
        };

        let fields_written = self
            .materialize_and_write(item, &resolution, settings)
            .await;
        RunOutcome::Completed { fields_written }
    }

    async fn materialize_and_write(
        &self,
        item: &WorkItem,
        resolution: &Resolution,
        settings: &RunSettings,
    ) -> usize {
        let materializer = ArtifactMaterializer::new(
            self.catalog.clone(),
            self.source.clone(),
            self.artifacts.clone(),
        );
        let artifacts = match self
            .stage("materialize", materializer.materialize_record(&resolution.record))
            .await
        {
            Ok(artifacts) => artifacts,
            Err(e) => {
                warn!(error = %e, "Artifacts did not finish, writing without them");
                Vec::new()
            }
        };

        // Store calls are bounded individually
        let writer = EnrichmentWriter::new(self.store.clone())
            .with_operation_timeout(self.stage_timeout);
        writer
            .apply(
                &item.content_ref,
                &resolution.record,
                &artifacts,
                settings.locale.language(),
            )
            .await
            .fields_written()
    }

    /// Sampling identifier of the item, computed from the file when unknown.
    async fn sample_id(&self, item: &WorkItem) -> Option<String> {
        if let Some(id) = item
            .attributes
            .sample_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
        {
            return Some(id.to_string());
        }

        match self
            .stage("address", address_source(self.source.as_ref(), &item.path))
            .await
        {
            Ok(Ok(id)) => {
                debug!(sample_id = %id, "Computed sampling identifier");
                Some(id.to_string())
            }
            Ok(Err(e)) => {
                warn!(
                    path = %item.path,
                    error = %e,
                    "Cannot address source file, continuing without cache"
                );
                None
            }
            Err(e) => {
                warn!(
                    path = %item.path,
                    error = %e,
                    "Addressing timed out, continuing without cache"
                );
                None
            }
        }
    }

    async fn stage<T>(
        &self,
        name: &str,
        future: impl Future<Output = T>,
    ) -> Result<T, PipelineError> {
        tokio::time::timeout(self.stage_timeout, future)
            .await
            .map_err(|_| {
                PipelineError::new(PipelineErrorKind::StageTimeout {
                    stage: name.to_string(),
                    budget: self.stage_timeout,
                })
            })
    }
}
