//! Multi-strategy catalog resolution.

use crate::title::search_year;
use crate::{CatalogApi, CatalogContext, SearchHit, normalize, search_title};
use marquee_core::{CallOutcome, CatalogRecord, WorkItem};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Strategy that produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ResolutionStrategy {
    /// Lookup by an identifier from another catalog
    CrossRef,
    /// Title search
    TitleSearch,
    /// Payload replayed from the resolution cache
    Cached,
}

/// A resolved record together with the raw payload it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Normalized record
    pub record: CatalogRecord,
    /// Raw upstream payload, suitable for caching
    pub payload: JsonValue,
    /// Strategy that found it
    pub strategy: ResolutionStrategy,
}

/// Resolves a work item against the catalog.
///
/// Strategies run in order and the first success wins:
///
/// 1. cross-reference id lookup (movie hits before series hits)
/// 2. title search, trailing year stripped and used as a constraint
///
/// A strategy that fails, finds nothing or yields an unusable payload falls
/// through to the next one. Exhausting every strategy is a miss, never an
/// error.
#[derive(Clone)]
pub struct CatalogResolver {
    api: Arc<dyn CatalogApi>,
    ctx: CatalogContext,
}

impl CatalogResolver {
    /// Create a resolver over a catalog with a per-run context.
    pub fn new(api: Arc<dyn CatalogApi>, ctx: CatalogContext) -> Self {
        Self { api, ctx }
    }

    /// Request context used by this resolver.
    pub fn context(&self) -> &CatalogContext {
        &self.ctx
    }

    /// Resolve a work item.
    #[instrument(skip(self, item), fields(content_ref = %item.content_ref))]
    pub async fn resolve(&self, item: &WorkItem) -> Option<Resolution> {
        let attrs = &item.attributes;

        if let Some(cross_ref) = attrs
            .cross_ref_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
        {
            match self.by_cross_ref(cross_ref).await {
                Some(resolution) => return Some(resolution),
                None => debug!(cross_ref, "Cross-reference lookup failed, trying title search"),
            }
        }

        if let Some(title) = search_title(item) {
            match self.by_title(item, &title).await {
                Some(resolution) => return Some(resolution),
                None => debug!(title = %title, "Title search found nothing"),
            }
        }

        info!("No catalog match");
        None
    }

    /// Normalize a payload, e.g. one replayed from the cache.
    pub fn from_payload(payload: JsonValue, strategy: ResolutionStrategy) -> Option<Resolution> {
        match normalize(&payload) {
            Ok(record) => Some(Resolution {
                record,
                payload,
                strategy,
            }),
            Err(e) => {
                warn!(error = %e, "Catalog payload could not be normalized");
                None
            }
        }
    }

    async fn by_cross_ref(&self, cross_ref: &str) -> Option<Resolution> {
        let hits = match self.api.find_by_cross_ref(&self.ctx, cross_ref).await {
            CallOutcome::Success(hits) => hits,
            outcome => {
                debug!(cross_ref, outcome = outcome.label(), "Cross-reference lookup missed");
                return None;
            }
        };
        let hit = hits.into_iter().next()?;
        self.fetch(hit, ResolutionStrategy::CrossRef).await
    }

    async fn by_title(&self, item: &WorkItem, title: &str) -> Option<Resolution> {
        let kind = item.attributes.media_kind.unwrap_or_default();
        let year = search_year(item.attributes.year.as_deref());

        let hits = match self.api.search(&self.ctx, kind, title, year).await {
            CallOutcome::Success(hits) => hits,
            outcome => {
                debug!(title, outcome = outcome.label(), "Title search missed");
                return None;
            }
        };
        let hit = hits.into_iter().next()?;
        self.fetch(hit, ResolutionStrategy::TitleSearch).await
    }

    async fn fetch(&self, hit: SearchHit, strategy: ResolutionStrategy) -> Option<Resolution> {
        match self.api.fetch_record(&self.ctx, hit.id, hit.media_kind).await {
            CallOutcome::Success(payload) => {
                let resolution = Self::from_payload(payload, strategy)?;
                info!(
                    catalog_id = resolution.record.catalog_id,
                    strategy = %strategy,
                    "Resolved catalog record"
                );
                Some(resolution)
            }
            outcome => {
                debug!(id = hit.id, outcome = outcome.label(), "Record fetch missed");
                None
            }
        }
    }
}
