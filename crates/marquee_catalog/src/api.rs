//! The catalog capability used by the resolver.

use crate::{CatalogAuth, CatalogConfig, Locale};
use async_trait::async_trait;
use marquee_core::{CallOutcome, MediaKind};
use serde_json::Value as JsonValue;

/// Per-run request context: who is asking and in which language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogContext {
    /// Credential presented on every request
    pub auth: CatalogAuth,
    /// Language of localized fields
    pub locale: Locale,
}

impl CatalogContext {
    /// Create a context.
    pub fn new(auth: CatalogAuth, locale: Locale) -> Self {
        Self { auth, locale }
    }

    /// Context from configuration; `None` when no credential is configured.
    pub fn from_config(config: &CatalogConfig) -> Option<Self> {
        let auth = config
            .api_key()
            .as_deref()
            .and_then(CatalogAuth::from_credential)?;
        Some(Self::new(auth, config.locale()))
    }
}

/// One candidate returned by a find or search call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchHit {
    /// Catalog id
    pub id: u64,
    /// Which endpoint family the id belongs to
    pub media_kind: MediaKind,
}

/// Catalog operations.
///
/// Every call is best-effort: transport failures and missing resources come
/// back as [`CallOutcome`] variants instead of errors so the resolver can fall
/// through to its next strategy.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Look up entries by an identifier from another catalog.
    ///
    /// Movie hits come before series hits.
    async fn find_by_cross_ref(
        &self,
        ctx: &CatalogContext,
        cross_ref_id: &str,
    ) -> CallOutcome<Vec<SearchHit>>;

    /// Fetch the raw record payload for an id.
    async fn fetch_record(
        &self,
        ctx: &CatalogContext,
        id: u64,
        kind: MediaKind,
    ) -> CallOutcome<JsonValue>;

    /// Search by title, optionally constrained by year.
    async fn search(
        &self,
        ctx: &CatalogContext,
        kind: MediaKind,
        query: &str,
        year: Option<&str>,
    ) -> CallOutcome<Vec<SearchHit>>;

    /// Download image bytes for a path relative to the image host.
    async fn fetch_image(&self, relative_path: &str) -> CallOutcome<Vec<u8>>;
}
