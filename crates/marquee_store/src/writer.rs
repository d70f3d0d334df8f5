//! Idempotent enrichment writes.

use crate::{MetadataStore, Properties};
use marquee_core::{ArtifactRef, CallOutcome, CatalogRecord};
use serde_json::{Value as JsonValue, json};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Tag added to every item enriched from the catalog.
pub const PROVENANCE_TAG: &str = "catalog-verified";

const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// One store operation issued by the writer.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum StoreOperation {
    /// Property merge, with the merged keys in order
    #[display("merge [{}]", keys.join(", "))]
    Merge {
        /// Merged property keys
        keys: Vec<String>,
    },
    /// Set member addition
    #[display("add {} to {}", value, set)]
    AddToSet {
        /// Set name
        set: String,
        /// Member value
        value: String,
    },
}

/// What an [`EnrichmentWriter::apply`] call did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSummary {
    /// Operations the store accepted
    pub applied: Vec<StoreOperation>,
    /// Operations that failed, with the failure reason
    pub failed: Vec<(StoreOperation, String)>,
}

impl WriteSummary {
    /// Number of accepted operations.
    pub fn fields_written(&self) -> usize {
        self.applied.len()
    }

    fn record(&mut self, operation: StoreOperation, outcome: CallOutcome<()>) {
        match outcome {
            CallOutcome::Success(()) => {
                debug!(%operation, "Store operation applied");
                self.applied.push(operation);
            }
            CallOutcome::NotFound => {
                warn!(%operation, "Store item not found");
                self.failed.push((operation, "not found".to_string()));
            }
            CallOutcome::Transient(reason) => {
                warn!(%operation, reason = %reason, "Store operation failed");
                self.failed.push((operation, reason));
            }
        }
    }
}

/// Writes a resolved record and its artifacts to the metadata store.
///
/// Every write is a merge or a set addition, so applying the same record
/// twice converges to the same item. Failures are recorded in the returned
/// [`WriteSummary`] and never interrupt the remaining writes. A store call
/// that does not answer within the operation timeout is recorded as a
/// transient failure.
#[derive(Clone)]
pub struct EnrichmentWriter {
    store: Arc<dyn MetadataStore>,
    operation_timeout: Duration,
}

impl EnrichmentWriter {
    /// Create a writer over a store.
    pub fn new(store: Arc<dyn MetadataStore>) -> Self {
        Self {
            store,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    /// Bound every store call by `timeout`.
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    async fn bounded(&self, call: impl Future<Output = CallOutcome<()>>) -> CallOutcome<()> {
        match tokio::time::timeout(self.operation_timeout, call).await {
            Ok(outcome) => outcome,
            Err(_) => CallOutcome::Transient(format!(
                "timed out after {:?}",
                self.operation_timeout
            )),
        }
    }

    /// Apply a record and its artifacts to a store item.
    ///
    /// `language` selects the plot key (`plot.<language>`).
    #[instrument(
        skip(self, record, artifacts),
        fields(catalog_id = record.catalog_id, artifacts = artifacts.len())
    )]
    pub async fn apply(
        &self,
        store_ref: &str,
        record: &CatalogRecord,
        artifacts: &[ArtifactRef],
        language: &str,
    ) -> WriteSummary {
        let mut summary = WriteSummary::default();

        let scalars = scalar_properties(record, language);
        let operation = merge_operation(&scalars);
        let outcome = self.bounded(self.store.merge(store_ref, &scalars)).await;
        summary.record(operation, outcome);

        for (set, values) in [("genres", &record.genres), ("companies", &record.companies)] {
            for value in values {
                self.add(&mut summary, store_ref, set, value).await;
            }
        }
        self.add(&mut summary, store_ref, "tags", PROVENANCE_TAG).await;

        for artifact in artifacts {
            let mut properties = Properties::new();
            properties.insert(
                format!("{}.cid", artifact.kind),
                JsonValue::String(artifact.content_id.clone()),
            );
            properties.insert(
                format!("{}.path", artifact.kind),
                JsonValue::String(artifact.storage_path.clone()),
            );
            let operation = merge_operation(&properties);
            let outcome = self.bounded(self.store.merge(store_ref, &properties)).await;
            summary.record(operation, outcome);
        }

        info!(
            applied = summary.applied.len(),
            failed = summary.failed.len(),
            "Enrichment written"
        );
        summary
    }

    async fn add(&self, summary: &mut WriteSummary, store_ref: &str, set: &str, value: &str) {
        let operation = StoreOperation::AddToSet {
            set: set.to_string(),
            value: value.to_string(),
        };
        let outcome = self.bounded(self.store.add_to_set(store_ref, set, value)).await;
        summary.record(operation, outcome);
    }
}

/// Scalar properties of a record; absent values are left out.
fn scalar_properties(record: &CatalogRecord, language: &str) -> Properties {
    let mut properties = Properties::new();
    properties.insert("catalog.id".to_string(), json!(record.catalog_id));
    properties.insert(
        "catalog.kind".to_string(),
        json!(record.media_kind.to_string()),
    );
    if let Some(id) = &record.cross_ref_id {
        properties.insert("xref.imdb".to_string(), json!(id));
    }
    properties.insert("title.original".to_string(), json!(record.original_title));
    if let Some(title) = &record.localized_title {
        properties.insert("title.localized".to_string(), json!(title));
    }
    if let Some(date) = &record.release_date {
        properties.insert("release_date".to_string(), json!(date));
    }
    if let Some(year) = record.year() {
        properties.insert("year".to_string(), json!(year));
    }
    if let Some(plot) = &record.plot {
        properties.insert(format!("plot.{language}"), json!(plot));
    }
    if let Some(rating) = record.rating {
        properties.insert("rating".to_string(), json!(rating));
    }
    properties
}

fn merge_operation(properties: &Properties) -> StoreOperation {
    StoreOperation::Merge {
        keys: properties.keys().cloned().collect(),
    }
}
