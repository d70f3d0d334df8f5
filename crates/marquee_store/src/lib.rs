//! Downstream metadata store access for Marquee.
//!
//! - [`MetadataStore`]: property and set operations on store items, every
//!   call returning a [`CallOutcome`](marquee_core::CallOutcome)
//! - [`HttpMetadataStore`]: REST client for a store exposing
//!   `/items/{ref}/properties` and `/items/{ref}/sets`
//! - [`MemoryMetadataStore`]: process-local store for dry runs and tests
//! - [`EnrichmentWriter`]: applies a resolved record and its artifacts as
//!   idempotent merges and set additions

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod http;
mod memory;
mod store;
mod writer;

pub use http::HttpMetadataStore;
pub use marquee_error::{StoreError, StoreErrorKind};
pub use memory::MemoryMetadataStore;
pub use store::{MetadataStore, Properties, StoreConfig, StoreConfigBuilder};
pub use writer::{EnrichmentWriter, PROVENANCE_TAG, StoreOperation, WriteSummary};
