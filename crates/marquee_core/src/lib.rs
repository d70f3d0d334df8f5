//! Core data types for the Marquee pipeline.
//!
//! This crate provides the foundation data types shared by every Marquee crate:
//! the work item handed over by intake, the normalized catalog record, the
//! artifact references produced while materializing images, and the
//! completion report sent back once per work item.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod artifact;
mod outcome;
mod record;
mod report;
mod telemetry;
mod work_item;

pub use artifact::{ArtifactKind, ArtifactRef};
pub use outcome::CallOutcome;
pub use record::{CatalogRecord, CatalogRecordBuilder, CatalogRecordBuilderError};
pub use report::{CompletionReport, CompletionStatus};
pub use telemetry::{LogFormat, init_tracing};
pub use work_item::{FileKind, KnownAttributes, MediaKind, WorkItem};
