//! Enrichment pipeline for Marquee.
//!
//! Ties the workspace together: configuration loading, artifact
//! materialization, completion sinks and the per-item orchestrator that
//! decides between skipping, replaying a cached resolution and resolving
//! afresh.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod materializer;
mod pipeline;
mod sink;

pub use config::{ArtifactConfig, MarqueeConfig, PipelineConfig, RunSettings};
pub use materializer::{ArtifactMaterializer, artifact_filename};
pub use pipeline::{Pipeline, PipelineBuilder, PipelineBuilderError, SkipReason};
pub use sink::{ChannelSink, CompletionSink, TracingSink};
