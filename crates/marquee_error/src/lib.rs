//! Error types for the Marquee pipeline.
//!
//! This crate provides the foundation error types used throughout the Marquee workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use marquee_error::{MarqueeResult, StorageError, StorageErrorKind};
//!
//! fn fetch_data() -> MarqueeResult<String> {
//!     Err(StorageError::new(StorageErrorKind::Unavailable("nas.local".to_string())))?
//! }
//!
//! match fetch_data() {
//!     Ok(data) => println!("Got: {}", data),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod catalog;
mod config;
mod error;
mod json;
mod pipeline;
mod storage;
mod store;

pub use cache::{CacheError, CacheErrorKind};
pub use catalog::{CatalogError, CatalogErrorKind};
pub use config::{ConfigError, ConfigErrorKind};
pub use error::{MarqueeError, MarqueeErrorKind, MarqueeResult};
pub use json::JsonError;
pub use pipeline::{PipelineError, PipelineErrorKind};
pub use storage::{StorageError, StorageErrorKind};
pub use store::{StoreError, StoreErrorKind};
