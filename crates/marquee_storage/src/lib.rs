//! Byte sources and content addressing for Marquee.
//!
//! This crate provides the narrow I/O capability the pipeline needs
//! (stat, ranged reads, whole-file reads and writes, existence checks) behind
//! one trait with two interchangeable backends, plus the content addresser
//! that derives a stable identifier from a sampled portion of a file.
//!
//! # Features
//!
//! - **Pluggable backends**: local filesystem or a remote range-capable HTTP file server
//! - **Content identifiers**: CIDv1 (raw codec, SHA2-256) rendered as base32 text
//! - **Backend-independent sampling**: whole file up to 1 MiB, otherwise the centered 1 MiB window
//!
//! # Example
//!
//! ```rust
//! use marquee_storage::{ByteSource, FileSystemSource, address_source};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = FileSystemSource::new("/tmp/media")?;
//! source.write_all("clip.bin", b"hello").await?;
//!
//! let id = address_source(&source, "clip.bin").await?;
//! assert!(id.to_string().starts_with('b'));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod addressing;
mod config;
mod content_id;
mod filesystem;
mod remote;
mod source;

pub use addressing::{SAMPLE_WINDOW, address_of, address_source, sample_range};
pub use config::{SourceBackend, SourceConfig};
pub use content_id::ContentId;
pub use filesystem::FileSystemSource;
pub use marquee_error::{StorageError, StorageErrorKind};
pub use remote::HttpRangeSource;
pub use source::{ByteSource, FileStat};
