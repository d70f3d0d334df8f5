//! Backend selection.

use crate::{ByteSource, FileSystemSource, HttpRangeSource};
use marquee_error::{MarqueeResult, StorageError, StorageErrorKind};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Which byte source implementation to construct.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum SourceBackend {
    /// Local filesystem
    #[default]
    #[display("local")]
    Local,
    /// Range-capable HTTP file server
    #[display("remote")]
    Remote,
}

/// Byte source configuration.
///
/// # Example
///
/// ```toml
/// [source]
/// backend = "remote"
/// base_url = "http://nas.local:8080/media/"
/// timeout_secs = 30
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Backend implementation
    #[serde(default)]
    pub backend: SourceBackend,
    /// Root directory for the local backend
    #[serde(default = "default_root")]
    pub root: String,
    /// Base URL for the remote backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Bearer token for the remote backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Per-request timeout for the remote backend
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_root() -> String {
    "/".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            backend: SourceBackend::default(),
            root: default_root(),
            base_url: None,
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SourceConfig {
    /// Construct the configured backend.
    ///
    /// # Errors
    ///
    /// Returns error if the remote backend has no base URL or the backend
    /// cannot be initialized.
    #[tracing::instrument(skip(self), fields(backend = %self.backend))]
    pub fn build(&self) -> MarqueeResult<Arc<dyn ByteSource>> {
        match self.backend {
            SourceBackend::Local => Ok(Arc::new(FileSystemSource::new(&self.root)?)),
            SourceBackend::Remote => {
                let base_url = self.base_url.as_deref().ok_or_else(|| {
                    StorageError::new(StorageErrorKind::InvalidConfig(
                        "remote backend requires base_url".to_string(),
                    ))
                })?;
                Ok(Arc::new(HttpRangeSource::new(
                    base_url,
                    self.token.clone(),
                    Duration::from_secs(self.timeout_secs),
                )?))
            }
        }
    }
}
