//! Catalog client configuration.

use crate::{CatalogAuth, Locale};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Configuration for the catalog client.
///
/// # Examples
///
/// ```
/// use marquee_catalog::CatalogConfig;
///
/// let config = CatalogConfig::default()
///     .with_api_key(Some("0123abcd".to_string()))
///     .with_language("sv".to_string());
///
/// assert_eq!(config.locale().as_str(), "sv-SE");
/// assert!(config.auth().is_some());
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
#[builder(setter(into))]
pub struct CatalogConfig {
    /// API key or read-access token; enrichment is skipped without one
    #[serde(default)]
    #[builder(default)]
    api_key: Option<String>,

    /// Configured language, bare code or full tag
    #[serde(default = "default_language")]
    #[builder(default = "default_language()")]
    language: String,

    /// API base URL
    #[serde(default = "default_base_url")]
    #[builder(default = "default_base_url()")]
    base_url: String,

    /// Image host prefix, joined directly with relative image paths
    #[serde(default = "default_image_base_url")]
    #[builder(default = "default_image_base_url()")]
    image_base_url: String,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    #[builder(default = "default_timeout_secs()")]
    timeout_secs: u64,

    /// Retries after the first attempt for retryable failures
    #[serde(default = "default_max_retries")]
    #[builder(default = "default_max_retries()")]
    max_retries: usize,

    /// First backoff delay
    #[serde(default = "default_initial_backoff_ms")]
    #[builder(default = "default_initial_backoff_ms()")]
    initial_backoff_ms: u64,

    /// Backoff ceiling
    #[serde(default = "default_max_backoff_secs")]
    #[builder(default = "default_max_backoff_secs()")]
    max_backoff_secs: u64,

    /// Request pacing
    #[serde(default = "default_requests_per_second")]
    #[builder(default = "default_requests_per_second()")]
    requests_per_second: u32,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_image_base_url() -> String {
    "https://image.tmdb.org/t/p/original".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> usize {
    3
}

fn default_initial_backoff_ms() -> u64 {
    250
}

fn default_max_backoff_secs() -> u64 {
    5
}

fn default_requests_per_second() -> u32 {
    20
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            language: default_language(),
            base_url: default_base_url(),
            image_base_url: default_image_base_url(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_secs: default_max_backoff_secs(),
            requests_per_second: default_requests_per_second(),
        }
    }
}

impl CatalogConfig {
    /// Normalized locale for the configured language.
    pub fn locale(&self) -> Locale {
        Locale::parse(&self.language)
    }

    /// Credential, if one is configured.
    pub fn auth(&self) -> Option<CatalogAuth> {
        self.api_key
            .as_deref()
            .and_then(CatalogAuth::from_credential)
    }
}
