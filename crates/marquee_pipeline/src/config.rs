//! Layered configuration.
//!
//! Sources, later ones overriding earlier ones:
//! 1. Bundled defaults (`marquee.toml` shipped with the crate)
//! 2. `~/.config/marquee/marquee.toml`
//! 3. `./marquee.toml`
//! 4. `MARQUEE__*` environment variables (`MARQUEE__CATALOG__API_KEY`, ...)

use config::{Config, Environment, File, FileFormat};
use derive_getters::Getters;
use marquee_cache::CacheConfig;
use marquee_catalog::{CatalogAuth, CatalogConfig, CatalogContext, Locale};
use marquee_error::{ConfigError, ConfigErrorKind, MarqueeError, MarqueeResult};
use marquee_storage::SourceConfig;
use marquee_store::StoreConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const REDACTED: &str = "***";

/// Where and how artifacts are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ArtifactConfig {
    /// Directory on the byte source receiving artifacts
    #[serde(default = "default_artifact_dir")]
    dir: String,
    /// Prefix of the catalog id inside artifact file names
    #[serde(default = "default_catalog_prefix")]
    catalog_prefix: String,
}

fn default_artifact_dir() -> String {
    "artifacts".to_string()
}

fn default_catalog_prefix() -> String {
    "tmdbid-".to_string()
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            dir: default_artifact_dir(),
            catalog_prefix: default_catalog_prefix(),
        }
    }
}

impl ArtifactConfig {
    /// Create an artifact configuration.
    pub fn new(dir: impl Into<String>, catalog_prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            catalog_prefix: catalog_prefix.into(),
        }
    }
}

/// Orchestration settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct PipelineConfig {
    /// Ignore prior resolutions and cached payloads
    #[serde(default)]
    force_recompute: bool,
    /// Time budget for each stage of a work item
    #[serde(default = "default_stage_timeout_secs")]
    stage_timeout_secs: u64,
    /// Work items processed at once by a batch
    #[serde(default = "default_concurrency")]
    concurrency: usize,
}

fn default_stage_timeout_secs() -> u64 {
    120
}

fn default_concurrency() -> usize {
    4
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            force_recompute: false,
            stage_timeout_secs: default_stage_timeout_secs(),
            concurrency: default_concurrency(),
        }
    }
}

impl PipelineConfig {
    /// Stage time budget.
    pub fn stage_timeout(&self) -> Duration {
        Duration::from_secs(self.stage_timeout_secs)
    }
}

/// Top-level Marquee configuration.
///
/// # Example
///
/// ```no_run
/// use marquee_pipeline::MarqueeConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = MarqueeConfig::load()?;
/// println!("catalog: {}", config.catalog.base_url());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MarqueeConfig {
    /// Catalog client
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Byte source backend
    #[serde(default)]
    pub source: SourceConfig,
    /// Resolution cache
    #[serde(default)]
    pub cache: CacheConfig,
    /// Metadata store
    #[serde(default)]
    pub store: StoreConfig,
    /// Artifact output
    #[serde(default)]
    pub artifacts: ArtifactConfig,
    /// Orchestration
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl MarqueeConfig {
    /// Load configuration from a single file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> MarqueeResult<Self> {
        debug!("Loading configuration from file");

        Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                MarqueeError::from(ConfigError::new(ConfigErrorKind::Load {
                    origin: path.as_ref().display().to_string(),
                    reason: e.to_string(),
                }))
            })?
            .try_deserialize()
            .map_err(|e| {
                MarqueeError::from(ConfigError::new(ConfigErrorKind::Invalid(e.to_string())))
            })
    }

    /// Load configuration from every layer.
    ///
    /// # Errors
    ///
    /// Returns an error if a present layer cannot be parsed.
    #[instrument]
    pub fn load() -> MarqueeResult<Self> {
        debug!("Loading configuration: env > current dir > home dir > bundled defaults");

        const DEFAULT_CONFIG: &str = include_str!("../../../marquee.toml");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/marquee/marquee.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder
            .add_source(File::with_name("marquee").required(false))
            .add_source(
                Environment::with_prefix("MARQUEE")
                    .separator("__")
                    .try_parsing(true),
            );

        builder
            .build()
            .map_err(|e| {
                MarqueeError::from(ConfigError::new(ConfigErrorKind::Load {
                    origin: "layered sources".to_string(),
                    reason: e.to_string(),
                }))
            })?
            .try_deserialize()
            .map_err(|e| {
                MarqueeError::from(ConfigError::new(ConfigErrorKind::Invalid(e.to_string())))
            })
    }

    /// Copy with credentials masked, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.catalog.api_key().is_some() {
            copy.catalog = copy.catalog.with_api_key(Some(REDACTED.to_string()));
        }
        if copy.store.token().is_some() {
            copy.store = copy.store.with_token(Some(REDACTED.to_string()));
        }
        if copy.source.token.is_some() {
            copy.source.token = Some(REDACTED.to_string());
        }
        copy
    }
}

/// Snapshot of the settings one run needs, taken when the run starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    /// Catalog credential; runs are skipped without one
    pub credential: Option<CatalogAuth>,
    /// Catalog locale
    pub locale: Locale,
    /// Ignore prior resolutions and cached payloads
    pub force_recompute: bool,
}

impl RunSettings {
    /// Snapshot the current configuration.
    pub fn from_config(config: &MarqueeConfig) -> Self {
        Self {
            credential: config.catalog.auth(),
            locale: config.catalog.locale(),
            force_recompute: *config.pipeline.force_recompute(),
        }
    }

    /// Override the force-recompute flag.
    pub fn with_force_recompute(mut self, force: bool) -> Self {
        self.force_recompute = force;
        self
    }

    /// Catalog request context, when a credential is present.
    pub fn catalog_context(&self) -> Option<CatalogContext> {
        self.credential
            .clone()
            .map(|auth| CatalogContext::new(auth, self.locale.clone()))
    }
}
