//! Normalized catalog records.

use crate::{ArtifactKind, MediaKind};
use serde::{Deserialize, Serialize};

/// Normalized result of a successful catalog lookup.
///
/// # Examples
///
/// ```
/// use marquee_core::{CatalogRecord, MediaKind};
///
/// let record = CatalogRecord::builder()
///     .catalog_id(45745u64)
///     .media_kind(MediaKind::Movie)
///     .original_title("Sintel")
///     .release_date("2010-09-30")
///     .genres(vec!["Animation".to_string()])
///     .build()
///     .unwrap();
///
/// assert_eq!(record.year(), Some(2010));
/// assert!(record.localized_title.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_builder::Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct CatalogRecord {
    /// Catalog id
    pub catalog_id: u64,
    /// Movie or series
    #[builder(default)]
    pub media_kind: MediaKind,
    /// Identifier in the cross-reference catalog
    #[builder(default, setter(into, strip_option))]
    pub cross_ref_id: Option<String>,
    /// Title in the original language
    pub original_title: String,
    /// Title in the configured locale
    #[builder(default, setter(into, strip_option))]
    pub localized_title: Option<String>,
    /// ISO-8601 release or first-air date
    #[builder(default, setter(into, strip_option))]
    pub release_date: Option<String>,
    /// Average rating
    #[builder(default, setter(into, strip_option))]
    pub rating: Option<f64>,
    /// Plot summary in the configured locale
    #[builder(default, setter(into, strip_option))]
    pub plot: Option<String>,
    /// Genre names, catalog order
    #[builder(default)]
    pub genres: Vec<String>,
    /// Production company names, catalog order
    #[builder(default)]
    pub companies: Vec<String>,
    /// Poster path relative to the catalog image host
    #[builder(default, setter(into, strip_option))]
    pub poster_path: Option<String>,
    /// Backdrop path relative to the catalog image host
    #[builder(default, setter(into, strip_option))]
    pub backdrop_path: Option<String>,
}

impl CatalogRecordBuilder {
    fn validate(&self) -> Result<(), String> {
        match &self.original_title {
            Some(title) if title.trim().is_empty() => {
                Err("original_title must not be empty".to_string())
            }
            _ => Ok(()),
        }
    }
}

impl CatalogRecord {
    /// Creates a new record builder.
    pub fn builder() -> CatalogRecordBuilder {
        CatalogRecordBuilder::default()
    }

    /// Release year derived from the release date.
    pub fn year(&self) -> Option<u16> {
        self.release_date
            .as_deref()
            .and_then(|date| date.get(..4))
            .and_then(|year| year.parse().ok())
    }

    /// Best display title: localized when known, original otherwise.
    pub fn display_title(&self) -> &str {
        self.localized_title
            .as_deref()
            .unwrap_or(&self.original_title)
    }

    /// Relative image path for an artifact kind.
    pub fn image_path(&self, kind: ArtifactKind) -> Option<&str> {
        match kind {
            ArtifactKind::Poster => self.poster_path.as_deref(),
            ArtifactKind::Backdrop => self.backdrop_path.as_deref(),
        }
    }
}
