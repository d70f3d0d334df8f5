//! Artifact download and addressing.

use crate::ArtifactConfig;
use marquee_catalog::CatalogApi;
use marquee_core::{ArtifactKind, ArtifactRef, CallOutcome, CatalogRecord};
use marquee_storage::{ByteSource, address_source};
use std::path::Path;
use std::sync::Arc;
use strum::IntoEnumIterator;
use tracing::{debug, instrument, warn};

const DEFAULT_EXTENSION: &str = ".jpg";
const FORBIDDEN: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// File name of an artifact:
/// `<title>( (<year>))?[<prefix><catalog_id>]_<kind><ext>`.
///
/// Characters that are invalid in file names are dropped and whitespace runs
/// collapse to one space.
///
/// # Examples
///
/// ```
/// use marquee_core::ArtifactKind;
/// use marquee_pipeline::artifact_filename;
///
/// assert_eq!(
///     artifact_filename("Sintel", Some(2010), "tmdbid-", 45745, ArtifactKind::Poster, "/abc.png"),
///     "Sintel (2010)[tmdbid-45745]_poster.png"
/// );
/// assert_eq!(
///     artifact_filename("What?  Now: Part 2", None, "tmdbid-", 7, ArtifactKind::Backdrop, "/x"),
///     "What Now Part 2[tmdbid-7]_backdrop.jpg"
/// );
/// ```
pub fn artifact_filename(
    title: &str,
    year: Option<u16>,
    catalog_prefix: &str,
    catalog_id: u64,
    kind: ArtifactKind,
    image_path: &str,
) -> String {
    let extension = Path::new(image_path)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
    let year = year.map(|y| format!(" ({y})")).unwrap_or_default();

    let raw = format!("{title}{year}[{catalog_prefix}{catalog_id}]_{kind}{extension}");
    raw.replace(FORBIDDEN, "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Downloads catalog images onto the byte source and addresses them.
///
/// An artifact already present at its destination is not downloaded again,
/// so repeated runs produce the same [`ArtifactRef`] with one download.
#[derive(Clone)]
pub struct ArtifactMaterializer {
    catalog: Arc<dyn CatalogApi>,
    source: Arc<dyn ByteSource>,
    config: ArtifactConfig,
}

impl ArtifactMaterializer {
    /// Create a materializer.
    pub fn new(
        catalog: Arc<dyn CatalogApi>,
        source: Arc<dyn ByteSource>,
        config: ArtifactConfig,
    ) -> Self {
        Self {
            catalog,
            source,
            config,
        }
    }

    /// Backend path of an artifact.
    pub fn destination(&self, file_name: &str) -> String {
        let dir = self.config.dir().trim_end_matches('/');
        if dir.is_empty() {
            file_name.to_string()
        } else {
            format!("{dir}/{file_name}")
        }
    }

    /// Materialize one image. Any failure yields `None`.
    #[instrument(skip(self, title))]
    pub async fn materialize(
        &self,
        image_path: &str,
        kind: ArtifactKind,
        title: &str,
        year: Option<u16>,
        catalog_id: u64,
    ) -> Option<ArtifactRef> {
        let file_name = artifact_filename(
            title,
            year,
            self.config.catalog_prefix(),
            catalog_id,
            kind,
            image_path,
        );
        let destination = self.destination(&file_name);

        match self.source.exists(&destination).await {
            Ok(true) => debug!(destination = %destination, "Artifact present, skipping download"),
            Ok(false) => {
                let bytes = match self.catalog.fetch_image(image_path).await {
                    CallOutcome::Success(bytes) => bytes,
                    outcome => {
                        warn!(image_path, outcome = outcome.label(), "Image download failed");
                        return None;
                    }
                };
                if let Err(e) = self.source.write_all(&destination, &bytes).await {
                    warn!(destination = %destination, error = %e, "Failed to store artifact");
                    return None;
                }
                debug!(destination = %destination, bytes = bytes.len(), "Stored artifact");
            }
            Err(e) => {
                warn!(destination = %destination, error = %e, "Cannot check artifact destination");
                return None;
            }
        }

        match address_source(self.source.as_ref(), &destination).await {
            Ok(content_id) => Some(ArtifactRef {
                kind,
                content_id: content_id.to_string(),
                storage_path: destination,
            }),
            Err(e) => {
                warn!(destination = %destination, error = %e, "Failed to address artifact");
                None
            }
        }
    }

    /// Materialize every image a record has.
    pub async fn materialize_record(&self, record: &CatalogRecord) -> Vec<ArtifactRef> {
        let mut artifacts = Vec::new();
        for kind in ArtifactKind::iter() {
            let Some(image_path) = record.image_path(kind) else {
                continue;
            };
            if let Some(artifact) = self
                .materialize(
                    image_path,
                    kind,
                    record.display_title(),
                    record.year(),
                    record.catalog_id,
                )
                .await
            {
                artifacts.push(artifact);
            }
        }
        artifacts
    }
}
