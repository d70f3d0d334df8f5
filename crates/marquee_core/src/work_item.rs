//! Work items handed to the pipeline by the intake layer.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Broad classification of the source file, as known by the store.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FileKind {
    /// Video container
    Video,
    /// Audio file
    Audio,
    /// Still image
    Image,
    /// Text or document
    Text,
    /// Anything else
    #[default]
    Other,
}

impl FileKind {
    /// Whether the pipeline enriches files of this kind.
    pub fn is_playable_media(&self) -> bool {
        matches!(self, FileKind::Video)
    }
}

/// Kind of catalog entry a file is expected to match.
///
/// # Examples
///
/// ```
/// use marquee_core::MediaKind;
///
/// assert_eq!("series".parse::<MediaKind>().unwrap(), MediaKind::Series);
/// assert_eq!(MediaKind::Movie.to_string(), "movie");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MediaKind {
    /// Feature film
    #[default]
    Movie,
    /// Episodic series
    #[strum(to_string = "series", serialize = "tv")]
    #[serde(alias = "tv")]
    Series,
}

/// Attributes the store already knows about a file before enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KnownAttributes {
    /// File classification
    pub file_kind: FileKind,
    /// Title parsed from the file name
    pub title: Option<String>,
    /// Original title recorded by an earlier tool
    pub original_title: Option<String>,
    /// Year parsed from the file name
    pub year: Option<String>,
    /// Expected catalog entry kind
    pub media_kind: Option<MediaKind>,
    /// Identifier from another catalog (e.g. `tt1727587`)
    pub cross_ref_id: Option<String>,
    /// Content identifier computed by an earlier run
    pub sample_id: Option<String>,
    /// Catalog id when the item has already been resolved
    pub catalog_id: Option<String>,
}

/// One enrichment attempt.
///
/// # Examples
///
/// ```
/// use marquee_core::{FileKind, WorkItem};
///
/// let item: WorkItem = serde_json::from_str(r#"{
///     "content_ref": "a1b2",
///     "path": "/media/Sintel.2010.mkv",
///     "attributes": { "file_kind": "video", "title": "Sintel", "year": "2010" }
/// }"#).unwrap();
///
/// assert_eq!(item.attributes.file_kind, FileKind::Video);
/// assert_eq!(item.filename_title().as_deref(), Some("Sintel 2010"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Store-level content reference
    pub content_ref: String,
    /// Path of the source file on the byte source
    pub path: String,
    /// Attributes known before enrichment
    #[serde(default)]
    pub attributes: KnownAttributes,
}

impl WorkItem {
    /// Create a work item with default attributes.
    pub fn new(content_ref: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            content_ref: content_ref.into(),
            path: path.into(),
            attributes: KnownAttributes::default(),
        }
    }

    /// Replace the known attributes.
    pub fn with_attributes(mut self, attributes: KnownAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Raw title derived from the file name stem.
    ///
    /// Dots and underscores are treated as word separators.
    pub fn filename_title(&self) -> Option<String> {
        let stem = Path::new(&self.path).file_stem()?.to_str()?;
        let title = stem
            .replace(['.', '_'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        (!title.is_empty()).then_some(title)
    }
}
