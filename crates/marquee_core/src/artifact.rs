//! Materialized image artifacts.

use serde::{Deserialize, Serialize};

/// Image fields of a catalog record that produce artifacts.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ArtifactKind {
    /// Poster image
    Poster,
    /// Backdrop / fanart image
    Backdrop,
}

/// A materialized artifact: its content identifier and where it lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactRef {
    /// Which image field produced the artifact
    pub kind: ArtifactKind,
    /// Content identifier of the stored bytes
    pub content_id: String,
    /// Backend path of the stored bytes
    pub storage_path: String,
}
