//! Mapping raw catalog payloads onto [`CatalogRecord`].
//!
//! Movie and series payloads name the same concepts differently:
//!
//! | Concept        | Movie            | Series                 |
//! |----------------|------------------|------------------------|
//! | Localized name | `title`          | `name`                 |
//! | Original name  | `original_title` | `original_name`        |
//! | Release        | `release_date`   | `first_air_date`       |
//! | IMDb id        | `imdb_id`        | `external_ids.imdb_id` |
//!
//! The kind is read from the payload itself so that cached payloads replay
//! without any side-channel metadata.

use marquee_core::{CatalogRecord, MediaKind};
use marquee_error::{CatalogError, CatalogErrorKind};
use serde_json::Value as JsonValue;

/// Infer whether a payload describes a movie or a series.
///
/// # Examples
///
/// ```
/// use marquee_catalog::infer_media_kind;
/// use marquee_core::MediaKind;
/// use serde_json::json;
///
/// assert_eq!(infer_media_kind(&json!({"name": "Firefly", "first_air_date": "2002-09-20"})), MediaKind::Series);
/// assert_eq!(infer_media_kind(&json!({"title": "Sintel"})), MediaKind::Movie);
/// ```
pub fn infer_media_kind(payload: &JsonValue) -> MediaKind {
    match payload.get("media_type").and_then(JsonValue::as_str) {
        Some("tv") => return MediaKind::Series,
        Some("movie") => return MediaKind::Movie,
        _ => {}
    }

    let has = |key: &str| payload.get(key).is_some_and(|v| !v.is_null());
    if has("title") || has("original_title") || has("release_date") {
        MediaKind::Movie
    } else if has("name") || has("original_name") || has("first_air_date") {
        MediaKind::Series
    } else {
        MediaKind::Movie
    }
}

/// Build a record from a raw movie or series payload.
///
/// Empty strings are treated as absent, and a rating backed by zero votes is
/// dropped.
///
/// # Errors
///
/// Returns [`CatalogErrorKind::Normalize`] when the payload has no numeric
/// `id` or no usable title.
pub fn normalize(payload: &JsonValue) -> Result<CatalogRecord, CatalogError> {
    let catalog_id = payload
        .get("id")
        .and_then(JsonValue::as_u64)
        .ok_or_else(|| {
            CatalogError::new(CatalogErrorKind::Normalize("payload has no id".to_string()))
        })?;
    let media_kind = infer_media_kind(payload);

    let (localized, original, release, cross_ref) = match media_kind {
        MediaKind::Movie => (
            text(payload, "title"),
            text(payload, "original_title"),
            text(payload, "release_date"),
            text(payload, "imdb_id").or_else(|| external_imdb_id(payload)),
        ),
        MediaKind::Series => (
            text(payload, "name"),
            text(payload, "original_name"),
            text(payload, "first_air_date"),
            external_imdb_id(payload),
        ),
    };

    let original_title = original.or_else(|| localized.clone()).ok_or_else(|| {
        CatalogError::new(CatalogErrorKind::Normalize(format!(
            "{media_kind} {catalog_id} has no title"
        )))
    })?;

    let mut builder = CatalogRecord::builder();
    builder
        .catalog_id(catalog_id)
        .media_kind(media_kind)
        .original_title(original_title)
        .genres(names(payload, "genres"))
        .companies(names(payload, "production_companies"));

    if let Some(title) = localized {
        builder.localized_title(title);
    }
    if let Some(date) = release {
        builder.release_date(date);
    }
    if let Some(id) = cross_ref {
        builder.cross_ref_id(id);
    }
    if let Some(rating) = rating(payload) {
        builder.rating(rating);
    }
    if let Some(plot) = text(payload, "overview") {
        builder.plot(plot);
    }
    if let Some(path) = text(payload, "poster_path") {
        builder.poster_path(path);
    }
    if let Some(path) = text(payload, "backdrop_path") {
        builder.backdrop_path(path);
    }

    builder
        .build()
        .map_err(|e| CatalogError::new(CatalogErrorKind::Normalize(e.to_string())))
}

fn text(payload: &JsonValue, key: &str) -> Option<String> {
    payload
        .get(key)
        .and_then(JsonValue::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn external_imdb_id(payload: &JsonValue) -> Option<String> {
    payload.get("external_ids").and_then(|ids| text(ids, "imdb_id"))
}

fn rating(payload: &JsonValue) -> Option<f64> {
    let votes = payload.get("vote_count").and_then(JsonValue::as_u64);
    if votes == Some(0) {
        return None;
    }
    payload.get("vote_average").and_then(JsonValue::as_f64)
}

fn names(payload: &JsonValue, key: &str) -> Vec<String> {
    payload
        .get(key)
        .and_then(JsonValue::as_array)
        .map(|entries| entries.iter().filter_map(|e| text(e, "name")).collect())
        .unwrap_or_default()
}
