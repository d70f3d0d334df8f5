//! Content addresser and sampling policy.

use crate::{ByteSource, ContentId};
use marquee_error::{MarqueeResult, StorageError};
use tracing::{debug, instrument};

/// Size of the sampled window: 1 MiB.
pub const SAMPLE_WINDOW: u64 = 1024 * 1024;

/// Byte range `start..end` sampled from a file of `size` bytes.
///
/// Files up to [`SAMPLE_WINDOW`] are sampled whole; larger files contribute
/// the window starting at `floor((size - SAMPLE_WINDOW) / 2)`.
///
/// # Examples
///
/// ```
/// use marquee_storage::{SAMPLE_WINDOW, sample_range};
///
/// assert_eq!(sample_range(10), (0, 10));
/// assert_eq!(sample_range(SAMPLE_WINDOW + 3), (1, SAMPLE_WINDOW + 1));
/// ```
pub fn sample_range(size: u64) -> (u64, u64) {
    if size <= SAMPLE_WINDOW {
        (0, size)
    } else {
        let start = (size - SAMPLE_WINDOW) / 2;
        (start, start + SAMPLE_WINDOW)
    }
}

/// Derive the content identifier of a file from its size and sample.
///
/// The digest covers the 8-byte big-endian size followed by the sample, so
/// files sharing a sample but differing in length get distinct identifiers.
pub fn address_of(size: u64, sample: &[u8]) -> Result<ContentId, StorageError> {
    let mut input = Vec::with_capacity(8 + sample.len());
    input.extend_from_slice(&size.to_be_bytes());
    input.extend_from_slice(sample);
    ContentId::from_hash_input(&input)
}

/// Compute the content identifier of a file held by any byte source.
///
/// # Errors
///
/// Propagates the backend's storage error when the file is missing or the
/// backend is unreachable.
#[instrument(skip(source), fields(backend = source.backend_name()))]
pub async fn address_source(source: &dyn ByteSource, path: &str) -> MarqueeResult<ContentId> {
    let stat = source.stat(path).await?;
    let (start, end) = sample_range(stat.size);
    let sample = source.read_range(path, start, end).await?;
    let id = address_of(stat.size, &sample)?;

    debug!(size = stat.size, start, end, content_id = %id, "Addressed content");
    Ok(id)
}
