//! Self-describing content identifiers.

use cid::Cid;
use marquee_error::{StorageError, StorageErrorKind};
use multihash::Multihash;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// SHA2-256 multihash code
pub(crate) const SHA2_256_CODE: u64 = 0x12;

/// Raw codec identifier (0x55) for raw binary data
pub(crate) const RAW_CODEC: u64 = 0x55;

/// Content identifier: CIDv1, raw codec, SHA2-256 multihash.
///
/// Rendered as multibase base32 lowercase without padding (prefix `b`).
/// The text form carries version, codec, hash function and digest length,
/// so it can be decoded without outside metadata.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentId {
    inner: Cid,
}

impl ContentId {
    /// Identifier of an arbitrary byte string hashed as-is.
    pub(crate) fn from_hash_input(input: &[u8]) -> Result<Self, StorageError> {
        let digest = Sha256::digest(input);
        let hash = Multihash::wrap(SHA2_256_CODE, &digest)
            .map_err(|e| StorageError::new(StorageErrorKind::Digest(e.to_string())))?;
        Ok(Self {
            inner: Cid::new_v1(RAW_CODEC, hash),
        })
    }

    /// Parse an identifier from its text form.
    pub fn parse(s: &str) -> Result<Self, StorageError> {
        let cid = Cid::from_str(s).map_err(|e| {
            StorageError::new(StorageErrorKind::InvalidPath(format!(
                "invalid content identifier {s}: {e}"
            )))
        })?;
        Ok(Self { inner: cid })
    }

    /// CID version (always 1 for identifiers produced here).
    pub fn version(&self) -> u64 {
        self.inner.version().into()
    }

    /// Multicodec of the addressed content.
    pub fn codec(&self) -> u64 {
        self.inner.codec()
    }

    /// Multihash function code.
    pub fn hash_code(&self) -> u64 {
        self.inner.hash().code()
    }

    /// Digest length in bytes, as declared by the multihash.
    pub fn digest_len(&self) -> u8 {
        self.inner.hash().size()
    }

    /// Raw digest bytes.
    pub fn digest(&self) -> &[u8] {
        self.inner.hash().digest()
    }

    /// Packed binary form.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.inner.to_bytes()
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl fmt::Debug for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ContentId").field(&self.to_string()).finish()
    }
}

impl FromStr for ContentId {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ContentId {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ContentId> for String {
    fn from(id: ContentId) -> Self {
        id.to_string()
    }
}
