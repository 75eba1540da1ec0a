//! Content hashing primitives
//!
//! Provides [`ContentHash`], a strongly-typed 32-byte digest used for two
//! purposes across docfill:
//! - Document fingerprints (Blake3) for cache keys and idempotence checks
//! - Output checksums (SHA-256) attached to generated documents

use sha2::{Digest, Sha256};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// A 32-byte content digest
///
/// Immutable and cheap to clone (Copy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Create a new ContentHash from raw bytes
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    fn from_slice(bytes: &[u8]) -> Result<Self, HashError> {
        if bytes.len() != 32 {
            return Err(HashError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// Blake3 fingerprint of a document buffer
    #[inline]
    #[must_use]
    pub fn fingerprint(data: &[u8]) -> Self {
        Self::new(*blake3::hash(data).as_bytes())
    }

    /// SHA-256 checksum of an output buffer
    #[inline]
    #[must_use]
    pub fn checksum(data: &[u8]) -> Self {
        let digest = Sha256::digest(data);
        Self::new(digest.into())
    }

    /// Short string representation (first 16 hex chars)
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl Display for ContentHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for ContentHash {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        Self::from_slice(&bytes)
    }
}

impl serde::Serialize for ContentHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

impl<'de> serde::Deserialize<'de> for ContentHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct HexOrBytes;

        impl serde::de::Visitor<'_> for HexOrBytes {
            type Value = ContentHash;

            fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
                f.write_str("a 64-char hex string or 32 bytes")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<ContentHash, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_bytes<E: serde::de::Error>(self, v: &[u8]) -> Result<ContentHash, E> {
                ContentHash::from_slice(v).map_err(E::custom)
            }
        }

        if deserializer.is_human_readable() {
            deserializer.deserialize_str(HexOrBytes)
        } else {
            deserializer.deserialize_bytes(HexOrBytes)
        }
    }
}

/// Errors from decoding a [`ContentHash`]
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    /// Invalid hash length
    #[error("invalid hash length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Hex encoding error
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_deterministic() {
        let h1 = ContentHash::fingerprint(b"hello world");
        let h2 = ContentHash::fingerprint(b"hello world");
        assert_eq!(h1, h2);
        assert_ne!(h1, ContentHash::fingerprint(b"hello world!"));
    }

    #[test]
    fn checksum_differs_from_fingerprint() {
        let data = b"docx bytes";
        assert_ne!(ContentHash::fingerprint(data), ContentHash::checksum(data));
    }

    #[test]
    fn checksum_known_vector() {
        // SHA-256 of the empty string
        let hash = ContentHash::checksum(b"");
        assert_eq!(
            hash.to_string(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn parse_rejects_wrong_length() {
        let result = "abcd".parse::<ContentHash>();
        assert!(matches!(
            result,
            Err(HashError::InvalidLength {
                expected: 32,
                actual: 2
            })
        ));
    }

    #[test]
    fn display_and_parse() {
        let hash = ContentHash::fingerprint(b"test");
        let parsed: ContentHash = hash.to_string().parse().unwrap();
        assert_eq!(hash, parsed);
    }

    #[test]
    fn short_is_prefix() {
        let hash = ContentHash::fingerprint(b"test");
        let short = hash.short();
        assert_eq!(short.len(), 16);
        assert!(hash.to_string().starts_with(&short));
    }

    #[test]
    fn serde_json_roundtrip() {
        let hash = ContentHash::checksum(b"test");
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json.len(), 66);
        let decoded: ContentHash = serde_json::from_str(&json).unwrap();
        assert_eq!(hash, decoded);
    }
}
