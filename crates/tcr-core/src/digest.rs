//! # Content Digests
//!
//! SHA-256 over [`CanonicalBytes`]. The function signature of
//! [`sha256_digest`] only accepts canonical bytes, so no digest in the
//! stack can be computed over an ad-hoc serialization.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::CoreError;

/// A raw 32-byte digest, rendered as lowercase hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Digest32(pub [u8; 32]);

impl Digest32 {
    /// Render as a lowercase hex string (64 chars, no prefix).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a hex string, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(raw).map_err(|e| CoreError::InvalidHex {
            input: s.to_string(),
            reason: e.to_string(),
        })?;
        let arr: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| CoreError::InvalidHex {
            input: s.to_string(),
            reason: format!("expected 32 bytes, got {}", v.len()),
        })?;
        Ok(Self(arr))
    }

    /// Access the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Display for Digest32 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl Serialize for Digest32 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Digest32 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Compute a SHA-256 digest from canonical bytes.
pub fn sha256_digest(data: &CanonicalBytes) -> Digest32 {
    let hash = Sha256::digest(data.as_bytes());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    Digest32(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_deterministic() {
        let cb = CanonicalBytes::new(&serde_json::json!({"a": 1, "b": 2})).unwrap();
        assert_eq!(sha256_digest(&cb), sha256_digest(&cb));
    }

    #[test]
    fn known_vector_for_empty_object() {
        let cb = CanonicalBytes::new(&serde_json::json!({})).unwrap();
        assert_eq!(
            sha256_digest(&cb).to_hex(),
            "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
        );
    }

    #[test]
    fn different_inputs_different_digests() {
        let a = CanonicalBytes::new(&serde_json::json!({"choice": 1})).unwrap();
        let b = CanonicalBytes::new(&serde_json::json!({"choice": 2})).unwrap();
        assert_ne!(sha256_digest(&a), sha256_digest(&b));
    }

    #[test]
    fn hex_roundtrip_accepts_prefix() {
        let cb = CanonicalBytes::new(&serde_json::json!({"x": "y"})).unwrap();
        let d = sha256_digest(&cb);
        assert_eq!(Digest32::from_hex(&d.to_string()).unwrap(), d);
        assert_eq!(Digest32::from_hex(&d.to_hex()).unwrap(), d);
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        assert!(matches!(
            Digest32::from_hex("0xabcd"),
            Err(CoreError::InvalidHex { .. })
        ));
    }

    #[test]
    fn serializes_as_prefixed_hex_string() {
        let d = Digest32([0xab; 32]);
        let json = serde_json::to_string(&d).unwrap();
        assert!(json.starts_with("\"0xabab"));
        let back: Digest32 = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
    }
}
