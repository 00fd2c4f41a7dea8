//! # Identity Newtypes
//!
//! Newtype wrappers for every identifier in the stack. These prevent
//! accidental identifier confusion: an `ItemId` cannot be passed where an
//! `EvidenceGroupId` is expected, even though both wrap a 32-byte digest.
//!
//! ## Derivation
//!
//! - [`ItemId::from_content`]: `sha256(JCS({"item": hex(data)}))`. The same
//!   data always maps to the same item.
//! - [`ItemId::from_sequence`]: `sha256(JCS({"item": hex(data), "sequence": n}))`.
//!   Every submission gets a fresh item, so data can be listed again after
//!   its removal.
//! - [`EvidenceGroupId::for_request`]: `sha256(JCS({"item_id": .., "request": n}))`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::canonical::CanonicalBytes;
use crate::digest::{sha256_digest, Digest32};
use crate::error::{CanonicalizationError, CoreError};

/// A 20-byte account address (participant, registry, arbitrator, ledger).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address([u8; 20]);

impl Address {
    /// The zero address. Never a valid participant.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Wrap raw address bytes.
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Parse a hex address, with or without a `0x` prefix.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(raw).map_err(|e| CoreError::InvalidHex {
            input: s.to_string(),
            reason: e.to_string(),
        })?;
        let arr: [u8; 20] = bytes.try_into().map_err(|v: Vec<u8>| CoreError::InvalidHex {
            input: s.to_string(),
            reason: format!("expected 20 bytes, got {}", v.len()),
        })?;
        Ok(Self(arr))
    }

    /// Whether this is the zero address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Access the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Unique identifier of a registry item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub Digest32);

impl ItemId {
    /// Content-addressed id: the same data always yields the same id.
    pub fn from_content(data: &[u8]) -> Result<Self, CanonicalizationError> {
        let canonical = CanonicalBytes::new(&serde_json::json!({ "item": hex::encode(data) }))?;
        Ok(Self(sha256_digest(&canonical)))
    }

    /// Sequence-derived id: the submission index is mixed into the hash.
    pub fn from_sequence(data: &[u8], sequence: u64) -> Result<Self, CanonicalizationError> {
        let canonical = CanonicalBytes::new(&serde_json::json!({
            "item": hex::encode(data),
            "sequence": sequence,
        }))?;
        Ok(Self(sha256_digest(&canonical)))
    }

    /// Parse from hex.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        Digest32::from_hex(s).map(Self)
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "item:{}", self.0)
    }
}

/// Identifier of a dispute inside one arbitrator.
///
/// Dispute ids are only unique per arbitrator; the registry indexes
/// disputes by `(arbitrator address, DisputeId)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisputeId(pub u64);

impl DisputeId {
    /// Position of this dispute in the arbitrator's append-only list.
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for DisputeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "dispute:{}", self.0)
    }
}

/// Groups the evidence submitted for one request of one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvidenceGroupId(pub Digest32);

impl EvidenceGroupId {
    /// Evidence group of the `request_index`-th request of `item_id`.
    pub fn for_request(
        item_id: &ItemId,
        request_index: usize,
    ) -> Result<Self, CanonicalizationError> {
        let canonical = CanonicalBytes::new(&serde_json::json!({
            "item_id": item_id.0.to_hex(),
            "request": request_index as u64,
        }))?;
        Ok(Self(sha256_digest(&canonical)))
    }
}

impl std::fmt::Display for EvidenceGroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "evidence:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_parse_and_display() {
        let addr = Address::parse("0x00000000000000000000000000000000000000ff").unwrap();
        assert_eq!(addr.as_bytes()[19], 0xff);
        assert_eq!(addr.to_string(), "0x00000000000000000000000000000000000000ff");
        assert!(!addr.is_zero());
        assert!(Address::ZERO.is_zero());
    }

    #[test]
    fn address_rejects_wrong_length() {
        assert!(Address::parse("0x1234").is_err());
        assert!(Address::parse("not-hex").is_err());
    }

    #[test]
    fn address_serde_as_string_key() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(Address::new([7; 20]), 1u64);
        let json = serde_json::to_string(&map).unwrap();
        assert!(json.contains("0x0707"));
        let back: std::collections::BTreeMap<Address, u64> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn content_id_is_deterministic() {
        let a = ItemId::from_content(b"recipient-1").unwrap();
        let b = ItemId::from_content(b"recipient-1").unwrap();
        let c = ItemId::from_content(b"recipient-2").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn sequence_id_differs_per_sequence() {
        let a = ItemId::from_sequence(b"recipient", 0).unwrap();
        let b = ItemId::from_sequence(b"recipient", 1).unwrap();
        assert_ne!(a, b);
        assert_ne!(a, ItemId::from_content(b"recipient").unwrap());
    }

    #[test]
    fn evidence_group_depends_on_request_index() {
        let item = ItemId::from_content(b"x").unwrap();
        let g0 = EvidenceGroupId::for_request(&item, 0).unwrap();
        let g1 = EvidenceGroupId::for_request(&item, 1).unwrap();
        assert_ne!(g0, g1);
    }

    #[test]
    fn item_id_hex_roundtrip() {
        let id = ItemId::from_content(b"abc").unwrap();
        assert_eq!(ItemId::parse(&id.0.to_string()).unwrap(), id);
    }
}
