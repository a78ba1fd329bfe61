//! Fixed-size 32-byte words used for keys, values and commitments

use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A 32-byte word
///
/// Trie keys, leaf values and commitments all share this representation.
/// Commitments are field elements in little-endian byte order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Bytes32([u8; 32]);

/// A commitment: a 32-byte field element produced by a [`crate::Committer`]
pub type Field = Bytes32;

impl Bytes32 {
    /// The all-zero word (the commitment of an empty subtree)
    pub const ZERO: Bytes32 = Bytes32([0u8; 32]);

    /// Create a word from raw bytes
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Bytes32(bytes)
    }

    /// Copy a word out of a slice, which must be exactly 32 bytes long
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let arr: [u8; 32] = bytes.try_into().ok()?;
        Some(Bytes32(arr))
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string, with or without a `0x` prefix
    pub fn from_hex(s: &str) -> std::result::Result<Self, hex::FromHexError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s)?;
        Bytes32::from_slice(&bytes).ok_or(hex::FromHexError::InvalidStringLength)
    }

    /// Get a short prefix for display
    pub fn short(&self) -> String {
        self.to_hex()[..8].to_string()
    }

    /// Check if this is the zero word
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl TryFrom<&[u8]> for Bytes32 {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::InvalidKey("key is empty".into()));
        }
        Bytes32::from_slice(bytes).ok_or_else(|| {
            Error::InvalidKey(format!("expected 32 bytes, got {}", bytes.len()))
        })
    }
}

impl From<[u8; 32]> for Bytes32 {
    fn from(bytes: [u8; 32]) -> Self {
        Bytes32(bytes)
    }
}

impl fmt::Display for Bytes32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl fmt::Debug for Bytes32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bytes32({})", self.short())
    }
}

impl Default for Bytes32 {
    fn default() -> Self {
        Bytes32::ZERO
    }
}

impl AsRef<[u8]> for Bytes32 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Hex string (`0x`-prefixed) in human-readable formats, raw bytes otherwise
impl Serialize for Bytes32 {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Bytes32 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Bytes32::from_hex(s.trim()).map_err(serde::de::Error::custom)
        } else {
            let bytes = <Vec<u8>>::deserialize(deserializer)?;
            Bytes32::from_slice(&bytes).ok_or_else(|| {
                serde::de::Error::invalid_length(bytes.len(), &"32 bytes")
            })
        }
    }
}
