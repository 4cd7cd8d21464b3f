use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::hash::info_hash;

/// Length of a DHT location hash in bytes.
pub const HASH_LEN: usize = 20;
/// Length of an Ed25519 public key in bytes.
pub const PUBLIC_KEY_LEN: usize = 32;

/// 20-byte DHT location / identity hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct InfoHash(pub [u8; HASH_LEN]);

impl InfoHash {
    /// Hashes `data` into a location.
    pub fn get(data: &[u8]) -> Self {
        info_hash(data)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, CoreError> {
        let raw: [u8; HASH_LEN] = bytes.try_into().map_err(|_| CoreError::InvalidLength {
            expected: HASH_LEN,
            actual: bytes.len(),
        })?;
        Ok(Self(raw))
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }
}

impl fmt::Display for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for InfoHash {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = hex::decode(s.trim())?;
        Self::from_slice(&raw)
    }
}

/// Raw Ed25519 public key of a value owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey(pub [u8; PUBLIC_KEY_LEN]);

impl PublicKey {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CoreError> {
        let raw: [u8; PUBLIC_KEY_LEN] =
            bytes.try_into().map_err(|_| CoreError::InvalidLength {
                expected: PUBLIC_KEY_LEN,
                actual: bytes.len(),
            })?;
        Ok(Self(raw))
    }

    /// Identity hash of this key, used as a recipient address.
    pub fn id(&self) -> InfoHash {
        info_hash(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.0
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}
