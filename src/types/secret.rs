// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Rotating upgrade secrets.
//!
//! A proxy stores only the commitment (blake3 hash) of the next secret.
//! Revealing that secret authorizes exactly one retarget, which must also
//! install the commitment for the secret after it.

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::id::ParseIdError;

/// Plaintext secret. Debug output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct UpgradeSecret(Vec<u8>);

impl UpgradeSecret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn commitment(&self) -> SecretHash {
        SecretHash::of(&self.0)
    }
}

impl From<&str> for UpgradeSecret {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl fmt::Debug for UpgradeSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UpgradeSecret(<redacted>)")
    }
}

/// Commitment to an [`UpgradeSecret`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SecretHash(pub [u8; 32]);

impl SecretHash {
    pub fn of(secret: &[u8]) -> Self {
        SecretHash(*blake3::hash(secret).as_bytes())
    }

    /// True when `secret` opens this commitment.
    pub fn opens_with(&self, secret: &UpgradeSecret) -> bool {
        secret.commitment() == *self
    }
}

impl fmt::Display for SecretHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for SecretHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for SecretHash {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|e| ParseIdError {
            kind: "secret hash",
            reason: e.to_string(),
        })?;
        let arr: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| ParseIdError {
            kind: "secret hash",
            reason: format!("expected 32 bytes, found {}", b.len()),
        })?;
        Ok(SecretHash(arr))
    }
}

impl Serialize for SecretHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SecretHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commitment_opens_only_with_its_secret() {
        let secret = UpgradeSecret::from("correct horse");
        let hash = secret.commitment();
        assert!(hash.opens_with(&secret));
        assert!(!hash.opens_with(&UpgradeSecret::from("battery staple")));
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        let secret = UpgradeSecret::from("hunter2");
        assert!(!format!("{:?}", secret).contains("hunter2"));
    }
}
