// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Identity types.
//!
//! Addresses and transaction hashes are fixed-width byte strings rendered as
//! `0x`-prefixed lowercase hex everywhere they leave the process (registry
//! file, chain state, CLI output).

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Failure to parse a hex identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {reason}")]
pub struct ParseIdError {
    pub kind: &'static str,
    pub reason: String,
}

fn decode_fixed<const N: usize>(kind: &'static str, s: &str) -> Result<[u8; N], ParseIdError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(digits).map_err(|e| ParseIdError {
        kind,
        reason: e.to_string(),
    })?;
    bytes.try_into().map_err(|b: Vec<u8>| ParseIdError {
        kind,
        reason: format!("expected {} bytes, found {}", N, b.len()),
    })
}

macro_rules! hex_id {
    ($name:ident, $len:expr, $kind:expr) => {
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            pub const LEN: usize = $len;

            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(self, f)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                decode_fixed::<$len>($kind, s).map($name)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

hex_id!(Address, 20, "address");
hex_id!(TxHash, 32, "transaction hash");

impl Address {
    /// Derives a contract address from its creator and the creator's nonce.
    pub fn derive(creator: &Address, nonce: u64) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"deploykit:create");
        hasher.update(&creator.0);
        hasher.update(&nonce.to_le_bytes());
        let digest = hasher.finalize();
        let mut out = [0u8; 20];
        out.copy_from_slice(&digest.as_bytes()[..20]);
        Address(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_display_parse() {
        let addr = Address([0xab; 20]);
        let text = addr.to_string();
        assert!(text.starts_with("0xabab"));
        assert_eq!(text.parse::<Address>().unwrap(), addr);
        // Prefix is optional on input
        assert_eq!(text[2..].parse::<Address>().unwrap(), addr);
    }

    #[test]
    fn test_address_wrong_length() {
        let err = "0xabcd".parse::<Address>().unwrap_err();
        assert_eq!(err.kind, "address");
    }

    #[test]
    fn test_derived_addresses_differ_by_nonce() {
        let creator = Address([1; 20]);
        assert_ne!(Address::derive(&creator, 0), Address::derive(&creator, 1));
        assert_eq!(Address::derive(&creator, 7), Address::derive(&creator, 7));
    }
}
