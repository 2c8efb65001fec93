// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Compiled contract artifacts.

use crate::types::version::Version;
use core::fmt;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Executable contract code, persisted as `0x` hex.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Bytecode(pub Vec<u8>);

impl Bytecode {
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Bytecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bytecode({} bytes)", self.0.len())
    }
}

impl Serialize for Bytecode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(&self.0)))
    }
}

impl<'de> Deserialize<'de> for Bytecode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let digits = s.strip_prefix("0x").unwrap_or(&s);
        hex::decode(digits)
            .map(Bytecode)
            .map_err(serde::de::Error::custom)
    }
}

/// A named, versioned, compiled contract. Never mutated after compilation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContractArtifact {
    pub name: String,
    pub version: Version,
    pub abi: Value,
    pub bytecode: Bytecode,
}
