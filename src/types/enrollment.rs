// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Registry enrollments.
//!
//! An enrollment persists as a 4-element JSON array
//! `[name, version, address, abi]`, never as an object.

use crate::types::id::Address;
use crate::types::version::Version;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// One immutable record of a deployed contract.
#[derive(Clone, Debug, PartialEq)]
pub struct RegistryEnrollment {
    pub contract_name: String,
    pub version: Version,
    pub address: Address,
    pub abi: Value,
}

impl RegistryEnrollment {
    pub fn new(contract_name: impl Into<String>, version: Version, address: Address, abi: Value) -> Self {
        Self {
            contract_name: contract_name.into(),
            version,
            address,
            abi,
        }
    }

    /// Identity used by the double-write guard. The ABI does not take part.
    pub fn same_triple(&self, other: &RegistryEnrollment) -> bool {
        self.contract_name == other.contract_name
            && self.version == other.version
            && self.address == other.address
    }
}

impl Serialize for RegistryEnrollment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.contract_name, &self.version, &self.address, &self.abi).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RegistryEnrollment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (contract_name, version, address, abi) =
            <(String, Version, Address, Value)>::deserialize(deserializer)?;
        Ok(Self {
            contract_name,
            version,
            address,
            abi,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_enrollment_is_a_four_tuple() {
        let e = RegistryEnrollment::new("X", Version::new(1, 0, 0), Address([7; 20]), json!([{"name": "f"}]));
        let text = serde_json::to_string(&e).unwrap();
        assert_eq!(
            text,
            format!("[\"X\",\"1.0.0\",\"{}\",[{{\"name\":\"f\"}}]]", Address([7; 20]))
        );
        let back: RegistryEnrollment = serde_json::from_str(&text).unwrap();
        assert_eq!(back, e);
    }

    #[test]
    fn test_enrollment_rejects_object_form() {
        let text = r#"{"contract_name":"X","version":"1.0.0"}"#;
        assert!(serde_json::from_str::<RegistryEnrollment>(text).is_err());
    }
}
