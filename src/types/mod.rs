pub mod artifact;
pub mod enrollment;
pub mod id;
pub mod secret;
pub mod version;

pub use artifact::{Bytecode, ContractArtifact};
pub use enrollment::RegistryEnrollment;
pub use id::{Address, ParseIdError, TxHash};
pub use secret::{SecretHash, UpgradeSecret};
pub use version::{InvalidVersion, Version, VersionSelector};
