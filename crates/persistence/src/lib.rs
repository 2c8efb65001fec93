pub mod artifacts;
pub mod audit;
pub mod chain_state;
pub mod error;
pub mod fixtures;
pub mod lock;
pub mod registry;

pub use artifacts::ArtifactDirectoryCompiler;
pub use error::{PersistenceError, Result};
pub use registry::LocalRegistry;
