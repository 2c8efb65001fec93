//! Persist a simulated chain between CLI runs.

use crate::error::Result;
use deploykit::ledger::sim::{ChainState, SimLedger};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

/// Load a dev chain; a missing file starts a fresh one.
pub fn load(path: impl AsRef<Path>) -> Result<SimLedger> {
    let path = path.as_ref();
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::info!("No chain state at {}, starting a fresh chain", path.display());
            return Ok(SimLedger::new());
        }
        Err(e) => return Err(e.into()),
    };
    let state: ChainState = serde_json::from_slice(&bytes)?;
    Ok(SimLedger::from_state(state))
}

pub fn save(path: impl AsRef<Path>, ledger: &SimLedger) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let body = serde_json::to_vec_pretty(&ledger.snapshot())?;
    let tmp = path.with_extension("tmp");
    let mut file = File::create(&tmp)?;
    file.write_all(&body)?;
    file.sync_all()?;
    fs::rename(&tmp, path)?;
    Ok(())
}
