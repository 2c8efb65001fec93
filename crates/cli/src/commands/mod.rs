pub mod deploy;
pub mod history;
pub mod inspect;
pub mod reconcile;
pub mod rollback;
pub mod timeline;
pub mod upgrade;
pub mod verify;

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use deploykit::DeployError;

pub(crate) fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

/// Print what an operator needs to reconcile by hand, then hand the error on.
pub(crate) fn report(err: DeployError) -> anyhow::Error {
    println!("\nFAILED at stage: {}", err.stage());
    match &err {
        DeployError::ProxyDeployment { implementation, kind, .. } => {
            println!("Enrolled without a {}: {}", kind, implementation);
        }
        _ => {
            if let Some(address) = err.orphaned_address() {
                println!("Live but not enrolled: {}", address);
            }
        }
    }
    if let DeployError::PartialDeployment { enrollment, .. } = &err {
        println!(
            "Reconcile with: deploykit reconcile {} {} {}",
            enrollment.contract_name, enrollment.version, enrollment.address
        );
    }
    if err.is_retryable() {
        println!("Registry untouched; safe to retry.");
    }
    println!();
    err.into()
}
