use super::table;
use deploykit::registry::ContractRegistry;
use deploykit_persistence::LocalRegistry;
use std::path::Path;

/// Registry contents in append order, optionally for one contract.
pub fn run(registry_path: &Path, name: Option<&str>) -> anyhow::Result<()> {
    let registry = LocalRegistry::new(registry_path);
    let entries = registry.search(name, None)?;

    let mut out = table(vec!["#", "Contract", "Version", "Address"]);
    for (i, e) in entries.iter().enumerate() {
        out.add_row(vec![
            i.to_string(),
            e.contract_name.clone(),
            e.version.to_string(),
            e.address.to_string(),
        ]);
    }

    match name {
        Some(name) => println!("\nHistory of {} ({} enrollments)\n", name, entries.len()),
        None => println!("\nRegistry ({} enrollments)\n", entries.len()),
    }
    println!("{out}\n");
    Ok(())
}
