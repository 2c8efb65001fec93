use super::table;
use deploykit::registry::ContractRegistry;
use deploykit_persistence::{audit, LocalRegistry};
use std::collections::BTreeMap;
use std::path::Path;

/// Check the registry parses and agrees with its audit journal.
pub fn run(registry_path: &Path, journal: &Path) -> anyhow::Result<()> {
    let entries = match LocalRegistry::new(registry_path).all() {
        Ok(entries) => entries,
        Err(e) => {
            println!("\nCORRUPTED\n");
            println!("Registry: {}", registry_path.display());
            println!("Reason:   {}\n", e);
            return Err(e.into());
        }
    };
    let records = match audit::read_all(journal) {
        Ok(records) => records,
        Err(e) => {
            println!("\nCORRUPTED\n");
            println!("Journal:  {}", journal.display());
            println!("Reason:   {}\n", e);
            return Err(e.into());
        }
    };

    let mut mismatched = Vec::new();
    for record in &records {
        match entries.get(record.header.seq as usize) {
            Some(entry) if *entry == record.enrollment => {}
            Some(_) => mismatched.push(format!("#{} differs from its journal record", record.header.seq)),
            None => mismatched.push(format!("#{} is journaled but missing from the registry", record.header.seq)),
        }
    }

    let mut per_name: BTreeMap<&str, (usize, String)> = BTreeMap::new();
    for e in &entries {
        let slot = per_name.entry(e.contract_name.as_str()).or_default();
        slot.0 += 1;
        slot.1 = format!("{} @ {}", e.version, e.address);
    }
    let mut out = table(vec!["Contract", "Enrollments", "Current"]);
    for (name, (count, current)) in per_name {
        out.add_row(vec![name.to_string(), count.to_string(), current]);
    }
    println!("\n{out}\n");

    if !mismatched.is_empty() {
        println!("MISMATCH\n");
        for m in &mismatched {
            println!("  {}", m);
        }
        println!();
        anyhow::bail!("registry disagrees with journal in {} place(s)", mismatched.len());
    }

    println!("VERIFIED");
    println!("Enrollments: {}", entries.len());
    println!("Journaled:   {}", records.len());
    if records.len() < entries.len() {
        println!("Note:        {} enrollment(s) predate the journal", entries.len() - records.len());
    }
    println!();
    Ok(())
}
