use super::table;
use deploykit_persistence::audit;
use std::path::Path;

pub fn run(journal: &Path) -> anyhow::Result<()> {
    let mut records = audit::read_all(journal)?;

    // Check strict sequential order
    let is_sorted = records.windows(2).all(|w| w[0].header.seq < w[1].header.seq);
    if !is_sorted {
        println!("\nWARNING: Journal is not sequential. Displaying registry order.\n");
        records.sort_by_key(|r| r.header.seq);
    }

    let mut out = table(vec!["#", "Timestamp", "Operation", "Contract", "Version", "Address"]);
    for record in records {
        let ts = chrono::DateTime::from_timestamp(record.header.timestamp as i64, 0)
            .unwrap_or_default()
            .to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        let e = record.enrollment;

        out.add_row(vec![
            record.header.seq.to_string(),
            ts,
            record.label,
            e.contract_name,
            e.version.to_string(),
            e.address.to_string(),
        ]);
    }

    println!("\nDeployment Timeline\n");
    println!("{out}\n");

    Ok(())
}
