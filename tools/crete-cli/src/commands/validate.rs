//! Validate a tabular motion trace export.

use std::path::PathBuf;

use anyhow::Context;
use crete_motion_model::trace::parse_trace_table;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating trace table at: {}", path.display());

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let rows = parse_trace_table(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse trace table: {e}"))?;

    println!("  Rows: {}", rows.len());
    if let (Some(first), Some(last)) = (rows.first(), rows.last()) {
        println!("  Span: {:.2}s - {:.2}s", first.time, last.time);
    }

    let issues: Vec<String> = rows
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| pair[1].time < pair[0].time)
        .map(|(i, pair)| {
            format!(
                "row {} at {:.2}s follows {:.2}s",
                i + 2,
                pair[1].time,
                pair[0].time
            )
        })
        .collect();

    if issues.is_empty() {
        println!("\nTrace table is valid.");
        Ok(())
    } else {
        println!("\nValidation issues:");
        for issue in &issues {
            println!("  - {issue}");
        }
        anyhow::bail!("{} out-of-order row(s) found", issues.len())
    }
}
