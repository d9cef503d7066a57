use anyhow::{Context, Result};
use aoa_core::pipeline;

use crate::commands::StudyContext;

/// Run the full pipeline and write the item-level dataset.
pub fn run_command(
    root: &str,
    config: Option<&str>,
    output: Option<&str>,
    json: bool,
) -> Result<()> {
    let ctx = StudyContext::load(root, config)?;
    let layout = match output {
        Some(path) => ctx.layout.clone().with_output(crate::canonicalize_or_current(path)?),
        None => ctx.layout.clone(),
    };

    let summary = pipeline::run(&layout, &ctx.config)
        .with_context(|| format!("Failed to wrangle study at {}", ctx.root.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let counts = &summary.participants;
    println!("Wrote item-level dataset:");
    println!("  Config: {}", ctx.config_source());
    println!("  Output: {}", summary.output.display());
    if let Some(manifest) = &summary.manifest {
        println!("  Manifest: {}", manifest.display());
    }
    println!("  Rows: {}", summary.rows);
    println!("  Participants: {} seen, {} emitted", counts.seen, counts.emitted);
    println!("  Without list: {}", counts.skipped);
    println!("  Without list-phase record: {}", counts.unmatched);
    println!("  Violating: {}", counts.violating);

    Ok(())
}
