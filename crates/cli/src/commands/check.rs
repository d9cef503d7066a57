use anyhow::{Context, Result};
use aoa_core::pipeline::prepare_study;

use crate::commands::{print_file_status, StudyContext};

/// Load every input and validate lookups and orders without writing output.
pub fn check_command(root: &str, config: Option<&str>, json: bool) -> Result<()> {
    let ctx = StudyContext::load(root, config)?;

    if !json {
        println!("Study check");
        println!("===========");
        println!("Root: {}", ctx.root.display());
        println!("Config: {}", ctx.config_source());
        println!();
        println!("Inputs:");
        for (role, path) in ctx.layout.inputs() {
            print_file_status(role, path);
        }
        println!();
    }

    let study = prepare_study(&ctx.layout, &ctx.config)
        .with_context(|| format!("Study at {} failed validation", ctx.root.display()))?;
    let report = study.check().context("Presentation order check failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Lookups:");
    for lookup in &report.lookups {
        println!(
            "- {}: {} entries ({} .. {})",
            lookup.name,
            lookup.entries,
            lookup.first_column.as_deref().unwrap_or("-"),
            lookup.last_column.as_deref().unwrap_or("-"),
        );
    }
    println!();
    println!("Rows per participant:");
    for expected in &report.expected_rows {
        println!("- list {}: {}", expected.list, expected.rows);
    }
    println!();
    let counts = &report.participants;
    println!("Participants: {}", counts.seen);
    println!("  Without list: {}", counts.skipped);
    println!("  Without list-phase record: {}", counts.unmatched);
    println!("  Violating: {}", counts.violating);
    println!("Orders checked: {} ({} partial)", report.orders_checked, report.partial_orders);
    println!("OK");

    Ok(())
}
