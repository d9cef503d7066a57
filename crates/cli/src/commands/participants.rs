use anyhow::{Context, Result};
use aoa_core::pipeline::SurveyExports;

use crate::commands::StudyContext;

/// Print the derived metadata of every participant.
pub fn participants_command(root: &str, config: Option<&str>, json: bool) -> Result<()> {
    let ctx = StudyContext::load(root, config)?;
    let exports = SurveyExports::load(&ctx.layout, &ctx.config.format)
        .context("Failed to load survey exports")?;
    let participants = exports.participants().context("Failed to derive participants")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&participants)?);
        return Ok(());
    }

    if participants.is_empty() {
        println!("No participants found.");
        return Ok(());
    }

    println!("Participants:");
    for p in &participants {
        let list = p.list.map(|l| l.as_str()).unwrap_or("-");
        let platform = p.platform.map(|v| v.as_str()).unwrap_or("-");
        println!(
            "- {} [list {}] platform={} time_sum={} finished={} violation={} child_age={}",
            p.id,
            list,
            platform,
            p.time_sum,
            u8::from(p.finished),
            u8::from(p.violation),
            p.child_age_label(),
        );
    }

    Ok(())
}
