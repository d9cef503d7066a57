use std::fs;

use anyhow::{anyhow, Context, Result};
use aoa_core::config::{ConfigFormat, WrangleConfig};
use serde::Serialize;

use crate::commands::StudyContext;
use crate::{canonicalize_or_current, infer_study_name};

/// Effective config plus the paths it resolves to.
#[derive(Serialize)]
pub struct ConfigSnapshot<'a> {
    pub root: String,
    pub config_file: Option<String>,
    pub config: &'a WrangleConfig,
    pub layout: &'a aoa_core::layout::StudyLayout,
}

/// Parse a `--format` value.
pub fn parse_config_format(format: &str) -> Result<ConfigFormat> {
    match format.to_ascii_lowercase().as_str() {
        "yaml" | "yml" => Ok(ConfigFormat::Yaml),
        "json" => Ok(ConfigFormat::Json),
        other => Err(anyhow!("Invalid config format '{other}' (expected yaml or json)")),
    }
}

/// Write the default config to the study root.
pub fn init_config_command(root: &str, format: &str, force: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let format = parse_config_format(format)?;
    let config_path = root_path.join(format.file_name());

    if config_path.exists() && !force {
        return Err(anyhow!(
            "Config already exists at {} (use --force to overwrite)",
            config_path.display()
        ));
    }

    fs::create_dir_all(&root_path)
        .with_context(|| format!("Failed to create study root: {}", root_path.display()))?;
    let config = WrangleConfig::new(infer_study_name(&root_path));
    config
        .save(&config_path)
        .with_context(|| format!("Failed to write config: {}", config_path.display()))?;

    println!("Initialized wrangling config:");
    println!("  Name: {}", config.name);
    println!("  Root: {}", root_path.display());
    println!("  Config: {}", config_path.display());
    println!("  Output (relative): {}", config.output.path.display());

    Ok(())
}

/// Print the effective config and resolved paths.
pub fn show_config_command(root: &str, config: Option<&str>, json: bool) -> Result<()> {
    let ctx = StudyContext::load(root, config)?;

    if json {
        let snapshot = ConfigSnapshot {
            root: ctx.root.display().to_string(),
            config_file: ctx.config_path.as_ref().map(|p| p.display().to_string()),
            config: &ctx.config,
            layout: &ctx.layout,
        };
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    let layout = &ctx.layout;
    let pages = &ctx.config.pages;
    println!("Wrangling config");
    println!("================");
    println!("Name: {}", ctx.config.name);
    println!("Root: {}", ctx.root.display());
    println!("Config file: {}", ctx.config_source());
    println!("Config version: {}", ctx.config.config_version);
    println!(
        "Format: delimiter '{}', encoding {:?}",
        ctx.config.format.delimiter, ctx.config.format.encoding
    );
    println!(
        "Pages: demographic {}, familiarization {}, control {}, list {}, repeated {}",
        pages.demographic_time_pages,
        pages.familiarization_items,
        pages.control_pages,
        pages.list_pages,
        pages.repeated_pages
    );
    println!();
    println!("Inputs:");
    for (role, path) in layout.inputs() {
        println!("- {role}: {}", layout.display_path(path));
    }
    println!("  items sheet: {}", layout.items.sheet);
    println!("  familiarization sheet: {}", layout.familiarization.sheet);
    println!();
    println!("Output: {}", layout.display_path(&layout.output));
    match &layout.manifest {
        Some(manifest) => println!("Manifest: {}", layout.display_path(manifest)),
        None => println!("Manifest: disabled"),
    }

    Ok(())
}
