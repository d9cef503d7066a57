use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use aoa_core::config::WrangleConfig;
use aoa_core::layout::StudyLayout;
use tracing::debug;

use crate::canonicalize_or_current;

/// Study root, effective config and resolved paths for one command.
#[derive(Debug, Clone)]
pub struct StudyContext {
    pub root: PathBuf,
    pub config: WrangleConfig,
    /// File the config was loaded from; `None` means built-in defaults.
    pub config_path: Option<PathBuf>,
    pub layout: StudyLayout,
}

impl StudyContext {
    /// Resolve the root and load its config. An explicit `--config` path is
    /// resolved against the working directory.
    pub fn load(root: &str, config: Option<&str>) -> Result<Self> {
        let root = canonicalize_or_current(root)?;
        let explicit = config.map(canonicalize_or_current).transpose()?;
        let (config, config_path) = WrangleConfig::discover(&root, explicit.as_deref())
            .with_context(|| format!("Failed to load config for study at {}", root.display()))?;
        let layout = StudyLayout::new(&root, &config);
        debug!(root = %root.display(), config = ?config_path, "loaded study config");
        Ok(Self { root, config, config_path, layout })
    }

    /// Human-readable origin of the config.
    pub fn config_source(&self) -> String {
        match &self.config_path {
            Some(path) => path.display().to_string(),
            None => "built-in defaults".to_string(),
        }
    }
}

/// Helper to print whether an input file exists.
pub fn print_file_status(label: &str, path: &Path) {
    let exists = path.is_file();
    println!("- {label}: {} ({})", if exists { "OK" } else { "MISSING" }, path.display());
}
