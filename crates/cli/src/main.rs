use anyhow::Result;
use aoa_wrangle::commands::{
    check_command, init_config_command, participants_command, run_command, show_config_command,
};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Age-of-acquisition survey wrangler.
///
/// This CLI is a thin wrapper around `aoa-core` (exposed in code as `aoa_core`).
/// All substantive logic lives in the library so it can be tested thoroughly
/// and reused from other frontends.
#[derive(Parser, Debug)]
#[command(
    name = "aoa-wrangle",
    version,
    about = "Reshape age-of-acquisition survey exports into an item-level dataset",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Options shared by every study command.
#[derive(Args, Debug)]
struct StudyArgs {
    /// Study root directory. Defaults to the current working directory.
    #[arg(long, default_value = ".")]
    root: String,

    /// Config file (YAML or JSON). Defaults to `aoa-wrangle.{yaml,yml,json}` in the root.
    #[arg(long)]
    config: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full pipeline and write the item-level dataset.
    Run {
        #[command(flatten)]
        study: StudyArgs,

        /// Output CSV path, overriding the config.
        #[arg(long)]
        output: Option<String>,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Load all inputs and validate lookups and presentation orders without writing output.
    Check {
        #[command(flatten)]
        study: StudyArgs,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Print the derived metadata of every participant.
    Participants {
        #[command(flatten)]
        study: StudyArgs,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Write the default config to the study root.
    InitConfig {
        /// Study root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Config format: yaml or json.
        #[arg(long, default_value = "yaml")]
        format: String,

        /// Overwrite an existing config.
        #[arg(long, default_value_t = false)]
        force: bool,
    },

    /// Print the effective config and the paths it resolves to.
    ShowConfig {
        #[command(flatten)]
        study: StudyArgs,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    // stdout is reserved for command output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run { study, output, json } => {
            run_command(&study.root, study.config.as_deref(), output.as_deref(), json)?
        }
        Command::Check { study, json } => {
            check_command(&study.root, study.config.as_deref(), json)?
        }
        Command::Participants { study, json } => {
            participants_command(&study.root, study.config.as_deref(), json)?
        }
        Command::InitConfig { root, format, force } => init_config_command(&root, &format, force)?,
        Command::ShowConfig { study, json } => {
            show_config_command(&study.root, study.config.as_deref(), json)?
        }
    }

    Ok(())
}
