use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Settings;
use crate::types::InstallPolicy;

/// fatwheel - build universal2 (x86_64 + arm64) wheels for a PyPI package
#[derive(Parser, Debug)]
#[command(name = "fatwheel")]
#[command(about = "Build universal2 Python wheels from separate x86_64 and arm64 downloads")]
#[command(version)]
pub struct Cli {
    /// Settings file (JSON). Falls back to $FATWHEEL_CONFIG.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the scratch directory
    #[arg(long, global = true)]
    pub scratch_dir: Option<PathBuf>,

    /// Override where the timestamped universal2 folders are written
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Start even if the host is not macOS or tools are missing from PATH
    #[arg(long, global = true)]
    pub skip_preflight: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Launch the interactive terminal UI (default)
    Tui,
    /// Run the whole workflow without the UI
    Run {
        /// Package name on the index
        package: String,
        /// Install every merged wheel without asking
        #[arg(long, conflicts_with = "no_install")]
        install: bool,
        /// Never install, only save the merged wheels
        #[arg(long)]
        no_install: bool,
    },
    /// Only check whether a package exists on the index
    Check {
        package: String,
    },
    /// Show how the wheels in a directory would be paired
    Pair {
        dir: PathBuf,
    },
    /// Print the effective settings as JSON
    Config,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Apply directory overrides on top of loaded settings
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(dir) = &self.scratch_dir {
            settings.scratch_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            settings.output_dir = Some(dir.clone());
        }
    }

    /// Whether this invocation drives the workflow and so needs the preflight
    pub fn needs_preflight(&self) -> bool {
        matches!(
            self.command,
            None | Some(Commands::Tui) | Some(Commands::Run { .. })
        )
    }
}

pub fn install_policy(install: bool, no_install: bool) -> InstallPolicy {
    match (install, no_install) {
        (true, _) => InstallPolicy::Always,
        (false, true) => InstallPolicy::Never,
        (false, false) => InstallPolicy::Ask,
    }
}
