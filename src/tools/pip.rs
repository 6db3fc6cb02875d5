//! Typed arguments for the pip invocations.
//!
//! - `WheelDownloadArgs`: `arch -<arch> <python> -m pip wheel <package>`
//! - `PipInstallArgs`: `<pip> install <wheel>`
//! - `PipShowArgs`: `<pip> show <distribution>`
//!
//! `pip wheel` is run through `arch(1)` so that the interpreter, and therefore
//! the platform tag pip builds or resolves for, matches the requested CPU.

use std::path::PathBuf;

use crate::tool_traits::{ToolArgs, ToolKind};
use crate::types::Arch;

/// Download (or build) wheels for `package` and its dependencies under one
/// architecture.
///
/// | Field     | Position                      |
/// |-----------|-------------------------------|
/// | `arch`    | `arch -x86_64` / `arch -arm64` |
/// | `python`  | interpreter run by `arch`     |
/// | `package` | last argument to `pip wheel`  |
#[derive(Debug, Clone)]
pub struct WheelDownloadArgs {
    pub arch: Arch,
    pub python: String,
    pub package: String,
}

impl ToolArgs for WheelDownloadArgs {
    fn kind(&self) -> ToolKind {
        ToolKind::WheelDownload
    }

    fn program(&self) -> &str {
        "arch"
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec![
            self.arch.arch_flag().to_string(),
            self.python.clone(),
            "-m".to_string(),
            "pip".to_string(),
            "wheel".to_string(),
            self.package.clone(),
        ]
    }

    fn display_name(&self) -> String {
        format!("pip wheel ({})", self.arch)
    }
}

/// Install a wheel file into the active environment.
#[derive(Debug, Clone)]
pub struct PipInstallArgs {
    pub pip: String,
    pub wheel: PathBuf,
}

impl ToolArgs for PipInstallArgs {
    fn kind(&self) -> ToolKind {
        ToolKind::Install
    }

    fn program(&self) -> &str {
        &self.pip
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec!["install".to_string(), self.wheel.display().to_string()]
    }

    fn display_name(&self) -> String {
        "pip install".to_string()
    }
}

/// Query installed package metadata.
#[derive(Debug, Clone)]
pub struct PipShowArgs {
    pub pip: String,
    pub distribution: String,
}

impl ToolArgs for PipShowArgs {
    fn kind(&self) -> ToolKind {
        ToolKind::Show
    }

    fn program(&self) -> &str {
        &self.pip
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec!["show".to_string(), self.distribution.clone()]
    }

    fn display_name(&self) -> String {
        "pip show".to_string()
    }
}

/// Extract the value of the first `Version:` line of `pip show` output.
pub fn parse_show_version(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .find_map(|line| line.strip_prefix("Version:"))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
