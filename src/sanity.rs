//! Pre-flight checks for the runtime environment
//!
//! The workflow only works on macOS (it relies on `arch -x86_64` / `arch -arm64`
//! to run pip under each architecture) and needs its external tools on `PATH`.
//! The binary runs these checks before the TUI starts and prints a report to
//! stderr if anything is missing.

use crate::config::Settings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreflightReport {
    /// `std::env::consts::OS` of the host
    pub os: String,
    pub missing_tools: Vec<String>,
}

impl PreflightReport {
    pub fn is_supported_os(&self) -> bool {
        self.os == "macos"
    }

    pub fn is_ok(&self) -> bool {
        self.is_supported_os() && self.missing_tools.is_empty()
    }
}

/// Executables the workflow invokes, in the order they run
pub fn required_tools(settings: &Settings) -> Vec<String> {
    vec![
        "arch".to_string(),
        settings.python.clone(),
        settings.merge_tool.clone(),
        settings.pip.clone(),
    ]
}

pub fn tool_exists(name: &str) -> bool {
    which::which(name).is_ok()
}

pub fn verify_environment(settings: &Settings) -> PreflightReport {
    let mut missing_tools: Vec<String> = Vec::new();
    for tool in required_tools(settings) {
        if !tool_exists(&tool) && !missing_tools.contains(&tool) {
            tracing::debug!(%tool, "required tool not found on PATH");
            missing_tools.push(tool);
        }
    }

    PreflightReport {
        os: std::env::consts::OS.to_string(),
        missing_tools,
    }
}

fn install_hint(tool: &str, settings: &Settings) -> String {
    if tool == settings.merge_tool {
        format!("{} (install: {} install delocate)", tool, settings.pip)
    } else if tool == "arch" {
        "arch (part of macOS)".to_string()
    } else {
        tool.to_string()
    }
}

/// Print the failed report to stderr. Called before the TUI takes the screen.
pub fn print_report(report: &PreflightReport, settings: &Settings) {
    eprintln!();
    eprintln!("fatwheel: pre-flight check failed");
    eprintln!();

    if !report.is_supported_os() {
        eprintln!("  Unsupported OS: {}", report.os);
        eprintln!("  Universal2 wheels can only be built on macOS.");
        eprintln!();
    }

    if !report.missing_tools.is_empty() {
        eprintln!("  Missing tools:");
        for tool in &report.missing_tools {
            eprintln!("    - {}", install_hint(tool, settings));
        }
        eprintln!();
    }

    eprintln!("  Use --skip-preflight to start anyway.");
    eprintln!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_tools_follow_settings() {
        let settings = Settings {
            python: "python3.12".to_string(),
            pip: "pip3.12".to_string(),
            merge_tool: "delocate-merge".to_string(),
            ..Settings::default()
        };
        assert_eq!(
            required_tools(&settings),
            vec!["arch", "python3.12", "delocate-merge", "pip3.12"]
        );
    }

    #[test]
    fn test_missing_tool_is_reported() {
        let settings = Settings {
            merge_tool: "fatwheel-no-such-merge-tool".to_string(),
            ..Settings::default()
        };
        let report = verify_environment(&settings);
        assert!(report.missing_tools.contains(&"fatwheel-no-such-merge-tool".to_string()));
        assert!(!report.is_ok());
    }

    #[test]
    fn test_os_support() {
        let report = PreflightReport {
            os: "linux".to_string(),
            missing_tools: Vec::new(),
        };
        assert!(!report.is_supported_os());
        assert!(!report.is_ok());

        let report = PreflightReport {
            os: "macos".to_string(),
            missing_tools: Vec::new(),
        };
        assert!(report.is_ok());
    }

    #[test]
    fn test_install_hint_for_merge_tool() {
        let settings = Settings::default();
        assert_eq!(
            install_hint("delocate-merge", &settings),
            "delocate-merge (install: pip3 install delocate)"
        );
    }
}
