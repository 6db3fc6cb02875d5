//! External tool execution
//!
//! [`run_tool_safe`] is the one place that spawns the workflow's external
//! programs. It gives every tool its own process group, registers the PID with
//! the global [`ChildRegistry`] while it runs, and captures both streams.
//!
//! The workflow itself only sees the [`ToolRunner`] trait, so tests can stand in
//! a runner that fabricates wheel files instead of calling `pip`.

use crate::error::{FatwheelError, Result};
use crate::process_guard::{ChildRegistry, CommandProcessGroup};
use crate::tool_traits::ToolArgs;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Executes tool invocations on behalf of the workflow
pub trait ToolRunner: Send {
    /// Run `args` with `cwd` as working directory and wait for it.
    ///
    /// `Err` means the tool could not be started at all; a tool that ran and
    /// failed is `Ok` with `success == false`.
    fn run(&self, args: &dyn ToolArgs, cwd: &Path) -> Result<ToolOutput>;
}

/// Runs tools as real child processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&self, args: &dyn ToolArgs, cwd: &Path) -> Result<ToolOutput> {
        run_tool_safe(args, cwd)
    }
}

/// Spawn a tool in its own process group, tracked by the child registry.
pub fn run_tool_safe(args: &dyn ToolArgs, cwd: &Path) -> Result<ToolOutput> {
    let program = args.program();
    let cli_args = args.to_cli_args();

    info!(cwd = %cwd.display(), "run_tool_safe: {} {:?}", program, cli_args);

    let child = Command::new(program)
        .args(&cli_args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .in_new_process_group()
        .spawn()
        .map_err(|e| FatwheelError::tool(args.display_name(), format!("could not start {program}: {e}")))?;
    let pid = child.id();

    register(pid)?;
    let output = child.wait_with_output();
    unregister(pid)?;

    let output = output.map_err(|e| {
        FatwheelError::tool(args.display_name(), format!("failed waiting for {program}: {e}"))
    })?;

    let result = ToolOutput {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code(),
        success: output.status.success(),
    };

    debug!(
        tool = %args.display_name(),
        success = result.success,
        exit_code = ?result.exit_code,
        "tool finished"
    );
    Ok(result)
}

fn register(pid: u32) -> Result<()> {
    ChildRegistry::global()
        .lock()
        .map_err(|e| FatwheelError::state(format!("child registry poisoned: {e}")))?
        .register(pid);
    Ok(())
}

fn unregister(pid: u32) -> Result<()> {
    ChildRegistry::global()
        .lock()
        .map_err(|e| FatwheelError::state(format!("child registry poisoned: {e}")))?
        .unregister(pid);
    Ok(())
}

/// Output from a tool execution.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code (None if terminated by signal).
    pub exit_code: Option<i32>,
    pub success: bool,
}

impl ToolOutput {
    /// Successful output with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: Some(0),
            success: true,
        }
    }

    /// Failed output with the given exit code and stderr
    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            exit_code: Some(exit_code),
            success: false,
        }
    }

    /// Turn a failed run into a [`FatwheelError::Tool`] carrying stderr.
    pub fn ensure_success(&self, tool: &str) -> Result<()> {
        if self.success {
            return Ok(());
        }
        let code = self
            .exit_code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string());
        let detail = match self.stderr.trim() {
            "" => self.stdout.trim(),
            stderr => stderr,
        };
        Err(FatwheelError::tool(
            tool,
            format!("exit code {}: {}", code, detail),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool_traits::ToolKind;

    struct Shell(&'static str);

    impl ToolArgs for Shell {
        fn kind(&self) -> ToolKind {
            ToolKind::Show
        }
        fn program(&self) -> &str {
            "sh"
        }
        fn to_cli_args(&self) -> Vec<String> {
            vec!["-c".to_string(), self.0.to_string()]
        }
        fn display_name(&self) -> String {
            "shell".to_string()
        }
    }

    #[test]
    fn test_run_captures_stdout_and_success() {
        let dir = tempfile::tempdir().unwrap();
        let out = run_tool_safe(&Shell("echo hello"), dir.path()).unwrap();
        assert!(out.success);
        assert_eq!(out.exit_code, Some(0));
        assert_eq!(out.stdout.trim(), "hello");
    }

    #[test]
    fn test_run_uses_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        run_tool_safe(&Shell("touch marker"), dir.path()).unwrap();
        assert!(dir.path().join("marker").exists());
    }

    #[test]
    fn test_nonzero_exit_is_reported_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let out = run_tool_safe(&Shell("echo broken >&2; exit 3"), dir.path()).unwrap();
        assert!(!out.success);
        assert_eq!(out.exit_code, Some(3));

        let err = out.ensure_success("shell").unwrap_err();
        assert_eq!(err.to_string(), "shell failed: exit code 3: broken");
    }

    #[test]
    fn test_missing_program_is_an_error() {
        struct Missing;
        impl ToolArgs for Missing {
            fn kind(&self) -> ToolKind {
                ToolKind::Merge
            }
            fn program(&self) -> &str {
                "fatwheel-definitely-not-installed"
            }
            fn to_cli_args(&self) -> Vec<String> {
                Vec::new()
            }
            fn display_name(&self) -> String {
                "missing".to_string()
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let err = run_tool_safe(&Missing, dir.path()).unwrap_err();
        assert!(matches!(err, FatwheelError::Tool { .. }));
    }

    #[test]
    fn test_ensure_success_falls_back_to_stdout() {
        let out = ToolOutput {
            stdout: "only stdout".to_string(),
            stderr: "  ".to_string(),
            exit_code: None,
            success: false,
        };
        let err = out.ensure_success("pip").unwrap_err();
        assert_eq!(err.to_string(), "pip failed: exit code signal: only stdout");
    }
}
