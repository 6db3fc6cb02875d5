//! Type-safe external tool argument contracts.
//!
//! Every external program the workflow runs (`pip wheel` under `arch`,
//! `delocate-merge`, `pip install`, `pip show`) is described by a struct that
//! implements [`ToolArgs`]. The struct is the single source of truth for the
//! command line, so a flag typo is a compile error rather than a failed run.

/// What a tool invocation is for. Lets runners and logs dispatch on intent
/// without parsing argument vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    /// `pip wheel` pinned to one architecture
    WheelDownload,
    /// Fat-wheel merge tool
    Merge,
    /// `pip install <wheel>`
    Install,
    /// `pip show <distribution>`
    Show,
}

/// Trait for typed tool arguments.
///
/// # Contract
///
/// - `program()`: executable resolved through `PATH`.
/// - `to_cli_args()`: arguments exactly as the program expects them.
/// - `display_name()`: short human label used in log lines and errors.
pub trait ToolArgs {
    fn kind(&self) -> ToolKind;

    fn program(&self) -> &str;

    fn to_cli_args(&self) -> Vec<String>;

    fn display_name(&self) -> String;

    /// Full command line for logging.
    fn command_line(&self) -> String {
        let mut parts = vec![self.program().to_string()];
        parts.extend(self.to_cli_args());
        parts.join(" ")
    }
}
