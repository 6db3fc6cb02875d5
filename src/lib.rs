//! fatwheel library
//!
//! Builds universal2 (x86_64 + arm64) wheels for a package on PyPI: download
//! per-architecture wheels with pip under `arch`, pair them, merge each pair
//! with `delocate-merge`, and publish the result.

pub mod app;
pub mod cli;
pub mod components;
pub mod config;
pub mod console;
pub mod error;
pub mod process_guard;
pub mod sanity;
pub mod theme;
pub mod tool_runner;
pub mod tool_traits;
pub mod tools;
pub mod types;
pub mod ui;
pub mod workflow;

pub use config::Settings;
pub use error::FatwheelError;
pub use process_guard::{ChildRegistry, CommandProcessGroup, ProcessGuard};
pub use tool_runner::{SystemRunner, ToolOutput, ToolRunner, run_tool_safe};
pub use tool_traits::{ToolArgs, ToolKind};
pub use types::{Arch, InstallPolicy};
pub use workflow::{
    Availability, PackageIndex, PypiIndex, RunOutcome, RunSummary, Workflow, WorkflowMessage,
    WorkflowReporter, spawn_workflow,
};
