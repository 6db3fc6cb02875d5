//! Typed arguments for the fat-wheel merge tool (`delocate-merge` by default).

use std::path::PathBuf;

use crate::tool_traits::{ToolArgs, ToolKind};

/// Subdirectory of the scratch directory the merge tool writes into
pub const MERGE_OUTPUT_DIR: &str = "universal2_wheels";

/// `<merge_tool> -w universal2_wheels <first> <second>`
///
/// The two wheels are passed as paths relative to the working directory the
/// tool runs in (the scratch directory).
#[derive(Debug, Clone)]
pub struct MergeWheelsArgs {
    pub merge_tool: String,
    pub first: PathBuf,
    pub second: PathBuf,
}

impl ToolArgs for MergeWheelsArgs {
    fn kind(&self) -> ToolKind {
        ToolKind::Merge
    }

    fn program(&self) -> &str {
        &self.merge_tool
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec![
            "-w".to_string(),
            MERGE_OUTPUT_DIR.to_string(),
            self.first.display().to_string(),
            self.second.display().to_string(),
        ]
    }

    fn display_name(&self) -> String {
        self.merge_tool.clone()
    }
}
