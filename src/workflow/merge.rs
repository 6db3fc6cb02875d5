//! Fat-wheel merge of one matched pair.

use super::pairing::WheelPair;
use super::scratch::ScratchDir;
use crate::error::{FatwheelError, Result};
use crate::tool_runner::ToolRunner;
use crate::tools::MergeWheelsArgs;
use std::path::PathBuf;

/// Run the merge tool on `pair` inside the scratch directory and return the
/// path of the merged wheel it wrote.
///
/// The caller resets the merge output directory first so the only wheel left
/// there afterwards is this pair's.
pub fn merge_pair(
    runner: &dyn ToolRunner,
    scratch: &ScratchDir,
    merge_tool: &str,
    pair: &WheelPair,
) -> Result<PathBuf> {
    let args = MergeWheelsArgs {
        merge_tool: merge_tool.to_string(),
        first: PathBuf::from(&pair.first),
        second: PathBuf::from(&pair.second),
    };

    runner
        .run(&args, scratch.path())?
        .ensure_success(merge_tool)?;

    let merged = scratch.merged_wheel_files()?;
    let wheel = merged.first().ok_or_else(|| {
        FatwheelError::tool(
            merge_tool,
            format!("exited successfully but produced no wheel for {}", pair.base),
        )
    })?;
    Ok(scratch.merge_output_dir().join(wheel))
}
