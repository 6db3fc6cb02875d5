//! Type-safe tool argument modules.
//!
//! Each struct here implements `ToolArgs` for one external program invocation
//! and maps its fields to the exact command line that program expects.

pub mod delocate;
pub mod pip;

pub use delocate::{MERGE_OUTPUT_DIR, MergeWheelsArgs};
pub use pip::{PipInstallArgs, PipShowArgs, WheelDownloadArgs, parse_show_version};
