//! Moving a merged wheel out of the scratch area, and the optional install.

use super::pairing::distribution_name;
use crate::error::{FatwheelError, Result};
use crate::tool_runner::ToolRunner;
use crate::tools::{PipInstallArgs, PipShowArgs, parse_show_version};
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

/// Destination folder name suffix format, local time
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

pub fn timestamp(now: DateTime<Local>) -> String {
    now.format(TIMESTAMP_FORMAT).to_string()
}

/// `<output_root>/<base>_universal2_<timestamp>`
pub fn destination_dir(output_root: &Path, base: &str, timestamp: &str) -> PathBuf {
    output_root.join(format!("{}_universal2_{}", base, timestamp))
}

/// Copy `merged` into `destination` (created if needed). Returns the copied
/// wheel's absolute path, since pip later runs from the scratch directory.
pub fn publish(merged: &Path, destination: &Path) -> Result<PathBuf> {
    let file_name = merged
        .file_name()
        .ok_or_else(|| FatwheelError::general(format!("{} has no file name", merged.display())))?;
    fs::create_dir_all(destination)?;
    let target = std::path::absolute(destination.join(file_name))?;
    fs::copy(merged, &target)?;
    Ok(target)
}

pub fn install(runner: &dyn ToolRunner, pip: &str, wheel: &Path, cwd: &Path) -> Result<()> {
    let args = PipInstallArgs {
        pip: pip.to_string(),
        wheel: wheel.to_path_buf(),
    };
    runner.run(&args, cwd)?.ensure_success("pip install")
}

/// Version pip reports for the wheel's distribution, `None` if `pip show`
/// printed no `Version:` line.
pub fn installed_version(
    runner: &dyn ToolRunner,
    pip: &str,
    wheel: &Path,
    cwd: &Path,
) -> Result<Option<String>> {
    let file_name = wheel
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let args = PipShowArgs {
        pip: pip.to_string(),
        distribution: distribution_name(file_name).to_string(),
    };
    let output = runner.run(&args, cwd)?;
    output.ensure_success("pip show")?;
    Ok(parse_show_version(&output.stdout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_format() {
        let now = Local.with_ymd_and_hms(2025, 4, 13, 9, 5, 7).unwrap();
        assert_eq!(timestamp(now), "20250413_090507");
    }

    #[test]
    fn test_destination_dir_name() {
        let dir = destination_dir(Path::new("/out"), "pkg-1.0-cp311-cp311", "20250413_090507");
        assert_eq!(
            dir,
            PathBuf::from("/out/pkg-1.0-cp311-cp311_universal2_20250413_090507")
        );
    }

    #[test]
    fn test_publish_copies_into_new_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let merged = tmp.path().join("pkg-1.0-cp311-cp311-macosx_10_9_universal2.whl");
        fs::write(&merged, b"wheel").unwrap();
        let destination = tmp.path().join("out/pkg_universal2_x");

        let copied = publish(&merged, &destination).unwrap();
        assert_eq!(copied, destination.join("pkg-1.0-cp311-cp311-macosx_10_9_universal2.whl"));
        assert_eq!(fs::read(&copied).unwrap(), b"wheel");
        assert!(merged.exists());
    }

    #[test]
    fn test_publish_returns_absolute_path() {
        let tmp = tempfile::tempdir().unwrap();
        let merged = tmp.path().join("pkg-1.0-cp311-cp311-macosx_10_9_universal2.whl");
        fs::write(&merged, b"wheel").unwrap();

        let copied = publish(&merged, &tmp.path().join("dest")).unwrap();
        assert!(copied.is_absolute());
    }

    #[test]
    fn test_publish_without_file_name_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let result = publish(Path::new("/"), &tmp.path().join("dest"));
        assert!(matches!(result, Err(FatwheelError::General(_))));
    }

    #[test]
    fn test_publish_missing_source_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let result = publish(&tmp.path().join("gone.whl"), &tmp.path().join("dest"));
        assert!(matches!(result, Err(FatwheelError::Io(_))));
    }
}
