//! The scratch directory: where `pip wheel` drops downloads and the merge tool
//! writes its output. It is process-owned and emptied around every run.
//!
//! Ownership is recorded with a marker file written when the directory is
//! prepared. A non-empty directory without the marker is never emptied, so a
//! mistyped `--scratch-dir` cannot wipe unrelated files.

use crate::error::{FatwheelError, Result};
use crate::tools::MERGE_OUTPUT_DIR;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Marker file identifying a directory as fatwheel's scratch area
pub const SCRATCH_MARKER: &str = ".fatwheel-scratch";

#[derive(Debug, Clone)]
pub struct ScratchDir {
    root: PathBuf,
}

impl ScratchDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Directory the merge tool writes merged wheels into
    pub fn merge_output_dir(&self) -> PathBuf {
        self.root.join(MERGE_OUTPUT_DIR)
    }

    fn marker_path(&self) -> PathBuf {
        self.root.join(SCRATCH_MARKER)
    }

    /// Whether the directory carries the ownership marker
    pub fn is_owned(&self) -> bool {
        self.marker_path().is_file()
    }

    /// Fail unless the directory is missing, empty, or marked as ours.
    fn ensure_owned(&self) -> Result<()> {
        if !self.root.exists() || self.is_owned() {
            return Ok(());
        }
        if fs::read_dir(&self.root)?.next().is_none() {
            return Ok(());
        }
        warn!(path = %self.root.display(), "refusing to clear unmarked directory");
        Err(FatwheelError::UnownedScratch {
            path: self.root.clone(),
        })
    }

    /// Create the directory if missing, otherwise empty it. Either way the
    /// ownership marker is (re)written.
    pub fn prepare(&self) -> Result<()> {
        if self.root.exists() {
            self.clear()?;
        } else {
            debug!(path = %self.root.display(), "creating scratch directory");
            fs::create_dir_all(&self.root)?;
        }
        fs::write(self.marker_path(), b"")?;
        Ok(())
    }

    /// Remove every entry below the root except the marker. The root itself
    /// stays. A missing root counts as already clear.
    pub fn clear(&self) -> Result<()> {
        if !self.root.exists() {
            return Ok(());
        }
        self.ensure_owned()?;
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_name() == SCRATCH_MARKER {
                continue;
            }
            remove_entry(&entry.path(), true)?;
        }
        debug!(path = %self.root.display(), "scratch directory cleared");
        Ok(())
    }

    /// True when nothing but the marker is left
    pub fn is_empty(&self) -> Result<bool> {
        if !self.root.exists() {
            return Ok(true);
        }
        for entry in fs::read_dir(&self.root)? {
            if entry?.file_name() != SCRATCH_MARKER {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Drop stale files from the merge output directory before a merge.
    /// Subdirectories are left alone.
    pub fn reset_merge_output(&self) -> Result<()> {
        let dir = self.merge_output_dir();
        if !dir.exists() {
            return Ok(());
        }
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            remove_entry(&path, false)?;
        }
        Ok(())
    }

    /// File names of the `.whl` files directly in the scratch directory
    pub fn wheel_files(&self) -> Result<Vec<String>> {
        list_wheels(&self.root)
    }

    /// File names of the `.whl` files the merge tool produced
    pub fn merged_wheel_files(&self) -> Result<Vec<String>> {
        list_wheels(&self.merge_output_dir())
    }
}

fn remove_entry(path: &Path, recurse: bool) -> Result<()> {
    let meta = fs::symlink_metadata(path).map_err(|e| FatwheelError::scratch(path, e))?;
    let result = if meta.is_dir() {
        if !recurse {
            return Ok(());
        }
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| FatwheelError::scratch(path, e))
}

fn list_wheels(dir: &Path) -> Result<Vec<String>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut wheels = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if name.ends_with(super::pairing::WHEEL_SUFFIX) {
                wheels.push(name.to_string());
            }
        }
    }
    wheels.sort();
    Ok(wheels)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_prepare_creates_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::new(tmp.path().join("cache"));

        scratch.prepare().unwrap();
        assert!(scratch.path().is_dir());
        assert!(scratch.is_empty().unwrap());
    }

    #[test]
    fn test_prepare_marks_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::new(tmp.path().join("cache"));
        assert!(!scratch.is_owned());

        scratch.prepare().unwrap();
        assert!(scratch.is_owned());
        scratch.clear().unwrap();
        assert!(scratch.is_owned());
    }

    #[test]
    fn test_prepare_empties_existing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::new(tmp.path().join("cache"));
        scratch.prepare().unwrap();
        fs::create_dir_all(scratch.merge_output_dir().join("nested")).unwrap();
        touch(&scratch.path().join("old.whl"));
        touch(&scratch.merge_output_dir().join("nested/deep.txt"));

        scratch.prepare().unwrap();
        assert!(scratch.is_empty().unwrap());
        assert!(scratch.path().is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn test_clear_removes_symlink_not_target() {
        let tmp = tempfile::tempdir().unwrap();
        let outside = tmp.path().join("keep.txt");
        touch(&outside);
        let scratch = ScratchDir::new(tmp.path().join("cache"));
        scratch.prepare().unwrap();
        std::os::unix::fs::symlink(&outside, scratch.path().join("link")).unwrap();

        scratch.clear().unwrap();
        assert!(scratch.is_empty().unwrap());
        assert!(outside.exists());
    }

    #[test]
    fn test_unmarked_directory_with_content_is_left_alone() {
        let tmp = tempfile::tempdir().unwrap();
        let precious = tmp.path().join("precious.txt");
        touch(&precious);
        let scratch = ScratchDir::new(tmp.path());

        assert!(matches!(
            scratch.clear(),
            Err(FatwheelError::UnownedScratch { .. })
        ));
        assert!(matches!(
            scratch.prepare(),
            Err(FatwheelError::UnownedScratch { .. })
        ));
        assert!(precious.exists());
        assert!(!scratch.is_owned());
    }

    #[test]
    fn test_empty_unmarked_directory_is_claimed() {
        let tmp = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::new(tmp.path());

        scratch.prepare().unwrap();
        assert!(scratch.is_owned());
        assert!(scratch.is_empty().unwrap());
    }

    #[test]
    fn test_clear_missing_directory_is_ok() {
        let tmp = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::new(tmp.path().join("never-created"));
        assert!(scratch.clear().is_ok());
        assert!(scratch.is_empty().unwrap());
    }

    #[test]
    fn test_reset_merge_output_keeps_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::new(tmp.path());
        fs::create_dir_all(scratch.merge_output_dir().join("sub")).unwrap();
        touch(&scratch.merge_output_dir().join("stale.whl"));

        scratch.reset_merge_output().unwrap();
        assert!(scratch.merged_wheel_files().unwrap().is_empty());
        assert!(scratch.merge_output_dir().join("sub").is_dir());
    }

    #[test]
    fn test_wheel_files_filters_and_sorts() {
        let tmp = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::new(tmp.path());
        touch(&tmp.path().join("b-1.0-py3-none-any.whl"));
        touch(&tmp.path().join("a-1.0-py3-none-any.whl"));
        touch(&tmp.path().join("a-1.0.tar.gz"));
        fs::create_dir(tmp.path().join("dir.whl")).unwrap();

        assert_eq!(
            scratch.wheel_files().unwrap(),
            vec!["a-1.0-py3-none-any.whl", "b-1.0-py3-none-any.whl"]
        );
    }
}
