//! Settings for the tools, index and directories the workflow uses.
//!
//! Settings come from an optional JSON file (`--config` or `FATWHEEL_CONFIG`);
//! any field the file leaves out takes its default. CLI flags are applied on
//! top by the binary.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming a settings file
pub const CONFIG_ENV: &str = "FATWHEEL_CONFIG";

/// Default package index JSON API root
pub const DEFAULT_INDEX_URL: &str = "https://pypi.org/pypi";

/// Name of the scratch directory created beside the executable
pub const SCRATCH_DIR_NAME: &str = "cache";

/// Diagnostics file written while the TUI owns the terminal
pub const LOG_FILE_NAME: &str = "fatwheel.log";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root of the per-package JSON metadata endpoint (`{index_url}/{name}/json`)
    pub index_url: String,
    /// Interpreter run under `arch` for `pip wheel`
    pub python: String,
    /// pip executable used for install and show
    pub pip: String,
    /// Fat-wheel merge tool
    pub merge_tool: String,
    /// Working area; emptied before and after every run
    pub scratch_dir: PathBuf,
    /// Where `<base>_universal2_<timestamp>` folders go. Defaults to the
    /// scratch directory's parent.
    pub output_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            index_url: DEFAULT_INDEX_URL.to_string(),
            python: "python3".to_string(),
            pip: "pip3".to_string(),
            merge_tool: "delocate-merge".to_string(),
            scratch_dir: default_scratch_dir(),
            output_dir: None,
        }
    }
}

/// `cache/` next to the running executable, or in the working directory if
/// the executable path is unavailable.
pub fn default_scratch_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(SCRATCH_DIR_NAME)))
        .unwrap_or_else(|| PathBuf::from(SCRATCH_DIR_NAME))
}

impl Settings {
    /// Load settings from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings from {:?}", path.as_ref()))?;

        let settings: Self =
            serde_json::from_str(&content).context("Failed to parse settings JSON")?;

        Ok(settings)
    }

    /// Save settings to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize settings to JSON")?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write settings to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Load from `path`, else from `$FATWHEEL_CONFIG`, else defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_file(path);
        }
        match std::env::var_os(CONFIG_ENV) {
            Some(env_path) if !env_path.is_empty() => Self::load_from_file(PathBuf::from(env_path)),
            _ => Ok(Self::default()),
        }
    }

    /// Resolve relative scratch and output directories against the current
    /// directory. Tools run with the scratch directory as their working
    /// directory, so paths handed to them must not be relative.
    pub fn make_absolute(&mut self) -> Result<()> {
        self.scratch_dir = std::path::absolute(&self.scratch_dir)
            .with_context(|| format!("Failed to resolve scratch_dir {:?}", self.scratch_dir))?;
        if let Some(dir) = &self.output_dir {
            let resolved = std::path::absolute(dir)
                .with_context(|| format!("Failed to resolve output_dir {:?}", dir))?;
            self.output_dir = Some(resolved);
        }
        Ok(())
    }

    /// Directory that receives the timestamped destination folders
    pub fn output_root(&self) -> PathBuf {
        if let Some(dir) = &self.output_dir {
            return dir.clone();
        }
        match self.scratch_dir.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Diagnostics log beside the scratch directory, outside the area that gets wiped
    pub fn log_file_path(&self) -> PathBuf {
        match self.scratch_dir.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.join(LOG_FILE_NAME),
            _ => PathBuf::from(LOG_FILE_NAME),
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("python", &self.python),
            ("pip", &self.pip),
            ("merge_tool", &self.merge_tool),
        ] {
            if value.trim().is_empty() {
                anyhow::bail!("{} must not be empty", field);
            }
        }

        if !(self.index_url.starts_with("https://") || self.index_url.starts_with("http://")) {
            anyhow::bail!("index_url must be an http(s) URL, got '{}'", self.index_url);
        }

        if self.scratch_dir.as_os_str().is_empty() {
            anyhow::bail!("scratch_dir must not be empty");
        }

        // The scratch directory is emptied on every run.
        let scratch = std::path::absolute(&self.scratch_dir)
            .with_context(|| format!("Failed to resolve scratch_dir {:?}", self.scratch_dir))?;
        if scratch.parent().is_none() {
            anyhow::bail!("scratch_dir must not be a filesystem root");
        }
        if let Some(home) = std::env::var_os("HOME").filter(|h| !h.is_empty()) {
            if is_same_dir(&scratch, Path::new(&home)) {
                anyhow::bail!("scratch_dir must not be the home directory");
            }
        }

        // The scratch directory is wiped after every run.
        if self.output_root().starts_with(&self.scratch_dir) {
            anyhow::bail!(
                "output directory {:?} is inside the scratch directory {:?}",
                self.output_root(),
                self.scratch_dir
            );
        }

        Ok(())
    }
}

fn is_same_dir(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a.components().eq(b.components()),
    }
}
