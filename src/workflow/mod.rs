//! The universal2 build workflow
//!
//! ```text
//! availability -> scratch prepare -> pip wheel x86_64 -> pip wheel arm64
//!   -> pairing -> for each pair: merge -> publish -> (install -> version)
//!   -> scratch clear
//! ```
//!
//! Failures before pairing end the run. Failures while handling one pair are
//! logged and the next pair is processed. Every failure is caught where it
//! happens and turned into a log line; `run` itself never fails. The scratch
//! directory is cleared on every exit path, as long as it is ours to clear.

pub mod availability;
pub mod events;
pub mod merge;
pub mod pairing;
pub mod publish;
pub mod scratch;

pub use availability::{Availability, PackageIndex, PypiIndex, is_valid_package_name};
pub use events::{ChannelReporter, WorkflowMessage, WorkflowReporter};
pub use pairing::{PairOutcome, PairingPlan, WheelPair, base_name, plan_pairs};
pub use scratch::ScratchDir;

use crate::config::Settings;
use crate::error::{FatwheelError, Result};
use crate::tool_runner::{SystemRunner, ToolRunner};
use crate::tool_traits::ToolArgs;
use crate::tools::{MERGE_OUTPUT_DIR, WheelDownloadArgs};
use crate::types::Arch;
use chrono::Local;
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use tracing::{info, warn};

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Nothing was entered
    EmptyName,
    /// Entered text is not a distribution name
    InvalidName,
    /// The index does not know the package
    Unavailable,
    /// A run-level stage failed (index error, scratch, download)
    Aborted,
    /// Downloads produced fewer than two wheels
    NoWheels,
    /// Every pair was attempted; see `failed` for per-pair problems
    Completed,
}

/// A merged wheel copied to its destination folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedWheel {
    pub base: String,
    pub path: PathBuf,
    pub installed: bool,
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub package: String,
    pub outcome: RunOutcome,
    pub published: Vec<PublishedWheel>,
    /// Base names whose merge, copy or install failed
    pub failed: Vec<String>,
    /// Base names with a single wheel
    pub skipped: Vec<String>,
}

impl RunSummary {
    fn new(package: &str) -> Self {
        Self {
            package: package.to_string(),
            outcome: RunOutcome::Aborted,
            published: Vec::new(),
            failed: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Summary for a run that could not start
    pub fn aborted(package: &str) -> Self {
        Self::new(package.trim())
    }

    pub fn is_success(&self) -> bool {
        self.outcome == RunOutcome::Completed && self.failed.is_empty()
    }
}

pub struct Workflow {
    settings: Settings,
    index: Box<dyn PackageIndex>,
    runner: Box<dyn ToolRunner>,
}

impl Workflow {
    pub fn new(
        settings: Settings,
        index: Box<dyn PackageIndex>,
        runner: Box<dyn ToolRunner>,
    ) -> Self {
        Self {
            settings,
            index,
            runner,
        }
    }

    /// Real index client and real child processes
    pub fn with_system_tools(settings: Settings) -> Result<Self> {
        let index = PypiIndex::new(settings.index_url.clone())?;
        Ok(Self::new(settings, Box::new(index), Box::new(SystemRunner)))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn scratch(&self) -> ScratchDir {
        ScratchDir::new(&self.settings.scratch_dir)
    }

    /// Run the whole workflow for `package` and clear the scratch directory.
    pub fn run(&self, package: &str, reporter: &mut dyn WorkflowReporter) -> RunSummary {
        let package = package.trim();
        let mut summary = RunSummary::new(package);
        info!(package, "workflow started");

        let outcome = self.execute(package, reporter, &mut summary);
        summary.outcome = outcome;

        if let Err(e) = self.scratch().clear() {
            warn!("scratch cleanup failed: {e}");
            reporter.log(scratch_failure(&e));
        }

        info!(
            package,
            outcome = ?summary.outcome,
            published = summary.published.len(),
            failed = summary.failed.len(),
            "workflow finished"
        );
        summary
    }

    fn execute(
        &self,
        package: &str,
        reporter: &mut dyn WorkflowReporter,
        summary: &mut RunSummary,
    ) -> RunOutcome {
        if package.is_empty() {
            reporter.log("Please enter a package name.".to_string());
            return RunOutcome::EmptyName;
        }
        if !is_valid_package_name(package) {
            reporter.log(format!("'{}' is not a valid package name.", package));
            return RunOutcome::InvalidName;
        }

        match self.index.check(package) {
            Ok(Availability::Available) => {
                reporter.log(format!("{} is available on the package index.", package));
            }
            Ok(Availability::Missing { status }) => {
                reporter.log(format!(
                    "{} is not available on the package index (HTTP {}).",
                    package, status
                ));
                return RunOutcome::Unavailable;
            }
            Err(e) => {
                reporter.log(format!("Error checking the package index: {}", e));
                return RunOutcome::Aborted;
            }
        }

        reporter.log(format!(
            "Downloading {} & dependencies (if available)...",
            package
        ));

        let scratch = self.scratch();
        if let Err(e) = scratch.prepare() {
            reporter.log(scratch_failure(&e));
            return RunOutcome::Aborted;
        }

        for arch in Arch::UNIVERSAL2 {
            let args = WheelDownloadArgs {
                arch,
                python: self.settings.python.clone(),
                package: package.to_string(),
            };
            let result = self
                .runner
                .run(&args, scratch.path())
                .and_then(|output| output.ensure_success(&args.display_name()));
            if let Err(e) = result {
                reporter.log(format!("Error downloading {} for {}: {}", package, arch, e));
                return RunOutcome::Aborted;
            }
            reporter.log(format!("Fetched {} wheels.", arch));
        }

        let wheels = match scratch.wheel_files() {
            Ok(wheels) => wheels,
            Err(e) => {
                reporter.log(format!("Could not read the cache folder: {}", e));
                return RunOutcome::Aborted;
            }
        };
        let plan = match plan_pairs(&wheels) {
            Ok(plan) => plan,
            Err(e) => {
                reporter.log(pairing_message(&e));
                return RunOutcome::NoWheels;
            }
        };

        for entry in &plan.entries {
            match entry {
                PairOutcome::Unmatched { base } => {
                    reporter.log(format!(
                        "Matching wheels not found for base name: {}. Maybe there's no specific need for x86_64 or arm64.",
                        base
                    ));
                    summary.skipped.push(base.clone());
                }
                PairOutcome::Pair(pair) => {
                    if let Err(e) = scratch.reset_merge_output() {
                        reporter.log(scratch_failure(&e));
                        return RunOutcome::Aborted;
                    }
                    self.process_pair(pair, &scratch, reporter, summary);
                }
            }
        }

        RunOutcome::Completed
    }

    fn process_pair(
        &self,
        pair: &WheelPair,
        scratch: &ScratchDir,
        reporter: &mut dyn WorkflowReporter,
        summary: &mut RunSummary,
    ) {
        let base = &pair.base;
        reporter.log(format!("Wheel 1: {}", pair.first));
        reporter.log(format!("Wheel 2: {}", pair.second));

        let merged = match merge::merge_pair(
            self.runner.as_ref(),
            scratch,
            &self.settings.merge_tool,
            pair,
        ) {
            Ok(merged) => merged,
            Err(e) => {
                warn!(base = %base, "merge failed: {e}");
                reporter.log(format!("Error merging wheels for {}: {}", base, e));
                summary.failed.push(base.clone());
                return;
            }
        };
        reporter.log(format!(
            "Successfully merged wheels for {} into {}.",
            base, MERGE_OUTPUT_DIR
        ));

        let destination = publish::destination_dir(
            &self.settings.output_root(),
            base,
            &publish::timestamp(Local::now()),
        );
        let wheel = match publish::publish(&merged, &destination) {
            Ok(wheel) => wheel,
            Err(e) => {
                reporter.log(format!("Error copying file for {}: {}", base, e));
                summary.failed.push(base.clone());
                return;
            }
        };
        reporter.log(format!("Copied merged wheel for {} to {}", base, destination.display()));

        let mut published = PublishedWheel {
            base: base.clone(),
            path: wheel.clone(),
            installed: false,
            version: None,
        };

        if reporter.confirm_install(base, &wheel) {
            self.install_published(&mut published, scratch, reporter, summary);
        } else {
            reporter.log(format!(
                "Universal wheel for {} saved at: {}",
                base,
                destination.display()
            ));
        }
        summary.published.push(published);
    }

    fn install_published(
        &self,
        published: &mut PublishedWheel,
        scratch: &ScratchDir,
        reporter: &mut dyn WorkflowReporter,
        summary: &mut RunSummary,
    ) {
        let pip = &self.settings.pip;
        let base = published.base.clone();
        let file_name = published
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        if let Err(e) = publish::install(self.runner.as_ref(), pip, &published.path, scratch.path()) {
            reporter.log(format!("Error installing universal wheel for {}: {}", base, e));
            summary.failed.push(base);
            return;
        }
        published.installed = true;
        reporter.log(format!("Successfully installed {} for {}.", file_name, base));

        match publish::installed_version(self.runner.as_ref(), pip, &published.path, scratch.path()) {
            Ok(Some(version)) => {
                reporter.log(format!("Installed version for {}: {}", base, version));
                published.version = Some(version);
            }
            Ok(None) => {
                reporter.log(format!("Installed version information not found for {}.", base));
            }
            Err(e) => {
                reporter.log(format!("Error checking installed version for {}: {}", base, e));
            }
        }
    }
}

/// Run `workflow` for `package` on a background thread. Progress arrives on
/// `tx`, ending with [`WorkflowMessage::Finished`].
pub fn spawn_workflow(
    workflow: Workflow,
    package: String,
    tx: Sender<WorkflowMessage>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut reporter = ChannelReporter::new(tx.clone());
        let summary = workflow.run(&package, &mut reporter);
        if tx.send(WorkflowMessage::Finished(summary)).is_err() {
            warn!("run finished but the UI receiver is gone");
        }
    })
}

fn scratch_failure(err: &FatwheelError) -> String {
    match err {
        FatwheelError::UnownedScratch { .. } => {
            format!("{}\nChoose an empty or new cache folder.", err)
        }
        other => format!("{}\nDelete the cache folder manually.", other),
    }
}

fn pairing_message(err: &FatwheelError) -> String {
    match err {
        FatwheelError::Pairing(msg) => msg.clone(),
        other => other.to_string(),
    }
}
