//! Application state
//!
//! Everything the UI draws lives in [`AppState`]. Transitions are plain
//! methods so they can be tested without a terminal.

use crate::workflow::{RunOutcome, RunSummary, WorkflowMessage};
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use tracing::warn;

/// Keep the log pane bounded; older lines are dropped first
pub const MAX_LOG_LINES: usize = 2000;

/// Application operating modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppMode {
    /// Waiting for a package name
    Form,
    /// A workflow is running on the worker thread
    Running,
    /// The worker is blocked on the install question
    ConfirmInstall,
    /// "Are you sure you want to exit?"
    ConfirmExit,
}

/// Which form control has keyboard focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Entry,
    InstallButton,
}

/// Install question waiting for an answer
#[derive(Debug)]
pub struct PendingInstall {
    pub base: String,
    pub wheel: PathBuf,
    reply: Sender<bool>,
}

impl PendingInstall {
    pub fn new(base: String, wheel: PathBuf, reply: Sender<bool>) -> Self {
        Self { base, wheel, reply }
    }
}

#[derive(Debug)]
pub struct AppState {
    pub mode: AppMode,
    pub focus: Focus,
    pub package_input: String,
    /// Cursor position in `package_input`, in chars
    pub cursor: usize,
    pub log: Vec<String>,
    /// Lines scrolled up from the bottom of the log; 0 follows new output
    pub log_scroll: usize,
    pub status_message: String,
    pub pending_install: Option<PendingInstall>,
    /// Highlighted button in a yes/no dialog
    pub dialog_yes: bool,
    /// Mode to return to when the exit dialog is dismissed
    pre_dialog_mode: Option<AppMode>,
    pub last_summary: Option<RunSummary>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: AppMode::Form,
            focus: Focus::Entry,
            package_input: String::new(),
            cursor: 0,
            log: Vec::new(),
            log_scroll: 0,
            status_message: "Enter a package name and press Enter".to_string(),
            pending_install: None,
            dialog_yes: true,
            pre_dialog_mode: None,
            last_summary: None,
        }
    }
}

impl AppState {
    /// Whether the package entry and install button accept input
    pub fn input_enabled(&self) -> bool {
        self.mode == AppMode::Form
    }

    /// Whether a workflow is in flight, including while a dialog covers it
    pub fn is_running(&self) -> bool {
        match self.mode {
            AppMode::Running | AppMode::ConfirmInstall => true,
            AppMode::ConfirmExit => matches!(
                self.pre_dialog_mode,
                Some(AppMode::Running) | Some(AppMode::ConfirmInstall)
            ),
            AppMode::Form => false,
        }
    }

    pub fn insert_char(&mut self, c: char) {
        if !self.input_enabled() {
            return;
        }
        let idx = self.byte_index();
        self.package_input.insert(idx, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if !self.input_enabled() || self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let idx = self.byte_index();
        self.package_input.remove(idx);
    }

    pub fn delete(&mut self) {
        if !self.input_enabled() || self.cursor >= self.package_input.chars().count() {
            return;
        }
        let idx = self.byte_index();
        self.package_input.remove(idx);
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.package_input.chars().count());
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.package_input.chars().count();
    }

    fn byte_index(&self) -> usize {
        self.package_input
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.package_input.len())
    }

    pub fn toggle_focus(&mut self) {
        if !self.input_enabled() {
            return;
        }
        self.focus = match self.focus {
            Focus::Entry => Focus::InstallButton,
            Focus::InstallButton => Focus::Entry,
        };
    }

    /// Start a run for the entered name. Returns the name to hand to the
    /// worker, or `None` when nothing should start.
    pub fn begin_run(&mut self) -> Option<String> {
        if !self.input_enabled() {
            return None;
        }
        self.clear_log();

        let package = self.package_input.trim().to_string();
        if package.is_empty() {
            self.append_log("Please enter a package name.");
            return None;
        }

        self.mode = AppMode::Running;
        self.last_summary = None;
        self.status_message = format!("Building universal2 wheels for {}...", package);
        Some(package)
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
        self.log_scroll = 0;
    }

    /// Append text to the log; embedded newlines become separate lines
    pub fn append_log(&mut self, text: &str) {
        for line in text.split('\n') {
            self.log.push(line.to_string());
            if self.log_scroll > 0 {
                self.log_scroll += 1;
            }
        }
        if self.log.len() > MAX_LOG_LINES {
            let excess = self.log.len() - MAX_LOG_LINES;
            self.log.drain(..excess);
        }
        self.log_scroll = self.log_scroll.min(self.log.len().saturating_sub(1));
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.log_scroll = (self.log_scroll + lines).min(self.log.len().saturating_sub(1));
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.log_scroll = self.log_scroll.saturating_sub(lines);
    }

    /// Apply one message from the worker
    pub fn apply_message(&mut self, msg: WorkflowMessage) {
        match msg {
            WorkflowMessage::Log(line) => self.append_log(&line),
            WorkflowMessage::ConfirmInstall { base, wheel, reply } => {
                self.ask_install(PendingInstall::new(base, wheel, reply));
            }
            WorkflowMessage::Finished(summary) => self.finish_run(summary),
        }
    }

    fn ask_install(&mut self, pending: PendingInstall) {
        self.pending_install = Some(pending);
        if self.mode == AppMode::ConfirmExit {
            // Show the install question once the exit dialog is dismissed.
            self.pre_dialog_mode = Some(AppMode::ConfirmInstall);
        } else {
            self.dialog_yes = true;
            self.mode = AppMode::ConfirmInstall;
        }
    }

    /// Send the answer to the blocked worker and resume
    pub fn answer_install(&mut self, install: bool) {
        if let Some(pending) = self.pending_install.take() {
            if pending.reply.send(install).is_err() {
                warn!(base = %pending.base, "install answer dropped, worker is gone");
            }
        }
        if self.mode == AppMode::ConfirmInstall {
            self.mode = AppMode::Running;
        }
    }

    fn finish_run(&mut self, summary: RunSummary) {
        self.status_message = summary_status(&summary);
        self.last_summary = Some(summary);
        self.pending_install = None;
        match self.mode {
            AppMode::ConfirmExit => self.pre_dialog_mode = Some(AppMode::Form),
            _ => self.mode = AppMode::Form,
        }
    }

    pub fn request_exit(&mut self) {
        if self.mode == AppMode::ConfirmExit {
            return;
        }
        self.pre_dialog_mode = Some(self.mode);
        self.dialog_yes = false;
        self.mode = AppMode::ConfirmExit;
    }

    pub fn cancel_exit(&mut self) {
        if self.mode != AppMode::ConfirmExit {
            return;
        }
        self.mode = self.pre_dialog_mode.take().unwrap_or(AppMode::Form);
        self.dialog_yes = true;
    }
}

fn summary_status(summary: &RunSummary) -> String {
    match summary.outcome {
        RunOutcome::Completed if summary.failed.is_empty() => format!(
            "Done: {} universal2 wheel(s) saved for {}",
            summary.published.len(),
            summary.package
        ),
        RunOutcome::Completed => format!(
            "Finished with errors: {} saved, {} failed",
            summary.published.len(),
            summary.failed.len()
        ),
        RunOutcome::EmptyName => "Enter a package name and press Enter".to_string(),
        RunOutcome::InvalidName => "Invalid package name".to_string(),
        RunOutcome::Unavailable => format!("{} not found on the index", summary.package),
        RunOutcome::NoWheels => "No wheels to merge".to_string(),
        RunOutcome::Aborted => "Run aborted, see log".to_string(),
    }
}
