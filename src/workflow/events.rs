//! How a running workflow talks to whoever started it.
//!
//! The workflow only knows [`WorkflowReporter`]. The TUI uses
//! [`ChannelReporter`], which forwards everything over an mpsc channel to the UI
//! thread and blocks the worker while the install dialog is open.

use super::RunSummary;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use tracing::warn;

/// Receives the user-visible log and answers the install question
pub trait WorkflowReporter {
    /// Append one line to the visible log
    fn log(&mut self, line: String);

    /// Whether to install the merged wheel just published for `base`
    fn confirm_install(&mut self, base: &str, wheel: &Path) -> bool;
}

/// Messages sent from the worker thread to the UI thread
#[derive(Debug)]
pub enum WorkflowMessage {
    Log(String),
    /// The worker waits on `reply` until the user answers
    ConfirmInstall {
        base: String,
        wheel: PathBuf,
        reply: Sender<bool>,
    },
    Finished(RunSummary),
}

pub struct ChannelReporter {
    tx: Sender<WorkflowMessage>,
}

impl ChannelReporter {
    pub fn new(tx: Sender<WorkflowMessage>) -> Self {
        Self { tx }
    }
}

impl WorkflowReporter for ChannelReporter {
    fn log(&mut self, line: String) {
        if self.tx.send(WorkflowMessage::Log(line)).is_err() {
            warn!("log line dropped, UI receiver is gone");
        }
    }

    fn confirm_install(&mut self, base: &str, wheel: &Path) -> bool {
        let (reply_tx, reply_rx) = mpsc::channel();
        let question = WorkflowMessage::ConfirmInstall {
            base: base.to_string(),
            wheel: wheel.to_path_buf(),
            reply: reply_tx,
        };
        if self.tx.send(question).is_err() {
            return false;
        }
        // A dropped reply sender (UI gone) counts as "no".
        reply_rx.recv().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_log_lines_arrive_in_order() {
        let (tx, rx) = mpsc::channel();
        let mut reporter = ChannelReporter::new(tx);
        reporter.log("one".to_string());
        reporter.log("two".to_string());
        drop(reporter);

        let lines: Vec<String> = rx
            .iter()
            .filter_map(|m| match m {
                WorkflowMessage::Log(line) => Some(line),
                _ => None,
            })
            .collect();
        assert_eq!(lines, vec!["one", "two"]);
    }

    #[test]
    fn test_confirm_install_waits_for_reply() {
        let (tx, rx) = mpsc::channel();
        let worker = thread::spawn(move || {
            let mut reporter = ChannelReporter::new(tx);
            reporter.confirm_install("pkg-1.0-cp311-cp311", Path::new("/out/pkg.whl"))
        });

        match rx.recv().unwrap() {
            WorkflowMessage::ConfirmInstall { base, reply, .. } => {
                assert_eq!(base, "pkg-1.0-cp311-cp311");
                reply.send(true).unwrap();
            }
            other => panic!("unexpected message: {:?}", other),
        }
        assert!(worker.join().unwrap());
    }

    #[test]
    fn test_confirm_install_without_ui_is_no() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let mut reporter = ChannelReporter::new(tx);
        assert!(!reporter.confirm_install("pkg", Path::new("pkg.whl")));
    }

    #[test]
    fn test_dropped_reply_is_no() {
        let (tx, rx) = mpsc::channel();
        let worker = thread::spawn(move || {
            let mut reporter = ChannelReporter::new(tx);
            reporter.confirm_install("pkg", Path::new("pkg.whl"))
        });
        if let WorkflowMessage::ConfirmInstall { reply, .. } = rx.recv().unwrap() {
            drop(reply);
        }
        assert!(!worker.join().unwrap());
    }
}
