//! Headless reporter: log lines to stdout, install question per policy.

use crate::types::InstallPolicy;
use crate::workflow::WorkflowReporter;
use std::path::Path;

pub struct ConsoleReporter {
    policy: InstallPolicy,
}

impl ConsoleReporter {
    pub fn new(policy: InstallPolicy) -> Self {
        Self { policy }
    }
}

impl WorkflowReporter for ConsoleReporter {
    fn log(&mut self, line: String) {
        println!("{}", line);
    }

    fn confirm_install(&mut self, base: &str, wheel: &Path) -> bool {
        match self.policy {
            InstallPolicy::Always => true,
            InstallPolicy::Never => false,
            InstallPolicy::Ask => inquire::Confirm::new(&format!(
                "Do you want to install the universal wheel for {} now?",
                base
            ))
            .with_help_message(&wheel.display().to_string())
            .with_default(false)
            .prompt()
            .unwrap_or(false),
        }
    }
}
