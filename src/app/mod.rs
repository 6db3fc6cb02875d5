//! Application module
//!
//! - `state` - AppState, AppMode and the transitions between them
//! - this module - App struct, event loop, and the worker hand-off

mod state;

pub use state::{AppMode, AppState, Focus, MAX_LOG_LINES, PendingInstall};

use crate::components::keybindings::{KeyAction, KeybindingContext};
use crate::config::Settings;
use crate::error::Result;
use crate::process_guard::ProcessGuard;
use crate::theme::UiConstants;
use crate::ui::UiRenderer;
use crate::workflow::{RunSummary, Workflow, WorkflowMessage, spawn_workflow};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::Backend};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, error, info};

pub struct App {
    state: AppState,
    settings: Settings,
    ui_renderer: UiRenderer,
    keybindings: KeybindingContext,
    /// Cloned into each worker
    workflow_tx: Sender<WorkflowMessage>,
    /// Polled in the main loop
    workflow_rx: Receiver<WorkflowMessage>,
    worker: Option<JoinHandle<()>>,
    /// Terminates running pip/delocate processes when the app goes away
    _process_guard: ProcessGuard,
}

impl App {
    pub fn new(settings: Settings) -> Self {
        info!("Creating new App instance");
        let (workflow_tx, workflow_rx) = mpsc::channel();

        Self {
            state: AppState::default(),
            settings,
            ui_renderer: UiRenderer::new(),
            keybindings: KeybindingContext::new(),
            workflow_tx,
            workflow_rx,
            worker: None,
            _process_guard: ProcessGuard::new(),
        }
    }

    /// Run the main application loop until the user confirms exit
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        info!("Starting main application loop");

        loop {
            self.poll_workflow_messages();

            terminal.draw(|f| self.ui_renderer.render(f, &self.state, &self.keybindings))?;

            if crossterm::event::poll(Duration::from_millis(50))? {
                if let Event::Key(key_event) = crossterm::event::read()? {
                    if self.handle_key_event(key_event) {
                        break;
                    }
                }
            }
        }

        info!("Main loop finished");
        Ok(())
    }

    /// Drain everything the worker has sent without blocking
    fn poll_workflow_messages(&mut self) {
        while let Ok(msg) = self.workflow_rx.try_recv() {
            let finished = matches!(msg, WorkflowMessage::Finished(_));
            self.state.apply_message(msg);
            if finished {
                self.reap_worker();
            }
        }
    }

    fn reap_worker(&mut self) {
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                error!("workflow thread panicked");
            }
        }
    }

    /// Returns true when the app should exit
    fn handle_key_event(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }

        let mode = self.state.mode;
        let Some(action) = self.keybindings.action_for(mode, &key) else {
            self.handle_text_input(key);
            return false;
        };
        debug!(?mode, ?action, "key action");

        match (mode, action) {
            (AppMode::ConfirmExit, KeyAction::Yes) => return true,
            (AppMode::ConfirmExit, KeyAction::No) => self.state.cancel_exit(),
            (AppMode::ConfirmExit, KeyAction::Confirm) => {
                if self.state.dialog_yes {
                    return true;
                }
                self.state.cancel_exit();
            }
            (AppMode::ConfirmInstall, KeyAction::Yes) => self.state.answer_install(true),
            (AppMode::ConfirmInstall, KeyAction::No) => self.state.answer_install(false),
            (AppMode::ConfirmInstall, KeyAction::Confirm) => {
                let yes = self.state.dialog_yes;
                self.state.answer_install(yes);
            }
            (_, KeyAction::Toggle) => self.state.dialog_yes = !self.state.dialog_yes,
            (_, KeyAction::Quit) => self.state.request_exit(),
            (_, KeyAction::Submit) => self.start_run(),
            (_, KeyAction::NextFocus) => self.state.toggle_focus(),
            (_, KeyAction::ScrollUp) => self.state.scroll_up(1),
            (_, KeyAction::ScrollDown) => self.state.scroll_down(1),
            (_, KeyAction::PageUp) => self.state.scroll_up(UiConstants::PAGE_SCROLL_SIZE),
            (_, KeyAction::PageDown) => self.state.scroll_down(UiConstants::PAGE_SCROLL_SIZE),
            (_, KeyAction::Yes | KeyAction::No | KeyAction::Confirm) => {}
        }
        false
    }

    fn handle_text_input(&mut self, key: KeyEvent) {
        if self.state.mode != AppMode::Form || self.state.focus != Focus::Entry {
            return;
        }
        match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.state.insert_char(c)
            }
            KeyCode::Backspace => self.state.backspace(),
            KeyCode::Delete => self.state.delete(),
            KeyCode::Left => self.state.cursor_left(),
            KeyCode::Right => self.state.cursor_right(),
            KeyCode::Home => self.state.cursor_home(),
            KeyCode::End => self.state.cursor_end(),
            _ => {}
        }
    }

    /// Hand the entered package to a new worker thread
    fn start_run(&mut self) {
        let Some(package) = self.state.begin_run() else {
            return;
        };

        let workflow = match Workflow::with_system_tools(self.settings.clone()) {
            Ok(workflow) => workflow,
            Err(e) => {
                error!("could not set up the workflow: {e}");
                self.state.append_log(&format!("Error starting the build: {}", e));
                self.state
                    .apply_message(WorkflowMessage::Finished(RunSummary::aborted(&package)));
                return;
            }
        };

        info!(%package, "starting workflow thread");
        self.worker = Some(spawn_workflow(
            workflow,
            package,
            self.workflow_tx.clone(),
        ));
    }
}
