//! Keybindings per application mode
//!
//! Maps key events to [`KeyAction`]s and provides the hints shown in the
//! navigation bar. Printable keys that are not bound in `Form` mode are typed
//! into the package entry by the app.

use crate::app::AppMode;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// Actions that can be triggered by keybindings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Start a run (Enter on the entry or the install button)
    Submit,
    NextFocus,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    /// Move the highlight between Yes and No
    Toggle,
    /// Apply the highlighted dialog button
    Confirm,
    Yes,
    No,
    /// Open the exit confirmation
    Quit,
}

#[derive(Debug, Clone)]
pub struct Keybinding {
    pub key: KeyCode,
    pub modifiers: KeyModifiers,
    pub action: KeyAction,
    pub display: &'static str,
    pub description: &'static str,
}

impl Keybinding {
    pub fn new(
        key: KeyCode,
        action: KeyAction,
        display: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            modifiers: KeyModifiers::NONE,
            action,
            display,
            description,
        }
    }

    fn matches(&self, event: &KeyEvent) -> bool {
        if self.key != event.code {
            return false;
        }
        // Shift is part of the character for Char keys.
        let mods = event.modifiers.difference(KeyModifiers::SHIFT);
        mods == self.modifiers
    }
}

/// Navigation bar item for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavBarItem {
    pub key_display: String,
    pub action_label: String,
}

pub struct KeybindingContext {
    mode_bindings: HashMap<AppMode, Vec<Keybinding>>,
}

impl Default for KeybindingContext {
    fn default() -> Self {
        Self::new()
    }
}

impl KeybindingContext {
    pub fn new() -> Self {
        let scroll = || {
            vec![
                Keybinding::new(KeyCode::Up, KeyAction::ScrollUp, "Up", "Scroll"),
                Keybinding::new(KeyCode::Down, KeyAction::ScrollDown, "Down", "Scroll"),
                Keybinding::new(KeyCode::PageUp, KeyAction::PageUp, "PgUp", "Page up"),
                Keybinding::new(KeyCode::PageDown, KeyAction::PageDown, "PgDn", "Page down"),
            ]
        };
        let yes_no = || {
            vec![
                Keybinding::new(KeyCode::Char('y'), KeyAction::Yes, "Y", "Yes"),
                Keybinding::new(KeyCode::Char('n'), KeyAction::No, "N", "No"),
                Keybinding::new(KeyCode::Left, KeyAction::Toggle, "Left", "Switch"),
                Keybinding::new(KeyCode::Right, KeyAction::Toggle, "Right", "Switch"),
                Keybinding::new(KeyCode::Tab, KeyAction::Toggle, "Tab", "Switch"),
                Keybinding::new(KeyCode::Enter, KeyAction::Confirm, "Enter", "Choose"),
                Keybinding::new(KeyCode::Esc, KeyAction::No, "Esc", "No"),
            ]
        };

        let mut form = vec![
            Keybinding::new(KeyCode::Enter, KeyAction::Submit, "Enter", "Install"),
            Keybinding::new(KeyCode::Tab, KeyAction::NextFocus, "Tab", "Focus"),
            Keybinding::new(KeyCode::BackTab, KeyAction::NextFocus, "S-Tab", "Focus"),
        ];
        form.extend(scroll());
        form.push(Keybinding::new(KeyCode::Esc, KeyAction::Quit, "Esc", "Quit"));

        let mut running = scroll();
        running.push(Keybinding::new(KeyCode::Char('q'), KeyAction::Quit, "Q", "Quit"));
        running.push(Keybinding::new(KeyCode::Esc, KeyAction::Quit, "Esc", "Quit"));

        let mut mode_bindings = HashMap::new();
        mode_bindings.insert(AppMode::Form, form);
        mode_bindings.insert(AppMode::Running, running);
        mode_bindings.insert(AppMode::ConfirmInstall, yes_no());
        mode_bindings.insert(AppMode::ConfirmExit, yes_no());

        Self { mode_bindings }
    }

    pub fn bindings(&self, mode: AppMode) -> &[Keybinding] {
        self.mode_bindings
            .get(&mode)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Action bound to `event` in `mode`. Ctrl+C always asks to quit.
    pub fn action_for(&self, mode: AppMode, event: &KeyEvent) -> Option<KeyAction> {
        if event.code == KeyCode::Char('c') && event.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(match mode {
                AppMode::ConfirmExit => KeyAction::Yes,
                _ => KeyAction::Quit,
            });
        }
        self.bindings(mode)
            .iter()
            .find(|b| b.matches(event))
            .map(|b| b.action)
    }

    /// Hints for the navigation bar; one entry per action
    pub fn nav_items(&self, mode: AppMode) -> Vec<NavBarItem> {
        let mut seen: Vec<KeyAction> = Vec::new();
        let mut items = Vec::new();
        for binding in self.bindings(mode) {
            // Scroll keys share one hint.
            let action = match binding.action {
                KeyAction::ScrollDown => KeyAction::ScrollUp,
                KeyAction::PageDown => KeyAction::PageUp,
                other => other,
            };
            if seen.contains(&action) {
                continue;
            }
            seen.push(action);
            let key_display = match action {
                KeyAction::ScrollUp => "Up/Down".to_string(),
                KeyAction::PageUp => "PgUp/PgDn".to_string(),
                KeyAction::Toggle => "Left/Right".to_string(),
                _ => binding.display.to_string(),
            };
            items.push(NavBarItem {
                key_display,
                action_label: binding.description.to_string(),
            });
        }
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_typing_q_in_form_is_not_quit() {
        let ctx = KeybindingContext::new();
        assert_eq!(ctx.action_for(AppMode::Form, &key(KeyCode::Char('q'))), None);
        assert_eq!(
            ctx.action_for(AppMode::Running, &key(KeyCode::Char('q'))),
            Some(KeyAction::Quit)
        );
    }

    #[test]
    fn test_ctrl_c() {
        let ctx = KeybindingContext::new();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(ctx.action_for(AppMode::Form, &ctrl_c), Some(KeyAction::Quit));
        assert_eq!(ctx.action_for(AppMode::ConfirmExit, &ctrl_c), Some(KeyAction::Yes));
    }

    #[test]
    fn test_dialog_keys() {
        let ctx = KeybindingContext::new();
        assert_eq!(
            ctx.action_for(AppMode::ConfirmInstall, &key(KeyCode::Char('y'))),
            Some(KeyAction::Yes)
        );
        assert_eq!(
            ctx.action_for(AppMode::ConfirmInstall, &key(KeyCode::Esc)),
            Some(KeyAction::No)
        );
        assert_eq!(
            ctx.action_for(AppMode::ConfirmExit, &key(KeyCode::Enter)),
            Some(KeyAction::Confirm)
        );
    }

    #[test]
    fn test_nav_items_are_deduplicated() {
        let ctx = KeybindingContext::new();
        let items = ctx.nav_items(AppMode::Running);
        let labels: Vec<&str> = items.iter().map(|i| i.key_display.as_str()).collect();
        assert_eq!(labels, vec!["Up/Down", "PgUp/PgDn", "Q"]);
    }
}
