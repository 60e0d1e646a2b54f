use crate::config::ButtonsConfig;
use crossterm::event::KeyCode;
use std::collections::BTreeSet;

/// One logical booth action per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CaptureFrame,
    EraseLastFrame,
    DeleteAllAndReset,
    PlayPreview,
    BeginMovieCreation,
    ExitApp,
    NoAction,
}

/// Maps raw input signals to actions. Button matching is exact: only a single
/// designated button held by itself triggers anything, so chords and partial
/// presses debounce to NoAction.
pub struct InputMap {
    buttons: ButtonsConfig,
}

impl InputMap {
    pub fn new(buttons: ButtonsConfig) -> Self {
        Self { buttons }
    }

    /// Resolve one tick's signals. A key that maps to an action wins over
    /// whatever the button state says for the same tick.
    pub fn resolve(&self, held: &BTreeSet<u16>, key: Option<KeyCode>) -> Action {
        if let Some(key) = key {
            let action = Self::action_for_key(key);
            if action != Action::NoAction {
                return action;
            }
        }
        self.action_for_buttons(held)
    }

    pub fn action_for_buttons(&self, held: &BTreeSet<u16>) -> Action {
        if held.len() != 1 {
            return Action::NoAction;
        }
        let Some(&button) = held.iter().next() else {
            return Action::NoAction;
        };

        if button == self.buttons.delete {
            Action::DeleteAllAndReset
        } else if button == self.buttons.preview {
            Action::PlayPreview
        } else if button == self.buttons.erase {
            Action::EraseLastFrame
        } else if button == self.buttons.capture {
            Action::CaptureFrame
        } else if button == self.buttons.save {
            Action::BeginMovieCreation
        } else if button == self.buttons.exit {
            Action::ExitApp
        } else {
            Action::NoAction
        }
    }

    pub fn action_for_key(key: KeyCode) -> Action {
        match key {
            KeyCode::Char('/') => Action::DeleteAllAndReset,
            KeyCode::Char(' ') => Action::PlayPreview,
            KeyCode::Backspace => Action::EraseLastFrame,
            KeyCode::Enter => Action::CaptureFrame,
            KeyCode::Char('s') => Action::BeginMovieCreation,
            KeyCode::Esc => Action::ExitApp,
            _ => Action::NoAction,
        }
    }
}
