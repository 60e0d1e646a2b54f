use crate::error::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::time::Duration;
use tracing::{debug, warn};

/// Contract for the keyboard signal source: at most one key press per poll.
pub trait Keyboard {
    fn poll_key(&mut self, timeout: Duration) -> Result<Option<KeyCode>>;
}

/// Terminal-backed keyboard. Raw mode is held for the lifetime of the value
/// so individual presses arrive without line buffering.
pub struct TerminalKeyboard {
    _raw: RawModeGuard,
}

impl TerminalKeyboard {
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        debug!("Raw mode enabled for keyboard input");
        Ok(Self {
            _raw: RawModeGuard,
        })
    }
}

impl Keyboard for TerminalKeyboard {
    fn poll_key(&mut self, timeout: Duration) -> Result<Option<KeyCode>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => Ok(Some(key.code)),
            _ => Ok(None),
        }
    }
}

struct RawModeGuard;

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            warn!("Failed to disable raw mode: {}", e);
        } else {
            debug!("Raw mode disabled");
        }
    }
}
