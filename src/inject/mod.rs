//! Text injection into whichever window holds keyboard focus.
//!
//! # Methods
//!
//! | [`InjectMethod`] | How                                              |
//! |------------------|--------------------------------------------------|
//! | Keystrokes       | `enigo` synthesizes the text key by key          |
//! | Paste            | save clipboard → set text → paste shortcut → restore |
//!
//! Keystrokes is the default: it works in terminals and remote consoles that
//! ignore the clipboard.  Paste is faster for long lines and copes with text
//! the keyboard layout cannot produce.
//!
//! # Usage
//!
//! ```no_run
//! use type_lines::inject::{TextInjector, TextSink};
//!
//! let mut injector = TextInjector::default();
//! injector.type_text("show running-config").expect("injection failed");
//! ```

pub mod clipboard;
pub mod keyboard;

pub use clipboard::paste_text;
pub use keyboard::{simulate_paste, type_keystrokes};

use std::time::Duration;

use thiserror::Error;

use crate::clipboard::{ClipboardError, SystemClipboard};
use crate::config::{InjectConfig, InjectMethod};

// ---------------------------------------------------------------------------
// InjectError
// ---------------------------------------------------------------------------

/// All errors that can surface during text injection.
#[derive(Debug, Error)]
pub enum InjectError {
    /// The input-simulation backend could not be initialised (on macOS this
    /// usually means accessibility permission is missing).
    #[error("input backend unavailable: {0}")]
    Backend(String),

    /// Typing the text was refused part way.
    #[error("cannot type text: {0}")]
    Typing(String),

    /// Could not simulate a key press/release event.
    #[error("cannot simulate key press: {0}")]
    KeySimulation(String),

    /// Could not open or read the system clipboard.
    #[error("cannot access clipboard: {0}")]
    ClipboardAccess(String),

    /// Could not write text to the system clipboard.
    #[error("cannot set clipboard text: {0}")]
    ClipboardSet(String),
}

impl From<ClipboardError> for InjectError {
    fn from(e: ClipboardError) -> Self {
        match e {
            ClipboardError::Access(msg) => InjectError::ClipboardAccess(msg),
            ClipboardError::Write(msg) => InjectError::ClipboardSet(msg),
        }
    }
}

// ---------------------------------------------------------------------------
// TextSink
// ---------------------------------------------------------------------------

/// Destination for typed lines.
///
/// The call blocks until the text has been delivered or has failed.
pub trait TextSink {
    fn type_text(&mut self, text: &str) -> Result<(), InjectError>;
}

// ---------------------------------------------------------------------------
// TextInjector
// ---------------------------------------------------------------------------

/// [`TextSink`] that drives the real keyboard or clipboard.
pub struct TextInjector {
    pub method: InjectMethod,
    /// Pause before typing (keystrokes) or between setting the clipboard and
    /// pasting (paste).
    pub delay_ms: u64,
    /// Paste mode: pause after pasting before restoring the old clipboard.
    pub restore_delay_ms: u64,
    clipboard: SystemClipboard,
}

impl Default for TextInjector {
    fn default() -> Self {
        Self::from_config(&InjectConfig::default())
    }
}

impl TextInjector {
    pub fn from_config(config: &InjectConfig) -> Self {
        Self {
            method: config.method,
            delay_ms: config.delay_ms,
            restore_delay_ms: config.restore_delay_ms,
            clipboard: SystemClipboard::new(),
        }
    }
}

impl TextSink for TextInjector {
    fn type_text(&mut self, text: &str) -> Result<(), InjectError> {
        match self.method {
            InjectMethod::Keystrokes => {
                if self.delay_ms > 0 {
                    std::thread::sleep(Duration::from_millis(self.delay_ms));
                }
                type_keystrokes(text)
            }
            InjectMethod::Paste => paste_text(
                &mut self.clipboard,
                text,
                Duration::from_millis(self.delay_ms),
                Duration::from_millis(self.restore_delay_ms),
                simulate_paste,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clipboard_errors_map_to_inject_errors() {
        let e: InjectError = ClipboardError::Access("busy".into()).into();
        assert!(matches!(e, InjectError::ClipboardAccess(ref m) if m == "busy"));
        let e: InjectError = ClipboardError::Write("denied".into()).into();
        assert!(matches!(e, InjectError::ClipboardSet(ref m) if m == "denied"));
    }

    #[test]
    fn injector_takes_settings_from_config() {
        let cfg = InjectConfig {
            method: InjectMethod::Paste,
            delay_ms: 20,
            restore_delay_ms: 250,
        };
        let injector = TextInjector::from_config(&cfg);
        assert_eq!(injector.method, InjectMethod::Paste);
        assert_eq!(injector.delay_ms, 20);
        assert_eq!(injector.restore_delay_ms, 250);
    }
}
