//! System clipboard access and the clipboard hook.
//!
//! [`ClipboardAccess`] is the narrow seam the rest of the crate talks to;
//! [`SystemClipboard`] implements it on top of `arboard`.  Tests substitute
//! an in-memory clipboard.

pub mod watcher;

pub use watcher::ClipboardWatcher;

use arboard::Clipboard;
use thiserror::Error;

// ---------------------------------------------------------------------------
// ClipboardError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Error)]
pub enum ClipboardError {
    /// The OS clipboard could not be opened or read.
    #[error("cannot access clipboard: {0}")]
    Access(String),

    /// Writing to the OS clipboard failed.
    #[error("cannot set clipboard text: {0}")]
    Write(String),
}

// ---------------------------------------------------------------------------
// ClipboardAccess
// ---------------------------------------------------------------------------

/// Plain-text read/write access to a clipboard.
pub trait ClipboardAccess {
    /// Current text content.  `Ok(None)` when the clipboard is empty or holds
    /// non-text data.
    fn read_text(&mut self) -> Result<Option<String>, ClipboardError>;

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;

    fn clear(&mut self) -> Result<(), ClipboardError> {
        self.write_text("")
    }
}

// ---------------------------------------------------------------------------
// SystemClipboard
// ---------------------------------------------------------------------------

/// `arboard`-backed clipboard.
///
/// The handle is opened on first use and kept; a failed operation drops it
/// so the next call reopens.  On X11 the owning handle must stay alive for
/// pasted content to remain available, so one long-lived handle is used
/// rather than one per call.
#[derive(Default)]
pub struct SystemClipboard {
    handle: Option<Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&mut self) -> Result<&mut Clipboard, ClipboardError> {
        if self.handle.is_none() {
            let clipboard = Clipboard::new().map_err(|e| ClipboardError::Access(e.to_string()))?;
            self.handle = Some(clipboard);
        }
        self.handle
            .as_mut()
            .ok_or_else(|| ClipboardError::Access("clipboard handle unavailable".into()))
    }
}

impl ClipboardAccess for SystemClipboard {
    fn read_text(&mut self) -> Result<Option<String>, ClipboardError> {
        let result = self.handle()?.get_text();
        match result {
            Ok(text) => Ok(Some(text)),
            // Empty or non-text content.
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(e) => {
                self.handle = None;
                Err(ClipboardError::Access(e.to_string()))
            }
        }
    }

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let result = self.handle()?.set_text(text);
        result.map_err(|e| {
            self.handle = None;
            ClipboardError::Write(e.to_string())
        })
    }

    fn clear(&mut self) -> Result<(), ClipboardError> {
        let result = self.handle()?.clear();
        result.map_err(|e| {
            self.handle = None;
            ClipboardError::Write(e.to_string())
        })
    }
}
