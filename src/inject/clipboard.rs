//! Paste-mode injection: route the text through the clipboard.

use std::time::Duration;

use crate::clipboard::ClipboardAccess;

use super::InjectError;

/// Paste `text` into the focused window through `clipboard`.
///
/// 1. Save the current clipboard text.
/// 2. Set `text`.
/// 3. Wait `delay`, then run `paste` (the shortcut).
/// 4. Wait `restore_delay` so the target has read the clipboard.
/// 5. Restore the saved text, or clear the clipboard if it was empty
///    (best-effort).
///
/// Returns the first error from steps 1–3.  The restore is attempted even
/// when `paste` failed.
pub fn paste_text(
    clipboard: &mut dyn ClipboardAccess,
    text: &str,
    delay: Duration,
    restore_delay: Duration,
    paste: impl FnOnce() -> Result<(), InjectError>,
) -> Result<(), InjectError> {
    let saved = clipboard.read_text()?;
    clipboard.write_text(text)?;

    if !delay.is_zero() {
        std::thread::sleep(delay);
    }
    let pasted = paste();
    if !restore_delay.is_zero() {
        std::thread::sleep(restore_delay);
    }

    let restored = match saved {
        Some(previous) => clipboard.write_text(&previous),
        None => clipboard.clear(),
    };
    if let Err(e) = restored {
        log::warn!("inject: clipboard not restored: {e}");
    }
    pasted
}
