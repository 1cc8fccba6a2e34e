//! Global hotkeys: key names, bindings, routing and the capture thread.
//!
//! # Design
//!
//! `rdev` delivers key events on a **dedicated OS thread**.  That thread never
//! touches the line list.  It asks a [`KeyFilter`] whether the key should be
//! hidden from other applications (grab backend only), then forwards the event
//! over a `tokio::sync::mpsc` channel.  The UI loop, or the headless
//! [`SessionRunner`](crate::session::SessionRunner), drains that channel and
//! hands each event to the [`HotkeyRouter`].
//!
//! ```text
//! rdev thread ──KeyFilter::should_suppress──▶ swallow / pass on
//!      │
//!      └─ blocking_send(KeyEvent) ──▶ main loop ──▶ HotkeyRouter::dispatch
//!                                                    ├─ LineList
//!                                                    └─ TextSink
//! ```

pub mod binding;
pub mod detect;
pub mod listener;
pub mod router;

pub use binding::{HotkeyAction, HotkeyBinding};
pub use detect::detect_keyboard;
pub use listener::{start_key_source, HotkeyListener, KeySource};
pub use router::{Dispatch, DispatchError, HotkeyRouter, KeyFilter};

use thiserror::Error;

// ---------------------------------------------------------------------------
// KeyEvent
// ---------------------------------------------------------------------------

/// A key transition forwarded from the capture thread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyEvent {
    Pressed(rdev::Key),
    Released(rdev::Key),
}

impl KeyEvent {
    pub fn key(&self) -> rdev::Key {
        match *self {
            KeyEvent::Pressed(k) | KeyEvent::Released(k) => k,
        }
    }

    /// Translate an `rdev` event; mouse and wheel events yield `None`.
    pub fn from_rdev(event_type: &rdev::EventType) -> Option<Self> {
        match *event_type {
            rdev::EventType::KeyPress(k) => Some(KeyEvent::Pressed(k)),
            rdev::EventType::KeyRelease(k) => Some(KeyEvent::Released(k)),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// BackendError
// ---------------------------------------------------------------------------

/// The global key hook could not be established.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("keyboard backend unavailable: {0}")]
    Unavailable(String),

    #[error("no ENTER key press detected within {0} s")]
    DetectionTimedOut(u64),

    #[error("keyboard detection cancelled")]
    DetectionCancelled,
}

// ---------------------------------------------------------------------------
// Key names
// ---------------------------------------------------------------------------

/// Keys offered for binding, in display order.
pub const FUNCTION_KEYS: [(&str, rdev::Key); 12] = [
    ("F1", rdev::Key::F1),
    ("F2", rdev::Key::F2),
    ("F3", rdev::Key::F3),
    ("F4", rdev::Key::F4),
    ("F5", rdev::Key::F5),
    ("F6", rdev::Key::F6),
    ("F7", rdev::Key::F7),
    ("F8", rdev::Key::F8),
    ("F9", rdev::Key::F9),
    ("F10", rdev::Key::F10),
    ("F11", rdev::Key::F11),
    ("F12", rdev::Key::F12),
];

/// Parse a key name from the config file into an [`rdev::Key`].
///
/// Function keys are case-insensitive (`"F3"` and `"f3"` both work, the
/// latter being how older list files spelled them).  A handful of named keys
/// that are safe to dedicate to hotkeys are also accepted.
///
/// ```
/// use type_lines::hotkey::parse_key;
///
/// assert_eq!(parse_key("F3"), Some(rdev::Key::F3));
/// assert_eq!(parse_key("f12"), Some(rdev::Key::F12));
/// assert_eq!(parse_key("Pause"), Some(rdev::Key::Pause));
/// assert_eq!(parse_key("F13"), None);
/// ```
pub fn parse_key(key_str: &str) -> Option<rdev::Key> {
    let name = key_str.trim();
    if let Some((_, key)) = FUNCTION_KEYS
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
    {
        return Some(*key);
    }
    match name {
        "Insert" | "Ins" => Some(rdev::Key::Insert),
        "Home" => Some(rdev::Key::Home),
        "End" => Some(rdev::Key::End),
        "PageUp" => Some(rdev::Key::PageUp),
        "PageDown" => Some(rdev::Key::PageDown),
        "ScrollLock" => Some(rdev::Key::ScrollLock),
        "PrintScreen" => Some(rdev::Key::PrintScreen),
        "Pause" => Some(rdev::Key::Pause),
        _ => None,
    }
}

/// Display name for `key`; the inverse of [`parse_key`] where one exists.
pub fn key_name(key: rdev::Key) -> String {
    FUNCTION_KEYS
        .iter()
        .find(|(_, k)| *k == key)
        .map_or_else(|| format!("{key:?}"), |(n, _)| (*n).to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_function_keys_any_case() {
        assert_eq!(parse_key("F1"), Some(rdev::Key::F1));
        assert_eq!(parse_key("f6"), Some(rdev::Key::F6));
        assert_eq!(parse_key(" F10 "), Some(rdev::Key::F10));
    }

    #[test]
    fn parse_named_keys() {
        assert_eq!(parse_key("Insert"), Some(rdev::Key::Insert));
        assert_eq!(parse_key("ScrollLock"), Some(rdev::Key::ScrollLock));
    }

    #[test]
    fn parse_unknown_key_returns_none() {
        assert_eq!(parse_key("xyz"), None);
        assert_eq!(parse_key(""), None);
        assert_eq!(parse_key("Ctrl+V"), None);
    }

    #[test]
    fn key_name_round_trips_function_keys() {
        for (name, key) in FUNCTION_KEYS {
            assert_eq!(key_name(key), name);
            assert_eq!(parse_key(name), Some(key));
        }
        assert_eq!(key_name(rdev::Key::Pause), "Pause");
    }

    #[test]
    fn key_event_from_rdev_ignores_mouse() {
        assert_eq!(
            KeyEvent::from_rdev(&rdev::EventType::KeyPress(rdev::Key::F3)),
            Some(KeyEvent::Pressed(rdev::Key::F3))
        );
        assert_eq!(
            KeyEvent::from_rdev(&rdev::EventType::ButtonPress(rdev::Button::Left)),
            None
        );
    }
}
