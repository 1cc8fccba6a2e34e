//! Clipboard hook: every new piece of copied text becomes list entries.
//!
//! While enabled, the watcher is polled on a short fixed interval.  When the
//! trimmed clipboard text differs from what was last seen, it is appended to
//! the list (one entry per line), the last entry is selected, and the
//! clipboard is cleared so that copying the same text again is picked up as
//! new.

use std::time::{Duration, Instant};

use crate::lines::LineList;

use super::{ClipboardAccess, ClipboardError};

#[derive(Debug)]
pub struct ClipboardWatcher {
    enabled: bool,
    /// Trimmed text of the last import, kept only while the clipboard could
    /// not be cleared.
    last_seen: String,
    interval: Duration,
    last_poll: Option<Instant>,
}

impl ClipboardWatcher {
    /// `interval` is raised to at least one millisecond.
    pub fn new(interval: Duration) -> Self {
        Self {
            enabled: false,
            last_seen: String::new(),
            interval: interval.max(Duration::from_millis(1)),
            last_poll: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start watching.  Whatever is on the clipboard now is discarded.
    pub fn enable(&mut self, clipboard: &mut dyn ClipboardAccess) -> Result<(), ClipboardError> {
        self.enabled = true;
        self.last_seen.clear();
        self.last_poll = None;
        log::info!("clipboard: hook enabled ({} ms)", self.interval.as_millis());
        clipboard.clear()
    }

    pub fn disable(&mut self) {
        if self.enabled {
            log::info!("clipboard: hook disabled");
        }
        self.enabled = false;
    }

    /// `true` when enabled and at least one interval has passed since the
    /// last poll.
    pub fn is_due(&self, now: Instant) -> bool {
        self.enabled
            && self
                .last_poll
                .map_or(true, |last| now.duration_since(last) >= self.interval)
    }

    /// Check the clipboard once.  Returns `true` when entries were appended.
    ///
    /// Does nothing while disabled.
    pub fn poll(
        &mut self,
        clipboard: &mut dyn ClipboardAccess,
        list: &mut LineList,
    ) -> Result<bool, ClipboardError> {
        if !self.enabled {
            return Ok(false);
        }
        self.last_poll = Some(Instant::now());

        let text = clipboard.read_text()?.unwrap_or_default();
        let trimmed = text.trim();
        if trimmed == self.last_seen {
            return Ok(false);
        }

        list.append(trimmed);
        list.select_last();
        log::debug!("clipboard: appended {} line(s)", trimmed.lines().count());

        match clipboard.clear() {
            Ok(()) => {
                self.last_seen.clear();
                Ok(true)
            }
            Err(e) => {
                // Remember it so the same content is not appended every tick.
                self.last_seen = trimmed.to_owned();
                Err(e)
            }
        }
    }
}
