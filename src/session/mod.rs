//! The session: one list, one router, one clipboard hook, and the last
//! message for the user.
//!
//! Every front-end (the egui window, the headless runner) owns exactly one
//! [`Session`] and drives it from a single thread.  Operations that can fail
//! without being fatal record a [`Notice`] instead of returning an error, and
//! leave the list exactly as it was.

pub mod runner;

pub use runner::SessionRunner;

use std::fmt;
use std::path::Path;
use std::time::Instant;

use crate::clipboard::{ClipboardAccess, ClipboardWatcher};
use crate::hotkey::{Dispatch, HotkeyRouter, KeyEvent};
use crate::inject::TextSink;
use crate::lines::{LineList, ListError};
use crate::template::{ImportPlan, Template, VariableChoices};

// ---------------------------------------------------------------------------
// Notice
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
}

/// A message for the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub struct Session {
    list: LineList,
    router: HotkeyRouter,
    watcher: ClipboardWatcher,
    notice: Option<Notice>,
    /// Name of the running key-capture backend, if any.
    backend: Option<String>,
}

impl Session {
    pub fn new(list: LineList, router: HotkeyRouter, watcher: ClipboardWatcher) -> Self {
        Self {
            list,
            router,
            watcher,
            notice: None,
            backend: None,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn list(&self) -> &LineList {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut LineList {
        &mut self.list
    }

    pub fn router(&self) -> &HotkeyRouter {
        &self.router
    }

    pub fn watcher(&self) -> &ClipboardWatcher {
        &self.watcher
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    pub fn set_backend(&mut self, name: impl Into<String>) {
        self.backend = Some(name.into());
    }

    pub fn backend(&self) -> Option<&str> {
        self.backend.as_deref()
    }

    /// Show `notice` and log it.
    pub fn notify(&mut self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info => log::info!("{}", notice.message),
            NoticeLevel::Warning => log::warn!("{}", notice.message),
        }
        self.notice = Some(notice);
    }

    // -----------------------------------------------------------------------
    // Hotkeys
    // -----------------------------------------------------------------------

    /// Route one key event.  A failed action becomes a warning notice.
    pub fn handle_key_event(&mut self, event: &KeyEvent, sink: &mut dyn TextSink) -> Dispatch {
        let dispatch = self.router.dispatch(event, &mut self.list, sink);
        if let Dispatch::Failed(action, e) = &dispatch {
            self.notify(Notice::warning(format!("{}: {e}", action.label())));
        }
        dispatch
    }

    /// Flip the keyboard hook and return the new state.
    pub fn toggle_hook(&mut self) -> bool {
        let enabled = self.router.toggle();
        self.notify(Notice::info(if enabled {
            "Keyboard listener started"
        } else {
            "Keyboard listener stopped"
        }));
        enabled
    }

    // -----------------------------------------------------------------------
    // List edits
    // -----------------------------------------------------------------------

    /// Run an edit that needs a selection; `NoSelection` becomes a notice.
    pub fn edit<T>(&mut self, op: impl FnOnce(&mut LineList) -> Result<T, ListError>) -> Option<T> {
        match op(&mut self.list) {
            Ok(value) => Some(value),
            Err(e) => {
                self.notify(Notice::warning(e.to_string()));
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Import / save
    // -----------------------------------------------------------------------

    /// Import `path`.
    ///
    /// A plain file replaces the list immediately and `None` is returned.  A
    /// template is returned so the caller can collect variable values and
    /// finish with [`apply_template`](Self::apply_template).  A missing or
    /// unreadable file leaves the list unchanged.
    pub fn begin_import(&mut self, path: &Path) -> Option<Template> {
        match ImportPlan::load(path) {
            Ok(ImportPlan::Plain(lines)) => {
                self.list.replace_all(lines);
                self.notify(Notice::info(format!(
                    "Imported {} line(s) from {}",
                    self.list.len(),
                    path.display()
                )));
                None
            }
            Ok(ImportPlan::Template(template)) => Some(template),
            Err(e) => {
                self.notify(Notice::warning(format!("Import aborted: {e}")));
                None
            }
        }
    }

    /// Replace the list with `template` rendered using `choices`.
    pub fn apply_template(&mut self, template: &Template, choices: &VariableChoices) {
        self.list.replace_all(template.render(choices));
        self.notify(Notice::info(format!("Imported {} line(s)", self.list.len())));
    }

    /// Import `path`, filling any template variables with their defaults.
    pub fn import_with_defaults(&mut self, path: &Path) {
        if let Some(template) = self.begin_import(path) {
            let choices = template.default_choices();
            self.apply_template(&template, &choices);
        }
    }

    pub fn save(&mut self, path: &Path) -> bool {
        match self.list.save_to(path) {
            Ok(()) => {
                self.notify(Notice::info(format!("Saved to {}", path.display())));
                true
            }
            Err(e) => {
                self.notify(Notice::warning(e.to_string()));
                false
            }
        }
    }

    // -----------------------------------------------------------------------
    // Clipboard
    // -----------------------------------------------------------------------

    /// Put the selected entry on the clipboard.
    pub fn copy_current(&mut self, clipboard: &mut dyn ClipboardAccess) -> bool {
        let text = match self.list.current_text() {
            Ok(text) => text.to_owned(),
            Err(e) => {
                self.notify(Notice::warning(e.to_string()));
                return false;
            }
        };
        match clipboard.write_text(&text) {
            Ok(()) => true,
            Err(e) => {
                self.notify(Notice::warning(e.to_string()));
                false
            }
        }
    }

    /// [`copy_current`](Self::copy_current), then move on in the current
    /// direction if the copy worked.
    pub fn copy_and_advance(&mut self, clipboard: &mut dyn ClipboardAccess) -> bool {
        let copied = self.copy_current(clipboard);
        if copied {
            self.list.effective_advance();
        }
        copied
    }

    pub fn set_clipboard_hook(&mut self, enabled: bool, clipboard: &mut dyn ClipboardAccess) {
        if !enabled {
            self.watcher.disable();
            return;
        }
        if let Err(e) = self.watcher.enable(clipboard) {
            self.notify(Notice::warning(e.to_string()));
        }
    }

    /// Poll the clipboard hook if it is due.  Returns `true` when the list
    /// grew.
    pub fn poll_clipboard(&mut self, clipboard: &mut dyn ClipboardAccess, now: Instant) -> bool {
        if !self.watcher.is_due(now) {
            return false;
        }
        match self.watcher.poll(clipboard, &mut self.list) {
            Ok(grew) => grew,
            Err(e) => {
                self.notify(Notice::warning(e.to_string()));
                // The list may still have grown before the clear failed.
                true
            }
        }
    }

    // -----------------------------------------------------------------------
    // Info
    // -----------------------------------------------------------------------

    pub fn system_info(&self) -> String {
        format!(
            "type-lines {}\nPlatform: {} ({})\nKeyboard backend: {}\nKeyboard listener: {}",
            env!("CARGO_PKG_VERSION"),
            std::env::consts::OS,
            std::env::consts::ARCH,
            self.backend.as_deref().unwrap_or("none"),
            if self.router.is_enabled() { "running" } else { "stopped" },
        )
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::clipboard::tests::MemoryClipboard;
    use crate::hotkey::{HotkeyAction, HotkeyBinding};
    use crate::inject::InjectError;
    use crate::lines::ListOptions;

    struct NullSink;

    impl TextSink for NullSink {
        fn type_text(&mut self, _text: &str) -> Result<(), InjectError> {
            Ok(())
        }
    }

    fn session(lines: &[&str]) -> Session {
        Session::new(
            LineList::with_lines(
                lines.iter().map(|s| s.to_string()).collect(),
                ListOptions::default(),
            ),
            HotkeyRouter::new(HotkeyBinding::default(), true),
            ClipboardWatcher::new(Duration::from_millis(10)),
        )
    }

    #[test]
    fn failed_hotkey_becomes_warning() {
        let mut s = session(&[]);
        let out = s.handle_key_event(&KeyEvent::Pressed(rdev::Key::F3), &mut NullSink);
        assert!(matches!(out, Dispatch::Failed(HotkeyAction::TypeAndAdvance, _)));
        let notice = s.notice().expect("notice");
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert!(notice.message.starts_with("Type & Advance"));
    }

    #[test]
    fn edit_without_selection_reports_and_keeps_list() {
        let mut s = session(&[]);
        assert_eq!(s.edit(LineList::remove), None);
        assert!(s.notice().is_some());
        assert!(s.list().is_empty());
    }

    #[test]
    fn missing_import_leaves_list_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(&["keep"]);
        assert!(s.begin_import(&dir.path().join("missing.txt")).is_none());
        assert_eq!(s.list().lines(), ["keep"]);
        assert_eq!(s.notice().map(|n| n.level), Some(NoticeLevel::Warning));
    }

    #[test]
    fn template_import_waits_for_choices() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deploy.txt");
        std::fs::write(&path, "## var:env:dev,prod\ndeploy to {env}\n").unwrap();

        let mut s = session(&["keep"]);
        let template = s.begin_import(&path).expect("template");
        assert_eq!(s.list().lines(), ["keep"]);

        let mut choices = template.default_choices();
        choices.set("env", "prod");
        s.apply_template(&template, &choices);
        assert_eq!(s.list().lines(), ["deploy to prod"]);
        assert_eq!(s.list().cursor(), Some(0));
    }

    #[test]
    fn import_with_defaults_uses_first_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deploy.txt");
        std::fs::write(&path, "##var:host=alpha,beta\nssh {host}\n").unwrap();

        let mut s = session(&[]);
        s.import_with_defaults(&path);
        assert_eq!(s.list().lines(), ["ssh alpha"]);
    }

    #[test]
    fn copy_and_advance_moves_only_on_success() {
        let mut s = session(&["a", "b"]);
        let mut cb = MemoryClipboard::default();
        assert!(s.copy_and_advance(&mut cb));
        assert_eq!(cb.text.as_deref(), Some("a"));
        assert_eq!(s.list().cursor(), Some(1));

        cb.fail_writes = true;
        assert!(!s.copy_and_advance(&mut cb));
        assert_eq!(s.list().cursor(), Some(1));
    }

    #[test]
    fn save_writes_joined_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let mut s = session(&["one", "two"]);
        assert!(s.save(&path));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one\ntwo");
    }

    #[test]
    fn clipboard_hook_appends_through_session() {
        let mut s = session(&["a"]);
        let mut cb = MemoryClipboard::default();
        s.set_clipboard_hook(true, &mut cb);
        cb.text = Some("abc\ndef".into());
        assert!(s.poll_clipboard(&mut cb, Instant::now()));
        assert_eq!(s.list().lines(), ["a", "abc", "def"]);
        assert_eq!(s.list().cursor(), Some(2));

        s.set_clipboard_hook(false, &mut cb);
        cb.text = Some("ghi".into());
        assert!(!s.poll_clipboard(&mut cb, Instant::now() + Duration::from_secs(1)));
    }

    #[test]
    fn system_info_names_backend() {
        let mut s = session(&[]);
        assert!(s.system_info().contains("Keyboard backend: none"));
        s.set_backend("listen");
        let info = s.system_info();
        assert!(info.contains("Keyboard backend: listen"));
        assert!(info.contains(std::env::consts::OS));
    }

    #[test]
    fn toggle_hook_reports_state() {
        let mut s = session(&[]);
        assert!(!s.toggle_hook());
        assert_eq!(s.notice().map(|n| n.message.as_str()), Some("Keyboard listener stopped"));
        assert!(s.toggle_hook());
    }
}
