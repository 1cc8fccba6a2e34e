//! Headless event loop: hotkeys and the clipboard hook without a window.
//!
//! ```text
//! key_rx ──recv──▶ Session::handle_key_event ──▶ TextSink
//! interval ─tick─▶ Session::poll_clipboard   ──▶ ClipboardAccess
//! ```
//!
//! Both arms run on the one task that owns the [`Session`], so the list is
//! never touched from two places at once.  Typing blocks the task; the
//! capture thread keeps queueing in the meantime.

use std::time::Instant;

use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};

use crate::clipboard::ClipboardAccess;
use crate::hotkey::{Dispatch, KeyEvent};
use crate::inject::TextSink;

use super::Session;

/// Drives a [`Session`] from a key-event channel.
///
/// ```rust,no_run
/// use type_lines::clipboard::SystemClipboard;
/// use type_lines::inject::TextInjector;
/// use type_lines::session::{Session, SessionRunner};
///
/// # async fn example(session: Session) {
/// let (_tx, rx) = tokio::sync::mpsc::channel(64);
/// let runner = SessionRunner::new(
///     session,
///     Box::new(TextInjector::default()),
///     Box::new(SystemClipboard::new()),
/// );
/// let session = runner.run(rx).await;
/// # }
/// ```
pub struct SessionRunner {
    session: Session,
    sink: Box<dyn TextSink>,
    clipboard: Box<dyn ClipboardAccess>,
}

impl SessionRunner {
    pub fn new(
        session: Session,
        sink: Box<dyn TextSink>,
        clipboard: Box<dyn ClipboardAccess>,
    ) -> Self {
        Self {
            session,
            sink,
            clipboard,
        }
    }

    /// Run until `key_rx` is closed and drained, then hand the session back.
    pub async fn run(mut self, mut key_rx: mpsc::Receiver<KeyEvent>) -> Session {
        let mut tick = interval(self.session.watcher().interval());
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                event = key_rx.recv() => {
                    let Some(event) = event else { break };
                    self.handle(&event);
                }
                _ = tick.tick() => {
                    self.session.poll_clipboard(self.clipboard.as_mut(), Instant::now());
                }
            }
        }

        log::info!("session: key channel closed, runner shutting down");
        self.session
    }

    fn handle(&mut self, event: &KeyEvent) {
        if let Dispatch::Handled(action) = self.session.handle_key_event(event, self.sink.as_mut()) {
            let list = self.session.list();
            log::info!(
                "{} → [{}] {}",
                action.label(),
                list.cursor().map_or_else(|| "-".to_owned(), |c| c.to_string()),
                list.current_text().unwrap_or("")
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use rdev::Key;

    use super::*;
    use crate::clipboard::tests::MemoryClipboard;
    use crate::clipboard::ClipboardWatcher;
    use crate::hotkey::{HotkeyBinding, HotkeyRouter};
    use crate::inject::InjectError;
    use crate::lines::{LineList, ListOptions};
    use crate::session::NoticeLevel;

    /// Records typed text where the test can still see it after `run`.
    #[derive(Clone, Default)]
    struct SharedSink(Arc<Mutex<Vec<String>>>);

    impl TextSink for SharedSink {
        fn type_text(&mut self, text: &str) -> Result<(), InjectError> {
            self.0.lock().unwrap().push(text.to_owned());
            Ok(())
        }
    }

    fn session(enabled: bool) -> Session {
        Session::new(
            LineList::with_lines(
                vec!["one".into(), "# two".into(), "three".into()],
                ListOptions::default(),
            ),
            HotkeyRouter::new(HotkeyBinding::default(), enabled),
            ClipboardWatcher::new(Duration::from_millis(10)),
        )
    }

    fn runner(session: Session, sink: &SharedSink) -> SessionRunner {
        SessionRunner::new(
            session,
            Box::new(sink.clone()),
            Box::new(MemoryClipboard::default()),
        )
    }

    #[tokio::test]
    async fn typed_lines_follow_key_presses() {
        let sink = SharedSink::default();
        let (tx, rx) = mpsc::channel(8);

        for key in [Key::F3, Key::F3, Key::F4] {
            tx.send(KeyEvent::Pressed(key)).await.unwrap();
            tx.send(KeyEvent::Released(key)).await.unwrap();
        }
        drop(tx);

        let session = runner(session(true), &sink).run(rx).await;

        // The comment is skipped; F4 types without moving.
        assert_eq!(*sink.0.lock().unwrap(), ["one", "three", "one"]);
        assert_eq!(session.list().cursor(), Some(0));
    }

    #[tokio::test]
    async fn disabled_hook_ignores_everything() {
        let sink = SharedSink::default();
        let (tx, rx) = mpsc::channel(8);
        tx.send(KeyEvent::Pressed(Key::F3)).await.unwrap();
        tx.send(KeyEvent::Pressed(Key::F6)).await.unwrap();
        drop(tx);

        let session = runner(session(false), &sink).run(rx).await;

        assert!(sink.0.lock().unwrap().is_empty());
        assert_eq!(session.list().cursor(), Some(0));
    }

    #[tokio::test]
    async fn failure_is_kept_as_notice() {
        let sink = SharedSink::default();
        let (tx, rx) = mpsc::channel(8);
        tx.send(KeyEvent::Pressed(Key::F4)).await.unwrap();
        drop(tx);

        let mut empty = session(true);
        empty.list_mut().clear();
        let session = runner(empty, &sink).run(rx).await;

        assert_eq!(session.notice().map(|n| n.level), Some(NoticeLevel::Warning));
        assert!(sink.0.lock().unwrap().is_empty());
    }
}
