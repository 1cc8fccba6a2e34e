//! Dedicated OS-thread key capture using `rdev`.
//!
//! Two backends are available:
//!
//! | Backend | `rdev` call    | Per-key suppression | Notes |
//! |---------|----------------|---------------------|-------|
//! | Listen  | `rdev::listen` | no                  | bound keys also reach the focused app |
//! | Grab    | `rdev::grab`   | yes                 | Linux needs read access to `/dev/input` |
//!
//! # Shutdown caveat
//!
//! Neither `rdev` call can be interrupted.  [`KeySource::stop`] sets a flag
//! after which the callback forwards nothing and suppresses nothing; the OS
//! thread stays parked inside `rdev` until the process exits.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    mpsc::RecvTimeoutError,
    Arc,
};
use std::time::Duration;

use tokio::sync::mpsc;
#[cfg(any(not(target_os = "linux"), feature = "grab"))]
use tokio::sync::mpsc::error::TrySendError;

use crate::config::BackendChoice;

use super::{BackendError, KeyEvent, KeyFilter};

/// How long `start` waits for `rdev` to report an immediate failure.
const STARTUP_GRACE: Duration = Duration::from_millis(250);

// ---------------------------------------------------------------------------
// KeySource
// ---------------------------------------------------------------------------

/// A global key-event source running outside the main loop.
pub trait KeySource {
    /// `true` if individual keys can be hidden from other applications.
    fn can_suppress_per_key(&self) -> bool;

    /// Begin capturing.  Events for bound keys are sent on `tx`; `filter`
    /// decides which of them are swallowed.
    fn start(&mut self, filter: KeyFilter, tx: mpsc::Sender<KeyEvent>) -> Result<(), BackendError>;

    /// Stop forwarding events.  Calling it again is a no-op.
    fn stop(&mut self);

    fn is_running(&self) -> bool;

    /// Short name for logs and the system-info notice.
    fn name(&self) -> &'static str;
}

// ---------------------------------------------------------------------------
// BackendKind
// ---------------------------------------------------------------------------

/// A concrete capture backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Listen,
    Grab,
}

impl BackendKind {
    pub fn label(&self) -> &'static str {
        match self {
            BackendKind::Listen => "listen",
            BackendKind::Grab => "grab",
        }
    }

    /// The backend `auto` tries first on this platform.
    ///
    /// Windows and macOS support per-key grabbing.  On Linux, X11 sessions
    /// use the listen backend; Wayland sessions cannot be observed through X11
    /// and need the evdev-based grab backend, when it was compiled in.
    pub fn preferred() -> Self {
        if cfg!(all(target_os = "linux", not(feature = "grab"))) {
            BackendKind::Listen
        } else if cfg!(target_os = "linux") {
            match std::env::var("XDG_SESSION_TYPE").as_deref() {
                Ok("x11") => BackendKind::Listen,
                _ => BackendKind::Grab,
            }
        } else {
            BackendKind::Grab
        }
    }
}

// ---------------------------------------------------------------------------
// HotkeyListener
// ---------------------------------------------------------------------------

/// Handle to a running `rdev` capture thread.
pub struct HotkeyListener {
    kind: BackendKind,
    stop: Arc<AtomicBool>,
    /// Never joined: `rdev` does not return while the process lives.
    thread: Option<std::thread::JoinHandle<()>>,
}

impl HotkeyListener {
    pub fn new(kind: BackendKind) -> Self {
        Self {
            kind,
            stop: Arc::new(AtomicBool::new(false)),
            thread: None,
        }
    }

    pub fn kind(&self) -> BackendKind {
        self.kind
    }
}

impl KeySource for HotkeyListener {
    fn can_suppress_per_key(&self) -> bool {
        self.kind == BackendKind::Grab
    }

    fn start(&mut self, filter: KeyFilter, tx: mpsc::Sender<KeyEvent>) -> Result<(), BackendError> {
        if self.is_running() {
            return Ok(());
        }

        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let kind = self.kind;
        let (status_tx, status_rx) = std::sync::mpsc::channel::<String>();

        let thread = std::thread::Builder::new()
            .name("hotkey-listener".into())
            .spawn(move || {
                let outcome = match kind {
                    BackendKind::Listen => run_listen(stop_flag, filter, tx),
                    BackendKind::Grab => run_grab(stop_flag, filter, tx),
                };
                if let Err(reason) = outcome {
                    log::error!("hotkey-listener: rdev {} exited: {reason}", kind.label());
                    let _ = status_tx.send(reason);
                }
            })
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;

        match status_rx.recv_timeout(STARTUP_GRACE) {
            Ok(reason) => Err(BackendError::Unavailable(reason)),
            Err(RecvTimeoutError::Disconnected) => Err(BackendError::Unavailable(format!(
                "{} backend stopped immediately",
                kind.label()
            ))),
            Err(RecvTimeoutError::Timeout) => {
                log::info!("hotkey-listener: {} backend running", kind.label());
                self.stop = stop;
                self.thread = Some(thread);
                Ok(())
            }
        }
    }

    fn stop(&mut self) {
        if self.thread.take().is_some() {
            self.stop.store(true, Ordering::Relaxed);
            log::info!("hotkey-listener: {} backend stopped", self.kind.label());
        }
    }

    fn is_running(&self) -> bool {
        self.thread.is_some()
    }

    fn name(&self) -> &'static str {
        self.kind.label()
    }
}

fn run_listen(
    stop: Arc<AtomicBool>,
    filter: KeyFilter,
    tx: mpsc::Sender<KeyEvent>,
) -> Result<(), String> {
    rdev::listen(move |event| {
        if stop.load(Ordering::Relaxed) {
            return;
        }
        if let Some(key_event) = KeyEvent::from_rdev(&event.event_type) {
            if filter.is_relevant(&key_event) {
                // blocking_send is safe to call from non-async threads.
                let _ = tx.blocking_send(key_event);
            }
        }
    })
    .map_err(|e| format!("{e:?}"))
}

#[cfg(any(not(target_os = "linux"), feature = "grab"))]
fn run_grab(
    stop: Arc<AtomicBool>,
    filter: KeyFilter,
    tx: mpsc::Sender<KeyEvent>,
) -> Result<(), String> {
    rdev::grab(move |event| {
        if stop.load(Ordering::Relaxed) {
            return Some(event);
        }
        let Some(key_event) = KeyEvent::from_rdev(&event.event_type) else {
            return Some(event);
        };
        let suppress = filter.should_suppress(&key_event);
        if filter.is_relevant(&key_event) {
            // This callback sits inside the OS input hook; blocking here
            // would stall every keyboard on the system.
            match tx.try_send(key_event) {
                Ok(()) | Err(TrySendError::Closed(_)) => {}
                Err(TrySendError::Full(dropped)) => {
                    log::warn!("hotkey-listener: event queue full, dropped {dropped:?}");
                }
            }
        }
        if suppress {
            None
        } else {
            Some(event)
        }
    })
    .map_err(|e| format!("{e:?}"))
}

#[cfg(all(target_os = "linux", not(feature = "grab")))]
fn run_grab(
    _stop: Arc<AtomicBool>,
    _filter: KeyFilter,
    _tx: mpsc::Sender<KeyEvent>,
) -> Result<(), String> {
    Err("built without the `grab` feature".into())
}

impl Drop for HotkeyListener {
    fn drop(&mut self) {
        self.stop();
    }
}

// ---------------------------------------------------------------------------
// start_key_source
// ---------------------------------------------------------------------------

/// Start the backend named by `choice`.
///
/// `Auto` tries [`BackendKind::preferred`] and falls back to the listen
/// backend if grabbing is refused.  An explicit choice never falls back.
pub fn start_key_source(
    choice: BackendChoice,
    filter: KeyFilter,
    tx: mpsc::Sender<KeyEvent>,
) -> Result<HotkeyListener, BackendError> {
    let first = match choice {
        BackendChoice::Auto => BackendKind::preferred(),
        BackendChoice::Listen => BackendKind::Listen,
        BackendChoice::Grab => BackendKind::Grab,
    };

    let mut listener = HotkeyListener::new(first);
    match listener.start(filter.clone(), tx.clone()) {
        Ok(()) => Ok(listener),
        Err(e) if choice == BackendChoice::Auto && first == BackendKind::Grab => {
            log::warn!("hotkey: grab backend unavailable ({e}); falling back to listen, bound keys will not be suppressed");
            let mut fallback = HotkeyListener::new(BackendKind::Listen);
            fallback.start(filter, tx)?;
            Ok(fallback)
        }
        Err(e) => Err(e),
    }
}
