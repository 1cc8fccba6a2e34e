//! Interactive check that global key capture actually sees the keyboard.
//!
//! On Linux in particular a hook can start without error yet receive nothing
//! (wrong session type, missing `/dev/input` permissions).  `--detect-keyboard`
//! asks the user to press ENTER and waits for the capture thread to see it.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use super::BackendError;

/// Outcome reported by the detection thread.
#[derive(Debug, Clone, PartialEq)]
enum Probe {
    Enter,
    Escape,
    Failed(String),
}

/// Classify one raw key press for the detection step.
fn probe_for(key: rdev::Key) -> Option<Probe> {
    match key {
        rdev::Key::Return | rdev::Key::KpReturn => Some(Probe::Enter),
        rdev::Key::Escape => Some(Probe::Escape),
        _ => None,
    }
}

/// Block until ENTER is seen by a global listener, ESC is pressed, or
/// `timeout_secs` elapse.
///
/// The probe thread stays parked inside `rdev::listen` afterwards; it sends
/// nothing once the receiver is gone.
pub fn detect_keyboard(timeout_secs: u64) -> Result<(), BackendError> {
    println!("Press ENTER to confirm the keyboard is detected (ESC cancels, {timeout_secs} s timeout)...");

    let (tx, rx) = mpsc::channel::<Probe>();
    let failed_tx = tx.clone();
    std::thread::Builder::new()
        .name("keyboard-detect".into())
        .spawn(move || {
            let result = rdev::listen(move |event| {
                if let rdev::EventType::KeyPress(key) = event.event_type {
                    if let Some(probe) = probe_for(key) {
                        let _ = tx.send(probe);
                    }
                }
            });
            if let Err(e) = result {
                let _ = failed_tx.send(Probe::Failed(format!("{e:?}")));
            }
        })
        .map_err(|e| BackendError::Unavailable(e.to_string()))?;

    match rx.recv_timeout(Duration::from_secs(timeout_secs)) {
        Ok(Probe::Enter) => {
            log::info!("keyboard detection: ENTER received");
            Ok(())
        }
        Ok(Probe::Escape) => Err(BackendError::DetectionCancelled),
        Ok(Probe::Failed(reason)) => Err(BackendError::Unavailable(reason)),
        Err(RecvTimeoutError::Timeout) => Err(BackendError::DetectionTimedOut(timeout_secs)),
        Err(RecvTimeoutError::Disconnected) => Err(BackendError::Unavailable(
            "keyboard detection thread exited".into(),
        )),
    }
}
