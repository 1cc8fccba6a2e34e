//! Keyboard simulation backed by the `enigo` crate.
//!
//! | Platform | Paste shortcut |
//! |----------|----------------|
//! | macOS    | ⌘V (Meta + V)  |
//! | Windows  | Ctrl+V         |
//! | Linux    | Ctrl+V         |
//!
//! A new [`Enigo`] is created for each call; `Enigo` is not `Send` and is
//! cheap to construct.

use enigo::{Direction, Enigo, Key, Keyboard, Settings};

use super::InjectError;

fn open_enigo() -> Result<Enigo, InjectError> {
    Enigo::new(&Settings::default()).map_err(|e| InjectError::Backend(e.to_string()))
}

/// Type `text` into the focused window as individual key events.
///
/// Line breaks inside `text` are typed as Return.
pub fn type_keystrokes(text: &str) -> Result<(), InjectError> {
    if text.is_empty() {
        return Ok(());
    }
    let mut enigo = open_enigo()?;
    enigo
        .text(text)
        .map_err(|e| InjectError::Typing(e.to_string()))
}

/// Send the system paste shortcut to the focused window.
pub fn simulate_paste() -> Result<(), InjectError> {
    let mut enigo = open_enigo()?;

    #[cfg(target_os = "macos")]
    let modifier = Key::Meta;
    #[cfg(not(target_os = "macos"))]
    let modifier = Key::Control;

    enigo
        .key(modifier, Direction::Press)
        .map_err(|e| InjectError::KeySimulation(e.to_string()))?;
    let clicked = enigo
        .key(Key::Unicode('v'), Direction::Click)
        .map_err(|e| InjectError::KeySimulation(e.to_string()));
    // Release the modifier even when the click failed.
    enigo
        .key(modifier, Direction::Release)
        .map_err(|e| InjectError::KeySimulation(e.to_string()))?;
    clicked
}
