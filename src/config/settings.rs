//! Application settings structs, defaults and TOML persistence.
//!
//! Every section is `#[serde(default)]`, so a settings file only needs the
//! keys it wants to change.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// BackendChoice
// ---------------------------------------------------------------------------

/// Which global key-capture backend to start.
///
/// | Variant | Capture            | Bound keys reach other apps |
/// |---------|--------------------|-----------------------------|
/// | Auto    | grab, else listen  | depends on the fallback     |
/// | Listen  | `rdev::listen`     | yes                         |
/// | Grab    | `rdev::grab`       | no                          |
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum BackendChoice {
    #[default]
    Auto,
    Listen,
    Grab,
}

// ---------------------------------------------------------------------------
// InjectMethod
// ---------------------------------------------------------------------------

/// How a line is delivered to the focused window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InjectMethod {
    /// Synthesize one key event per character.
    #[default]
    Keystrokes,
    /// Put the line on the clipboard, send the paste shortcut, restore.
    Paste,
}

// ---------------------------------------------------------------------------
// HotkeyConfig
// ---------------------------------------------------------------------------

/// Global hotkey bindings and capture backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HotkeyConfig {
    pub type_and_advance: String,
    pub type_and_stay: String,
    pub select_previous: String,
    pub select_next: String,
    pub backend: BackendChoice,
    /// Start with the keyboard hook enabled.  macOS only prompts for
    /// accessibility permission once the hook is live, so it defaults on there.
    pub start_enabled: bool,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            type_and_advance: "F3".into(),
            type_and_stay: "F4".into(),
            select_previous: "F5".into(),
            select_next: "F6".into(),
            backend: BackendChoice::default(),
            start_enabled: cfg!(target_os = "macos"),
        }
    }
}

// ---------------------------------------------------------------------------
// ListConfig
// ---------------------------------------------------------------------------

/// Initial list options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    pub skip_comments: bool,
    pub allow_blank_lines: bool,
    pub reverse_direction: bool,
    /// Start with `sample text 01` … `sample text 25` instead of an empty list.
    pub load_sample_list: bool,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            skip_comments: true,
            allow_blank_lines: false,
            reverse_direction: false,
            load_sample_list: true,
        }
    }
}

impl ListConfig {
    pub fn options(&self) -> crate::lines::ListOptions {
        crate::lines::ListOptions {
            skip_comments: self.skip_comments,
            allow_blank_lines: self.allow_blank_lines,
            reverse: self.reverse_direction,
        }
    }
}

// ---------------------------------------------------------------------------
// ClipboardConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipboardConfig {
    /// Clipboard hook poll period.
    pub poll_interval_ms: u64,
    pub hook_at_startup: bool,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 10,
            hook_at_startup: false,
        }
    }
}

// ---------------------------------------------------------------------------
// InjectConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InjectConfig {
    pub method: InjectMethod,
    /// Pause before typing starts (keystrokes) or before the paste shortcut.
    pub delay_ms: u64,
    /// Paste mode: how long to wait before restoring the old clipboard.
    pub restore_delay_ms: u64,
}

impl Default for InjectConfig {
    fn default() -> Self {
        Self {
            method: InjectMethod::default(),
            delay_ms: 0,
            restore_delay_ms: 100,
        }
    }
}

// ---------------------------------------------------------------------------
// UiConfig
// ---------------------------------------------------------------------------

/// egui window settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub always_on_top: bool,
    /// Initial inner size `[width, height]` in points.
    pub window_size: [f32; 2],
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            always_on_top: false,
            window_size: [640.0, 480.0],
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// ```rust,no_run
/// use type_lines::config::AppConfig;
///
/// // Returns Default when the file is missing.
/// let config = AppConfig::load().unwrap();
/// assert_eq!(config.hotkey.type_and_advance, "F3");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub hotkey: HotkeyConfig,
    pub list: ListConfig,
    pub clipboard: ClipboardConfig,
    pub inject: InjectConfig,
    pub ui: UiConfig,
}

impl AppConfig {
    /// Load from the platform `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Save to the platform `settings.toml`, creating parent directories.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
