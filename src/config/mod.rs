//! Configuration for type-lines.
//!
//! Provides `AppConfig` (top-level settings), one sub-config per subsystem,
//! `AppPaths` for the platform config directory, and TOML persistence via
//! `AppConfig::load` / `AppConfig::save_to`.
//!
//! Settings are read once at startup.  Changes made in the window last for
//! the session only; the file is written solely by `--init-config`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    AppConfig, BackendChoice, ClipboardConfig, HotkeyConfig, InjectConfig, InjectMethod,
    ListConfig, UiConfig,
};
