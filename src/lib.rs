//! type-lines: type a list of text lines into the focused window, one global
//! hotkey press at a time.
//!
//! | Module      | Role |
//! |-------------|------|
//! | [`lines`]     | the list and its selection cursor |
//! | [`hotkey`]    | key names, bindings, routing, capture thread |
//! | [`template`]  | list-file import with `## var:` variables |
//! | [`clipboard`] | clipboard access and the clipboard hook |
//! | [`inject`]    | typing into the focused window |
//! | [`session`]   | the session context and the headless runner |
//! | [`config`]    | `settings.toml` |
//! | [`app`]       | the egui window |

pub mod app;
pub mod clipboard;
pub mod config;
pub mod hotkey;
pub mod inject;
pub mod lines;
pub mod session;
pub mod template;
