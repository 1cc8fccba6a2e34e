//! type-lines window: egui/eframe front-end over a [`Session`].
//!
//! # Architecture
//!
//! [`TypeLinesApp`] is the top-level [`eframe::App`].  It owns the session,
//! the receiving end of the key-event channel, the text injector and the
//! system clipboard.  Every frame it:
//!
//! 1. drains pending key events into [`Session::handle_key_event`],
//! 2. polls the clipboard hook,
//! 3. renders menus, options, the list and any open dialog,
//! 4. applies the [`UiAction`]s collected while rendering.
//!
//! Key events arrive while the window is unfocused, so a repaint is always
//! scheduled a few milliseconds out.
//!
//! # Layout
//!
//! | Area          | Contents |
//! |---------------|----------|
//! | Menu bar      | File, Actions, Options, Help |
//! | Hotkey row    | one F1–F12 combo box per action, listener toggle |
//! | Options row   | skip comments, allow blank lines, reverse, hook clipboard |
//! | Central panel | the list; the selection is the line typed next |
//! | Status bar    | last notice |

use std::path::PathBuf;
use std::time::{Duration, Instant};

use eframe::egui;
use tokio::sync::mpsc;

use crate::clipboard::SystemClipboard;
use crate::hotkey::{key_name, HotkeyAction, HotkeyListener, KeyEvent, FUNCTION_KEYS};
use crate::inject::TextInjector;
use crate::lines::{is_comment, LineList};
use crate::session::{Notice, NoticeLevel, Session};
use crate::template::{Template, VariableChoices};

/// Upper bound on how long a key press waits for the next frame.
const KEY_POLL: Duration = Duration::from_millis(15);

// ---------------------------------------------------------------------------
// Dialogs and actions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InsertPosition {
    Before,
    After,
    Next,
}

impl InsertPosition {
    fn title(self) -> &'static str {
        match self {
            InsertPosition::Before => "Insert before",
            InsertPosition::After => "Insert after",
            InsertPosition::Next => "Insert next",
        }
    }
}

/// Modal-ish windows.  At most one is open.
enum Dialog {
    Insert { position: InsertPosition, text: String },
    Edit { text: String },
    Open { path: String },
    Save { path: String },
    Variables { template: Template, choices: VariableChoices },
    Info { title: &'static str, body: String },
}

/// Something the user asked for during this frame.
#[derive(Debug, Clone, PartialEq)]
enum UiAction {
    Select(usize),
    OpenDialog(DialogKind),
    CopyCurrent,
    CopyAndAdvance,
    MoveUp,
    MoveDown,
    Delete,
    DeleteAll,
    ToggleHook,
    HookClipboard(bool),
    SkipComments(bool),
    AllowBlankLines(bool),
    Reverse(bool),
    Rebind(HotkeyAction, rdev::Key),
    SystemInfo,
    About,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DialogKind {
    Insert(InsertPosition),
    Edit,
    Open,
    Save,
}

// ---------------------------------------------------------------------------
// TypeLinesApp
// ---------------------------------------------------------------------------

pub struct TypeLinesApp {
    session: Session,
    key_rx: mpsc::Receiver<KeyEvent>,
    injector: TextInjector,
    clipboard: SystemClipboard,
    /// Kept alive for the lifetime of the window.
    _listener: HotkeyListener,
    dialog: Option<Dialog>,
    /// Last directory-ish path typed into Open/Save.
    last_path: String,
    /// Selection at the previous frame, to scroll only when it moves.
    shown_cursor: Option<usize>,
}

impl TypeLinesApp {
    /// `pending` is a template from the startup file still waiting for
    /// variable values.
    pub fn new(
        session: Session,
        key_rx: mpsc::Receiver<KeyEvent>,
        injector: TextInjector,
        clipboard: SystemClipboard,
        listener: HotkeyListener,
        pending: Option<Template>,
    ) -> Self {
        let dialog = pending.map(|template| Dialog::Variables {
            choices: template.default_choices(),
            template,
        });
        Self {
            session,
            key_rx,
            injector,
            clipboard,
            _listener: listener,
            dialog,
            last_path: String::new(),
            shown_cursor: None,
        }
    }

    // ── Background input ─────────────────────────────────────────────────

    fn poll_keys(&mut self) {
        while let Ok(event) = self.key_rx.try_recv() {
            self.session.handle_key_event(&event, &mut self.injector);
        }
    }

    fn repaint_interval(&self) -> Duration {
        let watcher = self.session.watcher();
        if watcher.is_enabled() {
            KEY_POLL.min(watcher.interval())
        } else {
            KEY_POLL
        }
    }

    // ── Panels ───────────────────────────────────────────────────────────

    fn draw_menu(&self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        let has_selection = self.session.list().cursor().is_some();

        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Open…").clicked() {
                    actions.push(UiAction::OpenDialog(DialogKind::Open));
                    ui.close_menu();
                }
                if ui.button("Save…").clicked() {
                    actions.push(UiAction::OpenDialog(DialogKind::Save));
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("Quit").clicked() {
                    actions.push(UiAction::Quit);
                    ui.close_menu();
                }
            });

            ui.menu_button("Actions", |ui| {
                let entries = [
                    ("Copy", UiAction::CopyCurrent, true),
                    ("Copy & advance", UiAction::CopyAndAdvance, true),
                    ("Edit…", UiAction::OpenDialog(DialogKind::Edit), true),
                    (
                        "Insert before…",
                        UiAction::OpenDialog(DialogKind::Insert(InsertPosition::Before)),
                        false,
                    ),
                    (
                        "Insert after…",
                        UiAction::OpenDialog(DialogKind::Insert(InsertPosition::After)),
                        false,
                    ),
                    (
                        "Insert next…",
                        UiAction::OpenDialog(DialogKind::Insert(InsertPosition::Next)),
                        false,
                    ),
                    ("Move up", UiAction::MoveUp, true),
                    ("Move down", UiAction::MoveDown, true),
                    ("Delete", UiAction::Delete, true),
                ];
                for (label, action, needs_selection) in entries {
                    let enabled = has_selection || !needs_selection;
                    if ui.add_enabled(enabled, egui::Button::new(label)).clicked() {
                        actions.push(action);
                        ui.close_menu();
                    }
                }
                ui.separator();
                if ui.button("Delete all").clicked() {
                    actions.push(UiAction::DeleteAll);
                    ui.close_menu();
                }
            });

            ui.menu_button("Options", |ui| {
                let opts = self.session.list().options();
                let mut skip = opts.skip_comments;
                if ui.checkbox(&mut skip, "Skip comment lines").changed() {
                    actions.push(UiAction::SkipComments(skip));
                }
                let mut blanks = opts.allow_blank_lines;
                if ui.checkbox(&mut blanks, "Allow blank lines").changed() {
                    actions.push(UiAction::AllowBlankLines(blanks));
                }
                let mut reverse = opts.reverse;
                if ui.checkbox(&mut reverse, "Reverse direction").changed() {
                    actions.push(UiAction::Reverse(reverse));
                }
            });

            ui.menu_button("Help", |ui| {
                if ui.button("System info").clicked() {
                    actions.push(UiAction::SystemInfo);
                    ui.close_menu();
                }
                if ui.button("About").clicked() {
                    actions.push(UiAction::About);
                    ui.close_menu();
                }
            });
        });
    }

    fn draw_hotkeys(&self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        let binding = self.session.router().binding();

        egui::Grid::new("hotkeys").num_columns(4).show(ui, |ui| {
            for (i, action) in HotkeyAction::ALL.into_iter().enumerate() {
                let current = binding.key_for(action);
                let mut chosen = current;
                ui.label(action.label());
                egui::ComboBox::from_id_salt(("hotkey", i))
                    .selected_text(key_name(current))
                    .width(60.0)
                    .show_ui(ui, |ui| {
                        for (name, key) in FUNCTION_KEYS {
                            ui.selectable_value(&mut chosen, key, name);
                        }
                    });
                if chosen != current {
                    actions.push(UiAction::Rebind(action, chosen));
                }
                if i % 2 == 1 {
                    ui.end_row();
                }
            }
        });

        ui.horizontal(|ui| {
            let enabled = self.session.router().is_enabled();
            let label = if enabled {
                "Stop keyboard listener"
            } else {
                "Start keyboard listener"
            };
            if ui.button(label).clicked() {
                actions.push(UiAction::ToggleHook);
            }

            let mut hooked = self.session.watcher().is_enabled();
            if ui.checkbox(&mut hooked, "Hook clipboard").changed() {
                actions.push(UiAction::HookClipboard(hooked));
            }

            let opts = self.session.list().options();
            let mut skip = opts.skip_comments;
            if ui.checkbox(&mut skip, "Skip comments").changed() {
                actions.push(UiAction::SkipComments(skip));
            }
            let mut reverse = opts.reverse;
            if ui.checkbox(&mut reverse, "Reverse").changed() {
                actions.push(UiAction::Reverse(reverse));
            }
        });
    }

    fn draw_list(&mut self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        let list: &LineList = self.session.list();
        let cursor = list.cursor();
        let scroll = cursor != self.shown_cursor;

        egui::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                if list.is_empty() {
                    ui.weak("The list is empty. Use File → Open, Actions → Insert, or hook the clipboard.");
                }
                for (i, line) in list.lines().iter().enumerate() {
                    let selected = cursor == Some(i);
                    let mut text = egui::RichText::new(line.as_str()).monospace();
                    if is_comment(line) {
                        text = text.weak();
                    }
                    let resp = ui.selectable_label(selected, text);
                    if selected && scroll {
                        resp.scroll_to_me(Some(egui::Align::Center));
                    }
                    if resp.double_clicked() {
                        actions.push(UiAction::Select(i));
                        actions.push(UiAction::CopyCurrent);
                    } else if resp.clicked() {
                        actions.push(UiAction::Select(i));
                    }
                }
            });

        self.shown_cursor = cursor;
    }

    fn draw_status(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let list = self.session.list();
            ui.label(format!(
                "{} / {}",
                list.cursor().map_or(0, |c| c + 1),
                list.len()
            ));
            ui.separator();
            if let Some(notice) = self.session.notice() {
                let color = match notice.level {
                    NoticeLevel::Info => ui.visuals().text_color(),
                    NoticeLevel::Warning => ui.visuals().warn_fg_color,
                };
                ui.label(egui::RichText::new(notice.message.as_str()).color(color));
            }
        });
    }

    // ── Dialogs ──────────────────────────────────────────────────────────

    fn open_dialog(&mut self, kind: DialogKind) {
        self.dialog = match kind {
            DialogKind::Insert(position) => Some(Dialog::Insert {
                position,
                text: String::new(),
            }),
            DialogKind::Edit => match self.session.list().current_text() {
                Ok(text) => Some(Dialog::Edit {
                    text: text.to_owned(),
                }),
                Err(e) => {
                    self.session.notify(Notice::warning(e.to_string()));
                    None
                }
            },
            DialogKind::Open => Some(Dialog::Open {
                path: self.last_path.clone(),
            }),
            DialogKind::Save => Some(Dialog::Save {
                path: self.last_path.clone(),
            }),
        };
    }

    /// Show the open dialog, if any.  It is put back unless it was closed;
    /// an Open that found a template is followed by the variables dialog.
    fn draw_dialog(&mut self, ctx: &egui::Context) {
        let Some(mut dialog) = self.dialog.take() else {
            return;
        };
        let mut follow_up = None;
        let keep = match &mut dialog {
            Dialog::Insert { position, text } => {
                match text_prompt(ctx, position.title(), "Text to insert:", text) {
                    Prompt::Open => true,
                    Prompt::Cancel => false,
                    Prompt::Ok => {
                        let list = self.session.list_mut();
                        let text = std::mem::take(text);
                        match position {
                            InsertPosition::Before => list.insert_before(text),
                            InsertPosition::After => list.insert_after(text),
                            InsertPosition::Next => list.insert_next(text),
                        }
                        false
                    }
                }
            }
            Dialog::Edit { text } => match text_prompt(ctx, "Edit line", "Text:", text) {
                Prompt::Open => true,
                Prompt::Cancel => false,
                Prompt::Ok => {
                    let text = std::mem::take(text);
                    self.session.edit(|list| list.edit_current(text));
                    false
                }
            },
            Dialog::Open { path } => match text_prompt(ctx, "Open list", "File:", path) {
                Prompt::Open => true,
                Prompt::Cancel => false,
                Prompt::Ok => {
                    self.last_path = path.clone();
                    follow_up = self
                        .session
                        .begin_import(&PathBuf::from(path.as_str()))
                        .map(|template| Dialog::Variables {
                            choices: template.default_choices(),
                            template,
                        });
                    false
                }
            },
            Dialog::Save { path } => match text_prompt(ctx, "Save list", "File:", path) {
                Prompt::Open => true,
                Prompt::Cancel => false,
                Prompt::Ok => {
                    self.last_path = path.clone();
                    self.session.save(&PathBuf::from(path.as_str()));
                    false
                }
            },
            Dialog::Variables { template, choices } => match variables_prompt(ctx, template, choices) {
                Prompt::Open => true,
                Prompt::Cancel => {
                    self.session.notify(Notice::info("Import cancelled"));
                    false
                }
                Prompt::Ok => {
                    self.session.apply_template(template, choices);
                    false
                }
            },
            Dialog::Info { title, body } => {
                let mut open = true;
                let mut close = false;
                egui::Window::new(*title)
                    .collapsible(false)
                    .resizable(false)
                    .open(&mut open)
                    .show(ctx, |ui| {
                        ui.label(body.as_str());
                        if ui.button("OK").clicked() {
                            close = true;
                        }
                    });
                open && !close
            }
        };
        if keep {
            self.dialog = Some(dialog);
        } else {
            self.dialog = follow_up;
        }
    }

    // ── Actions ──────────────────────────────────────────────────────────

    fn apply(&mut self, action: UiAction, ctx: &egui::Context) {
        match action {
            UiAction::Select(i) => {
                self.session.list_mut().select(i);
            }
            UiAction::OpenDialog(kind) => self.open_dialog(kind),
            UiAction::CopyCurrent => {
                self.session.copy_current(&mut self.clipboard);
            }
            UiAction::CopyAndAdvance => {
                self.session.copy_and_advance(&mut self.clipboard);
            }
            UiAction::MoveUp => {
                self.session.edit(LineList::move_up);
            }
            UiAction::MoveDown => {
                self.session.edit(LineList::move_down);
            }
            UiAction::Delete => {
                self.session.edit(LineList::remove);
            }
            UiAction::DeleteAll => self.session.list_mut().clear(),
            UiAction::ToggleHook => {
                self.session.toggle_hook();
            }
            UiAction::HookClipboard(on) => self.session.set_clipboard_hook(on, &mut self.clipboard),
            UiAction::SkipComments(on) => self.session.list_mut().set_skip_comments(on),
            UiAction::AllowBlankLines(on) => self.session.list_mut().set_allow_blank_lines(on),
            UiAction::Reverse(on) => self.session.list_mut().set_reverse(on),
            UiAction::Rebind(action, key) => self.session.router().rebind(action, key),
            UiAction::SystemInfo => {
                self.dialog = Some(Dialog::Info {
                    title: "System info",
                    body: self.session.system_info(),
                });
            }
            UiAction::About => {
                self.dialog = Some(Dialog::Info {
                    title: "About",
                    body: format!(
                        "type-lines {}\n\nType a list of lines into the focused window,\none hotkey press at a time.",
                        env!("CARGO_PKG_VERSION")
                    ),
                });
            }
            UiAction::Quit => ctx.send_viewport_cmd(egui::ViewportCommand::Close),
        }
    }
}

// ---------------------------------------------------------------------------
// Prompt windows
// ---------------------------------------------------------------------------

enum Prompt {
    Open,
    Ok,
    Cancel,
}

/// Single-line text prompt.  ENTER confirms.
fn text_prompt(ctx: &egui::Context, title: &str, label: &str, text: &mut String) -> Prompt {
    let mut outcome = Prompt::Open;
    let mut open = true;
    egui::Window::new(title)
        .collapsible(false)
        .resizable(false)
        .open(&mut open)
        .show(ctx, |ui| {
            ui.label(label);
            let resp = ui.add(egui::TextEdit::singleline(text).desired_width(360.0));
            if ui.memory(|m| m.focused().is_none()) {
                resp.request_focus();
            }
            if resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                outcome = Prompt::Ok;
            }
            ui.horizontal(|ui| {
                if ui.button("OK").clicked() {
                    outcome = Prompt::Ok;
                }
                if ui.button("Cancel").clicked() {
                    outcome = Prompt::Cancel;
                }
            });
        });
    if open {
        outcome
    } else {
        Prompt::Cancel
    }
}

/// One row per variable: a combo box of declared values and a free-text
/// field holding the value that will be used.
fn variables_prompt(
    ctx: &egui::Context,
    template: &Template,
    choices: &mut VariableChoices,
) -> Prompt {
    let mut outcome = Prompt::Open;
    let mut open = true;
    egui::Window::new("Template variables")
        .collapsible(false)
        .open(&mut open)
        .show(ctx, |ui| {
            egui::Grid::new("variables").num_columns(3).show(ui, |ui| {
                for (i, (name, value)) in choices.entries_mut().enumerate() {
                    ui.label(name);
                    let candidates = template
                        .variables()
                        .get(name)
                        .map(|v| v.candidates.as_slice())
                        .unwrap_or_default();
                    egui::ComboBox::from_id_salt(("variable", i))
                        .selected_text(value.as_str())
                        .show_ui(ui, |ui| {
                            for candidate in candidates {
                                if ui
                                    .selectable_label(*value == *candidate, candidate.as_str())
                                    .clicked()
                                {
                                    *value = candidate.clone();
                                }
                            }
                        });
                    ui.text_edit_singleline(value);
                    ui.end_row();
                }
            });
            ui.horizontal(|ui| {
                if ui.button("Import").clicked() {
                    outcome = Prompt::Ok;
                }
                if ui.button("Cancel").clicked() {
                    outcome = Prompt::Cancel;
                }
            });
        });
    if open {
        outcome
    } else {
        Prompt::Cancel
    }
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for TypeLinesApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // --- Background input ---------------------------------------------
        self.poll_keys();
        self.session.poll_clipboard(&mut self.clipboard, Instant::now());
        ctx.request_repaint_after(self.repaint_interval());

        // --- Render -------------------------------------------------------
        let mut actions = Vec::new();

        egui::TopBottomPanel::top("menu").show(ctx, |ui| {
            self.draw_menu(ui, &mut actions);
            ui.add_space(4.0);
            self.draw_hotkeys(ui, &mut actions);
            ui.add_space(4.0);
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            self.draw_status(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_list(ui, &mut actions);
        });

        self.draw_dialog(ctx);

        // --- Apply --------------------------------------------------------
        for action in actions {
            self.apply(action, ctx);
        }
    }
}
