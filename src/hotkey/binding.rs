//! The four hotkey actions and the keys bound to them.

use crate::config::HotkeyConfig;

use super::parse_key;

/// What a bound key does when pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyAction {
    /// Type the selected line, then move on.
    TypeAndAdvance,
    /// Type the selected line and keep it selected.
    TypeAndStay,
    /// Move on without typing.
    SelectNext,
    /// Move back without typing.
    SelectPrevious,
}

impl HotkeyAction {
    /// Match priority when several actions share one key.
    pub const ALL: [HotkeyAction; 4] = [
        HotkeyAction::TypeAndAdvance,
        HotkeyAction::TypeAndStay,
        HotkeyAction::SelectNext,
        HotkeyAction::SelectPrevious,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            HotkeyAction::TypeAndAdvance => "Type & Advance",
            HotkeyAction::TypeAndStay => "Type & Stay",
            HotkeyAction::SelectNext => "Move to next line",
            HotkeyAction::SelectPrevious => "Move to previous line",
        }
    }
}

/// Physical key for each [`HotkeyAction`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HotkeyBinding {
    pub type_and_advance: rdev::Key,
    pub type_and_stay: rdev::Key,
    pub select_next: rdev::Key,
    pub select_previous: rdev::Key,
}

impl Default for HotkeyBinding {
    fn default() -> Self {
        Self {
            type_and_advance: rdev::Key::F3,
            type_and_stay: rdev::Key::F4,
            select_previous: rdev::Key::F5,
            select_next: rdev::Key::F6,
        }
    }
}

impl HotkeyBinding {
    /// Build from config key names.  Unparseable names keep the default key
    /// for that action and log a warning.
    pub fn from_config(config: &HotkeyConfig) -> Self {
        let mut binding = Self::default();
        let names = [
            (HotkeyAction::TypeAndAdvance, &config.type_and_advance),
            (HotkeyAction::TypeAndStay, &config.type_and_stay),
            (HotkeyAction::SelectNext, &config.select_next),
            (HotkeyAction::SelectPrevious, &config.select_previous),
        ];
        for (action, name) in names {
            match parse_key(name) {
                Some(key) => binding.set(action, key),
                None => log::warn!(
                    "hotkey: unknown key {name:?} for {}, keeping {:?}",
                    action.label(),
                    binding.key_for(action)
                ),
            }
        }
        binding
    }

    pub fn key_for(&self, action: HotkeyAction) -> rdev::Key {
        match action {
            HotkeyAction::TypeAndAdvance => self.type_and_advance,
            HotkeyAction::TypeAndStay => self.type_and_stay,
            HotkeyAction::SelectNext => self.select_next,
            HotkeyAction::SelectPrevious => self.select_previous,
        }
    }

    pub fn set(&mut self, action: HotkeyAction, key: rdev::Key) {
        match action {
            HotkeyAction::TypeAndAdvance => self.type_and_advance = key,
            HotkeyAction::TypeAndStay => self.type_and_stay = key,
            HotkeyAction::SelectNext => self.select_next = key,
            HotkeyAction::SelectPrevious => self.select_previous = key,
        }
    }

    /// First action (in [`HotkeyAction::ALL`] order) bound to `key`.
    pub fn action_for(&self, key: rdev::Key) -> Option<HotkeyAction> {
        HotkeyAction::ALL
            .into_iter()
            .find(|action| self.key_for(*action) == key)
    }

    pub fn is_bound(&self, key: rdev::Key) -> bool {
        self.action_for(key).is_some()
    }
}
