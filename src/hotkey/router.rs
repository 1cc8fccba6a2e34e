//! [`HotkeyRouter`] maps key presses onto list and typing actions.
//!
//! The router has two states, enabled and disabled.  While disabled every
//! event is ignored.  While enabled a press of one of the four bound keys
//! runs its action; any other key passes through untouched.
//!
//! [`KeyFilter`] is the part of the router that the capture thread can see.
//! It shares the enabled flag and the binding with the router, and answers
//! the one question the capture thread is allowed to ask: *should this event
//! be hidden from other applications?*

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, PoisonError, RwLock,
};

use thiserror::Error;

use crate::inject::{InjectError, TextSink};
use crate::lines::{LineList, ListError};

use super::{HotkeyAction, HotkeyBinding, KeyEvent};

// ---------------------------------------------------------------------------
// KeyFilter
// ---------------------------------------------------------------------------

/// Thread-safe view of the hook state, cheap to clone into the capture thread.
#[derive(Debug, Clone)]
pub struct KeyFilter {
    enabled: Arc<AtomicBool>,
    binding: Arc<RwLock<HotkeyBinding>>,
    /// Keys whose press was swallowed and whose release is still pending.
    held: Arc<Mutex<Vec<rdev::Key>>>,
}

impl KeyFilter {
    fn new(binding: HotkeyBinding, enabled: bool) -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(enabled)),
            binding: Arc::new(RwLock::new(binding)),
            held: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn binding(&self) -> HotkeyBinding {
        *self.binding.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// `true` if `key` is one of the four bound keys.
    pub fn is_bound(&self, key: rdev::Key) -> bool {
        self.binding().is_bound(key)
    }

    /// Decide whether `event` should be hidden from other applications.
    ///
    /// A press is swallowed only while enabled and only for a bound key.  A
    /// release is swallowed exactly when its press was, regardless of what
    /// happened to the enabled flag in between, so the focused application
    /// never sees half of a key stroke.
    pub fn should_suppress(&self, event: &KeyEvent) -> bool {
        let mut held = self.held.lock().unwrap_or_else(PoisonError::into_inner);
        match *event {
            KeyEvent::Pressed(key) => {
                if held.contains(&key) {
                    // auto-repeat
                    return true;
                }
                if self.is_enabled() && self.is_bound(key) {
                    held.push(key);
                    true
                } else {
                    false
                }
            }
            KeyEvent::Released(key) => match held.iter().position(|k| *k == key) {
                Some(pos) => {
                    held.remove(pos);
                    true
                }
                None => false,
            },
        }
    }

    /// Whether the capture thread should bother forwarding `event`.
    pub fn is_relevant(&self, event: &KeyEvent) -> bool {
        self.is_bound(event.key())
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// A hotkey action that could not complete.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    NoSelection(#[from] ListError),

    #[error("typing failed: {0}")]
    Injection(#[from] InjectError),
}

/// What the router did with one event.
#[derive(Debug)]
pub enum Dispatch {
    /// The hook is disabled; nothing happened.
    Ignored,
    /// Not a bound key press (or a release); the event is not ours.
    PassedThrough,
    /// The action ran to completion.
    Handled(HotkeyAction),
    /// The action failed; list and cursor are unchanged.
    Failed(HotkeyAction, DispatchError),
}

// ---------------------------------------------------------------------------
// HotkeyRouter
// ---------------------------------------------------------------------------

/// Routes key events to [`HotkeyAction`]s.
#[derive(Debug, Clone)]
pub struct HotkeyRouter {
    filter: KeyFilter,
}

impl HotkeyRouter {
    pub fn new(binding: HotkeyBinding, enabled: bool) -> Self {
        Self {
            filter: KeyFilter::new(binding, enabled),
        }
    }

    /// Shared handle for the capture thread.
    pub fn filter(&self) -> KeyFilter {
        self.filter.clone()
    }

    pub fn is_enabled(&self) -> bool {
        self.filter.is_enabled()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.filter.enabled.store(enabled, Ordering::SeqCst);
        log::info!(
            "hotkey: keyboard hook {}",
            if enabled { "enabled" } else { "disabled" }
        );
    }

    /// Flip the enabled flag and return the new state.
    pub fn toggle(&self) -> bool {
        let enabled = !self.is_enabled();
        self.set_enabled(enabled);
        enabled
    }

    pub fn binding(&self) -> HotkeyBinding {
        self.filter.binding()
    }

    pub fn rebind(&self, action: HotkeyAction, key: rdev::Key) {
        let mut binding = self
            .filter
            .binding
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        binding.set(action, key);
        log::info!("hotkey: {} bound to {:?}", action.label(), key);
    }

    /// `true` if `key` is one of the four bound keys.
    pub fn is_bound_key(&self, key: rdev::Key) -> bool {
        self.filter.is_bound(key)
    }

    /// The action a given event would trigger right now, if any.
    pub fn action_for(&self, event: &KeyEvent) -> Option<HotkeyAction> {
        match *event {
            KeyEvent::Pressed(key) if self.is_enabled() => self.binding().action_for(key),
            _ => None,
        }
    }

    /// Run the action bound to `event` against `list`, typing through `sink`.
    ///
    /// Typing blocks until `sink` returns.  A failed action leaves `list`
    /// exactly as it was.
    pub fn dispatch(
        &self,
        event: &KeyEvent,
        list: &mut LineList,
        sink: &mut dyn TextSink,
    ) -> Dispatch {
        if !self.is_enabled() {
            return Dispatch::Ignored;
        }
        let Some(action) = self.action_for(event) else {
            return Dispatch::PassedThrough;
        };
        log::debug!("hotkey: {:?} → {}", event.key(), action.label());

        let result = match action {
            HotkeyAction::TypeAndAdvance => {
                let typed = type_current(list, sink);
                if typed.is_ok() {
                    list.effective_advance();
                }
                typed
            }
            HotkeyAction::TypeAndStay => type_current(list, sink),
            HotkeyAction::SelectNext => {
                list.effective_advance();
                Ok(())
            }
            HotkeyAction::SelectPrevious => {
                list.effective_retreat();
                Ok(())
            }
        };

        match result {
            Ok(()) => Dispatch::Handled(action),
            Err(e) => Dispatch::Failed(action, e),
        }
    }
}

fn type_current(list: &LineList, sink: &mut dyn TextSink) -> Result<(), DispatchError> {
    let text = list.current_text()?;
    sink.type_text(text)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lines::ListOptions;
    use rdev::Key;

    #[derive(Default)]
    struct RecordingSink {
        typed: Vec<String>,
        fail: bool,
    }

    impl TextSink for RecordingSink {
        fn type_text(&mut self, text: &str) -> Result<(), InjectError> {
            if self.fail {
                return Err(InjectError::Typing("permission denied".into()));
            }
            self.typed.push(text.to_owned());
            Ok(())
        }
    }

    fn list() -> LineList {
        LineList::with_lines(
            vec!["one".into(), "two".into(), "three".into()],
            ListOptions::default(),
        )
    }

    fn router() -> HotkeyRouter {
        HotkeyRouter::new(HotkeyBinding::default(), true)
    }

    #[test]
    fn type_and_advance_types_then_moves() {
        let (r, mut l, mut sink) = (router(), list(), RecordingSink::default());
        let out = r.dispatch(&KeyEvent::Pressed(Key::F3), &mut l, &mut sink);
        assert!(matches!(out, Dispatch::Handled(HotkeyAction::TypeAndAdvance)));
        assert_eq!(sink.typed, ["one"]);
        assert_eq!(l.cursor(), Some(1));
    }

    #[test]
    fn type_and_stay_does_not_move() {
        let (r, mut l, mut sink) = (router(), list(), RecordingSink::default());
        r.dispatch(&KeyEvent::Pressed(Key::F4), &mut l, &mut sink);
        r.dispatch(&KeyEvent::Pressed(Key::F4), &mut l, &mut sink);
        assert_eq!(sink.typed, ["one", "one"]);
        assert_eq!(l.cursor(), Some(0));
    }

    #[test]
    fn select_keys_cycle_without_typing() {
        let (r, mut l, mut sink) = (router(), list(), RecordingSink::default());
        r.dispatch(&KeyEvent::Pressed(Key::F5), &mut l, &mut sink);
        assert_eq!(l.cursor(), Some(2));
        r.dispatch(&KeyEvent::Pressed(Key::F6), &mut l, &mut sink);
        assert_eq!(l.cursor(), Some(0));
        assert!(sink.typed.is_empty());
    }

    #[test]
    fn reverse_direction_flips_type_and_advance() {
        let (r, mut l, mut sink) = (router(), list(), RecordingSink::default());
        l.set_reverse(true);
        r.dispatch(&KeyEvent::Pressed(Key::F3), &mut l, &mut sink);
        assert_eq!(l.cursor(), Some(2));
    }

    #[test]
    fn unbound_keys_and_releases_pass_through() {
        let (r, mut l, mut sink) = (router(), list(), RecordingSink::default());
        let out = r.dispatch(&KeyEvent::Pressed(Key::KeyA), &mut l, &mut sink);
        assert!(matches!(out, Dispatch::PassedThrough));
        let out = r.dispatch(&KeyEvent::Released(Key::F3), &mut l, &mut sink);
        assert!(matches!(out, Dispatch::PassedThrough));
        assert_eq!(l.cursor(), Some(0));
    }

    #[test]
    fn disabled_router_ignores_bound_keys() {
        let (r, mut l, mut sink) = (router(), list(), RecordingSink::default());
        assert!(!r.toggle());
        for key in [Key::F3, Key::F4, Key::F5, Key::F6] {
            let out = r.dispatch(&KeyEvent::Pressed(key), &mut l, &mut sink);
            assert!(matches!(out, Dispatch::Ignored));
        }
        assert!(sink.typed.is_empty());
        assert_eq!(l.cursor(), Some(0));
    }

    #[test]
    fn empty_list_reports_no_selection() {
        let r = router();
        let mut l = LineList::new(ListOptions::default());
        let mut sink = RecordingSink::default();
        let out = r.dispatch(&KeyEvent::Pressed(Key::F3), &mut l, &mut sink);
        assert!(matches!(
            out,
            Dispatch::Failed(HotkeyAction::TypeAndAdvance, DispatchError::NoSelection(_))
        ));
    }

    #[test]
    fn injection_failure_leaves_cursor_unchanged() {
        let (r, mut l) = (router(), list());
        let mut sink = RecordingSink {
            fail: true,
            ..Default::default()
        };
        let out = r.dispatch(&KeyEvent::Pressed(Key::F3), &mut l, &mut sink);
        assert!(matches!(out, Dispatch::Failed(_, DispatchError::Injection(_))));
        assert_eq!(l.cursor(), Some(0));
    }

    #[test]
    fn rebind_takes_effect_for_filter_too() {
        let r = router();
        let filter = r.filter();
        r.rebind(HotkeyAction::TypeAndAdvance, Key::F9);
        assert!(filter.is_bound(Key::F9));
        assert!(!r.is_bound_key(Key::F3));
    }

    // ---- suppression ---

    #[test]
    fn filter_suppresses_only_bound_keys_while_enabled() {
        let r = router();
        let f = r.filter();
        assert!(f.should_suppress(&KeyEvent::Pressed(Key::F3)));
        assert!(f.should_suppress(&KeyEvent::Released(Key::F3)));
        assert!(!f.should_suppress(&KeyEvent::Pressed(Key::KeyA)));
        assert!(!f.should_suppress(&KeyEvent::Released(Key::KeyA)));

        r.set_enabled(false);
        assert!(!f.should_suppress(&KeyEvent::Pressed(Key::F3)));
        assert!(!f.should_suppress(&KeyEvent::Released(Key::F3)));
    }

    #[test]
    fn release_follows_its_press_across_toggle() {
        let r = router();
        let f = r.filter();
        assert!(f.should_suppress(&KeyEvent::Pressed(Key::F4)));
        r.set_enabled(false);
        assert!(f.should_suppress(&KeyEvent::Released(Key::F4)));

        assert!(!f.should_suppress(&KeyEvent::Pressed(Key::F4)));
        r.set_enabled(true);
        assert!(!f.should_suppress(&KeyEvent::Released(Key::F4)));
    }

    #[test]
    fn auto_repeat_stays_suppressed() {
        let f = router().filter();
        assert!(f.should_suppress(&KeyEvent::Pressed(Key::F6)));
        assert!(f.should_suppress(&KeyEvent::Pressed(Key::F6)));
        assert!(f.should_suppress(&KeyEvent::Released(Key::F6)));
        assert!(!f.should_suppress(&KeyEvent::Released(Key::F6)));
    }
}
