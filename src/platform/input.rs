//! Keyboard input collaborator

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use super::time::Clock;

/// Keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    /// Fire (also dismisses the high-score screen)
    Space,
    /// `p`
    Pause,
    /// `c`
    Continue,
}

/// Polled key state
pub trait Keyboard {
    fn is_pressed(&self, key: Key) -> bool;
}

/// Keyboard driven by explicit press/release calls
#[derive(Debug, Default)]
pub struct ScriptedKeyboard {
    pressed: RefCell<HashSet<Key>>,
}

impl ScriptedKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&self, key: Key) {
        self.pressed.borrow_mut().insert(key);
    }

    pub fn release(&self, key: Key) {
        self.pressed.borrow_mut().remove(&key);
    }

    pub fn release_all(&self) {
        self.pressed.borrow_mut().clear();
    }
}

impl Keyboard for ScriptedKeyboard {
    fn is_pressed(&self, key: Key) -> bool {
        self.pressed.borrow().contains(&key)
    }
}

/// Demo player: sweeps the paddle back and forth, taps fire,
/// and taps `c` so end screens get dismissed.
pub struct AutopilotKeyboard {
    clock: Rc<dyn Clock>,
}

impl AutopilotKeyboard {
    /// Full left-to-right sweep period
    const SWEEP_MS: u64 = 3_000;
    const TAP_MS: u64 = 250;

    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl Keyboard for AutopilotKeyboard {
    fn is_pressed(&self, key: Key) -> bool {
        let now = self.clock.now_millis();
        let tap = (now / Self::TAP_MS) % 2 == 0;
        let sweeping_left = (now / (Self::SWEEP_MS / 2)) % 2 == 0;
        match key {
            Key::Left => sweeping_left,
            Key::Right => !sweeping_left,
            Key::Space | Key::Continue => tap,
            Key::Pause => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::time::ManualClock;

    #[test]
    fn test_scripted_keyboard() {
        let kb = ScriptedKeyboard::new();
        assert!(!kb.is_pressed(Key::Space));
        kb.press(Key::Space);
        kb.press(Key::Left);
        assert!(kb.is_pressed(Key::Space));
        kb.release(Key::Space);
        assert!(!kb.is_pressed(Key::Space));
        kb.release_all();
        assert!(!kb.is_pressed(Key::Left));
    }

    #[test]
    fn test_autopilot_taps_and_sweeps() {
        let clock = Rc::new(ManualClock::new());
        let kb = AutopilotKeyboard::new(clock.clone());
        assert!(kb.is_pressed(Key::Space));
        assert!(kb.is_pressed(Key::Left));
        assert!(!kb.is_pressed(Key::Pause));

        clock.advance_millis(250);
        assert!(!kb.is_pressed(Key::Continue));

        clock.advance_millis(1_500);
        assert!(kb.is_pressed(Key::Right));
    }
}
