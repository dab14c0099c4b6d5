//! Platform abstraction layer
//!
//! Handles host differences for:
//! - Time (wall clock, sleeping, cooldowns)
//! - Input events (keyboard state)

pub mod input;
pub mod time;

pub use input::{AutopilotKeyboard, Key, Keyboard, ScriptedKeyboard};
pub use time::{Clock, Cooldown, ManualClock, SystemClock};
