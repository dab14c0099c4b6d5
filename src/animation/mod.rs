//! Fixed frame-rate scheduling
//!
//! A `FrameScheduler` runs one `FrameUnit` at a time until it asks to stop.
//! Units nest: a unit may run another unit to completion from inside its own
//! frame (pause overlay, countdown), suspending the outer loop meanwhile.
//! Everything happens on one thread.

pub mod countdown;
pub mod overlays;
pub mod runner;

pub use countdown::Countdown;
pub use overlays::{EndScreen, HighScoresScreen, KeyPressStoppable, PauseScreen};
pub use runner::{Frame, FrameScheduler, FrameUnit};
