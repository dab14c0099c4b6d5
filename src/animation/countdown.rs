//! Pre-turn countdown drawn over the frozen level

use std::rc::Rc;

use crate::animation::{Frame, FrameUnit};
use crate::platform::Clock;
use crate::renderer::{Drawable, Rgb};
use crate::sim::geometry::Point;

const TEXT_SIZE: u32 = 100;

/// Counts down from `count_from` to 1 over `seconds` of wall-clock time,
/// each number shown for an equal share.
pub struct Countdown<'a> {
    backdrop: &'a dyn Drawable,
    clock: Rc<dyn Clock>,
    started_ms: u64,
    per_number_ms: u64,
    count_from: u32,
    current: u32,
}

impl<'a> Countdown<'a> {
    pub fn new(
        seconds: f64,
        count_from: u32,
        backdrop: &'a dyn Drawable,
        clock: Rc<dyn Clock>,
    ) -> Self {
        let total_ms = (seconds.max(0.0) * 1000.0) as u64;
        let count_from = count_from.max(1);
        Self {
            backdrop,
            started_ms: clock.now_millis(),
            clock,
            per_number_ms: total_ms / u64::from(count_from),
            count_from,
            current: count_from,
        }
    }

    /// Number currently on screen (0 once finished)
    pub fn current(&self) -> u32 {
        self.current
    }
}

impl FrameUnit for Countdown<'_> {
    fn do_one_frame(&mut self, frame: &mut Frame<'_>) {
        let surface = frame.surface();
        self.backdrop.draw_on(surface);
        let at = Point::new(surface.width() / 2.0 - 20.0, surface.height() / 2.0 + 20.0);
        surface.draw_text(at, &self.current.to_string(), TEXT_SIZE, Rgb::WHITE);

        let elapsed = self.clock.now_millis().saturating_sub(self.started_ms);
        let shown = u64::from(self.count_from - self.current + 1);
        if elapsed >= self.per_number_ms * shown {
            self.current -= 1;
        }
    }

    fn should_stop(&self) -> bool {
        self.current == 0
    }
}
