//! Full-screen overlays and the key-press stop wrapper

use std::rc::Rc;

use crate::animation::{Frame, FrameUnit};
use crate::highscores::HighScoresTable;
use crate::platform::{Key, Keyboard};
use crate::renderer::{Rgb, Surface};
use crate::sim::geometry::{Aabb, Point};

const BACKGROUND_IMAGE: &str = "background_images/space.jpg";

fn fill_screen(surface: &mut dyn Surface, color: Rgb) {
    let screen = Aabb::from_xywh(0.0, 0.0, surface.width(), surface.height());
    surface.fill_rect(&screen, color);
}

/// Runs `inner` until `key` is pressed.
///
/// A key already held down when the wrapper starts must be released first,
/// so one press cannot dismiss several screens in a row.
pub struct KeyPressStoppable<U> {
    keyboard: Rc<dyn Keyboard>,
    key: Key,
    inner: U,
    already_pressed: bool,
    stop: bool,
}

impl<U: FrameUnit> KeyPressStoppable<U> {
    pub fn new(keyboard: Rc<dyn Keyboard>, key: Key, inner: U) -> Self {
        Self {
            keyboard,
            key,
            inner,
            already_pressed: true,
            stop: false,
        }
    }
}

impl<U: FrameUnit> FrameUnit for KeyPressStoppable<U> {
    fn do_one_frame(&mut self, frame: &mut Frame<'_>) {
        self.inner.do_one_frame(frame);
        if self.keyboard.is_pressed(self.key) {
            if !self.already_pressed {
                self.stop = true;
            }
        } else {
            self.already_pressed = false;
        }
    }

    fn should_stop(&self) -> bool {
        self.stop
    }
}

/// Never stops on its own; wrap in `KeyPressStoppable`
#[derive(Debug, Default)]
pub struct PauseScreen;

impl FrameUnit for PauseScreen {
    fn do_one_frame(&mut self, frame: &mut Frame<'_>) {
        let surface = frame.surface();
        fill_screen(surface, Rgb::BLACK);
        surface.draw_image(Point::new(0.0, 0.0), BACKGROUND_IMAGE);
        let at = Point::new(165.0, surface.height() / 2.0);
        surface.draw_text(at, "Paused -- press \"c\" to continue", 32, Rgb::SHIELD);
    }

    fn should_stop(&self) -> bool {
        false
    }
}

/// Game over with the final score
#[derive(Debug)]
pub struct EndScreen {
    score: i64,
}

impl EndScreen {
    pub fn new(score: i64) -> Self {
        Self { score }
    }
}

impl FrameUnit for EndScreen {
    fn do_one_frame(&mut self, frame: &mut Frame<'_>) {
        let surface = frame.surface();
        fill_screen(surface, Rgb::BLACK);
        surface.draw_text(Point::new(170.0, 200.0), "Game Over", 90, Rgb::WHITE);
        surface.draw_text(
            Point::new(240.0, 330.0),
            &format!("Your score is: {}", self.score),
            40,
            Rgb::WHITE,
        );
        surface.draw_text(Point::new(260.0, 550.0), "Press \"c\" to continue", 30, Rgb::WHITE);
    }

    fn should_stop(&self) -> bool {
        false
    }
}

/// Leaderboard listing
#[derive(Debug)]
pub struct HighScoresScreen {
    table: HighScoresTable,
}

impl HighScoresScreen {
    pub fn new(table: HighScoresTable) -> Self {
        Self { table }
    }
}

impl FrameUnit for HighScoresScreen {
    fn do_one_frame(&mut self, frame: &mut Frame<'_>) {
        let surface = frame.surface();
        fill_screen(surface, Rgb::BLACK);
        surface.draw_image(Point::new(0.0, 0.0), BACKGROUND_IMAGE);
        surface.fill_rect(&Aabb::from_xywh(130.0, 175.0, 550.0, 330.0), Rgb::DARK_GRAY);

        let (x, mut y) = (170.0, 220.0);
        surface.draw_text(Point::new(x, y), "Player Name", 32, Rgb::SHIELD);
        surface.draw_text(Point::new(x + 390.0, y), "Score", 32, Rgb::SHIELD);
        y += 10.0;
        for entry in self.table.entries() {
            y += 50.0;
            surface.draw_text(Point::new(x + 10.0, y), &entry.name, 26, Rgb::SHIELD);
            surface.draw_text(Point::new(x + 400.0, y), &entry.score.to_string(), 26, Rgb::SHIELD);
        }
        surface.draw_text(Point::new(150.0, 560.0), "Press space to continue", 30, Rgb::SHIELD);
    }

    fn should_stop(&self) -> bool {
        true
    }
}
