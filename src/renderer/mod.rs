//! Drawing contract
//!
//! The simulation never inspects what gets drawn. Every drawable renders itself
//! onto a `Surface` once per frame; the concrete surface (window, canvas, log)
//! lives outside the core.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::consts::{SURFACE_HEIGHT, SURFACE_WIDTH};
use crate::sim::geometry::{Aabb, Point};

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const RED: Rgb = Rgb(255, 0, 0);
    pub const BORDER: Rgb = Rgb(255, 255, 204);
    pub const SHIELD: Rgb = Rgb(255, 30, 0);
    pub const DARK_GRAY: Rgb = Rgb(64, 64, 64);
}

/// How a rectangle is filled: a flat color or a named image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Skin {
    Color(Rgb),
    Image(String),
}

impl Default for Skin {
    fn default() -> Self {
        Skin::Color(Rgb::BLACK)
    }
}

impl Skin {
    pub fn paint(&self, surface: &mut dyn Surface, rect: &Aabb) {
        match self {
            Skin::Color(color) => surface.fill_rect(rect, *color),
            Skin::Image(name) => surface.draw_image(rect.upper_left(), name),
        }
    }
}

/// Render target supplied by the presentation layer
pub trait Surface {
    fn width(&self) -> f64 {
        SURFACE_WIDTH
    }

    fn height(&self) -> f64 {
        SURFACE_HEIGHT
    }

    fn fill_rect(&mut self, rect: &Aabb, color: Rgb);

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgb);

    fn draw_image(&mut self, at: Point, image: &str);

    fn draw_text(&mut self, at: Point, text: &str, size: u32, color: Rgb);

    /// Called by the scheduler after each frame
    fn present(&mut self) {}
}

/// Shared surface, so a caller can inspect what a scheduler drew
impl<S: Surface> Surface for Rc<RefCell<S>> {
    fn width(&self) -> f64 {
        self.borrow().width()
    }

    fn height(&self) -> f64 {
        self.borrow().height()
    }

    fn fill_rect(&mut self, rect: &Aabb, color: Rgb) {
        self.borrow_mut().fill_rect(rect, color);
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgb) {
        self.borrow_mut().fill_circle(center, radius, color);
    }

    fn draw_image(&mut self, at: Point, image: &str) {
        self.borrow_mut().draw_image(at, image);
    }

    fn draw_text(&mut self, at: Point, text: &str, size: u32, color: Rgb) {
        self.borrow_mut().draw_text(at, text, size, color);
    }

    fn present(&mut self) {
        self.borrow_mut().present();
    }
}

/// Anything that can render itself
pub trait Drawable {
    fn draw_on(&self, surface: &mut dyn Surface);
}

/// Discards all drawing; counts presented frames
#[derive(Debug, Default)]
pub struct NullSurface {
    pub frames: u64,
}

impl Surface for NullSurface {
    fn fill_rect(&mut self, _rect: &Aabb, _color: Rgb) {}

    fn fill_circle(&mut self, _center: Point, _radius: f64, _color: Rgb) {}

    fn draw_image(&mut self, _at: Point, _image: &str) {}

    fn draw_text(&mut self, _at: Point, _text: &str, _size: u32, _color: Rgb) {}

    fn present(&mut self) {
        self.frames += 1;
    }
}

/// A recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Rect(Aabb, Rgb),
    Circle(Point, f64, Rgb),
    Image(Point, String),
    Text(Point, String),
}

/// Keeps the draw calls of the frame in progress, for headless inspection
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub frames: u64,
    pub current: Vec<DrawCommand>,
    pub last_frame: Vec<DrawCommand>,
}

impl RecordingSurface {
    /// Text drawn during the last presented frame
    pub fn last_texts(&self) -> Vec<&str> {
        self.last_frame
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Text(_, text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn fill_rect(&mut self, rect: &Aabb, color: Rgb) {
        self.current.push(DrawCommand::Rect(*rect, color));
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgb) {
        self.current.push(DrawCommand::Circle(center, radius, color));
    }

    fn draw_image(&mut self, at: Point, image: &str) {
        self.current.push(DrawCommand::Image(at, image.to_string()));
    }

    fn draw_text(&mut self, at: Point, text: &str, _size: u32, _color: Rgb) {
        self.current.push(DrawCommand::Text(at, text.to_string()));
    }

    fn present(&mut self) {
        self.frames += 1;
        self.last_frame = std::mem::take(&mut self.current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skin_paint_dispatch() {
        let mut surface = RecordingSurface::default();
        let rect = Aabb::from_xywh(0.0, 0.0, 5.0, 5.0);
        Skin::Color(Rgb::RED).paint(&mut surface, &rect);
        Skin::Image("enemy".into()).paint(&mut surface, &rect);
        surface.present();

        assert_eq!(surface.frames, 1);
        assert_eq!(surface.last_frame[0], DrawCommand::Rect(rect, Rgb::RED));
        assert_eq!(
            surface.last_frame[1],
            DrawCommand::Image(Point::new(0.0, 0.0), "enemy".into())
        );
        assert!(surface.current.is_empty());
    }
}
