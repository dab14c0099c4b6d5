//! Velocity as a per-second rate of change

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::geometry::Point;

/// Change in position per second. Positive `dy` moves down the screen.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Velocity {
    pub dx: f64,
    pub dy: f64,
}

impl Velocity {
    pub const ZERO: Velocity = Velocity { dx: 0.0, dy: 0.0 };

    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Build from a heading in degrees (0 = up, 90 = right) and a speed.
    /// Any heading is accepted and folded into [0, 360).
    pub fn from_angle_and_speed(angle_degrees: f64, speed: f64) -> Self {
        let angle = crate::normalize_degrees(angle_degrees).to_radians();
        Self {
            dx: speed * angle.sin(),
            dy: -speed * angle.cos(),
        }
    }

    #[inline]
    pub fn as_vec(self) -> DVec2 {
        DVec2::new(self.dx, self.dy)
    }

    pub fn speed(self) -> f64 {
        self.as_vec().length()
    }

    pub fn is_zero(self) -> bool {
        self.dx == 0.0 && self.dy == 0.0
    }

    /// Position reached from `p` after `dt` seconds
    pub fn apply_to_point(self, p: Point, dt: f64) -> Point {
        Point::from(p.as_vec() + self.as_vec() * dt)
    }
}
