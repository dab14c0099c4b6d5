//! Moving circular body
//!
//! Each tick the ball traces a straight trajectory from its center. If that
//! trajectory crosses an obstacle, the ball stops at the contact point, backs
//! off one radius on each axis against its direction of travel, and takes
//! whatever velocity the struck obstacle hands back.

use serde::{Deserialize, Serialize};

use super::collision::{BallId, Collidable, CollisionIndex, CollisionInfo};
use super::events::HitEvent;
use super::geometry::{Point, Segment};
use super::velocity::Velocity;
use crate::renderer::{Drawable, Rgb, Surface};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: BallId,
    pub center: Point,
    pub radius: f64,
    pub velocity: Velocity,
    pub color: Rgb,
}

impl Ball {
    pub fn new(id: BallId, center: Point, radius: f64, velocity: Velocity, color: Rgb) -> Self {
        Self {
            id,
            center,
            radius,
            velocity,
            color,
        }
    }

    /// Path the ball would trace during `dt` with nothing in the way
    pub fn trajectory(&self, dt: f64) -> Segment {
        Segment::new(self.center, self.velocity.apply_to_point(self.center, dt))
    }

    /// Advance one tick. Returns the hit to broadcast, if the ball struck something.
    pub fn move_one_step<C: Collidable>(
        &mut self,
        index: &mut CollisionIndex<C>,
        dt: f64,
    ) -> Option<HitEvent> {
        let contact = self.embedded_contact(index).or_else(|| {
            index.nearest_collision_from(&self.trajectory(dt), self.center)
        });
        let Some(CollisionInfo { point, collider }) = contact else {
            self.center = self.velocity.apply_to_point(self.center, dt);
            return None;
        };

        let dir_x = if self.velocity.dx < 0.0 { -1.0 } else { 1.0 };
        let dir_y = if self.velocity.dy < 0.0 { -1.0 } else { 1.0 };
        self.center = Point::new(point.x - self.radius * dir_x, point.y - self.radius * dir_y);

        let before = self.velocity;
        let obstacle = index.get_mut(collider)?;
        let response = obstacle.hit(self.id, point, before, dt);
        self.velocity = response.velocity;

        // Anti-stuck: still level with the obstacle on either axis, take one more step
        let shape = obstacle.collision_shape();
        if shape.spans_x(self.center.x) || shape.spans_y(self.center.y) {
            self.center = self.velocity.apply_to_point(self.center, dt);
        }

        Some(HitEvent {
            struck: collider,
            target: response.target,
            hitter: self.id,
            hitter_velocity: before,
            point,
        })
    }

    /// An obstacle that moved onto the ball counts as struck at once. The
    /// contact is where the ball's path, traced backwards, leaves the obstacle.
    fn embedded_contact<C: Collidable>(&self, index: &CollisionIndex<C>) -> Option<CollisionInfo> {
        let collider = index.containing(self.center)?;
        let shape = index.get(collider)?.collision_shape();
        let reach = shape.width() + shape.height();
        let back = self.center.as_vec() - self.velocity.as_vec().normalize_or_zero() * reach;
        let point = Segment::new(self.center, Point::from(back))
            .nearest_intersection_to(shape, self.center)
            .unwrap_or(self.center);
        Some(CollisionInfo { point, collider })
    }
}

impl Drawable for Ball {
    fn draw_on(&self, surface: &mut dyn Surface) {
        surface.fill_circle(self.center, self.radius, self.color);
    }
}
