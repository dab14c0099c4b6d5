//! Collidables and the nearest-collision query
//!
//! The index is a plain insertion-ordered list scanned linearly. Every query
//! walks every member; ties go to whichever member was registered first.

use serde::{Deserialize, Serialize};

use super::geometry::{Aabb, Point, Segment};
use super::velocity::Velocity;
use crate::renderer::{Drawable, Rgb, Skin, Surface};

/// Handle of a member of a `CollisionIndex`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ColliderId(pub u32);

/// Handle of a moving body
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BallId(pub u32);

/// Handle of a registered hit listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ListenerId(pub u32);

/// What kind of thing was struck, as seen by listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Struck {
    /// Block state after the hit was applied
    Block { enemy: bool, hit_points: u32 },
    Paddle,
}

/// Outcome of a hit: the body's new velocity, and what listeners are told was struck
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitResponse {
    pub velocity: Velocity,
    pub target: Struck,
}

/// Something with a rectangular collision shape that decides how to respond to a hit
pub trait Collidable {
    fn collision_shape(&self) -> &Aabb;

    fn collision_shape_mut(&mut self) -> &mut Aabb;

    /// Apply a hit at `point` by a body moving at `velocity`; returns the body's new velocity
    fn hit(&mut self, hitter: BallId, point: Point, velocity: Velocity, dt: f64) -> HitResponse;
}

/// Something that keeps an ordered list of hit listeners
pub trait HitNotifier {
    fn add_hit_listener(&mut self, listener: ListenerId);

    fn remove_hit_listener(&mut self, listener: ListenerId);

    fn hit_listeners(&self) -> &[ListenerId];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Absorbs every hit
    Paddle,
    /// Loses one hit point per hit until it reaches zero
    Block { hit_points: u32, enemy: bool },
}

/// A rectangular obstacle: paddle, destructible block or killer boundary
#[derive(Debug, Clone)]
pub struct Obstacle {
    shape: Aabb,
    kind: ObstacleKind,
    skin: Skin,
    listeners: Vec<ListenerId>,
}

impl Obstacle {
    pub fn new(shape: Aabb, kind: ObstacleKind, skin: Skin) -> Self {
        Self {
            shape,
            kind,
            skin,
            listeners: Vec::new(),
        }
    }

    pub fn block(shape: Aabb, hit_points: u32, skin: Skin) -> Self {
        Self::new(
            shape,
            ObstacleKind::Block {
                hit_points,
                enemy: false,
            },
            skin,
        )
    }

    pub fn enemy(shape: Aabb, hit_points: u32, skin: Skin) -> Self {
        Self::new(
            shape,
            ObstacleKind::Block {
                hit_points,
                enemy: true,
            },
            skin,
        )
    }

    /// Killer boundary: zero hit tolerance
    pub fn boundary(shape: Aabb) -> Self {
        Self::block(shape, 0, Skin::Color(Rgb::BORDER))
    }

    pub fn paddle(shape: Aabb, skin: Skin) -> Self {
        Self::new(shape, ObstacleKind::Paddle, skin)
    }

    pub fn kind(&self) -> ObstacleKind {
        self.kind
    }

    pub fn is_enemy(&self) -> bool {
        matches!(self.kind, ObstacleKind::Block { enemy: true, .. })
    }

    /// Remaining hit points; `None` for the paddle
    pub fn hit_points(&self) -> Option<u32> {
        match self.kind {
            ObstacleKind::Block { hit_points, .. } => Some(hit_points),
            ObstacleKind::Paddle => None,
        }
    }

    pub fn skin(&self) -> &Skin {
        &self.skin
    }

    pub fn move_to(&mut self, upper_left: Point) {
        self.shape.set_upper_left(upper_left);
    }
}

impl Collidable for Obstacle {
    fn collision_shape(&self) -> &Aabb {
        &self.shape
    }

    fn collision_shape_mut(&mut self) -> &mut Aabb {
        &mut self.shape
    }

    fn hit(&mut self, _hitter: BallId, point: Point, _velocity: Velocity, _dt: f64) -> HitResponse {
        let struck = match &mut self.kind {
            ObstacleKind::Paddle => Struck::Paddle,
            ObstacleKind::Block { hit_points, enemy } => {
                let on_shape = self.shape.spans_x(point.x) || self.shape.spans_y(point.y);
                if *hit_points > 0 && on_shape {
                    *hit_points -= 1;
                }
                Struck::Block {
                    enemy: *enemy,
                    hit_points: *hit_points,
                }
            }
        };
        // Bodies are caught, never reflected
        HitResponse {
            velocity: Velocity::ZERO,
            target: struck,
        }
    }
}

impl HitNotifier for Obstacle {
    fn add_hit_listener(&mut self, listener: ListenerId) {
        self.listeners.push(listener);
    }

    fn remove_hit_listener(&mut self, listener: ListenerId) {
        if let Some(pos) = self.listeners.iter().position(|&l| l == listener) {
            self.listeners.remove(pos);
        }
    }

    fn hit_listeners(&self) -> &[ListenerId] {
        &self.listeners
    }
}

impl Drawable for Obstacle {
    fn draw_on(&self, surface: &mut dyn Surface) {
        self.skin.paint(surface, &self.shape);
    }
}

/// Result of a nearest-collision query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionInfo {
    pub point: Point,
    pub collider: ColliderId,
}

/// Insertion-ordered set of collidables
#[derive(Debug, Clone)]
pub struct CollisionIndex<C> {
    members: Vec<(ColliderId, C)>,
    next_id: u32,
}

impl<C> Default for CollisionIndex<C> {
    fn default() -> Self {
        Self {
            members: Vec::new(),
            next_id: 1,
        }
    }
}

impl<C: Collidable> CollisionIndex<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, collidable: C) -> ColliderId {
        let id = ColliderId(self.next_id);
        self.next_id += 1;
        self.members.push((id, collidable));
        id
    }

    /// Unregister a member, keeping the order of the rest
    pub fn remove(&mut self, id: ColliderId) -> Option<C> {
        let pos = self.members.iter().position(|(member, _)| *member == id)?;
        Some(self.members.remove(pos).1)
    }

    pub fn contains(&self, id: ColliderId) -> bool {
        self.members.iter().any(|(member, _)| *member == id)
    }

    pub fn get(&self, id: ColliderId) -> Option<&C> {
        self.members
            .iter()
            .find(|(member, _)| *member == id)
            .map(|(_, c)| c)
    }

    pub fn get_mut(&mut self, id: ColliderId) -> Option<&mut C> {
        self.members
            .iter_mut()
            .find(|(member, _)| *member == id)
            .map(|(_, c)| c)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ColliderId, &C)> {
        self.members.iter().map(|(id, c)| (*id, c))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// First member whose interior holds `point`
    pub fn containing(&self, point: Point) -> Option<ColliderId> {
        self.members
            .iter()
            .find(|(_, member)| member.collision_shape().contains_strictly(point))
            .map(|(id, _)| *id)
    }

    /// Closest member hit by `trajectory`, measured from its start
    pub fn nearest_collision(&self, trajectory: &Segment) -> Option<CollisionInfo> {
        self.nearest_collision_from(trajectory, trajectory.start())
    }

    /// Closest member hit by `trajectory`, measured from `origin`.
    ///
    /// Segments are stored with the lower x first, so a body moving left
    /// passes its real position as the origin.
    pub fn nearest_collision_from(
        &self,
        trajectory: &Segment,
        origin: Point,
    ) -> Option<CollisionInfo> {
        let mut nearest: Option<(CollisionInfo, f64)> = None;
        for (id, member) in &self.members {
            let Some(point) = trajectory.nearest_intersection_to(member.collision_shape(), origin)
            else {
                continue;
            };
            let dist = origin.distance(point);
            match nearest {
                Some((_, best)) if best <= dist => {}
                _ => {
                    nearest = Some((
                        CollisionInfo {
                            point,
                            collider: *id,
                        },
                        dist,
                    ))
                }
            }
        }
        nearest.map(|(info, _)| info)
    }
}
