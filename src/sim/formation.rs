//! Enemy formation: collective motion state machine
//!
//! Members are obstacles owned by a `CollisionIndex`; the formation only keeps
//! their ids. Bounds come from two coordinate views (members keyed by their
//! upper-left x and y), which are thrown away and rebuilt after every move.
//!
//! Per tick: evaluate the heading from the bounds, move every member, rebuild
//! the views, then maybe fire.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{Collidable, ColliderId, CollisionIndex};
use super::geometry::Point;
use super::velocity::Velocity;
use crate::consts::{ENEMY_SHOT_RADIUS, ENEMY_SHOT_SPEED, SURFACE_HEIGHT, SURFACE_WIDTH};
use crate::error::FormationError;
use crate::platform::Cooldown;

/// Rightmost member x that turns the formation left
pub const RIGHT_LIMIT: f64 = 750.0;
/// Leftmost member x that turns the formation right
pub const LEFT_LIMIT: f64 = 0.0;
/// Lowest member y at which the formation has reached the shields
pub const ARRIVAL_Y: f64 = 450.0;
/// Speed multiplier applied on each descent
pub const SPEEDUP: f64 = 1.1;
/// Members drop at this speed rather than the tracked one
pub const DESCENT_SPEED: f64 = 1000.0;
pub const FIRE_COOLDOWN_MS: u64 = 500;
/// Cap on each realignment loop
pub const MAX_REALIGN_STEPS: usize = 10_000;

const REALIGN_LEFT_X: f64 = 30.0;
const REALIGN_CENTER_SUM: f64 = 750.0;
const REALIGN_TOP_Y: f64 = 60.0;

/// Base firing angle (degrees from up) and the jitter added on top
const SHOT_ANGLE: f64 = 170.0;
const SHOT_JITTER: u32 = 20;

/// One of the four cardinal directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Heading {
    Up,
    Right,
    Down,
    Left,
}

impl Heading {
    pub fn degrees(self) -> f64 {
        match self {
            Heading::Up => 0.0,
            Heading::Right => 90.0,
            Heading::Down => 180.0,
            Heading::Left => 270.0,
        }
    }
}

/// Aggregate extent of the members' upper-left corners
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Reported when the formation has no members
    pub const EMPTY: Bounds = Bounds {
        min_x: SURFACE_WIDTH,
        max_x: 0.0,
        min_y: SURFACE_HEIGHT,
        max_y: 0.0,
    };
}

/// A shot the formation wants spawned
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotRequest {
    pub origin: Point,
    pub velocity: Velocity,
    pub radius: f64,
}

/// Totally ordered coordinate, for use as a map key
#[derive(Debug, Clone, Copy)]
struct CoordKey(f64);

impl PartialEq for CoordKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CoordKey {}

impl PartialOrd for CoordKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CoordKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

type CoordView = BTreeMap<CoordKey, Vec<ColliderId>>;

#[derive(Debug, Clone)]
pub struct Formation {
    members: Vec<ColliderId>,
    by_x: CoordView,
    by_y: CoordView,
    heading: Heading,
    speed: f64,
    original_speed: f64,
    moved_down: bool,
    arrived: bool,
    fire: Cooldown,
    rng: Pcg32,
}

impl Formation {
    pub fn new(speed: f64, seed: u64) -> Self {
        Self {
            members: Vec::new(),
            by_x: BTreeMap::new(),
            by_y: BTreeMap::new(),
            heading: Heading::Right,
            speed,
            original_speed: speed,
            moved_down: false,
            arrived: false,
            fire: Cooldown::new(FIRE_COOLDOWN_MS),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn add_member<C: Collidable>(&mut self, id: ColliderId, index: &CollisionIndex<C>) {
        self.members.push(id);
        if let Some(member) = index.get(id) {
            let ul = member.collision_shape().upper_left();
            map_member(&mut self.by_x, &mut self.by_y, id, ul);
        }
    }

    /// Drop a member (e.g. after it was shot). Returns false if it was not a member.
    pub fn remove_member(&mut self, id: ColliderId) -> bool {
        let Some(pos) = self.members.iter().position(|&m| m == id) else {
            return false;
        };
        self.members.remove(pos);
        unmap_member(&mut self.by_x, id);
        unmap_member(&mut self.by_y, id);
        true
    }

    pub fn members(&self) -> &[ColliderId] {
        &self.members
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn heading(&self) -> Heading {
        self.heading
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn original_speed(&self) -> f64 {
        self.original_speed
    }

    /// Whether the lowest member reached the shields
    pub fn has_arrived(&self) -> bool {
        self.arrived
    }

    pub fn bounds(&self) -> Bounds {
        let (Some(min_x), Some(max_x), Some(min_y), Some(max_y)) = (
            self.by_x.keys().next(),
            self.by_x.keys().next_back(),
            self.by_y.keys().next(),
            self.by_y.keys().next_back(),
        ) else {
            return Bounds::EMPTY;
        };
        Bounds {
            min_x: min_x.0,
            max_x: max_x.0,
            min_y: min_y.0,
            max_y: max_y.0,
        }
    }

    /// Decide the heading for the coming move from the current bounds.
    ///
    /// The right-limit rule runs before the left-limit rule, and descent is
    /// checked last. A formation spanning [0, 760] while heading right
    /// therefore evaluates to `Down`, and to `Right` once it has descended.
    pub fn evaluate(&mut self) {
        let b = self.bounds();
        let at_right = b.max_x >= RIGHT_LIMIT;
        let at_left = b.min_x <= LEFT_LIMIT;

        if at_right {
            self.heading = Heading::Left;
        }
        if at_left {
            self.heading = Heading::Right;
        }
        if (at_left || at_right) && !self.moved_down {
            self.speed *= SPEEDUP;
            self.heading = Heading::Down;
            self.moved_down = true;
            log::debug!("Formation descending, speed now {:.1}", self.speed);
        }
        if matches!(self.heading, Heading::Right | Heading::Left) {
            self.moved_down = false;
        }
        if b.max_y >= ARRIVAL_Y && !self.arrived {
            self.arrived = true;
            log::info!("Formation reached the shields");
        }
    }

    /// Move every member one step in the current heading, snapping to whole pixels
    pub fn move_members<C: Collidable>(&mut self, index: &mut CollisionIndex<C>, dt: f64) {
        let speed = if self.heading == Heading::Down {
            DESCENT_SPEED
        } else {
            self.speed
        };
        let velocity = Velocity::from_angle_and_speed(self.heading.degrees(), speed);
        for &id in &self.members {
            if let Some(member) = index.get_mut(id) {
                let shape = member.collision_shape_mut();
                let moved = velocity.apply_to_point(shape.upper_left(), dt);
                shape.set_upper_left(Point::new(moved.x.trunc(), moved.y.trunc()));
            }
        }
    }

    /// Rebuild both coordinate views from the members' current positions
    pub fn rebuild_views<C: Collidable>(&mut self, index: &CollisionIndex<C>) {
        self.by_x.clear();
        self.by_y.clear();
        for &id in &self.members {
            if let Some(member) = index.get(id) {
                let ul = member.collision_shape().upper_left();
                map_member(&mut self.by_x, &mut self.by_y, id, ul);
            }
        }
    }

    /// Fire from the lowest member of a random column, at most once per cooldown
    pub fn shoot<C: Collidable>(
        &mut self,
        index: &CollisionIndex<C>,
        now_ms: u64,
    ) -> Option<ShotRequest> {
        if self.by_x.is_empty() || !self.fire.try_fire(now_ms) {
            return None;
        }

        let lowest: Vec<ColliderId> = self
            .by_x
            .values()
            .filter_map(|column| {
                column
                    .iter()
                    .filter_map(|&id| {
                        let top = index.get(id)?.collision_shape().upper_left().y;
                        Some((id, top))
                    })
                    .max_by(|a, b| a.1.total_cmp(&b.1))
                    .map(|(id, _)| id)
            })
            .collect();
        if lowest.is_empty() {
            return None;
        }

        let shooter = lowest[self.rng.random_range(0..lowest.len())];
        let angle = SHOT_ANGLE + f64::from(self.rng.random_range(0..SHOT_JITTER));
        let edge = index.get(shooter)?.collision_shape().lower_edge().midpoint();
        // Spawn clear of the shooter so the shot does not strike it on its first tick
        let origin = edge.translated(0.0, ENEMY_SHOT_RADIUS);
        log::debug!("Formation fires from {:?} at {angle} degrees", origin);
        Some(ShotRequest {
            origin,
            velocity: Velocity::from_angle_and_speed(angle, ENEMY_SHOT_SPEED),
            radius: ENEMY_SHOT_RADIUS,
        })
    }

    /// One full formation tick
    pub fn tick<C: Collidable>(
        &mut self,
        index: &mut CollisionIndex<C>,
        dt: f64,
        now_ms: u64,
    ) -> Option<ShotRequest> {
        self.evaluate();
        self.move_members(index, dt);
        self.rebuild_views(index);
        self.shoot(index, now_ms)
    }

    /// Walk the formation back to its starting extent, then reset heading,
    /// speed and flags.
    ///
    /// Each phase is a movement loop: left until the leftmost member is within
    /// 30px of the edge, right until the formation is centered, up until the
    /// top row is within 60px of the top.
    pub fn realign<C: Collidable>(
        &mut self,
        index: &mut CollisionIndex<C>,
        dt: f64,
    ) -> Result<(), FormationError> {
        if self.members.is_empty() {
            self.reset();
            return Ok(());
        }
        self.rebuild_views(index);

        let walked = self
            .realign_phase(index, dt, "left", Heading::Left, |b| b.min_x > REALIGN_LEFT_X)
            .and_then(|()| {
                self.realign_phase(index, dt, "center", Heading::Right, |b| {
                    b.min_x + b.max_x < REALIGN_CENTER_SUM
                })
            })
            .and_then(|()| {
                self.realign_phase(index, dt, "top", Heading::Up, |b| b.min_y > REALIGN_TOP_Y)
            });

        // Heading, speed and flags are reset even when a phase stalled
        self.reset();
        if walked.is_ok() {
            log::debug!("Formation realigned to {:?}", self.bounds());
        }
        walked
    }

    fn realign_phase<C: Collidable>(
        &mut self,
        index: &mut CollisionIndex<C>,
        dt: f64,
        phase: &'static str,
        heading: Heading,
        pending: impl Fn(&Bounds) -> bool,
    ) -> Result<(), FormationError> {
        let mut steps = 0;
        while pending(&self.bounds()) {
            if steps == MAX_REALIGN_STEPS {
                return Err(FormationError::RealignDiverged { phase, steps });
            }
            self.evaluate();
            self.heading = heading;
            self.move_members(index, dt);
            self.rebuild_views(index);
            steps += 1;
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.heading = Heading::Right;
        self.speed = self.original_speed;
        self.moved_down = false;
        self.arrived = false;
    }
}

fn map_member(by_x: &mut CoordView, by_y: &mut CoordView, id: ColliderId, ul: Point) {
    by_x.entry(CoordKey(ul.x)).or_default().push(id);
    by_y.entry(CoordKey(ul.y)).or_default().push(id);
}

fn unmap_member(view: &mut CoordView, id: ColliderId) {
    view.retain(|_, ids| {
        ids.retain(|&m| m != id);
        !ids.is_empty()
    });
}
