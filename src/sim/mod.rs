//! Deterministic simulation module
//!
//! All gameplay logic lives here:
//! - Fixed timestep only; `dt` comes from the scheduler
//! - Seeded RNG only (formation shooting)
//! - Stable iteration order (insertion order of the collision index)
//! - No rendering beyond the `Drawable` contract

pub mod ball;
pub mod battlefield;
pub mod collision;
pub mod events;
pub mod flow;
pub mod formation;
pub mod geometry;
pub mod level;
pub mod listeners;
pub mod velocity;

pub use ball::Ball;
pub use battlefield::{Battlefield, Tally, TallyKey};
pub use collision::{
    BallId, Collidable, ColliderId, CollisionIndex, CollisionInfo, HitNotifier, HitResponse,
    ListenerId, Obstacle, ObstacleKind, Struck,
};
pub use events::{HitEvent, HitEventBus, HitListener, ListenerSource};
pub use flow::{FixedName, GameFlow, GameSummary, NamePrompt};
pub use formation::{Bounds, Formation, Heading, ShotRequest};
pub use geometry::{Aabb, Point, Segment};
pub use level::{Level, LevelSpec, ObstacleSpec, ShieldSpec, TurnOutcome};
pub use listeners::{BallRemover, BlockRemover, FormationTracker, ScoreTracker};
pub use velocity::Velocity;
