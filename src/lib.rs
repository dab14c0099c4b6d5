//! Brick Invaders - brick-breaking collisions against an advancing enemy formation
//!
//! Core modules:
//! - `sim`: Collision engine (geometry, collision index, hit events, bodies, formation, levels)
//! - `animation`: Fixed frame-rate scheduler and the frame units it runs
//! - `renderer`: Drawing contract consumed by every drawable
//! - `platform`: Clock and keyboard abstractions
//! - `persistence`: High-score save/load

pub mod animation;
pub mod error;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::{ConfigError, FormationError, GeometryError, StoreError};
pub use highscores::HighScoresTable;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Tolerance used for point equality and segment range checks.
    /// Absorbs drift from repeated trigonometric transforms.
    pub const EPSILON: f64 = 0.007;

    /// Play surface dimensions
    pub const SURFACE_WIDTH: f64 = 800.0;
    pub const SURFACE_HEIGHT: f64 = 600.0;

    /// Default scheduler frame rate
    pub const FRAMES_PER_SECOND: u32 = 60;

    /// Horizontal margin the paddle may not cross
    pub const SIDE_MARGIN: f64 = 25.0;
    /// Height of the top and bottom killer boundaries
    pub const BOUNDARY_HEIGHT: f64 = 30.0;
    pub const PADDLE_HEIGHT: f64 = 20.0;

    /// Paddle shots
    pub const PADDLE_SHOT_RADIUS: f64 = 4.0;
    pub const PADDLE_SHOT_SPEED: f64 = 350.0;
    pub const PADDLE_FIRE_COOLDOWN_MS: u64 = 350;

    /// Enemy shots
    pub const ENEMY_SHOT_RADIUS: f64 = 5.0;
    pub const ENEMY_SHOT_SPEED: f64 = 300.0;

    /// Points for knocking out an enemy
    pub const ENEMY_SCORE: i64 = 5;
}

/// Normalize an angle in degrees to [0, 360)
#[inline]
pub fn normalize_degrees(angle: f64) -> f64 {
    angle.rem_euclid(360.0)
}
