//! Game settings
//!
//! Loaded from an optional JSON file; any field left out keeps its default.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::FRAMES_PER_SECOND;
use crate::error::ConfigError;
use crate::highscores::DEFAULT_CAPACITY;

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Timing ===
    /// Scheduler frame rate
    pub frames_per_second: u32,

    // === Rules ===
    /// Lives at the start of a game
    pub lives: u32,
    /// Formation speed on the first level (px/s)
    pub enemy_speed: f64,
    /// Added to the formation speed after each cleared level
    pub enemy_speed_step: f64,
    /// Seed for the formation's choice of shooter and aim
    pub seed: u64,

    // === High scores ===
    pub high_score_slots: usize,
    pub high_scores_path: PathBuf,
    /// Name recorded when a headless run places on the leaderboard
    pub player_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            frames_per_second: FRAMES_PER_SECOND,
            lives: 3,
            enemy_speed: 65.0,
            enemy_speed_step: 15.0,
            seed: 0x5eed,
            high_score_slots: DEFAULT_CAPACITY,
            high_scores_path: PathBuf::from("highscores.json"),
            player_name: "Player".to_string(),
        }
    }
}

impl Settings {
    /// Defaults when `path` is `None`, otherwise the file merged over the defaults
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let settings = match path {
            None => Self::default(),
            Some(path) => {
                let text = std::fs::read_to_string(path)?;
                let settings: Settings = serde_json::from_str(&text)?;
                log::info!("Settings loaded from {}", path.display());
                settings
            }
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frames_per_second == 0 || self.frames_per_second > 1000 {
            return Err(ConfigError::Invalid(format!(
                "frames_per_second must be in 1..=1000, got {}",
                self.frames_per_second
            )));
        }
        if self.high_score_slots == 0 {
            return Err(ConfigError::Invalid("high_score_slots must be at least 1".into()));
        }
        if !(self.enemy_speed.is_finite() && self.enemy_speed > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "enemy_speed must be positive, got {}",
                self.enemy_speed
            )));
        }
        if !self.enemy_speed_step.is_finite() {
            return Err(ConfigError::Invalid("enemy_speed_step must be finite".into()));
        }
        Ok(())
    }
}
