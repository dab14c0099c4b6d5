//! Shared level state that hit listeners act on

use serde::{Deserialize, Serialize};

use super::collision::{BallId, ColliderId, CollisionIndex, HitNotifier, ListenerId, Obstacle};
use super::events::ListenerSource;
use super::formation::Formation;

/// Named counters kept by a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tally {
    pub score: i64,
    /// Enemies still standing; the level is cleared at zero
    pub blocks_remaining: i64,
    pub balls: i64,
    /// Starts at one; the turn is lost when a shot brings it to zero
    pub paddle_hits: i64,
    /// Sink for counters nobody reads (shield cells)
    pub discarded: i64,
}

/// Selects one counter of a `Tally`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TallyKey {
    Score,
    BlocksRemaining,
    Balls,
    PaddleHits,
    Discarded,
}

impl Tally {
    pub fn get(&self, key: TallyKey) -> i64 {
        match key {
            TallyKey::Score => self.score,
            TallyKey::BlocksRemaining => self.blocks_remaining,
            TallyKey::Balls => self.balls,
            TallyKey::PaddleHits => self.paddle_hits,
            TallyKey::Discarded => self.discarded,
        }
    }

    pub fn adjust(&mut self, key: TallyKey, delta: i64) {
        let counter = match key {
            TallyKey::Score => &mut self.score,
            TallyKey::BlocksRemaining => &mut self.blocks_remaining,
            TallyKey::Balls => &mut self.balls,
            TallyKey::PaddleHits => &mut self.paddle_hits,
            TallyKey::Discarded => &mut self.discarded,
        };
        *counter += delta;
    }
}

/// Everything a hit can change: the obstacles, the formation, the counters,
/// and the shots waiting to be removed at the end of the frame.
#[derive(Debug, Clone)]
pub struct Battlefield {
    pub obstacles: CollisionIndex<Obstacle>,
    pub formation: Formation,
    pub tally: Tally,
    pub spent_shots: Vec<BallId>,
}

impl Battlefield {
    pub fn new(formation: Formation, tally: Tally) -> Self {
        Self {
            obstacles: CollisionIndex::new(),
            formation,
            tally,
            spent_shots: Vec::new(),
        }
    }

    /// Mark a shot for removal once the current frame's updates are done
    pub fn retire_shot(&mut self, id: BallId) {
        if !self.spent_shots.contains(&id) {
            self.spent_shots.push(id);
        }
    }

    /// Register a listener id on an obstacle, if it is still present
    pub fn listen(&mut self, obstacle: ColliderId, listener: ListenerId) {
        if let Some(o) = self.obstacles.get_mut(obstacle) {
            o.add_hit_listener(listener);
        }
    }
}

impl ListenerSource for Battlefield {
    fn hit_listeners(&self, notifier: ColliderId) -> Vec<ListenerId> {
        self.obstacles
            .get(notifier)
            .map(|o| o.hit_listeners().to_vec())
            .unwrap_or_default()
    }
}
