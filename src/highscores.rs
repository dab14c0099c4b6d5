//! High score leaderboard
//!
//! Keeps the top `capacity` scores, best first. Persisted as JSON next to the
//! binary (see `persistence`).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::persistence;

/// Default number of high scores to keep
pub const DEFAULT_CAPACITY: usize = 5;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreInfo {
    pub name: String,
    pub score: i64,
}

impl ScoreInfo {
    pub fn new(name: impl Into<String>, score: i64) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

/// High score leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoresTable {
    capacity: usize,
    entries: Vec<ScoreInfo>,
}

impl Default for HighScoresTable {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl HighScoresTable {
    /// Create empty leaderboard
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries, best first
    pub fn entries(&self) -> &[ScoreInfo] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<i64> {
        self.entries.first().map(|e| e.score)
    }

    /// Rank a score would take: 1 for the best, `capacity + 1` if it would not place.
    ///
    /// Ties rank below the existing entry.
    pub fn rank(&self, score: i64) -> usize {
        let pos = self.entries.iter().position(|e| score > e.score);
        (pos.unwrap_or(self.entries.len()) + 1).min(self.capacity + 1)
    }

    /// Check if a score earns a place on the leaderboard
    pub fn qualifies(&self, score: i64) -> bool {
        score > 0 && self.rank(score) <= self.capacity
    }

    /// Insert a score at its rank, dropping whatever falls off the end.
    /// Returns the rank achieved or `None` if it didn't place.
    pub fn add(&mut self, entry: ScoreInfo) -> Option<usize> {
        let rank = self.rank(entry.score);
        if rank > self.capacity {
            return None;
        }
        self.entries.insert(rank - 1, entry);
        self.entries.truncate(self.capacity);
        Some(rank)
    }

    /// Load from a JSON file. The file's own capacity is replaced by `capacity`.
    pub fn load(path: &Path, capacity: usize) -> Result<Self, StoreError> {
        let stored: HighScoresTable = persistence::load_json(path)?;
        let mut table = Self::new(capacity);
        for entry in stored.entries {
            table.add(entry);
        }
        log::info!("Loaded {} high scores from {}", table.entries.len(), path.display());
        Ok(table)
    }

    /// Load, or start fresh if the file is missing or unreadable
    pub fn load_or_default(path: &Path, capacity: usize) -> Self {
        match Self::load(path, capacity) {
            Ok(table) => table,
            Err(StoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No high scores found, starting fresh");
                Self::new(capacity)
            }
            Err(e) => {
                log::warn!("Could not read high scores ({e}), starting fresh");
                Self::new(capacity)
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        persistence::save_json(path, self)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(scores: &[i64]) -> HighScoresTable {
        let mut t = HighScoresTable::new(3);
        for (i, &s) in scores.iter().enumerate() {
            t.add(ScoreInfo::new(format!("p{i}"), s));
        }
        t
    }

    #[test]
    fn test_rank_empty() {
        let t = HighScoresTable::new(3);
        assert_eq!(t.rank(10), 1);
        assert_eq!(t.rank(0), 1);
        assert!(!t.qualifies(0));
        assert!(t.qualifies(1));
    }

    #[test]
    fn test_rank_contract() {
        let t = table(&[50, 30, 10]);
        assert_eq!(t.rank(100), 1);
        assert_eq!(t.rank(40), 2);
        // Tie ranks below the existing score
        assert_eq!(t.rank(30), 3);
        assert_eq!(t.rank(5), 4);
        assert!(!t.qualifies(5));
    }

    #[test]
    fn test_partial_table_ranks_after_last() {
        let t = table(&[50]);
        assert_eq!(t.rank(20), 2);
        assert!(t.qualifies(20));
    }

    #[test]
    fn test_add_keeps_order_and_capacity() {
        let mut t = table(&[10, 50, 30]);
        let scores: Vec<i64> = t.entries().iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![50, 30, 10]);

        assert_eq!(t.add(ScoreInfo::new("new", 40)), Some(2));
        let scores: Vec<i64> = t.entries().iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![50, 40, 30]);
        assert_eq!(t.add(ScoreInfo::new("low", 1)), None);
        assert_eq!(t.top_score(), Some(50));
    }
}
