//! Error types shared across the crate.
//!
//! A missing collision is never an error; these cover invalid input,
//! runaway convergence loops and the I/O edges.

use std::io;

/// Invalid geometric input.
#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    #[error("coordinates must be finite, got ({x}, {y})")]
    NonFinite { x: f64, y: f64 },
}

/// Formation realignment did not converge.
#[derive(Debug, thiserror::Error)]
pub enum FormationError {
    #[error("formation realignment phase '{phase}' did not converge within {steps} steps")]
    RealignDiverged { phase: &'static str, steps: usize },
}

/// High-score persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("high-score file I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("high-score file is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Settings loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("settings file I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("settings file is malformed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid setting: {0}")]
    Invalid(String),
}
