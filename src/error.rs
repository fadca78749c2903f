//! Error types
//!
//! Gameplay guard conditions (dying enemies, double stops, unknown handles)
//! are state checks, not errors. Only configuration loading and individual
//! spawn attempts can fail.

use std::path::PathBuf;

use thiserror::Error;

/// Failure loading a tuning document
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read tuning file {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure of a single spawn attempt
///
/// The scheduler logs these at its cycle boundary and keeps running.
#[derive(Debug, Error, PartialEq)]
pub enum SpawnError {
    #[error("physics backend refused a body for enemy {0}")]
    BodyRejected(u32),

    #[error("spawn position is not finite: ({x}, {y})")]
    InvalidPosition { x: f32, y: f32 },
}
