//! Errors for operations that take external input
//!
//! The simulation tick itself never fails; these cover choices, restarts and
//! configuration handed in by the surrounding application.

use thiserror::Error;

use crate::sim::Phase;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("no weapon choice is pending (phase: {0:?})")]
    NotAwaitingChoice(Phase),

    #[error("weapon choice {index} out of range ({available} presented)")]
    InvalidChoice { index: usize, available: usize },

    #[error("restart is only accepted after game over (phase: {0:?})")]
    NotGameOver(Phase),

    #[error("a run is already in progress (phase: {0:?})")]
    NotAwaitingDifficulty(Phase),

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),

    #[error("unknown weapon: {0}")]
    UnknownWeapon(String),

    #[error("failed to read settings: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("failed to parse settings: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}
