//! Difficulty selection and run settings
//!
//! Consumed once at run start, and again after each restart.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH};
use crate::error::SimError;
use crate::sim::WeaponKind;

/// Difficulty levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    /// Health of a standard adversary spawned at time zero
    pub fn base_adversary_health(&self) -> f32 {
        match self {
            Difficulty::Easy => 1.0,
            Difficulty::Normal => 5.0,
            Difficulty::Hard => 10.0,
        }
    }

    /// Adversary spawn interval at time zero (ms)
    pub fn base_spawn_interval_ms(&self) -> i64 {
        match self {
            Difficulty::Easy => 2000,
            Difficulty::Normal => 1500,
            Difficulty::Hard => 500,
        }
    }
}

impl FromStr for Difficulty {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" | "1" => Ok(Difficulty::Easy),
            "normal" | "2" => Ok(Difficulty::Normal),
            "hard" | "3" => Ok(Difficulty::Hard),
            _ => Err(SimError::UnknownDifficulty(s.to_string())),
        }
    }
}

/// Run settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Difficulty used when a run is started without an explicit choice
    pub difficulty: Difficulty,
    /// RNG seed
    pub seed: u64,
    /// Weapon the player owns at the start of every run
    pub starting_weapon: WeaponKind,
    pub arena_width: f32,
    pub arena_height: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            seed: 0x5eed,
            starting_weapon: WeaponKind::RapidPistol,
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file; missing keys fall back to defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&json)?;
        settings.validate()?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Reject arena sizes the spawner cannot place entities in
    pub fn validate(&self) -> Result<(), SimError> {
        for (name, value) in [
            ("arena_width", self.arena_width),
            ("arena_height", self.arena_height),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(SimError::InvalidSettings(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Load from `path` if given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, SimError> {
        match path {
            Some(p) => Self::load(p),
            None => {
                log::info!("Using default settings");
                Ok(Self::default())
            }
        }
    }
}
