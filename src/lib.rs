//! Boss Survivor - a wave-survival combat simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (weapons, projectiles, adversaries, progression)
//! - `settings`: Difficulty selection and run configuration
//! - `error`: Errors raised by operations that take external input
//!
//! Rendering, audio, input polling and menus are external collaborators; they
//! drive [`sim::advance`] and read [`sim::Snapshot`]s.

pub mod error;
pub mod settings;
pub mod sim;

pub use error::SimError;
pub use settings::{Difficulty, Settings};

use glam::Vec2;

/// Game configuration constants
///
/// Speeds and angular rates are per tick at the reference rate; timers are
/// in milliseconds of simulation time.
pub mod consts {
    /// Reference simulation rate
    pub const TICKS_PER_SECOND: u32 = 60;
    /// Fixed simulation timestep
    pub const SIM_DT: f32 = 1.0 / TICKS_PER_SECOND as f32;

    /// Default arena dimensions
    pub const ARENA_WIDTH: f32 = 800.0;
    pub const ARENA_HEIGHT: f32 = 600.0;

    /// Player defaults
    pub const PLAYER_RADIUS: f32 = 25.0;
    pub const PLAYER_SPEED: f32 = 5.0;
    pub const PLAYER_MAX_HEALTH: f32 = 100.0;
    pub const STARTING_EXP_THRESHOLD: u32 = 100;
    /// Threshold growth per level gained
    pub const EXP_THRESHOLD_GROWTH: u32 = 50;

    /// Standard adversary
    pub const ADVERSARY_RADIUS: f32 = 20.0;
    pub const ADVERSARY_SPEED: f32 = 2.0;
    pub const ADVERSARY_CONTACT_DAMAGE: f32 = 10.0;
    pub const ADVERSARY_EXP: u32 = 20;

    /// Bosses
    pub const BOSS_RADIUS: f32 = 30.0;
    pub const BOSS_SPEED: f32 = 1.5;
    pub const BOSS_BASE_HEALTH: f32 = 50.0;
    /// Text boss health multiplier over the base boss health
    pub const TEXT_BOSS_HEALTH_FACTOR: f32 = 10.0;
    pub const BOSS_CONTACT_DAMAGE: f32 = 20.0;
    pub const BOSS_EXP: u32 = 200;
    pub const BOSS_SHOT_COOLDOWN_MS: u64 = 2000;
    pub const TEXT_BOSS_SHOT_COOLDOWN_MS: u64 = 1500;
    pub const BOSS_SPAWN_INTERVAL_MS: u64 = 30_000;

    /// Hostile (boss) projectiles
    pub const BOSS_SHOT_RADIUS: f32 = 7.5;
    pub const BOSS_SHOT_SPEED: f32 = 3.0;
    pub const BOSS_SHOT_DAMAGE: f32 = 15.0;

    /// Player projectiles
    pub const PROJECTILE_RADIUS: f32 = 5.0;
    pub const PROJECTILE_SPEED: f32 = 10.0;
    pub const GUIDED_SPEED: f32 = 30.0;
    pub const ROCKET_SPEED: f32 = 7.0;
    /// Maximum guided turn per tick (radians)
    pub const GUIDED_MAX_TURN: f32 = 0.3;
    /// Trail points kept for guided projectiles
    pub const GUIDED_TRAIL_LENGTH: usize = 15;

    /// Area effects (rocket explosions)
    pub const EXPLOSION_RADIUS: f32 = 50.0;
    pub const AREA_EFFECT_LIFETIME_MS: u64 = 500;

    /// Orbit drone hit-check sizes
    pub const ORBIT_HIT_RADIUS: f32 = 10.0;
    pub const SUPER_ORBIT_HIT_RADIUS: f32 = 15.0;

    /// Pickups
    pub const PICKUP_RADIUS: f32 = 10.0;
    pub const PICKUP_MARGIN: f32 = 50.0;
    pub const EXP_PICKUP_VALUE: u32 = 10;
    pub const HEALTH_PACK_VALUE: f32 = 30.0;
    /// Per-tick spawn chance for experience pickups (5 in 501)
    pub const EXP_PICKUP_CHANCE: f64 = 5.0 / 501.0;
    /// Per-tick spawn chance for health packs (3 in 1001)
    pub const HEALTH_PACK_CHANCE: f64 = 3.0 / 1001.0;

    /// Adversary spawn interval shrinks by this much per elapsed second
    pub const SPAWN_INTERVAL_DECAY_MS: i64 = 15;
    /// Spawn-time health grows as elapsed_secs^HEALTH_GROWTH_EXPONENT
    pub const HEALTH_GROWTH_EXPONENT: f32 = 1.1;
    /// Hard cap on standard adversaries spawned in a single tick
    pub const MAX_SPAWNS_PER_TICK: u32 = 1;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    (angle + PI).rem_euclid(TAU) - PI
}

/// Heading (radians) from `src` toward `dest`
#[inline]
pub fn angle_to(src: Vec2, dest: Vec2) -> f32 {
    let d = dest - src;
    d.y.atan2(d.x)
}

/// Unit vector for a heading
#[inline]
pub fn heading(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_angle_to_cardinal_directions() {
        let origin = Vec2::new(10.0, 10.0);
        assert!(angle_to(origin, Vec2::new(20.0, 10.0)).abs() < 1e-6);
        assert!((angle_to(origin, Vec2::new(10.0, 20.0)) - FRAC_PI_2).abs() < 1e-6);
        assert!((angle_to(origin, Vec2::new(0.0, 10.0)).abs() - PI).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_angle_wraps() {
        assert!((normalize_angle(3.0 * PI) - (-PI)).abs() < 1e-5);
        assert!((normalize_angle(-FRAC_PI_2) + FRAC_PI_2).abs() < 1e-6);
        assert!((normalize_angle(2.0 * PI + 0.25) - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_heading_is_unit() {
        for i in 0..16 {
            let v = heading(i as f32 * 0.4);
            assert!((v.length() - 1.0).abs() < 1e-6);
        }
    }
}
