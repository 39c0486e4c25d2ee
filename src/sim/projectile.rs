//! Projectile motion and area effects
//!
//! Three motion variants share one projectile type:
//! - `Straight`: constant heading
//! - `Guided`: turns toward its target by at most `GUIDED_MAX_TURN` per tick
//!   and records a short trail for rendering
//! - `Homing`: snaps its heading to the nearest target every tick and
//!   detonates into an [`AreaEffect`] on contact

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{TargetKey, TargetSet};
use super::weapon::WeaponKind;
use crate::consts::*;
use crate::{angle_to, heading, normalize_angle};

/// Motion variant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Motion {
    Straight,
    Guided {
        /// Locked target; re-acquired (nearest) when it disappears
        target: Option<TargetKey>,
        /// Recent positions, oldest first (presentation only)
        #[serde(skip)]
        trail: VecDeque<Vec2>,
    },
    Homing,
}

/// A player projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    /// Heading (radians)
    pub angle: f32,
    /// Units per tick
    pub speed: f32,
    pub damage: u32,
    pub source: WeaponKind,
    pub tier: u8,
    /// Passes through targets instead of being destroyed on hit
    pub piercing: bool,
    pub motion: Motion,
}

impl Projectile {
    pub fn straight(pos: Vec2, angle: f32, damage: u32, source: WeaponKind, tier: u8) -> Self {
        Self {
            pos,
            angle,
            speed: PROJECTILE_SPEED,
            damage,
            source,
            tier,
            piercing: false,
            motion: Motion::Straight,
        }
    }

    pub fn guided(
        pos: Vec2,
        angle: f32,
        damage: u32,
        source: WeaponKind,
        tier: u8,
        target: Option<TargetKey>,
    ) -> Self {
        Self {
            speed: GUIDED_SPEED,
            motion: Motion::Guided {
                target,
                trail: VecDeque::with_capacity(GUIDED_TRAIL_LENGTH + 1),
            },
            ..Self::straight(pos, angle, damage, source, tier)
        }
    }

    pub fn homing(pos: Vec2, angle: f32, damage: u32, source: WeaponKind, tier: u8) -> Self {
        Self {
            speed: ROCKET_SPEED,
            motion: Motion::Homing,
            ..Self::straight(pos, angle, damage, source, tier)
        }
    }

    pub fn with_piercing(mut self) -> Self {
        self.piercing = true;
        self
    }

    pub fn radius(&self) -> f32 {
        PROJECTILE_RADIUS
    }

    /// Trail points for rendering (empty unless guided)
    pub fn trail(&self) -> Vec<Vec2> {
        match &self.motion {
            Motion::Guided { trail, .. } => trail.iter().copied().collect(),
            _ => Vec::new(),
        }
    }

    /// Adjust heading from the start-of-tick target positions
    pub fn steer(&mut self, targets: &TargetSet) {
        match &mut self.motion {
            Motion::Straight => {}
            Motion::Homing => {
                if let Some(t) = targets.nearest(self.pos) {
                    self.angle = angle_to(self.pos, t.pos);
                }
            }
            Motion::Guided { target, .. } => {
                let locked = target
                    .and_then(|key| targets.get(key))
                    .or_else(|| targets.nearest(self.pos));
                if let Some(t) = locked {
                    *target = Some(t.key);
                    let desired = angle_to(self.pos, t.pos);
                    self.angle = turn_toward(self.angle, desired, GUIDED_MAX_TURN);
                }
            }
        }
    }

    /// Move one tick along the heading
    pub fn advance(&mut self) {
        self.pos += heading(self.angle) * self.speed;
        if let Motion::Guided { trail, .. } = &mut self.motion {
            trail.push_back(self.pos);
            while trail.len() > GUIDED_TRAIL_LENGTH {
                trail.pop_front();
            }
        }
    }
}

/// Rotate `current` toward `desired` by the signed shortest difference,
/// limited to `max_turn` radians
pub fn turn_toward(current: f32, desired: f32, max_turn: f32) -> f32 {
    let diff = normalize_angle(desired - current);
    normalize_angle(current + diff.clamp(-max_turn, max_turn))
}

/// A timed explosion that damages everything inside it every tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaEffect {
    pub center: Vec2,
    pub radius: f32,
    pub damage: u32,
    pub source: WeaponKind,
    pub spawned_ms: u64,
}

impl AreaEffect {
    pub fn explosion(center: Vec2, damage: u32, source: WeaponKind, now_ms: u64) -> Self {
        Self {
            center,
            radius: EXPLOSION_RADIUS,
            damage,
            source,
            spawned_ms: now_ms,
        }
    }

    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.spawned_ms)
    }

    pub fn expired(&self, now_ms: u64) -> bool {
        self.age_ms(now_ms) >= AREA_EFFECT_LIFETIME_MS
    }
}
