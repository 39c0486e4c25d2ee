//! Weapon system
//!
//! Weapons are a closed set of kinds. Each kind has per-tier stat formulas and
//! a firing behavior picked from a table keyed by `(kind, Pattern)`; tier 3
//! selects the `Super` pattern, which is a separate behavior rather than a
//! stat bump.

use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Target;
use super::projectile::Projectile;
use crate::error::SimError;
use crate::{angle_to, heading};

/// Highest tier; reaching it switches the weapon to its super behavior
pub const MAX_TIER: u8 = 3;

/// Cooldown used between the two shots of a super shotgun burst
pub const SHOTGUN_BURST_COOLDOWN_MS: u64 = 10;

/// Pistol super volley angular offsets
const TWIN_SHOT_OFFSET: f32 = 0.05;

/// Orbit drone angular speed (radians per tick)
pub const ORBIT_ANGULAR_SPEED: f32 = 0.05;

/// Weapon kinds
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum WeaponKind {
    RapidPistol,
    SpreadShotgun,
    Sniper,
    RocketLauncher,
    Rifle,
    MachineGun,
    MeleeSword,
    OrbitDrone,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 8] = [
        WeaponKind::RapidPistol,
        WeaponKind::SpreadShotgun,
        WeaponKind::Sniper,
        WeaponKind::RocketLauncher,
        WeaponKind::Rifle,
        WeaponKind::MachineGun,
        WeaponKind::MeleeSword,
        WeaponKind::OrbitDrone,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            WeaponKind::RapidPistol => "rapid-pistol",
            WeaponKind::SpreadShotgun => "spread-shotgun",
            WeaponKind::Sniper => "sniper",
            WeaponKind::RocketLauncher => "rocket-launcher",
            WeaponKind::Rifle => "rifle",
            WeaponKind::MachineGun => "machine-gun",
            WeaponKind::MeleeSword => "melee-sword",
            WeaponKind::OrbitDrone => "orbit-drone",
        }
    }

    /// Cooldown between shots, `None` for weapons that act every tick
    pub fn cooldown_ms(&self, tier: u8) -> Option<u64> {
        let steps = u64::from(tier.clamp(1, MAX_TIER) - 1);
        let cooldown =
            |base: u64, step: u64, floor: u64| base.saturating_sub(step * steps).max(floor);
        match self {
            WeaponKind::RapidPistol => Some(cooldown(500, 50, 200)),
            WeaponKind::SpreadShotgun => Some(cooldown(1500, 100, 800)),
            WeaponKind::Sniper => Some(cooldown(2000, 100, 1000)),
            WeaponKind::RocketLauncher => Some(cooldown(3000, 200, 1500)),
            WeaponKind::Rifle => Some(cooldown(200, 10, 50)),
            WeaponKind::MachineGun => Some(cooldown(100, 5, 20)),
            WeaponKind::MeleeSword | WeaponKind::OrbitDrone => None,
        }
    }

    /// Damage per projectile / pellet / tick of contact, including super bonuses
    pub fn damage(&self, tier: u8) -> u32 {
        let tier = tier.clamp(1, MAX_TIER);
        let steps = u32::from(tier - 1);
        let is_super = tier >= MAX_TIER;
        match self {
            WeaponKind::RapidPistol => 10 + 5 * steps,
            WeaponKind::SpreadShotgun => 5 + 2 * steps,
            WeaponKind::Sniper => 150 + 10 * steps,
            WeaponKind::RocketLauncher => 300 + 20 * steps,
            WeaponKind::Rifle => 8 + 2 * steps,
            WeaponKind::MachineGun => {
                let base = 5 + steps;
                if is_super { base * 2 } else { base }
            }
            WeaponKind::MeleeSword => 20 + 5 * steps,
            WeaponKind::OrbitDrone => 5 + 2 * steps + if is_super { 5 } else { 0 },
        }
    }

    /// Projectiles emitted per trigger pull
    pub fn projectile_count(&self, tier: u8) -> u32 {
        let tier = tier.clamp(1, MAX_TIER);
        match (self, Pattern::for_tier(tier)) {
            (WeaponKind::RapidPistol, Pattern::Super) => 2,
            (WeaponKind::SpreadShotgun, Pattern::Standard) => 5 + u32::from(tier - 1),
            (WeaponKind::SpreadShotgun, Pattern::Super) => 10,
            (WeaponKind::MeleeSword | WeaponKind::OrbitDrone, _) => 0,
            _ => 1,
        }
    }

    /// Sword reach around the player
    pub fn melee_range(tier: u8) -> f32 {
        let tier = tier.clamp(1, MAX_TIER);
        let range = 50.0 + 10.0 * f32::from(tier - 1);
        match Pattern::for_tier(tier) {
            Pattern::Standard => range,
            Pattern::Super => range + 10.0,
        }
    }

    /// Orbit drone distance from the player
    pub fn orbit_radius(tier: u8) -> f32 {
        100.0 + 20.0 * f32::from(tier.clamp(1, MAX_TIER) - 1)
    }

    /// Render colour for this weapon's projectiles
    pub fn projectile_color(&self, tier: u8) -> [u8; 3] {
        match self {
            WeaponKind::RapidPistol => match tier {
                0 | 1 => [255, 255, 0],
                2 => [255, 200, 0],
                _ => [255, 150, 0],
            },
            WeaponKind::SpreadShotgun => [139, 69, 19],
            WeaponKind::Sniper | WeaponKind::Rifle => [0, 255, 0],
            WeaponKind::RocketLauncher => [255, 165, 0],
            WeaponKind::MachineGun => [0, 0, 255],
            WeaponKind::MeleeSword => [200, 200, 200],
            WeaponKind::OrbitDrone => {
                if tier >= MAX_TIER {
                    [255, 0, 255]
                } else {
                    [0, 255, 255]
                }
            }
        }
    }
}

impl fmt::Display for WeaponKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WeaponKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_lowercase().replace('_', "-");
        WeaponKind::ALL
            .into_iter()
            .find(|k| k.name() == wanted)
            .ok_or_else(|| SimError::UnknownWeapon(s.to_string()))
    }
}

/// Firing behavior variant selected by tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    Standard,
    Super,
}

impl Pattern {
    pub fn for_tier(tier: u8) -> Self {
        if tier >= MAX_TIER {
            Pattern::Super
        } else {
            Pattern::Standard
        }
    }
}

/// What a weapon sees when it is updated
#[derive(Debug, Clone, Copy)]
pub struct FireContext {
    pub now_ms: u64,
    /// Player position at the start of the tick
    pub origin: Vec2,
    /// Nearest adversary or boss, if any
    pub target: Option<Target>,
    /// Arena size (width, height)
    pub arena: Vec2,
}

/// Effects a weapon produces in one tick
#[derive(Debug, Clone)]
pub enum Emission {
    /// A projectile to add to the registry
    Shot(Projectile),
    /// Melee damage to everything within `range` of `center`
    Sweep {
        center: Vec2,
        range: f32,
        damage: u32,
        tier: u8,
    },
    /// One orbit drone hit-check at its current orbit position
    OrbitHit { pos: Vec2, damage: u32, tier: u8 },
}

/// An owned weapon instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Weapon {
    pub kind: WeaponKind,
    pub tier: u8,
    pub last_fire_ms: u64,
    /// Super shotgun: the next cycle uses the burst cooldown
    #[serde(default)]
    pub burst_armed: bool,
    /// Orbit drone: current angle around the player
    #[serde(default)]
    pub orbit_angle: f32,
}

impl Weapon {
    /// New tier-1 weapon; its first cooldown starts now
    pub fn new(kind: WeaponKind, now_ms: u64) -> Self {
        Self {
            kind,
            tier: 1,
            last_fire_ms: now_ms,
            burst_armed: false,
            orbit_angle: 0.0,
        }
    }

    pub fn pattern(&self) -> Pattern {
        Pattern::for_tier(self.tier)
    }

    pub fn damage(&self) -> u32 {
        self.kind.damage(self.tier)
    }

    /// Cooldown for the current cycle (accounts for the shotgun burst)
    pub fn effective_cooldown_ms(&self) -> Option<u64> {
        if self.burst_armed {
            Some(SHOTGUN_BURST_COOLDOWN_MS)
        } else {
            self.kind.cooldown_ms(self.tier)
        }
    }

    /// Raise the tier. Upgrades past `MAX_TIER` are absorbed.
    /// Returns true if the tier changed.
    pub fn upgrade(&mut self) -> bool {
        if self.tier >= MAX_TIER {
            return false;
        }
        self.tier += 1;
        if self.tier == MAX_TIER {
            self.burst_armed = false;
        }
        true
    }

    /// Advance the weapon by one tick
    pub fn update<R: Rng>(&mut self, ctx: &FireContext, rng: &mut R) -> Vec<Emission> {
        match self.kind {
            WeaponKind::MeleeSword => vec![Emission::Sweep {
                center: ctx.origin,
                range: WeaponKind::melee_range(self.tier),
                damage: self.damage(),
                tier: self.tier,
            }],
            WeaponKind::OrbitDrone => {
                self.orbit_angle = crate::normalize_angle(self.orbit_angle + ORBIT_ANGULAR_SPEED);
                let radius = WeaponKind::orbit_radius(self.tier);
                let pos = ctx.origin + heading(self.orbit_angle) * radius;
                vec![Emission::OrbitHit {
                    pos,
                    damage: self.damage(),
                    tier: self.tier,
                }]
            }
            _ => {
                let Some(cooldown) = self.effective_cooldown_ms() else {
                    return Vec::new();
                };
                if ctx.now_ms.saturating_sub(self.last_fire_ms) <= cooldown {
                    return Vec::new();
                }
                self.last_fire_ms = ctx.now_ms;
                self.fire(ctx, rng)
                    .into_iter()
                    .map(Emission::Shot)
                    .collect()
            }
        }
    }

    /// Behavior table for cooldown weapons
    fn fire<R: Rng>(&mut self, ctx: &FireContext, rng: &mut R) -> Vec<Projectile> {
        let (kind, tier, damage) = (self.kind, self.tier, self.damage());
        match (kind, self.pattern()) {
            (WeaponKind::RapidPistol, Pattern::Standard)
            | (WeaponKind::Rifle, Pattern::Standard)
            | (WeaponKind::MachineGun, _) => aimed_shot(ctx, kind, tier, damage),
            (WeaponKind::RapidPistol, Pattern::Super) => twin_shot(ctx, kind, tier, damage),
            (WeaponKind::SpreadShotgun, Pattern::Standard) => spread_shot(
                ctx,
                rng,
                kind,
                tier,
                damage,
                kind.projectile_count(tier),
                PI / 8.0,
            ),
            (WeaponKind::SpreadShotgun, Pattern::Super) => {
                let pellets = spread_shot(
                    ctx,
                    rng,
                    kind,
                    tier,
                    damage,
                    kind.projectile_count(tier),
                    PI / 12.0,
                );
                if !pellets.is_empty() {
                    self.burst_armed = !self.burst_armed;
                }
                pellets
            }
            (WeaponKind::Sniper, _) => guided_shot(ctx, kind, tier, damage),
            (WeaponKind::RocketLauncher, Pattern::Standard) => homing_shot(ctx, kind, tier, damage),
            (WeaponKind::RocketLauncher, Pattern::Super) => {
                let aim = random_point(rng, ctx.arena);
                vec![Projectile::homing(
                    ctx.origin,
                    angle_to(ctx.origin, aim),
                    damage,
                    kind,
                    tier,
                )]
            }
            (WeaponKind::Rifle, Pattern::Super) => {
                let aim = random_point(rng, ctx.arena);
                vec![
                    Projectile::straight(ctx.origin, angle_to(ctx.origin, aim), damage, kind, tier)
                        .with_piercing(),
                ]
            }
            (WeaponKind::MeleeSword | WeaponKind::OrbitDrone, _) => Vec::new(),
        }
    }
}

fn random_point<R: Rng>(rng: &mut R, arena: Vec2) -> Vec2 {
    Vec2::new(
        rng.random_range(0.0..=arena.x),
        rng.random_range(0.0..=arena.y),
    )
}

fn aimed_shot(ctx: &FireContext, kind: WeaponKind, tier: u8, damage: u32) -> Vec<Projectile> {
    let Some(target) = ctx.target else {
        return Vec::new();
    };
    let angle = angle_to(ctx.origin, target.pos);
    vec![Projectile::straight(ctx.origin, angle, damage, kind, tier)]
}

fn twin_shot(ctx: &FireContext, kind: WeaponKind, tier: u8, damage: u32) -> Vec<Projectile> {
    let Some(target) = ctx.target else {
        return Vec::new();
    };
    let angle = angle_to(ctx.origin, target.pos);
    [-TWIN_SHOT_OFFSET, TWIN_SHOT_OFFSET]
        .into_iter()
        .map(|offset| Projectile::straight(ctx.origin, angle + offset, damage, kind, tier))
        .collect()
}

fn spread_shot<R: Rng>(
    ctx: &FireContext,
    rng: &mut R,
    kind: WeaponKind,
    tier: u8,
    damage: u32,
    pellets: u32,
    jitter: f32,
) -> Vec<Projectile> {
    let Some(target) = ctx.target else {
        return Vec::new();
    };
    let center = angle_to(ctx.origin, target.pos);
    (0..pellets)
        .map(|_| {
            let angle = center + rng.random_range(-jitter..=jitter);
            Projectile::straight(ctx.origin, angle, damage, kind, tier)
        })
        .collect()
}

fn guided_shot(ctx: &FireContext, kind: WeaponKind, tier: u8, damage: u32) -> Vec<Projectile> {
    let Some(target) = ctx.target else {
        return Vec::new();
    };
    let angle = angle_to(ctx.origin, target.pos);
    vec![Projectile::guided(ctx.origin, angle, damage, kind, tier, Some(target.key))]
}

fn homing_shot(ctx: &FireContext, kind: WeaponKind, tier: u8, damage: u32) -> Vec<Projectile> {
    let Some(target) = ctx.target else {
        return Vec::new();
    };
    let angle = angle_to(ctx.origin, target.pos);
    vec![Projectile::homing(ctx.origin, angle, damage, kind, tier)]
}
