//! Simulation state and entity data
//!
//! `SimState` owns every collection for one run. It is created at startup,
//! reset wholesale on restart, and mutated only by `tick::advance`.

use std::collections::BTreeMap;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::adversary::{Adversary, Boss, BossKind, BossShot};
use super::ledger::DamageLedger;
use super::projectile::{AreaEffect, Projectile};
use super::registry::{EntityId, Registry};
use super::spawner::SpawnTimers;
use super::weapon::{MAX_TIER, Weapon, WeaponKind};
use crate::consts::*;
use crate::error::SimError;
use crate::settings::{Difficulty, Settings};

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for a difficulty before the run starts
    SelectDifficulty,
    /// Active gameplay
    Running,
    /// Waiting for one of the presented weapons to be picked
    LevelUp { choices: [WeaponKind; 3] },
    /// Player died; waiting for a restart
    GameOver,
}

/// The player character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub speed: f32,
    pub health: f32,
    pub max_health: f32,
    pub level: u32,
    pub exp: u32,
    pub exp_to_level: u32,
    /// One weapon per kind
    pub weapons: BTreeMap<WeaponKind, Weapon>,
}

impl Player {
    pub fn new(pos: Vec2, starting_weapon: WeaponKind, now_ms: u64) -> Self {
        let mut weapons = BTreeMap::new();
        weapons.insert(starting_weapon, Weapon::new(starting_weapon, now_ms));
        Self {
            pos,
            speed: PLAYER_SPEED,
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            level: 1,
            exp: 0,
            exp_to_level: STARTING_EXP_THRESHOLD,
            weapons,
        }
    }

    pub fn radius(&self) -> f32 {
        PLAYER_RADIUS
    }

    /// Apply a movement intent (each axis in [-1, 1]) and stay inside the arena
    pub fn move_by(&mut self, intent: Vec2, arena: Vec2) {
        let step = intent.clamp(Vec2::splat(-1.0), Vec2::splat(1.0)) * self.speed;
        let r = Vec2::splat(self.radius());
        self.pos = (self.pos + step).clamp(r, (arena - r).max(r));
    }

    pub fn take_damage(&mut self, amount: f32) {
        self.health = (self.health - amount).clamp(0.0, self.max_health);
    }

    pub fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount).clamp(0.0, self.max_health);
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    /// Orbit drone emitters owned by the player
    pub fn orbit_drones(&self) -> impl Iterator<Item = &Weapon> {
        self.weapons
            .values()
            .filter(|w| w.kind == WeaponKind::OrbitDrone)
    }

    /// Add a weapon kind, or upgrade it if already owned
    pub fn acquire(&mut self, kind: WeaponKind, now_ms: u64) -> WeaponChange {
        match self.weapons.get_mut(&kind) {
            Some(weapon) => {
                if weapon.upgrade() {
                    WeaponChange::Upgraded { tier: weapon.tier }
                } else {
                    WeaponChange::AtMaxTier
                }
            }
            None => {
                self.weapons.insert(kind, Weapon::new(kind, now_ms));
                WeaponChange::Acquired
            }
        }
    }

    pub fn tier_of(&self, kind: WeaponKind) -> Option<u8> {
        self.weapons.get(&kind).map(|w| w.tier)
    }
}

/// Result of applying a weapon choice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponChange {
    Acquired,
    Upgraded { tier: u8 },
    /// Already at `MAX_TIER`; the upgrade was absorbed
    AtMaxTier,
}

impl WeaponChange {
    pub fn is_super(&self) -> bool {
        matches!(self, WeaponChange::Upgraded { tier } if *tier >= MAX_TIER)
    }
}

/// Pickup types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    /// Grants `EXP_PICKUP_VALUE` experience
    Experience,
    /// Heals `HEALTH_PACK_VALUE`
    HealthPack,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub kind: PickupKind,
    pub pos: Vec2,
}

impl Pickup {
    pub fn radius(&self) -> f32 {
        PICKUP_RADIUS
    }
}

/// One orbit drone hit-check, alive for a single tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrbitHit {
    pub pos: Vec2,
    pub damage: u32,
    pub tier: u8,
}

impl OrbitHit {
    pub fn radius(&self) -> f32 {
        if self.tier >= MAX_TIER {
            SUPER_ORBIT_HIT_RADIUS
        } else {
            ORBIT_HIT_RADIUS
        }
    }
}

/// Complete simulation state for one run
#[derive(Debug, Clone)]
pub struct SimState {
    pub settings: Settings,
    pub difficulty: Difficulty,
    pub phase: Phase,
    /// Arena size (width, height)
    pub arena: Vec2,
    /// Simulation time since the run began (microseconds)
    pub clock_us: u64,
    /// Simulation ticks since the run began
    pub time_ticks: u64,
    pub player: Player,
    pub adversaries: Registry<Adversary>,
    pub bosses: Registry<Boss>,
    pub projectiles: Registry<Projectile>,
    pub boss_shots: Registry<BossShot>,
    pub area_effects: Registry<AreaEffect>,
    pub orbit_hits: Registry<OrbitHit>,
    pub pickups: Registry<Pickup>,
    pub ledger: DamageLedger,
    /// Level-ups still waiting for a choice (including the one on screen)
    pub pending_level_ups: u32,
    pub spawn_timers: SpawnTimers,
    pub(crate) rng: Pcg32,
    next_id: EntityId,
}

impl SimState {
    /// Create a simulation waiting for a difficulty selection
    pub fn new(settings: Settings) -> Self {
        let arena = Vec2::new(settings.arena_width, settings.arena_height);
        let player = Player::new(arena / 2.0, settings.starting_weapon, 0);
        Self {
            difficulty: settings.difficulty,
            phase: Phase::SelectDifficulty,
            arena,
            clock_us: 0,
            time_ticks: 0,
            player,
            adversaries: Registry::new(),
            bosses: Registry::new(),
            projectiles: Registry::new(),
            boss_shots: Registry::new(),
            area_effects: Registry::new(),
            orbit_hits: Registry::new(),
            pickups: Registry::new(),
            ledger: DamageLedger::new(),
            pending_level_ups: 0,
            spawn_timers: SpawnTimers::default(),
            rng: Pcg32::seed_from_u64(settings.seed),
            next_id: 1,
            settings,
        }
    }

    /// Create a simulation that is already running at `difficulty`
    pub fn with_difficulty(settings: Settings, difficulty: Difficulty) -> Self {
        let mut state = Self::new(settings);
        state.begin(difficulty);
        state
    }

    /// Start the run at the chosen difficulty
    pub fn start(&mut self, difficulty: Difficulty) -> Result<(), SimError> {
        if self.phase != Phase::SelectDifficulty {
            return Err(SimError::NotAwaitingDifficulty(self.phase));
        }
        self.begin(difficulty);
        Ok(())
    }

    fn begin(&mut self, difficulty: Difficulty) {
        self.reset_run();
        self.difficulty = difficulty;
        self.phase = Phase::Running;
        log::info!(
            "Run started on {} (adversary health {}, spawn interval {} ms)",
            difficulty.as_str(),
            difficulty.base_adversary_health(),
            difficulty.base_spawn_interval_ms()
        );
    }

    /// Restart after game over; the run waits for a new difficulty
    pub fn restart(&mut self) -> Result<(), SimError> {
        if self.phase != Phase::GameOver {
            return Err(SimError::NotGameOver(self.phase));
        }
        self.reset_run();
        self.phase = Phase::SelectDifficulty;
        log::info!("Restarting, awaiting difficulty selection");
        Ok(())
    }

    /// Clear every collection, the ledger and the clock
    fn reset_run(&mut self) {
        self.clock_us = 0;
        self.time_ticks = 0;
        self.player = Player::new(self.arena / 2.0, self.settings.starting_weapon, 0);
        self.adversaries.clear();
        self.bosses.clear();
        self.projectiles.clear();
        self.boss_shots.clear();
        self.area_effects.clear();
        self.orbit_hits.clear();
        self.pickups.clear();
        self.ledger.clear();
        self.pending_level_ups = 0;
        self.spawn_timers = SpawnTimers::default();
    }

    /// Simulation time in milliseconds
    pub fn now_ms(&self) -> u64 {
        self.clock_us / 1000
    }

    /// Whole seconds since the run began
    pub fn elapsed_secs(&self) -> u64 {
        self.clock_us / 1_000_000
    }

    pub(crate) fn advance_clock(&mut self, dt: f32) {
        self.clock_us += (f64::from(dt.max(0.0)) * 1e6).round() as u64;
        self.time_ticks += 1;
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn spawn_adversary_at(&mut self, pos: Vec2, health: f32) -> EntityId {
        let id = self.next_entity_id();
        self.adversaries.insert(id, Adversary::new(pos, health));
        id
    }

    pub fn spawn_boss_at(&mut self, kind: BossKind, pos: Vec2) -> EntityId {
        let id = self.next_entity_id();
        let boss = Boss::new(kind, pos, self.now_ms());
        self.bosses.insert(id, boss);
        id
    }

    pub fn spawn_pickup_at(&mut self, kind: PickupKind, pos: Vec2) -> EntityId {
        let id = self.next_entity_id();
        self.pickups.insert(id, Pickup { kind, pos });
        id
    }

    pub fn add_projectile(&mut self, projectile: Projectile) -> EntityId {
        let id = self.next_entity_id();
        self.projectiles.insert(id, projectile);
        id
    }

    /// Whether any boss (including one awaiting its reward pass) exists
    pub fn boss_present(&self) -> bool {
        !self.bosses.is_empty()
    }

    /// Drop every entity removed during the tick
    pub(crate) fn sweep(&mut self) {
        self.adversaries.sweep();
        self.bosses.sweep();
        self.projectiles.sweep();
        self.boss_shots.sweep();
        self.area_effects.sweep();
        self.orbit_hits.sweep();
        self.pickups.sweep();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_awaits_difficulty() {
        let state = SimState::new(Settings::default());
        assert_eq!(state.phase, Phase::SelectDifficulty);
        assert_eq!(state.player.pos, Vec2::new(400.0, 300.0));
        assert_eq!(state.player.tier_of(WeaponKind::RapidPistol), Some(1));
    }

    #[test]
    fn test_start_only_once() {
        let mut state = SimState::new(Settings::default());
        state.start(Difficulty::Hard).unwrap();
        assert_eq!(state.phase, Phase::Running);
        assert_eq!(state.difficulty, Difficulty::Hard);
        assert!(matches!(
            state.start(Difficulty::Easy),
            Err(SimError::NotAwaitingDifficulty(Phase::Running))
        ));
    }

    #[test]
    fn test_player_movement_clamped_to_arena() {
        let mut player = Player::new(Vec2::new(30.0, 30.0), WeaponKind::Rifle, 0);
        let arena = Vec2::new(800.0, 600.0);
        player.move_by(Vec2::new(-3.0, -1.0), arena);
        assert_eq!(player.pos, Vec2::new(25.0, 25.0));
        player.move_by(Vec2::new(1.0, 1.0), arena);
        assert_eq!(player.pos, Vec2::new(30.0, 30.0));
    }

    #[test]
    fn test_health_stays_in_range() {
        let mut player = Player::new(Vec2::ZERO, WeaponKind::Rifle, 0);
        player.take_damage(250.0);
        assert_eq!(player.health, 0.0);
        assert!(player.is_dead());
        player.heal(500.0);
        assert_eq!(player.health, player.max_health);
    }

    #[test]
    fn test_acquire_then_upgrade() {
        let mut player = Player::new(Vec2::ZERO, WeaponKind::Rifle, 0);
        assert_eq!(player.acquire(WeaponKind::OrbitDrone, 10), WeaponChange::Acquired);
        assert_eq!(player.orbit_drones().count(), 1);
        assert_eq!(
            player.acquire(WeaponKind::Rifle, 10),
            WeaponChange::Upgraded { tier: 2 }
        );
        let change = player.acquire(WeaponKind::Rifle, 10);
        assert!(change.is_super());
        assert_eq!(player.acquire(WeaponKind::Rifle, 10), WeaponChange::AtMaxTier);
        assert_eq!(player.weapons.len(), 2);
    }

    #[test]
    fn test_clock() {
        let mut state = SimState::with_difficulty(Settings::default(), Difficulty::Normal);
        for _ in 0..60 {
            state.advance_clock(SIM_DT);
        }
        assert_eq!(state.elapsed_secs(), 1);
        assert_eq!(state.time_ticks, 60);
        assert!(state.now_ms() >= 1000 && state.now_ms() <= 1001);
    }
}
