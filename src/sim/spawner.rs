//! Time-scaled spawning of adversaries, bosses and pickups

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::adversary::BossKind;
use super::state::{PickupKind, SimState};
use crate::consts::*;
use crate::settings::Difficulty;

/// When each spawn cadence last fired (ms since run start)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpawnTimers {
    pub last_adversary_ms: u64,
    pub last_boss_ms: u64,
}

/// Adversary spawn interval after `elapsed_secs`. Not floored: once it
/// reaches zero or below an adversary spawns every tick.
pub fn spawn_interval_ms(difficulty: Difficulty, elapsed_secs: u64) -> i64 {
    difficulty.base_spawn_interval_ms() - SPAWN_INTERVAL_DECAY_MS * elapsed_secs as i64
}

/// Health of a standard adversary spawned after `elapsed_secs`
pub fn spawn_health(difficulty: Difficulty, elapsed_secs: u64) -> f32 {
    difficulty.base_adversary_health() + (elapsed_secs as f32).powf(HEALTH_GROWTH_EXPONENT)
}

/// Random point on the arena edge
pub fn boundary_point<R: Rng>(rng: &mut R, arena: Vec2) -> Vec2 {
    match rng.random_range(0..4) {
        0 => Vec2::new(rng.random_range(0.0..=arena.x), 0.0),
        1 => Vec2::new(rng.random_range(0.0..=arena.x), arena.y),
        2 => Vec2::new(0.0, rng.random_range(0.0..=arena.y)),
        _ => Vec2::new(arena.x, rng.random_range(0.0..=arena.y)),
    }
}

/// Random point at least `margin` away from every edge
pub fn interior_point<R: Rng>(rng: &mut R, arena: Vec2, margin: f32) -> Vec2 {
    let lo = Vec2::splat(margin).min(arena / 2.0);
    let hi = (arena - Vec2::splat(margin)).max(lo);
    Vec2::new(
        rng.random_range(lo.x..=hi.x),
        rng.random_range(lo.y..=hi.y),
    )
}

impl SimState {
    /// Spawner phase of the tick
    pub(crate) fn run_spawner(&mut self) {
        self.collect_defeated_bosses();
        self.spawn_adversaries();
        self.spawn_boss();
        self.spawn_pickups();
    }

    /// Drop rewards for bosses defeated last tick and remove them
    fn collect_defeated_bosses(&mut self) {
        let defeated: Vec<_> = self
            .bosses
            .iter()
            .filter(|(_, b)| b.defeated)
            .map(|(id, b)| (id, b.kind))
            .collect();
        for (id, kind) in defeated {
            self.bosses.kill(id);
            for _ in 0..kind.reward_packs() {
                let pos = interior_point(&mut self.rng, self.arena, PICKUP_MARGIN);
                self.spawn_pickup_at(PickupKind::HealthPack, pos);
            }
            log::debug!("{} dropped {} health packs", kind.name(), kind.reward_packs());
        }
    }

    fn spawn_adversaries(&mut self) {
        let now = self.now_ms();
        let interval = spawn_interval_ms(self.difficulty, self.elapsed_secs());
        let health = spawn_health(self.difficulty, self.elapsed_secs());
        let mut spawned = 0;
        while spawned < MAX_SPAWNS_PER_TICK
            && now.saturating_sub(self.spawn_timers.last_adversary_ms) as i64 > interval
        {
            let pos = boundary_point(&mut self.rng, self.arena);
            self.spawn_adversary_at(pos, health);
            self.spawn_timers.last_adversary_ms = now;
            spawned += 1;
        }
    }

    fn spawn_boss(&mut self) {
        let now = self.now_ms();
        if now.saturating_sub(self.spawn_timers.last_boss_ms) <= BOSS_SPAWN_INTERVAL_MS
            || self.boss_present()
        {
            return;
        }
        let kind = if self.rng.random_bool(0.5) {
            BossKind::Babuler
        } else {
            BossKind::Standard
        };
        let pos = boundary_point(&mut self.rng, self.arena);
        self.spawn_boss_at(kind, pos);
        self.spawn_timers.last_boss_ms = now;
        log::info!("Boss {} spawned at {}s", kind.name(), self.elapsed_secs());
    }

    fn spawn_pickups(&mut self) {
        if self.rng.random_bool(EXP_PICKUP_CHANCE) {
            let pos = interior_point(&mut self.rng, self.arena, PICKUP_MARGIN);
            self.spawn_pickup_at(PickupKind::Experience, pos);
        }
        if self.rng.random_bool(HEALTH_PACK_CHANCE) {
            let pos = interior_point(&mut self.rng, self.arena, PICKUP_MARGIN);
            self.spawn_pickup_at(PickupKind::HealthPack, pos);
        }
    }
}
