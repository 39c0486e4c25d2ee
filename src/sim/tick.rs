//! Fixed timestep simulation tick
//!
//! Running ticks resolve in a fixed order: clock, player movement, spawner,
//! weapons, projectiles, area effects, hostiles, pickups, then the end-of-tick
//! sweep and the game-over check. Aiming and steering read the target
//! positions captured before any of it moves.

use glam::Vec2;

use super::collision::{Battlefield, TargetSet, circles_overlap, in_bounds};
use super::projectile::{AreaEffect, Motion, Projectile};
use super::state::{OrbitHit, Phase, PickupKind, SimState};
use super::weapon::{Emission, FireContext, WeaponKind};
use crate::consts::*;
use crate::error::SimError;
use crate::settings::Difficulty;

/// Autopilot flees threats closer than this
const AUTOPILOT_DANGER_RADIUS: f32 = 150.0;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Movement intent; each axis in [-1, 1]
    pub movement: Vec2,
    /// Index of the weapon picked from the presented choices
    pub choice: Option<usize>,
    /// Restart after game over
    pub restart: bool,
    /// Difficulty for a run that has not started yet
    pub difficulty: Option<Difficulty>,
    /// Autopilot: dodge threats, pick the first weapon offered, start on the
    /// configured difficulty
    pub idle_mode: bool,
}

/// Advance the simulation by one fixed timestep
pub fn advance(state: &mut SimState, input: &TickInput, dt: f32) {
    match state.phase {
        Phase::SelectDifficulty => {
            let chosen = input
                .difficulty
                .or(input.idle_mode.then_some(state.settings.difficulty));
            if let Some(difficulty) = chosen {
                if let Err(err) = state.start(difficulty) {
                    log::warn!("Ignoring difficulty selection: {}", err);
                }
            }
            return;
        }
        Phase::LevelUp { .. } => {
            let choice = input.choice.or(input.idle_mode.then_some(0));
            if let Some(index) = choice {
                if let Err(err) = state.choose_weapon(index) {
                    log::warn!("Ignoring weapon choice: {}", err);
                }
            }
            return;
        }
        Phase::GameOver => {
            if input.restart {
                if let Err(err) = state.restart() {
                    log::warn!("Ignoring restart: {}", err);
                }
            }
            return;
        }
        Phase::Running => {}
    }

    if input.restart {
        log::warn!("Ignoring restart: {}", SimError::NotGameOver(state.phase));
    }
    if let Some(index) = input.choice {
        log::warn!(
            "Ignoring weapon choice {}: {}",
            index,
            SimError::NotAwaitingChoice(state.phase)
        );
    }

    state.advance_clock(dt);
    let now = state.now_ms();

    let intent = if input.idle_mode {
        autopilot(state)
    } else {
        input.movement
    };
    state.player.move_by(intent, state.arena);

    // Drone hit-checks only live for the tick that produced them
    state.orbit_hits.clear();

    state.run_spawner();

    let targets = TargetSet::capture(&state.adversaries, &state.bosses);
    let player_pos = state.player.pos;

    let mut exp = fire_weapons(state, &targets, player_pos, now);
    exp += update_projectiles(state, &targets, now);
    exp += update_area_effects(state, now);
    state.grant_experience(exp);

    state.update_hostiles(player_pos);
    collect_pickups(state);

    state.sweep();

    if state.player.is_dead() {
        state.phase = Phase::GameOver;
        log::info!(
            "Game over at {}s, level {}, {} total damage",
            state.elapsed_secs(),
            state.player.level,
            state.ledger.total()
        );
    }
}

/// Update every owned weapon and apply what they emit. Returns experience
/// earned by melee and drone kills.
fn fire_weapons(state: &mut SimState, targets: &TargetSet, origin: Vec2, now: u64) -> u32 {
    let ctx = FireContext {
        now_ms: now,
        origin,
        target: targets.nearest(origin),
        arena: state.arena,
    };
    let mut emissions = Vec::new();
    for weapon in state.player.weapons.values_mut() {
        emissions.extend(weapon.update(&ctx, &mut state.rng));
    }

    let mut shots = Vec::new();
    let mut drone_hits = Vec::new();
    let mut field = Battlefield::new(&mut state.adversaries, &mut state.bosses, &mut state.ledger);
    for emission in emissions {
        match emission {
            Emission::Shot(projectile) => shots.push(projectile),
            Emission::Sweep {
                center,
                range,
                damage,
                ..
            } => {
                let reach = field.within_reach(center, range);
                field.strike_all(&reach, damage, WeaponKind::MeleeSword);
            }
            Emission::OrbitHit { pos, damage, tier } => {
                let hit = OrbitHit { pos, damage, tier };
                let touching = field.overlapping(hit.pos, hit.radius());
                field.strike_all(&touching, damage, WeaponKind::OrbitDrone);
                drone_hits.push(hit);
            }
        }
    }
    let exp = field.exp_earned;

    for projectile in shots {
        state.add_projectile(projectile);
    }
    for hit in drone_hits {
        let id = state.next_entity_id();
        state.orbit_hits.insert(id, hit);
    }
    exp
}

/// Steer, move and resolve hits for every player projectile
fn update_projectiles(state: &mut SimState, targets: &TargetSet, now: u64) -> u32 {
    let arena = state.arena;
    let mut explosions = Vec::new();
    let mut field = Battlefield::new(&mut state.adversaries, &mut state.bosses, &mut state.ledger);

    for id in state.projectiles.ids() {
        let Some(projectile) = state.projectiles.get_mut(id) else {
            continue;
        };
        projectile.steer(targets);
        projectile.advance();
        let Projectile {
            pos,
            damage,
            source,
            piercing,
            ..
        } = *projectile;
        let radius = projectile.radius();
        let homing = matches!(projectile.motion, Motion::Homing);

        if !in_bounds(pos, arena) {
            state.projectiles.kill(id);
            continue;
        }

        let hits = field.overlapping(pos, radius);
        let Some(&first) = hits.first() else {
            continue;
        };
        if homing {
            explosions.push(AreaEffect::explosion(pos, damage, source, now));
            state.projectiles.kill(id);
        } else if piercing {
            field.strike_all(&hits, damage, source);
        } else {
            field.strike(first, damage, source);
            state.projectiles.kill(id);
        }
    }
    let exp = field.exp_earned;

    for effect in explosions {
        let id = state.next_entity_id();
        state.area_effects.insert(id, effect);
    }
    exp
}

/// Damage everything inside each live area effect; expire old ones
fn update_area_effects(state: &mut SimState, now: u64) -> u32 {
    let mut field = Battlefield::new(&mut state.adversaries, &mut state.bosses, &mut state.ledger);
    for id in state.area_effects.ids() {
        let Some(effect) = state.area_effects.get(id) else {
            continue;
        };
        if effect.expired(now) {
            state.area_effects.kill(id);
            continue;
        }
        let (damage, source) = (effect.damage, effect.source);
        let caught = field.overlapping(effect.center, effect.radius);
        field.strike_all(&caught, damage, source);
    }
    field.exp_earned
}

fn collect_pickups(state: &mut SimState) {
    let mut exp = 0;
    for id in state.pickups.ids() {
        let Some(pickup) = state.pickups.get(id) else {
            continue;
        };
        if !circles_overlap(pickup.pos, pickup.radius(), state.player.pos, state.player.radius()) {
            continue;
        }
        match pickup.kind {
            PickupKind::Experience => exp += EXP_PICKUP_VALUE,
            PickupKind::HealthPack => state.player.heal(HEALTH_PACK_VALUE),
        }
        log::debug!("Collected {:?}", pickup.kind);
        state.pickups.kill(id);
    }
    state.grant_experience(exp);
}

/// Movement intent for idle mode: run from the nearest nearby threat,
/// otherwise head for the nearest pickup, otherwise drift to the center
fn autopilot(state: &SimState) -> Vec2 {
    let pos = state.player.pos;
    let center = state.arena / 2.0;

    let threat = state
        .adversaries
        .iter()
        .map(|(_, a)| a.pos)
        .chain(
            state
                .bosses
                .iter()
                .filter(|(_, b)| !b.defeated)
                .map(|(_, b)| b.pos),
        )
        .chain(state.boss_shots.iter().map(|(_, s)| s.pos))
        .filter(|t| t.distance(pos) < AUTOPILOT_DANGER_RADIUS)
        .min_by(|a, b| {
            a.distance_squared(pos)
                .partial_cmp(&b.distance_squared(pos))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    if let Some(threat) = threat {
        // Bias toward the center so the player does not pin itself to a wall
        let away = (pos - threat).normalize_or_zero();
        let inward = (center - pos).normalize_or_zero() * 0.5;
        return (away + inward).normalize_or_zero();
    }

    let pickup = state
        .pickups
        .iter()
        .map(|(_, p)| p.pos)
        .min_by(|a, b| {
            a.distance_squared(pos)
                .partial_cmp(&b.distance_squared(pos))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    if let Some(pickup) = pickup {
        return (pickup - pos).normalize_or_zero();
    }

    if pos.distance(center) > state.player.speed {
        (center - pos).normalize_or_zero()
    } else {
        Vec2::ZERO
    }
}
