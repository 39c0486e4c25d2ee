//! Adversary and boss behavior
//!
//! Everything hostile moves straight at the player's start-of-tick position.
//! Standard adversaries die on contact; bosses keep pushing and also fire
//! ranged shots on a cooldown.

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::collision::{circles_overlap, in_bounds};
use super::state::SimState;
use crate::consts::*;
use crate::{angle_to, heading};

/// Phrases the text boss throws at the player
pub const BABULER_PHRASES: [&str; 4] = ["7891347", "adsldasj", "asdjklhja87", "dasda2112"];

/// Step `pos` toward `goal` by `speed`
#[inline]
pub fn pursue(pos: Vec2, goal: Vec2, speed: f32) -> Vec2 {
    pos + heading(angle_to(pos, goal)) * speed
}

/// A standard adversary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Adversary {
    pub pos: Vec2,
    pub speed: f32,
    pub health: f32,
    /// Health at spawn; health never exceeds it
    pub spawn_health: f32,
}

impl Adversary {
    pub fn new(pos: Vec2, health: f32) -> Self {
        Self {
            pos,
            speed: ADVERSARY_SPEED,
            health,
            spawn_health: health,
        }
    }

    pub fn radius(&self) -> f32 {
        ADVERSARY_RADIUS
    }
}

/// Boss variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossKind {
    /// Fires generic bolts every 2 s
    Standard,
    /// Fires text phrases every 1.5 s, ten times the health
    Babuler,
}

impl BossKind {
    pub fn name(&self) -> &'static str {
        match self {
            BossKind::Standard => "Boss",
            BossKind::Babuler => "babuler",
        }
    }

    pub fn max_health(&self) -> f32 {
        match self {
            BossKind::Standard => BOSS_BASE_HEALTH,
            BossKind::Babuler => BOSS_BASE_HEALTH * TEXT_BOSS_HEALTH_FACTOR,
        }
    }

    pub fn shot_cooldown_ms(&self) -> u64 {
        match self {
            BossKind::Standard => BOSS_SHOT_COOLDOWN_MS,
            BossKind::Babuler => TEXT_BOSS_SHOT_COOLDOWN_MS,
        }
    }

    /// Health packs dropped when defeated
    pub fn reward_packs(&self) -> u32 {
        match self {
            BossKind::Standard => 1,
            BossKind::Babuler => 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub kind: BossKind,
    pub pos: Vec2,
    pub speed: f32,
    pub health: f32,
    pub max_health: f32,
    pub last_shot_ms: u64,
    /// Set when health reaches zero; the boss is removed by the next
    /// spawner pass after its reward drops
    pub defeated: bool,
}

impl Boss {
    pub fn new(kind: BossKind, pos: Vec2, now_ms: u64) -> Self {
        let max_health = kind.max_health();
        Self {
            kind,
            pos,
            speed: BOSS_SPEED,
            health: max_health,
            max_health,
            last_shot_ms: now_ms,
            defeated: false,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn radius(&self) -> f32 {
        BOSS_RADIUS
    }

    /// Fire at `aim` if the cooldown has elapsed
    pub fn try_shoot<R: Rng>(&mut self, aim: Vec2, now_ms: u64, rng: &mut R) -> Option<BossShot> {
        if now_ms.saturating_sub(self.last_shot_ms) <= self.kind.shot_cooldown_ms() {
            return None;
        }
        self.last_shot_ms = now_ms;
        let angle = angle_to(self.pos, aim);
        let text = match self.kind {
            BossKind::Standard => None,
            BossKind::Babuler => BABULER_PHRASES.choose(rng).map(|s| s.to_string()),
        };
        Some(BossShot {
            pos: self.pos,
            angle,
            speed: BOSS_SHOT_SPEED,
            text,
        })
    }
}

/// A hostile projectile fired by a boss
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossShot {
    pub pos: Vec2,
    pub angle: f32,
    pub speed: f32,
    /// Phrase carried by text-boss shots
    pub text: Option<String>,
}

impl BossShot {
    pub fn radius(&self) -> f32 {
        BOSS_SHOT_RADIUS
    }
}

impl SimState {
    /// Move adversaries and bosses toward `player_pos`, resolve contact
    /// damage and boss shots
    pub(crate) fn update_hostiles(&mut self, player_pos: Vec2) {
        let now = self.now_ms();
        let player_radius = self.player.radius();

        for id in self.adversaries.ids() {
            let Some(adversary) = self.adversaries.get_mut(id) else {
                continue;
            };
            adversary.pos = pursue(adversary.pos, player_pos, adversary.speed);
            if circles_overlap(adversary.pos, adversary.radius(), self.player.pos, player_radius) {
                self.player.take_damage(ADVERSARY_CONTACT_DAMAGE);
                self.adversaries.kill(id);
            }
        }

        let mut fired = Vec::new();
        for (_, boss) in self.bosses.iter_mut() {
            if boss.defeated {
                continue;
            }
            boss.pos = pursue(boss.pos, player_pos, boss.speed);
            if let Some(shot) = boss.try_shoot(player_pos, now, &mut self.rng) {
                fired.push(shot);
            }
            if circles_overlap(boss.pos, boss.radius(), self.player.pos, player_radius) {
                self.player.take_damage(BOSS_CONTACT_DAMAGE);
            }
        }
        for shot in fired {
            let id = self.next_entity_id();
            self.boss_shots.insert(id, shot);
        }

        for (_, shot) in self.boss_shots.iter_mut() {
            shot.pos += heading(shot.angle) * shot.speed;
        }
        for id in self.boss_shots.ids() {
            let Some(shot) = self.boss_shots.get(id) else {
                continue;
            };
            if !in_bounds(shot.pos, self.arena) {
                self.boss_shots.kill(id);
            } else if circles_overlap(shot.pos, shot.radius(), self.player.pos, player_radius) {
                self.player.take_damage(BOSS_SHOT_DAMAGE);
                self.boss_shots.kill(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{Difficulty, Settings};
    use crate::sim::EntityId;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn running() -> SimState {
        let mut state = SimState::with_difficulty(Settings::default(), Difficulty::Normal);
        state.player.pos = Vec2::new(400.0, 300.0);
        state
    }

    fn add_shot(state: &mut SimState, pos: Vec2, angle: f32) -> EntityId {
        let id = state.next_entity_id();
        let shot = BossShot {
            pos,
            angle,
            speed: BOSS_SHOT_SPEED,
            text: None,
        };
        state.boss_shots.insert(id, shot);
        id
    }

    #[test]
    fn test_pursue_moves_by_speed() {
        let next = pursue(Vec2::new(0.0, 0.0), Vec2::new(30.0, 40.0), 5.0);
        assert!((next - Vec2::new(3.0, 4.0)).length() < 1e-5);
    }

    #[test]
    fn test_boss_kinds() {
        assert_eq!(BossKind::Standard.max_health(), 50.0);
        assert_eq!(BossKind::Babuler.max_health(), 500.0);
        assert_eq!(BossKind::Standard.shot_cooldown_ms(), 2000);
        assert_eq!(BossKind::Babuler.shot_cooldown_ms(), 1500);
        assert_eq!(BossKind::Babuler.reward_packs(), 3);
        assert_eq!(BossKind::Standard.reward_packs(), 1);
    }

    #[test]
    fn test_boss_shot_cadence() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut boss = Boss::new(BossKind::Standard, Vec2::ZERO, 0);
        let aim = Vec2::new(100.0, 0.0);
        assert!(boss.try_shoot(aim, 2000, &mut rng).is_none());
        let shot = boss.try_shoot(aim, 2001, &mut rng).unwrap();
        assert!(shot.text.is_none());
        assert!(shot.angle.abs() < 1e-6);
        assert!(boss.try_shoot(aim, 3000, &mut rng).is_none());
    }

    #[test]
    fn test_text_boss_throws_phrases() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut boss = Boss::new(BossKind::Babuler, Vec2::ZERO, 0);
        let shot = boss.try_shoot(Vec2::new(0.0, 10.0), 1501, &mut rng).unwrap();
        let text = shot.text.unwrap();
        assert!(BABULER_PHRASES.contains(&text.as_str()));
    }

    #[test]
    fn test_boss_contact_damages_every_tick_and_boss_survives() {
        let mut state = running();
        let id = state.spawn_boss_at(BossKind::Standard, Vec2::new(410.0, 300.0));
        let player_pos = state.player.pos;
        state.update_hostiles(player_pos);
        assert_eq!(state.player.health, PLAYER_MAX_HEALTH - BOSS_CONTACT_DAMAGE);
        state.update_hostiles(player_pos);
        assert_eq!(state.player.health, PLAYER_MAX_HEALTH - 2.0 * BOSS_CONTACT_DAMAGE);

        let boss = state.bosses.get(id).unwrap();
        assert!(!boss.defeated);
        assert_eq!(boss.health, boss.max_health);
        assert_eq!(state.bosses.len(), 1);
    }

    #[test]
    fn test_defeated_boss_deals_no_contact_damage() {
        let mut state = running();
        let id = state.spawn_boss_at(BossKind::Standard, Vec2::new(410.0, 300.0));
        if let Some(boss) = state.bosses.get_mut(id) {
            boss.defeated = true;
        }
        let player_pos = state.player.pos;
        state.update_hostiles(player_pos);
        assert_eq!(state.player.health, PLAYER_MAX_HEALTH);
    }

    #[test]
    fn test_boss_shot_hit_damages_player_and_is_removed() {
        let mut state = running();
        let id = add_shot(&mut state, Vec2::new(420.0, 300.0), 0.0);
        let player_pos = state.player.pos;
        state.update_hostiles(player_pos);
        assert_eq!(state.player.health, PLAYER_MAX_HEALTH - BOSS_SHOT_DAMAGE);
        assert!(!state.boss_shots.is_alive(id));
        assert!(state.boss_shots.is_empty());
    }

    #[test]
    fn test_boss_shot_leaving_arena_is_culled() {
        let mut state = running();
        let edge = Vec2::new(state.arena.x - 1.0, 100.0);
        let escaping = add_shot(&mut state, edge, 0.0);
        let flying = add_shot(&mut state, Vec2::new(100.0, 100.0), 0.0);
        let player_pos = state.player.pos;
        state.update_hostiles(player_pos);

        assert!(!state.boss_shots.is_alive(escaping));
        let shot = state.boss_shots.get(flying).unwrap();
        assert!((shot.pos - Vec2::new(100.0 + BOSS_SHOT_SPEED, 100.0)).length() < 1e-4);
        assert_eq!(state.player.health, PLAYER_MAX_HEALTH);
    }
}
