//! Read-only views of the simulation for renderers and reports

use glam::Vec2;
use serde::Serialize;

use super::adversary::BossKind;
use super::ledger::LedgerEntry;
use super::projectile::Motion;
use super::registry::EntityId;
use super::state::{Phase, PickupKind, SimState};
use super::weapon::{MAX_TIER, WeaponKind};
use crate::settings::Difficulty;

/// Drone render diameter (normal, tier 3)
const DRONE_SIZE: f32 = 20.0;
const SUPER_DRONE_SIZE: f32 = 30.0;

#[derive(Debug, Clone, Serialize)]
pub struct WeaponView {
    pub kind: WeaponKind,
    pub tier: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub pos: Vec2,
    pub radius: f32,
    pub health: f32,
    pub max_health: f32,
    pub level: u32,
    pub exp: u32,
    pub exp_to_level: u32,
    pub weapons: Vec<WeaponView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdversaryView {
    pub id: EntityId,
    pub pos: Vec2,
    pub radius: f32,
    pub health: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct BossView {
    pub id: EntityId,
    pub kind: BossKind,
    pub name: &'static str,
    pub pos: Vec2,
    pub radius: f32,
    pub health: f32,
    pub max_health: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectileView {
    pub id: EntityId,
    pub source: WeaponKind,
    pub pos: Vec2,
    pub angle: f32,
    pub radius: f32,
    pub color: [u8; 3],
    pub guided: bool,
    /// Oldest first; empty unless guided
    pub trail: Vec<Vec2>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BossShotView {
    pub pos: Vec2,
    pub radius: f32,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AreaEffectView {
    pub center: Vec2,
    pub radius: f32,
    pub age_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrbitView {
    pub pos: Vec2,
    pub size: f32,
    pub color: [u8; 3],
}

#[derive(Debug, Clone, Serialize)]
pub struct PickupView {
    pub kind: PickupKind,
    pub pos: Vec2,
    pub radius: f32,
}

/// Everything a renderer or end-of-run screen needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub phase: Phase,
    pub difficulty: Difficulty,
    pub arena: Vec2,
    pub time_ms: u64,
    pub elapsed_secs: u64,
    pub player: PlayerView,
    pub adversaries: Vec<AdversaryView>,
    pub bosses: Vec<BossView>,
    pub projectiles: Vec<ProjectileView>,
    pub boss_shots: Vec<BossShotView>,
    pub area_effects: Vec<AreaEffectView>,
    pub orbit_hits: Vec<OrbitView>,
    pub pickups: Vec<PickupView>,
    /// Damage per weapon, highest first
    pub ledger: Vec<LedgerEntry>,
    pub total_damage: u64,
    /// Weapons on offer while paused for a level-up
    pub choices: Option<[WeaponKind; 3]>,
}

impl SimState {
    pub fn snapshot(&self) -> Snapshot {
        let now = self.now_ms();
        let player = &self.player;

        Snapshot {
            phase: self.phase,
            difficulty: self.difficulty,
            arena: self.arena,
            time_ms: now,
            elapsed_secs: self.elapsed_secs(),
            player: PlayerView {
                pos: player.pos,
                radius: player.radius(),
                health: player.health,
                max_health: player.max_health,
                level: player.level,
                exp: player.exp,
                exp_to_level: player.exp_to_level,
                weapons: player
                    .weapons
                    .values()
                    .map(|w| WeaponView {
                        kind: w.kind,
                        tier: w.tier,
                    })
                    .collect(),
            },
            adversaries: self
                .adversaries
                .iter()
                .map(|(id, a)| AdversaryView {
                    id,
                    pos: a.pos,
                    radius: a.radius(),
                    health: a.health,
                })
                .collect(),
            bosses: self
                .bosses
                .iter()
                .filter(|(_, b)| !b.defeated)
                .map(|(id, b)| BossView {
                    id,
                    kind: b.kind,
                    name: b.name(),
                    pos: b.pos,
                    radius: b.radius(),
                    health: b.health,
                    max_health: b.max_health,
                })
                .collect(),
            projectiles: self
                .projectiles
                .iter()
                .map(|(id, p)| ProjectileView {
                    id,
                    source: p.source,
                    pos: p.pos,
                    angle: p.angle,
                    radius: p.radius(),
                    color: p.source.projectile_color(p.tier),
                    guided: matches!(p.motion, Motion::Guided { .. }),
                    trail: p.trail(),
                })
                .collect(),
            boss_shots: self
                .boss_shots
                .iter()
                .map(|(_, s)| BossShotView {
                    pos: s.pos,
                    radius: s.radius(),
                    text: s.text.clone(),
                })
                .collect(),
            area_effects: self
                .area_effects
                .iter()
                .map(|(_, fx)| AreaEffectView {
                    center: fx.center,
                    radius: fx.radius,
                    age_ms: fx.age_ms(now),
                })
                .collect(),
            orbit_hits: self
                .orbit_hits
                .iter()
                .map(|(_, hit)| OrbitView {
                    pos: hit.pos,
                    size: if hit.tier >= MAX_TIER {
                        SUPER_DRONE_SIZE
                    } else {
                        DRONE_SIZE
                    },
                    color: WeaponKind::OrbitDrone.projectile_color(hit.tier),
                })
                .collect(),
            pickups: self
                .pickups
                .iter()
                .map(|(_, p)| PickupView {
                    kind: p.kind,
                    pos: p.pos,
                    radius: p.radius(),
                })
                .collect(),
            ledger: self.ledger.ranked(),
            total_damage: self.ledger.total(),
            choices: self.pending_choices(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::projectile::Projectile;
    use crate::sim::state::OrbitHit;

    #[test]
    fn test_snapshot_reflects_state() {
        let mut state = SimState::with_difficulty(Settings::default(), Difficulty::Hard);
        state.spawn_adversary_at(Vec2::new(10.0, 10.0), 12.0);
        state.spawn_boss_at(BossKind::Babuler, Vec2::new(700.0, 10.0));
        state.add_projectile(Projectile::guided(
            Vec2::new(400.0, 300.0),
            0.0,
            150,
            WeaponKind::Sniper,
            1,
            None,
        ));
        state.ledger.record(WeaponKind::Rifle, 40);
        state.ledger.record(WeaponKind::Sniper, 150);

        let snap = state.snapshot();
        assert_eq!(snap.phase, Phase::Running);
        assert_eq!(snap.difficulty, Difficulty::Hard);
        assert_eq!(snap.adversaries.len(), 1);
        assert_eq!(snap.bosses[0].name, "babuler");
        assert_eq!(snap.bosses[0].max_health, 500.0);
        assert!(snap.projectiles[0].guided);
        assert_eq!(snap.projectiles[0].color, [0, 255, 0]);
        assert_eq!(snap.ledger[0].weapon, WeaponKind::Sniper);
        assert_eq!(snap.total_damage, 190);
        assert!(snap.choices.is_none());
    }

    #[test]
    fn test_super_drone_renders_larger() {
        let mut state = SimState::with_difficulty(Settings::default(), Difficulty::Easy);
        let id = state.next_entity_id();
        state.orbit_hits.insert(
            id,
            OrbitHit {
                pos: Vec2::ZERO,
                damage: 10,
                tier: 3,
            },
        );
        let snap = state.snapshot();
        assert_eq!(snap.orbit_hits[0].size, SUPER_DRONE_SIZE);
        assert_eq!(snap.orbit_hits[0].color, [255, 0, 255]);
    }

    #[test]
    fn test_snapshot_serializes() {
        let state = SimState::new(Settings::default());
        let json = serde_json::to_string(&state.snapshot()).unwrap();
        assert!(json.contains("\"phase\":\"SelectDifficulty\""));
    }
}
