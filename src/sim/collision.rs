//! Collision detection and damage resolution
//!
//! Every entity is a circle. Hit tests run against the live adversary and
//! boss registries in a fixed order: standard adversaries first, then bosses,
//! each in insertion order.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::adversary::{Adversary, Boss};
use super::ledger::DamageLedger;
use super::registry::{EntityId, Registry};
use super::weapon::WeaponKind;
use crate::consts::{ADVERSARY_EXP, BOSS_EXP};

/// Signed distance from `p` to a circle
#[inline]
pub fn sd_circle(p: Vec2, center: Vec2, radius: f32) -> f32 {
    (p - center).length() - radius
}

/// Whether two circles overlap
#[inline]
pub fn circles_overlap(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> bool {
    sd_circle(a, b, b_radius) < a_radius
}

/// Whether a point lies inside the arena rectangle
#[inline]
pub fn in_bounds(p: Vec2, arena: Vec2) -> bool {
    p.x >= 0.0 && p.y >= 0.0 && p.x <= arena.x && p.y <= arena.y
}

/// Identifies a damageable entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetKey {
    Adversary(EntityId),
    Boss(EntityId),
}

/// A damageable entity's position as of a snapshot
#[derive(Debug, Clone, Copy)]
pub struct Target {
    pub key: TargetKey,
    pub pos: Vec2,
    pub radius: f32,
}

/// Start-of-tick positions of every live target
///
/// Weapons and steering projectiles aim with this snapshot so that the order
/// in which entities are processed never biases where anything points.
#[derive(Debug, Clone, Default)]
pub struct TargetSet {
    targets: Vec<Target>,
}

impl TargetSet {
    pub fn capture(adversaries: &Registry<Adversary>, bosses: &Registry<Boss>) -> Self {
        let targets = adversaries
            .iter()
            .map(|(id, a)| Target {
                key: TargetKey::Adversary(id),
                pos: a.pos,
                radius: a.radius(),
            })
            .chain(bosses.iter().filter(|(_, b)| !b.defeated).map(|(id, b)| Target {
                key: TargetKey::Boss(id),
                pos: b.pos,
                radius: b.radius(),
            }))
            .collect();
        Self { targets }
    }

    /// Nearest target by Euclidean distance (first wins on ties)
    pub fn nearest(&self, from: Vec2) -> Option<Target> {
        self.targets
            .iter()
            .min_by(|a, b| {
                a.pos
                    .distance_squared(from)
                    .partial_cmp(&b.pos.distance_squared(from))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .copied()
    }

    pub fn get(&self, key: TargetKey) -> Option<Target> {
        self.targets.iter().find(|t| t.key == key).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Outcome of a single strike
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrikeResult {
    Wounded,
    Killed,
    /// Target was already dead or gone
    Missed,
}

/// Mutable view of everything a hit can touch
pub struct Battlefield<'a> {
    pub adversaries: &'a mut Registry<Adversary>,
    pub bosses: &'a mut Registry<Boss>,
    pub ledger: &'a mut DamageLedger,
    /// Experience earned by kills, granted once the phase completes
    pub exp_earned: u32,
}

impl<'a> Battlefield<'a> {
    pub fn new(
        adversaries: &'a mut Registry<Adversary>,
        bosses: &'a mut Registry<Boss>,
        ledger: &'a mut DamageLedger,
    ) -> Self {
        Self {
            adversaries,
            bosses,
            ledger,
            exp_earned: 0,
        }
    }

    /// Live targets overlapping a circle, in hit order
    pub fn overlapping(&self, center: Vec2, radius: f32) -> Vec<TargetKey> {
        let adversaries = self
            .adversaries
            .iter()
            .filter(|(_, a)| circles_overlap(center, radius, a.pos, a.radius()))
            .map(|(id, _)| TargetKey::Adversary(id));
        let bosses = self
            .bosses
            .iter()
            .filter(|(_, b)| !b.defeated && circles_overlap(center, radius, b.pos, b.radius()))
            .map(|(id, _)| TargetKey::Boss(id));
        adversaries.chain(bosses).collect()
    }

    /// Live targets whose centers lie within `range` of `center`
    pub fn within_reach(&self, center: Vec2, range: f32) -> Vec<TargetKey> {
        let adversaries = self
            .adversaries
            .iter()
            .filter(|(_, a)| a.pos.distance(center) <= range)
            .map(|(id, _)| TargetKey::Adversary(id));
        let bosses = self
            .bosses
            .iter()
            .filter(|(_, b)| !b.defeated && b.pos.distance(center) <= range)
            .map(|(id, _)| TargetKey::Boss(id));
        adversaries.chain(bosses).collect()
    }

    /// Apply damage to one target and record it in the ledger.
    /// Standard adversaries are removed on death; bosses are flagged
    /// defeated and collected by the spawner on the next tick.
    pub fn strike(&mut self, key: TargetKey, damage: u32, source: WeaponKind) -> StrikeResult {
        match key {
            TargetKey::Adversary(id) => {
                let Some(adversary) = self.adversaries.get_mut(id) else {
                    return StrikeResult::Missed;
                };
                adversary.health -= damage as f32;
                let killed = adversary.health <= 0.0;
                self.ledger.record(source, damage);
                if killed {
                    self.adversaries.kill(id);
                    self.exp_earned += ADVERSARY_EXP;
                    StrikeResult::Killed
                } else {
                    StrikeResult::Wounded
                }
            }
            TargetKey::Boss(id) => {
                let Some(boss) = self.bosses.get_mut(id) else {
                    return StrikeResult::Missed;
                };
                if boss.defeated {
                    return StrikeResult::Missed;
                }
                boss.health -= damage as f32;
                self.ledger.record(source, damage);
                if boss.health <= 0.0 {
                    boss.defeated = true;
                    log::info!("Boss {} defeated by {}", boss.name(), source);
                    self.exp_earned += BOSS_EXP;
                    StrikeResult::Killed
                } else {
                    StrikeResult::Wounded
                }
            }
        }
    }

    /// Strike every target in `keys`, returning how many died
    pub fn strike_all(&mut self, keys: &[TargetKey], damage: u32, source: WeaponKind) -> u32 {
        keys.iter()
            .filter(|&&key| self.strike(key, damage, source) == StrikeResult::Killed)
            .count() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::adversary::BossKind;

    fn field() -> (Registry<Adversary>, Registry<Boss>, DamageLedger) {
        let mut adversaries = Registry::new();
        adversaries.insert(1, Adversary::new(Vec2::new(100.0, 100.0), 30.0));
        adversaries.insert(2, Adversary::new(Vec2::new(130.0, 100.0), 5.0));
        let mut bosses = Registry::new();
        bosses.insert(3, Boss::new(BossKind::Standard, Vec2::new(115.0, 100.0), 0));
        (adversaries, bosses, DamageLedger::new())
    }

    #[test]
    fn test_circles_overlap() {
        assert!(circles_overlap(Vec2::ZERO, 5.0, Vec2::new(20.0, 0.0), 20.0));
        assert!(!circles_overlap(Vec2::ZERO, 5.0, Vec2::new(30.0, 0.0), 20.0));
    }

    #[test]
    fn test_in_bounds() {
        let arena = Vec2::new(800.0, 600.0);
        assert!(in_bounds(Vec2::new(0.0, 600.0), arena));
        assert!(!in_bounds(Vec2::new(-0.1, 10.0), arena));
        assert!(!in_bounds(Vec2::new(10.0, 600.5), arena));
    }

    #[test]
    fn test_overlapping_order_adversaries_then_bosses() {
        let (mut a, mut b, mut l) = field();
        let bf = Battlefield::new(&mut a, &mut b, &mut l);
        let hits = bf.overlapping(Vec2::new(115.0, 100.0), 5.0);
        assert_eq!(
            hits,
            vec![
                TargetKey::Adversary(1),
                TargetKey::Adversary(2),
                TargetKey::Boss(3)
            ]
        );
    }

    #[test]
    fn test_strike_kills_and_grants_exp() {
        let (mut a, mut b, mut l) = field();
        let mut bf = Battlefield::new(&mut a, &mut b, &mut l);
        assert_eq!(
            bf.strike(TargetKey::Adversary(2), 10, WeaponKind::Rifle),
            StrikeResult::Killed
        );
        assert_eq!(
            bf.strike(TargetKey::Adversary(2), 10, WeaponKind::Rifle),
            StrikeResult::Missed
        );
        assert_eq!(
            bf.strike(TargetKey::Adversary(1), 10, WeaponKind::Rifle),
            StrikeResult::Wounded
        );
        assert_eq!(bf.exp_earned, ADVERSARY_EXP);
        assert_eq!(l.total_for(WeaponKind::Rifle), 20);
        assert!(!a.is_alive(2));
    }

    #[test]
    fn test_boss_flagged_not_removed() {
        let (mut a, mut b, mut l) = field();
        let mut bf = Battlefield::new(&mut a, &mut b, &mut l);
        assert_eq!(
            bf.strike(TargetKey::Boss(3), 500, WeaponKind::Sniper),
            StrikeResult::Killed
        );
        assert_eq!(
            bf.strike(TargetKey::Boss(3), 500, WeaponKind::Sniper),
            StrikeResult::Missed
        );
        assert_eq!(bf.exp_earned, BOSS_EXP);
        let hits = bf.overlapping(Vec2::new(115.0, 100.0), 1.0);
        assert!(hits.iter().all(|k| !matches!(k, TargetKey::Boss(_))));
        assert!(b.is_alive(3));
        assert!(b.get(3).is_some_and(|boss| boss.defeated));
    }

    #[test]
    fn test_target_set_nearest_skips_defeated_bosses() {
        let (a, mut b, _) = field();
        if let Some(boss) = b.get_mut(3) {
            boss.defeated = true;
        }
        let set = TargetSet::capture(&a, &b);
        let nearest = set.nearest(Vec2::new(116.0, 100.0)).unwrap();
        assert_eq!(nearest.key, TargetKey::Adversary(2));
        assert!(set.get(TargetKey::Boss(3)).is_none());
    }

    #[test]
    fn test_within_reach_uses_center_distance() {
        let (mut a, mut b, mut l) = field();
        let bf = Battlefield::new(&mut a, &mut b, &mut l);
        let reach = bf.within_reach(Vec2::new(50.0, 100.0), 50.0);
        assert_eq!(reach, vec![TargetKey::Adversary(1)]);
    }
}
