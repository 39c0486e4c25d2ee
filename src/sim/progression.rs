//! Experience and level-up state machine
//!
//! Running -> LevelUp (one per level gained, resolved one at a time) ->
//! Running. GameOver overrides everything and is only left via restart.

use rand::seq::index;

use super::state::{Phase, Player, SimState, WeaponChange};
use super::weapon::WeaponKind;
use crate::consts::EXP_THRESHOLD_GROWTH;
use crate::error::SimError;

/// Number of weapons offered per level-up
pub const CHOICES_PER_LEVEL: usize = 3;

impl Player {
    /// Add experience; returns the number of levels gained
    pub fn add_exp(&mut self, amount: u32) -> u32 {
        self.exp += amount;
        let mut gained = 0;
        while self.exp >= self.exp_to_level {
            self.exp -= self.exp_to_level;
            self.level += 1;
            self.exp_to_level += EXP_THRESHOLD_GROWTH;
            gained += 1;
        }
        gained
    }
}

impl SimState {
    /// Grant experience to the player, queueing a choice per level gained
    pub fn grant_experience(&mut self, amount: u32) -> u32 {
        if amount == 0 {
            return 0;
        }
        let gained = self.player.add_exp(amount);
        if gained > 0 {
            self.pending_level_ups += gained;
            log::info!(
                "Level up x{} -> level {} (next at {} exp)",
                gained,
                self.player.level,
                self.player.exp_to_level
            );
            if self.phase == Phase::Running {
                self.present_choices();
            }
        }
        gained
    }

    /// Sample three distinct weapon kinds and pause for a choice
    fn present_choices(&mut self) {
        let picks = index::sample(&mut self.rng, WeaponKind::ALL.len(), CHOICES_PER_LEVEL);
        let mut choices = [WeaponKind::RapidPistol; CHOICES_PER_LEVEL];
        for (slot, i) in choices.iter_mut().zip(picks.iter()) {
            *slot = WeaponKind::ALL[i];
        }
        log::debug!("Offering {:?}", choices);
        self.phase = Phase::LevelUp { choices };
    }

    /// Weapons currently on offer, if paused for a level-up
    pub fn pending_choices(&self) -> Option<[WeaponKind; CHOICES_PER_LEVEL]> {
        match self.phase {
            Phase::LevelUp { choices } => Some(choices),
            _ => None,
        }
    }

    /// Resolve the pending level-up with the weapon at `index`
    pub fn choose_weapon(&mut self, index: usize) -> Result<WeaponKind, SimError> {
        let Phase::LevelUp { choices } = self.phase else {
            return Err(SimError::NotAwaitingChoice(self.phase));
        };
        let kind = *choices.get(index).ok_or(SimError::InvalidChoice {
            index,
            available: choices.len(),
        })?;

        match self.player.acquire(kind, self.now_ms()) {
            WeaponChange::Acquired => log::debug!("Acquired {}", kind),
            WeaponChange::Upgraded { tier } => log::debug!("Upgraded {} to tier {}", kind, tier),
            WeaponChange::AtMaxTier => log::debug!("{} already at max tier", kind),
        }

        self.pending_level_ups = self.pending_level_ups.saturating_sub(1);
        if self.pending_level_ups > 0 {
            self.present_choices();
        } else {
            self.phase = Phase::Running;
        }
        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{Difficulty, Settings};
    use glam::Vec2;
    use proptest::prelude::*;

    fn running() -> SimState {
        SimState::with_difficulty(Settings::default(), Difficulty::Normal)
    }

    #[test]
    fn test_large_gain_levels_sequentially() {
        let mut player = Player::new(Vec2::ZERO, WeaponKind::Rifle, 0);
        assert_eq!(player.add_exp(260), 2);
        assert_eq!(player.level, 3);
        assert_eq!(player.exp_to_level, 200);
        assert_eq!(player.exp, 10);
    }

    #[test]
    fn test_each_level_needs_its_own_choice() {
        let mut state = running();
        assert_eq!(state.grant_experience(260), 2);
        assert_eq!(state.pending_level_ups, 2);
        let first = state.pending_choices().unwrap();
        let mut distinct = first.to_vec();
        distinct.sort();
        distinct.dedup();
        assert_eq!(distinct.len(), 3);

        state.choose_weapon(0).unwrap();
        assert!(matches!(state.phase, Phase::LevelUp { .. }));
        assert_eq!(state.pending_level_ups, 1);

        state.choose_weapon(2).unwrap();
        assert_eq!(state.phase, Phase::Running);
        assert_eq!(state.pending_level_ups, 0);
    }

    #[test]
    fn test_choice_upgrades_owned_weapon() {
        let mut state = running();
        state.grant_experience(100);
        let choices = state.pending_choices().unwrap();
        let kind = choices[1];
        let before = state.player.tier_of(kind).unwrap_or(0);
        assert_eq!(state.choose_weapon(1).unwrap(), kind);
        assert_eq!(state.player.tier_of(kind), Some(before + 1));
    }

    #[test]
    fn test_choice_rejected_outside_level_up() {
        let mut state = running();
        assert!(matches!(
            state.choose_weapon(0),
            Err(SimError::NotAwaitingChoice(Phase::Running))
        ));
        state.grant_experience(100);
        assert!(matches!(
            state.choose_weapon(3),
            Err(SimError::InvalidChoice { index: 3, available: 3 })
        ));
        assert!(state.pending_choices().is_some());
    }

    #[test]
    fn test_game_over_not_overridden_by_level_up() {
        let mut state = running();
        state.phase = Phase::GameOver;
        state.grant_experience(500);
        assert_eq!(state.phase, Phase::GameOver);
    }

    proptest! {
        #[test]
        fn exp_accounting_is_conserved(gains in proptest::collection::vec(0u32..600, 1..20)) {
            let mut player = Player::new(Vec2::ZERO, WeaponKind::Rifle, 0);
            let mut spent = 0u32;
            let mut threshold = player.exp_to_level;
            for gain in &gains {
                let before_level = player.level;
                let levels = player.add_exp(*gain);
                prop_assert_eq!(player.level, before_level + levels);
                for _ in 0..levels {
                    spent += threshold;
                    threshold += EXP_THRESHOLD_GROWTH;
                }
                prop_assert!(player.exp < player.exp_to_level);
            }
            let total: u32 = gains.iter().sum();
            prop_assert_eq!(player.exp + spent, total);
            prop_assert_eq!(player.exp_to_level, threshold);
        }
    }
}
