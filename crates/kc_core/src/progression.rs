//! Experience, level and currency ledger.
//!
//! The experience cap doubles every level: `10 * 2^(level - 1)`. Rewards that
//! would cross the cap are held behind a deferred level-up so the player can
//! choose a reward first:
//!
//! 1. The visible progression is pinned at exactly the cap.
//! 2. The would-be next progression (new level, carried experience, currency
//!    included) is stashed in [`LevelUpState::PendingChoice`].
//! 3. Completing the level-up commits the stash.
//!
//! Currency is applied to both snapshots so it is never lost.

use serde::{Deserialize, Serialize};

use crate::character::{Character, MoveId, StatKind};
use crate::error::Rejection;

/// Experience needed to leave `level`.
#[must_use]
pub const fn xp_cap(level: u32) -> u32 {
    10u32.saturating_mul(2u32.saturating_pow(level.saturating_sub(1)))
}

/// Currency and experience granted together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reward {
    /// Currency.
    pub currency: u32,
    /// Experience.
    pub xp: u32,
}

impl Reward {
    /// Create a reward.
    #[must_use]
    pub const fn new(currency: u32, xp: u32) -> Self {
        Self { currency, xp }
    }
}

/// Experience, level and currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Progression {
    /// Experience toward the next level.
    pub xp: u32,
    /// Current level, starting at 1.
    pub level: u32,
    /// Spendable currency.
    pub currency: u32,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            xp: 0,
            level: 1,
            currency: 120,
        }
    }
}

impl Progression {
    /// Cap for the current level.
    #[must_use]
    pub const fn cap(&self) -> u32 {
        xp_cap(self.level)
    }

    /// Add currency (saturating).
    #[must_use]
    pub const fn with_currency(mut self, amount: u32) -> Self {
        self.currency = self.currency.saturating_add(amount);
        self
    }

    /// Add experience, leveling at most once.
    ///
    /// The carried remainder stays below the next level's cap.
    #[must_use]
    pub fn add_xp(mut self, gain: u32) -> Self {
        let total = self.xp.saturating_add(gain);
        let cap = self.cap();
        if total >= cap {
            self.level = self.level.saturating_add(1);
            self.xp = (total - cap).min(self.cap() - 1);
        } else {
            self.xp = total;
        }
        self
    }

    /// Whether `gain` would cross the current cap.
    #[must_use]
    pub const fn would_level(&self, gain: u32) -> bool {
        self.xp.saturating_add(gain) >= self.cap()
    }

    /// Spend currency, or `None` if short.
    #[must_use]
    pub const fn spend_currency(mut self, amount: u32) -> Option<Self> {
        match self.currency.checked_sub(amount) {
            Some(rest) => {
                self.currency = rest;
                Some(self)
            }
            None => None,
        }
    }
}

/// Deferred level-up state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LevelUpState {
    /// Nothing pending.
    #[default]
    Idle,
    /// A level-up awaits the player's choice; holds the progression to commit.
    PendingChoice(Progression),
}

impl LevelUpState {
    /// The stashed progression, if any.
    #[must_use]
    pub const fn pending(&self) -> Option<&Progression> {
        match self {
            Self::Idle => None,
            Self::PendingChoice(next) => Some(next),
        }
    }

    /// True while a choice is awaited.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::PendingChoice(_))
    }
}

/// Apply a reward through the two-phase commit.
///
/// With a level-up already pending, the visible progression stays pinned
/// (currency still added) and the reward lands on the stash, which replaces
/// the old one.
#[must_use]
pub fn apply_reward(
    visible: Progression,
    level_up: LevelUpState,
    reward: Reward,
) -> (Progression, LevelUpState) {
    let with_currency = visible.with_currency(reward.currency);
    match level_up {
        LevelUpState::PendingChoice(next) => {
            let next = next.with_currency(reward.currency).add_xp(reward.xp);
            (with_currency, LevelUpState::PendingChoice(next))
        }
        LevelUpState::Idle if with_currency.would_level(reward.xp) => {
            let pinned = Progression {
                xp: with_currency.cap(),
                ..with_currency
            };
            let next = with_currency.add_xp(reward.xp);
            tracing::info!(level = next.level, xp = next.xp, "Level-up pending");
            (pinned, LevelUpState::PendingChoice(next))
        }
        LevelUpState::Idle => (with_currency.add_xp(reward.xp), LevelUpState::Idle),
    }
}

/// Reward picked when completing a level-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelUpChoice {
    /// Learn another move of the character's own archetype.
    NewMove(MoveId),
    /// Learn a move of a different archetype.
    CrossClassMove(MoveId),
    /// +1 to a stat.
    Stat(StatKind),
}

impl LevelUpChoice {
    /// Check the choice against the character.
    pub fn validate(&self, character: &Character) -> Result<(), Rejection> {
        let reject = |why: String| Err(Rejection::InvalidLevelUpChoice(why));
        match *self {
            Self::NewMove(m) | Self::CrossClassMove(m) if character.knows(m) => {
                reject(format!("{m} is already known"))
            }
            Self::NewMove(m) if m.archetype() != character.archetype => {
                reject(format!("{m} is not a {} move", character.archetype))
            }
            Self::CrossClassMove(m) if m.archetype() == character.archetype => {
                reject(format!("{m} is not from another archetype"))
            }
            _ => Ok(()),
        }
    }

    /// Apply the choice to the character.
    pub fn apply(&self, character: &mut Character) {
        match *self {
            Self::NewMove(m) | Self::CrossClassMove(m) => {
                character.learned_moves.insert(m);
            }
            Self::Stat(stat) => character.stats.adjust(stat, 1),
        }
    }
}

/// Commit a pending level-up: apply the stash and the choice, restore HP.
pub fn complete_level_up(
    character: &mut Character,
    level_up: LevelUpState,
    choice: LevelUpChoice,
) -> Result<Progression, Rejection> {
    let LevelUpState::PendingChoice(next) = level_up else {
        return Err(Rejection::NoPendingLevelUp);
    };
    choice.validate(character)?;
    choice.apply(character);
    character.restore_hp();
    tracing::info!(level = next.level, ?choice, "Level-up committed");
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::ArchetypeId;

    fn at(xp: u32, level: u32, currency: u32) -> Progression {
        Progression {
            xp,
            level,
            currency,
        }
    }

    #[test]
    fn test_xp_cap_doubles() {
        assert_eq!(xp_cap(1), 10);
        assert_eq!(xp_cap(2), 20);
        assert_eq!(xp_cap(3), 40);
        assert_eq!(xp_cap(40), u32::MAX);
    }

    #[test]
    fn test_add_xp_carries_remainder() {
        assert_eq!(at(8, 1, 0).add_xp(5), at(3, 2, 0));
        assert_eq!(at(8, 1, 0).add_xp(1), at(9, 1, 0));
        assert_eq!(at(0, 1, 0).add_xp(10), at(0, 2, 0));
        // Single level per call; remainder clamped below the next cap.
        assert_eq!(at(0, 1, 0).add_xp(100), at(19, 2, 0));
    }

    #[test]
    fn test_reward_below_cap_applies_immediately() {
        let (visible, state) = apply_reward(at(2, 1, 0), LevelUpState::Idle, Reward::new(10, 3));
        assert_eq!(visible, at(5, 1, 10));
        assert_eq!(state, LevelUpState::Idle);
    }

    #[test]
    fn test_reward_over_cap_pins_visible() {
        let (visible, state) =
            apply_reward(at(9, 1, 100), LevelUpState::Idle, Reward::new(50, 5));
        assert_eq!(visible, at(10, 1, 150));
        assert_eq!(state, LevelUpState::PendingChoice(at(4, 2, 150)));
    }

    #[test]
    fn test_reward_while_pending_keeps_currency() {
        let pending = LevelUpState::PendingChoice(at(4, 2, 150));
        let (visible, state) = apply_reward(at(10, 1, 150), pending, Reward::new(10, 2));
        assert_eq!(visible, at(10, 1, 160));
        assert_eq!(state, LevelUpState::PendingChoice(at(6, 2, 160)));
    }

    #[test]
    fn test_second_overflow_while_pending_advances_stash() {
        let (visible, state) =
            apply_reward(at(9, 1, 0), LevelUpState::Idle, Reward::new(0, 5));
        assert_eq!(visible, at(10, 1, 0));
        assert_eq!(state, LevelUpState::PendingChoice(at(4, 2, 0)));

        // Stash crosses its own cap: one choice will commit level 3.
        let (visible, state) = apply_reward(visible, state, Reward::new(5, 20));
        assert_eq!(visible, at(10, 1, 5));
        assert_eq!(state, LevelUpState::PendingChoice(at(4, 3, 5)));

        let mut c = Character::new("Kai", ArchetypeId::Wayfinder, MoveId::PhaseStrike, 5).unwrap();
        let next = complete_level_up(&mut c, state, LevelUpChoice::Stat(StatKind::Speed)).unwrap();
        assert_eq!(next, at(4, 3, 5));
    }

    #[test]
    fn test_spend_currency() {
        assert_eq!(at(0, 1, 50).spend_currency(50), Some(at(0, 1, 0)));
        assert_eq!(at(0, 1, 49).spend_currency(50), None);
    }

    #[test]
    fn test_complete_level_up_restores_hp_and_learns() {
        let mut c = Character::new("Kai", ArchetypeId::Wayfinder, MoveId::PhaseStrike, 5).unwrap();
        c.hp = 1;
        let next = complete_level_up(
            &mut c,
            LevelUpState::PendingChoice(at(4, 2, 150)),
            LevelUpChoice::NewMove(MoveId::SlipstreamSurge),
        )
        .unwrap();
        assert_eq!(next, at(4, 2, 150));
        assert_eq!(c.hp, 5);
        assert!(c.knows(MoveId::SlipstreamSurge));
    }

    #[test]
    fn test_level_up_choice_rules() {
        let c = Character::new("Kai", ArchetypeId::Wayfinder, MoveId::PhaseStrike, 5).unwrap();
        assert!(LevelUpChoice::NewMove(MoveId::PhaseStrike).validate(&c).is_err());
        assert!(LevelUpChoice::NewMove(MoveId::DefyReality).validate(&c).is_err());
        assert!(LevelUpChoice::CrossClassMove(MoveId::ScoutTheMultiverse)
            .validate(&c)
            .is_err());
        assert!(LevelUpChoice::CrossClassMove(MoveId::DefyReality).validate(&c).is_ok());
        assert!(LevelUpChoice::Stat(StatKind::Power).validate(&c).is_ok());
    }

    #[test]
    fn test_complete_without_pending_rejected() {
        let mut c = Character::new("Kai", ArchetypeId::Wayfinder, MoveId::PhaseStrike, 5).unwrap();
        let before = c.clone();
        assert_eq!(
            complete_level_up(&mut c, LevelUpState::Idle, LevelUpChoice::Stat(StatKind::Speed)),
            Err(Rejection::NoPendingLevelUp)
        );
        assert_eq!(c, before);
    }
}
