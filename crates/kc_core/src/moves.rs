//! Move intercept hooks.
//!
//! A character's known moves resolve to an [`Intercepts`] set once per call
//! site. The economy and combat engines consult the set at fixed extension
//! points instead of testing move ids inline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::character::{Character, MoveId};
use crate::error::Rejection;
use crate::resources::{ActivityKind, ResourceCost, ResourceKind};

/// How an activity intercept pays out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityBonus {
    /// Always granted.
    Flat,
    /// Granted on an independent roll with this percent chance.
    Chance(i32),
}

/// Extra tokens granted when a given activity is logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityIntercept {
    /// Activity that triggers the bonus.
    pub activity: ActivityKind,
    /// Counter credited.
    pub resource: ResourceKind,
    /// Tokens credited.
    pub amount: u32,
    /// Payout rule.
    pub bonus: ActivityBonus,
}

/// Rescue applied when retaliation would drop hit points to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZeroHpRescue {
    /// Destroy the newest inventory item and restore full hit points.
    SacrificeItem,
}

/// Chance to heal after moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveHeal {
    /// Hit points restored.
    pub heal: u32,
    /// Percent chance per move.
    pub chance: i32,
}

/// Active abilities a move can unlock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Movement-paid strike with no retaliation.
    PhaseStrike,
    /// Ritual-paid direct damage, once per encounter.
    Anchor,
    /// Reveal a distant hex.
    Scout,
    /// Ritual-paid heal.
    Synthesize,
}

/// One extension point a move populates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    /// Bonus tokens when logging an activity.
    OnActivity(ActivityIntercept),
    /// Tokens granted after defeating an encounter.
    OnVictory(ResourceCost),
    /// Percent chance a defense token spent blocking retaliation is refunded.
    OnRetaliationBlocked(i32),
    /// Rescue from zero hit points.
    OnZeroHp(ZeroHpRescue),
    /// Chance to heal after a map move.
    OnMove(MoveHeal),
    /// Unlocks an active ability.
    Action(ActionKind),
}

/// The resolved hooks of a character's known moves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Intercepts {
    on_activity: Vec<ActivityIntercept>,
    on_victory: Vec<ResourceCost>,
    on_blocked: Vec<i32>,
    on_zero_hp: Option<ZeroHpRescue>,
    on_move: Vec<MoveHeal>,
    actions: BTreeMap<ActionKind, MoveId>,
}

impl Intercepts {
    /// Collect the hooks of every listed move.
    pub fn resolve(moves: impl IntoIterator<Item = MoveId>) -> Self {
        let mut intercepts = Self::default();
        for move_id in moves {
            for hook in move_id.def().hooks {
                match *hook {
                    Hook::OnActivity(bonus) => intercepts.on_activity.push(bonus),
                    Hook::OnVictory(grant) => intercepts.on_victory.push(grant),
                    Hook::OnRetaliationBlocked(percent) => intercepts.on_blocked.push(percent),
                    Hook::OnZeroHp(rescue) => intercepts.on_zero_hp = Some(rescue),
                    Hook::OnMove(heal) => intercepts.on_move.push(heal),
                    Hook::Action(action) => {
                        intercepts.actions.insert(action, move_id);
                    }
                }
            }
        }
        intercepts
    }

    /// Bonuses that fire for `activity`.
    pub fn activity_bonuses(
        &self,
        activity: ActivityKind,
    ) -> impl Iterator<Item = &ActivityIntercept> + '_ {
        self.on_activity
            .iter()
            .filter(move |i| i.activity == activity)
    }

    /// Grants applied after a victory.
    #[must_use]
    pub fn victory_grants(&self) -> &[ResourceCost] {
        &self.on_victory
    }

    /// Refund chances applied when a defense token blocks retaliation.
    #[must_use]
    pub fn block_refunds(&self) -> &[i32] {
        &self.on_blocked
    }

    /// Zero-HP rescue, if any.
    #[must_use]
    pub const fn zero_hp_rescue(&self) -> Option<ZeroHpRescue> {
        self.on_zero_hp
    }

    /// Heals rolled after each map move.
    #[must_use]
    pub fn move_heals(&self) -> &[MoveHeal] {
        &self.on_move
    }

    /// Whether an ability is unlocked.
    #[must_use]
    pub fn grants(&self, action: ActionKind) -> bool {
        self.actions.contains_key(&action)
    }
}

impl ActionKind {
    /// Move that unlocks this ability.
    #[must_use]
    pub const fn source_move(self) -> MoveId {
        match self {
            Self::PhaseStrike => MoveId::PhaseStrike,
            Self::Anchor => MoveId::DimensionalAnchor,
            Self::Scout => MoveId::ScoutTheMultiverse,
            Self::Synthesize => MoveId::NexusSynthesizer,
        }
    }
}

/// Reject an ability the character has not unlocked.
pub fn require_action(character: &Character, action: ActionKind) -> Result<(), Rejection> {
    if character.intercepts().grants(action) {
        Ok(())
    } else {
        Err(Rejection::WrongArchetype(action.source_move()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_collects_hooks() {
        let intercepts = Intercepts::resolve([MoveId::SlipstreamSurge, MoveId::AuraOfConquest]);
        assert_eq!(intercepts.activity_bonuses(ActivityKind::Cardio).count(), 1);
        assert_eq!(intercepts.activity_bonuses(ActivityKind::Strength).count(), 0);
        assert_eq!(
            intercepts.victory_grants(),
            &[ResourceCost::new(ResourceKind::Defense, 1)]
        );
        assert!(intercepts.zero_hp_rescue().is_none());
    }

    #[test]
    fn test_actions_map_to_moves() {
        let intercepts = Intercepts::resolve([MoveId::PhaseStrike, MoveId::DefyReality]);
        assert!(intercepts.grants(ActionKind::PhaseStrike));
        assert!(!intercepts.grants(ActionKind::Anchor));
        assert_eq!(intercepts.zero_hp_rescue(), Some(ZeroHpRescue::SacrificeItem));
        assert_eq!(ActionKind::Scout.source_move(), MoveId::ScoutTheMultiverse);
    }

    #[test]
    fn test_empty_move_set_has_no_hooks() {
        assert_eq!(Intercepts::resolve([]), Intercepts::default());
    }
}
