//! Boss gate.
//!
//! The realm boss may only be engaged once every placed elite is cleared and
//! every rift is closed. The check is recomputed on every attempt.

use serde::{Deserialize, Serialize};

use crate::campaign::Campaign;
use crate::error::Rejection;
use crate::hex::HexCoord;
use crate::placement::EncounterTag;
use crate::state::GameState;

/// What still blocks the boss.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateStatus {
    /// Elite hexes not yet cleared.
    pub elites_remaining: Vec<HexCoord>,
    /// Rifts with stages left.
    pub rifts_open: Vec<String>,
}

impl GateStatus {
    /// True when nothing blocks the boss.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.elites_remaining.is_empty() && self.rifts_open.is_empty()
    }
}

/// Compute the gate's blockers.
#[must_use]
pub fn gate_status(state: &GameState, campaign: &Campaign) -> GateStatus {
    let elites_remaining = campaign
        .placement()
        .hexes_tagged(EncounterTag::Elite)
        .into_iter()
        .filter(|hex| !state.map.is_cleared(*hex))
        .collect();
    let rifts_open = campaign
        .package()
        .rifts
        .iter()
        .filter(|rift| state.map.rift_stages_done(&rift.id) < rift.stages.len())
        .map(|rift| rift.id.clone())
        .collect();
    GateStatus {
        elites_remaining,
        rifts_open,
    }
}

/// Reject boss engagement while the gate is sealed.
pub fn check_boss_gate(state: &GameState, campaign: &Campaign) -> Result<(), Rejection> {
    let status = gate_status(state, campaign);
    if status.is_open() {
        Ok(())
    } else {
        tracing::debug!(
            elites = status.elites_remaining.len(),
            rifts = status.rifts_open.len(),
            "Boss gate sealed"
        );
        Err(Rejection::BossGateSealed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::testing::{campaign, game};
    use crate::character::{ArchetypeId, MoveId};

    #[test]
    fn test_gate_sealed_at_start() {
        let campaign = campaign(42);
        let state = game(&campaign, ArchetypeId::GateCrasher, MoveId::MomentumStrike);
        let status = gate_status(&state, &campaign);
        assert_eq!(status.elites_remaining.len(), 3);
        assert_eq!(status.rifts_open, vec!["moon-cats-vigil".to_string()]);
        assert_eq!(check_boss_gate(&state, &campaign), Err(Rejection::BossGateSealed));
    }

    #[test]
    fn test_gate_needs_both_conditions() {
        let campaign = campaign(42);
        let mut state = game(&campaign, ArchetypeId::GateCrasher, MoveId::MomentumStrike);
        for hex in campaign.placement().hexes_tagged(EncounterTag::Elite) {
            state.map.cleared.insert(hex);
        }
        assert!(check_boss_gate(&state, &campaign).is_err());

        state.map.rift_progress.insert("moon-cats-vigil".into(), 2);
        assert!(check_boss_gate(&state, &campaign).is_err());

        state.map.rift_progress.insert("moon-cats-vigil".into(), 3);
        assert!(check_boss_gate(&state, &campaign).is_ok());
    }
}
