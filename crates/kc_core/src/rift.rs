//! Narrative rifts.
//!
//! A rift is a linear chain of stages entered from a single hex. Stages are
//! cleared strictly in order and progress only moves forward. Clearing the
//! final stage closes the rift, clears its entrance and pays the completion
//! reward.

use serde::{Deserialize, Serialize};

use crate::campaign::Campaign;
use crate::data::InventoryItem;
use crate::error::Rejection;
use crate::hex::HexCoord;
use crate::progression::Reward;
use crate::state::GameState;

/// Spoils of a closed rift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiftCompletion {
    /// Entrance hex, now cleared.
    pub entrance: HexCoord,
    /// Experience granted.
    pub xp: u32,
    /// Item granted.
    pub loot: Option<InventoryItem>,
    /// A level-up now awaits a choice.
    pub level_up_pending: bool,
}

/// Result of a cleared stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    /// Rift id.
    pub rift_id: String,
    /// Index of the stage just cleared.
    pub stage_index: usize,
    /// Stages cleared so far.
    pub stages_done: usize,
    /// Set when the final stage was cleared.
    pub completed: Option<RiftCompletion>,
}

/// Attempt stage `stage_index` of `rift_id` from `hex`.
pub fn attempt_stage(
    state: &mut GameState,
    campaign: &Campaign,
    hex: HexCoord,
    rift_id: &str,
    stage_index: usize,
) -> Result<StageReport, Rejection> {
    let rift = campaign
        .rift(rift_id)
        .ok_or_else(|| Rejection::UnknownRift(rift_id.to_string()))?;
    if campaign.placement().entrance_of(rift_id) != Some(hex) {
        return Err(Rejection::NotRiftEntrance(hex));
    }

    let done = state.map.rift_stages_done(rift_id);
    let Some(stage) = rift.stages.get(done) else {
        return Err(Rejection::RiftClosed);
    };
    if stage_index != done {
        return Err(Rejection::StageOutOfOrder {
            expected: done,
            attempted: stage_index,
        });
    }

    if stage.costs.is_empty() {
        if let Some(stat) = stage.required_stat {
            if state.character.stats.get(stat) < 1 {
                return Err(Rejection::StatCheckFailed {
                    stat: stat.to_string(),
                });
            }
        }
    } else {
        state.resources = state.resources.try_spend_all(&stage.costs)?;
    }

    let stages_done = done + 1;
    state.map.rift_progress.insert(rift_id.to_string(), stages_done);
    tracing::info!(rift = rift_id, stage = %stage.id, stages_done, "Rift stage cleared");

    let completed = (stages_done == rift.stages.len()).then(|| {
        state.map.cleared.insert(hex);
        let level_up_pending = state.grant_reward(Reward::new(0, rift.completion_xp));
        if let Some(item) = &rift.completion_loot {
            state.character.acquire(item.clone());
        }
        tracing::info!(rift = rift_id, "Rift closed");
        RiftCompletion {
            entrance: hex,
            xp: rift.completion_xp,
            loot: rift.completion_loot.clone(),
            level_up_pending,
        }
    });

    Ok(StageReport {
        rift_id: rift_id.to_string(),
        stage_index,
        stages_done,
        completed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::testing::{campaign, game};
    use crate::character::{ArchetypeId, MoveId, StatKind};
    use crate::resources::Resources;

    const VIGIL: &str = "moon-cats-vigil";

    fn entrance(campaign: &Campaign) -> HexCoord {
        campaign.placement().entrance_of(VIGIL).unwrap()
    }

    #[test]
    fn test_stages_in_order_close_rift() {
        let campaign = campaign(42);
        let mut state = game(&campaign, ArchetypeId::Wayfinder, MoveId::PhaseStrike);
        state.resources = Resources::new(3, 3, 1, 0);
        let hex = entrance(&campaign);
        let insight = state.character.stats.get(StatKind::Insight);

        let first = attempt_stage(&mut state, &campaign, hex, VIGIL, 0).unwrap();
        assert_eq!(first.stages_done, 1);
        assert!(first.completed.is_none());
        assert_eq!(state.resources.attack, 1);

        attempt_stage(&mut state, &campaign, hex, VIGIL, 1).unwrap();
        let last = attempt_stage(&mut state, &campaign, hex, VIGIL, 2).unwrap();
        let completion = last.completed.unwrap();
        assert_eq!(completion.xp, 2);
        assert_eq!(state.resources, Resources::default());
        assert!(state.map.is_cleared(hex));
        assert_eq!(state.progression.xp, 2);
        assert_eq!(state.character.stats.get(StatKind::Insight), insight + 1);

        assert_eq!(
            attempt_stage(&mut state, &campaign, hex, VIGIL, 3),
            Err(Rejection::RiftClosed)
        );
    }

    #[test]
    fn test_out_of_order_rejected() {
        let campaign = campaign(42);
        let mut state = game(&campaign, ArchetypeId::Wayfinder, MoveId::PhaseStrike);
        state.resources = Resources::new(3, 3, 1, 0);
        let hex = entrance(&campaign);
        assert_eq!(
            attempt_stage(&mut state, &campaign, hex, VIGIL, 1),
            Err(Rejection::StageOutOfOrder {
                expected: 0,
                attempted: 1,
            })
        );
        attempt_stage(&mut state, &campaign, hex, VIGIL, 0).unwrap();
        assert_eq!(
            attempt_stage(&mut state, &campaign, hex, VIGIL, 0),
            Err(Rejection::StageOutOfOrder {
                expected: 1,
                attempted: 0,
            })
        );
    }

    #[test]
    fn test_insufficient_resources_leave_progress() {
        let campaign = campaign(42);
        let mut state = game(&campaign, ArchetypeId::Wayfinder, MoveId::PhaseStrike);
        state.resources = Resources::new(0, 1, 0, 0);
        let hex = entrance(&campaign);
        let before = state.clone();
        let result = attempt_stage(&mut state, &campaign, hex, VIGIL, 0);
        assert!(matches!(result, Err(Rejection::InsufficientResources { .. })));
        assert_eq!(state, before);
        assert_eq!(state.map.rift_stages_done(VIGIL), 0);
    }

    #[test]
    fn test_wrong_hex_and_unknown_rift() {
        let campaign = campaign(42);
        let mut state = game(&campaign, ArchetypeId::Wayfinder, MoveId::PhaseStrike);
        let start = campaign.start();
        assert_eq!(
            attempt_stage(&mut state, &campaign, start, VIGIL, 0),
            Err(Rejection::NotRiftEntrance(start))
        );
        assert_eq!(
            attempt_stage(&mut state, &campaign, start, "nowhere", 0),
            Err(Rejection::UnknownRift("nowhere".into()))
        );
    }

    #[test]
    fn test_legacy_stat_stage() {
        let mut package = crate::campaign::testing::omija();
        let stage = &mut package.rifts[0].stages[0];
        stage.costs.clear();
        stage.required_stat = Some(StatKind::Power);
        let campaign = Campaign::new(
            package,
            &crate::placement::PlacementConfig::default().with_seed(42),
            crate::config::EngineConfig::default(),
        )
        .unwrap();
        let hex = entrance(&campaign);

        let mut weaver = game(&campaign, ArchetypeId::RiftWeaver, MoveId::AetherShield);
        assert_eq!(
            attempt_stage(&mut weaver, &campaign, hex, VIGIL, 0),
            Err(Rejection::StatCheckFailed {
                stat: StatKind::Power.to_string(),
            })
        );

        let mut crasher = game(&campaign, ArchetypeId::GateCrasher, MoveId::MomentumStrike);
        let report = attempt_stage(&mut crasher, &campaign, hex, VIGIL, 0).unwrap();
        assert_eq!(report.stages_done, 1);
    }
}
