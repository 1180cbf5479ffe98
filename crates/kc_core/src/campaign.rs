//! A realm ready to play: validated content, grid, start hex and placement.

use crate::config::EngineConfig;
use crate::data::{CampaignPackage, RiftData};
use crate::error::{GameError, Result};
use crate::hex::{HexCoord, HexGrid};
use crate::placement::{generate_placement, MapEncounter, Placement, PlacementConfig};

/// Read-only campaign context shared by every command.
#[derive(Debug, Clone)]
pub struct Campaign {
    package: CampaignPackage,
    grid: HexGrid,
    start: HexCoord,
    placement: Placement,
    config: EngineConfig,
    seed: u64,
}

impl Campaign {
    /// Validate content, build the grid and place encounters.
    pub fn new(
        package: CampaignPackage,
        placement_config: &PlacementConfig,
        config: EngineConfig,
    ) -> Result<Self> {
        package.validate()?;
        let grid = HexGrid::rect(package.realm.cols, package.realm.rows);
        let start = package
            .realm
            .starting_hex
            .unwrap_or_else(|| grid.default_start());
        if !grid.contains(start) {
            return Err(GameError::InvalidContent(format!(
                "start hex {start} is outside the grid"
            )));
        }
        let placement = generate_placement(&grid, start, &package, placement_config);
        if let Some(rift) = package
            .rifts
            .iter()
            .find(|rift| placement.entrance_of(&rift.id).is_none())
        {
            return Err(GameError::InvalidContent(format!(
                "no room for the entrance of rift '{}'",
                rift.id
            )));
        }
        Ok(Self {
            package,
            grid,
            start,
            placement,
            config,
            seed: placement_config.seed,
        })
    }

    /// Parse a RON package and build the campaign.
    pub fn from_ron_str(
        source: &str,
        label: &str,
        placement_config: &PlacementConfig,
        config: EngineConfig,
    ) -> Result<Self> {
        Self::new(
            CampaignPackage::from_ron_str(source, label)?,
            placement_config,
            config,
        )
    }

    /// Content package.
    #[must_use]
    pub const fn package(&self) -> &CampaignPackage {
        &self.package
    }

    /// Realm grid.
    #[must_use]
    pub const fn grid(&self) -> &HexGrid {
        &self.grid
    }

    /// Start hex (also the knockback destination).
    #[must_use]
    pub const fn start(&self) -> HexCoord {
        self.start
    }

    /// Generated layout.
    #[must_use]
    pub const fn placement(&self) -> &Placement {
        &self.placement
    }

    /// Rule numbers.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Placement seed.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Encounter on a hex.
    #[must_use]
    pub fn encounter_at(&self, hex: HexCoord) -> Option<&MapEncounter> {
        self.placement.encounter_at(hex)
    }

    /// Rift definition.
    #[must_use]
    pub fn rift(&self, id: &str) -> Option<&RiftData> {
        self.package.rift(id)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::character::{ArchetypeId, Character, MoveId};
    use crate::placement::EncounterTag;
    use crate::state::GameState;

    pub(crate) const OMIJA_RON: &str = include_str!("../../../assets/campaigns/omija.ron");

    pub(crate) fn omija() -> CampaignPackage {
        CampaignPackage::from_ron_str(OMIJA_RON, "omija.ron").expect("omija.ron parses")
    }

    pub(crate) fn campaign(seed: u64) -> Campaign {
        Campaign::new(
            omija(),
            &PlacementConfig::default().with_seed(seed),
            EngineConfig::default(),
        )
        .expect("omija campaign builds")
    }

    /// Clear every placed elite and close every rift.
    pub(crate) fn open_gate(state: &mut GameState, campaign: &Campaign) {
        for hex in campaign.placement().hexes_tagged(EncounterTag::Elite) {
            state.map.cleared.insert(hex);
        }
        for rift in &campaign.package().rifts {
            state.map.rift_progress.insert(rift.id.clone(), rift.stages.len());
        }
    }

    pub(crate) fn game(campaign: &Campaign, archetype: ArchetypeId, starting_move: MoveId) -> GameState {
        let character = Character::new("Tester", archetype, starting_move, campaign.config().max_hp)
            .expect("valid character");
        GameState::new(campaign, character)
    }
}
