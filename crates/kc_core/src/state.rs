//! Owned game state.
//!
//! [`GameState`] is the single value every command reads and replaces. It
//! holds no references into the campaign, so it can be cloned for
//! transactional application, hashed for determinism checks and serialized
//! as a whole.

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, BTreeSet};
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::campaign::Campaign;
use crate::character::Character;
use crate::error::{GameError, Result};
use crate::hex::{HexCoord, HexGrid};
use crate::progression::{apply_reward, LevelUpState, Progression, Reward};
use crate::resources::Resources;
use crate::rng::SeededRng;

/// Salt separating the roll stream from the placement stream.
pub const ROLL_STREAM_SALT: u64 = 0x5EED_0FA1_1D1C;

/// Overall campaign outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    /// Still in progress.
    #[default]
    Active,
    /// The realm boss has fallen.
    Victory,
}

/// Per-session map state. Sets only grow within a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MapState {
    /// Current player hex.
    pub player_pos: HexCoord,
    /// Hexes out of the fog.
    pub revealed: BTreeSet<HexCoord>,
    /// Hexes whose encounter or rift is done.
    pub cleared: BTreeSet<HexCoord>,
    /// Remaining enemy HP; absent means full health.
    pub encounter_health: BTreeMap<HexCoord, u32>,
    /// Hexes where the once-per-encounter anchor has been spent.
    pub anchor_used: BTreeSet<HexCoord>,
    /// Completed stage count per rift.
    pub rift_progress: BTreeMap<String, usize>,
}

impl MapState {
    /// Fresh state: player on `start`, start and its neighbours revealed.
    #[must_use]
    pub fn fresh(grid: &HexGrid, start: HexCoord) -> Self {
        let mut map = Self {
            player_pos: start,
            ..Self::default()
        };
        map.reveal_around(grid, start);
        map
    }

    /// Reveal a hex and its in-grid neighbours.
    pub fn reveal_around(&mut self, grid: &HexGrid, hex: HexCoord) {
        self.revealed.insert(hex);
        self.revealed.extend(grid.neighbors_in(hex));
    }

    /// Whether a hex is cleared.
    #[must_use]
    pub fn is_cleared(&self, hex: HexCoord) -> bool {
        self.cleared.contains(&hex)
    }

    /// Remaining HP of the encounter on `hex`, given its nominal strikes.
    #[must_use]
    pub fn enemy_hp(&self, hex: HexCoord, nominal: u32) -> u32 {
        self.encounter_health.get(&hex).copied().unwrap_or(nominal)
    }

    /// Completed stages of a rift.
    #[must_use]
    pub fn rift_stages_done(&self, rift_id: &str) -> usize {
        self.rift_progress.get(rift_id).copied().unwrap_or(0)
    }
}

/// Everything that changes during play.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameState {
    /// The player's character.
    pub character: Character,
    /// Token balances.
    pub resources: Resources,
    /// Visible ledger (pinned at the cap while a level-up is pending).
    pub progression: Progression,
    /// Deferred level-up.
    pub level_up: LevelUpState,
    /// Fog, clears and per-hex transient state.
    pub map: MapState,
    /// Campaign outcome.
    pub status: CampaignStatus,
    /// Roll stream for probability effects.
    pub rolls: SeededRng,
}

impl GameState {
    /// Start a new game for `character` in `campaign`.
    #[must_use]
    pub fn new(campaign: &Campaign, character: Character) -> Self {
        let config = campaign.config();
        Self {
            character,
            resources: config.starting_resources,
            progression: config.starting_progression,
            level_up: LevelUpState::Idle,
            map: MapState::fresh(campaign.grid(), campaign.start()),
            status: CampaignStatus::Active,
            rolls: SeededRng::new(campaign.seed() ^ ROLL_STREAM_SALT),
        }
    }

    /// Apply a reward through the deferred level-up ledger.
    ///
    /// Returns true when a level-up is pending afterwards.
    pub fn grant_reward(&mut self, reward: Reward) -> bool {
        let (visible, level_up) = apply_reward(self.progression, self.level_up, reward);
        self.progression = visible;
        self.level_up = level_up;
        level_up.is_pending()
    }

    /// Deduct currency from the visible ledger and any pending snapshot,
    /// floored at zero. Returns the amount taken from the visible ledger.
    pub fn forfeit_currency(&mut self, amount: u32) -> u32 {
        let taken = amount.min(self.progression.currency);
        self.progression.currency -= taken;
        if let LevelUpState::PendingChoice(next) = &mut self.level_up {
            next.currency = next.currency.saturating_sub(amount);
        }
        taken
    }

    /// Hash of the complete state, for determinism checks.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    /// Serialize the state to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| GameError::InvalidState(format!("Failed to serialize game state: {e}")))
    }

    /// Deserialize a state from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data)
            .map_err(|e| GameError::InvalidState(format!("Failed to deserialize game state: {e}")))
    }
}
