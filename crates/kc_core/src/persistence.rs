//! Save record codec.
//!
//! A save is one JSON object holding the whole [`GameState`]. Decoding is
//! all-or-nothing: a record missing any identity field of the character
//! (name, archetype, starting move, stats) or failing to parse decodes to
//! `None`, never to a partially hydrated state. Older saves that stored only
//! the character (with its tokens and progression) are accepted and given a
//! fresh map.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::campaign::Campaign;
use crate::character::{Character, MoveId, Stats};
use crate::data::InventoryItem;
use crate::error::{GameError, Result};
use crate::progression::{LevelUpState, Progression};
use crate::resources::Resources;
use crate::rng::SeededRng;
use crate::state::{CampaignStatus, GameState, MapState, ROLL_STREAM_SALT};

/// Current save format version.
pub const SAVE_VERSION: u32 = 1;

#[derive(Serialize)]
struct SaveRecordRef<'a> {
    version: u32,
    character: &'a Character,
    resources: &'a Resources,
    progression: &'a Progression,
    level_up: &'a LevelUpState,
    map: &'a MapState,
    status: &'a CampaignStatus,
    rolls: &'a SeededRng,
}

/// Character fields as stored; identity fields are checked after parsing.
#[derive(Deserialize)]
struct CharacterRecord {
    name: Option<String>,
    archetype: Option<String>,
    starting_move: Option<String>,
    stats: Option<Stats>,
    #[serde(default)]
    learned_moves: BTreeSet<MoveId>,
    hp: Option<u32>,
    max_hp: Option<u32>,
    #[serde(default)]
    inventory: Vec<InventoryItem>,
    #[serde(default)]
    shield_active: bool,
}

#[derive(Deserialize)]
struct SaveRecord {
    #[serde(default)]
    version: u32,
    character: CharacterRecord,
    resources: Option<Resources>,
    progression: Option<Progression>,
    #[serde(default)]
    level_up: LevelUpState,
    map: Option<MapState>,
    #[serde(default)]
    status: CampaignStatus,
    rolls: Option<SeededRng>,
}

/// Older saves: the character object itself, carrying its own economy.
#[derive(Deserialize)]
struct LegacyRecord {
    #[serde(flatten)]
    character: CharacterRecord,
    resources: Option<Resources>,
    progression: Option<Progression>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredRecord {
    Current(SaveRecord),
    Legacy(LegacyRecord),
}

/// Encode a game as a JSON save record.
///
/// # Errors
///
/// Returns an error if the state cannot be serialized.
pub fn save(state: &GameState) -> Result<String> {
    let record = SaveRecordRef {
        version: SAVE_VERSION,
        character: &state.character,
        resources: &state.resources,
        progression: &state.progression,
        level_up: &state.level_up,
        map: &state.map,
        status: &state.status,
        rolls: &state.rolls,
    };
    serde_json::to_string_pretty(&record)
        .map_err(|e| GameError::InvalidState(format!("Failed to encode save: {e}")))
}

/// Decode a save record for `campaign`.
///
/// Returns `None` for any corrupt or incomplete record.
#[must_use]
pub fn load(json: &str, campaign: &Campaign) -> Option<GameState> {
    let stored: StoredRecord = match serde_json::from_str(json) {
        Ok(stored) => stored,
        Err(e) => {
            tracing::warn!(error = %e, "Save record unreadable");
            return None;
        }
    };
    match stored {
        StoredRecord::Current(record) => hydrate(record, campaign),
        StoredRecord::Legacy(legacy) => {
            tracing::info!("Backfilling map state for legacy save");
            let character = hydrate_character(legacy.character, campaign)?;
            let mut state = GameState::new(campaign, character);
            if let Some(resources) = legacy.resources {
                state.resources = resources;
            }
            if let Some(progression) = legacy.progression {
                state.progression = progression;
            }
            Some(state)
        }
    }
}

fn hydrate(record: SaveRecord, campaign: &Campaign) -> Option<GameState> {
    if record.version > SAVE_VERSION {
        tracing::warn!(version = record.version, "Save record from a newer version");
        return None;
    }
    let character = hydrate_character(record.character, campaign)?;
    let config = campaign.config();
    let map = match record.map {
        Some(map) if campaign.grid().contains(map.player_pos) => map,
        Some(map) => {
            tracing::warn!(position = %map.player_pos, "Saved position outside the realm");
            return None;
        }
        None => MapState::fresh(campaign.grid(), campaign.start()),
    };
    Some(GameState {
        character,
        resources: record.resources.unwrap_or(config.starting_resources),
        progression: record.progression.unwrap_or(config.starting_progression),
        level_up: record.level_up,
        map,
        status: record.status,
        rolls: record
            .rolls
            .unwrap_or_else(|| SeededRng::new(campaign.seed() ^ ROLL_STREAM_SALT)),
    })
}

fn hydrate_character(record: CharacterRecord, campaign: &Campaign) -> Option<Character> {
    let (Some(name), Some(archetype), Some(starting_move), Some(stats)) = (
        record.name.filter(|name| !name.trim().is_empty()),
        record.archetype,
        record.starting_move,
        record.stats,
    ) else {
        tracing::warn!("Save record missing character identity");
        return None;
    };
    let max_hp = record.max_hp.unwrap_or(campaign.config().max_hp);
    let mut character = match Character::from_ids(&name, &archetype, &starting_move, max_hp) {
        Ok(character) => character,
        Err(e) => {
            tracing::warn!(error = %e, "Save record has invalid character");
            return None;
        }
    };
    character.stats = stats;
    character.learned_moves = record.learned_moves;
    character.hp = record.hp.unwrap_or(max_hp).min(max_hp);
    character.inventory = record.inventory;
    character.shield_active = record.shield_active;
    Some(character)
}
