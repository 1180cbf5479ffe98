//! Error types for the campaign engine.
//!
//! Two tiers are kept apart on purpose:
//! - [`GameError`] is a broken content package or a corrupt blob. It fails fast.
//! - [`Rejection`] is an expected rule violation raised by a player command.
//!   Its `Display` output is the message shown to the player.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::character::MoveId;
use crate::hex::HexCoord;
use crate::resources::ResourceKind;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for content and data errors.
#[derive(Debug, Error)]
pub enum GameError {
    /// Archetype id not in the archetype table.
    #[error("Unknown archetype: {0}")]
    UnknownArchetype(String),

    /// Move id not in the move table.
    #[error("Unknown move: {0}")]
    UnknownMove(String),

    /// Starting move chosen from a different archetype.
    #[error("Move '{move_id}' does not belong to archetype '{archetype}'")]
    MoveNotInArchetype {
        /// Requested move.
        move_id: String,
        /// Archetype the character was created with.
        archetype: String,
    },

    /// Campaign content failed validation.
    #[error("Invalid campaign content: {0}")]
    InvalidContent(String),

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path (or label) of the data that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Invalid engine state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}

/// An expected rule violation. The command that produced it changed nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum Rejection {
    /// No character exists yet.
    #[error("Create a character before taking actions.")]
    NoCharacter,

    /// The campaign has already been won.
    #[error("The realm is already conquered.")]
    CampaignComplete,

    /// Not enough of a resource token.
    #[error("Not enough {resource}: need {required}, have {available}.")]
    InsufficientResources {
        /// Resource that fell short.
        resource: ResourceKind,
        /// Amount needed.
        required: u32,
        /// Amount held.
        available: u32,
    },

    /// Engaging requires at least one attack token.
    #[error("Need 1 attack token to engage. Log some strength training.")]
    NoAttackTokens,

    /// Not enough currency.
    #[error("Not enough currency: need {required}, have {available}.")]
    InsufficientCurrency {
        /// Price.
        required: u32,
        /// Currency held.
        available: u32,
    },

    /// Moves must target an adjacent hex.
    #[error("You can only move to an adjacent hex (target is {distance} away).")]
    NotAdjacent {
        /// Distance from the player to the target.
        distance: u32,
    },

    /// Hex is not part of the realm grid.
    #[error("Hex {0} is outside the realm.")]
    OutOfBounds(HexCoord),

    /// No encounter is placed on the hex.
    #[error("There is nothing to engage at {0}.")]
    NoEncounter(HexCoord),

    /// The hex has already been cleared.
    #[error("Hex {0} has already been cleared.")]
    AlreadyCleared(HexCoord),

    /// The character does not know the move behind this action.
    #[error("Your archetype cannot use {0}.")]
    WrongArchetype(MoveId),

    /// A once-per-encounter ability was already spent on this hex.
    #[error("{ability} has already been used on the encounter at {hex}.")]
    AbilityAlreadyUsed {
        /// Ability that was spent.
        ability: MoveId,
        /// Encounter hex.
        hex: HexCoord,
    },

    /// Anchor only works on elites and bosses.
    #[error("Dimensional Anchor only binds Elite or Boss encounters.")]
    InvalidAnchorTarget,

    /// Scout target must be an unrevealed hex exactly two steps away.
    #[error("Scouting reveals an unrevealed hex exactly {range} hexes away.")]
    InvalidScoutTarget {
        /// Required scouting distance.
        range: u32,
    },

    /// Hit points are already full.
    #[error("You are already at full health.")]
    AlreadyFullHealth,

    /// Rift id is not defined by the campaign.
    #[error("Unknown narrative rift: {0}")]
    UnknownRift(String),

    /// The hex is not this rift's entrance.
    #[error("Hex {0} is not the entrance to this rift.")]
    NotRiftEntrance(HexCoord),

    /// The rift has already been closed.
    #[error("This narrative rift is already closed.")]
    RiftClosed,

    /// Stage attempted out of order.
    #[error("Complete stage {expected} before attempting stage {attempted}.")]
    StageOutOfOrder {
        /// Next unfinished stage index.
        expected: usize,
        /// Index that was attempted.
        attempted: usize,
    },

    /// A legacy stat-check stage failed.
    #[error("This stage requires at least 1 {stat}.")]
    StatCheckFailed {
        /// Stat name.
        stat: String,
    },

    /// Boss engagement attempted before prerequisites were met.
    #[error(
        "You must defeat all Elite encounters and fully close the Narrative Rift before facing the Realm Boss."
    )]
    BossGateSealed,

    /// Item is not in the inventory.
    #[error("You do not carry '{0}'.")]
    ItemNotFound(String),

    /// Item has no usable effect.
    #[error("'{0}' cannot be used.")]
    ItemNotUsable(String),

    /// Nexus reward id not offered by the campaign.
    #[error("Unknown Nexus reward: {0}")]
    UnknownReward(String),

    /// No level-up is waiting for a choice.
    #[error("There is no level-up to complete.")]
    NoPendingLevelUp,

    /// Level-up choice is not allowed.
    #[error("Invalid level-up choice: {0}")]
    InvalidLevelUpChoice(String),
}
