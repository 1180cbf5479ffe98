//! # Kinetic Campaigns Core
//!
//! Deterministic campaign engine for Kinetic Campaigns.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No system randomness
//! - No floating-point math (uses fixed-point for layout)
//!
//! Logged real-world activity becomes resource tokens, and those tokens drive
//! movement, combat, narrative rifts and progression across a seeded hex map.
//! Every command either commits a complete new state or returns a typed
//! [`Rejection`](error::Rejection) with the previous state untouched.
//!
//! ## Crate Structure
//!
//! - [`hex`] - Axial/offset hex math, grids and viewport transform
//! - [`placement`] - Seeded encounter placement
//! - [`resources`] - Resource tokens and activity conversion
//! - [`combat`] - Engage turns, retaliation and the anchor
//! - [`actions`] - Movement, healing, items, purchases and scouting
//! - [`progression`] - Experience ledger with deferred level-up
//! - [`rift`] - Multi-stage narrative rifts
//! - [`gate`] - Boss gate
//! - [`session`] - Command surface
//! - [`persistence`] - Save record codec

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod actions;
pub mod campaign;
pub mod character;
pub mod combat;
pub mod config;
pub mod data;
pub mod error;
pub mod gate;
pub mod hex;
pub mod math;
pub mod moves;
pub mod persistence;
pub mod placement;
pub mod progression;
pub mod resources;
pub mod rift;
pub mod rng;
pub mod session;
pub mod state;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::campaign::Campaign;
    pub use crate::character::{ArchetypeId, Character, MoveId, StatKind, Stats};
    pub use crate::combat::{CombatReport, EngageOptions, Retaliation};
    pub use crate::config::EngineConfig;
    pub use crate::data::{CampaignPackage, InventoryItem, ItemKind};
    pub use crate::error::{GameError, Rejection, Result};
    pub use crate::hex::{HexCoord, HexGrid};
    pub use crate::placement::{MapEncounter, Placement, PlacementConfig};
    pub use crate::progression::{LevelUpChoice, LevelUpState, Progression};
    pub use crate::resources::{ActivityKind, ResourceKind, Resources};
    pub use crate::persistence::{load, save};
    pub use crate::session::{Command, Outcome, Session};
    pub use crate::state::{CampaignStatus, GameState, MapState};
}
