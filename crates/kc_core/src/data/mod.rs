//! Data structures for campaign content.
//!
//! This module contains pure data structures describing a realm: its grid,
//! encounter pools, anomalies, narrative rifts and Nexus rewards. All structs
//! deserialize from RON. The built-in archetype and move tables also live here.
//!
//! **Note:** This module contains no IO - it only defines data types.
//! File loading is handled by `kc_tools`.

pub mod archetypes;
mod campaign_data;
mod items;

pub use campaign_data::{
    AnomalyData, CampaignPackage, EncounterData, EncounterKind, NexusReward, RealmData, RiftData,
    RiftStage,
};
pub use items::{InventoryItem, ItemEffect, ItemKind};
