//! Inventory items and loot effects.

use serde::{Deserialize, Serialize};

use crate::character::StatKind;
use crate::resources::ResourceKind;

/// Whether an item is spent on use or kept forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Removed from the inventory when used.
    Consumable,
    /// Applies its stat bonus on acquisition, then stays as a trophy.
    Artifact,
}

/// What an item does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemEffect {
    /// Credit resource tokens.
    GrantResource {
        /// Counter credited.
        resource: ResourceKind,
        /// Tokens credited.
        amount: u32,
    },
    /// Permanent stat change.
    StatBonus {
        /// Stat changed.
        stat: StatKind,
        /// Signed delta.
        amount: i32,
    },
    /// Raise a shield that absorbs the next retaliation.
    Shield,
}

/// An item carried by the character.
///
/// # Example RON
///
/// ```ron
/// InventoryItem(
///     id: "vial-of-sun-catch",
///     name: "Vial of Sun-Catch",
///     kind: consumable,
///     description: Some("Bottled dawnlight. +2 movement tokens."),
///     effect: Some(grant_resource(resource: movement, amount: 2)),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Stable identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Consumable or artifact.
    pub kind: ItemKind,
    /// Flavour text.
    #[serde(default)]
    pub description: Option<String>,
    /// Artwork reference.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Effect on use (consumables) or acquisition (artifacts).
    #[serde(default)]
    pub effect: Option<ItemEffect>,
}

impl InventoryItem {
    /// Create a bare item with no effect.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            description: None,
            image_url: None,
            effect: None,
        }
    }

    /// Attach an effect.
    #[must_use]
    pub fn with_effect(mut self, effect: ItemEffect) -> Self {
        self.effect = Some(effect);
        self
    }

    /// True for consumables.
    #[must_use]
    pub const fn is_consumable(&self) -> bool {
        matches!(self.kind, ItemKind::Consumable)
    }
}
