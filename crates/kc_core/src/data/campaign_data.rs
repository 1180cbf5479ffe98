//! Realm content package.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::character::StatKind;
use crate::data::InventoryItem;
use crate::error::{GameError, Result};
use crate::hex::{HexCoord, HexGrid, MAX_GRID_CELLS, MAX_GRID_SIDE};
use crate::progression::Reward;
use crate::resources::{AnomalyCost, ResourceCost, ResourceKind};

/// Grid and identity of a realm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealmData {
    /// Stable identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Flavour text.
    #[serde(default)]
    pub theme_description: String,
    /// Grid columns.
    pub cols: u32,
    /// Grid rows.
    pub rows: u32,
    /// Start hex; defaults to column 1 of the centre row.
    #[serde(default)]
    pub starting_hex: Option<HexCoord>,
}

/// Tier of a combat encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncounterKind {
    /// Filler enemy.
    Basic,
    /// Mid-tier enemy; all must fall before the boss.
    Elite,
    /// Realm boss; defeating it wins the campaign.
    Boss,
}

impl EncounterKind {
    /// Experience granted when the content does not say.
    #[must_use]
    pub const fn default_xp(self) -> u32 {
        match self {
            Self::Basic => 0,
            Self::Elite => 1,
            Self::Boss => 3,
        }
    }
}

/// Combat encounter definition.
///
/// # Example RON
///
/// ```ron
/// EncounterData(
///     id: "master-of-the-crag",
///     name: "Master of the Crag",
///     kind: elite,
///     strikes: 3,
///     gold: 50,
///     xp: Some(1),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterData {
    /// Stable identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Tier.
    pub kind: EncounterKind,
    /// Hit points (attack tokens needed to defeat it).
    pub strikes: u32,
    /// Currency reward.
    pub gold: u32,
    /// Experience reward; tier default when absent.
    #[serde(default)]
    pub xp: Option<u32>,
    /// Item dropped on defeat.
    #[serde(default)]
    pub loot: Option<InventoryItem>,
    /// Artwork reference.
    #[serde(default)]
    pub image_url: Option<String>,
}

impl EncounterData {
    /// Currency and experience granted on defeat.
    #[must_use]
    pub fn reward(&self) -> Reward {
        Reward::new(self.gold, self.xp.unwrap_or(self.kind.default_xp()))
    }
}

/// One-shot anomaly definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyData {
    /// Stable identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Ritual tokens required.
    pub ritual_cost: u32,
    /// The second resource required.
    pub secondary: ResourceCost,
    /// Currency reward.
    pub gold: u32,
    /// Experience reward.
    #[serde(default)]
    pub xp: u32,
    /// Text shown once resolved.
    #[serde(default)]
    pub lore_text: String,
}

impl AnomalyData {
    /// Combined cost.
    #[must_use]
    pub const fn cost(&self) -> AnomalyCost {
        AnomalyCost {
            ritual: self.ritual_cost,
            secondary: self.secondary,
        }
    }

    /// Reward on resolution.
    #[must_use]
    pub const fn reward(&self) -> Reward {
        Reward::new(self.gold, self.xp)
    }
}

/// One stage of a narrative rift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiftStage {
    /// Stable identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Story text.
    #[serde(default)]
    pub description: String,
    /// Resources paid together to clear the stage.
    #[serde(default)]
    pub costs: Vec<ResourceCost>,
    /// Older packages gate stages on a stat of at least 1 instead of a cost.
    #[serde(default)]
    pub required_stat: Option<StatKind>,
}

/// A multi-stage narrative rift.
///
/// # Example RON
///
/// ```ron
/// RiftData(
///     id: "moon-cats-vigil",
///     name: "The Moon-Cat's Vigil",
///     stages: [
///         (id: "shattered-guardian", name: "The Shattered Guardian",
///          costs: [(resource: attack, amount: 2)]),
///     ],
///     completion_xp: 2,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiftData {
    /// Stable identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Summary text.
    #[serde(default)]
    pub description: String,
    /// Ordered stages.
    pub stages: Vec<RiftStage>,
    /// Experience granted on closing the rift.
    #[serde(default)]
    pub completion_xp: u32,
    /// Item granted on closing the rift.
    #[serde(default)]
    pub completion_loot: Option<InventoryItem>,
    /// Fixed entrance hex; placed by seed when absent.
    #[serde(default)]
    pub entrance_hex: Option<HexCoord>,
}

/// A real-world reward bought with currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NexusReward {
    /// Stable identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Price in currency.
    pub cost: u32,
    /// Icon glyph.
    #[serde(default)]
    pub icon: String,
    /// Description.
    #[serde(default)]
    pub description: String,
}

/// Everything a realm supplies to the engine. Read-only at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignPackage {
    /// Realm identity and grid.
    pub realm: RealmData,
    /// Combat encounter pool (all tiers).
    pub encounters: Vec<EncounterData>,
    /// Anomaly pool.
    #[serde(default)]
    pub anomalies: Vec<AnomalyData>,
    /// Narrative rifts.
    #[serde(default)]
    pub rifts: Vec<RiftData>,
    /// Nexus rewards on offer.
    #[serde(default)]
    pub nexus_rewards: Vec<NexusReward>,
}

impl CampaignPackage {
    /// Parse a package from RON.
    ///
    /// `label` names the source in error messages.
    pub fn from_ron_str(source: &str, label: &str) -> Result<Self> {
        ron::from_str(source).map_err(|e| GameError::DataParseError {
            path: label.to_string(),
            message: e.to_string(),
        })
    }

    /// Encounters of one tier, in content order.
    #[must_use]
    pub fn encounters_of(&self, kind: EncounterKind) -> Vec<&EncounterData> {
        self.encounters.iter().filter(|e| e.kind == kind).collect()
    }

    /// Look up a rift.
    #[must_use]
    pub fn rift(&self, id: &str) -> Option<&RiftData> {
        self.rifts.iter().find(|r| r.id == id)
    }

    /// Look up a Nexus reward.
    #[must_use]
    pub fn nexus_reward(&self, id: &str) -> Option<&NexusReward> {
        self.nexus_rewards.iter().find(|r| r.id == id)
    }

    /// Reject malformed content.
    pub fn validate(&self) -> Result<()> {
        let realm = &self.realm;
        if realm.cols == 0 || realm.rows == 0 {
            return invalid(format!(
                "realm '{}' has an empty grid ({}x{})",
                realm.id, realm.cols, realm.rows
            ));
        }
        if !HexGrid::rect_fits(realm.cols, realm.rows) {
            return invalid(format!(
                "realm '{}' grid {}x{} exceeds {MAX_GRID_SIDE} per side or {MAX_GRID_CELLS} cells",
                realm.id, realm.cols, realm.rows
            ));
        }
        let grid = HexGrid::rect(realm.cols, realm.rows);
        if let Some(start) = realm.starting_hex {
            if !grid.contains(start) {
                return invalid(format!("starting hex {start} is outside the grid"));
            }
        }

        unique_ids("encounter", self.encounters.iter().map(|e| e.id.as_str()))?;
        unique_ids("anomaly", self.anomalies.iter().map(|a| a.id.as_str()))?;
        unique_ids("rift", self.rifts.iter().map(|r| r.id.as_str()))?;
        unique_ids("nexus reward", self.nexus_rewards.iter().map(|r| r.id.as_str()))?;

        for encounter in &self.encounters {
            if encounter.strikes == 0 {
                return invalid(format!("encounter '{}' has zero strikes", encounter.id));
            }
        }

        for anomaly in &self.anomalies {
            if anomaly.secondary.resource == ResourceKind::Ritual {
                return invalid(format!(
                    "anomaly '{}' must name a secondary resource other than ritual",
                    anomaly.id
                ));
            }
            if anomaly.secondary.amount == 0 {
                return invalid(format!("anomaly '{}' has a zero secondary cost", anomaly.id));
            }
        }

        for rift in &self.rifts {
            if rift.stages.is_empty() {
                return invalid(format!("rift '{}' has no stages", rift.id));
            }
            for stage in &rift.stages {
                if stage.costs.is_empty() && stage.required_stat.is_none() {
                    return invalid(format!(
                        "rift stage '{}' has neither a cost nor a stat check",
                        stage.id
                    ));
                }
            }
            if let Some(hex) = rift.entrance_hex {
                if !grid.contains(hex) {
                    return invalid(format!("rift '{}' entrance {hex} is outside the grid", rift.id));
                }
            }
        }

        Ok(())
    }
}

fn invalid<T>(message: String) -> Result<T> {
    Err(GameError::InvalidContent(message))
}

fn unique_ids<'a>(what: &str, ids: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            return invalid(format!("duplicate {what} id '{id}'"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        CampaignPackage(
            realm: (id: "test", name: "Test Realm", cols: 6, rows: 4),
            encounters: [
                (id: "rat", name: "Rat", kind: basic, strikes: 1, gold: 5),
                (id: "ogre", name: "Ogre", kind: elite, strikes: 2, gold: 20),
                (id: "king", name: "King", kind: boss, strikes: 4, gold: 100, xp: Some(5)),
            ],
            anomalies: [
                (id: "well", name: "Well", ritual_cost: 1,
                 secondary: (resource: defense, amount: 1), gold: 10),
            ],
            rifts: [
                (id: "vigil", name: "Vigil", stages: [
                    (id: "a", name: "A", costs: [(resource: attack, amount: 1)]),
                    (id: "b", name: "B", required_stat: Some(insight)),
                ], completion_xp: 2),
            ],
        )
    "#;

    #[test]
    fn test_parse_minimal_package() {
        let package = CampaignPackage::from_ron_str(MINIMAL, "minimal").unwrap();
        package.validate().unwrap();
        assert_eq!(package.encounters_of(EncounterKind::Elite).len(), 1);
        assert_eq!(package.rifts[0].stages[1].required_stat, Some(StatKind::Insight));
        assert!(package.nexus_rewards.is_empty());
    }

    #[test]
    fn test_default_xp_by_tier() {
        let package = CampaignPackage::from_ron_str(MINIMAL, "minimal").unwrap();
        let xp: Vec<u32> = package.encounters.iter().map(|e| e.reward().xp).collect();
        assert_eq!(xp, vec![0, 1, 5]);
    }

    #[test]
    fn test_parse_error_is_reported() {
        let err = CampaignPackage::from_ron_str("CampaignPackage(", "broken.ron").unwrap_err();
        assert!(matches!(err, GameError::DataParseError { ref path, .. } if path == "broken.ron"));
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let mut package = CampaignPackage::from_ron_str(MINIMAL, "minimal").unwrap();
        package.encounters.push(package.encounters[0].clone());
        assert!(matches!(package.validate(), Err(GameError::InvalidContent(_))));
    }

    #[test]
    fn test_validate_rejects_ritual_secondary() {
        let mut package = CampaignPackage::from_ron_str(MINIMAL, "minimal").unwrap();
        package.anomalies[0].secondary = ResourceCost::new(ResourceKind::Ritual, 1);
        assert!(package.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_rift_and_bad_start() {
        let mut package = CampaignPackage::from_ron_str(MINIMAL, "minimal").unwrap();
        package.rifts[0].stages.clear();
        assert!(package.validate().is_err());

        let mut package = CampaignPackage::from_ron_str(MINIMAL, "minimal").unwrap();
        package.realm.starting_hex = Some(HexCoord::new(40, 40));
        assert!(package.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_grid() {
        let source = MINIMAL.replace("cols: 6, rows: 4", "cols: 70000, rows: 70000");
        let package = CampaignPackage::from_ron_str(&source, "huge").unwrap();
        assert!(matches!(package.validate(), Err(GameError::InvalidContent(_))));

        let mut package = CampaignPackage::from_ron_str(MINIMAL, "minimal").unwrap();
        package.realm.cols = MAX_GRID_SIDE + 1;
        package.realm.rows = 1;
        assert!(package.validate().is_err());
    }
}
