//! Engine tuning.
//!
//! Every number the rules depend on lives in [`EngineConfig`]. The defaults
//! are the standard ruleset; a RON file can override any subset.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::progression::Progression;
use crate::resources::{ActivityThresholds, Resources};

/// Costs and effects of archetype abilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityCosts {
    /// Movement tokens per phase strike.
    pub phase_strike_movement: u32,
    /// Ritual tokens per anchor.
    pub anchor_ritual: u32,
    /// Ritual tokens per scout.
    pub scout_ritual: u32,
    /// Exact distance a scout reveals at.
    pub scout_range: u32,
    /// Ritual tokens per synthesizer heal.
    pub synthesize_ritual: u32,
    /// Hit points restored by the synthesizer.
    pub synthesize_heal: u32,
}

impl Default for AbilityCosts {
    fn default() -> Self {
        Self {
            phase_strike_movement: 3,
            anchor_ritual: 2,
            scout_ritual: 1,
            scout_range: 2,
            synthesize_ritual: 2,
            synthesize_heal: 3,
        }
    }
}

/// Engine-wide rule numbers.
///
/// # Example RON
///
/// ```ron
/// EngineConfig(
///     activity: (cardio: 30),
///     knockback_penalty: 25,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minutes per token for each activity.
    pub activity: ActivityThresholds,
    /// Bonus-unit chance per stat point, in percent.
    pub stat_boost_percent: i32,
    /// Tokens a new character starts with.
    pub starting_resources: Resources,
    /// Ledger a new character starts with.
    pub starting_progression: Progression,
    /// Maximum hit points of a new character.
    pub max_hp: u32,
    /// Movement tokens per map move.
    pub move_cost: u32,
    /// Currency lost when knocked back.
    pub knockback_penalty: u32,
    /// Ritual tokens per hit point for the generic heal.
    pub heal_ritual_per_hp: u32,
    /// Archetype abilities.
    pub abilities: AbilityCosts,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            activity: ActivityThresholds::default(),
            stat_boost_percent: 10,
            starting_resources: Resources::new(5, 2, 0, 1),
            starting_progression: Progression::default(),
            max_hp: 5,
            move_cost: 1,
            knockback_penalty: 10,
            heal_ritual_per_hp: 1,
            abilities: AbilityCosts::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a config from RON; missing fields take defaults.
    pub fn from_ron_str(source: &str, label: &str) -> Result<Self> {
        ron::from_str(source).map_err(|e| GameError::DataParseError {
            path: label.to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.activity.cardio, 20);
        assert_eq!(config.activity.strength, 15);
        assert_eq!(config.starting_resources, Resources::new(5, 2, 0, 1));
        assert_eq!(config.starting_progression.currency, 120);
        assert_eq!(config.max_hp, 5);
    }

    #[test]
    fn test_partial_ron_override() {
        let config =
            EngineConfig::from_ron_str("(knockback_penalty: 25, activity: (cardio: 30))", "test")
                .unwrap();
        assert_eq!(config.knockback_penalty, 25);
        assert_eq!(config.activity.cardio, 30);
        assert_eq!(config.activity.strength, 15);
        assert_eq!(config.abilities, AbilityCosts::default());
    }
}
