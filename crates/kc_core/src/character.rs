//! Characters, archetypes and stats.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::data::archetypes::{archetype_def, move_def, ArchetypeDef, MoveDef};
use crate::data::{InventoryItem, ItemEffect, ItemKind};
use crate::error::{GameError, Result};
use crate::moves::Intercepts;

/// Name used when the player leaves the name blank.
pub const DEFAULT_NAME: &str = "Worldhopper";

/// Character class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArchetypeId {
    /// Ritual support and sustain.
    RiftWeaver,
    /// Brute force.
    GateCrasher,
    /// Mobility and reconnaissance.
    Wayfinder,
}

impl ArchetypeId {
    /// All archetypes.
    pub const ALL: [Self; 3] = [Self::RiftWeaver, Self::GateCrasher, Self::Wayfinder];

    /// Stable string id.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::RiftWeaver => "rift-weaver",
            Self::GateCrasher => "gate-crasher",
            Self::Wayfinder => "wayfinder",
        }
    }

    /// Static definition.
    #[must_use]
    pub const fn def(self) -> &'static ArchetypeDef {
        archetype_def(self)
    }
}

impl fmt::Display for ArchetypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.def().name)
    }
}

impl FromStr for ArchetypeId {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|a| a.id() == s)
            .ok_or_else(|| GameError::UnknownArchetype(s.to_string()))
    }
}

/// A selectable move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MoveId {
    /// Rift-Weaver: defense refunds.
    AetherShield,
    /// Rift-Weaver: ritual heal.
    NexusSynthesizer,
    /// Rift-Weaver: direct damage.
    DimensionalAnchor,
    /// Gate-Crasher: strength bonus.
    MomentumStrike,
    /// Gate-Crasher: defense on victory.
    AuraOfConquest,
    /// Gate-Crasher: cheat death.
    DefyReality,
    /// Wayfinder: long-range reveal.
    ScoutTheMultiverse,
    /// Wayfinder: cardio bonus.
    SlipstreamSurge,
    /// Wayfinder: safe strike.
    PhaseStrike,
}

impl MoveId {
    /// All moves.
    pub const ALL: [Self; 9] = [
        Self::AetherShield,
        Self::NexusSynthesizer,
        Self::DimensionalAnchor,
        Self::MomentumStrike,
        Self::AuraOfConquest,
        Self::DefyReality,
        Self::ScoutTheMultiverse,
        Self::SlipstreamSurge,
        Self::PhaseStrike,
    ];

    /// Stable string id.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::AetherShield => "aether-shield",
            Self::NexusSynthesizer => "nexus-synthesizer",
            Self::DimensionalAnchor => "dimensional-anchor",
            Self::MomentumStrike => "momentum-strike",
            Self::AuraOfConquest => "aura-of-conquest",
            Self::DefyReality => "defy-reality",
            Self::ScoutTheMultiverse => "scout-the-multiverse",
            Self::SlipstreamSurge => "slipstream-surge",
            Self::PhaseStrike => "phase-strike",
        }
    }

    /// Archetype the move belongs to.
    #[must_use]
    pub const fn archetype(self) -> ArchetypeId {
        match self {
            Self::AetherShield | Self::NexusSynthesizer | Self::DimensionalAnchor => {
                ArchetypeId::RiftWeaver
            }
            Self::MomentumStrike | Self::AuraOfConquest | Self::DefyReality => {
                ArchetypeId::GateCrasher
            }
            Self::ScoutTheMultiverse | Self::SlipstreamSurge | Self::PhaseStrike => {
                ArchetypeId::Wayfinder
            }
        }
    }

    /// Static definition.
    #[must_use]
    pub const fn def(self) -> &'static MoveDef {
        move_def(self)
    }
}

impl fmt::Display for MoveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.def().name)
    }
}

impl FromStr for MoveId {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.id() == s)
            .ok_or_else(|| GameError::UnknownMove(s.to_string()))
    }
}

/// One of the four stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    /// Boosts strength logging.
    Power,
    /// Boosts flexibility logging.
    Agility,
    /// Boosts cardio logging.
    Speed,
    /// Boosts wellness logging.
    Insight,
}

impl StatKind {
    /// All stats.
    pub const ALL: [Self; 4] = [Self::Power, Self::Agility, Self::Speed, Self::Insight];
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Power => "power",
            Self::Agility => "agility",
            Self::Speed => "speed",
            Self::Insight => "insight",
        })
    }
}

/// Signed character stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Stats {
    /// Power.
    pub power: i32,
    /// Agility.
    pub agility: i32,
    /// Speed.
    pub speed: i32,
    /// Insight.
    pub insight: i32,
}

impl Stats {
    /// Create stats.
    #[must_use]
    pub const fn new(power: i32, agility: i32, speed: i32, insight: i32) -> Self {
        Self {
            power,
            agility,
            speed,
            insight,
        }
    }

    /// Value of one stat.
    #[must_use]
    pub const fn get(&self, stat: StatKind) -> i32 {
        match stat {
            StatKind::Power => self.power,
            StatKind::Agility => self.agility,
            StatKind::Speed => self.speed,
            StatKind::Insight => self.insight,
        }
    }

    /// Apply a signed delta to one stat.
    pub fn adjust(&mut self, stat: StatKind, delta: i32) {
        let slot = match stat {
            StatKind::Power => &mut self.power,
            StatKind::Agility => &mut self.agility,
            StatKind::Speed => &mut self.speed,
            StatKind::Insight => &mut self.insight,
        };
        *slot = slot.saturating_add(delta);
    }
}

/// The player's character.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Character {
    /// Display name.
    pub name: String,
    /// Class.
    pub archetype: ArchetypeId,
    /// Move chosen at creation.
    pub starting_move: MoveId,
    /// Moves gained by leveling.
    #[serde(default)]
    pub learned_moves: BTreeSet<MoveId>,
    /// Current stats.
    pub stats: Stats,
    /// Current hit points.
    pub hp: u32,
    /// Maximum hit points.
    pub max_hp: u32,
    /// Carried items, oldest first.
    #[serde(default)]
    pub inventory: Vec<InventoryItem>,
    /// Absorbs the next retaliation when set.
    #[serde(default)]
    pub shield_active: bool,
}

impl Character {
    /// Create a character from typed ids.
    ///
    /// Fails if the starting move belongs to another archetype.
    pub fn new(
        name: &str,
        archetype: ArchetypeId,
        starting_move: MoveId,
        max_hp: u32,
    ) -> Result<Self> {
        if starting_move.archetype() != archetype {
            return Err(GameError::MoveNotInArchetype {
                move_id: starting_move.id().to_string(),
                archetype: archetype.id().to_string(),
            });
        }
        let name = match name.trim() {
            "" => DEFAULT_NAME.to_string(),
            trimmed => trimmed.to_string(),
        };
        Ok(Self {
            name,
            archetype,
            starting_move,
            learned_moves: BTreeSet::new(),
            stats: archetype.def().base_stats,
            hp: max_hp,
            max_hp,
            inventory: Vec::new(),
            shield_active: false,
        })
    }

    /// Create a character from string ids (content or UI input).
    pub fn from_ids(name: &str, archetype: &str, starting_move: &str, max_hp: u32) -> Result<Self> {
        Self::new(name, archetype.parse()?, starting_move.parse()?, max_hp)
    }

    /// Whether the move is the starting move or a learned one.
    #[must_use]
    pub fn knows(&self, move_id: MoveId) -> bool {
        self.starting_move == move_id || self.learned_moves.contains(&move_id)
    }

    /// Starting move followed by learned moves.
    pub fn known_moves(&self) -> impl Iterator<Item = MoveId> + '_ {
        std::iter::once(self.starting_move).chain(
            self.learned_moves
                .iter()
                .copied()
                .filter(move |m| *m != self.starting_move),
        )
    }

    /// Hooks of every known move.
    #[must_use]
    pub fn intercepts(&self) -> Intercepts {
        Intercepts::resolve(self.known_moves())
    }

    /// Heal up to maximum. Returns the amount healed.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let healed = amount.min(self.max_hp.saturating_sub(self.hp));
        self.hp += healed;
        healed
    }

    /// Restore full hit points.
    pub fn restore_hp(&mut self) {
        self.hp = self.max_hp;
    }

    /// Add an item. Artifacts apply their stat bonus immediately.
    pub fn acquire(&mut self, item: InventoryItem) {
        if item.kind == ItemKind::Artifact {
            if let Some(ItemEffect::StatBonus { stat, amount }) = item.effect {
                self.stats.adjust(stat, amount);
            }
        }
        self.inventory.push(item);
    }
}
