//! Built-in archetype and move tables.

use crate::character::{ArchetypeId, MoveId, Stats};
use crate::moves::{
    ActionKind, ActivityBonus, ActivityIntercept, Hook, MoveHeal, ZeroHpRescue,
};
use crate::resources::{ActivityKind, ResourceCost, ResourceKind};

/// Static definition of an archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchetypeDef {
    /// Identifier.
    pub id: ArchetypeId,
    /// Display name.
    pub name: &'static str,
    /// One-line flavour text.
    pub description: &'static str,
    /// Stats at character creation.
    pub base_stats: Stats,
    /// Selectable moves.
    pub moves: [MoveId; 3],
}

/// Static definition of a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveDef {
    /// Identifier.
    pub id: MoveId,
    /// Display name.
    pub name: &'static str,
    /// Rules text.
    pub description: &'static str,
    /// Extension points this move fills.
    pub hooks: &'static [Hook],
}

const RIFT_WEAVER: ArchetypeDef = ArchetypeDef {
    id: ArchetypeId::RiftWeaver,
    name: "Rift-Weaver",
    description: "Bends the seams between worlds to shield and mend.",
    base_stats: Stats::new(-1, 2, 0, 1),
    moves: [
        MoveId::AetherShield,
        MoveId::NexusSynthesizer,
        MoveId::DimensionalAnchor,
    ],
};

const GATE_CRASHER: ArchetypeDef = ArchetypeDef {
    id: ArchetypeId::GateCrasher,
    name: "Gate-Crasher",
    description: "Breaks through every barrier by force.",
    base_stats: Stats::new(2, 0, 1, -1),
    moves: [
        MoveId::MomentumStrike,
        MoveId::AuraOfConquest,
        MoveId::DefyReality,
    ],
};

const WAYFINDER: ArchetypeDef = ArchetypeDef {
    id: ArchetypeId::Wayfinder,
    name: "Wayfinder",
    description: "Reads the multiverse like a map and slips through it.",
    base_stats: Stats::new(0, 1, 2, -1),
    moves: [
        MoveId::ScoutTheMultiverse,
        MoveId::SlipstreamSurge,
        MoveId::PhaseStrike,
    ],
};

/// All archetypes.
pub const ARCHETYPES: [&ArchetypeDef; 3] = [&RIFT_WEAVER, &GATE_CRASHER, &WAYFINDER];

const AETHER_SHIELD: MoveDef = MoveDef {
    id: MoveId::AetherShield,
    name: "Aether Shield",
    description: "When a defense token blocks retaliation, 50% chance it is not spent.",
    hooks: &[Hook::OnRetaliationBlocked(50)],
};

const NEXUS_SYNTHESIZER: MoveDef = MoveDef {
    id: MoveId::NexusSynthesizer,
    name: "Nexus Synthesizer",
    description: "Spend 2 ritual tokens to restore 3 HP. 30% chance to heal 1 HP after each move.",
    hooks: &[
        Hook::Action(ActionKind::Synthesize),
        Hook::OnMove(MoveHeal { heal: 1, chance: 30 }),
    ],
};

const DIMENSIONAL_ANCHOR: MoveDef = MoveDef {
    id: MoveId::DimensionalAnchor,
    name: "Dimensional Anchor",
    description: "Spend 2 ritual tokens to deal 1 damage to an Elite or Boss, once per encounter.",
    hooks: &[Hook::Action(ActionKind::Anchor)],
};

const MOMENTUM_STRIKE: MoveDef = MoveDef {
    id: MoveId::MomentumStrike,
    name: "Momentum Strike",
    description: "Strength sessions grant +1 attack token.",
    hooks: &[Hook::OnActivity(ActivityIntercept {
        activity: ActivityKind::Strength,
        resource: ResourceKind::Attack,
        amount: 1,
        bonus: ActivityBonus::Flat,
    })],
};

const AURA_OF_CONQUEST: MoveDef = MoveDef {
    id: MoveId::AuraOfConquest,
    name: "Aura of Conquest",
    description: "Gain 1 defense token after every victory.",
    hooks: &[Hook::OnVictory(ResourceCost::new(ResourceKind::Defense, 1))],
};

const DEFY_REALITY: MoveDef = MoveDef {
    id: MoveId::DefyReality,
    name: "Defy Reality",
    description: "At 0 HP, sacrifice your newest item to return at full health with no penalty.",
    hooks: &[Hook::OnZeroHp(ZeroHpRescue::SacrificeItem)],
};

const SCOUT_THE_MULTIVERSE: MoveDef = MoveDef {
    id: MoveId::ScoutTheMultiverse,
    name: "Scout the Multiverse",
    description: "Spend 1 ritual token to reveal a hex two steps away.",
    hooks: &[Hook::Action(ActionKind::Scout)],
};

const SLIPSTREAM_SURGE: MoveDef = MoveDef {
    id: MoveId::SlipstreamSurge,
    name: "Slipstream Surge",
    description: "Cardio sessions have a 50% chance to grant +1 movement token.",
    hooks: &[Hook::OnActivity(ActivityIntercept {
        activity: ActivityKind::Cardio,
        resource: ResourceKind::Movement,
        amount: 1,
        bonus: ActivityBonus::Chance(50),
    })],
};

const PHASE_STRIKE: MoveDef = MoveDef {
    id: MoveId::PhaseStrike,
    name: "Phase Strike",
    description: "Spend 3 movement tokens to deal 1 damage without retaliation.",
    hooks: &[Hook::Action(ActionKind::PhaseStrike)],
};

/// Look up a move definition.
#[must_use]
pub const fn move_def(id: MoveId) -> &'static MoveDef {
    match id {
        MoveId::AetherShield => &AETHER_SHIELD,
        MoveId::NexusSynthesizer => &NEXUS_SYNTHESIZER,
        MoveId::DimensionalAnchor => &DIMENSIONAL_ANCHOR,
        MoveId::MomentumStrike => &MOMENTUM_STRIKE,
        MoveId::AuraOfConquest => &AURA_OF_CONQUEST,
        MoveId::DefyReality => &DEFY_REALITY,
        MoveId::ScoutTheMultiverse => &SCOUT_THE_MULTIVERSE,
        MoveId::SlipstreamSurge => &SLIPSTREAM_SURGE,
        MoveId::PhaseStrike => &PHASE_STRIKE,
    }
}

/// Look up an archetype definition.
#[must_use]
pub const fn archetype_def(id: ArchetypeId) -> &'static ArchetypeDef {
    match id {
        ArchetypeId::RiftWeaver => &RIFT_WEAVER,
        ArchetypeId::GateCrasher => &GATE_CRASHER,
        ArchetypeId::Wayfinder => &WAYFINDER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_move_belongs_to_one_archetype() {
        for archetype in ARCHETYPES {
            assert_eq!(archetype_def(archetype.id), archetype);
            for id in archetype.moves {
                assert_eq!(move_def(id).id, id);
                assert_eq!(id.archetype(), archetype.id);
            }
        }
    }

    #[test]
    fn test_base_stats() {
        assert_eq!(archetype_def(ArchetypeId::GateCrasher).base_stats.power, 2);
        assert_eq!(archetype_def(ArchetypeId::Wayfinder).base_stats.speed, 2);
        assert_eq!(archetype_def(ArchetypeId::RiftWeaver).base_stats.agility, 2);
    }
}
