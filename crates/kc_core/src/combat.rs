//! Combat resolution.
//!
//! An engage turn spends attack tokens against a per-hex HP pool:
//!
//! 1. Reject with no attack tokens.
//! 2. Deal `min(attack, enemy HP)` damage, spending that many tokens.
//! 3. A killing blow clears the hex and pays out. No retaliation.
//! 4. A survivor retaliates once. Absorbed by the shield flag, then a
//!    defense token, then a ritual token; otherwise the player loses 1 HP.
//!    At 0 HP the player is either rescued by a move or knocked back to the
//!    start hex with a currency penalty.
//!
//! Phase strike and anchor are intercepts on the same HP pool: they deal
//! exactly 1 damage from another resource and never provoke retaliation.
//! Anomalies resolve in a single atomic payment.

use serde::{Deserialize, Serialize};

use crate::campaign::Campaign;
use crate::data::{AnomalyData, EncounterData, EncounterKind, InventoryItem};
use crate::error::Rejection;
use crate::gate::check_boss_gate;
use crate::hex::HexCoord;
use crate::moves::{require_action, ActionKind, ZeroHpRescue};
use crate::placement::MapEncounter;
use crate::progression::Reward;
use crate::resources::{spend_anomaly, ResourceKind, Resources};
use crate::rng::Roller;
use crate::state::{CampaignStatus, GameState};

/// Optional engage modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngageOptions {
    /// Pay movement for a 1-damage strike with no retaliation.
    #[serde(default)]
    pub phase_strike: bool,
}

/// How the enemy's counter-attack was handled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Retaliation {
    /// The one-shot shield took the hit.
    Shielded,
    /// A defense token took the hit, possibly refunded.
    Blocked {
        /// Whether the token came back.
        refunded: bool,
    },
    /// A ritual token took the hit.
    Absorbed,
    /// The player lost 1 HP.
    Wounded {
        /// HP left.
        hp: u32,
    },
    /// The player hit 0 HP and sacrificed an item to recover.
    DefiedDeath {
        /// Item destroyed.
        sacrificed: InventoryItem,
    },
    /// The player hit 0 HP and was sent back to the start hex.
    KnockedBack {
        /// Currency lost.
        penalty: u32,
    },
}

/// Spoils of a defeated encounter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VictoryReport {
    /// Currency and experience granted.
    pub reward: Reward,
    /// Item dropped.
    pub loot: Option<InventoryItem>,
    /// Tokens granted by on-victory intercepts.
    pub bonus: Resources,
    /// A level-up now awaits a choice.
    pub level_up_pending: bool,
    /// The realm boss fell.
    pub campaign_won: bool,
}

/// Result of one strike.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrikeOutcome {
    /// The encounter was defeated.
    Defeated(VictoryReport),
    /// The encounter survived; `None` when the strike provokes no retaliation.
    Survived(Option<Retaliation>),
}

/// Report of a strike against a combat encounter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatReport {
    /// Target hex.
    pub hex: HexCoord,
    /// Encounter id.
    pub encounter_id: String,
    /// Damage dealt.
    pub damage: u32,
    /// Enemy HP after the strike.
    pub enemy_hp: u32,
    /// Kill or counter-attack.
    pub outcome: StrikeOutcome,
}

/// Report of a resolved anomaly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyReport {
    /// Anomaly hex.
    pub hex: HexCoord,
    /// Anomaly id.
    pub anomaly_id: String,
    /// Currency and experience granted.
    pub reward: Reward,
    /// Story text.
    pub lore_text: String,
    /// A level-up now awaits a choice.
    pub level_up_pending: bool,
}

/// Result of an engage command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngageReport {
    /// Combat turn.
    Combat(CombatReport),
    /// Anomaly resolution.
    Anomaly(AnomalyReport),
}

/// Engage whatever is placed on `hex`.
pub fn engage<R: Roller>(
    state: &mut GameState,
    campaign: &Campaign,
    hex: HexCoord,
    options: EngageOptions,
    roller: &mut R,
) -> Result<EngageReport, Rejection> {
    let encounter = campaign
        .encounter_at(hex)
        .ok_or(Rejection::NoEncounter(hex))?;
    if state.map.is_cleared(hex) {
        return Err(Rejection::AlreadyCleared(hex));
    }
    match encounter {
        MapEncounter::Anomaly(anomaly) => {
            resolve_anomaly(state, hex, anomaly).map(EngageReport::Anomaly)
        }
        MapEncounter::Combat(enemy) => {
            if enemy.kind == EncounterKind::Boss {
                check_boss_gate(state, campaign)?;
            }
            let report = if options.phase_strike {
                phase_strike(state, campaign, hex, enemy)?
            } else {
                strike(state, campaign, hex, enemy, roller)?
            };
            Ok(EngageReport::Combat(report))
        }
    }
}

fn strike<R: Roller>(
    state: &mut GameState,
    campaign: &Campaign,
    hex: HexCoord,
    enemy: &EncounterData,
    roller: &mut R,
) -> Result<CombatReport, Rejection> {
    if state.resources.attack == 0 {
        return Err(Rejection::NoAttackTokens);
    }
    let damage = state
        .resources
        .attack
        .min(state.map.enemy_hp(hex, enemy.strikes));
    state.resources.attack -= damage;
    let roller: &mut dyn Roller = roller;
    Ok(deal_damage(state, campaign, hex, enemy, damage, Some(roller)))
}

fn phase_strike(
    state: &mut GameState,
    campaign: &Campaign,
    hex: HexCoord,
    enemy: &EncounterData,
) -> Result<CombatReport, Rejection> {
    require_action(&state.character, ActionKind::PhaseStrike)?;
    let cost = campaign.config().abilities.phase_strike_movement;
    state.resources = state.resources.try_spend(ResourceKind::Movement, cost)?;
    Ok(deal_damage(state, campaign, hex, enemy, 1, None))
}

/// Spend ritual tokens to deal 1 damage to an elite or boss, once per encounter.
pub fn anchor(
    state: &mut GameState,
    campaign: &Campaign,
    hex: HexCoord,
) -> Result<CombatReport, Rejection> {
    require_action(&state.character, ActionKind::Anchor)?;
    let enemy = match campaign.encounter_at(hex) {
        None => return Err(Rejection::NoEncounter(hex)),
        Some(MapEncounter::Combat(enemy)) if enemy.kind != EncounterKind::Basic => enemy,
        Some(_) => return Err(Rejection::InvalidAnchorTarget),
    };
    if state.map.is_cleared(hex) {
        return Err(Rejection::AlreadyCleared(hex));
    }
    if enemy.kind == EncounterKind::Boss {
        check_boss_gate(state, campaign)?;
    }
    if state.map.anchor_used.contains(&hex) {
        return Err(Rejection::AbilityAlreadyUsed {
            ability: ActionKind::Anchor.source_move(),
            hex,
        });
    }
    let cost = campaign.config().abilities.anchor_ritual;
    state.resources = state.resources.try_spend(ResourceKind::Ritual, cost)?;
    state.map.anchor_used.insert(hex);
    Ok(deal_damage(state, campaign, hex, enemy, 1, None))
}

/// Apply damage; defeat the enemy or let it retaliate when a roller is given.
fn deal_damage(
    state: &mut GameState,
    campaign: &Campaign,
    hex: HexCoord,
    enemy: &EncounterData,
    damage: u32,
    retaliation_roller: Option<&mut dyn Roller>,
) -> CombatReport {
    let enemy_hp = state.map.enemy_hp(hex, enemy.strikes).saturating_sub(damage);
    let outcome = if enemy_hp == 0 {
        StrikeOutcome::Defeated(defeat(state, hex, enemy))
    } else {
        state.map.encounter_health.insert(hex, enemy_hp);
        let retaliation = retaliation_roller.map(|roller| retaliate(state, campaign, roller));
        StrikeOutcome::Survived(retaliation)
    };
    tracing::debug!(%hex, damage, enemy_hp, "Strike resolved");
    CombatReport {
        hex,
        encounter_id: enemy.id.clone(),
        damage,
        enemy_hp,
        outcome,
    }
}

fn defeat(state: &mut GameState, hex: HexCoord, enemy: &EncounterData) -> VictoryReport {
    state.map.cleared.insert(hex);
    state.map.encounter_health.remove(&hex);
    state.map.anchor_used.remove(&hex);

    let reward = enemy.reward();
    let level_up_pending = state.grant_reward(reward);

    if let Some(item) = &enemy.loot {
        state.character.acquire(item.clone());
    }

    let mut bonus = Resources::default();
    for grant in state.character.intercepts().victory_grants() {
        bonus = bonus.with_added(grant.resource, grant.amount);
    }
    state.resources = state.resources + bonus;

    let campaign_won = enemy.kind == EncounterKind::Boss;
    if campaign_won {
        state.status = CampaignStatus::Victory;
        tracing::info!(boss = %enemy.id, "Realm boss defeated");
    }

    VictoryReport {
        reward,
        loot: enemy.loot.clone(),
        bonus,
        level_up_pending,
        campaign_won,
    }
}

fn retaliate(state: &mut GameState, campaign: &Campaign, roller: &mut dyn Roller) -> Retaliation {
    if state.character.shield_active {
        state.character.shield_active = false;
        return Retaliation::Shielded;
    }
    if let Some(next) = state.resources.spend(ResourceKind::Defense, 1) {
        let refunded = state
            .character
            .intercepts()
            .block_refunds()
            .iter()
            .any(|percent| roller.chance(*percent));
        state.resources = if refunded { state.resources } else { next };
        return Retaliation::Blocked { refunded };
    }
    if let Some(next) = state.resources.spend(ResourceKind::Ritual, 1) {
        state.resources = next;
        return Retaliation::Absorbed;
    }

    state.character.hp = state.character.hp.saturating_sub(1);
    if state.character.hp > 0 {
        return Retaliation::Wounded {
            hp: state.character.hp,
        };
    }

    if state.character.intercepts().zero_hp_rescue() == Some(ZeroHpRescue::SacrificeItem) {
        if let Some(sacrificed) = state.character.inventory.pop() {
            state.character.restore_hp();
            tracing::info!(item = %sacrificed.id, "Defied death");
            return Retaliation::DefiedDeath { sacrificed };
        }
    }

    state.character.restore_hp();
    state.map.player_pos = campaign.start();
    let penalty = state.forfeit_currency(campaign.config().knockback_penalty);
    tracing::info!(penalty, "Knocked back to start");
    Retaliation::KnockedBack { penalty }
}

fn resolve_anomaly(
    state: &mut GameState,
    hex: HexCoord,
    anomaly: &AnomalyData,
) -> Result<AnomalyReport, Rejection> {
    let cost = anomaly.cost();
    let Some(next) = spend_anomaly(state.resources, &cost) else {
        return Err(state.resources.try_spend_all(&cost.costs()).err().unwrap_or(
            Rejection::InsufficientResources {
                resource: ResourceKind::Ritual,
                required: cost.ritual,
                available: state.resources.ritual,
            },
        ));
    };
    state.resources = next;
    state.map.cleared.insert(hex);
    let reward = anomaly.reward();
    let level_up_pending = state.grant_reward(reward);
    Ok(AnomalyReport {
        hex,
        anomaly_id: anomaly.id.clone(),
        reward,
        lore_text: anomaly.lore_text.clone(),
        level_up_pending,
    })
}
