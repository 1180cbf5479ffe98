//! Non-combat player actions: logging activity, moving, healing, items and
//! purchases, plus the scout and synthesizer archetype actions.

use serde::{Deserialize, Serialize};

use crate::campaign::Campaign;
use crate::data::{InventoryItem, ItemEffect};
use crate::error::Rejection;
use crate::hex::HexCoord;
use crate::moves::{require_action, ActionKind};
use crate::resources::{apply_activity, ActivityContext, ActivityKind, ActivityReport, ResourceKind};
use crate::rng::Roller;
use crate::state::GameState;

/// Result of a map move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveReport {
    /// New position.
    pub to: HexCoord,
    /// Hexes newly revealed.
    pub revealed: usize,
    /// Hit points restored by on-move effects.
    pub healed: u32,
}

/// Result of a heal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealReport {
    /// Hit points restored.
    pub healed: u32,
    /// Hit points now.
    pub hp: u32,
    /// Ritual tokens spent.
    pub ritual_spent: u32,
}

/// Result of using an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemReport {
    /// The consumed item.
    pub item: InventoryItem,
    /// Effect applied.
    pub effect: ItemEffect,
}

/// Result of a nexus purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseReport {
    /// Reward bought.
    pub reward_id: String,
    /// Price paid.
    pub cost: u32,
    /// Currency left.
    pub currency: u32,
}

/// Credit tokens for a logged activity.
pub fn log_activity<R: Roller>(
    state: &mut GameState,
    campaign: &Campaign,
    activity: ActivityKind,
    minutes: u32,
    roller: &mut R,
) -> ActivityReport {
    let config = campaign.config();
    let intercepts = state.character.intercepts();
    let context = ActivityContext {
        stat_value: Some(state.character.stats.get(activity.stat())),
        boost_percent_per_point: config.stat_boost_percent,
        intercepts: &intercepts,
    };
    let (resources, report) = apply_activity(
        state.resources,
        activity,
        minutes,
        &config.activity,
        &context,
        roller,
    );
    state.resources = resources;
    tracing::debug!(?activity, minutes, base = report.base_units, bonus = report.stat_bonus, "Activity logged");
    report
}

/// Step to an adjacent hex.
pub fn move_to<R: Roller>(
    state: &mut GameState,
    campaign: &Campaign,
    hex: HexCoord,
    roller: &mut R,
) -> Result<MoveReport, Rejection> {
    if !campaign.grid().contains(hex) {
        return Err(Rejection::OutOfBounds(hex));
    }
    let distance = state.map.player_pos.distance(hex);
    if distance != 1 {
        return Err(Rejection::NotAdjacent { distance });
    }
    state.resources = state
        .resources
        .try_spend(ResourceKind::Movement, campaign.config().move_cost)?;

    let known = state.map.revealed.len();
    state.map.player_pos = hex;
    state.map.reveal_around(campaign.grid(), hex);

    let mut healed = 0;
    for effect in state.character.intercepts().move_heals() {
        if roller.chance(effect.chance) {
            healed += state.character.heal(effect.heal);
        }
    }

    Ok(MoveReport {
        to: hex,
        revealed: state.map.revealed.len() - known,
        healed,
    })
}

/// Spend ritual tokens to restore `hp` hit points, capped at maximum.
pub fn heal(state: &mut GameState, campaign: &Campaign, hp: u32) -> Result<HealReport, Rejection> {
    let character = &state.character;
    if character.hp >= character.max_hp {
        return Err(Rejection::AlreadyFullHealth);
    }
    let amount = hp.min(character.max_hp - character.hp);
    let ritual_spent = amount.saturating_mul(campaign.config().heal_ritual_per_hp);
    state.resources = state.resources.try_spend(ResourceKind::Ritual, ritual_spent)?;
    let healed = state.character.heal(amount);
    Ok(HealReport {
        healed,
        hp: state.character.hp,
        ritual_spent,
    })
}

/// Nexus Synthesizer: convert ritual tokens into hit points.
pub fn synthesize_heal(state: &mut GameState, campaign: &Campaign) -> Result<HealReport, Rejection> {
    require_action(&state.character, ActionKind::Synthesize)?;
    if state.character.hp >= state.character.max_hp {
        return Err(Rejection::AlreadyFullHealth);
    }
    let abilities = campaign.config().abilities;
    state.resources = state
        .resources
        .try_spend(ResourceKind::Ritual, abilities.synthesize_ritual)?;
    let healed = state.character.heal(abilities.synthesize_heal);
    Ok(HealReport {
        healed,
        hp: state.character.hp,
        ritual_spent: abilities.synthesize_ritual,
    })
}

/// Hidden in-grid hexes on the scouting ring around the player.
#[must_use]
pub fn scout_targets(state: &GameState, campaign: &Campaign) -> Vec<HexCoord> {
    campaign
        .grid()
        .ring_in(state.map.player_pos, campaign.config().abilities.scout_range)
        .into_iter()
        .filter(|hex| !state.map.revealed.contains(hex))
        .collect()
}

/// Scout the Multiverse: reveal one hidden hex at the scouting range.
pub fn scout(state: &mut GameState, campaign: &Campaign, hex: HexCoord) -> Result<HexCoord, Rejection> {
    require_action(&state.character, ActionKind::Scout)?;
    if !campaign.grid().contains(hex) {
        return Err(Rejection::OutOfBounds(hex));
    }
    let abilities = campaign.config().abilities;
    if !scout_targets(state, campaign).contains(&hex) {
        return Err(Rejection::InvalidScoutTarget {
            range: abilities.scout_range,
        });
    }
    state.resources = state
        .resources
        .try_spend(ResourceKind::Ritual, abilities.scout_ritual)?;
    state.map.revealed.insert(hex);
    Ok(hex)
}

/// Consume the first carried item with `item_id` and apply its effect.
pub fn use_item(state: &mut GameState, item_id: &str) -> Result<ItemReport, Rejection> {
    let inventory = &mut state.character.inventory;
    let index = inventory
        .iter()
        .position(|item| item.id == item_id)
        .ok_or_else(|| Rejection::ItemNotFound(item_id.to_string()))?;
    let effect = match &inventory[index] {
        item if !item.is_consumable() => None,
        item => item.effect,
    }
    .ok_or_else(|| Rejection::ItemNotUsable(item_id.to_string()))?;

    let item = inventory.remove(index);
    match effect {
        ItemEffect::GrantResource { resource, amount } => {
            state.resources = state.resources.with_added(resource, amount);
        }
        ItemEffect::StatBonus { stat, amount } => state.character.stats.adjust(stat, amount),
        ItemEffect::Shield => state.character.shield_active = true,
    }
    tracing::debug!(item = %item.id, "Item used");
    Ok(ItemReport { item, effect })
}

/// Buy a nexus reward with currency.
pub fn purchase(
    state: &mut GameState,
    campaign: &Campaign,
    reward_id: &str,
) -> Result<PurchaseReport, Rejection> {
    let reward = campaign
        .package()
        .nexus_reward(reward_id)
        .ok_or_else(|| Rejection::UnknownReward(reward_id.to_string()))?;
    let available = state.progression.currency;
    if available < reward.cost {
        return Err(Rejection::InsufficientCurrency {
            required: reward.cost,
            available,
        });
    }
    state.forfeit_currency(reward.cost);
    tracing::info!(reward = reward_id, cost = reward.cost, "Nexus reward purchased");
    Ok(PurchaseReport {
        reward_id: reward.id.clone(),
        cost: reward.cost,
        currency: state.progression.currency,
    })
}
