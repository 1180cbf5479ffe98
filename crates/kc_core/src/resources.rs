//! Resource tokens and activity conversion.
//!
//! Four non-negative counters fuel everything on the map. Every debit is
//! all-or-nothing: a spend either returns the fully debited value or `None`,
//! and the caller's copy is never touched.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Add;

use serde::{Deserialize, Serialize};

use crate::character::StatKind;
use crate::error::Rejection;
use crate::moves::{ActivityBonus, Intercepts};
use crate::rng::Roller;

/// One of the four resource counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Spent to move between hexes.
    Movement,
    /// Spent to strike encounters.
    Attack,
    /// Absorbs retaliation.
    Defense,
    /// Fuels rituals, anomalies and absorbs retaliation as a fallback.
    Ritual,
}

impl ResourceKind {
    /// All kinds, in display order.
    pub const ALL: [Self; 4] = [Self::Movement, Self::Attack, Self::Defense, Self::Ritual];

    /// Player-facing token name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Movement => "movement tokens",
            Self::Attack => "attack tokens",
            Self::Defense => "defense tokens",
            Self::Ritual => "ritual tokens",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A single resource debit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceCost {
    /// Which counter.
    pub resource: ResourceKind,
    /// How much.
    pub amount: u32,
}

impl ResourceCost {
    /// Create a cost.
    #[must_use]
    pub const fn new(resource: ResourceKind, amount: u32) -> Self {
        Self { resource, amount }
    }
}

/// The four token balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Resources {
    /// Movement tokens.
    pub movement: u32,
    /// Attack tokens.
    pub attack: u32,
    /// Defense tokens.
    pub defense: u32,
    /// Ritual tokens.
    pub ritual: u32,
}

impl Resources {
    /// Create balances.
    #[must_use]
    pub const fn new(movement: u32, attack: u32, defense: u32, ritual: u32) -> Self {
        Self {
            movement,
            attack,
            defense,
            ritual,
        }
    }

    /// Balance of one counter.
    #[must_use]
    pub const fn get(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Movement => self.movement,
            ResourceKind::Attack => self.attack,
            ResourceKind::Defense => self.defense,
            ResourceKind::Ritual => self.ritual,
        }
    }

    fn slot_mut(&mut self, kind: ResourceKind) -> &mut u32 {
        match kind {
            ResourceKind::Movement => &mut self.movement,
            ResourceKind::Attack => &mut self.attack,
            ResourceKind::Defense => &mut self.defense,
            ResourceKind::Ritual => &mut self.ritual,
        }
    }

    /// Credit a counter (saturating).
    #[must_use]
    pub fn with_added(mut self, kind: ResourceKind, amount: u32) -> Self {
        let slot = self.slot_mut(kind);
        *slot = slot.saturating_add(amount);
        self
    }

    /// Debit a counter, or `None` if the balance is short.
    #[must_use]
    pub fn spend(mut self, kind: ResourceKind, amount: u32) -> Option<Self> {
        let slot = self.slot_mut(kind);
        *slot = slot.checked_sub(amount)?;
        Some(self)
    }

    /// Debit several costs together, or `None` if any one is short.
    ///
    /// Costs naming the same counter are summed.
    #[must_use]
    pub fn spend_all(self, costs: &[ResourceCost]) -> Option<Self> {
        costs
            .iter()
            .try_fold(self, |acc, cost| acc.spend(cost.resource, cost.amount))
    }

    /// Whether every cost can be paid at once.
    #[must_use]
    pub fn can_afford(&self, costs: &[ResourceCost]) -> bool {
        self.spend_all(costs).is_some()
    }

    /// The first counter that cannot cover its summed cost.
    #[must_use]
    pub fn shortfall(&self, costs: &[ResourceCost]) -> Option<Rejection> {
        let mut required: BTreeMap<ResourceKind, u32> = BTreeMap::new();
        for cost in costs {
            let entry = required.entry(cost.resource).or_default();
            *entry = entry.saturating_add(cost.amount);
        }
        required.into_iter().find_map(|(resource, required)| {
            let available = self.get(resource);
            (available < required).then_some(Rejection::InsufficientResources {
                resource,
                required,
                available,
            })
        })
    }

    /// [`spend_all`](Self::spend_all) with a typed rejection on failure.
    pub fn try_spend_all(self, costs: &[ResourceCost]) -> Result<Self, Rejection> {
        match self.spend_all(costs) {
            Some(next) => Ok(next),
            None => Err(self.shortfall(costs).unwrap_or(Rejection::InsufficientResources {
                resource: ResourceKind::Ritual,
                required: 0,
                available: 0,
            })),
        }
    }

    /// [`spend`](Self::spend) with a typed rejection on failure.
    pub fn try_spend(self, kind: ResourceKind, amount: u32) -> Result<Self, Rejection> {
        self.try_spend_all(&[ResourceCost::new(kind, amount)])
    }
}

impl Add for Resources {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            movement: self.movement.saturating_add(rhs.movement),
            attack: self.attack.saturating_add(rhs.attack),
            defense: self.defense.saturating_add(rhs.defense),
            ritual: self.ritual.saturating_add(rhs.ritual),
        }
    }
}

/// Cost of clearing an anomaly: ritual tokens plus one secondary resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnomalyCost {
    /// Ritual tokens, always debited first.
    pub ritual: u32,
    /// The anomaly's secondary resource.
    pub secondary: ResourceCost,
}

impl AnomalyCost {
    /// Both debits, ritual first.
    #[must_use]
    pub const fn costs(&self) -> [ResourceCost; 2] {
        [
            ResourceCost::new(ResourceKind::Ritual, self.ritual),
            self.secondary,
        ]
    }
}

/// Debit an anomaly cost: ritual first, then the secondary resource.
///
/// If either step fails nothing is debited.
#[must_use]
pub fn spend_anomaly(resources: Resources, cost: &AnomalyCost) -> Option<Resources> {
    resources
        .spend(ResourceKind::Ritual, cost.ritual)?
        .spend(cost.secondary.resource, cost.secondary.amount)
}

/// A kind of logged real-world activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// Runs, rides, swims. Earns movement.
    Cardio,
    /// Lifting. Earns attack.
    Strength,
    /// Stretching, yoga. Earns defense.
    Flexibility,
    /// Meditation, recovery. Earns ritual.
    Wellness,
}

impl ActivityKind {
    /// Counter credited by this activity.
    #[must_use]
    pub const fn resource(self) -> ResourceKind {
        match self {
            Self::Cardio => ResourceKind::Movement,
            Self::Strength => ResourceKind::Attack,
            Self::Flexibility => ResourceKind::Defense,
            Self::Wellness => ResourceKind::Ritual,
        }
    }

    /// Stat whose value boosts this activity.
    #[must_use]
    pub const fn stat(self) -> StatKind {
        match self {
            Self::Cardio => StatKind::Speed,
            Self::Strength => StatKind::Power,
            Self::Flexibility => StatKind::Agility,
            Self::Wellness => StatKind::Insight,
        }
    }
}

/// Minutes of activity required per token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityThresholds {
    /// Minutes per movement token.
    pub cardio: u32,
    /// Minutes per attack token.
    pub strength: u32,
    /// Minutes per defense token.
    pub flexibility: u32,
    /// Minutes per ritual token.
    pub wellness: u32,
}

impl Default for ActivityThresholds {
    fn default() -> Self {
        Self {
            cardio: 20,
            strength: 15,
            flexibility: 20,
            wellness: 15,
        }
    }
}

impl ActivityThresholds {
    /// Threshold for one activity.
    #[must_use]
    pub const fn minutes_per_unit(&self, activity: ActivityKind) -> u32 {
        match activity {
            ActivityKind::Cardio => self.cardio,
            ActivityKind::Strength => self.strength,
            ActivityKind::Flexibility => self.flexibility,
            ActivityKind::Wellness => self.wellness,
        }
    }

    /// Whole units earned. No partial credit.
    #[must_use]
    pub const fn units_for(&self, activity: ActivityKind, minutes: u32) -> u32 {
        match self.minutes_per_unit(activity) {
            0 => 0,
            per_unit => minutes / per_unit,
        }
    }
}

/// Character-dependent inputs to activity conversion.
#[derive(Debug, Clone, Copy)]
pub struct ActivityContext<'a> {
    /// Value of the activity's boosting stat, if boosting applies.
    pub stat_value: Option<i32>,
    /// Bonus chance per stat point, in percent.
    pub boost_percent_per_point: i32,
    /// Move intercepts of the logging character.
    pub intercepts: &'a Intercepts,
}

/// Breakdown of what an activity earned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityReport {
    /// Activity logged.
    pub activity: ActivityKind,
    /// Units from the threshold formula.
    pub base_units: u32,
    /// Extra units from stat-boost rolls.
    pub stat_bonus: u32,
    /// Everything credited, including move bonuses.
    pub earned: Resources,
}

/// Convert logged minutes into tokens.
///
/// Base units are `floor(minutes / threshold)`. Each base unit rolls once for
/// a bonus unit at `stat * percent_per_point` (non-positive stats never
/// roll). Move intercepts for the activity fire only when at least one base
/// unit was earned.
pub fn apply_activity<R: Roller>(
    resources: Resources,
    activity: ActivityKind,
    minutes: u32,
    thresholds: &ActivityThresholds,
    context: &ActivityContext<'_>,
    roller: &mut R,
) -> (Resources, ActivityReport) {
    let resource = activity.resource();
    let base_units = thresholds.units_for(activity, minutes);

    let mut stat_bonus = 0;
    if let Some(stat) = context.stat_value {
        let percent = stat.saturating_mul(context.boost_percent_per_point);
        for _ in 0..base_units {
            if roller.chance(percent) {
                stat_bonus += 1;
            }
        }
    }

    let mut earned = Resources::default().with_added(resource, base_units + stat_bonus);
    if base_units > 0 {
        for intercept in context.intercepts.activity_bonuses(activity) {
            let granted = match intercept.bonus {
                ActivityBonus::Flat => true,
                ActivityBonus::Chance(percent) => roller.chance(percent),
            };
            if granted {
                earned = earned.with_added(intercept.resource, intercept.amount);
            }
        }
    }

    let report = ActivityReport {
        activity,
        base_units,
        stat_bonus,
        earned,
    };
    (resources + earned, report)
}
