//! Seeded encounter placement.
//!
//! Places a realm's content onto the grid by priority band. One seeded
//! generator drives every choice, so the same seed and content always give
//! the same layout:
//!
//! 1. Rift entrances are reserved first (fixed hex, or a random free hex).
//! 2. One boss in the rightmost columns.
//! 3. Elites in a window of columns around the grid midpoint, no repeats
//!    while the pool lasts.
//! 4. Basics scattered over the remaining hexes, up to a cap.
//! 5. Distinct anomalies over what remains, up to a cap.
//!
//! The start hex is never claimed.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::data::{AnomalyData, CampaignPackage, EncounterData, EncounterKind};
use crate::hex::{HexCoord, HexGrid};
use crate::rng::SeededRng;

/// Placement tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Random seed for deterministic placement.
    pub seed: u64,
    /// Rightmost columns eligible for the boss.
    pub boss_band: u32,
    /// Width of the elite column window.
    pub elite_window: u32,
    /// Elite hexes to fill.
    pub elite_slots: usize,
    /// Maximum basic encounters.
    pub max_basics: usize,
    /// Maximum anomalies.
    pub max_anomalies: usize,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            boss_band: 2,
            elite_window: 5,
            elite_slots: 3,
            max_basics: 18,
            max_anomalies: 3,
        }
    }
}

impl PlacementConfig {
    /// Set the random seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the basic encounter cap.
    #[must_use]
    pub const fn with_max_basics(mut self, max: usize) -> Self {
        self.max_basics = max;
        self
    }

    /// Set the anomaly cap.
    #[must_use]
    pub const fn with_max_anomalies(mut self, max: usize) -> Self {
        self.max_anomalies = max;
        self
    }

    /// Set the number of elite slots.
    #[must_use]
    pub const fn with_elite_slots(mut self, slots: usize) -> Self {
        self.elite_slots = slots;
        self
    }
}

/// Display tag of a placed encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncounterTag {
    /// Basic combat.
    Basic,
    /// Elite combat.
    Elite,
    /// Boss combat.
    Boss,
    /// Anomaly.
    Anomaly,
}

/// Content placed on a hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapEncounter {
    /// Multi-turn combat encounter.
    Combat(EncounterData),
    /// One-shot anomaly.
    Anomaly(AnomalyData),
}

impl MapEncounter {
    /// Content id.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Combat(e) => &e.id,
            Self::Anomaly(a) => &a.id,
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Combat(e) => &e.name,
            Self::Anomaly(a) => &a.name,
        }
    }

    /// Type tag.
    #[must_use]
    pub const fn tag(&self) -> EncounterTag {
        match self {
            Self::Combat(e) => match e.kind {
                EncounterKind::Basic => EncounterTag::Basic,
                EncounterKind::Elite => EncounterTag::Elite,
                EncounterKind::Boss => EncounterTag::Boss,
            },
            Self::Anomaly(_) => EncounterTag::Anomaly,
        }
    }
}

/// Generated layout. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Hex to encounter.
    pub encounters: BTreeMap<HexCoord, MapEncounter>,
    /// Hex to rift id.
    pub rift_entrances: BTreeMap<HexCoord, String>,
}

impl Placement {
    /// Encounter on a hex.
    #[must_use]
    pub fn encounter_at(&self, hex: HexCoord) -> Option<&MapEncounter> {
        self.encounters.get(&hex)
    }

    /// Rift whose entrance is on a hex.
    #[must_use]
    pub fn rift_at(&self, hex: HexCoord) -> Option<&str> {
        self.rift_entrances.get(&hex).map(String::as_str)
    }

    /// Entrance hex of a rift.
    #[must_use]
    pub fn entrance_of(&self, rift_id: &str) -> Option<HexCoord> {
        self.rift_entrances
            .iter()
            .find_map(|(hex, id)| (id == rift_id).then_some(*hex))
    }

    /// Hexes holding encounters with a tag, in coordinate order.
    #[must_use]
    pub fn hexes_tagged(&self, tag: EncounterTag) -> Vec<HexCoord> {
        self.encounters
            .iter()
            .filter(|(_, e)| e.tag() == tag)
            .map(|(hex, _)| *hex)
            .collect()
    }
}

struct Claims<'a> {
    grid: &'a HexGrid,
    claimed: BTreeSet<HexCoord>,
}

impl<'a> Claims<'a> {
    fn new(grid: &'a HexGrid, start: HexCoord) -> Self {
        Self {
            grid,
            claimed: BTreeSet::from([start]),
        }
    }

    /// Unclaimed hexes passing `filter`, in grid order.
    fn free(&self, filter: impl Fn(HexCoord) -> bool) -> Vec<HexCoord> {
        self.grid
            .cells()
            .iter()
            .copied()
            .filter(|h| !self.claimed.contains(h) && filter(*h))
            .collect()
    }

    fn claim(&mut self, hex: HexCoord) -> bool {
        self.grid.contains(hex) && self.claimed.insert(hex)
    }
}

/// Place a package's content onto a grid.
#[must_use]
pub fn generate_placement(
    grid: &HexGrid,
    start: HexCoord,
    package: &CampaignPackage,
    config: &PlacementConfig,
) -> Placement {
    let mut rng = SeededRng::new(config.seed);
    let mut claims = Claims::new(grid, start);
    let mut placement = Placement::default();
    let (min_col, max_col) = grid.column_span().unwrap_or((0, 0));

    for rift in &package.rifts {
        let fixed = rift.entrance_hex.filter(|h| claims.claim(*h));
        let hex = fixed.or_else(|| {
            let hex = rng.pick_n(&claims.free(|_| true), 1).first().copied()?;
            claims.claim(hex);
            Some(hex)
        });
        if let Some(hex) = hex {
            placement.rift_entrances.insert(hex, rift.id.clone());
        }
    }

    let bosses = package.encounters_of(EncounterKind::Boss);
    if !bosses.is_empty() {
        #[allow(clippy::cast_possible_wrap)]
        let band_start = max_col - config.boss_band.max(1) as i32 + 1;
        let band = claims.free(|h| h.to_offset().col >= band_start);
        if let Some(hex) = rng.pick_n(&band, 1).first().copied() {
            if let Some(boss) = rng.choose(&bosses) {
                claims.claim(hex);
                placement
                    .encounters
                    .insert(hex, MapEncounter::Combat((*boss).clone()));
            }
        }
    }

    let elites = package.encounters_of(EncounterKind::Elite);
    if !elites.is_empty() {
        let span = max_col - min_col + 1;
        let mid = min_col + span / 2;
        #[allow(clippy::cast_possible_wrap)]
        let half = (config.elite_window / 2) as i32;
        let (lo, hi) = ((mid - half).max(min_col), (mid + half).min(max_col));
        let window = claims.free(|h| (lo..=hi).contains(&h.to_offset().col));
        let slots = config.elite_slots.min(window.len());
        let hexes = rng.pick_n(&window, slots);
        let order = rng.pick_n(&elites, elites.len());
        for (i, hex) in hexes.into_iter().enumerate() {
            let elite = order[i % order.len()];
            claims.claim(hex);
            placement
                .encounters
                .insert(hex, MapEncounter::Combat(elite.clone()));
        }
    }

    let basics = package.encounters_of(EncounterKind::Basic);
    if !basics.is_empty() {
        let hexes = rng.pick_n(&claims.free(|_| true), config.max_basics);
        for hex in hexes {
            if let Some(basic) = rng.choose(&basics) {
                claims.claim(hex);
                placement
                    .encounters
                    .insert(hex, MapEncounter::Combat((*basic).clone()));
            }
        }
    }

    let count = config.max_anomalies.min(package.anomalies.len());
    let hexes = rng.pick_n(&claims.free(|_| true), count);
    let order = rng.pick_n(&package.anomalies, count);
    for (hex, anomaly) in hexes.into_iter().zip(order) {
        claims.claim(hex);
        placement
            .encounters
            .insert(hex, MapEncounter::Anomaly(anomaly));
    }

    tracing::info!(
        seed = config.seed,
        encounters = placement.encounters.len(),
        rifts = placement.rift_entrances.len(),
        "Placement generated"
    );
    placement
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::testing::omija;

    fn place(seed: u64) -> (HexGrid, HexCoord, Placement) {
        let package = omija();
        let grid = HexGrid::rect(package.realm.cols, package.realm.rows);
        let start = grid.default_start();
        let placement =
            generate_placement(&grid, start, &package, &PlacementConfig::default().with_seed(seed));
        (grid, start, placement)
    }

    #[test]
    fn test_determinism() {
        let (_, _, a) = place(42);
        let (_, _, b) = place(42);
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds() {
        let (_, _, a) = place(1);
        let (_, _, b) = place(2);
        assert_ne!(a, b);
    }

    #[test]
    fn test_band_counts() {
        let (_, _, p) = place(7);
        assert_eq!(p.hexes_tagged(EncounterTag::Boss).len(), 1);
        assert_eq!(p.hexes_tagged(EncounterTag::Elite).len(), 3);
        assert_eq!(p.hexes_tagged(EncounterTag::Basic).len(), 18);
        assert_eq!(p.hexes_tagged(EncounterTag::Anomaly).len(), 3);
        assert_eq!(p.rift_entrances.len(), 1);
    }

    #[test]
    fn test_boss_in_rightmost_columns() {
        for seed in 0..20 {
            let (_, _, p) = place(seed);
            for hex in p.hexes_tagged(EncounterTag::Boss) {
                assert!(hex.to_offset().col >= 12, "seed {seed}: boss at {hex}");
            }
        }
    }

    #[test]
    fn test_elites_in_center_window_without_repeats() {
        for seed in 0..20 {
            let (_, _, p) = place(seed);
            let hexes = p.hexes_tagged(EncounterTag::Elite);
            let ids: BTreeSet<&str> = hexes
                .iter()
                .filter_map(|h| p.encounter_at(*h))
                .map(MapEncounter::id)
                .collect();
            assert_eq!(ids.len(), 3);
            for hex in hexes {
                assert!((5..=9).contains(&hex.to_offset().col), "seed {seed}: elite at {hex}");
            }
        }
    }

    #[test]
    fn test_start_and_rift_hexes_stay_free() {
        for seed in 0..20 {
            let (grid, start, p) = place(seed);
            assert!(p.encounter_at(start).is_none());
            for hex in p.rift_entrances.keys() {
                assert!(p.encounter_at(*hex).is_none());
                assert!(grid.contains(*hex));
                assert_ne!(*hex, start);
            }
        }
    }

    #[test]
    fn test_anomalies_distinct() {
        let (_, _, p) = place(3);
        let ids: BTreeSet<&str> = p
            .hexes_tagged(EncounterTag::Anomaly)
            .iter()
            .filter_map(|h| p.encounter_at(*h))
            .map(MapEncounter::id)
            .collect();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_small_elite_pool_reuses() {
        let mut package = omija();
        package
            .encounters
            .retain(|e| e.kind != EncounterKind::Elite || e.id == "master-of-the-crag");
        let grid = HexGrid::rect(14, 9);
        let p = generate_placement(&grid, grid.default_start(), &package, &PlacementConfig::default());
        let elites = p.hexes_tagged(EncounterTag::Elite);
        assert_eq!(elites.len(), 3);
        assert!(elites
            .iter()
            .all(|h| p.encounter_at(*h).map(MapEncounter::id) == Some("master-of-the-crag")));
    }

    #[test]
    fn test_tiny_grid_does_not_overfill() {
        let package = omija();
        let grid = HexGrid::rect(3, 2);
        let start = grid.default_start();
        let p = generate_placement(&grid, start, &package, &PlacementConfig::default());
        assert!(p.encounters.len() + p.rift_entrances.len() <= grid.len() - 1);
        assert!(p.encounter_at(start).is_none());
    }

    #[test]
    fn test_fixed_rift_entrance_respected() {
        let mut package = omija();
        let entrance = HexCoord::new(3, 2);
        package.rifts[0].entrance_hex = Some(entrance);
        let grid = HexGrid::rect(14, 9);
        let p = generate_placement(&grid, grid.default_start(), &package, &PlacementConfig::default());
        assert_eq!(p.entrance_of("moon-cats-vigil"), Some(entrance));
        assert!(p.encounter_at(entrance).is_none());
    }

    #[test]
    fn test_radial_grid_placement() {
        let package = omija();
        let grid = HexGrid::radial(4);
        let start = grid.default_start();
        let p = generate_placement(&grid, start, &package, &PlacementConfig::default().with_seed(7));

        assert!(p.encounters.keys().all(|hex| grid.contains(*hex)));
        assert!(p.encounter_at(start).is_none());
        assert!(p.entrance_of("moon-cats-vigil").is_some());

        let (_, max_col) = grid.column_span().unwrap();
        let bosses = p.hexes_tagged(EncounterTag::Boss);
        assert_eq!(bosses.len(), 1);
        assert!(bosses[0].to_offset().col >= max_col - 1);
    }
}
