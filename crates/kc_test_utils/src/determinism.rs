//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the campaign engine produces
//! identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! A campaign must replay exactly from its seed and command log. Sources of
//! non-determinism include:
//!
//! - **Floating-point math**: layout math uses fixed-point via
//!   [`kc_core::math::Fixed`].
//!
//! - **HashMap iteration order**: per-hex state lives in ordered maps.
//!
//! - **System randomness**: placement and probability rolls both come from
//!   seeded streams; the roll stream is part of the game state.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: individual rules (activity, combat, rifts)
//! 2. **Property tests**: random command scripts still replay identically
//! 3. **Integration tests**: full sessions are reproducible and survive save/load

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use kc_core::campaign::Campaign;
use kc_core::persistence;
use kc_core::session::{Command, Session};
use kc_core::state::GameState;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps applied per run.
    pub steps: usize,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic engine).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the runs were deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Campaign is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a state machine multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `steps` - Number of steps per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state by one step
/// * `hash` - Function to compute the state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: usize,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S, usize),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for index in 0..steps {
            step(&mut state, index);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

fn session_hash(session: &Session) -> u64 {
    session.state().map_or(0, GameState::state_hash)
}

/// Replay a command script against fresh sessions and compare final hashes.
///
/// Rejected commands are part of the script; they must be rejected the same
/// way on every run.
///
/// # Example
///
/// ```ignore
/// use kc_test_utils::determinism::verify_script_determinism;
/// use kc_test_utils::fixtures::{new_session, winning_script};
///
/// let session = new_session(7, ArchetypeId::GateCrasher, MoveId::MomentumStrike);
/// let script = winning_script(session.campaign());
/// verify_script_determinism(3, || session.clone(), &script).assert_deterministic();
/// ```
pub fn verify_script_determinism<F>(runs: usize, setup: F, commands: &[Command]) -> DeterminismResult
where
    F: Fn() -> Session,
{
    verify_determinism(
        runs,
        commands.len(),
        setup,
        |session, index| {
            let _ = session.apply(commands[index].clone());
        },
        session_hash,
    )
}

/// Replay a script on two sessions side by side, finding the first command
/// after which their states differ.
///
/// # Returns
///
/// `None` if the runs never diverge, `Some(n)` if they diverge after `n`
/// commands (`0` means the initial states already differ).
pub fn find_first_divergence<F>(setup: F, commands: &[Command]) -> Option<usize>
where
    F: Fn() -> Session,
{
    let mut first = setup();
    let mut second = setup();

    if session_hash(&first) != session_hash(&second) {
        return Some(0);
    }

    for (index, command) in commands.iter().enumerate() {
        let a = first.apply(command.clone());
        let b = second.apply(command.clone());

        if a != b || session_hash(&first) != session_hash(&second) {
            return Some(index + 1);
        }
    }

    None
}

/// Verify that both codecs preserve a game exactly: the `bincode` snapshot
/// and the JSON save record.
pub fn verify_serialization_determinism(state: &GameState, campaign: &Campaign) -> bool {
    let hash_before = state.state_hash();

    let Ok(bytes) = state.to_bytes() else {
        return false;
    };
    let Ok(restored) = GameState::from_bytes(&bytes) else {
        return false;
    };
    if restored.state_hash() != hash_before {
        return false;
    }

    let Ok(json) = persistence::save(state) else {
        return false;
    };
    persistence::load(&json, campaign).is_some_and(|loaded| loaded.state_hash() == hash_before)
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for determinism testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing of the campaign engine.
pub mod strategies {
    use kc_core::character::{MoveId, StatKind};
    use kc_core::combat::EngageOptions;
    use kc_core::hex::{offset_to_axial, HexCoord};
    use kc_core::progression::LevelUpChoice;
    use kc_core::resources::{ActivityKind, Resources};
    use kc_core::session::Command;
    use proptest::prelude::*;

    /// Generate an activity kind.
    pub fn arb_activity() -> impl Strategy<Value = ActivityKind> {
        prop_oneof![
            Just(ActivityKind::Cardio),
            Just(ActivityKind::Strength),
            Just(ActivityKind::Flexibility),
            Just(ActivityKind::Wellness),
        ]
    }

    /// Generate a logged duration (0-240 minutes).
    pub fn arb_minutes() -> impl Strategy<Value = u32> {
        0u32..240u32
    }

    /// Generate a hex inside a `cols` x `rows` rectangle, plus a margin
    /// outside it so out-of-bounds paths are exercised.
    pub fn arb_hex(cols: i32, rows: i32) -> impl Strategy<Value = HexCoord> {
        (-1..=cols, -1..=rows).prop_map(|(col, row)| offset_to_axial(col, row))
    }

    /// Generate a resource wallet.
    pub fn arb_resources() -> impl Strategy<Value = Resources> {
        (0u32..20, 0u32..20, 0u32..20, 0u32..20)
            .prop_map(|(m, a, d, r)| Resources::new(m, a, d, r))
    }

    /// Generate a move id.
    pub fn arb_move() -> impl Strategy<Value = MoveId> {
        proptest::sample::select(MoveId::ALL.to_vec())
    }

    /// Generate a level-up choice.
    pub fn arb_level_up_choice() -> impl Strategy<Value = LevelUpChoice> {
        prop_oneof![
            arb_move().prop_map(LevelUpChoice::NewMove),
            arb_move().prop_map(LevelUpChoice::CrossClassMove),
            proptest::sample::select(StatKind::ALL.to_vec()).prop_map(LevelUpChoice::Stat),
        ]
    }

    /// Generate any command against a `cols` x `rows` realm.
    pub fn arb_command(cols: i32, rows: i32) -> impl Strategy<Value = Command> {
        prop_oneof![
            (arb_activity(), arb_minutes())
                .prop_map(|(activity, minutes)| Command::LogActivity { activity, minutes }),
            arb_hex(cols, rows).prop_map(|hex| Command::Move { hex }),
            (arb_hex(cols, rows), any::<bool>()).prop_map(|(hex, phase_strike)| Command::Engage {
                hex,
                options: EngageOptions { phase_strike },
            }),
            (arb_hex(cols, rows), 0usize..4).prop_map(|(hex, stage_index)| {
                Command::AttemptRiftStage {
                    hex,
                    rift_id: "moon-cats-vigil".to_string(),
                    stage_index,
                }
            }),
            arb_level_up_choice().prop_map(|choice| Command::CompleteLevelUp { choice }),
            arb_hex(cols, rows).prop_map(|hex| Command::Scout { hex }),
            arb_hex(cols, rows).prop_map(|hex| Command::Anchor { hex }),
            Just(Command::SynthesizeHeal),
            (0u32..4).prop_map(|hp| Command::Heal { hp }),
            Just(Command::Purchase {
                reward_id: "bath".to_string(),
            }),
        ]
    }

    /// Generate a sequence of commands.
    pub fn arb_command_sequence(
        cols: i32,
        rows: i32,
        max_len: usize,
    ) -> impl Strategy<Value = Vec<Command>> {
        proptest::collection::vec(arb_command(cols, rows), 0..max_len)
    }
}

#[cfg(test)]
mod tests {
    use super::strategies::*;
    use super::*;
    use crate::fixtures::{new_session, omija_campaign, winning_script, DEFAULT_SEED};
    use kc_core::character::{ArchetypeId, MoveId};
    use proptest::prelude::*;

    #[test]
    fn test_verify_determinism_simple() {
        let result = verify_determinism(3, 100, || 0u64, |n, _| *n += 1, |n| *n);

        assert!(result.is_deterministic);
        assert_eq!(result.hashes, vec![100, 100, 100]);
    }

    #[test]
    fn test_winning_script_is_deterministic() {
        let session = new_session(DEFAULT_SEED, ArchetypeId::GateCrasher, MoveId::MomentumStrike);
        let script = winning_script(session.campaign());
        verify_script_determinism(4, || session.clone(), &script).assert_deterministic();
        assert_eq!(find_first_divergence(|| session.clone(), &script), None);
    }

    #[test]
    fn test_serialization_after_script() {
        let mut session = new_session(DEFAULT_SEED, ArchetypeId::RiftWeaver, MoveId::AetherShield);
        let script = winning_script(session.campaign());
        crate::fixtures::run_script(&mut session, &script);
        let state = session.state().unwrap();
        assert!(verify_serialization_determinism(state, session.campaign()));
    }

    #[test]
    fn test_compute_hash_stable() {
        let layout = |seed| {
            let campaign = omija_campaign(seed);
            let hexes: Vec<_> = campaign.placement().encounters.keys().copied().collect();
            compute_hash(&hexes)
        };
        assert_eq!(layout(9), layout(9));
        assert_ne!(layout(9), layout(10));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_random_scripts_replay(
            seed in 0u64..1000,
            script in arb_command_sequence(14, 9, 40),
        ) {
            let session = new_session(seed, ArchetypeId::Wayfinder, MoveId::SlipstreamSurge);
            let result = verify_script_determinism(2, || session.clone(), &script);
            prop_assert!(result.is_deterministic);
        }

        #[test]
        fn prop_random_scripts_survive_save(
            seed in 0u64..1000,
            script in arb_command_sequence(14, 9, 40),
        ) {
            let mut session = new_session(seed, ArchetypeId::RiftWeaver, MoveId::NexusSynthesizer);
            crate::fixtures::run_script(&mut session, &script);
            let state = session.state().unwrap();
            prop_assert!(verify_serialization_determinism(state, session.campaign()));
        }
    }
}
