//! Deterministic random sources.
//!
//! [`SeededRng`] is a 31-bit linear congruential generator. Placement uses it
//! once per session; each game state also carries its own stream for the
//! probability rolls made by move effects and stat boosts, so a session is
//! reproducible from its seed and command history.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

const MULTIPLIER: u64 = 1_103_515_245;
const INCREMENT: u64 = 12_345;
const MODULUS_MASK: u64 = 0x7fff_ffff;

/// Source of percentile rolls for probability effects.
pub trait Roller {
    /// Uniform roll in `0..100`.
    fn roll_percent(&mut self) -> u32;

    /// Succeeds with `percent`% probability.
    ///
    /// Non-positive chances never succeed and draw nothing.
    fn chance(&mut self, percent: i32) -> bool {
        if percent <= 0 {
            return false;
        }
        i64::from(self.roll_percent()) < i64::from(percent)
    }
}

/// Seeded linear congruential generator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SeededRng {
    state: u64,
}

impl SeededRng {
    /// Create a generator from any 64-bit seed.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            state: (seed ^ (seed >> 31)) & MODULUS_MASK,
        }
    }

    /// Next raw 31-bit value.
    pub fn next_u31(&mut self) -> u32 {
        self.state = (self.state * MULTIPLIER + INCREMENT) & MODULUS_MASK;
        // Masked to 31 bits above.
        #[allow(clippy::cast_possible_truncation)]
        let value = self.state as u32;
        value
    }

    /// Uniform index in `0..bound`. Returns 0 for an empty range.
    pub fn next_below(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        let scaled = (u64::from(self.next_u31()) * bound as u64) >> 31;
        #[allow(clippy::cast_possible_truncation)]
        let index = scaled as usize;
        index
    }

    /// Fisher-Yates shuffle in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_below(i + 1);
            items.swap(i, j);
        }
    }

    /// First `n` items of a shuffled copy.
    pub fn pick_n<T: Clone>(&mut self, items: &[T], n: usize) -> Vec<T> {
        let mut pool = items.to_vec();
        self.shuffle(&mut pool);
        pool.truncate(n);
        pool
    }

    /// One uniformly chosen item.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        items.get(self.next_below(items.len()))
    }
}

impl Roller for SeededRng {
    fn roll_percent(&mut self) -> u32 {
        #[allow(clippy::cast_possible_truncation)]
        let roll = self.next_below(100) as u32;
        roll
    }
}

/// Replays a fixed list of rolls, then repeats `fallback`.
///
/// Useful for previews ("what if every roll succeeds") and tests.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRoller {
    rolls: VecDeque<u32>,
    fallback: u32,
    drawn: usize,
}

impl ScriptedRoller {
    /// Replay `rolls`, then return `fallback` forever.
    #[must_use]
    pub fn new(rolls: impl IntoIterator<Item = u32>, fallback: u32) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
            fallback,
            drawn: 0,
        }
    }

    /// Every roll succeeds (always 0).
    #[must_use]
    pub fn always_hit() -> Self {
        Self::new([], 0)
    }

    /// Every roll fails (always 99).
    #[must_use]
    pub fn always_miss() -> Self {
        Self::new([], 99)
    }

    /// Number of rolls drawn so far.
    #[must_use]
    pub const fn drawn(&self) -> usize {
        self.drawn
    }
}

impl Roller for ScriptedRoller {
    fn roll_percent(&mut self) -> u32 {
        self.drawn += 1;
        self.rolls.pop_front().unwrap_or(self.fallback).min(99)
    }
}
