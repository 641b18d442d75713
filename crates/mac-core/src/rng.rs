//! Deterministic per-component RNG.
//!
//! # Determinism strategy
//!
//! Every decision component owns exactly one `EngineRng`.  All of its random
//! draws (warm-up picks, ε-rolls, tie-breaks, coin flips) come from that one
//! stream, so a run is reproducible given the same seed and the same sequence
//! of host calls.
//!
//! Per-agent components (one frame bandit or relay selector per agent) are
//! seeded with:
//!
//!   seed = global_seed XOR (agent_id * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive agent IDs uniformly across the seed space, so
//! neighbouring agents never share a stream.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::AgentId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Seeded pseudo-random source owned by one component instance.
///
/// Deliberately not `Clone`: two components must never replay the same
/// stream by accident.  Use [`child`](Self::child) to derive a new one.
pub struct EngineRng(SmallRng);

impl EngineRng {
    pub fn new(seed: u64) -> Self {
        EngineRng(SmallRng::seed_from_u64(seed))
    }

    /// Seed deterministically from the run's global seed and an agent ID.
    pub fn for_agent(global_seed: u64, agent: AgentId) -> Self {
        let seed = global_seed ^ (agent.0 as u64).wrapping_mul(MIXING_CONSTANT);
        EngineRng(SmallRng::seed_from_u64(seed))
    }

    /// Derive an independent child stream with a different seed offset.
    pub fn child(&mut self, offset: u64) -> EngineRng {
        let child_seed: u64 = self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        EngineRng(SmallRng::seed_from_u64(child_seed))
    }

    /// Sample a uniformly distributed value of any `Standard`-distributed type.
    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// ε-roll: draws one `f64` in [0, 1) and reports whether it fell below `p`.
    ///
    /// Always consumes exactly one draw, even for `p = 0` or `p = 1`, so the
    /// stream position depends only on the call sequence.
    #[inline]
    pub fn chance(&mut self, p: f64) -> bool {
        self.random::<f64>() < p
    }

    /// Unbiased coin flip.
    #[inline]
    pub fn coin(&mut self) -> bool {
        self.chance(0.5)
    }

    /// Choose a random element from a slice.
    /// Returns `None` if the slice is empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }
}
