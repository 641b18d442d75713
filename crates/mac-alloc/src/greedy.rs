//! Epsilon-greedy selection with uniform tie-breaking.

use mac_core::{AgentId, EngineRng, MacError, MacResult};

/// How a candidate was picked.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Pick {
    Explore(AgentId),
    Exploit(AgentId),
}

impl Pick {
    #[inline]
    pub fn agent(self) -> AgentId {
        match self {
            Pick::Explore(a) | Pick::Exploit(a) => a,
        }
    }
}

/// Uniform random pick.
pub fn uniform(rng: &mut EngineRng, candidates: &[AgentId]) -> MacResult<AgentId> {
    rng.choose(candidates).copied().ok_or(MacError::EmptyCandidates)
}

/// Every candidate whose value equals the maximum, in input order.
pub fn maxima(candidates: &[AgentId], value: impl Fn(AgentId) -> f64) -> Vec<AgentId> {
    let mut best = f64::NEG_INFINITY;
    let mut tied = Vec::new();
    for &c in candidates {
        let v = value(c);
        if v > best {
            best = v;
            tied.clear();
            tied.push(c);
        } else if v == best {
            tied.push(c);
        }
    }
    tied
}

/// With probability `epsilon` pick uniformly among all candidates, otherwise
/// uniformly among the candidates tied for the maximum value.
///
/// The ε-roll is drawn first and always, so the RNG stream advances the same
/// way regardless of the outcome.
pub fn epsilon_greedy(
    rng:        &mut EngineRng,
    candidates: &[AgentId],
    epsilon:    f64,
    value:      impl Fn(AgentId) -> f64,
) -> MacResult<Pick> {
    if candidates.is_empty() {
        return Err(MacError::EmptyCandidates);
    }
    if rng.chance(epsilon) {
        return uniform(rng, candidates).map(Pick::Explore);
    }
    let tied = maxima(candidates, value);
    // NaN values never compare as maxima; fall back to the whole pool.
    let pool = if tied.is_empty() { candidates } else { tied.as_slice() };
    uniform(rng, pool).map(Pick::Exploit)
}
