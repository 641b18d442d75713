//! Warm-up frequency counting followed by reward-conditioned increments.
//!
//! ```text
//! step < warmup_end:   pick uniformly; successes[c] += reward of each outcome
//! step == warmup_end:  Q[c] = seed_scale * successes[c] / (Σ successes + 1) + 1
//! afterwards:          fold each outcome into Q[c], then ε-greedy over Q
//! ```
//!
//! | attempted | reward | update          |
//! |-----------|--------|-----------------|
//! | yes       | > 0    | Q += 1 + reward |
//! | yes       | 0      | unchanged       |
//! | no        | > 0    | Q += reward     |
//! | no        | 0      | Q /= 2          |

use log::{debug, trace};

use mac_core::{
    check_probability, AgentId, EngineRng, EstimateKey, EstimateTable, MacError, MacResult,
    MetricsReport, ReportMetrics, Step,
};

use crate::greedy::{self, Pick};
use crate::{SlotAllocator, SlotOutcome};

/// Value of a candidate that never succeeded during warm-up.
const UNSEEN_SEED: f64 = 1.0;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FrequencyConfig {
    /// Length of the run in steps; the warm-up is a fraction of it.
    pub total_steps:     u64,
    pub epsilon:         f64,
    /// Share of `total_steps` spent picking uniformly at random.
    pub warmup_fraction: f64,
    /// Multiplier turning a warm-up success share into a seed value.
    pub seed_scale:      f64,
}

impl Default for FrequencyConfig {
    fn default() -> Self {
        Self {
            total_steps:     1_000,
            epsilon:         0.05,
            warmup_fraction: 0.17,
            seed_scale:      100.0,
        }
    }
}

impl FrequencyConfig {
    pub fn validate(&self) -> MacResult<()> {
        check_probability("epsilon", self.epsilon)?;
        check_probability("warmup_fraction", self.warmup_fraction)?;
        if !self.seed_scale.is_finite() {
            return Err(MacError::Config("seed_scale must be finite".into()));
        }
        Ok(())
    }

    /// First step of the decision phase.
    pub fn warmup_end(&self) -> Step {
        Step((self.warmup_fraction * self.total_steps as f64).ceil() as u64)
    }
}

pub struct FrequencyAllocator {
    config:       FrequencyConfig,
    rng:          EngineRng,
    /// Summed warm-up reward per candidate; `visits` = outcomes counted.
    successes:    EstimateTable<AgentId>,
    /// Decision-phase values; `visits` = times the candidate was granted.
    values:       EstimateTable<AgentId>,
    seeded:       bool,
    pending:      Option<SlotOutcome>,
    exploration:  u64,
    exploitation: u64,
}

impl FrequencyAllocator {
    pub fn new(config: FrequencyConfig, rng: EngineRng) -> MacResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            rng,
            successes:    EstimateTable::new(),
            values:       EstimateTable::new(),
            seeded:       false,
            pending:      None,
            exploration:  0,
            exploitation: 0,
        })
    }

    /// Current decision-phase value of `candidate`; `None` during warm-up.
    pub fn value(&self, candidate: AgentId) -> Option<f64> {
        self.seeded
            .then(|| self.values.value(&candidate).unwrap_or(UNSEEN_SEED))
    }

    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    fn fold(&mut self, outcome: SlotOutcome) {
        if !self.seeded {
            self.successes.update(outcome.candidate, 0.0, |s| s + outcome.reward);
            return;
        }
        let SlotOutcome { candidate, attempted, reward } = outcome;
        self.values.modify(candidate, UNSEEN_SEED, |q| match (attempted, reward > 0.0) {
            (true, true)   => q + 1.0 + reward,
            (true, false)  => q,
            (false, true)  => q + reward,
            (false, false) => q / 2.0,
        });
    }

    /// Turn warm-up success shares into initial values.
    fn seed(&mut self) {
        let total: f64 = self.successes.iter().map(|(_, e)| e.value).sum();
        let scale = self.config.seed_scale;
        let seeds: Vec<(AgentId, f64)> = self
            .successes
            .iter()
            .map(|(&c, e)| (c, scale * e.value / (total + 1.0) + UNSEEN_SEED))
            .collect();
        for (c, q) in seeds {
            self.values.set_value(c, q);
        }
        self.seeded = true;
        debug!("frequency allocator seeded {} candidates from warm-up", self.values.len());
    }
}

impl SlotAllocator for FrequencyAllocator {
    fn allocate(&mut self, candidates: &[AgentId], step: Step) -> MacResult<AgentId> {
        if candidates.is_empty() {
            return Err(MacError::EmptyCandidates);
        }
        if let Some(outcome) = self.pending.take() {
            self.fold(outcome);
        }

        let pick = if step < self.config.warmup_end() {
            Pick::Explore(greedy::uniform(&mut self.rng, candidates)?)
        } else {
            if !self.seeded {
                self.seed();
            }
            let values = &self.values;
            greedy::epsilon_greedy(&mut self.rng, candidates, self.config.epsilon, |c| {
                values.value(&c).unwrap_or(UNSEEN_SEED)
            })?
        };

        match pick {
            Pick::Explore(_) => self.exploration += 1,
            Pick::Exploit(_) => self.exploitation += 1,
        }
        let chosen = pick.agent();
        self.values.visit(chosen, UNSEEN_SEED);
        trace!("{step}: frequency allocator {pick:?}");
        Ok(chosen)
    }

    fn report(&mut self, outcome: SlotOutcome) {
        self.pending = Some(outcome);
    }
}

impl ReportMetrics for FrequencyAllocator {
    fn report_metrics(&self) -> MetricsReport {
        let table = if self.seeded { &self.values } else { &self.successes };
        MetricsReport::new("frequency", self.exploration, self.exploitation)
            .with_table(table, EstimateKey::Candidate)
    }
}
