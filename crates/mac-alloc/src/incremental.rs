//! Incremental-average bandit with optimistic initial values.
//!
//! Every candidate starts at `initial_value`, well above any realistic
//! reward, so the greedy choice keeps cycling through untried candidates
//! until their estimates have been pulled down by real outcomes.
//!
//! ```text
//! reward = 1 + r   if attempted and r > 0
//!        = 1       if attempted and r = 0
//!        = r       otherwise
//! Q[c]  += (reward - Q[c]) / N[c]        N[c] = 1 + times c was granted
//! ```

use log::trace;

use mac_core::{
    check_probability, AgentId, EngineRng, EstimateKey, EstimateTable, MacError, MacResult,
    MetricsReport, ReportMetrics, Step,
};

use crate::greedy::{self, Pick};
use crate::{SlotAllocator, SlotOutcome};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IncrementalConfig {
    pub epsilon:       f64,
    /// Optimistic starting estimate for every candidate.
    pub initial_value: f64,
}

impl Default for IncrementalConfig {
    fn default() -> Self {
        Self { epsilon: 0.2, initial_value: 9.0 }
    }
}

impl IncrementalConfig {
    pub fn validate(&self) -> MacResult<()> {
        check_probability("epsilon", self.epsilon)?;
        if !self.initial_value.is_finite() {
            return Err(MacError::Config("initial_value must be finite".into()));
        }
        Ok(())
    }
}

/// Shaped reward for one grant outcome.
pub fn shaped_reward(outcome: &SlotOutcome) -> f64 {
    match (outcome.attempted, outcome.reward > 0.0) {
        (true, true)  => 1.0 + outcome.reward,
        (true, false) => 1.0,
        (false, _)    => outcome.reward,
    }
}

pub struct IncrementalAllocator {
    config:       IncrementalConfig,
    rng:          EngineRng,
    /// `visits` = times granted.
    values:       EstimateTable<AgentId>,
    pending:      Option<SlotOutcome>,
    exploration:  u64,
    exploitation: u64,
}

impl IncrementalAllocator {
    pub fn new(config: IncrementalConfig, rng: EngineRng) -> MacResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            rng,
            values:       EstimateTable::new(),
            pending:      None,
            exploration:  0,
            exploitation: 0,
        })
    }

    pub fn value(&self, candidate: AgentId) -> f64 {
        self.values.value(&candidate).unwrap_or(self.config.initial_value)
    }

    fn fold(&mut self, outcome: SlotOutcome) {
        let reward = shaped_reward(&outcome);
        let init = self.config.initial_value;
        let n = 1 + self.values.get(&outcome.candidate).map_or(0, |e| e.visits);
        self.values.modify(outcome.candidate, init, |q| q + (reward - q) / n as f64);
    }
}

impl SlotAllocator for IncrementalAllocator {
    fn allocate(&mut self, candidates: &[AgentId], step: Step) -> MacResult<AgentId> {
        if candidates.is_empty() {
            return Err(MacError::EmptyCandidates);
        }
        if let Some(outcome) = self.pending.take() {
            self.fold(outcome);
        }

        let pick = if step == Step::ZERO {
            Pick::Explore(greedy::uniform(&mut self.rng, candidates)?)
        } else {
            let values = &self.values;
            let init = self.config.initial_value;
            greedy::epsilon_greedy(&mut self.rng, candidates, self.config.epsilon, |c| {
                values.value(&c).unwrap_or(init)
            })?
        };

        match pick {
            Pick::Explore(_) => self.exploration += 1,
            Pick::Exploit(_) => self.exploitation += 1,
        }
        let chosen = pick.agent();
        self.values.visit(chosen, self.config.initial_value);
        trace!("{step}: incremental allocator {pick:?}");
        Ok(chosen)
    }

    fn report(&mut self, outcome: SlotOutcome) {
        self.pending = Some(outcome);
    }
}

impl ReportMetrics for IncrementalAllocator {
    fn report_metrics(&self) -> MetricsReport {
        MetricsReport::new("incremental", self.exploration, self.exploitation)
            .with_table(&self.values, EstimateKey::Candidate)
    }
}
