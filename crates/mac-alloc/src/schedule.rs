//! Round-robin probing followed by replay of a precomputed schedule.
//!
//! # Phases
//!
//! ```text
//! probing   steps [0, probe_steps):
//!             candidate k (sorted pool) is granted for probe_len consecutive
//!             steps; each step's outcome is one trial for that candidate
//!             (a failed one if the candidate was absent from the pool).
//! building  once, at the first step >= probe_steps:
//!             best set   = candidates whose success share is within
//!                          tolerance * top_share of the top share
//!             schedule i = for i in 0..probe_len-1, look at trial i of
//!                          every candidate:
//!                            ≥ 2 succeeded → uniform over (succeeded ∪ best)
//!                            1 succeeded   → that one; with prob ε a best one
//!                            0 succeeded   → uniform over best
//! replay    the schedule is cycled for the rest of the run.  No learning.
//! ```

use std::collections::BTreeMap;

use log::{debug, info, trace};

use mac_core::{
    check_probability, AgentId, EngineRng, Estimate, EstimateKey, EstimateRow, MacError,
    MacResult, MetricsReport, ReportMetrics, Step,
};

use crate::greedy;
use crate::{SlotAllocator, SlotOutcome};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScheduleConfig {
    pub total_steps:    u64,
    /// Chance of diverting a single-success schedule slot to the best set.
    pub epsilon:        f64,
    /// Share of `total_steps` spent probing.
    pub probe_fraction: f64,
    /// Width of the best-set band, relative to the top success share.
    pub tolerance:      f64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            total_steps:    1_000,
            epsilon:        0.2,
            probe_fraction: 0.1,
            tolerance:      0.35,
        }
    }
}

impl ScheduleConfig {
    pub fn validate(&self) -> MacResult<()> {
        check_probability("epsilon", self.epsilon)?;
        check_probability("probe_fraction", self.probe_fraction)?;
        if !(self.tolerance >= 0.0) {
            return Err(MacError::Config(format!(
                "tolerance must be non-negative, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }

    pub fn probe_steps(&self) -> u64 {
        (self.probe_fraction * self.total_steps as f64).floor() as u64
    }
}

/// Per-candidate probing record.
struct Probe {
    /// Sorted candidate pool captured at the first call.
    order:    Vec<AgentId>,
    /// Consecutive steps granted to each candidate.
    len:      u64,
    trials:   BTreeMap<AgentId, Vec<bool>>,
    /// Candidate granted on the previous step, if it was a probe.
    last:     Option<AgentId>,
}

struct Replay {
    schedule: Vec<AgentId>,
    best:     Vec<AgentId>,
    cursor:   usize,
}

impl Replay {
    /// Next scheduled candidate, cycling; `None` for an empty schedule.
    fn next(&mut self) -> Option<AgentId> {
        let c = *self.schedule.get(self.cursor % self.schedule.len().max(1))?;
        self.cursor += 1;
        Some(c)
    }
}

enum Phase {
    Probing(Probe),
    Replaying(Replay),
}

pub struct ScheduleAllocator {
    config:       ScheduleConfig,
    rng:          EngineRng,
    phase:        Option<Phase>,
    /// Success share per candidate, frozen when the schedule is built.
    shares:       BTreeMap<AgentId, Estimate>,
    pending:      Option<SlotOutcome>,
    exploration:  u64,
    exploitation: u64,
}

impl ScheduleAllocator {
    pub fn new(config: ScheduleConfig, rng: EngineRng) -> MacResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            rng,
            phase:        None,
            shares:       BTreeMap::new(),
            pending:      None,
            exploration:  0,
            exploitation: 0,
        })
    }

    /// The replayed schedule, once built.
    pub fn schedule(&self) -> Option<&[AgentId]> {
        match &self.phase {
            Some(Phase::Replaying(r)) => Some(&r.schedule),
            _ => None,
        }
    }

    /// The best set, once built.
    pub fn best(&self) -> Option<&[AgentId]> {
        match &self.phase {
            Some(Phase::Replaying(r)) => Some(&r.best),
            _ => None,
        }
    }

    fn start_probe(&self, candidates: &[AgentId]) -> Probe {
        let mut order = candidates.to_vec();
        order.sort_unstable();
        order.dedup();
        let len = self.config.probe_steps() / order.len() as u64;
        let trials = order.iter().map(|&c| (c, Vec::new())).collect();
        Probe { order, len, trials, last: None }
    }

    fn build(&mut self, probe: Probe) -> Replay {
        let counts: Vec<(AgentId, usize)> = probe
            .trials
            .iter()
            .map(|(&c, t)| (c, t.iter().filter(|&&ok| ok).count()))
            .collect();
        let total: usize = counts.iter().map(|&(_, n)| n).sum();

        let best = if total == 0 {
            probe.order.clone()
        } else {
            let share = |n: usize| n as f64 / total as f64;
            let top = counts.iter().map(|&(_, n)| share(n)).fold(0.0, f64::max);
            counts
                .iter()
                .filter(|&&(_, n)| (top - share(n)).abs() <= self.config.tolerance * top)
                .map(|&(c, _)| c)
                .collect()
        };

        for &(c, n) in &counts {
            let trials = probe.trials.get(&c).map_or(0, Vec::len) as u64;
            let share = if total == 0 { 0.0 } else { n as f64 / total as f64 };
            self.shares.insert(c, Estimate { value: share, visits: trials });
        }

        let slots = probe.len.saturating_sub(1) as usize;
        let mut schedule = Vec::with_capacity(slots);
        for i in 0..slots {
            let succeeded: Vec<AgentId> = probe
                .trials
                .iter()
                .filter(|(_, t)| t.get(i).copied().unwrap_or(false))
                .map(|(&c, _)| c)
                .collect();
            let pick = match succeeded.as_slice() {
                [] => self.rng.choose(&best).copied(),
                [only] => {
                    if self.rng.chance(self.config.epsilon) {
                        self.rng.choose(&best).copied()
                    } else {
                        Some(*only)
                    }
                }
                _ => {
                    let mut union = succeeded.clone();
                    union.extend(best.iter().copied());
                    union.sort_unstable();
                    union.dedup();
                    self.rng.choose(&union).copied()
                }
            };
            if let Some(c) = pick {
                schedule.push(c);
            }
        }

        info!(
            "schedule allocator built {} slots from {} successful probes; best set {:?}",
            schedule.len(),
            total,
            best
        );
        Replay { schedule, best, cursor: 0 }
    }
}

impl SlotAllocator for ScheduleAllocator {
    fn allocate(&mut self, candidates: &[AgentId], step: Step) -> MacResult<AgentId> {
        if candidates.is_empty() {
            return Err(MacError::EmptyCandidates);
        }
        let pending = self.pending.take();

        let phase = match self.phase.take() {
            Some(p) => p,
            None => Phase::Probing(self.start_probe(candidates)),
        };

        let mut phase = match phase {
            Phase::Probing(mut probe) => {
                if let (Some(o), Some(last)) = (pending, probe.last) {
                    if o.candidate == last {
                        if let Some(t) = probe.trials.get_mut(&last) {
                            t.push(o.attempted);
                        }
                    }
                }
                if step.0 < self.config.probe_steps() && probe.len > 0 {
                    Phase::Probing(probe)
                } else {
                    Phase::Replaying(self.build(probe))
                }
            }
            replay => replay,
        };

        let (chosen, replayed) = match &mut phase {
            Phase::Probing(probe) => {
                let idx = ((step.0 / probe.len) as usize).min(probe.order.len() - 1);
                let target = probe.order[idx];
                if candidates.contains(&target) {
                    probe.last = Some(target);
                    (target, false)
                } else {
                    debug!("{step}: probe target {target} absent from pool");
                    // Keep trial indices aligned with the other candidates.
                    if let Some(t) = probe.trials.get_mut(&target) {
                        t.push(false);
                    }
                    probe.last = None;
                    (greedy::uniform(&mut self.rng, candidates)?, false)
                }
            }
            Phase::Replaying(replay) => match replay.next() {
                Some(c) if candidates.contains(&c) => (c, true),
                _ => {
                    let available: Vec<AgentId> = replay
                        .best
                        .iter()
                        .copied()
                        .filter(|c| candidates.contains(c))
                        .collect();
                    let pool = if available.is_empty() { candidates } else { available.as_slice() };
                    (greedy::uniform(&mut self.rng, pool)?, false)
                }
            },
        };
        self.phase = Some(phase);

        if replayed {
            self.exploitation += 1;
        } else {
            self.exploration += 1;
        }
        trace!("{step}: schedule allocator granted {chosen} (replayed: {replayed})");
        Ok(chosen)
    }

    fn report(&mut self, outcome: SlotOutcome) {
        self.pending = Some(outcome);
    }
}

impl ReportMetrics for ScheduleAllocator {
    fn report_metrics(&self) -> MetricsReport {
        let mut report = MetricsReport::new("schedule", self.exploration, self.exploitation);
        report.estimates = self
            .shares
            .iter()
            .map(|(&c, e)| EstimateRow {
                key:    EstimateKey::Candidate(c),
                value:  e.value,
                visits: e.visits,
            })
            .collect();
        report
    }
}
