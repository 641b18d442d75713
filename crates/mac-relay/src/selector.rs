//! The per-agent relay selector.
//!
//! # Decision
//!
//! ```text
//! clock += 1
//! roll ε                                   (always drawn)
//! explore if  cell has no estimates
//!         or  (event already assigned in this cell  and  roll hit)
//!
//! explore:  uniform over neighbours not yet assigned to (event, cell);
//!           none left → no action
//! exploit:  walk the cell's estimates best-first; take the first candidate
//!           that is a current neighbour and not a permanent failure;
//!           none → no action
//! ```
//!
//! Every returned candidate is recorded in [`PendingActions`] before the call
//! returns.  Feedback resolves the entry exactly once.

use log::{debug, trace};

use mac_core::{
    check_probability, AgentId, CellGrid, CellId, EngineRng, EstimateKey, EstimateTable,
    EventId, MacError, MacResult, MetricsReport, Position, ReportMetrics, Step,
};

use crate::objective::{MaxReward, MinDelay, RelayObjective};
use crate::pending::PendingActions;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RelayConfig {
    pub epsilon:      f64,
    /// Learning rate of the max-reward objective.
    pub alpha:        f64,
    /// Time budget of one event; a failed delivery counts as this delay.
    pub event_budget: f64,
    pub grid:         CellGrid,
    /// Agent whose feedback is never learned from (e.g. the collecting depot).
    pub non_learning: Option<AgentId>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            epsilon:      0.02,
            alpha:        0.5,
            event_budget: 2_000.0,
            grid:         CellGrid { cell_size: 300.0, width: 1_500.0 },
            non_learning: None,
        }
    }
}

impl RelayConfig {
    pub fn validate(&self) -> MacResult<()> {
        check_probability("epsilon", self.epsilon)?;
        if !(self.event_budget.is_finite() && self.event_budget > 0.0) {
            return Err(MacError::Config(format!(
                "event_budget must be positive and finite, got {}",
                self.event_budget
            )));
        }
        self.grid.validate()
    }
}

/// Relay choice for one forwarding agent.
pub trait RelaySelector: ReportMetrics {
    /// The tessellation used to turn positions into cells.
    fn grid(&self) -> &CellGrid;

    /// Pick a relay among `neighbors` for `event`, decided inside `cell`.
    /// `None` means no action is available in this cell for this event.
    fn select_relay(&mut self, neighbors: &[AgentId], event: EventId, cell: CellId)
        -> Option<AgentId>;

    /// Like [`select_relay`](Self::select_relay), deriving the cell from the
    /// deciding agent's position.
    fn select_relay_at(
        &mut self,
        neighbors: &[AgentId],
        event:     EventId,
        position:  Position,
    ) -> Option<AgentId> {
        let cell = self.grid().cell_of(position);
        self.select_relay(neighbors, event, cell)
    }

    /// Delivery outcome for `candidate` carrying `event`.
    ///
    /// Returns the cell the feedback was attributed to, or `None` when it
    /// was ignored (unknown event, already resolved).  Feedback about the
    /// non-learning agent clears its pending entry but returns `None`.
    fn feedback(&mut self, candidate: AgentId, event: EventId, delay: f64, outcome: bool)
        -> Option<CellId>;
}

pub struct CellRelaySelector<O> {
    config:       RelayConfig,
    objective:    O,
    rng:          EngineRng,
    values:       EstimateTable<(CellId, AgentId)>,
    pending:      PendingActions,
    clock:        Step,
    exploration:  u64,
    exploitation: u64,
}

pub type MinDelaySelector = CellRelaySelector<MinDelay>;
pub type MaxRewardSelector = CellRelaySelector<MaxReward>;

impl CellRelaySelector<MinDelay> {
    pub fn min_delay(config: RelayConfig, rng: EngineRng) -> MacResult<Self> {
        Self::with_objective(config, MinDelay, rng)
    }
}

impl CellRelaySelector<MaxReward> {
    pub fn max_reward(config: RelayConfig, rng: EngineRng) -> MacResult<Self> {
        let objective = MaxReward::new(config.alpha)?;
        Self::with_objective(config, objective, rng)
    }
}

impl<O: RelayObjective> CellRelaySelector<O> {
    pub fn with_objective(config: RelayConfig, objective: O, rng: EngineRng) -> MacResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            objective,
            rng,
            values:       EstimateTable::new(),
            pending:      PendingActions::new(),
            clock:        Step::ZERO,
            exploration:  0,
            exploitation: 0,
        })
    }

    pub fn value(&self, cell: CellId, candidate: AgentId) -> Option<f64> {
        self.values.value(&(cell, candidate))
    }

    pub fn pending(&self) -> &PendingActions {
        &self.pending
    }

    /// Number of decisions taken so far.
    pub fn clock(&self) -> Step {
        self.clock
    }

    fn cell_is_known(&self, cell: CellId) -> bool {
        self.values
            .range((cell, AgentId(0))..=(cell, AgentId(u32::MAX)))
            .next()
            .is_some()
    }

    fn explore(&mut self, neighbors: &[AgentId], event: EventId, cell: CellId) -> Option<AgentId> {
        let assigned = self.pending.assigned(event, cell);
        let mut pool: Vec<AgentId> = neighbors
            .iter()
            .copied()
            .filter(|c| assigned.is_none_or(|a| !a.contains_key(c)))
            .collect();
        pool.sort_unstable();
        pool.dedup();
        let pick = self.rng.choose(&pool).copied();
        if pick.is_none() {
            debug!("{event} in {cell}: every neighbour already assigned");
        }
        pick
    }

    fn exploit(&self, neighbors: &[AgentId], cell: CellId) -> Option<AgentId> {
        let budget = self.config.event_budget;
        let mut ranked: Vec<(AgentId, f64)> = self
            .values
            .range((cell, AgentId(0))..=(cell, AgentId(u32::MAX)))
            .map(|(&(_, c), e)| (c, e.value))
            .collect();
        // Stable: equal values keep agent-id order.
        ranked.sort_by(|a, b| self.objective.rank(a.1, b.1));
        ranked
            .into_iter()
            .find(|&(c, v)| neighbors.contains(&c) && !self.objective.is_failure(v, budget))
            .map(|(c, _)| c)
    }
}

impl<O: RelayObjective> RelaySelector for CellRelaySelector<O> {
    fn grid(&self) -> &CellGrid {
        &self.config.grid
    }

    fn select_relay(
        &mut self,
        neighbors: &[AgentId],
        event:     EventId,
        cell:      CellId,
    ) -> Option<AgentId> {
        self.clock = self.clock + 1;
        let roll = self.rng.chance(self.config.epsilon);
        let partial = self.pending.assigned(event, cell).is_some();

        let choice = if !self.cell_is_known(cell) || (partial && roll) {
            self.exploration += 1;
            self.explore(neighbors, event, cell)
        } else {
            self.exploitation += 1;
            self.exploit(neighbors, cell)
        };

        if let Some(relay) = choice {
            self.pending.record(event, cell, relay, self.clock);
        }
        trace!("{}: {} {event} in {cell} -> {choice:?}", self.clock, O::NAME);
        choice
    }

    fn feedback(
        &mut self,
        candidate: AgentId,
        event:     EventId,
        delay:     f64,
        outcome:   bool,
    ) -> Option<CellId> {
        let Some(cell) = self.pending.resolve_cell(event, candidate) else {
            debug!("ignoring feedback for {candidate} on {event}: nothing pending");
            return None;
        };
        if self.config.non_learning == Some(candidate) {
            debug!("purging {candidate} on {event} in {cell} without learning");
            self.pending.remove(event, cell, candidate);
            return None;
        }

        let budget = self.config.event_budget;
        let delay = if outcome { delay } else { budget };
        let objective = &self.objective;
        self.values.update((cell, candidate), objective.untried(), |v| {
            objective.fold(v, delay, budget)
        });
        self.pending.remove(event, cell, candidate);
        Some(cell)
    }
}

impl<O: RelayObjective> ReportMetrics for CellRelaySelector<O> {
    fn report_metrics(&self) -> MetricsReport {
        MetricsReport::new(O::NAME, self.exploration, self.exploitation)
            .with_table(&self.values, |(cell, c)| EstimateKey::CellCandidate(cell, c))
    }
}
