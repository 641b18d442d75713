//! End-of-run diagnostic dump shared by all components.
//!
//! A [`MetricsReport`] is a side-effect-free read of a component's internal
//! tables and exploration/exploitation counters.  It plays no part in any
//! decision; `mac-output` serialises it for offline inspection.

use crate::{AgentId, CellId, EstimateTable, SlotId};

/// What an [`EstimateRow`] is keyed by.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EstimateKey {
    Candidate(AgentId),
    Slot(SlotId),
    CellCandidate(CellId, AgentId),
}

impl EstimateKey {
    /// Short label used as the `key_kind` column by output writers.
    pub fn kind(self) -> &'static str {
        match self {
            EstimateKey::Candidate(_)        => "candidate",
            EstimateKey::Slot(_)             => "slot",
            EstimateKey::CellCandidate(_, _) => "cell_candidate",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EstimateRow {
    pub key:    EstimateKey,
    pub value:  f64,
    pub visits: u64,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricsReport {
    /// Name of the reporting component variant, e.g. `"aloha_q"`.
    pub component:    String,
    pub exploration:  u64,
    pub exploitation: u64,
    pub estimates:    Vec<EstimateRow>,
}

impl MetricsReport {
    pub fn new(component: impl Into<String>, exploration: u64, exploitation: u64) -> Self {
        Self {
            component: component.into(),
            exploration,
            exploitation,
            estimates: Vec::new(),
        }
    }

    /// Append every entry of `table`, mapping keys with `key`.
    pub fn with_table<K: Ord + Copy>(
        mut self,
        table: &EstimateTable<K>,
        key: impl Fn(K) -> EstimateKey,
    ) -> Self {
        self.estimates.extend(table.iter().map(|(k, e)| EstimateRow {
            key:    key(*k),
            value:  e.value,
            visits: e.visits,
        }));
        self
    }
}

/// Components that can dump their learning state.
pub trait ReportMetrics {
    fn report_metrics(&self) -> MetricsReport;
}
