//! Flat row types written by output backends.

use mac_core::{EstimateKey, MetricsReport};

/// One estimate-table entry of one component.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimateCsvRow {
    pub component: String,
    /// `"candidate"`, `"slot"` or `"cell_candidate"`.
    pub key_kind:  &'static str,
    /// Only set for `cell_candidate` keys.
    pub cell:      Option<u32>,
    /// Candidate id or slot index.
    pub key:       u32,
    pub value:     f64,
    pub visits:    u64,
}

/// Exploration / exploitation counters of one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterRow {
    pub component:    String,
    pub exploration:  u64,
    pub exploitation: u64,
}

impl From<&MetricsReport> for CounterRow {
    fn from(r: &MetricsReport) -> Self {
        Self {
            component:    r.component.clone(),
            exploration:  r.exploration,
            exploitation: r.exploitation,
        }
    }
}

/// Flatten the estimate rows of `report`.
pub fn estimate_rows(report: &MetricsReport) -> Vec<EstimateCsvRow> {
    report
        .estimates
        .iter()
        .map(|e| {
            let (cell, key) = match e.key {
                EstimateKey::Candidate(c)           => (None, c.0),
                EstimateKey::Slot(s)                => (None, s.0),
                EstimateKey::CellCandidate(cell, c) => (Some(cell.0), c.0),
            };
            EstimateCsvRow {
                component: report.component.clone(),
                key_kind:  e.key.kind(),
                cell,
                key,
                value:     e.value,
                visits:    e.visits,
            }
        })
        .collect()
}
