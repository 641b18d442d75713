//! Relay assignments awaiting delivery feedback.
//!
//! # Layout
//!
//! ```text
//! event ─┬─ cell A ─ { X@S12, Y@S15 }
//!        └─ cell B ─ { X@S19 }
//! ```
//!
//! Each candidate carries the step at which it was first recorded in that
//! cell.  Removal cascades: removing the last candidate of a cell deletes the
//! cell; removing the last cell deletes the event.
//! Nothing else ever deletes an entry, so a resolved entry cannot be resolved
//! a second time.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use mac_core::{AgentId, CellId, EventId, Step};

/// Candidate → step of its first assignment in one (event, cell).
pub type CellAssignments = BTreeMap<AgentId, Step>;

#[derive(Default)]
pub struct PendingActions {
    // Looked up by event only, never iterated by the decision path.
    events: FxHashMap<EventId, BTreeMap<CellId, CellAssignments>>,
}

impl PendingActions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `candidate` as assigned to `event` in `cell` at step `at`.
    ///
    /// Returns `false` if the entry already existed; its stamp is kept.
    pub fn record(&mut self, event: EventId, cell: CellId, candidate: AgentId, at: Step) -> bool {
        let assignments = self.events.entry(event).or_default().entry(cell).or_default();
        if assignments.contains_key(&candidate) {
            return false;
        }
        assignments.insert(candidate, at);
        true
    }

    /// Candidates still pending for `event` in `cell`, with their stamps.
    pub fn assigned(&self, event: EventId, cell: CellId) -> Option<&CellAssignments> {
        self.events.get(&event)?.get(&cell)
    }

    /// Step at which `candidate` was first recorded for `event` in `cell`.
    pub fn first_seen(&self, event: EventId, cell: CellId, candidate: AgentId) -> Option<Step> {
        self.assigned(event, cell)?.get(&candidate).copied()
    }

    pub fn contains_event(&self, event: EventId) -> bool {
        self.events.contains_key(&event)
    }

    /// The cell a feedback for `candidate` on `event` belongs to.
    ///
    /// Among the cells where `candidate` is pending, the one where it was
    /// recorded earliest wins; equal stamps fall back to the lower cell id.
    /// `None` if `candidate` is not pending anywhere for `event`.
    pub fn resolve_cell(&self, event: EventId, candidate: AgentId) -> Option<CellId> {
        self.events
            .get(&event)?
            .iter()
            .filter_map(|(&cell, a)| a.get(&candidate).map(|&at| (cell, at)))
            .min_by_key(|&(_, at)| at)
            .map(|(cell, _)| cell)
    }

    /// Remove one entry, cascading empty parents.  Returns whether the
    /// entry existed.
    pub fn remove(&mut self, event: EventId, cell: CellId, candidate: AgentId) -> bool {
        let Some(cells) = self.events.get_mut(&event) else {
            return false;
        };
        let Some(assignments) = cells.get_mut(&cell) else {
            return false;
        };
        if assignments.remove(&candidate).is_none() {
            return false;
        }
        if assignments.is_empty() {
            cells.remove(&cell);
            if cells.is_empty() {
                self.events.remove(&event);
            }
        }
        true
    }

    /// Number of events with at least one pending assignment.
    pub fn events(&self) -> usize {
        self.events.len()
    }

    /// Total pending (event, cell, candidate) entries.
    pub fn len(&self) -> usize {
        self.events
            .values()
            .flat_map(|cells| cells.values())
            .map(BTreeMap::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
