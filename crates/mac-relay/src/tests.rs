//! Unit tests for mac-relay.

use mac_core::{AgentId, CellGrid, CellId, EngineRng, EventId, Position, ReportMetrics, Step};

use crate::{
    MaxRewardSelector, MinDelaySelector, PendingActions, RelayConfig, RelaySelector,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

const X: AgentId = AgentId(1);
const Y: AgentId = AgentId(2);
const Z: AgentId = AgentId(3);

fn config(epsilon: f64) -> RelayConfig {
    RelayConfig { epsilon, event_budget: 100.0, ..RelayConfig::default() }
}

/// Assign both X and Y to `event` in `cell` (forced exploration) and
/// report the given delays.
fn teach<S: RelaySelector>(s: &mut S, event: EventId, cell: CellId, dx: f64, dy: f64) {
    let a = s.select_relay(&[X, Y], event, cell).unwrap();
    let b = s.select_relay(&[X, Y], event, cell).unwrap();
    assert_ne!(a, b);
    s.feedback(X, event, dx, dx < 100.0);
    s.feedback(Y, event, dy, dy < 100.0);
}

// ── pending ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod pending {
    use super::*;

    #[test]
    fn cascade_delete_purges_event() {
        let mut p = PendingActions::new();
        assert!(p.record(EventId(1), CellId(7), X, Step(1)));
        assert!(p.record(EventId(1), CellId(7), Y, Step(2)));
        assert!(!p.record(EventId(1), CellId(7), Y, Step(3)));
        assert_eq!(p.len(), 2);
        assert_eq!(p.first_seen(EventId(1), CellId(7), Y), Some(Step(2)));

        assert!(p.remove(EventId(1), CellId(7), X));
        assert!(!p.remove(EventId(1), CellId(7), X), "removed twice");
        assert!(p.remove(EventId(1), CellId(7), Y));
        assert!(!p.contains_event(EventId(1)));
        assert!(p.is_empty());
        assert_eq!(p.first_seen(EventId(1), CellId(7), Y), None);
    }

    #[test]
    fn earliest_cell_wins() {
        let mut p = PendingActions::new();
        p.record(EventId(4), CellId(9), X, Step(5));
        p.record(EventId(4), CellId(2), Y, Step(6));
        p.record(EventId(4), CellId(2), X, Step(7));
        // Cell 2 has the lower id but X reached it later.
        assert_eq!(p.resolve_cell(EventId(4), X), Some(CellId(9)));
        assert_eq!(p.resolve_cell(EventId(4), Y), Some(CellId(2)));
        assert_eq!(p.resolve_cell(EventId(4), Z), None);
        assert_eq!(p.resolve_cell(EventId(5), X), None);
    }

    #[test]
    fn stamp_belongs_to_the_candidate_not_the_cell() {
        let mut p = PendingActions::new();
        // Y opens cell 2 first; X is recorded in cell 1 before cell 2.
        p.record(EventId(1), CellId(2), Y, Step(1));
        p.record(EventId(1), CellId(1), X, Step(2));
        p.record(EventId(1), CellId(2), X, Step(3));
        assert_eq!(p.first_seen(EventId(1), CellId(2), X), Some(Step(3)));
        assert_eq!(p.resolve_cell(EventId(1), X), Some(CellId(1)));
    }
}

// ── selector ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod selector {
    use super::*;

    #[test]
    fn event_in_one_cell_resolves_then_purges() {
        let mut s = MinDelaySelector::min_delay(config(0.02), EngineRng::new(3)).unwrap();
        let (e, cell) = (EventId(1), CellId(7));

        // Unknown cell: both calls explore, the second among the rest.
        let first = s.select_relay(&[X, Y], e, cell).unwrap();
        let second = s.select_relay(&[X, Y], e, cell).unwrap();
        assert_ne!(first, second);

        assert_eq!(s.feedback(first, e, 4.0, true), Some(cell));
        let left: Vec<AgentId> = s.pending().assigned(e, cell).unwrap().keys().copied().collect();
        assert_eq!(left, vec![second]);
        assert_eq!(s.value(cell, first), Some(4.0));

        assert_eq!(s.feedback(second, e, 9.0, true), Some(cell));
        assert!(!s.pending().contains_event(e));
    }

    #[test]
    fn duplicate_feedback_is_ignored() {
        let mut s = MinDelaySelector::min_delay(config(0.0), EngineRng::new(3)).unwrap();
        let relay = s.select_relay(&[X], EventId(1), CellId(0)).unwrap();
        assert_eq!(s.feedback(relay, EventId(1), 10.0, true), Some(CellId(0)));
        assert_eq!(s.feedback(relay, EventId(1), 2.0, true), None);
        assert_eq!(s.value(CellId(0), relay), Some(10.0));
        assert_eq!(s.feedback(Y, EventId(99), 1.0, true), None);
    }

    #[test]
    fn exhausted_neighbours_yield_no_action() {
        let mut s = MinDelaySelector::min_delay(config(0.02), EngineRng::new(5)).unwrap();
        assert!(s.select_relay(&[X, Y], EventId(1), CellId(0)).is_some());
        assert!(s.select_relay(&[X, Y], EventId(1), CellId(0)).is_some());
        assert_eq!(s.select_relay(&[X, Y], EventId(1), CellId(0)), None);
        assert_eq!(s.select_relay(&[], EventId(2), CellId(0)), None);
        assert_eq!(s.report_metrics().exploration, 4);
    }

    #[test]
    fn feedback_follows_first_cell_of_candidate() {
        let mut s = MinDelaySelector::min_delay(config(0.0), EngineRng::new(8)).unwrap();
        let e = EventId(3);
        assert_eq!(s.select_relay(&[X], e, CellId(1)), Some(X));
        assert_eq!(s.select_relay(&[X], e, CellId(2)), Some(X));

        assert_eq!(s.feedback(X, e, 5.0, true), Some(CellId(1)));
        assert_eq!(s.value(CellId(1), X), Some(5.0));
        assert_eq!(s.value(CellId(2), X), None);
        assert_eq!(s.feedback(X, e, 6.0, true), Some(CellId(2)));
        assert!(s.pending().is_empty());
    }

    #[test]
    fn non_learning_agent_is_purged_without_learning() {
        let cfg = RelayConfig { non_learning: Some(Z), ..config(0.0) };
        let mut s = MinDelaySelector::min_delay(cfg, EngineRng::new(1)).unwrap();
        for i in 0..100 {
            assert_eq!(s.select_relay(&[Z], EventId(i), CellId(0)), Some(Z));
        }
        assert_eq!(s.pending().events(), 100);
        for i in 0..100 {
            assert_eq!(s.feedback(Z, EventId(i), 1.0, true), None);
        }
        assert_eq!(s.value(CellId(0), Z), None);
        assert!(s.pending().is_empty());
    }

    #[test]
    fn feedback_follows_candidate_not_cell_opener() {
        let mut s = MinDelaySelector::min_delay(config(0.0), EngineRng::new(8)).unwrap();
        let e = EventId(5);
        assert_eq!(s.select_relay(&[Y], e, CellId(2)), Some(Y));
        assert_eq!(s.select_relay(&[X], e, CellId(1)), Some(X));
        assert_eq!(s.select_relay(&[X], e, CellId(2)), Some(X));

        assert_eq!(s.feedback(X, e, 7.0, true), Some(CellId(1)));
        assert_eq!(s.value(CellId(1), X), Some(7.0));
        assert!(s.pending().assigned(e, CellId(2)).unwrap().contains_key(&X));
    }

    #[test]
    fn min_delay_exploits_fastest_neighbour() {
        let mut s = MinDelaySelector::min_delay(config(1.0), EngineRng::new(2)).unwrap();
        teach(&mut s, EventId(1), CellId(4), 30.0, 12.0);

        // A fresh event in a known cell exploits regardless of the roll.
        assert_eq!(s.select_relay(&[X, Y], EventId(2), CellId(4)), Some(Y));
        // Ranking skips candidates that are not neighbours right now.
        assert_eq!(s.select_relay(&[X, Z], EventId(3), CellId(4)), Some(X));
        assert_eq!(s.select_relay(&[Z], EventId(4), CellId(4)), None);
    }

    #[test]
    fn failed_candidate_is_never_exploited() {
        let mut s = MinDelaySelector::min_delay(config(1.0), EngineRng::new(2)).unwrap();
        teach(&mut s, EventId(1), CellId(4), 30.0, 100.0);
        assert_eq!(s.value(CellId(4), Y), Some(100.0));
        assert_eq!(s.select_relay(&[Y], EventId(2), CellId(4)), None);
        assert_eq!(s.select_relay(&[X, Y], EventId(3), CellId(4)), Some(X));
    }

    #[test]
    fn max_reward_prefers_largest_remaining_budget() {
        let mut s = MaxRewardSelector::max_reward(config(1.0), EngineRng::new(6)).unwrap();
        teach(&mut s, EventId(1), CellId(0), 10.0, 3.0);
        assert_eq!(s.value(CellId(0), X), Some(45.0));
        assert_eq!(s.value(CellId(0), Y), Some(48.5));
        assert_eq!(s.select_relay(&[X, Y], EventId(2), CellId(0)), Some(Y));
    }

    #[test]
    fn max_reward_failure_stays_at_zero() {
        let mut s = MaxRewardSelector::max_reward(config(1.0), EngineRng::new(6)).unwrap();
        teach(&mut s, EventId(1), CellId(0), 100.0, 50.0);
        assert_eq!(s.value(CellId(0), X), Some(0.0));
        assert_eq!(s.select_relay(&[X], EventId(2), CellId(0)), None);
    }

    #[test]
    fn position_maps_to_grid_cell() {
        let cfg = RelayConfig { grid: CellGrid { cell_size: 100.0, width: 500.0 }, ..config(0.0) };
        let mut s = MinDelaySelector::min_delay(cfg, EngineRng::new(1)).unwrap();
        let relay = s.select_relay_at(&[X], EventId(1), Position::new(250.0, 120.0));
        assert_eq!(relay, Some(X));
        assert!(s.pending().assigned(EventId(1), CellId(7)).is_some());
    }

    #[test]
    fn invalid_config_rejected() {
        assert!(MinDelaySelector::min_delay(config(1.5), EngineRng::new(0)).is_err());
        let cfg = RelayConfig { alpha: 0.0, ..config(0.1) };
        assert!(MaxRewardSelector::max_reward(cfg, EngineRng::new(0)).is_err());
    }
}

// ── determinism ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod determinism {
    use super::*;

    fn run(seed: u64) -> Vec<Option<AgentId>> {
        let mut s = MinDelaySelector::min_delay(config(0.3), EngineRng::new(seed)).unwrap();
        let neighbours = [X, Y, Z];
        let mut out = Vec::new();
        for i in 0..200u64 {
            let e = EventId(i / 3);
            let cell = CellId((i % 5) as u32);
            let pick = s.select_relay(&neighbours, e, cell);
            if let Some(c) = pick {
                if i % 2 == 0 {
                    s.feedback(c, e, (i % 17) as f64, i % 7 != 0);
                }
            }
            out.push(pick);
        }
        out
    }

    #[test]
    fn same_seed_same_choices() {
        assert_eq!(run(12), run(12));
    }

    #[test]
    fn metrics_count_every_decision() {
        let mut s = MinDelaySelector::min_delay(config(0.3), EngineRng::new(1)).unwrap();
        for i in 0..40 {
            s.select_relay(&[X, Y], EventId(i), CellId(0));
        }
        let m = s.report_metrics();
        assert_eq!(m.component, "min_delay");
        assert_eq!(m.exploration + m.exploitation, 40);
        assert_eq!(s.clock(), Step(40));
    }
}
