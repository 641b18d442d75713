//! Unit tests for mac-core primitives.

#[cfg(test)]
mod ids {
    use crate::{AgentId, CellId, EventId, SlotId};

    #[test]
    fn index_roundtrip() {
        let id = AgentId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(AgentId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn ordering() {
        assert!(AgentId(0) < AgentId(1));
        assert!((CellId(3), AgentId(9)) < (CellId(4), AgentId(0)));
    }

    #[test]
    fn display() {
        assert_eq!(AgentId(7).to_string(), "AgentId(7)");
        assert_eq!(EventId(12).to_string(), "EventId(12)");
        assert_eq!(SlotId::from(3).to_string(), "SlotId(3)");
    }
}

#[cfg(test)]
mod geo {
    use crate::{CellGrid, CellId, Position};

    fn grid() -> CellGrid {
        CellGrid::new(100.0, 1000.0).unwrap()
    }

    #[test]
    fn row_major_cells() {
        let g = grid();
        assert_eq!(g.cells_per_row(), 10);
        assert_eq!(g.cell_of(Position::new(0.0, 0.0)), CellId(0));
        assert_eq!(g.cell_of(Position::new(150.0, 250.0)), CellId(21));
        assert_eq!(g.cell_of(Position::new(999.9, 0.0)), CellId(9));
    }

    #[test]
    fn edges_clamp() {
        let g = grid();
        assert_eq!(g.cell_of(Position::new(1000.0, 0.0)), CellId(9));
        assert_eq!(g.cell_of(Position::new(-5.0, -5.0)), CellId(0));
    }

    #[test]
    fn far_rows_saturate() {
        let g = grid();
        assert_eq!(g.cell_of(Position::new(50.0, 1.0e30)), CellId(u32::MAX));
        assert_eq!(g.cell_of(Position::new(50.0, f32::INFINITY)), CellId(u32::MAX));
    }

    #[test]
    fn partial_last_column_counts() {
        let g = CellGrid::new(300.0, 1000.0).unwrap();
        assert_eq!(g.cells_per_row(), 4);
        assert_eq!(g.cell_of(Position::new(950.0, 310.0)), CellId(7));
    }

    #[test]
    fn rejects_degenerate_grid() {
        assert!(CellGrid::new(0.0, 1000.0).is_err());
        assert!(CellGrid::new(10.0, -1.0).is_err());
        assert!(CellGrid::new(f32::NAN, 1000.0).is_err());
    }

    #[test]
    fn distance() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-6);
    }
}

#[cfg(test)]
mod time {
    use crate::{Frame, SlotId, Step};

    #[test]
    fn step_arithmetic() {
        let s = Step(10);
        assert_eq!(s + 5, Step(15));
        assert_eq!(Step(15).since(Step(10)), 5);
        assert_eq!(Step(3).since(Step(10)), 0);
    }

    #[test]
    fn frame_slots_wrap() {
        let f = Frame::new(10).unwrap();
        assert_eq!(f.slot(Step(3)), SlotId(3));
        assert_eq!(f.slot(Step(23)), SlotId(3));
        assert_eq!(f.slot(Step(10)), SlotId(0));
    }

    #[test]
    fn frame_for_population_doubles() {
        assert_eq!(Frame::for_population(5).unwrap().length(), 10);
        assert!(Frame::for_population(0).is_err());
        assert!(Frame::new(0).is_err());
    }
}

#[cfg(test)]
mod rng {
    use crate::{AgentId, EngineRng};

    #[test]
    fn deterministic_same_seed() {
        let mut r1 = EngineRng::new(12345);
        let mut r2 = EngineRng::new(12345);
        for _ in 0..100 {
            let a: f64 = r1.random();
            let b: f64 = r2.random();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn different_agents_differ() {
        let mut r0 = EngineRng::for_agent(1, AgentId(0));
        let mut r1 = EngineRng::for_agent(1, AgentId(1));
        let a: u64 = r0.random();
        let b: u64 = r1.random();
        assert_ne!(a, b, "seeds for adjacent agents should diverge");
    }

    #[test]
    fn chance_extremes() {
        let mut rng = EngineRng::new(7);
        for _ in 0..1000 {
            assert!(!rng.chance(0.0));
            assert!(rng.chance(1.0));
        }
    }

    #[test]
    fn chance_consumes_one_draw() {
        let mut a = EngineRng::new(3);
        let mut b = EngineRng::new(3);
        a.chance(0.0);
        let _: f64 = b.random();
        assert_eq!(a.random::<u64>(), b.random::<u64>());
    }

    #[test]
    fn choose_empty_is_none() {
        let mut rng = EngineRng::new(0);
        let empty: [u32; 0] = [];
        assert!(rng.choose(&empty).is_none());
        assert_eq!(rng.choose(&[9]), Some(&9));
    }
}

#[cfg(test)]
mod estimate {
    use crate::{AgentId, CellId, EstimateTable};

    #[test]
    fn lazily_created() {
        let mut t: EstimateTable<AgentId> = EstimateTable::new();
        assert!(t.value(&AgentId(1)).is_none());
        t.ensure(AgentId(1), 9.0);
        assert_eq!(t.value(&AgentId(1)), Some(9.0));
        assert_eq!(t.get(&AgentId(1)).unwrap().visits, 0);
    }

    #[test]
    fn update_counts_visits_set_does_not() {
        let mut t: EstimateTable<AgentId> = EstimateTable::new();
        t.set_value(AgentId(0), 4.0);
        assert_eq!(t.get(&AgentId(0)).unwrap().visits, 0);
        let v = t.update(AgentId(0), 0.0, |q| q + 1.0);
        assert_eq!(v, 5.0);
        t.update(AgentId(0), 0.0, |q| q * 2.0);
        let e = t.get(&AgentId(0)).unwrap();
        assert_eq!(e.value, 10.0);
        assert_eq!(e.visits, 2);
    }

    #[test]
    fn range_over_one_cell() {
        let mut t: EstimateTable<(CellId, AgentId)> = EstimateTable::new();
        t.set_value((CellId(1), AgentId(5)), 1.0);
        t.set_value((CellId(2), AgentId(0)), 2.0);
        t.set_value((CellId(2), AgentId(3)), 3.0);
        t.set_value((CellId(3), AgentId(1)), 4.0);
        let in_two: Vec<AgentId> = t
            .range((CellId(2), AgentId(0))..=(CellId(2), AgentId(u32::MAX)))
            .map(|(&(_, a), _)| a)
            .collect();
        assert_eq!(in_two, vec![AgentId(0), AgentId(3)]);
    }
}

#[cfg(test)]
mod metrics {
    use crate::{EstimateKey, EstimateTable, MetricsReport, SlotId};

    #[test]
    fn report_collects_rows_in_key_order() {
        let mut t: EstimateTable<SlotId> = EstimateTable::new();
        t.update(SlotId(4), 0.0, |_| 1.0);
        t.update(SlotId(1), 0.0, |_| -1.0);
        let report = MetricsReport::new("aloha_q", 3, 7).with_table(&t, EstimateKey::Slot);
        assert_eq!(report.component, "aloha_q");
        assert_eq!(report.estimates.len(), 2);
        assert_eq!(report.estimates[0].key, EstimateKey::Slot(SlotId(1)));
        assert_eq!(report.estimates[1].value, 1.0);
        assert_eq!(report.estimates[1].key.kind(), "slot");
    }
}
