//! Per-slot update rules.
//!
//! A rule owns the per-slot table and answers two questions: "does the
//! table say transmit in this slot?" and "how does an outcome change it?".
//! Exploration, slot arithmetic and pending bookkeeping live in
//! [`FrameSlotBandit`](crate::FrameSlotBandit) and are shared by all rules.

use std::collections::BTreeMap;

use mac_core::{
    EngineRng, EstimateKey, EstimateRow, EstimateTable, MacError, MacResult, SlotId,
};

/// Pluggable per-slot learning rule.
pub trait UpdateRule {
    /// Short name used in metrics dumps.
    const NAME: &'static str;

    /// Called for the current slot on every decision, before
    /// [`wants_transmit`](Self::wants_transmit).  Rules with lazily
    /// initialised tables create the entry here.
    fn visit(&mut self, _slot: SlotId) {}

    /// The exploitation decision for `slot`, or `None` when the table holds
    /// no knowledge about it yet (the bandit then flips a coin).
    fn wants_transmit(&self, slot: SlotId) -> Option<bool>;

    /// Fold the outcome of a transmission made in `slot`.
    fn update(&mut self, slot: SlotId, success: bool, rng: &mut EngineRng);

    /// Table contents for metrics, in slot order.
    fn rows(&self) -> Vec<EstimateRow>;
}

// ── Win / loss tally ──────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    pub good: u64,
    pub bad:  u64,
}

/// Separate success and failure counts per slot; transmit iff `good > bad`.
#[derive(Default)]
pub struct WinLossRule {
    tallies: BTreeMap<SlotId, Tally>,
}

impl WinLossRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tally(&self, slot: SlotId) -> Option<Tally> {
        self.tallies.get(&slot).copied()
    }
}

impl UpdateRule for WinLossRule {
    const NAME: &'static str = "win_loss";

    fn wants_transmit(&self, slot: SlotId) -> Option<bool> {
        self.tallies.get(&slot).map(|t| t.good > t.bad)
    }

    fn update(&mut self, slot: SlotId, success: bool, _rng: &mut EngineRng) {
        let tally = self.tallies.entry(slot).or_default();
        if success {
            tally.good += 1;
        } else {
            tally.bad += 1;
        }
    }

    fn rows(&self) -> Vec<EstimateRow> {
        self.tallies
            .iter()
            .map(|(&slot, t)| EstimateRow {
                key:    EstimateKey::Slot(slot),
                value:  t.good as f64 - t.bad as f64,
                visits: t.good + t.bad,
            })
            .collect()
    }
}

// ── Saturating reward ─────────────────────────────────────────────────────────

/// Pins a slot to `+sentinel` on success and to `±sentinel` (fair coin) on
/// failure, so a single collision never locks a slot out for good.
pub struct SaturatingRule {
    sentinel: f64,
    values:   EstimateTable<SlotId>,
}

impl SaturatingRule {
    pub fn new(sentinel: f64) -> MacResult<Self> {
        if !(sentinel.is_finite() && sentinel > 0.0) {
            return Err(MacError::Config(format!(
                "saturating sentinel must be positive and finite, got {sentinel}"
            )));
        }
        Ok(Self { sentinel, values: EstimateTable::new() })
    }

    pub fn value(&self, slot: SlotId) -> Option<f64> {
        self.values.value(&slot)
    }
}

impl UpdateRule for SaturatingRule {
    const NAME: &'static str = "saturating";

    fn visit(&mut self, slot: SlotId) {
        self.values.ensure(slot, 0.0);
    }

    fn wants_transmit(&self, slot: SlotId) -> Option<bool> {
        self.values.value(&slot).map(|v| v >= 0.0)
    }

    fn update(&mut self, slot: SlotId, success: bool, rng: &mut EngineRng) {
        let pinned = if success || rng.coin() { self.sentinel } else { -self.sentinel };
        self.values.update(slot, 0.0, |_| pinned);
    }

    fn rows(&self) -> Vec<EstimateRow> {
        slot_rows(&self.values)
    }
}

// ── ALOHA-Q ───────────────────────────────────────────────────────────────────

/// `Q ← Q + α(r − Q)` with `r = +1` on success and `−1` on failure.
pub struct AlohaQRule {
    alpha:  f64,
    values: EstimateTable<SlotId>,
}

impl AlohaQRule {
    pub fn new(alpha: f64) -> MacResult<Self> {
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(MacError::Config(format!("alpha must lie in (0, 1], got {alpha}")));
        }
        Ok(Self { alpha, values: EstimateTable::new() })
    }

    pub fn value(&self, slot: SlotId) -> Option<f64> {
        self.values.value(&slot)
    }
}

impl UpdateRule for AlohaQRule {
    const NAME: &'static str = "aloha_q";

    fn visit(&mut self, slot: SlotId) {
        self.values.ensure(slot, 0.0);
    }

    fn wants_transmit(&self, slot: SlotId) -> Option<bool> {
        self.values.value(&slot).map(|q| q >= 0.0)
    }

    fn update(&mut self, slot: SlotId, success: bool, _rng: &mut EngineRng) {
        let reward = if success { 1.0 } else { -1.0 };
        let alpha = self.alpha;
        self.values.update(slot, 0.0, |q| q + alpha * (reward - q));
    }

    fn rows(&self) -> Vec<EstimateRow> {
        slot_rows(&self.values)
    }
}

fn slot_rows(table: &EstimateTable<SlotId>) -> Vec<EstimateRow> {
    table
        .iter()
        .map(|(&slot, e)| EstimateRow {
            key:    EstimateKey::Slot(slot),
            value:  e.value,
            visits: e.visits,
        })
        .collect()
}
