//! What a relay estimate measures and how feedback moves it.
//!
//! | Objective     | Untried | Update                              | Rank       | Permanent failure |
//! |---------------|---------|-------------------------------------|------------|-------------------|
//! | [`MinDelay`]  | +∞      | `v ← min(v, delay)`                 | ascending  | `v ≥ budget`      |
//! | [`MaxReward`] | 0       | `v ← v + α((budget − delay) − v)`   | descending | `v = 0`           |
//!
//! A failed delivery is folded as `delay = budget`, so a candidate that never
//! delivered stays on its failure value.

use std::cmp::Ordering;

use mac_core::{MacError, MacResult};

pub trait RelayObjective {
    /// Short name used in metrics dumps.
    const NAME: &'static str;

    /// Value of a (cell, candidate) pair before its first feedback.
    fn untried(&self) -> f64;

    /// Fold one observed `delay` into `value`.
    fn fold(&self, value: f64, delay: f64, budget: f64) -> f64;

    /// Whether `value` marks a candidate that has never delivered.
    fn is_failure(&self, value: f64, budget: f64) -> bool;

    /// Ordering of two values, best first.
    fn rank(&self, a: f64, b: f64) -> Ordering;
}

/// Keep the smallest delivery delay seen per (cell, candidate).
#[derive(Copy, Clone, Debug, Default)]
pub struct MinDelay;

impl RelayObjective for MinDelay {
    const NAME: &'static str = "min_delay";

    fn untried(&self) -> f64 {
        f64::INFINITY
    }

    fn fold(&self, value: f64, delay: f64, _budget: f64) -> f64 {
        value.min(delay)
    }

    fn is_failure(&self, value: f64, budget: f64) -> bool {
        value >= budget
    }

    fn rank(&self, a: f64, b: f64) -> Ordering {
        a.total_cmp(&b)
    }
}

/// Running estimate of the time budget left at delivery.
#[derive(Copy, Clone, Debug)]
pub struct MaxReward {
    alpha: f64,
}

impl MaxReward {
    pub fn new(alpha: f64) -> MacResult<Self> {
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(MacError::Config(format!("alpha must lie in (0, 1], got {alpha}")));
        }
        Ok(Self { alpha })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl RelayObjective for MaxReward {
    const NAME: &'static str = "max_reward";

    fn untried(&self) -> f64 {
        0.0
    }

    fn fold(&self, value: f64, delay: f64, budget: f64) -> f64 {
        value + self.alpha * ((budget - delay) - value)
    }

    fn is_failure(&self, value: f64, _budget: f64) -> bool {
        value == 0.0
    }

    fn rank(&self, a: f64, b: f64) -> Ordering {
        b.total_cmp(&a)
    }
}
