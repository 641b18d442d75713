//! Discrete step clock and the repeating slot frame.
//!
//! The host drives every component with a monotonically increasing `Step`
//! counter.  Components never advance it themselves; they only read it to
//! derive warm-up boundaries and frame slots.

use std::fmt;

use crate::{MacError, MacResult, SlotId};

// ── Step ─────────────────────────────────────────────────────────────────────

/// An absolute simulation step counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Step(pub u64);

impl Step {
    pub const ZERO: Step = Step(0);

    /// Steps elapsed from `earlier` to `self`, saturating at zero.
    #[inline]
    pub fn since(self, earlier: Step) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::ops::Add<u64> for Step {
    type Output = Step;
    #[inline]
    fn add(self, rhs: u64) -> Step {
        Step(self.0 + rhs)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}", self.0)
    }
}

// ── Frame ────────────────────────────────────────────────────────────────────

/// A fixed-length repeating sequence of channel-access slots.
///
/// `slot(step) = step mod length`.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Frame {
    length: u32,
}

impl Frame {
    /// A frame of `length` slots.  `length` must be positive.
    pub fn new(length: u32) -> MacResult<Self> {
        if length == 0 {
            return Err(MacError::Config("frame length must be positive".into()));
        }
        Ok(Self { length })
    }

    /// Two slots per member of the population, so each sender gets roughly
    /// two opportunities per frame.
    pub fn for_population(agents: u32) -> MacResult<Self> {
        Self::new(agents.saturating_mul(2))
    }

    #[inline]
    pub fn length(self) -> u32 {
        self.length
    }

    /// The slot `step` falls into.
    #[inline]
    pub fn slot(self, step: Step) -> SlotId {
        SlotId((step.0 % self.length as u64) as u32)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame[{}]", self.length)
    }
}
