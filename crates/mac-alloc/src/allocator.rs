//! The `SlotAllocator` trait and the outcome type the host reports back.

use mac_core::{AgentId, MacResult, ReportMetrics, Step};

/// Outcome of the previous step's grant, as observed by the host.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotOutcome {
    /// The candidate that was granted the medium.
    pub candidate: AgentId,
    /// Whether the candidate actually had something to send and used the slot.
    pub attempted: bool,
    /// Reward observed for the grant (e.g. packets delivered).
    pub reward:    f64,
}

impl SlotOutcome {
    pub fn new(candidate: AgentId, attempted: bool, reward: f64) -> Self {
        Self { candidate, attempted, reward }
    }
}

/// Centralized, per-step channel allocation.
///
/// The host calls [`allocate`][Self::allocate] once per step with the full
/// candidate pool and may call [`report`][Self::report] with the outcome of
/// that grant before the next `allocate`.  Only the most recent outcome is
/// kept; it is folded into the estimates at the start of the next
/// `allocate`.
///
/// # Example
///
/// ```rust,ignore
/// let mut alloc = IncrementalAllocator::new(IncrementalConfig::default(), EngineRng::new(7))?;
/// for step in 0..total {
///     let granted = alloc.allocate(&pool, Step(step))?;
///     let (attempted, reward) = host.transmit(granted);
///     alloc.report(SlotOutcome::new(granted, attempted, reward));
/// }
/// ```
pub trait SlotAllocator: ReportMetrics {
    /// Choose which candidate gets the shared medium at `step`.
    ///
    /// Fails with [`MacError::EmptyCandidates`](mac_core::MacError::EmptyCandidates)
    /// when `candidates` is empty; no choice is made and no state changes.
    fn allocate(&mut self, candidates: &[AgentId], step: Step) -> MacResult<AgentId>;

    /// Record the outcome of the previous grant.  A second call before the
    /// next `allocate` replaces the first.
    fn report(&mut self, outcome: SlotOutcome);
}
