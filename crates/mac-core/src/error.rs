//! Engine error type.
//!
//! Every error here is a caller-contract violation: the decision path has no
//! transient or retryable failures.  Stale or duplicate feedback is not an
//! error at all; components ignore it and log at `debug` level.

use thiserror::Error;

use crate::{EventId, SlotId};

#[derive(Debug, Error, PartialEq)]
pub enum MacError {
    #[error("no candidates offered; at least one is required")]
    EmptyCandidates,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("outcome reported but no transmission is pending (last slot: {last_slot:?})")]
    NoPendingTransmission { last_slot: Option<SlotId> },

    #[error("outcome reported for packet {0} which has no pending transmission")]
    UnknownPacket(EventId),
}

/// Shorthand result type for all `mac-*` crates.
pub type MacResult<T> = Result<T, MacError>;

/// `Ok(())` iff `p` is a probability.
pub fn check_probability(name: &str, p: f64) -> MacResult<()> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(MacError::Config(format!("{name} must lie in [0, 1], got {p}")))
    }
}
