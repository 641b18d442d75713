//! `mac-relay` — cell-keyed relay selection for moving agents.
//!
//! Each forwarding agent owns a [`CellRelaySelector`].  Estimates are keyed
//! by `(cell, candidate)` where the cell is where the *deciding* agent was
//! when it chose.  Because agents move, one event may be handed out in
//! several cells before any feedback arrives; [`PendingActions`] keeps the
//! assignments and decides which cell a late feedback belongs to.
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`selector`]    | `CellRelaySelector<O>`, `RelaySelector`, `RelayConfig` |
//! | [`objective`]   | `RelayObjective`, `MinDelay`, `MaxReward`             |
//! | [`pending`]     | `PendingActions`, `CellAssignments`                   |

pub mod objective;
pub mod pending;
pub mod selector;

#[cfg(test)]
mod tests;

pub use objective::{MaxReward, MinDelay, RelayObjective};
pub use pending::{CellAssignments, PendingActions};
pub use selector::{
    CellRelaySelector, MaxRewardSelector, MinDelaySelector, RelayConfig, RelaySelector,
};
