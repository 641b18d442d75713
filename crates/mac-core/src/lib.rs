//! `mac-core` — foundational types for the `mac` decision engine.
//!
//! This crate is a dependency of every other `mac-*` crate.  It has no
//! `mac-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `EventId`, `CellId`, `SlotId`              |
//! | [`geo`]         | `Position`, `CellGrid` tessellation                   |
//! | [`time`]        | `Step`, `Frame`                                       |
//! | [`rng`]         | `EngineRng` (one per component instance)              |
//! | [`estimate`]    | `Estimate`, `EstimateTable<K>`                        |
//! | [`metrics`]     | `MetricsReport`, `ReportMetrics`                      |
//! | [`error`]       | `MacError`, `MacResult`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod estimate;
pub mod geo;
pub mod ids;
pub mod metrics;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{check_probability, MacError, MacResult};
pub use estimate::{Estimate, EstimateTable};
pub use geo::{CellGrid, Position};
pub use ids::{AgentId, CellId, EventId, SlotId};
pub use metrics::{EstimateKey, EstimateRow, MetricsReport, ReportMetrics};
pub use rng::EngineRng;
pub use time::{Frame, Step};
