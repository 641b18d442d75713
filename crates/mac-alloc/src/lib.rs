//! `mac-alloc` — centralized per-step channel allocation.
//!
//! Each step the host offers the full pool of candidate transmitters and the
//! allocator grants the shared medium to exactly one of them.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                       |
//! |-----------------|----------------------------------------------------------------|
//! | [`allocator`]   | `SlotAllocator` trait, `SlotOutcome`                            |
//! | [`greedy`]      | ε-greedy pick with uniform tie-break among maxima               |
//! | [`frequency`]   | `FrequencyAllocator` — warm-up counting, seeded increments      |
//! | [`incremental`] | `IncrementalAllocator` — optimistic incremental average         |
//! | [`schedule`]    | `ScheduleAllocator` — round-robin probing, schedule replay      |
//!
//! # Feedback model
//!
//! `report` only stores the latest outcome.  It is folded into the estimate
//! table at the top of the next `allocate`, before any random draw, so the
//! order of host calls fully determines the RNG stream.

pub mod allocator;
pub mod frequency;
pub mod greedy;
pub mod incremental;
pub mod schedule;


pub use allocator::{SlotAllocator, SlotOutcome};
pub use frequency::{FrequencyAllocator, FrequencyConfig};
pub use greedy::Pick;
pub use incremental::{IncrementalAllocator, IncrementalConfig};
pub use schedule::{ScheduleAllocator, ScheduleConfig};
