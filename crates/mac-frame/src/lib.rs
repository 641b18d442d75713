//! `mac-frame` — distributed per-sender slot bandits.
//!
//! Time is divided into frames of `frame_length` slots.  Each sender runs
//! its own [`FrameSlotBandit`] and learns, slot by slot, whether
//! transmitting there tends to succeed.  No coordination between senders.
//!
//! | Rule                | Table              | Transmit when          |
//! |---------------------|--------------------|------------------------|
//! | [`WinLossRule`]     | good / bad counts  | `good > bad`           |
//! | [`SaturatingRule`]  | value, lazy 0      | `value >= 0`           |
//! | [`AlohaQRule`]      | Q, lazy 0          | `Q >= 0`               |
//!
//! All three share exploration, slot mapping and pending bookkeeping in
//! [`FrameSlotBandit`]; the host drives them through [`SlotBandit`].

pub mod bandit;
pub mod rule;


pub use bandit::{
    AlohaQBandit, FrameConfig, FrameSlotBandit, SaturatingBandit, SlotBandit, WinLossBandit,
};
pub use rule::{AlohaQRule, SaturatingRule, Tally, UpdateRule, WinLossRule};
