//! The per-sender frame-slot bandit.
//!
//! Each sender owns one [`FrameSlotBandit`].  On every step it maps the step
//! to a slot of its frame and asks "transmit now?":
//!
//! ```text
//! slot   = step mod frame_length
//! visit  rule table for slot (lazy init)
//! roll   ε  → explore: fair coin
//!        else table has knowledge → exploit: rule decision
//!             no knowledge        → explore: fair coin
//! ```
//!
//! Outcomes are fed back either against the single most recent transmission
//! ([`SlotBandit::report_outcome`]) or against a packet identifier when
//! several transmissions may be in flight
//! ([`SlotBandit::report_packet_outcome`]).

use log::{debug, trace};
use rustc_hash::FxHashMap;

use mac_core::{
    check_probability, EngineRng, EventId, Frame, MacError, MacResult, MetricsReport,
    ReportMetrics, SlotId, Step,
};

use crate::rule::{AlohaQRule, SaturatingRule, UpdateRule, WinLossRule};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FrameConfig {
    pub epsilon:      f64,
    /// Slots per frame.  Use [`FrameConfig::for_population`] for the usual
    /// two slots per sender.
    pub frame_length: u32,
    /// ALOHA-Q learning rate.
    pub alpha:        f64,
    /// Magnitude the saturating rule pins a slot to.
    pub sentinel:     f64,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            epsilon:      0.05,
            frame_length: 10,
            alpha:        0.1,
            sentinel:     1_000.0,
        }
    }
}

impl FrameConfig {
    /// Defaults with a frame of two slots per sender.
    pub fn for_population(senders: u32) -> Self {
        Self { frame_length: senders.saturating_mul(2), ..Self::default() }
    }

    pub fn validate(&self) -> MacResult<()> {
        check_probability("epsilon", self.epsilon)?;
        Frame::new(self.frame_length)?;
        Ok(())
    }

    pub fn frame(&self) -> MacResult<Frame> {
        Frame::new(self.frame_length)
    }
}

/// Transmit-or-hold decisions for one sender.
///
/// Object safe, so a host can mix rule variants behind `Box<dyn SlotBandit>`.
pub trait SlotBandit: ReportMetrics {
    /// Decide whether to transmit at `step`.  A `true` answer leaves the slot
    /// pending until [`report_outcome`](Self::report_outcome) is called.
    fn should_transmit(&mut self, step: Step) -> bool;

    /// Outcome of the most recent pending transmission.
    ///
    /// Fails with [`MacError::NoPendingTransmission`] if nothing is pending;
    /// the table is left untouched in that case.
    fn report_outcome(&mut self, success: bool) -> MacResult<()>;

    /// Like [`should_transmit`](Self::should_transmit), but a `true` answer
    /// records the slot against `packet` so several transmissions can be in
    /// flight at once.
    fn should_transmit_packet(&mut self, step: Step, packet: EventId) -> bool;

    /// Outcome of the transmission of `packet`.
    ///
    /// Fails with [`MacError::UnknownPacket`] if `packet` has no pending
    /// transmission.
    fn report_packet_outcome(&mut self, packet: EventId, success: bool) -> MacResult<()>;
}

pub struct FrameSlotBandit<R> {
    epsilon:      f64,
    frame:        Frame,
    rng:          EngineRng,
    rule:         R,
    pending:      Option<SlotId>,
    last_slot:    Option<SlotId>,
    in_flight:    FxHashMap<EventId, SlotId>,
    exploration:  u64,
    exploitation: u64,
}

pub type WinLossBandit = FrameSlotBandit<WinLossRule>;
pub type SaturatingBandit = FrameSlotBandit<SaturatingRule>;
pub type AlohaQBandit = FrameSlotBandit<AlohaQRule>;

impl FrameSlotBandit<WinLossRule> {
    pub fn win_loss(config: &FrameConfig, rng: EngineRng) -> MacResult<Self> {
        Self::with_rule(config, WinLossRule::new(), rng)
    }
}

impl FrameSlotBandit<SaturatingRule> {
    pub fn saturating(config: &FrameConfig, rng: EngineRng) -> MacResult<Self> {
        Self::with_rule(config, SaturatingRule::new(config.sentinel)?, rng)
    }
}

impl FrameSlotBandit<AlohaQRule> {
    pub fn aloha_q(config: &FrameConfig, rng: EngineRng) -> MacResult<Self> {
        Self::with_rule(config, AlohaQRule::new(config.alpha)?, rng)
    }
}

impl<R: UpdateRule> FrameSlotBandit<R> {
    pub fn with_rule(config: &FrameConfig, rule: R, rng: EngineRng) -> MacResult<Self> {
        config.validate()?;
        Ok(Self {
            epsilon:      config.epsilon,
            frame:        config.frame()?,
            rng,
            rule,
            pending:      None,
            last_slot:    None,
            in_flight:    FxHashMap::default(),
            exploration:  0,
            exploitation: 0,
        })
    }

    #[inline]
    pub fn frame(&self) -> Frame {
        self.frame
    }

    #[inline]
    pub fn rule(&self) -> &R {
        &self.rule
    }

    /// Slot of the most recent transmission, resolved or not.
    pub fn last_slot(&self) -> Option<SlotId> {
        self.last_slot
    }

    /// Number of packet-keyed transmissions still awaiting an outcome.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    fn decide(&mut self, step: Step) -> (SlotId, bool) {
        let slot = self.frame.slot(step);
        self.rule.visit(slot);
        let explore = self.rng.chance(self.epsilon);
        let known = if explore { None } else { self.rule.wants_transmit(slot) };
        let transmit = match known {
            Some(t) => {
                self.exploitation += 1;
                t
            }
            None => {
                self.exploration += 1;
                self.rng.coin()
            }
        };
        trace!("{step}: {} bandit slot {slot} transmit={transmit}", R::NAME);
        if transmit {
            self.last_slot = Some(slot);
        }
        (slot, transmit)
    }
}

impl<R: UpdateRule> SlotBandit for FrameSlotBandit<R> {
    fn should_transmit(&mut self, step: Step) -> bool {
        let (slot, transmit) = self.decide(step);
        if transmit {
            if let Some(prev) = self.pending.replace(slot) {
                debug!("{} bandit: outcome for slot {prev} never reported", R::NAME);
            }
        }
        transmit
    }

    fn report_outcome(&mut self, success: bool) -> MacResult<()> {
        let slot = self
            .pending
            .take()
            .ok_or(MacError::NoPendingTransmission { last_slot: self.last_slot })?;
        self.rule.update(slot, success, &mut self.rng);
        Ok(())
    }

    fn should_transmit_packet(&mut self, step: Step, packet: EventId) -> bool {
        let (slot, transmit) = self.decide(step);
        if transmit {
            self.in_flight.insert(packet, slot);
        }
        transmit
    }

    fn report_packet_outcome(&mut self, packet: EventId, success: bool) -> MacResult<()> {
        let slot = self.in_flight.remove(&packet).ok_or(MacError::UnknownPacket(packet))?;
        self.rule.update(slot, success, &mut self.rng);
        Ok(())
    }
}

impl<R: UpdateRule> ReportMetrics for FrameSlotBandit<R> {
    fn report_metrics(&self) -> MetricsReport {
        let mut report = MetricsReport::new(R::NAME, self.exploration, self.exploitation);
        report.estimates = self.rule.rows();
        report
    }
}
