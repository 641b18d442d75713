//! Demo configuration, loaded from an optional TOML file.
//!
//! Every field has a default, so a file only needs the keys it changes:
//!
//! ```toml
//! seed      = 7
//! allocator = "schedule"
//!
//! [frame]
//! epsilon = 0.1
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use mac_alloc::{FrequencyConfig, IncrementalConfig, ScheduleConfig};
use mac_frame::FrameConfig;
use mac_relay::RelayConfig;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocatorKind {
    Frequency,
    Incremental,
    Schedule,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameRuleKind {
    WinLoss,
    Saturating,
    AlohaQ,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelayKind {
    MinDelay,
    MaxReward,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub seed:           u64,
    pub drones:         u32,
    pub steps:          u64,
    /// Side of the square area, metres.  The depot sits at its centre.
    pub area:           f32,
    /// Maximum random-walk displacement per step, metres.
    pub speed:          f32,
    pub radio_range:    f32,
    /// Per-step chance that a drone buffers a new packet.
    pub packet_rate:    f64,
    /// A new event is sensed every this many steps.
    pub event_interval: u64,
    pub output_dir:     String,

    pub allocator:      AllocatorKind,
    pub frame_rule:     FrameRuleKind,
    pub relay_kind:     RelayKind,

    pub frequency:      FrequencyConfig,
    pub incremental:    IncrementalConfig,
    pub schedule:       ScheduleConfig,
    pub frame:          FrameConfig,
    pub relay:          RelayConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        let drones = 5;
        Self {
            seed:           42,
            drones,
            steps:          2_000,
            area:           1_500.0,
            speed:          25.0,
            radio_range:    350.0,
            packet_rate:    0.3,
            event_interval: 20,
            output_dir:     "output/depot_mac".into(),
            allocator:      AllocatorKind::Frequency,
            frame_rule:     FrameRuleKind::AlohaQ,
            relay_kind:     RelayKind::MaxReward,
            frequency:      FrequencyConfig::default(),
            incremental:    IncrementalConfig::default(),
            schedule:       ScheduleConfig::default(),
            frame:          FrameConfig::for_population(drones),
            relay:          RelayConfig { event_budget: 400.0, ..RelayConfig::default() },
        }
    }
}

impl DemoConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: DemoConfig =
            toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Keep the run-length dependent settings in step with `steps`.
    pub fn normalise(mut self) -> Self {
        self.frequency.total_steps = self.steps;
        self.schedule.total_steps = self.steps;
        self.relay.grid.width = self.area;
        self
    }
}
