//! depot_mac — toy host for the mac decision engine.
//!
//! A handful of drones random-walk over a square area around a depot.
//! Every step three independent decisions are exercised:
//!
//! 1. the depot grants its uplink to one drone (`SlotAllocator`);
//! 2. every drone with a queued packet decides whether to contend for the
//!    shared slot (`FrameSlotBandit`, collision if more than one sends);
//! 3. drones carrying a sensed event hand it to a neighbour or the depot
//!    (`CellRelaySelector`), with feedback only once it is delivered or
//!    expires.
//!
//! Usage: `depot_mac [config.toml]`.  Set `RUST_LOG=debug` for decision
//! traces.  Metrics are written as CSV to `output_dir`.

mod config;
mod world;

use std::path::Path;
use std::time::Instant;

use anyhow::{bail, Result};
use log::info;

use mac_alloc::{
    FrequencyAllocator, IncrementalAllocator, ScheduleAllocator, SlotAllocator, SlotOutcome,
};
use mac_core::{AgentId, EngineRng, EventId, ReportMetrics, Step};
use mac_frame::{AlohaQBandit, SaturatingBandit, SlotBandit, WinLossBandit};
use mac_output::{CsvWriter, OutputWriter};
use mac_relay::{MaxRewardSelector, MinDelaySelector, RelayConfig, RelaySelector};

use config::{AllocatorKind, DemoConfig, FrameRuleKind, RelayKind};
use world::World;

/// Salt separating each drone's relay stream from its frame stream.
const RELAY_SEED_SALT: u64 = 0x5eed_0f_4e1a;

// ── Component construction ────────────────────────────────────────────────────

fn build_allocator(cfg: &DemoConfig, rng: EngineRng) -> Result<Box<dyn SlotAllocator>> {
    Ok(match cfg.allocator {
        AllocatorKind::Frequency => Box::new(FrequencyAllocator::new(cfg.frequency.clone(), rng)?),
        AllocatorKind::Incremental => {
            Box::new(IncrementalAllocator::new(cfg.incremental.clone(), rng)?)
        }
        AllocatorKind::Schedule => Box::new(ScheduleAllocator::new(cfg.schedule.clone(), rng)?),
    })
}

fn build_bandit(cfg: &DemoConfig, rng: EngineRng) -> Result<Box<dyn SlotBandit>> {
    Ok(match cfg.frame_rule {
        FrameRuleKind::WinLoss => Box::new(WinLossBandit::win_loss(&cfg.frame, rng)?),
        FrameRuleKind::Saturating => Box::new(SaturatingBandit::saturating(&cfg.frame, rng)?),
        FrameRuleKind::AlohaQ => Box::new(AlohaQBandit::aloha_q(&cfg.frame, rng)?),
    })
}

fn build_selector(cfg: &DemoConfig, owner: AgentId) -> Result<Box<dyn RelaySelector>> {
    // A drone never learns from feedback about itself.
    let relay = RelayConfig { non_learning: Some(owner), ..cfg.relay.clone() };
    let rng = EngineRng::for_agent(cfg.seed ^ RELAY_SEED_SALT, owner);
    Ok(match cfg.relay_kind {
        RelayKind::MinDelay => Box::new(MinDelaySelector::min_delay(relay, rng)?),
        RelayKind::MaxReward => Box::new(MaxRewardSelector::max_reward(relay, rng)?),
    })
}

// ── Events ────────────────────────────────────────────────────────────────────

struct Event {
    id:     EventId,
    born:   Step,
    holder: AgentId,
    /// Every (decider, relay) hand-off, awaiting the final outcome.
    hops:   Vec<(AgentId, AgentId)>,
}

#[derive(Default)]
struct Stats {
    depot_packets:    u64,
    frame_successes:  u64,
    frame_collisions: u64,
    delivered:        u64,
    expired:          u64,
    total_delay:      u64,
}

fn settle(selectors: &mut [Box<dyn RelaySelector>], event: &Event, delay: f64, outcome: bool) {
    for &(decider, relay) in &event.hops {
        if let Some(s) = selectors.get_mut(decider.index()) {
            s.feedback(relay, event.id, delay, outcome);
        }
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::init();

    let cfg = match std::env::args().nth(1) {
        Some(path) => DemoConfig::load(Path::new(&path))?,
        None => DemoConfig::default(),
    }
    .normalise();
    if cfg.drones == 0 || !(cfg.area > 0.0) {
        bail!("need at least one drone and a positive area");
    }

    println!("=== depot_mac — mac decision engine demo ===");
    println!(
        "Drones: {}  |  Steps: {}  |  Seed: {}  |  {:?} / {:?} / {:?}",
        cfg.drones, cfg.steps, cfg.seed, cfg.allocator, cfg.frame_rule, cfg.relay_kind
    );

    let mut root = EngineRng::new(cfg.seed);
    let mut world = World::new(cfg.drones, cfg.area, cfg.speed, cfg.radio_range, root.child(0));
    let mut allocator = build_allocator(&cfg, root.child(1))?;
    let ids = world.ids();
    let mut bandits = ids
        .iter()
        .map(|&id| build_bandit(&cfg, EngineRng::for_agent(cfg.seed, id)))
        .collect::<Result<Vec<_>>>()?;
    let mut selectors = ids
        .iter()
        .map(|&id| build_selector(&cfg, id))
        .collect::<Result<Vec<_>>>()?;

    let budget = cfg.relay.event_budget;
    let mut events: Vec<Event> = Vec::new();
    let mut next_event = 0u64;
    let mut stats = Stats::default();

    let t0 = Instant::now();
    for s in 0..cfg.steps {
        let step = Step(s);
        world.advance(cfg.packet_rate);

        // 1. Depot uplink grant.
        let granted = allocator.allocate(&ids, step)?;
        let sent = world.drone_mut(granted).map_or(0, |d| std::mem::take(&mut d.buffered));
        stats.depot_packets += sent as u64;
        allocator.report(SlotOutcome::new(granted, sent > 0, sent as f64));

        // 2. Slotted contention.
        let mut senders = Vec::new();
        for (d, bandit) in world.drones.iter().zip(bandits.iter_mut()) {
            if d.frame_queue > 0 && bandit.should_transmit(step) {
                senders.push(d.id);
            }
        }
        let success = senders.len() == 1;
        match senders.len() {
            0 => {}
            1 => stats.frame_successes += 1,
            _ => stats.frame_collisions += 1,
        }
        for &id in &senders {
            bandits[id.index()].report_outcome(success)?;
            if success {
                if let Some(d) = world.drone_mut(id) {
                    d.frame_queue -= 1;
                }
            }
        }

        // 3. Event forwarding.
        if cfg.event_interval > 0 && s % cfg.event_interval == 0 {
            if let Some(holder) = world.pick_drone() {
                events.push(Event { id: EventId(next_event), born: step, holder, hops: Vec::new() });
                next_event += 1;
            }
        }
        let mut live = Vec::with_capacity(events.len());
        for mut event in events.drain(..) {
            let age = step.since(event.born);
            if age as f64 >= budget {
                settle(&mut selectors, &event, budget, false);
                stats.expired += 1;
                continue;
            }
            let Some(pos) = world.drone(event.holder).map(|d| d.pos) else {
                continue;
            };
            let neighbors = world.neighbors(event.holder);
            let pick = selectors[event.holder.index()].select_relay_at(&neighbors, event.id, pos);
            match pick {
                Some(relay) if relay == world.depot_id => {
                    event.hops.push((event.holder, relay));
                    settle(&mut selectors, &event, age as f64, true);
                    stats.delivered += 1;
                    stats.total_delay += age;
                }
                Some(relay) => {
                    event.hops.push((event.holder, relay));
                    event.holder = relay;
                    live.push(event);
                }
                None => live.push(event),
            }
        }
        events = live;
    }
    let elapsed = t0.elapsed();
    info!("{} events still in flight at the end of the run", events.len());

    // ── Summary ───────────────────────────────────────────────────────────────

    println!("Run complete in {:.3} s", elapsed.as_secs_f64());
    println!("  depot packets collected : {}", stats.depot_packets);
    println!(
        "  slot successes / collisions : {} / {}",
        stats.frame_successes, stats.frame_collisions
    );
    let mean_delay = if stats.delivered == 0 {
        0.0
    } else {
        stats.total_delay as f64 / stats.delivered as f64
    };
    println!(
        "  events delivered / expired  : {} / {}  (mean delay {:.1} steps)",
        stats.delivered, stats.expired, mean_delay
    );

    // ── Metrics dump ──────────────────────────────────────────────────────────

    let mut writer = CsvWriter::new(Path::new(&cfg.output_dir))?;
    writer.write_report(&allocator.report_metrics())?;
    for (id, b) in ids.iter().zip(&bandits) {
        let mut report = b.report_metrics();
        report.component = format!("{}@{}", report.component, id.0);
        writer.write_report(&report)?;
    }
    for (id, s) in ids.iter().zip(&selectors) {
        let mut report = s.report_metrics();
        report.component = format!("{}@{}", report.component, id.0);
        writer.write_report(&report)?;
    }
    writer.finish()?;
    println!("Metrics written to {}/", cfg.output_dir);

    Ok(())
}
