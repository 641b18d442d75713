//! Toy mobility and traffic model driving the decision components.

use mac_core::{AgentId, EngineRng, Position};

pub struct Drone {
    pub id:          AgentId,
    pub pos:         Position,
    /// Packets waiting for a depot grant.
    pub buffered:    u32,
    /// Packets waiting for a contention slot.
    pub frame_queue: u32,
}

pub struct World {
    pub drones:   Vec<Drone>,
    pub depot:    Position,
    /// Id the depot answers to when offered as a relay.
    pub depot_id: AgentId,
    area:         f32,
    speed:        f32,
    range:        f32,
    rng:          EngineRng,
}

impl World {
    pub fn new(drones: u32, area: f32, speed: f32, range: f32, mut rng: EngineRng) -> Self {
        let drones = (0..drones)
            .map(|i| Drone {
                id:          AgentId(i),
                pos:         Position::new(rng.gen_range(0.0..area), rng.gen_range(0.0..area)),
                buffered:    0,
                frame_queue: 0,
            })
            .collect::<Vec<_>>();
        let depot_id = AgentId(drones.len() as u32);
        Self {
            drones,
            depot: Position::new(area / 2.0, area / 2.0),
            depot_id,
            area,
            speed,
            range,
            rng,
        }
    }

    pub fn ids(&self) -> Vec<AgentId> {
        self.drones.iter().map(|d| d.id).collect()
    }

    pub fn drone(&self, id: AgentId) -> Option<&Drone> {
        self.drones.get(id.index())
    }

    pub fn drone_mut(&mut self, id: AgentId) -> Option<&mut Drone> {
        self.drones.get_mut(id.index())
    }

    /// Random-walk every drone and generate traffic.
    pub fn advance(&mut self, packet_rate: f64) {
        let (area, speed) = (self.area, self.speed);
        for d in &mut self.drones {
            let dx = self.rng.gen_range(-speed..=speed);
            let dy = self.rng.gen_range(-speed..=speed);
            d.pos = Position::new((d.pos.x + dx).clamp(0.0, area), (d.pos.y + dy).clamp(0.0, area));
            if self.rng.chance(packet_rate) {
                d.buffered += 1;
            }
            if self.rng.chance(packet_rate) {
                d.frame_queue += 1;
            }
        }
    }

    /// Drones within radio range of `of`, plus the depot if it is in range.
    pub fn neighbors(&self, of: AgentId) -> Vec<AgentId> {
        let Some(me) = self.drone(of) else {
            return Vec::new();
        };
        let mut out: Vec<AgentId> = self
            .drones
            .iter()
            .filter(|d| d.id != of && d.pos.distance(me.pos) <= self.range)
            .map(|d| d.id)
            .collect();
        if self.depot.distance(me.pos) <= self.range {
            out.push(self.depot_id);
        }
        out
    }

    pub fn pick_drone(&mut self) -> Option<AgentId> {
        let ids = self.ids();
        self.rng.choose(&ids).copied()
    }
}
