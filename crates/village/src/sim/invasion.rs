use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use super::events::SimEvent;
use super::population::{Counters, PopulationLedger};
use super::role::Role;
use crate::config::InvasionConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct InvaderId(u64);

impl InvaderId {
    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvaderPhase {
    Approach,
    AtWall,
    Breaching,
    InnerApproach,
    Repelled,
    Breached,
}

impl InvaderPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            InvaderPhase::Approach => "approach",
            InvaderPhase::AtWall => "at_wall",
            InvaderPhase::Breaching => "breaching",
            InvaderPhase::InnerApproach => "inner_approach",
            InvaderPhase::Repelled => "repelled",
            InvaderPhase::Breached => "breached",
        }
    }

    pub fn is_resolved(self) -> bool {
        matches!(self, InvaderPhase::Repelled | InvaderPhase::Breached)
    }
}

/// One attacker walking toward the village core. `progress` is the
/// distance covered inside the current phase and restarts at every
/// phase change.
#[derive(Debug, Clone, PartialEq)]
pub struct Invader {
    id: InvaderId,
    phase: InvaderPhase,
    progress: f64,
    active: bool,
}

impl Invader {
    fn new(id: InvaderId) -> Self {
        Self {
            id,
            phase: InvaderPhase::Approach,
            progress: 0.0,
            active: true,
        }
    }

    pub fn id(&self) -> InvaderId {
        self.id
    }

    pub fn phase(&self) -> InvaderPhase {
        self.phase
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    fn enter(&mut self, phase: InvaderPhase) {
        self.phase = phase;
        self.progress = 0.0;
        if phase.is_resolved() {
            self.active = false;
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InvasionStats {
    pub spawned: u32,
    pub repelled: u32,
    pub breached: u32,
}

/// Earliest and latest gap before the next invader, shrinking as the run
/// goes on. Both ends are scaled by `time_scale / now` once `now` passes
/// `time_scale`, and never drop below the configured floor.
pub fn interval_bounds(now: f64, config: &InvasionConfig) -> (f64, f64) {
    let scale = config.time_scale / now.max(config.time_scale);
    let min = (config.min_interval * scale).max(config.interval_floor);
    let max = (config.max_interval * scale).max(config.interval_floor);
    (min, max.max(min))
}

#[derive(Debug, Clone)]
pub struct InvasionSystem {
    config: InvasionConfig,
    next_due: f64,
    next_id: u64,
    invaders: Vec<Invader>,
    stats: InvasionStats,
}

impl InvasionSystem {
    pub fn new(config: InvasionConfig) -> Self {
        Self {
            config,
            next_due: config.initial_delay,
            next_id: 1,
            invaders: Vec::new(),
            stats: InvasionStats::default(),
        }
    }

    pub fn next_due(&self) -> f64 {
        self.next_due
    }

    pub fn invaders(&self) -> &[Invader] {
        &self.invaders
    }

    pub fn stats(&self) -> InvasionStats {
        self.stats
    }

    /// Spawns due invaders, walks every live invader one step and resolves
    /// those that reach the wall or the core. Returns `true` when a breach
    /// left the village without farmers; no invader moves after that.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        now: f64,
        ledger: &mut PopulationLedger,
        counters: &mut Counters,
        rng: &mut R,
        events: &mut Vec<SimEvent>,
    ) -> bool {
        while now >= self.next_due {
            let id = self.spawn();
            let (min, max) = interval_bounds(now, &self.config);
            let gap = rng.gen_range(min..=max);
            self.next_due += gap;
            debug!(id = id.get(), gap, next_due = self.next_due, "invader_spawned");
            events.push(SimEvent::InvaderSpawned { id });
        }

        let mut fallen = false;
        for index in 0..self.invaders.len() {
            if self.step(index, ledger, counters, events) {
                fallen = true;
                break;
            }
        }

        self.invaders.retain(|invader| {
            if !invader.active {
                events.push(SimEvent::InvaderRemoved { id: invader.id });
            }
            invader.active
        });
        fallen
    }

    /// Adds a fresh invader at the start of its approach without touching
    /// the spawn schedule.
    pub fn spawn(&mut self) -> InvaderId {
        let id = InvaderId(self.next_id);
        self.next_id += 1;
        self.invaders.push(Invader::new(id));
        self.stats.spawned += 1;
        id
    }

    fn step(
        &mut self,
        index: usize,
        ledger: &mut PopulationLedger,
        counters: &mut Counters,
        events: &mut Vec<SimEvent>,
    ) -> bool {
        let speed = self.config.speed;
        let invader = &mut self.invaders[index];
        if !invader.active {
            return false;
        }
        match invader.phase {
            InvaderPhase::Approach => {
                invader.progress += speed;
                if invader.progress >= self.config.approach_distance {
                    invader.enter(InvaderPhase::AtWall);
                }
            }
            InvaderPhase::AtWall => {
                if ledger.consume_guard() {
                    counters.defenses = counters.defenses.saturating_add(1);
                    invader.enter(InvaderPhase::Repelled);
                    self.stats.repelled += 1;
                    let guards_left = ledger.raw(Role::Guard);
                    info!(
                        id = invader.id.get(),
                        guards_left,
                        defenses = counters.defenses,
                        "invader_repelled"
                    );
                    events.push(SimEvent::Repelled {
                        id: invader.id,
                        guards_left,
                    });
                } else {
                    debug!(id = invader.id.get(), "wall_undefended");
                    invader.enter(InvaderPhase::Breaching);
                }
            }
            InvaderPhase::Breaching => {
                invader.progress += speed;
                if invader.progress >= self.config.corridor_distance {
                    invader.enter(InvaderPhase::InnerApproach);
                }
            }
            InvaderPhase::InnerApproach => {
                invader.progress += speed;
                if invader.progress >= self.config.inner_distance {
                    invader.enter(InvaderPhase::Breached);
                    self.stats.breached += 1;
                    let farmers_raw = ledger.apply_breach(self.config.breach_farmer_cost);
                    info!(id = invader.id.get(), farmers_raw, "village_breached");
                    events.push(SimEvent::Breached {
                        id: invader.id,
                        farmers_raw,
                    });
                    return farmers_raw <= 0;
                }
            }
            InvaderPhase::Repelled | InvaderPhase::Breached => {}
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::config::InitialPopulation;

    fn unit_config() -> InvasionConfig {
        InvasionConfig {
            initial_delay: 1_000.0,
            speed: 0.5,
            approach_distance: 1.0,
            corridor_distance: 1.0,
            inner_distance: 1.0,
            ..InvasionConfig::default()
        }
    }

    fn ledger(farmers: i32, guards: i32) -> PopulationLedger {
        PopulationLedger::new(InitialPopulation {
            farmers,
            guards,
            miners: 0,
        })
    }

    struct Harness {
        system: InvasionSystem,
        ledger: PopulationLedger,
        counters: Counters,
        rng: ChaCha8Rng,
        events: Vec<SimEvent>,
    }

    impl Harness {
        fn new(farmers: i32, guards: i32) -> Self {
            Self {
                system: InvasionSystem::new(unit_config()),
                ledger: ledger(farmers, guards),
                counters: Counters::default(),
                rng: ChaCha8Rng::seed_from_u64(7),
                events: Vec::new(),
            }
        }

        fn tick(&mut self) -> bool {
            self.system.tick(
                0.0,
                &mut self.ledger,
                &mut self.counters,
                &mut self.rng,
                &mut self.events,
            )
        }
    }

    #[test]
    fn interval_shrinks_after_time_scale_and_respects_floor() {
        let config = InvasionConfig::default();
        assert_eq!(interval_bounds(10.0, &config), (6.0, 12.0));
        assert_eq!(interval_bounds(120.0, &config), (3.0, 6.0));
        let (min, max) = interval_bounds(1.0e6, &config);
        assert_eq!(min, config.interval_floor);
        assert_eq!(max, config.interval_floor);
    }

    #[test]
    fn spawns_at_initial_delay_and_schedules_within_bounds() {
        let config = InvasionConfig::default();
        let mut system = InvasionSystem::new(config);
        let mut ledger = ledger(1, 1);
        let mut counters = Counters::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut events = Vec::new();

        system.tick(11.9, &mut ledger, &mut counters, &mut rng, &mut events);
        assert!(system.invaders().is_empty());

        system.tick(12.0, &mut ledger, &mut counters, &mut rng, &mut events);
        assert_eq!(system.invaders().len(), 1);
        assert_eq!(system.stats().spawned, 1);
        let gap = system.next_due() - 12.0;
        assert!((6.0..=12.0).contains(&gap), "gap {gap}");
        assert!(matches!(events[0], SimEvent::InvaderSpawned { .. }));
    }

    #[test]
    fn long_frame_spawns_every_missed_invader() {
        let config = InvasionConfig {
            initial_delay: 1.0,
            min_interval: 2.0,
            max_interval: 2.0,
            ..InvasionConfig::default()
        };
        let mut system = InvasionSystem::new(config);
        let mut ledger = ledger(1, 1);
        let mut counters = Counters::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut events = Vec::new();

        system.tick(7.0, &mut ledger, &mut counters, &mut rng, &mut events);
        assert_eq!(system.stats().spawned, 4);
        assert_eq!(system.next_due(), 9.0);
    }

    #[test]
    fn floored_spawn_gap_still_advances_after_a_long_run() {
        let config = InvasionConfig {
            initial_delay: 2.2e6,
            ..InvasionConfig::default()
        };
        let mut system = InvasionSystem::new(config);
        let mut ledger = ledger(1, 1);
        let mut counters = Counters::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut events = Vec::new();

        system.tick(2.2e6 + 1.05, &mut ledger, &mut counters, &mut rng, &mut events);
        assert_eq!(system.stats().spawned, 11);
        assert!(system.next_due() > 2.2e6 + 1.05);
    }

    #[test]
    fn undefended_wall_lets_invader_into_the_corridor() {
        let mut h = Harness::new(10, 0);
        h.system.spawn();
        h.tick();
        h.tick();
        assert_eq!(h.system.invaders()[0].phase(), InvaderPhase::AtWall);
        h.tick();
        assert_eq!(h.system.invaders()[0].phase(), InvaderPhase::Breaching);
        assert_eq!(h.system.invaders()[0].progress(), 0.0);
        assert_eq!(h.counters.defenses, 0);
    }

    #[test]
    fn guard_repels_invader_at_the_wall() {
        let mut h = Harness::new(10, 2);
        let id = h.system.spawn();
        for _ in 0..3 {
            assert!(!h.tick());
        }
        assert_eq!(h.ledger.raw(Role::Guard), 1);
        assert_eq!(h.counters.defenses, 1);
        assert_eq!(h.system.stats().repelled, 1);
        assert!(h.system.invaders().is_empty());
        assert!(h.events.contains(&SimEvent::Repelled { id, guards_left: 1 }));
        assert_eq!(h.events.last(), Some(&SimEvent::InvaderRemoved { id }));
    }

    #[test]
    fn breach_costs_farmers_and_reports_fall() {
        let mut h = Harness::new(4, 0);
        let id = h.system.spawn();
        for _ in 0..6 {
            assert!(!h.tick());
        }
        assert_eq!(h.system.invaders()[0].phase(), InvaderPhase::InnerApproach);
        assert!(h.tick());
        assert_eq!(h.ledger.raw(Role::Farmer), -1);
        assert_eq!(h.ledger.display_count(Role::Farmer), 0);
        assert_eq!(h.system.stats().breached, 1);
        assert!(h.events.contains(&SimEvent::Breached { id, farmers_raw: -1 }));
        assert!(h.system.invaders().is_empty());
    }

    #[test]
    fn breach_with_farmers_to_spare_is_survivable() {
        let mut h = Harness::new(8, 0);
        h.system.spawn();
        let fell = (0..7).map(|_| h.tick()).any(|fell| fell);
        assert!(!fell);
        assert_eq!(h.ledger.raw(Role::Farmer), 3);
    }

    #[test]
    fn fall_stops_remaining_invaders_for_the_tick() {
        let mut h = Harness::new(5, 0);
        h.system.spawn();
        for _ in 0..6 {
            h.tick();
        }
        let late = h.system.spawn();
        assert!(h.tick());
        let survivor = &h.system.invaders()[0];
        assert_eq!(survivor.id(), late);
        assert_eq!(survivor.progress(), 0.0);
    }
}
