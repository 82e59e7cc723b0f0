mod clock;
mod counter;
mod decay;
mod events;
mod invasion;
mod population;
mod role;
mod selection;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::info;

use crate::config::SimConfig;

pub use clock::Clock;
pub use counter::{digits, CounterDigits, ASCII_DIGITS};
pub use decay::MinerDecayScheduler;
pub use events::SimEvent;
pub use invasion::{
    interval_bounds, Invader, InvaderId, InvaderPhase, InvasionStats, InvasionSystem,
};
pub use population::{BirthScheduler, Counters, PopulationLedger};
pub use role::{Direction, Role};
pub use selection::{SelectionOutcome, SelectionState};

const INITIAL_ROLE: Role = Role::Farmer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationStatus {
    Running,
    Dead,
}

/// Selection requests gathered for one tick. Both are applied after the
/// clock has moved, the direct pick first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub direction: Option<Direction>,
    pub pick: Option<Role>,
}

/// Snapshot of a run, written out when the binary shuts down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunSummary {
    pub elapsed_seconds: f64,
    pub status: SimulationStatus,
    pub active_role: Option<Role>,
    pub population: PopulationLedger,
    pub counters: Counters,
    pub invaders: InvasionStats,
}

/// The whole village. Every tick runs in a fixed order: the clock moves,
/// the pending selection command is applied, invaders spawn and walk, then
/// births and miner decay catch up to the new time.
///
/// Once the village falls the simulation is frozen: ticks still return,
/// but the clock stops and no count changes again.
#[derive(Debug, Clone)]
pub struct Simulation {
    clock: Clock,
    status: SimulationStatus,
    selection: SelectionState,
    ledger: PopulationLedger,
    births: BirthScheduler,
    decay: MinerDecayScheduler,
    invasion: InvasionSystem,
    counters: Counters,
    rng: ChaCha8Rng,
    events: Vec<SimEvent>,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Self {
        Self {
            clock: Clock::default(),
            status: SimulationStatus::Running,
            selection: SelectionState::new(INITIAL_ROLE, config.selection_debounce),
            ledger: PopulationLedger::new(config.initial_population),
            births: BirthScheduler::new(config.birth_intervals, INITIAL_ROLE),
            decay: MinerDecayScheduler::new(config.mining),
            invasion: InvasionSystem::new(config.invasion),
            counters: Counters::default(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            events: Vec::new(),
        }
    }

    pub fn advance(&mut self, delta_seconds: f64) -> SimulationStatus {
        self.tick_with(delta_seconds, TickInput::default())
    }

    pub fn tick(&mut self, delta_seconds: f64, direction: Option<Direction>) -> SimulationStatus {
        self.tick_with(
            delta_seconds,
            TickInput {
                direction,
                pick: None,
            },
        )
    }

    pub fn tick_with(&mut self, delta_seconds: f64, input: TickInput) -> SimulationStatus {
        if self.is_dead() {
            return self.status;
        }

        let now = self.clock.advance(delta_seconds);
        if let Some(role) = input.pick {
            self.select_role(role);
        }
        if let Some(direction) = input.direction {
            self.select_direction(direction);
        }

        let fallen = self.invasion.tick(
            now,
            &mut self.ledger,
            &mut self.counters,
            &mut self.rng,
            &mut self.events,
        );
        if fallen {
            self.fall();
            return self.status;
        }

        if let Some(role) = self.selection.active() {
            self.births.fire_due(now, role, &mut self.ledger, &mut self.events);
        }
        self.decay
            .tick(now, &mut self.ledger, &mut self.counters, &mut self.events);
        self.status
    }

    /// Applies a directional command at the current time, subject to the
    /// selection debounce.
    pub fn select_direction(&mut self, direction: Direction) -> SelectionOutcome {
        let now = self.clock.now();
        let outcome = self.selection.apply_direction(now, direction);
        self.on_selection(now, outcome);
        outcome
    }

    /// Picks a role directly. Not debounced.
    pub fn select_role(&mut self, role: Role) -> SelectionOutcome {
        let outcome = self.selection.select(role);
        self.on_selection(self.clock.now(), outcome);
        outcome
    }

    fn on_selection(&mut self, now: f64, outcome: SelectionOutcome) {
        if let SelectionOutcome::Changed { from, to } = outcome {
            self.births.rearm(now, to);
            info!(
                from = from.as_str(),
                to = to.as_str(),
                next_birth_due = self.births.next_due(),
                "selection_changed"
            );
            self.events.push(SimEvent::SelectionChanged { from, to });
        }
    }

    fn fall(&mut self) {
        self.status = SimulationStatus::Dead;
        self.selection.clear();
        info!(
            now = self.clock.now(),
            farmers_raw = self.ledger.raw(Role::Farmer),
            defenses = self.counters.defenses,
            sparkles = self.counters.sparkles,
            "village_fallen"
        );
        self.events.push(SimEvent::Died);
    }

    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    pub fn status(&self) -> SimulationStatus {
        self.status
    }

    pub fn is_dead(&self) -> bool {
        self.status == SimulationStatus::Dead
    }

    pub fn active_role(&self) -> Option<Role> {
        self.selection.active()
    }

    pub fn is_active(&self, role: Role) -> bool {
        self.selection.is_active(role)
    }

    pub fn display_count(&self, role: Role) -> u32 {
        self.ledger.display_count(role)
    }

    pub fn raw_count(&self, role: Role) -> i32 {
        self.ledger.raw(role)
    }

    pub fn defense_count(&self) -> u32 {
        self.counters.defenses
    }

    pub fn sparkle_count(&self) -> u32 {
        self.counters.sparkles
    }

    /// Progress toward the next birth, only for the role receiving births.
    pub fn birth_progress(&self, role: Role) -> Option<f32> {
        self.is_active(role)
            .then(|| self.births.progress(self.clock.now(), role))
    }

    pub fn miner_decay_progress(&self) -> f32 {
        self.decay.progress(self.clock.now(), self.ledger.raw(Role::Miner))
    }

    pub fn next_birth_due(&self) -> f64 {
        self.births.next_due()
    }

    pub fn next_decay_due(&self) -> f64 {
        self.decay.next_due()
    }

    pub fn next_invasion_due(&self) -> f64 {
        self.invasion.next_due()
    }

    pub fn invaders(&self) -> &[Invader] {
        self.invasion.invaders()
    }

    pub fn invasion_stats(&self) -> InvasionStats {
        self.invasion.stats()
    }

    pub fn take_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            elapsed_seconds: self.clock.now(),
            status: self.status,
            active_role: self.selection.active(),
            population: self.ledger,
            counters: self.counters,
            invaders: self.invasion.stats(),
        }
    }
}
