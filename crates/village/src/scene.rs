use engine::{InputAction, InputAxis, InputSnapshot, Scene, SceneCommand};
use tracing::info;

use crate::config::{RunConfig, SimConfig};
use crate::present::{CounterKind, Cue, Presenter, RoleView, TracingPresenter};
use crate::sim::{digits, Direction, Role, RunSummary, SimEvent, Simulation, TickInput};

const SLOT_ROLES: [(InputAction, Role); 3] = [
    (InputAction::Slot1, Role::Farmer),
    (InputAction::Slot2, Role::Guard),
    (InputAction::Slot3, Role::Miner),
];

/// Folds arrow keys into the matching analog axis, so a held or tapped key
/// reads as a full deflection.
fn axis_with_keys(
    input: &InputSnapshot,
    axis: InputAxis,
    positive: InputAction,
    negative: InputAction,
) -> f32 {
    let key = |action| input.is_down(action) || input.was_pressed(action);
    let mut value = input.axis(axis);
    if key(positive) {
        value += 1.0;
    }
    if key(negative) {
        value -= 1.0;
    }
    value.clamp(-1.0, 1.0)
}

/// Turns one tick of input into at most one selection command. Horizontal
/// input wins over vertical; deflections at or under `threshold` are ignored.
pub fn resolve_direction(input: &InputSnapshot, threshold: f32) -> Option<Direction> {
    let horizontal = axis_with_keys(
        input,
        InputAxis::Horizontal,
        InputAction::MoveRight,
        InputAction::MoveLeft,
    );
    if horizontal.abs() > threshold {
        return Some(if horizontal > 0.0 {
            Direction::Right
        } else {
            Direction::Left
        });
    }

    let vertical = axis_with_keys(
        input,
        InputAxis::Vertical,
        InputAction::MoveUp,
        InputAction::MoveDown,
    );
    if vertical.abs() > threshold {
        return Some(if vertical > 0.0 {
            Direction::Up
        } else {
            Direction::Down
        });
    }
    None
}

pub struct VillageScene<P: Presenter = TracingPresenter> {
    sim: Simulation,
    presenter: P,
    axis_threshold: f32,
    exit_on_death: bool,
}

impl VillageScene<TracingPresenter> {
    pub fn new(sim_config: SimConfig, run_config: RunConfig) -> Self {
        Self::with_presenter(sim_config, run_config, TracingPresenter::default())
    }
}

impl<P: Presenter> VillageScene<P> {
    pub fn with_presenter(sim_config: SimConfig, run_config: RunConfig, presenter: P) -> Self {
        Self {
            sim: Simulation::new(sim_config),
            presenter,
            axis_threshold: run_config.axis_threshold,
            exit_on_death: run_config.exit_on_death,
        }
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn summary(&self) -> RunSummary {
        self.sim.summary()
    }

    fn dispatch(&mut self, events: Vec<SimEvent>) {
        for event in events {
            match event {
                SimEvent::SelectionChanged { from, to } => {
                    self.presenter.selection_highlight(from, false);
                    self.presenter.selection_highlight(to, true);
                }
                SimEvent::Sparkle { .. } => self.presenter.sparkle(),
                SimEvent::InvaderSpawned { id } => self.presenter.invader_spawned(id),
                SimEvent::Repelled { .. } => self.presenter.play_cue(Cue::Repelled),
                SimEvent::Breached { .. } => self.presenter.play_cue(Cue::Breach),
                SimEvent::InvaderRemoved { id } => self.presenter.invader_removed(id),
                SimEvent::Born { .. }
                | SimEvent::MinerDecayed { .. }
                | SimEvent::MinersDepleted
                | SimEvent::Died => {}
            }
        }
    }

    fn report_dead(&mut self) {
        for role in Role::ALL {
            self.presenter.selection_highlight(role, false);
        }
        self.presenter.show_death_overlay();
        self.presenter.stop_ambient_audio();
    }
}

impl<P: Presenter> Scene for VillageScene<P> {
    fn load(&mut self) {
        info!(
            farmers = self.sim.raw_count(Role::Farmer),
            guards = self.sim.raw_count(Role::Guard),
            miners = self.sim.raw_count(Role::Miner),
            first_invasion_at = self.sim.next_invasion_due(),
            "village_loaded"
        );
        for role in Role::ALL {
            let active = self.sim.is_active(role);
            self.presenter.selection_highlight(role, active);
        }
    }

    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
        if input.quit_requested() {
            return SceneCommand::Quit;
        }

        let pick = SLOT_ROLES
            .iter()
            .rev()
            .find(|(action, _)| input.was_pressed(*action))
            .map(|(_, role)| *role);
        let tick_input = TickInput {
            direction: resolve_direction(input, self.axis_threshold),
            pick,
        };
        self.sim.tick_with(f64::from(fixed_dt_seconds), tick_input);
        let events = self.sim.take_events();
        self.dispatch(events);

        if self.sim.is_dead() {
            self.report_dead();
            if self.exit_on_death {
                return SceneCommand::Quit;
            }
        }
        SceneCommand::None
    }

    fn present(&mut self) {
        for role in Role::ALL {
            let view = RoleView::of(&self.sim, role);
            self.presenter.role_count(role, view);
            self.presenter.birth_progress(role, view.birth_progress);
        }
        let decay = self.sim.miner_decay_progress();
        self.presenter.miner_decay_progress(decay);
        self.presenter.counter(
            CounterKind::Defense,
            digits(i64::from(self.sim.defense_count())),
        );
        self.presenter.counter(
            CounterKind::Sparkle,
            digits(i64::from(self.sim.sparkle_count())),
        );
        for invader in self.sim.invaders() {
            self.presenter
                .invader_moved(invader.id(), invader.phase(), invader.progress());
        }
    }

    fn unload(&mut self) {
        let summary = self.sim.summary();
        info!(
            elapsed_seconds = summary.elapsed_seconds,
            status = ?summary.status,
            defenses = summary.counters.defenses,
            sparkles = summary.counters.sparkles,
            invaders_spawned = summary.invaders.spawned,
            "village_unloaded"
        );
    }

    fn debug_title(&self) -> Option<String> {
        let state = if self.sim.is_dead() { " | DESTROYED" } else { "" };
        Some(format!(
            "Village | F {} G {} M {} | def {} | sparkles {}{}",
            self.sim.display_count(Role::Farmer),
            self.sim.display_count(Role::Guard),
            self.sim.display_count(Role::Miner),
            self.sim.defense_count(),
            self.sim.sparkle_count(),
            state,
        ))
    }
}
