use serde::Serialize;
use tracing::{debug, info, trace};

use crate::sim::{digits, CounterDigits, InvaderId, InvaderPhase, Role, Simulation, ASCII_DIGITS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    Repelled,
    Breach,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterKind {
    Defense,
    Sparkle,
}

/// What the HUD shows for one role button.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoleView {
    pub count: u32,
    pub digits: CounterDigits,
    pub active: bool,
    pub birth_progress: Option<f32>,
    /// No one left in this role; the button is drawn dimmed.
    pub depleted: bool,
}

impl RoleView {
    pub fn of(sim: &Simulation, role: Role) -> Self {
        let count = sim.display_count(role);
        Self {
            count,
            digits: digits(i64::from(count)),
            active: sim.is_active(role),
            birth_progress: sim.birth_progress(role),
            depleted: count < 1,
        }
    }
}

/// Everything outside the simulation that wants to hear about it: widgets,
/// audio, sprites. All methods default to doing nothing.
pub trait Presenter {
    fn selection_highlight(&mut self, _role: Role, _active: bool) {}
    fn birth_progress(&mut self, _role: Role, _progress: Option<f32>) {}
    fn miner_decay_progress(&mut self, _progress: f32) {}
    fn role_count(&mut self, _role: Role, _view: RoleView) {}
    fn counter(&mut self, _kind: CounterKind, _digits: CounterDigits) {}
    fn play_cue(&mut self, _cue: Cue) {}
    fn invader_spawned(&mut self, _id: InvaderId) {}
    fn invader_moved(&mut self, _id: InvaderId, _phase: InvaderPhase, _progress: f64) {}
    fn invader_removed(&mut self, _id: InvaderId) {}
    fn show_death_overlay(&mut self) {}
    fn stop_ambient_audio(&mut self) {}
    fn sparkle(&mut self) {}
}

/// Logs what a real front end would draw or play. Continuous values
/// (progress bars, invader positions) go to `trace` to keep `debug` readable.
#[derive(Debug, Default)]
pub struct TracingPresenter {
    overlay_shown: bool,
    audio_stopped: bool,
}

impl Presenter for TracingPresenter {
    fn selection_highlight(&mut self, role: Role, active: bool) {
        trace!(role = role.as_str(), active, "selection_highlight");
    }

    fn birth_progress(&mut self, role: Role, progress: Option<f32>) {
        trace!(role = role.as_str(), ?progress, "birth_progress");
    }

    fn miner_decay_progress(&mut self, progress: f32) {
        trace!(progress, "miner_decay_progress");
    }

    fn role_count(&mut self, role: Role, view: RoleView) {
        trace!(
            role = role.as_str(),
            count = %view.digits.render_with(&ASCII_DIGITS),
            active = view.active,
            depleted = view.depleted,
            "role_count"
        );
    }

    fn counter(&mut self, kind: CounterKind, digits: CounterDigits) {
        trace!(
            ?kind,
            value = %digits.render_with(&ASCII_DIGITS),
            "counter"
        );
    }

    fn play_cue(&mut self, cue: Cue) {
        debug!(?cue, "play_cue");
    }

    fn invader_spawned(&mut self, id: InvaderId) {
        debug!(id = id.get(), "invader_visual_spawned");
    }

    fn invader_moved(&mut self, id: InvaderId, phase: InvaderPhase, progress: f64) {
        trace!(id = id.get(), phase = phase.as_str(), progress, "invader_moved");
    }

    fn invader_removed(&mut self, id: InvaderId) {
        debug!(id = id.get(), "invader_visual_removed");
    }

    fn show_death_overlay(&mut self) {
        if !self.overlay_shown {
            self.overlay_shown = true;
            info!("death_overlay_shown");
        }
    }

    fn stop_ambient_audio(&mut self) {
        if !self.audio_stopped {
            self.audio_stopped = true;
            info!("ambient_audio_stopped");
        }
    }

    fn sparkle(&mut self) {
        trace!("sparkle");
    }
}
