//! Tick-driven village simulation: three producing roles, births, miner
//! decay, recurring invasions and the fall of the village.

pub mod config;
pub mod present;
pub mod scene;
pub mod sim;

pub use config::{ConfigError, RunConfig, SimConfig, VillageConfig};
pub use present::{CounterKind, Cue, Presenter, RoleView, TracingPresenter};
pub use scene::{resolve_direction, VillageScene};
pub use sim::{Direction, Role, RunSummary, SimEvent, Simulation, SimulationStatus, TickInput};
