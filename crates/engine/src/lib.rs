//! Headless fixed-timestep runtime: scenes, input snapshots, scripted input
//! and loop metrics.

pub mod app;

pub use app::{
    run_app, AppError, InputAction, InputAxis, InputCollector, InputScript, InputScriptError,
    InputSnapshot, LoopConfig, LoopMetricsSnapshot, RunReport, Scene, SceneCommand, ScriptEntry,
    ScriptedEvent, StopReason,
};
