mod input;
mod input_script;
mod loop_runner;
mod metrics;
mod scene;

pub use input::{InputAction, InputAxis, InputCollector, InputSnapshot};
pub use input_script::{InputScript, InputScriptError, ScriptEntry, ScriptedEvent};
pub use loop_runner::{run_app, AppError, LoopConfig, RunReport, StopReason};
pub use metrics::LoopMetricsSnapshot;
pub use scene::{Scene, SceneCommand};
