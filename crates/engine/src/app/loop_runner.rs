use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use super::input::InputCollector;
use super::input_script::{InputScript, InputScriptError};
use super::metrics::MetricsWindow;
use super::scene::SceneRuntime;
use super::{LoopMetricsSnapshot, Scene, SceneCommand};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    /// Pace ticks against the wall clock. When false the loop feeds exactly
    /// one fixed step per frame and runs as fast as the scene allows.
    pub realtime: bool,
    pub max_sim_seconds: Option<f32>,
    pub input_script: Option<PathBuf>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
            realtime: false,
            max_sim_seconds: None,
            input_script: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to load input script: {0}")]
    InputScript(#[from] InputScriptError),
    #[error("headless runs need a simulated time limit (max_sim_seconds)")]
    UnboundedHeadlessRun,
    #[error("simulated time limit must be a positive number of seconds, got {seconds}")]
    InvalidTimeLimit { seconds: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    SceneQuit,
    TimeLimit,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RunReport {
    pub ticks: u64,
    pub sim_seconds: f64,
    pub stop_reason: StopReason,
    pub metrics: LoopMetricsSnapshot,
}

pub fn run_app(config: LoopConfig, scene: &mut dyn Scene) -> Result<RunReport, AppError> {
    let max_sim_seconds = validate_time_limit(config.realtime, config.max_sim_seconds)?;
    let mut script = match &config.input_script {
        Some(path) => {
            let script = InputScript::load(path)?;
            info!(
                path = %path.display(),
                entries = script.entries().len(),
                "input_script_loaded"
            );
            script
        }
        None => InputScript::default(),
    };

    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let fixed_dt_seconds = fixed_dt.as_secs_f32();

    info!(
        target_tps,
        realtime = config.realtime,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        max_sim_seconds = %format_time_limit(max_sim_seconds),
        "loop_config"
    );

    let mut runtime = SceneRuntime::new(scene);
    runtime.load();
    info!("scene_loaded");

    let mut input_collector = InputCollector::new();
    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut metrics = MetricsWindow::open(last_frame_instant, metrics_log_interval);
    let mut last_logged_title: Option<String> = None;
    let mut ticks = 0u64;
    let mut stop_reason: Option<StopReason> = None;

    while stop_reason.is_none() {
        let now = Instant::now();
        let raw_frame_dt = if config.realtime {
            now.saturating_duration_since(last_frame_instant)
        } else {
            fixed_dt
        };
        last_frame_instant = now;

        let clamped_frame_dt = clamp_frame_delta(raw_frame_dt, max_frame_delta);
        accumulator = accumulator.saturating_add(clamped_frame_dt);

        let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
        for _ in 0..step_plan.ticks_to_run {
            script.apply_due(sim_time_seconds(ticks, fixed_dt) as f32, &mut input_collector);
            let input_snapshot = input_collector.snapshot_for_tick();
            let command = runtime.update(fixed_dt_seconds, &input_snapshot);
            ticks = ticks.saturating_add(1);
            metrics.tick();

            if command == SceneCommand::Quit {
                info!(reason = "scene_quit", ticks, "shutdown_requested");
                stop_reason = Some(StopReason::SceneQuit);
                break;
            }
            if let Some(limit) = max_sim_seconds {
                if sim_time_seconds(ticks, fixed_dt) >= limit {
                    info!(reason = "time_limit", ticks, "shutdown_requested");
                    stop_reason = Some(StopReason::TimeLimit);
                    break;
                }
            }
        }
        accumulator = step_plan.remaining_accumulator;

        if step_plan.dropped_backlog > Duration::ZERO {
            metrics.clamp();
            warn!(
                dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                max_ticks_per_frame, "sim_clamp_triggered"
            );
        }

        runtime.present();

        let next_title = runtime.debug_title();
        if next_title != last_logged_title {
            if let Some(title) = &next_title {
                info!(title = title.as_str(), "scene_title");
            }
            last_logged_title = next_title;
        }

        metrics.frame(raw_frame_dt);
        if let Some(snapshot) = metrics.roll(now) {
            info!(
                fps = snapshot.fps,
                tps = snapshot.tps,
                frame_time_ms = snapshot.frame_time_ms,
                clamp_events = snapshot.clamp_events,
                ticks,
                "loop_metrics"
            );
        }

        if config.realtime && stop_reason.is_none() {
            // Only sleep point: wait out the rest of the next fixed step.
            let wait = time_until_next_step(accumulator, fixed_dt, now.elapsed());
            if wait > Duration::ZERO {
                thread::sleep(wait);
            }
        }
    }

    let final_metrics = metrics.close(Instant::now());
    runtime.shutdown();
    let sim_seconds = sim_time_seconds(ticks, fixed_dt);
    info!(ticks, sim_seconds, "shutdown");

    Ok(RunReport {
        ticks,
        sim_seconds,
        stop_reason: stop_reason.unwrap_or(StopReason::SceneQuit),
        metrics: final_metrics,
    })
}

fn validate_time_limit(realtime: bool, limit: Option<f32>) -> Result<Option<f64>, AppError> {
    match limit {
        Some(seconds) if !seconds.is_finite() || seconds <= 0.0 => {
            Err(AppError::InvalidTimeLimit { seconds })
        }
        Some(seconds) => Ok(Some(seconds as f64)),
        None if realtime => Ok(None),
        None => Err(AppError::UnboundedHeadlessRun),
    }
}

fn sim_time_seconds(ticks: u64, fixed_dt: Duration) -> f64 {
    ticks as f64 * fixed_dt.as_secs_f64()
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    if accumulator >= fixed_dt {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog: accumulator,
        }
    } else {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: accumulator,
            dropped_backlog: Duration::ZERO,
        }
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

/// Wall time left before the accumulator holds a full step, minus what the
/// current frame has already spent.
fn time_until_next_step(accumulator: Duration, fixed_dt: Duration, spent: Duration) -> Duration {
    fixed_dt.saturating_sub(accumulator).saturating_sub(spent)
}

fn format_time_limit(limit: Option<f64>) -> String {
    match limit {
        Some(seconds) => format!("{seconds}s"),
        None => "none".to_string(),
    }
}
