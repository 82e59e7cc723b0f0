use std::time::{Duration, Instant};

use serde::Serialize;

/// Loop rates over one reporting window. The last window of a run ends up
/// in `RunReport::metrics`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LoopMetricsSnapshot {
    pub fps: f32,
    pub tps: f32,
    pub frame_time_ms: f32,
    pub clamp_events: u32,
}

/// Counts frames, ticks and dropped backlogs until the window closes.
#[derive(Debug)]
pub(crate) struct MetricsWindow {
    opened_at: Instant,
    length: Duration,
    frames: u32,
    ticks: u32,
    clamps: u32,
    frame_time: Duration,
}

impl MetricsWindow {
    pub(crate) fn open(opened_at: Instant, length: Duration) -> Self {
        Self {
            opened_at,
            length,
            frames: 0,
            ticks: 0,
            clamps: 0,
            frame_time: Duration::ZERO,
        }
    }

    pub(crate) fn frame(&mut self, frame_dt: Duration) {
        self.frames = self.frames.saturating_add(1);
        self.frame_time = self.frame_time.saturating_add(frame_dt);
    }

    pub(crate) fn tick(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
    }

    pub(crate) fn clamp(&mut self) {
        self.clamps = self.clamps.saturating_add(1);
    }

    /// Closes the window and opens the next one if `now` is past its end.
    pub(crate) fn roll(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        if now.saturating_duration_since(self.opened_at) < self.length {
            return None;
        }
        Some(self.close(now))
    }

    /// Closes the window regardless of its length, e.g. at shutdown.
    pub(crate) fn close(&mut self, now: Instant) -> LoopMetricsSnapshot {
        let seconds = now
            .saturating_duration_since(self.opened_at)
            .as_secs_f64()
            .max(f64::EPSILON);
        let frame_time_ms = match self.frames {
            0 => 0.0,
            frames => self.frame_time.as_secs_f64() * 1000.0 / f64::from(frames),
        };
        let snapshot = LoopMetricsSnapshot {
            fps: (f64::from(self.frames) / seconds) as f32,
            tps: (f64::from(self.ticks) / seconds) as f32,
            frame_time_ms: frame_time_ms as f32,
            clamp_events: self.clamps,
        };
        *self = Self::open(now, self.length);
        snapshot
    }
}
