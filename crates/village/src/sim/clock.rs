/// Monotonic elapsed-time accumulator shared by every timer in a run.
///
/// Kept in `f64`: deadlines are advanced by sub-second steps long after
/// `f32` would have stopped resolving them.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Clock {
    now: f64,
}

impl Clock {
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Negative and non-finite deltas are ignored so time never runs backwards.
    pub fn advance(&mut self, delta_seconds: f64) -> f64 {
        if delta_seconds.is_finite() && delta_seconds > 0.0 {
            self.now += delta_seconds;
        }
        self.now
    }
}
