use tracing::debug;

use super::events::SimEvent;
use super::population::{Counters, PopulationLedger};
use super::role::Role;
use crate::config::MiningConfig;

/// Miners wander off on a fixed interval; while any remain they also
/// produce sparkles at a rate proportional to their (capped) number.
///
/// With no miners the scheduler idles: the decay deadline and the sparkle
/// reference are pinned to `now` every tick, so the first miner to arrive
/// gets a full interval before decaying.
#[derive(Debug, Clone)]
pub struct MinerDecayScheduler {
    config: MiningConfig,
    next_due: f64,
    last_produced: f64,
}

impl MinerDecayScheduler {
    pub fn new(config: MiningConfig) -> Self {
        Self {
            config,
            next_due: config.decay_interval,
            last_produced: 0.0,
        }
    }

    pub fn next_due(&self) -> f64 {
        self.next_due
    }

    pub fn last_produced(&self) -> f64 {
        self.last_produced
    }

    pub fn sparkle_period(&self, miners: i32) -> f64 {
        let rate = miners.clamp(1, self.config.max_rate_miners.max(1));
        self.config.sparkle_scale / f64::from(rate)
    }

    pub fn tick(
        &mut self,
        now: f64,
        ledger: &mut PopulationLedger,
        counters: &mut Counters,
        events: &mut Vec<SimEvent>,
    ) {
        while now >= self.next_due {
            if !ledger.decay_miner() {
                break;
            }
            self.next_due += self.config.decay_interval;
            let remaining = ledger.raw(Role::Miner);
            debug!(remaining, next_due = self.next_due, "miner_decayed");
            events.push(SimEvent::MinerDecayed { remaining });
            if remaining == 0 {
                events.push(SimEvent::MinersDepleted);
                break;
            }
        }

        let miners = ledger.raw(Role::Miner);
        if miners <= 0 {
            self.next_due = now + self.config.decay_interval;
            self.last_produced = now;
            return;
        }

        let period = self.sparkle_period(miners);
        while now >= self.last_produced + period {
            counters.sparkles = counters.sparkles.saturating_add(1);
            self.last_produced += period;
            events.push(SimEvent::Sparkle {
                total: counters.sparkles,
            });
        }
    }

    /// Fraction of the current decay interval already elapsed; zero while
    /// there are no miners to lose. This counts up toward the next loss, so
    /// a countdown bar wants `1.0 - progress`.
    pub fn progress(&self, now: f64, miners: i32) -> f32 {
        if miners <= 0 {
            return 0.0;
        }
        let interval = self.config.decay_interval;
        ((now - (self.next_due - interval)) / interval).clamp(0.0, 1.0) as f32
    }
}
