use serde::Serialize;
use tracing::debug;

use super::events::SimEvent;
use super::role::Role;
use crate::config::{BirthIntervals, InitialPopulation};

/// Raw per-role head counts.
///
/// Guards and miners are only ever decremented through guarded helpers and
/// never drop below zero. Farmers are decremented in bulk by breaches and
/// may go negative: the raw value is the death test, display clamps it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PopulationLedger {
    farmers: i32,
    guards: i32,
    miners: i32,
}

impl PopulationLedger {
    pub fn new(initial: InitialPopulation) -> Self {
        Self {
            farmers: initial.farmers,
            guards: initial.guards.max(0),
            miners: initial.miners.max(0),
        }
    }

    pub fn raw(&self, role: Role) -> i32 {
        match role {
            Role::Farmer => self.farmers,
            Role::Guard => self.guards,
            Role::Miner => self.miners,
        }
    }

    pub fn display_count(&self, role: Role) -> u32 {
        self.raw(role).max(0) as u32
    }

    pub fn increment(&mut self, role: Role) -> i32 {
        let slot = self.slot_mut(role);
        *slot = slot.saturating_add(1);
        *slot
    }

    /// Takes one guard off the wall if any are standing.
    pub fn consume_guard(&mut self) -> bool {
        if self.guards > 0 {
            self.guards -= 1;
            true
        } else {
            false
        }
    }

    /// Removes one miner; a no-op at zero.
    pub fn decay_miner(&mut self) -> bool {
        if self.miners > 0 {
            self.miners -= 1;
            true
        } else {
            false
        }
    }

    /// Applies a breach and returns the raw farmer count afterwards.
    pub fn apply_breach(&mut self, farmer_cost: i32) -> i32 {
        self.farmers = self.farmers.saturating_sub(farmer_cost);
        self.farmers
    }

    fn slot_mut(&mut self, role: Role) -> &mut i32 {
        match role {
            Role::Farmer => &mut self.farmers,
            Role::Guard => &mut self.guards,
            Role::Miner => &mut self.miners,
        }
    }
}

/// Monotonic run counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    pub defenses: u32,
    pub sparkles: u32,
}

/// Births for the active role. The deadline is re-armed by adding the
/// interval, never by resetting from `now`, so long frames still produce
/// every birth that fell inside them.
#[derive(Debug, Clone)]
pub struct BirthScheduler {
    intervals: BirthIntervals,
    next_due: f64,
}

impl BirthScheduler {
    pub fn new(intervals: BirthIntervals, first_role: Role) -> Self {
        Self {
            intervals,
            next_due: intervals.for_role(first_role),
        }
    }

    pub fn next_due(&self) -> f64 {
        self.next_due
    }

    pub fn interval(&self, role: Role) -> f64 {
        self.intervals.for_role(role)
    }

    /// Drops progress toward the previous role's birth.
    pub fn rearm(&mut self, now: f64, role: Role) {
        self.next_due = now + self.intervals.for_role(role);
    }

    pub fn fire_due(
        &mut self,
        now: f64,
        role: Role,
        ledger: &mut PopulationLedger,
        events: &mut Vec<SimEvent>,
    ) -> u32 {
        let interval = self.intervals.for_role(role);
        let mut births = 0u32;
        while now >= self.next_due {
            let count = ledger.increment(role);
            self.next_due += interval;
            births += 1;
            debug!(role = role.as_str(), count, next_due = self.next_due, "birth");
            events.push(SimEvent::Born { role, count });
        }
        births
    }

    /// Fraction of the current interval already elapsed, in `[0, 1]`.
    /// It fills toward the next birth; a bar that drains instead shows
    /// `1.0 - progress`.
    pub fn progress(&self, now: f64, role: Role) -> f32 {
        let interval = self.intervals.for_role(role);
        ((now - (self.next_due - interval)) / interval).clamp(0.0, 1.0) as f32
    }
}
