use super::role::{Direction, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    Changed { from: Role, to: Role },
    Unchanged,
    Debounced,
    Inactive,
}

/// Which role currently receives births.
///
/// Directional commands are rate-limited by the debounce window; direct
/// picks (the role buttons) are not, and do not stamp the window either.
/// The window counts as opened at t = 0, so nothing directional lands
/// before the first full debounce has passed.
#[derive(Debug, Clone)]
pub struct SelectionState {
    active: Option<Role>,
    last_accepted_at: f64,
    debounce: f64,
}

impl SelectionState {
    pub fn new(initial: Role, debounce: f64) -> Self {
        Self {
            active: Some(initial),
            last_accepted_at: 0.0,
            debounce,
        }
    }

    pub fn active(&self) -> Option<Role> {
        self.active
    }

    pub fn is_active(&self, role: Role) -> bool {
        self.active == Some(role)
    }

    pub fn last_accepted_at(&self) -> f64 {
        self.last_accepted_at
    }

    pub fn apply_direction(&mut self, now: f64, direction: Direction) -> SelectionOutcome {
        let Some(current) = self.active else {
            return SelectionOutcome::Inactive;
        };
        if now - self.last_accepted_at < self.debounce {
            return SelectionOutcome::Debounced;
        }
        self.last_accepted_at = now;
        self.switch_to(current, current.neighbor(direction))
    }

    pub fn select(&mut self, role: Role) -> SelectionOutcome {
        let Some(current) = self.active else {
            return SelectionOutcome::Inactive;
        };
        self.switch_to(current, role)
    }

    /// Terminal: nothing is active once the village has fallen.
    pub fn clear(&mut self) {
        self.active = None;
    }

    fn switch_to(&mut self, current: Role, next: Role) -> SelectionOutcome {
        if current == next {
            return SelectionOutcome::Unchanged;
        }
        self.active = Some(next);
        SelectionOutcome::Changed {
            from: current,
            to: next,
        }
    }
}
