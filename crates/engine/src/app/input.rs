#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Slot1,
    Slot2,
    Slot3,
    Quit,
}

const ACTION_COUNT: usize = 8;

impl InputAction {
    pub const ALL: [InputAction; ACTION_COUNT] = [
        InputAction::MoveUp,
        InputAction::MoveDown,
        InputAction::MoveLeft,
        InputAction::MoveRight,
        InputAction::Slot1,
        InputAction::Slot2,
        InputAction::Slot3,
        InputAction::Quit,
    ];

    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Slot1 => 4,
            InputAction::Slot2 => 5,
            InputAction::Slot3 => 6,
            InputAction::Quit => 7,
        }
    }

    /// Parses the script/CLI token for an action. WASD letters are accepted
    /// alongside the arrow names, digits alongside the slot names.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "up" | "w" => Some(InputAction::MoveUp),
            "down" | "s" => Some(InputAction::MoveDown),
            "left" | "a" => Some(InputAction::MoveLeft),
            "right" | "d" => Some(InputAction::MoveRight),
            "slot1" | "1" => Some(InputAction::Slot1),
            "slot2" | "2" => Some(InputAction::Slot2),
            "slot3" | "3" => Some(InputAction::Slot3),
            "quit" | "escape" => Some(InputAction::Quit),
            _ => None,
        }
    }

    pub fn as_token(self) -> &'static str {
        match self {
            InputAction::MoveUp => "up",
            InputAction::MoveDown => "down",
            InputAction::MoveLeft => "left",
            InputAction::MoveRight => "right",
            InputAction::Slot1 => "slot1",
            InputAction::Slot2 => "slot2",
            InputAction::Slot3 => "slot3",
            InputAction::Quit => "quit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAxis {
    Horizontal,
    Vertical,
}

impl InputAxis {
    const fn index(self) -> usize {
        match self {
            InputAxis::Horizontal => 0,
            InputAxis::Vertical => 1,
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "horizontal" | "x" => Some(InputAxis::Horizontal),
            "vertical" | "y" => Some(InputAxis::Vertical),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }

    pub(crate) fn clear(&mut self) {
        self.down = [false; ACTION_COUNT];
    }
}

/// Analog axis values, each clamped to `[-1, 1]`.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct AxisStates {
    values: [f32; 2],
}

impl AxisStates {
    pub(crate) fn set(&mut self, axis: InputAxis, value: f32) {
        self.values[axis.index()] = clamp_axis_value(value);
    }

    pub(crate) fn value(&self, axis: InputAxis) -> f32 {
        self.values[axis.index()]
    }
}

fn clamp_axis_value(value: f32) -> f32 {
    if !value.is_finite() {
        return 0.0;
    }
    value.clamp(-1.0, 1.0)
}

/// Accumulates raw device events between ticks and hands out one
/// [`InputSnapshot`] per simulation tick. Press edges are reported for
/// exactly one snapshot; held actions stay down until released.
#[derive(Debug, Default)]
pub struct InputCollector {
    quit_requested: bool,
    held: ActionStates,
    pressed_edges: ActionStates,
    axes: AxisStates,
}

impl InputCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    pub fn handle_action(&mut self, action: InputAction, is_pressed: bool) {
        if is_pressed {
            if !self.held.is_down(action) {
                self.pressed_edges.set(action, true);
            }
            if action == InputAction::Quit {
                self.mark_quit_requested();
            }
        }
        self.held.set(action, is_pressed);
    }

    /// Press and release inside the same tick window: the edge is reported,
    /// the action is not left held.
    pub fn tap_action(&mut self, action: InputAction) {
        self.pressed_edges.set(action, true);
        if action == InputAction::Quit {
            self.mark_quit_requested();
        }
    }

    pub fn set_axis(&mut self, axis: InputAxis, value: f32) {
        self.axes.set(axis, value);
    }

    pub fn snapshot_for_tick(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot::new(
            self.quit_requested,
            self.held,
            self.pressed_edges,
            self.axes,
        );
        self.pressed_edges.clear();
        snapshot
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    held: ActionStates,
    pressed: ActionStates,
    axes: AxisStates,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        quit_requested: bool,
        held: ActionStates,
        pressed: ActionStates,
        axes: AxisStates,
    ) -> Self {
        Self {
            quit_requested,
            held,
            pressed,
            axes,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.held.is_down(action)
    }

    pub fn was_pressed(&self, action: InputAction) -> bool {
        self.pressed.is_down(action)
    }

    pub fn axis(&self, axis: InputAxis) -> f32 {
        self.axes.value(axis)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.held.set(action, is_down);
        self
    }

    pub fn with_action_pressed(mut self, action: InputAction) -> Self {
        self.pressed.set(action, true);
        self
    }

    pub fn with_axis(mut self, axis: InputAxis, value: f32) -> Self {
        self.axes.set(axis, value);
        self
    }

    pub fn with_quit_requested(mut self, quit_requested: bool) -> Self {
        self.quit_requested = quit_requested;
        self
    }
}
