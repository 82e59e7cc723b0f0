use super::input::InputSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Quit,
}

/// A unit of game logic driven by the fixed-step loop.
///
/// `update` runs once per simulation tick with the tick's input snapshot;
/// `present` runs once per frame after all of that frame's ticks, and is
/// where a scene pushes its current state out to whatever sinks it owns.
pub trait Scene {
    fn load(&mut self);
    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand;
    fn present(&mut self);
    fn unload(&mut self);
    fn debug_title(&self) -> Option<String> {
        None
    }
}

/// Tracks whether the wrapped scene has been loaded so `load`/`unload` run
/// exactly once each regardless of how the loop exits.
pub(crate) struct SceneRuntime<'a> {
    scene: &'a mut dyn Scene,
    is_loaded: bool,
}

impl<'a> SceneRuntime<'a> {
    pub(crate) fn new(scene: &'a mut dyn Scene) -> Self {
        Self {
            scene,
            is_loaded: false,
        }
    }

    pub(crate) fn load(&mut self) {
        if self.is_loaded {
            return;
        }
        self.scene.load();
        self.is_loaded = true;
    }

    pub(crate) fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
        self.scene.update(fixed_dt_seconds, input)
    }

    pub(crate) fn present(&mut self) {
        self.scene.present();
    }

    pub(crate) fn debug_title(&self) -> Option<String> {
        self.scene.debug_title()
    }

    pub(crate) fn shutdown(&mut self) {
        if !self.is_loaded {
            return;
        }
        self.scene.unload();
        self.is_loaded = false;
    }
}
