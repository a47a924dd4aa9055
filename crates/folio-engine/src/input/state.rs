use std::collections::HashSet;

use glam::Vec2;

use super::actions::{Action, Bindings, Key};
use super::queue::InputEvent;
use super::touch::{TouchConfig, TouchControls};

/// Per-frame action snapshot.
///
/// `begin_frame` folds the raw events queued since the previous frame into
/// two views: level (`is_down`) and edge (`pressed`). A key pressed and
/// released between two frames still produces one edge.
#[derive(Debug, Clone)]
pub struct InputState {
    bindings: Bindings,
    held_keys: HashSet<Key>,
    down: [bool; Action::COUNT],
    prev_down: [bool; Action::COUNT],
    pressed: [bool; Action::COUNT],
    latched: [bool; Action::COUNT],
    touch: TouchControls,
    haptic: Vec<u32>,
}

impl InputState {
    pub fn new(bindings: Bindings, touch: TouchConfig, viewport: Vec2) -> Self {
        Self {
            bindings,
            held_keys: HashSet::new(),
            down: [false; Action::COUNT],
            prev_down: [false; Action::COUNT],
            pressed: [false; Action::COUNT],
            latched: [false; Action::COUNT],
            touch: TouchControls::new(touch, viewport.x),
            haptic: Vec::new(),
        }
    }

    pub fn set_viewport(&mut self, viewport: Vec2) {
        self.touch.set_viewport_width(viewport.x);
    }

    /// Apply queued events and recompute this frame's level and edge sets.
    pub fn begin_frame(&mut self, events: impl IntoIterator<Item = InputEvent>) {
        for event in events {
            self.apply(event);
        }

        if self.touch.take_jump_tap() {
            self.latched[Action::Jump.index()] = true;
        }

        let axis = self.touch.axis();
        let mut down = [false; Action::COUNT];
        for key in &self.held_keys {
            if let Some(action) = self.bindings.action_for(*key) {
                down[action.index()] = true;
            }
        }
        down[Action::Left.index()] |= axis < 0.0;
        down[Action::Right.index()] |= axis > 0.0;
        down[Action::Jump.index()] |= self.touch.jump_held();

        for i in 0..Action::COUNT {
            self.pressed[i] = self.latched[i] || (down[i] && !self.prev_down[i]);
        }
        self.latched = [false; Action::COUNT];
        self.prev_down = down;
        self.down = down;
    }

    fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyDown { key } => {
                // Auto-repeat keydowns are not new presses.
                if self.held_keys.insert(key) {
                    if let Some(action) = self.bindings.action_for(key) {
                        self.latched[action.index()] = true;
                    }
                }
            }
            InputEvent::KeyUp { key } => {
                self.held_keys.remove(&key);
            }
            InputEvent::TouchStart { id, x, y } => {
                if self.touch.touch_start(id, Vec2::new(x, y)) {
                    self.haptic.push(self.touch.haptic_ms());
                }
            }
            InputEvent::TouchMove { id, x, y } => self.touch.touch_move(id, Vec2::new(x, y)),
            InputEvent::TouchEnd { id } => self.touch.touch_end(id),
            InputEvent::Blur => self.clear(),
        }
    }

    /// Release everything held.
    pub fn clear(&mut self) {
        self.held_keys.clear();
        self.touch.reset();
        self.latched = [false; Action::COUNT];
        self.down = [false; Action::COUNT];
        self.prev_down = [false; Action::COUNT];
        self.pressed = [false; Action::COUNT];
    }

    /// Level-triggered: the action is held this frame.
    pub fn is_down(&self, action: Action) -> bool {
        self.down[action.index()]
    }

    /// Edge-triggered: the action went down since the previous frame.
    pub fn pressed(&self, action: Action) -> bool {
        self.pressed[action.index()]
    }

    /// Held, or tapped so briefly that it is already released.
    pub fn is_active(&self, action: Action) -> bool {
        self.is_down(action) || self.pressed(action)
    }

    /// Horizontal intent in [-1, 1] from keys and stick combined.
    pub fn horizontal(&self) -> f32 {
        let keys = (self.is_down(Action::Right) as i32 - self.is_down(Action::Left) as i32) as f32;
        let stick = self.touch.axis();
        if stick != 0.0 {
            stick
        } else {
            keys
        }
    }

    /// Vibration requests raised by touch presses since the last call.
    pub fn take_haptic_requests(&mut self) -> Vec<u32> {
        std::mem::take(&mut self.haptic)
    }

    pub fn touch(&self) -> &TouchControls {
        &self.touch
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new(Bindings::default(), TouchConfig::default(), Vec2::new(800.0, 600.0))
    }
}
