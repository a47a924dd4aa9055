use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Tuning for the on-screen touch widgets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TouchConfig {
    /// Stick displacement below which no direction is reported.
    pub dead_zone: f32,
    /// Stick displacement that maps to full deflection.
    pub max_distance: f32,
    /// Vibration length requested when the jump button is pressed.
    pub haptic_ms: u32,
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self {
            dead_zone: 10.0,
            max_distance: 50.0,
            haptic_ms: 15,
        }
    }
}

/// An active virtual stick: where the finger went down and where it is now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stick {
    pub id: i32,
    pub origin: Vec2,
    pub current: Vec2,
}

/// Left half of the screen is an analog stick, right half a jump button.
#[derive(Debug, Clone)]
pub struct TouchControls {
    config: TouchConfig,
    viewport_width: f32,
    stick: Option<Stick>,
    jump_touch: Option<i32>,
    jump_tapped: bool,
}

impl TouchControls {
    pub fn new(config: TouchConfig, viewport_width: f32) -> Self {
        Self {
            config,
            viewport_width,
            stick: None,
            jump_touch: None,
            jump_tapped: false,
        }
    }

    pub fn set_viewport_width(&mut self, width: f32) {
        self.viewport_width = width;
    }

    /// A finger went down. Returns true when it pressed the jump button.
    pub fn touch_start(&mut self, id: i32, pos: Vec2) -> bool {
        if pos.x < self.viewport_width / 2.0 {
            if self.stick.is_none() {
                self.stick = Some(Stick { id, origin: pos, current: pos });
            }
            false
        } else {
            self.jump_touch = Some(id);
            self.jump_tapped = true;
            true
        }
    }

    pub fn touch_move(&mut self, id: i32, pos: Vec2) {
        if let Some(stick) = self.stick.as_mut().filter(|s| s.id == id) {
            stick.current = pos;
        }
    }

    pub fn touch_end(&mut self, id: i32) {
        if self.stick.is_some_and(|s| s.id == id) {
            self.stick = None;
        }
        if self.jump_touch == Some(id) {
            self.jump_touch = None;
        }
    }

    /// Horizontal deflection in [-1, 1]; 0 inside the dead zone.
    pub fn axis(&self) -> f32 {
        let Some(stick) = self.stick else {
            return 0.0;
        };
        let max = self.config.max_distance;
        let dx = (stick.current.x - stick.origin.x).clamp(-max, max);
        if dx.abs() < self.config.dead_zone {
            0.0
        } else {
            dx / max
        }
    }

    pub fn jump_held(&self) -> bool {
        self.jump_touch.is_some()
    }

    /// Whether the jump button was tapped since the last call.
    pub fn take_jump_tap(&mut self) -> bool {
        std::mem::take(&mut self.jump_tapped)
    }

    pub fn stick(&self) -> Option<Stick> {
        self.stick
    }

    pub fn haptic_ms(&self) -> u32 {
        self.config.haptic_ms
    }

    pub fn reset(&mut self) {
        self.stick = None;
        self.jump_touch = None;
        self.jump_tapped = false;
    }
}
