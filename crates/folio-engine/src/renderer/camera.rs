use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::time::frame_scale;
use crate::extensions::{Easing, Tween};
use crate::renderer::surface::DrawSurface;
use crate::systems::rng::Rng;

/// Canned shake strengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShakePreset {
    Light,
    Medium,
    Heavy,
}

impl ShakePreset {
    /// `(intensity in pixels, duration in ms)`.
    pub fn params(self) -> (f32, f32) {
        match self {
            ShakePreset::Light => (3.0, 150.0),
            ShakePreset::Medium => (6.0, 250.0),
            ShakePreset::Heavy => (12.0, 400.0),
        }
    }
}

/// Camera tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CameraConfig {
    /// Fraction of the remaining distance covered per 60 Hz frame.
    pub smoothing: f32,
    /// Same, for zoom.
    pub zoom_smoothing: f32,
    /// Zoom counts as settled inside this distance from its target.
    pub zoom_epsilon: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            smoothing: 0.1,
            zoom_smoothing: 0.08,
            zoom_epsilon: 0.01,
        }
    }
}

/// World rectangle the camera may show.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

#[derive(Debug, Clone, Copy, Default)]
struct Shake {
    intensity: f32,
    duration_ms: f32,
    elapsed_ms: f32,
    offset: Vec2,
    active: bool,
}

/// Side-scrolling 2D camera. `pos` is the world coordinate of the viewport's
/// top-left corner.
///
/// After every `follow`/`update`/`resize`, `pos` lies in
/// `[min_x, max_x - viewport.w] × [min_y, max_y - viewport.h]` (inclusive).
/// On an axis where the viewport is larger than the bounds, the camera centers
/// the bounds instead.
#[derive(Debug, Clone)]
pub struct Camera {
    pos: Vec2,
    target_pos: Vec2,
    viewport: Vec2,
    bounds: Bounds,
    config: CameraConfig,
    zoom: f32,
    target_zoom: f32,
    zoom_tween: Option<Tween>,
    shake: Shake,
    rng: Rng,
}

impl Camera {
    pub fn new(viewport: Vec2, bounds: Bounds, config: CameraConfig, seed: u64) -> Self {
        let mut cam = Self {
            pos: Vec2::ZERO,
            target_pos: Vec2::ZERO,
            viewport,
            bounds,
            config,
            zoom: 1.0,
            target_zoom: 1.0,
            zoom_tween: None,
            shake: Shake::default(),
            rng: Rng::new(seed.wrapping_add(104_729)),
        };
        cam.pos = cam.clamp(cam.pos);
        cam.target_pos = cam.pos;
        cam
    }

    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    pub fn target_pos(&self) -> Vec2 {
        self.target_pos
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn target_zoom(&self) -> f32 {
        self.target_zoom
    }

    pub fn is_zoom_settled(&self) -> bool {
        self.zoom_tween.is_none() && (self.target_zoom - self.zoom).abs() < self.config.zoom_epsilon
    }

    pub fn shake_offset(&self) -> Vec2 {
        self.shake.offset
    }

    pub fn is_shaking(&self) -> bool {
        self.shake.active
    }

    /// Aim the viewport center at `target`.
    pub fn follow(&mut self, target: Vec2) {
        self.target_pos = self.clamp(target - self.viewport / 2.0);
    }

    /// Jump straight to `target` without smoothing.
    pub fn snap_to(&mut self, target: Vec2) {
        self.follow(target);
        self.pos = self.target_pos;
    }

    /// Advance smoothing, zoom and shake by `dt_ms`.
    pub fn update(&mut self, dt_ms: f32) {
        let scale = frame_scale(dt_ms.max(0.0));

        let f = 1.0 - (1.0 - self.config.smoothing).powf(scale);
        self.pos += (self.target_pos - self.pos) * f;
        self.pos = self.clamp(self.pos);

        if let Some(tween) = self.zoom_tween.as_mut() {
            let done = tween.advance(dt_ms);
            self.zoom = tween.value();
            if done {
                self.zoom = self.target_zoom;
                self.zoom_tween = None;
            }
        } else if (self.target_zoom - self.zoom).abs() < self.config.zoom_epsilon {
            self.zoom = self.target_zoom;
        } else {
            let zf = 1.0 - (1.0 - self.config.zoom_smoothing).powf(scale);
            self.zoom += (self.target_zoom - self.zoom) * zf;
        }

        if self.shake.active {
            self.shake.elapsed_ms += dt_ms.max(0.0);
            if self.shake.elapsed_ms >= self.shake.duration_ms {
                self.shake = Shake::default();
            } else {
                let decay = 1.0 - self.shake.elapsed_ms / self.shake.duration_ms;
                let amp = self.shake.intensity * decay;
                self.shake.offset = Vec2::new(self.rng.signed(), self.rng.signed()) * amp;
            }
        }
    }

    /// Push the camera transform. Must be paired with [`Camera::restore`].
    pub fn apply(&self, surface: &mut dyn DrawSurface) {
        let half = self.viewport / 2.0;
        surface.save();
        surface.translate(half.x, half.y);
        surface.scale(self.zoom, self.zoom);
        surface.translate(-half.x, -half.y);
        surface.translate(-self.pos.x + self.shake.offset.x, -self.pos.y + self.shake.offset.y);
    }

    pub fn restore(&self, surface: &mut dyn DrawSurface) {
        surface.restore();
    }

    /// Start a damped jitter. Replaces any shake in progress.
    pub fn shake(&mut self, intensity: f32, duration_ms: f32) {
        if duration_ms <= 0.0 || intensity <= 0.0 {
            self.shake = Shake::default();
            return;
        }
        self.shake = Shake {
            intensity,
            duration_ms,
            elapsed_ms: 0.0,
            offset: Vec2::ZERO,
            active: true,
        };
    }

    pub fn shake_preset(&mut self, preset: ShakePreset) {
        let (intensity, duration) = preset.params();
        self.shake(intensity, duration);
    }

    /// Animate zoom to `level` over `duration_ms`. Zero duration hands the
    /// change to the zoom smoother.
    pub fn zoom_to_player(&mut self, level: f32, duration_ms: f32) {
        self.target_zoom = level;
        self.zoom_tween = if duration_ms > 0.0 {
            Some(Tween::new(self.zoom, level, duration_ms, Easing::SineInOut))
        } else {
            None
        };
    }

    pub fn zoom_out(&mut self, duration_ms: f32) {
        self.zoom_to_player(1.0, duration_ms);
    }

    pub fn set_bounds(&mut self, min_x: f32, max_x: f32, min_y: f32, max_y: f32) {
        self.bounds = Bounds { min_x, max_x, min_y, max_y };
        self.pos = self.clamp(self.pos);
        self.target_pos = self.clamp(self.target_pos);
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width, height);
        self.pos = self.clamp(self.pos);
        self.target_pos = self.clamp(self.target_pos);
    }

    /// Drop back to the origin so the follow smoother re-acquires its target.
    pub fn reset_position(&mut self) {
        self.pos = self.clamp(Vec2::ZERO);
    }

    /// Allowed range of `pos` on each axis, as `(min, max)` corners.
    pub fn clamp_window(&self) -> (Vec2, Vec2) {
        let b = self.bounds;
        let axis = |min: f32, max: f32, view: f32| {
            if max - min <= view {
                let c = min + (max - min - view) / 2.0;
                (c, c)
            } else {
                (min, max - view)
            }
        };
        let (x0, x1) = axis(b.min_x, b.max_x, self.viewport.x);
        let (y0, y1) = axis(b.min_y, b.max_y, self.viewport.y);
        (Vec2::new(x0, y0), Vec2::new(x1, y1))
    }

    fn clamp(&self, p: Vec2) -> Vec2 {
        let (lo, hi) = self.clamp_window();
        Vec2::new(p.x.clamp(lo.x, hi.x), p.y.clamp(lo.y, hi.y))
    }
}
