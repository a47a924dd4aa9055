// extensions/tween.rs
//
// Tweens as plain state records: (from, to, duration, elapsed, easing).
// The owner advances them each frame and reads the value; nothing calls back.

use super::easing::{ease, Easing};

/// How the value travels over the tween's duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TweenShape {
    /// `from` → `to`.
    #[default]
    Once,
    /// `from` → `to` → `from`, both legs inside the duration.
    Yoyo,
}

/// A single animated value.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    pub from: f32,
    pub to: f32,
    /// Duration in milliseconds.
    pub duration_ms: f32,
    pub elapsed_ms: f32,
    pub easing: Easing,
    pub shape: TweenShape,
}

impl Tween {
    pub fn new(from: f32, to: f32, duration_ms: f32, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration_ms,
            elapsed_ms: 0.0,
            easing,
            shape: TweenShape::Once,
        }
    }

    /// Go out to `to` and come back within the same duration.
    pub fn yoyo(mut self) -> Self {
        self.shape = TweenShape::Yoyo;
        self
    }

    /// Advance by `dt_ms`. Returns true once complete.
    pub fn advance(&mut self, dt_ms: f32) -> bool {
        self.elapsed_ms = (self.elapsed_ms + dt_ms.max(0.0)).min(self.duration_ms.max(0.0));
        self.is_complete()
    }

    /// Normalized time in [0, 1]. A zero-length tween is always complete.
    pub fn progress(&self) -> f32 {
        if self.duration_ms <= 0.0 {
            1.0
        } else {
            (self.elapsed_ms / self.duration_ms).clamp(0.0, 1.0)
        }
    }

    pub fn is_complete(&self) -> bool {
        self.progress() >= 1.0
    }

    /// Current value.
    pub fn value(&self) -> f32 {
        let t = self.progress();
        match self.shape {
            TweenShape::Once => ease(self.from, self.to, t, self.easing),
            TweenShape::Yoyo => {
                let leg = if t < 0.5 { t * 2.0 } else { 2.0 - t * 2.0 };
                ease(self.from, self.to, leg, self.easing)
            }
        }
    }
}
