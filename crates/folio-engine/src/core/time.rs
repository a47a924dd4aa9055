/// Duration of one reference frame at 60 Hz, in milliseconds.
/// Motion integrators scale by `dt / REFERENCE_FRAME_MS`.
pub const REFERENCE_FRAME_MS: f32 = 1000.0 / 60.0;

/// Variable-step frame clock driven by the host's animation timestamps.
///
/// Each tick yields `now - last`, clamped to `[0, max_delta_ms]`. The first
/// tick yields 0. There is no accumulator: a long gap (tab in background)
/// produces one capped step, not a catch-up burst.
pub struct FrameClock {
    max_delta_ms: f32,
    last_frame_ms: Option<f64>,
    delta_ms: f32,
    game_time_ms: f64,
    frames: u64,
}

impl FrameClock {
    pub fn new(max_delta_ms: f32) -> Self {
        Self {
            max_delta_ms,
            last_frame_ms: None,
            delta_ms: 0.0,
            game_time_ms: 0.0,
            frames: 0,
        }
    }

    /// Advance to the host timestamp `now_ms`. Returns the clamped delta.
    pub fn tick(&mut self, now_ms: f64) -> f32 {
        let raw = match self.last_frame_ms {
            Some(last) => (now_ms - last) as f32,
            None => 0.0,
        };
        self.last_frame_ms = Some(now_ms);
        self.delta_ms = raw.clamp(0.0, self.max_delta_ms);
        self.game_time_ms += self.delta_ms as f64;
        self.frames += 1;
        self.delta_ms
    }

    /// Forget the last timestamp so the next tick yields 0.
    pub fn rebase(&mut self) {
        self.last_frame_ms = None;
    }

    pub fn delta_ms(&self) -> f32 {
        self.delta_ms
    }

    pub fn game_time_ms(&self) -> f64 {
        self.game_time_ms
    }

    pub fn last_frame_ms(&self) -> f64 {
        self.last_frame_ms.unwrap_or(0.0)
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

/// Ratio of `dt_ms` to one reference frame.
#[inline]
pub fn frame_scale(dt_ms: f32) -> f32 {
    dt_ms / REFERENCE_FRAME_MS
}
