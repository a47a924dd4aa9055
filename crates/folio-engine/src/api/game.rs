use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::store::{KeyValueStore, MemoryStore};
use crate::api::types::{EngineError, HostEvent};
use crate::input::state::InputState;
use crate::renderer::surface::DrawSurface;

/// Configuration for the engine, provided by the game.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    /// Upper bound on a single frame's delta in milliseconds (default: one 60 Hz frame).
    pub max_delta_ms: f32,
    /// Gravity in pixels per second squared. Y points down.
    pub gravity: Vec2,
    /// Initial viewport size in CSS pixels, replaced on the first resize.
    pub viewport: Vec2,
    /// Maximum number of live particles (default: 512).
    pub max_particles: usize,
    /// Seed for visual randomness (particles, shake).
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_delta_ms: 16.667,
            gravity: Vec2::new(0.0, 1800.0),
            viewport: Vec2::new(800.0, 600.0),
            max_particles: 512,
            seed: 42,
        }
    }
}

impl GameConfig {
    /// Parse a partial JSON override on top of the defaults.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// The core contract every game must fulfill.
///
/// The runner calls `update` then `render` once per animation frame. `update`
/// is always called, paused or not; a paused game samples its toggles and
/// skips simulation, so the clock keeps moving and resuming never sees a
/// large step.
pub trait Game {
    /// Return engine configuration. Called once before init.
    fn config(&self) -> GameConfig {
        GameConfig::default()
    }

    /// Build the world. An error here is fatal and no frames are scheduled.
    fn init(&mut self, ctx: &mut EngineContext) -> Result<(), EngineError>;

    /// One frame of simulation. `ctx.delta_ms` is already clamped.
    fn update(&mut self, ctx: &mut EngineContext, input: &InputState);

    /// Draw the current state. Read-only.
    fn render(&self, surface: &mut dyn DrawSurface);

    /// The drawing surface changed size.
    fn resize(&mut self, _width: f32, _height: f32) {}

    fn pause(&mut self) {}

    fn resume(&mut self) {}

    fn is_paused(&self) -> bool {
        false
    }

    /// Return the world to its initial state.
    fn reset(&mut self, _ctx: &mut EngineContext) {}

    /// Release everything. No frames follow, so anything emitted here is
    /// dispatched by the caller.
    fn destroy(&mut self, _ctx: &mut EngineContext) {}

    /// The host closed the details overlay.
    fn overlay_closed(&mut self, _ctx: &mut EngineContext) {
        self.resume();
    }

    /// Images to preload, as `(key, url)` pairs.
    fn sprite_sources(&self) -> Vec<(String, String)> {
        Vec::new()
    }
}

/// Per-frame engine state handed to the game: timing, outbound events and storage.
pub struct EngineContext {
    /// Clamped delta of the current frame in milliseconds.
    pub delta_ms: f32,
    /// Accumulated game time in milliseconds.
    pub game_time_ms: f64,
    /// Host timestamp of the current frame.
    pub last_frame_ms: f64,
    pub viewport: Vec2,
    pub events: Vec<HostEvent>,
    pub store: Box<dyn KeyValueStore>,
}

impl EngineContext {
    pub fn new() -> Self {
        Self::with_store(Box::new(MemoryStore::new()))
    }

    pub fn with_store(store: Box<dyn KeyValueStore>) -> Self {
        Self {
            delta_ms: 0.0,
            game_time_ms: 0.0,
            last_frame_ms: 0.0,
            viewport: GameConfig::default().viewport,
            events: Vec::new(),
            store,
        }
    }

    /// Emit an event to be forwarded to the host.
    pub fn emit(&mut self, event: HostEvent) {
        self.events.push(event);
    }

    /// Take all events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new()
    }
}
