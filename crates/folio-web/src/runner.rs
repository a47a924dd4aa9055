use folio_engine::{
    Bindings, DrawSurface, EngineContext, EngineError, FrameClock, Game, GameConfig, HostEvent,
    InputEvent, InputQueue, InputState, KeyValueStore, TouchConfig,
};
use glam::Vec2;

/// Generic game runner that wires up the engine loop.
///
/// Each concrete game creates a `thread_local!` GameRunner and exports free
/// functions via `#[wasm_bindgen]`, because wasm-bindgen cannot export
/// generic structs directly. The runner itself never touches the DOM, so it
/// is driven by plain timestamps and a `DrawSurface` in native tests.
pub struct GameRunner<G: Game> {
    game: G,
    ctx: EngineContext,
    queue: InputQueue,
    input: InputState,
    clock: FrameClock,
    config: GameConfig,
    initialized: bool,
    destroyed: bool,
}

impl<G: Game> GameRunner<G> {
    pub fn new(game: G, store: Box<dyn KeyValueStore>) -> Self {
        let config = game.config();
        let clock = FrameClock::new(config.max_delta_ms);
        let input = InputState::new(Bindings::default(), TouchConfig::default(), config.viewport);
        let mut ctx = EngineContext::with_store(store);
        ctx.viewport = config.viewport;

        Self {
            game,
            ctx,
            queue: InputQueue::new(),
            input,
            clock,
            config,
            initialized: false,
            destroyed: false,
        }
    }

    /// Initialize the game. Call once after construction; on error no frame
    /// should be scheduled.
    pub fn init(&mut self, viewport: Vec2) -> Result<(), EngineError> {
        self.config = self.game.config();
        self.clock = FrameClock::new(self.config.max_delta_ms);
        self.ctx.viewport = viewport;
        self.input.set_viewport(viewport);
        self.game.resize(viewport.x, viewport.y);
        self.game.init(&mut self.ctx)?;
        self.initialized = true;
        Ok(())
    }

    /// Push an input event into the queue. It is applied on the next tick.
    pub fn push_input(&mut self, event: InputEvent) {
        if self.destroyed {
            return;
        }
        self.queue.push(event);
    }

    /// Run one frame: clock, input, update, render. Returns the events the
    /// game emitted this frame for the host to dispatch.
    pub fn tick(&mut self, now_ms: f64, surface: &mut dyn DrawSurface) -> Vec<HostEvent> {
        if !self.initialized || self.destroyed {
            return Vec::new();
        }

        let dt = self.clock.tick(now_ms);
        self.ctx.delta_ms = dt;
        self.ctx.game_time_ms = self.clock.game_time_ms();
        self.ctx.last_frame_ms = self.clock.last_frame_ms();

        self.input.begin_frame(self.queue.drain());
        for ms in self.input.take_haptic_requests() {
            self.ctx.emit(HostEvent::Haptic(ms));
        }

        self.game.update(&mut self.ctx, &self.input);
        self.game.render(surface);

        self.ctx.drain_events()
    }

    pub fn pause(&mut self) {
        self.game.pause();
    }

    /// Resume the game. The next frame measures from a fresh timestamp.
    pub fn resume(&mut self) {
        self.clock.rebase();
        self.game.resume();
    }

    pub fn is_paused(&self) -> bool {
        self.game.is_paused()
    }

    /// Reset the game. Returns what it emitted, for immediate dispatch.
    pub fn reset(&mut self) -> Vec<HostEvent> {
        if !self.initialized || self.destroyed {
            return Vec::new();
        }
        self.queue.drain();
        self.input.clear();
        self.game.reset(&mut self.ctx);
        self.ctx.drain_events()
    }

    /// The host closed its overlay.
    pub fn overlay_closed(&mut self) {
        if !self.initialized || self.destroyed {
            return;
        }
        self.clock.rebase();
        self.game.overlay_closed(&mut self.ctx);
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        let viewport = Vec2::new(width, height);
        self.ctx.viewport = viewport;
        self.input.set_viewport(viewport);
        self.game.resize(width, height);
    }

    /// Tear down. Safe to call more than once; no frame runs afterwards.
    /// Returns the game's final events.
    pub fn destroy(&mut self) -> Vec<HostEvent> {
        if self.destroyed {
            return Vec::new();
        }
        self.destroyed = true;
        self.queue.drain();
        self.input.clear();
        self.game.destroy(&mut self.ctx);
        self.ctx.drain_events()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn sprite_sources(&self) -> Vec<(String, String)> {
        self.game.sprite_sources()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }
}
