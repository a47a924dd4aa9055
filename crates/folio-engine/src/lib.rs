pub mod api;
pub mod core;
pub mod systems;
pub mod renderer;
pub mod input;
pub mod extensions;

// Re-export key types at crate root for convenience
pub use api::game::{EngineContext, Game, GameConfig};
pub use api::store::{KeyValueStore, MemoryStore};
pub use api::types::{AudioControl, EngineError, HostEvent};
pub use core::time::{frame_scale, FrameClock, REFERENCE_FRAME_MS};
pub use input::actions::{Action, Bindings, Key};
pub use input::queue::{InputEvent, InputQueue};
pub use input::state::InputState;
pub use input::touch::{TouchConfig, TouchControls};
pub use renderer::camera::{Bounds, Camera, CameraConfig, ShakePreset};
pub use renderer::surface::{DrawCommand, DrawSurface, RecordingSurface};
pub use systems::particles::{EmitterConfig, EmitterKind, Particle, ParticleOptions, ParticleSystem};
pub use systems::rng::Rng;

#[cfg(feature = "physics")]
pub use core::physics::{
    BodyDesc, BodyId, BodySnapshot, BodyType, ColliderDesc, ColliderMaterial,
    ContactEvents, ContactPair, ContactSide, PhysicsWorld,
};
#[cfg(feature = "physics")]
pub use systems::debug::draw_collider_outlines;

// Extensions: decoupled optional helpers
pub use extensions::{ease, lerp, Easing, Tween, TweenShape};
