//! Body labels, the deferred command queue and the shared entity contract.

use std::collections::VecDeque;

use folio_engine::{BodyId, ContactSide, DrawSurface, EmitterKind, InputState, PhysicsWorld, ShakePreset};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::events::SoundKind;

/// Visual and gameplay variant of a static platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlatformKind {
    Grass,
    Stone,
    Floating,
    MysteryBox,
    Victory,
}

/// Label attached to every rigid body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyKind {
    Player,
    Platform(PlatformKind),
    MysteryBox,
    Collectible,
    /// Left and right world walls. Gameplay ignores contacts with them.
    Boundary,
}

impl BodyKind {
    /// Something the player can stand on.
    pub fn is_ground(self) -> bool {
        matches!(self, BodyKind::Platform(_) | BodyKind::MysteryBox)
    }
}

pub type Side = ContactSide<BodyKind>;

/// A structural change or outbound effect requested during a frame.
/// Contact handlers only flip flags and push these; the game applies them
/// between the physics step and entity updates, and again at frame end.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Sound(SoundKind),
    Emit(EmitterKind, Vec2),
    Shake(ShakePreset),
    StrikeBox(BodyId),
    SpawnCollectible {
        box_id: BodyId,
        at: Vec2,
        project: String,
    },
    RemoveBody(BodyId),
    OpenProject(String),
    CollectibleTaken {
        box_id: BodyId,
    },
    ReachedVictory,
}

/// FIFO of pending commands.
#[derive(Debug, Default)]
pub struct Commands {
    queue: VecDeque<Command>,
}

impl Commands {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        self.queue.push_back(command);
    }

    pub fn pop(&mut self) -> Option<Command> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.queue.iter()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

/// Everything an entity may touch during its update.
pub struct FrameCtx<'a> {
    pub dt_ms: f32,
    pub input: &'a InputState,
    pub physics: &'a mut PhysicsWorld<BodyKind>,
    pub commands: &'a mut Commands,
}

/// Shared capabilities of the player, mystery boxes and collectibles.
pub trait Entity {
    fn body_id(&self) -> &BodyId;

    fn update(&mut self, ctx: &mut FrameCtx);

    fn on_contact_start(&mut self, _me: &Side, _other: &Side, _commands: &mut Commands) {}

    fn on_contact_end(&mut self, _me: &Side, _other: &Side, _commands: &mut Commands) {}

    fn draw(&self, surface: &mut dyn DrawSurface);
}
