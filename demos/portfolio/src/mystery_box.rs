use folio_engine::{BodyDesc, BodyId, ColliderDesc, ColliderMaterial, DrawSurface, Easing, PhysicsWorld, Tween};
use glam::Vec2;

use crate::entity::{BodyKind, Command, Commands, Entity, FrameCtx};
use crate::events::SoundKind;
use crate::level::Platform;
use crate::tuning::{BoxTuning, CollectibleTuning};

/// Box lifecycle. Only ever advances `Armed -> Hit -> Emptied`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BoxState {
    Armed,
    Hit,
    Emptied,
}

#[derive(Debug, Clone)]
pub struct MysteryBox {
    id: BodyId,
    project: String,
    center: Vec2,
    size: Vec2,
    state: BoxState,
    bounce: Option<Tween>,
    bounce_offset: f32,
    tuning: BoxTuning,
    spawn_offset: f32,
}

impl MysteryBox {
    /// Register a static box body for `platform`, which must carry a project.
    pub fn new(
        physics: &mut PhysicsWorld<BodyKind>,
        platform: &Platform,
        project: &str,
        tuning: BoxTuning,
        collectible: &CollectibleTuning,
    ) -> Self {
        let id = BodyId::from(platform.id.as_str());
        let desc = BodyDesc::fixed(ColliderDesc::Cuboid {
            half_width: platform.size.x / 2.0,
            half_height: platform.size.y / 2.0,
        })
        .with_position(platform.center);
        let material = ColliderMaterial {
            restitution: 0.0,
            friction: 0.0,
            density: 1.0,
        };
        physics.add_body(id.clone(), BodyKind::MysteryBox, &desc, material);

        Self {
            id,
            project: project.to_string(),
            center: platform.center,
            size: platform.size,
            state: BoxState::Armed,
            bounce: None,
            bounce_offset: 0.0,
            tuning,
            spawn_offset: collectible.spawn_offset,
        }
    }

    pub fn state(&self) -> BoxState {
        self.state
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn bounce_offset(&self) -> f32 {
        self.bounce_offset
    }

    /// The player's head hit the underside. Returns true on the `Armed -> Hit`
    /// transition; later strikes are ignored.
    pub fn on_struck_from_below(&mut self, commands: &mut Commands) -> bool {
        if self.state != BoxState::Armed {
            return false;
        }
        self.state = BoxState::Hit;
        self.bounce = Some(Tween::new(0.0, -self.tuning.bounce_height, self.tuning.bounce_ms, Easing::QuadOut).yoyo());
        commands.push(Command::Sound(SoundKind::MysteryBoxHit));
        commands.push(Command::SpawnCollectible {
            box_id: self.id.clone(),
            at: Vec2::new(self.center.x, self.center.y - self.spawn_offset),
            project: self.project.clone(),
        });
        log::debug!("box '{}': hit, releasing '{}'", self.id, self.project);
        true
    }

    /// The box's collectible was picked up.
    pub fn on_collectible_complete(&mut self) -> bool {
        if self.state != BoxState::Hit {
            return false;
        }
        self.state = BoxState::Emptied;
        true
    }

    /// Apply a persisted state without animation. Never moves backwards.
    pub fn restore(&mut self, state: BoxState) {
        if state > self.state {
            self.state = state;
        }
    }
}

impl Entity for MysteryBox {
    fn body_id(&self) -> &BodyId {
        &self.id
    }

    fn update(&mut self, ctx: &mut FrameCtx) {
        if let Some(tween) = self.bounce.as_mut() {
            let done = tween.advance(ctx.dt_ms);
            self.bounce_offset = tween.value();
            if done {
                self.bounce = None;
                self.bounce_offset = 0.0;
            }
        }
    }

    fn draw(&self, surface: &mut dyn DrawSurface) {
        let left = self.center.x - self.size.x / 2.0;
        let top = self.center.y - self.size.y / 2.0 + self.bounce_offset;
        let (fill, edge) = match self.state {
            BoxState::Armed => ("#f59e0b", "#92400e"),
            BoxState::Hit | BoxState::Emptied => ("#a16207", "#57330a"),
        };
        surface.set_fill_style(fill);
        surface.fill_rect(left, top, self.size.x, self.size.y);
        surface.set_stroke_style(edge);
        surface.set_line_width(2.0);
        surface.stroke_rect(left, top, self.size.x, self.size.y);

        // Corner rivets
        surface.set_fill_style(edge);
        for (dx, dy) in [(4.0, 4.0), (self.size.x - 4.0, 4.0), (4.0, self.size.y - 4.0), (self.size.x - 4.0, self.size.y - 4.0)] {
            surface.fill_circle(left + dx, top + dy, 1.5);
        }

        if self.state == BoxState::Armed {
            surface.set_fill_style("#ffffff");
            surface.set_font("bold 24px monospace");
            surface.fill_text("?", self.center.x - 7.0, top + self.size.y / 2.0 + 8.0);
        }
    }
}
