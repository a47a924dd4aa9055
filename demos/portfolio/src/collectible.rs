use folio_engine::{BodyDesc, BodyId, ColliderDesc, ColliderMaterial, DrawSurface, Easing, EmitterKind, PhysicsWorld};
use glam::Vec2;

use crate::entity::{BodyKind, Command, Commands, Entity, FrameCtx, Side};
use crate::events::SoundKind;
use crate::tuning::CollectibleTuning;

/// Body ids of collectibles start with this, followed by the box id.
pub const ID_PREFIX: &str = "collectible-";

/// Image key for a project's collectible sprite.
pub fn sprite_key(project: &str) -> String {
    format!("collectible-{}", project)
}

/// A project token released by a mystery box. Owned by the game, not the box.
#[derive(Debug, Clone)]
pub struct Collectible {
    id: BodyId,
    box_id: BodyId,
    project: String,
    sprite: String,
    /// Where the rise starts (the box centre).
    origin: Vec2,
    /// Hover position the bob oscillates around.
    home: Vec2,
    pos: Vec2,
    scale: f32,
    elapsed_ms: f32,
    spawning: bool,
    bob_phase: f32,
    collected: bool,
    player_overlapping: bool,
    tuning: CollectibleTuning,
}

impl Collectible {
    /// Register a kinematic sensor at the box centre; it rises to `home` while spawning.
    pub fn spawn(
        physics: &mut PhysicsWorld<BodyKind>,
        box_id: &BodyId,
        origin: Vec2,
        home: Vec2,
        project: &str,
        tuning: CollectibleTuning,
    ) -> Self {
        let id = BodyId::new(format!("{}{}", ID_PREFIX, box_id));
        let desc = BodyDesc::kinematic(ColliderDesc::Ball { radius: tuning.radius })
            .with_position(origin)
            .with_sensor();
        physics.add_body(id.clone(), BodyKind::Collectible, &desc, ColliderMaterial::default());
        log::debug!("collectible '{}' spawned for '{}'", id, project);

        Self {
            id,
            box_id: box_id.clone(),
            project: project.to_string(),
            sprite: sprite_key(project),
            origin,
            home,
            pos: origin,
            scale: 0.0,
            elapsed_ms: 0.0,
            spawning: true,
            bob_phase: 0.0,
            collected: false,
            player_overlapping: false,
            tuning,
        }
    }

    pub fn box_id(&self) -> &BodyId {
        &self.box_id
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn position(&self) -> Vec2 {
        self.pos
    }

    pub fn home(&self) -> Vec2 {
        self.home
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn is_spawning(&self) -> bool {
        self.spawning
    }

    pub fn is_collected(&self) -> bool {
        self.collected
    }

    fn collect(&mut self, commands: &mut Commands) {
        if self.collected {
            return;
        }
        self.collected = true;
        commands.push(Command::RemoveBody(self.id.clone()));
        commands.push(Command::OpenProject(self.project.clone()));
        commands.push(Command::Sound(SoundKind::MysteryBoxComplete));
        commands.push(Command::Emit(EmitterKind::CollectBurst, self.pos));
        commands.push(Command::CollectibleTaken {
            box_id: self.box_id.clone(),
        });
        log::debug!("collectible '{}' taken", self.id);
    }
}

impl Entity for Collectible {
    fn body_id(&self) -> &BodyId {
        &self.id
    }

    fn update(&mut self, ctx: &mut FrameCtx) {
        if self.collected {
            return;
        }
        let dt = ctx.dt_ms.max(0.0);

        if self.spawning {
            self.elapsed_ms += dt;
            let t = if self.tuning.spawn_ms > 0.0 {
                (self.elapsed_ms / self.tuning.spawn_ms).min(1.0)
            } else {
                1.0
            };
            let eased = Easing::BackOut.apply(t);
            self.pos = self.origin.lerp(self.home, eased);
            self.scale = eased.max(0.0);
            if t >= 1.0 {
                self.spawning = false;
                self.pos = self.home;
                self.scale = 1.0;
                if self.player_overlapping {
                    self.collect(ctx.commands);
                }
            }
        } else {
            if self.tuning.bob_period_ms > 0.0 {
                self.bob_phase = (self.bob_phase + dt / self.tuning.bob_period_ms * std::f32::consts::TAU)
                    % std::f32::consts::TAU;
            }
            self.pos = Vec2::new(self.home.x, self.home.y + self.bob_phase.sin() * self.tuning.bob_amplitude);
        }

        ctx.physics.set_kinematic_position(&self.id, self.pos);
    }

    fn on_contact_start(&mut self, _me: &Side, other: &Side, commands: &mut Commands) {
        if other.kind != BodyKind::Player {
            return;
        }
        self.player_overlapping = true;
        if !self.spawning {
            self.collect(commands);
        }
    }

    fn on_contact_end(&mut self, _me: &Side, other: &Side, _commands: &mut Commands) {
        if other.kind == BodyKind::Player {
            self.player_overlapping = false;
        }
    }

    fn draw(&self, surface: &mut dyn DrawSurface) {
        if self.collected || self.scale <= 0.0 {
            return;
        }
        let r = self.tuning.radius * self.scale;
        if surface.draw_image(&self.sprite, self.pos.x - r, self.pos.y - r, r * 2.0, r * 2.0) {
            return;
        }
        // Placeholder coin
        surface.set_fill_style("#facc15");
        surface.fill_circle(self.pos.x, self.pos.y, r);
        surface.set_stroke_style("#a16207");
        surface.set_line_width(2.0);
        surface.begin_path();
        surface.arc(self.pos.x, self.pos.y, r * 0.65, 0.0, std::f32::consts::TAU);
        surface.stroke();
    }
}
