//! Player controller: horizontal control, double jump and hybrid grounded
//! detection (contact events plus a per-frame velocity check).

use folio_engine::{frame_scale, Action, BodyDesc, BodyId, ColliderDesc, ColliderMaterial, DrawSurface, EmitterKind, PhysicsWorld};
use glam::Vec2;

use crate::entity::{BodyKind, Command, Commands, Entity, FrameCtx, Side};
use crate::entity::PlatformKind;
use crate::events::SoundKind;
use crate::tuning::PlayerTuning;

pub const PLAYER_ID: &str = "player";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Animation {
    Idle,
    Walking,
    Jumping,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    id: BodyId,
    tuning: PlayerTuning,
    pos: Vec2,
    vel: Vec2,
    facing: Facing,
    grounded: bool,
    jumps_remaining: u32,
    jump_cooldown_ms: f32,
    /// Pending grounded re-check after leaving a surface.
    recheck_ms: Option<f32>,
    /// Surfaces landed on from above whose contact has not ended.
    support: Vec<BodyId>,
    animation: Animation,
    animation_frame: u32,
    animation_timer_ms: f32,
}

impl Player {
    /// Register the player body at `spawn` and return the controller.
    pub fn new(physics: &mut PhysicsWorld<BodyKind>, spawn: Vec2, tuning: PlayerTuning) -> Self {
        let id = BodyId::from(PLAYER_ID);
        let desc = BodyDesc::dynamic(ColliderDesc::Cuboid {
            half_width: tuning.width / 2.0,
            half_height: tuning.height / 2.0,
        })
        .with_position(spawn)
        .with_fixed_rotation(true)
        .with_ccd(true)
        .with_can_sleep(false);
        let material = ColliderMaterial {
            restitution: 0.0,
            friction: tuning.friction,
            density: 1.0,
        };
        physics.add_body(id.clone(), BodyKind::Player, &desc, material);

        Self {
            id,
            pos: spawn,
            vel: Vec2::ZERO,
            facing: Facing::Right,
            grounded: false,
            jumps_remaining: tuning.max_jumps,
            jump_cooldown_ms: 0.0,
            recheck_ms: None,
            support: Vec::new(),
            animation: Animation::Idle,
            animation_frame: 0,
            animation_timer_ms: 0.0,
            tuning,
        }
    }

    /// Teleport to `(x, y)` and reset every piece of movement state.
    pub fn respawn(&mut self, physics: &mut PhysicsWorld<BodyKind>, x: f32, y: f32) {
        self.set_position(physics, x, y);
        physics.set_velocity(&self.id, Vec2::ZERO);
        self.vel = Vec2::ZERO;
        self.grounded = false;
        self.jumps_remaining = self.tuning.max_jumps;
        self.jump_cooldown_ms = 0.0;
        self.recheck_ms = None;
        self.support.clear();
        self.animation = Animation::Idle;
        self.animation_frame = 0;
        self.animation_timer_ms = 0.0;
        self.facing = Facing::Right;
    }

    /// Teleport without touching any other state.
    pub fn set_position(&mut self, physics: &mut PhysicsWorld<BodyKind>, x: f32, y: f32) {
        let pos = Vec2::new(x, y);
        physics.set_position(&self.id, pos);
        self.pos = pos;
    }

    pub fn x(&self) -> f32 {
        self.pos.x
    }

    pub fn y(&self) -> f32 {
        self.pos.y
    }

    pub fn position(&self) -> Vec2 {
        self.pos
    }

    /// Velocity as of the last update, pixels per frame.
    pub fn velocity(&self) -> Vec2 {
        self.vel
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn jumps_remaining(&self) -> u32 {
        self.jumps_remaining
    }

    pub fn max_jumps(&self) -> u32 {
        self.tuning.max_jumps
    }

    pub fn jump_cooldown_ms(&self) -> f32 {
        self.jump_cooldown_ms
    }

    pub fn is_supported(&self) -> bool {
        !self.support.is_empty()
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn animation(&self) -> Animation {
        self.animation
    }

    pub fn animation_frame(&self) -> u32 {
        self.animation_frame
    }

    fn feet(&self) -> Vec2 {
        Vec2::new(self.pos.x, self.pos.y + self.tuning.height / 2.0)
    }

    fn try_jump(&mut self, wants_jump: bool, vel: &mut Vec2, commands: &mut Commands) {
        if !wants_jump || self.jumps_remaining == 0 || self.jump_cooldown_ms > 0.0 {
            return;
        }
        let first = self.jumps_remaining >= self.tuning.max_jumps;
        vel.y = self.tuning.jump_velocity;
        self.jumps_remaining -= 1;
        self.jump_cooldown_ms = self.tuning.jump_cooldown_ms;
        self.grounded = false;
        self.recheck_ms = None;

        if first {
            commands.push(Command::Emit(EmitterKind::JumpDust, self.feet()));
            commands.push(Command::Sound(SoundKind::Jump));
        } else {
            commands.push(Command::Emit(EmitterKind::DoubleJumpPuff, self.pos));
            commands.push(Command::Sound(SoundKind::DoubleJump));
        }
        log::debug!("player: jump, {} left", self.jumps_remaining);
    }

    /// Rewrite any state that contradicts the current velocity. A landing is
    /// usually reported while the body still carries its falling speed, so
    /// standing still on a surface that is still touched grounds again.
    fn enforce_invariants(&mut self) {
        let vy = self.vel.y;
        if !self.support.is_empty() && vy.abs() < self.tuning.airborne_vy {
            self.grounded = true;
        }
        if vy > self.tuning.airborne_vy {
            self.grounded = false;
        }
        if self.grounded && vy.abs() >= self.tuning.grounded_max_vy {
            self.grounded = false;
        }
        if self.grounded && vy.abs() < self.tuning.airborne_vy {
            self.jumps_remaining = self.tuning.max_jumps;
        }
        self.jumps_remaining = self.jumps_remaining.min(self.tuning.max_jumps);
        self.jump_cooldown_ms = self.jump_cooldown_ms.max(0.0);
    }

    fn advance_animation(&mut self, dt_ms: f32, dir: f32) {
        let next = if !self.grounded {
            Animation::Jumping
        } else if dir != 0.0 {
            Animation::Walking
        } else {
            Animation::Idle
        };
        if next != self.animation {
            self.animation = next;
            self.animation_frame = 0;
            self.animation_timer_ms = 0.0;
        }

        let wrap = match self.animation {
            Animation::Idle => self.tuning.idle_frames,
            Animation::Walking => self.tuning.walk_frames,
            Animation::Jumping => self.tuning.jump_frames,
        }
        .max(1);
        if self.tuning.anim_frame_ms <= 0.0 {
            return;
        }
        self.animation_timer_ms += dt_ms;
        while self.animation_timer_ms >= self.tuning.anim_frame_ms {
            self.animation_timer_ms -= self.tuning.anim_frame_ms;
            self.animation_frame = (self.animation_frame + 1) % wrap;
        }
    }
}

impl Entity for Player {
    fn body_id(&self) -> &BodyId {
        &self.id
    }

    fn update(&mut self, ctx: &mut FrameCtx) {
        let dt = ctx.dt_ms.max(0.0);
        let scale = frame_scale(dt);
        let Some(pos) = ctx.physics.position(&self.id) else {
            return;
        };
        let mut vel = ctx.physics.velocity(&self.id).unwrap_or(Vec2::ZERO);
        self.pos = pos;

        self.jump_cooldown_ms = (self.jump_cooldown_ms - dt).max(0.0);

        if let Some(remaining) = self.recheck_ms.as_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                self.recheck_ms = None;
                if vel.y > self.tuning.recheck_fall_vy {
                    self.grounded = false;
                }
            }
        }

        let dir = ctx.input.horizontal().clamp(-1.0, 1.0);
        if dir != 0.0 {
            vel.x += dir * self.tuning.move_accel * scale;
            self.facing = if dir < 0.0 { Facing::Left } else { Facing::Right };
        } else if self.grounded {
            vel.x *= self.tuning.ground_damping.powf(scale);
        }
        vel.x = vel.x.clamp(-self.tuning.max_speed, self.tuning.max_speed);

        let wants_jump = ctx.input.is_active(Action::Up) || ctx.input.is_active(Action::Jump);
        self.try_jump(wants_jump, &mut vel, ctx.commands);

        ctx.physics.set_velocity(&self.id, vel);
        self.vel = vel;

        self.enforce_invariants();
        self.advance_animation(dt, dir);
    }

    fn on_contact_start(&mut self, me: &Side, other: &Side, commands: &mut Commands) {
        if !other.kind.is_ground() {
            return;
        }

        // Head-first into the underside of a box
        if other.kind == BodyKind::MysteryBox
            && me.position.y - other.position.y > self.tuning.strike_offset
            && me.velocity.y < 0.0
        {
            commands.push(Command::StrikeBox(other.id.clone()));
            return;
        }

        if me.bottom() <= other.top() + self.tuning.ground_tolerance && me.velocity.y >= self.tuning.min_landing_vy {
            if !self.grounded {
                commands.push(Command::Sound(SoundKind::Land));
                if other.kind == BodyKind::Platform(PlatformKind::Victory) {
                    commands.push(Command::ReachedVictory);
                }
            }
            self.grounded = true;
            self.jumps_remaining = self.tuning.max_jumps;
            self.recheck_ms = None;
            if !self.support.contains(&other.id) {
                self.support.push(other.id.clone());
            }
        }
    }

    fn on_contact_end(&mut self, _me: &Side, other: &Side, _commands: &mut Commands) {
        if other.kind.is_ground() {
            self.support.retain(|id| *id != other.id);
            self.recheck_ms = Some(self.tuning.recheck_delay_ms);
        }
    }

    fn draw(&self, surface: &mut dyn DrawSurface) {
        let w = self.tuning.width;
        let h = self.tuning.height;
        let left = self.pos.x - w / 2.0;
        let top = self.pos.y - h / 2.0;

        // Legs alternate while walking
        let stride = match self.animation {
            Animation::Walking => {
                if self.animation_frame % 2 == 0 {
                    3.0
                } else {
                    -3.0
                }
            }
            _ => 0.0,
        };
        surface.set_fill_style("#1e3a8a");
        surface.fill_rect(left + 4.0 + stride, top + h - 12.0, 10.0, 12.0);
        surface.fill_rect(left + w - 14.0 - stride, top + h - 12.0, 10.0, 12.0);

        surface.set_fill_style("#3b82f6");
        surface.fill_rect(left, top + 12.0, w, h - 22.0);

        surface.set_fill_style("#fcd9b6");
        surface.fill_rect(left + 4.0, top, w - 8.0, 16.0);

        let eye_x = self.pos.x + self.facing.sign() * 5.0;
        surface.set_fill_style("#111827");
        surface.fill_circle(eye_x, top + 7.0, 2.0);
    }
}
