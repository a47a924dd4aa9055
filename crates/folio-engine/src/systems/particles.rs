//! Short-lived point particles: jump dust, double-jump puffs, death and
//! pickup bursts.

use glam::Vec2;

use crate::core::time::frame_scale;
use crate::renderer::surface::DrawSurface;
use crate::systems::rng::Rng;

/// The fixed set of emitters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitterKind {
    JumpDust,
    DoubleJumpPuff,
    DeathBurst,
    CollectBurst,
}

/// How initial velocities are drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Spread {
    /// Independent uniform ranges per axis.
    Box { vx: (f32, f32), vy: (f32, f32) },
    /// Uniform direction, uniform speed in range.
    Radial { speed: (f32, f32) },
}

/// Value record describing one emitter. Velocities are pixels per 60 Hz frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmitterConfig {
    pub count: usize,
    pub spread: Spread,
    pub size: (f32, f32),
    pub life_ms: (f32, f32),
    pub palette: &'static [&'static str],
    pub gravity: f32,
    pub friction: f32,
    pub fade_out: bool,
}

impl EmitterKind {
    pub fn config(self) -> EmitterConfig {
        match self {
            EmitterKind::JumpDust => EmitterConfig {
                count: 8,
                spread: Spread::Box { vx: (-2.0, 2.0), vy: (-1.5, -0.2) },
                size: (2.0, 4.0),
                life_ms: (250.0, 450.0),
                palette: &["#c8b89a", "#a89478", "#ddd0b8"],
                gravity: 0.05,
                friction: 0.92,
                fade_out: true,
            },
            EmitterKind::DoubleJumpPuff => EmitterConfig {
                count: 12,
                spread: Spread::Radial { speed: (1.0, 2.5) },
                size: (3.0, 5.0),
                life_ms: (300.0, 500.0),
                palette: &["#ffffff", "#dff3ff", "#b8e2ff"],
                gravity: 0.0,
                friction: 0.9,
                fade_out: true,
            },
            EmitterKind::DeathBurst => EmitterConfig {
                count: 24,
                spread: Spread::Radial { speed: (2.0, 6.0) },
                size: (3.0, 6.0),
                life_ms: (500.0, 900.0),
                palette: &["#ff4d4d", "#ff9933", "#ffd11a"],
                gravity: 0.15,
                friction: 0.96,
                fade_out: true,
            },
            EmitterKind::CollectBurst => EmitterConfig {
                count: 20,
                spread: Spread::Radial { speed: (1.5, 4.5) },
                size: (2.0, 4.0),
                life_ms: (400.0, 800.0),
                palette: &["#ffd700", "#fff3a0", "#ffb300"],
                gravity: 0.03,
                friction: 0.94,
                fade_out: true,
            },
        }
    }
}

/// Options for a single hand-made particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleOptions {
    pub vel: Vec2,
    pub life_ms: f32,
    pub size: f32,
    pub color: &'static str,
    pub gravity: f32,
    pub friction: f32,
    pub fade_out: bool,
}

impl Default for ParticleOptions {
    fn default() -> Self {
        Self {
            vel: Vec2::ZERO,
            life_ms: 500.0,
            size: 3.0,
            color: "#ffffff",
            gravity: 0.0,
            friction: 1.0,
            fade_out: true,
        }
    }
}

/// A single particle.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life_ms: f32,
    pub max_life_ms: f32,
    pub size: f32,
    pub color: &'static str,
    pub gravity: f32,
    pub friction: f32,
    pub fade_out: bool,
}

impl Particle {
    /// Advance one frame. Returns false when expired.
    pub fn tick(&mut self, dt_ms: f32) -> bool {
        let scale = frame_scale(dt_ms);
        self.pos += self.vel * scale;
        self.vel.y += self.gravity * scale;
        self.vel *= self.friction.powf(scale);
        self.life_ms -= dt_ms;
        self.life_ms > 0.0
    }

    /// Opacity in [0, 1].
    pub fn alpha(&self) -> f32 {
        if self.fade_out && self.max_life_ms > 0.0 {
            (self.life_ms / self.max_life_ms).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }
}

/// Owns every live particle.
pub struct ParticleSystem {
    particles: Vec<Particle>,
    rng: Rng,
    max_particles: usize,
}

impl ParticleSystem {
    pub fn new(seed: u64, max_particles: usize) -> Self {
        Self {
            particles: Vec::with_capacity(max_particles.min(1024)),
            rng: Rng::new(seed.wrapping_add(7919)),
            max_particles,
        }
    }

    /// Seed a burst from one of the fixed emitters.
    pub fn emit(&mut self, kind: EmitterKind, at: Vec2) {
        self.emit_with(&kind.config(), at);
    }

    pub fn emit_with(&mut self, config: &EmitterConfig, at: Vec2) {
        for _ in 0..config.count {
            let vel = match config.spread {
                Spread::Box { vx, vy } => Vec2::new(self.rng.range(vx.0, vx.1), self.rng.range(vy.0, vy.1)),
                Spread::Radial { speed } => {
                    let angle = self.rng.range(0.0, std::f32::consts::TAU);
                    Vec2::new(angle.cos(), angle.sin()) * self.rng.range(speed.0, speed.1)
                }
            };
            let color = self.rng.pick(config.palette).copied().unwrap_or("#ffffff");
            let options = ParticleOptions {
                vel,
                life_ms: self.rng.range(config.life_ms.0, config.life_ms.1),
                size: self.rng.range(config.size.0, config.size.1),
                color,
                gravity: config.gravity,
                friction: config.friction,
                fade_out: config.fade_out,
            };
            self.create_particle(at.x, at.y, options);
        }
    }

    /// Add one particle. The oldest particle is dropped when the cap is reached.
    pub fn create_particle(&mut self, x: f32, y: f32, options: ParticleOptions) {
        if self.max_particles == 0 {
            return;
        }
        if self.particles.len() >= self.max_particles {
            self.particles.remove(0);
        }
        self.particles.push(Particle {
            pos: Vec2::new(x, y),
            vel: options.vel,
            life_ms: options.life_ms,
            max_life_ms: options.life_ms,
            size: options.size,
            color: options.color,
            gravity: options.gravity,
            friction: options.friction,
            fade_out: options.fade_out,
        });
    }

    pub fn update(&mut self, dt_ms: f32) {
        if dt_ms <= 0.0 {
            return;
        }
        self.particles.retain_mut(|p| p.tick(dt_ms));
    }

    pub fn draw(&self, surface: &mut dyn DrawSurface) {
        if self.particles.is_empty() {
            return;
        }
        for p in &self.particles {
            surface.set_global_alpha(p.alpha());
            surface.set_fill_style(p.color);
            surface.fill_circle(p.pos.x, p.pos.y, p.size);
        }
        surface.set_global_alpha(1.0);
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}
