use folio_engine::{EmitterKind, ShakePreset};
use glam::Vec2;

use crate::entity::{Command, Commands};
use crate::events::SoundKind;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RespawnPhase {
    Alive,
    /// Fell past the death line; respawn once the delay runs out.
    Dying { remaining_ms: f32 },
}

/// Watches the player's height against the death line.
#[derive(Debug, Clone)]
pub struct RespawnMonitor {
    death_y: f32,
    delay_ms: f32,
    phase: RespawnPhase,
    respawn_count: u32,
}

impl RespawnMonitor {
    pub fn new(death_y: f32, delay_ms: f32) -> Self {
        Self {
            death_y,
            delay_ms,
            phase: RespawnPhase::Alive,
            respawn_count: 0,
        }
    }

    /// Check after the player update. Returns true on the frame the player
    /// should be respawned.
    pub fn check(&mut self, player_pos: Vec2, dt_ms: f32, commands: &mut Commands) -> bool {
        match self.phase {
            RespawnPhase::Alive => {
                if player_pos.y > self.death_y {
                    self.phase = RespawnPhase::Dying {
                        remaining_ms: self.delay_ms,
                    };
                    self.respawn_count += 1;
                    commands.push(Command::Sound(SoundKind::Death));
                    commands.push(Command::Shake(ShakePreset::Heavy));
                    commands.push(Command::Emit(EmitterKind::DeathBurst, player_pos));
                    log::debug!("player died at y={:.0} (#{})", player_pos.y, self.respawn_count);
                }
                false
            }
            RespawnPhase::Dying { remaining_ms } => {
                let remaining_ms = remaining_ms - dt_ms.max(0.0);
                if remaining_ms <= 0.0 {
                    self.phase = RespawnPhase::Alive;
                    true
                } else {
                    self.phase = RespawnPhase::Dying { remaining_ms };
                    false
                }
            }
        }
    }

    pub fn phase(&self) -> RespawnPhase {
        self.phase
    }

    pub fn is_dying(&self) -> bool {
        matches!(self.phase, RespawnPhase::Dying { .. })
    }

    pub fn respawn_count(&self) -> u32 {
        self.respawn_count
    }

    pub fn death_y(&self) -> f32 {
        self.death_y
    }
}
