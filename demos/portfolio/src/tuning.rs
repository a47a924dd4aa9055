//! Gameplay constants as value records. Velocities and accelerations are in
//! pixels per 60 Hz frame; times in milliseconds.

use folio_engine::CameraConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerTuning {
    pub width: f32,
    pub height: f32,
    /// Horizontal velocity gained per frame while a direction is held.
    pub move_accel: f32,
    pub max_speed: f32,
    /// Horizontal damping per frame when grounded with no input.
    pub ground_damping: f32,
    pub jump_velocity: f32,
    pub jump_cooldown_ms: f32,
    pub max_jumps: u32,
    /// How far the player's bottom may sit below a platform top and still land on it.
    pub ground_tolerance: f32,
    /// Slowest upward speed at contact that still counts as landing.
    pub min_landing_vy: f32,
    /// Centre offset below a box required for a strike.
    pub strike_offset: f32,
    pub recheck_delay_ms: f32,
    pub recheck_fall_vy: f32,
    /// Falling faster than this clears grounded.
    pub airborne_vy: f32,
    /// Grounded is only kept while `|vy|` stays under this.
    pub grounded_max_vy: f32,
    /// Contact friction. Ground damping is applied in code.
    pub friction: f32,
    pub anim_frame_ms: f32,
    pub idle_frames: u32,
    pub walk_frames: u32,
    pub jump_frames: u32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            width: 32.0,
            height: 48.0,
            move_accel: 0.6,
            max_speed: 5.0,
            ground_damping: 0.92,
            jump_velocity: -7.5,
            jump_cooldown_ms: 200.0,
            max_jumps: 2,
            ground_tolerance: 10.0,
            min_landing_vy: -2.0,
            strike_offset: 10.0,
            recheck_delay_ms: 50.0,
            recheck_fall_vy: 0.8,
            airborne_vy: 0.1,
            grounded_max_vy: 0.5,
            friction: 0.0,
            anim_frame_ms: 150.0,
            idle_frames: 4,
            walk_frames: 6,
            jump_frames: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CollectibleTuning {
    pub radius: f32,
    /// Hover height above the box centre.
    pub spawn_offset: f32,
    pub spawn_ms: f32,
    pub bob_period_ms: f32,
    pub bob_amplitude: f32,
}

impl Default for CollectibleTuning {
    fn default() -> Self {
        Self {
            radius: 16.0,
            spawn_offset: 40.0,
            spawn_ms: 500.0,
            bob_period_ms: 1500.0,
            bob_amplitude: 8.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoxTuning {
    pub bounce_ms: f32,
    pub bounce_height: f32,
}

impl Default for BoxTuning {
    fn default() -> Self {
        Self {
            bounce_ms: 200.0,
            bounce_height: 12.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Tuning {
    pub player: PlayerTuning,
    pub collectible: CollectibleTuning,
    pub mystery_box: BoxTuning,
    pub camera: CameraConfig,
    pub respawn_delay_ms: f32,
    pub victory_zoom: f32,
    pub victory_zoom_ms: f32,
    /// How long the victory close-up holds before zooming back out.
    pub victory_hold_ms: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player: PlayerTuning::default(),
            collectible: CollectibleTuning::default(),
            mystery_box: BoxTuning::default(),
            camera: CameraConfig::default(),
            respawn_delay_ms: 200.0,
            victory_zoom: 1.25,
            victory_zoom_ms: 600.0,
            victory_hold_ms: 1500.0,
        }
    }
}
