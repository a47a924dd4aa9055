//! Debug rendering: opt-in collider visualization.
//!
//! Call `draw_collider_outlines()` from `Game::render()` while the camera
//! transform is applied to see hitboxes in world space.

use crate::core::physics::{ColliderDesc, PhysicsWorld};
use crate::renderer::surface::DrawSurface;
use glam::Vec2;

/// Stroke colors for solid and sensor colliders.
pub const SOLID_COLOR: &str = "#00ff66";
pub const SENSOR_COLOR: &str = "#ffcc00";

/// Draw wireframe outlines for every collider in the world.
///
/// Sensors get their own color so pickup volumes are easy to tell apart.
pub fn draw_collider_outlines<K: Copy + 'static>(
    surface: &mut dyn DrawSurface,
    physics: &PhysicsWorld<K>,
    line_width: f32,
) {
    surface.save();
    surface.set_line_width(line_width);
    for body in physics.bodies() {
        let shape = match &body.shape {
            Some(s) => s,
            None => continue,
        };
        surface.set_stroke_style(if body.sensor { SENSOR_COLOR } else { SOLID_COLOR });
        surface.stroke_polyline(&collider_outline(body.position, shape));
    }
    surface.restore();
}

/// Generate outline points for a collider shape centered at `center`.
pub fn collider_outline(center: Vec2, shape: &ColliderDesc) -> Vec<[f32; 2]> {
    match *shape {
        ColliderDesc::Ball { radius } => {
            // 24-segment circle
            let segments = 24;
            (0..=segments)
                .map(|i| {
                    let angle = (i as f32 / segments as f32) * std::f32::consts::TAU;
                    [center.x + angle.cos() * radius, center.y + angle.sin() * radius]
                })
                .collect()
        }
        ColliderDesc::Cuboid {
            half_width,
            half_height,
        } => {
            // Rotation is locked on every body, so corners are axis aligned.
            let (l, r) = (center.x - half_width, center.x + half_width);
            let (t, b) = (center.y - half_height, center.y + half_height);
            vec![[l, t], [r, t], [r, b], [l, b], [l, t]]
        }
    }
}
