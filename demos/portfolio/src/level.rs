//! Authored level layout: world size, spawn point, platforms and boundary walls.

use std::collections::HashSet;
use std::fmt;

use folio_engine::{BodyDesc, ColliderDesc, ColliderMaterial, DrawSurface, EngineError, PhysicsWorld};
use glam::Vec2;
use serde::Deserialize;

use crate::entity::{BodyKind, PlatformKind};

/// The built-in level.
pub const LEVEL_JSON: &str = include_str!("../assets/level.json");

/// Falling this far below the ground line is death.
pub const DEFAULT_DEATH_MARGIN: f32 = 200.0;

pub const LEFT_WALL_ID: &str = "wall-left";
pub const RIGHT_WALL_ID: &str = "wall-right";
const WALL_THICKNESS: f32 = 50.0;

/// Error type for level loading
#[derive(Debug)]
pub enum LevelError {
    ParseError(serde_json::Error),
    ValidationError(String),
}

impl From<serde_json::Error> for LevelError {
    fn from(e: serde_json::Error) -> Self {
        LevelError::ParseError(e)
    }
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::ParseError(e) => write!(f, "Parse error: {}", e),
            LevelError::ValidationError(e) => write!(f, "Validation error: {}", e),
        }
    }
}

impl std::error::Error for LevelError {}

impl From<LevelError> for EngineError {
    fn from(e: LevelError) -> Self {
        EngineError::Init(format!("level: {}", e))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimensions {
    pub width: f32,
    pub height: f32,
    pub ground_level: f32,
}

/// A static platform. Never destroyed.
#[derive(Debug, Clone, PartialEq)]
pub struct Platform {
    pub id: String,
    pub center: Vec2,
    pub size: Vec2,
    pub kind: PlatformKind,
    /// Only mystery boxes carry one.
    pub project: Option<String>,
}

impl Platform {
    pub fn top(&self) -> f32 {
        self.center.y - self.size.y / 2.0
    }

    pub fn left(&self) -> f32 {
        self.center.x - self.size.x / 2.0
    }
}

// -- on-disk shape --

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LevelFile {
    world: Dimensions,
    spawn: PointDef,
    #[serde(default)]
    death_margin: Option<f32>,
    platforms: Vec<PlatformDef>,
}

#[derive(Deserialize)]
struct PointDef {
    x: f32,
    y: f32,
}

#[derive(Deserialize)]
struct PlatformDef {
    id: String,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    kind: PlatformKind,
    #[serde(default)]
    project: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Level {
    dimensions: Dimensions,
    spawn: Vec2,
    death_margin: f32,
    platforms: Vec<Platform>,
}

impl Level {
    /// Parse and validate a level.
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let file: LevelFile = serde_json::from_str(json)?;
        let level = Level {
            dimensions: file.world,
            spawn: Vec2::new(file.spawn.x, file.spawn.y),
            death_margin: file.death_margin.unwrap_or(DEFAULT_DEATH_MARGIN),
            platforms: file
                .platforms
                .into_iter()
                .map(|p| Platform {
                    id: p.id,
                    center: Vec2::new(p.x, p.y),
                    size: Vec2::new(p.width, p.height),
                    kind: p.kind,
                    project: p.project,
                })
                .collect(),
        };
        level.validate()?;
        Ok(level)
    }

    pub fn builtin() -> Result<Self, LevelError> {
        Self::from_json(LEVEL_JSON)
    }

    fn validate(&self) -> Result<(), LevelError> {
        let d = self.dimensions;
        if !(d.width > 0.0 && d.height > 0.0) {
            return Err(LevelError::ValidationError(format!(
                "world must have positive size, got {}x{}",
                d.width, d.height
            )));
        }
        if !(0.0..=d.width).contains(&self.spawn.x) || !(0.0..=d.height).contains(&self.spawn.y) {
            return Err(LevelError::ValidationError(format!(
                "spawn ({}, {}) is outside the world",
                self.spawn.x, self.spawn.y
            )));
        }

        let reserved = [crate::player::PLAYER_ID, LEFT_WALL_ID, RIGHT_WALL_ID];
        let mut seen = HashSet::new();
        for p in &self.platforms {
            if reserved.contains(&p.id.as_str()) || p.id.starts_with(crate::collectible::ID_PREFIX) {
                return Err(LevelError::ValidationError(format!("platform id '{}' is reserved", p.id)));
            }
            if !seen.insert(p.id.as_str()) {
                return Err(LevelError::ValidationError(format!("duplicate platform id '{}'", p.id)));
            }
            if !(p.size.x > 0.0 && p.size.y > 0.0) {
                return Err(LevelError::ValidationError(format!("platform '{}' has no area", p.id)));
            }
            let has_project = p.project.as_deref().is_some_and(|s| !s.is_empty());
            if p.kind == PlatformKind::MysteryBox && !has_project {
                return Err(LevelError::ValidationError(format!(
                    "mystery box '{}' needs a project",
                    p.id
                )));
            }
        }
        Ok(())
    }

    /// Register every non-box platform and both boundary walls.
    pub fn register(&self, physics: &mut PhysicsWorld<BodyKind>) {
        let material = ColliderMaterial {
            restitution: 0.0,
            friction: 0.0,
            density: 1.0,
        };
        for p in self.platforms.iter().filter(|p| p.kind != PlatformKind::MysteryBox) {
            let desc = BodyDesc::fixed(ColliderDesc::Cuboid {
                half_width: p.size.x / 2.0,
                half_height: p.size.y / 2.0,
            })
            .with_position(p.center);
            physics.add_body(p.id.as_str(), BodyKind::Platform(p.kind), &desc, material);
        }

        // Walls reach a full world height above and below so nothing slips round them
        let h = self.dimensions.height;
        let wall = ColliderDesc::Cuboid {
            half_width: WALL_THICKNESS / 2.0,
            half_height: h * 1.5,
        };
        let left = BodyDesc::fixed(wall).with_position(Vec2::new(-WALL_THICKNESS / 2.0, h / 2.0));
        let right = BodyDesc::fixed(wall).with_position(Vec2::new(self.dimensions.width + WALL_THICKNESS / 2.0, h / 2.0));
        physics.add_body(LEFT_WALL_ID, BodyKind::Boundary, &left, material);
        physics.add_body(RIGHT_WALL_ID, BodyKind::Boundary, &right, material);
        log::info!(
            "level: {} platforms, {} boxes",
            self.platforms.len(),
            self.mystery_boxes().count()
        );
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn spawn_point(&self) -> Vec2 {
        self.spawn
    }

    pub fn death_y(&self) -> f32 {
        self.dimensions.ground_level + self.death_margin
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    /// Mystery box layout with each box's project.
    pub fn mystery_boxes(&self) -> impl Iterator<Item = (&Platform, &str)> {
        self.platforms
            .iter()
            .filter(|p| p.kind == PlatformKind::MysteryBox)
            .filter_map(|p| p.project.as_deref().map(|project| (p, project)))
    }

    /// Decorative drawing, in world space. Boxes draw themselves.
    pub fn draw(&self, surface: &mut dyn DrawSurface) {
        for p in &self.platforms {
            match p.kind {
                PlatformKind::Grass => draw_grass(surface, p),
                PlatformKind::Stone => draw_stone(surface, p),
                PlatformKind::Floating => draw_floating(surface, p),
                PlatformKind::Victory => draw_victory(surface, p),
                PlatformKind::MysteryBox => {}
            }
        }
    }
}

fn draw_grass(surface: &mut dyn DrawSurface, p: &Platform) {
    let (x, y) = (p.left(), p.top());
    surface.set_fill_style("#8b5a2b");
    surface.fill_rect(x, y, p.size.x, p.size.y);
    surface.set_fill_style("#4caf50");
    surface.fill_rect(x, y, p.size.x, 12.0_f32.min(p.size.y));

    // Tufts
    surface.set_stroke_style("#2e7d32");
    surface.set_line_width(2.0);
    let mut tx = x + 12.0;
    while tx < x + p.size.x - 4.0 {
        surface.stroke_polyline(&[[tx - 3.0, y], [tx, y - 5.0], [tx + 3.0, y]]);
        tx += 24.0;
    }
}

fn draw_stone(surface: &mut dyn DrawSurface, p: &Platform) {
    let (x, y) = (p.left(), p.top());
    surface.set_fill_style("#9ca3af");
    surface.fill_rect(x, y, p.size.x, p.size.y);

    // Mortar courses, joints offset every other row
    surface.set_stroke_style("#6b7280");
    surface.set_line_width(1.0);
    let mut row = 0;
    let mut ry = y;
    while ry < y + p.size.y {
        let bottom = (ry + 10.0).min(y + p.size.y);
        surface.stroke_polyline(&[[x, bottom], [x + p.size.x, bottom]]);
        let mut bx = x + if row % 2 == 0 { 20.0 } else { 10.0 };
        while bx < x + p.size.x {
            surface.stroke_polyline(&[[bx, ry], [bx, bottom]]);
            bx += 20.0;
        }
        ry += 10.0;
        row += 1;
    }
    surface.stroke_rect(x, y, p.size.x, p.size.y);
}

fn draw_floating(surface: &mut dyn DrawSurface, p: &Platform) {
    let (x, y) = (p.left(), p.top());
    // Soft shadow underneath
    surface.set_global_alpha(0.25);
    surface.set_fill_style("#000000");
    surface.fill_rect(x + 6.0, y + p.size.y, p.size.x - 12.0, 4.0);
    surface.set_global_alpha(1.0);

    surface.set_fill_style("#d4a373");
    surface.fill_rect(x, y, p.size.x, p.size.y);
    surface.set_fill_style("#a98467");
    surface.fill_rect(x, y + p.size.y - 5.0, p.size.x, 5.0);
}

fn draw_victory(surface: &mut dyn DrawSurface, p: &Platform) {
    let (x, y) = (p.left(), p.top());
    surface.set_fill_style("#fde047");
    surface.fill_rect(x, y, p.size.x, p.size.y);
    surface.set_stroke_style("#ca8a04");
    surface.set_line_width(2.0);
    surface.stroke_rect(x, y, p.size.x, p.size.y);

    // Flag
    let pole_x = x + p.size.x - 16.0;
    surface.stroke_polyline(&[[pole_x, y], [pole_x, y - 64.0]]);
    surface.set_fill_style("#ef4444");
    surface.begin_path();
    surface.move_to(pole_x, y - 64.0);
    surface.line_to(pole_x - 28.0, y - 54.0);
    surface.line_to(pole_x, y - 44.0);
    surface.close_path();
    surface.fill();
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_engine::{BodyId, RecordingSurface};

    #[test]
    fn builtin_level_loads() {
        let level = Level::builtin().unwrap();
        assert_eq!(level.spawn_point(), Vec2::new(200.0, 400.0));
        assert_eq!(level.dimensions().ground_level, 500.0);
        assert_eq!(level.death_y(), 700.0);
        assert!(level.mystery_boxes().count() >= 3);
        assert!(level.platforms().iter().any(|p| p.kind == PlatformKind::Victory));
    }

    #[test]
    fn spawn_stands_over_ground() {
        let level = Level::builtin().unwrap();
        let spawn = level.spawn_point();
        let under = level
            .platforms()
            .iter()
            .find(|p| p.kind == PlatformKind::Grass && (p.left()..p.left() + p.size.x).contains(&spawn.x));
        assert_eq!(under.map(|p| p.top()), Some(500.0));
    }

    #[test]
    fn register_skips_boxes_and_adds_walls() {
        let level = Level::builtin().unwrap();
        let mut physics = PhysicsWorld::new(Vec2::ZERO);
        level.register(&mut physics);
        let boxes = level.mystery_boxes().count();
        assert_eq!(physics.body_count(), level.platforms().len() - boxes + 2);
        assert!(!physics.contains(&BodyId::from("box-1")));
        assert_eq!(
            physics.get_body(&BodyId::from(LEFT_WALL_ID)).map(|b| b.kind),
            Some(BodyKind::Boundary)
        );
        assert_eq!(
            physics.get_body(&BodyId::from("ground-1")).map(|b| b.kind),
            Some(BodyKind::Platform(PlatformKind::Grass))
        );
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(matches!(Level::from_json("{"), Err(LevelError::ParseError(_))));
    }

    #[test]
    fn box_without_project_is_rejected() {
        let json = r#"{
            "world": {"width": 1000, "height": 600, "groundLevel": 500},
            "spawn": {"x": 100, "y": 400},
            "platforms": [{"id": "box-1", "x": 300, "y": 400, "width": 40, "height": 40, "kind": "mysteryBox"}]
        }"#;
        let err = Level::from_json(json).unwrap_err();
        assert!(matches!(err, LevelError::ValidationError(_)));
        assert!(err.to_string().contains("box-1"));
    }

    #[test]
    fn duplicate_and_reserved_ids_are_rejected() {
        let dup = r#"{
            "world": {"width": 1000, "height": 600, "groundLevel": 500},
            "spawn": {"x": 100, "y": 400},
            "platforms": [
                {"id": "a", "x": 300, "y": 550, "width": 40, "height": 40, "kind": "grass"},
                {"id": "a", "x": 600, "y": 550, "width": 40, "height": 40, "kind": "stone"}
            ]
        }"#;
        assert!(Level::from_json(dup).is_err());

        let reserved = dup.replacen("\"a\"", "\"player\"", 1);
        assert!(Level::from_json(&reserved).is_err());
    }

    #[test]
    fn death_margin_override() {
        let json = r#"{
            "world": {"width": 1000, "height": 600, "groundLevel": 400},
            "spawn": {"x": 100, "y": 300},
            "deathMargin": 50,
            "platforms": []
        }"#;
        assert_eq!(Level::from_json(json).unwrap().death_y(), 450.0);
    }

    #[test]
    fn level_error_becomes_init_error() {
        let err: EngineError = Level::from_json("[]").unwrap_err().into();
        assert!(matches!(err, EngineError::Init(_)));
    }

    #[test]
    fn drawing_skips_boxes() {
        let level = Level::builtin().unwrap();
        let mut surface = RecordingSurface::new(800.0, 600.0);
        level.draw(&mut surface);
        assert!(!surface.commands.is_empty());
        assert!(surface.texts().is_empty());
    }
}
