use std::cell::Cell;
use std::rc::Rc;

use folio_engine::input::touch::Stick;
use folio_engine::{
    draw_collider_outlines, Action, AudioControl, Bounds, Camera, ContactPair, DrawSurface, EngineContext,
    EngineError, Game, GameConfig, HostEvent, InputState, KeyValueStore, ParticleSystem, PhysicsWorld, ShakePreset,
};
use glam::Vec2;

use crate::collectible::{sprite_key, Collectible};
use crate::entity::{BodyKind, Command, Commands, Entity, FrameCtx};
use crate::events::SoundKind;
use crate::level::Level;
use crate::mystery_box::MysteryBox;
use crate::persistence::{BoxStates, StoredBoxState, STORAGE_KEY};
use crate::player::Player;
use crate::respawn::RespawnMonitor;
use crate::tuning::Tuning;

/// Engine settings bundled with the game. Fields left out keep their defaults.
pub const ENGINE_JSON: &str = include_str!("../assets/engine.json");

const SKY_COLOR: &str = "#87ceeb";
const HUD_COLOR: &str = "#ffffff";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Playing,
    Paused,
}

/// Frame bookkeeping and flags that outlive a session.
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub run_state: RunState,
    pub game_time_ms: f64,
    pub last_frame_ms: f64,
    pub delta_ms: f32,
    pub respawn_count: u32,
    pub debug: bool,
    /// A project panel opened by a pickup is still showing.
    pub overlay_open: bool,
    pub fps: u32,
    fps_frames: u32,
    fps_window_ms: f32,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            run_state: RunState::Playing,
            game_time_ms: 0.0,
            last_frame_ms: 0.0,
            delta_ms: 0.0,
            respawn_count: 0,
            debug: false,
            overlay_open: false,
            fps: 0,
            fps_frames: 0,
            fps_window_ms: 0.0,
        }
    }
}

impl GameState {
    fn count_frame(&mut self, dt_ms: f32) {
        self.fps_frames += 1;
        self.fps_window_ms += dt_ms;
        if self.fps_window_ms >= 1000.0 {
            self.fps = (self.fps_frames as f32 * 1000.0 / self.fps_window_ms).round() as u32;
            self.fps_frames = 0;
            self.fps_window_ms = 0.0;
        }
    }
}

/// Close-up after landing on the victory platform. Plays once per session.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Victory {
    Pending,
    Holding { remaining_ms: f32 },
    Done,
}

/// Everything built from the level. Dropped and rebuilt on reset.
struct Session {
    level: Level,
    physics: PhysicsWorld<BodyKind>,
    player: Player,
    boxes: Vec<MysteryBox>,
    collectibles: Vec<Collectible>,
    commands: Commands,
    camera: Camera,
    particles: ParticleSystem,
    respawn: RespawnMonitor,
    box_states: BoxStates,
    contacts: Rc<Cell<u64>>,
    victory: Victory,
    touch_stick: Option<Stick>,
}

impl Session {
    fn build(tuning: &Tuning, config: &GameConfig, viewport: Vec2, store: &dyn KeyValueStore) -> Result<Self, EngineError> {
        let level = Level::builtin()?;
        let mut physics = PhysicsWorld::new(config.gravity);
        level.register(&mut physics);

        let spawn = level.spawn_point();
        let player = Player::new(&mut physics, spawn, tuning.player.clone());

        let box_states = BoxStates::load(store);
        let mut boxes = Vec::new();
        for (platform, project) in level.mystery_boxes() {
            let mut b = MysteryBox::new(
                &mut physics,
                platform,
                project,
                tuning.mystery_box.clone(),
                &tuning.collectible,
            );
            if let Some(saved) = box_states.get(&platform.id) {
                b.restore(saved.restored());
            }
            boxes.push(b);
        }

        let contacts = Rc::new(Cell::new(0u64));
        let counter = Rc::clone(&contacts);
        physics.on_contact_start(move |pairs| counter.set(counter.get() + pairs.len() as u64));

        let d = level.dimensions();
        let bounds = Bounds {
            min_x: 0.0,
            max_x: d.width,
            min_y: 0.0,
            max_y: d.height,
        };
        let mut camera = Camera::new(viewport, bounds, tuning.camera, config.seed);
        camera.snap_to(spawn);

        let respawn = RespawnMonitor::new(level.death_y(), tuning.respawn_delay_ms);

        Ok(Self {
            level,
            physics,
            player,
            boxes,
            collectibles: Vec::new(),
            commands: Commands::new(),
            camera,
            particles: ParticleSystem::new(config.seed, config.max_particles),
            respawn,
            box_states,
            contacts,
            victory: Victory::Pending,
            touch_stick: None,
        })
    }

    fn dispatch_contacts(&mut self, pairs: &[ContactPair<BodyKind>], started: bool) {
        dispatch(&mut self.player, pairs, started, &mut self.commands);
        for b in self.boxes.iter_mut() {
            dispatch(b, pairs, started, &mut self.commands);
        }
        for c in self.collectibles.iter_mut() {
            dispatch(c, pairs, started, &mut self.commands);
        }
    }
}

/// Route every pair involving `entity` to its contact handler.
fn dispatch(entity: &mut dyn Entity, pairs: &[ContactPair<BodyKind>], started: bool, commands: &mut Commands) {
    for pair in pairs {
        let Some((me, other)) = pair.for_body(entity.body_id()) else {
            continue;
        };
        if started {
            entity.on_contact_start(me, other, commands);
        } else {
            entity.on_contact_end(me, other, commands);
        }
    }
}

/// The portfolio platformer: owns the level session and drives it frame by frame.
pub struct PortfolioGame {
    tuning: Tuning,
    config: GameConfig,
    state: GameState,
    viewport: Vec2,
    session: Option<Session>,
}

impl PortfolioGame {
    pub fn new() -> Self {
        Self::with_tuning(Tuning::default())
    }

    pub fn with_tuning(tuning: Tuning) -> Self {
        let config = GameConfig::from_json(ENGINE_JSON).unwrap_or_else(|e| {
            log::warn!("bundled engine config unreadable, using defaults: {}", e);
            GameConfig::default()
        });
        Self {
            tuning,
            viewport: config.viewport,
            config,
            state: GameState::default(),
            session: None,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    pub fn player(&self) -> Option<&Player> {
        self.session.as_ref().map(|s| &s.player)
    }

    pub fn boxes(&self) -> &[MysteryBox] {
        self.session.as_ref().map(|s| s.boxes.as_slice()).unwrap_or(&[])
    }

    pub fn collectibles(&self) -> &[Collectible] {
        self.session.as_ref().map(|s| s.collectibles.as_slice()).unwrap_or(&[])
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.session.as_ref().map(|s| &s.camera)
    }

    pub fn particle_count(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.particles.len())
    }

    pub fn contact_count(&self) -> u64 {
        self.session.as_ref().map_or(0, |s| s.contacts.get())
    }

    pub fn body_count(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.physics.body_count())
    }

    fn handle_toggles(&mut self, ctx: &mut EngineContext, input: &InputState) {
        if input.pressed(Action::Debug) {
            self.state.debug = !self.state.debug;
            log::info!("debug overlay {}", if self.state.debug { "on" } else { "off" });
        }
        if input.pressed(Action::Mute) {
            ctx.emit(HostEvent::Audio(AudioControl::ToggleMute));
        }
        if input.pressed(Action::VolumeUp) {
            ctx.emit(HostEvent::Audio(AudioControl::VolumeUp));
        }
        if input.pressed(Action::VolumeDown) {
            ctx.emit(HostEvent::Audio(AudioControl::VolumeDown));
        }
    }

    /// Drain the command queue. Commands pushed while draining run in the same pass.
    fn apply_commands(session: &mut Session, state: &mut GameState, tuning: &Tuning, ctx: &mut EngineContext) {
        while let Some(command) = session.commands.pop() {
            match command {
                Command::Sound(kind) => ctx.emit(kind.into()),
                Command::Emit(kind, at) => session.particles.emit(kind, at),
                Command::Shake(preset) => session.camera.shake_preset(preset),
                Command::StrikeBox(id) => {
                    let Some(b) = session.boxes.iter_mut().find(|b| *b.body_id() == id) else {
                        continue;
                    };
                    if b.on_struck_from_below(&mut session.commands) {
                        session.box_states.set(id.as_str(), StoredBoxState::Active);
                        session.box_states.save(&mut *ctx.store);
                    }
                }
                Command::SpawnCollectible { box_id, at, project } => {
                    if session.collectibles.iter().any(|c| *c.box_id() == box_id) {
                        continue;
                    }
                    let origin = session
                        .boxes
                        .iter()
                        .find(|b| *b.body_id() == box_id)
                        .map_or(at, |b| b.center());
                    let c = Collectible::spawn(
                        &mut session.physics,
                        &box_id,
                        origin,
                        at,
                        &project,
                        tuning.collectible.clone(),
                    );
                    session.collectibles.push(c);
                }
                Command::RemoveBody(id) => {
                    session.physics.remove_body(&id);
                }
                Command::CollectibleTaken { box_id } => {
                    if let Some(b) = session.boxes.iter_mut().find(|b| *b.body_id() == box_id) {
                        if b.on_collectible_complete() {
                            session.box_states.set(box_id.as_str(), StoredBoxState::Completed);
                            session.box_states.save(&mut *ctx.store);
                        }
                    }
                }
                Command::OpenProject(project) => {
                    log::info!("opening project '{}'", project);
                    ctx.emit(HostEvent::OpenProject(project));
                    state.overlay_open = true;
                    state.run_state = RunState::Paused;
                }
                Command::ReachedVictory => {
                    if session.victory == Victory::Pending {
                        session.camera.zoom_to_player(tuning.victory_zoom, tuning.victory_zoom_ms);
                        session.victory = Victory::Holding {
                            remaining_ms: tuning.victory_hold_ms,
                        };
                        log::info!("victory platform reached");
                    }
                }
            }
        }
    }

    /// Ask the host to take down a project panel the game opened.
    fn close_overlay(&mut self, ctx: &mut EngineContext) {
        if self.state.overlay_open {
            ctx.emit(HostEvent::CloseOverlay);
            self.state.overlay_open = false;
        }
    }

    fn draw_hud(&self, surface: &mut dyn DrawSurface) {
        let Some(session) = self.session.as_ref() else {
            return;
        };

        if let Some(stick) = session.touch_stick {
            surface.set_global_alpha(0.35);
            surface.set_fill_style(HUD_COLOR);
            surface.fill_circle(stick.origin.x, stick.origin.y, 50.0);
            surface.set_global_alpha(0.7);
            surface.fill_circle(stick.current.x, stick.current.y, 20.0);
            surface.set_global_alpha(1.0);
        }

        if !self.state.debug {
            return;
        }
        surface.set_fill_style("rgba(0, 0, 0, 0.5)");
        surface.fill_rect(8.0, 8.0, 170.0, 66.0);
        surface.set_fill_style(HUD_COLOR);
        surface.set_font("14px monospace");
        surface.fill_text(&format!("FPS: {}", self.state.fps), 16.0, 28.0);
        surface.fill_text(&format!("Respawns: {}", self.state.respawn_count), 16.0, 46.0);
        surface.fill_text(&format!("Contacts: {}", session.contacts.get()), 16.0, 64.0);
    }
}

impl Default for PortfolioGame {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for PortfolioGame {
    fn config(&self) -> GameConfig {
        self.config.clone()
    }

    fn init(&mut self, ctx: &mut EngineContext) -> Result<(), EngineError> {
        self.viewport = ctx.viewport;
        let session = Session::build(&self.tuning, &self.config, self.viewport, &*ctx.store)?;
        log::info!(
            "portfolio ready: {} bodies, {} boxes",
            session.physics.body_count(),
            session.boxes.len()
        );
        self.session = Some(session);
        self.state = GameState::default();
        Ok(())
    }

    fn update(&mut self, ctx: &mut EngineContext, input: &InputState) {
        self.handle_toggles(ctx, input);

        self.state.delta_ms = ctx.delta_ms;
        self.state.game_time_ms = ctx.game_time_ms;
        self.state.last_frame_ms = ctx.last_frame_ms;
        self.state.count_frame(ctx.delta_ms);

        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.touch_stick = input.touch().stick();
        if self.state.run_state == RunState::Paused {
            return;
        }
        let dt = ctx.delta_ms;

        let events = session.physics.step(dt);
        session.dispatch_contacts(&events.started, true);
        session.dispatch_contacts(&events.ended, false);
        Self::apply_commands(session, &mut self.state, &self.tuning, ctx);

        {
            let mut frame = FrameCtx {
                dt_ms: dt,
                input,
                physics: &mut session.physics,
                commands: &mut session.commands,
            };
            session.player.update(&mut frame);
            for b in session.boxes.iter_mut() {
                b.update(&mut frame);
            }
            for c in session.collectibles.iter_mut() {
                c.update(&mut frame);
            }
        }

        session.particles.update(dt);

        if session.respawn.check(session.player.position(), dt, &mut session.commands) {
            let spawn = session.level.spawn_point();
            session.player.respawn(&mut session.physics, spawn.x, spawn.y);
            session.commands.push(Command::Sound(SoundKind::Respawn));
            session.commands.push(Command::Shake(ShakePreset::Medium));
            session.camera.reset_position();
            log::info!("player respawned");
        }
        self.state.respawn_count = session.respawn.respawn_count();

        session.camera.follow(session.player.position());
        session.camera.update(dt);
        if let Victory::Holding { remaining_ms } = session.victory {
            let remaining_ms = remaining_ms - dt.max(0.0);
            if remaining_ms <= 0.0 {
                session.camera.zoom_out(self.tuning.victory_zoom_ms);
                session.victory = Victory::Done;
            } else {
                session.victory = Victory::Holding { remaining_ms };
            }
        }

        Self::apply_commands(session, &mut self.state, &self.tuning, ctx);
        session.collectibles.retain(|c| !c.is_collected());
    }

    fn render(&self, surface: &mut dyn DrawSurface) {
        surface.set_fill_style(SKY_COLOR);
        surface.fill_rect(0.0, 0.0, surface.width(), surface.height());

        let Some(session) = self.session.as_ref() else {
            return;
        };

        session.camera.apply(surface);
        session.level.draw(surface);
        for b in &session.boxes {
            b.draw(surface);
        }
        for c in &session.collectibles {
            c.draw(surface);
        }
        session.particles.draw(surface);
        session.player.draw(surface);
        if self.state.debug {
            draw_collider_outlines(surface, &session.physics, 1.0);
        }
        session.camera.restore(surface);

        self.draw_hud(surface);
    }

    fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width, height);
        if let Some(session) = self.session.as_mut() {
            session.camera.resize(width, height);
        }
    }

    fn pause(&mut self) {
        self.state.run_state = RunState::Paused;
    }

    fn resume(&mut self) {
        self.state.run_state = RunState::Playing;
    }

    fn is_paused(&self) -> bool {
        self.state.run_state == RunState::Paused
    }

    fn reset(&mut self, ctx: &mut EngineContext) {
        self.close_overlay(ctx);
        ctx.store.remove(STORAGE_KEY);
        if let Some(mut old) = self.session.take() {
            old.physics.clear();
        }
        match Session::build(&self.tuning, &self.config, self.viewport, &*ctx.store) {
            Ok(session) => self.session = Some(session),
            Err(e) => log::error!("reset failed: {}", e),
        }
        let debug = self.state.debug;
        self.state = GameState {
            debug,
            ..GameState::default()
        };
        log::info!("game reset");
    }

    fn destroy(&mut self, ctx: &mut EngineContext) {
        self.close_overlay(ctx);
        if let Some(mut session) = self.session.take() {
            session.physics.clear();
        }
        log::info!("game destroyed");
    }

    fn overlay_closed(&mut self, _ctx: &mut EngineContext) {
        self.state.overlay_open = false;
        self.resume();
    }

    fn sprite_sources(&self) -> Vec<(String, String)> {
        let level = match self.session.as_ref() {
            Some(s) => s.level.clone(),
            None => match Level::builtin() {
                Ok(level) => level,
                Err(e) => {
                    log::warn!("no sprites to preload: {}", e);
                    return Vec::new();
                }
            },
        };
        level
            .mystery_boxes()
            .map(|(_, project)| (sprite_key(project), format!("assets/projects/{}.png", project)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mystery_box::BoxState;
    use crate::player::PLAYER_ID;
    use folio_engine::{Bindings, BodyId, InputEvent, Key, MemoryStore, RecordingSurface, TouchConfig};
    use proptest::prelude::*;

    const DT: f32 = 1000.0 / 60.0;

    struct Harness {
        game: PortfolioGame,
        ctx: EngineContext,
        input: InputState,
        events: Vec<HostEvent>,
    }

    impl Harness {
        fn new() -> Self {
            Self::with_store(MemoryStore::new())
        }

        fn with_store(store: MemoryStore) -> Self {
            let mut ctx = EngineContext::with_store(Box::new(store));
            ctx.viewport = Vec2::new(800.0, 600.0);
            let mut game = PortfolioGame::new();
            game.resize(800.0, 600.0);
            game.init(&mut ctx).unwrap();
            Self {
                game,
                ctx,
                input: InputState::new(Bindings::default(), TouchConfig::default(), Vec2::new(800.0, 600.0)),
                events: Vec::new(),
            }
        }

        fn frame(&mut self, input: Vec<InputEvent>) {
            self.input.begin_frame(input);
            self.ctx.delta_ms = DT;
            self.ctx.game_time_ms += DT as f64;
            self.game.update(&mut self.ctx, &self.input);
            self.events.extend(self.ctx.drain_events());
        }

        fn idle(&mut self, frames: usize) {
            for _ in 0..frames {
                self.frame(Vec::new());
            }
        }

        fn tap(&mut self, key: Key) {
            self.frame(vec![InputEvent::KeyDown { key }]);
            self.frame(vec![InputEvent::KeyUp { key }]);
        }

        fn session(&mut self) -> &mut Session {
            self.game.session.as_mut().unwrap()
        }

        fn player(&self) -> &Player {
            self.game.player().unwrap()
        }

        fn teleport(&mut self, x: f32, y: f32) {
            let s = self.session();
            s.player.respawn(&mut s.physics, x, y);
        }

        /// Run until the player stands on something.
        fn settle(&mut self) {
            for _ in 0..180 {
                self.frame(Vec::new());
                if self.player().is_grounded() {
                    return;
                }
            }
            panic!("player never landed, at {:?}", self.player().position());
        }

        fn sounds(&self) -> Vec<&'static str> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    HostEvent::PlaySound(name) => Some(*name),
                    _ => None,
                })
                .collect()
        }
    }

    #[test]
    fn init_builds_the_world() {
        let h = Harness::new();
        let player = h.player();
        assert_eq!(player.position(), Vec2::new(200.0, 400.0));
        assert_eq!(player.jumps_remaining(), 2);
        assert_eq!(h.game.boxes().len(), 5);
        assert!(h.game.boxes().iter().all(|b| b.state() == BoxState::Armed));
        // platforms + boxes + walls + player
        assert!(h.game.body_count() > 10);
    }

    #[test]
    fn falls_and_lands_on_the_ground() {
        let mut h = Harness::new();
        h.settle();
        let p = h.player();
        assert!((p.y() - 476.0).abs() < 4.0, "resting at {}", p.y());
        assert_eq!(p.jumps_remaining(), 2);
        assert!(h.sounds().contains(&"land"));
        assert!(h.game.contact_count() >= 1);

        // Stays grounded while standing, with one land sound
        h.idle(30);
        let p = h.player();
        assert!(p.is_grounded());
        assert_eq!(p.jumps_remaining(), 2);
        assert_eq!(p.animation(), crate::player::Animation::Idle);
        assert_eq!(h.sounds().iter().filter(|s| **s == "land").count(), 1);
    }

    #[test]
    fn releasing_the_keys_stops_the_player_on_the_ground() {
        let mut h = Harness::new();
        h.settle();
        h.frame(vec![InputEvent::KeyDown { key: Key::ArrowRight }]);
        h.idle(20);
        assert!(h.player().velocity().x > 4.0);

        h.frame(vec![InputEvent::KeyUp { key: Key::ArrowRight }]);
        h.idle(60);
        let p = h.player();
        assert!(p.is_grounded());
        assert!(p.velocity().x.abs() < 0.05, "still sliding at {}", p.velocity().x);
        assert_eq!(p.animation(), crate::player::Animation::Idle);
        let x = p.x();
        h.idle(10);
        assert!((h.player().x() - x).abs() < 0.5);
    }

    #[test]
    fn jump_then_double_jump_then_nothing() {
        let mut h = Harness::new();
        h.settle();
        h.events.clear();

        h.tap(Key::Space);
        assert_eq!(h.player().jumps_remaining(), 1);
        assert!(!h.player().is_grounded());
        assert!(h.player().velocity().y < 0.0);

        // Wait out the cooldown while still airborne
        h.idle(12);
        h.tap(Key::Space);
        assert_eq!(h.player().jumps_remaining(), 0);

        h.idle(12);
        let before = h.player().velocity().y;
        h.tap(Key::Space);
        assert_eq!(h.player().jumps_remaining(), 0);
        assert!(h.player().velocity().y >= before);

        assert_eq!(h.sounds().iter().filter(|s| **s == "jump").count(), 1);
        assert_eq!(h.sounds().iter().filter(|s| **s == "doubleJump").count(), 1);

        // Landing restores the budget
        h.settle();
        assert_eq!(h.player().jumps_remaining(), 2);
    }

    #[test]
    fn cooldown_blocks_instant_second_jump() {
        let mut h = Harness::new();
        h.settle();
        h.tap(Key::Space);
        h.tap(Key::ArrowUp);
        assert_eq!(h.player().jumps_remaining(), 1);
    }

    #[test]
    fn striking_a_box_releases_its_collectible() {
        let mut h = Harness::new();
        h.teleport(500.0, 470.0);
        h.settle();
        h.events.clear();

        h.tap(Key::Space);
        let mut hit = false;
        for _ in 0..40 {
            h.frame(Vec::new());
            if h.game.boxes()[0].state() == BoxState::Hit {
                hit = true;
                break;
            }
        }
        assert!(hit, "box was never struck");
        assert!(h.sounds().contains(&"mysteryBoxHit"));
        assert_eq!(h.game.collectibles().len(), 1);
        assert_eq!(h.game.collectibles()[0].project(), "portfolio-site");
        assert_eq!(
            h.ctx.store.get(STORAGE_KEY).as_deref(),
            Some(r#"{"box-1":"active"}"#)
        );

        // A second strike does nothing
        h.settle();
        h.tap(Key::Space);
        h.idle(30);
        assert_eq!(h.game.collectibles().len(), 1);
        assert_eq!(h.sounds().iter().filter(|s| **s == "mysteryBoxHit").count(), 1);
    }

    #[test]
    fn picking_up_a_collectible_opens_the_project_and_pauses() {
        let mut h = Harness::new();
        h.settle();
        {
            let s = h.session();
            s.commands.push(Command::StrikeBox(BodyId::from("box-1")));
        }
        h.idle(1);
        assert_eq!(h.game.collectibles().len(), 1);

        // Let it finish rising, then walk into it
        h.idle(35);
        assert!(!h.game.collectibles()[0].is_spawning());
        h.teleport(500.0, 340.0);
        for _ in 0..5 {
            h.frame(Vec::new());
            if h.game.is_paused() {
                break;
            }
        }

        assert!(h.game.is_paused());
        assert!(h.events.contains(&HostEvent::OpenProject("portfolio-site".into())));
        assert!(h.sounds().contains(&"mysteryBoxComplete"));
        assert!(h.game.collectibles().is_empty());
        assert!(!h.session().physics.contains(&BodyId::from("collectible-box-1")));
        assert_eq!(h.game.boxes()[0].state(), BoxState::Emptied);
        assert_eq!(
            h.ctx.store.get(STORAGE_KEY).as_deref(),
            Some(r#"{"box-1":"completed"}"#)
        );

        assert!(h.game.state().overlay_open);

        // Host closes the panel
        h.game.overlay_closed(&mut h.ctx);
        assert!(!h.game.is_paused());
        assert!(!h.game.state().overlay_open);
    }

    /// Strike box-1 and put the player on its collectible once it has risen.
    fn open_first_project(h: &mut Harness) {
        h.session().commands.push(Command::StrikeBox(BodyId::from("box-1")));
        h.idle(36);
        h.teleport(500.0, 340.0);
        for _ in 0..5 {
            h.frame(Vec::new());
            if h.game.is_paused() {
                return;
            }
        }
        panic!("collectible was never picked up");
    }

    #[test]
    fn reset_with_a_project_open_closes_it() {
        let mut h = Harness::new();
        h.settle();
        open_first_project(&mut h);
        assert!(h.game.state().overlay_open);
        h.events.clear();

        h.game.reset(&mut h.ctx);
        h.events.extend(h.ctx.drain_events());
        assert_eq!(h.events, vec![HostEvent::CloseOverlay]);
        assert!(!h.game.state().overlay_open);
        assert!(!h.game.is_paused());

        // Nothing left to close
        h.game.reset(&mut h.ctx);
        assert!(h.ctx.drain_events().is_empty());
    }

    #[test]
    fn destroy_with_a_project_open_closes_it() {
        let mut h = Harness::new();
        h.settle();
        open_first_project(&mut h);
        h.events.clear();

        h.game.destroy(&mut h.ctx);
        assert_eq!(h.ctx.drain_events(), vec![HostEvent::CloseOverlay]);
        assert!(!h.game.is_running());
    }

    #[test]
    fn falling_below_the_death_line_respawns_at_spawn() {
        let mut h = Harness::new();
        h.teleport(200.0, 720.0);

        let mut respawned = false;
        for _ in 0..60 {
            h.frame(Vec::new());
            let s = h.session();
            if s.respawn.respawn_count() == 1 && !s.respawn.is_dying() {
                respawned = true;
                break;
            }
        }
        assert!(respawned);
        let p = h.player();
        assert_eq!(p.position(), Vec2::new(200.0, 400.0));
        assert_eq!(p.velocity(), Vec2::ZERO);
        assert_eq!(p.jumps_remaining(), 2);
        assert_eq!(h.game.state().respawn_count, 1);
        assert_eq!(h.sounds().iter().filter(|s| **s == "death").count(), 1);
        assert!(h.sounds().contains(&"respawn"));
        assert!(h.game.particle_count() > 0);
    }

    #[test]
    fn pause_mid_jump_freezes_every_movement_field() {
        let mut h = Harness::new();
        h.settle();
        h.tap(Key::Space);
        h.idle(3);
        assert!(!h.player().is_grounded());

        let snapshot = |p: &Player| {
            (
                p.x(),
                p.y(),
                p.velocity().x,
                p.velocity().y,
                p.jumps_remaining(),
                p.is_grounded(),
            )
        };
        let before = snapshot(h.player());
        h.game.pause();
        h.idle(60);
        h.game.resume();
        assert_eq!(snapshot(h.player()), before);

        // Resumes falling from where it stopped
        h.idle(1);
        assert_ne!(h.player().position(), Vec2::new(before.0, before.1));
    }

    #[test]
    fn pause_is_idempotent_and_freezes_the_world() {
        let mut h = Harness::new();
        h.idle(3);
        h.game.pause();
        h.game.pause();
        let frozen = h.player().position();
        h.idle(10);
        assert_eq!(h.player().position(), frozen);

        h.game.resume();
        h.game.resume();
        h.idle(3);
        assert_ne!(h.player().position(), frozen);
    }

    #[test]
    fn toggles_work_while_paused() {
        let mut h = Harness::new();
        h.game.pause();
        h.tap(Key::F1);
        h.tap(Key::KeyM);
        h.tap(Key::Equal);
        h.tap(Key::Minus);
        assert!(h.game.state().debug);
        assert!(h.events.contains(&HostEvent::Audio(AudioControl::ToggleMute)));
        assert!(h.events.contains(&HostEvent::Audio(AudioControl::VolumeUp)));
        assert!(h.events.contains(&HostEvent::Audio(AudioControl::VolumeDown)));
    }

    #[test]
    fn completed_boxes_come_back_emptied() {
        let mut store = MemoryStore::new();
        store.set(STORAGE_KEY, r#"{"box-2":"completed","box-3":"active","box-4":"bogus"}"#);
        let h = Harness::with_store(store);
        let states: Vec<BoxState> = h.game.boxes().iter().map(|b| b.state()).collect();
        assert_eq!(
            states,
            vec![BoxState::Armed, BoxState::Emptied, BoxState::Armed, BoxState::Armed, BoxState::Armed]
        );
    }

    #[test]
    fn reset_forgets_progress() {
        let mut h = Harness::new();
        {
            let s = h.session();
            s.commands.push(Command::StrikeBox(BodyId::from("box-1")));
        }
        h.idle(1);
        assert!(h.ctx.store.get(STORAGE_KEY).is_some());

        h.game.pause();
        h.game.reset(&mut h.ctx);
        assert!(h.ctx.store.get(STORAGE_KEY).is_none());
        assert!(!h.game.is_paused());
        assert!(h.game.collectibles().is_empty());
        assert!(h.game.boxes().iter().all(|b| b.state() == BoxState::Armed));
        assert_eq!(h.player().position(), Vec2::new(200.0, 400.0));
    }

    #[test]
    fn destroy_releases_the_world() {
        let mut h = Harness::new();
        h.game.destroy(&mut h.ctx);
        assert!(!h.game.is_running());
        assert!(h.ctx.drain_events().is_empty());
        assert_eq!(h.game.body_count(), 0);
        // Later frames are harmless
        h.idle(2);
        let mut surface = RecordingSurface::new(800.0, 600.0);
        h.game.render(&mut surface);
        assert!(surface.is_balanced());
    }

    #[test]
    fn victory_zooms_in_then_out() {
        let mut h = Harness::new();
        h.teleport(3800.0, 380.0);
        let mut zoomed = false;
        for _ in 0..120 {
            h.frame(Vec::new());
            if h.game.camera().unwrap().zoom() > 1.2 {
                zoomed = true;
                break;
            }
        }
        assert!(zoomed);
        h.idle(200);
        assert!((h.game.camera().unwrap().zoom() - 1.0).abs() < 0.01);
    }

    #[test]
    fn render_is_balanced_and_debug_adds_hud() {
        let mut h = Harness::new();
        h.idle(5);
        let mut surface = RecordingSurface::new(800.0, 600.0);
        h.game.render(&mut surface);
        assert!(surface.is_balanced());
        assert!(surface.texts().iter().all(|t| !t.starts_with("FPS")));

        h.tap(Key::F1);
        let mut surface = RecordingSurface::new(800.0, 600.0);
        h.game.render(&mut surface);
        assert!(surface.is_balanced());
        assert!(surface.texts().iter().any(|t| t.starts_with("FPS")));
        assert!(surface.texts().iter().any(|t| t.starts_with("Respawns")));
    }

    #[test]
    fn bundled_engine_config_is_used() {
        let config = PortfolioGame::new().config();
        assert!(GameConfig::from_json(ENGINE_JSON).is_ok());
        assert_eq!(config.gravity, Vec2::new(0.0, 1800.0));
        assert!((config.max_delta_ms - 16.667).abs() < 1e-3);
        assert_eq!(config.max_particles, 512);
    }

    #[test]
    fn sprite_sources_list_every_project() {
        let game = PortfolioGame::new();
        let sources = game.sprite_sources();
        assert_eq!(sources.len(), 5);
        assert!(sources.contains(&(
            "collectible-chat-app".to_string(),
            "assets/projects/chat-app.png".to_string()
        )));
    }

    #[test]
    fn the_player_body_is_registered_once() {
        let h = Harness::new();
        let ids: Vec<_> = h
            .game
            .session
            .as_ref()
            .unwrap()
            .physics
            .bodies()
            .into_iter()
            .filter(|b| b.id.as_str() == PLAYER_ID)
            .collect();
        assert_eq!(ids.len(), 1);
    }

    /// Held keys per frame: bit 0 left, bit 1 right, bit 2 jump.
    fn key_diff(prev: u8, next: u8) -> Vec<InputEvent> {
        let mut events = Vec::new();
        for (bit, key) in [(1u8, Key::ArrowLeft), (2, Key::ArrowRight), (4, Key::Space)] {
            match (prev & bit != 0, next & bit != 0) {
                (false, true) => events.push(InputEvent::KeyDown { key }),
                (true, false) => events.push(InputEvent::KeyUp { key }),
                _ => {}
            }
        }
        events
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn invariants_hold_under_random_input(frames in prop::collection::vec(0u8..8, 1..150)) {
            let mut h = Harness::new();
            let mut held = 0u8;
            let mut states: Vec<BoxState> = h.game.boxes().iter().map(|b| b.state()).collect();
            let mut respawns = 0;

            for next in frames {
                h.frame(key_diff(held, next));
                held = next;

                let p = h.player();
                prop_assert!(p.jumps_remaining() <= p.max_jumps());
                prop_assert!(p.jump_cooldown_ms() >= 0.0);
                prop_assert!(p.velocity().x.abs() <= 5.0 + 1e-4);
                if p.is_grounded() {
                    prop_assert!(p.velocity().y.abs() < 0.5);
                    prop_assert_eq!(p.jumps_remaining(), p.max_jumps());
                }

                let cam = h.game.camera().unwrap();
                let (lo, hi) = cam.clamp_window();
                prop_assert!(cam.pos().x >= lo.x - 1e-3 && cam.pos().x <= hi.x + 1e-3);
                prop_assert!(cam.pos().y >= lo.y - 1e-3 && cam.pos().y <= hi.y + 1e-3);

                for (before, b) in states.iter_mut().zip(h.game.boxes()) {
                    prop_assert!(b.state() >= *before);
                    *before = b.state();
                }

                prop_assert!(h.game.state().respawn_count >= respawns);
                respawns = h.game.state().respawn_count;
            }
        }
    }
}
