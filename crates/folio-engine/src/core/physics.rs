use glam::Vec2;
use rapier2d::geometry::ContactPair as RapierContactPair;
use rapier2d::prelude::*;
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

/// Simulation steps per second that velocities are expressed against.
/// Public velocities are "pixels per 1/60 s step"; rapier works in pixels per second.
const STEPS_PER_SECOND: f32 = 60.0;

// ---------------------------------------------------------------------------
// glam <-> nalgebra, and px-per-step <-> px-per-second
// ---------------------------------------------------------------------------

fn vec2_to_na(v: Vec2) -> nalgebra::Vector2<f32> {
    nalgebra::Vector2::new(v.x, v.y)
}

fn na_to_vec2(v: &nalgebra::Vector2<f32>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

fn step_to_rapier(v: Vec2) -> nalgebra::Vector2<f32> {
    vec2_to_na(v * STEPS_PER_SECOND)
}

fn rapier_to_step(v: &nalgebra::Vector2<f32>) -> Vec2 {
    na_to_vec2(v) / STEPS_PER_SECOND
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Stable string key of a body in the physics registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(String);

impl BodyId {
    pub fn new(id: impl Into<String>) -> Self {
        BodyId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BodyId {
    fn from(s: &str) -> Self {
        BodyId(s.to_string())
    }
}

impl From<String> for BodyId {
    fn from(s: String) -> Self {
        BodyId(s)
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The kind of rigid body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyType {
    Dynamic,
    Fixed,
    KinematicPositionBased,
}

impl BodyType {
    fn to_rapier(self) -> RigidBodyType {
        match self {
            BodyType::Dynamic => RigidBodyType::Dynamic,
            BodyType::Fixed => RigidBodyType::Fixed,
            BodyType::KinematicPositionBased => RigidBodyType::KinematicPositionBased,
        }
    }
}

/// Shape description for a collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderDesc {
    Ball { radius: f32 },
    Cuboid { half_width: f32, half_height: f32 },
}

impl ColliderDesc {
    fn build_collider(&self) -> ColliderBuilder {
        match *self {
            ColliderDesc::Ball { radius } => ColliderBuilder::ball(radius),
            ColliderDesc::Cuboid { half_width, half_height } => {
                ColliderBuilder::cuboid(half_width, half_height)
            }
        }
    }
}

/// Physical material properties for a collider.
#[derive(Debug, Clone, Copy)]
pub struct ColliderMaterial {
    pub restitution: f32,
    pub friction: f32,
    pub density: f32,
}

impl Default for ColliderMaterial {
    fn default() -> Self {
        Self {
            restitution: 0.3,
            friction: 0.5,
            density: 1.0,
        }
    }
}

/// Builder for describing a rigid body before creation.
#[derive(Debug, Clone)]
pub struct BodyDesc {
    pub body_type: BodyType,
    pub position: Vec2,
    /// Initial velocity in pixels per step.
    pub velocity: Vec2,
    pub gravity_scale: f32,
    pub fixed_rotation: bool,
    pub ccd: bool,
    pub can_sleep: bool,
    pub sensor: bool,
    pub collider: ColliderDesc,
    pub linear_damping: f32,
}

impl BodyDesc {
    fn with_type(body_type: BodyType, collider: ColliderDesc) -> Self {
        Self {
            body_type,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            gravity_scale: if body_type == BodyType::Dynamic { 1.0 } else { 0.0 },
            fixed_rotation: body_type != BodyType::Dynamic,
            ccd: false,
            can_sleep: true,
            sensor: false,
            collider,
            linear_damping: 0.0,
        }
    }

    /// Create a dynamic body description with the given collider shape.
    pub fn dynamic(collider: ColliderDesc) -> Self {
        Self::with_type(BodyType::Dynamic, collider)
    }

    /// Create a fixed (static) body description with the given collider shape.
    pub fn fixed(collider: ColliderDesc) -> Self {
        Self::with_type(BodyType::Fixed, collider)
    }

    /// Create a body moved by explicit position targets each frame.
    pub fn kinematic(collider: ColliderDesc) -> Self {
        Self::with_type(BodyType::KinematicPositionBased, collider)
    }

    pub fn with_position(mut self, pos: Vec2) -> Self {
        self.position = pos;
        self
    }

    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.velocity = vel;
        self
    }

    pub fn with_gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = scale;
        self
    }

    pub fn with_fixed_rotation(mut self, fixed: bool) -> Self {
        self.fixed_rotation = fixed;
        self
    }

    pub fn with_ccd(mut self, enabled: bool) -> Self {
        self.ccd = enabled;
        self
    }

    pub fn with_can_sleep(mut self, can_sleep: bool) -> Self {
        self.can_sleep = can_sleep;
        self
    }

    /// Report overlaps without producing contact forces.
    pub fn with_sensor(mut self) -> Self {
        self.sensor = true;
        self
    }

    pub fn with_linear_damping(mut self, damping: f32) -> Self {
        self.linear_damping = damping;
        self
    }
}

/// One side of a contact, captured when the narrow phase reported it,
/// before the solver resolved the contact.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactSide<K> {
    pub id: BodyId,
    pub kind: K,
    pub position: Vec2,
    /// Pixels per step.
    pub velocity: Vec2,
    pub half_extents: Vec2,
    pub sensor: bool,
}

impl<K> ContactSide<K> {
    pub fn top(&self) -> f32 {
        self.position.y - self.half_extents.y
    }

    pub fn bottom(&self) -> f32 {
        self.position.y + self.half_extents.y
    }
}

/// Two bodies whose contact started or ended during a step.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactPair<K> {
    pub a: ContactSide<K>,
    pub b: ContactSide<K>,
}

impl<K> ContactPair<K> {
    /// Split into `(this body, the other body)` if `id` takes part in the pair.
    pub fn for_body(&self, id: &BodyId) -> Option<(&ContactSide<K>, &ContactSide<K>)> {
        if &self.a.id == id {
            Some((&self.a, &self.b))
        } else if &self.b.id == id {
            Some((&self.b, &self.a))
        } else {
            None
        }
    }
}

/// Contacts reported by one step.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactEvents<K> {
    pub started: Vec<ContactPair<K>>,
    pub ended: Vec<ContactPair<K>>,
}

impl<K> Default for ContactEvents<K> {
    fn default() -> Self {
        Self {
            started: Vec::new(),
            ended: Vec::new(),
        }
    }
}

impl<K> ContactEvents<K> {
    pub fn is_empty(&self) -> bool {
        self.started.is_empty() && self.ended.is_empty()
    }
}

/// Read-only view of a registered body.
#[derive(Debug, Clone, PartialEq)]
pub struct BodySnapshot<K> {
    pub id: BodyId,
    pub kind: K,
    pub body_type: BodyType,
    pub position: Vec2,
    /// Pixels per step.
    pub velocity: Vec2,
    pub shape: Option<ColliderDesc>,
    pub sensor: bool,
}

pub type ContactListener<K> = Box<dyn FnMut(&[ContactPair<K>])>;

// ---------------------------------------------------------------------------
// WASM-safe event collector (no crossbeam)
// ---------------------------------------------------------------------------

struct RawSide {
    serial: u128,
    position: Vec2,
    velocity: Vec2,
    half_extents: Vec2,
    sensor: bool,
}

struct RawContact {
    started: bool,
    a: RawSide,
    b: RawSide,
}

fn raw_side(bodies: &RigidBodySet, colliders: &ColliderSet, handle: ColliderHandle) -> Option<RawSide> {
    let collider = colliders.get(handle)?;
    let body = bodies.get(collider.parent()?)?;
    let half = collider.compute_aabb().half_extents();
    Some(RawSide {
        serial: body.user_data,
        position: na_to_vec2(body.translation()),
        velocity: rapier_to_step(body.linvel()),
        half_extents: Vec2::new(half.x, half.y),
        sensor: collider.is_sensor(),
    })
}

struct DirectEventCollector {
    contacts: Mutex<Vec<RawContact>>,
}

impl DirectEventCollector {
    fn new() -> Self {
        Self {
            contacts: Mutex::new(Vec::new()),
        }
    }

    fn drain(&self) -> Vec<RawContact> {
        match self.contacts.lock() {
            Ok(mut contacts) => std::mem::take(&mut *contacts),
            Err(_) => Vec::new(),
        }
    }
}

impl EventHandler for DirectEventCollector {
    fn handle_collision_event(
        &self,
        bodies: &RigidBodySet,
        colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&RapierContactPair>,
    ) {
        let (h1, h2, started) = match event {
            CollisionEvent::Started(h1, h2, _) => (h1, h2, true),
            CollisionEvent::Stopped(h1, h2, _) => (h1, h2, false),
        };
        // Removed colliders can no longer be resolved; their pairs are dropped.
        let (Some(a), Some(b)) = (raw_side(bodies, colliders, h1), raw_side(bodies, colliders, h2)) else {
            return;
        };
        if let Ok(mut contacts) = self.contacts.lock() {
            contacts.push(RawContact { started, a, b });
        }
    }

    fn handle_contact_force_event(
        &self,
        _dt: f32,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &RapierContactPair,
        _total_force_magnitude: f32,
    ) {
    }
}

// ---------------------------------------------------------------------------
// PhysicsWorld
// ---------------------------------------------------------------------------

struct Registered<K> {
    body: RigidBodyHandle,
    collider: ColliderHandle,
    kind: K,
    serial: u128,
}

/// Rapier world plus a string-keyed body registry.
///
/// `K` is the game's body label; contact reports carry it so callers can
/// match on kinds instead of inspecting handles. The wrapper never reads
/// game state.
pub struct PhysicsWorld<K> {
    gravity: nalgebra::Vector2<f32>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    event_collector: DirectEventCollector,
    registry: HashMap<BodyId, Registered<K>>,
    serials: HashMap<u128, BodyId>,
    next_serial: u128,
    start_listeners: Vec<ContactListener<K>>,
    end_listeners: Vec<ContactListener<K>>,
}

impl<K: Copy + 'static> PhysicsWorld<K> {
    /// Create a new physics world. Gravity is in pixels per second squared,
    /// positive Y pointing down.
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity: vec2_to_na(gravity),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            event_collector: DirectEventCollector::new(),
            registry: HashMap::new(),
            serials: HashMap::new(),
            next_serial: 1,
            start_listeners: Vec::new(),
            end_listeners: Vec::new(),
        }
    }

    pub fn gravity(&self) -> Vec2 {
        na_to_vec2(&self.gravity)
    }

    /// Register a body under `id`. An existing body with the same id is replaced.
    pub fn add_body(&mut self, id: impl Into<BodyId>, kind: K, desc: &BodyDesc, material: ColliderMaterial) {
        let id = id.into();
        if self.remove_body(&id) {
            log::debug!("physics: replacing body '{}'", id);
        }

        let serial = self.next_serial;
        self.next_serial += 1;

        let rb = RigidBodyBuilder::new(desc.body_type.to_rapier())
            .translation(vec2_to_na(desc.position))
            .linvel(step_to_rapier(desc.velocity))
            .gravity_scale(desc.gravity_scale)
            .locked_axes(if desc.fixed_rotation {
                LockedAxes::ROTATION_LOCKED
            } else {
                LockedAxes::empty()
            })
            .ccd_enabled(desc.ccd)
            .can_sleep(desc.can_sleep)
            .linear_damping(desc.linear_damping)
            .user_data(serial)
            .build();

        let body = self.bodies.insert(rb);

        let collider = desc
            .collider
            .build_collider()
            .restitution(material.restitution)
            .friction(material.friction)
            .density(material.density)
            .sensor(desc.sensor)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();

        let collider = self.colliders.insert_with_parent(collider, body, &mut self.bodies);

        self.serials.insert(serial, id.clone());
        self.registry.insert(id, Registered { body, collider, kind, serial });
    }

    /// Remove a body and its collider. Returns whether the id was registered.
    pub fn remove_body(&mut self, id: &BodyId) -> bool {
        let Some(entry) = self.registry.remove(id) else {
            return false;
        };
        self.serials.remove(&entry.serial);
        self.bodies.remove(
            entry.body,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        true
    }

    pub fn contains(&self, id: &BodyId) -> bool {
        self.registry.contains_key(id)
    }

    /// Snapshot of a registered body.
    pub fn get_body(&self, id: &BodyId) -> Option<BodySnapshot<K>> {
        let entry = self.registry.get(id)?;
        self.snapshot(id, entry)
    }

    /// Snapshots of every registered body, in no particular order.
    pub fn bodies(&self) -> Vec<BodySnapshot<K>> {
        self.registry
            .iter()
            .filter_map(|(id, entry)| self.snapshot(id, entry))
            .collect()
    }

    /// Number of registered bodies.
    pub fn body_count(&self) -> usize {
        self.registry.len()
    }

    /// Register a callback invoked with the pairs whose contact started in a step.
    pub fn on_contact_start(&mut self, listener: impl FnMut(&[ContactPair<K>]) + 'static) {
        self.start_listeners.push(Box::new(listener));
    }

    /// Register a callback invoked with the pairs whose contact ended in a step.
    pub fn on_contact_end(&mut self, listener: impl FnMut(&[ContactPair<K>]) + 'static) {
        self.end_listeners.push(Box::new(listener));
    }

    /// Advance the simulation by `dt_ms` and return the contacts of that step.
    /// A non-positive delta is a no-op.
    pub fn step(&mut self, dt_ms: f32) -> ContactEvents<K> {
        if !(dt_ms > 0.0) {
            return ContactEvents::default();
        }
        self.integration_parameters.dt = dt_ms / 1000.0;

        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &self.event_collector,
        );

        let mut events = ContactEvents::default();
        for raw in self.event_collector.drain() {
            let (Some(a), Some(b)) = (self.resolve(raw.a), self.resolve(raw.b)) else {
                continue;
            };
            let pair = ContactPair { a, b };
            if raw.started {
                events.started.push(pair);
            } else {
                events.ended.push(pair);
            }
        }

        if !events.started.is_empty() {
            for listener in self.start_listeners.iter_mut() {
                listener(&events.started);
            }
        }
        if !events.ended.is_empty() {
            for listener in self.end_listeners.iter_mut() {
                listener(&events.ended);
            }
        }
        events
    }

    /// Set the linear velocity of a body, in pixels per step.
    pub fn set_velocity(&mut self, id: &BodyId, vel: Vec2) {
        if let Some(rb) = self.rigid_body_mut(id) {
            rb.set_linvel(step_to_rapier(vel), true);
        }
    }

    /// Current linear velocity in pixels per step.
    pub fn velocity(&self, id: &BodyId) -> Option<Vec2> {
        self.rigid_body(id).map(|rb| rapier_to_step(rb.linvel()))
    }

    /// Current position of a body's center.
    pub fn position(&self, id: &BodyId) -> Option<Vec2> {
        self.rigid_body(id).map(|rb| na_to_vec2(rb.translation()))
    }

    /// Teleport a body. Velocity is left alone.
    pub fn set_position(&mut self, id: &BodyId, pos: Vec2) {
        if let Some(rb) = self.rigid_body_mut(id) {
            rb.set_translation(vec2_to_na(pos), true);
        }
    }

    /// Target position of a kinematic body for the next step.
    pub fn set_kinematic_position(&mut self, id: &BodyId, pos: Vec2) {
        if let Some(rb) = self.rigid_body_mut(id) {
            rb.set_next_kinematic_translation(vec2_to_na(pos));
        }
    }

    /// Query the collider shape of a body.
    pub fn collider_shape(&self, id: &BodyId) -> Option<ColliderDesc> {
        let entry = self.registry.get(id)?;
        let collider = self.colliders.get(entry.collider)?;
        let shape = collider.shape();
        if let Some(ball) = shape.as_ball() {
            Some(ColliderDesc::Ball { radius: ball.radius })
        } else {
            shape.as_cuboid().map(|cuboid| ColliderDesc::Cuboid {
                half_width: cuboid.half_extents.x,
                half_height: cuboid.half_extents.y,
            })
        }
    }

    /// Remove every body and listener.
    pub fn clear(&mut self) {
        let ids: Vec<BodyId> = self.registry.keys().cloned().collect();
        for id in &ids {
            self.remove_body(id);
        }
        self.start_listeners.clear();
        self.end_listeners.clear();
    }

    // -- private helpers --

    fn rigid_body(&self, id: &BodyId) -> Option<&RigidBody> {
        self.registry.get(id).and_then(|e| self.bodies.get(e.body))
    }

    fn rigid_body_mut(&mut self, id: &BodyId) -> Option<&mut RigidBody> {
        let handle = self.registry.get(id)?.body;
        self.bodies.get_mut(handle)
    }

    fn snapshot(&self, id: &BodyId, entry: &Registered<K>) -> Option<BodySnapshot<K>> {
        let rb = self.bodies.get(entry.body)?;
        let collider = self.colliders.get(entry.collider)?;
        let body_type = match rb.body_type() {
            RigidBodyType::Dynamic => BodyType::Dynamic,
            RigidBodyType::Fixed => BodyType::Fixed,
            _ => BodyType::KinematicPositionBased,
        };
        Some(BodySnapshot {
            id: id.clone(),
            kind: entry.kind,
            body_type,
            position: na_to_vec2(rb.translation()),
            velocity: rapier_to_step(rb.linvel()),
            shape: self.collider_shape(id),
            sensor: collider.is_sensor(),
        })
    }

    fn resolve(&self, raw: RawSide) -> Option<ContactSide<K>> {
        let id = self.serials.get(&raw.serial)?;
        let entry = self.registry.get(id)?;
        Some(ContactSide {
            id: id.clone(),
            kind: entry.kind,
            position: raw.position,
            velocity: raw.velocity,
            half_extents: raw.half_extents,
            sensor: raw.sensor,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    const DT: f32 = 1000.0 / 60.0;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Tag {
        Ball,
        Ground,
        Zone,
    }

    fn ball(pos: Vec2) -> BodyDesc {
        BodyDesc::dynamic(ColliderDesc::Ball { radius: 5.0 }).with_position(pos)
    }

    fn ground() -> BodyDesc {
        BodyDesc::fixed(ColliderDesc::Cuboid {
            half_width: 200.0,
            half_height: 10.0,
        })
        .with_position(Vec2::new(0.0, 60.0))
    }

    #[test]
    fn add_and_remove_body() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        world.add_body("ball", Tag::Ball, &ball(Vec2::ZERO), ColliderMaterial::default());
        assert_eq!(world.body_count(), 1);
        assert!(world.remove_body(&BodyId::from("ball")));
        assert_eq!(world.body_count(), 0);
        assert!(!world.remove_body(&BodyId::from("ball")));
    }

    #[test]
    fn add_then_remove_leaves_registry_size_unchanged() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        world.add_body("ground", Tag::Ground, &ground(), ColliderMaterial::default());
        let before = world.body_count();
        world.add_body("tmp", Tag::Ball, &ball(Vec2::ZERO), ColliderMaterial::default());
        world.remove_body(&BodyId::from("tmp"));
        assert_eq!(world.body_count(), before);
    }

    #[test]
    fn duplicate_id_replaces() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        world.add_body("ball", Tag::Ball, &ball(Vec2::new(1.0, 1.0)), ColliderMaterial::default());
        world.add_body("ball", Tag::Zone, &ball(Vec2::new(50.0, 0.0)), ColliderMaterial::default());
        assert_eq!(world.body_count(), 1);
        let snap = world.get_body(&BodyId::from("ball")).expect("registered");
        assert_eq!(snap.kind, Tag::Zone);
        assert!((snap.position.x - 50.0).abs() < 0.001);
    }

    #[test]
    fn gravity_affects_dynamic_body() {
        let mut world = PhysicsWorld::new(Vec2::new(0.0, 1800.0));
        let id = BodyId::from("ball");
        world.add_body(id.clone(), Tag::Ball, &ball(Vec2::ZERO), ColliderMaterial::default());
        for _ in 0..10 {
            world.step(DT);
        }
        let pos = world.position(&id).expect("registered");
        assert!(pos.y > 0.0, "Body should fall: y={}", pos.y);
        let vel = world.velocity(&id).expect("registered");
        // 1800 px/s² is 0.5 px per step per step.
        assert!((vel.y - 5.0).abs() < 0.5, "vy after 10 steps: {}", vel.y);
    }

    #[test]
    fn zero_delta_does_not_step() {
        let mut world = PhysicsWorld::new(Vec2::new(0.0, 1800.0));
        let id = BodyId::from("ball");
        world.add_body(id.clone(), Tag::Ball, &ball(Vec2::ZERO), ColliderMaterial::default());
        let events = world.step(0.0);
        assert!(events.is_empty());
        assert_eq!(world.position(&id), Some(Vec2::ZERO));
    }

    #[test]
    fn velocity_round_trips_in_step_units() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        let id = BodyId::from("ball");
        world.add_body(id.clone(), Tag::Ball, &ball(Vec2::ZERO), ColliderMaterial::default());
        world.set_velocity(&id, Vec2::new(2.0, -3.0));
        let vel = world.velocity(&id).expect("registered");
        assert!((vel.x - 2.0).abs() < 0.001);
        assert!((vel.y + 3.0).abs() < 0.001);
    }

    #[test]
    fn fixed_body_does_not_move() {
        let mut world = PhysicsWorld::new(Vec2::new(0.0, 1800.0));
        let id = BodyId::from("ground");
        world.add_body(id.clone(), Tag::Ground, &ground(), ColliderMaterial::default());
        for _ in 0..10 {
            world.step(DT);
        }
        let pos = world.position(&id).expect("registered");
        assert!((pos.y - 60.0).abs() < 0.001, "Fixed body should not move: y={}", pos.y);
    }

    #[test]
    fn landing_reports_contact_with_pre_solve_velocity() {
        let mut world = PhysicsWorld::new(Vec2::new(0.0, 1800.0));
        world.add_body("ball", Tag::Ball, &ball(Vec2::ZERO), ColliderMaterial::default());
        world.add_body("ground", Tag::Ground, &ground(), ColliderMaterial::default());

        let mut started = Vec::new();
        for _ in 0..90 {
            started.extend(world.step(DT).started);
        }
        let pair = started.first().expect("ball should land");
        let (me, other) = pair.for_body(&BodyId::from("ball")).expect("ball in pair");
        assert_eq!(me.kind, Tag::Ball);
        assert_eq!(other.kind, Tag::Ground);
        assert!(me.velocity.y > 0.0, "falling speed at contact: {}", me.velocity.y);
        assert!((other.top() - 50.0).abs() < 0.01);
        assert!((me.half_extents.y - 5.0).abs() < 0.01);
    }

    #[test]
    fn contact_between_converging_bodies() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        world.add_body(
            "left",
            Tag::Ball,
            &ball(Vec2::new(0.0, 0.0)).with_velocity(Vec2::new(4.0, 0.0)),
            ColliderMaterial::default(),
        );
        world.add_body(
            "right",
            Tag::Ball,
            &ball(Vec2::new(40.0, 0.0)).with_velocity(Vec2::new(-4.0, 0.0)),
            ColliderMaterial::default(),
        );

        let mut started = Vec::new();
        for _ in 0..60 {
            started.extend(world.step(DT).started);
        }
        let first = started.first().expect("Should have at least one contact start");
        let ids = [first.a.id.as_str(), first.b.id.as_str()];
        assert!(ids.contains(&"left"));
        assert!(ids.contains(&"right"));
    }

    #[test]
    fn sensor_overlap_is_flagged() {
        let mut world = PhysicsWorld::new(Vec2::new(0.0, 1800.0));
        world.add_body("ball", Tag::Ball, &ball(Vec2::ZERO), ColliderMaterial::default());
        world.add_body(
            "zone",
            Tag::Zone,
            &BodyDesc::kinematic(ColliderDesc::Cuboid {
                half_width: 20.0,
                half_height: 5.0,
            })
            .with_position(Vec2::new(0.0, 30.0))
            .with_sensor(),
            ColliderMaterial::default(),
        );

        let mut started = Vec::new();
        for _ in 0..60 {
            started.extend(world.step(DT).started);
        }
        let pair = started.first().expect("ball should pass through the zone");
        let (zone, other) = pair.for_body(&BodyId::from("zone")).expect("zone in pair");
        assert!(zone.sensor);
        assert_eq!(other.kind, Tag::Ball);
    }

    #[test]
    fn listeners_receive_started_pairs() {
        let mut world = PhysicsWorld::new(Vec2::new(0.0, 1800.0));
        world.add_body("ball", Tag::Ball, &ball(Vec2::ZERO), ColliderMaterial::default());
        world.add_body("ground", Tag::Ground, &ground(), ColliderMaterial::default());

        let count = Rc::new(Cell::new(0usize));
        let seen = count.clone();
        world.on_contact_start(move |pairs| seen.set(seen.get() + pairs.len()));

        for _ in 0..90 {
            world.step(DT);
        }
        assert!(count.get() >= 1);
    }

    #[test]
    fn removed_body_pairs_are_skipped() {
        let mut world = PhysicsWorld::new(Vec2::new(0.0, 1800.0));
        world.add_body("ball", Tag::Ball, &ball(Vec2::new(0.0, 44.0)), ColliderMaterial::default());
        world.add_body("ground", Tag::Ground, &ground(), ColliderMaterial::default());
        for _ in 0..10 {
            world.step(DT);
        }
        world.remove_body(&BodyId::from("ball"));
        for _ in 0..5 {
            let events = world.step(DT);
            assert!(events.ended.iter().all(|p| p.a.id.as_str() != "ball" && p.b.id.as_str() != "ball"));
        }
    }

    #[test]
    fn kinematic_body_follows_targets() {
        let mut world = PhysicsWorld::new(Vec2::new(0.0, 1800.0));
        let id = BodyId::from("zone");
        world.add_body(
            id.clone(),
            Tag::Zone,
            &BodyDesc::kinematic(ColliderDesc::Ball { radius: 4.0 }).with_sensor(),
            ColliderMaterial::default(),
        );
        world.set_kinematic_position(&id, Vec2::new(10.0, -20.0));
        world.step(DT);
        let pos = world.position(&id).expect("registered");
        assert!((pos.x - 10.0).abs() < 0.01 && (pos.y + 20.0).abs() < 0.01, "pos {:?}", pos);
    }

    #[test]
    fn builder_pattern() {
        let desc = BodyDesc::dynamic(ColliderDesc::Ball { radius: 5.0 })
            .with_position(Vec2::new(10.0, 20.0))
            .with_velocity(Vec2::new(1.0, 2.0))
            .with_gravity_scale(0.5)
            .with_fixed_rotation(true)
            .with_ccd(true)
            .with_can_sleep(false);

        assert_eq!(desc.body_type, BodyType::Dynamic);
        assert_eq!(desc.position, Vec2::new(10.0, 20.0));
        assert_eq!(desc.velocity, Vec2::new(1.0, 2.0));
        assert!((desc.gravity_scale - 0.5).abs() < 0.001);
        assert!(desc.fixed_rotation);
        assert!(desc.ccd);
        assert!(!desc.can_sleep);
        assert!(!desc.sensor);
    }

    #[test]
    fn collider_shapes_and_clear() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        world.add_body("ball", Tag::Ball, &BodyDesc::dynamic(ColliderDesc::Ball { radius: 15.0 }), ColliderMaterial::default());
        world.add_body("ground", Tag::Ground, &ground(), ColliderMaterial::default());

        match world.collider_shape(&BodyId::from("ball")) {
            Some(ColliderDesc::Ball { radius }) => assert!((radius - 15.0).abs() < 0.001),
            other => panic!("expected Ball, got {:?}", other),
        }
        match world.collider_shape(&BodyId::from("ground")) {
            Some(ColliderDesc::Cuboid { half_width, half_height }) => {
                assert!((half_width - 200.0).abs() < 0.001);
                assert!((half_height - 10.0).abs() < 0.001);
            }
            other => panic!("expected Cuboid, got {:?}", other),
        }

        assert_eq!(world.bodies().len(), 2);
        world.clear();
        assert_eq!(world.body_count(), 0);
        assert!(world.bodies().is_empty());
    }
}
