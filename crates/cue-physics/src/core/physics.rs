use glam::Vec3;
use rapier3d::prelude::*;
use std::sync::{Mutex, PoisonError};

use crate::api::types::EntityId;

// ---------------------------------------------------------------------------
// Conversion helpers (private): glam <-> nalgebra
// ---------------------------------------------------------------------------

fn vec3_to_na(v: Vec3) -> nalgebra::Vector3<f32> {
    nalgebra::Vector3::new(v.x, v.y, v.z)
}

fn na_to_vec3(v: &nalgebra::Vector3<f32>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// The kind of rigid body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyType {
    Dynamic,
    Fixed,
}

impl BodyType {
    fn to_rapier(self) -> RigidBodyType {
        match self {
            BodyType::Dynamic => RigidBodyType::Dynamic,
            BodyType::Fixed => RigidBodyType::Fixed,
        }
    }
}

/// Shape description for a collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderDesc {
    Ball { radius: f32 },
    Cuboid { half_extents: Vec3 },
}

impl ColliderDesc {
    fn build_collider(&self) -> ColliderBuilder {
        match *self {
            ColliderDesc::Ball { radius } => ColliderBuilder::ball(radius),
            ColliderDesc::Cuboid { half_extents } => {
                ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }
        }
    }
}

/// Physical material properties for a collider.
///
/// Materials are fixed once the table is built; the spin impulse magnitudes
/// in [`ShotParameters`](crate::shot::params::ShotParameters) are tuned
/// against them.
#[derive(Debug, Clone, Copy, PartialEq)]
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
    pub position: Vec3,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    pub gravity_scale: f32,
    pub ccd: bool,
    pub collider: ColliderDesc,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

impl BodyDesc {
    /// Create a dynamic body description with the given collider shape.
    pub fn dynamic(collider: ColliderDesc) -> Self {
        Self {
            body_type: BodyType::Dynamic,
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            gravity_scale: 1.0,
            ccd: false,
            collider,
            linear_damping: 0.0,
            angular_damping: 0.0,
        }
    }

    /// Create a fixed (static) body description with the given collider shape.
    pub fn fixed(collider: ColliderDesc) -> Self {
        Self {
            body_type: BodyType::Fixed,
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            gravity_scale: 0.0,
            ccd: false,
            collider,
            linear_damping: 0.0,
            angular_damping: 0.0,
        }
    }

    pub fn with_position(mut self, pos: Vec3) -> Self {
        self.position = pos;
        self
    }

    pub fn with_velocity(mut self, vel: Vec3) -> Self {
        self.velocity = vel;
        self
    }

    pub fn with_angular_velocity(mut self, angvel: Vec3) -> Self {
        self.angular_velocity = angvel;
        self
    }

    pub fn with_gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = scale;
        self
    }

    pub fn with_ccd(mut self, enabled: bool) -> Self {
        self.ccd = enabled;
        self
    }

    /// Set the starting linear damping. The table re-selects damping every
    /// tick from the ball's speed regime, so this only matters before the
    /// first update.
    pub fn with_linear_damping(mut self, damping: f32) -> Self {
        self.linear_damping = damping;
        self
    }

    pub fn with_angular_damping(mut self, damping: f32) -> Self {
        self.angular_damping = damping;
        self
    }
}

/// Handle pair referencing Rapier internals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicsBody {
    pub body_handle: RigidBodyHandle,
    pub collider_handle: ColliderHandle,
}

/// A collision event between two entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionPair {
    pub entity_a: EntityId,
    pub entity_b: EntityId,
    /// `true` when the contact just began, `false` when it ended.
    pub started: bool,
}

impl CollisionPair {
    /// The other side of the pair, if `id` is one of its members.
    pub fn other(&self, id: EntityId) -> Option<EntityId> {
        if self.entity_a == id {
            Some(self.entity_b)
        } else if self.entity_b == id {
            Some(self.entity_a)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Event collector
// ---------------------------------------------------------------------------

struct DirectEventCollector {
    collisions: Mutex<Vec<CollisionEvent>>,
}

impl DirectEventCollector {
    fn new() -> Self {
        Self {
            collisions: Mutex::new(Vec::new()),
        }
    }

    fn drain_collisions(&self) -> Vec<CollisionEvent> {
        let mut guard = self
            .collisions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *guard)
    }
}

impl EventHandler for DirectEventCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        self.collisions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    fn handle_contact_force_event(
        &self,
        _dt: f32,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: f32,
    ) {
    }
}

// ---------------------------------------------------------------------------
// PhysicsWorld
// ---------------------------------------------------------------------------

/// Wraps the Rapier3D pipeline: bodies, colliders and contact-begin events.
///
/// Y is up. Every accessor taking a [`PhysicsBody`] silently ignores handles
/// whose body has been removed, returning zero vectors for reads.
pub struct PhysicsWorld {
    gravity: nalgebra::Vector3<f32>,
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
}

impl PhysicsWorld {
    /// Create a new physics world with the given gravity vector
    /// (e.g. `Vec3::new(0.0, -9.81, 0.0)`).
    pub fn new(gravity: Vec3) -> Self {
        Self {
            gravity: vec3_to_na(gravity),
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
        }
    }

    /// Set the integration timestep.
    pub fn set_dt(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
    }

    pub fn dt(&self) -> f32 {
        self.integration_parameters.dt
    }

    /// Create a rigid body + collider and return handles.
    /// The EntityId is stored in the body's `user_data` for collision lookups.
    pub fn create_body(
        &mut self,
        entity_id: EntityId,
        desc: &BodyDesc,
        material: ColliderMaterial,
    ) -> PhysicsBody {
        let rb = RigidBodyBuilder::new(desc.body_type.to_rapier())
            .translation(vec3_to_na(desc.position))
            .linvel(vec3_to_na(desc.velocity))
            .angvel(vec3_to_na(desc.angular_velocity))
            .gravity_scale(desc.gravity_scale)
            .ccd_enabled(desc.ccd)
            .linear_damping(desc.linear_damping)
            .angular_damping(desc.angular_damping)
            .user_data(entity_id.0 as u128)
            .build();

        let body_handle = self.bodies.insert(rb);

        let collider = desc
            .collider
            .build_collider()
            .restitution(material.restitution)
            .friction(material.friction)
            .density(material.density)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();

        let collider_handle =
            self.colliders
                .insert_with_parent(collider, body_handle, &mut self.bodies);

        PhysicsBody {
            body_handle,
            collider_handle,
        }
    }

    /// Remove a body and all its colliders from the simulation.
    pub fn remove_body(&mut self, body: &PhysicsBody) {
        self.bodies.remove(
            body.body_handle,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    /// Step the simulation once and append contact events to `collision_events`.
    pub fn step_into(&mut self, collision_events: &mut Vec<CollisionPair>) {
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

        for event in self.event_collector.drain_collisions() {
            let (h1, h2, started) = match event {
                CollisionEvent::Started(h1, h2, _) => (h1, h2, true),
                CollisionEvent::Stopped(h1, h2, _) => (h1, h2, false),
            };

            let entity_a = self.collider_to_entity(h1);
            let entity_b = self.collider_to_entity(h2);

            if let (Some(a), Some(b)) = (entity_a, entity_b) {
                collision_events.push(CollisionPair {
                    entity_a: a,
                    entity_b: b,
                    started,
                });
            }
        }
    }

    /// Set the linear velocity of a body directly.
    pub fn set_velocity(&mut self, body: &PhysicsBody, vel: Vec3) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_linvel(vec3_to_na(vel), true);
        }
    }

    /// Get the current linear velocity of a body.
    pub fn velocity(&self, body: &PhysicsBody) -> Vec3 {
        self.bodies
            .get(body.body_handle)
            .map(|rb| na_to_vec3(rb.linvel()))
            .unwrap_or(Vec3::ZERO)
    }

    /// Set the angular velocity of a body directly.
    pub fn set_angular_velocity(&mut self, body: &PhysicsBody, angvel: Vec3) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_angvel(vec3_to_na(angvel), true);
        }
    }

    /// Get the current angular velocity of a body.
    pub fn angular_velocity(&self, body: &PhysicsBody) -> Vec3 {
        self.bodies
            .get(body.body_handle)
            .map(|rb| na_to_vec3(rb.angvel()))
            .unwrap_or(Vec3::ZERO)
    }

    /// Teleport a body. Velocities are untouched.
    pub fn set_body_position(&mut self, body: &PhysicsBody, pos: Vec3) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_translation(vec3_to_na(pos), true);
        }
    }

    /// Get the current position of a body.
    pub fn body_position(&self, body: &PhysicsBody) -> Vec3 {
        self.bodies
            .get(body.body_handle)
            .map(|rb| na_to_vec3(rb.translation()))
            .unwrap_or(Vec3::ZERO)
    }

    /// Replace the body's damping coefficients.
    pub fn set_damping(&mut self, body: &PhysicsBody, linear: f32, angular: f32) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_linear_damping(linear);
            rb.set_angular_damping(angular);
        }
    }

    /// Current `(linear, angular)` damping of a body.
    pub fn damping(&self, body: &PhysicsBody) -> (f32, f32) {
        self.bodies
            .get(body.body_handle)
            .map(|rb| (rb.linear_damping(), rb.angular_damping()))
            .unwrap_or((0.0, 0.0))
    }

    /// Wake a sleeping body so the next step generates its contacts.
    pub fn wake_up(&mut self, body: &PhysicsBody) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.wake_up(true);
        }
    }

    /// Force a body to sleep.
    pub fn sleep(&mut self, body: &PhysicsBody) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.sleep();
        }
    }

    pub fn is_sleeping(&self, body: &PhysicsBody) -> bool {
        self.bodies
            .get(body.body_handle)
            .map(|rb| rb.is_sleeping())
            .unwrap_or(false)
    }

    /// Enable or disable a body. Disabled bodies are neither integrated nor
    /// collided with; pocketed balls are parked this way.
    pub fn set_body_enabled(&mut self, body: &PhysicsBody, enabled: bool) {
        if let Some(rb) = self.bodies.get_mut(body.body_handle) {
            rb.set_enabled(enabled);
        }
    }

    pub fn is_body_enabled(&self, body: &PhysicsBody) -> bool {
        self.bodies
            .get(body.body_handle)
            .map(|rb| rb.is_enabled())
            .unwrap_or(false)
    }

    /// Number of rigid bodies in the simulation.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    // -- private helpers --

    fn collider_to_entity(&self, collider_handle: ColliderHandle) -> Option<EntityId> {
        let collider = self.colliders.get(collider_handle)?;
        let body_handle = collider.parent()?;
        let body = self.bodies.get(body_handle)?;
        Some(EntityId(body.user_data as u32))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
