//! Physics world hosting the apparatus and the weight objects
//!
//! Wraps a rapier2d pipeline and keeps a keyed index of everything inserted, so
//! insertion and removal are idempotent and observers can walk the bodies in a
//! stable order. Coordinates are canvas units with y pointing down, so gravity is
//! a positive y acceleration.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use cgmath::Vector2;
use rapier2d::prelude::{
    CCDSolver, ColliderBuilder, ColliderSet, DefaultBroadPhase, GenericJoint, Group,
    ImpulseJointHandle, ImpulseJointSet, IntegrationParameters, InteractionGroups, IslandManager,
    MotorModel, MultibodyJointSet, NarrowPhase, PhysicsPipeline, Point, Real,
    RevoluteJointBuilder, RigidBodyBuilder, RigidBodyHandle, RigidBodySet, SpringJointBuilder,
    Vector,
};

use super::body::{
    BodyKey, BodyRole, BodySpec, CollisionClass, ConstraintKind, ConstraintSpec, JointKey, Motion,
    RigPart, Shape,
};
use super::rig::Rig;
use crate::config::PhysicsConfig;
use crate::error::{LibraError, Result};
use crate::model::Side;

static NEXT_WORLD_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one world instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorldId(u64);

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

const GROUND: Group = Group::GROUP_1;
const PLATFORM: Group = Group::GROUP_2;
const WEIGHT: Group = Group::GROUP_3;
const FRAME: Group = Group::GROUP_4;

fn interaction_groups(class: CollisionClass) -> InteractionGroups {
    match class {
        CollisionClass::Ground => InteractionGroups::new(GROUND, PLATFORM | WEIGHT),
        CollisionClass::Frame => InteractionGroups::new(FRAME, Group::NONE),
        CollisionClass::Platform => InteractionGroups::new(PLATFORM, GROUND | WEIGHT),
        CollisionClass::Weight => InteractionGroups::new(WEIGHT, GROUND | PLATFORM | WEIGHT),
    }
}

struct BodyEntry {
    handle: RigidBodyHandle,
    role: BodyRole,
    shape: Shape,
}

/// Read-only snapshot of one body, as seen by renderers and tests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyView {
    pub key: BodyKey,
    pub role: BodyRole,
    pub shape: Shape,
    pub position: Vector2<f32>,
    /// Rotation in radians; positive turns +x toward +y (clockwise on screen)
    pub angle: f32,
}

/// Owns every rigid body and constraint of one visualization
pub struct World {
    id: WorldId,
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    bodies: BTreeMap<BodyKey, BodyEntry>,
    joints: BTreeMap<JointKey, ImpulseJointHandle>,
    elapsed: f32,
    steps: u64,
}

impl World {
    /// Create an empty world with gravity taken from `config`
    pub fn new(config: &PhysicsConfig) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = config.timestep;
        integration_parameters.length_unit = config.length_unit;

        let id = WorldId(NEXT_WORLD_ID.fetch_add(1, Ordering::Relaxed));
        log::debug!("Created world {} with gravity {}", id, config.gravity);

        Self {
            id,
            gravity: Vector::new(0.0, config.gravity),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            bodies: BTreeMap::new(),
            joints: BTreeMap::new(),
            elapsed: 0.0,
            steps: 0,
        }
    }

    pub fn id(&self) -> WorldId {
        self.id
    }

    /// Insert a body; returns `false` if a body with the same key is already present
    pub fn insert_body(&mut self, spec: &BodySpec) -> bool {
        if self.bodies.contains_key(&spec.key) {
            return false;
        }

        let builder = match spec.motion {
            Motion::Fixed => RigidBodyBuilder::fixed(),
            Motion::Dynamic => RigidBodyBuilder::dynamic(),
        };
        let mut builder = builder
            .translation(Vector::new(spec.position.x, spec.position.y))
            .linear_damping(spec.linear_damping)
            .angular_damping(spec.angular_damping)
            .can_sleep(false);
        if spec.lock_rotation {
            builder = builder.lock_rotations();
        }
        let handle = self.rigid_body_set.insert(builder.build());

        let colliders = match spec.shape {
            Shape::Circle { radius } => vec![ColliderBuilder::ball(radius)],
            shape => shape
                .panels()
                .into_iter()
                .map(|panel| {
                    ColliderBuilder::cuboid(panel.half_extents.x, panel.half_extents.y)
                        .translation(Vector::new(panel.offset.x, panel.offset.y))
                })
                .collect(),
        };
        for collider in colliders {
            let collider = collider
                .density(spec.density)
                .friction(spec.friction)
                .restitution(spec.restitution)
                .collision_groups(interaction_groups(spec.collision))
                .build();
            self.collider_set
                .insert_with_parent(collider, handle, &mut self.rigid_body_set);
        }

        self.bodies.insert(
            spec.key,
            BodyEntry {
                handle,
                role: spec.role,
                shape: spec.shape,
            },
        );
        log::trace!("World {}: inserted {:?}", self.id, spec.key);
        true
    }

    /// Remove a body with its collider and any constraint attached to it;
    /// returns `false` if the key is absent
    pub fn remove_body(&mut self, key: BodyKey) -> bool {
        let Some(entry) = self.bodies.remove(&key) else {
            return false;
        };

        self.rigid_body_set.remove(
            entry.handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
        let joint_set = &self.impulse_joint_set;
        self.joints
            .retain(|_, handle| joint_set.get(*handle).is_some());
        log::trace!("World {}: removed {:?}", self.id, key);
        true
    }

    /// Insert a constraint between two bodies already in the world; returns
    /// `Ok(false)` if the constraint is already present
    pub fn insert_constraint(&mut self, spec: &ConstraintSpec) -> Result<bool> {
        if self.joints.contains_key(&spec.key) {
            return Ok(false);
        }

        let handle_of = |body: BodyKey| {
            self.bodies
                .get(&body)
                .map(|entry| entry.handle)
                .ok_or(LibraError::MissingBody {
                    joint: spec.key,
                    body,
                })
        };
        let body_a = handle_of(spec.body_a)?;
        let body_b = handle_of(spec.body_b)?;

        let anchor_a = Point::new(spec.anchor_a.x, spec.anchor_a.y);
        let anchor_b = Point::new(spec.anchor_b.x, spec.anchor_b.y);
        let joint: GenericJoint = match spec.kind {
            ConstraintKind::Pivot { tilt_limit } => RevoluteJointBuilder::new()
                .local_anchor1(anchor_a)
                .local_anchor2(anchor_b)
                .limits([-tilt_limit, tilt_limit])
                .build()
                .into(),
            ConstraintKind::Tether {
                rest_length,
                stiffness,
                damping,
            } => SpringJointBuilder::new(rest_length, stiffness, damping)
                .spring_model(MotorModel::AccelerationBased)
                .local_anchor1(anchor_a)
                .local_anchor2(anchor_b)
                .build()
                .into(),
        };

        let handle = self.impulse_joint_set.insert(body_a, body_b, joint, true);
        self.joints.insert(spec.key, handle);
        log::trace!("World {}: inserted constraint {:?}", self.id, spec.key);
        Ok(true)
    }

    /// Remove a constraint; returns `false` if it is absent
    pub fn remove_constraint(&mut self, key: JointKey) -> bool {
        match self.joints.remove(&key) {
            Some(handle) => {
                self.impulse_joint_set.remove(handle, true);
                true
            }
            None => false,
        }
    }

    /// Insert every body, then every constraint, of the apparatus
    pub fn insert_rig(&mut self, rig: &Rig) -> Result<()> {
        for body in rig.bodies() {
            self.insert_body(body);
        }
        for constraint in rig.constraints() {
            self.insert_constraint(constraint)?;
        }
        log::debug!(
            "World {}: rig ready with {} bodies and {} constraints",
            self.id,
            rig.bodies().len(),
            rig.constraints().len()
        );
        Ok(())
    }

    /// Advance positions, velocities and constraint forces by `dt` seconds;
    /// zero, negative and non-finite steps are ignored
    pub fn step(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
        self.elapsed += dt;
        self.steps += 1;
    }

    /// Drop every body and constraint
    pub fn clear(&mut self) {
        self.rigid_body_set = RigidBodySet::new();
        self.collider_set = ColliderSet::new();
        self.impulse_joint_set = ImpulseJointSet::new();
        self.multibody_joint_set = MultibodyJointSet::new();
        self.island_manager = IslandManager::new();
        self.broad_phase = DefaultBroadPhase::new();
        self.narrow_phase = NarrowPhase::new();
        self.ccd_solver = CCDSolver::new();
        self.bodies.clear();
        self.joints.clear();
        log::debug!("World {} cleared", self.id);
    }

    /// All bodies in key order: apparatus first, then weights
    pub fn bodies(&self) -> impl Iterator<Item = BodyView> + '_ {
        self.bodies
            .iter()
            .filter_map(|(key, entry)| self.view(*key, entry))
    }

    pub fn body(&self, key: BodyKey) -> Option<BodyView> {
        self.bodies
            .get(&key)
            .and_then(|entry| self.view(key, entry))
    }

    fn view(&self, key: BodyKey, entry: &BodyEntry) -> Option<BodyView> {
        let body = self.rigid_body_set.get(entry.handle)?;
        let translation = body.translation();
        Some(BodyView {
            key,
            role: entry.role,
            shape: entry.shape,
            position: Vector2::new(translation.x, translation.y),
            angle: body.rotation().angle(),
        })
    }

    pub fn contains_body(&self, key: BodyKey) -> bool {
        self.bodies.contains_key(&key)
    }

    pub fn contains_constraint(&self, key: JointKey) -> bool {
        self.joints.contains_key(&key)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.joints.len()
    }

    /// Number of weight objects on one side
    pub fn weight_count(&self, side: Side) -> usize {
        self.bodies
            .keys()
            .filter(|key| matches!(key, BodyKey::Weight { side: s, .. } if *s == side))
            .count()
    }

    /// Current beam rotation; negative when the left (pro) end hangs lower
    pub fn beam_angle(&self) -> f32 {
        self.body(BodyKey::Rig(RigPart::Beam))
            .map(|beam| beam.angle)
            .unwrap_or(0.0)
    }

    /// Simulated seconds since creation
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn step_count(&self) -> u64 {
        self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Canvas, RigConfig};

    fn ball(serial: u64, x: f32, y: f32) -> BodySpec {
        BodySpec {
            key: BodyKey::Weight {
                side: Side::Pro,
                serial,
            },
            role: BodyRole::Weight {
                side: Side::Pro,
                weight: 5,
            },
            shape: Shape::Circle { radius: 10.0 },
            position: Vector2::new(x, y),
            motion: Motion::Dynamic,
            density: 1.0,
            friction: 0.8,
            restitution: 0.3,
            linear_damping: 0.0,
            angular_damping: 0.0,
            lock_rotation: false,
            collision: CollisionClass::Weight,
        }
    }

    fn rig() -> Rig {
        Rig::build(&Canvas::default(), &RigConfig::default())
    }

    #[test]
    fn test_worlds_have_distinct_ids() {
        let a = World::new(&PhysicsConfig::default());
        let b = World::new(&PhysicsConfig::default());
        assert_ne!(a.id(), b.id());
        assert_eq!(a.body_count(), 0);
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut world = World::new(&PhysicsConfig::default());
        let spec = ball(1, 50.0, 50.0);
        assert!(world.insert_body(&spec));
        assert!(!world.insert_body(&spec));
        assert_eq!(world.body_count(), 1);
        assert_eq!(world.weight_count(Side::Pro), 1);
        assert_eq!(world.weight_count(Side::Con), 0);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut world = World::new(&PhysicsConfig::default());
        assert!(!world.remove_body(BodyKey::Rig(RigPart::Beam)));
        assert!(!world.remove_constraint(JointKey::BeamToPost));

        world.insert_body(&ball(1, 50.0, 50.0));
        let key = ball(1, 0.0, 0.0).key;
        assert!(world.remove_body(key));
        assert!(!world.remove_body(key));
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn test_rig_insertion_is_idempotent() {
        let mut world = World::new(&PhysicsConfig::default());
        let rig = rig();
        world.insert_rig(&rig).unwrap();
        world.insert_rig(&rig).unwrap();
        assert_eq!(world.body_count(), 5);
        assert_eq!(world.constraint_count(), 3);
    }

    #[test]
    fn test_constraint_requires_its_bodies() {
        let mut world = World::new(&PhysicsConfig::default());
        let rig = rig();
        let pivot = rig.constraint(JointKey::BeamToPost).unwrap();
        let err = world.insert_constraint(pivot).unwrap_err();
        assert!(matches!(
            err,
            LibraError::MissingBody {
                joint: JointKey::BeamToPost,
                body: BodyKey::Rig(RigPart::Post)
            }
        ));
    }

    #[test]
    fn test_removing_a_body_drops_its_constraints() {
        let mut world = World::new(&PhysicsConfig::default());
        world.insert_rig(&rig()).unwrap();
        world.remove_body(BodyKey::Rig(RigPart::Beam));
        assert_eq!(world.constraint_count(), 0);
        assert!(!world.contains_constraint(JointKey::LeftPlatformToBeam));
    }

    #[test]
    fn test_gravity_pulls_toward_larger_y() {
        let mut world = World::new(&PhysicsConfig::default());
        world.insert_body(&ball(1, 50.0, 50.0));
        for _ in 0..30 {
            world.step(1.0 / 60.0);
        }
        let view = world.body(ball(1, 0.0, 0.0).key).unwrap();
        assert!(view.position.y > 60.0);
        assert!((view.position.x - 50.0).abs() < 1e-3);
        assert!((world.elapsed() - 0.5).abs() < 1e-4);
        assert_eq!(world.step_count(), 30);
    }

    #[test]
    fn test_zero_step_is_ignored() {
        let mut world = World::new(&PhysicsConfig::default());
        world.step(0.0);
        assert_eq!(world.step_count(), 0);
    }

    #[test]
    fn test_non_finite_step_leaves_bodies_untouched() {
        let mut world = World::new(&PhysicsConfig::default());
        world.insert_rig(&rig()).unwrap();
        world.insert_body(&ball(1, 50.0, 50.0));
        let before: Vec<BodyView> = world.bodies().collect();

        for dt in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY, -1.0] {
            world.step(dt);
        }
        assert_eq!(world.step_count(), 0);
        assert_eq!(world.elapsed(), 0.0);
        assert_eq!(world.bodies().collect::<Vec<_>>(), before);

        world.step(1.0 / 60.0);
        assert!(world
            .bodies()
            .all(|b| b.position.x.is_finite() && b.position.y.is_finite() && b.angle.is_finite()));
    }

    #[test]
    fn test_ball_comes_to_rest_on_ground() {
        let config = RigConfig::default();
        let mut world = World::new(&PhysicsConfig::default());
        world.insert_rig(&rig()).unwrap();
        world.insert_body(&ball(1, 30.0, 200.0));
        for _ in 0..180 {
            world.step(1.0 / 60.0);
        }
        let view = world.body(ball(1, 0.0, 0.0).key).unwrap();
        assert!((view.position.y - (config.ground_top() - 10.0)).abs() < 1.0, "{:?}", view);
    }

    #[test]
    fn test_boundary_walls_stop_sideways_motion() {
        let mut world = World::new(&PhysicsConfig::default());
        world.insert_rig(&rig()).unwrap();
        let mut spec = ball(1, 480.0, 340.0);
        spec.restitution = 0.0;
        world.insert_body(&spec);
        // Launch the ball at the right wall
        if let Some(entry) = world.bodies.get(&spec.key) {
            if let Some(body) = world.rigid_body_set.get_mut(entry.handle) {
                body.set_linvel(Vector::new(900.0, 0.0), true);
            }
        }
        for _ in 0..120 {
            world.step(1.0 / 60.0);
        }
        let view = world.body(spec.key).unwrap();
        assert!(view.position.x <= Canvas::default().width, "{:?}", view);
    }

    #[test]
    fn test_bodies_iterate_apparatus_first() {
        let mut world = World::new(&PhysicsConfig::default());
        world.insert_body(&ball(7, 50.0, 50.0));
        world.insert_rig(&rig()).unwrap();
        let keys: Vec<BodyKey> = world.bodies().map(|b| b.key).collect();
        assert_eq!(keys.len(), 6);
        assert!(keys[..5].iter().all(|k| !k.is_weight()));
        assert!(keys[5].is_weight());
    }

    #[test]
    fn test_clear_releases_everything() {
        let mut world = World::new(&PhysicsConfig::default());
        world.insert_rig(&rig()).unwrap();
        world.insert_body(&ball(1, 50.0, 50.0));
        world.clear();
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.constraint_count(), 0);
        assert_eq!(world.bodies().count(), 0);
    }
}
