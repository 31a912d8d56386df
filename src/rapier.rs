//! Rapier3D physics backend implementation.
//!
//! This module provides the physics backend for Bevy Rapier3D.
//! Enable with the `rapier3d` feature (on by default).

use bevy::ecs::system::SystemState;
use bevy::prelude::*;
use bevy_rapier3d::geometry::Group;
use bevy_rapier3d::prelude::*;

use crate::backend::MotorPhysicsBackend;
use crate::collision::CollisionData;
use crate::config::GroundLayers;
use crate::motor::CharacterMotor;

/// Rapier3D physics backend for the character motor.
///
/// Velocity, drag and impulses map onto Rapier's `Velocity`, `Damping` and
/// `ExternalImpulse` components. Forces are accumulated on the motor and
/// written to `ExternalForce` once per physics step, so forces added by
/// other systems survive untouched.
pub struct Rapier3dBackend;

impl MotorPhysicsBackend for Rapier3dBackend {
    fn plugin() -> impl Plugin {
        Rapier3dBackendPlugin
    }

    fn raycast(
        world: &mut World,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        exclude_entity: Entity,
        layers: GroundLayers,
    ) -> Option<CollisionData> {
        let mut state: SystemState<ReadRapierContext> = SystemState::new(world);
        let rapier_context = state.get_mut(world);
        let Ok(context) = rapier_context.single() else {
            return None;
        };
        rapier_raycast(&context, origin, direction, max_distance, exclude_entity, layers)
    }

    fn get_velocity(world: &World, entity: Entity) -> Vec3 {
        world
            .get::<Velocity>(entity)
            .map(|v| v.linvel)
            .unwrap_or(Vec3::ZERO)
    }

    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec3) {
        if let Some(mut vel) = world.get_mut::<Velocity>(entity) {
            vel.linvel = velocity;
        }
    }

    fn get_linear_drag(world: &World, entity: Entity) -> f32 {
        world
            .get::<Damping>(entity)
            .map(|d| d.linear_damping)
            .unwrap_or(0.0)
    }

    fn set_linear_drag(world: &mut World, entity: Entity, drag: f32) {
        if let Some(mut damping) = world.get_mut::<Damping>(entity) {
            if damping.linear_damping != drag {
                damping.linear_damping = drag;
            }
            return;
        }
        if let Ok(mut entity_mut) = world.get_entity_mut(entity) {
            entity_mut.insert(Damping {
                linear_damping: drag,
                angular_damping: 0.0,
            });
        }
    }

    fn apply_force(world: &mut World, entity: Entity, force: Vec3) {
        // Accumulate into CharacterMotor instead of directly modifying ExternalForce.
        // Forces are written to ExternalForce at the end of the step by apply_motor_forces.
        if let Some(mut motor) = world.get_mut::<CharacterMotor>(entity) {
            motor.add_force(force);
        }
    }

    fn apply_impulse(world: &mut World, entity: Entity, impulse: Vec3) {
        if let Some(mut ext_impulse) = world.get_mut::<ExternalImpulse>(entity) {
            ext_impulse.impulse += impulse;
            return;
        }

        // Fallback: apply as velocity change if no ExternalImpulse component
        let mass = world
            .get::<ReadMassProperties>(entity)
            .map(|props| props.mass)
            .filter(|&mass| mass > 0.0 && mass.is_finite())
            .unwrap_or(1.0);
        if let Some(mut vel) = world.get_mut::<Velocity>(entity) {
            vel.linvel += impulse / mass;
        }
    }

    fn get_collider_height(world: &World, entity: Entity) -> Option<f32> {
        world.get::<Collider>(entity).and_then(collider_height)
    }

    fn set_collider_height(world: &mut World, entity: Entity, height: f32) {
        let Some(collider) = world.get::<Collider>(entity) else {
            return;
        };
        let rest_radius = world
            .get::<CapsuleRestRadius>(entity)
            .map(|r| r.0)
            .or_else(|| collider.as_capsule().map(|capsule| capsule.radius()));
        let Some(resized) = with_collider_height(collider, height, rest_radius) else {
            warn!("Cannot resize collider of {:?}: unsupported shape", entity);
            return;
        };

        if let Some(mut collider) = world.get_mut::<Collider>(entity) {
            *collider = resized;
        }
        if let Some(radius) = rest_radius {
            if !world.entity(entity).contains::<CapsuleRestRadius>() {
                world.entity_mut(entity).insert(CapsuleRestRadius(radius));
            }
        }
    }

    fn get_position(world: &World, entity: Entity) -> Vec3 {
        world
            .get::<Transform>(entity)
            .map(|t| t.translation)
            .or_else(|| {
                world
                    .get::<GlobalTransform>(entity)
                    .map(|t| t.translation())
            })
            .unwrap_or(Vec3::ZERO)
    }
}

/// Plugin that sets up Rapier3D-specific systems for the character motor.
pub struct Rapier3dBackendPlugin;

impl Plugin for Rapier3dBackendPlugin {
    fn build(&self, app: &mut App) {
        use crate::MotorSet;

        app.register_type::<CapsuleRestRadius>();

        // Withdraw last step's forces before the motor adds new ones
        app.add_systems(
            FixedUpdate,
            clear_motor_forces.in_set(MotorSet::Preparation),
        );

        // Write this step's forces to Rapier
        app.add_systems(
            FixedUpdate,
            apply_motor_forces.in_set(MotorSet::FinalApplication),
        );
    }
}

/// Perform a raycast using RapierContext.
fn rapier_raycast(
    context: &RapierContext,
    origin: Vec3,
    direction: Vec3,
    max_distance: f32,
    exclude_entity: Entity,
    layers: GroundLayers,
) -> Option<CollisionData> {
    // Exclude the casting body and count only colliders in the ground layers
    let filter = QueryFilter::default()
        .exclude_rigid_body(exclude_entity)
        .exclude_sensors()
        .groups(CollisionGroups::new(
            Group::ALL,
            Group::from_bits_truncate(layers.bits()),
        ));

    context
        .cast_ray_and_get_normal(origin, direction, max_distance, true, filter)
        .map(|(hit_entity, hit)| {
            CollisionData::new(hit.time_of_impact, hit.normal, hit.point, Some(hit_entity))
        })
}

/// Full height of a collider along its vertical axis.
///
/// Capsules measure along their segment, including both caps. Returns `None`
/// for shapes without a meaningful height.
pub fn collider_height(collider: &Collider) -> Option<f32> {
    if let Some(capsule) = collider.as_capsule() {
        let segment = capsule.segment();
        Some(segment.a().distance(segment.b()) + 2.0 * capsule.radius())
    } else if let Some(cuboid) = collider.as_cuboid() {
        Some(cuboid.half_extents().y * 2.0)
    } else if let Some(cylinder) = collider.as_cylinder() {
        Some(cylinder.half_height() * 2.0)
    } else if let Some(ball) = collider.as_ball() {
        Some(ball.radius() * 2.0)
    } else {
        None
    }
}

/// Radius a capsule had before the backend first resized it.
///
/// Crouching below one diameter narrows the capsule; standing back up grows
/// it back to this radius.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct CapsuleRestRadius(pub f32);

/// Build a copy of `collider` resized to `height`, keeping its center.
///
/// Capsules take `rest_radius` (or their current radius) unless the new
/// height is shorter than that diameter, in which case they degenerate into
/// a ball of that height.
pub fn with_collider_height(
    collider: &Collider,
    height: f32,
    rest_radius: Option<f32>,
) -> Option<Collider> {
    let half = (height * 0.5).max(0.0);

    if let Some(capsule) = collider.as_capsule() {
        let segment = capsule.segment();
        let (a, b) = (segment.a(), segment.b());
        let center = (a + b) * 0.5;
        let axis = (b - a).normalize_or(Vec3::Y);
        let radius = rest_radius.unwrap_or(capsule.radius()).min(half);
        let half_segment = (half - radius).max(0.0);
        Some(Collider::capsule(
            center - axis * half_segment,
            center + axis * half_segment,
            radius,
        ))
    } else if let Some(cuboid) = collider.as_cuboid() {
        let extents = cuboid.half_extents();
        Some(Collider::cuboid(extents.x, half, extents.z))
    } else if let Some(cylinder) = collider.as_cylinder() {
        Some(Collider::cylinder(half, cylinder.radius()))
    } else if collider.as_ball().is_some() {
        Some(Collider::ball(half))
    } else {
        None
    }
}

/// Withdraw the motor forces applied last step.
///
/// This system runs BEFORE the movement systems. It:
/// 1. Subtracts the force we applied last step from ExternalForce
/// 2. Clears the accumulator for the new step
///
/// External user forces are preserved while ours are isolated between steps.
pub fn clear_motor_forces(mut q: Query<(&mut ExternalForce, &mut CharacterMotor)>) {
    for (mut ext_force, mut motor) in &mut q {
        let force_to_subtract = motor.prepare_new_frame();
        if force_to_subtract != Vec3::ZERO {
            ext_force.force -= force_to_subtract;
        }
    }
}

/// Write accumulated motor forces to ExternalForce.
///
/// This system runs AFTER the movement systems, so the force is integrated
/// by Rapier's next physics step.
pub fn apply_motor_forces(mut q: Query<(&mut ExternalForce, &mut CharacterMotor)>) {
    for (mut ext_force, mut motor) in &mut q {
        let force_to_apply = motor.finalize_frame();
        if force_to_apply != Vec3::ZERO {
            ext_force.force += force_to_apply;
        }
    }
}

/// Bundle for creating a character with Rapier3D physics.
///
/// Provides the rigid body, velocity tracking, external forces/impulses for
/// movement, axis locking, damping and mass properties a motor needs.
///
/// # Example
///
/// ```ignore
/// use bevy::prelude::*;
/// use bevy_rapier3d::prelude::*;
/// use fps_character_motor::prelude::*;
///
/// fn spawn_player(mut commands: Commands) {
///     commands.spawn((
///         Transform::from_xyz(0.0, 2.0, 0.0),
///         CharacterMotor::new(MotorConfig::player()).unwrap(),
///         MotorInput::default(),
///         MotorOrientation::default(),
///         // Physics bundle - upright FPS body
///         Rapier3dMotorBundle::rotation_locked(),
///         Collider::capsule_y(0.5, 0.5),
///     ));
/// }
/// ```
///
/// # Defaults
///
/// - `rigid_body`: [`RigidBody::Dynamic`]
/// - `velocity`: Zero velocity
/// - `external_force`: Zero force (written by the backend systems)
/// - `external_impulse`: Zero impulse (used for jumps)
/// - `locked_axes`: Empty for [`new`](Self::new), rotation locked for
///   [`rotation_locked`](Self::rotation_locked)
/// - `damping`: None; the motor sets linear damping every frame
/// - `mass_properties`: Computed by Rapier from the collider
#[derive(Bundle, Default)]
pub struct Rapier3dMotorBundle {
    pub rigid_body: RigidBody,
    pub velocity: Velocity,
    pub external_force: ExternalForce,
    pub external_impulse: ExternalImpulse,
    /// Which axes are locked. First-person bodies usually lock all rotation.
    pub locked_axes: LockedAxes,
    pub damping: Damping,
    pub mass_properties: ReadMassProperties,
}

impl Rapier3dMotorBundle {
    /// Create a new motor bundle with rotation enabled.
    pub fn new() -> Self {
        Self {
            rigid_body: RigidBody::Dynamic,
            velocity: Velocity::default(),
            external_force: ExternalForce::default(),
            external_impulse: ExternalImpulse::default(),
            locked_axes: LockedAxes::empty(),
            damping: Damping {
                linear_damping: 0.0,
                angular_damping: 1.0,
            },
            // Rapier will update this based on collider after first physics step
            mass_properties: ReadMassProperties::default(),
        }
    }

    /// Create a motor bundle with rotation locked.
    ///
    /// This is the usual configuration for a first-person body: the camera
    /// turns, the capsule never tips over.
    pub fn rotation_locked() -> Self {
        Self {
            locked_axes: LockedAxes::ROTATION_LOCKED,
            ..Self::new()
        }
    }

    /// Set the rigid body type.
    pub fn with_body(mut self, body: RigidBody) -> Self {
        self.rigid_body = body;
        self
    }

    /// Set which axes should be locked for the rigid body.
    pub fn with_locked_axes(mut self, axes: LockedAxes) -> Self {
        self.locked_axes = axes;
        self
    }
}
