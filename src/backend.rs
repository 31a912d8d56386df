//! Physics backend abstraction.
//!
//! This module defines the trait that physics backends must implement to
//! drive a [`CharacterMotor`](crate::motor::CharacterMotor). The motor never
//! touches rigid bodies or colliders directly: every read and write goes
//! through the backend, so the same state machine runs on Rapier, on a custom
//! engine, or on a test double.

use bevy::prelude::*;

use crate::collision::CollisionData;
use crate::config::GroundLayers;

/// Trait for physics backend implementations.
///
/// All functions are static and take the ECS world, mirroring how the motor
/// systems run as exclusive systems.
///
/// For an example implementation, see the `rapier` module's `Rapier3dBackend`.
pub trait MotorPhysicsBackend: 'static + Send + Sync {
    /// Returns the plugin that sets up this backend.
    fn plugin() -> impl Plugin;

    /// Cast a ray and return the closest hit, if any.
    ///
    /// # Arguments
    /// * `world` - The ECS world for queries
    /// * `origin` - Ray origin in world space
    /// * `direction` - Cast direction (normalized)
    /// * `max_distance` - Maximum cast distance
    /// * `exclude_entity` - Entity to exclude from the cast (the actor itself)
    /// * `layers` - Only surfaces in these layers count as hits
    fn raycast(
        world: &mut World,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        exclude_entity: Entity,
        layers: GroundLayers,
    ) -> Option<CollisionData>;

    /// Get the current linear velocity of an entity.
    fn get_velocity(world: &World, entity: Entity) -> Vec3;

    /// Set the linear velocity of an entity.
    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec3);

    /// Get the linear drag (damping) coefficient of an entity.
    fn get_linear_drag(world: &World, entity: Entity) -> f32;

    /// Set the linear drag (damping) coefficient of an entity.
    fn set_linear_drag(world: &mut World, entity: Entity, drag: f32);

    /// Apply a continuous force to an entity.
    ///
    /// The force acts for the duration of the current physics step only.
    fn apply_force(world: &mut World, entity: Entity, force: Vec3);

    /// Apply an impulse to an entity.
    ///
    /// Impulse is an instantaneous change in momentum.
    fn apply_impulse(world: &mut World, entity: Entity, impulse: Vec3);

    /// Get the height of the entity's collider.
    ///
    /// Returns `None` when the entity has no collider the backend can measure.
    fn get_collider_height(world: &World, entity: Entity) -> Option<f32>;

    /// Set the height of the entity's collider.
    fn set_collider_height(world: &mut World, entity: Entity, height: f32);

    /// Get the current position of an entity.
    fn get_position(world: &World, entity: Entity) -> Vec3;

    /// Get the entity's local up axis in world space.
    fn get_up(world: &World, entity: Entity) -> Vec3 {
        world
            .get::<Transform>(entity)
            .map(|t| t.rotation * Vec3::Y)
            .or_else(|| {
                world.get::<GlobalTransform>(entity).map(|t| {
                    let (_, rotation, _) = t.to_scale_rotation_translation();
                    rotation * Vec3::Y
                })
            })
            .unwrap_or(Vec3::Y)
    }
}

/// Empty plugin for backends that don't need additional setup.
pub struct NoOpBackendPlugin;

impl Plugin for NoOpBackendPlugin {
    fn build(&self, _app: &mut App) {}
}
