//! Shared helpers for the motor integration tests.
//!
//! [`TestBackend`] is a scripted physics backend: bodies never move on their
//! own, the ground is a flat plane described by the [`TestGround`] resource,
//! and every force and impulse is recorded so tests can count them.

#![allow(dead_code)]

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use fps_character_motor::backend::NoOpBackendPlugin;
use fps_character_motor::prelude::*;

/// Real time advanced by every `app.update()`.
pub const FRAME: Duration = Duration::from_millis(50);

/// Scripted rigid body.
#[derive(Component, Debug, Clone)]
pub struct TestBody {
    pub velocity: Vec3,
    pub drag: f32,
    pub mass: f32,
    /// Every force applied, in order.
    pub forces: Vec<Vec3>,
    /// Every impulse applied, in order.
    pub impulses: Vec<Vec3>,
}

impl Default for TestBody {
    fn default() -> Self {
        Self {
            velocity: Vec3::ZERO,
            drag: 0.0,
            mass: 1.0,
            forces: Vec::new(),
            impulses: Vec::new(),
        }
    }
}

/// Scripted collider with a resizable height.
#[derive(Component, Debug, Clone, Copy)]
pub struct TestCollider {
    pub height: f32,
}

/// A horizontal ground plane. `None` means there is nothing below.
#[derive(Resource, Debug, Clone, Copy)]
pub struct TestGround {
    pub surface_y: Option<f32>,
    pub layers: GroundLayers,
}

impl Default for TestGround {
    fn default() -> Self {
        Self {
            surface_y: Some(0.0),
            layers: GroundLayers::from_layers(&[0]),
        }
    }
}

pub struct TestBackend;

impl MotorPhysicsBackend for TestBackend {
    fn plugin() -> impl Plugin {
        NoOpBackendPlugin
    }

    fn raycast(
        world: &mut World,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        _exclude_entity: Entity,
        layers: GroundLayers,
    ) -> Option<CollisionData> {
        let ground = world.get_resource::<TestGround>().copied()?;
        let surface_y = ground.surface_y?;
        if direction.y >= 0.0 || !ground.layers.intersects(layers) {
            return None;
        }

        let distance = (origin.y - surface_y) / -direction.y;
        if !(0.0..=max_distance).contains(&distance) {
            return None;
        }
        let point = origin + direction * distance;
        Some(CollisionData::new(distance, Vec3::Y, point, None))
    }

    fn get_velocity(world: &World, entity: Entity) -> Vec3 {
        world
            .get::<TestBody>(entity)
            .map(|b| b.velocity)
            .unwrap_or(Vec3::ZERO)
    }

    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec3) {
        if let Some(mut body) = world.get_mut::<TestBody>(entity) {
            body.velocity = velocity;
        }
    }

    fn get_linear_drag(world: &World, entity: Entity) -> f32 {
        world.get::<TestBody>(entity).map(|b| b.drag).unwrap_or(0.0)
    }

    fn set_linear_drag(world: &mut World, entity: Entity, drag: f32) {
        if let Some(mut body) = world.get_mut::<TestBody>(entity) {
            body.drag = drag;
        }
    }

    fn apply_force(world: &mut World, entity: Entity, force: Vec3) {
        if let Some(mut body) = world.get_mut::<TestBody>(entity) {
            body.forces.push(force);
        }
    }

    fn apply_impulse(world: &mut World, entity: Entity, impulse: Vec3) {
        if let Some(mut body) = world.get_mut::<TestBody>(entity) {
            let mass = body.mass;
            body.velocity += impulse / mass;
            body.impulses.push(impulse);
        }
    }

    fn get_collider_height(world: &World, entity: Entity) -> Option<f32> {
        world.get::<TestCollider>(entity).map(|c| c.height)
    }

    fn set_collider_height(world: &mut World, entity: Entity, height: f32) {
        if let Some(mut collider) = world.get_mut::<TestCollider>(entity) {
            collider.height = height;
        }
    }

    fn get_position(world: &World, entity: Entity) -> Vec3 {
        world
            .get::<Transform>(entity)
            .map(|t| t.translation)
            .unwrap_or(Vec3::ZERO)
    }
}

/// Create a headless app with the motor plugin on the test backend.
///
/// Fixed steps never run on their own; call [`physics_step`] to run one.
pub fn create_test_app() -> App {
    let mut app = App::new();

    app.add_plugins(MinimalPlugins);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(FRAME));
    app.insert_resource(Time::<Fixed>::from_seconds(3600.0));
    app.init_resource::<TestGround>();
    app.add_plugins(CharacterMotorPlugin::<TestBackend>::default());

    app.finish();
    app.cleanup();
    app
}

/// Spawn a motor standing on the ground plane at y = 0.
pub fn spawn_motor(app: &mut App, config: MotorConfig) -> Entity {
    spawn_motor_at(app, config, Vec3::new(0.0, 1.0, 0.0))
}

/// Spawn a motor with its origin at `position`, collider height from the config.
pub fn spawn_motor_at(app: &mut App, config: MotorConfig, position: Vec3) -> Entity {
    let height = config.player_height;
    let config = config.with_ground_layers(GroundLayers::from_layers(&[0]));
    app.world_mut()
        .spawn((
            Transform::from_translation(position),
            CharacterMotor::new(config).expect("valid test config"),
            MotorInput::default(),
            MotorOrientation::default(),
            TestBody::default(),
            TestCollider { height },
        ))
        .id()
}

/// Run one frame.
pub fn tick(app: &mut App) {
    app.update();
}

/// Run `frames` frames.
pub fn run_frames(app: &mut App, frames: usize) {
    for _ in 0..frames {
        tick(app);
    }
}

/// Run one fixed physics step.
pub fn physics_step(app: &mut App) {
    app.world_mut().run_schedule(FixedUpdate);
}

/// Edit the input of `entity` before the next frame.
pub fn with_input(app: &mut App, entity: Entity, edit: impl FnOnce(&mut MotorInput)) {
    if let Some(mut input) = app.world_mut().get_mut::<MotorInput>(entity) {
        edit(&mut input);
    }
}

pub fn motor(app: &App, entity: Entity) -> &CharacterMotor {
    app.world()
        .get::<CharacterMotor>(entity)
        .expect("entity has a motor")
}

pub fn body(app: &App, entity: Entity) -> &TestBody {
    app.world()
        .get::<TestBody>(entity)
        .expect("entity has a test body")
}

pub fn body_mut(app: &mut App, entity: Entity) -> Mut<'_, TestBody> {
    app.world_mut()
        .get_mut::<TestBody>(entity)
        .expect("entity has a test body")
}

pub fn collider_height(app: &App, entity: Entity) -> f32 {
    app.world()
        .get::<TestCollider>(entity)
        .map(|c| c.height)
        .expect("entity has a test collider")
}
