//! First Person Example
//!
//! A playable first-person character in a walled yard featuring:
//! - A floor and four walls
//! - A few crates to jump on
//! - A flashlight attached to the camera
//!
//! ## Controls
//! - **W/S** or **Up/Down**: Move forward/backward
//! - **A/D** or **Left/Right**: Strafe
//! - **Mouse**: Look around
//! - **Space**: Jump
//! - **Left Ctrl** (hold): Crouch
//! - **F**: Toggle flashlight

use bevy::input::mouse::AccumulatedMouseMotion;
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use fps_character_motor::prelude::*;

// ==================== Constants ====================

const PLAYER_HEIGHT: f32 = 2.0;
const PLAYER_RADIUS: f32 = 0.4;
const EYE_HEIGHT: f32 = 0.7;

const YARD_HALF_SIZE: f32 = 20.0;
const WALL_HEIGHT: f32 = 3.0;
const WALL_THICKNESS: f32 = 0.5;

const MOUSE_SENSITIVITY: f32 = 0.003;

// ==================== Components ====================

/// Marker component for the player entity.
#[derive(Component)]
struct Player;

/// Yaw pivot of the player. Movement follows it.
#[derive(Component)]
struct Head;

/// Pitch pivot, carrying the camera and the flashlight.
#[derive(Component)]
struct Eyes;

// ==================== Main ====================

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "First Person - Character Motor Example".into(),
                resolution: (1280.0, 720.0).into(),
                ..default()
            }),
            ..default()
        }))
        // Physics, stepped on the fixed schedule right after the motor's forces
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule())
        // Character motor
        .add_plugins(CharacterMotorPlugin::<Rapier3dBackend>::default())
        // Systems
        .add_systems(Startup, setup)
        .add_systems(
            Update,
            (handle_input, mouse_look).before(MotorSet::Timers),
        )
        .run();
}

// ==================== Setup ====================

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    spawn_yard(&mut commands, &mut meshes, &mut materials);
    spawn_player(&mut commands, &mut meshes, &mut materials);

    commands.spawn((
        DirectionalLight {
            illuminance: 3_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 10.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn((
        Text::new("WASD: Move | Mouse: Look | Space: Jump | Ctrl: Crouch | F: Flashlight"),
        TextFont {
            font_size: 20.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        },
    ));
}

fn spawn_yard(
    commands: &mut Commands,
    meshes: &mut ResMut<Assets<Mesh>>,
    materials: &mut ResMut<Assets<StandardMaterial>>,
) {
    let half_wall = WALL_THICKNESS / 2.0;
    let half_wall_height = WALL_HEIGHT / 2.0;

    // Floor
    spawn_static_box(
        commands,
        meshes,
        materials,
        Vec3::new(0.0, -half_wall, 0.0),
        Vec3::new(YARD_HALF_SIZE, half_wall, YARD_HALF_SIZE),
        Color::srgb(0.3, 0.3, 0.3),
    );

    // Walls
    for (position, half_size) in [
        (
            Vec3::new(0.0, half_wall_height, -YARD_HALF_SIZE),
            Vec3::new(YARD_HALF_SIZE, half_wall_height, half_wall),
        ),
        (
            Vec3::new(0.0, half_wall_height, YARD_HALF_SIZE),
            Vec3::new(YARD_HALF_SIZE, half_wall_height, half_wall),
        ),
        (
            Vec3::new(-YARD_HALF_SIZE, half_wall_height, 0.0),
            Vec3::new(half_wall, half_wall_height, YARD_HALF_SIZE),
        ),
        (
            Vec3::new(YARD_HALF_SIZE, half_wall_height, 0.0),
            Vec3::new(half_wall, half_wall_height, YARD_HALF_SIZE),
        ),
    ] {
        spawn_static_box(
            commands,
            meshes,
            materials,
            position,
            half_size,
            Color::srgb(0.35, 0.35, 0.4),
        );
    }

    // Crates, each one a bit taller
    for i in 0..4 {
        let half_height = 0.25 + 0.25 * i as f32;
        spawn_static_box(
            commands,
            meshes,
            materials,
            Vec3::new(-6.0 + 4.0 * i as f32, half_height, -8.0),
            Vec3::new(1.0, half_height, 1.0),
            Color::srgb(0.6, 0.45, 0.25),
        );
    }
}

fn spawn_static_box(
    commands: &mut Commands,
    meshes: &mut ResMut<Assets<Mesh>>,
    materials: &mut ResMut<Assets<StandardMaterial>>,
    position: Vec3,
    half_size: Vec3,
    color: Color,
) {
    commands.spawn((
        Mesh3d(meshes.add(Cuboid::from_size(half_size * 2.0))),
        MeshMaterial3d(materials.add(color)),
        Transform::from_translation(position),
        RigidBody::Fixed,
        Collider::cuboid(half_size.x, half_size.y, half_size.z),
    ));
}

fn spawn_player(
    commands: &mut Commands,
    meshes: &mut ResMut<Assets<Mesh>>,
    materials: &mut ResMut<Assets<StandardMaterial>>,
) {
    let config = MotorConfig::player().with_player_height(PLAYER_HEIGHT);
    let motor = match CharacterMotor::new(config) {
        Ok(motor) => motor,
        Err(err) => {
            error!("Invalid motor config: {err}");
            return;
        }
    };

    let half_segment = PLAYER_HEIGHT / 2.0 - PLAYER_RADIUS;

    let player = commands
        .spawn((
            Player,
            Mesh3d(meshes.add(Capsule3d::new(PLAYER_RADIUS, half_segment * 2.0))),
            MeshMaterial3d(materials.add(Color::srgb(0.2, 0.6, 0.9))),
            Transform::from_xyz(0.0, PLAYER_HEIGHT, 0.0),
            motor,
            MotorInput::default(),
            MotorOrientation::default(),
            Rapier3dMotorBundle::rotation_locked(),
            Collider::capsule_y(half_segment, PLAYER_RADIUS),
        ))
        .id();

    let head = commands
        .spawn((
            Head,
            Transform::from_xyz(0.0, EYE_HEIGHT, 0.0),
            Visibility::default(),
        ))
        .id();

    let eyes = commands
        .spawn((Eyes, Camera3d::default(), Transform::default(), Visibility::default()))
        .id();

    let flashlight = commands
        .spawn((
            SpotLight {
                intensity: 2_000_000.0,
                range: 30.0,
                outer_angle: 0.5,
                inner_angle: 0.3,
                shadows_enabled: true,
                ..default()
            },
            Transform::from_xyz(0.2, -0.2, 0.0),
            Visibility::Hidden,
        ))
        .id();

    commands.entity(eyes).add_child(flashlight);
    commands.entity(head).add_child(eyes);
    commands.entity(player).add_child(head);
    commands
        .entity(player)
        .insert((OrientationSource(head), Flashlight(flashlight)));
}

// ==================== Input ====================

/// Map the keyboard onto the player's [`MotorInput`].
///
/// Axes are written every frame; jump, crouch and flashlight are sent as edges.
fn handle_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut query: Query<&mut MotorInput, With<Player>>,
) {
    for mut input in &mut query {
        let mut horizontal = 0.0;
        if keyboard.pressed(KeyCode::KeyA) || keyboard.pressed(KeyCode::ArrowLeft) {
            horizontal -= 1.0;
        }
        if keyboard.pressed(KeyCode::KeyD) || keyboard.pressed(KeyCode::ArrowRight) {
            horizontal += 1.0;
        }

        let mut vertical = 0.0;
        if keyboard.pressed(KeyCode::KeyW) || keyboard.pressed(KeyCode::ArrowUp) {
            vertical += 1.0;
        }
        if keyboard.pressed(KeyCode::KeyS) || keyboard.pressed(KeyCode::ArrowDown) {
            vertical -= 1.0;
        }
        input.set_axes(horizontal, vertical);

        if keyboard.just_pressed(KeyCode::Space) {
            input.press_jump();
        }
        if keyboard.just_pressed(KeyCode::ControlLeft) {
            input.press_crouch();
        }
        if keyboard.just_released(KeyCode::ControlLeft) {
            input.release_crouch();
        }
        if keyboard.just_pressed(KeyCode::KeyF) {
            input.press_flashlight();
        }
    }
}

/// Yaw the head and pitch the eyes from mouse motion.
fn mouse_look(
    mouse_motion: Res<AccumulatedMouseMotion>,
    mut heads: Query<&mut Transform, (With<Head>, Without<Eyes>)>,
    mut eyes: Query<&mut Transform, (With<Eyes>, Without<Head>)>,
) {
    let delta = mouse_motion.delta;
    if delta == Vec2::ZERO {
        return;
    }

    for mut head in &mut heads {
        head.rotate_y(-delta.x * MOUSE_SENSITIVITY);
    }

    for mut eye in &mut eyes {
        let (_, pitch, _) = eye.rotation.to_euler(EulerRot::YXZ);
        let pitch = (pitch - delta.y * MOUSE_SENSITIVITY).clamp(-1.5, 1.5);
        eye.rotation = Quat::from_rotation_x(pitch);
    }
}
