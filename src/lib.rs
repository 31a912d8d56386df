//! # `fps_character_motor`
//!
//! A physics-driven first-person character motor with physics backend abstraction.
//!
//! This crate turns directional and action input into forces and state
//! transitions on a dynamic rigid body:
//! - Walks by applying a continuous force, so acceleration rather than
//!   instantaneous velocity governs movement
//! - Caps horizontal speed while leaving vertical motion free
//! - Probes for ground with a downward raycast every frame
//! - Crouches by scaling the collider height, reversibly
//! - Jumps with a deterministic launch and a cooldown
//! - Toggles a flashlight's visibility
//! - Abstracts the physics backend (Rapier3D included)
//!
//! ## Architecture
//!
//! The motor runs on two cadences:
//! 1. Every frame (`Update`): tick jump cooldowns, probe the ground, run the
//!    jump/flashlight/crouch state machine and set drag
//! 2. Every physics step (`FixedUpdate`): clamp horizontal speed, then apply
//!    the movement force
//!
//! ## Usage
//!
//! ```rust
//! use bevy::prelude::*;
//! use fps_character_motor::prelude::*;
//!
//! // Create the motor components for a player character
//! let motor = CharacterMotor::new(MotorConfig::player()).expect("valid config");
//! let input = MotorInput::default();
//! let orientation = MotorOrientation::default();
//!
//! // These can be spawned together with the backend's physics components
//! ```

use bevy::prelude::*;

pub mod backend;
pub mod collision;
pub mod config;
pub mod cooldown;
pub mod intent;
pub mod motor;
pub mod state;
pub mod systems;
pub mod weapon;

#[cfg(feature = "rapier3d")]
pub mod rapier;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::backend::MotorPhysicsBackend;
    pub use crate::collision::CollisionData;
    pub use crate::config::{
        GroundLayers, MotorConfig, MotorConfigError, MotorOrientation, OrientationSource,
    };
    pub use crate::cooldown::{JumpCooldownElapsed, JumpCooldowns};
    pub use crate::intent::MotorInput;
    pub use crate::motor::{CharacterMotor, Flashlight, JumpState, Stance};
    pub use crate::state::{Airborne, Crouching, Grounded};
    pub use crate::weapon::{find_weapon, Weapon};
    pub use crate::{CharacterMotorPlugin, MotorSet};

    #[cfg(feature = "rapier3d")]
    pub use crate::rapier::{Rapier3dBackend, Rapier3dMotorBundle};
}

/// System sets of the motor, in execution order within each schedule.
///
/// Hosts that write [`MotorInput`](intent::MotorInput) from their own systems
/// should run them `.before(MotorSet::Timers)`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotorSet {
    // === Update ===
    /// Tick jump cooldowns and re-arm elapsed jumps.
    Timers,
    /// Seed new motors and sync orientation.
    Activation,
    /// Ground probe.
    Sensors,
    /// Jump, flashlight and crouch transitions.
    StateMachine,
    /// Ground drag.
    Drag,
    /// State marker components.
    Markers,
    /// Consume input edges.
    Cleanup,

    // === FixedUpdate ===
    /// Backend preparation (e.g. withdrawing last step's forces).
    Preparation,
    /// Speed clamp and movement force.
    Movement,
    /// Backend final application of accumulated forces.
    FinalApplication,
}

/// Main plugin for the character motor.
///
/// This plugin is generic over a physics backend `B` which provides the actual
/// physics operations (raycasting, force application, etc.).
///
/// # Type Parameters
/// - `B`: The physics backend implementation (e.g., `Rapier3dBackend`)
///
/// # Examples
///
/// With Rapier3D backend:
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_rapier3d::prelude::*;
/// use fps_character_motor::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
///     .add_plugins(CharacterMotorPlugin::<Rapier3dBackend>::default())
///     .run();
/// ```
pub struct CharacterMotorPlugin<B: backend::MotorPhysicsBackend> {
    _marker: std::marker::PhantomData<B>,
}

impl<B: backend::MotorPhysicsBackend> Default for CharacterMotorPlugin<B> {
    fn default() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<B: backend::MotorPhysicsBackend> Plugin for CharacterMotorPlugin<B> {
    fn build(&self, app: &mut App) {
        // Register core types
        app.register_type::<motor::CharacterMotor>();
        app.register_type::<motor::Stance>();
        app.register_type::<motor::JumpState>();
        app.register_type::<motor::Flashlight>();
        app.register_type::<config::MotorConfig>();
        app.register_type::<config::GroundLayers>();
        app.register_type::<config::MotorOrientation>();
        app.register_type::<config::OrientationSource>();
        app.register_type::<intent::MotorInput>();
        app.register_type::<state::Grounded>();
        app.register_type::<state::Airborne>();
        app.register_type::<state::Crouching>();
        app.register_type::<weapon::Weapon>();

        // Timer service
        app.init_resource::<cooldown::JumpCooldowns>();
        app.add_event::<cooldown::JumpCooldownElapsed>();

        app.configure_sets(
            Update,
            (
                MotorSet::Timers,
                MotorSet::Activation,
                MotorSet::Sensors,
                MotorSet::StateMachine,
                MotorSet::Drag,
                MotorSet::Markers,
                MotorSet::Cleanup,
            )
                .chain(),
        );
        app.configure_sets(
            FixedUpdate,
            (
                MotorSet::Preparation,
                MotorSet::Movement,
                MotorSet::FinalApplication,
            )
                .chain(),
        );

        // Add the physics backend plugin
        app.add_plugins(B::plugin());

        // Per-frame state machine
        app.add_systems(
            Update,
            (
                (cooldown::tick_jump_cooldowns, cooldown::on_jump_cooldown_elapsed)
                    .chain()
                    .in_set(MotorSet::Timers),
                (
                    systems::activate_motors::<B>,
                    systems::sync_orientation_from_source,
                )
                    .chain()
                    .in_set(MotorSet::Activation),
                systems::update_ground_state::<B>.in_set(MotorSet::Sensors),
                systems::interpret_motor_input::<B>.in_set(MotorSet::StateMachine),
                systems::apply_ground_drag::<B>.in_set(MotorSet::Drag),
                systems::sync_state_markers.in_set(MotorSet::Markers),
                systems::clear_motor_input.in_set(MotorSet::Cleanup),
            ),
        );

        // Per-step force engine
        app.add_systems(
            FixedUpdate,
            (
                systems::limit_horizontal_speed::<B>,
                systems::apply_movement_force::<B>,
            )
                .chain()
                .in_set(MotorSet::Movement),
        );
    }
}
