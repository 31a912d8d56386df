//! Motor configuration and orientation components.
//!
//! [`MotorConfig`] is the flat record of tuning values a motor is built from.
//! It is validated once, when the motor is constructed, so a bad value is a
//! setup error rather than a runtime fault.

use bevy::prelude::*;
use thiserror::Error;

/// Extra probe distance beyond half the collider height.
///
/// Avoids false negatives from surface contact tolerance.
pub const GROUND_PROBE_SKIN: f32 = 0.2;

/// Scale applied to move speed to obtain the movement force magnitude.
pub const BASE_FORCE_SCALE: f32 = 10.0;

/// Bitmask of physics layers that count as walkable ground.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroundLayers(pub u32);

impl GroundLayers {
    /// Every layer counts as ground.
    pub const ALL: Self = Self(u32::MAX);
    /// Nothing counts as ground.
    pub const NONE: Self = Self(0);

    /// Build a mask from layer indices (0..32). Out-of-range indices are ignored.
    pub fn from_layers(layers: &[u32]) -> Self {
        Self(
            layers
                .iter()
                .filter(|&&layer| layer < 32)
                .fold(0, |mask, layer| mask | (1 << layer)),
        )
    }

    /// Check whether a layer index is part of this mask.
    pub fn contains(&self, layer: u32) -> bool {
        layer < 32 && self.0 & (1 << layer) != 0
    }

    /// Check whether this mask shares any layer with `other`.
    pub fn intersects(&self, other: GroundLayers) -> bool {
        self.0 & other.0 != 0
    }

    /// Raw bits of the mask.
    #[inline]
    pub fn bits(&self) -> u32 {
        self.0
    }
}

impl Default for GroundLayers {
    fn default() -> Self {
        Self::ALL
    }
}

/// Configuration rejected by [`MotorConfig::validate`].
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum MotorConfigError {
    /// Un-crouching divides by this factor, so it must be a positive number.
    #[error("crouch height multiplier must be positive and finite, got {0}")]
    InvalidCrouchHeightMultiplier(f32),
    #[error("crouch speed multiplier must be non-negative and finite, got {0}")]
    InvalidCrouchSpeedMultiplier(f32),
    #[error("move speed must be non-negative and finite, got {0}")]
    InvalidMoveSpeed(f32),
    #[error("jump cooldown must be non-negative and finite, got {0}")]
    InvalidJumpCooldown(f32),
    #[error("ground drag must be non-negative and finite, got {0}")]
    InvalidGroundDrag(f32),
    #[error("air multiplier must be non-negative and finite, got {0}")]
    InvalidAirMultiplier(f32),
    #[error("player height must be positive and finite, got {0}")]
    InvalidPlayerHeight(f32),
}

/// Tuning values for a character motor.
///
/// These are fixed for the session: the motor snapshots its running and
/// crouch speeds from them when it is built.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct MotorConfig {
    // === Movement ===
    /// Base (running) move speed in units/second. Also the horizontal speed cap.
    pub move_speed: f32,
    /// Crouch speed = `move_speed * crouch_speed_multiplier`.
    pub crouch_speed_multiplier: f32,
    /// Multiplier applied to the movement force while airborne.
    pub air_multiplier: f32,
    /// Linear drag applied to the body while grounded (zero while airborne).
    pub ground_drag: f32,

    // === Crouch ===
    /// Collider height factor while crouched. Standing divides by the same factor.
    pub crouch_height_multiplier: f32,

    // === Jump ===
    /// Magnitude of the jump impulse along the actor's up axis.
    pub jump_force: f32,
    /// Seconds after a jump before the next one is allowed.
    pub jump_cooldown: f32,

    // === Ground Check ===
    /// Collider height used by the ground probe until the live height is known.
    pub player_height: f32,
    /// Layers the ground probe accepts.
    pub ground_layers: GroundLayers,

    // === Diagnostics ===
    /// Log every flashlight toggle.
    pub log_flashlight_toggles: bool,
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            // Movement
            move_speed: 7.0,
            crouch_speed_multiplier: 0.5,
            air_multiplier: 0.4,
            ground_drag: 5.0,

            // Crouch
            crouch_height_multiplier: 0.5,

            // Jump
            jump_force: 12.0,
            jump_cooldown: 0.25,

            // Ground check
            player_height: 2.0,
            ground_layers: GroundLayers::ALL,

            log_flashlight_toggles: true,
        }
    }
}

impl MotorConfig {
    /// Create a config tuned for a responsive player.
    pub fn player() -> Self {
        Self {
            move_speed: 8.0,
            jump_force: 14.0,
            ..default()
        }
    }

    /// Create a config for a slow, low-profile character.
    pub fn sneaky() -> Self {
        Self {
            move_speed: 5.0,
            crouch_speed_multiplier: 0.4,
            crouch_height_multiplier: 0.4,
            jump_force: 8.0,
            jump_cooldown: 0.5,
            air_multiplier: 0.2,
            ..default()
        }
    }

    /// Check every value the motor relies on.
    pub fn validate(&self) -> Result<(), MotorConfigError> {
        fn non_negative(value: f32) -> bool {
            value.is_finite() && value >= 0.0
        }

        if !(self.crouch_height_multiplier.is_finite() && self.crouch_height_multiplier > 0.0) {
            return Err(MotorConfigError::InvalidCrouchHeightMultiplier(
                self.crouch_height_multiplier,
            ));
        }
        if !non_negative(self.crouch_speed_multiplier) {
            return Err(MotorConfigError::InvalidCrouchSpeedMultiplier(
                self.crouch_speed_multiplier,
            ));
        }
        if !non_negative(self.move_speed) {
            return Err(MotorConfigError::InvalidMoveSpeed(self.move_speed));
        }
        if !non_negative(self.jump_cooldown) {
            return Err(MotorConfigError::InvalidJumpCooldown(self.jump_cooldown));
        }
        if !non_negative(self.ground_drag) {
            return Err(MotorConfigError::InvalidGroundDrag(self.ground_drag));
        }
        if !non_negative(self.air_multiplier) {
            return Err(MotorConfigError::InvalidAirMultiplier(self.air_multiplier));
        }
        if !(self.player_height.is_finite() && self.player_height > 0.0) {
            return Err(MotorConfigError::InvalidPlayerHeight(self.player_height));
        }
        Ok(())
    }

    /// Running speed derived from this config.
    #[inline]
    pub fn running_speed(&self) -> f32 {
        self.move_speed
    }

    /// Crouch speed derived from this config.
    #[inline]
    pub fn crouch_speed(&self) -> f32 {
        self.move_speed * self.crouch_speed_multiplier
    }

    /// Builder: set move speed.
    pub fn with_move_speed(mut self, speed: f32) -> Self {
        self.move_speed = speed;
        self
    }

    /// Builder: set crouch multipliers (speed and collider height).
    pub fn with_crouch(mut self, speed_multiplier: f32, height_multiplier: f32) -> Self {
        self.crouch_speed_multiplier = speed_multiplier;
        self.crouch_height_multiplier = height_multiplier;
        self
    }

    /// Builder: set jump force and cooldown.
    pub fn with_jump(mut self, force: f32, cooldown: f32) -> Self {
        self.jump_force = force;
        self.jump_cooldown = cooldown;
        self
    }

    /// Builder: set ground drag.
    pub fn with_ground_drag(mut self, drag: f32) -> Self {
        self.ground_drag = drag;
        self
    }

    /// Builder: set air multiplier.
    pub fn with_air_multiplier(mut self, multiplier: f32) -> Self {
        self.air_multiplier = multiplier;
        self
    }

    /// Builder: set the initial player height used by the ground probe.
    pub fn with_player_height(mut self, height: f32) -> Self {
        self.player_height = height;
        self
    }

    /// Builder: set the ground layers.
    pub fn with_ground_layers(mut self, layers: GroundLayers) -> Self {
        self.ground_layers = layers;
        self
    }

    /// Builder: enable or disable flashlight toggle logging.
    pub fn with_flashlight_logs(mut self, enabled: bool) -> Self {
        self.log_flashlight_toggles = enabled;
        self
    }
}

/// Forward/right basis that movement input is expressed in.
///
/// Usually follows the camera yaw. Either write it directly every frame or add
/// an [`OrientationSource`] and let the plugin copy it.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct MotorOrientation {
    forward: Vec3,
    right: Vec3,
}

impl Default for MotorOrientation {
    fn default() -> Self {
        Self {
            forward: Vec3::NEG_Z,
            right: Vec3::X,
        }
    }
}

impl MotorOrientation {
    /// Create an orientation from a forward and right vector.
    ///
    /// Both are normalized; a zero-length vector keeps the default axis.
    pub fn new(forward: Vec3, right: Vec3) -> Self {
        let mut orientation = Self::default();
        orientation.set(forward, right);
        orientation
    }

    /// Create an orientation from a yaw angle (radians around +Y).
    pub fn from_yaw(yaw: f32) -> Self {
        let rotation = Quat::from_rotation_y(yaw);
        Self {
            forward: rotation * Vec3::NEG_Z,
            right: rotation * Vec3::X,
        }
    }

    /// Create an orientation from a world transform.
    pub fn from_transform(transform: &GlobalTransform) -> Self {
        Self {
            forward: transform.forward().as_vec3(),
            right: transform.right().as_vec3(),
        }
    }

    /// Get the forward direction.
    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    /// Get the right direction.
    #[inline]
    pub fn right(&self) -> Vec3 {
        self.right
    }

    /// Replace the basis. Zero-length inputs leave that axis unchanged.
    pub fn set(&mut self, forward: Vec3, right: Vec3) {
        let forward = forward.normalize_or_zero();
        if forward != Vec3::ZERO {
            self.forward = forward;
        }
        let right = right.normalize_or_zero();
        if right != Vec3::ZERO {
            self.right = right;
        }
    }

    /// Convert axis input (horizontal, vertical) into a world direction.
    ///
    /// The result is normalized, or zero when the input cancels out.
    pub fn direction(&self, horizontal: f32, vertical: f32) -> Vec3 {
        (self.forward * vertical + self.right * horizontal).normalize_or_zero()
    }
}

/// Makes the plugin copy [`MotorOrientation`] from another entity's transform.
#[derive(Component, Reflect, Debug, Clone, Copy)]
#[reflect(Component)]
pub struct OrientationSource(pub Entity);
