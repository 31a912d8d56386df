//! The character motor component.
//!
//! [`CharacterMotor`] owns every piece of controller state: the config it was
//! built from, the derived speeds, the cached ground and height readings and
//! the stance and jump state machines. The systems in [`crate::systems`] feed
//! it backend readings and apply what it decides.

use bevy::prelude::*;

use crate::config::{
    MotorConfig, MotorConfigError, MotorOrientation, BASE_FORCE_SCALE, GROUND_PROBE_SKIN,
};

/// Standing or crouching.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stance {
    #[default]
    Standing,
    Crouching,
}

/// Whether a new jump may start.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JumpState {
    #[default]
    Ready,
    /// A jump was taken and its cooldown has not elapsed yet.
    Cooling,
}

/// Points at the entity whose [`Visibility`] follows the motor's flashlight.
#[derive(Component, Reflect, Debug, Clone, Copy)]
#[reflect(Component)]
pub struct Flashlight(pub Entity);

/// First-person character motor.
///
/// Build it with [`CharacterMotor::new`], which rejects invalid configs, and
/// spawn it next to a [`MotorInput`](crate::intent::MotorInput), a
/// [`MotorOrientation`] and the physics components of your backend.
///
/// # Example
///
/// ```rust
/// use fps_character_motor::prelude::*;
///
/// let motor = CharacterMotor::new(MotorConfig::default().with_move_speed(6.0)).unwrap();
/// assert_eq!(motor.move_speed(), 6.0);
/// assert!(motor.is_jump_ready());
/// assert!(!motor.is_crouching());
///
/// assert!(CharacterMotor::new(MotorConfig::default().with_crouch(0.5, 0.0)).is_err());
/// ```
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
pub struct CharacterMotor {
    config: MotorConfig,

    // === Derived Speeds ===
    running_speed: f32,
    crouch_speed: f32,

    // === Per-Frame State ===
    horizontal_input: f32,
    vertical_input: f32,
    grounded: bool,
    collider_height: f32,
    move_direction: Vec3,

    // === Modes ===
    stance: Stance,
    jump: JumpState,
    flashlight_on: bool,

    /// Set once the first frame has seeded the cached collider height.
    pub(crate) activated: bool,

    // === Force Accumulation ===
    /// Forces requested during the current physics step.
    #[reflect(ignore)]
    accumulated_force: Vec3,
    /// Forces handed to the physics engine last step (to be withdrawn).
    #[reflect(ignore)]
    applied_force: Vec3,
}

impl Default for CharacterMotor {
    fn default() -> Self {
        let config = MotorConfig::default();
        Self {
            config,
            running_speed: config.running_speed(),
            crouch_speed: config.crouch_speed(),
            horizontal_input: 0.0,
            vertical_input: 0.0,
            grounded: false,
            collider_height: config.player_height,
            move_direction: Vec3::ZERO,
            stance: Stance::Standing,
            jump: JumpState::Ready,
            flashlight_on: false,
            activated: false,
            accumulated_force: Vec3::ZERO,
            applied_force: Vec3::ZERO,
        }
    }
}

impl CharacterMotor {
    /// Build a motor from a config, deriving its speeds.
    ///
    /// The motor starts standing, with the flashlight off and the jump ready.
    pub fn new(config: MotorConfig) -> Result<Self, MotorConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            running_speed: config.running_speed(),
            crouch_speed: config.crouch_speed(),
            collider_height: config.player_height,
            ..default()
        })
    }

    /// The config this motor was built from.
    #[inline]
    pub fn config(&self) -> &MotorConfig {
        &self.config
    }

    /// Current move speed, also the horizontal speed cap.
    ///
    /// Always exactly [`running_speed`](Self::running_speed) or
    /// [`crouch_speed`](Self::crouch_speed), depending on the stance.
    #[inline]
    pub fn move_speed(&self) -> f32 {
        match self.stance {
            Stance::Standing => self.running_speed,
            Stance::Crouching => self.crouch_speed,
        }
    }

    #[inline]
    pub fn running_speed(&self) -> f32 {
        self.running_speed
    }

    #[inline]
    pub fn crouch_speed(&self) -> f32 {
        self.crouch_speed
    }

    #[inline]
    pub fn stance(&self) -> Stance {
        self.stance
    }

    #[inline]
    pub fn is_crouching(&self) -> bool {
        self.stance == Stance::Crouching
    }

    #[inline]
    pub fn jump_state(&self) -> JumpState {
        self.jump
    }

    #[inline]
    pub fn is_jump_ready(&self) -> bool {
        self.jump == JumpState::Ready
    }

    #[inline]
    pub fn is_flashlight_on(&self) -> bool {
        self.flashlight_on
    }

    /// Result of this frame's ground probe.
    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Collider height as of the end of the last frame.
    #[inline]
    pub fn collider_height(&self) -> f32 {
        self.collider_height
    }

    /// Direction of the last movement force (unit or zero).
    #[inline]
    pub fn move_direction(&self) -> Vec3 {
        self.move_direction
    }

    /// Axis input (horizontal, vertical) sampled this frame.
    #[inline]
    pub fn input_axes(&self) -> (f32, f32) {
        (self.horizontal_input, self.vertical_input)
    }

    /// Length of the downward ground probe: half the height plus the skin margin.
    #[inline]
    pub fn ground_probe_length(&self) -> f32 {
        self.collider_height * 0.5 + GROUND_PROBE_SKIN
    }

    /// Linear drag for the current ground state.
    #[inline]
    pub fn drag(&self) -> f32 {
        if self.grounded {
            self.config.ground_drag
        } else {
            0.0
        }
    }

    /// Magnitude of the movement force for the current stance and ground state.
    pub fn force_magnitude(&self) -> f32 {
        let control = if self.grounded {
            1.0
        } else {
            self.config.air_multiplier
        };
        self.move_speed() * BASE_FORCE_SCALE * control
    }

    /// Compute the movement force for this step and cache its direction.
    pub fn movement_force(&mut self, orientation: &MotorOrientation) -> Vec3 {
        self.move_direction = orientation.direction(self.horizontal_input, self.vertical_input);
        self.move_direction * self.force_magnitude()
    }

    /// Velocity with its horizontal part capped to the move speed.
    ///
    /// Returns `None` when the velocity is already within the cap.
    pub fn limit_horizontal_speed(&self, velocity: Vec3) -> Option<Vec3> {
        clamp_horizontal_speed(velocity, self.move_speed())
    }

    /// Impulse for a jump along `up`.
    pub fn jump_impulse(&self, up: Vec3) -> Vec3 {
        up.normalize_or(Vec3::Y) * self.config.jump_force
    }

    pub(crate) fn set_input_axes(&mut self, horizontal: f32, vertical: f32) {
        self.horizontal_input = horizontal;
        self.vertical_input = vertical;
    }

    pub(crate) fn set_grounded(&mut self, grounded: bool) {
        self.grounded = grounded;
    }

    pub(crate) fn refresh_collider_height(&mut self, height: f32) {
        self.collider_height = height;
    }

    /// Start a jump if one was pressed, the jump is ready and the actor is grounded.
    pub(crate) fn begin_jump(&mut self, pressed: bool) -> bool {
        if pressed && self.jump == JumpState::Ready && self.grounded {
            self.jump = JumpState::Cooling;
            true
        } else {
            false
        }
    }

    /// Re-arm the jump. Only the cooldown handler calls this.
    pub(crate) fn finish_jump_cooldown(&mut self) -> bool {
        let was_cooling = self.jump == JumpState::Cooling;
        self.jump = JumpState::Ready;
        was_cooling
    }

    /// Flip the flashlight and return its new state.
    pub(crate) fn toggle_flashlight(&mut self) -> bool {
        self.flashlight_on = !self.flashlight_on;
        self.flashlight_on
    }

    /// Enter the crouch. Returns the collider height to apply, if the stance changed.
    pub(crate) fn crouch(&mut self, height: f32) -> Option<f32> {
        if self.stance != Stance::Standing {
            return None;
        }
        self.stance = Stance::Crouching;
        Some(height * self.config.crouch_height_multiplier)
    }

    /// Leave the crouch. Returns the collider height to apply, if the stance changed.
    pub(crate) fn stand(&mut self, height: f32) -> Option<f32> {
        if self.stance != Stance::Crouching {
            return None;
        }
        self.stance = Stance::Standing;
        Some(height / self.config.crouch_height_multiplier)
    }

    // === Force Accumulation (for backends with persistent force components) ===

    pub(crate) fn add_force(&mut self, force: Vec3) {
        self.accumulated_force += force;
    }

    /// Take the force applied last step so it can be withdrawn, and reset the accumulator.
    pub(crate) fn prepare_new_frame(&mut self) -> Vec3 {
        self.accumulated_force = Vec3::ZERO;
        std::mem::take(&mut self.applied_force)
    }

    /// Take this step's accumulated force and remember it as applied.
    pub(crate) fn finalize_frame(&mut self) -> Vec3 {
        let force = std::mem::take(&mut self.accumulated_force);
        self.applied_force = force;
        force
    }
}

/// Cap the horizontal (x, z) speed of `velocity` at `max_speed`.
///
/// The vertical component is never touched. Returns `None` when no clamp is needed.
pub fn clamp_horizontal_speed(velocity: Vec3, max_speed: f32) -> Option<Vec3> {
    let flat = Vec3::new(velocity.x, 0.0, velocity.z);
    if flat.length() <= max_speed {
        return None;
    }
    let limited = flat.normalize_or_zero() * max_speed;
    Some(Vec3::new(limited.x, velocity.y, limited.z))
}
